use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    pub frequency_high: f64,
    pub frequency_watch: f64,
    pub frequency_rise_pct: f64,
    pub decline_high_pct: f64,
    pub decline_medium_pct: f64,
    pub ctr_floor: f64,
    pub roas_floor: f64,
    pub velocity_drop_high_pct: f64,
    pub velocity_drop_medium_pct: f64,
    pub velocity_floor: f64,
    pub presence_drop_high_pct: f64,
    pub presence_drop_medium_pct: f64,
    pub viral_velocity: f64,
    pub viral_growth_ratio: f64,
    pub spike_growth_ratio: f64,
    pub decay_growth_ratio: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            frequency_high: 4.5,
            frequency_watch: 3.5,
            frequency_rise_pct: 25.0,
            decline_high_pct: 20.0,
            decline_medium_pct: 15.0,
            ctr_floor: 1.0,
            roas_floor: 2.0,
            velocity_drop_high_pct: 30.0,
            velocity_drop_medium_pct: 20.0,
            velocity_floor: 4.0,
            presence_drop_high_pct: 35.0,
            presence_drop_medium_pct: 20.0,
            viral_velocity: 8.0,
            viral_growth_ratio: 5.0,
            spike_growth_ratio: 3.0,
            decay_growth_ratio: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioConfig {
    pub strong_moment_alignment: f64,
    pub strong_velocity: f64,
    pub weak_velocity: f64,
    pub strong_roas: f64,
    pub strong_ctr: f64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            strong_moment_alignment: 0.75,
            strong_velocity: 7.0,
            weak_velocity: 4.0,
            strong_roas: 3.0,
            strong_ctr: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceConfig {
    pub organic_healthy: f64,
    pub organic_watch: f64,
    pub dependency_low: f64,
    pub dependency_high: f64,
    pub stability_healthy: f64,
    pub stability_watch: f64,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            organic_healthy: 6.0,
            organic_watch: 4.0,
            dependency_low: 4.0,
            dependency_high: 7.0,
            stability_healthy: 7.0,
            stability_watch: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensionConfig {
    pub hot_velocity: f64,
    pub hot_share: f64,
    pub fatigued_share: f64,
    pub moment_share: f64,
    pub dominance_share: f64,
}

impl Default for TensionConfig {
    fn default() -> Self {
        Self {
            hot_velocity: 7.0,
            hot_share: 0.5,
            fatigued_share: 0.5,
            moment_share: 0.3,
            dominance_share: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub stable_cv: f64,
    pub sensitive_cv: f64,
    pub reliable_points: usize,
    pub reliable_impressions: f64,
    pub moderate_points: usize,
    pub scale_roas: f64,
    pub scale_ctr: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            stable_cv: 0.15,
            sensitive_cv: 0.35,
            reliable_points: 6,
            reliable_impressions: 50_000.0,
            moderate_points: 3,
            scale_roas: 3.0,
            scale_ctr: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    pub underrepresented_ratio: f64,
    pub overrepresented_ratio: f64,
    pub high_sample: usize,
    pub medium_sample: usize,
    pub alignment_share: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            underrepresented_ratio: 0.7,
            overrepresented_ratio: 1.3,
            high_sample: 10,
            medium_sample: 5,
            alignment_share: 0.4,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub signals: SignalConfig,
    pub portfolio: PortfolioConfig,
    pub balance: BalanceConfig,
    pub tension: TensionConfig,
    pub strategy: StrategyConfig,
    pub market: MarketConfig,
}

impl AnalysisConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), String> {
        let config_path = path.or_else(default_config_path);
        let config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| format!("failed to read config: {}", err))?;
                toml::from_str(&contents)
                    .map_err(|err| format!("failed to parse config: {}", err))?
            } else {
                AnalysisConfig::default()
            }
        } else {
            AnalysisConfig::default()
        };

        let mut config = config;
        config.apply_env_overrides();
        Ok((config, config_path))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("ANALYSIS_FREQUENCY_HIGH") {
            if let Ok(parsed) = value.parse::<f64>() {
                self.signals.frequency_high = parsed;
            }
        }
        if let Ok(value) = env::var("ANALYSIS_DECLINE_HIGH_PCT") {
            if let Ok(parsed) = value.parse::<f64>() {
                self.signals.decline_high_pct = parsed;
            }
        }
        if let Ok(value) = env::var("ANALYSIS_STRONG_ROAS") {
            if let Ok(parsed) = value.parse::<f64>() {
                self.portfolio.strong_roas = parsed;
            }
        }
        if let Ok(value) = env::var("ANALYSIS_SCALE_ROAS") {
            if let Ok(parsed) = value.parse::<f64>() {
                self.strategy.scale_roas = parsed;
            }
        }
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create config dir: {}", err))?;
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| format!("failed to serialize config: {}", err))?;
        std::fs::write(path, payload).map_err(|err| format!("failed to write config: {}", err))?;
        Ok(())
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("ANALYSIS_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/analysis.toml")))
}
