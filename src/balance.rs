use serde::{Deserialize, Serialize};

use crate::config::BalanceConfig;
use crate::portfolio::{ClassifiedAsset, PortfolioCategory};
use crate::signals::mean;
use crate::status::FatigueStatus;
use crate::{format_float, AssetReport, AssetSnapshot, HealthStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceIndicator {
    pub status: HealthStatus,
    pub value: f64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalBalance {
    pub organic_momentum: BalanceIndicator,
    pub paid_dependency: BalanceIndicator,
    pub cross_platform_stability: BalanceIndicator,
}

pub fn determine_health(value: f64, healthy: f64, watch: f64) -> HealthStatus {
    if value >= healthy {
        HealthStatus::Healthy
    } else if value >= watch {
        HealthStatus::Watch
    } else {
        HealthStatus::Risk
    }
}

pub fn determine_health_inverted(value: f64, low: f64, high: f64) -> HealthStatus {
    if value <= low {
        HealthStatus::Healthy
    } else if value <= high {
        HealthStatus::Watch
    } else {
        HealthStatus::Risk
    }
}

pub fn analyze(
    assets: &[AssetSnapshot],
    reports: &[AssetReport],
    classified: &[ClassifiedAsset],
    cfg: &BalanceConfig,
) -> SignalBalance {
    SignalBalance {
        organic_momentum: organic_momentum(reports, cfg),
        paid_dependency: paid_dependency(classified, cfg),
        cross_platform_stability: cross_platform_stability(assets, reports, cfg),
    }
}

fn organic_momentum(reports: &[AssetReport], cfg: &BalanceConfig) -> BalanceIndicator {
    let velocities: Vec<f64> = reports
        .iter()
        .filter_map(|r| r.momentum.as_ref().map(|m| m.velocity_score))
        .collect();

    if velocities.is_empty() {
        return BalanceIndicator {
            status: HealthStatus::Risk,
            value: 0.0,
            description: "no organic assets with momentum data".to_string(),
        };
    }

    let value = mean(&velocities);
    let status = determine_health(value, cfg.organic_healthy, cfg.organic_watch);
    let description = match status {
        HealthStatus::Healthy => format!(
            "organic engine strong: mean velocity {} across {} assets",
            format_float(value, 1),
            velocities.len()
        ),
        HealthStatus::Watch => format!(
            "organic momentum middling at {}; watch for stalling assets",
            format_float(value, 1)
        ),
        HealthStatus::Risk => format!(
            "organic momentum weak at {}; the portfolio leans on paid reach",
            format_float(value, 1)
        ),
    };

    BalanceIndicator {
        status,
        value,
        description,
    }
}

fn paid_dependency(classified: &[ClassifiedAsset], cfg: &BalanceConfig) -> BalanceIndicator {
    if classified.is_empty() {
        return BalanceIndicator {
            status: HealthStatus::Risk,
            value: 0.0,
            description: "no classified assets".to_string(),
        };
    }

    let dependent = classified
        .iter()
        .filter(|c| {
            matches!(
                c.category,
                PortfolioCategory::PaidFirst | PortfolioCategory::DualUse
            )
        })
        .count();
    let value = dependent as f64 / classified.len() as f64 * 10.0;
    let status = determine_health_inverted(value, cfg.dependency_low, cfg.dependency_high);
    let description = match status {
        HealthStatus::Healthy => format!(
            "paid dependency contained: {} of {} assets lean on paid spend",
            dependent,
            classified.len()
        ),
        HealthStatus::Watch => format!(
            "paid dependency building: {} of {} assets lean on paid spend",
            dependent,
            classified.len()
        ),
        HealthStatus::Risk => format!(
            "paid dependency concentrated: {} of {} assets rely on paid spend",
            dependent,
            classified.len()
        ),
    };

    BalanceIndicator {
        status,
        value,
        description,
    }
}

fn cross_platform_stability(
    assets: &[AssetSnapshot],
    reports: &[AssetReport],
    cfg: &BalanceConfig,
) -> BalanceIndicator {
    let paid_assets = assets.iter().filter(|a| !a.paid.is_empty()).count();
    if paid_assets == 0 {
        return BalanceIndicator {
            status: HealthStatus::Healthy,
            value: 10.0,
            description: "no paid assets to fatigue".to_string(),
        };
    }

    let fatigued = reports
        .iter()
        .filter(|r| {
            r.fatigue
                .as_ref()
                .map(|f| f.status == FatigueStatus::Fatigued)
                .unwrap_or(false)
        })
        .count();
    let fatigued_ratio = fatigued as f64 / paid_assets as f64;
    let value = (1.0 - fatigued_ratio) * 10.0;
    let status = determine_health(value, cfg.stability_healthy, cfg.stability_watch);
    let description = match status {
        HealthStatus::Healthy => format!(
            "paid delivery stable: {} of {} paid assets fatigued",
            fatigued, paid_assets
        ),
        HealthStatus::Watch => format!(
            "fatigue spreading: {} of {} paid assets fatigued",
            fatigued, paid_assets
        ),
        HealthStatus::Risk => format!(
            "fatigue widespread: {} of {} paid assets fatigued",
            fatigued, paid_assets
        ),
    };

    BalanceIndicator {
        status,
        value,
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banding_uses_two_thresholds() {
        assert_eq!(determine_health(7.0, 6.0, 4.0), HealthStatus::Healthy);
        assert_eq!(determine_health(5.0, 6.0, 4.0), HealthStatus::Watch);
        assert_eq!(determine_health(3.9, 6.0, 4.0), HealthStatus::Risk);
    }

    #[test]
    fn inverted_banding_rewards_low_values() {
        assert_eq!(determine_health_inverted(2.0, 4.0, 7.0), HealthStatus::Healthy);
        assert_eq!(determine_health_inverted(5.0, 4.0, 7.0), HealthStatus::Watch);
        assert_eq!(determine_health_inverted(8.0, 4.0, 7.0), HealthStatus::Risk);
    }
}
