use serde::{Deserialize, Serialize};

use crate::config::TensionConfig;
use crate::portfolio::{ClassifiedAsset, PortfolioCategory};
use crate::status::FatigueStatus;
use crate::{format_float, AssetReport, Severity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategicTension {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub what_is_happening: String,
    pub why_it_matters: String,
    pub what_to_watch: String,
}

pub fn detect(
    reports: &[AssetReport],
    classified: &[ClassifiedAsset],
    cfg: &TensionConfig,
) -> Vec<StrategicTension> {
    let mut tensions = Vec::new();
    if let Some(tension) = unfunded_momentum(reports, classified, cfg) {
        tensions.push(tension);
    }
    if let Some(tension) = fatigue_concentration(reports, classified, cfg) {
        tensions.push(tension);
    }
    if let Some(tension) = moment_dependence(classified, cfg) {
        tensions.push(tension);
    }
    if let Some(tension) = category_concentration(classified, cfg) {
        tensions.push(tension);
    }
    tensions
}

fn unfunded_momentum(
    reports: &[AssetReport],
    classified: &[ClassifiedAsset],
    cfg: &TensionConfig,
) -> Option<StrategicTension> {
    let organic_first: Vec<&ClassifiedAsset> = classified
        .iter()
        .filter(|c| c.category == PortfolioCategory::OrganicFirst)
        .collect();
    if organic_first.is_empty() {
        return None;
    }

    let hot = organic_first
        .iter()
        .filter(|c| {
            reports
                .iter()
                .find(|r| r.asset_id == c.asset_id)
                .and_then(|r| r.momentum.as_ref())
                .map(|m| m.velocity_score > cfg.hot_velocity)
                .unwrap_or(false)
        })
        .count();

    let share = hot as f64 / organic_first.len() as f64;
    if share <= cfg.hot_share {
        return None;
    }

    Some(StrategicTension {
        id: "unfunded_momentum".to_string(),
        title: "Organic momentum outpacing paid coverage".to_string(),
        description: format!(
            "{} of {} organic-first assets run velocity above {}",
            hot,
            organic_first.len(),
            format_float(cfg.hot_velocity, 1)
        ),
        severity: Severity::High,
        what_is_happening: format!(
            "{} organic-first assets are compounding engagement with no paid budget behind them",
            hot
        ),
        why_it_matters: "momentum windows close quickly; unamplified spikes rarely convert reach into durable audience".to_string(),
        what_to_watch: "velocity scores on the hot assets; a decline means the window is closing".to_string(),
    })
}

fn fatigue_concentration(
    reports: &[AssetReport],
    classified: &[ClassifiedAsset],
    cfg: &TensionConfig,
) -> Option<StrategicTension> {
    let paid_reports: Vec<&AssetReport> = reports.iter().filter(|r| r.fatigue.is_some()).collect();
    if paid_reports.is_empty() {
        return None;
    }

    let fatigued = paid_reports
        .iter()
        .filter(|r| {
            r.fatigue
                .as_ref()
                .map(|f| f.status == FatigueStatus::Fatigued)
                .unwrap_or(false)
        })
        .count();
    let share = fatigued as f64 / paid_reports.len() as f64;
    if share < cfg.fatigued_share {
        return None;
    }

    let paid_dependent = classified
        .iter()
        .filter(|c| {
            matches!(
                c.category,
                PortfolioCategory::PaidFirst | PortfolioCategory::DualUse
            )
        })
        .count();

    Some(StrategicTension {
        id: "fatigue_concentration".to_string(),
        title: "Fatigue concentrated in the paid backbone".to_string(),
        description: format!(
            "{} of {} paid assets are fatigued while {} assets depend on paid distribution",
            fatigued,
            paid_reports.len(),
            paid_dependent
        ),
        severity: Severity::High,
        what_is_happening: format!(
            "{}% of the paid slate shows saturation or decay signals",
            format_float(share * 100.0, 0)
        ),
        why_it_matters:
            "a fatigued backbone raises acquisition costs across every paid-dependent asset at once"
                .to_string(),
        what_to_watch: "frequency and CTR trends on the remaining healthy paid assets".to_string(),
    })
}

fn moment_dependence(
    classified: &[ClassifiedAsset],
    cfg: &TensionConfig,
) -> Option<StrategicTension> {
    if classified.is_empty() {
        return None;
    }
    let moment_only = classified
        .iter()
        .filter(|c| c.category == PortfolioCategory::MomentOnly)
        .count();
    let share = moment_only as f64 / classified.len() as f64;
    if share < cfg.moment_share {
        return None;
    }

    Some(StrategicTension {
        id: "moment_dependence".to_string(),
        title: "Portfolio leaning on transient moments".to_string(),
        description: format!(
            "{} of {} assets are classified moment-only ({}% of the portfolio)",
            moment_only,
            classified.len(),
            format_float(share * 100.0, 0)
        ),
        severity: Severity::Medium,
        what_is_happening: "a large slice of reach depends on cultural moments with short shelf lives".to_string(),
        why_it_matters: "when the moments pass, that reach disappears with no evergreen assets to replace it".to_string(),
        what_to_watch: "moment alignment scores decaying week over week".to_string(),
    })
}

fn category_concentration(
    classified: &[ClassifiedAsset],
    cfg: &TensionConfig,
) -> Option<StrategicTension> {
    if classified.is_empty() {
        return None;
    }

    let categories = [
        PortfolioCategory::OrganicFirst,
        PortfolioCategory::PaidFirst,
        PortfolioCategory::DualUse,
        PortfolioCategory::MomentOnly,
    ];
    for category in categories {
        let count = classified.iter().filter(|c| c.category == category).count();
        let share = count as f64 / classified.len() as f64;
        if share >= cfg.dominance_share {
            return Some(StrategicTension {
                id: "category_concentration".to_string(),
                title: "Strategy concentrated in one bucket".to_string(),
                description: format!(
                    "{} of {} assets fall into the {} category",
                    count,
                    classified.len(),
                    category.label()
                ),
                severity: Severity::Medium,
                what_is_happening: format!(
                    "{}% of the portfolio follows a single strategic pattern",
                    format_float(share * 100.0, 0)
                ),
                why_it_matters: "a one-pattern portfolio has a single point of failure when that channel's economics shift".to_string(),
                what_to_watch: format!("entry costs and reach on the {} channel", category.label()),
            });
        }
    }
    None
}
