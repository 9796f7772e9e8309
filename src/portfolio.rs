use serde::{Deserialize, Serialize};

use crate::config::PortfolioConfig;
use crate::signals::mean;
use crate::status::{FatigueStatus, MomentumType};
use crate::{format_float, AssetReport, AssetSnapshot, ConfidenceLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortfolioCategory {
    OrganicFirst,
    PaidFirst,
    DualUse,
    MomentOnly,
}

impl PortfolioCategory {
    pub fn label(self) -> &'static str {
        match self {
            PortfolioCategory::OrganicFirst => "organic_first",
            PortfolioCategory::PaidFirst => "paid_first",
            PortfolioCategory::DualUse => "dual_use",
            PortfolioCategory::MomentOnly => "moment_only",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedAsset {
    pub asset_id: String,
    pub category: PortfolioCategory,
    pub confidence: ConfidenceLevel,
    pub reasoning: String,
}

pub fn classify_all(
    assets: &[AssetSnapshot],
    reports: &[AssetReport],
    cfg: &PortfolioConfig,
) -> Vec<ClassifiedAsset> {
    assets
        .iter()
        .zip(reports)
        .map(|(asset, report)| classify(asset, report, cfg))
        .collect()
}

pub fn classify(asset: &AssetSnapshot, report: &AssetReport, cfg: &PortfolioConfig) -> ClassifiedAsset {
    let id = asset.descriptor.id.clone();
    let has_paid = !asset.paid.is_empty();
    let has_organic = !asset.organic.is_empty();
    let alignment = asset.descriptor.moment_alignment;

    let velocity = report.momentum.as_ref().map(|m| m.velocity_score);
    let fatigue = report.fatigue.as_ref().map(|f| f.status);
    let avg_roas = mean(&asset.paid.iter().map(|p| p.roas).collect::<Vec<_>>());
    let avg_ctr = mean(&asset.paid.iter().map(|p| p.ctr).collect::<Vec<_>>());

    // Rule 1: moment-only.
    if alignment >= cfg.strong_moment_alignment && (!has_paid || !has_organic) {
        return ClassifiedAsset {
            asset_id: id,
            category: PortfolioCategory::MomentOnly,
            confidence: ConfidenceLevel::High,
            reasoning: format!(
                "moment alignment {} exceeds {} and only one channel is active",
                format_float(alignment, 2),
                format_float(cfg.strong_moment_alignment, 2)
            ),
        };
    }

    // Rule 2: organic-first.
    if let Some(velocity) = velocity {
        let paid_weak = !has_paid || fatigue == Some(FatigueStatus::Fatigued);
        if velocity >= cfg.strong_velocity && paid_weak {
            let paid_note = if has_paid {
                "paid channel is fatigued"
            } else {
                "no paid coverage"
            };
            return ClassifiedAsset {
                asset_id: id,
                category: PortfolioCategory::OrganicFirst,
                confidence: ConfidenceLevel::High,
                reasoning: format!(
                    "organic velocity {} clears the {} bar and {}",
                    format_float(velocity, 1),
                    format_float(cfg.strong_velocity, 1),
                    paid_note
                ),
            };
        }
    }

    // Rule 3: paid-first.
    if has_paid && avg_roas >= cfg.strong_roas && avg_ctr >= cfg.strong_ctr {
        let organic_weak = !has_organic || velocity.map(|v| v < cfg.weak_velocity).unwrap_or(true);
        if organic_weak {
            let organic_note = if has_organic {
                format!(
                    "organic velocity {} under the {} floor",
                    format_float(velocity.unwrap_or(0.0), 1),
                    format_float(cfg.weak_velocity, 1)
                )
            } else {
                "no organic traction".to_string()
            };
            return ClassifiedAsset {
                asset_id: id,
                category: PortfolioCategory::PaidFirst,
                confidence: ConfidenceLevel::High,
                reasoning: format!(
                    "ROAS {} and CTR {}% clear the paid bars ({} / {}%) with {}",
                    format_float(avg_roas, 2),
                    format_float(avg_ctr, 2),
                    format_float(cfg.strong_roas, 1),
                    format_float(cfg.strong_ctr, 1),
                    organic_note
                ),
            };
        }
    }

    // Rule 4: dual-use.
    if has_paid && has_organic {
        let paid_healthy = fatigue != Some(FatigueStatus::Fatigued);
        let organic_healthy = report
            .momentum
            .as_ref()
            .map(|m| m.momentum != MomentumType::Decaying)
            .unwrap_or(false);
        if paid_healthy && organic_healthy {
            let confidence = if fatigue == Some(FatigueStatus::Healthy) {
                ConfidenceLevel::High
            } else {
                ConfidenceLevel::Medium
            };
            return ClassifiedAsset {
                asset_id: id,
                category: PortfolioCategory::DualUse,
                confidence,
                reasoning: format!(
                    "both channels active and healthy: paid {} at ROAS {}, organic velocity {}",
                    fatigue.map(|f| f.label()).unwrap_or("healthy"),
                    format_float(avg_roas, 2),
                    format_float(velocity.unwrap_or(0.0), 1)
                ),
            };
        }
    }

    // Rule 5: fallback by available channel.
    fallback(asset, report, avg_roas, velocity)
}

fn fallback(
    asset: &AssetSnapshot,
    report: &AssetReport,
    avg_roas: f64,
    velocity: Option<f64>,
) -> ClassifiedAsset {
    let id = asset.descriptor.id.clone();
    let has_paid = !asset.paid.is_empty();
    let has_organic = !asset.organic.is_empty();
    let fatigue = report.fatigue.as_ref().map(|f| f.status);

    if has_paid && has_organic {
        // Both channels have data but neither cleared an earlier rule;
        // lean on whichever is not currently degraded.
        if fatigue == Some(FatigueStatus::Fatigued) {
            let decaying = report
                .momentum
                .as_ref()
                .map(|m| m.momentum == MomentumType::Decaying)
                .unwrap_or(false);
            if decaying {
                return ClassifiedAsset {
                    asset_id: id,
                    category: PortfolioCategory::OrganicFirst,
                    confidence: ConfidenceLevel::Low,
                    reasoning:
                        "both channels degraded (paid fatigued, organic decaying); defaulting organic-first"
                            .to_string(),
                };
            }
            return ClassifiedAsset {
                asset_id: id,
                category: PortfolioCategory::OrganicFirst,
                confidence: ConfidenceLevel::Medium,
                reasoning: format!(
                    "paid channel fatigued; organic velocity {} carries the asset",
                    format_float(velocity.unwrap_or(0.0), 1)
                ),
            };
        }
        return ClassifiedAsset {
            asset_id: id,
            category: PortfolioCategory::PaidFirst,
            confidence: ConfidenceLevel::Medium,
            reasoning: format!(
                "organic momentum decaying; paid channel at ROAS {} remains serviceable",
                format_float(avg_roas, 2)
            ),
        };
    }

    if has_paid {
        return ClassifiedAsset {
            asset_id: id,
            category: PortfolioCategory::PaidFirst,
            confidence: ConfidenceLevel::Medium,
            reasoning: format!(
                "only paid data available (ROAS {})",
                format_float(avg_roas, 2)
            ),
        };
    }
    if has_organic {
        return ClassifiedAsset {
            asset_id: id,
            category: PortfolioCategory::OrganicFirst,
            confidence: ConfidenceLevel::Medium,
            reasoning: format!(
                "only organic data available (velocity {})",
                format_float(velocity.unwrap_or(0.0), 1)
            ),
        };
    }

    ClassifiedAsset {
        asset_id: id,
        category: PortfolioCategory::OrganicFirst,
        confidence: ConfidenceLevel::Low,
        reasoning: "no channel data available; defaulting to organic-first".to_string(),
    }
}
