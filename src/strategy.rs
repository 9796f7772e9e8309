use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::StrategyConfig;
use crate::signals::mean;
use crate::status::FatigueStatus;
use crate::{format_float, AssetReport, AssetSnapshot, ConfidenceLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternStability {
    Stable,
    Sensitive,
    Volatile,
}

impl PatternStability {
    pub fn label(self) -> &'static str {
        match self {
            PatternStability::Stable => "stable",
            PatternStability::Sensitive => "sensitive",
            PatternStability::Volatile => "volatile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleReliability {
    Reliable,
    Moderate,
    Limited,
}

impl ScaleReliability {
    pub fn label(self) -> &'static str {
        match self {
            ScaleReliability::Reliable => "reliable",
            ScaleReliability::Moderate => "moderate",
            ScaleReliability::Limited => "limited",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyAction {
    Scale,
    Pause,
    RefreshCreative,
    Maintain,
}

impl StrategyAction {
    pub fn label(self) -> &'static str {
        match self {
            StrategyAction::Scale => "scale",
            StrategyAction::Pause => "pause",
            StrategyAction::RefreshCreative => "refresh_creative",
            StrategyAction::Maintain => "maintain",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformInputs {
    pub platform: String,
    pub pattern_stability: PatternStability,
    pub fatigue: Option<FatigueStatus>,
    pub scale_reliability: ScaleReliability,
    pub avg_ctr: Option<f64>,
    pub avg_roas: Option<f64>,
    pub data_points: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformRecommendation {
    pub platform: String,
    pub action: StrategyAction,
    pub rationale: String,
    pub confidence: ConfidenceLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyOutput {
    pub cluster_id: String,
    pub recommendations: Vec<PlatformRecommendation>,
    pub overall_confidence: ConfidenceLevel,
    pub explanation: String,
    pub data_completeness: f64,
}

pub fn evaluate_clusters(
    assets: &[AssetSnapshot],
    reports: &[AssetReport],
    cfg: &StrategyConfig,
) -> Vec<StrategyOutput> {
    let mut clusters: BTreeMap<String, Vec<(&AssetSnapshot, &AssetReport)>> = BTreeMap::new();
    for (asset, report) in assets.iter().zip(reports) {
        let cluster_id = if asset.descriptor.cluster_id.is_empty() {
            "unclustered".to_string()
        } else {
            asset.descriptor.cluster_id.clone()
        };
        clusters.entry(cluster_id).or_default().push((asset, report));
    }

    clusters
        .into_iter()
        .map(|(cluster_id, members)| evaluate_cluster(cluster_id, &members, cfg))
        .collect()
}

fn evaluate_cluster(
    cluster_id: String,
    members: &[(&AssetSnapshot, &AssetReport)],
    cfg: &StrategyConfig,
) -> StrategyOutput {
    let mut platforms: BTreeMap<String, Vec<(&AssetSnapshot, &AssetReport)>> = BTreeMap::new();
    for &(asset, report) in members {
        let platform = if asset.descriptor.platform.is_empty() {
            "unspecified".to_string()
        } else {
            asset.descriptor.platform.clone()
        };
        platforms.entry(platform).or_default().push((asset, report));
    }

    let mut recommendations = Vec::new();
    let mut complete_platforms = 0usize;
    for (platform, platform_members) in &platforms {
        let inputs = derive_inputs(platform.clone(), platform_members, cfg);
        if inputs.fatigue.is_some() && inputs.avg_ctr.is_some() {
            complete_platforms += 1;
        }
        recommendations.push(recommend(&inputs, cfg));
    }

    let overall_confidence = recommendations
        .iter()
        .map(|r| r.confidence)
        .min()
        .unwrap_or(ConfidenceLevel::Low);
    let data_completeness = if platforms.is_empty() {
        0.0
    } else {
        complete_platforms as f64 / platforms.len() as f64 * 100.0
    };

    let explanation = format!(
        "{} platforms evaluated across {} assets; {} with full fatigue and metric coverage",
        platforms.len(),
        members.len(),
        complete_platforms
    );

    StrategyOutput {
        cluster_id,
        recommendations,
        overall_confidence,
        explanation,
        data_completeness,
    }
}

pub fn derive_inputs(
    platform: String,
    members: &[(&AssetSnapshot, &AssetReport)],
    cfg: &StrategyConfig,
) -> PlatformInputs {
    let points: Vec<&crate::PaidMetricPoint> =
        members.iter().flat_map(|(asset, _)| &asset.paid).collect();

    let (avg_ctr, avg_roas) = if points.is_empty() {
        (None, None)
    } else {
        let ctrs: Vec<f64> = points.iter().map(|p| p.ctr).collect();
        let roases: Vec<f64> = points.iter().map(|p| p.roas).collect();
        (Some(mean(&ctrs)), Some(mean(&roases)))
    };

    let pattern_stability = match ctr_variation(&points) {
        Some(cv) if cv <= cfg.stable_cv => PatternStability::Stable,
        Some(cv) if cv <= cfg.sensitive_cv => PatternStability::Sensitive,
        Some(_) => PatternStability::Volatile,
        // Too little data to call the pattern either way.
        None => PatternStability::Sensitive,
    };

    let avg_impressions = if points.is_empty() {
        0.0
    } else {
        mean(&points.iter().map(|p| p.impressions).collect::<Vec<_>>())
    };
    let scale_reliability = if points.len() >= cfg.reliable_points
        && avg_impressions >= cfg.reliable_impressions
    {
        ScaleReliability::Reliable
    } else if points.len() >= cfg.moderate_points {
        ScaleReliability::Moderate
    } else {
        ScaleReliability::Limited
    };

    let fatigue = members
        .iter()
        .filter_map(|(_, report)| report.fatigue.as_ref().map(|f| f.status))
        .fold(None, |worst: Option<FatigueStatus>, status| {
            Some(match worst {
                Some(current) => current.worse(status),
                None => status,
            })
        });

    PlatformInputs {
        platform,
        pattern_stability,
        fatigue,
        scale_reliability,
        avg_ctr,
        avg_roas,
        data_points: points.len(),
    }
}

pub fn recommend(inputs: &PlatformInputs, cfg: &StrategyConfig) -> PlatformRecommendation {
    let confidence = confidence_for(inputs);

    if inputs.fatigue == Some(FatigueStatus::Fatigued) {
        return PlatformRecommendation {
            platform: inputs.platform.clone(),
            action: StrategyAction::Pause,
            rationale: format!(
                "{} delivery is fatigued (CTR {}%, ROAS {} over {} points); pausing protects remaining efficiency",
                inputs.platform,
                format_float(inputs.avg_ctr.unwrap_or(0.0), 2),
                format_float(inputs.avg_roas.unwrap_or(0.0), 2),
                inputs.data_points
            ),
            confidence,
        };
    }

    if inputs.fatigue == Some(FatigueStatus::EarlyWarning) {
        return PlatformRecommendation {
            platform: inputs.platform.clone(),
            action: StrategyAction::RefreshCreative,
            rationale: format!(
                "early decline signals on {} (CTR {}% across {} points); rotate creative before fatigue sets in",
                inputs.platform,
                format_float(inputs.avg_ctr.unwrap_or(0.0), 2),
                inputs.data_points
            ),
            confidence,
        };
    }

    let metrics_clear = inputs.avg_roas.map(|r| r >= cfg.scale_roas).unwrap_or(false)
        && inputs.avg_ctr.map(|c| c >= cfg.scale_ctr).unwrap_or(false);
    if inputs.pattern_stability == PatternStability::Stable
        && inputs.scale_reliability == ScaleReliability::Reliable
        && metrics_clear
    {
        return PlatformRecommendation {
            platform: inputs.platform.clone(),
            action: StrategyAction::Scale,
            rationale: format!(
                "{} pattern is stable and reliable at ROAS {} / CTR {}%, clearing the scale gates ({} / {}%)",
                inputs.platform,
                format_float(inputs.avg_roas.unwrap_or(0.0), 2),
                format_float(inputs.avg_ctr.unwrap_or(0.0), 2),
                format_float(cfg.scale_roas, 1),
                format_float(cfg.scale_ctr, 1)
            ),
            confidence,
        };
    }

    let rationale = if inputs.data_points == 0 {
        format!(
            "no paid telemetry for {}; holding position until data arrives",
            inputs.platform
        )
    } else {
        format!(
            "{} pattern {} with {} scale reliability (ROAS {}, CTR {}%); no rule clears, holding",
            inputs.platform,
            inputs.pattern_stability.label(),
            inputs.scale_reliability.label(),
            format_float(inputs.avg_roas.unwrap_or(0.0), 2),
            format_float(inputs.avg_ctr.unwrap_or(0.0), 2)
        )
    };

    PlatformRecommendation {
        platform: inputs.platform.clone(),
        action: StrategyAction::Maintain,
        rationale,
        confidence,
    }
}

pub fn confidence_for(inputs: &PlatformInputs) -> ConfidenceLevel {
    let mut points = 0.0;
    if inputs.fatigue.is_some() {
        points += 1.0;
    }
    if inputs.avg_ctr.is_some() && inputs.avg_roas.is_some() {
        points += 1.0;
    }
    points += match inputs.pattern_stability {
        PatternStability::Stable => 1.0,
        PatternStability::Sensitive => 0.5,
        PatternStability::Volatile => 0.0,
    };
    points += match inputs.scale_reliability {
        ScaleReliability::Reliable => 1.0,
        ScaleReliability::Moderate => 0.5,
        ScaleReliability::Limited => 0.0,
    };

    if points >= 3.0 {
        ConfidenceLevel::High
    } else if points >= 1.5 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

fn ctr_variation(points: &[&crate::PaidMetricPoint]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let values: Vec<f64> = points.iter().map(|p| p.ctr).collect();
    let avg = mean(&values);
    if avg.abs() < f64::EPSILON {
        return None;
    }
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt() / avg)
}
