use serde::{Deserialize, Serialize};

use crate::config::SignalConfig;
use crate::signals::{mean, organic, windowed_delta, Signal, SignalKind};
use crate::{format_float, OrganicMetricPoint, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentumType {
    OrganicSpike,
    SteadyGrowth,
    ViralCandidate,
    Decaying,
}

impl MomentumType {
    pub fn label(self) -> &'static str {
        match self {
            MomentumType::OrganicSpike => "organic_spike",
            MomentumType::SteadyGrowth => "steady_growth",
            MomentumType::ViralCandidate => "viral_candidate",
            MomentumType::Decaying => "decaying",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumAssessment {
    pub momentum: MomentumType,
    pub velocity_score: f64,
    pub growth_ratio: f64,
    pub signals: Vec<Signal>,
    pub explanation: String,
}

pub fn assess(points: &[OrganicMetricPoint], cfg: &SignalConfig) -> MomentumAssessment {
    let signals = organic::detect_all(points, cfg);
    let velocities: Vec<f64> = points.iter().map(|p| p.velocity).collect();
    let velocity_score = mean(&velocities);
    let growth_ratio = engagement_growth_ratio(points);
    let velocity_dropping = signals.iter().any(|s| {
        s.detected && s.kind == SignalKind::VelocityDrop && s.severity == Severity::High
    });

    // Ordered rule table, first match wins. Viral outranks spike;
    // decay outranks steady.
    let momentum = if velocity_score > cfg.viral_velocity && growth_ratio > cfg.viral_growth_ratio {
        MomentumType::ViralCandidate
    } else if growth_ratio > cfg.spike_growth_ratio {
        MomentumType::OrganicSpike
    } else if velocity_dropping || growth_ratio < cfg.decay_growth_ratio {
        MomentumType::Decaying
    } else {
        MomentumType::SteadyGrowth
    };

    let explanation = match momentum {
        MomentumType::ViralCandidate => format!(
            "average velocity {} with engagement growing {}x; breakout territory",
            format_float(velocity_score, 1),
            format_float(growth_ratio, 1)
        ),
        MomentumType::OrganicSpike => format!(
            "engagement jumped {}x against the reference window at velocity {}",
            format_float(growth_ratio, 1),
            format_float(velocity_score, 1)
        ),
        MomentumType::Decaying => format!(
            "engagement trending down (growth ratio {}, velocity {})",
            format_float(growth_ratio, 1),
            format_float(velocity_score, 1)
        ),
        MomentumType::SteadyGrowth => {
            if points.len() < 2 {
                format!(
                    "single observation at velocity {}; defaulting to steady growth",
                    format_float(velocity_score, 1)
                )
            } else {
                format!(
                    "engagement growing steadily ({}x) at velocity {}",
                    format_float(growth_ratio, 1),
                    format_float(velocity_score, 1)
                )
            }
        }
    };

    MomentumAssessment {
        momentum,
        velocity_score,
        growth_ratio,
        signals,
        explanation,
    }
}

fn engagement_growth_ratio(points: &[OrganicMetricPoint]) -> f64 {
    let engagements: Vec<f64> = points.iter().map(OrganicMetricPoint::engagements).collect();
    match windowed_delta(&engagements) {
        Some(delta) if delta.reference > 0.0 => delta.trailing / delta.reference,
        _ => 1.0,
    }
}
