use serde::{Deserialize, Serialize};

use crate::config::SignalConfig;
use crate::signals::{paid, Signal};
use crate::{ConfidenceLevel, PaidMetricPoint, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatigueStatus {
    Healthy,
    EarlyWarning,
    Fatigued,
}

impl FatigueStatus {
    pub fn label(self) -> &'static str {
        match self {
            FatigueStatus::Healthy => "healthy",
            FatigueStatus::EarlyWarning => "early_warning",
            FatigueStatus::Fatigued => "fatigued",
        }
    }

    fn rank(self) -> u8 {
        match self {
            FatigueStatus::Healthy => 0,
            FatigueStatus::EarlyWarning => 1,
            FatigueStatus::Fatigued => 2,
        }
    }

    pub fn worse(self, other: FatigueStatus) -> FatigueStatus {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FatigueAssessment {
    pub status: FatigueStatus,
    pub score: f64,
    pub signals: Vec<Signal>,
    pub recommended_action: String,
    pub confidence: ConfidenceLevel,
    pub explanation: String,
}

fn decision_table() -> [(FatigueStatus, fn(usize, usize) -> bool); 4] {
    [
        (FatigueStatus::Fatigued, |high, _| high >= 2),
        (FatigueStatus::Fatigued, |high, medium| high >= 1 && medium >= 1),
        (FatigueStatus::EarlyWarning, |high, medium| medium >= 2 || high >= 1),
        (FatigueStatus::Healthy, |_, _| true),
    ]
}

pub fn status_for(high: usize, medium: usize) -> FatigueStatus {
    for (status, matches) in decision_table() {
        if matches(high, medium) {
            return status;
        }
    }
    FatigueStatus::Healthy
}

pub fn assess(points: &[PaidMetricPoint], cfg: &SignalConfig) -> FatigueAssessment {
    let signals = paid::detect_all(points, cfg);
    let high = count_detected(&signals, Severity::High);
    let medium = count_detected(&signals, Severity::Medium);
    let detected = signals.iter().filter(|s| s.detected).count();

    let status = status_for(high, medium);
    let score = (10.0 - 3.0 * high as f64 - 1.5 * medium as f64).clamp(0.0, 10.0);
    let confidence = confidence_for(points.len(), detected);

    let explanation = match status {
        FatigueStatus::Fatigued => format!(
            "{} high and {} medium severity signals detected across {} data points",
            high,
            medium,
            points.len()
        ),
        FatigueStatus::EarlyWarning => format!(
            "early decline signals present ({} high, {} medium) over {} data points",
            high,
            medium,
            points.len()
        ),
        FatigueStatus::Healthy => format!(
            "no material decline signals over {} data points",
            points.len()
        ),
    };

    FatigueAssessment {
        status,
        score,
        signals,
        recommended_action: recommended_action(status).to_string(),
        confidence,
        explanation,
    }
}

pub fn confidence_for(data_points: usize, detected_signals: usize) -> ConfidenceLevel {
    if data_points >= 4 && detected_signals >= 2 {
        ConfidenceLevel::High
    } else if data_points >= 3 && detected_signals >= 1 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

fn recommended_action(status: FatigueStatus) -> &'static str {
    match status {
        FatigueStatus::Fatigued => "pause delivery and rotate in fresh creative",
        FatigueStatus::EarlyWarning => "refresh creative before the decline compounds",
        FatigueStatus::Healthy => "maintain current flighting",
    }
}

fn count_detected(signals: &[Signal], severity: Severity) -> usize {
    signals
        .iter()
        .filter(|s| s.detected && s.severity == severity)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_high_signals_mean_fatigued() {
        assert_eq!(status_for(2, 0), FatigueStatus::Fatigued);
    }

    #[test]
    fn one_high_one_medium_means_fatigued() {
        assert_eq!(status_for(1, 1), FatigueStatus::Fatigued);
    }

    #[test]
    fn single_high_signal_is_early_warning_not_fatigued() {
        assert_eq!(status_for(1, 0), FatigueStatus::EarlyWarning);
    }

    #[test]
    fn two_medium_signals_are_early_warning() {
        assert_eq!(status_for(0, 2), FatigueStatus::EarlyWarning);
    }

    #[test]
    fn quiet_signal_set_is_healthy() {
        assert_eq!(status_for(0, 0), FatigueStatus::Healthy);
        assert_eq!(status_for(0, 1), FatigueStatus::Healthy);
    }

    #[test]
    fn confidence_bands_follow_sample_size_and_signal_count() {
        assert_eq!(confidence_for(4, 2), ConfidenceLevel::High);
        assert_eq!(confidence_for(3, 1), ConfidenceLevel::Medium);
        assert_eq!(confidence_for(2, 2), ConfidenceLevel::Low);
        assert_eq!(confidence_for(5, 0), ConfidenceLevel::Low);
    }
}
