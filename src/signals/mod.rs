pub mod organic;
pub mod paid;

use serde::{Deserialize, Serialize};

use crate::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    FrequencySaturation,
    EngagementDecay,
    EfficiencyDecline,
    SpendEfficiencyDrop,
    VelocityDrop,
    PresenceChange,
}

impl SignalKind {
    pub fn id(self) -> &'static str {
        match self {
            SignalKind::FrequencySaturation => "frequency_saturation",
            SignalKind::EngagementDecay => "engagement_decay",
            SignalKind::EfficiencyDecline => "efficiency_decline",
            SignalKind::SpendEfficiencyDrop => "spend_efficiency_drop",
            SignalKind::VelocityDrop => "velocity_drop",
            SignalKind::PresenceChange => "presence_change",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub kind: SignalKind,
    pub severity: Severity,
    pub detected: bool,
    pub description: String,
}

impl Signal {
    pub fn not_detected(kind: SignalKind, description: String) -> Self {
        Self {
            id: kind.id().to_string(),
            kind,
            severity: Severity::Low,
            detected: false,
            description,
        }
    }

    pub fn detected(kind: SignalKind, severity: Severity, description: String) -> Self {
        Self {
            id: kind.id().to_string(),
            kind,
            severity,
            detected: true,
            description,
        }
    }

    pub fn insufficient_data(kind: SignalKind) -> Self {
        Self::not_detected(
            kind,
            "insufficient data: at least 2 points required".to_string(),
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WindowDelta {
    pub reference: f64,
    pub trailing: f64,
    pub change_pct: f64,
}

impl WindowDelta {
    pub fn decline_pct(&self) -> f64 {
        (-self.change_pct).max(0.0)
    }
}

pub fn windowed_delta(values: &[f64]) -> Option<WindowDelta> {
    if values.len() < 2 {
        return None;
    }

    let trailing_len = if values.len() >= 4 { 2 } else { 1 };
    let split = values.len() - trailing_len;
    let reference_start = split.saturating_sub(4);

    let trailing = mean(&values[split..]);
    let reference = mean(&values[reference_start..split]);

    let change_pct = if reference.abs() < f64::EPSILON {
        0.0
    } else {
        (trailing - reference) / reference * 100.0
    };

    Some(WindowDelta {
        reference,
        trailing,
        change_pct,
    })
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_point_yields_no_delta() {
        assert!(windowed_delta(&[3.0]).is_none());
        assert!(windowed_delta(&[]).is_none());
    }

    #[test]
    fn two_points_compare_last_against_first() {
        let delta = windowed_delta(&[2.0, 4.8]).unwrap();
        assert!((delta.reference - 2.0).abs() < 1e-6);
        assert!((delta.trailing - 4.8).abs() < 1e-6);
        assert!((delta.change_pct - 140.0).abs() < 1e-6);
    }

    #[test]
    fn long_series_uses_two_point_trailing_window() {
        let delta = windowed_delta(&[1.0, 1.0, 1.0, 1.0, 2.0, 2.0]).unwrap();
        assert!((delta.trailing - 2.0).abs() < 1e-6);
        assert!((delta.reference - 1.0).abs() < 1e-6);
        assert!((delta.change_pct - 100.0).abs() < 1e-6);
    }

    #[test]
    fn zero_reference_does_not_divide_by_zero() {
        let delta = windowed_delta(&[0.0, 5.0]).unwrap();
        assert!((delta.change_pct - 0.0).abs() < 1e-6);
    }

    #[test]
    fn decline_pct_is_positive_for_drops() {
        let delta = windowed_delta(&[4.0, 3.0]).unwrap();
        assert!((delta.decline_pct() - 25.0).abs() < 1e-6);
        let rise = windowed_delta(&[3.0, 4.0]).unwrap();
        assert!((rise.decline_pct() - 0.0).abs() < 1e-6);
    }
}
