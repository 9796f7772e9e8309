use crate::config::SignalConfig;
use crate::signals::{windowed_delta, Signal, SignalKind};
use crate::{format_float, OrganicMetricPoint, Severity};

pub fn detect_all(points: &[OrganicMetricPoint], cfg: &SignalConfig) -> Vec<Signal> {
    vec![velocity_drop(points, cfg), presence_change(points, cfg)]
}

pub fn velocity_drop(points: &[OrganicMetricPoint], cfg: &SignalConfig) -> Signal {
    let values: Vec<f64> = points.iter().map(|p| p.velocity).collect();
    let Some(delta) = windowed_delta(&values) else {
        return Signal::insufficient_data(SignalKind::VelocityDrop);
    };

    let decline = delta.decline_pct();
    if decline > cfg.velocity_drop_high_pct && delta.trailing <= cfg.velocity_floor {
        return Signal::detected(
            SignalKind::VelocityDrop,
            Severity::High,
            format!(
                "engagement velocity fell {}% to {} (floor {})",
                format_float(decline, 0),
                format_float(delta.trailing, 1),
                format_float(cfg.velocity_floor, 1)
            ),
        );
    }
    if decline > cfg.velocity_drop_medium_pct {
        return Signal::detected(
            SignalKind::VelocityDrop,
            Severity::Medium,
            format!(
                "engagement velocity declined {}% from {} to {}",
                format_float(decline, 0),
                format_float(delta.reference, 1),
                format_float(delta.trailing, 1)
            ),
        );
    }

    Signal::not_detected(
        SignalKind::VelocityDrop,
        format!(
            "engagement velocity holding at {}",
            format_float(delta.trailing, 1)
        ),
    )
}

pub fn presence_change(points: &[OrganicMetricPoint], cfg: &SignalConfig) -> Signal {
    let values: Vec<f64> = points.iter().map(|p| p.views).collect();
    let Some(delta) = windowed_delta(&values) else {
        return Signal::insufficient_data(SignalKind::PresenceChange);
    };

    let decline = delta.decline_pct();
    if decline > cfg.presence_drop_high_pct {
        return Signal::detected(
            SignalKind::PresenceChange,
            Severity::High,
            format!(
                "view volume dropped {}% from {} to {}",
                format_float(decline, 0),
                format_float(delta.reference, 0),
                format_float(delta.trailing, 0)
            ),
        );
    }
    if decline > cfg.presence_drop_medium_pct {
        return Signal::detected(
            SignalKind::PresenceChange,
            Severity::Medium,
            format!(
                "view volume slipping: down {}% to {}",
                format_float(decline, 0),
                format_float(delta.trailing, 0)
            ),
        );
    }

    Signal::not_detected(
        SignalKind::PresenceChange,
        format!("view volume steady at {}", format_float(delta.trailing, 0)),
    )
}
