use crate::config::SignalConfig;
use crate::signals::{windowed_delta, Signal, SignalKind};
use crate::{format_float, PaidMetricPoint, Severity};

pub fn detect_all(points: &[PaidMetricPoint], cfg: &SignalConfig) -> Vec<Signal> {
    vec![
        frequency_saturation(points, cfg),
        engagement_decay(points, cfg),
        efficiency_decline(points, cfg),
        spend_efficiency_drop(points, cfg),
    ]
}

pub fn frequency_saturation(points: &[PaidMetricPoint], cfg: &SignalConfig) -> Signal {
    let values: Vec<f64> = points.iter().map(|p| p.frequency).collect();
    let Some(delta) = windowed_delta(&values) else {
        return Signal::insufficient_data(SignalKind::FrequencySaturation);
    };

    if delta.trailing >= cfg.frequency_high {
        return Signal::detected(
            SignalKind::FrequencySaturation,
            Severity::High,
            format!(
                "exposure frequency reached {} (saturation line {}), up {}% from {}",
                format_float(delta.trailing, 1),
                format_float(cfg.frequency_high, 1),
                format_float(delta.change_pct, 0),
                format_float(delta.reference, 1)
            ),
        );
    }

    if delta.trailing >= cfg.frequency_watch && delta.change_pct >= cfg.frequency_rise_pct {
        return Signal::detected(
            SignalKind::FrequencySaturation,
            Severity::Medium,
            format!(
                "exposure frequency climbing toward saturation: {} after a {}% rise",
                format_float(delta.trailing, 1),
                format_float(delta.change_pct, 0)
            ),
        );
    }

    Signal::not_detected(
        SignalKind::FrequencySaturation,
        format!(
            "exposure frequency stable at {}",
            format_float(delta.trailing, 1)
        ),
    )
}

pub fn engagement_decay(points: &[PaidMetricPoint], cfg: &SignalConfig) -> Signal {
    let values: Vec<f64> = points.iter().map(|p| p.ctr).collect();
    let Some(delta) = windowed_delta(&values) else {
        return Signal::insufficient_data(SignalKind::EngagementDecay);
    };

    let decline = delta.decline_pct();
    if decline > cfg.decline_high_pct && delta.trailing < cfg.ctr_floor {
        return Signal::detected(
            SignalKind::EngagementDecay,
            Severity::High,
            format!(
                "CTR fell {}% to {}%, below the {}% floor",
                format_float(decline, 0),
                format_float(delta.trailing, 2),
                format_float(cfg.ctr_floor, 1)
            ),
        );
    }
    if decline > cfg.decline_medium_pct {
        return Signal::detected(
            SignalKind::EngagementDecay,
            Severity::Medium,
            format!(
                "CTR declined {}% from {}% to {}%",
                format_float(decline, 0),
                format_float(delta.reference, 2),
                format_float(delta.trailing, 2)
            ),
        );
    }

    Signal::not_detected(
        SignalKind::EngagementDecay,
        format!("CTR holding at {}%", format_float(delta.trailing, 2)),
    )
}

pub fn efficiency_decline(points: &[PaidMetricPoint], cfg: &SignalConfig) -> Signal {
    let values: Vec<f64> = points.iter().map(|p| p.roas).collect();
    let Some(delta) = windowed_delta(&values) else {
        return Signal::insufficient_data(SignalKind::EfficiencyDecline);
    };

    let decline = delta.decline_pct();
    if decline > cfg.decline_high_pct && delta.trailing < cfg.roas_floor {
        return Signal::detected(
            SignalKind::EfficiencyDecline,
            Severity::High,
            format!(
                "ROAS fell {}% to {}, below the {} floor",
                format_float(decline, 0),
                format_float(delta.trailing, 2),
                format_float(cfg.roas_floor, 1)
            ),
        );
    }
    if decline > cfg.decline_medium_pct {
        return Signal::detected(
            SignalKind::EfficiencyDecline,
            Severity::Medium,
            format!(
                "ROAS declined {}% from {} to {}",
                format_float(decline, 0),
                format_float(delta.reference, 2),
                format_float(delta.trailing, 2)
            ),
        );
    }

    Signal::not_detected(
        SignalKind::EfficiencyDecline,
        format!("ROAS holding at {}", format_float(delta.trailing, 2)),
    )
}

pub fn spend_efficiency_drop(points: &[PaidMetricPoint], cfg: &SignalConfig) -> Signal {
    let costs: Vec<f64> = points.iter().map(cost_per_click).collect();
    let Some(cost_delta) = windowed_delta(&costs) else {
        return Signal::insufficient_data(SignalKind::SpendEfficiencyDrop);
    };
    let roas_values: Vec<f64> = points.iter().map(|p| p.roas).collect();
    let roas_falling = windowed_delta(&roas_values)
        .map(|delta| delta.change_pct < 0.0)
        .unwrap_or(false);

    let rise = cost_delta.change_pct.max(0.0);
    if rise > cfg.decline_high_pct && roas_falling {
        return Signal::detected(
            SignalKind::SpendEfficiencyDrop,
            Severity::High,
            format!(
                "cost per click rose {}% to {} while ROAS is falling",
                format_float(rise, 0),
                format_float(cost_delta.trailing, 2)
            ),
        );
    }
    if rise > cfg.decline_medium_pct {
        return Signal::detected(
            SignalKind::SpendEfficiencyDrop,
            Severity::Medium,
            format!(
                "cost per click rose {}% from {} to {}",
                format_float(rise, 0),
                format_float(cost_delta.reference, 2),
                format_float(cost_delta.trailing, 2)
            ),
        );
    }

    Signal::not_detected(
        SignalKind::SpendEfficiencyDrop,
        format!(
            "spend efficiency stable at {} per click",
            format_float(cost_delta.trailing, 2)
        ),
    )
}

fn cost_per_click(point: &PaidMetricPoint) -> f64 {
    let clicks = point.impressions * point.ctr / 100.0;
    if clicks <= 0.0 {
        return 0.0;
    }
    point.spend / clicks
}
