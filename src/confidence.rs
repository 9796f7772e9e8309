use serde::{Deserialize, Serialize};

use crate::portfolio::ClassifiedAsset;
use crate::{ConfidenceLevel, SourceAvailability};

pub const TOTAL_SOURCES: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceAssessment {
    pub overall: ConfidenceLevel,
    pub data_completeness: f64,
    pub signal_consistency: f64,
    pub strategy_reliability: f64,
    pub missing_sources: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn evaluate(
    sources: &SourceAvailability,
    classified: &[ClassifiedAsset],
) -> ConfidenceAssessment {
    let flags = [
        (sources.paid_metrics, "paid_metrics"),
        (sources.organic_metrics, "organic_metrics"),
        (sources.competitor_snapshot, "competitor_snapshot"),
        (sources.creative_tags, "creative_tags"),
        (sources.spend_history, "spend_history"),
        (sources.audience_insights, "audience_insights"),
    ];

    let available = flags.iter().filter(|(present, _)| *present).count();
    let missing_sources: Vec<String> = flags
        .iter()
        .filter(|(present, _)| !present)
        .map(|(_, name)| (*name).to_string())
        .collect();

    let data_completeness = available as f64 / TOTAL_SOURCES as f64 * 100.0;

    let signal_consistency = if classified.is_empty() {
        0.0
    } else {
        let high = classified
            .iter()
            .filter(|c| c.confidence == ConfidenceLevel::High)
            .count();
        high as f64 / classified.len() as f64 * 100.0
    };

    let strategy_reliability = 0.6 * data_completeness + 0.4 * signal_consistency;

    let overall = if strategy_reliability >= 70.0 && missing_sources.len() <= 1 {
        ConfidenceLevel::High
    } else if strategy_reliability >= 50.0 && missing_sources.len() <= 3 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    };

    let mut warnings = Vec::new();
    if !sources.competitor_snapshot {
        warnings.push("competitor snapshot unavailable; market context will be skipped".to_string());
    }
    if !sources.paid_metrics {
        warnings.push("paid metrics unavailable; fatigue signals degrade to defaults".to_string());
    }
    if !sources.organic_metrics {
        warnings.push("organic metrics unavailable; momentum signals degrade to defaults".to_string());
    }

    ConfidenceAssessment {
        overall,
        data_completeness,
        signal_consistency,
        strategy_reliability,
        missing_sources,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_sources() -> SourceAvailability {
        SourceAvailability {
            paid_metrics: true,
            organic_metrics: true,
            competitor_snapshot: true,
            creative_tags: true,
            spend_history: true,
            audience_insights: true,
        }
    }

    #[test]
    fn full_sources_yield_full_completeness() {
        let assessment = evaluate(&all_sources(), &[]);
        assert!((assessment.data_completeness - 100.0).abs() < 1e-6);
        assert!(assessment.missing_sources.is_empty());
    }

    #[test]
    fn completeness_is_monotonic_in_available_sources() {
        let mut sources = SourceAvailability::default();
        let mut previous = evaluate(&sources, &[]).data_completeness;

        sources.paid_metrics = true;
        let step = evaluate(&sources, &[]).data_completeness;
        assert!(step >= previous);
        previous = step;

        sources.organic_metrics = true;
        sources.creative_tags = true;
        let step = evaluate(&sources, &[]).data_completeness;
        assert!(step >= previous);
    }

    #[test]
    fn warnings_come_only_from_availability_flags() {
        let assessment = evaluate(&all_sources(), &[]);
        assert!((assessment.signal_consistency - 0.0).abs() < 1e-6);
        assert!(assessment.warnings.is_empty());

        let mut sources = all_sources();
        sources.competitor_snapshot = false;
        let assessment = evaluate(&sources, &[]);
        assert_eq!(assessment.warnings.len(), 1);
        assert!(assessment.warnings[0].contains("competitor snapshot"));
    }

    #[test]
    fn overall_bands_follow_reliability_and_missing_count() {
        // All sources but no assets: reliability lands at 60, under the high bar.
        let assessment = evaluate(&all_sources(), &[]);
        assert_eq!(assessment.overall, ConfidenceLevel::Medium);

        let sparse = evaluate(&SourceAvailability::default(), &[]);
        assert_eq!(sparse.overall, ConfidenceLevel::Low);
    }
}
