use chrono::{DateTime, TimeZone, Utc};

use creative_pulse::config::AnalysisConfig;
use creative_pulse::signals::SignalKind;
use creative_pulse::status::{FatigueStatus, MomentumType};
use creative_pulse::{
    analyze, AnalysisInput, AssetDescriptor, AssetSnapshot, CompetitorAsset, ConfidenceLevel,
    InputError, OrganicMetricPoint, PaidMetricPoint, Severity, SourceAvailability,
};

fn ts(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).unwrap()
}

fn paid_point(day: u32, ctr: f64, roas: f64, frequency: f64) -> PaidMetricPoint {
    PaidMetricPoint {
        timestamp: ts(day),
        spend: 500.0,
        impressions: 60_000.0,
        ctr,
        roas,
        frequency,
    }
}

fn organic_point(day: u32, views: f64, engagements: f64, velocity: f64) -> OrganicMetricPoint {
    OrganicMetricPoint {
        timestamp: ts(day),
        views,
        likes: engagements * 0.6,
        comments: engagements * 0.1,
        shares: engagements * 0.3,
        watch_time_seconds: views * 4.0,
        velocity,
    }
}

fn descriptor(id: &str, platform: &str, cluster: &str, tags: &[&str], moment: f64) -> AssetDescriptor {
    AssetDescriptor {
        id: id.to_string(),
        name: id.to_string(),
        format: "video".to_string(),
        platform: platform.to_string(),
        cluster_id: cluster.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        moment_alignment: moment,
    }
}

fn healthy_paid_asset(id: &str) -> AssetSnapshot {
    AssetSnapshot {
        descriptor: descriptor(id, "meta", "launch", &["ugc"], 0.2),
        paid: vec![
            paid_point(1, 2.0, 3.5, 2.0),
            paid_point(2, 2.0, 3.6, 2.1),
            paid_point(3, 2.1, 3.5, 2.0),
            paid_point(4, 2.0, 3.6, 2.1),
            paid_point(5, 2.1, 3.7, 2.0),
            paid_point(6, 2.0, 3.6, 2.1),
        ],
        organic: Vec::new(),
    }
}

fn fatigued_paid_asset(id: &str) -> AssetSnapshot {
    AssetSnapshot {
        descriptor: descriptor(id, "meta", "launch", &["meme"], 0.1),
        paid: vec![
            paid_point(1, 2.0, 3.0, 2.5),
            paid_point(2, 1.8, 2.6, 3.2),
            paid_point(3, 1.4, 2.2, 4.0),
            paid_point(4, 0.8, 1.5, 4.8),
            paid_point(5, 0.7, 1.4, 5.0),
        ],
        organic: Vec::new(),
    }
}

fn viral_organic_asset(id: &str) -> AssetSnapshot {
    AssetSnapshot {
        descriptor: descriptor(id, "tiktok", "trend", &["ugc", "dance"], 0.3),
        paid: Vec::new(),
        organic: vec![
            organic_point(1, 10_000.0, 100.0, 8.6),
            organic_point(2, 80_000.0, 600.0, 8.8),
        ],
    }
}

fn moment_asset(id: &str) -> AssetSnapshot {
    AssetSnapshot {
        descriptor: descriptor(id, "tiktok", "trend", &["meme"], 0.9),
        paid: Vec::new(),
        organic: vec![
            organic_point(1, 5_000.0, 80.0, 6.0),
            organic_point(2, 6_000.0, 100.0, 6.2),
        ],
    }
}

fn full_sources() -> SourceAvailability {
    SourceAvailability {
        paid_metrics: true,
        organic_metrics: true,
        competitor_snapshot: true,
        creative_tags: true,
        spend_history: true,
        audience_insights: true,
    }
}

fn portfolio_input() -> AnalysisInput {
    AnalysisInput {
        assets: vec![
            healthy_paid_asset("hero_video"),
            fatigued_paid_asset("retarget_banner"),
            viral_organic_asset("duet_challenge"),
            moment_asset("award_night_cut"),
        ],
        competitors: Some(vec![
            CompetitorAsset {
                id: "comp_1".to_string(),
                tags: vec!["ugc".to_string()],
            },
            CompetitorAsset {
                id: "comp_2".to_string(),
                tags: vec!["meme".to_string(), "meme_remix".to_string()],
            },
        ]),
        sources: full_sources(),
    }
}

#[test]
fn every_asset_gets_exactly_one_category() {
    let config = AnalysisConfig::default();
    let report = analyze(&portfolio_input(), &config).unwrap();

    assert_eq!(report.classified.len(), 4);
    let mut ids: Vec<&str> = report.classified.iter().map(|c| c.asset_id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 4);

    let counts = report.category_counts;
    assert_eq!(
        counts.organic_first + counts.paid_first + counts.dual_use + counts.moment_only,
        4
    );
}

#[test]
fn pipeline_is_idempotent() {
    let config = AnalysisConfig::default();
    let input = portfolio_input();

    let first = serde_json::to_string(&analyze(&input, &config).unwrap()).unwrap();
    let second = serde_json::to_string(&analyze(&input, &config).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn actions_come_out_sorted_by_priority_then_confidence() {
    let config = AnalysisConfig::default();
    let report = analyze(&portfolio_input(), &config).unwrap();
    assert!(!report.actions.is_empty());

    let ranks: Vec<(creative_pulse::actions::Priority, ConfidenceLevel)> = report
        .actions
        .iter()
        .map(|a| (a.priority, a.confidence_level))
        .collect();
    for pair in ranks.windows(2) {
        assert!(pair[0] >= pair[1], "actions out of order: {:?}", ranks);
    }
}

#[test]
fn single_point_series_detects_nothing_and_never_crashes() {
    let config = AnalysisConfig::default();
    let input = AnalysisInput {
        assets: vec![AssetSnapshot {
            descriptor: descriptor("short_lived", "meta", "launch", &[], 0.0),
            paid: vec![paid_point(1, 2.0, 3.0, 2.0)],
            organic: vec![organic_point(1, 1_000.0, 50.0, 5.0)],
        }],
        competitors: None,
        sources: SourceAvailability::default(),
    };

    let report = analyze(&input, &config).unwrap();
    let asset = &report.assets[0];

    let fatigue = asset.fatigue.as_ref().unwrap();
    assert_eq!(fatigue.status, FatigueStatus::Healthy);
    assert!(fatigue.signals.iter().all(|s| !s.detected));
    assert!(fatigue
        .signals
        .iter()
        .all(|s| s.description.contains("insufficient data")));

    let momentum = asset.momentum.as_ref().unwrap();
    assert!(momentum.signals.iter().all(|s| !s.detected));
}

#[test]
fn frequency_spike_is_high_severity_but_alone_stays_early_warning() {
    let config = AnalysisConfig::default();
    let input = AnalysisInput {
        assets: vec![AssetSnapshot {
            descriptor: descriptor("spiking", "meta", "launch", &[], 0.0),
            // frequency 2.0 -> 4.8 is +140%; CTR and ROAS barely move.
            paid: vec![paid_point(1, 6.0, 5.0, 2.0), paid_point(2, 5.8, 4.9, 4.8)],
            organic: Vec::new(),
        }],
        competitors: None,
        sources: SourceAvailability::default(),
    };

    let report = analyze(&input, &config).unwrap();
    let fatigue = report.assets[0].fatigue.as_ref().unwrap();

    let saturation = fatigue
        .signals
        .iter()
        .find(|s| s.kind == SignalKind::FrequencySaturation)
        .unwrap();
    assert!(saturation.detected);
    assert_eq!(saturation.severity, Severity::High);

    // One high signal alone is an early warning, not fatigue.
    assert_eq!(fatigue.status, FatigueStatus::EarlyWarning);
}

#[test]
fn accelerating_organic_asset_is_a_viral_candidate() {
    let config = AnalysisConfig::default();
    let input = AnalysisInput {
        assets: vec![viral_organic_asset("duet_challenge")],
        competitors: None,
        sources: SourceAvailability::default(),
    };

    let report = analyze(&input, &config).unwrap();
    let momentum = report.assets[0].momentum.as_ref().unwrap();
    assert_eq!(momentum.momentum, MomentumType::ViralCandidate);
    assert!(momentum.velocity_score > 8.0);
    assert!(momentum.growth_ratio > 5.0);
}

#[test]
fn empty_competitor_snapshot_defaults_market_context_to_aligned() {
    let config = AnalysisConfig::default();
    let mut input = portfolio_input();
    input.competitors = Some(Vec::new());

    let report = analyze(&input, &config).unwrap();
    let market = report.market_context.unwrap();
    assert_eq!(market.confidence, ConfidenceLevel::Low);
    assert_eq!(market.overall_alignment.label(), "aligned");
    assert!(market.tag_presence.is_empty());
}

#[test]
fn adding_sources_never_decreases_completeness() {
    let config = AnalysisConfig::default();
    let mut input = portfolio_input();

    input.sources = SourceAvailability::default();
    let none = analyze(&input, &config).unwrap().confidence.data_completeness;

    input.sources.paid_metrics = true;
    input.sources.organic_metrics = true;
    let some = analyze(&input, &config).unwrap().confidence.data_completeness;

    input.sources = full_sources();
    let all = analyze(&input, &config).unwrap().confidence.data_completeness;

    assert!(none <= some && some <= all);
    assert!((all - 100.0).abs() < 1e-6);
}

#[test]
fn out_of_order_timestamps_are_rejected_at_the_boundary() {
    let config = AnalysisConfig::default();
    let input = AnalysisInput {
        assets: vec![AssetSnapshot {
            descriptor: descriptor("scrambled", "meta", "launch", &[], 0.0),
            paid: vec![paid_point(3, 2.0, 3.0, 2.0), paid_point(1, 2.0, 3.0, 2.0)],
            organic: Vec::new(),
        }],
        competitors: None,
        sources: SourceAvailability::default(),
    };

    let err = analyze(&input, &config).unwrap_err();
    assert!(matches!(err, InputError::OutOfOrderTimestamps { .. }));
}

#[test]
fn negative_metrics_are_rejected_at_the_boundary() {
    let config = AnalysisConfig::default();
    let mut bad = paid_point(1, 2.0, 3.0, 2.0);
    bad.spend = -10.0;
    let input = AnalysisInput {
        assets: vec![AssetSnapshot {
            descriptor: descriptor("negative", "meta", "launch", &[], 0.0),
            paid: vec![bad],
            organic: Vec::new(),
        }],
        competitors: None,
        sources: SourceAvailability::default(),
    };

    let err = analyze(&input, &config).unwrap_err();
    assert!(matches!(err, InputError::NegativeMetric { field: "spend", .. }));
}

#[test]
fn crowded_market_annotates_promotion_without_reordering() {
    let config = AnalysisConfig::default();
    let mut viral = viral_organic_asset("duet_challenge");
    viral.descriptor.tags = vec!["retro_revival".to_string()];
    let mut input = AnalysisInput {
        assets: vec![viral, healthy_paid_asset("hero_video")],
        competitors: None,
        sources: full_sources(),
    };

    let baseline = analyze(&input, &config).unwrap();

    input.competitors = Some(
        (1..=3)
            .map(|n| CompetitorAsset {
                id: format!("comp_{}", n),
                tags: vec!["retro_revival".to_string()],
            })
            .collect(),
    );
    let crowded = analyze(&input, &config).unwrap();

    let promote = crowded
        .actions
        .iter()
        .find(|a| matches!(a.action_type, creative_pulse::actions::ActionType::PromoteOrganic))
        .unwrap();
    let note = promote.risk_note.as_ref().unwrap();
    assert!(note.contains("retro_revival"), "note: {}", note);

    // The overlay annotates; it never moves the ordering or the ids.
    let baseline_ids: Vec<&str> = baseline.actions.iter().map(|a| a.id.as_str()).collect();
    let crowded_ids: Vec<&str> = crowded.actions.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(baseline_ids, crowded_ids);
}

#[test]
fn fatigued_backbone_surfaces_pause_action_first() {
    let config = AnalysisConfig::default();
    let input = AnalysisInput {
        assets: vec![fatigued_paid_asset("retarget_banner")],
        competitors: None,
        sources: SourceAvailability::default(),
    };

    let report = analyze(&input, &config).unwrap();
    let fatigue = report.assets[0].fatigue.as_ref().unwrap();
    assert_eq!(fatigue.status, FatigueStatus::Fatigued);

    let pause = report
        .actions
        .iter()
        .find(|a| matches!(a.action_type, creative_pulse::actions::ActionType::PauseFatigued));
    assert!(pause.is_some(), "expected a pause action: {:?}", report.actions);
    assert_eq!(report.actions[0].priority, creative_pulse::actions::Priority::High);
}
