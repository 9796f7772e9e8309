pub mod actions;
pub mod balance;
pub mod confidence;
pub mod config;
pub mod market;
pub mod portfolio;
pub mod signals;
pub mod status;
pub mod strategy;
pub mod tension;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::actions::NextBestAction;
use crate::balance::SignalBalance;
use crate::config::AnalysisConfig;
use crate::confidence::ConfidenceAssessment;
use crate::market::MarketContextAnalysis;
use crate::portfolio::{ClassifiedAsset, PortfolioCategory};
use crate::status::fatigue::FatigueAssessment;
use crate::status::momentum::MomentumAssessment;
use crate::strategy::StrategyOutput;
use crate::tension::StrategicTension;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn label(self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Watch,
    Risk,
}

impl HealthStatus {
    pub fn label(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Watch => "watch",
            HealthStatus::Risk => "risk",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaidMetricPoint {
    pub timestamp: DateTime<Utc>,
    pub spend: f64,
    pub impressions: f64,
    pub ctr: f64,
    pub roas: f64,
    pub frequency: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganicMetricPoint {
    pub timestamp: DateTime<Utc>,
    pub views: f64,
    pub likes: f64,
    pub comments: f64,
    pub shares: f64,
    pub watch_time_seconds: f64,
    pub velocity: f64,
}

impl OrganicMetricPoint {
    pub fn engagements(&self) -> f64 {
        self.likes + self.comments + self.shares
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub moment_alignment: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSnapshot {
    pub descriptor: AssetDescriptor,
    #[serde(default)]
    pub paid: Vec<PaidMetricPoint>,
    #[serde(default)]
    pub organic: Vec<OrganicMetricPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorAsset {
    pub id: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SourceAvailability {
    #[serde(default)]
    pub paid_metrics: bool,
    #[serde(default)]
    pub organic_metrics: bool,
    #[serde(default)]
    pub competitor_snapshot: bool,
    #[serde(default)]
    pub creative_tags: bool,
    #[serde(default)]
    pub spend_history: bool,
    #[serde(default)]
    pub audience_insights: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub assets: Vec<AssetSnapshot>,
    #[serde(default)]
    pub competitors: Option<Vec<CompetitorAsset>>,
    #[serde(default)]
    pub sources: SourceAvailability,
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("duplicate asset id: {asset_id}")]
    DuplicateAssetId { asset_id: String },
    #[error("asset {asset_id}: {channel} timestamps must be strictly ascending")]
    OutOfOrderTimestamps {
        asset_id: String,
        channel: &'static str,
    },
    #[error("asset {asset_id}: {channel} metric {field} is negative ({value})")]
    NegativeMetric {
        asset_id: String,
        channel: &'static str,
        field: &'static str,
        value: f64,
    },
    #[error("asset {asset_id}: {field} must be within {min}..={max} (got {value})")]
    OutOfRange {
        asset_id: String,
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetReport {
    pub asset_id: String,
    pub fatigue: Option<FatigueAssessment>,
    pub momentum: Option<MomentumAssessment>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub organic_first: usize,
    pub paid_first: usize,
    pub dual_use: usize,
    pub moment_only: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub assets: Vec<AssetReport>,
    pub classified: Vec<ClassifiedAsset>,
    pub balance: SignalBalance,
    pub tensions: Vec<StrategicTension>,
    pub confidence: ConfidenceAssessment,
    pub strategies: Vec<StrategyOutput>,
    pub actions: Vec<NextBestAction>,
    pub market_context: Option<MarketContextAnalysis>,
    pub category_counts: CategoryCounts,
    pub action_counts: PriorityCounts,
}

pub fn analyze(
    input: &AnalysisInput,
    config: &AnalysisConfig,
) -> Result<PortfolioReport, InputError> {
    validate_input(input)?;

    let mut reports = Vec::with_capacity(input.assets.len());
    for asset in &input.assets {
        let fatigue = if asset.paid.is_empty() {
            None
        } else {
            Some(status::fatigue::assess(&asset.paid, &config.signals))
        };
        let momentum = if asset.organic.is_empty() {
            None
        } else {
            Some(status::momentum::assess(&asset.organic, &config.signals))
        };
        reports.push(AssetReport {
            asset_id: asset.descriptor.id.clone(),
            fatigue,
            momentum,
        });
    }
    debug!(assets = reports.len(), "asset assessments complete");

    let classified = portfolio::classify_all(&input.assets, &reports, &config.portfolio);
    let balance = balance::analyze(&input.assets, &reports, &classified, &config.balance);
    let tensions = tension::detect(&reports, &classified, &config.tension);
    let confidence = confidence::evaluate(&input.sources, &classified);
    let strategies = strategy::evaluate_clusters(&input.assets, &reports, &config.strategy);
    let market_context = input
        .competitors
        .as_ref()
        .map(|competitors| market::analyze(&input.assets, competitors, &config.market));
    let actions = actions::aggregate(
        &input.assets,
        &classified,
        &reports,
        &tensions,
        &strategies,
        market_context.as_ref(),
    );
    debug!(
        tensions = tensions.len(),
        actions = actions.len(),
        "pipeline synthesis complete"
    );

    let category_counts = count_categories(&classified);
    let action_counts = count_priorities(&actions);

    Ok(PortfolioReport {
        assets: reports,
        classified,
        balance,
        tensions,
        confidence,
        strategies,
        actions,
        market_context,
        category_counts,
        action_counts,
    })
}

fn count_categories(classified: &[ClassifiedAsset]) -> CategoryCounts {
    let mut counts = CategoryCounts::default();
    for asset in classified {
        match asset.category {
            PortfolioCategory::OrganicFirst => counts.organic_first += 1,
            PortfolioCategory::PaidFirst => counts.paid_first += 1,
            PortfolioCategory::DualUse => counts.dual_use += 1,
            PortfolioCategory::MomentOnly => counts.moment_only += 1,
        }
    }
    counts
}

fn count_priorities(actions: &[NextBestAction]) -> PriorityCounts {
    let mut counts = PriorityCounts::default();
    for action in actions {
        match action.priority {
            actions::Priority::High => counts.high += 1,
            actions::Priority::Medium => counts.medium += 1,
            actions::Priority::Low => counts.low += 1,
        }
    }
    counts
}

pub fn validate_input(input: &AnalysisInput) -> Result<(), InputError> {
    let mut seen = std::collections::HashSet::new();
    for asset in &input.assets {
        let id = &asset.descriptor.id;
        if !seen.insert(id.clone()) {
            return Err(InputError::DuplicateAssetId {
                asset_id: id.clone(),
            });
        }

        let alignment = asset.descriptor.moment_alignment;
        if !(0.0..=1.0).contains(&alignment) {
            return Err(InputError::OutOfRange {
                asset_id: id.clone(),
                field: "moment_alignment",
                value: alignment,
                min: 0.0,
                max: 1.0,
            });
        }

        validate_ascending(id, "paid", asset.paid.iter().map(|p| p.timestamp))?;
        validate_ascending(id, "organic", asset.organic.iter().map(|p| p.timestamp))?;

        for point in &asset.paid {
            check_non_negative(id, "paid", "spend", point.spend)?;
            check_non_negative(id, "paid", "impressions", point.impressions)?;
            check_non_negative(id, "paid", "ctr", point.ctr)?;
            check_non_negative(id, "paid", "roas", point.roas)?;
            check_non_negative(id, "paid", "frequency", point.frequency)?;
        }
        for point in &asset.organic {
            check_non_negative(id, "organic", "views", point.views)?;
            check_non_negative(id, "organic", "likes", point.likes)?;
            check_non_negative(id, "organic", "comments", point.comments)?;
            check_non_negative(id, "organic", "shares", point.shares)?;
            check_non_negative(id, "organic", "watch_time_seconds", point.watch_time_seconds)?;
            if !(0.0..=10.0).contains(&point.velocity) {
                return Err(InputError::OutOfRange {
                    asset_id: id.clone(),
                    field: "velocity",
                    value: point.velocity,
                    min: 0.0,
                    max: 10.0,
                });
            }
        }
    }
    Ok(())
}

fn validate_ascending(
    asset_id: &str,
    channel: &'static str,
    timestamps: impl Iterator<Item = DateTime<Utc>>,
) -> Result<(), InputError> {
    let mut previous: Option<DateTime<Utc>> = None;
    for timestamp in timestamps {
        if let Some(prev) = previous {
            if timestamp <= prev {
                return Err(InputError::OutOfOrderTimestamps {
                    asset_id: asset_id.to_string(),
                    channel,
                });
            }
        }
        previous = Some(timestamp);
    }
    Ok(())
}

fn check_non_negative(
    asset_id: &str,
    channel: &'static str,
    field: &'static str,
    value: f64,
) -> Result<(), InputError> {
    if value.is_nan() || value < 0.0 {
        return Err(InputError::NegativeMetric {
            asset_id: asset_id.to_string(),
            channel,
            field,
            value,
        });
    }
    Ok(())
}

pub(crate) fn stable_hash64(value: &str) -> u64 {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}

pub fn format_score(value: f64) -> String {
    format!("{:.1}/10", value)
}

pub fn format_percent(value: f64) -> String {
    format!("{:.0}%", value)
}
