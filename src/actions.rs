use serde::{Deserialize, Serialize};

use crate::market::MarketContextAnalysis;
use crate::portfolio::{ClassifiedAsset, PortfolioCategory};
use crate::stable_hash64;
use crate::strategy::{StrategyAction, StrategyOutput};
use crate::tension::StrategicTension;
use crate::{AssetReport, AssetSnapshot, ConfidenceLevel, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    PauseFatigued,
    RefreshCreative,
    PromoteOrganic,
    ScaleProven,
    ResolveTension,
    HedgeMoment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextBestAction {
    pub id: String,
    pub title: String,
    pub action_type: ActionType,
    pub target_platforms: Vec<String>,
    pub affected_clusters: Vec<String>,
    pub rationale: String,
    pub confidence_level: ConfidenceLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_note: Option<String>,
    pub priority: Priority,
}

pub fn aggregate(
    assets: &[AssetSnapshot],
    classified: &[ClassifiedAsset],
    reports: &[AssetReport],
    tensions: &[StrategicTension],
    strategies: &[StrategyOutput],
    market: Option<&MarketContextAnalysis>,
) -> Vec<NextBestAction> {
    let mut actions = Vec::new();

    for strategy in strategies {
        for rec in &strategy.recommendations {
            match rec.action {
                StrategyAction::Pause => actions.push(make_action(
                    ActionType::PauseFatigued,
                    format!("Pause fatigued delivery on {}", rec.platform),
                    vec![rec.platform.clone()],
                    vec![strategy.cluster_id.clone()],
                    rec.rationale.clone(),
                    rec.confidence,
                    Some("reach drops immediately while replacement creative spins up".to_string()),
                    Priority::High,
                )),
                StrategyAction::RefreshCreative => actions.push(make_action(
                    ActionType::RefreshCreative,
                    format!("Refresh creative on {}", rec.platform),
                    vec![rec.platform.clone()],
                    vec![strategy.cluster_id.clone()],
                    rec.rationale.clone(),
                    rec.confidence,
                    None,
                    Priority::Medium,
                )),
                StrategyAction::Scale | StrategyAction::Maintain => {}
            }
        }
    }

    for asset in classified {
        if asset.category == PortfolioCategory::OrganicFirst
            && asset.confidence == ConfidenceLevel::High
        {
            let velocity = reports
                .iter()
                .find(|r| r.asset_id == asset.asset_id)
                .and_then(|r| r.momentum.as_ref())
                .map(|m| m.velocity_score)
                .unwrap_or(0.0);
            actions.push(make_action(
                ActionType::PromoteOrganic,
                format!("Put paid spend behind {}", asset.asset_id),
                Vec::new(),
                Vec::new(),
                format!(
                    "organic-first at velocity {:.1} with high classification confidence: {}",
                    velocity, asset.reasoning
                ),
                asset.confidence,
                crowded_tag_note(assets, &asset.asset_id, market),
                Priority::Medium,
            ));
        }
    }

    for strategy in strategies {
        for rec in &strategy.recommendations {
            if rec.action == StrategyAction::Scale && rec.confidence == ConfidenceLevel::High {
                actions.push(make_action(
                    ActionType::ScaleProven,
                    format!("Scale proven delivery on {}", rec.platform),
                    vec![rec.platform.clone()],
                    vec![strategy.cluster_id.clone()],
                    rec.rationale.clone(),
                    rec.confidence,
                    saturation_note(market),
                    Priority::High,
                ));
            }
        }
    }

    for tension in tensions {
        if tension.severity == Severity::High {
            actions.push(make_action(
                ActionType::ResolveTension,
                tension.title.clone(),
                Vec::new(),
                Vec::new(),
                tension.why_it_matters.clone(),
                ConfidenceLevel::Medium,
                Some(tension.what_to_watch.clone()),
                Priority::High,
            ));
        }
    }

    for asset in classified {
        if asset.category == PortfolioCategory::MomentOnly {
            actions.push(make_action(
                ActionType::HedgeMoment,
                format!("Hedge moment exposure on {}", asset.asset_id),
                Vec::new(),
                Vec::new(),
                format!(
                    "moment-only classification leaves no durable channel: {}",
                    asset.reasoning
                ),
                asset.confidence,
                Some("moment reach evaporates when the cultural window closes".to_string()),
                Priority::Medium,
            ));
        }
    }

    // Stable sort keeps insertion order on ties.
    actions.sort_by(|a, b| {
        (b.priority, b.confidence_level).cmp(&(a.priority, a.confidence_level))
    });
    actions
}

fn crowded_tag_note(
    assets: &[AssetSnapshot],
    asset_id: &str,
    market: Option<&MarketContextAnalysis>,
) -> Option<String> {
    let market = market?;
    let tags = &assets
        .iter()
        .find(|a| a.descriptor.id == asset_id)?
        .descriptor
        .tags;
    let crowded: Vec<&str> = tags
        .iter()
        .filter(|tag| market.overrepresented_tags.contains(*tag))
        .map(String::as_str)
        .collect();
    if crowded.is_empty() {
        return None;
    }
    Some(format!(
        "competitors are heavy on {}; paid reach here may cost more than usual",
        crowded.join(", ")
    ))
}

fn saturation_note(market: Option<&MarketContextAnalysis>) -> Option<String> {
    market
        .filter(|m| m.saturation_risk == Severity::High)
        .map(|_| "market reads crowded; scaled spend competes for saturated attention".to_string())
}

#[allow(clippy::too_many_arguments)]
fn make_action(
    action_type: ActionType,
    title: String,
    target_platforms: Vec<String>,
    affected_clusters: Vec<String>,
    rationale: String,
    confidence_level: ConfidenceLevel,
    risk_note: Option<String>,
    priority: Priority,
) -> NextBestAction {
    let payload = format!(
        "{:?}|{}|{}|{}",
        action_type,
        title,
        target_platforms.join(","),
        affected_clusters.join(",")
    );
    NextBestAction {
        id: format!("act_{:x}", stable_hash64(&payload)),
        title,
        action_type,
        target_platforms,
        affected_clusters,
        rationale,
        confidence_level,
        risk_note,
        priority,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(priority: Priority, confidence: ConfidenceLevel, title: &str) -> NextBestAction {
        make_action(
            ActionType::ResolveTension,
            title.to_string(),
            Vec::new(),
            Vec::new(),
            "test".to_string(),
            confidence,
            None,
            priority,
        )
    }

    #[test]
    fn sort_is_priority_then_confidence_then_insertion_order() {
        let mut actions = vec![
            action(Priority::Medium, ConfidenceLevel::High, "first_medium"),
            action(Priority::High, ConfidenceLevel::Low, "high_low"),
            action(Priority::Medium, ConfidenceLevel::High, "second_medium"),
            action(Priority::High, ConfidenceLevel::High, "high_high"),
        ];
        actions.sort_by(|a, b| {
            (b.priority, b.confidence_level).cmp(&(a.priority, a.confidence_level))
        });

        let titles: Vec<&str> = actions.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["high_high", "high_low", "first_medium", "second_medium"]
        );
    }

    #[test]
    fn ids_are_stable_for_identical_actions() {
        let a = action(Priority::High, ConfidenceLevel::High, "same");
        let b = action(Priority::High, ConfidenceLevel::High, "same");
        assert_eq!(a.id, b.id);
    }
}
