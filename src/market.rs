use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::MarketConfig;
use crate::{AssetSnapshot, CompetitorAsset, ConfidenceLevel, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketAlignment {
    Aligned,
    Crowded,
    Divergent,
}

impl MarketAlignment {
    pub fn label(self) -> &'static str {
        match self {
            MarketAlignment::Aligned => "aligned",
            MarketAlignment::Crowded => "crowded",
            MarketAlignment::Divergent => "divergent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagPosition {
    Underrepresented,
    Aligned,
    Overrepresented,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagPresence {
    pub tag: String,
    pub presence_ratio: f64,
    pub position: TagPosition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketContextAnalysis {
    pub overall_alignment: MarketAlignment,
    pub overrepresented_tags: Vec<String>,
    pub underrepresented_tags: Vec<String>,
    pub tag_presence: Vec<TagPresence>,
    pub saturation_risk: Severity,
    pub divergence_risk: Severity,
    pub confidence: ConfidenceLevel,
}

pub fn analyze(
    assets: &[AssetSnapshot],
    competitors: &[CompetitorAsset],
    cfg: &MarketConfig,
) -> MarketContextAnalysis {
    let internal_total = assets.len();
    let competitor_total = competitors.len();

    if internal_total == 0 || competitor_total == 0 {
        return MarketContextAnalysis {
            overall_alignment: MarketAlignment::Aligned,
            overrepresented_tags: Vec::new(),
            underrepresented_tags: Vec::new(),
            tag_presence: Vec::new(),
            saturation_risk: Severity::Low,
            divergence_risk: Severity::Low,
            confidence: ConfidenceLevel::Low,
        };
    }

    let internal_freq = tag_frequencies(assets.iter().map(|a| &a.descriptor.tags));
    let competitor_freq = tag_frequencies(competitors.iter().map(|c| &c.tags));

    // BTreeMap union keeps tag order deterministic.
    let mut tags: BTreeMap<&str, ()> = BTreeMap::new();
    for tag in internal_freq.keys().chain(competitor_freq.keys()) {
        tags.insert(*tag, ());
    }

    let mut tag_presence = Vec::new();
    let mut overrepresented_tags = Vec::new();
    let mut underrepresented_tags = Vec::new();
    for (tag, ()) in tags {
        let internal_share =
            *internal_freq.get(tag).unwrap_or(&0) as f64 / internal_total as f64;
        let competitor_share =
            *competitor_freq.get(tag).unwrap_or(&0) as f64 / competitor_total as f64;

        let (presence_ratio, position) = if internal_share <= 0.0 {
            // Competitors use the tag, we never do. Capped sentinel
            // keeps the ratio finite and JSON-safe.
            (100.0, TagPosition::Overrepresented)
        } else {
            let ratio = competitor_share / internal_share;
            let position = if ratio < cfg.underrepresented_ratio {
                TagPosition::Underrepresented
            } else if ratio > cfg.overrepresented_ratio {
                TagPosition::Overrepresented
            } else {
                TagPosition::Aligned
            };
            (ratio, position)
        };

        match position {
            TagPosition::Overrepresented => overrepresented_tags.push(tag.to_string()),
            TagPosition::Underrepresented => underrepresented_tags.push(tag.to_string()),
            TagPosition::Aligned => {}
        }
        tag_presence.push(TagPresence {
            tag: tag.to_string(),
            presence_ratio,
            position,
        });
    }

    let tag_count = tag_presence.len().max(1);
    let over_share = overrepresented_tags.len() as f64 / tag_count as f64;
    let under_share = underrepresented_tags.len() as f64 / tag_count as f64;

    let overall_alignment = if over_share >= cfg.alignment_share && over_share >= under_share {
        MarketAlignment::Crowded
    } else if under_share >= cfg.alignment_share {
        MarketAlignment::Divergent
    } else {
        MarketAlignment::Aligned
    };

    MarketContextAnalysis {
        overall_alignment,
        overrepresented_tags,
        underrepresented_tags,
        tag_presence,
        saturation_risk: risk_band(over_share),
        divergence_risk: risk_band(under_share),
        confidence: confidence_for(competitor_total, cfg),
    }
}

pub fn confidence_for(competitor_assets: usize, cfg: &MarketConfig) -> ConfidenceLevel {
    if competitor_assets >= cfg.high_sample {
        ConfidenceLevel::High
    } else if competitor_assets >= cfg.medium_sample {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

fn risk_band(share: f64) -> Severity {
    if share > 0.5 {
        Severity::High
    } else if share > 0.25 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

fn tag_frequencies<'a>(
    tag_lists: impl Iterator<Item = &'a Vec<String>>,
) -> BTreeMap<&'a str, usize> {
    let mut freq: BTreeMap<&str, usize> = BTreeMap::new();
    for tags in tag_lists {
        for tag in tags {
            *freq.entry(tag.as_str()).or_insert(0) += 1;
        }
    }
    freq
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AssetDescriptor;

    fn asset(id: &str, tags: &[&str]) -> AssetSnapshot {
        AssetSnapshot {
            descriptor: AssetDescriptor {
                id: id.to_string(),
                name: String::new(),
                format: String::new(),
                platform: String::new(),
                cluster_id: String::new(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                moment_alignment: 0.0,
            },
            paid: Vec::new(),
            organic: Vec::new(),
        }
    }

    fn competitor(id: &str, tags: &[&str]) -> CompetitorAsset {
        CompetitorAsset {
            id: id.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn empty_sides_default_to_aligned_low_confidence() {
        let cfg = MarketConfig::default();
        let analysis = analyze(&[], &[], &cfg);
        assert_eq!(analysis.overall_alignment, MarketAlignment::Aligned);
        assert_eq!(analysis.confidence, ConfidenceLevel::Low);
        assert!(analysis.tag_presence.is_empty());
    }

    #[test]
    fn matched_shares_read_as_aligned() {
        let cfg = MarketConfig::default();
        let internal = vec![asset("a", &["ugc"]), asset("b", &["ugc"])];
        let comps = vec![competitor("c1", &["ugc"]), competitor("c2", &["ugc"])];
        let analysis = analyze(&internal, &comps, &cfg);
        assert_eq!(analysis.overall_alignment, MarketAlignment::Aligned);
        assert_eq!(analysis.tag_presence[0].position, TagPosition::Aligned);
        assert!((analysis.tag_presence[0].presence_ratio - 1.0).abs() < 1e-6);
    }

    #[test]
    fn competitor_only_tag_is_overrepresented() {
        let cfg = MarketConfig::default();
        let internal = vec![asset("a", &["ugc"])];
        let comps = vec![competitor("c1", &["meme"])];
        let analysis = analyze(&internal, &comps, &cfg);
        assert!(analysis
            .overrepresented_tags
            .contains(&"meme".to_string()));
    }

    #[test]
    fn confidence_tracks_competitor_sample_only() {
        let cfg = MarketConfig::default();
        assert_eq!(confidence_for(12, &cfg), ConfidenceLevel::High);
        assert_eq!(confidence_for(7, &cfg), ConfidenceLevel::Medium);
        assert_eq!(confidence_for(2, &cfg), ConfidenceLevel::Low);
    }
}
