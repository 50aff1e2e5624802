use std::collections::{BTreeMap, BTreeSet};

use crate::error::ReconError;
use crate::model::{CanonicalPlayer, SourceRecord};
use crate::weights::renormalize;

/// Placeholder positions some sources give every hitter or pitcher.
const GENERIC_POSITIONS: &[&str] = &["BAT", "PIT"];

/// Records resolved to one player, in source order, plus the scores of the links
/// that joined them.
#[derive(Debug, Clone, Default)]
pub struct LinkedRecords<'a> {
    pub records: Vec<&'a SourceRecord>,
    pub link_scores: Vec<f64>,
}

/// How per-source values become one consensus value.
#[derive(Debug, Clone, Copy)]
pub enum Blend<'w> {
    Weighted(&'w BTreeMap<String, f64>),
    Rank,
}

/// Build one canonical player from its linked records.
pub fn merge(
    linked: &LinkedRecords<'_>,
    blend: Blend<'_>,
    review_threshold: f64,
) -> Result<CanonicalPlayer, ReconError> {
    let first = linked
        .records
        .first()
        .ok_or_else(|| ReconError::Internal("cannot merge an empty record set".into()))?;

    let per_source_values: BTreeMap<String, f64> = linked
        .records
        .iter()
        .map(|r| (r.source_id.clone(), r.metric_value))
        .collect();

    let consensus_value = match blend {
        Blend::Rank => rank_blend(&per_source_values),
        Blend::Weighted(configured) => {
            weighted_blend(&first.raw_name, &per_source_values, configured)?
        }
    };

    let single_source = linked.records.len() < 2;
    let confidence_score = if single_source {
        100.0
    } else {
        linked.link_scores.iter().copied().fold(100.0, f64::min)
    };

    Ok(CanonicalPlayer {
        canonical_name: first.raw_name.clone(),
        team: first_non_empty(&linked.records, |r| &r.team),
        position: specific_position(&linked.records),
        per_source_values,
        consensus_value,
        confidence_score,
        flagged_for_review: single_source || confidence_score < review_threshold,
        single_source,
    })
}

/// Mean of the available ranks. A lone rank is used as-is.
pub fn rank_blend(values: &BTreeMap<String, f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.values().sum::<f64>() / values.len() as f64
}

/// Weighted sum over present sources with weights renormalized to 1.
pub fn weighted_blend(
    player: &str,
    values: &BTreeMap<String, f64>,
    configured: &BTreeMap<String, f64>,
) -> Result<f64, ReconError> {
    let present: BTreeSet<String> = values.keys().cloned().collect();
    let effective = renormalize(configured, &present).ok_or_else(|| ReconError::ZeroWeight {
        player: player.to_string(),
        sources: present.iter().cloned().collect::<Vec<_>>().join(", "),
    })?;

    Ok(values.iter().map(|(s, v)| effective[s] * v).sum())
}

fn first_non_empty<'a>(
    records: &[&'a SourceRecord],
    field: impl Fn(&'a SourceRecord) -> &'a String,
) -> String {
    records
        .iter()
        .map(|r| field(*r).trim())
        .find(|v| !v.is_empty())
        .unwrap_or("")
        .to_string()
}

/// First position that is not a generic placeholder, else the first one at all.
fn specific_position(records: &[&SourceRecord]) -> String {
    records
        .iter()
        .map(|r| r.position.trim())
        .find(|p| !p.is_empty() && !GENERIC_POSITIONS.iter().any(|g| p.eq_ignore_ascii_case(g)))
        .map(str::to_string)
        .unwrap_or_else(|| first_non_empty(records, |r| &r.position))
}
