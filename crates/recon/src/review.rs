use ordered_float::OrderedFloat;

use crate::model::CanonicalPlayer;

/// Flagged players, least confident first. Equal scores keep table order.
pub fn flag(players: &[CanonicalPlayer]) -> Vec<CanonicalPlayer> {
    let mut flagged: Vec<CanonicalPlayer> = players
        .iter()
        .filter(|p| p.flagged_for_review)
        .cloned()
        .collect();
    flagged.sort_by_key(|p| OrderedFloat(p.confidence_score));
    flagged
}
