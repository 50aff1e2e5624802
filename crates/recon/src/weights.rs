use std::collections::{BTreeMap, BTreeSet};

/// Renormalize configured weights over the sources present for one player.
///
/// Each present source's weight is divided by the sum of present weights, so a
/// missing source's share is spread proportionally. Sources absent from
/// `configured` count as zero. Returns `None` when the present weights sum to zero.
pub fn renormalize(
    configured: &BTreeMap<String, f64>,
    present: &BTreeSet<String>,
) -> Option<BTreeMap<String, f64>> {
    let total: f64 = present
        .iter()
        .map(|s| configured.get(s).copied().unwrap_or(0.0))
        .sum();

    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    Some(
        present
            .iter()
            .map(|s| (s.clone(), configured.get(s).copied().unwrap_or(0.0) / total))
            .collect(),
    )
}
