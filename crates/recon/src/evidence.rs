use crate::model::{CanonicalPlayer, ClusterConflict, MatchLink, ReconSummary, SourceStats};

/// Compute summary statistics for one run.
pub fn compute_summary(
    players: &[CanonicalPlayer],
    links: &[MatchLink],
    conflicts: &[ClusterConflict],
    sources: &[SourceStats],
) -> ReconSummary {
    let single_source = players.iter().filter(|p| p.single_source).count();

    ReconSummary {
        total_players: players.len(),
        multi_source: players.len() - single_source,
        single_source,
        flagged: players.iter().filter(|p| p.flagged_for_review).count(),
        links: links.len(),
        sub_threshold_links: links.iter().filter(|l| !l.matched && !l.implied).count(),
        conflicts: conflicts.len(),
        rows_skipped: sources.iter().map(|s| s.rows_skipped).sum(),
    }
}
