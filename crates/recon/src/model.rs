use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::MergePolicy;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single accepted row from a source CSV.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRecord {
    pub source_id: String,
    pub raw_name: String,
    pub normalized_name: String,
    pub team: String,
    pub position: String,
    pub metric_value: f64,
    /// 1-based data line in the source file (header excluded).
    pub row: usize,
}

/// A row the loader refused, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
}

/// One fully materialized source table.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub source_id: String,
    pub records: Vec<SourceRecord>,
    pub skipped: Vec<SkippedRow>,
    /// SHA-256 of the raw file contents, hex encoded.
    pub sha256: String,
}

/// Pre-loaded tables in configured source order. The first table is the primary.
#[derive(Debug)]
pub struct ReconInput {
    pub tables: Vec<SourceTable>,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Points at one record of one source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRef {
    pub source_id: String,
    pub index: usize,
    pub name: String,
}

impl RecordRef {
    pub fn of(record: &SourceRecord, index: usize) -> Self {
        Self {
            source_id: record.source_id.clone(),
            index,
            name: record.raw_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchLink {
    pub primary: RecordRef,
    pub secondary: RecordRef,
    pub similarity_score: f64,
    pub matched: bool,
    /// Created by transitive closure rather than by the matcher.
    pub implied: bool,
}

// ---------------------------------------------------------------------------
// Consensus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct CanonicalPlayer {
    pub canonical_name: String,
    pub team: String,
    pub position: String,
    pub per_source_values: BTreeMap<String, f64>,
    pub consensus_value: f64,
    pub confidence_score: f64,
    pub flagged_for_review: bool,
    pub single_source: bool,
}

/// Closure link that disagrees with the rest of its cluster.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterConflict {
    pub player: String,
    pub link: MatchLink,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SourceStats {
    pub source_id: String,
    pub rows_loaded: usize,
    pub rows_skipped: usize,
    pub sha256: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub total_players: usize,
    pub multi_source: usize,
    pub single_source: usize,
    pub flagged: usize,
    pub links: usize,
    pub sub_threshold_links: usize,
    pub conflicts: usize,
    pub rows_skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub metric: String,
    pub policy: MergePolicy,
    pub review_threshold: f64,
    pub sources: Vec<String>,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsensusResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub sources: Vec<SourceStats>,
    pub players: Vec<CanonicalPlayer>,
    pub review: Vec<CanonicalPlayer>,
    pub links: Vec<MatchLink>,
    pub conflicts: Vec<ClusterConflict>,
}
