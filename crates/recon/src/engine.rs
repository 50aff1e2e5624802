use std::cmp::Reverse;

use ordered_float::OrderedFloat;

use crate::config::{MergePolicy, ReconConfig, SortOrder};
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::matcher::{match_records, similarity};
use crate::merge::{merge, Blend, LinkedRecords};
use crate::model::{
    CanonicalPlayer, ClusterConflict, ConsensusResult, MatchLink, ReconInput, ReconMeta,
    RecordRef, SourceRecord, SourceStats,
};
use crate::review::flag;

/// (table index, record index) into `ReconInput::tables`.
type Member = (usize, usize);

/// Records linked to one player so far. The first member is the anchor that later
/// sources are matched against.
#[derive(Debug)]
struct Cluster {
    members: Vec<Member>,
    link_scores: Vec<f64>,
}

impl Cluster {
    fn seed(member: Member) -> Self {
        Self {
            members: vec![member],
            link_scores: Vec::new(),
        }
    }

    fn anchor(&self) -> Member {
        self.members[0]
    }
}

/// Run reconciliation per config. Returns every canonical player plus the review subset.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ConsensusResult, ReconError> {
    check_tables(config, input)?;
    let threshold = config.review_threshold;

    let record = move |(ti, ri): Member| &input.tables[ti].records[ri];
    let record_ref = move |m: Member| RecordRef::of(record(m), m.1);

    // Source 1 seeds one cluster per record.
    let mut clusters: Vec<Cluster> = (0..input.tables[0].records.len())
        .map(|ri| Cluster::seed((0, ri)))
        .collect();
    let mut links: Vec<MatchLink> = Vec::new();
    let mut conflicts: Vec<ClusterConflict> = Vec::new();

    for (ti, table) in input.tables.iter().enumerate().skip(1) {
        let anchors: Vec<&SourceRecord> = clusters.iter().map(|c| record(c.anchor())).collect();
        let out = match_records(&anchors, &table.records, threshold);

        for a in &out.assignments {
            let incoming: Member = (ti, a.secondary);
            let cluster = &mut clusters[a.primary];

            links.push(MatchLink {
                primary: record_ref(cluster.anchor()),
                secondary: record_ref(incoming),
                similarity_score: a.score,
                matched: a.matched,
                implied: false,
            });

            if !a.matched {
                tracing::warn!(
                    source = %table.source_id,
                    name = %record(incoming).raw_name,
                    candidate = %record(cluster.anchor()).raw_name,
                    score = a.score,
                    "best candidate below review threshold"
                );
                continue;
            }

            // Transitive closure: the newcomer is implicitly linked to every other member.
            for &member in cluster.members.iter().skip(1) {
                let score = similarity(
                    &record(member).normalized_name,
                    &record(incoming).normalized_name,
                );
                let link = MatchLink {
                    primary: record_ref(member),
                    secondary: record_ref(incoming),
                    similarity_score: score,
                    matched: score >= threshold,
                    implied: true,
                };
                if !link.matched {
                    tracing::warn!(
                        player = %record(cluster.anchor()).raw_name,
                        member = %link.primary.name,
                        incoming = %link.secondary.name,
                        score,
                        "cluster conflict"
                    );
                    conflicts.push(ClusterConflict {
                        player: record(cluster.anchor()).raw_name.clone(),
                        link: link.clone(),
                    });
                }
                cluster.link_scores.push(score);
                links.push(link);
            }

            cluster.link_scores.push(a.score);
            cluster.members.push(incoming);
        }

        // Unmatched records start their own clusters so later sources can still reach them.
        for &si in &out.unmatched_secondary {
            clusters.push(Cluster::seed((ti, si)));
        }
    }

    let weights = match config.policy {
        MergePolicy::WeightedBlend => Some(config.weights()?),
        MergePolicy::RankBlend => None,
    };
    let blend = match &weights {
        Some(w) => Blend::Weighted(w),
        None => Blend::Rank,
    };

    let mut players = clusters
        .iter()
        .map(|c| {
            let linked = LinkedRecords {
                records: c.members.iter().map(|&m| record(m)).collect(),
                link_scores: c.link_scores.clone(),
            };
            merge(&linked, blend, threshold)
        })
        .collect::<Result<Vec<CanonicalPlayer>, ReconError>>()?;

    sort_players(&mut players, config.sort_order());
    let review = flag(&players);

    let sources: Vec<SourceStats> = input
        .tables
        .iter()
        .map(|t| SourceStats {
            source_id: t.source_id.clone(),
            rows_loaded: t.records.len(),
            rows_skipped: t.skipped.len(),
            sha256: t.sha256.clone(),
            skipped: t.skipped.clone(),
        })
        .collect();

    let summary = compute_summary(&players, &links, &conflicts, &sources);
    tracing::info!(
        players = summary.total_players,
        multi_source = summary.multi_source,
        flagged = summary.flagged,
        conflicts = summary.conflicts,
        "consensus built"
    );

    Ok(ConsensusResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            metric: config.metric.clone(),
            policy: config.policy,
            review_threshold: threshold,
            sources: config.source_ids(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        sources,
        players,
        review,
        links,
        conflicts,
    })
}

/// Tables must line up with the configured sources, primary first.
fn check_tables(config: &ReconConfig, input: &ReconInput) -> Result<(), ReconError> {
    if input.tables.len() != config.sources.len() {
        return Err(ReconError::ConfigValidation(format!(
            "expected {} source tables, got {}",
            config.sources.len(),
            input.tables.len()
        )));
    }
    for (source, table) in config.sources.iter().zip(&input.tables) {
        if source.id != table.source_id {
            return Err(ReconError::UnknownSource(format!(
                "table '{}' where source '{}' was expected",
                table.source_id, source.id
            )));
        }
    }
    Ok(())
}

/// Stable sort by consensus value; equal values fall back to name, then table order.
fn sort_players(players: &mut [CanonicalPlayer], order: SortOrder) {
    match order {
        SortOrder::Input => {}
        SortOrder::Ascending => players.sort_by(|a, b| {
            (OrderedFloat(a.consensus_value), &a.canonical_name)
                .cmp(&(OrderedFloat(b.consensus_value), &b.canonical_name))
        }),
        SortOrder::Descending => players.sort_by(|a, b| {
            (Reverse(OrderedFloat(a.consensus_value)), &a.canonical_name)
                .cmp(&(Reverse(OrderedFloat(b.consensus_value)), &b.canonical_name))
        }),
    }
}
