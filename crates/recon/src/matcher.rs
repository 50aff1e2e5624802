use std::cmp::{Ordering, Reverse};
use std::collections::BTreeSet;

use ordered_float::OrderedFloat;

use crate::model::{MatchLink, RecordRef, SourceRecord};
use crate::normalize::field_key;

// ---------------------------------------------------------------------------
// Similarity
// ---------------------------------------------------------------------------

/// Token-order-independent similarity of two normalized names, 0-100.
///
/// Tokens are sorted before comparison so "ohtani shohei" and "shohei ohtani" score 100.
/// The score is an indel ratio, `200 * lcs / (len_a + len_b)`, so a dropped letter costs
/// less than a substituted one. Scores are rounded to two decimals so threshold comparisons
/// are stable.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = token_sort(a);
    let b = token_sort(b);
    if a == b {
        return 100.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let raw = 200.0 * lcs_len(&a, &b) as f64 / (a.len() + b.len()) as f64;
    (raw * 100.0).round() / 100.0
}

/// Longest common subsequence length, one DP row at a time.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut row = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            row[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                row[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

fn token_sort(name: &str) -> String {
    let mut tokens: Vec<&str> = name.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

// ---------------------------------------------------------------------------
// Candidate pool
// ---------------------------------------------------------------------------

/// Primary records not yet claimed by a secondary record.
///
/// Iterates in input order; a claimed index never comes back.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    remaining: BTreeSet<usize>,
}

impl CandidatePool {
    pub fn new(len: usize) -> Self {
        Self {
            remaining: (0..len).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.remaining.iter().copied()
    }

    pub fn claim(&mut self, index: usize) -> bool {
        self.remaining.remove(&index)
    }

}

// ---------------------------------------------------------------------------
// Tie-break
// ---------------------------------------------------------------------------

/// One scored primary candidate for a secondary record.
///
/// Ordering: higher score wins; on equal score, more agreeing team/position fields
/// win; after that the earlier primary record wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub score: f64,
    pub agreement: u8,
}

impl Candidate {
    fn rank_key(&self) -> (OrderedFloat<f64>, u8, Reverse<usize>) {
        (OrderedFloat(self.score), self.agreement, Reverse(self.index))
    }

    pub fn cmp_preference(&self, other: &Self) -> Ordering {
        self.rank_key().cmp(&other.rank_key())
    }
}

/// Number of non-empty team/position fields that agree between two records.
pub fn field_agreement(a: &SourceRecord, b: &SourceRecord) -> u8 {
    let same = |x: &str, y: &str| {
        let (x, y) = (field_key(x), field_key(y));
        !x.is_empty() && x == y
    };
    same(&a.team, &b.team) as u8 + same(&a.position, &b.position) as u8
}

// ---------------------------------------------------------------------------
// Pair matching
// ---------------------------------------------------------------------------

/// One greedy decision: secondary record `secondary` claimed primary record `primary`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub primary: usize,
    pub secondary: usize,
    pub score: f64,
    pub matched: bool,
}

#[derive(Debug, Default)]
pub struct PairMatchOutput {
    pub assignments: Vec<Assignment>,
    /// Secondary indices without an accepted match (sub-threshold or empty pool).
    pub unmatched_secondary: Vec<usize>,
}

/// Greedy one-to-one assignment of secondary records onto primary records.
///
/// Secondary records are visited in input order. Each one claims its preferred
/// candidate from the pool, even when the score is under `threshold`; such
/// assignments are reported with `matched = false`.
pub fn match_records(
    primary: &[&SourceRecord],
    secondary: &[SourceRecord],
    threshold: f64,
) -> PairMatchOutput {
    let mut pool = CandidatePool::new(primary.len());
    let mut out = PairMatchOutput::default();

    for (si, sec) in secondary.iter().enumerate() {
        let best = pool
            .iter()
            .map(|pi| Candidate {
                index: pi,
                score: similarity(&primary[pi].normalized_name, &sec.normalized_name),
                agreement: field_agreement(primary[pi], sec),
            })
            .max_by(|a, b| a.cmp_preference(b));

        let Some(best) = best else {
            tracing::debug!(name = %sec.raw_name, source = %sec.source_id, "no candidates left");
            out.unmatched_secondary.push(si);
            continue;
        };

        pool.claim(best.index);
        let matched = best.score >= threshold;
        tracing::debug!(
            secondary = %sec.raw_name,
            primary = %primary[best.index].raw_name,
            score = best.score,
            matched,
            "best candidate"
        );

        if !matched {
            out.unmatched_secondary.push(si);
        }
        out.assignments.push(Assignment {
            primary: best.index,
            secondary: si,
            score: best.score,
            matched,
        });
    }

    out
}

/// Match two whole tables. Returns every link (matched or not) and the indices of
/// secondary records left without an accepted match.
pub fn match_tables(
    primary: &[SourceRecord],
    secondary: &[SourceRecord],
    threshold: f64,
) -> (Vec<MatchLink>, Vec<usize>) {
    let anchors: Vec<&SourceRecord> = primary.iter().collect();
    let out = match_records(&anchors, secondary, threshold);

    let links = out
        .assignments
        .iter()
        .map(|a| MatchLink {
            primary: RecordRef::of(&primary[a.primary], a.primary),
            secondary: RecordRef::of(&secondary[a.secondary], a.secondary),
            similarity_score: a.score,
            matched: a.matched,
            implied: false,
        })
        .collect();

    (links, out.unmatched_secondary)
}
