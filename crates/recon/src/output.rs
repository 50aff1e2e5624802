//! Consensus and review tables as CSV.
//!
//! Columns: `name, team, position, consensus_value, value_<source>..., confidence_score,
//! flagged`. Per-source columns follow configured source order; a source with no value
//! for a player leaves an empty cell. Output depends only on its inputs, so identical
//! runs produce identical bytes.

use crate::error::ReconError;
use crate::model::CanonicalPlayer;

/// Header row for a table over `source_ids`.
pub fn header(source_ids: &[String]) -> Vec<String> {
    let mut cols = vec![
        "name".to_string(),
        "team".to_string(),
        "position".to_string(),
        "consensus_value".to_string(),
    ];
    cols.extend(source_ids.iter().map(|s| format!("value_{s}")));
    cols.push("confidence_score".to_string());
    cols.push("flagged".to_string());
    cols
}

/// Render players as CSV. `decimals` rounds `consensus_value` only.
pub fn write_table(
    players: &[CanonicalPlayer],
    source_ids: &[String],
    decimals: Option<u32>,
) -> Result<String, ReconError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(header(source_ids))
        .map_err(|e| ReconError::Output(e.to_string()))?;

    for p in players {
        let mut record = vec![
            p.canonical_name.clone(),
            p.team.clone(),
            p.position.clone(),
            format_value(p.consensus_value, decimals),
        ];
        for id in source_ids {
            record.push(
                p.per_source_values
                    .get(id)
                    .map(|v| format_value(*v, None))
                    .unwrap_or_default(),
            );
        }
        record.push(format!("{:.2}", p.confidence_score));
        record.push(p.flagged_for_review.to_string());
        writer
            .write_record(&record)
            .map_err(|e| ReconError::Output(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReconError::Output(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReconError::Output(e.to_string()))
}

fn format_value(v: f64, decimals: Option<u32>) -> String {
    match decimals {
        Some(d) => format!("{:.*}", d as usize, v),
        None => v.to_string(),
    }
}
