use std::path::Path;

use sha2::{Digest, Sha256};

use crate::config::{ReconConfig, SourceConfig};
use crate::error::ReconError;
use crate::model::{ReconInput, SkippedRow, SourceRecord, SourceTable};
use crate::normalize::normalize;

/// Read and parse every configured source, resolving paths against `base_dir`.
///
/// Fails on the first source that cannot be read; partial inputs are never returned.
pub fn load_sources(config: &ReconConfig, base_dir: &Path) -> Result<ReconInput, ReconError> {
    let mut tables = Vec::with_capacity(config.sources.len());
    for source in &config.sources {
        tables.push(load_source_file(source, base_dir)?);
    }
    Ok(ReconInput { tables })
}

/// Read one source file from disk and parse it.
pub fn load_source_file(source: &SourceConfig, base_dir: &Path) -> Result<SourceTable, ReconError> {
    let path = base_dir.join(&source.file);
    let csv_data = std::fs::read_to_string(&path).map_err(|e| ReconError::SourceUnreadable {
        source_id: source.id.clone(),
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let table = load_csv_rows(source, &csv_data)?;
    tracing::info!(
        source = %source.id,
        path = %path.display(),
        rows = table.records.len(),
        skipped = table.skipped.len(),
        "loaded source"
    );
    Ok(table)
}

/// Parse one source CSV into records, applying the column mapping.
///
/// Rows with an empty name or a missing, non-numeric or non-finite value are
/// skipped and reported; a missing mapped column is fatal.
pub fn load_csv_rows(source: &SourceConfig, csv_data: &str) -> Result<SourceTable, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Header {
            source_id: source.id.clone(),
            message: e.to_string(),
        })?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let col = &source.columns;
    let idx = |name: &str| -> Result<usize, ReconError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ReconError::MissingColumn {
                source_id: source.id.clone(),
                column: name.into(),
            })
    };

    let name_idx = idx(&col.name)?;
    let team_idx = idx(&col.team)?;
    let position_idx = idx(&col.position)?;
    let value_idx = idx(&col.value)?;

    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                skipped.push(SkippedRow { row, reason: e.to_string() });
                continue;
            }
        };

        let field = |fi: usize| record.get(fi).unwrap_or("").trim();

        let raw_name = field(name_idx);
        if raw_name.is_empty() {
            skipped.push(SkippedRow { row, reason: "empty name".into() });
            continue;
        }

        let value_str = field(value_idx);
        let metric_value = match value_str.parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                skipped.push(SkippedRow {
                    row,
                    reason: format!("non-numeric value '{value_str}'"),
                });
                continue;
            }
        };

        records.push(SourceRecord {
            source_id: source.id.clone(),
            raw_name: raw_name.to_string(),
            normalized_name: normalize(raw_name),
            team: field(team_idx).to_string(),
            position: field(position_idx).to_string(),
            metric_value,
            row,
        });
    }

    for s in &skipped {
        tracing::warn!(source = %source.id, row = s.row, reason = %s.reason, "skipped row");
    }

    Ok(SourceTable {
        source_id: source.id.clone(),
        records,
        skipped,
        sha256: format!("{:x}", Sha256::digest(csv_data.as_bytes())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnMapping;

    fn source(id: &str) -> SourceConfig {
        SourceConfig {
            id: id.into(),
            file: format!("{id}.csv"),
            weight: None,
            columns: ColumnMapping::default(),
        }
    }

    #[test]
    fn load_csv_basic() {
        let csv = "\
name,team,position,value
Ronald Acuña Jr.,ATL,OF,1.4
Shohei Ohtani,LAD,DH,2.1
";
        let table = load_csv_rows(&source("fp"), csv).unwrap();
        assert_eq!(table.records.len(), 2);
        assert!(table.skipped.is_empty());
        assert_eq!(table.records[0].normalized_name, "ronald acuna");
        assert_eq!(table.records[0].metric_value, 1.4);
        assert_eq!(table.records[1].row, 2);
        assert_eq!(table.sha256.len(), 64);
    }

    #[test]
    fn load_csv_with_mapping() {
        let csv = "\
Player,Tm,Pos,ADP_ESPN,Extra
Mike Trout,LAA,OF,30.5,x
";
        let mut src = source("espn");
        src.columns = ColumnMapping {
            name: "Player".into(),
            team: "Tm".into(),
            position: "Pos".into(),
            value: "ADP_ESPN".into(),
        };
        let table = load_csv_rows(&src, csv).unwrap();
        assert_eq!(table.records[0].team, "LAA");
        assert_eq!(table.records[0].metric_value, 30.5);
    }

    #[test]
    fn malformed_rows_are_skipped_and_counted() {
        let csv = "\
name,team,position,value
Mike Trout,LAA,OF,30.5
,NYY,OF,2
Aaron Judge,NYY,OF,n/a
Juan Soto,NYM,OF,
Bobby Witt Jr.,KC,SS,3
";
        let table = load_csv_rows(&source("fp"), csv).unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.skipped.len(), 3);
        assert_eq!(table.skipped[0].row, 2);
        assert_eq!(table.skipped[0].reason, "empty name");
        assert!(table.skipped[1].reason.contains("n/a"));
        assert_eq!(table.records[1].raw_name, "Bobby Witt Jr.");
        assert_eq!(table.records[1].row, 5);
    }

    #[test]
    fn ragged_row_is_skipped() {
        let csv = "\
name,team,position,value
Mike Trout,LAA,OF,30.5
Aaron Judge,NYY
";
        let table = load_csv_rows(&source("fp"), csv).unwrap();
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.skipped.len(), 1);
        assert_eq!(table.skipped[0].row, 2);
    }

    #[test]
    fn missing_column_is_fatal() {
        let csv = "name,team,value\nMike Trout,LAA,30.5\n";
        let err = load_csv_rows(&source("fp"), csv).unwrap_err();
        assert!(matches!(err, ReconError::MissingColumn { ref column, .. } if column == "position"));
    }

    #[test]
    fn missing_file_names_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_source_file(&source("fangraphs"), dir.path()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("fangraphs"));
        assert!(msg.contains("fangraphs.csv"));
    }
}
