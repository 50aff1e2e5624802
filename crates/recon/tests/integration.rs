use std::path::PathBuf;

use rankmerge_recon::model::ConsensusResult;
use rankmerge_recon::output::write_table;
use rankmerge_recon::{load_sources, run, CanonicalPlayer, ReconConfig, ReconError};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_config(file: &str) -> ReconConfig {
    let toml = std::fs::read_to_string(fixtures_dir().join(file)).unwrap();
    ReconConfig::from_toml(&toml).unwrap()
}

fn load_and_run(file: &str) -> ConsensusResult {
    let config = load_config(file);
    let input = load_sources(&config, &fixtures_dir()).unwrap();
    run(&config, &input).unwrap()
}

fn find<'a>(players: &'a [CanonicalPlayer], name: &str, team: &str) -> &'a CanonicalPlayer {
    players
        .iter()
        .find(|p| p.canonical_name == name && p.team == team)
        .unwrap_or_else(|| panic!("no player {name} ({team})"))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// -------------------------------------------------------------------------
// ADP, rank blend
// -------------------------------------------------------------------------

#[test]
fn adp_links_name_variants() {
    let result = load_and_run("adp.recon.toml");
    assert_eq!(result.summary.total_players, 9);
    assert_eq!(result.summary.multi_source, 8);
    assert_eq!(result.summary.single_source, 1);

    let acuna = find(&result.players, "Ronald Acuna Jr.", "ATL");
    assert!(close(acuna.consensus_value, 13.0));
    assert_eq!(acuna.confidence_score, 100.0);

    let witt = find(&result.players, "Bobby Witt Jr.", "KC");
    assert_eq!(witt.per_source_values.len(), 2);

    let julio = find(&result.players, "Julio Rodriguez", "SEA");
    assert!(close(julio.consensus_value, 10.1));

    let jd = find(&result.players, "J.D. Martinez", "NYM");
    assert!(close(jd.consensus_value, 285.0));
}

#[test]
fn adp_same_name_players_split_by_team() {
    let result = load_and_run("adp.recon.toml");

    let catcher = find(&result.players, "Will Smith", "LAD");
    assert_eq!(catcher.position, "C");
    assert!(close(catcher.consensus_value, 119.0));

    let reliever = find(&result.players, "Will Smith", "TEX");
    assert_eq!(reliever.position, "RP");
    assert!(close(reliever.consensus_value, 307.5));
}

#[test]
fn adp_sorted_ascending() {
    let result = load_and_run("adp.recon.toml");
    let order: Vec<&str> = result.players.iter().map(|p| p.canonical_name.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "Shohei Ohtani",
            "Aaron Judge",
            "Bobby Witt Jr.",
            "Julio Rodriguez",
            "Ronald Acuna Jr.",
            "Jackson Merrill",
            "Will Smith",
            "J.D. Martinez",
            "Will Smith",
        ]
    );
}

#[test]
fn adp_review_holds_single_source_player() {
    let result = load_and_run("adp.recon.toml");
    assert_eq!(result.review.len(), 1);
    let merrill = &result.review[0];
    assert_eq!(merrill.canonical_name, "Jackson Merrill");
    assert!(merrill.single_source);
    assert_eq!(merrill.per_source_values["espn"], 55.0);
    assert!(!merrill.per_source_values.contains_key("fp"));
}

#[test]
fn adp_skipped_row_reported() {
    let result = load_and_run("adp.recon.toml");
    assert_eq!(result.summary.rows_skipped, 1);
    let fp = &result.sources[0];
    assert_eq!(fp.source_id, "fp");
    assert_eq!(fp.rows_loaded, 8);
    assert_eq!(fp.skipped[0].row, 9);
    assert_eq!(fp.sha256.len(), 64);
}

#[test]
fn adp_table_rounds_consensus() {
    let config = load_config("adp.recon.toml");
    let result = load_and_run("adp.recon.toml");
    let csv = write_table(&result.players, &config.source_ids(), config.output.decimals).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "name,team,position,consensus_value,value_fp,value_espn,confidence_score,flagged"
    );
    assert_eq!(lines[1], "Shohei Ohtani,LAD,DH,1.1,1.2,1,100.00,false");
    assert!(lines.contains(&"Jackson Merrill,SD,OF,55.0,,55,100.00,true"));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let config = load_config("adp.recon.toml");
    let ids = config.source_ids();
    let first = load_and_run("adp.recon.toml");
    let second = load_and_run("adp.recon.toml");
    assert_eq!(
        write_table(&first.players, &ids, config.output.decimals).unwrap(),
        write_table(&second.players, &ids, config.output.decimals).unwrap()
    );
    assert_eq!(
        write_table(&first.review, &ids, config.output.decimals).unwrap(),
        write_table(&second.review, &ids, config.output.decimals).unwrap()
    );
}

// -------------------------------------------------------------------------
// Projections, weighted blend
// -------------------------------------------------------------------------

#[test]
fn projections_renormalize_over_present_sources() {
    let result = load_and_run("hr.recon.toml");

    let judge = find(&result.players, "Aaron Judge", "NYY");
    assert_eq!(judge.per_source_values.len(), 3);
    assert!(close(judge.consensus_value, 0.45 * 45.0 + 0.35 * 47.0 + 0.20 * 43.0));

    let schwarber = find(&result.players, "Kyle Schwarber", "PHI");
    assert!(close(schwarber.consensus_value, (0.45 * 38.0 + 0.35 * 40.0) / 0.80));

    let alonso = find(&result.players, "Pete Alonso", "NYM");
    assert!(close(alonso.consensus_value, (0.45 * 34.0 + 0.20 * 33.0) / 0.65));
    assert!(!alonso.flagged_for_review);
}

#[test]
fn projections_sub_threshold_candidate_stays_separate() {
    let result = load_and_run("hr.recon.toml");
    assert_eq!(result.summary.total_players, 6);
    assert_eq!(result.summary.sub_threshold_links, 2);

    let vladimir = find(&result.players, "Vladimir Guerrero Jr.", "TOR");
    assert_eq!(vladimir.per_source_values.len(), 2);
    assert!(!vladimir.per_source_values.contains_key("br"));

    let vlad = find(&result.players, "Vlad Guerrero Jr.", "TOR");
    assert!(vlad.single_source);
    assert_eq!(vlad.consensus_value, 31.0);

    let flagged: Vec<&str> = result.review.iter().map(|p| p.canonical_name.as_str()).collect();
    assert_eq!(flagged, vec!["Vlad Guerrero Jr.", "Yordan Alvarez"]);
}

#[test]
fn projections_keep_input_order() {
    let result = load_and_run("hr.recon.toml");
    let order: Vec<&str> = result.players.iter().map(|p| p.canonical_name.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "Aaron Judge",
            "Kyle Schwarber",
            "Pete Alonso",
            "Vladimir Guerrero Jr.",
            "Vlad Guerrero Jr.",
            "Yordan Alvarez",
        ]
    );
    assert_eq!(result.meta.sources, vec!["fp", "fg", "br"]);
}

// -------------------------------------------------------------------------
// Failures
// -------------------------------------------------------------------------

#[test]
fn missing_source_file_aborts_run() {
    let toml = r#"
name = "missing"
policy = "rank_blend"

[[sources]]
id = "fp"
file = "fantasypros_adp.csv"
[sources.columns]
name = "Name"
team = "Team"
position = "Position"
value = "ADP"

[[sources]]
id = "yahoo"
file = "yahoo_adp.csv"
"#;
    let config = ReconConfig::from_toml(toml).unwrap();
    let err = load_sources(&config, &fixtures_dir()).unwrap_err();
    match err {
        ReconError::SourceUnreadable { source_id, path, .. } => {
            assert_eq!(source_id, "yahoo");
            assert!(path.ends_with("yahoo_adp.csv"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn wrong_column_mapping_aborts_run() {
    let toml = r#"
name = "bad mapping"
policy = "rank_blend"

[[sources]]
id = "fp"
file = "fantasypros_adp.csv"

[[sources]]
id = "espn"
file = "espn_adp.csv"
"#;
    let config = ReconConfig::from_toml(toml).unwrap();
    let err = load_sources(&config, &fixtures_dir()).unwrap_err();
    assert!(matches!(err, ReconError::MissingColumn { ref source_id, .. } if source_id == "fp"));
}
