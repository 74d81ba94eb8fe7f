use std::io::Write;

use serde_json::Value;
use tempfile::TempDir;
use trimscout_cli::commands::recommend::BudgetArgs;
use trimscout_cli::commands::{catalog, migrate, recommend, seed};
use trimscout_core::config::AppConfig;

fn config_for(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = format!("sqlite://{}", dir.path().join("trimscout.db").display());
    config
}

fn seeded_config(dir: &TempDir) -> AppConfig {
    let config = config_for(dir);
    let result = seed::run(&config, None);
    assert_eq!(result.exit_code, 0, "demo seed should succeed: {}", result.output);
    config
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

#[test]
fn migrate_returns_success_on_fresh_database() {
    let dir = TempDir::new().expect("tempdir");

    let result = migrate::run(&config_for(&dir));

    assert_eq!(result.exit_code, 0, "expected successful migrate run");
    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "migrate");
    assert_eq!(payload["status"], "ok");
}

#[test]
fn seed_reports_demo_catalog_and_flagged_anomaly() {
    let dir = TempDir::new().expect("tempdir");

    let result = seed::run(&config_for(&dir), None);

    assert_eq!(result.exit_code, 0);
    let payload = parse_payload(&result.output);
    assert_eq!(payload["data"]["source"], "demo");
    assert!(payload["data"]["variants"].as_u64().unwrap_or_default() > 0);
    let anomalies = payload["data"]["anomalies"].as_array().expect("anomalies");
    assert!(anomalies
        .iter()
        .any(|anomaly| anomaly["kind"] == "duplicate_tier_order" && anomaly["model"] == "Creta"));
}

#[test]
fn seed_is_idempotent_across_runs() {
    let dir = TempDir::new().expect("tempdir");
    let config = config_for(&dir);

    let first = parse_payload(&seed::run(&config, None).output);
    let second = parse_payload(&seed::run(&config, None).output);

    assert_eq!(first["message"], second["message"]);
    let makes = parse_payload(&catalog::makes(&config).output);
    assert_eq!(makes["data"].as_array().map(Vec::len), Some(6));
}

#[test]
fn seed_from_file_excludes_unclassifiable_records() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("records.json");
    let mut file = std::fs::File::create(&path).expect("create");
    write!(
        file,
        r#"[
            {{"make": "Acme", "model": "Roadster", "variant_name": "Launch Edition", "year": 2024, "price": 1500000}},
            {{"make": "Maruti", "model": "Swift", "variant_name": "LXi", "year": 2024, "price": 600000}},
            {{"make": "Maruti", "model": "Swift", "variant_name": "ZXi", "year": 2024, "price": 800000}}
        ]"#
    )
    .expect("write");

    let result = seed::run(&config_for(&dir), Some(&path));

    assert_eq!(result.exit_code, 0, "{}", result.output);
    let payload = parse_payload(&result.output);
    assert_eq!(payload["data"]["variants"], 2);
    assert_eq!(payload["data"]["excluded"][0]["variant_name"], "Launch Edition");
}

#[test]
fn seed_rejects_missing_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("absent.json");

    let result = seed::run(&config_for(&dir), Some(&path));

    assert_eq!(result.exit_code, 2);
    assert_eq!(parse_payload(&result.output)["error_class"], "seed_input");
}

#[test]
fn variants_are_listed_in_tier_order() {
    let dir = TempDir::new().expect("tempdir");
    let config = seeded_config(&dir);

    let payload = parse_payload(&catalog::variants(&config, "maruti", "swift").output);

    let names: Vec<&str> = payload["data"]
        .as_array()
        .expect("rows")
        .iter()
        .filter_map(|row| row["variant_name"].as_str())
        .collect();
    assert_eq!(names, vec!["LXi", "VXi", "ZXi", "ZXi+"]);
}

#[test]
fn upgrades_for_swift_base_trim() {
    let dir = TempDir::new().expect("tempdir");
    let config = seeded_config(&dir);

    let result = recommend::upgrades(&config, "Maruti", "Swift", "LXi", Some(2));

    assert_eq!(result.exit_code, 0);
    let payload = parse_payload(&result.output);
    let upgrades = payload["data"]["upgrades"].as_array().expect("upgrades");
    assert_eq!(upgrades.len(), 2);
    assert_eq!(upgrades[0]["variant"]["variant_name"], "VXi");
    assert_eq!(payload["data"]["is_top_variant"], false);
}

#[test]
fn upgrades_for_unknown_variant_is_not_found() {
    let dir = TempDir::new().expect("tempdir");
    let config = seeded_config(&dir);

    let result = recommend::upgrades(&config, "Maruti", "Swift", "QXi", None);

    assert_eq!(result.exit_code, 8);
    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "not_found");
    assert!(payload["correlation_id"].is_string());
}

#[test]
fn invalid_upgrade_count_is_a_bad_request() {
    let dir = TempDir::new().expect("tempdir");
    let config = seeded_config(&dir);

    let result = recommend::upgrades(&config, "Maruti", "Swift", "LXi", Some(4));

    assert_eq!(result.exit_code, 7);
    assert_eq!(parse_payload(&result.output)["error_class"], "bad_request");
}

#[test]
fn budget_search_widens_until_enough_results() {
    let dir = TempDir::new().expect("tempdir");
    let config = seeded_config(&dir);

    let result = recommend::budget(
        &config,
        BudgetArgs {
            budget: Some(750_000),
            margin_pct: Some(5),
            make: Some("Maruti".to_string()),
            model: Some("Swift".to_string()),
            ..BudgetArgs::default()
        },
    );

    assert_eq!(result.exit_code, 0, "{}", result.output);
    let payload = parse_payload(&result.output);
    assert_eq!(payload["data"]["search"]["relaxed"], true);
    assert_eq!(payload["data"]["search"]["effective_margin_pct"], 10);
    assert_eq!(payload["data"]["search"]["candidates"].as_array().map(Vec::len), Some(2));
}

#[test]
fn price_range_with_fuel_filter_keeps_only_matching_variants() {
    let dir = TempDir::new().expect("tempdir");
    let config = seeded_config(&dir);

    let result = recommend::budget(
        &config,
        BudgetArgs {
            price_min: Some(800_000),
            price_max: Some(1_000_000),
            fuel_type: Some("diesel".to_string()),
            ..BudgetArgs::default()
        },
    );

    assert_eq!(result.exit_code, 0, "{}", result.output);
    let payload = parse_payload(&result.output);
    let candidates = payload["data"]["search"]["candidates"].as_array().expect("candidates");
    let names: Vec<&str> =
        candidates.iter().filter_map(|variant| variant["variant_name"].as_str()).collect();
    assert_eq!(candidates.len(), 2, "{names:?}");
    assert!(candidates.iter().all(|variant| variant["make"] == "Kia"));
    assert_eq!(payload["data"]["search"]["relaxed"], false);
}

#[test]
fn inverted_price_range_is_a_bad_request() {
    let dir = TempDir::new().expect("tempdir");
    let config = seeded_config(&dir);

    let result = recommend::budget(
        &config,
        BudgetArgs { price_min: Some(900_000), price_max: Some(800_000), ..BudgetArgs::default() },
    );

    assert_eq!(result.exit_code, 7);
    assert_eq!(parse_payload(&result.output)["error_class"], "bad_request");
}

#[test]
fn negative_budget_is_a_bad_request() {
    let dir = TempDir::new().expect("tempdir");
    let config = seeded_config(&dir);

    let result = recommend::budget(&config, BudgetArgs { budget: Some(-1), ..BudgetArgs::default() });

    assert_eq!(result.exit_code, 7);
}

#[test]
fn audit_of_empty_catalog_finds_nothing() {
    let dir = TempDir::new().expect("tempdir");

    let result = catalog::audit(&config_for(&dir));

    assert_eq!(result.exit_code, 0);
    let payload = parse_payload(&result.output);
    assert_eq!(payload["message"], "no anomalies found");
    assert_eq!(payload["data"], serde_json::json!([]));
}
