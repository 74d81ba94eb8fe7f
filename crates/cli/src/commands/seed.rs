use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use trimscout_core::catalog::{
    BuildReport, CatalogBuilder, ExcludedVariant, GroupAnomaly, RawVariantRecord,
};
use trimscout_core::config::AppConfig;
use trimscout_db::{demo_records, ingest, SqlVariantRepository};

use crate::commands::{build_runtime, open_pool, CommandResult};

#[derive(Debug, Serialize)]
struct SeedSummary {
    source: String,
    variants: usize,
    excluded: Vec<ExcludedVariant>,
    anomalies: Vec<GroupAnomaly>,
}

impl SeedSummary {
    fn from_report(source: String, report: BuildReport) -> Self {
        Self {
            source,
            variants: report.snapshot.len(),
            excluded: report.excluded,
            anomalies: report.anomalies,
        }
    }
}

/// Replaces the stored catalog with the demo dataset, or with the records in `file`.
pub fn run(config: &AppConfig, file: Option<&Path>) -> CommandResult {
    let (source, records) = match file {
        Some(path) => match read_records(path) {
            Ok(records) => (path.display().to_string(), records),
            Err(error) => {
                return CommandResult::failure("seed", "seed_input", format!("{error:#}"), 2);
            }
        },
        None => ("demo".to_string(), demo_records()),
    };

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("seed", error_class, message, exit_code);
        }
    };

    let result = runtime.block_on(async {
        let pool = open_pool(config).await?;
        let repository = SqlVariantRepository::new(pool.clone());
        let report = ingest(&repository, &CatalogBuilder::default(), records)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8));
        pool.close().await;
        report
    });

    match result {
        Ok(report) => {
            let summary = SeedSummary::from_report(source, report);
            let message = seed_message(&summary);
            CommandResult::success_with_data("seed", message, &summary)
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn read_records(path: &Path) -> anyhow::Result<Vec<RawVariantRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read seed file `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("seed file `{}` is not a JSON array of records", path.display()))
}

fn seed_message(summary: &SeedSummary) -> String {
    let mut message = format!("catalog loaded from {}: {} variants", summary.source, summary.variants);
    if !summary.excluded.is_empty() {
        message.push_str(&format!(", {} excluded", summary.excluded.len()));
    }
    if !summary.anomalies.is_empty() {
        message.push_str(&format!(", {} anomalies flagged", summary.anomalies.len()));
    }
    message
}
