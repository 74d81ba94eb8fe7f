use tracing::info;

use trimscout_core::catalog::{BuildReport, CatalogBuilder, CatalogSnapshot, RawVariantRecord};

use crate::repositories::{RepositoryError, VariantRepository};

/// Reads the stored catalog into an in-memory snapshot.
pub async fn load_snapshot(
    repository: &dyn VariantRepository,
) -> Result<CatalogSnapshot, RepositoryError> {
    let variants = repository.list_all().await?;
    let snapshot = CatalogSnapshot::new(variants);
    info!(event_name = "db.catalog.loaded", variants = snapshot.len(), "catalog snapshot loaded");
    Ok(snapshot)
}

/// Classifies `records` and replaces the stored catalog with the result.
///
/// Excluded records and anomalies are returned in the report, not written.
pub async fn ingest(
    repository: &dyn VariantRepository,
    builder: &CatalogBuilder,
    records: Vec<RawVariantRecord>,
) -> Result<BuildReport, RepositoryError> {
    let report = builder.build(records);
    let written = repository.replace_all(report.snapshot.variants().to_vec()).await?;
    info!(
        event_name = "db.catalog.ingested",
        written,
        excluded = report.excluded.len(),
        anomalies = report.anomalies.len(),
        "catalog ingested"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use trimscout_core::catalog::{CatalogBuilder, CatalogIndex};

    use super::{ingest, load_snapshot};
    use crate::fixtures::demo_records;
    use crate::repositories::InMemoryVariantRepository;

    #[tokio::test]
    async fn ingested_catalog_reloads_identically() {
        let repo = InMemoryVariantRepository::default();
        let report =
            ingest(&repo, &CatalogBuilder::default(), demo_records()).await.expect("ingest");

        let snapshot = load_snapshot(&repo).await.expect("load");

        assert_eq!(snapshot.variants(), report.snapshot.variants());
        assert!(snapshot.get_by_key("Maruti", "Swift", "ZXi+").expect("lookup").is_some());
    }
}
