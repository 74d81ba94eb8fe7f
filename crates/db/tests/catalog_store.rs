use tempfile::TempDir;

use trimscout_core::catalog::{CatalogBuilder, CatalogIndex};
use trimscout_core::recommend::{BudgetQuery, Recommender};
use trimscout_db::{
    connect_with_settings, demo_records, ingest, load_snapshot, migrations, SqlVariantRepository,
};

async fn file_backed_repo(dir: &TempDir) -> SqlVariantRepository {
    let url = format!("sqlite://{}", dir.path().join("catalog.db").display());
    let pool = connect_with_settings(&url, 2, 5).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrations");
    SqlVariantRepository::new(pool)
}

#[tokio::test]
async fn demo_catalog_survives_a_round_trip_through_sqlite() {
    let dir = TempDir::new().expect("tempdir");
    let repo = file_backed_repo(&dir).await;

    let report = ingest(&repo, &CatalogBuilder::default(), demo_records()).await.expect("ingest");
    let snapshot = load_snapshot(&repo).await.expect("load");

    assert_eq!(snapshot.variants(), report.snapshot.variants());
    assert_eq!(
        snapshot.list_makes().expect("makes").into_iter().collect::<Vec<_>>(),
        vec!["Honda", "Hyundai", "Kia", "Maruti", "Tata", "Toyota"]
    );
}

#[tokio::test]
async fn reingest_replaces_previous_catalog() {
    let dir = TempDir::new().expect("tempdir");
    let repo = file_backed_repo(&dir).await;
    let builder = CatalogBuilder::default();

    ingest(&repo, &builder, demo_records()).await.expect("first ingest");
    let swift_only: Vec<_> =
        demo_records().into_iter().filter(|record| record.model == "Swift").collect();
    ingest(&repo, &builder, swift_only).await.expect("second ingest");

    let snapshot = load_snapshot(&repo).await.expect("load");
    assert_eq!(snapshot.len(), 4);
}

#[tokio::test]
async fn stored_catalog_answers_the_swift_scenarios() {
    let dir = TempDir::new().expect("tempdir");
    let repo = file_backed_repo(&dir).await;
    let swift: Vec<_> =
        demo_records().into_iter().filter(|record| record.model == "Swift").collect();
    ingest(&repo, &CatalogBuilder::default(), swift).await.expect("ingest");
    let recommender = Recommender::new(load_snapshot(&repo).await.expect("load"));

    let upgrades = recommender.recommend_upgrades("Maruti", "Swift", "LXi", 2).expect("upgrades");
    let upgrade_names: Vec<&str> =
        upgrades.upgrades.iter().map(|c| c.variant.variant_name.as_str()).collect();
    assert_eq!(upgrade_names, vec!["VXi", "ZXi"]);

    let budget = recommender
        .recommend_by_budget(&BudgetQuery { margin_pct: 5, ..BudgetQuery::new(750_000) }, &[])
        .expect("budget");
    assert!(budget.search.relaxed);
    assert_eq!(budget.search.effective_margin_pct, 10);
    assert_eq!(budget.search.candidates.len(), 2);

    let fallback = recommender.recommend_by_budget(&BudgetQuery::new(100), &[]).expect("fallback");
    assert!(fallback.search.used_fallback);
    assert_eq!(fallback.search.candidates.len(), 1);
    assert_eq!(fallback.search.candidates[0].variant_name, "LXi");
}
