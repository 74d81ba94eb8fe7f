use chrono::Utc;
use sqlx::Row;
use tracing::debug;

use trimscout_core::domain::{
    FeatureCategories, Tier, TierSource, Variant, VariantAttributes, VariantId,
};

use super::{RepositoryError, VariantRepository};
use crate::DbPool;

const SELECT_COLUMNS: &str = "SELECT id, make, model, variant_name, tier, tier_source_json, price,
        features_json, fuel_type, body_type, seating_capacity
 FROM variant";

pub struct SqlVariantRepository {
    pool: DbPool,
}

impl SqlVariantRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode_err(error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

fn row_to_variant(row: &sqlx::sqlite::SqliteRow) -> Result<Variant, RepositoryError> {
    let id: String = row.try_get("id").map_err(decode_err)?;
    let make: String = row.try_get("make").map_err(decode_err)?;
    let model: String = row.try_get("model").map_err(decode_err)?;
    let variant_name: String = row.try_get("variant_name").map_err(decode_err)?;
    let tier_str: String = row.try_get("tier").map_err(decode_err)?;
    let tier_source_json: String = row.try_get("tier_source_json").map_err(decode_err)?;
    let price: i64 = row.try_get("price").map_err(decode_err)?;
    let features_json: String = row.try_get("features_json").map_err(decode_err)?;
    let fuel_type: Option<String> = row.try_get("fuel_type").map_err(decode_err)?;
    let body_type: Option<String> = row.try_get("body_type").map_err(decode_err)?;
    let seating_capacity: Option<i64> = row.try_get("seating_capacity").map_err(decode_err)?;

    let tier: Tier = tier_str.parse().map_err(RepositoryError::Decode)?;
    let tier_source: TierSource = serde_json::from_str(&tier_source_json)
        .map_err(|e| RepositoryError::Decode(format!("tier_source_json for `{id}`: {e}")))?;
    let features: FeatureCategories = serde_json::from_str(&features_json)
        .map_err(|e| RepositoryError::Decode(format!("features_json for `{id}`: {e}")))?;
    let seating_capacity = seating_capacity
        .map(|seats| {
            u8::try_from(seats)
                .map_err(|_| RepositoryError::Decode(format!("seating_capacity {seats} for `{id}`")))
        })
        .transpose()?;

    Ok(Variant {
        id: VariantId(id),
        make,
        model,
        variant_name,
        tier,
        tier_source,
        price,
        features,
        attributes: VariantAttributes { fuel_type, body_type, seating_capacity },
    })
}

async fn upsert<'e, E>(executor: E, variant: &Variant) -> Result<(), RepositoryError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let tier_source_json = serde_json::to_string(&variant.tier_source).map_err(decode_err)?;
    let features_json = serde_json::to_string(&variant.features).map_err(decode_err)?;

    sqlx::query(
        "INSERT INTO variant (id, make, model, variant_name, tier, tier_source_json, price,
                              features_json, fuel_type, body_type, seating_capacity, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
             make = excluded.make,
             model = excluded.model,
             variant_name = excluded.variant_name,
             tier = excluded.tier,
             tier_source_json = excluded.tier_source_json,
             price = excluded.price,
             features_json = excluded.features_json,
             fuel_type = excluded.fuel_type,
             body_type = excluded.body_type,
             seating_capacity = excluded.seating_capacity,
             updated_at = excluded.updated_at",
    )
    .bind(variant.id.as_str())
    .bind(&variant.make)
    .bind(&variant.model)
    .bind(&variant.variant_name)
    .bind(variant.tier.as_str())
    .bind(tier_source_json)
    .bind(variant.price)
    .bind(features_json)
    .bind(&variant.attributes.fuel_type)
    .bind(&variant.attributes.body_type)
    .bind(variant.attributes.seating_capacity.map(i64::from))
    .bind(Utc::now().to_rfc3339())
    .execute(executor)
    .await?;

    Ok(())
}

#[async_trait::async_trait]
impl VariantRepository for SqlVariantRepository {
    async fn find_by_id(&self, id: &VariantId) -> Result<Option<Variant>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_variant(r)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, variant: Variant) -> Result<(), RepositoryError> {
        upsert(&self.pool, &variant).await
    }

    async fn list_all(&self) -> Result<Vec<Variant>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(&format!(
            "{SELECT_COLUMNS} ORDER BY make COLLATE NOCASE, model COLLATE NOCASE, price, variant_name"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_variant).collect::<Result<Vec<_>, _>>()
    }

    async fn replace_all(&self, variants: Vec<Variant>) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM variant").execute(&mut *tx).await?;
        for variant in &variants {
            upsert(&mut *tx, variant).await?;
        }
        tx.commit().await?;

        debug!(event_name = "db.variant.replaced", count = variants.len(), "catalog replaced");
        Ok(variants.len())
    }
}
