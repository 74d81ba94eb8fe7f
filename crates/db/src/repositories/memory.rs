use std::collections::HashMap;

use tokio::sync::RwLock;

use trimscout_core::domain::{Variant, VariantId};

use super::{RepositoryError, VariantRepository};

#[derive(Default)]
pub struct InMemoryVariantRepository {
    variants: RwLock<HashMap<String, Variant>>,
}

#[async_trait::async_trait]
impl VariantRepository for InMemoryVariantRepository {
    async fn find_by_id(&self, id: &VariantId) -> Result<Option<Variant>, RepositoryError> {
        let variants = self.variants.read().await;
        Ok(variants.get(id.as_str()).cloned())
    }

    async fn save(&self, variant: Variant) -> Result<(), RepositoryError> {
        let mut variants = self.variants.write().await;
        variants.insert(variant.id.0.clone(), variant);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Variant>, RepositoryError> {
        let variants = self.variants.read().await;
        let mut all: Vec<Variant> = variants.values().cloned().collect();
        all.sort_by(|left, right| {
            left.make
                .to_lowercase()
                .cmp(&right.make.to_lowercase())
                .then_with(|| left.model.to_lowercase().cmp(&right.model.to_lowercase()))
                .then_with(|| left.price.cmp(&right.price))
                .then_with(|| left.variant_name.cmp(&right.variant_name))
        });
        Ok(all)
    }

    async fn replace_all(&self, replacement: Vec<Variant>) -> Result<usize, RepositoryError> {
        let mut variants = self.variants.write().await;
        variants.clear();
        let written = replacement.len();
        for variant in replacement {
            variants.insert(variant.id.0.clone(), variant);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use trimscout_core::domain::{
        FeatureCategories, Tier, TierSource, Variant, VariantAttributes, VariantId,
    };

    use crate::repositories::{InMemoryVariantRepository, VariantRepository};

    fn variant(make: &str, model: &str, name: &str, price: i64) -> Variant {
        Variant {
            id: VariantId::from_parts(make, model, name, 2024),
            make: make.to_string(),
            model: model.to_string(),
            variant_name: name.to_string(),
            tier: Tier::Mid,
            tier_source: TierSource::PriceQuartile,
            price,
            features: FeatureCategories::new(),
            attributes: VariantAttributes::default(),
        }
    }

    #[tokio::test]
    async fn in_memory_variant_repo_round_trip() {
        let repo = InMemoryVariantRepository::default();
        let vxi = variant("Maruti", "Swift", "VXi", 700_000);

        repo.save(vxi.clone()).await.expect("save variant");
        let found = repo.find_by_id(&vxi.id).await.expect("find variant");

        assert_eq!(found, Some(vxi));
    }

    #[tokio::test]
    async fn list_all_orders_like_sql_store() {
        let repo = InMemoryVariantRepository::default();
        repo.replace_all(vec![
            variant("tata", "Nexon", "XM", 900_000),
            variant("Maruti", "Swift", "ZXi", 800_000),
            variant("Maruti", "Swift", "LXi", 600_000),
        ])
        .await
        .expect("replace");

        let names: Vec<String> =
            repo.list_all().await.expect("list").into_iter().map(|v| v.variant_name).collect();

        assert_eq!(names, vec!["LXi", "ZXi", "XM"]);
    }
}
