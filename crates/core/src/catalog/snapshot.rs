use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, RwLock};

use tracing::warn;

use super::{CatalogError, CatalogIndex, PriceRange};
use crate::domain::Variant;

/// Immutable, fully classified catalog held in memory.
///
/// Variants are kept sorted by make, model, tier order, price and name so
/// every query returns them in the same order.
#[derive(Clone, Debug)]
pub struct CatalogSnapshot {
    variants: Vec<Variant>,
}

impl CatalogSnapshot {
    /// Later duplicates of an id already present are dropped with a warning.
    pub fn new(variants: Vec<Variant>) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(variants.len());
        for variant in variants {
            if seen.insert(variant.id.clone()) {
                unique.push(variant);
            } else {
                warn!(
                    event_name = "catalog.snapshot.duplicate_id",
                    variant_id = %variant.id,
                    "dropping variant with an id already present in the snapshot"
                );
            }
        }

        unique.sort_by(|left, right| {
            left.make
                .to_lowercase()
                .cmp(&right.make.to_lowercase())
                .then_with(|| left.model.to_lowercase().cmp(&right.model.to_lowercase()))
                .then_with(|| left.tier_order().cmp(&right.tier_order()))
                .then_with(|| left.price.cmp(&right.price))
                .then_with(|| left.variant_name.cmp(&right.variant_name))
        });

        Self { variants: unique }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl CatalogIndex for CatalogSnapshot {
    fn get_by_key(
        &self,
        make: &str,
        model: &str,
        variant_name: &str,
    ) -> Result<Option<Variant>, CatalogError> {
        Ok(self
            .variants
            .iter()
            .find(|variant| {
                variant.in_group(make, model) && variant.variant_name.eq_ignore_ascii_case(variant_name)
            })
            .cloned())
    }

    fn get_group(&self, make: &str, model: &str) -> Result<Vec<Variant>, CatalogError> {
        Ok(self.variants.iter().filter(|variant| variant.in_group(make, model)).cloned().collect())
    }

    fn query_by_price_range(
        &self,
        range: &PriceRange,
        make: Option<&str>,
        model: Option<&str>,
    ) -> Result<Vec<Variant>, CatalogError> {
        Ok(self
            .variants
            .iter()
            .filter(|variant| variant.matches_scope(make, model))
            .filter(|variant| range.contains(variant.price))
            .cloned()
            .collect())
    }

    fn list_makes(&self) -> Result<BTreeSet<String>, CatalogError> {
        Ok(self.variants.iter().map(|variant| variant.make.clone()).collect())
    }

    fn list_models(&self, make: &str) -> Result<BTreeSet<String>, CatalogError> {
        Ok(self
            .variants
            .iter()
            .filter(|variant| variant.make.eq_ignore_ascii_case(make))
            .map(|variant| variant.model.clone())
            .collect())
    }
}

/// Swappable handle to the current snapshot.
///
/// A request should call [`SharedCatalog::snapshot`] once and run entirely
/// against that `Arc`; a concurrent [`SharedCatalog::replace`] is then
/// invisible to it.
#[derive(Debug)]
pub struct SharedCatalog {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl SharedCatalog {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self { current: RwLock::new(Arc::new(snapshot)) }
    }

    pub fn snapshot(&self) -> Result<Arc<CatalogSnapshot>, CatalogError> {
        self.current
            .read()
            .map(|current| Arc::clone(&current))
            .map_err(|_| CatalogError::Unavailable("catalog lock is poisoned".to_string()))
    }

    pub fn replace(&self, snapshot: CatalogSnapshot) -> Result<(), CatalogError> {
        let mut current = self
            .current
            .write()
            .map_err(|_| CatalogError::Unavailable("catalog lock is poisoned".to_string()))?;
        *current = Arc::new(snapshot);
        Ok(())
    }
}
