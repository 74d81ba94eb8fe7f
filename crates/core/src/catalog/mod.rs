//! Read-only catalog seam.
//!
//! The recommendation core only ever reads variants through [`CatalogIndex`].
//! [`CatalogSnapshot`] is the in-memory implementation; persistent stores
//! load into a snapshot rather than implementing the trait per query.

pub mod audit;
pub mod builder;
pub mod snapshot;

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Variant;

pub use audit::{audit_catalog, audit_group, GroupAnomaly};
pub use builder::{BuildReport, CatalogBuilder, ExcludedVariant, RawVariantRecord};
pub use snapshot::{CatalogSnapshot, SharedCatalog};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Inclusive price bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    pub fn at_most(price: i64) -> Self {
        Self { min: Decimal::MIN, max: Decimal::from(price) }
    }

    pub fn at_least(price: i64) -> Self {
        Self { min: Decimal::from(price), max: Decimal::MAX }
    }

    pub fn contains(&self, price: i64) -> bool {
        let price = Decimal::from(price);
        self.min <= price && price <= self.max
    }
}

/// Orders by distance from `budget`, then cheaper first, then variant name.
pub fn compare_by_proximity(left: &Variant, right: &Variant, budget: i64) -> Ordering {
    let distance = |variant: &Variant| (i128::from(variant.price) - i128::from(budget)).abs();
    distance(left)
        .cmp(&distance(right))
        .then_with(|| left.price.cmp(&right.price))
        .then_with(|| left.variant_name.cmp(&right.variant_name))
}

pub trait CatalogIndex: Send + Sync {
    fn get_by_key(
        &self,
        make: &str,
        model: &str,
        variant_name: &str,
    ) -> Result<Option<Variant>, CatalogError>;

    /// Every tier of one (make, model).
    fn get_group(&self, make: &str, model: &str) -> Result<Vec<Variant>, CatalogError>;

    /// `None` for `make` or `model` means unconstrained.
    fn query_by_price_range(
        &self,
        range: &PriceRange,
        make: Option<&str>,
        model: Option<&str>,
    ) -> Result<Vec<Variant>, CatalogError>;

    fn list_makes(&self) -> Result<BTreeSet<String>, CatalogError>;

    fn list_models(&self, make: &str) -> Result<BTreeSet<String>, CatalogError>;

    fn nearest_at_or_below(
        &self,
        budget: i64,
        make: Option<&str>,
        model: Option<&str>,
    ) -> Result<Option<Variant>, CatalogError> {
        let below = self.query_by_price_range(&PriceRange::at_most(budget), make, model)?;
        Ok(below.into_iter().min_by(|left, right| compare_by_proximity(left, right, budget)))
    }

    fn nearest_at_or_above(
        &self,
        budget: i64,
        make: Option<&str>,
        model: Option<&str>,
    ) -> Result<Option<Variant>, CatalogError> {
        let above = self.query_by_price_range(&PriceRange::at_least(budget), make, model)?;
        Ok(above.into_iter().min_by(|left, right| compare_by_proximity(left, right, budget)))
    }
}

impl<T: CatalogIndex + ?Sized> CatalogIndex for &T {
    fn get_by_key(
        &self,
        make: &str,
        model: &str,
        variant_name: &str,
    ) -> Result<Option<Variant>, CatalogError> {
        (**self).get_by_key(make, model, variant_name)
    }

    fn get_group(&self, make: &str, model: &str) -> Result<Vec<Variant>, CatalogError> {
        (**self).get_group(make, model)
    }

    fn query_by_price_range(
        &self,
        range: &PriceRange,
        make: Option<&str>,
        model: Option<&str>,
    ) -> Result<Vec<Variant>, CatalogError> {
        (**self).query_by_price_range(range, make, model)
    }

    fn list_makes(&self) -> Result<BTreeSet<String>, CatalogError> {
        (**self).list_makes()
    }

    fn list_models(&self, make: &str) -> Result<BTreeSet<String>, CatalogError> {
        (**self).list_models(make)
    }
}

impl<T: CatalogIndex + ?Sized> CatalogIndex for Arc<T> {
    fn get_by_key(
        &self,
        make: &str,
        model: &str,
        variant_name: &str,
    ) -> Result<Option<Variant>, CatalogError> {
        (**self).get_by_key(make, model, variant_name)
    }

    fn get_group(&self, make: &str, model: &str) -> Result<Vec<Variant>, CatalogError> {
        (**self).get_group(make, model)
    }

    fn query_by_price_range(
        &self,
        range: &PriceRange,
        make: Option<&str>,
        model: Option<&str>,
    ) -> Result<Vec<Variant>, CatalogError> {
        (**self).query_by_price_range(range, make, model)
    }

    fn list_makes(&self) -> Result<BTreeSet<String>, CatalogError> {
        (**self).list_makes()
    }

    fn list_models(&self, make: &str) -> Result<BTreeSet<String>, CatalogError> {
        (**self).list_models(make)
    }
}
