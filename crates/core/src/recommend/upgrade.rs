use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::CatalogIndex;
use crate::domain::Variant;
use crate::errors::{ApplicationError, DomainError};

pub const MAX_UPGRADE_COUNT: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradePath {
    pub upgrades: Vec<Variant>,
    pub is_top_variant: bool,
}

pub struct UpgradePathFinder<C> {
    catalog: C,
}

impl<C: CatalogIndex> UpgradePathFinder<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// The next `count` variants above `current_tier_order` in the group,
    /// nearest tier first.
    pub fn find_upgrades(
        &self,
        make: &str,
        model: &str,
        current_tier_order: u8,
        count: usize,
    ) -> Result<UpgradePath, ApplicationError> {
        if !(1..=MAX_UPGRADE_COUNT).contains(&count) {
            return Err(DomainError::InvalidQuery(format!(
                "upgrade count must be between 1 and {MAX_UPGRADE_COUNT}, got {count}"
            ))
            .into());
        }

        let mut higher: Vec<Variant> = self
            .catalog
            .get_group(make, model)?
            .into_iter()
            .filter(|variant| variant.tier_order() > current_tier_order)
            .collect();
        higher.sort_by(|left, right| {
            left.tier_order()
                .cmp(&right.tier_order())
                .then_with(|| left.price.cmp(&right.price))
                .then_with(|| left.variant_name.cmp(&right.variant_name))
        });
        higher.truncate(count);

        let is_top_variant = higher.is_empty();
        debug!(
            event_name = "upgrade.path.found",
            make,
            model,
            current_tier_order,
            upgrades = higher.len(),
            is_top_variant,
            "upgrade path resolved"
        );

        Ok(UpgradePath { upgrades: higher, is_top_variant })
    }
}
