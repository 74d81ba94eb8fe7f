//! Group consistency checks.
//!
//! Within one (make, model) a tier order should appear once and prices should
//! not fall as the tier order rises. Real listings break both rules; the audit
//! reports every break and leaves the data untouched.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{CatalogError, CatalogIndex};
use crate::domain::Variant;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupAnomaly {
    DuplicateTierOrder {
        make: String,
        model: String,
        tier_order: u8,
        variant_names: Vec<String>,
    },
    /// `higher_variant` has the higher tier order but the lower price.
    PriceInversion {
        make: String,
        model: String,
        lower_variant: String,
        lower_price: i64,
        higher_variant: String,
        higher_price: i64,
    },
}

impl GroupAnomaly {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::DuplicateTierOrder { .. } => "catalog.anomaly.duplicate_tier_order",
            Self::PriceInversion { .. } => "catalog.anomaly.price_inversion",
        }
    }

    pub fn group(&self) -> (&str, &str) {
        match self {
            Self::DuplicateTierOrder { make, model, .. }
            | Self::PriceInversion { make, model, .. } => (make, model),
        }
    }
}

/// Anomalies for one group. Variants may arrive in any order.
///
/// Price inversions compare the most expensive variant of each tier order
/// with the cheapest variant of the next populated tier order, so a duplicated
/// tier does not also produce spurious inversions among its own members.
pub fn audit_group(variants: &[Variant]) -> Vec<GroupAnomaly> {
    let Some(first) = variants.first() else {
        return Vec::new();
    };
    let (make, model) = (first.make.clone(), first.model.clone());

    let mut by_order: BTreeMap<u8, Vec<&Variant>> = BTreeMap::new();
    for variant in variants {
        by_order.entry(variant.tier_order()).or_default().push(variant);
    }

    let mut anomalies = Vec::new();
    for (tier_order, members) in &by_order {
        if members.len() > 1 {
            let variant_names: BTreeSet<String> =
                members.iter().map(|variant| variant.variant_name.clone()).collect();
            anomalies.push(GroupAnomaly::DuplicateTierOrder {
                make: make.clone(),
                model: model.clone(),
                tier_order: *tier_order,
                variant_names: variant_names.into_iter().collect(),
            });
        }
    }

    let tiers: Vec<&Vec<&Variant>> = by_order.values().collect();
    for pair in tiers.windows(2) {
        let lower = pair[0].iter().max_by(|a, b| {
            a.price.cmp(&b.price).then_with(|| b.variant_name.cmp(&a.variant_name))
        });
        let higher = pair[1].iter().min_by(|a, b| {
            a.price.cmp(&b.price).then_with(|| a.variant_name.cmp(&b.variant_name))
        });
        if let (Some(lower), Some(higher)) = (lower, higher) {
            if higher.price < lower.price {
                anomalies.push(GroupAnomaly::PriceInversion {
                    make: make.clone(),
                    model: model.clone(),
                    lower_variant: lower.variant_name.clone(),
                    lower_price: lower.price,
                    higher_variant: higher.variant_name.clone(),
                    higher_price: higher.price,
                });
            }
        }
    }

    anomalies
}

/// Audits every group in the catalog and logs each anomaly.
pub fn audit_catalog(catalog: &impl CatalogIndex) -> Result<Vec<GroupAnomaly>, CatalogError> {
    let mut anomalies = Vec::new();
    for make in catalog.list_makes()? {
        for model in catalog.list_models(&make)? {
            let group = catalog.get_group(&make, &model)?;
            anomalies.extend(audit_group(&group));
        }
    }
    for anomaly in &anomalies {
        log_anomaly(anomaly);
    }
    Ok(anomalies)
}

pub(crate) fn log_anomaly(anomaly: &GroupAnomaly) {
    let (make, model) = anomaly.group();
    match anomaly {
        GroupAnomaly::DuplicateTierOrder { tier_order, variant_names, .. } => warn!(
            event_name = anomaly.event_name(),
            make,
            model,
            tier_order,
            variants = %variant_names.join(", "),
            "several variants share one tier order"
        ),
        GroupAnomaly::PriceInversion {
            lower_variant, lower_price, higher_variant, higher_price, ..
        } => warn!(
            event_name = anomaly.event_name(),
            make,
            model,
            lower_variant = %lower_variant,
            lower_price,
            higher_variant = %higher_variant,
            higher_price,
            "higher tier is priced below a lower tier"
        ),
    }
}
