use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{FeatureCategories, FeatureCategory, Variant};
use crate::errors::DomainError;

/// Cost per gained feature below which an upgrade reads as good value.
pub const GOOD_VALUE_COST_PER_FEATURE: i64 = 50_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueAssessment {
    /// Nothing new in any category.
    SimilarFeatures,
    GoodValue,
    Premium,
}

impl ValueAssessment {
    pub fn from_cost_per_feature(cost_per_feature: Option<Decimal>) -> Self {
        match cost_per_feature {
            None => Self::SimilarFeatures,
            Some(cost) if cost < Decimal::from(GOOD_VALUE_COST_PER_FEATURE) => Self::GoodValue,
            Some(_) => Self::Premium,
        }
    }
}

/// What moving from one variant to a higher one buys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeCandidate {
    pub variant: Variant,
    pub price_delta: i64,
    pub additional_features: FeatureCategories,
    pub total_new_features: usize,
    pub cost_per_feature: Option<Decimal>,
    pub value_assessment: ValueAssessment,
}

/// Features `higher` has that `lower` lacks, category by category.
///
/// Only defined upgrade-wards. A negative `price_delta` (a price inversion in
/// the catalog) is passed through as is.
pub fn diff(lower: &Variant, higher: &Variant) -> Result<UpgradeCandidate, DomainError> {
    if higher.tier_order() <= lower.tier_order() {
        return Err(DomainError::InvalidComparison {
            lower: lower.tier_order(),
            higher: higher.tier_order(),
        });
    }

    let mut additional_features = FeatureCategories::new();
    for category in FeatureCategory::ALL {
        for feature in higher.features.features(category) {
            if !lower.features.contains(category, feature) {
                additional_features.insert(category, feature);
            }
        }
    }

    let price_delta = higher.price - lower.price;
    let total_new_features = additional_features.len();
    let cost_per_feature = (total_new_features > 0).then(|| {
        (Decimal::from(price_delta) / Decimal::from(total_new_features as u64)).round_dp(2)
    });

    Ok(UpgradeCandidate {
        variant: higher.clone(),
        price_delta,
        additional_features,
        total_new_features,
        cost_per_feature,
        value_assessment: ValueAssessment::from_cost_per_feature(cost_per_feature),
    })
}
