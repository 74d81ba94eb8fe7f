use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::audit::{audit_group, log_anomaly, GroupAnomaly};
use super::snapshot::CatalogSnapshot;
use crate::classify::{FeatureCategorizer, TierClassifier};
use crate::domain::{Variant, VariantAttributes, VariantId};

/// One listing as it arrives from ingestion, before classification.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawVariantRecord {
    pub make: String,
    pub model: String,
    pub variant_name: String,
    pub year: u16,
    pub price: i64,
    /// Free-form feature strings, e.g. `"6 Airbags"`.
    #[serde(default)]
    pub raw_features: Vec<String>,
    /// Spec-sheet cells, e.g. `("Power_Windows", "Yes")`.
    #[serde(default)]
    pub attribute_columns: Vec<(String, String)>,
    #[serde(default)]
    pub attributes: VariantAttributes,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedVariant {
    pub make: String,
    pub model: String,
    pub variant_name: String,
    pub reason: String,
}

#[derive(Clone, Debug)]
pub struct BuildReport {
    pub snapshot: CatalogSnapshot,
    pub excluded: Vec<ExcludedVariant>,
    pub anomalies: Vec<GroupAnomaly>,
}

#[derive(Clone, Debug, Default)]
pub struct CatalogBuilder {
    classifier: TierClassifier,
    categorizer: FeatureCategorizer,
}

impl CatalogBuilder {
    pub fn new(classifier: TierClassifier, categorizer: FeatureCategorizer) -> Self {
        Self { classifier, categorizer }
    }

    /// Classifies and categorizes every record, group by group.
    ///
    /// Records that cannot be placed (blank identity, negative price, a name
    /// no rule knows inside a group too small for the price quartile) are
    /// listed in [`BuildReport::excluded`] instead of failing the build.
    pub fn build<I>(&self, records: I) -> BuildReport
    where
        I: IntoIterator<Item = RawVariantRecord>,
    {
        let mut excluded = Vec::new();
        let mut groups: BTreeMap<(String, String), Vec<RawVariantRecord>> = BTreeMap::new();

        for record in records {
            if let Some(reason) = rejection_reason(&record) {
                excluded.push(exclude(&record, reason));
                continue;
            }
            let key = (record.make.trim().to_lowercase(), record.model.trim().to_lowercase());
            groups.entry(key).or_default().push(record);
        }

        let mut variants = Vec::new();
        let mut anomalies = Vec::new();
        for records in groups.into_values() {
            let group_prices: Vec<i64> = records.iter().map(|record| record.price).collect();
            let mut group = Vec::with_capacity(records.len());

            for record in records {
                let assignment = match self.classifier.classify_for_make(
                    Some(record.make.trim()),
                    &record.variant_name,
                    record.price,
                    &group_prices,
                ) {
                    Ok(assignment) => assignment,
                    Err(error) => {
                        warn!(
                            event_name = "catalog.build.excluded",
                            make = %record.make,
                            model = %record.model,
                            variant = %record.variant_name,
                            error = %error,
                            "variant could not be classified"
                        );
                        excluded.push(exclude(&record, error.to_string()));
                        continue;
                    }
                };
                debug!(
                    event_name = "catalog.build.classified",
                    variant = %record.variant_name,
                    tier = assignment.tier.as_str(),
                    confidence = ?assignment.source.confidence(),
                    "variant classified"
                );

                let mut features = self.categorizer.categorize(&record.raw_features);
                let from_columns = self.categorizer.categorize_attributes(
                    record.attribute_columns.iter().map(|(name, value)| (name, value)),
                );
                for (category, feature) in from_columns.iter() {
                    features.insert(category, feature);
                }

                group.push(Variant {
                    id: VariantId::from_parts(
                        &record.make,
                        &record.model,
                        &record.variant_name,
                        record.year,
                    ),
                    make: record.make.trim().to_string(),
                    model: record.model.trim().to_string(),
                    variant_name: record.variant_name.trim().to_string(),
                    tier: assignment.tier,
                    tier_source: assignment.source,
                    price: record.price,
                    features,
                    attributes: record.attributes,
                });
            }

            let group_anomalies = audit_group(&group);
            group_anomalies.iter().for_each(log_anomaly);
            anomalies.extend(group_anomalies);
            variants.extend(group);
        }

        let snapshot = CatalogSnapshot::new(variants);
        info!(
            event_name = "catalog.build.completed",
            variants = snapshot.len(),
            excluded = excluded.len(),
            anomalies = anomalies.len(),
            "catalog snapshot built"
        );

        BuildReport { snapshot, excluded, anomalies }
    }
}

fn rejection_reason(record: &RawVariantRecord) -> Option<String> {
    if record.make.trim().is_empty()
        || record.model.trim().is_empty()
        || record.variant_name.trim().is_empty()
    {
        return Some("make, model and variant name are required".to_string());
    }
    if record.price < 0 {
        return Some(format!("negative price {}", record.price));
    }
    None
}

fn exclude(record: &RawVariantRecord, reason: String) -> ExcludedVariant {
    ExcludedVariant {
        make: record.make.clone(),
        model: record.model.clone(),
        variant_name: record.variant_name.clone(),
        reason,
    }
}
