pub mod catalog;
pub mod classify;
pub mod config;
pub mod domain;
pub mod errors;
pub mod recommend;

#[cfg(test)]
mod fixtures;

pub use catalog::{
    audit_catalog, audit_group, BuildReport, CatalogBuilder, CatalogError, CatalogIndex,
    CatalogSnapshot, ExcludedVariant, GroupAnomaly, PriceRange, RawVariantRecord, SharedCatalog,
};
pub use classify::{FeatureCategorizer, TierAssignment, TierClassifier};
pub use domain::{
    FeatureCategories, FeatureCategory, Tier, TierConfidence, TierSource, Variant,
    VariantAttributes, VariantId,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use recommend::{
    BudgetQuery, BudgetRecommendation, BudgetSearchEngine, BudgetSearchResult, RankedVariant,
    Recommender, RelaxationPolicy, RequirementQuery, UpgradeCandidate, UpgradePath,
    UpgradePathFinder, UpgradeRecommendation, ValueAssessment,
};
