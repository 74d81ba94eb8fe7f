pub mod features;
pub mod tier;

pub use features::{attribute_feature, FeatureCategorizer, KeywordTable, DEFAULT_KEYWORDS};
pub use tier::{
    PriceQuartileStrategy, RuleFamily, TierAssignment, TierClassifier, TierRule, DEFAULT_FAMILIES,
};
