pub mod variant;

pub use variant::{
    AttributeFilter, FeatureCategories, FeatureCategory, Tier, TierConfidence, TierSource, Variant,
    VariantAttributes, VariantId,
};
