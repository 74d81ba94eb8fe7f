use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Catalog key built from make, model, variant name and model year.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantId(pub String);

impl VariantId {
    /// `("Maruti", "Swift", "VXi", 2024)` becomes `maruti_swift_vxi_2024`.
    ///
    /// Every run of characters outside `[a-z0-9]` collapses to one `_`, so
    /// `ZXi` and `ZXi+` stay distinct keys.
    pub fn from_parts(make: &str, model: &str, variant_name: &str, year: u16) -> Self {
        Self(format!("{}_{}_{}_{year}", slug(make), slug(model), slug(variant_name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_separator_run = false;
    for ch in value.trim().to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            out.push(ch);
            in_separator_run = false;
        } else if !in_separator_run {
            out.push('_');
            in_separator_run = true;
        }
    }
    out
}

/// Ordinal trim rank of a variant within its model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Base,
    Mid,
    High,
    Top,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Base, Tier::Mid, Tier::High, Tier::Top];

    pub fn order(self) -> u8 {
        match self {
            Self::Base => 1,
            Self::Mid => 2,
            Self::High => 3,
            Self::Top => 4,
        }
    }

    pub fn from_order(order: u8) -> Option<Self> {
        match order {
            1 => Some(Self::Base),
            2 => Some(Self::Mid),
            3 => Some(Self::High),
            4 => Some(Self::Top),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Mid => "mid",
            Self::High => "high",
            Self::Top => "top",
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "base" | "1" => Ok(Self::Base),
            "mid" | "2" => Ok(Self::Mid),
            "high" | "3" => Ok(Self::High),
            "top" | "4" => Ok(Self::Top),
            other => Err(format!("unknown tier `{other}` (expected base|mid|high|top)")),
        }
    }
}

/// How a tier was decided for a variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum TierSource {
    NamePattern { family: String, make_specific: bool },
    PriceQuartile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierConfidence {
    Low,
    Medium,
    High,
}

impl TierSource {
    pub fn confidence(&self) -> TierConfidence {
        match self {
            Self::NamePattern { make_specific: true, .. } => TierConfidence::High,
            Self::NamePattern { make_specific: false, .. } => TierConfidence::Medium,
            Self::PriceQuartile => TierConfidence::Low,
        }
    }
}

/// The five fixed buckets raw feature strings are sorted into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureCategory {
    Safety,
    Comfort,
    Technology,
    Exterior,
    Convenience,
}

impl FeatureCategory {
    pub const ALL: [FeatureCategory; 5] = [
        FeatureCategory::Safety,
        FeatureCategory::Comfort,
        FeatureCategory::Technology,
        FeatureCategory::Exterior,
        FeatureCategory::Convenience,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safety => "safety",
            Self::Comfort => "comfort",
            Self::Technology => "technology",
            Self::Exterior => "exterior",
            Self::Convenience => "convenience",
        }
    }
}

/// Category -> feature set. Features are unique per category under
/// case-insensitive comparison; the first spelling inserted is kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<FeatureCategory, Vec<String>>")]
pub struct FeatureCategories(BTreeMap<FeatureCategory, BTreeSet<String>>);

impl FeatureCategories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the feature is blank or already present.
    pub fn insert(&mut self, category: FeatureCategory, feature: impl Into<String>) -> bool {
        let feature = feature.into();
        let feature = feature.trim();
        if feature.is_empty() || self.contains(category, feature) {
            return false;
        }
        self.0.entry(category).or_default().insert(feature.to_string())
    }

    pub fn contains(&self, category: FeatureCategory, feature: &str) -> bool {
        self.0
            .get(&category)
            .map(|features| features.iter().any(|known| known.eq_ignore_ascii_case(feature)))
            .unwrap_or(false)
    }

    pub fn features(&self, category: FeatureCategory) -> impl Iterator<Item = &str> {
        self.0.get(&category).into_iter().flat_map(|features| features.iter().map(String::as_str))
    }

    pub fn count(&self, category: FeatureCategory) -> usize {
        self.0.get(&category).map(BTreeSet::len).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureCategory, &str)> {
        self.0.iter().flat_map(|(category, features)| {
            features.iter().map(move |feature| (*category, feature.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<BTreeMap<FeatureCategory, Vec<String>>> for FeatureCategories {
    fn from(raw: BTreeMap<FeatureCategory, Vec<String>>) -> Self {
        raw.into_iter()
            .flat_map(|(category, features)| features.into_iter().map(move |f| (category, f)))
            .collect()
    }
}

impl FromIterator<(FeatureCategory, String)> for FeatureCategories {
    fn from_iter<I: IntoIterator<Item = (FeatureCategory, String)>>(iter: I) -> Self {
        let mut categories = Self::new();
        for (category, feature) in iter {
            categories.insert(category, feature);
        }
        categories
    }
}

/// Descriptive columns carried through from ingestion; not used for ranking.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAttributes {
    pub fuel_type: Option<String>,
    pub body_type: Option<String>,
    pub seating_capacity: Option<u8>,
}

/// Strict attribute constraints for a search. `None` is unconstrained; a set
/// field rejects variants whose attribute differs or is unknown.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeFilter {
    pub fuel_type: Option<String>,
    pub body_type: Option<String>,
    pub seating_capacity: Option<u8>,
}

impl AttributeFilter {
    pub fn is_unconstrained(&self) -> bool {
        self.fuel_type.is_none() && self.body_type.is_none() && self.seating_capacity.is_none()
    }

    pub fn matches(&self, attributes: &VariantAttributes) -> bool {
        fn same_text(wanted: Option<&str>, actual: Option<&str>) -> bool {
            wanted.map_or(true, |wanted| {
                actual.is_some_and(|actual| actual.trim().eq_ignore_ascii_case(wanted.trim()))
            })
        }

        same_text(self.fuel_type.as_deref(), attributes.fuel_type.as_deref())
            && same_text(self.body_type.as_deref(), attributes.body_type.as_deref())
            && self.seating_capacity.map_or(true, |seats| attributes.seating_capacity == Some(seats))
    }
}

/// A classified, categorized trim of a model. Read-only once in a catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub make: String,
    pub model: String,
    pub variant_name: String,
    pub tier: Tier,
    pub tier_source: TierSource,
    pub price: i64,
    pub features: FeatureCategories,
    #[serde(default)]
    pub attributes: VariantAttributes,
}

impl Variant {
    pub fn tier_order(&self) -> u8 {
        self.tier.order()
    }

    pub fn in_group(&self, make: &str, model: &str) -> bool {
        self.make.eq_ignore_ascii_case(make) && self.model.eq_ignore_ascii_case(model)
    }

    pub fn matches_scope(&self, make: Option<&str>, model: Option<&str>) -> bool {
        make.map_or(true, |make| self.make.eq_ignore_ascii_case(make))
            && model.map_or(true, |model| self.model.eq_ignore_ascii_case(model))
    }

    /// Identity used to collapse duplicate listings of the same trim.
    pub fn listing_key(&self) -> (String, String, String) {
        (
            self.make.to_lowercase(),
            self.model.to_lowercase(),
            self.variant_name.to_lowercase(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AttributeFilter, FeatureCategories, FeatureCategory, Tier, TierConfidence, TierSource,
        VariantAttributes, VariantId,
    };

    #[test]
    fn attribute_filter_is_strict_and_case_insensitive() {
        let diesel_suv = VariantAttributes {
            fuel_type: Some("Diesel".to_string()),
            body_type: Some("SUV".to_string()),
            seating_capacity: Some(7),
        };
        let filter = AttributeFilter {
            fuel_type: Some("diesel".to_string()),
            seating_capacity: Some(7),
            ..AttributeFilter::default()
        };

        assert!(filter.matches(&diesel_suv));
        assert!(!filter.matches(&VariantAttributes {
            seating_capacity: Some(5),
            ..diesel_suv.clone()
        }));
        assert!(!filter.matches(&VariantAttributes::default()));
        assert!(AttributeFilter::default().matches(&VariantAttributes::default()));
        assert!(AttributeFilter::default().is_unconstrained());
    }

    #[test]
    fn variant_id_collapses_separator_runs() {
        assert_eq!(VariantId::from_parts("Maruti", "Swift", "VXi", 2024).0, "maruti_swift_vxi_2024");
        assert_eq!(
            VariantId::from_parts("Maruti Suzuki", "Swift", "ZXi+", 2024).0,
            "maruti_suzuki_swift_zxi__2024"
        );
        assert_ne!(
            VariantId::from_parts("Maruti", "Swift", "ZXi", 2024),
            VariantId::from_parts("Maruti", "Swift", "ZXi+", 2024)
        );
    }

    #[test]
    fn tier_order_round_trips_through_from_order() {
        for tier in Tier::ALL {
            assert_eq!(Tier::from_order(tier.order()), Some(tier));
        }
        assert_eq!(Tier::from_order(0), None);
        assert_eq!(Tier::from_order(5), None);
    }

    #[test]
    fn feature_insert_is_case_insensitive_unique() {
        let mut features = FeatureCategories::new();
        assert!(features.insert(FeatureCategory::Safety, "ABS"));
        assert!(!features.insert(FeatureCategory::Safety, "abs"));
        assert!(!features.insert(FeatureCategory::Safety, "   "));
        assert!(features.insert(FeatureCategory::Comfort, "abs"));

        assert_eq!(features.count(FeatureCategory::Safety), 1);
        assert_eq!(features.len(), 2);
        assert!(features.contains(FeatureCategory::Safety, "Abs"));
    }

    #[test]
    fn feature_deserialize_enforces_uniqueness() {
        let features: FeatureCategories =
            serde_json::from_str(r#"{"safety":["ABS","abs","4 airbags"],"exterior":[]}"#)
                .expect("valid feature json");

        assert_eq!(features.count(FeatureCategory::Safety), 2);
        assert_eq!(features.count(FeatureCategory::Exterior), 0);
    }

    #[test]
    fn tier_source_confidence_levels() {
        let brand = TierSource::NamePattern { family: "maruti".into(), make_specific: true };
        let generic = TierSource::NamePattern { family: "generic".into(), make_specific: false };

        assert_eq!(brand.confidence(), TierConfidence::High);
        assert_eq!(generic.confidence(), TierConfidence::Medium);
        assert_eq!(TierSource::PriceQuartile.confidence(), TierConfidence::Low);
    }
}
