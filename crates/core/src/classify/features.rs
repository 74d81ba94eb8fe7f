use crate::domain::{FeatureCategories, FeatureCategory};

/// Ordered (category, keywords) table. Earlier rows win, so a string is
/// counted in exactly one category.
pub type KeywordTable = &'static [(FeatureCategory, &'static [&'static str])];

pub const DEFAULT_KEYWORDS: KeywordTable = &[
    (
        FeatureCategory::Safety,
        &[
            "airbags",
            "abs",
            "ebd",
            "esp",
            "asr",
            "traction control",
            "seat-belt",
            "seat belt",
            "child safety",
            "isofix",
            "brake",
            "hill assist",
            "eba",
            "engine immobilizer",
            "high speed alert",
            "parking assistance",
            "camera",
            "sensor",
            "tyre pressure",
        ],
    ),
    (
        FeatureCategory::Comfort,
        &[
            "ac",
            "climate",
            "seat",
            "cushion",
            "armrest",
            "cup holders",
            "cooled glove",
            "ventilation",
            "sun visor",
            "height adjustment",
            "adjustable",
            "heated seats",
            "cruise control",
        ],
    ),
    (
        FeatureCategory::Technology,
        &[
            "touchscreen",
            "infotainment",
            "screen",
            "display",
            "carplay",
            "android auto",
            "bluetooth",
            "usb",
            "navigation",
            "audiosystem",
            "fm radio",
            "cd",
            "mp3",
            "aux",
            "ipod",
            "voice recognition",
            "multifunction display",
            "heads-up display",
            "instrument console",
        ],
    ),
    (
        FeatureCategory::Exterior,
        &[
            "sunroof",
            "alloy",
            "wheel",
            "tyre",
            "led",
            "drl",
            "headlamp",
            "fog",
            "light",
            "mirror",
            "wiper",
            "body type",
            "ground clearance",
            "boot space",
        ],
    ),
    (
        FeatureCategory::Convenience,
        &[
            "keyless",
            "push button",
            "start / stop",
            "power steering",
            "power windows",
            "central locking",
            "remote",
            "boot-lid opener",
            "fuel-lid opener",
            "auto-dimming",
            "rain sensing",
            "paddle shifters",
            "automatic headlamps",
            "welcome lights",
            "ambient",
            "walk away",
            "12v power outlet",
            "cigarette lighter",
        ],
    ),
];

/// Spec-sheet columns that describe the drivetrain or body rather than a
/// feature, even when a keyword would match them (`Seating Capacity` vs
/// `seat`).
const NON_FEATURE_ATTRIBUTES: &[&str] = &[
    "make",
    "model",
    "variant",
    "ex-showroom price",
    "price numeric",
    "variant id",
    "tier order",
    "tier name",
    "tier confidence",
    "displacement",
    "cylinders",
    "power",
    "torque",
    "wheelbase",
    "compression ratio",
    "gross vehicle weight",
    "kerb weight",
    "fuel type",
    "gears",
    "type",
    "seating capacity",
    "doors",
    "engine type",
    "turbocharger",
    "battery",
    "electric range",
    "emission norm",
    "drivetrain",
    "cylinder configuration",
    "engine location",
    "fuel system",
];

#[derive(Clone, Debug)]
pub struct FeatureCategorizer {
    table: KeywordTable,
}

impl Default for FeatureCategorizer {
    fn default() -> Self {
        Self::with_table(DEFAULT_KEYWORDS)
    }
}

impl FeatureCategorizer {
    /// Keywords must be lower case.
    pub fn with_table(table: KeywordTable) -> Self {
        Self { table }
    }

    pub fn category_of(&self, raw: &str) -> Option<FeatureCategory> {
        let lowered = normalize(raw).to_lowercase();
        self.table
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| lowered.contains(keyword)))
            .map(|(category, _)| *category)
    }

    /// Unmatched strings are dropped.
    pub fn categorize<I, S>(&self, raw_features: I) -> FeatureCategories
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut categories = FeatureCategories::new();
        for raw in raw_features {
            let feature = normalize(raw.as_ref());
            if let Some(category) = self.category_of(&feature) {
                categories.insert(category, feature);
            }
        }
        categories
    }

    /// Spec-sheet style input: the column name decides the category and the
    /// cell value decides whether (and how) the feature is listed.
    pub fn categorize_attributes<I, K, V>(&self, columns: I) -> FeatureCategories
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut categories = FeatureCategories::new();
        for (name, value) in columns {
            let name = normalize(name.as_ref());
            if NON_FEATURE_ATTRIBUTES.contains(&name.to_lowercase().as_str()) {
                continue;
            }
            let Some(feature) = attribute_feature(&name, value.as_ref()) else {
                continue;
            };
            if let Some(category) = self.category_of(&name) {
                categories.insert(category, feature);
            }
        }
        categories
    }
}

/// `("Rear AC Vents", "Yes")` lists as `Rear AC Vents`,
/// `("Airbags", "6 Airbags")` as `Airbags: 6 Airbags`; negative or empty
/// cells are not features.
pub fn attribute_feature(name: &str, value: &str) -> Option<String> {
    let value = value.trim();
    match value.to_lowercase().as_str() {
        "" | "no" | "not available" | "false" | "0" | "na" | "n/a" => None,
        "yes" | "available" | "standard" | "true" | "1" => Some(name.to_string()),
        _ => Some(format!("{name}: {value}")),
    }
}

// Column names arrive as `Start_/_Stop_Button`; features read `Start / Stop Button`.
fn normalize(raw: &str) -> String {
    raw.replace('_', " ").split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::{attribute_feature, FeatureCategorizer};
    use crate::domain::FeatureCategory;

    #[test]
    fn first_matching_table_wins() {
        let categorizer = FeatureCategorizer::default();

        assert_eq!(categorizer.category_of("6 Airbags"), Some(FeatureCategory::Safety));
        assert_eq!(categorizer.category_of("Rear AC Vents"), Some(FeatureCategory::Comfort));
        assert_eq!(categorizer.category_of("Apple CarPlay"), Some(FeatureCategory::Technology));
        assert_eq!(categorizer.category_of("Electric Sunroof"), Some(FeatureCategory::Exterior));
        assert_eq!(categorizer.category_of("Keyless Entry"), Some(FeatureCategory::Convenience));
        // `wiper` (exterior) is consulted before `rain sensing` (convenience).
        assert_eq!(categorizer.category_of("Rain Sensing Wipers"), Some(FeatureCategory::Exterior));
    }

    #[test]
    fn matching_is_case_insensitive_and_unmatched_strings_drop() {
        let categorizer = FeatureCategorizer::default();
        let categories = categorizer.categorize(["BLUETOOTH", "abs", "Boot Lamp Poetry", "Abs"]);

        assert_eq!(categories.count(FeatureCategory::Technology), 1);
        assert_eq!(categories.count(FeatureCategory::Safety), 1);
        assert_eq!(categories.len(), 2);
    }

    #[test]
    fn strings_are_never_double_counted() {
        let categorizer = FeatureCategorizer::default();
        // Matches both `seat belt` (safety) and `seat` (comfort).
        let categories = categorizer.categorize(["Seat Belt Warning"]);

        assert_eq!(categories.count(FeatureCategory::Safety), 1);
        assert_eq!(categories.count(FeatureCategory::Comfort), 0);
    }

    #[test]
    fn attribute_columns_use_name_for_category_and_value_for_presence() {
        let categorizer = FeatureCategorizer::default();
        let categories = categorizer.categorize_attributes([
            ("Power_Windows", "Yes"),
            ("Airbags", "Driver, Front Passenger"),
            ("Sunroof", "No"),
            ("Seating_Capacity", "5"),
            ("Start_/_Stop_Button", "Standard"),
        ]);

        let convenience: Vec<&str> = categories.features(FeatureCategory::Convenience).collect();
        assert_eq!(convenience, vec!["Power Windows", "Start / Stop Button"]);
        assert!(categories.contains(FeatureCategory::Safety, "Airbags: Driver, Front Passenger"));
        assert_eq!(categories.count(FeatureCategory::Exterior), 0);
        assert_eq!(categories.count(FeatureCategory::Comfort), 0);
    }

    #[test]
    fn attribute_values_follow_availability_words() {
        assert_eq!(attribute_feature("Cruise Control", "available"), Some("Cruise Control".into()));
        assert_eq!(attribute_feature("Cruise Control", "N/A"), None);
        assert_eq!(attribute_feature("Cruise Control", "  "), None);
        assert_eq!(
            attribute_feature("Airbags", "6 Airbags"),
            Some("Airbags: 6 Airbags".to_string())
        );
    }
}
