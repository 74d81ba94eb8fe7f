use crate::domain::{
    FeatureCategories, FeatureCategory, Tier, TierSource, Variant, VariantAttributes, VariantId,
};

pub fn variant(
    make: &str,
    model: &str,
    variant_name: &str,
    tier: Tier,
    price: i64,
    features: &[(FeatureCategory, &str)],
) -> Variant {
    Variant {
        id: VariantId::from_parts(make, model, variant_name, 2024),
        make: make.to_string(),
        model: model.to_string(),
        variant_name: variant_name.to_string(),
        tier,
        tier_source: TierSource::NamePattern {
            family: make.to_lowercase(),
            make_specific: true,
        },
        price,
        features: features
            .iter()
            .map(|(category, feature)| (*category, (*feature).to_string()))
            .collect::<FeatureCategories>(),
        attributes: VariantAttributes::default(),
    }
}

/// LXi 600000, VXi 700000, ZXi 800000, ZXi+ 900000.
pub fn maruti_swift_group() -> Vec<Variant> {
    use FeatureCategory::*;

    vec![
        variant("Maruti", "Swift", "LXi", Tier::Base, 600_000, &[(Safety, "4 airbags")]),
        variant(
            "Maruti",
            "Swift",
            "VXi",
            Tier::Mid,
            700_000,
            &[(Safety, "4 airbags"), (Safety, "ABS"), (Convenience, "Power Windows")],
        ),
        variant(
            "Maruti",
            "Swift",
            "ZXi",
            Tier::High,
            800_000,
            &[
                (Safety, "4 airbags"),
                (Safety, "ABS"),
                (Convenience, "Power Windows"),
                (Technology, "Touchscreen Infotainment"),
                (Technology, "Apple CarPlay"),
            ],
        ),
        variant(
            "Maruti",
            "Swift",
            "ZXi+",
            Tier::Top,
            900_000,
            &[
                (Safety, "6 airbags"),
                (Safety, "ABS"),
                (Convenience, "Power Windows"),
                (Convenience, "Keyless Entry"),
                (Technology, "Touchscreen Infotainment"),
                (Technology, "Apple CarPlay"),
                (Exterior, "LED Headlamps"),
                (Comfort, "Climate Control"),
            ],
        ),
    ]
}
