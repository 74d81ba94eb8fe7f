//! Demo catalog used by `trimscout seed` and the integration tests.
//!
//! Prices are ex-showroom figures in rupees. The Creta listing has two base
//! trims (E and EX) so the audit has something to report, and the Innova uses
//! Toyota grade codes no rule knows, so it is tiered by price quartile.

use trimscout_core::catalog::RawVariantRecord;
use trimscout_core::domain::VariantAttributes;

const DEMO_YEAR: u16 = 2024;

struct DemoModel {
    make: &'static str,
    model: &'static str,
    fuel_type: &'static str,
    body_type: &'static str,
    seating_capacity: u8,
    trims: &'static [DemoTrim],
}

struct DemoTrim {
    name: &'static str,
    price: i64,
    features: &'static [&'static str],
    columns: &'static [(&'static str, &'static str)],
}

const DEMO_MODELS: &[DemoModel] = &[
    DemoModel {
        make: "Maruti",
        model: "Swift",
        fuel_type: "Petrol",
        body_type: "Hatchback",
        seating_capacity: 5,
        trims: &[
            DemoTrim {
                name: "LXi",
                price: 600_000,
                features: &["Dual Airbags", "ABS with EBD"],
                columns: &[("Power_Steering", "Yes"), ("Central_Locking", "No")],
            },
            DemoTrim {
                name: "VXi",
                price: 700_000,
                features: &["Dual Airbags", "ABS with EBD", "Bluetooth Audio"],
                columns: &[
                    ("Power_Steering", "Yes"),
                    ("Power_Windows", "Front & Rear"),
                    ("Central_Locking", "Yes"),
                ],
            },
            DemoTrim {
                name: "ZXi",
                price: 800_000,
                features: &[
                    "Dual Airbags",
                    "ABS with EBD",
                    "7-inch Touchscreen",
                    "Apple CarPlay",
                    "Rear Parking Camera",
                ],
                columns: &[
                    ("Power_Windows", "Front & Rear"),
                    ("Keyless_Entry", "Yes"),
                    ("Alloy_Wheels", "15 inch"),
                ],
            },
            DemoTrim {
                name: "ZXi+",
                price: 900_000,
                features: &[
                    "6 Airbags",
                    "ABS with EBD",
                    "9-inch Touchscreen",
                    "Apple CarPlay",
                    "Rear Parking Camera",
                    "LED Projector Headlamps",
                    "Automatic Climate Control",
                ],
                columns: &[
                    ("Power_Windows", "Front & Rear"),
                    ("Keyless_Entry", "Yes"),
                    ("Push_Button_Start", "Yes"),
                    ("Alloy_Wheels", "15 inch"),
                ],
            },
        ],
    },
    DemoModel {
        make: "Maruti",
        model: "Baleno",
        fuel_type: "Petrol",
        body_type: "Hatchback",
        seating_capacity: 5,
        trims: &[
            DemoTrim {
                name: "Sigma",
                price: 670_000,
                features: &["Dual Airbags", "ABS with EBD"],
                columns: &[("Power_Windows", "Front")],
            },
            DemoTrim {
                name: "Delta",
                price: 760_000,
                features: &["Dual Airbags", "ABS with EBD", "7-inch Touchscreen"],
                columns: &[("Power_Windows", "Front & Rear")],
            },
            DemoTrim {
                name: "Zeta",
                price: 860_000,
                features: &["6 Airbags", "ABS with EBD", "7-inch Touchscreen", "Rear Camera"],
                columns: &[("Power_Windows", "Front & Rear"), ("Keyless_Entry", "Yes")],
            },
            DemoTrim {
                name: "Alpha",
                price: 960_000,
                features: &[
                    "6 Airbags",
                    "ABS with EBD",
                    "9-inch Touchscreen",
                    "360 View Camera",
                    "Heads-Up Display",
                    "LED Projector Headlamps",
                ],
                columns: &[("Power_Windows", "Front & Rear"), ("Keyless_Entry", "Yes")],
            },
        ],
    },
    DemoModel {
        make: "Hyundai",
        model: "Creta",
        fuel_type: "Petrol",
        body_type: "SUV",
        seating_capacity: 5,
        trims: &[
            DemoTrim {
                name: "E",
                price: 1_100_000,
                features: &["6 Airbags", "ABS with EBD", "Hill Assist Control"],
                columns: &[("Rear_AC_Vents", "Yes")],
            },
            DemoTrim {
                name: "EX",
                price: 1_232_000,
                features: &["6 Airbags", "ABS with EBD", "Hill Assist Control", "8-inch Touchscreen"],
                columns: &[("Rear_AC_Vents", "Yes")],
            },
            DemoTrim {
                name: "S",
                price: 1_339_000,
                features: &[
                    "6 Airbags",
                    "ABS with EBD",
                    "Hill Assist Control",
                    "8-inch Touchscreen",
                    "Android Auto",
                ],
                columns: &[("Rear_AC_Vents", "Yes"), ("Cruise_Control", "Yes")],
            },
            DemoTrim {
                name: "SX",
                price: 1_500_000,
                features: &[
                    "6 Airbags",
                    "ABS with EBD",
                    "Hill Assist Control",
                    "10.25-inch Touchscreen",
                    "Android Auto",
                    "Panoramic Sunroof",
                ],
                columns: &[("Rear_AC_Vents", "Yes"), ("Cruise_Control", "Yes")],
            },
            DemoTrim {
                name: "SX(O)",
                price: 1_750_000,
                features: &[
                    "6 Airbags",
                    "ABS with EBD",
                    "Hill Assist Control",
                    "10.25-inch Touchscreen",
                    "Android Auto",
                    "Panoramic Sunroof",
                    "Ventilated Front Seats",
                    "360 View Camera",
                ],
                columns: &[
                    ("Rear_AC_Vents", "Yes"),
                    ("Cruise_Control", "Yes"),
                    ("Paddle_Shifters", "Yes"),
                ],
            },
        ],
    },
    DemoModel {
        make: "Tata",
        model: "Nexon",
        fuel_type: "Petrol",
        body_type: "SUV",
        seating_capacity: 5,
        trims: &[
            DemoTrim {
                name: "XE",
                price: 800_000,
                features: &["6 Airbags", "ABS with EBD", "ESP"],
                columns: &[("Power_Windows", "Front & Rear")],
            },
            DemoTrim {
                name: "XM",
                price: 900_000,
                features: &["6 Airbags", "ABS with EBD", "ESP", "7-inch Touchscreen"],
                columns: &[("Power_Windows", "Front & Rear"), ("Steering_Mounted_Controls", "Yes")],
            },
            DemoTrim {
                name: "XT",
                price: 1_000_000,
                features: &["6 Airbags", "ABS with EBD", "ESP", "7-inch Touchscreen", "Electric Sunroof"],
                columns: &[("Power_Windows", "Front & Rear"), ("Cruise_Control", "Yes")],
            },
            DemoTrim {
                name: "XZ+",
                price: 1_150_000,
                features: &[
                    "6 Airbags",
                    "ABS with EBD",
                    "ESP",
                    "10.25-inch Touchscreen",
                    "Electric Sunroof",
                    "Ventilated Front Seats",
                    "Wireless Apple CarPlay",
                ],
                columns: &[("Power_Windows", "Front & Rear"), ("Cruise_Control", "Yes")],
            },
        ],
    },
    DemoModel {
        make: "Kia",
        model: "Sonet",
        fuel_type: "Diesel",
        body_type: "SUV",
        seating_capacity: 5,
        trims: &[
            DemoTrim {
                name: "HTE",
                price: 800_000,
                features: &["6 Airbags", "ABS with EBD"],
                columns: &[("Central_Locking", "Yes")],
            },
            DemoTrim {
                name: "HTK",
                price: 900_000,
                features: &["6 Airbags", "ABS with EBD", "8-inch Touchscreen"],
                columns: &[("Central_Locking", "Yes"), ("Keyless_Entry", "Yes")],
            },
            DemoTrim {
                name: "HTX",
                price: 1_100_000,
                features: &["6 Airbags", "ABS with EBD", "8-inch Touchscreen", "Electric Sunroof"],
                columns: &[("Central_Locking", "Yes"), ("Keyless_Entry", "Yes")],
            },
            DemoTrim {
                name: "GTX+",
                price: 1_400_000,
                features: &[
                    "6 Airbags",
                    "ABS with EBD",
                    "10.25-inch Touchscreen",
                    "Electric Sunroof",
                    "Bose Audiosystem",
                    "Ventilated Front Seats",
                ],
                columns: &[("Central_Locking", "Yes"), ("Keyless_Entry", "Yes")],
            },
        ],
    },
    DemoModel {
        make: "Honda",
        model: "City",
        fuel_type: "Petrol",
        body_type: "Sedan",
        seating_capacity: 5,
        trims: &[
            DemoTrim {
                name: "V",
                price: 1_200_000,
                features: &["6 Airbags", "ABS with EBD", "8-inch Touchscreen"],
                columns: &[("Cruise_Control", "No")],
            },
            DemoTrim {
                name: "VX",
                price: 1_350_000,
                features: &["6 Airbags", "ABS with EBD", "8-inch Touchscreen", "Electric Sunroof"],
                columns: &[("Cruise_Control", "Yes")],
            },
            DemoTrim {
                name: "ZX",
                price: 1_500_000,
                features: &[
                    "6 Airbags",
                    "ABS with EBD",
                    "8-inch Touchscreen",
                    "Electric Sunroof",
                    "LED Headlamps",
                    "Lane Watch Camera",
                ],
                columns: &[("Cruise_Control", "Yes"), ("Rain_Sensing_Wipers", "Yes")],
            },
        ],
    },
    DemoModel {
        make: "Toyota",
        model: "Innova Crysta",
        fuel_type: "Diesel",
        body_type: "MUV",
        seating_capacity: 7,
        trims: &[
            DemoTrim {
                name: "GX",
                price: 2_000_000,
                features: &["3 Airbags", "ABS with EBD"],
                columns: &[("Rear_AC_Vents", "Yes")],
            },
            DemoTrim {
                name: "VX",
                price: 2_300_000,
                features: &["7 Airbags", "ABS with EBD", "8-inch Touchscreen"],
                columns: &[("Rear_AC_Vents", "Yes"), ("Cruise_Control", "Yes")],
            },
            DemoTrim {
                name: "ZX",
                price: 2_600_000,
                features: &[
                    "7 Airbags",
                    "ABS with EBD",
                    "8-inch Touchscreen",
                    "Leather Seat Upholstery",
                    "LED Headlamps",
                ],
                columns: &[("Rear_AC_Vents", "Yes"), ("Cruise_Control", "Yes")],
            },
        ],
    },
];

/// Raw demo listings, ready for [`trimscout_core::catalog::CatalogBuilder`].
pub fn demo_records() -> Vec<RawVariantRecord> {
    DEMO_MODELS
        .iter()
        .flat_map(|model| {
            model.trims.iter().map(move |trim| RawVariantRecord {
                make: model.make.to_string(),
                model: model.model.to_string(),
                variant_name: trim.name.to_string(),
                year: DEMO_YEAR,
                price: trim.price,
                raw_features: trim.features.iter().map(|feature| feature.to_string()).collect(),
                attribute_columns: trim
                    .columns
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
                attributes: VariantAttributes {
                    fuel_type: Some(model.fuel_type.to_string()),
                    body_type: Some(model.body_type.to_string()),
                    seating_capacity: Some(model.seating_capacity),
                },
            })
        })
        .collect()
}
