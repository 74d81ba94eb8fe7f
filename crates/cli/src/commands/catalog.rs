use serde::Serialize;
use trimscout_core::catalog::{audit_catalog, CatalogIndex, CatalogSnapshot};
use trimscout_core::config::AppConfig;
use trimscout_core::domain::{FeatureCategories, Tier};
use trimscout_core::errors::ApplicationError;

use crate::commands::{load_catalog, CommandResult};

#[derive(Debug, Serialize)]
struct VariantRow<'a> {
    variant_name: &'a str,
    tier: Tier,
    price: i64,
    features: &'a FeatureCategories,
}

pub fn makes(config: &AppConfig) -> CommandResult {
    with_catalog("makes", config, |catalog| {
        let makes = catalog.list_makes()?;
        Ok(CommandResult::success_with_data("makes", format!("{} makes", makes.len()), &makes))
    })
}

pub fn models(config: &AppConfig, make: &str) -> CommandResult {
    with_catalog("models", config, |catalog| {
        let models = catalog.list_models(make)?;
        Ok(CommandResult::success_with_data(
            "models",
            format!("{} models for {make}", models.len()),
            &models,
        ))
    })
}

pub fn variants(config: &AppConfig, make: &str, model: &str) -> CommandResult {
    with_catalog("variants", config, |catalog| {
        let group = catalog.get_group(make, model)?;
        let rows: Vec<VariantRow<'_>> = group
            .iter()
            .map(|variant| VariantRow {
                variant_name: &variant.variant_name,
                tier: variant.tier,
                price: variant.price,
                features: &variant.features,
            })
            .collect();
        Ok(CommandResult::success_with_data(
            "variants",
            format!("{} variants for {make} {model}", rows.len()),
            &rows,
        ))
    })
}

/// Re-runs the grouping checks over the stored catalog.
pub fn audit(config: &AppConfig) -> CommandResult {
    with_catalog("audit", config, |catalog| {
        let anomalies = audit_catalog(catalog)?;
        let message = if anomalies.is_empty() {
            "no anomalies found".to_string()
        } else {
            format!("{} anomalies flagged", anomalies.len())
        };
        Ok(CommandResult::success_with_data("audit", message, &anomalies))
    })
}

pub(crate) fn with_catalog(
    command: &str,
    config: &AppConfig,
    handler: impl FnOnce(&CatalogSnapshot) -> Result<CommandResult, ApplicationError>,
) -> CommandResult {
    let catalog = match load_catalog(config) {
        Ok(catalog) => catalog,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure(command, error_class, message, exit_code);
        }
    };

    handler(&catalog).unwrap_or_else(|error| CommandResult::from_application_error(command, error))
}
