use trimscout_core::config::AppConfig;
use trimscout_core::domain::AttributeFilter;
use trimscout_core::errors::{ApplicationError, DomainError};
use trimscout_core::recommend::{BudgetQuery, Recommender, RequirementQuery};

use crate::commands::catalog::with_catalog;
use crate::commands::CommandResult;

#[derive(Debug, Clone, Default)]
pub struct BudgetArgs {
    pub budget: Option<i64>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub margin_pct: Option<u32>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub min_results: Option<usize>,
    pub max_results: Option<usize>,
    pub brands: Vec<String>,
    pub features: Vec<String>,
    pub fuel_type: Option<String>,
    pub body_type: Option<String>,
    pub seating_capacity: Option<u8>,
}

impl BudgetArgs {
    /// Fills unset flags from the `[search]` config section. A price range
    /// stands in for the budget; giving both is rejected.
    pub fn into_query(self, config: &AppConfig) -> Result<RequirementQuery, DomainError> {
        let mut budget = match (self.budget, self.price_min, self.price_max) {
            (Some(budget), None, None) => config.search.budget_query(budget),
            (Some(_), _, _) => {
                return Err(DomainError::InvalidQuery(
                    "give either a budget or a price range, not both".to_string(),
                ))
            }
            (None, min, max) => {
                let ranged = BudgetQuery::from_range(min, max)?;
                let mut query = config.search.budget_query(ranged.budget);
                if min.is_some() && max.is_some() {
                    query.margin_pct = ranged.margin_pct;
                }
                query
            }
        };
        if let Some(margin_pct) = self.margin_pct {
            budget.margin_pct = margin_pct;
        }
        if let Some(min_results) = self.min_results {
            budget.min_results = min_results;
        }
        if let Some(max_results) = self.max_results {
            budget.max_results = max_results;
        }
        budget.make = self.make;
        budget.model = self.model;
        budget.attributes = AttributeFilter {
            fuel_type: self.fuel_type,
            body_type: self.body_type,
            seating_capacity: self.seating_capacity,
        };

        Ok(RequirementQuery { budget, brands: self.brands, required_features: self.features })
    }
}

pub fn upgrades(
    config: &AppConfig,
    make: &str,
    model: &str,
    variant_name: &str,
    count: Option<usize>,
) -> CommandResult {
    let count = count.unwrap_or(config.search.upgrade_count);
    with_catalog("upgrades", config, |catalog| {
        let recommender = Recommender::with_policy(catalog, config.search.relaxation_policy());
        let recommendation = recommender.recommend_upgrades(make, model, variant_name, count)?;
        let message = if recommendation.is_top_variant {
            format!("{variant_name} is the top variant of {make} {model}")
        } else {
            format!("{} upgrades above {variant_name}", recommendation.upgrades.len())
        };
        Ok(CommandResult::success_with_data("upgrades", message, &recommendation))
    })
}

pub fn budget(config: &AppConfig, args: BudgetArgs) -> CommandResult {
    let query = match args.into_query(config) {
        Ok(query) => query,
        Err(error) => {
            return CommandResult::from_application_error("budget", ApplicationError::from(error))
        }
    };
    with_catalog("budget", config, |catalog| {
        let recommender = Recommender::with_policy(catalog, config.search.relaxation_policy());
        let recommendation = recommender.recommend_by_requirements(&query)?;
        let search = &recommendation.search;
        let message = if search.used_fallback {
            format!(
                "{} variants near {} after widening to {}%",
                search.candidates.len(),
                query.budget.budget,
                search.effective_margin_pct
            )
        } else {
            format!(
                "{} variants within {}% of {}",
                search.candidates.len(),
                search.effective_margin_pct,
                query.budget.budget
            )
        };
        Ok(CommandResult::success_with_data("budget", message, &recommendation))
    })
}
