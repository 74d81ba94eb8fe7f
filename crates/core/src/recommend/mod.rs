pub mod budget;
pub mod diff;
pub mod ranker;
pub mod upgrade;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::CatalogIndex;
use crate::domain::Variant;
use crate::errors::{ApplicationError, DomainError};

pub use budget::{
    BudgetQuery, BudgetSearchEngine, BudgetSearchResult, RelaxationPolicy, DEFAULT_MARGIN_PCT,
    DEFAULT_MAX_RESULTS, DEFAULT_MIN_RESULTS,
};
pub use diff::{diff, UpgradeCandidate, ValueAssessment, GOOD_VALUE_COST_PER_FEATURE};
pub use ranker::{rank, RankedVariant};
pub use upgrade::{UpgradePath, UpgradePathFinder, MAX_UPGRADE_COUNT};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeRecommendation {
    pub selected: Variant,
    pub upgrades: Vec<UpgradeCandidate>,
    pub is_top_variant: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRecommendation {
    pub search: BudgetSearchResult,
    pub ranked: Vec<RankedVariant>,
}

/// Structured form of a free-text request, as produced by an upstream
/// parser. The budget is mandatory; empty lists mean unconstrained. Fuel,
/// body and seating constraints travel in `budget.attributes`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementQuery {
    pub budget: BudgetQuery,
    #[serde(default)]
    pub brands: Vec<String>,
    #[serde(default)]
    pub required_features: Vec<String>,
}

/// Entry point for callers: composes upgrade lookup, diffing, budget search
/// and ranking over one catalog.
pub struct Recommender<C> {
    catalog: C,
    policy: RelaxationPolicy,
}

impl<C: CatalogIndex> Recommender<C> {
    pub fn new(catalog: C) -> Self {
        Self::with_policy(catalog, RelaxationPolicy::default())
    }

    pub fn with_policy(catalog: C, policy: RelaxationPolicy) -> Self {
        Self { catalog, policy }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn recommend_upgrades(
        &self,
        make: &str,
        model: &str,
        variant_name: &str,
        count: usize,
    ) -> Result<UpgradeRecommendation, ApplicationError> {
        let selected = self.catalog.get_by_key(make, model, variant_name)?.ok_or_else(|| {
            DomainError::VariantNotFound {
                make: make.to_string(),
                model: model.to_string(),
                variant_name: variant_name.to_string(),
            }
        })?;

        let path = UpgradePathFinder::new(&self.catalog).find_upgrades(
            &selected.make,
            &selected.model,
            selected.tier_order(),
            count,
        )?;
        let upgrades = path
            .upgrades
            .iter()
            .map(|higher| diff(&selected, higher))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            event_name = "recommend.upgrades",
            variant_id = %selected.id,
            upgrades = upgrades.len(),
            is_top_variant = path.is_top_variant,
            "upgrade recommendation built"
        );

        Ok(UpgradeRecommendation { selected, upgrades, is_top_variant: path.is_top_variant })
    }

    pub fn recommend_by_budget(
        &self,
        query: &BudgetQuery,
        required_features: &[String],
    ) -> Result<BudgetRecommendation, ApplicationError> {
        self.budget_recommendation(query, &[], required_features)
    }

    pub fn recommend_by_requirements(
        &self,
        query: &RequirementQuery,
    ) -> Result<BudgetRecommendation, ApplicationError> {
        self.budget_recommendation(&query.budget, &query.brands, &query.required_features)
    }

    fn budget_recommendation(
        &self,
        query: &BudgetQuery,
        brands: &[String],
        required_features: &[String],
    ) -> Result<BudgetRecommendation, ApplicationError> {
        let search =
            BudgetSearchEngine::with_policy(&self.catalog, self.policy).search_makes(query, brands)?;
        let ranked = rank(search.candidates.clone(), required_features);

        info!(
            event_name = "recommend.budget",
            budget = query.budget,
            brands = brands.len(),
            required_features = required_features.len(),
            candidates = search.candidates.len(),
            relaxed = search.relaxed,
            used_fallback = search.used_fallback,
            "budget recommendation built"
        );

        Ok(BudgetRecommendation { search, ranked })
    }
}
