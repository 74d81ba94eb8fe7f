//! Budget-constrained search with progressive margin relaxation.
//!
//! The search widens its price band in fixed steps until enough candidates are
//! found or the cap is reached, and only then falls back to the nearest
//! listings on either side of the budget. Every stage is reported in the
//! result; an empty result is a valid answer, not an error.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::{compare_by_proximity, CatalogIndex, PriceRange};
use crate::domain::{AttributeFilter, Variant};
use crate::errors::{ApplicationError, DomainError};

pub const DEFAULT_MARGIN_PCT: u32 = 10;
pub const DEFAULT_MIN_RESULTS: usize = 2;
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// `budget` is required when deserializing; an absent budget is never read
/// as zero. Every other field falls back to its default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetQuery {
    pub budget: i64,
    /// Tolerance around the budget, in whole percentage points.
    #[serde(default = "default_margin_pct")]
    pub margin_pct: u32,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_min_results")]
    pub min_results: usize,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Applied to every band and to the fallback, like make and model.
    #[serde(default)]
    pub attributes: AttributeFilter,
}

fn default_margin_pct() -> u32 {
    DEFAULT_MARGIN_PCT
}

fn default_min_results() -> usize {
    DEFAULT_MIN_RESULTS
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

impl BudgetQuery {
    pub fn new(budget: i64) -> Self {
        Self {
            budget,
            margin_pct: DEFAULT_MARGIN_PCT,
            make: None,
            model: None,
            min_results: DEFAULT_MIN_RESULTS,
            max_results: DEFAULT_MAX_RESULTS,
            attributes: AttributeFilter::default(),
        }
    }

    /// A query for a price range. With both ends the budget is the midpoint
    /// and the margin is the smallest whole percentage whose band covers the
    /// range; with one end that price is the budget at the default margin.
    pub fn from_range(min: Option<i64>, max: Option<i64>) -> Result<Self, DomainError> {
        match (min, max) {
            (Some(min), Some(max)) if min > max => Err(DomainError::InvalidQuery(format!(
                "budget range is inverted: {min} > {max}"
            ))),
            (Some(min), Some(max)) => {
                let midpoint = min + (max - min + 1) / 2;
                let half_width = i128::from(midpoint - min);
                let margin_pct = if midpoint <= 0 {
                    0
                } else {
                    let midpoint = i128::from(midpoint);
                    let ceiling = (half_width * 100 + midpoint - 1) / midpoint;
                    u32::try_from(ceiling.min(100)).unwrap_or(100)
                };
                Ok(Self { margin_pct, ..Self::new(midpoint) })
            }
            (Some(price), None) | (None, Some(price)) => Ok(Self::new(price)),
            (None, None) => {
                Err(DomainError::InvalidQuery("a budget or budget range is required".to_string()))
            }
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.budget < 0 {
            return Err(DomainError::InvalidQuery(format!(
                "budget must not be negative, got {}",
                self.budget
            )));
        }
        if self.margin_pct > 100 {
            return Err(DomainError::InvalidQuery(format!(
                "margin_pct must be within 0..=100, got {}",
                self.margin_pct
            )));
        }
        if self.min_results == 0 || self.min_results > self.max_results {
            return Err(DomainError::InvalidQuery(format!(
                "expected 1 <= min_results <= max_results, got {} and {}",
                self.min_results, self.max_results
            )));
        }
        Ok(())
    }

    /// Inclusive `[budget * (1 - m/100), budget * (1 + m/100)]`.
    pub fn bounds_at(&self, margin_pct: u32) -> PriceRange {
        let budget = Decimal::from(self.budget);
        let delta = budget * Decimal::from(margin_pct) / Decimal::ONE_HUNDRED;
        PriceRange::new(budget - delta, budget + delta)
    }
}

/// How far and how fast the margin may widen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaxationPolicy {
    pub step_pct: u32,
    pub max_margin_pct: u32,
}

impl Default for RelaxationPolicy {
    fn default() -> Self {
        Self { step_pct: 5, max_margin_pct: 50 }
    }
}

impl RelaxationPolicy {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.step_pct == 0 {
            return Err(DomainError::InvalidQuery("margin step must be positive".to_string()));
        }
        if self.max_margin_pct > 100 {
            return Err(DomainError::InvalidQuery(format!(
                "margin cap must be within 0..=100, got {}",
                self.max_margin_pct
            )));
        }
        Ok(())
    }

    /// Next margin after `margin`, or `None` once the cap is reached.
    pub fn next_margin(&self, margin: u32) -> Option<u32> {
        (margin < self.max_margin_pct)
            .then(|| margin.saturating_add(self.step_pct).min(self.max_margin_pct))
    }

    /// Upper bound on search rounds starting from `margin`.
    pub fn max_rounds(&self, margin: u32) -> u32 {
        self.max_margin_pct.saturating_sub(margin).div_ceil(self.step_pct.max(1)) + 1
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSearchResult {
    pub candidates: Vec<Variant>,
    pub relaxed: bool,
    pub used_fallback: bool,
    /// Margin of the last band searched.
    pub effective_margin_pct: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SearchState {
    Searching(u32),
    Relaxed(u32),
    Fallback(u32),
}

pub struct BudgetSearchEngine<C> {
    catalog: C,
    policy: RelaxationPolicy,
}

impl<C: CatalogIndex> BudgetSearchEngine<C> {
    pub fn new(catalog: C) -> Self {
        Self::with_policy(catalog, RelaxationPolicy::default())
    }

    pub fn with_policy(catalog: C, policy: RelaxationPolicy) -> Self {
        Self { catalog, policy }
    }

    pub fn search(&self, query: &BudgetQuery) -> Result<BudgetSearchResult, ApplicationError> {
        self.search_makes(query, &[])
    }

    /// Searches the union of `makes`. When `query.make` is also set, only
    /// the listed makes equal to it are searched, so both filters hold.
    pub fn search_makes(
        &self,
        query: &BudgetQuery,
        makes: &[String],
    ) -> Result<BudgetSearchResult, ApplicationError> {
        query.validate()?;
        self.policy.validate()?;

        let scopes: Vec<Option<&str>> = match (query.make.as_deref(), makes.is_empty()) {
            (make, true) => vec![make],
            (None, false) => makes.iter().map(|make| Some(make.as_str())).collect(),
            (Some(make), false) => makes
                .iter()
                .filter(|listed| listed.trim().eq_ignore_ascii_case(make.trim()))
                .map(|listed| Some(listed.as_str()))
                .take(1)
                .collect(),
        };
        if scopes.is_empty() {
            debug!(
                event_name = "search.budget.disjoint_makes",
                budget = query.budget,
                "make filter and brand list share no make"
            );
            return Ok(self.finish(query, Vec::new(), false, false, query.margin_pct));
        }

        let mut relaxed = false;
        let mut candidates = Vec::new();
        let mut state = SearchState::Searching(query.margin_pct);
        let mut rounds_left = self.policy.max_rounds(query.margin_pct);

        loop {
            match state {
                SearchState::Searching(margin) => {
                    candidates = self.collect(query, &scopes, margin)?;
                    rounds_left = rounds_left.saturating_sub(1);
                    if candidates.len() >= query.min_results {
                        return Ok(self.finish(query, candidates, relaxed, false, margin));
                    }
                    state = match self.policy.next_margin(margin) {
                        Some(next) if rounds_left > 0 => SearchState::Relaxed(next),
                        _ => SearchState::Fallback(margin),
                    };
                }
                SearchState::Relaxed(margin) => {
                    relaxed = true;
                    debug!(
                        event_name = "search.budget.relaxed",
                        budget = query.budget,
                        margin_pct = margin,
                        found = candidates.len(),
                        min_results = query.min_results,
                        "widening budget margin"
                    );
                    state = SearchState::Searching(margin);
                }
                SearchState::Fallback(margin) => {
                    let below = self.nearest(&scopes, query, Direction::Below)?;
                    let above = self.nearest(&scopes, query, Direction::Above)?;
                    info!(
                        event_name = "search.budget.fallback",
                        budget = query.budget,
                        margin_pct = margin,
                        found = candidates.len(),
                        nearest_below = below.as_ref().map(|v| v.variant_name.as_str()),
                        nearest_above = above.as_ref().map(|v| v.variant_name.as_str()),
                        "margin cap reached, adding nearest listings"
                    );
                    candidates.extend(below);
                    candidates.extend(above);
                    let candidates = dedupe_and_sort(candidates, query.budget);
                    return Ok(self.finish(query, candidates, relaxed, true, margin));
                }
            }
        }
    }

    fn collect(
        &self,
        query: &BudgetQuery,
        scopes: &[Option<&str>],
        margin_pct: u32,
    ) -> Result<Vec<Variant>, ApplicationError> {
        let range = query.bounds_at(margin_pct);
        let mut found = Vec::new();
        for make in scopes {
            found.extend(self.catalog.query_by_price_range(&range, *make, query.model.as_deref())?);
        }
        found.retain(|variant| query.attributes.matches(&variant.attributes));
        Ok(dedupe_and_sort(found, query.budget))
    }

    fn nearest(
        &self,
        scopes: &[Option<&str>],
        query: &BudgetQuery,
        direction: Direction,
    ) -> Result<Option<Variant>, ApplicationError> {
        let model = query.model.as_deref();
        let mut best: Option<Variant> = None;
        for make in scopes {
            let found = if query.attributes.is_unconstrained() {
                match direction {
                    Direction::Below => self.catalog.nearest_at_or_below(query.budget, *make, model)?,
                    Direction::Above => self.catalog.nearest_at_or_above(query.budget, *make, model)?,
                }
            } else {
                let range = match direction {
                    Direction::Below => PriceRange::at_most(query.budget),
                    Direction::Above => PriceRange::at_least(query.budget),
                };
                self.catalog
                    .query_by_price_range(&range, *make, model)?
                    .into_iter()
                    .filter(|variant| query.attributes.matches(&variant.attributes))
                    .min_by(|left, right| compare_by_proximity(left, right, query.budget))
            };
            best = match (best, found) {
                (Some(current), Some(found)) => {
                    if compare_by_proximity(&found, &current, query.budget).is_lt() {
                        Some(found)
                    } else {
                        Some(current)
                    }
                }
                (current, found) => current.or(found),
            };
        }
        Ok(best)
    }

    fn finish(
        &self,
        query: &BudgetQuery,
        mut candidates: Vec<Variant>,
        relaxed: bool,
        used_fallback: bool,
        effective_margin_pct: u32,
    ) -> BudgetSearchResult {
        candidates.truncate(query.max_results);
        debug!(
            event_name = "search.budget.completed",
            budget = query.budget,
            candidates = candidates.len(),
            relaxed,
            used_fallback,
            effective_margin_pct,
            "budget search finished"
        );
        BudgetSearchResult { candidates, relaxed, used_fallback, effective_margin_pct }
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Below,
    Above,
}

/// One entry per (make, model, variant name), cheapest listing kept, ordered
/// by distance from the budget.
fn dedupe_and_sort(variants: Vec<Variant>, budget: i64) -> Vec<Variant> {
    let mut unique: BTreeMap<(String, String, String), Variant> = BTreeMap::new();
    for variant in variants {
        match unique.get(&variant.listing_key()) {
            Some(kept) if kept.price <= variant.price => {}
            _ => {
                unique.insert(variant.listing_key(), variant);
            }
        }
    }
    let mut sorted: Vec<Variant> = unique.into_values().collect();
    sorted.sort_by(|left, right| compare_by_proximity(left, right, budget));
    sorted
}

#[cfg(test)]
mod tests {
    use super::{BudgetQuery, BudgetSearchEngine, RelaxationPolicy};
    use crate::catalog::CatalogSnapshot;
    use crate::domain::{AttributeFilter, Tier, Variant, VariantAttributes, VariantId};
    use crate::errors::{ApplicationError, DomainError};
    use crate::fixtures::{maruti_swift_group, variant};

    fn engine(variants: Vec<Variant>) -> BudgetSearchEngine<CatalogSnapshot> {
        BudgetSearchEngine::new(CatalogSnapshot::new(variants))
    }

    fn names(variants: &[Variant]) -> Vec<&str> {
        variants.iter().map(|variant| variant.variant_name.as_str()).collect()
    }

    #[test]
    fn five_percent_band_relaxes_to_ten() {
        let query = BudgetQuery { margin_pct: 5, ..BudgetQuery::new(750_000) };
        let bounds = query.bounds_at(5);
        assert!(bounds.contains(712_500) && bounds.contains(787_500));
        assert!(!bounds.contains(700_000) && !bounds.contains(800_000));

        let result = engine(maruti_swift_group()).search(&query).expect("search");

        // Equidistant from the budget, so the cheaper one leads.
        assert_eq!(names(&result.candidates), vec!["VXi", "ZXi"]);
        assert!(result.relaxed);
        assert!(!result.used_fallback);
        assert_eq!(result.effective_margin_pct, 10);
    }

    #[test]
    fn unreasonably_low_budget_falls_back_to_nearest_above() {
        let result = engine(maruti_swift_group()).search(&BudgetQuery::new(100)).expect("search");

        assert_eq!(names(&result.candidates), vec!["LXi"]);
        assert!(result.relaxed);
        assert!(result.used_fallback);
        assert_eq!(result.effective_margin_pct, 50);
    }

    #[test]
    fn fallback_merges_with_candidates_already_found() {
        let mut variants = maruti_swift_group();
        variants.push(variant("Maruti", "Dzire", "LXi", Tier::Base, 5_000_000, &[]));
        let query = BudgetQuery { min_results: 4, max_results: 5, ..BudgetQuery::new(2_000_000) };

        let result = engine(variants).search(&query).expect("search");

        // 50% band is [1_000_000, 3_000_000]: nothing inside.
        assert!(result.used_fallback);
        assert_eq!(names(&result.candidates), vec!["ZXi+", "LXi"]);
        assert_eq!(result.candidates[1].model, "Dzire");
    }

    #[test]
    fn exact_price_counts_as_both_below_and_above_once() {
        let query = BudgetQuery { margin_pct: 0, min_results: 2, ..BudgetQuery::new(3_000_000) };
        let mut variants = maruti_swift_group();
        variants.push(variant("Toyota", "Fortuner", "Legender", Tier::Top, 3_000_000, &[]));

        let result = engine(variants).search(&query).expect("search");

        assert!(result.used_fallback);
        assert_eq!(names(&result.candidates), vec!["Legender"]);
    }

    #[test]
    fn make_and_model_filters_are_strict() {
        let mut variants = maruti_swift_group();
        variants.push(variant("Hyundai", "i20", "Sportz", Tier::High, 760_000, &[]));
        let query = BudgetQuery {
            make: Some("hyundai".into()),
            model: Some("I20".into()),
            min_results: 1,
            ..BudgetQuery::new(750_000)
        };

        let result = engine(variants).search(&query).expect("search");

        assert_eq!(names(&result.candidates), vec!["Sportz"]);
        assert!(!result.relaxed);
        assert_eq!(result.effective_margin_pct, 10);
    }

    #[test]
    fn duplicate_listings_keep_cheapest() {
        let mut variants = maruti_swift_group();
        let mut relisted = variants[1].clone();
        relisted.id = VariantId::from_parts("Maruti", "Swift", "VXi", 2023);
        relisted.price = 690_000;
        variants.push(relisted);

        let query = BudgetQuery { margin_pct: 20, ..BudgetQuery::new(700_000) };
        let result = engine(variants).search(&query).expect("search");

        let vxi: Vec<&Variant> =
            result.candidates.iter().filter(|v| v.variant_name == "VXi").collect();
        assert_eq!(vxi.len(), 1);
        assert_eq!(vxi[0].price, 690_000);
    }

    #[test]
    fn candidate_count_stays_within_bounds_and_grows_with_margin() {
        let catalog = CatalogSnapshot::new(maruti_swift_group());
        let engine = BudgetSearchEngine::new(&catalog);
        let total = catalog.len();

        for budget in [0, 100, 550_000, 650_000, 750_000, 1_000_000, 5_000_000] {
            let mut previous = 0;
            for margin_pct in [0, 5, 10, 25, 50, 100] {
                let query = BudgetQuery { margin_pct, max_results: 3, ..BudgetQuery::new(budget) };
                let result = engine.search(&query).expect("search");
                let len = result.candidates.len();

                assert!(len <= query.max_results);
                assert!(len >= 1.min(total));
                if !result.used_fallback {
                    assert!(len >= previous);
                    previous = len;
                }
            }
        }
    }

    #[test]
    fn identical_queries_give_identical_results() {
        let catalog = CatalogSnapshot::new(maruti_swift_group());
        let engine = BudgetSearchEngine::new(&catalog);
        let query = BudgetQuery { margin_pct: 15, max_results: 3, ..BudgetQuery::new(820_000) };

        assert_eq!(engine.search(&query).expect("first"), engine.search(&query).expect("second"));
    }

    fn three_makes() -> Vec<Variant> {
        let mut variants = maruti_swift_group();
        variants.push(variant("Tata", "Altroz", "XZ", Tier::Top, 740_000, &[]));
        variants.push(variant("Hyundai", "i20", "Asta", Tier::Top, 755_000, &[]));
        variants
    }

    #[test]
    fn brand_list_searches_the_union_of_makes() {
        let query = BudgetQuery { min_results: 1, ..BudgetQuery::new(750_000) };

        let result = engine(three_makes())
            .search_makes(&query, &["tata".to_string(), "maruti".to_string()])
            .expect("search");

        assert_eq!(names(&result.candidates), vec!["XZ", "VXi", "ZXi"]);
    }

    #[test]
    fn make_filter_narrows_the_brand_list() {
        let engine = engine(three_makes());
        let brands = ["tata".to_string(), "maruti".to_string()];

        let narrowed = engine
            .search_makes(
                &BudgetQuery { make: Some("Maruti".into()), min_results: 1, ..BudgetQuery::new(750_000) },
                &brands,
            )
            .expect("search");
        let disjoint = engine
            .search_makes(
                &BudgetQuery { make: Some("Hyundai".into()), min_results: 1, ..BudgetQuery::new(750_000) },
                &brands,
            )
            .expect("search");

        assert_eq!(names(&narrowed.candidates), vec!["VXi", "ZXi"]);
        assert!(disjoint.candidates.is_empty());
        assert!(!disjoint.used_fallback);
    }

    fn with_attributes(mut variant: Variant, fuel: &str, body: &str, seats: u8) -> Variant {
        variant.attributes = VariantAttributes {
            fuel_type: Some(fuel.to_string()),
            body_type: Some(body.to_string()),
            seating_capacity: Some(seats),
        };
        variant
    }

    #[test]
    fn attribute_filters_apply_to_bands_and_fallback() {
        let mut variants: Vec<Variant> = maruti_swift_group()
            .into_iter()
            .map(|variant| with_attributes(variant, "Petrol", "Hatchback", 5))
            .collect();
        variants.push(with_attributes(
            variant("Tata", "Nexon", "XZ+", Tier::Top, 1_400_000, &[]),
            "Diesel",
            "SUV",
            5,
        ));
        let engine = engine(variants);
        let diesel = AttributeFilter { fuel_type: Some("diesel".into()), ..AttributeFilter::default() };

        let in_band = engine
            .search(&BudgetQuery {
                attributes: diesel.clone(),
                min_results: 1,
                ..BudgetQuery::new(750_000)
            })
            .expect("search");
        let seven_seats = engine
            .search(&BudgetQuery {
                attributes: AttributeFilter { seating_capacity: Some(7), ..AttributeFilter::default() },
                ..BudgetQuery::new(750_000)
            })
            .expect("search");

        // The 50% band tops out at 1_125_000, so the Nexon only arrives by fallback.
        assert!(in_band.used_fallback);
        assert_eq!(names(&in_band.candidates), vec!["XZ+"]);
        assert!(seven_seats.used_fallback);
        assert!(seven_seats.candidates.is_empty());
    }

    #[test]
    fn off_grid_margin_can_stop_before_a_narrower_query_relaxes() {
        let variants = vec![
            variant("Acme", "Dot", "Lo", Tier::Base, 93, &[]),
            variant("Acme", "Dot", "Hi", Tier::Top, 109, &[]),
        ];
        let engine = engine(variants);
        let at = |margin_pct| {
            engine
                .search(&BudgetQuery { margin_pct, min_results: 1, ..BudgetQuery::new(100) })
                .expect("search")
        };

        let narrow = at(0);
        let wider = at(7);

        // 0 relaxes along the 5-point grid until 10 admits both; 7 already
        // admits one and stops there.
        assert_eq!((narrow.effective_margin_pct, narrow.candidates.len()), (10, 2));
        assert_eq!((wider.effective_margin_pct, wider.candidates.len()), (7, 1));
        assert!(narrow.relaxed && !wider.relaxed);
        // Without relaxation the count is monotone in the margin.
        assert!(at(10).candidates.len() >= wider.candidates.len());
    }

    #[test]
    fn price_range_maps_to_midpoint_and_covering_margin() {
        let query = BudgetQuery::from_range(Some(600_000), Some(900_000)).expect("range");
        let bounds = query.bounds_at(query.margin_pct);

        assert_eq!(query.budget, 750_000);
        assert_eq!(query.margin_pct, 20);
        assert!(bounds.contains(600_000) && bounds.contains(900_000));

        let uneven = BudgetQuery::from_range(Some(1), Some(4)).expect("range");
        assert!(uneven.bounds_at(uneven.margin_pct).contains(1));
        assert!(uneven.bounds_at(uneven.margin_pct).contains(4));

        assert_eq!(BudgetQuery::from_range(None, Some(800_000)).expect("ceiling").budget, 800_000);
        assert_eq!(BudgetQuery::from_range(Some(500_000), None).expect("floor").margin_pct, 10);
        assert!(BudgetQuery::from_range(Some(9), Some(1)).is_err());
        assert!(BudgetQuery::from_range(None, None).is_err());
    }

    #[test]
    fn invalid_queries_are_rejected() {
        let engine = engine(maruti_swift_group());
        let invalid = [
            BudgetQuery::new(-1),
            BudgetQuery { margin_pct: 101, ..BudgetQuery::new(1) },
            BudgetQuery { min_results: 0, ..BudgetQuery::new(1) },
            BudgetQuery { min_results: 6, max_results: 5, ..BudgetQuery::new(1) },
        ];

        for query in invalid {
            assert!(matches!(
                engine.search(&query),
                Err(ApplicationError::Domain(DomainError::InvalidQuery(_)))
            ));
        }
    }

    #[test]
    fn custom_policy_caps_relaxation() {
        let policy = RelaxationPolicy { step_pct: 10, max_margin_pct: 20 };
        let engine = BudgetSearchEngine::with_policy(CatalogSnapshot::new(maruti_swift_group()), policy);
        let query = BudgetQuery { margin_pct: 0, min_results: 5, ..BudgetQuery::new(750_000) };

        let result = engine.search(&query).expect("search");

        // The 20% band holds all four variants, one short of the minimum.
        assert_eq!(result.effective_margin_pct, 20);
        assert!(result.used_fallback);
        assert_eq!(names(&result.candidates), vec!["VXi", "ZXi", "LXi", "ZXi+"]);
        assert_eq!(policy.next_margin(15), Some(20));
        assert_eq!(policy.next_margin(20), None);
    }
}
