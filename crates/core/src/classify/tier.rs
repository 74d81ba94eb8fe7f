//! Tier classification.
//!
//! Variant names are matched against an ordered table of naming-rule
//! families. Each rule is a pure predicate over the upper-cased name tokens.
//! When no rule claims the name, [`PriceQuartileStrategy`] ranks the price
//! inside its (make, model) group instead.

use crate::domain::{Tier, TierSource};
use crate::errors::DomainError;

type TokenPredicate = fn(&[&str]) -> bool;

#[derive(Clone, Copy)]
pub struct TierRule {
    pub tier: Tier,
    matches: TokenPredicate,
}

impl TierRule {
    pub const fn new(tier: Tier, matches: TokenPredicate) -> Self {
        Self { tier, matches }
    }

    pub fn matches(&self, tokens: &[&str]) -> bool {
        (self.matches)(tokens)
    }
}

impl std::fmt::Debug for TierRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TierRule").field("tier", &self.tier).finish_non_exhaustive()
    }
}

/// A brand's naming convention. An empty `makes` list marks a generic
/// family that applies to every make.
#[derive(Clone, Copy, Debug)]
pub struct RuleFamily {
    pub name: &'static str,
    pub makes: &'static [&'static str],
    pub rules: &'static [TierRule],
}

impl RuleFamily {
    pub fn is_generic(&self) -> bool {
        self.makes.is_empty()
    }

    pub fn applies_to(&self, make: &str) -> bool {
        let make = make.trim().to_ascii_lowercase();
        self.makes.iter().any(|alias| make.contains(alias))
    }

    fn first_match(&self, tokens: &[&str]) -> Option<Tier> {
        self.rules.iter().find(|rule| rule.matches(tokens)).map(|rule| rule.tier)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierAssignment {
    pub tier: Tier,
    pub source: TierSource,
}

pub const DEFAULT_FAMILIES: &[RuleFamily] = &[
    RuleFamily {
        name: "maruti",
        makes: &["maruti"],
        rules: &[
            TierRule::new(Tier::Base, maruti_base),
            TierRule::new(Tier::Mid, maruti_mid),
            TierRule::new(Tier::Top, maruti_top),
            TierRule::new(Tier::High, maruti_high),
        ],
    },
    RuleFamily {
        name: "hyundai",
        makes: &["hyundai"],
        rules: &[
            TierRule::new(Tier::Base, hyundai_base),
            TierRule::new(Tier::Mid, hyundai_mid),
            TierRule::new(Tier::Top, hyundai_top),
            TierRule::new(Tier::High, hyundai_high),
        ],
    },
    RuleFamily {
        name: "tata",
        makes: &["tata"],
        rules: &[
            TierRule::new(Tier::Base, tata_base),
            TierRule::new(Tier::Mid, tata_mid),
            TierRule::new(Tier::High, tata_high),
            TierRule::new(Tier::Top, tata_top),
        ],
    },
    RuleFamily {
        name: "mahindra",
        makes: &["mahindra"],
        rules: &[
            TierRule::new(Tier::Base, mahindra_base),
            TierRule::new(Tier::Mid, mahindra_mid),
            TierRule::new(Tier::High, mahindra_high),
            TierRule::new(Tier::Top, mahindra_top),
        ],
    },
    RuleFamily {
        name: "kia",
        makes: &["kia"],
        rules: &[
            TierRule::new(Tier::Base, kia_base),
            TierRule::new(Tier::Mid, kia_mid),
            TierRule::new(Tier::Top, kia_top),
            TierRule::new(Tier::High, kia_high),
        ],
    },
    RuleFamily {
        name: "honda",
        makes: &["honda"],
        rules: &[
            TierRule::new(Tier::Base, honda_base),
            TierRule::new(Tier::Mid, honda_mid),
            TierRule::new(Tier::High, honda_high),
            TierRule::new(Tier::Top, honda_top),
        ],
    },
    RuleFamily {
        name: "generic",
        makes: &[],
        rules: &[
            TierRule::new(Tier::Base, generic_base),
            TierRule::new(Tier::Mid, generic_mid),
            TierRule::new(Tier::High, generic_high),
            TierRule::new(Tier::Top, generic_top),
        ],
    },
];

/// Fallback that ranks a price inside its (make, model) group.
///
/// The rank is the number of strictly cheaper prices in the group, so equal
/// prices always land in the same quartile.
#[derive(Clone, Copy, Debug, Default)]
pub struct PriceQuartileStrategy;

impl PriceQuartileStrategy {
    pub fn assign(
        &self,
        variant_name: &str,
        price: i64,
        group_prices: &[i64],
    ) -> Result<Tier, DomainError> {
        let n = group_prices.len();
        if n < 2 {
            return Err(DomainError::UnclassifiableVariant {
                variant_name: variant_name.to_string(),
                group_size: n,
            });
        }

        let rank = group_prices.iter().filter(|other| **other < price).count();
        let tier = if 4 * rank < n {
            Tier::Base
        } else if 4 * rank < 2 * n {
            Tier::Mid
        } else if 4 * rank < 3 * n {
            Tier::High
        } else {
            Tier::Top
        };
        Ok(tier)
    }
}

#[derive(Clone, Debug)]
pub struct TierClassifier {
    families: &'static [RuleFamily],
    fallback: PriceQuartileStrategy,
}

impl Default for TierClassifier {
    fn default() -> Self {
        Self::with_families(DEFAULT_FAMILIES)
    }
}

impl TierClassifier {
    pub fn with_families(families: &'static [RuleFamily]) -> Self {
        Self { families, fallback: PriceQuartileStrategy }
    }

    /// Classifies without knowing the make: every brand family is tried in
    /// table order, then the generic family, then the price quartile.
    pub fn classify(
        &self,
        variant_name: &str,
        price: i64,
        group_prices: &[i64],
    ) -> Result<TierAssignment, DomainError> {
        self.classify_for_make(None, variant_name, price, group_prices)
    }

    /// With a make, only that make's families and the generic family are
    /// consulted before falling back to the price quartile.
    pub fn classify_for_make(
        &self,
        make: Option<&str>,
        variant_name: &str,
        price: i64,
        group_prices: &[i64],
    ) -> Result<TierAssignment, DomainError> {
        if let Some(assignment) = self.match_name(make, variant_name) {
            return Ok(assignment);
        }

        let tier = self.fallback.assign(variant_name, price, group_prices)?;
        Ok(TierAssignment { tier, source: TierSource::PriceQuartile })
    }

    pub fn match_name(&self, make: Option<&str>, variant_name: &str) -> Option<TierAssignment> {
        let upper = variant_name.to_uppercase();
        let tokens = tokenize(&upper);
        if tokens.is_empty() {
            return None;
        }

        let (brand, generic): (Vec<&RuleFamily>, Vec<&RuleFamily>) =
            self.families.iter().partition(|family| !family.is_generic());

        let brand_candidates = brand
            .into_iter()
            .filter(|family| make.map_or(true, |make| family.applies_to(make)))
            .map(|family| (family, make.is_some()));
        let generic_candidates = generic.into_iter().map(|family| (family, false));

        brand_candidates.chain(generic_candidates).find_map(|(family, make_specific)| {
            family.first_match(&tokens).map(|tier| TierAssignment {
                tier,
                source: TierSource::NamePattern {
                    family: family.name.to_string(),
                    make_specific,
                },
            })
        })
    }
}

fn tokenize(upper: &str) -> Vec<&str> {
    upper
        .split(|ch: char| ch.is_whitespace() || matches!(ch, '-' | '/' | ',' | '_'))
        .filter(|token| !token.is_empty())
        .collect()
}

fn has(tokens: &[&str], wanted: &[&str]) -> bool {
    tokens.iter().any(|token| wanted.contains(token))
}

/// True when `code` appears and is followed by one of `suffixes`, either
/// glued on (`SX(O)`) or as the next token (`SX (O)`).
fn has_with_suffix(tokens: &[&str], code: &str, suffixes: &[&str]) -> bool {
    tokens.iter().enumerate().any(|(index, token)| {
        let glued = token
            .strip_prefix(code)
            .map(|rest| suffixes.contains(&rest))
            .unwrap_or(false);
        let split = *token == code
            && tokens.get(index + 1).map(|next| suffixes.contains(next)).unwrap_or(false);
        glued || split
    })
}

fn has_bare(tokens: &[&str], code: &str, suffixes: &[&str]) -> bool {
    tokens.iter().enumerate().any(|(index, token)| {
        *token == code && !tokens.get(index + 1).map(|next| suffixes.contains(next)).unwrap_or(false)
    })
}

// Maruti grades look like LXi, VDi, ZXi+, ZMT: a grade letter, a powertrain
// letter, an optional `I`, an optional `+`.
fn maruti_grade(token: &str) -> Option<(char, bool)> {
    let (body, plus) = match token.strip_suffix('+') {
        Some(body) => (body, true),
        None => (token, false),
    };
    let mut chars = body.chars();
    let grade = chars.next()?;
    let powertrain = chars.next()?;
    let rest: String = chars.collect();
    let valid = matches!(grade, 'L' | 'V' | 'Z')
        && matches!(powertrain, 'X' | 'D' | 'T' | 'M')
        && (rest.is_empty() || rest == "I");
    valid.then_some((grade, plus))
}

fn maruti_find(tokens: &[&str], wanted: char) -> Option<(usize, bool)> {
    tokens.iter().enumerate().find_map(|(index, token)| match maruti_grade(token) {
        Some((grade, plus)) if grade == wanted => Some((index, plus)),
        _ => None,
    })
}

// Nexa models use Sigma/Delta/Zeta/Alpha instead.
fn maruti_base(tokens: &[&str]) -> bool {
    maruti_find(tokens, 'L').is_some() || has(tokens, &["SIGMA"])
}

fn maruti_mid(tokens: &[&str]) -> bool {
    maruti_find(tokens, 'V').is_some() || has(tokens, &["DELTA"])
}

fn maruti_top(tokens: &[&str]) -> bool {
    let plus_grade = maruti_find(tokens, 'Z').is_some_and(|(index, plus)| {
        plus || tokens.get(index + 1).is_some_and(|next| *next == "+" || *next == "PLUS")
    });
    plus_grade || has(tokens, &["ALPHA"])
}

fn maruti_high(tokens: &[&str]) -> bool {
    maruti_find(tokens, 'Z').is_some() || has(tokens, &["ZETA"])
}

fn hyundai_base(tokens: &[&str]) -> bool {
    has(tokens, &["E", "EX", "ERA"])
}

fn hyundai_mid(tokens: &[&str]) -> bool {
    has(tokens, &["S", "S+", "S(O)", "MAGNA"])
}

fn hyundai_top(tokens: &[&str]) -> bool {
    has_with_suffix(tokens, "SX", &["(O)", "(P)"]) || has(tokens, &["ASTA"])
}

fn hyundai_high(tokens: &[&str]) -> bool {
    has_bare(tokens, "SX", &["(O)", "(P)"]) || has(tokens, &["SPORTZ"])
}

fn tata_base(tokens: &[&str]) -> bool {
    has(tokens, &["XE"])
}

fn tata_mid(tokens: &[&str]) -> bool {
    has(tokens, &["XM", "XMA"])
}

fn tata_high(tokens: &[&str]) -> bool {
    has(tokens, &["XT", "XT+", "XTA"])
}

fn tata_top(tokens: &[&str]) -> bool {
    has(tokens, &["XZ", "XZ+", "XZA", "XZA+"])
}

fn mahindra_base(tokens: &[&str]) -> bool {
    has(tokens, &["W3", "W4"])
}

fn mahindra_mid(tokens: &[&str]) -> bool {
    has(tokens, &["W5", "W6"])
}

fn mahindra_high(tokens: &[&str]) -> bool {
    has(tokens, &["W7", "W8"])
}

fn mahindra_top(tokens: &[&str]) -> bool {
    has(tokens, &["W9", "W10", "W11"])
}

fn kia_base(tokens: &[&str]) -> bool {
    has(tokens, &["HTE"])
}

fn kia_mid(tokens: &[&str]) -> bool {
    has(tokens, &["HTK", "HTK+"])
}

fn kia_top(tokens: &[&str]) -> bool {
    has(tokens, &["HTX+", "GTX", "GTX+"])
}

fn kia_high(tokens: &[&str]) -> bool {
    has(tokens, &["HTX"])
}

fn honda_base(tokens: &[&str]) -> bool {
    has(tokens, &["E", "S"])
}

fn honda_mid(tokens: &[&str]) -> bool {
    has(tokens, &["V"])
}

fn honda_high(tokens: &[&str]) -> bool {
    has(tokens, &["VX"])
}

fn honda_top(tokens: &[&str]) -> bool {
    has(tokens, &["ZX"])
}

fn generic_base(tokens: &[&str]) -> bool {
    has(tokens, &["BASE", "STANDARD", "ESSENTIAL"])
}

fn generic_mid(tokens: &[&str]) -> bool {
    has(tokens, &["MID", "COMFORT", "ACTIVE"])
}

fn generic_high(tokens: &[&str]) -> bool {
    has(tokens, &["HIGH", "STYLE", "AMBIENTE", "SV"])
}

fn generic_top(tokens: &[&str]) -> bool {
    has(tokens, &["TOP", "LUXURY", "PREMIUM", "HIGHLINE", "SVP"])
}
