use serde::{Deserialize, Serialize};

use crate::domain::Variant;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedVariant {
    pub variant: Variant,
    pub score: usize,
    /// Required keywords that hit at least one feature, in request order.
    pub matched: Vec<String>,
}

/// Orders candidates by how many required keywords they cover.
///
/// A keyword hits when it is a case-insensitive substring of any feature in
/// any category. Every entry counts on its own, so a keyword listed twice
/// scores twice. The sort is stable, so equal scores keep the incoming order,
/// and no candidate is ever dropped.
pub fn rank(candidates: Vec<Variant>, required: &[String]) -> Vec<RankedVariant> {
    let lowered: Vec<String> = required.iter().map(|keyword| keyword.to_lowercase()).collect();

    let mut ranked: Vec<RankedVariant> = candidates
        .into_iter()
        .map(|variant| {
            let features: Vec<String> =
                variant.features.iter().map(|(_, feature)| feature.to_lowercase()).collect();
            let matched: Vec<String> = required
                .iter()
                .zip(&lowered)
                .filter(|(_, keyword)| features.iter().any(|feature| feature.contains(keyword.as_str())))
                .map(|(keyword, _)| keyword.clone())
                .collect();
            RankedVariant { score: matched.len(), matched, variant }
        })
        .collect();

    ranked.sort_by(|left, right| right.score.cmp(&left.score));
    ranked
}
