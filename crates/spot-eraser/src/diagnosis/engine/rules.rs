use std::collections::BTreeMap;

use super::CategoryScores;
use crate::diagnosis::domain::Category;
use crate::diagnosis::profile::{Thresholds, WeightTable};

/// Sum every configured delta for the chosen options. Returns the category
/// scores and the running total of direct (category-free) increments.
pub(crate) fn accumulate(answers: &[u8], weights: &WeightTable) -> (CategoryScores, u32) {
    let mut scores = CategoryScores::zeroed();
    let mut direct_total: u32 = 0;

    for (index, option) in answers.iter().enumerate() {
        let Some(delta) = weights.cell(index + 1, *option) else {
            continue;
        };

        add_all(&mut scores.skin, &delta.skin);
        add_all(&mut scores.factor, &delta.factor);
        direct_total = direct_total.saturating_add(delta.total);
    }

    (scores, direct_total)
}

fn add_all<C: Category>(scores: &mut BTreeMap<C, u32>, increments: &BTreeMap<C, u32>) {
    for (category, points) in increments {
        let entry = scores.entry(*category).or_insert(0);
        *entry = entry.saturating_add(*points);
    }
}

/// Highest score among categories meeting their threshold. Ties resolve to the
/// category listed first in `C::CANONICAL`.
pub(crate) fn pick<C: Category>(
    scores: &BTreeMap<C, u32>,
    thresholds: &Thresholds<C>,
) -> Option<C> {
    let mut best: Option<(C, u32)> = None;

    for category in C::CANONICAL {
        let score = scores.get(category).copied().unwrap_or(0);
        let eligible = thresholds
            .minimum(*category)
            .is_some_and(|minimum| score >= minimum);
        if !eligible {
            continue;
        }

        match best {
            Some((_, best_score)) if best_score >= score => {}
            _ => best = Some((*category, score)),
        }
    }

    best.map(|(category, _)| category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::domain::{ExternalFactor, SkinType};
    use crate::diagnosis::profile::Delta;

    fn skin_thresholds() -> Thresholds<SkinType> {
        Thresholds::new([
            (SkinType::Sensitivity, 4),
            (SkinType::Oily, 3),
            (SkinType::Dry, 4),
            (SkinType::Combination, 4),
        ])
    }

    #[test]
    fn tie_prefers_canonical_order() {
        let scores = BTreeMap::from([
            (SkinType::Sensitivity, 5),
            (SkinType::Oily, 5),
            (SkinType::Dry, 0),
            (SkinType::Combination, 0),
        ]);
        assert_eq!(pick(&scores, &skin_thresholds()), Some(SkinType::Sensitivity));
    }

    #[test]
    fn categories_below_threshold_are_skipped() {
        let scores = BTreeMap::from([
            (SkinType::Sensitivity, 3),
            (SkinType::Oily, 3),
            (SkinType::Dry, 9),
            (SkinType::Combination, 0),
        ]);
        let thresholds = Thresholds::new([
            (SkinType::Sensitivity, 4),
            (SkinType::Oily, 3),
            (SkinType::Dry, 10),
            (SkinType::Combination, 4),
        ]);
        assert_eq!(pick(&scores, &thresholds), Some(SkinType::Oily));
    }

    #[test]
    fn nothing_eligible_yields_none() {
        let scores = BTreeMap::from([(ExternalFactor::Stress, 1), (ExternalFactor::Environment, 3)]);
        let thresholds = Thresholds::new([(ExternalFactor::Stress, 2), (ExternalFactor::Environment, 4)]);
        assert_eq!(pick(&scores, &thresholds), None);
    }

    #[test]
    fn category_without_threshold_is_never_selected() {
        let scores = BTreeMap::from([(ExternalFactor::Stress, 50), (ExternalFactor::Environment, 4)]);
        let thresholds = Thresholds::new([(ExternalFactor::Environment, 4)]);
        assert_eq!(pick(&scores, &thresholds), Some(ExternalFactor::Environment));
    }

    #[test]
    fn accumulate_adds_and_skips_unconfigured_cells() {
        let weights = WeightTable::builder()
            .cell(1, 1, Delta::new().skin(SkinType::Oily, 2).total(3))
            .cell(2, 1, Delta::new().skin(SkinType::Oily, 1).factor(ExternalFactor::Stress, 1))
            .build();

        let (scores, direct) = accumulate(&[1, 1, 4], &weights);
        assert_eq!(scores.skin[&SkinType::Oily], 3);
        assert_eq!(scores.skin[&SkinType::Dry], 0);
        assert_eq!(scores.factor[&ExternalFactor::Stress], 1);
        assert_eq!(direct, 3);

        let (scores, direct) = accumulate(&[0, 0, 0], &weights);
        assert_eq!(scores.skin_total() + scores.factor_total(), 0);
        assert_eq!(direct, 0);
    }
}
