use super::{
    Delta, PercentileBand, PercentileBucket, PercentileTable, ProfileKind, QuizProfile, ResultCode,
    ResultMap, Thresholds, WeightTable,
};
use crate::diagnosis::domain::ExternalFactor::{self, Environment, Stress};
use crate::diagnosis::domain::SkinType::{self, Combination, Dry, Oily, Sensitivity};

fn skin_thresholds() -> Thresholds<SkinType> {
    Thresholds::new([(Sensitivity, 4), (Oily, 3), (Dry, 4), (Combination, 4)])
}

fn factor_thresholds() -> Thresholds<ExternalFactor> {
    Thresholds::new([(Stress, 2), (Environment, 4)])
}

fn result_map() -> ResultMap {
    ResultMap::new([
        ((Sensitivity, Stress), ResultCode(1)),
        ((Sensitivity, Environment), ResultCode(2)),
        ((Oily, Stress), ResultCode(3)),
        ((Oily, Environment), ResultCode(4)),
        ((Dry, Stress), ResultCode(5)),
        ((Dry, Environment), ResultCode(6)),
        ((Combination, Stress), ResultCode(7)),
        ((Combination, Environment), ResultCode(8)),
    ])
}

fn bucket(low: u32, high: u32, label: &str, adjustment: f64) -> PercentileBucket {
    PercentileBucket {
        range: low..=high,
        band: PercentileBand::new(label, adjustment),
    }
}

fn percentile_table() -> PercentileTable {
    PercentileTable::new(
        vec![
            bucket(18, 99, "top 5%", -0.30),
            bucket(16, 17, "top 10%", -0.20),
            bucket(15, 15, "top 15%", -0.15),
            bucket(13, 14, "top 20%", -0.10),
            bucket(12, 12, "top 25%", -0.05),
            bucket(10, 11, "top 50%", -0.01),
            bucket(9, 9, "bottom 25%", 0.05),
            bucket(8, 8, "bottom 20%", 0.10),
            bucket(7, 7, "bottom 15%", 0.15),
            bucket(6, 6, "bottom 10%", 0.20),
            bucket(5, 5, "bottom 5%", 0.25),
        ],
        PercentileBand::new("top 50%", -0.01),
    )
}

/// The scored questions shared by both generations, numbered as in the
/// 12-question form. Q1 (gender), Q2 (birth year) and Q9 (water intake) carry
/// no weight.
fn scored_cells(number: impl Fn(usize) -> usize) -> WeightTable {
    WeightTable::builder()
        // Q3: how soon the skin gets oily after washing
        .cell(number(3), 1, Delta::new().skin(Oily, 2))
        .cell(number(3), 2, Delta::new().skin(Combination, 1))
        .cell(number(3), 3, Delta::new().skin(Dry, 2))
        .cell(number(3), 4, Delta::new().skin(Sensitivity, 1))
        // Q4: how soon the skin feels tight after washing
        .cell(number(4), 1, Delta::new().skin(Dry, 2))
        .cell(number(4), 2, Delta::new().skin(Oily, 1))
        .cell(number(4), 3, Delta::new().skin(Combination, 1))
        .cell(number(4), 4, Delta::new().skin(Sensitivity, 1))
        // Q5: T-zone versus cheeks
        .cell(number(5), 1, Delta::new().skin(Sensitivity, 2))
        .cell(number(5), 2, Delta::new().skin(Sensitivity, 1))
        .cell(number(5), 3, Delta::new().skin(Combination, 1))
        // Q6: reaction to environment, temperature, dust
        .cell(number(6), 1, Delta::new().factor(Environment, 2))
        .cell(number(6), 2, Delta::new().factor(Environment, 1))
        .cell(number(6), 3, Delta::new().factor(Stress, 1))
        // Q7: breakouts within the last month
        .cell(number(7), 1, Delta::new().factor(Environment, 1).skin(Dry, 1))
        .cell(number(7), 2, Delta::new().skin(Dry, 1))
        // Q8: average sleep
        .cell(number(8), 1, Delta::new().skin(Oily, 1).factor(Environment, 1))
        .cell(number(8), 2, Delta::new().skin(Sensitivity, 1).factor(Stress, 1))
        .cell(number(8), 3, Delta::new().factor(Environment, 2))
        .cell(number(8), 4, Delta::new().skin(Combination, 1).factor(Stress, 1))
        // Q10: acne concern (gendered artwork, identical weights)
        .cell(number(10), 1, Delta::new().skin(Oily, 1).factor(Environment, 1))
        .cell(number(10), 2, Delta::new().factor(Stress, 1).skin(Sensitivity, 1))
        .cell(number(10), 3, Delta::new().skin(Combination, 1))
        // Q11: family history
        .cell(number(11), 1, Delta::new().skin(Sensitivity, 2))
        .cell(number(11), 2, Delta::new().skin(Sensitivity, 1))
        // Q12: wrinkles, spots, pores (gendered artwork, identical weights)
        .cell(number(12), 1, Delta::new().skin(Oily, 1))
        .cell(number(12), 2, Delta::new().skin(Dry, 1))
        .cell(number(12), 3, Delta::new().factor(Environment, 1))
        .build()
}

pub(super) fn extended() -> QuizProfile {
    QuizProfile {
        kind: ProfileKind::Extended,
        question_count: 12,
        options: 1..=4,
        strict_range: false,
        weights: scored_cells(|question| question),
        skin_thresholds: skin_thresholds(),
        factor_thresholds: factor_thresholds(),
        result_map: result_map(),
        percentiles: Some(percentile_table()),
    }
}

/// Nine-question form: the unweighted Q1, Q2 and Q9 are dropped and the
/// remaining questions renumbered 1..=9.
pub(super) fn classic() -> QuizProfile {
    QuizProfile {
        kind: ProfileKind::Classic,
        question_count: 9,
        options: 1..=4,
        strict_range: true,
        weights: scored_cells(|question| match question {
            3..=8 => question - 2,
            _ => question - 3,
        }),
        skin_thresholds: skin_thresholds(),
        factor_thresholds: factor_thresholds(),
        result_map: result_map(),
        percentiles: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_renumbers_scored_questions() {
        let extended = extended();
        let classic = classic();
        assert_eq!(classic.weights.cell(1, 1), extended.weights.cell(3, 1));
        assert_eq!(classic.weights.cell(6, 4), extended.weights.cell(8, 4));
        assert_eq!(classic.weights.cell(7, 2), extended.weights.cell(10, 2));
        assert_eq!(classic.weights.cell(9, 3), extended.weights.cell(12, 3));
    }

    #[test]
    fn unweighted_questions_have_no_cells() {
        let extended = extended();
        for question in [1, 2, 9] {
            for option in 1..=4 {
                assert!(extended.weights.cell(question, option).is_none());
            }
        }
    }

    #[test]
    fn percentile_buckets_match_reference_points() {
        let table = percentile_table();
        let top = table.band_for(18);
        assert_eq!(top.label, "top 5%");
        assert_eq!(top.adjustment, -0.30);

        let bottom = table.band_for(9);
        assert_eq!(bottom.label, "bottom 25%");
        assert_eq!(bottom.adjustment, 0.05);

        assert_eq!(table.band_for(4), table.fallback());
        assert_eq!(table.band_for(100), table.fallback());
    }
}
