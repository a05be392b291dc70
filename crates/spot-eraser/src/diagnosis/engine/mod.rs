mod percentile;
mod rules;
mod validation;

pub use validation::ValidationError;
pub(crate) use validation::resolve_answers;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use super::clock::{Clock, SystemClock};
use super::domain::{BirthYear, Category, ExternalFactor, ResultCode, SkinType};
use super::profile::QuizProfile;

/// Stateless scorer applying a questionnaire profile to an answer vector.
///
/// Safe to share across request handlers: the profile is immutable and the
/// only time dependency is the injected clock, read for skin-age estimates.
pub struct ScoringEngine {
    profile: Arc<QuizProfile>,
    clock: Arc<dyn Clock>,
}

impl ScoringEngine {
    pub fn new(profile: Arc<QuizProfile>) -> Self {
        Self::with_clock(profile, Arc::new(SystemClock))
    }

    pub fn with_clock(profile: Arc<QuizProfile>, clock: Arc<dyn Clock>) -> Self {
        Self { profile, clock }
    }

    pub fn profile(&self) -> &QuizProfile {
        &self.profile
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn compute(
        &self,
        answers: &[Option<i64>],
        birth_year: Option<&BirthYear>,
    ) -> Result<Diagnosis, ValidationError> {
        let profile = self.profile.as_ref();
        let options = validation::normalize_answers(answers, profile)?;

        let (scores, direct_total) = rules::accumulate(&options, &profile.weights);

        let skin_type = rules::pick(&scores.skin, &profile.skin_thresholds);
        let external_factor = rules::pick(&scores.factor, &profile.factor_thresholds);
        let code = match (skin_type, external_factor) {
            (Some(skin), Some(factor)) => profile.result_map.lookup(skin, factor),
            _ => None,
        };

        // Category points are added on top of the direct increments, so any
        // total-only cell is counted once and every category point once more.
        let total_score = direct_total
            .saturating_add(scores.skin_total())
            .saturating_add(scores.factor_total());

        let age_estimate = profile.percentiles.as_ref().map(|table| {
            percentile::estimate(total_score, table, birth_year, self.clock.today())
        });

        Ok(Diagnosis {
            skin_type,
            external_factor,
            code,
            scores,
            total_score,
            age_estimate,
        })
    }
}

/// Accumulated points per category for both axes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryScores {
    #[serde(rename = "A")]
    pub skin: BTreeMap<SkinType, u32>,
    #[serde(rename = "B")]
    pub factor: BTreeMap<ExternalFactor, u32>,
}

impl CategoryScores {
    pub(crate) fn zeroed() -> Self {
        Self {
            skin: zeroed_map(),
            factor: zeroed_map(),
        }
    }

    pub fn skin_total(&self) -> u32 {
        self.skin.values().fold(0, |acc, points| acc.saturating_add(*points))
    }

    pub fn factor_total(&self) -> u32 {
        self.factor.values().fold(0, |acc, points| acc.saturating_add(*points))
    }
}

fn zeroed_map<C: Category>() -> BTreeMap<C, u32> {
    C::CANONICAL.iter().map(|category| (*category, 0)).collect()
}

/// Percentile ranking and skin-age estimate for profiles that support it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeEstimate {
    pub percentile: i32,
    pub percentile_label: String,
    /// `None` when no usable birth year was supplied.
    pub skin_age: Option<u32>,
}

/// Scoring output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    #[serde(rename = "a_type")]
    pub skin_type: Option<SkinType>,
    #[serde(rename = "b_type")]
    pub external_factor: Option<ExternalFactor>,
    pub code: Option<ResultCode>,
    pub scores: CategoryScores,
    pub total_score: u32,
    #[serde(flatten)]
    pub age_estimate: Option<AgeEstimate>,
}

impl Diagnosis {
    /// Asset path of the result artwork; the first artwork when nothing was selected.
    pub fn image_path(&self) -> String {
        let code = self.code.unwrap_or(ResultCode::FALLBACK);
        format!("/assets/result-{code}.png")
    }

    /// Artwork file name used in log lines; `?` when nothing was selected.
    pub(crate) fn image_name(&self) -> String {
        match self.code {
            Some(code) => format!("result-{code}.png"),
            None => "result-?.png".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::clock::FixedClock;
    use crate::diagnosis::profile::{Delta, WeightTable};
    use chrono::NaiveDate;

    fn engine(profile: QuizProfile) -> ScoringEngine {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date");
        ScoringEngine::with_clock(Arc::new(profile), Arc::new(FixedClock::on(today)))
    }

    fn answers(values: &[i64]) -> Vec<Option<i64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn total_score_double_counts_direct_increments_and_categories() {
        let mut profile = QuizProfile::extended();
        profile.weights = WeightTable::builder()
            .cell(1, 1, Delta::new().total(4))
            .cell(3, 1, Delta::new().skin(SkinType::Oily, 2).total(1))
            .cell(6, 1, Delta::new().factor(ExternalFactor::Environment, 3))
            .build();

        let diagnosis = engine(profile)
            .compute(&answers(&[1, 0, 1, 0, 0, 1, 0, 0, 0, 0, 0, 0]), None)
            .expect("valid answers");

        assert_eq!(diagnosis.scores.skin_total(), 2);
        assert_eq!(diagnosis.scores.factor_total(), 3);
        assert_eq!(diagnosis.total_score, 4 + 1 + 2 + 3);
    }

    #[test]
    fn classic_profile_has_no_age_estimate() {
        let diagnosis = engine(QuizProfile::classic())
            .compute(&answers(&[1, 2, 1, 1, 1, 1, 2, 1, 1]), Some(&BirthYear::Year(1990)))
            .expect("valid answers");
        assert!(diagnosis.age_estimate.is_none());

        let json = serde_json::to_value(&diagnosis).expect("serializes");
        assert!(json.get("percentile").is_none());
        assert_eq!(json["a_type"], "sensitivity");
        assert_eq!(json["scores"]["B"]["environment"], 4);
    }

    #[test]
    fn missing_pair_in_result_map_yields_no_code() {
        let mut profile = QuizProfile::classic();
        profile.result_map = crate::diagnosis::profile::ResultMap::new([]);
        let diagnosis = engine(profile)
            .compute(&answers(&[1, 2, 1, 1, 1, 1, 2, 1, 1]), None)
            .expect("valid answers");
        assert_eq!(diagnosis.skin_type, Some(SkinType::Sensitivity));
        assert_eq!(diagnosis.external_factor, Some(ExternalFactor::Environment));
        assert_eq!(diagnosis.code, None);
        assert_eq!(diagnosis.image_path(), "/assets/result-1.png");
        assert_eq!(diagnosis.image_name(), "result-?.png");
    }

    #[test]
    fn extended_serializes_null_skin_age() {
        let diagnosis = engine(QuizProfile::extended())
            .compute(&answers(&[4, 0, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4]), None)
            .expect("valid answers");
        let json = serde_json::to_value(&diagnosis).expect("serializes");
        assert_eq!(json["percentile_label"], "top 50%");
        assert!(json["skin_age"].is_null());
        assert!(json["code"].is_null());
    }
}
