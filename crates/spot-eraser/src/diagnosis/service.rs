use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::domain::{
    Answer, Category, ClickId, ClickSubmission, DiagnosisId, DiagnosisSubmission, ExternalFactor,
    ResultCode, SkinType,
};
use super::engine::{resolve_answers, CategoryScores, Diagnosis, ScoringEngine, ValidationError};
use super::repository::{ClickRecord, DiagnosisRecord, DiagnosisRepository, RepositoryError};

/// Longest accepted click button key, in characters.
pub const MAX_BUTTON_KEY_LEN: usize = 32;

/// Service composing the scoring engine and the repository.
pub struct DiagnosisService<R> {
    engine: Arc<ScoringEngine>,
    repository: Arc<R>,
}

static DIAGNOSIS_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static CLICK_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_diagnosis_id() -> DiagnosisId {
    let id = DIAGNOSIS_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    DiagnosisId(format!("diag-{id:06}"))
}

fn next_click_id() -> ClickId {
    let id = CLICK_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ClickId(format!("click-{id:06}"))
}

impl<R> DiagnosisService<R>
where
    R: DiagnosisRepository + 'static,
{
    pub fn new(engine: Arc<ScoringEngine>, repository: Arc<R>) -> Self {
        Self { engine, repository }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Score a submission and persist it alongside the computed summary.
    pub fn diagnose(
        &self,
        submission: DiagnosisSubmission,
    ) -> Result<DiagnosisOutcome, DiagnosisServiceError> {
        let answers = resolve_answers(&submission.answers)?;
        let diagnosis = self
            .engine
            .compute(&answers, submission.birth_year.as_ref())?;

        log_diagnosis(&answers, &diagnosis);

        let estimate = diagnosis.age_estimate.as_ref();
        let record = DiagnosisRecord {
            id: next_diagnosis_id(),
            created_at: self.engine.clock().now(),
            client_started_at: submission.client_started_at,
            client_submitted_at: submission.client_submitted_at,
            lang: submission.lang(),
            user_agent: submission.user_agent,
            answers: submission.answers,
            birth_year: submission.birth_year,
            result_code: diagnosis.code,
            skin_age: estimate.and_then(|estimate| estimate.skin_age),
            skin_percentile: estimate.map(|estimate| estimate.percentile),
            score_a: diagnosis.scores.skin_total(),
            score_b: diagnosis.scores.factor_total(),
            total_score: diagnosis.total_score,
        };

        let record = self.repository.insert_diagnosis(record)?;
        Ok(DiagnosisOutcome { record, diagnosis })
    }

    /// Record a result-page click. A diagnosis id that names nothing stored is
    /// kept as an unlinked click rather than rejected.
    pub fn track_click(
        &self,
        submission: ClickSubmission,
    ) -> Result<ClickRecord, DiagnosisServiceError> {
        let button_key = submission.button_key.trim();
        let length = button_key.chars().count();
        if length == 0 || length > MAX_BUTTON_KEY_LEN {
            return Err(DiagnosisServiceError::InvalidClick(format!(
                "button_key must be 1..={MAX_BUTTON_KEY_LEN} characters (received {length})"
            )));
        }

        let diagnosis_id = match submission.diagnosis_id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                let id = DiagnosisId(raw.to_string());
                if self.repository.fetch_diagnosis(&id)?.is_some() {
                    Some(id)
                } else {
                    debug!(diagnosis_id = %raw, "click references unknown diagnosis; storing unlinked");
                    None
                }
            }
            _ => None,
        };

        let record = ClickRecord {
            id: next_click_id(),
            created_at: self.engine.clock().now(),
            diagnosis_id,
            button_key: button_key.to_string(),
            lang: submission.lang(),
        };

        let record = self.repository.insert_click(record)?;
        Ok(record)
    }

    /// Fetch a stored diagnosis.
    pub fn get(&self, id: &DiagnosisId) -> Result<DiagnosisRecord, DiagnosisServiceError> {
        let record = self
            .repository
            .fetch_diagnosis(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Stored diagnosis with every click linked to it, oldest first.
    pub fn history(&self, id: &DiagnosisId) -> Result<DiagnosisHistory, DiagnosisServiceError> {
        let diagnosis = self.get(id)?;
        let mut clicks = self.repository.clicks_for(id)?;
        clicks.sort_by_key(|click| click.created_at);
        Ok(DiagnosisHistory { diagnosis, clicks })
    }
}

fn log_diagnosis(answers: &[Option<i64>], diagnosis: &Diagnosis) {
    let skin = |category: SkinType| diagnosis.scores.skin.get(&category).copied().unwrap_or(0);
    let factor =
        |category: ExternalFactor| diagnosis.scores.factor.get(&category).copied().unwrap_or(0);

    info!(
        answers = ?answers,
        sensitivity = skin(SkinType::Sensitivity),
        oily = skin(SkinType::Oily),
        dry = skin(SkinType::Dry),
        combination = skin(SkinType::Combination),
        stress = factor(ExternalFactor::Stress),
        environment = factor(ExternalFactor::Environment),
        a_type = diagnosis.skin_type.map(SkinType::key).unwrap_or("none"),
        b_type = diagnosis.external_factor.map(ExternalFactor::key).unwrap_or("none"),
        view = %diagnosis.image_name(),
        "diagnosis computed"
    );
}

/// Stored record together with the full scoring output.
#[derive(Debug, Clone)]
pub struct DiagnosisOutcome {
    pub record: DiagnosisRecord,
    pub diagnosis: Diagnosis,
}

impl DiagnosisOutcome {
    pub fn view(&self) -> DiagnosisView {
        let estimate = self.diagnosis.age_estimate.as_ref();
        DiagnosisView {
            id: self.record.id.clone(),
            answers: self.record.answers.clone(),
            a_type: self.diagnosis.skin_type,
            b_type: self.diagnosis.external_factor,
            code: self.diagnosis.code,
            image: self.diagnosis.image_path(),
            scores: self.diagnosis.scores.clone(),
            total_score: self.diagnosis.total_score,
            percentile: estimate.map(|estimate| estimate.percentile),
            percentile_label: estimate.map(|estimate| estimate.percentile_label.clone()),
            skin_age: estimate.and_then(|estimate| estimate.skin_age),
        }
    }
}

/// Response body for a computed diagnosis. Percentile fields are `null` for
/// profiles without an age table.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisView {
    pub id: DiagnosisId,
    pub answers: Vec<Option<Answer>>,
    pub a_type: Option<SkinType>,
    pub b_type: Option<ExternalFactor>,
    pub code: Option<ResultCode>,
    pub image: String,
    pub scores: CategoryScores,
    pub total_score: u32,
    pub percentile: Option<i32>,
    pub percentile_label: Option<String>,
    pub skin_age: Option<u32>,
}

/// Stored diagnosis and its click log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosisHistory {
    pub diagnosis: DiagnosisRecord,
    pub clicks: Vec<ClickRecord>,
}

/// Error raised by the diagnosis service.
#[derive(Debug, thiserror::Error)]
pub enum DiagnosisServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("{0}")]
    InvalidClick(String),
}
