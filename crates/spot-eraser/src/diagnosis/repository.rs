use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Answer, BirthYear, ClickId, DiagnosisId, Lang, ResultCode};

/// Stored diagnosis: the submission as received plus the computed summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisRecord {
    pub id: DiagnosisId,
    pub created_at: DateTime<Utc>,
    pub client_started_at: Option<DateTime<Utc>>,
    pub client_submitted_at: Option<DateTime<Utc>>,
    pub lang: Lang,
    pub user_agent: Option<String>,
    /// Answers exactly as submitted, before any coercion.
    pub answers: Vec<Option<Answer>>,
    pub birth_year: Option<BirthYear>,
    pub result_code: Option<ResultCode>,
    pub skin_age: Option<u32>,
    pub skin_percentile: Option<i32>,
    pub score_a: u32,
    pub score_b: u32,
    pub total_score: u32,
}

/// Button click on the result page, optionally linked to a diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickRecord {
    pub id: ClickId,
    pub created_at: DateTime<Utc>,
    pub diagnosis_id: Option<DiagnosisId>,
    pub button_key: String,
    pub lang: Lang,
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait DiagnosisRepository: Send + Sync {
    fn insert_diagnosis(&self, record: DiagnosisRecord) -> Result<DiagnosisRecord, RepositoryError>;
    fn fetch_diagnosis(&self, id: &DiagnosisId) -> Result<Option<DiagnosisRecord>, RepositoryError>;
    fn insert_click(&self, record: ClickRecord) -> Result<ClickRecord, RepositoryError>;
    fn clicks_for(&self, id: &DiagnosisId) -> Result<Vec<ClickRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
