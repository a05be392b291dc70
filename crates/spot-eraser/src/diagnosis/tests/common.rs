use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::diagnosis::clock::FixedClock;
use crate::diagnosis::domain::{Answer, DiagnosisId};
use crate::diagnosis::repository::{
    ClickRecord, DiagnosisRecord, DiagnosisRepository, RepositoryError,
};
use crate::diagnosis::{DiagnosisService, ProfileKind, QuizProfile, ScoringEngine};

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date")
}

pub(super) fn engine(kind: ProfileKind) -> ScoringEngine {
    ScoringEngine::with_clock(
        QuizProfile::resolve(kind, None),
        Arc::new(FixedClock::on(today())),
    )
}

pub(super) fn answers(values: &[i64]) -> Vec<Option<i64>> {
    values.iter().copied().map(Some).collect()
}

/// Answers as the client would have submitted them.
pub(super) fn submitted(values: &[Option<i64>]) -> Vec<Option<Answer>> {
    values.iter().map(|value| value.map(Answer::from)).collect()
}

pub(super) const CLASSIC_SENSITIVE_ENVIRONMENT: [i64; 9] = [1, 2, 1, 1, 1, 1, 2, 1, 1];
pub(super) const EXTENDED_OILY_ENVIRONMENT: [i64; 12] = [1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1];
pub(super) const EXTENDED_DRY_STRESS: [i64; 12] = [1, 0, 3, 1, 3, 3, 2, 2, 4, 4, 4, 4];
pub(super) const EXTENDED_UNSELECTED: [i64; 12] = [4, 0, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4];

pub(super) fn build_service(
    kind: ProfileKind,
) -> (DiagnosisService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = DiagnosisService::new(Arc::new(engine(kind)), repository.clone());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) diagnoses: Arc<Mutex<HashMap<DiagnosisId, DiagnosisRecord>>>,
    pub(super) clicks: Arc<Mutex<Vec<ClickRecord>>>,
}

impl MemoryRepository {
    pub(super) fn click_log(&self) -> Vec<ClickRecord> {
        self.clicks.lock().expect("click mutex poisoned").clone()
    }
}

impl DiagnosisRepository for MemoryRepository {
    fn insert_diagnosis(&self, record: DiagnosisRecord) -> Result<DiagnosisRecord, RepositoryError> {
        let mut guard = self.diagnoses.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch_diagnosis(&self, id: &DiagnosisId) -> Result<Option<DiagnosisRecord>, RepositoryError> {
        let guard = self.diagnoses.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn insert_click(&self, record: ClickRecord) -> Result<ClickRecord, RepositoryError> {
        self.clicks
            .lock()
            .expect("click mutex poisoned")
            .push(record.clone());
        Ok(record)
    }

    fn clicks_for(&self, id: &DiagnosisId) -> Result<Vec<ClickRecord>, RepositoryError> {
        let guard = self.clicks.lock().expect("click mutex poisoned");
        Ok(guard
            .iter()
            .filter(|click| click.diagnosis_id.as_ref() == Some(id))
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableRepository;

impl DiagnosisRepository for UnavailableRepository {
    fn insert_diagnosis(&self, _record: DiagnosisRecord) -> Result<DiagnosisRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_diagnosis(&self, _id: &DiagnosisId) -> Result<Option<DiagnosisRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_click(&self, _record: ClickRecord) -> Result<ClickRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn clicks_for(&self, _id: &DiagnosisId) -> Result<Vec<ClickRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = read_body(response).await;
    serde_json::from_slice(&body).expect("json payload")
}
