use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use spot_eraser::diagnosis::{
    ClickRecord, DiagnosisId, DiagnosisRecord, DiagnosisRepository, RepositoryError,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local storage. Everything is lost on restart.
#[derive(Default, Clone)]
pub(crate) struct InMemoryDiagnosisRepository {
    diagnoses: Arc<Mutex<HashMap<DiagnosisId, DiagnosisRecord>>>,
    clicks: Arc<Mutex<Vec<ClickRecord>>>,
}

impl DiagnosisRepository for InMemoryDiagnosisRepository {
    fn insert_diagnosis(&self, record: DiagnosisRecord) -> Result<DiagnosisRecord, RepositoryError> {
        let mut guard = self
            .diagnoses
            .lock()
            .map_err(|_| RepositoryError::Unavailable("diagnosis store poisoned".to_string()))?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch_diagnosis(&self, id: &DiagnosisId) -> Result<Option<DiagnosisRecord>, RepositoryError> {
        let guard = self
            .diagnoses
            .lock()
            .map_err(|_| RepositoryError::Unavailable("diagnosis store poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    fn insert_click(&self, record: ClickRecord) -> Result<ClickRecord, RepositoryError> {
        let mut guard = self
            .clicks
            .lock()
            .map_err(|_| RepositoryError::Unavailable("click store poisoned".to_string()))?;
        guard.push(record.clone());
        Ok(record)
    }

    fn clicks_for(&self, id: &DiagnosisId) -> Result<Vec<ClickRecord>, RepositoryError> {
        let guard = self
            .clicks
            .lock()
            .map_err(|_| RepositoryError::Unavailable("click store poisoned".to_string()))?;
        Ok(guard
            .iter()
            .filter(|click| click.diagnosis_id.as_ref() == Some(id))
            .cloned()
            .collect())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Answer vector given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AnswerList(pub(crate) Vec<Option<i64>>);

/// Comma-separated answers; `null` or an empty slot is a missing answer.
pub(crate) fn parse_answers(raw: &str) -> Result<AnswerList, String> {
    raw.split(',')
        .map(str::trim)
        .map(|value| match value {
            "" | "null" | "-" => Ok(None),
            other => other
                .parse::<i64>()
                .map(Some)
                .map_err(|err| format!("failed to parse answer '{other}' ({err})")),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(AnswerList)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use spot_eraser::diagnosis::{ClickId, Lang};

    #[test]
    fn parse_answers_accepts_missing_slots() {
        let parsed = parse_answers("1, 2,,null,4").expect("answers parse");
        assert_eq!(parsed.0, vec![Some(1), Some(2), None, None, Some(4)]);
        assert!(parse_answers("1,two").is_err());
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert!(parse_date("2026-10-16").is_ok());
        assert!(parse_date("16/10/2026").is_err());
    }

    #[test]
    fn clicks_are_filtered_by_diagnosis() {
        let repository = InMemoryDiagnosisRepository::default();
        let linked = DiagnosisId("diag-000042".to_string());
        for (index, diagnosis_id) in [Some(linked.clone()), None].into_iter().enumerate() {
            repository
                .insert_click(ClickRecord {
                    id: ClickId(format!("click-{index}")),
                    created_at: Utc::now(),
                    diagnosis_id,
                    button_key: "share".to_string(),
                    lang: Lang::Kor,
                })
                .expect("click stored");
        }

        let clicks = repository.clicks_for(&linked).expect("clicks readable");
        assert_eq!(clicks.len(), 1);
        assert_eq!(clicks[0].id, ClickId("click-0".to_string()));
    }
}
