use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ClickSubmission, DiagnosisId, DiagnosisSubmission, Lang};
use super::repository::{DiagnosisRepository, RepositoryError};
use super::service::{DiagnosisService, DiagnosisServiceError};
use super::share::{render_share_page, share_code};

/// Handler state: the service plus the origin used for absolute share links.
pub struct DiagnosisRouterState<R> {
    pub(crate) service: Arc<DiagnosisService<R>>,
    pub(crate) public_origin: Option<String>,
}

impl<R> Clone for DiagnosisRouterState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            public_origin: self.public_origin.clone(),
        }
    }
}

impl<R> DiagnosisRouterState<R> {
    pub fn new(service: Arc<DiagnosisService<R>>, public_origin: Option<String>) -> Self {
        Self {
            service,
            public_origin,
        }
    }

    /// Configured origin, else the one the client addressed.
    fn origin(&self, headers: &HeaderMap) -> String {
        if let Some(origin) = &self.public_origin {
            return origin.trim_end_matches('/').to_string();
        }
        let host = headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("localhost");
        format!("http://{host}")
    }
}

/// Router builder exposing the questionnaire, click tracking, result lookup and
/// share endpoints.
pub fn diagnosis_router<R>(
    service: Arc<DiagnosisService<R>>,
    public_origin: Option<String>,
) -> Router
where
    R: DiagnosisRepository + 'static,
{
    Router::new()
        .route("/api/result", post(result_handler::<R>))
        .route("/api/result/:id", get(history_handler::<R>))
        .route("/api/track-click", post(track_click_handler::<R>))
        .route("/share/:code", get(share_handler::<R>))
        .with_state(DiagnosisRouterState::new(service, public_origin))
}

pub(crate) async fn result_handler<R>(
    State(state): State<DiagnosisRouterState<R>>,
    headers: HeaderMap,
    axum::Json(mut submission): axum::Json<DiagnosisSubmission>,
) -> Response
where
    R: DiagnosisRepository + 'static,
{
    submission.user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    match state.service.diagnose(submission) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn track_click_handler<R>(
    State(state): State<DiagnosisRouterState<R>>,
    axum::Json(submission): axum::Json<ClickSubmission>,
) -> Response
where
    R: DiagnosisRepository + 'static,
{
    match state.service.track_click(submission) {
        Ok(record) => {
            let payload = json!({ "id": record.id.0 });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn history_handler<R>(
    State(state): State<DiagnosisRouterState<R>>,
    Path(id): Path<String>,
) -> Response
where
    R: DiagnosisRepository + 'static,
{
    match state.service.history(&DiagnosisId(id)) {
        Ok(history) => (StatusCode::OK, axum::Json(history)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ShareQuery {
    lang: Option<String>,
}

pub(crate) async fn share_handler<R>(
    State(state): State<DiagnosisRouterState<R>>,
    Path(code): Path<String>,
    Query(query): Query<ShareQuery>,
    headers: HeaderMap,
) -> Response
where
    R: DiagnosisRepository + 'static,
{
    let lang = query.lang.as_deref().map(Lang::from_code).unwrap_or_default();
    let origin = state.origin(&headers);
    Html(render_share_page(share_code(&code), lang, &origin)).into_response()
}

fn error_response(error: DiagnosisServiceError) -> Response {
    let status = match &error {
        DiagnosisServiceError::Validation(_) | DiagnosisServiceError::InvalidClick(_) => {
            StatusCode::BAD_REQUEST
        }
        DiagnosisServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        DiagnosisServiceError::Repository(_) => {
            tracing::error!(error = %error, "diagnosis repository failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "detail": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
