use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryDiagnosisRepository};
use crate::routes::with_diagnosis_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use spot_eraser::config::AppConfig;
use spot_eraser::diagnosis::{DiagnosisService, QuizProfile, ScoringEngine};
use spot_eraser::error::AppError;
use spot_eraser::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let profile = QuizProfile::resolve(config.quiz.profile, config.quiz.strict_range);
    if let Err(err) = profile.validate() {
        error!(profile = %profile.kind, problems = ?err.problems, "refusing to serve invalid quiz profile");
        return Err(err.into());
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let engine = Arc::new(ScoringEngine::new(profile.clone()));
    let repository = Arc::new(InMemoryDiagnosisRepository::default());
    let diagnosis_service = Arc::new(DiagnosisService::new(engine, repository));

    let app = with_diagnosis_routes(diagnosis_service, config.server.public_origin.clone())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        profile = %profile.kind,
        strict_range = profile.strict_range,
        "spot eraser diagnosis service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
