//! Questionnaire scoring, persistence seams, and the HTTP surface for skin-type
//! diagnoses.
//!
//! The scoring engine is a pure function of the answer vector, the active
//! profile tables and the injected clock. The service wraps it with ID
//! assignment and storage; the router maps service errors onto HTTP statuses.

pub mod clock;
pub mod domain;
pub mod engine;
pub mod profile;
pub mod repository;
pub mod router;
pub mod service;
pub mod share;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    Answer, BirthYear, Category, ClickId, ClickSubmission, DiagnosisId, DiagnosisSubmission,
    ExternalFactor, Lang, ResultCode, SkinType,
};
pub use engine::{AgeEstimate, CategoryScores, Diagnosis, ScoringEngine, ValidationError};
pub use profile::{ProfileError, ProfileKind, QuizProfile};
pub use repository::{ClickRecord, DiagnosisRecord, DiagnosisRepository, RepositoryError};
pub use router::diagnosis_router;
pub use service::{
    DiagnosisHistory, DiagnosisOutcome, DiagnosisService, DiagnosisServiceError, DiagnosisView,
};
