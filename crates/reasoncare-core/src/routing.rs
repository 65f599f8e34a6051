//! Endpoint routing.
//!
//! Paths are resolved once per call into a `Route`; handlers match on the
//! enum and never look at path strings again. Exact matches win, then the
//! `/api/ehr/*` and `/api/intake/voice/{jobId}` prefixes; anything else is
//! `Route::Unmapped`. Under `/api/ehr/` the first segment is the patient id
//! and deeper segments still resolve to that patient's record.

use reasoncare_contracts::request::Method;

const EHR_PREFIX: &str = "/api/ehr/";
const VOICE_JOB_PREFIX: &str = "/api/intake/voice/";

/// A resolved logical endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `POST /api/intake/voice`
    VoiceIntake,
    /// `GET /api/intake/voice/{jobId}`
    VoiceIntakeStatus { job_id: String },
    /// `GET /api/ehr/{id}[/...]`
    EhrRead { patient_id: String },
    /// `PUT /api/ehr/{id}[/...]`
    EhrWrite { patient_id: String },
    /// `POST /api/diagnosis/generate`
    DiagnosisGenerate,
    /// `PUT /api/diagnosis/update`
    DiagnosisUpdate,
    /// `POST /api/diagnosis/approve`
    DiagnosisApprove,
    /// `POST /api/diagnosis/reject`
    DiagnosisReject,
    /// `POST /api/guidelines/update`
    GuidelinesUpdate,
    /// No mapping for this (path, method) pair.
    Unmapped,
}

impl Route {
    /// Resolve a query-free path and method into a route.
    pub fn resolve(method: Method, path: &str) -> Route {
        match (method, path) {
            (Method::Post, "/api/intake/voice") => Route::VoiceIntake,
            (Method::Post, "/api/diagnosis/generate") => Route::DiagnosisGenerate,
            (Method::Put, "/api/diagnosis/update") => Route::DiagnosisUpdate,
            (Method::Post, "/api/diagnosis/approve") => Route::DiagnosisApprove,
            (Method::Post, "/api/diagnosis/reject") => Route::DiagnosisReject,
            (Method::Post, "/api/guidelines/update") => Route::GuidelinesUpdate,
            _ => Self::resolve_prefixed(method, path),
        }
    }

    fn resolve_prefixed(method: Method, path: &str) -> Route {
        if let Some(patient_id) = path.strip_prefix(EHR_PREFIX).and_then(first_segment) {
            return match method {
                Method::Get => Route::EhrRead { patient_id },
                Method::Put => Route::EhrWrite { patient_id },
                _ => Route::Unmapped,
            };
        }

        if let Some(job_id) = path.strip_prefix(VOICE_JOB_PREFIX).and_then(single_segment) {
            if method == Method::Get {
                return Route::VoiceIntakeStatus { job_id };
            }
        }

        Route::Unmapped
    }

    /// Stable label for logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Route::VoiceIntake => "intake.voice",
            Route::VoiceIntakeStatus { .. } => "intake.voice.status",
            Route::EhrRead { .. } => "ehr.read",
            Route::EhrWrite { .. } => "ehr.write",
            Route::DiagnosisGenerate => "diagnosis.generate",
            Route::DiagnosisUpdate => "diagnosis.update",
            Route::DiagnosisApprove => "diagnosis.approve",
            Route::DiagnosisReject => "diagnosis.reject",
            Route::GuidelinesUpdate => "guidelines.update",
            Route::Unmapped => "unmapped",
        }
    }
}

/// The leading segment of a path remainder, if non-empty.
fn first_segment(rest: &str) -> Option<String> {
    rest.split('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// A non-empty path remainder with no further `/`.
fn single_segment(rest: &str) -> Option<String> {
    if rest.is_empty() || rest.contains('/') {
        None
    } else {
        Some(rest.to_string())
    }
}
