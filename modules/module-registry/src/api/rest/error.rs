use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use tfreg_errors::{Problem, finalize};

use crate::domain::error::DomainError;

const ERROR_TYPE_BASE: &str = "https://errors.tfreg.dev";

fn problem(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> Problem {
    let trace_id = tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string());
    let p = Problem::new(status, title, detail)
        .with_type(format!("{ERROR_TYPE_BASE}/{code}"))
        .with_code(code);
    finalize(p, instance, trace_id)
}

/// Map domain errors to HTTP problem responses
pub fn domain_error_to_problem(err: &DomainError, instance: &str) -> Problem {
    let (status, code, title, detail) = match err {
        DomainError::ModuleNotFound(_) => (
            StatusCode::NOT_FOUND,
            "MODULE_NOT_FOUND",
            "Module not found",
            err.to_string(),
        ),
        DomainError::VersionNotFound { .. } => (
            StatusCode::NOT_FOUND,
            "VERSION_NOT_FOUND",
            "Version not found",
            err.to_string(),
        ),
        DomainError::VersionExists { .. } => (
            StatusCode::BAD_REQUEST,
            "VERSION_EXISTS",
            "Version already exists",
            err.to_string(),
        ),
        DomainError::EmptyPayload => (
            StatusCode::BAD_REQUEST,
            "NO_DATA",
            "No data received",
            err.to_string(),
        ),
        DomainError::InvalidSegment { .. } => (
            StatusCode::BAD_REQUEST,
            "INVALID_SEGMENT",
            "Invalid path segment",
            err.to_string(),
        ),
        DomainError::Internal(_) => {
            tracing::error!(error = %err, "Internal error while serving registry request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal Server Error",
                "An internal error occurred".to_owned(),
            )
        }
    };

    problem(status, code, title, detail, instance)
}

/// 400 for path parameters that cannot be extracted, e.g. a segment that
/// percent-decodes to invalid UTF-8.
pub fn path_rejection_to_problem(rejection: &PathRejection, instance: &str) -> Problem {
    tracing::debug!(error = %rejection, "Rejected path parameters");
    problem(
        StatusCode::BAD_REQUEST,
        "INVALID_SEGMENT",
        "Invalid path segment",
        rejection.body_text(),
        instance,
    )
}

/// 404 for requests that match no route.
pub fn route_not_found(instance: &str) -> Problem {
    problem(
        StatusCode::NOT_FOUND,
        "NOT_FOUND",
        "Not Found",
        format!("No route for {instance}"),
        instance,
    )
}
