// src/error/classifier.rs

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use super::{Failure, FieldErrors, ModelIds, RequestContext, SourceSite};

/// JSON error envelope. Every field but `message` is optional and only
/// appears for the failure kinds (and verbosity) that fill it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<ModelIds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bindings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<String>>,
}

impl ErrorBody {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
            model: None,
            ids: None,
            exception: None,
            sql: None,
            bindings: None,
            previous: None,
            file: None,
            line: None,
            trace: None,
        }
    }

    fn at(mut self, site: Option<&SourceSite>) -> Self {
        if let Some(site) = site {
            self.file = Some(site.file.clone());
            self.line = Some(site.line);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Turns failures into JSON envelopes.
///
/// `diagnostic` switches on internal detail (SQL, bindings, call sites,
/// traces). It must stay off in production deployments.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    diagnostic: bool,
    not_found_messages: HashMap<&'static str, String>,
}

impl ErrorClassifier {
    pub fn new(diagnostic: bool) -> Self {
        let not_found_messages = HashMap::from([
            ("Student", "Student not found".to_string()),
            ("Lesson", "Class not found".to_string()),
            ("ScheduledSession", "Class session not found".to_string()),
        ]);
        Self { diagnostic, not_found_messages }
    }

    /// Overrides (or adds) the message used when `model` is not found.
    pub fn with_not_found_message(mut self, model: &'static str, message: impl Into<String>) -> Self {
        self.not_found_messages.insert(model, message.into());
        self
    }

    pub fn is_diagnostic(&self) -> bool {
        self.diagnostic
    }

    /// Message for a missing entity; unknown types fall back to
    /// `"<Type> not found"`.
    pub fn not_found_message(&self, model: &str) -> String {
        self.not_found_messages
            .get(model)
            .cloned()
            .unwrap_or_else(|| format!("{model} not found"))
    }

    /// Returns `None` when the request wants neither JSON nor the API, so
    /// the caller falls back to its default rendering.
    pub fn classify(&self, failure: &Failure, request: &RequestContext) -> Option<ErrorResponse> {
        if !request.wants_json() {
            return None;
        }

        let body = match failure {
            Failure::Validation { errors } => ErrorBody {
                errors: Some(errors.clone()),
                ..ErrorBody::message("Validation failed")
            },
            Failure::NotFound { model, ids } => {
                let body = ErrorBody::message(self.not_found_message(model));
                if self.diagnostic {
                    ErrorBody { model: Some(*model), ids: ids.clone(), ..body }
                } else {
                    body
                }
            }
            Failure::Unauthenticated => ErrorBody::message("Unauthenticated"),
            Failure::Unauthorized => ErrorBody::message("Forbidden"),
            Failure::Http { message, .. } => ErrorBody::message(message.clone()),
            Failure::DataAccess { kind, sql, bindings, cause, site } => {
                if self.diagnostic {
                    ErrorBody {
                        exception: Some(*kind),
                        sql: Some(sql.clone()),
                        bindings: Some(bindings.clone()),
                        previous: Some(cause.root_cause().to_string()),
                        ..ErrorBody::message(cause.to_string())
                    }
                    .at(Some(site))
                } else {
                    ErrorBody::message("Database error")
                }
            }
            Failure::Unclassified { kind, cause, site, trace } => {
                if self.diagnostic {
                    ErrorBody {
                        exception: Some(*kind),
                        trace: Some(trace.clone()),
                        ..ErrorBody::message(cause.to_string())
                    }
                    .at(site.as_ref())
                } else {
                    ErrorBody::message("Server error")
                }
            }
        };

        Some(ErrorResponse { status: failure.status(), body })
    }
}
