// src/error/mod.rs

use std::any::type_name;
use std::collections::BTreeMap;
use std::panic::Location;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub mod classifier;
pub mod middleware;
pub mod trace;

pub use classifier::{ErrorBody, ErrorClassifier, ErrorResponse};
pub use middleware::{render_failures, RequestContext};
pub use trace::SourceSite;

/// Field name → messages, as sent back to the client.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Identifier(s) a not-found lookup was attempted with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ModelIds {
    One(i64),
    Many(Vec<i64>),
}

/// Everything a request can fail with. Raised by handlers, rendered by
/// [`render_failures`] through the [`ErrorClassifier`].
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    #[error("validation failed on {} field(s)", .errors.len())]
    Validation { errors: FieldErrors },

    #[error("{model} not found")]
    NotFound {
        model: &'static str,
        ids: Option<ModelIds>,
    },

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("forbidden")]
    Unauthorized,

    #[error("{status}: {message}")]
    Http { status: StatusCode, message: String },

    #[error("database error: {cause}")]
    DataAccess {
        kind: &'static str,
        sql: String,
        bindings: Vec<String>,
        cause: anyhow::Error,
        site: SourceSite,
    },

    #[error("{cause}")]
    Unclassified {
        kind: &'static str,
        cause: anyhow::Error,
        site: Option<SourceSite>,
        trace: Vec<String>,
    },
}

impl Failure {
    pub fn validation(errors: FieldErrors) -> Self {
        Failure::Validation { errors }
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![message.into()]);
        Self::validation(errors)
    }

    pub fn not_found(model: &'static str, id: i64) -> Self {
        Failure::NotFound { model, ids: Some(ModelIds::One(id)) }
    }

    pub fn not_found_many(model: &'static str, ids: Vec<i64>) -> Self {
        Failure::NotFound { model, ids: Some(ModelIds::Many(ids)) }
    }

    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Failure::Http { status, message: message.into() }
    }

    /// Wraps a query error together with the statement that produced it.
    #[track_caller]
    pub fn data_access<E>(sql: &str, bindings: Vec<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Failure::DataAccess {
            kind: type_name::<E>(),
            sql: sql.trim().to_string(),
            bindings,
            cause: anyhow::Error::new(cause),
            site: SourceSite::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unclassified<E>(cause: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Failure::Unclassified {
            kind: type_name::<E>(),
            cause: cause.into(),
            site: Some(SourceSite::from(Location::caller())),
            trace: trace::capture_frames(),
        }
    }

    /// A handler panic caught by `CatchPanicLayer`. Site and trace come from
    /// the panic hook when it is installed.
    pub fn panicked(message: String) -> Self {
        let (site, trace) = match trace::take_panic_site() {
            Some(recorded) => (recorded.site, recorded.trace),
            None => (None, Vec::new()),
        };
        Failure::Unclassified { kind: "panic", cause: anyhow::Error::msg(message), site, trace }
    }

    /// Status the failure maps to, independent of verbosity.
    pub fn status(&self) -> StatusCode {
        match self {
            Failure::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Failure::NotFound { .. } => StatusCode::NOT_FOUND,
            Failure::Unauthenticated => StatusCode::UNAUTHORIZED,
            Failure::Unauthorized => StatusCode::FORBIDDEN,
            Failure::Http { status, .. } => *status,
            Failure::DataAccess { .. } | Failure::Unclassified { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Response extension marking a response as a raised failure awaiting
/// classification.
#[derive(Debug, Clone)]
pub struct RaisedFailure(pub Arc<Failure>);

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        response.extensions_mut().insert(RaisedFailure(Arc::new(self)));
        response
    }
}
