// src/routes/mod.rs

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::{middleware::{panic_to_failure, route_not_found}, render_failures, ErrorClassifier};
use crate::AppState;

pub mod health;
pub mod lessons;
pub mod pages;

pub fn router(state: AppState) -> Router {
    let classifier: Arc<ErrorClassifier> = state.classifier.clone();

    // Very permissive CORS; the frontend is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/homepage", get(pages::homepage))
        .route("/api/classes", get(pages::classes))
        .route("/api/lessons/:id", get(lessons::show_lesson))
        .fallback(route_not_found)
        .with_state(state)
        // innermost first: panics become failures before they are rendered
        .layer(CatchPanicLayer::custom(panic_to_failure))
        .layer(from_fn_with_state(classifier, render_failures))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
