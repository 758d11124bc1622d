// src/routes/pages.rs

use axum::{extract::State, Json};

use crate::compose::{self, ClassesPageView, HomepageView, HOMEPAGE_CLASS_LIMIT};
use crate::error::Failure;
use crate::{db, AppState};

/// GET /api/homepage
pub async fn homepage(State(state): State<AppState>) -> Result<Json<HomepageView>, Failure> {
    let lessons = db::list_lessons(&state.pool, HOMEPAGE_CLASS_LIMIT as i64).await?;
    Ok(Json(compose::compose_homepage(&lessons, HOMEPAGE_CLASS_LIMIT)))
}

/// GET /api/classes
pub async fn classes(State(state): State<AppState>) -> Result<Json<ClassesPageView>, Failure> {
    let sessions = db::list_sessions(&state.pool).await?;
    Ok(Json(compose::compose_classes_page(&sessions)))
}
