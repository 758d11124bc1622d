// src/routes/lessons.rs

use axum::{
    extract::{Path, State},
    Json,
};

use crate::compose::{self, LessonView};
use crate::error::Failure;
use crate::{db, AppState};

/// GET /api/lessons/:id
pub async fn show_lesson(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<LessonView>, Failure> {
    let id = parse_id(&raw_id)?;
    let lesson = db::find_lesson(&state.pool, id).await?;
    Ok(Json(compose::compose_lesson(&lesson)))
}

fn parse_id(raw: &str) -> Result<i64, Failure> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| Failure::invalid_field("id", "The id must be an integer."))
}
