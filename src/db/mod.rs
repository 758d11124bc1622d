// src/db/mod.rs

use sqlx::{postgres::PgPoolOptions, query_as, PgPool};

use crate::config::AppConfig;
use crate::error::Failure;
use crate::models::{Lesson, ScheduledSession, ScheduledSessionRow};

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!(max_connections = config.db_max_connections, "connected to PostgreSQL");
    Ok(pool)
}

const PING_SQL: &str = "SELECT 1";

const LESSONS_SQL: &str = r#"
    SELECT id, title, description, image
    FROM public.lessons
    ORDER BY id
    LIMIT $1
"#;

const LESSON_BY_ID_SQL: &str = r#"
    SELECT id, title, description, image
    FROM public.lessons
    WHERE id = $1
"#;

// one round trip: every session comes back with its lesson
const SESSIONS_SQL: &str = r#"
    SELECT c.id, c.lesson_id, c.day, c.start_time, c.end_time, c.capacity,
           l.title AS lesson_title,
           l.description AS lesson_description,
           l.image AS lesson_image
    FROM public.classes c
    JOIN public.lessons l ON l.id = c.lesson_id
    ORDER BY c.id
"#;

pub async fn ping(pool: &PgPool) -> Result<(), Failure> {
    sqlx::query(PING_SQL)
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| Failure::data_access(PING_SQL, Vec::new(), e))
}

pub async fn list_lessons(pool: &PgPool, limit: i64) -> Result<Vec<Lesson>, Failure> {
    query_as::<_, Lesson>(LESSONS_SQL)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(|e| Failure::data_access(LESSONS_SQL, vec![limit.to_string()], e))
}

pub async fn find_lesson(pool: &PgPool, id: i64) -> Result<Lesson, Failure> {
    query_as::<_, Lesson>(LESSON_BY_ID_SQL)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| Failure::data_access(LESSON_BY_ID_SQL, vec![id.to_string()], e))?
        .ok_or_else(|| Failure::not_found("Lesson", id))
}

pub async fn list_sessions(pool: &PgPool) -> Result<Vec<ScheduledSession>, Failure> {
    let rows = query_as::<_, ScheduledSessionRow>(SESSIONS_SQL)
        .fetch_all(pool)
        .await
        .map_err(|e| Failure::data_access(SESSIONS_SQL, Vec::new(), e))?;
    Ok(rows.into_iter().map(ScheduledSession::from).collect())
}
