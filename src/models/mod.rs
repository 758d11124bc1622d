// src/models/mod.rs

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ───────────────────────────────────────
// Catalogue
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Lesson {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image: Option<String>, // path or URL, managed by the admin side
}

// ───────────────────────────────────────
// Timetable (table `classes`)
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledSession {
    pub id: i64,
    pub lesson_id: i64,           // always == lesson.id
    pub day: String,              // "Monday", "Tuesday", ...
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub capacity: i32,
    pub lesson: Lesson,
}

/// Flat row of `classes JOIN lessons`; turned into a [`ScheduledSession`]
/// with its lesson already resolved.
#[derive(Debug, FromRow)]
pub struct ScheduledSessionRow {
    pub id: i64,
    pub lesson_id: i64,
    pub day: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub capacity: i32,
    pub lesson_title: String,
    pub lesson_description: String,
    pub lesson_image: Option<String>,
}

impl From<ScheduledSessionRow> for ScheduledSession {
    fn from(row: ScheduledSessionRow) -> Self {
        Self {
            id: row.id,
            lesson_id: row.lesson_id,
            day: row.day,
            start_time: row.start_time,
            end_time: row.end_time,
            capacity: row.capacity,
            lesson: Lesson {
                id: row.lesson_id,
                title: row.lesson_title,
                description: row.lesson_description,
                image: row.lesson_image,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joined_row_resolves_its_lesson() {
        let row = ScheduledSessionRow {
            id: 7,
            lesson_id: 10,
            day: "Monday".into(),
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
            capacity: 20,
            lesson_title: "Boxing".into(),
            lesson_description: "Pads and bags".into(),
            lesson_image: None,
        };

        let session = ScheduledSession::from(row);
        assert_eq!(session.id, 7);
        assert_eq!(session.lesson_id, 10);
        assert_eq!(session.lesson.id, session.lesson_id);
        assert_eq!(session.lesson.title, "Boxing");
        assert_eq!(session.capacity, 20);
    }
}
