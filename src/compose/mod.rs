// src/compose/mod.rs

use std::collections::{HashMap, HashSet};

use chrono::NaiveTime;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::models::{Lesson, ScheduledSession};

pub mod content;

use content::{About, CarouselSlide, Hero, Testimonial};

/// Classes shown on the homepage.
pub const HOMEPAGE_CLASS_LIMIT: usize = 3;

// ───────────────────────────────────────
// View documents
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassCard {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomepageView {
    pub hero: Hero,
    pub carousel: Vec<CarouselSlide>,
    pub about: About,
    pub testimonials: Vec<Testimonial>,
    pub classes: Vec<ClassCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LessonView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub class: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub capacity: i32,
}

/// Day label → sessions, kept in first-seen day order and serialized as a
/// JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DaySchedule(Vec<(String, Vec<SessionSummary>)>);

impl DaySchedule {
    pub fn days(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(day, _)| day.as_str())
    }

    pub fn get(&self, day: &str) -> Option<&[SessionSummary]> {
        self.0
            .iter()
            .find(|(d, _)| d == day)
            .map(|(_, sessions)| sessions.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for DaySchedule {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (day, sessions) in &self.0 {
            map.serialize_entry(day, sessions)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassesPageView {
    pub offerings: Vec<LessonView>,
    pub schedule: DaySchedule,
}

// ───────────────────────────────────────
// Composition
// ───────────────────────────────────────
pub fn compose_lesson(lesson: &Lesson) -> LessonView {
    LessonView {
        id: lesson.id,
        title: lesson.title.clone(),
        description: lesson.description.clone(),
        image: lesson.image.clone(),
    }
}

/// Static homepage sections plus the first `limit` lessons as class cards.
pub fn compose_homepage(lessons: &[Lesson], limit: usize) -> HomepageView {
    let classes = lessons
        .iter()
        .take(limit)
        .map(|l| ClassCard {
            title: l.title.clone(),
            description: l.description.clone(),
            image: l.image.clone(),
        })
        .collect();

    HomepageView {
        hero: content::hero(),
        carousel: content::carousel(),
        about: content::about(),
        testimonials: content::testimonials(),
        classes,
    }
}

/// Distinct lessons (first occurrence wins) and the timetable grouped by day.
/// Sessions must come with their lesson already loaded.
pub fn compose_classes_page(sessions: &[ScheduledSession]) -> ClassesPageView {
    let mut seen: HashSet<i64> = HashSet::new();
    let mut offerings = Vec::new();
    let mut day_index: HashMap<&str, usize> = HashMap::new();
    let mut schedule: Vec<(String, Vec<SessionSummary>)> = Vec::new();

    for s in sessions {
        if seen.insert(s.lesson.id) {
            offerings.push(compose_lesson(&s.lesson));
        }

        let slot = *day_index.entry(s.day.as_str()).or_insert_with(|| {
            schedule.push((s.day.clone(), Vec::new()));
            schedule.len() - 1
        });
        schedule[slot].1.push(SessionSummary {
            class: s.lesson.title.clone(),
            start_time: s.start_time,
            end_time: s.end_time,
            capacity: s.capacity,
        });
    }

    ClassesPageView { offerings, schedule: DaySchedule(schedule) }
}
