use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::models::{Event, EventType, SemesterConfig, StudentSettings, Subject};

use super::targeting::applies_to;
use super::week::{Parity, week_number, week_parity};

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingEvent {
    pub id: String,
    pub event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
    pub time_label: String,
}

/// Events for this student within the next `days_ahead` days
/// (today inclusive), ordered by date.
pub fn upcoming_events(
    events: &[Event],
    subjects: &[Subject],
    settings: &StudentSettings,
    today: NaiveDate,
    days_ahead: u64,
) -> Vec<UpcomingEvent> {
    let end = today + Days::new(days_ahead);

    let mut upcoming: Vec<&Event> = events
        .iter()
        .filter(|e| e.date >= today && e.date <= end && applies_to(&e.targets, settings))
        .collect();
    upcoming.sort_by_key(|e| e.date);

    upcoming
        .into_iter()
        .map(|event| {
            let subject = event
                .subject_id
                .as_deref()
                .and_then(|id| subjects.iter().find(|s| s.id == id));

            let time_label = match (event.pair_number, event.event_time.as_deref()) {
                (Some(pair), _) => format!("pair {pair}"),
                (None, Some(time)) => time.get(..5).unwrap_or(time).to_string(),
                (None, None) => String::new(),
            };

            UpcomingEvent {
                id: event.id.clone(),
                event_type: event.event_type,
                subject_name: subject
                    .map(|s| s.short_name.clone().unwrap_or_else(|| s.name.clone())),
                description: event.description.clone(),
                date: event.date,
                time_label,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct SemesterProgress {
    pub name: String,
    pub week_number: i64,
    pub week_parity: Parity,
    pub progress_percent: u8,
    pub days_left: i64,
}

/// Where `today` falls in the semester. Clamped so dates outside the
/// window still render as 0% / 100% rather than nonsense.
pub fn semester_progress(config: &SemesterConfig, today: NaiveDate) -> SemesterProgress {
    let total_days = (config.end_date - config.start_date).num_days();
    let elapsed_days = (today - config.start_date).num_days();

    let progress_percent = if total_days > 0 {
        (elapsed_days * 100 / total_days).clamp(0, 100) as u8
    } else {
        0
    };

    let days_left = (config.end_date - today).num_days().max(0);

    SemesterProgress {
        name: config.name.clone(),
        week_number: week_number(today, config.start_date),
        week_parity: week_parity(today, config.odd_week_start),
        progress_percent,
        days_left,
    }
}
