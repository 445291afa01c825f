use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{
    EntryType, Event, EventType, OverrideType, ScheduleEntry, ScheduleOverride, SemesterConfig,
    StudentSettings, Subject, Targets, Teacher, WeekParity,
};

use super::bells::BELL_SCHEDULE;
use super::targeting::applies_to;
use super::week::{Parity, day_of_week, week_parity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PairStatus {
    Normal,
    Replaced,
    Added,
    Cancelled,
    Event,
}

/// One resolved class period. Source ids and targets are kept for
/// traceability; they do not affect how the pair displays.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedPair {
    pub pair_number: u8,
    pub subject_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_short_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<EntryType>,
    pub teacher_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    pub room: String,
    pub status: PairStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_entry_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_override_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_targets: Option<Targets>,
}

/// One bell slot of the day grid. `pair` is None for a window. The
/// grid always carries all five periods; trimming empty edges is a
/// presentation concern left to callers.
#[derive(Debug, Clone, Serialize)]
pub struct DaySlot {
    pub pair_number: u8,
    pub start_time: String,
    pub end_time: String,
    pub pair: Option<ResolvedPair>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FloatingEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySchedule {
    pub slots: Vec<DaySlot>,
    pub floating_events: Vec<FloatingEvent>,
}

/// Replica snapshot the resolver works from.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleSources<'a> {
    pub entries: &'a [ScheduleEntry],
    pub overrides: &'a [ScheduleOverride],
    pub events: &'a [Event],
    pub subjects: &'a [Subject],
    pub teachers: &'a [Teacher],
    pub semester: Option<&'a SemesterConfig>,
}

fn matches_parity(selector: WeekParity, current: Option<Parity>) -> bool {
    match (selector, current) {
        (WeekParity::All, _) => true,
        // No semester config yet: parity filtering is disabled.
        (_, None) => true,
        (WeekParity::Odd, Some(Parity::Odd)) => true,
        (WeekParity::Even, Some(Parity::Even)) => true,
        _ => false,
    }
}

/// Resolves one day for one student: recurring entries, date-scoped
/// overrides and events merged per pair with precedence
/// event > override > base entry > empty.
pub fn build_day_schedule(
    date: NaiveDate,
    settings: &StudentSettings,
    sources: &ScheduleSources<'_>,
    exclude_event_types: &[EventType],
) -> DaySchedule {
    let dow = day_of_week(date);
    let parity = sources
        .semester
        .map(|config| week_parity(date, config.odd_week_start));

    let subject_map: HashMap<&str, &Subject> = sources
        .subjects
        .iter()
        .map(|s| (s.id.as_str(), s))
        .collect();
    let teacher_map: HashMap<&str, &Teacher> = sources
        .teachers
        .iter()
        .map(|t| (t.id.as_str(), t))
        .collect();

    let day_entries: Vec<&ScheduleEntry> = sources
        .entries
        .iter()
        .filter(|e| {
            e.day_of_week == dow
                && e.date_from <= date
                && date <= e.date_to
                && applies_to(&e.targets, settings)
                && matches_parity(e.week_parity, parity)
        })
        .collect();

    let day_overrides: Vec<&ScheduleOverride> = sources
        .overrides
        .iter()
        .filter(|o| o.date == date && applies_to(&o.targets, settings))
        .collect();

    let all_day_events: Vec<&Event> = sources
        .events
        .iter()
        .filter(|e| {
            e.date == date
                && applies_to(&e.targets, settings)
                && !exclude_event_types.contains(&e.event_type)
        })
        .collect();

    let slots = BELL_SCHEDULE
        .iter()
        .map(|bell| {
            let entry = day_entries
                .iter()
                .find(|e| e.pair_number == bell.pair_number)
                .copied();
            let day_override = day_overrides
                .iter()
                .find(|o| o.pair_number == bell.pair_number)
                .copied();
            let event = all_day_events
                .iter()
                .find(|e| e.pair_number == Some(bell.pair_number))
                .copied();

            // Events represent the most deliberate scheduling intent
            // for a period, so they win over overrides.
            let pair = if let Some(event) = event {
                Some(resolve_event(
                    event,
                    entry,
                    &subject_map,
                    &teacher_map,
                    bell.pair_number,
                ))
            } else if let Some(day_override) = day_override {
                resolve_override(
                    day_override,
                    entry,
                    &subject_map,
                    &teacher_map,
                    bell.pair_number,
                )
            } else if let Some(entry) = entry {
                Some(resolve_entry(entry, &subject_map, &teacher_map))
            } else {
                None
            };

            DaySlot {
                pair_number: bell.pair_number,
                start_time: bell.start_time.to_string(),
                end_time: bell.end_time.to_string(),
                pair,
            }
        })
        .collect();

    let floating_events = all_day_events
        .iter()
        .filter(|e| e.pair_number.is_none())
        .map(|e| {
            let subject = e
                .subject_id
                .as_deref()
                .and_then(|id| subject_map.get(id))
                .copied();
            let teacher = e
                .teacher_id
                .as_deref()
                .and_then(|id| teacher_map.get(id))
                .copied();
            FloatingEvent {
                description: e.description.clone(),
                event_type: e.event_type,
                subject_name: subject.map(|s| s.name.clone()),
                teacher_name: teacher.map(|t| t.full_name.clone()),
                room: e.room.clone(),
                event_time: e.event_time.as_deref().map(truncate_to_minutes),
            }
        })
        .collect();

    DaySchedule {
        slots,
        floating_events,
    }
}

fn resolve_event(
    event: &Event,
    entry: Option<&ScheduleEntry>,
    subject_map: &HashMap<&str, &Subject>,
    teacher_map: &HashMap<&str, &Teacher>,
    pair_number: u8,
) -> ResolvedPair {
    // Field inheritance: the event's own fields, then the base pair's,
    // then blank.
    let subject_id = event
        .subject_id
        .clone()
        .or_else(|| entry.map(|e| e.subject_id.clone()));
    let teacher_id = event
        .teacher_id
        .clone()
        .or_else(|| entry.map(|e| e.teacher_id.clone()));

    let subject = subject_id
        .as_deref()
        .and_then(|id| subject_map.get(id))
        .copied();
    let teacher = teacher_id
        .as_deref()
        .and_then(|id| teacher_map.get(id))
        .copied();

    let room = event
        .room
        .clone()
        .or_else(|| entry.map(|e| e.room.clone()))
        .unwrap_or_default();

    ResolvedPair {
        pair_number,
        // No resolvable subject: show the event under its own title.
        subject_name: subject
            .map(|s| s.name.clone())
            .unwrap_or_else(|| event.title.clone()),
        subject_short_name: subject.and_then(|s| s.short_name.clone()),
        subject_id,
        entry_type: None,
        teacher_name: teacher.map(|t| t.full_name.clone()).unwrap_or_default(),
        teacher_id,
        room,
        status: PairStatus::Event,
        comment: None,
        event_type: Some(event.event_type),
        description: event.description.clone(),
        source_entry_id: entry.map(|e| e.id.clone()),
        source_override_id: None,
        source_targets: Some(event.targets),
    }
}

fn resolve_override(
    day_override: &ScheduleOverride,
    entry: Option<&ScheduleEntry>,
    subject_map: &HashMap<&str, &Subject>,
    teacher_map: &HashMap<&str, &Teacher>,
    pair_number: u8,
) -> Option<ResolvedPair> {
    if day_override.override_type == OverrideType::Cancel {
        // Canceling a pair that was never scheduled shows nothing.
        let entry = entry?;

        let subject = subject_map.get(entry.subject_id.as_str()).copied();
        return Some(ResolvedPair {
            pair_number,
            subject_name: subject.map(|s| s.name.clone()).unwrap_or_default(),
            subject_short_name: subject.and_then(|s| s.short_name.clone()),
            subject_id: Some(entry.subject_id.clone()),
            entry_type: Some(entry.entry_type),
            teacher_name: String::new(),
            teacher_id: Some(entry.teacher_id.clone()),
            room: String::new(),
            status: PairStatus::Cancelled,
            comment: day_override.comment.clone(),
            event_type: None,
            description: None,
            source_entry_id: Some(entry.id.clone()),
            source_override_id: Some(day_override.id.clone()),
            source_targets: Some(day_override.targets),
        });
    }

    // replace / add: everything comes from the override itself; the
    // base entry id is only kept for reference.
    let subject = day_override
        .subject_id
        .as_deref()
        .and_then(|id| subject_map.get(id))
        .copied();
    let teacher = day_override
        .teacher_id
        .as_deref()
        .and_then(|id| teacher_map.get(id))
        .copied();

    Some(ResolvedPair {
        pair_number,
        subject_name: subject.map(|s| s.name.clone()).unwrap_or_default(),
        subject_short_name: subject.and_then(|s| s.short_name.clone()),
        subject_id: day_override.subject_id.clone(),
        entry_type: day_override.entry_type,
        teacher_name: teacher.map(|t| t.full_name.clone()).unwrap_or_default(),
        teacher_id: day_override.teacher_id.clone(),
        room: day_override.room.clone().unwrap_or_default(),
        status: if day_override.override_type == OverrideType::Replace {
            PairStatus::Replaced
        } else {
            PairStatus::Added
        },
        comment: day_override.comment.clone(),
        event_type: None,
        description: None,
        source_entry_id: entry.map(|e| e.id.clone()),
        source_override_id: Some(day_override.id.clone()),
        source_targets: Some(day_override.targets),
    })
}

fn resolve_entry(
    entry: &ScheduleEntry,
    subject_map: &HashMap<&str, &Subject>,
    teacher_map: &HashMap<&str, &Teacher>,
) -> ResolvedPair {
    let subject = subject_map.get(entry.subject_id.as_str()).copied();
    let teacher = teacher_map.get(entry.teacher_id.as_str()).copied();

    ResolvedPair {
        pair_number: entry.pair_number,
        subject_name: subject
            .map(|s| s.name.clone())
            .unwrap_or_else(|| "Unknown subject".to_string()),
        subject_short_name: subject.and_then(|s| s.short_name.clone()),
        subject_id: Some(entry.subject_id.clone()),
        entry_type: Some(entry.entry_type),
        teacher_name: teacher.map(|t| t.full_name.clone()).unwrap_or_default(),
        teacher_id: Some(entry.teacher_id.clone()),
        room: entry.room.clone(),
        status: PairStatus::Normal,
        comment: None,
        event_type: None,
        description: None,
        source_entry_id: Some(entry.id.clone()),
        source_override_id: None,
        source_targets: Some(entry.targets),
    }
}

/// "HH:MM:SS" (or already short) to "HH:MM".
fn truncate_to_minutes(time: &str) -> String {
    time.get(..5).unwrap_or(time).to_string()
}
