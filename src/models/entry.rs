use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::targeting::Targets;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Lecture,
    Seminar,
    Practice,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekParity {
    All,
    Odd,
    Even,
}

/// Recurring timetable slot: one pair on one weekday, valid within
/// [date_from, date_to], optionally alternating by week parity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: String,
    pub day_of_week: u8,
    pub pair_number: u8,
    pub subject_id: String,
    pub entry_type: EntryType,
    pub teacher_id: String,
    pub room: String,
    #[serde(flatten)]
    pub targets: Targets,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub week_parity: WeekParity,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub is_deleted: bool,
}
