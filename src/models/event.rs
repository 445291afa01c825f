use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::targeting::Targets;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Usr,
    Deadline,
    ControlWork,
    Credit,
    Exam,
    Consultation,
    Other,
}

/// Dated academic event. Bound to a pair when pair_number is set,
/// free-floating (event_time or all-day) otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub event_type: EventType,
    #[serde(default)]
    pub subject_id: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub pair_number: Option<u8>,
    #[serde(default)]
    pub event_time: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(flatten)]
    pub targets: Targets,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub is_deleted: bool,
}
