use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entry::EntryType;
use super::targeting::Targets;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideType {
    Cancel,
    Replace,
    Add,
}

/// Date-scoped exception layered on top of the recurring schedule.
/// Subject/teacher/room are only meaningful for replace/add.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOverride {
    pub id: String,
    pub date: NaiveDate,
    pub pair_number: u8,
    pub override_type: OverrideType,
    #[serde(flatten)]
    pub targets: Targets,
    #[serde(default)]
    pub subject_id: Option<String>,
    #[serde(default)]
    pub entry_type: Option<EntryType>,
    #[serde(default)]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub is_deleted: bool,
}
