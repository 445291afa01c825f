use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Semester singleton. odd_week_start is the Monday anchoring week
/// parity; start_date drives week numbering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemesterConfig {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub odd_week_start: NaiveDate,
    pub created_at: String,
    pub updated_at: String,
}
