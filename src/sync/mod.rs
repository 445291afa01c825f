mod engine;

pub use engine::SyncEngine;

use serde::Serialize;

/// The synced collections. Declared order is sync order; there is no
/// cross-collection ordering requirement, readers tolerate transiently
/// dangling references between pulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Semester,
    Subjects,
    Teachers,
    Students,
    Schedule,
    Overrides,
    Events,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Semester,
        Collection::Subjects,
        Collection::Teachers,
        Collection::Students,
        Collection::Schedule,
        Collection::Overrides,
        Collection::Events,
    ];

    /// Local replica table.
    pub fn local_name(self) -> &'static str {
        match self {
            Collection::Semester => "semester",
            Collection::Subjects => "subjects",
            Collection::Teachers => "teachers",
            Collection::Students => "students",
            Collection::Schedule => "schedule",
            Collection::Overrides => "overrides",
            Collection::Events => "events",
        }
    }

    /// Table name on the remote store.
    pub fn remote_table(self) -> &'static str {
        match self {
            Collection::Semester => "semester_config",
            Collection::Subjects => "subjects",
            Collection::Teachers => "teachers",
            Collection::Students => "students",
            Collection::Schedule => "schedule_entries",
            Collection::Overrides => "schedule_overrides",
            Collection::Events => "events",
        }
    }

    /// Whether the remote table soft-deletes via is_deleted.
    pub fn has_delete_flag(self) -> bool {
        !matches!(self, Collection::Semester)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Idle,
    Syncing,
    Success,
    Error,
    Offline,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    pub state: SyncState,
    pub last_sync_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
