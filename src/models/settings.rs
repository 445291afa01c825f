use serde::{Deserialize, Serialize};

use super::targeting::{Language, Subgroup};

/// The viewing student's profile. Local-only: created at onboarding,
/// changed from the settings screen, never synced to the remote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSettings {
    #[serde(default)]
    pub student_id: Option<String>,
    pub language: Language,
    #[serde(default)]
    pub eng_subgroup: Option<Subgroup>,
    pub oit_subgroup: Subgroup,
}
