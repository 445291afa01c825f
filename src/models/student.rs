use serde::{Deserialize, Serialize};

use super::targeting::{Language, Subgroup};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub full_name: String,
    pub language: Language,
    #[serde(default)]
    pub eng_subgroup: Option<Subgroup>,
    pub oit_subgroup: Subgroup,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub is_deleted: bool,
}
