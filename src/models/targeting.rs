use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    De,
    Fr,
    Es,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subgroup {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    All,
    En,
    De,
    Fr,
    Es,
}

impl TargetLanguage {
    pub fn matches(self, language: Language) -> bool {
        match self {
            TargetLanguage::All => true,
            TargetLanguage::En => language == Language::En,
            TargetLanguage::De => language == Language::De,
            TargetLanguage::Fr => language == Language::Fr,
            TargetLanguage::Es => language == Language::Es,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetSubgroup {
    All,
    A,
    B,
}

impl TargetSubgroup {
    pub fn matches(self, subgroup: Subgroup) -> bool {
        match self {
            TargetSubgroup::All => true,
            TargetSubgroup::A => subgroup == Subgroup::A,
            TargetSubgroup::B => subgroup == Subgroup::B,
        }
    }
}

/// Targeting triple carried by every schedule-facing record. Flattened
/// into the parent document so the wire format stays flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targets {
    pub target_language: TargetLanguage,
    pub target_eng_subgroup: TargetSubgroup,
    pub target_oit_subgroup: TargetSubgroup,
}
