use crate::models::{Language, StudentSettings, TargetSubgroup, Targets};

/// Whether a targeted record applies to the given student. All three
/// dimensions must pass; the English subgroup only constrains students
/// whose language is English.
pub fn applies_to(targets: &Targets, settings: &StudentSettings) -> bool {
    let language_ok = targets.target_language.matches(settings.language);

    let eng_subgroup_ok = targets.target_eng_subgroup == TargetSubgroup::All
        || settings.language != Language::En
        || settings
            .eng_subgroup
            .is_some_and(|s| targets.target_eng_subgroup.matches(s));

    let oit_subgroup_ok = targets.target_oit_subgroup.matches(settings.oit_subgroup);

    language_ok && eng_subgroup_ok && oit_subgroup_ok
}
