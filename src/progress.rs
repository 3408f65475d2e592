//! Persisted documents: user progress and user settings.
//!
//! Field names match the JSON documents on disk, so old files keep loading.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Deserializer, Serialize};

/// How challenges are ordered when playing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    #[serde(rename = "category")]
    Category,
    #[serde(rename = "random-by-difficulty")]
    RandomByDifficulty,
}

impl GameMode {
    pub fn toggled(self) -> Self {
        match self {
            GameMode::Category => GameMode::RandomByDifficulty,
            GameMode::RandomByDifficulty => GameMode::Category,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GameMode::Category => "Category Order",
            GameMode::RandomByDifficulty => "Random by Difficulty",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub show_vulnerability_names: bool,
    pub game_mode: GameMode,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProgress {
    #[serde(deserialize_with = "completed_set")]
    pub completed_challenges: BTreeSet<String>,
    pub current_category_idx: usize,
    pub current_challenge_idx: usize,
    #[serde(rename = "randomizedChallengeIDs", deserialize_with = "null_as_default")]
    pub randomized_challenge_ids: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub category_error_counts: HashMap<String, u32>,
    pub is_random_mode: bool,
    #[serde(deserialize_with = "empty_as_none")]
    pub pending_category_explanation: Option<String>,
}

// Older documents store completions as `{ "id": true }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CompletedRepr {
    List(Vec<String>),
    Map(BTreeMap<String, bool>),
}

fn completed_set<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeSet<String>, D::Error> {
    Ok(match Option::<CompletedRepr>::deserialize(d)? {
        Some(CompletedRepr::List(ids)) => ids.into_iter().collect(),
        Some(CompletedRepr::Map(map)) => map.into_iter().filter(|(_, done)| *done).map(|(id, _)| id).collect(),
        None => BTreeSet::new(),
    })
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

fn empty_as_none<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(d)?.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_hide_names_and_use_category_mode() {
        let s = UserSettings::default();
        assert!(!s.show_vulnerability_names);
        assert_eq!(s.game_mode, GameMode::Category);
        let p = UserProgress::default();
        assert!(p.completed_challenges.is_empty());
        assert!(p.pending_category_explanation.is_none());
    }

    #[test]
    fn settings_use_document_field_names() {
        let json = r#"{"showVulnerabilityNames":true,"gameMode":"random-by-difficulty"}"#;
        let s: UserSettings = serde_json::from_str(json).unwrap();
        assert!(s.show_vulnerability_names);
        assert_eq!(s.game_mode, GameMode::RandomByDifficulty);
        assert_eq!(serde_json::to_string(&s).unwrap(), json);
    }

    #[test]
    fn legacy_progress_map_is_accepted() {
        let json = r#"{
            "completedChallenges": {"a": true, "b": false, "c": true},
            "currentCategoryIdx": 1,
            "currentChallengeIdx": 2,
            "randomizedChallengeIDs": null,
            "categoryErrorCounts": {"Injection": 3},
            "isRandomMode": false,
            "pendingCategoryExplanation": ""
        }"#;
        let p: UserProgress = serde_json::from_str(json).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(p.completed_challenges.iter().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(p.current_category_idx, 1);
        assert_eq!(p.category_error_counts["Injection"], 3);
        assert!(p.pending_category_explanation.is_none());
    }

    #[test]
    fn progress_writes_completed_ids_as_sorted_list() {
        let mut p = UserProgress::default();
        p.completed_challenges.insert("z".into());
        p.completed_challenges.insert("a".into());
        p.pending_category_explanation = Some("Injection".into());
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["completedChallenges"], serde_json::json!(["a", "z"]));
        assert_eq!(v["pendingCategoryExplanation"], "Injection");
        assert!(v.get("randomizedChallengeIDs").is_some());
    }
}
