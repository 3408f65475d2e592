//! Domain models: challenge kinds, difficulty tiers, challenges, challenge sets and
//! the per-category vulnerability explanations.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// What kind of challenge is presented to the user?
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
  /// Pick the option naming the vulnerability.
  #[default]
  MultipleChoice,
  /// Pick the option that fixes the code.
  CodeFix,
}

/// Difficulty tier. Declaration order is the tier order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  #[default]
  Beginner,
  Intermediate,
  Advanced,
}

impl Difficulty {
  pub const ALL: [Difficulty; 3] = [Difficulty::Beginner, Difficulty::Intermediate, Difficulty::Advanced];

  pub fn from_level(level: u8) -> Option<Self> {
    match level {
      0 => Some(Difficulty::Beginner),
      1 => Some(Difficulty::Intermediate),
      2 => Some(Difficulty::Advanced),
      _ => None,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Difficulty::Beginner => "Beginner",
      Difficulty::Intermediate => "Intermediate",
      Difficulty::Advanced => "Advanced",
    }
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl std::str::FromStr for Difficulty {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    if let Ok(level) = s.parse::<u8>() {
      return Difficulty::from_level(level).ok_or_else(|| format!("difficulty level out of range: {level} (expected 0-2)"));
    }
    match s.to_ascii_lowercase().as_str() {
      "beginner" => Ok(Difficulty::Beginner),
      "intermediate" => Ok(Difficulty::Intermediate),
      "advanced" => Ok(Difficulty::Advanced),
      other => Err(format!("unknown difficulty: {other}")),
    }
  }
}

// Content files write tiers and kinds either as integers or as names.
#[derive(Deserialize)]
#[serde(untagged)]
enum LevelOrName {
  Level(u8),
  Name(String),
}

impl<'de> Deserialize<'de> for Difficulty {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    match LevelOrName::deserialize(deserializer)? {
      LevelOrName::Level(l) => Difficulty::from_level(l)
        .ok_or_else(|| serde::de::Error::custom(format!("difficulty level out of range: {l}"))),
      LevelOrName::Name(n) => n.parse().map_err(serde::de::Error::custom),
    }
  }
}

impl<'de> Deserialize<'de> for ChallengeKind {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    match LevelOrName::deserialize(deserializer)? {
      LevelOrName::Level(0) => Ok(ChallengeKind::MultipleChoice),
      LevelOrName::Level(1) => Ok(ChallengeKind::CodeFix),
      LevelOrName::Level(l) => Err(serde::de::Error::custom(format!("unknown challenge type: {l}"))),
      LevelOrName::Name(n) => match n.to_ascii_lowercase().replace('-', "_").as_str() {
        "multiple_choice" => Ok(ChallengeKind::MultipleChoice),
        "code_fix" => Ok(ChallengeKind::CodeFix),
        other => Err(serde::de::Error::custom(format!("unknown challenge type: {other}"))),
      },
    }
  }
}

/// One challenge as loaded from the content file. Immutable after load.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
  pub id: String,
  pub title: String,
  #[serde(default)] pub description: String,
  #[serde(default, rename = "type")] pub kind: ChallengeKind,
  #[serde(default)] pub difficulty: Difficulty,
  #[serde(default)] pub category: String,
  #[serde(default)] pub code: String,
  #[serde(default)] pub lang: String,
  #[serde(default)] pub options: Vec<String>,
  pub correct_answer: String,
  #[serde(default)] pub hint: Option<String>,
  #[serde(default)] pub solution: Option<String>,
  #[serde(default)] pub explanation: Option<String>,
  #[serde(default)] pub tags: Vec<String>,
}

impl Challenge {
  /// Exact-text comparison against the correct option.
  pub fn is_correct(&self, option: &str) -> bool {
    option == self.correct_answer
  }
}

/// A category of challenges sharing one vulnerability theme.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ChallengeSet {
  pub category: String,
  #[serde(default)] pub description: String,
  #[serde(default)] pub challenges: Vec<Challenge>,
}

/// Learning resource link shown under a category explanation.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Resource {
  pub title: String,
  pub url: String,
}

/// Long-form explanation of a vulnerability category.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct VulnerabilityInfo {
  pub name: String,
  #[serde(default)] pub short_description: String,
  #[serde(default)] pub explanation: String,
  #[serde(default)] pub resources: Vec<Resource>,
}
