//! Progress report: per-category completion, difficulty breakdown and error rates.
//!
//! Pure computations over `GameState`; the Progress screen renders the result.

use crate::domain::Difficulty;
use crate::state::GameState;
use crate::util::percentage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorLevel {
  Low,
  Moderate,
  High,
}

impl ErrorLevel {
  /// `High` above 50%, `Moderate` above 30%, `Low` above 15%.
  pub fn from_rate(rate: usize) -> Option<Self> {
    match rate {
      r if r > 50 => Some(ErrorLevel::High),
      r if r > 30 => Some(ErrorLevel::Moderate),
      r if r > 15 => Some(ErrorLevel::Low),
      _ => None,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      ErrorLevel::Low => "Low error rate",
      ErrorLevel::Moderate => "Moderate error rate",
      ErrorLevel::High => "High error rate",
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierCount {
  pub difficulty: Difficulty,
  pub completed: usize,
  pub total: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryReport {
  pub category: String,
  pub completed: usize,
  pub total: usize,
  pub percentage: usize,
  /// Only tiers that have at least one challenge in this category.
  pub tiers: Vec<TierCount>,
  pub errors: u32,
  pub error_rate: usize,
  pub error_level: Option<ErrorLevel>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverallReport {
  pub completed: usize,
  pub total: usize,
  pub percentage: usize,
  pub errors: u32,
  pub categories: Vec<CategoryReport>,
}

/// errors * 100 / (completed + errors); 0 with no attempts.
pub fn error_rate(completed: usize, errors: u32) -> usize {
  let errors = errors as usize;
  percentage(errors, completed + errors)
}

pub fn category_report(state: &GameState, idx: usize) -> Option<CategoryReport> {
  let set = state.catalog().set(idx)?;
  let (completed, total) = state.category_counts(idx);

  let tiers = Difficulty::ALL
    .iter()
    .filter_map(|&difficulty| {
      let in_tier: Vec<_> = set.challenges.iter().filter(|c| c.difficulty == difficulty).collect();
      if in_tier.is_empty() {
        return None;
      }
      let done = in_tier.iter().filter(|c| state.is_challenge_completed(&c.id)).count();
      Some(TierCount { difficulty, completed: done, total: in_tier.len() })
    })
    .collect();

  let errors = state.category_error_count(&set.category);
  let rate = error_rate(completed, errors);
  Some(CategoryReport {
    category: set.category.clone(),
    completed,
    total,
    percentage: percentage(completed, total),
    tiers,
    errors,
    error_rate: rate,
    error_level: ErrorLevel::from_rate(rate),
  })
}

pub fn overall(state: &GameState) -> OverallReport {
  let categories: Vec<CategoryReport> =
    (0..state.catalog().category_count()).filter_map(|idx| category_report(state, idx)).collect();
  let completed = categories.iter().map(|c| c.completed).sum();
  let total = categories.iter().map(|c| c.total).sum();
  OverallReport {
    completed,
    total,
    percentage: percentage(completed, total),
    errors: categories.iter().map(|c| c.errors).sum(),
    categories,
  }
}
