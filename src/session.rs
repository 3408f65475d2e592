//! Scoped sessions: a traversal pre-filtered by category and/or difficulty at startup.

use std::fmt;

use rand::Rng;

use crate::content::ContentCatalog;
use crate::domain::Difficulty;
use crate::selector::tier_order;

/// Filter requested on the command line. `category` is an index into the catalog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionFilter {
    pub category: Option<usize>,
    pub difficulty: Option<Difficulty>,
}

impl SessionFilter {
    pub fn is_active(&self) -> bool {
        self.category.is_some() || self.difficulty.is_some()
    }

    /// Ordered ids for this filter:
    /// category only → catalog order; difficulty only → that tier shuffled;
    /// both → the category's challenges of that tier, catalog order.
    pub fn challenge_ids<R: Rng + ?Sized>(&self, catalog: &ContentCatalog, rng: &mut R) -> Vec<String> {
        match (self.category, self.difficulty) {
            (Some(ci), tier) => catalog
                .set(ci)
                .map(|set| {
                    set.challenges
                        .iter()
                        .filter(|c| tier.map_or(true, |t| c.difficulty == t))
                        .map(|c| c.id.clone())
                        .collect()
                })
                .unwrap_or_default(),
            (None, Some(tier)) => tier_order(catalog, tier, rng),
            (None, None) => Vec::new(),
        }
    }

    pub fn describe(&self, catalog: &ContentCatalog) -> String {
        let category = self.category.and_then(|ci| catalog.set(ci)).map(|s| s.category.as_str());
        match (category, self.difficulty) {
            (Some(name), Some(tier)) => format!("'{name}' challenges at {} level", tier.label().to_lowercase()),
            (Some(name), None) => format!("all challenges in the '{name}' category"),
            (None, Some(tier)) => format!("all {} difficulty challenges", tier.label().to_lowercase()),
            (None, None) => "all challenges".to_string(),
        }
    }
}

/// A running scoped session: its own id list and cursor, kept out of persisted
/// progress so the regular game resumes untouched afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopedSession {
    pub filter: SessionFilter,
    pub ids: Vec<String>,
    pub position: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub struct EmptySession(pub SessionFilter);

impl fmt::Display for EmptySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no challenges match the requested filter ({:?})", self.0)
    }
}

impl std::error::Error for EmptySession {}
