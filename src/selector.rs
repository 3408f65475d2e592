//! Traversal orders over the catalog and the "next incomplete challenge" search.
//!
//! Everything here is pure: callers pass the catalog, a completion predicate and,
//! where shuffling is involved, the RNG.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::content::{ContentCatalog, Position};
use crate::domain::Difficulty;

/// All challenge ids, one bucket per tier, each bucket shuffled independently,
/// concatenated beginner → intermediate → advanced.
pub fn grouped_by_difficulty<R: Rng + ?Sized>(catalog: &ContentCatalog, rng: &mut R) -> Vec<String> {
    Difficulty::ALL
        .iter()
        .flat_map(|tier| tier_order(catalog, *tier, &mut *rng))
        .collect()
}

/// Ids of a single tier, shuffled.
pub fn tier_order<R: Rng + ?Sized>(catalog: &ContentCatalog, tier: Difficulty, rng: &mut R) -> Vec<String> {
    let mut bucket: Vec<String> = catalog
        .challenges()
        .filter(|c| c.difficulty == tier)
        .map(|c| c.id.clone())
        .collect();
    bucket.shuffle(rng);
    bucket
}

/// Rebuild a persisted random order. Ids no longer in the catalog are dropped;
/// if nothing survives, a fresh order is generated.
pub fn restore_order<R: Rng + ?Sized>(catalog: &ContentCatalog, saved: &[String], rng: &mut R) -> Vec<String> {
    let restored: Vec<String> = saved
        .iter()
        .filter(|id| catalog.locate(id).is_some())
        .cloned()
        .collect();
    if restored.is_empty() {
        return grouped_by_difficulty(catalog, rng);
    }
    restored
}

/// Clamp a possibly stale cursor back into the catalog. Out-of-range indices
/// reset to 0.
pub fn clamp_position(catalog: &ContentCatalog, pos: Position) -> Position {
    let category = if pos.category < catalog.category_count() { pos.category } else { 0 };
    let len = catalog.set(category).map_or(0, |s| s.challenges.len());
    let challenge = if pos.challenge < len { pos.challenge } else { 0 };
    Position { category, challenge }
}

/// Next position in category order: within the category, then first challenge of
/// the following non-empty category. `None` at the end of the catalog.
pub fn advance_in_catalog(catalog: &ContentCatalog, pos: Position) -> Option<Position> {
    let current_len = catalog.set(pos.category).map_or(0, |s| s.challenges.len());
    if pos.challenge + 1 < current_len {
        return Some(Position { category: pos.category, challenge: pos.challenge + 1 });
    }
    (pos.category + 1..catalog.category_count())
        .find(|&ci| catalog.set(ci).is_some_and(|s| !s.challenges.is_empty()))
        .map(|category| Position { category, challenge: 0 })
}

/// Scan forward from `start` (inclusive) to the end of the catalog, then wrap and
/// scan from the beginning up to, but not including, `start`.
pub fn next_incomplete_in_catalog<F>(catalog: &ContentCatalog, start: Position, is_completed: F) -> Option<Position>
where
    F: Fn(&str) -> bool,
{
    let sets = catalog.sets();
    let positions = sets.iter().enumerate().flat_map(|(ci, set)| {
        (0..set.challenges.len()).map(move |xi| Position { category: ci, challenge: xi })
    });
    let (before, after): (Vec<Position>, Vec<Position>) =
        positions.partition(|p| (p.category, p.challenge) < (start.category, start.challenge));
    after
        .into_iter()
        .chain(before)
        .find(|p| catalog.at(*p).is_some_and(|c| !is_completed(&c.id)))
}

/// Same search over an explicit ordered id list (random or scoped sessions).
pub fn next_incomplete_in_list<F>(ids: &[String], start: usize, is_completed: F) -> Option<usize>
where
    F: Fn(&str) -> bool,
{
    let start = if start < ids.len() { start } else { 0 };
    (start..ids.len()).chain(0..start).find(|&i| !is_completed(&ids[i]))
}
