//! Game state: catalog + persisted progress/settings + transient notices.
//!
//! `GameState` is the single owner of everything that changes while playing.
//! Every mutation goes through a named operation below and ends by persisting
//! the affected document. Persistence failures never abort an operation: the
//! in-memory state moves on and an error notice is raised instead.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, instrument, warn};

use crate::content::{ContentCatalog, Position};
use crate::domain::{Challenge, VulnerabilityInfo};
use crate::notice::Notices;
use crate::progress::{GameMode, UserProgress, UserSettings};
use crate::selector::{
    advance_in_catalog, clamp_position, grouped_by_difficulty, next_incomplete_in_catalog, next_incomplete_in_list,
    restore_order,
};
use crate::session::{EmptySession, ScopedSession, SessionFilter};
use crate::store::{DocumentStore, StoreError};
use crate::util::{error_chain, percentage, trunc_for_log};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
}

// Which list the traversal cursor currently walks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cursor {
    Scoped,
    Random,
    Category,
}

pub struct GameState {
    catalog: ContentCatalog,
    explanations: HashMap<String, VulnerabilityInfo>,
    progress: UserProgress,
    settings: UserSettings,
    randomized: Vec<String>,
    use_randomized_order: bool,
    session: Option<ScopedSession>,
    notices: Notices,
    store: Box<dyn DocumentStore>,
    rng: StdRng,
}

impl GameState {
    pub fn load(
        catalog: ContentCatalog,
        explanations: HashMap<String, VulnerabilityInfo>,
        store: Box<dyn DocumentStore>,
        notices: Notices,
    ) -> Self {
        Self::load_with_rng(catalog, explanations, store, notices, StdRng::from_entropy())
    }

    /// Assemble state from the stores. Unreadable documents fall back to defaults.
    #[instrument(level = "info", skip_all, fields(challenges = catalog.total_count()))]
    pub fn load_with_rng(
        catalog: ContentCatalog,
        explanations: HashMap<String, VulnerabilityInfo>,
        store: Box<dyn DocumentStore>,
        notices: Notices,
        rng: StdRng,
    ) -> Self {
        let progress = load_or_default(store.load_progress(), "progress");
        let settings = load_or_default(store.load_settings(), "settings");
        let use_randomized_order = settings.game_mode == GameMode::RandomByDifficulty;

        let mut state = Self {
            catalog,
            explanations,
            progress,
            settings,
            randomized: Vec::new(),
            use_randomized_order,
            session: None,
            notices,
            store,
            rng,
        };
        state.restore_randomized_order();
        if state.use_randomized_order {
            state.ensure_randomized_order();
        }
        info!(
            target: "progress",
            completed = state.progress.completed_challenges.len(),
            mode = state.settings.game_mode.label(),
            pending = ?state.progress.pending_category_explanation,
            "Game state loaded"
        );
        state
    }

    fn restore_randomized_order(&mut self) {
        let saved = &self.progress.randomized_challenge_ids;
        if saved.is_empty() || self.catalog.is_empty() {
            return;
        }
        let restored = restore_order(&self.catalog, saved, &mut self.rng);
        if restored.len() != saved.len() {
            debug!(target: "progress", saved = saved.len(), kept = restored.len(), "Dropped stale ids from random order");
        }
        self.randomized = restored;
    }

    /// Generate and persist a random order if none is cached.
    pub fn ensure_randomized_order(&mut self) {
        if !self.randomized.is_empty() || self.catalog.is_empty() {
            return;
        }
        self.randomized = grouped_by_difficulty(&self.catalog, &mut self.rng);
        self.progress.randomized_challenge_ids = self.randomized.clone();
        info!(target: "progress", len = self.randomized.len(), "Generated random-by-difficulty order");
        self.persist_progress("failed to save progress");
    }

    // ---- persistence -------------------------------------------------------

    fn persist_progress(&mut self, context: &str) -> bool {
        match self.store.save_progress(&self.progress) {
            Ok(()) => true,
            Err(e) => {
                warn!(target: "progress", error = %error_chain(&e), "{context}");
                self.notices.set_error(format!("{context}: {}", error_chain(&e)));
                false
            }
        }
    }

    fn persist_settings(&mut self, context: &str) -> bool {
        match self.store.save_settings(&self.settings) {
            Ok(()) => true,
            Err(e) => {
                warn!(target: "progress", error = %error_chain(&e), "{context}");
                self.notices.set_error(format!("{context}: {}", error_chain(&e)));
                false
            }
        }
    }

    // ---- read accessors ----------------------------------------------------

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn clear_notices(&mut self) {
        self.notices.clear();
    }

    pub fn challenge(&self, id: &str) -> Option<&Challenge> {
        self.catalog.get(id)
    }

    pub fn explanation(&self, category: &str) -> Option<&VulnerabilityInfo> {
        self.explanations.get(category)
    }

    pub fn is_random_mode(&self) -> bool {
        self.use_randomized_order
    }

    pub fn show_vulnerability_names(&self) -> bool {
        self.settings.show_vulnerability_names
    }

    pub fn randomized_order(&self) -> &[String] {
        &self.randomized
    }

    pub fn is_cli_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn scoped_session(&self) -> Option<&ScopedSession> {
        self.session.as_ref()
    }

    fn cursor(&self) -> Cursor {
        if self.session.is_some() {
            Cursor::Scoped
        } else if self.use_randomized_order && !self.randomized.is_empty() {
            Cursor::Random
        } else {
            Cursor::Category
        }
    }

    fn category_position(&self) -> Position {
        clamp_position(
            &self.catalog,
            Position { category: self.progress.current_category_idx, challenge: self.progress.current_challenge_idx },
        )
    }

    fn random_position(&self) -> usize {
        let idx = self.progress.current_challenge_idx;
        if idx < self.randomized.len() { idx } else { 0 }
    }

    /// The challenge under the traversal cursor. Stale indices read as 0.
    pub fn current_challenge(&self) -> Option<&Challenge> {
        match self.cursor() {
            Cursor::Scoped => {
                let s = self.session.as_ref()?;
                s.ids.get(s.position).and_then(|id| self.catalog.get(id))
            }
            Cursor::Random => self.randomized.get(self.random_position()).and_then(|id| self.catalog.get(id)),
            Cursor::Category => self.catalog.at(self.category_position()),
        }
    }

    // ---- completion queries ------------------------------------------------

    pub fn is_challenge_completed(&self, id: &str) -> bool {
        self.progress.completed_challenges.contains(id)
    }

    /// (completed, total) for the category at `idx`.
    pub fn category_counts(&self, idx: usize) -> (usize, usize) {
        self.catalog.set(idx).map_or((0, 0), |set| {
            let done = set.challenges.iter().filter(|c| self.is_challenge_completed(&c.id)).count();
            (done, set.challenges.len())
        })
    }

    pub fn category_completion_percentage(&self, category: &str) -> usize {
        let (done, total) = self.catalog.category_index(category).map_or((0, 0), |idx| self.category_counts(idx));
        percentage(done, total)
    }

    pub fn total_completion_percentage(&self) -> usize {
        percentage(self.completed_count(), self.total_count())
    }

    /// Completed ids that still exist in the catalog.
    pub fn completed_count(&self) -> usize {
        self.catalog.challenges().filter(|c| self.is_challenge_completed(&c.id)).count()
    }

    pub fn total_count(&self) -> usize {
        self.catalog.total_count()
    }

    pub fn category_error_count(&self, category: &str) -> u32 {
        self.progress.category_error_counts.get(category).copied().unwrap_or(0)
    }

    /// True when `id` is the last challenge of its category in catalog order.
    pub fn is_last_in_category(&self, id: &str) -> bool {
        self.catalog.locate(id).is_some_and(|pos| {
            self.catalog.set(pos.category).is_some_and(|set| pos.challenge + 1 == set.challenges.len())
        })
    }

    // ---- mutations ---------------------------------------------------------

    #[instrument(level = "debug", skip(self))]
    pub fn mark_completed(&mut self, id: &str) {
        if self.progress.completed_challenges.insert(id.to_string()) {
            info!(target: "progress", %id, "Challenge completed");
        }
        self.persist_progress("failed to save challenge completion");
    }

    #[instrument(level = "debug", skip(self))]
    pub fn record_wrong_answer(&mut self, category: &str) {
        let count = self.progress.category_error_counts.entry(category.to_string()).or_insert(0);
        *count += 1;
        debug!(target: "progress", %category, errors = *count, "Wrong answer recorded");
        self.persist_progress("failed to save progress");
    }

    /// Check `option` against challenge `id` and record the outcome.
    /// `None` when the id is unknown.
    pub fn submit_answer(&mut self, id: &str, option: &str) -> Option<AnswerOutcome> {
        let challenge = self.catalog.get(id)?;
        let correct = challenge.is_correct(option);
        let category = challenge.category.clone();
        debug!(target: "progress", %id, option = %trunc_for_log(option, 60), correct, "Answer submitted");
        if correct {
            self.mark_completed(id);
            Some(AnswerOutcome::Correct)
        } else {
            self.record_wrong_answer(&category);
            Some(AnswerOutcome::Incorrect)
        }
    }

    /// Move the cursor one step along the active traversal. `false` at the end.
    #[instrument(level = "debug", skip(self))]
    pub fn advance_position(&mut self) -> bool {
        match self.cursor() {
            Cursor::Scoped => match self.session.as_mut() {
                Some(s) if s.position + 1 < s.ids.len() => {
                    s.position += 1;
                    true
                }
                _ => false,
            },
            Cursor::Random => {
                let next = self.random_position() + 1;
                if next >= self.randomized.len() {
                    return false;
                }
                self.progress.current_challenge_idx = next;
                self.progress.is_random_mode = true;
                self.persist_progress("failed to save progress");
                true
            }
            Cursor::Category => match advance_in_catalog(&self.catalog, self.category_position()) {
                Some(pos) => {
                    self.set_category_position(pos);
                    self.persist_progress("failed to save progress");
                    true
                }
                None => false,
            },
        }
    }

    fn set_category_position(&mut self, pos: Position) {
        self.progress.current_category_idx = pos.category;
        self.progress.current_challenge_idx = pos.challenge;
        self.progress.is_random_mode = false;
    }

    /// First incomplete challenge at or after the cursor, wrapping around.
    pub fn next_incomplete(&self) -> Option<&Challenge> {
        let done = |id: &str| self.is_challenge_completed(id);
        match self.cursor() {
            Cursor::Scoped => {
                let s = self.session.as_ref()?;
                next_incomplete_in_list(&s.ids, s.position, done).and_then(|i| self.catalog.get(&s.ids[i]))
            }
            Cursor::Random => next_incomplete_in_list(&self.randomized, self.random_position(), done)
                .and_then(|i| self.catalog.get(&self.randomized[i])),
            Cursor::Category => next_incomplete_in_catalog(&self.catalog, self.category_position(), done)
                .and_then(|pos| self.catalog.at(pos)),
        }
    }

    /// Point the cursor at `id` in the active traversal. `false` if `id` is not part of it.
    #[instrument(level = "debug", skip(self))]
    pub fn focus_challenge(&mut self, id: &str) -> bool {
        if let Some(s) = self.session.as_mut() {
            return match s.ids.iter().position(|x| x == id) {
                Some(i) => {
                    s.position = i;
                    true
                }
                None => false,
            };
        }
        if self.use_randomized_order {
            self.ensure_randomized_order();
            let Some(i) = self.randomized.iter().position(|x| x == id) else {
                return false;
            };
            self.progress.current_challenge_idx = i;
            self.progress.is_random_mode = true;
        } else {
            let Some(pos) = self.catalog.locate(id) else {
                return false;
            };
            self.set_category_position(pos);
        }
        self.persist_progress("failed to save progress");
        true
    }

    pub fn toggle_vulnerability_names(&mut self) -> bool {
        self.settings.show_vulnerability_names = !self.settings.show_vulnerability_names;
        info!(target: "progress", show = self.settings.show_vulnerability_names, "Vulnerability names toggled");
        self.persist_settings("failed to save vulnerability names setting");
        self.settings.show_vulnerability_names
    }

    /// Flip between category order and random-by-difficulty. The challenge under
    /// the cursor stays current in the new mode.
    #[instrument(level = "info", skip(self))]
    pub fn toggle_game_mode(&mut self) -> GameMode {
        let current = self.current_challenge().map(|c| c.id.clone());
        self.settings.game_mode = self.settings.game_mode.toggled();
        self.use_randomized_order = self.settings.game_mode == GameMode::RandomByDifficulty;
        if self.use_randomized_order {
            self.ensure_randomized_order();
        }
        if self.session.is_none() {
            if let Some(id) = current {
                self.focus_challenge(&id);
            }
        }
        info!(target: "progress", mode = self.settings.game_mode.label(), "Game mode toggled");
        self.persist_settings("failed to save game mode setting");
        self.settings.game_mode
    }

    /// Remove the durable progress document and reset in-memory progress.
    /// Settings are untouched.
    #[instrument(level = "info", skip(self))]
    pub fn erase_progress(&mut self) -> bool {
        if let Err(e) = self.store.erase_progress() {
            warn!(target: "progress", error = %error_chain(&e), "Erasing progress failed");
            self.notices.set_error(format!("failed to remove progress file: {}", error_chain(&e)));
            return false;
        }
        self.progress = UserProgress::default();
        self.randomized.clear();
        if let Some(s) = self.session.as_mut() {
            s.position = 0;
        }
        info!(target: "progress", "Progress erased");
        self.notices.set_success("Progress data cleared successfully");
        true
    }

    // ---- explanation gating ------------------------------------------------

    pub fn should_show_explanation(&self, category: &str) -> bool {
        !self.use_randomized_order && self.session.is_none() && self.category_completion_percentage(category) == 100
    }

    pub fn pending_explanation(&self) -> Option<&str> {
        self.progress.pending_category_explanation.as_deref()
    }

    pub fn set_pending_explanation(&mut self, category: &str) {
        debug!(target: "progress", %category, "Pending explanation set");
        self.progress.pending_category_explanation = Some(category.to_string());
        self.persist_progress("failed to save progress");
    }

    pub fn clear_pending_explanation(&mut self) {
        if self.progress.pending_category_explanation.take().is_some() {
            debug!(target: "progress", "Pending explanation cleared");
        }
        self.persist_progress("failed to save progress");
    }

    // ---- scoped sessions ---------------------------------------------------

    /// Restrict traversal to the challenges matching `filter`. The cursor starts
    /// at the first incomplete match.
    #[instrument(level = "info", skip(self))]
    pub fn begin_scoped_session(&mut self, filter: SessionFilter) -> Result<(), EmptySession> {
        let ids = filter.challenge_ids(&self.catalog, &mut self.rng);
        if ids.is_empty() {
            return Err(EmptySession(filter));
        }
        let position = next_incomplete_in_list(&ids, 0, |id| self.is_challenge_completed(id)).unwrap_or(0);
        info!(target: "progress", len = ids.len(), position, "Scoped session started");
        self.session = Some(ScopedSession { filter, ids, position });
        Ok(())
    }
}

fn load_or_default<T: Default>(loaded: Result<T, StoreError>, what: &str) -> T {
    match loaded {
        Ok(doc) => doc,
        Err(e) if e.is_not_found() => {
            debug!(target: "progress", "No saved {what}; starting with defaults");
            T::default()
        }
        Err(e) => {
            warn!(target: "progress", error = %error_chain(&e), "Could not load {what}; starting with defaults");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::domain::Difficulty;
    use crate::store::MemoryStore;
    use crate::testutil::{catalog, small_catalog};

    fn state_with(catalog: ContentCatalog, store: Rc<MemoryStore>, seed: u64) -> GameState {
        GameState::load_with_rng(catalog, HashMap::new(), Box::new(store), Notices::default(), StdRng::seed_from_u64(seed))
    }

    #[test]
    fn completion_percentages_use_integer_division() {
        let store = Rc::new(MemoryStore::new());
        let mut state = state_with(small_catalog(), store, 1);
        state.mark_completed("a1");
        state.mark_completed("a2");
        assert_eq!(state.category_completion_percentage("A"), 100);
        assert_eq!(state.category_completion_percentage("B"), 0);
        assert_eq!(state.total_completion_percentage(), 66);
        assert_eq!(state.category_completion_percentage("missing"), 0);
    }

    #[test]
    fn marking_twice_keeps_one_entry_but_saves_twice() {
        let store = Rc::new(MemoryStore::new());
        let mut state = state_with(small_catalog(), store.clone(), 1);
        let before = store.writes();
        state.mark_completed("a1");
        state.mark_completed("a1");
        assert_eq!(store.writes(), before + 2);
        assert_eq!(store.progress().unwrap().completed_challenges.len(), 1);
    }

    #[test]
    fn wrong_answers_accumulate_per_category() {
        let store = Rc::new(MemoryStore::new());
        let mut state = state_with(small_catalog(), store.clone(), 1);
        assert_eq!(state.submit_answer("a1", "wrong"), Some(AnswerOutcome::Incorrect));
        assert_eq!(state.submit_answer("a2", "also wrong"), Some(AnswerOutcome::Incorrect));
        assert_eq!(state.submit_answer("a2", "right"), Some(AnswerOutcome::Correct));
        assert_eq!(state.submit_answer("nope", "right"), None);
        assert_eq!(state.category_error_count("A"), 2);
        assert!(state.is_challenge_completed("a2"));
        assert_eq!(store.progress().unwrap().category_error_counts["A"], 2);
    }

    #[test]
    fn erase_resets_progress_and_keeps_settings() {
        let store = Rc::new(MemoryStore::new());
        let mut state = state_with(small_catalog(), store.clone(), 1);
        state.toggle_vulnerability_names();
        state.mark_completed("a1");
        state.mark_completed("b1");

        assert!(state.erase_progress());
        assert!(!state.is_challenge_completed("a1"));
        assert_eq!(state.total_completion_percentage(), 0);
        assert!(state.show_vulnerability_names());
        assert!(store.progress().is_none());
        assert_eq!(state.notices().last_success().unwrap().message, "Progress data cleared successfully");
    }

    #[test]
    fn erase_failure_keeps_progress_and_raises_error() {
        let store = Rc::new(MemoryStore::new());
        let mut state = state_with(small_catalog(), store.clone(), 1);
        state.mark_completed("a1");
        store.set_fail_writes(true);
        assert!(!state.erase_progress());
        assert!(state.is_challenge_completed("a1"));
        assert!(state.notices().last_error().unwrap().message.starts_with("failed to remove progress file"));
    }

    #[test]
    fn save_failures_become_error_notices() {
        let store = Rc::new(MemoryStore::new());
        let mut state = state_with(small_catalog(), store.clone(), 1);
        store.set_fail_writes(true);
        state.mark_completed("a1");
        assert!(state.is_challenge_completed("a1"));
        let err = state.notices().last_error().unwrap();
        assert!(err.message.starts_with("failed to save challenge completion:"), "{}", err.message);
        assert!(err.message.ends_with("writes disabled"), "{}", err.message);

        state.toggle_game_mode();
        assert!(state.notices().last_error().unwrap().message.starts_with("failed to save game mode setting:"));
    }

    #[test]
    fn category_advance_rolls_over_and_stops_at_the_end() {
        let store = Rc::new(MemoryStore::new());
        let mut state = state_with(small_catalog(), store.clone(), 1);
        assert_eq!(state.current_challenge().unwrap().id, "a1");
        assert!(state.advance_position());
        assert_eq!(state.current_challenge().unwrap().id, "a2");
        assert!(state.advance_position());
        assert_eq!(state.current_challenge().unwrap().id, "b1");
        assert!(!state.advance_position());

        let saved = store.progress().unwrap();
        assert_eq!((saved.current_category_idx, saved.current_challenge_idx), (1, 0));
        assert!(!saved.is_random_mode);
    }

    #[test]
    fn stale_indices_read_as_zero() {
        let progress = UserProgress { current_category_idx: 5, current_challenge_idx: 9, ..UserProgress::default() };
        let store = Rc::new(MemoryStore::with_documents(Some(progress), None));
        let state = state_with(small_catalog(), store, 1);
        assert_eq!(state.current_challenge().unwrap().id, "a1");
    }

    #[test]
    fn toggling_into_random_mode_persists_a_non_empty_order() {
        let store = Rc::new(MemoryStore::new());
        let mut state = state_with(small_catalog(), store.clone(), 3);
        assert!(state.randomized_order().is_empty());

        assert_eq!(state.toggle_game_mode(), GameMode::RandomByDifficulty);
        assert!(state.is_random_mode());
        assert_eq!(state.randomized_order().len(), 3);
        assert_eq!(store.progress().unwrap().randomized_challenge_ids, state.randomized_order());
        assert_eq!(store.settings().unwrap().game_mode, GameMode::RandomByDifficulty);
        // b1 is the only advanced challenge, so it comes last.
        assert_eq!(state.randomized_order()[2], "b1");
    }

    #[test]
    fn toggling_mode_keeps_the_current_challenge() {
        let store = Rc::new(MemoryStore::new());
        let mut state = state_with(small_catalog(), store, 3);
        state.focus_challenge("a2");
        state.toggle_game_mode();
        assert_eq!(state.current_challenge().unwrap().id, "a2");
        state.toggle_game_mode();
        assert_eq!(state.current_challenge().unwrap().id, "a2");
    }

    #[test]
    fn persisted_random_order_is_restored_on_reload() {
        let store = Rc::new(MemoryStore::new());
        let mut state = state_with(small_catalog(), store.clone(), 11);
        state.toggle_game_mode();
        let order = state.randomized_order().to_vec();
        assert!(state.advance_position());
        let current = state.current_challenge().unwrap().id.clone();
        drop(state);

        let reloaded = state_with(small_catalog(), store, 99);
        assert!(reloaded.is_random_mode());
        assert_eq!(reloaded.randomized_order(), order.as_slice());
        assert_eq!(reloaded.current_challenge().unwrap().id, current);
    }

    #[test]
    fn random_advance_walks_the_list() {
        let settings = UserSettings { game_mode: GameMode::RandomByDifficulty, ..UserSettings::default() };
        let store = Rc::new(MemoryStore::with_documents(None, Some(settings)));
        let mut state = state_with(small_catalog(), store.clone(), 5);
        let order = state.randomized_order().to_vec();
        assert_eq!(order.len(), 3);
        for id in &order[1..] {
            assert!(state.advance_position());
            assert_eq!(&state.current_challenge().unwrap().id, id);
        }
        assert!(!state.advance_position());
        assert!(store.progress().unwrap().is_random_mode);
    }

    #[test]
    fn next_incomplete_wraps_from_the_cursor() {
        let store = Rc::new(MemoryStore::new());
        let mut state = state_with(small_catalog(), store, 1);
        state.mark_completed("a1");
        state.focus_challenge("b1");
        state.mark_completed("b1");
        assert_eq!(state.next_incomplete().unwrap().id, "a2");
        state.mark_completed("a2");
        assert!(state.next_incomplete().is_none());
    }

    #[test]
    fn explanation_gating() {
        let store = Rc::new(MemoryStore::new());
        let mut state = state_with(small_catalog(), store.clone(), 1);
        state.mark_completed("a1");
        assert!(!state.should_show_explanation("A"));
        state.mark_completed("a2");
        assert!(state.should_show_explanation("A"));
        assert!(state.is_last_in_category("a2"));
        assert!(!state.is_last_in_category("a1"));

        state.toggle_game_mode();
        assert!(!state.should_show_explanation("A"));
        state.toggle_game_mode();

        state.set_pending_explanation("A");
        assert_eq!(store.progress().unwrap().pending_category_explanation.as_deref(), Some("A"));
        state.clear_pending_explanation();
        assert_eq!(state.pending_explanation(), None);
        assert_eq!(store.progress().unwrap().pending_category_explanation, None);
    }

    #[test]
    fn scoped_session_has_its_own_cursor() {
        use Difficulty::{Advanced, Beginner, Intermediate};
        let catalog = catalog(&[
            ("Injection", &[("i1", Beginner), ("i2", Advanced), ("i3", Beginner)]),
            ("XSS", &[("x1", Intermediate), ("x2", Beginner)]),
        ]);
        let store = Rc::new(MemoryStore::new());
        let mut state = state_with(catalog, store.clone(), 2);
        state.mark_completed("i1");

        let injection = state.catalog().category_index("Injection");
        let filter = SessionFilter { category: injection, difficulty: Some(Beginner) };
        state.begin_scoped_session(filter).unwrap();
        assert!(state.is_cli_session());
        assert_eq!(state.scoped_session().unwrap().ids, vec!["i1".to_string(), "i3".to_string()]);
        assert_eq!(state.current_challenge().unwrap().id, "i3");
        assert!(!state.advance_position());

        state.mark_completed("i3");
        assert!(!state.should_show_explanation("Injection"));
        assert_eq!(store.progress().unwrap().current_category_idx, 0);

        let empty = SessionFilter { category: injection, difficulty: Some(Intermediate) };
        assert_eq!(state.begin_scoped_session(empty), Err(EmptySession(empty)));
    }
}
