//! View state machine.
//!
//! The navigator owns the active `Screen` plus a history of the screens under
//! it. Forward moves into menus push, moving from one challenge to the next
//! replaces the top, and `Back` pops. All game mutations go through
//! `GameState`; this module only decides which one to call and what to show
//! next.

use std::mem;

use tracing::{debug, instrument};

use crate::state::{AnswerOutcome, GameState};

pub const MAIN_MENU_ITEMS: [(&str, &str); 5] = [
    ("Start Game", "Begin playing from where you left off"),
    ("Categories", "Browse security challenge categories"),
    ("Progress", "View your progress statistics"),
    ("Settings", "Configure game preferences"),
    ("Exit", "Save and exit the game"),
];

pub const SETTINGS_ITEM_COUNT: usize = 4;

/// Input after key mapping. Scrolling and the help overlay never reach the
/// navigator; they are view-local.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Up,
    Down,
    Select,
    Back,
    Next,
    ToggleHint,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Same screen (its cursor may have moved).
    None,
    /// A different screen is now active.
    Changed,
    Quit,
}

/// How an explanation screen was reached, which decides where "continue" goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExplanationOrigin {
    /// Opened from a category's challenge list.
    Browsing,
    /// The category was just finished; continuing resumes the run.
    JustCompleted,
    /// Owed from an earlier session; shown before anything else on Start.
    Pending,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerView {
    pub challenge_id: String,
    pub cursor: usize,
    pub outcome: Option<AnswerOutcome>,
    pub show_hint: bool,
}

impl AnswerView {
    pub fn new(challenge_id: impl Into<String>) -> Self {
        Self { challenge_id: challenge_id.into(), cursor: 0, outcome: None, show_hint: false }
    }

    pub fn is_solved(&self) -> bool {
        self.outcome == Some(AnswerOutcome::Correct)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    MainMenu { cursor: usize },
    CategoryList { cursor: usize },
    ChallengeList { category: usize, cursor: usize },
    ChallengeAnswer(AnswerView),
    Explanation { category: String, origin: ExplanationOrigin },
    Progress { cursor: usize },
    Settings { cursor: usize },
    Completion,
    CliCompletion,
}

impl Screen {
    fn answer(id: impl Into<String>) -> Self {
        Screen::ChallengeAnswer(AnswerView::new(id))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Screen::MainMenu { .. } => "main_menu",
            Screen::CategoryList { .. } => "category_list",
            Screen::ChallengeList { .. } => "challenge_list",
            Screen::ChallengeAnswer(_) => "challenge_answer",
            Screen::Explanation { .. } => "explanation",
            Screen::Progress { .. } => "progress",
            Screen::Settings { .. } => "settings",
            Screen::Completion => "completion",
            Screen::CliCompletion => "cli_completion",
        }
    }
}

// What a screen handler asks the navigator to do.
#[derive(Debug)]
enum Step {
    Stay,
    Push(Screen),
    Replace(Screen),
    Pop,
    Reset,
    Quit,
}

#[derive(Debug)]
pub struct Navigator {
    current: Screen,
    history: Vec<Screen>,
}

impl Navigator {
    /// Start at the main menu, or directly on the current challenge of a scoped session.
    pub fn new(state: &GameState) -> Self {
        let current = if state.is_cli_session() {
            match state.current_challenge() {
                Some(c) => Screen::answer(c.id.clone()),
                None => Screen::CliCompletion,
            }
        } else {
            Screen::MainMenu { cursor: 0 }
        };
        Self { current, history: Vec::new() }
    }

    pub fn current(&self) -> &Screen {
        &self.current
    }

    /// Number of screens under the current one.
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    #[instrument(level = "debug", skip(self, state), fields(screen = self.current.name()))]
    pub fn handle(&mut self, state: &mut GameState, event: Event) -> Effect {
        if event == Event::Quit {
            return Effect::Quit;
        }
        let step = match &mut self.current {
            Screen::MainMenu { cursor } => main_menu(state, cursor, event),
            Screen::CategoryList { cursor } => {
                let count = state.catalog().category_count();
                category_menu(state, cursor, count, event)
            }
            Screen::Progress { cursor } => {
                let count = state.catalog().category_count();
                category_menu(state, cursor, count, event)
            }
            Screen::ChallengeList { category, cursor } => challenge_list(state, *category, cursor, event),
            Screen::ChallengeAnswer(view) => challenge_answer(state, view, event),
            Screen::Explanation { origin, .. } => explanation(state, *origin, event),
            Screen::Settings { cursor } => settings(state, cursor, event),
            Screen::Completion => match event {
                Event::Select | Event::Next | Event::Back => Step::Reset,
                _ => Step::Stay,
            },
            Screen::CliCompletion => Step::Stay,
        };
        self.apply(state, step)
    }

    fn apply(&mut self, state: &mut GameState, step: Step) -> Effect {
        let from = self.current.name();
        match step {
            Step::Stay => return Effect::None,
            Step::Quit => return Effect::Quit,
            Step::Push(next) => {
                let prev = mem::replace(&mut self.current, next);
                self.history.push(prev);
            }
            Step::Replace(next) => self.current = next,
            Step::Pop => {
                let Some(prev) = self.history.pop() else {
                    return Effect::None;
                };
                state.clear_notices();
                self.current = prev;
            }
            Step::Reset => {
                state.clear_notices();
                self.history.clear();
                self.current = Screen::MainMenu { cursor: 0 };
            }
        }
        debug!(target: "blindspot", from, to = self.current.name(), depth = self.history.len(), "Screen changed");
        Effect::Changed
    }
}

fn move_cursor(cursor: &mut usize, count: usize, event: Event) {
    match event {
        Event::Up if *cursor > 0 => *cursor -= 1,
        Event::Down if *cursor + 1 < count => *cursor += 1,
        _ => {}
    }
}

fn main_menu(state: &mut GameState, cursor: &mut usize, event: Event) -> Step {
    match event {
        Event::Up | Event::Down => {
            move_cursor(cursor, MAIN_MENU_ITEMS.len(), event);
            Step::Stay
        }
        Event::Select => {
            state.clear_notices();
            match *cursor {
                0 => start_game(state),
                1 => Step::Push(Screen::CategoryList { cursor: 0 }),
                2 => Step::Push(Screen::Progress { cursor: 0 }),
                3 => Step::Push(Screen::Settings { cursor: 0 }),
                _ => Step::Quit,
            }
        }
        _ => Step::Stay,
    }
}

fn start_game(state: &mut GameState) -> Step {
    if state.is_random_mode() {
        state.ensure_randomized_order();
    }
    if let Some(category) = state.pending_explanation() {
        return Step::Push(Screen::Explanation { category: category.to_string(), origin: ExplanationOrigin::Pending });
    }
    match state.next_incomplete().map(|c| c.id.clone()) {
        Some(id) => {
            state.focus_challenge(&id);
            Step::Push(Screen::answer(id))
        }
        None => Step::Push(Screen::Completion),
    }
}

// Category list and progress overview: one item per category, both open its challenge list.
fn category_menu(state: &mut GameState, cursor: &mut usize, count: usize, event: Event) -> Step {
    match event {
        Event::Up | Event::Down => {
            move_cursor(cursor, count, event);
            Step::Stay
        }
        Event::Select if *cursor < count => {
            state.clear_notices();
            Step::Push(Screen::ChallengeList { category: *cursor, cursor: 0 })
        }
        Event::Back => Step::Pop,
        _ => Step::Stay,
    }
}

// Item 0 is the category explanation, then one item per challenge.
fn challenge_list(state: &mut GameState, category: usize, cursor: &mut usize, event: Event) -> Step {
    let Some(set) = state.catalog().set(category) else {
        return if event == Event::Back { Step::Pop } else { Step::Stay };
    };
    let count = set.challenges.len() + 1;
    match event {
        Event::Up | Event::Down => {
            move_cursor(cursor, count, event);
            Step::Stay
        }
        Event::Select if *cursor == 0 => {
            let category = set.category.clone();
            state.clear_notices();
            Step::Push(Screen::Explanation { category, origin: ExplanationOrigin::Browsing })
        }
        Event::Select => match set.challenges.get(*cursor - 1).map(|c| c.id.clone()) {
            Some(id) => {
                state.clear_notices();
                state.focus_challenge(&id);
                Step::Push(Screen::answer(id))
            }
            None => Step::Stay,
        },
        Event::Back => Step::Pop,
        _ => Step::Stay,
    }
}

fn challenge_answer(state: &mut GameState, view: &mut AnswerView, event: Event) -> Step {
    let option_count = state.challenge(&view.challenge_id).map_or(0, |c| c.options.len());
    match event {
        Event::Up | Event::Down if !view.is_solved() => {
            let before = view.cursor;
            move_cursor(&mut view.cursor, option_count, event);
            if view.cursor != before && view.outcome == Some(AnswerOutcome::Incorrect) {
                view.outcome = None;
            }
            Step::Stay
        }
        Event::ToggleHint => {
            view.show_hint = !view.show_hint;
            Step::Stay
        }
        Event::Select | Event::Next if view.is_solved() => after_correct(state, &view.challenge_id),
        Event::Select => {
            let option = state.challenge(&view.challenge_id).and_then(|c| c.options.get(view.cursor)).cloned();
            if let Some(option) = option {
                view.outcome = state.submit_answer(&view.challenge_id, &option);
                if view.is_solved() {
                    owe_explanation_if_finished(state, &view.challenge_id);
                }
            }
            Step::Stay
        }
        Event::Back if !state.is_cli_session() => Step::Pop,
        _ => Step::Stay,
    }
}

// The owed explanation is recorded at submit time, before the user continues.
fn owe_explanation_if_finished(state: &mut GameState, id: &str) {
    let Some(category) = state.challenge(id).map(|c| c.category.clone()) else {
        return;
    };
    if state.is_last_in_category(id) && state.should_show_explanation(&category) {
        state.set_pending_explanation(&category);
    }
}

/// Where to go once `id` has been answered correctly and the user continues.
fn after_correct(state: &mut GameState, id: &str) -> Step {
    let category = state.challenge(id).map(|c| c.category.clone()).unwrap_or_default();
    let owed = state.pending_explanation() == Some(category.as_str());
    if owed && !state.is_cli_session() && state.is_last_in_category(id) {
        return Step::Replace(Screen::Explanation { category, origin: ExplanationOrigin::JustCompleted });
    }
    if state.is_cli_session() {
        if state.advance_position() {
            if let Some(c) = state.current_challenge() {
                return Step::Replace(Screen::answer(c.id.clone()));
            }
        }
        return match state.next_incomplete().map(|c| c.id.clone()) {
            Some(next) => {
                state.focus_challenge(&next);
                Step::Replace(Screen::answer(next))
            }
            None => Step::Replace(Screen::CliCompletion),
        };
    }
    advance_run(state)
}

// Step to the next challenge in traversal order; past the end, fall back to
// any incomplete challenge, then to the completion screen.
fn advance_run(state: &mut GameState) -> Step {
    if state.advance_position() {
        if let Some(c) = state.current_challenge() {
            return Step::Replace(Screen::answer(c.id.clone()));
        }
    }
    resume_run(state)
}

fn resume_run(state: &mut GameState) -> Step {
    match state.next_incomplete().map(|c| c.id.clone()) {
        Some(id) => {
            state.focus_challenge(&id);
            Step::Replace(Screen::answer(id))
        }
        None => Step::Replace(Screen::Completion),
    }
}

fn explanation(state: &mut GameState, origin: ExplanationOrigin, event: Event) -> Step {
    use ExplanationOrigin::{Browsing, JustCompleted, Pending};
    match (origin, event) {
        (JustCompleted, Event::Select | Event::Next) => {
            state.clear_pending_explanation();
            advance_run(state)
        }
        (Pending, Event::Select | Event::Next) => {
            state.clear_pending_explanation();
            resume_run(state)
        }
        (JustCompleted | Pending, Event::Back) => {
            state.clear_pending_explanation();
            Step::Pop
        }
        (Browsing, Event::Select | Event::Next | Event::Back) => Step::Pop,
        _ => Step::Stay,
    }
}

fn settings(state: &mut GameState, cursor: &mut usize, event: Event) -> Step {
    match event {
        Event::Up | Event::Down => {
            move_cursor(cursor, SETTINGS_ITEM_COUNT, event);
            Step::Stay
        }
        Event::Select => {
            match *cursor {
                0 => {
                    state.toggle_vulnerability_names();
                }
                1 => {
                    state.toggle_game_mode();
                }
                2 => {
                    state.erase_progress();
                }
                _ => return Step::Pop,
            }
            Step::Stay
        }
        Event::Back => Step::Pop,
        _ => Step::Stay,
    }
}
