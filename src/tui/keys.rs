//! Key bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::navigator::{Event, Screen};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Nav(Event),
    ScrollUp,
    ScrollDown,
    ToggleHelp,
}

pub fn map_key(key: KeyEvent) -> Option<Action> {
    let action = match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Nav(Event::Quit),
        (KeyCode::Char('q'), _) => Action::Nav(Event::Quit),
        (KeyCode::Up, _) => Action::Nav(Event::Up),
        (KeyCode::Down, _) => Action::Nav(Event::Down),
        (KeyCode::Enter, _) | (KeyCode::Char(' '), _) => Action::Nav(Event::Select),
        (KeyCode::Esc, _) | (KeyCode::Backspace, _) => Action::Nav(Event::Back),
        (KeyCode::Char('n'), _) => Action::Nav(Event::Next),
        (KeyCode::Char('h'), _) => Action::Nav(Event::ToggleHint),
        (KeyCode::Char('k'), _) => Action::ScrollUp,
        (KeyCode::Char('j'), _) => Action::ScrollDown,
        (KeyCode::Char('?'), _) => Action::ToggleHelp,
        _ => return None,
    };
    Some(action)
}

/// Full help for the `?` overlay: (keys, description) pairs.
pub fn help_entries(screen: &Screen, cli_session: bool) -> Vec<(&'static str, &'static str)> {
    let mut entries = match screen {
        Screen::ChallengeAnswer(_) => vec![
            ("↑/↓", "select option"),
            ("enter", "submit answer"),
            ("h", "toggle hint"),
            ("n", "next challenge"),
            ("j/k", "scroll"),
        ],
        Screen::Explanation { .. } => vec![("enter/n", "continue"), ("j/k", "scroll")],
        Screen::Completion => vec![("enter/n", "back to main menu")],
        Screen::CliCompletion => vec![],
        _ => vec![("↑/↓", "move"), ("enter", "select"), ("j/k", "scroll")],
    };
    if !cli_session && !matches!(screen, Screen::MainMenu { .. } | Screen::CliCompletion) {
        entries.push(("esc", "back"));
    }
    entries.push(("?", "toggle help"));
    entries.push(("ctrl+c/q", "quit"));
    entries
}

/// One-line hint shown when the help overlay is closed.
pub fn short_hint(screen: &Screen, cli_session: bool) -> String {
    match screen {
        Screen::ChallengeAnswer(view) if view.is_solved() => "Press 'Enter'/'N' to continue to next challenge".into(),
        Screen::ChallengeAnswer(_) if cli_session => "Press ? for help | ↑/↓ to select option".into(),
        Screen::ChallengeAnswer(_) => "Press ? for help | ↑/↓ to select option | ESC to go back".into(),
        Screen::Explanation { .. } => "Press 'Enter'/'N' to continue | ESC to go back | j/k to scroll".into(),
        Screen::Completion => "Press 'Enter'/'N' or 'Esc' to return to main menu".into(),
        Screen::CliCompletion => "Press 'Ctrl+C' or 'Q' to quit".into(),
        _ => "Press ? for help | ↑/↓ to navigate".into(),
    }
}
