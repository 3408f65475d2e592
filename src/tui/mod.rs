//! Terminal front end: raw-mode setup, the event loop and rendering.
//!
//! One input event is read and fully handled (including any persistence
//! write) before the next one. The poll timeout only exists so notices
//! disappear on time without a keypress.

mod keys;
mod render;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event as TermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, info};

use crate::navigator::{Effect, Navigator};
use crate::state::GameState;
use keys::{map_key, Action};

const TICK: Duration = Duration::from_millis(250);

/// View-local state that the navigator does not care about.
#[derive(Debug, Default)]
pub struct ViewState {
    pub scroll: u16,
    pub show_help: bool,
}

pub fn run(state: &mut GameState, nav: &mut Navigator) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode; is this a real terminal?")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e).context("failed to enter the alternate screen");
    }
    let mut terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(t) => t,
        Err(e) => {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            return Err(e).context("failed to initialize terminal");
        }
    };

    let result = event_loop(&mut terminal, state, nav);
    let cleanup = restore_terminal(&mut terminal);
    result.and(cleanup)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut GameState,
    nav: &mut Navigator,
) -> Result<()> {
    let mut view = ViewState::default();
    loop {
        terminal.draw(|f| render::draw(f, state, nav, &view))?;

        if !event::poll(TICK)? {
            continue;
        }
        // Resize needs no handling: the next draw picks up the new size.
        let TermEvent::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let Some(action) = map_key(key) else {
            continue;
        };
        match action {
            Action::ScrollUp => view.scroll = view.scroll.saturating_sub(1),
            Action::ScrollDown => view.scroll = view.scroll.saturating_add(1),
            Action::ToggleHelp => view.show_help = !view.show_help,
            Action::Nav(ev) => match nav.handle(state, ev) {
                Effect::Quit => {
                    info!(target: "blindspot", screen = nav.current().name(), "Quit requested");
                    return Ok(());
                }
                Effect::Changed => {
                    debug!(target: "blindspot", screen = nav.current().name(), "Redrawing new screen");
                    view.scroll = 0;
                }
                Effect::None => {}
            },
        }
    }
}
