//! Screen rendering. Read-only over `GameState` and `Navigator`.

use std::time::Instant;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::keys::{help_entries, short_hint};
use super::ViewState;
use crate::domain::Difficulty;
use crate::navigator::{AnswerView, ExplanationOrigin, Navigator, Screen, MAIN_MENU_ITEMS};
use crate::report;
use crate::state::{AnswerOutcome, GameState};

const CYAN: Color = Color::Cyan;
const GREEN: Color = Color::LightGreen;
const YELLOW: Color = Color::Yellow;
const RED: Color = Color::LightRed;
const MAGENTA: Color = Color::Magenta;
const GRAY: Color = Color::Gray;
const DARK_GRAY: Color = Color::DarkGray;

const BANNER: [&str; 5] = [
    "╭───────────────────────────────────────────────╮",
    "│       █▄▄ █   █ █▄ █ █▀▄ █▀ █▀█ █▀█ ▀█▀       │",
    "│       █▄█ █▄▄ █ █ ▀█ █▄▀ ▄█ █▀▀ █▄█  █        │",
    "╰───────────────────────────────────────────────╯",
    "     ✧ find insecure code practices ✧",
];

// Body text plus the line that should stay visible (menu cursor, selected option).
struct Body {
    lines: Vec<Line<'static>>,
    focus: Option<usize>,
}

impl Body {
    fn new() -> Self {
        Self { lines: Vec::new(), focus: None }
    }

    fn push(&mut self, text: impl Into<String>, style: Style) {
        self.lines.push(Line::from(Span::styled(text.into(), style)));
    }

    fn blank(&mut self) {
        self.lines.push(Line::from(""));
    }

    fn paragraph(&mut self, text: &str, style: Style) {
        for line in text.lines() {
            self.push(line.to_string(), style);
        }
    }

    fn mark_focus(&mut self) {
        self.focus = Some(self.lines.len());
    }
}

fn title() -> Style {
    Style::default().fg(MAGENTA).add_modifier(Modifier::BOLD)
}

fn text() -> Style {
    Style::default().fg(GRAY)
}

fn subtle() -> Style {
    Style::default().fg(DARK_GRAY)
}

fn selected() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
}

fn difficulty_color(d: Difficulty) -> Color {
    match d {
        Difficulty::Beginner => GREEN,
        Difficulty::Intermediate => YELLOW,
        Difficulty::Advanced => RED,
    }
}

pub fn draw(frame: &mut Frame, state: &GameState, nav: &Navigator, view: &ViewState) {
    let screen = nav.current();
    let cli = state.is_cli_session();
    let now = Instant::now();

    let error = state.notices().active_error(now);
    let success = state.notices().active_success(now);
    let notice_height = error.is_some() as u16 + success.is_some() as u16;
    let help = if view.show_help { help_entries(screen, cli).len() as u16 + 2 } else { 1 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(notice_height), Constraint::Length(help)])
        .split(frame.size());

    let body = match screen {
        Screen::MainMenu { cursor } => main_menu(*cursor),
        Screen::CategoryList { cursor } => category_list(state, *cursor),
        Screen::ChallengeList { category, cursor } => challenge_list(state, *category, *cursor),
        Screen::ChallengeAnswer(answer) => challenge_answer(state, answer),
        Screen::Explanation { category, origin } => explanation(state, category, *origin),
        Screen::Progress { cursor } => progress(state, *cursor),
        Screen::Settings { cursor } => settings(state, *cursor),
        Screen::Completion => completion(state),
        Screen::CliCompletion => cli_completion(state),
    };
    render_body(frame, chunks[0], body, view.scroll);

    let mut notices = Vec::new();
    if let Some(msg) = error {
        notices.push(Line::from(Span::styled(format!("✗ {msg}"), Style::default().fg(RED))));
    }
    if let Some(msg) = success {
        notices.push(Line::from(Span::styled(format!("✓ {msg}"), Style::default().fg(GREEN))));
    }
    frame.render_widget(Paragraph::new(notices), chunks[1]);

    render_help(frame, chunks[2], screen, cli, view.show_help);
}

fn render_body(frame: &mut Frame, area: Rect, body: Body, scroll: u16) {
    let height = area.height as usize;
    let auto = match body.focus {
        Some(line) if line + 2 > height => line + 2 - height,
        _ => 0,
    };
    let max = body.lines.len().saturating_sub(1);
    let offset = (scroll as usize).max(auto).min(max);
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    let para = Paragraph::new(body.lines).wrap(Wrap { trim: false }).scroll((offset, 0));
    frame.render_widget(para, area);
}

fn render_help(frame: &mut Frame, area: Rect, screen: &Screen, cli: bool, full: bool) {
    if !full {
        let hint = Line::from(Span::styled(short_hint(screen, cli), subtle()));
        frame.render_widget(Paragraph::new(hint), area);
        return;
    }
    let lines: Vec<Line> = help_entries(screen, cli)
        .into_iter()
        .map(|(keys, desc)| {
            Line::from(vec![
                Span::styled(format!(" {keys:<10}"), Style::default().fg(YELLOW)),
                Span::styled(desc, text()),
            ])
        })
        .collect();
    let block = Block::default()
        .title(Span::styled(" Help ", Style::default().fg(YELLOW)))
        .borders(Borders::ALL)
        .border_style(subtle());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// Shared menu row: cursor marker, completion tick, title, and details under the selected row.
fn menu_item(body: &mut Body, is_selected: bool, done: bool, label: &str, details: &[String]) {
    let line = format!("{} {} {label}", if is_selected { ">" } else { " " }, if done { "✓" } else { " " });
    if is_selected {
        body.mark_focus();
        body.push(line, selected());
        for d in details {
            body.push(format!("    {d}"), text());
        }
        body.blank();
    } else {
        body.push(line, text());
    }
}

fn main_menu(cursor: usize) -> Body {
    let mut body = Body::new();
    for line in BANNER {
        body.push(line, Style::default().fg(CYAN));
    }
    body.blank();
    body.paragraph(
        "Train your eye to find and fix insecure coding practices through challenges!\n\
         Identify common security vulnerabilities based on the OWASP Top 10.",
        text(),
    );
    body.blank();
    for (i, (label, desc)) in MAIN_MENU_ITEMS.iter().enumerate() {
        menu_item(&mut body, i == cursor, false, label, &[desc.to_string()]);
    }
    body
}

fn tier_tags(state: &GameState, idx: usize) -> String {
    report::category_report(state, idx)
        .map(|r| r.tiers.iter().map(|t| format!("[{}]", &t.difficulty.label()[..1])).collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

fn category_list(state: &GameState, cursor: usize) -> Body {
    let mut body = Body::new();
    body.push("Challenge Categories", title());
    body.blank();
    body.push("Select any category to view its challenges.", text());
    body.blank();
    for (i, set) in state.catalog().sets().iter().enumerate() {
        let pct = state.category_completion_percentage(&set.category);
        let details = vec![set.description.clone(), format!("{} [{pct}% Complete]", tier_tags(state, i))];
        menu_item(&mut body, i == cursor, pct == 100, &set.category, &details);
    }
    body
}

fn challenge_list(state: &GameState, category: usize, cursor: usize) -> Body {
    let mut body = Body::new();
    let Some(set) = state.catalog().set(category) else {
        return body;
    };
    body.push(format!("{} Challenges", set.category), title());
    body.blank();
    body.paragraph(&set.description, text());
    body.blank();
    menu_item(
        &mut body,
        cursor == 0,
        false,
        &format!("📚 See Explanation: {}", set.category),
        &["View detailed explanation about this vulnerability type, its impact, and prevention techniques.".into()],
    );
    for (i, ch) in set.challenges.iter().enumerate() {
        let done = state.is_challenge_completed(&ch.id);
        let status = if done { "[✓ Completed]" } else { "[Not Completed]" };
        let details = vec![format!("[{}] {status}", ch.difficulty), ch.description.clone()];
        menu_item(&mut body, cursor == i + 1, done, &ch.title, &details);
    }
    body
}

fn challenge_answer(state: &GameState, view: &AnswerView) -> Body {
    let mut body = Body::new();
    let Some(ch) = state.challenge(&view.challenge_id) else {
        body.push(format!("Unknown challenge: {}", view.challenge_id), Style::default().fg(RED));
        return body;
    };

    body.push(format!("> [{}]", ch.difficulty), Style::default().fg(difficulty_color(ch.difficulty)));
    body.blank();
    if state.show_vulnerability_names() || view.is_solved() {
        body.push(ch.title.clone(), title());
        body.push(format!(" CATEGORY: {}", ch.category), Style::default().fg(YELLOW));
        body.blank();
    }
    if !ch.description.is_empty() {
        body.paragraph(&ch.description, text());
        body.blank();
    }

    let rule = "─".repeat(60);
    body.push(rule.clone(), subtle());
    if !ch.lang.is_empty() {
        body.push(format!(" {}", ch.lang), subtle());
    }
    for line in ch.code.lines() {
        body.push(format!("  {line}"), Style::default().fg(Color::White));
    }
    body.push(rule, subtle());
    body.blank();

    body.push("What vulnerability is in this code?", Style::default().fg(CYAN));
    body.blank();
    for (i, option) in ch.options.iter().enumerate() {
        let (marker, style) = match view.outcome {
            Some(AnswerOutcome::Correct) if ch.is_correct(option) => ("✓ ", Style::default().fg(GREEN)),
            Some(AnswerOutcome::Correct) => ("  ", text()),
            Some(AnswerOutcome::Incorrect) if i == view.cursor => ("✗ ", Style::default().fg(RED)),
            None if i == view.cursor => ("> ", selected()),
            _ => ("  ", text()),
        };
        if i == view.cursor {
            body.mark_focus();
        }
        body.push(format!("{marker}{option}"), style);
    }

    if view.show_hint {
        body.blank();
        let hint = ch.hint.as_deref().unwrap_or("No hint available for this challenge.");
        body.push(format!("Hint: {hint}"), Style::default().fg(YELLOW).add_modifier(Modifier::ITALIC));
    }

    match view.outcome {
        Some(AnswerOutcome::Correct) => {
            body.blank();
            body.mark_focus();
            body.push("✓ Correct! You've identified the vulnerability.", Style::default().fg(GREEN));
            if let Some(explanation) = ch.explanation.as_deref().filter(|e| !e.is_empty()) {
                body.blank();
                body.push("💡 Why this is correct:", Style::default().fg(CYAN));
                body.paragraph(explanation, text());
            }
            if let Some(solution) = ch.solution.as_deref().filter(|s| !s.is_empty()) {
                body.blank();
                body.push("🔧 Fix:", Style::default().fg(CYAN));
                body.paragraph(solution, text());
            }
        }
        Some(AnswerOutcome::Incorrect) => {
            body.blank();
            body.push("✗ Incorrect. Try another option by moving arrow keys!", Style::default().fg(RED));
        }
        None => {}
    }
    body
}

fn explanation(state: &GameState, category: &str, origin: ExplanationOrigin) -> Body {
    let mut body = Body::new();
    match origin {
        ExplanationOrigin::Browsing => body.push(format!("📚 {category}"), title()),
        ExplanationOrigin::JustCompleted | ExplanationOrigin::Pending => {
            body.push(format!("🎉 Category Completed: {category}"), title());
            body.blank();
            body.push("You've finished every challenge in this category. Here is what it was all about:", text());
        }
    }
    body.blank();

    let Some(info) = state.explanation(category) else {
        body.push("No detailed explanation is available for this category yet.", subtle());
        return body;
    };
    if !info.short_description.is_empty() {
        body.paragraph(&info.short_description, Style::default().fg(YELLOW));
        body.blank();
    }
    body.paragraph(&info.explanation, text());
    if !info.resources.is_empty() {
        body.blank();
        body.push("Resources", Style::default().fg(CYAN));
        for r in &info.resources {
            body.push(format!("- {}: {}", r.title, r.url), text());
        }
    }
    body
}

fn progress(state: &GameState, cursor: usize) -> Body {
    let mut body = Body::new();
    let overall = report::overall(state);
    body.push("Your Progress", title());
    body.blank();
    body.push(
        format!(
            "Overall Progress: {} of {} challenges completed ({}%)",
            overall.completed, overall.total, overall.percentage
        ),
        text(),
    );
    body.push("Press Enter on a category to view its challenges.", subtle());
    body.blank();

    for (i, r) in overall.categories.iter().enumerate() {
        let mut details = vec![format!("{} of {} challenges completed ({}%)", r.completed, r.total, r.percentage)];
        if !r.tiers.is_empty() {
            details.push("By Difficulty:".into());
            for t in &r.tiers {
                details.push(format!("    {}: {}/{} completed", t.difficulty, t.completed, t.total));
            }
        }
        if r.errors > 0 {
            details.push(match r.error_level {
                Some(level) => format!("Errors in category: {} ({} - {}%)", r.errors, level.label(), r.error_rate),
                None => format!("Errors in category: {} ({}% error rate)", r.errors, r.error_rate),
            });
        } else if r.completed > 0 {
            details.push("No errors in this category. Great job!".into());
        }
        menu_item(&mut body, i == cursor, r.percentage == 100, &r.category, &details);
    }
    body
}

fn settings(state: &GameState, cursor: usize) -> Body {
    let mut body = Body::new();
    body.push("Game Settings", title());
    body.blank();
    body.push("Configure your game preferences. These settings will be saved for future sessions.", text());
    body.blank();

    let names = if state.show_vulnerability_names() { "Show" } else { "Hide" };
    let items: [(String, Vec<String>); 4] = [
        (
            format!("Vulnerability Names: {names}"),
            vec!["Toggle whether vulnerability names are shown during challenges.".into()],
        ),
        (
            format!("Game Mode: {}", state.settings().game_mode.label()),
            vec![
                "Category Order: play challenges grouped by vulnerability category.".into(),
                "Random by Difficulty: random order, grouped by difficulty level.".into(),
            ],
        ),
        (
            "Delete all progress data".into(),
            vec!["Erases ALL progress data and begins the game from the start.".into()],
        ),
        ("Back to Main Menu".into(), vec!["Return to the main menu".into()]),
    ];
    for (i, (label, details)) in items.iter().enumerate() {
        menu_item(&mut body, i == cursor, false, label, details);
    }
    body
}

fn completion(state: &GameState) -> Body {
    let mut body = Body::new();
    body.push("🎉 Congratulations! You've Completed All Challenges! 🎉", title());
    body.blank();
    body.paragraph(
        "You've demonstrated a strong understanding of secure coding practices and completed all challenges \
         in blindspot! The skills you've developed here will help you write safer, more robust code.",
        text(),
    );
    body.blank();
    body.push("📚 Keep Learning", Style::default().fg(MAGENTA));
    body.push("- Follow the OWASP Top 10", text());
    body.push("- Join security communities", text());
    body.push("- Practice on other platforms", text());
    body.blank();
    let completed = state.completed_count();
    if completed > 0 {
        body.push(
            format!(
                "You've completed {completed} challenges across {} vulnerability categories!",
                state.catalog().category_count()
            ),
            Style::default().fg(YELLOW),
        );
        body.blank();
    }
    body.push("Thank you for playing blindspot. Keep learning, keep coding securely!", text());
    body
}

fn cli_completion(state: &GameState) -> Body {
    let mut body = Body::new();
    body.push("🎯 CLI Challenge Session Completed! 🎯", title());
    body.blank();
    if let Some(session) = state.scoped_session() {
        body.push(format!("You've completed {}!", session.filter.describe(state.catalog())), text());
        body.blank();
        let done = session.ids.iter().filter(|id| state.is_challenge_completed(id)).count();
        body.push(format!("You completed {done} challenges in this focused session!"), Style::default().fg(YELLOW));
        body.blank();
    }
    body.push("🔦 What You've Accomplished", Style::default().fg(CYAN));
    body.push("• Completed focused challenge set", text());
    body.push("• Reinforced specific security knowledge", text());
    body.blank();
    body.push("📚 Keep Learning", Style::default().fg(MAGENTA));
    body.push("- Try different difficulty levels", text());
    body.push("- Explore other vulnerability categories", text());
    body
}
