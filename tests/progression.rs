//! End-to-end progression over the bundled content and an on-disk store.

use std::collections::HashMap;
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use blindspot::content::{parse_catalog, parse_explanations};
use blindspot::domain::VulnerabilityInfo;
use blindspot::navigator::ExplanationOrigin;
use blindspot::notice::Notices;
use blindspot::progress::GameMode;
use blindspot::store::open_store;
use blindspot::{ContentCatalog, DocumentStore, Effect, Event, GameState, JsonFileStore, Navigator, Screen};

const CHALLENGES: &str = include_str!("../assets/challenges.yaml");
const EXPLANATIONS: &str = include_str!("../assets/vuln_explanations.yaml");

fn catalog() -> ContentCatalog {
    parse_catalog(CHALLENGES, Path::new("assets/challenges.yaml")).unwrap()
}

fn explanations() -> HashMap<String, VulnerabilityInfo> {
    parse_explanations(EXPLANATIONS).unwrap()
}

fn open(dir: &Path, seed: u64) -> GameState {
    GameState::load_with_rng(
        catalog(),
        explanations(),
        Box::new(JsonFileStore::new(dir)),
        Notices::default(),
        StdRng::seed_from_u64(seed),
    )
}

fn current_answer(nav: &Navigator) -> Option<String> {
    match nav.current() {
        Screen::ChallengeAnswer(view) => Some(view.challenge_id.clone()),
        _ => None,
    }
}

/// Move the cursor to the correct option, submit it, then continue.
fn answer_correctly(nav: &mut Navigator, state: &mut GameState) -> Effect {
    let id = current_answer(nav).expect("on an answer screen");
    let challenge = state.challenge(&id).unwrap();
    let idx = challenge.options.iter().position(|o| challenge.is_correct(o)).unwrap();
    for _ in 0..idx {
        nav.handle(state, Event::Down);
    }
    nav.handle(state, Event::Select);
    nav.handle(state, Event::Next)
}

#[test]
fn bundled_content_is_complete() {
    let catalog = catalog();
    let explanations = explanations();
    assert!(catalog.category_count() >= 5);
    for set in catalog.sets() {
        assert!(explanations.contains_key(&set.category), "missing explanation for {}", set.category);
        for ch in &set.challenges {
            assert!(ch.options.iter().any(|o| ch.is_correct(o)), "{} has no correct option", ch.id);
            assert_eq!(ch.category, set.category);
        }
    }
}

#[test]
fn progress_resumes_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut state = open(dir.path(), 1);
        let mut nav = Navigator::new(&state);
        nav.handle(&mut state, Event::Select);
        assert_eq!(current_answer(&nav).as_deref(), Some("inj-001"));
        answer_correctly(&mut nav, &mut state);
        assert_eq!(current_answer(&nav).as_deref(), Some("inj-002"));
    }

    let mut state = open(dir.path(), 2);
    assert!(state.is_challenge_completed("inj-001"));
    assert_eq!(state.current_challenge().unwrap().id, "inj-002");
    let mut nav = Navigator::new(&state);
    nav.handle(&mut state, Event::Select);
    assert_eq!(current_answer(&nav).as_deref(), Some("inj-002"));
}

#[test]
fn finished_category_owes_its_explanation_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut state = open(dir.path(), 1);
        state.mark_completed("inj-001");
        state.mark_completed("inj-002");
        let mut nav = Navigator::new(&state);
        nav.handle(&mut state, Event::Select);
        assert_eq!(current_answer(&nav).as_deref(), Some("inj-003"));
        answer_correctly(&mut nav, &mut state);
        assert_eq!(
            nav.current(),
            &Screen::Explanation { category: "Injection".into(), origin: ExplanationOrigin::JustCompleted }
        );
        // Quit without continuing.
        assert_eq!(nav.handle(&mut state, Event::Quit), Effect::Quit);
    }

    let mut state = open(dir.path(), 2);
    assert_eq!(state.pending_explanation(), Some("Injection"));
    let mut nav = Navigator::new(&state);
    nav.handle(&mut state, Event::Select);
    assert_eq!(
        nav.current(),
        &Screen::Explanation { category: "Injection".into(), origin: ExplanationOrigin::Pending }
    );
    nav.handle(&mut state, Event::Next);
    assert_eq!(current_answer(&nav).as_deref(), Some("bac-001"));

    let reopened = open(dir.path(), 3);
    assert_eq!(reopened.pending_explanation(), None);
}

#[test]
fn random_order_replays_identically_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let order = {
        let mut state = open(dir.path(), 7);
        state.toggle_game_mode();
        state.randomized_order().to_vec()
    };
    assert_eq!(order.len(), catalog().total_count());

    let state = open(dir.path(), 12345);
    assert_eq!(state.settings().game_mode, GameMode::RandomByDifficulty);
    assert_eq!(state.randomized_order(), order.as_slice());
    // Toggling kept the first category challenge under the cursor.
    assert_eq!(state.current_challenge().unwrap().id, "inj-001");
    assert!(order.iter().any(|id| id == "inj-001"));
}

#[test]
fn legacy_progress_document_still_loads() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("progress.json"),
        r#"{
            "completedChallenges": {"inj-001": true, "inj-002": false, "gone": true},
            "currentCategoryIdx": 42,
            "currentChallengeIdx": 7,
            "randomizedChallengeIDs": null,
            "categoryErrorCounts": null,
            "isRandomMode": false,
            "pendingCategoryExplanation": ""
        }"#,
    )
    .unwrap();

    let state = open(dir.path(), 1);
    assert!(state.is_challenge_completed("inj-001"));
    assert!(!state.is_challenge_completed("inj-002"));
    assert_eq!(state.completed_count(), 1);
    assert_eq!(state.pending_explanation(), None);
    assert_eq!(state.current_challenge().unwrap().id, "inj-001");
}

#[test]
fn corrupt_documents_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("progress.json"), "not json").unwrap();
    std::fs::write(dir.path().join("settings.json"), "{").unwrap();
    let state = open(dir.path(), 1);
    assert_eq!(state.total_completion_percentage(), 0);
    assert!(!state.show_vulnerability_names());
}

#[test]
fn erasing_from_settings_removes_the_progress_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = open(dir.path(), 1);
    state.mark_completed("xss-001");
    state.toggle_vulnerability_names();
    assert!(dir.path().join("progress.json").exists());

    let mut nav = Navigator::new(&state);
    for e in [Event::Down, Event::Down, Event::Down, Event::Select, Event::Down, Event::Down, Event::Select] {
        nav.handle(&mut state, e);
    }
    assert!(!dir.path().join("progress.json").exists());
    assert!(!state.is_challenge_completed("xss-001"));
    assert_eq!(state.total_completion_percentage(), 0);

    let store = JsonFileStore::new(dir.path());
    assert!(store.load_settings().unwrap().show_vulnerability_names);
}

#[test]
fn no_save_sessions_leave_disk_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let disk = JsonFileStore::new(dir.path());
    {
        let mut state = open(dir.path(), 1);
        state.mark_completed("cry-001");
    }
    let before = std::fs::read_to_string(disk.progress_path()).unwrap();

    let mut state = GameState::load_with_rng(
        catalog(),
        explanations(),
        open_store(Some(dir.path()), false),
        Notices::default(),
        StdRng::seed_from_u64(1),
    );
    assert!(state.is_challenge_completed("cry-001"));
    state.mark_completed("cry-002");
    state.toggle_game_mode();

    assert_eq!(std::fs::read_to_string(disk.progress_path()).unwrap(), before);
    assert!(!disk.settings_path().exists());
}

#[test]
fn game_without_a_data_dir_plays_in_memory() {
    let mut state = GameState::load_with_rng(
        catalog(),
        explanations(),
        open_store(None, true),
        Notices::default(),
        StdRng::seed_from_u64(3),
    );
    let mut nav = Navigator::new(&state);
    nav.handle(&mut state, Event::Select);
    answer_correctly(&mut nav, &mut state);
    assert!(state.is_challenge_completed("inj-001"));
    assert_eq!(current_answer(&nav).as_deref(), Some("inj-002"));
    assert!(state.notices().last_error().is_none());
}

#[test]
fn scoped_difficulty_session_covers_exactly_that_tier() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = open(dir.path(), 9);
    let filter = blindspot::session::SessionFilter { category: None, difficulty: Some(blindspot::domain::Difficulty::Advanced) };
    state.begin_scoped_session(filter).unwrap();
    let mut nav = Navigator::new(&state);

    let mut seen = Vec::new();
    while let Some(id) = current_answer(&nav) {
        seen.push(id);
        answer_correctly(&mut nav, &mut state);
    }
    assert_eq!(nav.current(), &Screen::CliCompletion);
    seen.sort();
    assert_eq!(seen, vec!["bac-003", "cry-003", "inj-003", "mis-002"]);
    assert!(!state.is_challenge_completed("inj-001"));
    assert_eq!(state.settings().game_mode, GameMode::Category);
}
