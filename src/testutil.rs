//! Catalog fixtures shared by unit tests.

use crate::content::ContentCatalog;
use crate::domain::{Challenge, ChallengeSet, Difficulty};

pub fn challenge(id: &str, category: &str, difficulty: Difficulty) -> Challenge {
    Challenge {
        id: id.into(),
        title: format!("Title {id}"),
        description: format!("Spot the flaw in {id}"),
        difficulty,
        category: category.into(),
        code: "query = \"SELECT * FROM t WHERE id=\" + id".into(),
        lang: "python".into(),
        options: vec!["right".into(), "wrong".into(), "also wrong".into()],
        correct_answer: "right".into(),
        hint: Some("look at the input".into()),
        ..Challenge::default()
    }
}

/// Build a catalog from `(category, [(id, tier)])` tuples.
pub fn catalog(spec: &[(&str, &[(&str, Difficulty)])]) -> ContentCatalog {
    let sets = spec
        .iter()
        .map(|(name, items)| ChallengeSet {
            category: name.to_string(),
            description: format!("{name} challenges"),
            challenges: items.iter().map(|(id, tier)| challenge(id, name, *tier)).collect(),
        })
        .collect();
    ContentCatalog::new(sets).expect("fixture catalog is valid")
}

/// "A" with two beginner challenges, "B" with one advanced challenge.
pub fn small_catalog() -> ContentCatalog {
    use Difficulty::{Advanced, Beginner};
    catalog(&[("A", &[("a1", Beginner), ("a2", Beginner)]), ("B", &[("b1", Advanced)])])
}
