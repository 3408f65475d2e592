//! Content catalog: every challenge set, loaded once at startup and immutable afterwards.
//!
//! The catalog document is required (a missing or unparsable file is fatal); the
//! vulnerability explanation document is optional and degrades to an empty map.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::{content_search_paths, CHALLENGES_FILE, EXPLANATIONS_FILE};
use crate::domain::{Challenge, ChallengeSet, VulnerabilityInfo};
use crate::util::error_chain;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("could not find {file}; searched: {}", format_paths(.searched))]
    NotFound { file: String, searched: Vec<PathBuf> },

    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{} contains no challenges", .path.display())]
    Empty { path: PathBuf },

    #[error("duplicate challenge id '{id}' (categories '{first}' and '{second}')")]
    DuplicateId { id: String, first: String, second: String },
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Location of a challenge in catalog order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub category: usize,
    pub challenge: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChallengesDocument {
    #[serde(default)]
    challenge_sets: Vec<ChallengeSet>,
}

#[derive(Debug, Deserialize)]
struct ExplanationsDocument {
    #[serde(default)]
    vulnerabilities: Vec<VulnerabilityInfo>,
}

/// All challenge sets in display order, plus an id index.
#[derive(Clone, Debug, Default)]
pub struct ContentCatalog {
    sets: Vec<ChallengeSet>,
    by_id: HashMap<String, Position>,
}

impl ContentCatalog {
    /// Build the catalog and its id index. Challenges without a category inherit
    /// their set's name. Ids must be unique across all sets.
    pub fn new(mut sets: Vec<ChallengeSet>) -> Result<Self, ContentError> {
        let names: Vec<String> = sets.iter().map(|s| s.category.clone()).collect();
        let mut by_id = HashMap::new();
        for (ci, set) in sets.iter_mut().enumerate() {
            for (xi, ch) in set.challenges.iter_mut().enumerate() {
                if ch.category.is_empty() {
                    ch.category = set.category.clone();
                }
                let pos = Position { category: ci, challenge: xi };
                if let Some(prev) = by_id.insert(ch.id.clone(), pos) {
                    return Err(ContentError::DuplicateId {
                        id: ch.id.clone(),
                        first: names[prev.category].clone(),
                        second: names[ci].clone(),
                    });
                }
            }
        }
        Ok(Self { sets, by_id })
    }

    pub fn sets(&self) -> &[ChallengeSet] {
        &self.sets
    }

    pub fn set(&self, category: usize) -> Option<&ChallengeSet> {
        self.sets.get(category)
    }

    pub fn category_count(&self) -> usize {
        self.sets.len()
    }

    pub fn total_count(&self) -> usize {
        self.sets.iter().map(|s| s.challenges.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }

    pub fn get(&self, id: &str) -> Option<&Challenge> {
        self.locate(id).and_then(|p| self.at(p))
    }

    pub fn locate(&self, id: &str) -> Option<Position> {
        self.by_id.get(id).copied()
    }

    pub fn at(&self, pos: Position) -> Option<&Challenge> {
        self.sets.get(pos.category)?.challenges.get(pos.challenge)
    }

    pub fn category_index(&self, name: &str) -> Option<usize> {
        self.sets.iter().position(|s| s.category == name)
    }

    /// Case-insensitive lookup, used for names typed on the command line.
    pub fn find_category(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.sets.iter().position(|s| s.category.to_lowercase() == wanted)
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.sets.iter().map(|s| s.category.as_str())
    }

    /// Every challenge in catalog order.
    pub fn challenges(&self) -> impl Iterator<Item = &Challenge> {
        self.sets.iter().flat_map(|s| s.challenges.iter())
    }
}

/// Parse a challenges document from YAML text.
pub fn parse_catalog(yaml: &str, path: &Path) -> Result<ContentCatalog, ContentError> {
    let doc: ChallengesDocument = serde_yaml::from_str(yaml).map_err(|source| ContentError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = ContentCatalog::new(doc.challenge_sets)?;
    if catalog.is_empty() {
        return Err(ContentError::Empty { path: path.to_path_buf() });
    }
    Ok(catalog)
}

/// Parse an explanations document and index it by vulnerability name.
pub fn parse_explanations(yaml: &str) -> Result<HashMap<String, VulnerabilityInfo>, serde_yaml::Error> {
    let doc: ExplanationsDocument = serde_yaml::from_str(yaml)?;
    Ok(doc
        .vulnerabilities
        .into_iter()
        .map(|v| (v.name.clone(), v))
        .collect())
}

fn find_first(file: &str, configured: Option<&Path>) -> Result<(PathBuf, String), ContentError> {
    let searched = content_search_paths(file, configured);
    for path in &searched {
        match std::fs::read_to_string(path) {
            Ok(text) => return Ok((path.clone(), text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(target: "content", path = %path.display(), "Not found, trying next location");
            }
            Err(source) => return Err(ContentError::Read { path: path.clone(), source }),
        }
    }
    Err(ContentError::NotFound { file: file.to_string(), searched })
}

/// Locate and load the challenge catalog. Any failure here is startup-fatal.
#[instrument(level = "info", skip_all)]
pub fn load_catalog(configured: Option<&Path>) -> Result<ContentCatalog, ContentError> {
    let (path, text) = find_first(CHALLENGES_FILE, configured)?;
    let catalog = parse_catalog(&text, &path)?;
    info!(
        target: "content",
        path = %path.display(),
        categories = catalog.category_count(),
        challenges = catalog.total_count(),
        "Loaded challenge catalog"
    );
    Ok(catalog)
}

/// Locate and load the explanation map. Absence or a parse error yields an empty map.
#[instrument(level = "info", skip_all)]
pub fn load_explanations(configured: Option<&Path>) -> HashMap<String, VulnerabilityInfo> {
    let (path, text) = match find_first(EXPLANATIONS_FILE, configured) {
        Ok(found) => found,
        Err(e) => {
            warn!(target: "content", error = %error_chain(&e), "Vulnerability explanations unavailable");
            return HashMap::new();
        }
    };
    match parse_explanations(&text) {
        Ok(map) => {
            info!(target: "content", path = %path.display(), count = map.len(), "Loaded vulnerability explanations");
            map
        }
        Err(e) => {
            warn!(target: "content", path = %path.display(), error = %error_chain(&e), "Failed to parse vulnerability explanations");
            HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
challengeSets:
  - category: Injection
    description: Untrusted data reaching an interpreter
    challenges:
      - id: inj-1
        title: Concatenated query
        difficulty: 0
        correctAnswer: SQL Injection
        options: [SQL Injection, XSS]
      - id: inj-2
        title: Shell out
        difficulty: 1
        category: Injection
        correctAnswer: Command Injection
        options: [Command Injection, SSRF]
  - category: Broken Access Control
    challenges:
      - id: bac-1
        title: Missing check
        difficulty: advanced
        correctAnswer: IDOR
        options: [IDOR, CSRF]
"#;

    #[test]
    fn parses_sets_and_indexes_ids() {
        let catalog = parse_catalog(DOC, Path::new("challenges.yaml")).unwrap();
        assert_eq!(catalog.category_count(), 2);
        assert_eq!(catalog.total_count(), 3);
        assert_eq!(catalog.locate("bac-1"), Some(Position { category: 1, challenge: 0 }));
        // category inherited from the set
        assert_eq!(catalog.get("inj-1").unwrap().category, "Injection");
        assert_eq!(catalog.find_category("broken access CONTROL"), Some(1));
        assert_eq!(catalog.category_index("broken access control"), None);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let doc = DOC.replace("id: bac-1", "id: inj-1");
        let err = parse_catalog(&doc, Path::new("c.yaml")).unwrap_err();
        assert!(matches!(err, ContentError::DuplicateId { ref id, .. } if id == "inj-1"));
    }

    #[test]
    fn empty_and_malformed_documents_fail() {
        assert!(matches!(
            parse_catalog("challengeSets: []", Path::new("c.yaml")),
            Err(ContentError::Empty { .. })
        ));
        assert!(matches!(
            parse_catalog("challengeSets: [ {", Path::new("c.yaml")),
            Err(ContentError::Parse { .. })
        ));
    }

    #[test]
    fn explanations_are_keyed_by_name() {
        let yaml = r#"
vulnerabilities:
  - name: Injection
    short_description: Data treated as code
    explanation: Long text
    resources:
      - title: OWASP
        url: https://owasp.org/Top10/A03_2021-Injection/
"#;
        let map = parse_explanations(yaml).unwrap();
        assert_eq!(map["Injection"].resources.len(), 1);
    }
}
