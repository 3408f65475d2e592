//! Command-line arguments.

use clap::Parser;

use crate::content::ContentCatalog;
use crate::domain::Difficulty;
use crate::session::SessionFilter;

/// Exit code for usage errors (bad category, empty filter).
pub const EXIT_USAGE: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "blindspot", version)]
#[command(about = "Terminal trainer for spotting security vulnerabilities in code")]
pub struct Args {
    /// Only play challenges of this difficulty (0-2, or beginner/intermediate/advanced).
    #[arg(short, long, value_name = "LEVEL", value_parser = parse_difficulty)]
    pub difficulty: Option<Difficulty>,

    /// Only play challenges from this category (case-insensitive).
    #[arg(short, long, value_name = "NAME")]
    pub category: Option<String>,

    /// Print the available categories and exit.
    #[arg(long)]
    pub list_categories: bool,

    /// Play without writing progress or settings to disk.
    #[arg(long)]
    pub no_save: bool,
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    s.parse()
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownCategory {
    pub requested: String,
    pub available: Vec<String>,
}

impl std::fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "unknown category '{}'", self.requested)?;
        writeln!(f, "available categories:")?;
        for name in &self.available {
            writeln!(f, "  - {name}")?;
        }
        Ok(())
    }
}

impl std::error::Error for UnknownCategory {}

impl Args {
    /// Resolve the requested filter against the catalog. `None` when no filter
    /// flags were given.
    pub fn session_filter(&self, catalog: &ContentCatalog) -> Result<Option<SessionFilter>, UnknownCategory> {
        let category = match &self.category {
            Some(name) => Some(catalog.find_category(name).ok_or_else(|| UnknownCategory {
                requested: name.clone(),
                available: catalog.category_names().map(str::to_string).collect(),
            })?),
            None => None,
        };
        let filter = SessionFilter { category, difficulty: self.difficulty };
        Ok(filter.is_active().then_some(filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::small_catalog;

    #[test]
    fn parses_numeric_and_named_difficulty() {
        let args = Args::try_parse_from(["blindspot", "-d", "2", "--category", "a"]).unwrap();
        assert_eq!(args.difficulty, Some(Difficulty::Advanced));
        let args = Args::try_parse_from(["blindspot", "--difficulty", "intermediate"]).unwrap();
        assert_eq!(args.difficulty, Some(Difficulty::Intermediate));
        assert!(Args::try_parse_from(["blindspot", "-d", "7"]).is_err());
    }

    #[test]
    fn category_filter_resolves_case_insensitively() {
        let catalog = small_catalog();
        let args = Args::try_parse_from(["blindspot", "-c", "b"]).unwrap();
        let filter = args.session_filter(&catalog).unwrap().unwrap();
        assert_eq!(filter.category, Some(1));
        assert_eq!(filter.difficulty, None);

        let none = Args::try_parse_from(["blindspot"]).unwrap();
        assert_eq!(none.session_filter(&catalog).unwrap(), None);
    }

    #[test]
    fn unknown_category_lists_alternatives() {
        let catalog = small_catalog();
        let args = Args::try_parse_from(["blindspot", "-c", "Crypto"]).unwrap();
        let err = args.session_filter(&catalog).unwrap_err();
        assert_eq!(err.available, vec!["A".to_string(), "B".to_string()]);
        assert!(err.to_string().contains("  - B"));
    }
}
