//! Version requirements in RubyGems notation
//!
//! A requirement is an ordered list of `(operator, version)` clauses such as
//! `~> 2.2` or `>= 1.0, < 3`. Only the textual form is modelled; matching
//! versions against requirements is Bundler's job.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operators accepted by RubyGems, longest first for parsing
const OPERATORS: &[&str] = &["~>", ">=", "<=", "!=", "=", ">", "<"];

/// A single `operator version` clause
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    pub operator: &'static str,
    pub version: String,
}

impl Clause {
    /// Parse one clause; a bare version means `= version`
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        let (operator, rest) = OPERATORS
            .iter()
            .find_map(|op| input.strip_prefix(op).map(|rest| (*op, rest)))
            .unwrap_or(("=", input));

        let version = rest.trim();
        if !is_version(version) {
            return Err(format!("invalid version '{}'", version));
        }

        Ok(Self {
            operator,
            version: version.to_string(),
        })
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operator, self.version)
    }
}

/// A version requirement (possibly unconstrained)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Requirement {
    clauses: Vec<Clause>,
}

impl Requirement {
    /// The unconstrained requirement
    pub fn none() -> Self {
        Self::default()
    }

    /// Exact pin to a resolved version
    pub fn pinned(version: &str) -> Self {
        Self {
            clauses: vec![Clause {
                operator: "=",
                version: version.to_string(),
            }],
        }
    }

    /// Parse a comma-separated requirement string (`">= 1, < 3"`)
    pub fn parse(input: &str) -> Result<Self, String> {
        Self::from_clauses(input.split(','))
    }

    /// Build from individual clause strings, dropping duplicates
    pub fn from_clauses<I, S>(clauses: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed: Vec<Clause> = Vec::new();
        for clause in clauses {
            let clause = Clause::parse(clause.as_ref())?;
            if !parsed.contains(&clause) {
                parsed.push(clause);
            }
        }
        Ok(Self { clauses: parsed })
    }

    /// Whether this requirement accepts any version (`>= 0` or nothing)
    pub fn is_none(&self) -> bool {
        match self.clauses.as_slice() {
            [] => true,
            [only] => only.operator == ">=" && only.version == "0",
            _ => false,
        }
    }

    /// Canonical list form, one `"op version"` string per clause
    pub fn as_list(&self) -> Vec<String> {
        self.clauses.iter().map(Clause::to_string).collect()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return write!(f, ">= 0");
        }
        write!(f, "{}", self.as_list().join(", "))
    }
}

impl From<Clause> for Requirement {
    fn from(clause: Clause) -> Self {
        Self {
            clauses: vec![clause],
        }
    }
}

impl TryFrom<Vec<String>> for Requirement {
    type Error = String;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_clauses(value)
    }
}

impl From<Requirement> for Vec<String> {
    fn from(value: Requirement) -> Self {
        value.as_list()
    }
}

/// Check a string against the RubyGems version grammar:
/// `[0-9]+(\.[0-9a-zA-Z]+)*(-[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?`
pub fn is_version(input: &str) -> bool {
    let (release, pre) = match input.split_once('-') {
        Some((release, pre)) => (release, Some(pre)),
        None => (input, None),
    };

    let mut segments = release.split('.');
    let leading_ok = segments
        .next()
        .is_some_and(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()));
    if !leading_ok {
        return false;
    }
    if !segments.all(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric())) {
        return false;
    }

    match pre {
        None => true,
        Some(pre) => pre.split('.').all(|s| {
            !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_version_is_exact() {
        let req = Requirement::parse("1").unwrap();
        assert_eq!(req.as_list(), vec!["= 1"]);
    }

    #[test]
    fn pessimistic_constraint_keeps_operator() {
        let req = Requirement::parse("~> 2.2").unwrap();
        assert_eq!(req.as_list(), vec!["~> 2.2"]);
        assert!(!req.is_none());
    }

    #[test]
    fn compound_constraint_lists_each_clause() {
        let req = Requirement::parse(">= 1.0, < 3").unwrap();
        assert_eq!(req.as_list(), vec![">= 1.0", "< 3"]);
        assert_eq!(req.to_string(), ">= 1.0, < 3");
    }

    #[test]
    fn duplicate_clauses_are_dropped() {
        let req = Requirement::from_clauses(["> 1", ">1", "< 2"]).unwrap();
        assert_eq!(req.as_list(), vec!["> 1", "< 2"]);
    }

    #[test]
    fn none_detection() {
        assert!(Requirement::none().is_none());
        assert!(Requirement::parse(">= 0").unwrap().is_none());
        assert!(!Requirement::parse(">= 0.1").unwrap().is_none());
    }

    #[test]
    fn rejects_garbage() {
        assert!(Requirement::parse("~> banana").is_err());
        assert!(Requirement::parse("").is_err());
    }

    #[test]
    fn version_grammar() {
        assert!(is_version("2.3.2"));
        assert!(is_version("1.0.0.rc1"));
        assert!(is_version("1.0-beta.2"));
        assert!(!is_version("v1"));
        assert!(!is_version("1..2"));
    }

    #[test]
    fn deserializes_from_string_list() {
        let req: Requirement = serde_json::from_str(r#"["~> 2.2", ">= 2.2.1"]"#).unwrap();
        assert_eq!(req.as_list(), vec!["~> 2.2", ">= 2.2.1"]);
    }
}
