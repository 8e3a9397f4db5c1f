//! Semantic version parsing and skip range matching.
//!
//! Skip ranges use the npm/OLM range grammar: comparators separated by
//! whitespace must all hold, alternatives are joined with `||`, and a hyphen
//! range `a - b` is shorthand for `>=a <=b`. Each comparator set is lowered
//! onto a [`semver::VersionReq`], which already implements the partial
//! version and pre-release rules of that grammar. `!=` has no `VersionReq`
//! counterpart and is kept as a separate exclusion list.
//!
//! # Example
//!
//! ```
//! use opkit::range::SkipRange;
//!
//! let range: SkipRange = ">=1.0.0 <2.0.0 || 3.x".parse().unwrap();
//! assert!(range.matches_str("1.4.2"));
//! assert!(range.matches_str("3.1.0"));
//! assert!(!range.matches_str("2.0.0"));
//! ```

use semver::{Version, VersionReq};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing a range expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// The expression is empty or whitespace.
    #[error("Range expression is empty")]
    Empty,

    /// A comparator could not be understood.
    #[error("Invalid comparator '{comparator}': {message}")]
    InvalidComparator {
        /// The offending comparator text
        comparator: String,
        /// Why it was rejected
        message: String,
    },

    /// A hyphen range is missing one of its bounds.
    #[error("Incomplete hyphen range in '{0}'")]
    IncompleteHyphen(String),
}

/// Parse a version string leniently.
///
/// Surrounding whitespace and a leading `v` or `=` are ignored, matching how
/// operator versions are commonly written in manifests.
#[must_use]
pub fn parse_version(s: &str) -> Option<Version> {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix('=').unwrap_or(trimmed).trim_start();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    Version::parse(trimmed).ok()
}

/// One `||` alternative: every comparator must hold.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ComparatorSet {
    req: VersionReq,
    excluded: Vec<Version>,
}

impl ComparatorSet {
    fn matches(&self, version: &Version) -> bool {
        self.req.matches(version) && !self.excluded.contains(version)
    }
}

/// A parsed skip range expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipRange {
    raw: String,
    alternatives: Vec<ComparatorSet>,
}

impl SkipRange {
    /// Parse a range expression.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError`] when the expression is empty or any comparator
    /// is malformed.
    pub fn parse(expr: &str) -> Result<Self, RangeError> {
        let raw = expr.trim();
        if raw.is_empty() {
            return Err(RangeError::Empty);
        }

        let alternatives = raw
            .split("||")
            .map(parse_set)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.to_string(),
            alternatives,
        })
    }

    /// Whether `version` satisfies any alternative.
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|set| set.matches(version))
    }

    /// Parse `version` leniently and test it. Unparseable versions never match.
    #[must_use]
    pub fn matches_str(&self, version: &str) -> bool {
        parse_version(version).is_some_and(|v| self.matches(&v))
    }

    /// The expression as written (trimmed).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for SkipRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SkipRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

const OPERATORS: [&str; 8] = [">=", "<=", "!=", ">", "<", "=", "~", "^"];

/// Split a comparator set into comparator tokens, gluing a detached operator
/// (`>= 1.0.0`) back onto its version.
fn tokenize(set: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut pending_op: Option<&str> = None;

    for word in set.split_whitespace() {
        if OPERATORS.contains(&word) {
            pending_op = Some(word);
            continue;
        }
        match pending_op.take() {
            Some(op) => tokens.push(format!("{op}{word}")),
            None => tokens.push(word.to_string()),
        }
    }
    if let Some(op) = pending_op {
        tokens.push(op.to_string());
    }
    tokens
}

fn parse_set(set: &str) -> Result<ComparatorSet, RangeError> {
    let tokens = tokenize(set);

    let mut comparators = Vec::new();
    let mut excluded = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if tokens.get(i + 1).map(String::as_str) == Some("-") {
            let upper = tokens
                .get(i + 2)
                .ok_or_else(|| RangeError::IncompleteHyphen(set.trim().to_string()))?;
            comparators.push(lower_comparator(&format!(">={token}"))?);
            comparators.push(lower_comparator(&format!("<={upper}"))?);
            i += 3;
            continue;
        }
        if token == "-" {
            return Err(RangeError::IncompleteHyphen(set.trim().to_string()));
        }
        if let Some(version) = token.strip_prefix("!=") {
            let parsed = parse_version(version).ok_or_else(|| RangeError::InvalidComparator {
                comparator: token.clone(),
                message: "'!=' requires a full version".to_string(),
            })?;
            excluded.push(parsed);
        } else if let Some(comparator) = lower_wildcard_aware(token)? {
            comparators.push(comparator);
        }
        i += 1;
    }

    let req = if comparators.is_empty() {
        VersionReq::STAR
    } else {
        let joined = comparators.join(", ");
        VersionReq::parse(&joined).map_err(|e| RangeError::InvalidComparator {
            comparator: set.trim().to_string(),
            message: e.to_string(),
        })?
    };

    Ok(ComparatorSet { req, excluded })
}

/// Lower a single token, returning `None` for a bare wildcard (`*`, `x`).
fn lower_wildcard_aware(token: &str) -> Result<Option<String>, RangeError> {
    if matches!(token, "*" | "x" | "X") {
        return Ok(None);
    }
    lower_comparator(token).map(Some)
}

/// Rewrite one npm-style comparator into `semver` crate syntax.
///
/// A bare version is exact in npm but caret in Cargo, so it gets an explicit
/// `=`. Wildcard segments (`1.x`, `1.2.*`) are dropped, which leaves a
/// partial version with identical meaning.
fn lower_comparator(token: &str) -> Result<String, RangeError> {
    let split_at = token
        .find(|c: char| !matches!(c, '>' | '<' | '=' | '~' | '^'))
        .ok_or_else(|| RangeError::InvalidComparator {
            comparator: token.to_string(),
            message: "missing version".to_string(),
        })?;
    let (op, version) = token.split_at(split_at);
    let version = version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('V'))
        .unwrap_or(version);

    let mut segments: Vec<&str> = Vec::new();
    for segment in version.split('.') {
        if matches!(segment, "x" | "X" | "*") {
            break;
        }
        segments.push(segment);
    }
    if segments.is_empty() {
        // `>=*` and friends: every version qualifies or none does; treat the
        // whole comparator as a wildcard.
        return Ok("*".to_string());
    }
    let version = segments.join(".");

    let op = if op.is_empty() { "=" } else { op };
    Ok(format!("{op}{version}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::space_separated(">=1.0.0 <2.0.0", "1.5.0", true)]
    #[case::upper_bound_exclusive(">=1.0.0 <2.0.0", "2.0.0", false)]
    #[case::lower_bound_inclusive(">=1.0.0 <2.0.0", "1.0.0", true)]
    #[case::detached_operator(">= 1.0.0 < 2.0.0", "1.9.9", true)]
    #[case::exact_bare("1.2.3", "1.2.3", true)]
    #[case::exact_bare_is_not_caret("1.2.3", "1.3.0", false)]
    #[case::partial_bare("1.2", "1.2.9", true)]
    #[case::partial_bare_excludes_next_minor("1.2", "1.3.0", false)]
    #[case::x_range("1.x", "1.9.0", true)]
    #[case::x_range_excludes_next_major("1.x", "2.0.0", false)]
    #[case::tilde("~1.2.3", "1.2.9", true)]
    #[case::tilde_excludes_minor("~1.2.3", "1.3.0", false)]
    #[case::caret("^1.2.3", "1.9.0", true)]
    #[case::caret_excludes_major("^1.2.3", "2.0.0", false)]
    #[case::hyphen("1.0.0 - 2.0.0", "2.0.0", true)]
    #[case::hyphen_upper("1.0.0 - 2.0.0", "2.0.1", false)]
    #[case::or_first("<1.0.0 || >=3.0.0", "0.9.0", true)]
    #[case::or_second("<1.0.0 || >=3.0.0", "3.2.0", true)]
    #[case::or_neither("<1.0.0 || >=3.0.0", "2.0.0", false)]
    #[case::not_equal(">=1.0.0 !=1.1.0", "1.1.0", false)]
    #[case::not_equal_others(">=1.0.0 !=1.1.0", "1.2.0", true)]
    #[case::star("*", "4.5.6", true)]
    #[case::v_prefix_in_range(">=v1.0.0", "1.0.0", true)]
    #[case::v_prefix_in_version("<2.0.0", "v1.0.0", true)]
    #[case::prerelease_excluded(">=1.0.0 <2.0.0", "1.5.0-alpha", false)]
    #[case::prerelease_same_tuple(">=1.5.0-alpha <2.0.0", "1.5.0-beta", true)]
    #[case::unparseable_version("<2.0.0", "latest", false)]
    fn test_matches(#[case] range: &str, #[case] version: &str, #[case] expected: bool) {
        let range = SkipRange::parse(range).unwrap();
        assert_eq!(range.matches_str(version), expected, "{range} vs {version}");
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    #[case::garbage(">=banana")]
    #[case::dangling_hyphen("1.0.0 -")]
    #[case::lonely_operator(">=")]
    #[case::not_equal_partial("!=1.2")]
    fn test_parse_errors(#[case] expr: &str) {
        assert!(SkipRange::parse(expr).is_err(), "expected error for {expr:?}");
    }

    #[test]
    fn test_display_keeps_expression() {
        let range: SkipRange = "  >=0.9.0 <0.9.4 ".parse().unwrap();
        assert_eq!(range.to_string(), ">=0.9.0 <0.9.4");
        assert_eq!(range.as_str(), ">=0.9.0 <0.9.4");
    }

    #[rstest]
    #[case("1.2.3", Some((1, 2, 3)))]
    #[case("v1.2.3", Some((1, 2, 3)))]
    #[case(" =1.2.3 ", Some((1, 2, 3)))]
    #[case("1.2", None)]
    #[case("", None)]
    fn test_parse_version(#[case] input: &str, #[case] expected: Option<(u64, u64, u64)>) {
        let parsed = parse_version(input).map(|v| (v.major, v.minor, v.patch));
        assert_eq!(parsed, expected);
    }
}
