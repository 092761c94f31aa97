//! Action/resource pattern matching.
//!
//! Patterns are dot-delimited names. `*` matches everything; a trailing `.*`
//! matches any name strictly below the prefix namespace, compared segment by
//! segment (`hr.*` matches `hr.leave.request` but neither `hr` nor `hrx.leave`).

use thiserror::Error;

pub const WILDCARD: &str = "*";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,

    #[error("pattern contains whitespace")]
    Whitespace,

    #[error("pattern has an empty segment")]
    EmptySegment,

    #[error("'*' is only allowed as a whole pattern or a trailing '.*' segment")]
    MisplacedWildcard,
}

/// Does `pattern` match the concrete `requested` name?
pub fn pattern_matches(pattern: &str, requested: &str) -> bool {
    if pattern == WILDCARD {
        return true;
    }

    if let Some(prefix) = pattern.strip_suffix(".*") {
        if prefix.is_empty() {
            return false;
        }
        let mut remaining = requested.split('.');
        for segment in prefix.split('.') {
            match remaining.next() {
                Some(r) if r == segment => {}
                _ => return false,
            }
        }
        return matches!(remaining.next(), Some(next) if !next.is_empty());
    }

    pattern == requested
}

/// Does any pattern in `patterns` match `requested`?
pub fn any_matches<I, S>(patterns: I, requested: &str) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    patterns
        .into_iter()
        .any(|p| pattern_matches(p.as_ref(), requested))
}

/// Syntax check used at write time.
pub fn check_pattern(pattern: &str) -> Result<(), PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }
    if pattern.chars().any(char::is_whitespace) {
        return Err(PatternError::Whitespace);
    }
    if pattern == WILDCARD {
        return Ok(());
    }

    let segments: Vec<&str> = pattern.split('.').collect();
    let last = segments.len() - 1;
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            return Err(PatternError::EmptySegment);
        }
        if segment.contains('*') && !(i == last && *segment == WILDCARD && i > 0) {
            return Err(PatternError::MisplacedWildcard);
        }
    }
    Ok(())
}
