//! Keyword pattern matching against hostnames.

use std::collections::HashSet;

use regex::Regex;

/// A compiled keyword pattern, or nothing when the operator left it empty.
///
/// An unconfigured pattern never matches anything.
#[derive(Debug, Clone, Default)]
pub struct KeywordPattern {
    regex: Option<Regex>,
}

impl KeywordPattern {
    /// Compiles `source`. A blank source yields an unconfigured pattern.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(Self {
            regex: Some(Regex::new(source)?),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.regex.is_some()
    }

    /// The pattern source, empty when unconfigured.
    pub fn as_str(&self) -> &str {
        self.regex.as_ref().map(Regex::as_str).unwrap_or("")
    }
}

/// Returns the set of distinct non-empty strings `pattern` finds in `hostname`.
///
/// Repeated occurrences of the same text collapse into one entry. Empty matches
/// (a pattern such as `a*` matching between characters) are ignored.
pub fn distinct_matches<'h>(hostname: &'h str, pattern: &KeywordPattern) -> HashSet<&'h str> {
    match &pattern.regex {
        Some(regex) => regex
            .find_iter(hostname)
            .map(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .collect(),
        None => HashSet::new(),
    }
}

/// Number of distinct keyword hits in `hostname`.
pub fn count_matches(hostname: &str, pattern: &KeywordPattern) -> usize {
    distinct_matches(hostname, pattern).len()
}

/// True when the blacklist is configured and finds anything in `hostname`.
pub fn is_blacklisted(hostname: &str, blacklist: &KeywordPattern) -> bool {
    match &blacklist.regex {
        Some(regex) => regex.find_iter(hostname).any(|m| !m.is_empty()),
        None => false,
    }
}
