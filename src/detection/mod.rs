//! Hostname scoring.
//!
//! This module provides:
//! - Keyword pattern matching (distinct hit count, blacklist hit)
//! - The detection policy (full / partial / no match)
//! - `DetectionConfig`, the compiled, read-only detection settings

mod matcher;
mod policy;

pub use matcher::{count_matches, distinct_matches, is_blacklisted, KeywordPattern};
pub use policy::{classify, Classification};

use crate::error_handling::ConfigError;

/// Compiled detection settings, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    search: KeywordPattern,
    blacklist: KeywordPattern,
    threshold: usize,
}

impl DetectionConfig {
    /// Compiles the patterns and validates the threshold.
    ///
    /// # Errors
    ///
    /// - `ConfigError::EmptySearchPattern` if `search` is blank
    /// - `ConfigError::InvalidPattern` if either pattern fails to compile
    /// - `ConfigError::NonPositiveThreshold` if `threshold < 1`
    pub fn new(search: &str, blacklist: &str, threshold: i64) -> Result<Self, ConfigError> {
        if search.trim().is_empty() {
            return Err(ConfigError::EmptySearchPattern);
        }
        let search = KeywordPattern::new(search).map_err(|source| ConfigError::InvalidPattern {
            name: "search",
            source,
        })?;
        let blacklist =
            KeywordPattern::new(blacklist).map_err(|source| ConfigError::InvalidPattern {
                name: "blacklist",
                source,
            })?;
        let threshold = usize::try_from(threshold)
            .ok()
            .filter(|t| *t >= 1)
            .ok_or(ConfigError::NonPositiveThreshold(threshold))?;

        Ok(Self {
            search,
            blacklist,
            threshold,
        })
    }

    pub fn search(&self) -> &KeywordPattern {
        &self.search
    }

    pub fn blacklist(&self) -> &KeywordPattern {
        &self.blacklist
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Scores one hostname: blacklist (skipped when unconfigured), keyword count, policy.
    pub fn score(&self, hostname: &str) -> Score {
        let blacklisted = self.blacklist.is_configured() && is_blacklisted(hostname, &self.blacklist);
        let find_count = count_matches(hostname, &self.search);
        Score {
            find_count,
            blacklisted,
            classification: classify(find_count, blacklisted, self.threshold),
        }
    }
}

/// Result of scoring a single hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub find_count: usize,
    pub blacklisted: bool,
    pub classification: Classification,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_threshold() {
        for threshold in [0, -1, i64::MIN] {
            let err = DetectionConfig::new("paypal", "", threshold).unwrap_err();
            assert!(matches!(err, ConfigError::NonPositiveThreshold(t) if t == threshold));
        }
    }

    #[test]
    fn test_rejects_empty_search_pattern() {
        let err = DetectionConfig::new("  ", "", 2).unwrap_err();
        assert!(matches!(err, ConfigError::EmptySearchPattern));
    }

    #[test]
    fn test_rejects_invalid_patterns() {
        let err = DetectionConfig::new("pay[pal", "", 2).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { name: "search", .. }));

        let err = DetectionConfig::new("paypal", "(bad", 2).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { name: "blacklist", .. }));
    }

    #[test]
    fn test_lookaround_and_backreferences_are_rejected() {
        // the regex crate has no lookaround or backreferences
        let err = DetectionConfig::new("paypal(?!\\.com)", "", 2).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { name: "search", .. }));

        let err = DetectionConfig::new("paypal", r"(\w)\1", 2).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { name: "blacklist", .. }));

        // the common Perl-style subset works unchanged
        assert!(DetectionConfig::new(r"(?i)pay\s?pal|log-?in|\bverify\b", "", 2).is_ok());
    }

    #[test]
    fn test_empty_blacklist_is_unconfigured() {
        let config = DetectionConfig::new("paypal", "", 1).unwrap();
        assert!(!config.blacklist().is_configured());
        assert_eq!(config.threshold(), 1);
    }

    #[test]
    fn test_score_full_detection() {
        let config = DetectionConfig::new("paypal|login", "", 2).unwrap();
        let score = config.score("secure-paypal-paypal-login.com");
        assert_eq!(score.find_count, 2);
        assert!(!score.blacklisted);
        assert_eq!(score.classification, Classification::FullDetection);
    }

    #[test]
    fn test_score_partial_detection() {
        let config = DetectionConfig::new("paypal|login", "", 2).unwrap();
        let score = config.score("paypal-help.com");
        assert_eq!(score.find_count, 1);
        assert_eq!(score.classification, Classification::PartialDetection);
    }

    #[test]
    fn test_score_blacklisted() {
        let config = DetectionConfig::new("paypal|login", r"paypal\.com$", 2).unwrap();
        let score = config.score("login.paypal.com");
        assert!(score.blacklisted);
        assert_eq!(score.classification, Classification::NoMatch);
    }
}
