//! Detection policy: turns a match count into a classification.

/// Outcome of scoring one hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// At or above the threshold and not blacklisted. Recorded and reported.
    FullDetection,
    /// Some keyword hits, but fewer than the threshold. Diagnostic only.
    PartialDetection,
    /// Nothing to report.
    NoMatch,
}

/// Classifies a hostname from its distinct keyword count.
///
/// Rules are applied in order:
/// 1. blacklisted and `find_count >= threshold` is `NoMatch`
/// 2. `find_count >= threshold` is `FullDetection`
/// 3. `0 < find_count < threshold` is `PartialDetection`
/// 4. otherwise `NoMatch`
///
/// The blacklist only suppresses what would have been a full detection; a
/// blacklisted hostname below the threshold is still a partial detection.
///
/// `threshold` is validated to be at least 1 at configuration load.
pub fn classify(find_count: usize, is_blacklisted: bool, threshold: usize) -> Classification {
    if find_count >= threshold {
        if is_blacklisted {
            Classification::NoMatch
        } else {
            Classification::FullDetection
        }
    } else if find_count > 0 {
        Classification::PartialDetection
    } else {
        Classification::NoMatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_detection_at_threshold() {
        assert_eq!(classify(2, false, 2), Classification::FullDetection);
        assert_eq!(classify(5, false, 2), Classification::FullDetection);
    }

    #[test]
    fn test_partial_detection_below_threshold() {
        assert_eq!(classify(1, false, 2), Classification::PartialDetection);
        assert_eq!(classify(2, false, 3), Classification::PartialDetection);
    }

    #[test]
    fn test_no_match_on_zero() {
        assert_eq!(classify(0, false, 2), Classification::NoMatch);
        assert_eq!(classify(0, true, 2), Classification::NoMatch);
    }

    #[test]
    fn test_blacklist_suppresses_full_detection() {
        assert_eq!(classify(3, true, 2), Classification::NoMatch);
    }

    #[test]
    fn test_blacklist_does_not_suppress_partial_detection() {
        assert_eq!(classify(1, true, 2), Classification::PartialDetection);
    }

    #[test]
    fn test_threshold_of_one_has_no_partial_tier() {
        assert_eq!(classify(1, false, 1), Classification::FullDetection);
        assert_eq!(classify(0, false, 1), Classification::NoMatch);
    }
}
