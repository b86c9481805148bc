use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::errors::{RewriteError, RewriteResult};

/// Longest NAME an OFX 1.02 consumer accepts.
pub const MAX_NAME_LEN: usize = 31;

/// Where a matching rule takes the payee name from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NameSource {
    /// Capture group of the match (0 is the whole match), cut to
    /// [`MAX_NAME_LEN`] characters.
    CaptureIndex(usize),
    /// Fixed name, used verbatim.
    Literal(String),
}

/// One entry of a rule table: a case-insensitive pattern searched anywhere
/// in the memo, and the source of the derived name.
#[derive(Debug, Clone)]
pub struct Rule {
    matcher: Regex,
    source: NameSource,
}

impl Rule {
    pub fn new(pattern: &str, source: NameSource) -> RewriteResult<Self> {
        let matcher = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| RewriteError::InvalidRule {
                pattern: pattern.to_string(),
                source,
            })?;

        if let NameSource::CaptureIndex(index) = source {
            if index >= matcher.captures_len() {
                return Err(RewriteError::InvalidRuleTable(format!(
                    "pattern {pattern:?} has no capture group {index}"
                )));
            }
        }

        Ok(Self { matcher, source })
    }

    pub fn capture(pattern: &str, index: usize) -> RewriteResult<Self> {
        Self::new(pattern, NameSource::CaptureIndex(index))
    }

    pub fn literal(pattern: &str, name: &str) -> RewriteResult<Self> {
        Self::new(pattern, NameSource::Literal(name.to_string()))
    }

    pub fn pattern(&self) -> &str {
        self.matcher.as_str()
    }

    pub fn source(&self) -> &NameSource {
        &self.source
    }

    /// Name for `memo` if this rule matches it.
    ///
    /// A memo ending in a single `\n` is retried without it, so `$` may
    /// match just before a final newline. A capture group that did not take
    /// part in the match yields an empty name.
    pub fn derive_name(&self, memo: &str) -> Option<String> {
        let caps = self
            .matcher
            .captures(memo)
            .or_else(|| memo.strip_suffix('\n').and_then(|m| self.matcher.captures(m)))?;
        let name = match &self.source {
            NameSource::CaptureIndex(index) => caps
                .get(*index)
                .map(|m| truncate_name(m.as_str()))
                .unwrap_or_default(),
            NameSource::Literal(name) => name.clone(),
        };
        Some(name)
    }
}

/// Cut to the first [`MAX_NAME_LEN`] characters.
pub fn truncate_name(name: &str) -> String {
    name.chars().take(MAX_NAME_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("short", "short")]
    #[case("", "")]
    #[case("CARDTRONICS C2SJ VSD38839 CARSON, CA", "CARDTRONICS C2SJ VSD38839 CARSO")]
    #[case("0123456789012345678901234567890", "0123456789012345678901234567890")]
    #[case("01234567890123456789012345678901", "0123456789012345678901234567890")]
    #[case("ÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉ", "ÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉ")]
    fn test_truncate_name(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(truncate_name(input), expected);
    }

    #[test]
    fn test_capture_rule_is_case_insensitive_search() {
        let rule = Rule::capture(r"withdrawal to", 0).unwrap();
        assert_eq!(
            rule.derive_name("Transfer: WITHDRAWAL TO Savings"),
            Some("WITHDRAWAL TO".to_string())
        );
    }

    #[test]
    fn test_anchored_rule_requires_prefix() {
        let rule = Rule::capture(r"^Prenote", 0).unwrap();
        assert_eq!(rule.derive_name("prenote 123"), Some("prenote".to_string()));
        assert_eq!(rule.derive_name("ACH Prenote"), None);
    }

    #[test]
    fn test_literal_ignores_match_content() {
        let rule = Rule::literal(r"^Monthly Interest Paid", "Capital One").unwrap();
        assert_eq!(
            rule.derive_name("MONTHLY INTEREST PAID for September, a very long memo text"),
            Some("Capital One".to_string())
        );
    }

    #[test]
    fn test_literal_is_not_truncated() {
        let long = "L".repeat(40);
        let rule = Rule::literal("x", &long).unwrap();
        assert_eq!(rule.derive_name("x"), Some(long));
    }

    #[test]
    fn test_capture_is_truncated() {
        let rule = Rule::capture(r"^Withdrawal from\s+(.*)$", 1).unwrap();
        let memo = format!("Withdrawal from {}", "B".repeat(50));
        assert_eq!(rule.derive_name(&memo), Some("B".repeat(31)));
    }

    #[rstest]
    #[case("Withdrawal from CHASE\n", Some("CHASE"))]
    #[case("Withdrawal from CHASE", Some("CHASE"))]
    #[case("Withdrawal from CHASE\n\n", None)]
    #[case("Withdrawal from CHASE\nEXTRA", None)]
    fn test_end_anchor_allows_one_final_newline(#[case] memo: &str, #[case] expected: Option<&str>) {
        let rule = Rule::capture(r"^Withdrawal from\s+(.*)$", 1).unwrap();
        assert_eq!(rule.derive_name(memo).as_deref(), expected);
    }

    #[test]
    fn test_non_participating_group_yields_empty_name() {
        let rule = Rule::capture(r"^Deposit( from .*)?", 1).unwrap();
        assert_eq!(rule.derive_name("Deposit"), Some(String::new()));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Rule::capture(r"(unclosed", 0).unwrap_err();
        assert!(matches!(err, RewriteError::InvalidRule { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn test_capture_index_out_of_range() {
        let err = Rule::capture(r"^Prenote", 1).unwrap_err();
        assert!(matches!(err, RewriteError::InvalidRuleTable(_)));
    }
}
