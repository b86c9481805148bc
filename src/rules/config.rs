use serde::Deserialize;

use super::rule::{NameSource, Rule};
use crate::errors::{RewriteError, RewriteResult};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RuleFile {
    #[serde(default)]
    pub(super) rules: Vec<RuleEntry>,
}

/// One `[[rules]]` entry; exactly one of `capture` / `name` must be set.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RuleEntry {
    pattern: String,
    #[serde(default)]
    capture: Option<usize>,
    #[serde(default)]
    name: Option<String>,
}

impl TryFrom<RuleEntry> for Rule {
    type Error = RewriteError;

    fn try_from(entry: RuleEntry) -> Result<Self, Self::Error> {
        let source = match (entry.capture, entry.name) {
            (Some(index), None) => NameSource::CaptureIndex(index),
            (None, Some(name)) => NameSource::Literal(name),
            (Some(_), Some(_)) => {
                return Err(RewriteError::InvalidRuleTable(format!(
                    "rule {:?} sets both `capture` and `name`",
                    entry.pattern
                )));
            }
            (None, None) => {
                return Err(RewriteError::InvalidRuleTable(format!(
                    "rule {:?} needs `capture` or `name`",
                    entry.pattern
                )));
            }
        };
        Rule::new(&entry.pattern, source)
    }
}

pub(super) fn parse_rule_file(content: &str) -> RewriteResult<Vec<Rule>> {
    let file: RuleFile =
        toml::from_str(content).map_err(|e| RewriteError::InvalidRuleTable(e.to_string()))?;
    file.rules.into_iter().map(Rule::try_from).collect()
}
