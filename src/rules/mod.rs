//! Ordered memo → name rules. The first matching rule wins.

mod config;
mod rule;

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

pub use rule::{MAX_NAME_LEN, NameSource, Rule, truncate_name};

use crate::errors::{RewriteError, RewriteResult};

// Safe expect: every pattern below is a literal covered by the tests.
static DEFAULT_RULES: LazyLock<RuleTable> = LazyLock::new(|| {
    let rules = [
        Rule::capture(
            r"^(?:Withdrawal\s+from|Debit\s+Card\s+Purchase\s+-|Deposit\s+from|ATM\s+Withdrawal\s+-|Digital\s+Card\s+Purchase\s+-|Miscellaneous)\s+(.*)$",
            1,
        ),
        Rule::literal(r"^Monthly Interest Paid", "Capital One"),
        Rule::capture(r"^Check\s+#\d+\s+Cashed", 0),
        Rule::capture(r"Check\s+Deposit\s+\(Mobile\)", 0),
        Rule::capture(r"^Prenote", 0),
        Rule::capture(r"360 Checking", 0),
        Rule::capture(r"(Zelle money|Money) (received from|sent to|returned).*", 0),
        Rule::capture(r"Withdrawal to", 0),
        Rule::capture(r"Checkbook Order", 0),
    ];
    RuleTable::new(
        rules
            .into_iter()
            .collect::<RewriteResult<Vec<_>>>()
            .expect("invalid built-in rule"),
    )
});

/// A rule match: which rule fired and the name it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub index: usize,
    pub name: String,
}

/// Ordered, immutable list of rules.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl Default for RuleTable {
    /// The built-in table for Capital One 360 exports.
    fn default() -> Self {
        DEFAULT_RULES.clone()
    }
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Parse a TOML rule file (`[[rules]]` entries with `pattern` and either
    /// `capture` or `name`).
    pub fn from_toml_str(content: &str) -> RewriteResult<Self> {
        config::parse_rule_file(content).map(Self::new)
    }

    pub fn load(path: impl AsRef<Path>) -> RewriteResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| RewriteError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_toml_str(&content)?;
        tracing::info!("Loaded {} rule(s) from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Evaluate rules in declaration order and return the first match.
    pub fn first_match(&self, memo: &str) -> Option<RuleMatch> {
        self.rules.iter().enumerate().find_map(|(index, rule)| {
            rule.derive_name(memo).map(|name| RuleMatch { index, name })
        })
    }
}
