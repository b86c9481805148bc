use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::engine::{self, RewriteReport, UnmatchedPolicy};
use crate::errors::{RewriteError, RewriteResult};
use crate::rules::RuleTable;
use crate::{encoder, xml};

/// Result of an in-memory rewrite.
#[derive(Debug, Clone)]
pub struct Rewritten {
    /// The OFX 1.02 document.
    pub output: String,
    pub report: RewriteReport,
}

/// Configures and runs one load → extract → encode pass.
///
/// ```rust,ignore
/// use qfx_name_from_memo::RewriteBuilder;
///
/// let report = RewriteBuilder::new()
///     .input("2019-10-04_transaction_download.qfx")
///     .output("fixed.qfx")
///     .skip_unmatched(true)
///     .run()?;
/// ```
#[derive(Debug, Default)]
pub struct RewriteBuilder {
    content: Option<String>,
    source: Option<String>,
    output: Option<PathBuf>,
    rules: Option<RuleTable>,
    policy: UnmatchedPolicy,
}

impl RewriteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inline OFX 2 markup. Takes precedence over [`input`](Self::input).
    pub fn content(mut self, content: &str) -> Self {
        self.content = Some(content.to_string());
        self
    }

    /// File path or `http(s)://` URL to read the document from.
    pub fn input(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    /// Where [`run`](Self::run) writes the OFX 1.02 document.
    pub fn output(mut self, path: impl AsRef<Path>) -> Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }

    /// Replace the built-in rule table.
    pub fn rules(mut self, rules: RuleTable) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn policy(mut self, policy: UnmatchedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn skip_unmatched(self, skip: bool) -> Self {
        self.policy(if skip {
            UnmatchedPolicy::Skip
        } else {
            UnmatchedPolicy::Fail
        })
    }

    /// Rewrite and write to the configured [`output`](Self::output).
    pub fn run(mut self) -> RewriteResult<RewriteReport> {
        let output = self.output.take().ok_or(RewriteError::MissingOutput)?;
        self.write_to(output)
    }

    pub fn rewrite(self) -> RewriteResult<Rewritten> {
        let (mut root, namespaces) = match (self.content, self.source) {
            (Some(content), _) => (xml::parse_str(&content)?, xml::extract_namespaces(&content)),
            (None, Some(source)) => xml::load(&source)?,
            (None, None) => return Err(RewriteError::MissingInput),
        };
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!("doc: {}", xml::pretty_print(&root)?);
        }

        let rules = self.rules.unwrap_or_default();
        let report = engine::process_document(&mut root, &namespaces, &rules, self.policy)?;
        let output = encoder::encode(&root)?;

        Ok(Rewritten { output, report })
    }

    /// Rewrite, then write the result to `path`. Nothing is written unless
    /// every step succeeded.
    pub fn write_to(self, path: impl AsRef<Path>) -> RewriteResult<RewriteReport> {
        let path = path.as_ref();
        let Rewritten { output, report } = self.rewrite()?;

        let write_failed = |source: std::io::Error| RewriteError::WriteFailed {
            path: path.display().to_string(),
            source,
        };
        let mut file = File::create(path).map_err(write_failed)?;
        file.write_all(output.as_bytes()).map_err(write_failed)?;
        file.flush().map_err(write_failed)?;

        tracing::info!("Wrote {}", path.display());
        Ok(report)
    }
}
