use thiserror::Error;

/// Errors raised while rewriting a statement export.
#[derive(Error, Debug)]
pub enum RewriteError {
    /// Input markup is not well formed (detail in the message)
    #[error("XML parse failed: {0}")]
    ParseFailed(String),

    /// Input file could not be read
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Input URL could not be fetched
    #[error("Failed to fetch {url}: {message}")]
    FetchFailed { url: String, message: String },

    /// Output file could not be written
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The builder was run with neither inline content nor an input source
    #[error("Content or input path is required")]
    MissingInput,

    /// `run` was called without an output path
    #[error("Output path is required")]
    MissingOutput,

    // ── Extraction ──────────────────────────────────────────────────────────

    /// No rule matched a transaction memo
    #[error("Unhandled transaction: {memo} (no match among {rules_evaluated} rules)")]
    UnmatchedMemo {
        memo: String,
        rules_evaluated: usize,
        fitid: Option<String>,
    },

    /// A transaction has neither a MEMO nor a NAME element
    #[error("Transaction has no MEMO element (FITID {})", .fitid.as_deref().unwrap_or("unknown"))]
    MissingMemo { fitid: Option<String> },

    #[error("Transaction has {count} MEMO elements, expected one")]
    DuplicateMemo { count: usize },

    // ── Rule table ──────────────────────────────────────────────────────────

    /// A rule pattern failed to compile
    #[error("Invalid rule pattern {pattern:?}: {source}")]
    InvalidRule {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A rule file is malformed or a rule is inconsistent
    #[error("Invalid rule table: {0}")]
    InvalidRuleTable(String),

    // ── Encoding ────────────────────────────────────────────────────────────

    /// The re-assembled OFX 2 document could not be re-parsed or converted
    #[error("Legacy encoding failed: {0}")]
    EncodeFailed(String),

    /// Date in a QFX/OFX transaction is malformed
    #[error("Invalid QFX/OFX date format")]
    QfxDateInvalidFormat,
}

impl From<quick_xml::Error> for RewriteError {
    fn from(err: quick_xml::Error) -> Self {
        RewriteError::ParseFailed(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for RewriteError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        RewriteError::ParseFailed(err.to_string())
    }
}

/// Convenience alias for results carrying [`RewriteError`]
pub type RewriteResult<T> = Result<T, RewriteError>;
