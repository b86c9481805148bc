//! Repair QFX/OFX exports that lack a payee `NAME` by deriving it from the
//! `MEMO` field, then re-encode them as OFX 1.02.
//!
//! ```rust,ignore
//! use qfx_name_from_memo::RewriteBuilder;
//!
//! let rewritten = RewriteBuilder::new()
//!     .content(&file_content)
//!     .rewrite()?;
//! ```

mod builder;

pub mod encoder;
pub mod engine;
pub mod errors;
pub mod qfx;
pub mod rules;
pub mod xml;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod logger;

pub use builder::{RewriteBuilder, Rewritten};
pub use engine::{Outcome, RewriteReport, UnmatchedPolicy, process_document, process_transaction};
pub use errors::{RewriteError, RewriteResult};
pub use qfx::TransactionInfo;
pub use rules::{MAX_NAME_LEN, NameSource, Rule, RuleTable};
