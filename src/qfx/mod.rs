//! Typed reading of OFX transaction nodes.

mod dto;
mod types;

pub use dto::TransactionInfo;
pub use types::QfxDate;
