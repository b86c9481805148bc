//! Document access: load markup into a mutable tree, query it, print it.

mod loader;
mod printer;
mod query;
mod tree;

pub use loader::{NamespaceMap, extract_namespaces, load, parse_str};
pub use printer::pretty_print;
pub use query::{Path, Step, query, query_all};
pub use tree::Element;

pub mod prelude {
    pub use super::{Element, NamespaceMap, Path};
}
