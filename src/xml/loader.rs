use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;

use super::tree::Element;
use crate::errors::{RewriteError, RewriteResult};

/// Namespace prefix → URI. Default namespaces are keyed `_`, `__`, ...
pub type NamespaceMap = BTreeMap<String, String>;

// Safe expect: compile-time literal.
static XMLNS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s+xmlns:?(\w*?)\s*=\s*['"](.*?)['"]"#).expect("invalid xmlns regex")
});

/// Load a document from inline markup, a URL or a file path.
///
/// `source` is treated as markup when it starts with `<` (this covers the
/// `<?xml` declaration too), as a URL when it starts with `http://` or
/// `https://`, and as a file path otherwise. The namespace map is read from
/// the raw text, not from the parsed tree.
pub fn load(source: &str) -> RewriteResult<(Element, NamespaceMap)> {
    let text = if source.starts_with('<') {
        Cow::Borrowed(source)
    } else {
        Cow::Owned(read_source(source)?)
    };

    let root = parse_str(&text)?;
    let namespaces = extract_namespaces(&text);
    tracing::debug!("Loaded <{}> with {} namespace(s)", root.name, namespaces.len());
    Ok((root, namespaces))
}

fn read_source(source: &str) -> RewriteResult<String> {
    if source.starts_with("http://") || source.starts_with("https://") {
        tracing::info!("Fetching {}", source);
        let fetch_failed = |message: String| RewriteError::FetchFailed {
            url: source.to_string(),
            message,
        };
        ureq::get(source)
            .call()
            .map_err(|e| fetch_failed(e.to_string()))?
            .into_string()
            .map_err(|e| fetch_failed(e.to_string()))
    } else {
        tracing::info!("Reading {}", source);
        fs::read_to_string(source).map_err(|source_err| RewriteError::ReadFailed {
            path: source.to_string(),
            source: source_err,
        })
    }
}

/// Scan raw text for `xmlns` / `xmlns:prefix` declarations.
///
/// Works on the text rather than the tree so that prefix bindings survive
/// regardless of how the parser treats them. Repeated default declarations
/// get the keys `_`, `__`, `___` in order of appearance.
pub fn extract_namespaces(text: &str) -> NamespaceMap {
    let mut namespaces = NamespaceMap::new();
    let mut default_count = 0;

    for caps in XMLNS_RE.captures_iter(text) {
        let prefix = &caps[1];
        let uri = caps[2].to_string();
        if prefix.is_empty() {
            default_count += 1;
            namespaces.insert("_".repeat(default_count), uri);
        } else {
            namespaces.insert(prefix.to_string(), uri);
        }
    }

    namespaces
}

/// Parse markup into an element tree.
///
/// Whitespace between elements is dropped; the text of a leaf element is
/// kept verbatim, whitespace-only text included.
pub fn parse_str(text: &str) -> RewriteResult<Element> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(start_element(&start)?),
            Event::Empty(start) => {
                let element = start_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let mut element = stack
                    .pop()
                    .ok_or_else(|| RewriteError::ParseFailed("unexpected closing tag".to_string()))?;
                settle_text(&mut element);
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(raw) => {
                let content = raw.unescape()?;
                // Whitespace around the root is not content.
                if !(stack.is_empty() && content.trim().is_empty()) {
                    append_text(&mut stack, &content)?;
                }
            }
            Event::CData(cdata) => {
                let bytes = cdata.into_inner();
                let content = std::str::from_utf8(&bytes)
                    .map_err(|e| RewriteError::ParseFailed(e.to_string()))?;
                append_text(&mut stack, content)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(RewriteError::ParseFailed(format!(
            "unclosed element <{}>",
            open.name
        )));
    }

    root.ok_or_else(|| RewriteError::ParseFailed("document has no root element".to_string()))
}

/// A closed element without children keeps its text verbatim, `<A></A>`
/// included as the empty string. Whitespace-only text in an element with
/// children is indentation and is dropped.
fn settle_text(element: &mut Element) {
    if element.children.is_empty() {
        element.text.get_or_insert_with(String::new);
    } else if element.text.as_deref().is_some_and(|t| t.trim().is_empty()) {
        element.text = None;
    }
}

fn start_element(start: &BytesStart<'_>) -> RewriteResult<Element> {
    let qname = start.name();
    let name = std::str::from_utf8(qname.as_ref())
        .map_err(|e| RewriteError::ParseFailed(e.to_string()))?;
    let mut element = Element::new(name);

    for attr in start.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| RewriteError::ParseFailed(e.to_string()))?
            .to_string();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> RewriteResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(RewriteError::ParseFailed(format!(
                "multiple root elements (<{}> after the root)",
                element.name
            )));
        }
    }
    Ok(())
}

fn append_text(stack: &mut [Element], content: &str) -> RewriteResult<()> {
    let parent = stack
        .last_mut()
        .ok_or_else(|| RewriteError::ParseFailed("text outside the root element".to_string()))?;
    parent.text.get_or_insert_with(String::new).push_str(content);
    Ok(())
}
