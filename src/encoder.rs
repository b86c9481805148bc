//! OFX 2.02 → OFX 1.02 re-encoding.
//!
//! The mutated tree is first printed as an OFX 2 document behind its
//! header, then re-parsed, then written in the SGML form: one tag per line,
//! aggregates closed, leaf elements left open. A leaf is an element that
//! carries text and no children; anything else is an aggregate.

use crate::errors::{RewriteError, RewriteResult};
use crate::xml::{Element, parse_str, pretty_print};

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;
pub const OFX_V2_HEADER: &str =
    r#"<?OFX OFXHEADER="200" VERSION="202" SECURITY="NONE" OLDFILEUID="NONE" NEWFILEUID="NONE"?>"#;

const OFX_V1_HEADER: &[(&str, &str)] = &[
    ("OFXHEADER", "100"),
    ("DATA", "OFXSGML"),
    ("VERSION", "102"),
    ("SECURITY", "NONE"),
    ("ENCODING", "USASCII"),
    ("CHARSET", "NONE"),
    ("COMPRESSION", "NONE"),
    ("OLDFILEUID", "NONE"),
    ("NEWFILEUID", "NONE"),
];

const ROOT_TAG: &str = "OFX";
const INDENT: &str = "  ";

/// The OFX 2.02 text: XML declaration, OFX processing instruction, then the
/// pretty-printed tree.
pub fn assemble_v2(root: &Element) -> RewriteResult<String> {
    let mut message = String::new();
    message.push_str(XML_DECLARATION);
    message.push('\n');
    message.push_str(OFX_V2_HEADER);
    message.push('\n');
    message.push_str(&pretty_print(root)?);
    Ok(message)
}

/// Encode `root` as an OFX 1.02 SGML document.
pub fn encode(root: &Element) -> RewriteResult<String> {
    let v2_message = assemble_v2(root)?;
    tracing::debug!("OFX 2 message:\n{}", v2_message);

    let reparsed = parse_str(&v2_message)
        .map_err(|e| RewriteError::EncodeFailed(format!("re-parsing OFX 2 message: {e}")))?;
    if reparsed.local_name() != ROOT_TAG {
        return Err(RewriteError::EncodeFailed(format!(
            "document root is <{}>, expected <{ROOT_TAG}>",
            reparsed.name
        )));
    }

    let mut out = v1_header();
    write_sgml(&mut out, &reparsed, 0);
    Ok(out)
}

/// `KEY:VALUE` header lines, CRLF-terminated, followed by the blank line
/// that separates header from body.
fn v1_header() -> String {
    let mut header = String::new();
    for (key, value) in OFX_V1_HEADER {
        header.push_str(key);
        header.push(':');
        header.push_str(value);
        header.push_str("\r\n");
    }
    header.push_str("\r\n");
    header
}

fn write_sgml(out: &mut String, element: &Element, depth: usize) {
    let indent = INDENT.repeat(depth);
    let tag = element.local_name();

    if let (true, Some(text)) = (element.is_leaf(), element.text.as_deref()) {
        out.push_str(&format!("{indent}<{tag}>{}\n", escape_sgml(text)));
        return;
    }

    out.push_str(&format!("{indent}<{tag}>\n"));
    for child in &element.children {
        write_sgml(out, child, depth + 1);
    }
    out.push_str(&format!("{indent}</{tag}>\n"));
}

fn escape_sgml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
