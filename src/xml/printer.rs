use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use super::tree::Element;
use crate::errors::{RewriteError, RewriteResult};

const INDENT: usize = 2;

/// Serialize a subtree with two-space indentation and a trailing newline.
///
/// Output depends only on the tree, so identical trees print identically.
pub fn pretty_print(element: &Element) -> RewriteResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);
    write_element(&mut writer, element)?;

    let mut out = String::from_utf8(writer.into_inner())
        .map_err(|e| RewriteError::EncodeFailed(e.to_string()))?;
    out.push('\n');
    Ok(out)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> RewriteResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.text.is_none() && element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = &element.text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
