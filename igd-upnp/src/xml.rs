//! Shared streaming-XML helpers for the description parsers.

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::error::{Result, UpnpError};

/// Advance to the document root element and verify namespace and name.
pub(crate) fn expect_root(
    reader: &mut NsReader<&[u8]>,
    namespace: &[u8],
    name: &[u8],
) -> Result<()> {
    loop {
        match reader.read_resolved_event().map_err(parse_error)? {
            (resolution, Event::Start(e)) => {
                let found: &[u8] = match &resolution {
                    ResolveResult::Bound(Namespace(ns)) => *ns,
                    _ => b"",
                };
                if found != namespace {
                    return Err(UpnpError::Parse(format!(
                        "wrong root element namespace: {}",
                        String::from_utf8_lossy(found)
                    )));
                }
                if e.local_name().as_ref() != name {
                    return Err(UpnpError::Parse(format!(
                        "wrong root element name: {}",
                        String::from_utf8_lossy(e.local_name().as_ref())
                    )));
                }
                return Ok(());
            }
            (_, Event::Eof) => {
                return Err(UpnpError::Parse("empty description document".to_string()))
            }
            _ => {}
        }
    }
}

/// Text content of the element whose start tag was just consumed, reading
/// through the matching end tag and swallowing any nested markup.
pub(crate) fn element_text(reader: &mut NsReader<&[u8]>) -> Result<String> {
    let mut depth = 0usize;
    let mut text = String::new();

    loop {
        match reader.read_event().map_err(parse_error)? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                if depth == 0 {
                    return Ok(text);
                }
                depth -= 1;
            }
            Event::Text(t) => {
                text.push_str(&t.unescape().map_err(parse_error)?);
            }
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c.into_inner())),
            Event::Eof => {
                return Err(UpnpError::Parse(
                    "unexpected end of document in element content".to_string(),
                ))
            }
            _ => {}
        }
    }
}

pub(crate) fn parse_error(e: quick_xml::Error) -> UpnpError {
    UpnpError::Parse(e.to_string())
}
