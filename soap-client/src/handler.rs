//! Message body handlers for SOAP reply demultiplexing.
//!
//! A [`MessageBodyHandler`] consumes element start/end events from inside a
//! SOAP `Body`. Handlers are registered on a [`Request`](crate::Request)
//! under a namespace URI and receive only the elements carried in that
//! namespace (the empty string catches elements without a namespace, which
//! some embedded SOAP servers emit).

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::NsReader;

use crate::error::{Result, SoapError};

const RESPONSE_SUFFIX: &str = "Response";

/// Lazy cursor over the text content of the element being dispatched.
///
/// Reading the text consumes the element's subtree from the underlying
/// reader, so the dispatcher will not deliver a separate end event for a
/// consumed element. The text is cached: when several handlers match the
/// same element, each sees the same content.
pub struct ElementText<'r, 'x> {
    reader: Option<&'r mut NsReader<&'x [u8]>>,
    cached: Option<String>,
    consumed: bool,
}

impl<'r, 'x> ElementText<'r, 'x> {
    pub(crate) fn new(reader: &'r mut NsReader<&'x [u8]>) -> Self {
        Self {
            reader: Some(reader),
            cached: None,
            consumed: false,
        }
    }

    /// Cursor for a self-closing element, which has no content to read.
    pub(crate) fn empty() -> Self {
        Self {
            reader: None,
            cached: Some(String::new()),
            consumed: false,
        }
    }

    /// The text content of the current element.
    pub fn text(&mut self) -> Result<String> {
        if let Some(text) = &self.cached {
            return Ok(text.clone());
        }
        let text = match &mut self.reader {
            Some(reader) => read_text_to_end(reader)?,
            None => String::new(),
        };
        self.consumed = true;
        self.cached = Some(text.clone());
        Ok(text)
    }

    pub(crate) fn consumed(&self) -> bool {
        self.consumed
    }
}

/// Accumulates text until the end tag matching the already-consumed start
/// tag, swallowing any nested markup.
fn read_text_to_end(reader: &mut NsReader<&[u8]>) -> Result<String> {
    let mut depth = 0usize;
    let mut text = String::new();

    loop {
        match reader
            .read_event()
            .map_err(|e| SoapError::Parse(e.to_string()))?
        {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                if depth == 0 {
                    return Ok(text);
                }
                depth -= 1;
            }
            Event::Text(t) => {
                text.push_str(&t.unescape().map_err(|e| SoapError::Parse(e.to_string()))?);
            }
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c.into_inner())),
            Event::Eof => {
                return Err(SoapError::Parse(
                    "unexpected end of document in element content".to_string(),
                ))
            }
            _ => {}
        }
    }
}

/// Consumer of the elements inside a SOAP message body.
///
/// `start_message`/`end_message` bracket the dispatch of one full reply.
/// They are invoked once per registry entry, so a handler registered under
/// two namespace keys is bracketed twice per message and must finalize
/// idempotently.
pub trait MessageBodyHandler: Send {
    /// Called before any element of a reply is dispatched.
    fn start_message(&mut self) -> Result<()>;

    /// An element start inside the body. `tag` is the local name.
    fn start_element(&mut self, tag: &str, text: &mut ElementText<'_, '_>) -> Result<()>;

    /// An element end inside the body, unless the element's content was
    /// consumed through the [`ElementText`] cursor.
    fn end_element(&mut self, tag: &str) -> Result<()>;

    /// Called after the body has been fully dispatched.
    fn end_message(&mut self) -> Result<()>;
}

/// Callback invoked with the captured output arguments and the scalar
/// return value of an action reply (no UPnP action in scope produces one,
/// so it is always `None`).
pub type ActionCallback = Box<dyn FnMut(HashMap<String, String>, Option<String>) + Send>;

enum ParserState {
    Root,
    Response(String),
}

/// Generic handler for action replies.
///
/// The first element whose name ends in `"Response"` opens the message
/// scope; everything else is captured as a flat name → text map without any
/// action-specific validation. One callback fires per message, guarded
/// against double finalization when the handler is registered under more
/// than one namespace.
pub struct ActionResponseHandler {
    callback: ActionCallback,
    state: ParserState,
    output_arguments: HashMap<String, String>,
    finalized: bool,
}

impl ActionResponseHandler {
    pub fn new(callback: ActionCallback) -> Self {
        Self {
            callback,
            state: ParserState::Root,
            output_arguments: HashMap::new(),
            finalized: false,
        }
    }
}

impl MessageBodyHandler for ActionResponseHandler {
    fn start_message(&mut self) -> Result<()> {
        self.finalized = false;
        self.state = ParserState::Root;
        self.output_arguments.clear();

        Ok(())
    }

    fn start_element(&mut self, tag: &str, text: &mut ElementText<'_, '_>) -> Result<()> {
        match self.state {
            ParserState::Root if tag.ends_with(RESPONSE_SUFFIX) => {
                self.state = ParserState::Response(tag.to_owned());
            }
            _ => {
                let value = text.text()?;
                self.output_arguments.insert(tag.to_owned(), value);
            }
        }

        Ok(())
    }

    fn end_element(&mut self, tag: &str) -> Result<()> {
        if let ParserState::Response(wrapper) = &self.state {
            if tag == wrapper {
                self.state = ParserState::Root;
            }
        }

        Ok(())
    }

    fn end_message(&mut self) -> Result<()> {
        if !self.finalized {
            let arguments = std::mem::take(&mut self.output_arguments);
            (self.callback)(arguments, None);
            self.finalized = true;
        }

        Ok(())
    }
}
