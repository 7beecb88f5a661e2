//! Private SOAP client for UPnP device communication
//!
//! This crate provides a minimal SOAP 1.2 client for talking to UPnP
//! control endpoints such as the ones an internet gateway exposes. A
//! request wraps an action body in the fixed envelope and posts it; the
//! reply is streamed through a registry of [`MessageBodyHandler`]s keyed by
//! element namespace, so the caller decides how each message body is
//! decoded without this crate knowing any action-specific schema.

mod error;
mod handler;

pub use error::{Result, SoapError};
pub use handler::{ActionCallback, ActionResponseHandler, ElementText, MessageBodyHandler};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use tracing::debug;
use url::Url;

const SOAPACTION_HEADER: &str = "SOAPACTION";
const CONTENT_TYPE: &str = "text/xml; charset=\"utf-8\"";
const ENVELOPE_NAMESPACE_URI: &[u8] = b"http://www.w3.org/2003/05/soap-envelope";
const ENVELOPE_BEGIN: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" ?><s:Envelope xmlns:s=\"http://www.w3.org/2003/05/soap-envelope\"><s:Body>";
const ENVELOPE_END: &str = "</s:Body></s:Envelope>";
const ENVELOPE_TAG: &[u8] = b"Envelope";
const HEADER_TAG: &[u8] = b"Header";
const BODY_TAG: &[u8] = b"Body";

/// A message body handler shared with the reply dispatcher.
pub type SharedHandler = Arc<Mutex<dyn MessageBodyHandler>>;

/// A SOAP request endpoint with streaming reply demultiplexing.
///
/// Cloning is cheap: clones share the HTTP connection pool and the
/// registered handlers.
#[derive(Clone)]
pub struct Request {
    http: reqwest::Client,
    message_body_handlers: Vec<(String, SharedHandler)>,
}

impl Request {
    /// Create a request endpoint with a default HTTP client.
    ///
    /// The default client uses a 10 second request timeout and tolerates
    /// the self-signed certificates gateways present on their TLS ports.
    pub fn new() -> Self {
        Self::with_client(default_client())
    }

    /// Create a request endpoint using an already configured HTTP client.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self {
            http,
            message_body_handlers: Vec::new(),
        }
    }

    /// Register a handler for body elements in `namespace_uri`.
    ///
    /// The empty namespace catches elements without any namespace. The same
    /// handler may be registered under several namespaces; it is bracketed
    /// with `start_message`/`end_message` once per registration.
    pub fn add_message_handler(&mut self, namespace_uri: &str, handler: SharedHandler) {
        self.message_body_handlers
            .push((namespace_uri.to_owned(), handler));
    }

    /// Send one SOAP request and dispatch the reply body.
    ///
    /// `action` goes out verbatim in the `SOAPACTION` header. A transport
    /// failure is reported as [`SoapError::Network`] and no handler runs.
    /// HTTP error statuses are not treated as failures: SOAP faults arrive
    /// as status 500 with a regular envelope body.
    pub async fn send(&self, url: &Url, action: &str, body_text: &str) -> Result<()> {
        let request_text = envelope(body_text);

        let response = self
            .http
            .post(url.clone())
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .header(SOAPACTION_HEADER, action)
            .body(request_text)
            .send()
            .await
            .map_err(|e| SoapError::Network(format!("POST {} failed: {}", url, e)))?;

        let reply = response
            .text()
            .await
            .map_err(|e| SoapError::Network(format!("reading reply from {} failed: {}", url, e)))?;

        self.parse_reply(&reply)
    }

    /// Parse a reply envelope and dispatch its body through the handler
    /// registry.
    pub(crate) fn parse_reply(&self, data: &str) -> Result<()> {
        let mut reader = NsReader::from_str(data);

        // Locate the document root and verify it is a SOAP envelope.
        loop {
            match reader.read_resolved_event().map_err(parse_error)? {
                (resolution, Event::Start(e)) => {
                    if namespace_of(&resolution) != ENVELOPE_NAMESPACE_URI {
                        return Err(SoapError::Parse(format!(
                            "wrong reply root element namespace: {:?}",
                            String::from_utf8_lossy(namespace_of(&resolution))
                        )));
                    }
                    if e.local_name().as_ref() != ENVELOPE_TAG {
                        return Err(SoapError::Parse(format!(
                            "wrong reply root element name: {}",
                            String::from_utf8_lossy(e.local_name().as_ref())
                        )));
                    }
                    break;
                }
                (_, Event::Eof) => {
                    return Err(SoapError::Parse("empty reply document".to_string()))
                }
                _ => {}
            }
        }

        // Scan the envelope: skip an optional header, dispatch the body.
        loop {
            match reader.read_resolved_event().map_err(parse_error)? {
                (_, Event::Start(e)) if e.local_name().as_ref() == HEADER_TAG => {
                    skip_subtree(&mut reader)?;
                }
                (_, Event::Start(e)) if e.local_name().as_ref() == BODY_TAG => {
                    return self.dispatch_body(&mut reader);
                }
                (_, Event::Empty(e)) if e.local_name().as_ref() == BODY_TAG => {
                    self.start_message()?;
                    return self.end_message();
                }
                (_, Event::Eof) => {
                    debug!("reply envelope carries no body");
                    return Ok(());
                }
                _ => {}
            }
        }
    }

    fn dispatch_body(&self, reader: &mut NsReader<&[u8]>) -> Result<()> {
        self.start_message()?;

        // Nesting depth of unconsumed elements below the body element; the
        // end tag seen at depth zero is the body's own.
        let mut depth = 0usize;

        loop {
            match reader.read_resolved_event().map_err(parse_error)? {
                (resolution, Event::Start(e)) => {
                    let namespace = namespace_of(&resolution).to_vec();
                    let tag = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();

                    let mut text = ElementText::new(reader);
                    for (key, handler) in &self.message_body_handlers {
                        if key.as_bytes() == namespace.as_slice() {
                            handler.lock().start_element(&tag, &mut text)?;
                        }
                    }
                    if !text.consumed() {
                        depth += 1;
                    }
                }
                (resolution, Event::Empty(e)) => {
                    let namespace = namespace_of(&resolution).to_vec();
                    let tag = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();

                    for (key, handler) in &self.message_body_handlers {
                        if key.as_bytes() == namespace.as_slice() {
                            let mut handler = handler.lock();
                            handler.start_element(&tag, &mut ElementText::empty())?;
                            handler.end_element(&tag)?;
                        }
                    }
                }
                (resolution, Event::End(e)) => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;

                    let namespace = namespace_of(&resolution).to_vec();
                    let tag = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();

                    for (key, handler) in &self.message_body_handlers {
                        if key.as_bytes() == namespace.as_slice() {
                            handler.lock().end_element(&tag)?;
                        }
                    }
                }
                (_, Event::Eof) => {
                    return Err(SoapError::Parse(
                        "unexpected end of document in message body".to_string(),
                    ))
                }
                _ => {}
            }
        }

        self.end_message()
    }

    fn start_message(&self) -> Result<()> {
        for (_, handler) in &self.message_body_handlers {
            handler.lock().start_message()?;
        }

        Ok(())
    }

    fn end_message(&self) -> Result<()> {
        for (_, handler) in &self.message_body_handlers {
            handler.lock().end_message()?;
        }

        Ok(())
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("handlers", &self.message_body_handlers.len())
            .finish_non_exhaustive()
    }
}

fn default_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .danger_accept_invalid_certs(true)
        .build()
        .unwrap_or_default()
}

fn envelope(body_text: &str) -> String {
    let mut request_text =
        String::with_capacity(ENVELOPE_BEGIN.len() + body_text.len() + ENVELOPE_END.len());
    request_text.push_str(ENVELOPE_BEGIN);
    request_text.push_str(body_text);
    request_text.push_str(ENVELOPE_END);
    request_text
}

fn namespace_of<'a>(resolution: &'a ResolveResult<'_>) -> &'a [u8] {
    match resolution {
        ResolveResult::Bound(Namespace(namespace)) => *namespace,
        _ => b"",
    }
}

fn skip_subtree(reader: &mut NsReader<&[u8]>) -> Result<()> {
    let mut depth = 0usize;

    loop {
        match reader.read_event().map_err(parse_error)? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                if depth == 0 {
                    return Ok(());
                }
                depth -= 1;
            }
            Event::Eof => {
                return Err(SoapError::Parse(
                    "unexpected end of document in envelope header".to_string(),
                ))
            }
            _ => {}
        }
    }
}

fn parse_error(e: quick_xml::Error) -> SoapError {
    SoapError::Parse(e.to_string())
}
