//! Services and SOAP action invocation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use soap_client::{ActionResponseHandler, Request, SharedHandler};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use url::Url;

use crate::action::Action;
use crate::state_variable::StateVariable;

const UPNP_CONTROL_NAMESPACE_URI: &str = "urn:schemas-upnp-org:control-1-0";
const QUERY_STATE_VARIABLE_TAG: &str = "QueryStateVariable";
const VAR_NAME_TAG: &str = "varName";
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Immediate result of starting an action invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeActionResult {
    /// The request was dispatched; the outcome arrives as [`ActionInvoked`].
    Success,
    /// The service declares no action of that name; nothing was sent.
    InvalidAction,
    /// An invocation is already outstanding on this service; nothing was
    /// sent.
    PendingAction,
}

/// Completion event of an action invocation.
///
/// `return_value` mirrors the wire format's optional scalar result; the
/// gateway actions in scope never produce one, so it is always `None`.
#[derive(Debug, Clone)]
pub struct ActionInvoked {
    pub output_arguments: HashMap<String, String>,
    pub return_value: Option<String>,
}

/// A control service of a discovered device.
///
/// The descriptor part (type, id, URLs, actions, state variables) is
/// immutable; invocation state is internal. At most one action invocation
/// may be outstanding per service instance at a time.
#[derive(Debug)]
pub struct Service {
    service_type: String,
    id: String,
    scpd_url: Option<Url>,
    control_url: Option<Url>,
    event_sub_url: Option<Url>,
    actions: Vec<Action>,
    state_variables: Vec<StateVariable>,
    request: Request,
    invocation_pending: Arc<AtomicBool>,
    action_invoked: broadcast::Sender<ActionInvoked>,
}

impl Service {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        service_type: String,
        id: String,
        scpd_url: Option<Url>,
        control_url: Option<Url>,
        event_sub_url: Option<Url>,
        actions: Vec<Action>,
        state_variables: Vec<StateVariable>,
        http: reqwest::Client,
    ) -> Self {
        let invocation_pending = Arc::new(AtomicBool::new(false));
        let (action_invoked, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let pending = invocation_pending.clone();
        let events = action_invoked.clone();
        let handler: SharedHandler = Arc::new(Mutex::new(ActionResponseHandler::new(Box::new(
            move |output_arguments, return_value| {
                // The latch clears before the event fires so a subscriber
                // may immediately start the next invocation.
                pending.store(false, Ordering::SeqCst);
                let _ = events.send(ActionInvoked {
                    output_arguments,
                    return_value,
                });
            },
        ))));

        // Replies from gateways frequently omit the body element namespace,
        // so the handler listens on the service namespace and on none.
        let mut request = Request::with_client(http);
        request.add_message_handler(&service_type, handler.clone());
        request.add_message_handler("", handler);

        Self {
            service_type,
            id,
            scpd_url,
            control_url,
            event_sub_url,
            actions,
            state_variables,
            request,
            invocation_pending,
            action_invoked,
        }
    }

    /// Start an action invocation.
    ///
    /// Returns immediately; on [`InvokeActionResult::Success`] the SOAP
    /// request is dispatched on a background task and the reply arrives
    /// through [`Service::on_action_invoked`]. Input arguments are
    /// marshalled in the given order.
    ///
    /// Must be called within a Tokio runtime.
    pub fn invoke_action(
        &self,
        name: &str,
        input_arguments: &[(String, String)],
    ) -> InvokeActionResult {
        if self.invocation_pending.load(Ordering::SeqCst) {
            return InvokeActionResult::PendingAction;
        }

        if !self.actions.iter().any(|action| action.name() == name) {
            return InvokeActionResult::InvalidAction;
        }

        self.invocation_pending.store(true, Ordering::SeqCst);

        let soap_action = format!("{}#{}", self.service_type, name);
        let body = action_body(&self.service_type, name, input_arguments);
        self.post(soap_action, body);

        InvokeActionResult::Success
    }

    /// Query a single state variable's current value on the device.
    ///
    /// Fire-and-forget like `invoke_action`, but outside the invocation
    /// latch; the reply surfaces through [`Service::on_action_invoked`].
    pub fn query_state_variable(&self, name: &str) {
        let soap_action = format!("{}#{}", UPNP_CONTROL_NAMESPACE_URI, QUERY_STATE_VARIABLE_TAG);
        let body = query_body(name);

        debug!("querying state variable: {}", name);
        self.post(soap_action, body);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The service type URI.
    pub fn service_type_identifier(&self) -> &str {
        &self.service_type
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn state_variables(&self) -> &[StateVariable] {
        &self.state_variables
    }

    pub fn scpd_url(&self) -> Option<&Url> {
        self.scpd_url.as_ref()
    }

    pub fn control_url(&self) -> Option<&Url> {
        self.control_url.as_ref()
    }

    pub fn event_sub_url(&self) -> Option<&Url> {
        self.event_sub_url.as_ref()
    }

    /// Subscribe to invocation completion events.
    pub fn on_action_invoked(&self) -> broadcast::Receiver<ActionInvoked> {
        self.action_invoked.subscribe()
    }

    fn post(&self, soap_action: String, body: String) {
        let request = self.request.clone();
        let control_url = self.control_url.clone();
        let pending = self.invocation_pending.clone();

        tokio::spawn(async move {
            let Some(url) = control_url else {
                warn!("service has no control URL, dropping request");
                pending.store(false, Ordering::SeqCst);
                return;
            };
            if let Err(error) = request.send(&url, &soap_action, &body).await {
                // A failed transport produces no completion event; the
                // latch clears so the service stays usable.
                warn!("action request to {} failed: {}", url, error);
                pending.store(false, Ordering::SeqCst);
            }
        });
    }
}

/// Marshal one action call: an element named after the action in the
/// service type namespace, one text child per input argument.
fn action_body(service_type: &str, name: &str, input_arguments: &[(String, String)]) -> String {
    let mut writer = Writer::new(Vec::new());
    let mut element = BytesStart::new(name);
    element.push_attribute(("xmlns", service_type));

    // Writing into a Vec cannot fail.
    let _ = writer.write_event(Event::Start(element));
    for (argument, value) in input_arguments {
        let _ = writer.write_event(Event::Start(BytesStart::new(argument.as_str())));
        let _ = writer.write_event(Event::Text(BytesText::new(value)));
        let _ = writer.write_event(Event::End(BytesEnd::new(argument.as_str())));
    }
    let _ = writer.write_event(Event::End(BytesEnd::new(name)));

    String::from_utf8_lossy(&writer.into_inner()).into_owned()
}

fn query_body(variable_name: &str) -> String {
    let mut writer = Writer::new(Vec::new());
    let mut element = BytesStart::new(QUERY_STATE_VARIABLE_TAG);
    element.push_attribute(("xmlns", UPNP_CONTROL_NAMESPACE_URI));

    let _ = writer.write_event(Event::Start(element));
    let _ = writer.write_event(Event::Start(BytesStart::new(VAR_NAME_TAG)));
    let _ = writer.write_event(Event::Text(BytesText::new(variable_name)));
    let _ = writer.write_event(Event::End(BytesEnd::new(VAR_NAME_TAG)));
    let _ = writer.write_event(Event::End(BytesEnd::new(QUERY_STATE_VARIABLE_TAG)));

    String::from_utf8_lossy(&writer.into_inner()).into_owned()
}
