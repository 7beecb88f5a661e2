//! Service description (SCPD) fetching and parsing.

use quick_xml::events::Event;
use quick_xml::NsReader;
use tracing::warn;
use url::Url;

use crate::action::{Action, Argument, Direction};
use crate::error::{Result, UpnpError};
use crate::service::Service;
use crate::state_variable::{DataType, StateVariable};
use crate::xml;

const DESCRIPTION_NAMESPACE_URI: &[u8] = b"urn:schemas-upnp-org:service-1-0";
const ROOT_TAG: &[u8] = b"scpd";
const ACTION_TAG: &[u8] = b"action";
const NAME_TAG: &[u8] = b"name";
const ARGUMENT_TAG: &[u8] = b"argument";
const DIRECTION_TAG: &[u8] = b"direction";
const DIRECTION_IN: &str = "in";
const DIRECTION_OUT: &str = "out";
const RELATED_STATE_VARIABLE_TAG: &[u8] = b"relatedStateVariable";
const STATE_VARIABLE_TAG: &[u8] = b"stateVariable";
const DATA_TYPE_TAG: &[u8] = b"dataType";
const DEFAULT_VALUE_TAG: &[u8] = b"defaultValue";

/// Builds one [`Service`] from its control description document.
///
/// Seeded with the type, id and URLs captured from the device description;
/// [`detect`](Self::detect) adds the actions and state variables the SCPD
/// declares and produces the finished service.
#[derive(Debug)]
pub(crate) struct ServiceDescriptionFetcher {
    http: reqwest::Client,
    service_type: String,
    service_id: String,
    scpd_url: Option<Url>,
    control_url: Option<Url>,
    event_sub_url: Option<Url>,
    actions: Vec<Action>,
    state_variables: Vec<StateVariable>,
}

impl ServiceDescriptionFetcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            service_type: String::new(),
            service_id: String::new(),
            scpd_url: None,
            control_url: None,
            event_sub_url: None,
            actions: Vec::new(),
            state_variables: Vec::new(),
        }
    }

    pub fn service_type(&mut self, service_type: String) -> &mut Self {
        self.service_type = service_type;
        self
    }

    pub fn service_id(&mut self, service_id: String) -> &mut Self {
        self.service_id = service_id;
        self
    }

    pub fn scpd_url(&mut self, url: Url) -> &mut Self {
        self.scpd_url = Some(url);
        self
    }

    pub fn control_url(&mut self, url: Url) -> &mut Self {
        self.control_url = Some(url);
        self
    }

    pub fn event_sub_url(&mut self, url: Url) -> &mut Self {
        self.event_sub_url = Some(url);
        self
    }

    pub fn has_scpd_url(&self) -> bool {
        self.scpd_url.is_some()
    }

    /// Fetch and parse the control description, then produce the service.
    ///
    /// Every failure is logged and folded into a normal completion: the
    /// produced service simply has no actions. Failure is observable only
    /// as emptiness.
    ///
    /// # Panics
    ///
    /// Detection requires an SCPD URL; the description parser never spawns
    /// a fetch without one.
    pub async fn detect(mut self) -> Service {
        let url = self
            .scpd_url
            .clone()
            .expect("service detection requires an SCPD URL");

        match fetch_document(&self.http, &url).await {
            Ok(body) => {
                if let Err(error) = self.parse(&body) {
                    warn!("service description {} rejected: {}", url, error);
                }
            }
            Err(error) => warn!("service description fetch failed: {}", error),
        }

        self.build()
    }

    fn parse(&mut self, data: &str) -> Result<()> {
        enum ParserState {
            TopLevel,
            Action,
            Argument,
            StateVariable,
        }

        let mut reader = NsReader::from_str(data);
        let mut state = ParserState::TopLevel;

        let mut action_name = String::new();
        let mut action_arguments: Vec<Argument> = Vec::new();
        let mut argument_name = String::new();
        let mut argument_state_variable = String::new();
        // Carried across arguments: an unrecognized direction keeps the
        // previous value.
        let mut argument_direction = Direction::In;
        let mut variable_name = String::new();
        let mut variable_value: Option<String> = None;
        // Carried across state variables, like the argument direction.
        let mut variable_type = DataType::String;

        xml::expect_root(&mut reader, DESCRIPTION_NAMESPACE_URI, ROOT_TAG)?;

        // Element namespaces inside the document are not checked.
        loop {
            match reader.read_event().map_err(xml::parse_error)? {
                Event::Eof => break,
                Event::Start(e) => {
                    let tag = e.local_name();
                    match state {
                        ParserState::TopLevel => {
                            if tag.as_ref() == ACTION_TAG {
                                state = ParserState::Action;
                            } else if tag.as_ref() == STATE_VARIABLE_TAG {
                                variable_name.clear();
                                variable_value = None;
                                state = ParserState::StateVariable;
                            }
                        }
                        ParserState::Action => {
                            if tag.as_ref() == NAME_TAG {
                                action_name = xml::element_text(&mut reader)?;
                            } else if tag.as_ref() == ARGUMENT_TAG {
                                state = ParserState::Argument;
                            }
                        }
                        ParserState::Argument => {
                            if tag.as_ref() == NAME_TAG {
                                argument_name = xml::element_text(&mut reader)?;
                            } else if tag.as_ref() == RELATED_STATE_VARIABLE_TAG {
                                argument_state_variable = xml::element_text(&mut reader)?;
                            } else if tag.as_ref() == DIRECTION_TAG {
                                let text = xml::element_text(&mut reader)?;
                                if text == DIRECTION_IN {
                                    argument_direction = Direction::In;
                                } else if text == DIRECTION_OUT {
                                    argument_direction = Direction::Out;
                                }
                            }
                        }
                        ParserState::StateVariable => {
                            if tag.as_ref() == NAME_TAG {
                                variable_name = xml::element_text(&mut reader)?;
                            } else if tag.as_ref() == DATA_TYPE_TAG {
                                let text = xml::element_text(&mut reader)?;
                                match text.parse::<DataType>() {
                                    Ok(data_type) => variable_type = data_type,
                                    Err(error) => warn!("state variable {}: {}", variable_name, error),
                                }
                            } else if tag.as_ref() == DEFAULT_VALUE_TAG {
                                variable_value = Some(xml::element_text(&mut reader)?);
                            }
                        }
                    }
                }
                Event::End(e) => {
                    let tag = e.local_name();
                    match state {
                        ParserState::Action if tag.as_ref() == ACTION_TAG => {
                            self.actions.push(Action::new(
                                std::mem::take(&mut action_name),
                                std::mem::take(&mut action_arguments),
                            ));
                            state = ParserState::TopLevel;
                        }
                        ParserState::Argument if tag.as_ref() == ARGUMENT_TAG => {
                            action_arguments.push(Argument::new(
                                std::mem::take(&mut argument_name),
                                std::mem::take(&mut argument_state_variable),
                                argument_direction,
                            ));
                            state = ParserState::Action;
                        }
                        ParserState::StateVariable if tag.as_ref() == STATE_VARIABLE_TAG => {
                            self.state_variables.push(StateVariable::new(
                                std::mem::take(&mut variable_name),
                                variable_type,
                                variable_value.take(),
                            ));
                            state = ParserState::TopLevel;
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn build(self) -> Service {
        Service::new(
            self.service_type,
            self.service_id,
            self.scpd_url,
            self.control_url,
            self.event_sub_url,
            self.actions,
            self.state_variables,
            self.http,
        )
    }
}

async fn fetch_document(http: &reqwest::Client, url: &Url) -> Result<String> {
    let response = http
        .get(url.clone())
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| UpnpError::Network(format!("GET {} failed: {}", url, e)))?;

    response
        .text()
        .await
        .map_err(|e| UpnpError::Network(format!("reading {} failed: {}", url, e)))
}
