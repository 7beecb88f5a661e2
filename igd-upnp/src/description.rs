//! Device description parsing and tree assembly.
//!
//! One description document can declare arbitrarily nested `<device>`
//! blocks and any number of `<service>` blocks per device. Parsing builds
//! an arena of device builders and registers one service-description fetch
//! per service block; the fetches then run concurrently and completion
//! cascades bottom-up through the arena until the root devices freeze.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use quick_xml::events::Event;
use quick_xml::NsReader;
use tracing::{debug, warn};
use url::Url;

use crate::device::{Device, DeviceBuilder};
use crate::error::{Result, UpnpError};
use crate::scpd::ServiceDescriptionFetcher;
use crate::service::Service;
use crate::xml;

const DESCRIPTION_NAMESPACE_URI: &[u8] = b"urn:schemas-upnp-org:device-1-0";
const ROOT_TAG: &[u8] = b"root";
const DEVICE_TAG: &[u8] = b"device";
const DEVICETYPE_TAG: &[u8] = b"deviceType";
const FRIENDLYNAME_TAG: &[u8] = b"friendlyName";
const MANUFACTURER_TAG: &[u8] = b"manufacturer";
const MANUFACTURERURL_TAG: &[u8] = b"manufacturerURL";
const MODELDESCRIPTION_TAG: &[u8] = b"modelDescription";
const MODELNAME_TAG: &[u8] = b"modelName";
const MODELNUMBER_TAG: &[u8] = b"modelNumber";
const MODELURL_TAG: &[u8] = b"modelURL";
const SERIALNUMBER_TAG: &[u8] = b"serialNumber";
const UDN_TAG: &[u8] = b"UDN";
const UPC_TAG: &[u8] = b"UPC";
const SERVICE_TAG: &[u8] = b"service";
const SERVICETYPE_TAG: &[u8] = b"serviceType";
const SERVICEID_TAG: &[u8] = b"serviceId";
const SCPDURL_TAG: &[u8] = b"SCPDURL";
const CONTROLURL_TAG: &[u8] = b"controlURL";
const EVENTSUBURL_TAG: &[u8] = b"eventSubURL";

/// Index of a device builder in the pool arena.
pub(crate) type BuilderId = usize;

#[derive(Debug)]
struct BuilderNode {
    /// `None` once the builder has finalized; doubles as the done latch.
    builder: Option<DeviceBuilder>,
    parent: Option<BuilderId>,
    /// Spawned children (nested device builders and service fetches) that
    /// have not reported completion yet.
    pending_children: usize,
    /// This builder's slice of the document has been fully parsed.
    parse_done: bool,
}

/// Pool of in-progress device builders for one description document.
///
/// A builder finalizes exactly once, when its own parse has finished *and*
/// every spawned child has reported back, in whatever order those signals
/// arrive. Completion cascades: a finished child is absorbed by its parent
/// and decrements the parent's pending count; a finished root is frozen,
/// back-linked and queued for the caller.
#[derive(Debug, Default)]
pub(crate) struct BuilderPool {
    nodes: Vec<BuilderNode>,
    finished: Vec<Arc<Device>>,
}

impl BuilderPool {
    /// Add a builder under `parent` (or as a root) and return its id.
    pub fn push(&mut self, parent: Option<BuilderId>) -> BuilderId {
        if let Some(parent) = parent {
            self.nodes[parent].pending_children += 1;
        }
        self.nodes.push(BuilderNode {
            builder: Some(DeviceBuilder::new()),
            parent,
            pending_children: 0,
            parse_done: false,
        });
        self.nodes.len() - 1
    }

    /// The builder under construction. Only valid before finalization,
    /// which the parser and the cascade guarantee by construction.
    pub fn builder_mut(&mut self, id: BuilderId) -> &mut DeviceBuilder {
        self.nodes[id]
            .builder
            .as_mut()
            .expect("builder accessed after finalization")
    }

    /// Record one spawned service fetch for `id`.
    pub fn add_service_fetch(&mut self, id: BuilderId) {
        self.nodes[id].pending_children += 1;
    }

    /// Signal that `id`'s slice of the document has been fully parsed.
    pub fn finish_parse(&mut self, id: BuilderId) {
        self.nodes[id].parse_done = true;
        self.check_finished(id);
    }

    /// Signal that a service fetch spawned for `id` completed.
    ///
    /// The service is attached regardless of how detection went: a failed
    /// fetch produces an empty service, not a missing one.
    pub fn service_finished(&mut self, id: BuilderId, service: Service) {
        let node = &mut self.nodes[id];
        let Some(builder) = node.builder.as_mut() else {
            debug!("service completion for an already finalized device");
            return;
        };
        builder.add_service(service);
        node.pending_children = node.pending_children.saturating_sub(1);
        self.check_finished(id);
    }

    /// Devices finalized since the last call, in completion order.
    pub fn take_finished(&mut self) -> Vec<Arc<Device>> {
        std::mem::take(&mut self.finished)
    }

    /// True while any builder has not finalized.
    pub fn has_open_builders(&self) -> bool {
        self.nodes.iter().any(|node| node.builder.is_some())
    }

    fn check_finished(&mut self, id: BuilderId) {
        let mut current = id;
        loop {
            if !self.nodes[current].parse_done || self.nodes[current].pending_children != 0 {
                return;
            }
            let Some(builder) = self.nodes[current].builder.take() else {
                // Already finalized once.
                return;
            };
            let device = Arc::new(builder.build());

            match self.nodes[current].parent {
                Some(parent) => {
                    if let Some(parent_builder) = self.nodes[parent].builder.as_mut() {
                        parent_builder.add_child(device);
                    }
                    self.nodes[parent].pending_children =
                        self.nodes[parent].pending_children.saturating_sub(1);
                    current = parent;
                }
                None => {
                    Device::link_tree(&device);
                    self.finished.push(device);
                    return;
                }
            }
        }
    }
}

/// One service fetch registered during parsing, bound to the builder that
/// will absorb its service.
#[derive(Debug)]
pub(crate) struct PendingServiceFetch {
    pub builder: BuilderId,
    pub fetcher: ServiceDescriptionFetcher,
}

#[derive(Debug)]
pub(crate) struct ParsedDescription {
    pub pool: BuilderPool,
    pub service_fetches: Vec<PendingServiceFetch>,
}

/// Resolve a URL found in a description document against the authority and
/// scheme the description itself was fetched from. An absolute URL in the
/// document keeps only its path and query.
pub(crate) fn resolve_against_base(base: &Url, text: &str) -> Option<Url> {
    match Url::parse(text) {
        Ok(absolute) => {
            let mut url = base.clone();
            url.set_path(absolute.path());
            url.set_query(absolute.query());
            Some(url)
        }
        Err(_) => base.join(text).ok(),
    }
}

/// Streaming parse of one device description document.
///
/// Builds the arena and registers the service fetches; nothing touches the
/// network here. Builders whose subtree declares no services finalize
/// during the parse and are already queued on the returned pool.
pub(crate) fn parse_device_description(
    data: &str,
    base_url: &Url,
    http: &reqwest::Client,
) -> Result<ParsedDescription> {
    enum ParserState {
        TopLevel,
        Device,
        Service,
    }

    let mut reader = NsReader::from_str(data);
    let mut pool = BuilderPool::default();
    let mut service_fetches = Vec::new();
    let mut device_stack: Vec<BuilderId> = Vec::new();
    let mut state = ParserState::TopLevel;
    let mut service: Option<ServiceDescriptionFetcher> = None;

    xml::expect_root(&mut reader, DESCRIPTION_NAMESPACE_URI, ROOT_TAG)?;

    // Element namespaces inside the document are not checked.
    loop {
        match reader.read_event().map_err(xml::parse_error)? {
            Event::Eof => break,
            Event::Start(e) => {
                let tag = e.local_name();
                match state {
                    ParserState::TopLevel => {
                        if tag.as_ref() == DEVICE_TAG {
                            let id = pool.push(None);
                            device_stack.push(id);
                            state = ParserState::Device;
                        }
                    }
                    ParserState::Device => {
                        let Some(&top) = device_stack.last() else {
                            continue;
                        };
                        if tag.as_ref() == DEVICETYPE_TAG {
                            let text = xml::element_text(&mut reader)?;
                            pool.builder_mut(top).device_type(text);
                        } else if tag.as_ref() == FRIENDLYNAME_TAG {
                            let text = xml::element_text(&mut reader)?;
                            pool.builder_mut(top).friendly_name(text);
                        } else if tag.as_ref() == MANUFACTURER_TAG {
                            let text = xml::element_text(&mut reader)?;
                            pool.builder_mut(top).manufacturer_name(text);
                        } else if tag.as_ref() == MANUFACTURERURL_TAG {
                            let text = xml::element_text(&mut reader)?;
                            pool.builder_mut(top).manufacturer_url(text);
                        } else if tag.as_ref() == MODELDESCRIPTION_TAG {
                            let text = xml::element_text(&mut reader)?;
                            pool.builder_mut(top).description(text);
                        } else if tag.as_ref() == MODELNAME_TAG {
                            let text = xml::element_text(&mut reader)?;
                            pool.builder_mut(top).model_name(text);
                        } else if tag.as_ref() == MODELNUMBER_TAG {
                            let text = xml::element_text(&mut reader)?;
                            pool.builder_mut(top).model_number(text);
                        } else if tag.as_ref() == MODELURL_TAG {
                            let text = xml::element_text(&mut reader)?;
                            pool.builder_mut(top).model_url(text);
                        } else if tag.as_ref() == SERIALNUMBER_TAG {
                            let text = xml::element_text(&mut reader)?;
                            pool.builder_mut(top).serial_number(text);
                        } else if tag.as_ref() == UDN_TAG {
                            let text = xml::element_text(&mut reader)?;
                            pool.builder_mut(top).unique_device_name(text);
                        } else if tag.as_ref() == UPC_TAG {
                            let text = xml::element_text(&mut reader)?;
                            pool.builder_mut(top).upc(text);
                        } else if tag.as_ref() == SERVICE_TAG {
                            service = Some(ServiceDescriptionFetcher::new(http.clone()));
                            state = ParserState::Service;
                        } else if tag.as_ref() == DEVICE_TAG {
                            let id = pool.push(Some(top));
                            device_stack.push(id);
                        }
                    }
                    ParserState::Service => {
                        let Some(fetcher) = service.as_mut() else {
                            continue;
                        };
                        if tag.as_ref() == SERVICETYPE_TAG {
                            let text = xml::element_text(&mut reader)?;
                            fetcher.service_type(text);
                        } else if tag.as_ref() == SERVICEID_TAG {
                            let text = xml::element_text(&mut reader)?;
                            fetcher.service_id(text);
                        } else if tag.as_ref() == SCPDURL_TAG {
                            let text = xml::element_text(&mut reader)?;
                            if let Some(url) = resolve_against_base(base_url, &text) {
                                fetcher.scpd_url(url);
                            }
                        } else if tag.as_ref() == CONTROLURL_TAG {
                            let text = xml::element_text(&mut reader)?;
                            if let Some(url) = resolve_against_base(base_url, &text) {
                                fetcher.control_url(url);
                            }
                        } else if tag.as_ref() == EVENTSUBURL_TAG {
                            let text = xml::element_text(&mut reader)?;
                            if let Some(url) = resolve_against_base(base_url, &text) {
                                fetcher.event_sub_url(url);
                            }
                        } else {
                            debug!(
                                "unhandled service tag: {}",
                                String::from_utf8_lossy(tag.as_ref())
                            );
                        }
                    }
                }
            }
            Event::End(e) => {
                let tag = e.local_name();
                match state {
                    ParserState::Device if tag.as_ref() == DEVICE_TAG => {
                        if let Some(id) = device_stack.pop() {
                            pool.finish_parse(id);
                        }
                        if device_stack.is_empty() {
                            state = ParserState::TopLevel;
                        }
                    }
                    ParserState::Service if tag.as_ref() == SERVICE_TAG => {
                        if let Some(fetcher) = service.take() {
                            match device_stack.last() {
                                Some(&top) if fetcher.has_scpd_url() => {
                                    pool.add_service_fetch(top);
                                    service_fetches.push(PendingServiceFetch {
                                        builder: top,
                                        fetcher,
                                    });
                                }
                                Some(_) => {
                                    warn!("service block without a usable SCPD URL, skipped")
                                }
                                None => {}
                            }
                        }
                        state = ParserState::Device;
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    Ok(ParsedDescription {
        pool,
        service_fetches,
    })
}

/// Fetches one device description document and assembles its device trees.
pub(crate) struct DeviceDescriptionFetcher {
    http: reqwest::Client,
    base_url: Url,
}

impl DeviceDescriptionFetcher {
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Fetch the document at `url`, then assemble and emit each root
    /// device as it completes. Failures are logged and fold into an empty
    /// run.
    pub async fn run(
        &self,
        url: &Url,
        cancelled: &AtomicBool,
        emit: &mut (dyn FnMut(Arc<Device>) + Send),
    ) {
        let body = match fetch_document(&self.http, url).await {
            Ok(body) => body,
            Err(error) => {
                warn!("device description fetch failed: {}", error);
                return;
            }
        };
        self.assemble(&body, cancelled, emit).await;
    }

    /// Parse an already fetched document and drive the spawned service
    /// detections until every builder has settled.
    pub(crate) async fn assemble(
        &self,
        body: &str,
        cancelled: &AtomicBool,
        emit: &mut (dyn FnMut(Arc<Device>) + Send),
    ) {
        let parsed = match parse_device_description(body, &self.base_url, &self.http) {
            Ok(parsed) => parsed,
            Err(error) => {
                warn!("device description rejected: {}", error);
                return;
            }
        };
        let ParsedDescription {
            mut pool,
            service_fetches,
        } = parsed;

        // Service-less trees settled during the parse.
        for device in pool.take_finished() {
            emit(device);
        }

        let mut detections: FuturesUnordered<_> = service_fetches
            .into_iter()
            .map(|fetch| async move {
                let PendingServiceFetch { builder, fetcher } = fetch;
                (builder, fetcher.detect().await)
            })
            .collect();

        while let Some((builder, service)) = detections.next().await {
            if cancelled.load(Ordering::SeqCst) {
                debug!("discovery cancelled, dropping remaining service detections");
                return;
            }
            pool.service_finished(builder, service);
            for device in pool.take_finished() {
                emit(device);
            }
        }

        if pool.has_open_builders() {
            warn!("description document left unfinished device builders");
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn base() -> Url {
        Url::parse("https://fritz.box:49443/").unwrap()
    }

    fn http() -> reqwest::Client {
        reqwest::Client::new()
    }

    fn sample_service(id: &str) -> Service {
        Service::new(
            "urn:schemas-upnp-org:service:WANCommonInterfaceConfig:1".to_string(),
            id.to_string(),
            None,
            None,
            None,
            Vec::new(),
            Vec::new(),
            http(),
        )
    }

    const TWO_LEVEL_DESCRIPTION: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <device>
    <deviceType>urn:schemas-upnp-org:device:InternetGatewayDevice:1</deviceType>
    <friendlyName>FRITZ!Box 7590</friendlyName>
    <manufacturer>AVM Berlin</manufacturer>
    <manufacturerURL>http://www.avm.de</manufacturerURL>
    <modelDescription>FRITZ!Box 7590</modelDescription>
    <modelName>FRITZ!Box 7590</modelName>
    <modelNumber>avm</modelNumber>
    <modelURL>http://www.avm.de</modelURL>
    <serialNumber>1234567890AB</serialNumber>
    <UDN>uuid:75802409-bccb-40e7-8e6c-989BCB2B93B0</UDN>
    <UPC>AVM IGD</UPC>
    <serviceList>
      <service>
        <serviceType>urn:schemas-any-com:service:Any:1</serviceType>
        <serviceId>urn:any-com:serviceId:any1</serviceId>
        <controlURL>/igdupnp/control/any</controlURL>
        <eventSubURL>/igdupnp/control/any</eventSubURL>
        <SCPDURL>/any.xml</SCPDURL>
      </service>
    </serviceList>
    <deviceList>
      <device>
        <deviceType>urn:schemas-upnp-org:device:WANDevice:1</deviceType>
        <friendlyName>WANDevice - FRITZ!Box 7590</friendlyName>
        <manufacturer>AVM Berlin</manufacturer>
        <UDN>uuid:76802409-bccb-40e7-8e6c-989BCB2B93B0</UDN>
        <serviceList>
          <service>
            <serviceType>urn:schemas-upnp-org:service:WANCommonInterfaceConfig:1</serviceType>
            <serviceId>urn:upnp-org:serviceId:WANCommonIFC1</serviceId>
            <controlURL>/igdupnp/control/WANCommonIFC1</controlURL>
            <eventSubURL>/igdupnp/control/WANCommonIFC1</eventSubURL>
            <SCPDURL>/igdicfgSCPD.xml</SCPDURL>
          </service>
        </serviceList>
      </device>
    </deviceList>
  </device>
</root>"#;

    #[test]
    fn parse_builds_the_expected_arena() {
        let parsed =
            parse_device_description(TWO_LEVEL_DESCRIPTION, &base(), &http()).unwrap();

        // One root, one embedded device, one service fetch each.
        assert_eq!(parsed.service_fetches.len(), 2);
        assert_eq!(parsed.service_fetches[0].builder, 0);
        assert_eq!(parsed.service_fetches[1].builder, 1);
        assert!(parsed.pool.has_open_builders());
    }

    #[rstest]
    #[case::child_service_first(true)]
    #[case::root_service_first(false)]
    fn tree_settles_in_either_completion_order(#[case] child_first: bool) {
        let ParsedDescription {
            mut pool,
            service_fetches,
        } = parse_device_description(TWO_LEVEL_DESCRIPTION, &base(), &http()).unwrap();

        let root_fetch = service_fetches[0].builder;
        let child_fetch = service_fetches[1].builder;
        assert!(pool.take_finished().is_empty());

        let (first, second) = if child_first {
            (child_fetch, root_fetch)
        } else {
            (root_fetch, child_fetch)
        };

        pool.service_finished(first, sample_service("first"));
        assert!(pool.take_finished().is_empty());

        pool.service_finished(second, sample_service("second"));
        let finished = pool.take_finished();
        assert_eq!(finished.len(), 1);

        let root = &finished[0];
        assert_eq!(root.friendly_name(), "FRITZ!Box 7590");
        assert_eq!(root.manufacturer_name(), "AVM Berlin");
        assert_eq!(
            root.unique_device_name(),
            "uuid:75802409-bccb-40e7-8e6c-989BCB2B93B0"
        );
        assert_eq!(root.upc(), "AVM IGD");
        assert_eq!(root.services().len(), 1);
        assert_eq!(root.children().len(), 1);

        let child = &root.children()[0];
        assert_eq!(child.friendly_name(), "WANDevice - FRITZ!Box 7590");
        assert_eq!(child.services().len(), 1);
        assert!(child.parent_device().is_some());
        assert!(Arc::ptr_eq(&child.root_device().unwrap(), root));
    }

    #[test]
    fn finalization_is_idempotent_and_order_independent() {
        // A root with two pending service fetches: every interleaving of
        // the parse-done signal with the two completions finalizes exactly
        // once.
        let orders: [[u8; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];

        for order in orders {
            let mut pool = BuilderPool::default();
            let root = pool.push(None);
            pool.builder_mut(root).friendly_name("root".to_string());
            pool.add_service_fetch(root);
            pool.add_service_fetch(root);

            let mut finished = Vec::new();
            for signal in order {
                match signal {
                    0 => pool.finish_parse(root),
                    1 => pool.service_finished(root, sample_service("a")),
                    _ => pool.service_finished(root, sample_service("b")),
                }
                finished.extend(pool.take_finished());
            }

            assert_eq!(finished.len(), 1, "order {:?}", order);
            assert_eq!(finished[0].services().len(), 2, "order {:?}", order);
            assert!(!pool.has_open_builders(), "order {:?}", order);
        }
    }

    #[test]
    fn nested_finalization_is_order_independent() {
        // Root and child, one service fetch each: all permutations of the
        // four signals yield exactly one root with the child absorbed.
        fn permutations(items: &mut Vec<u8>, current: &mut Vec<u8>, out: &mut Vec<Vec<u8>>) {
            if items.is_empty() {
                out.push(current.clone());
                return;
            }
            for i in 0..items.len() {
                let item = items.remove(i);
                current.push(item);
                permutations(items, current, out);
                current.pop();
                items.insert(i, item);
            }
        }

        let mut all_orders = Vec::new();
        permutations(&mut vec![0, 1, 2, 3], &mut Vec::new(), &mut all_orders);
        assert_eq!(all_orders.len(), 24);

        for order in all_orders {
            let mut pool = BuilderPool::default();
            let root = pool.push(None);
            let child = pool.push(Some(root));
            pool.add_service_fetch(root);
            pool.add_service_fetch(child);

            let mut finished = Vec::new();
            for signal in &order {
                match signal {
                    0 => pool.finish_parse(child),
                    1 => pool.finish_parse(root),
                    2 => pool.service_finished(root, sample_service("root-svc")),
                    _ => pool.service_finished(child, sample_service("child-svc")),
                }
                finished.extend(pool.take_finished());
            }

            assert_eq!(finished.len(), 1, "order {:?}", order);
            let root_device = &finished[0];
            assert_eq!(root_device.children().len(), 1, "order {:?}", order);
            assert_eq!(root_device.services().len(), 1, "order {:?}", order);
            assert_eq!(
                root_device.children()[0].services().len(),
                1,
                "order {:?}",
                order
            );
        }
    }

    #[test]
    fn service_less_document_settles_during_parse() {
        let description = r#"<root xmlns="urn:schemas-upnp-org:device-1-0">
  <device>
    <deviceType>urn:schemas-upnp-org:device:Basic:1</deviceType>
    <friendlyName>Plain</friendlyName>
    <device>
      <friendlyName>Inner</friendlyName>
    </device>
  </device>
</root>"#;

        let ParsedDescription {
            mut pool,
            service_fetches,
        } = parse_device_description(description, &base(), &http()).unwrap();

        assert!(service_fetches.is_empty());
        let finished = pool.take_finished();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].friendly_name(), "Plain");
        assert_eq!(finished[0].children().len(), 1);
        assert_eq!(finished[0].children()[0].friendly_name(), "Inner");
    }

    #[test]
    fn sibling_root_devices_finalize_independently() {
        let description = r#"<root xmlns="urn:schemas-upnp-org:device-1-0">
  <device><friendlyName>First</friendlyName></device>
  <device><friendlyName>Second</friendlyName></device>
</root>"#;

        let ParsedDescription { mut pool, .. } =
            parse_device_description(description, &base(), &http()).unwrap();

        let finished = pool.take_finished();
        assert_eq!(finished.len(), 2);
        assert!(finished.iter().all(|device| device.is_root_device()));
    }

    #[test]
    fn rejects_wrong_root_namespace() {
        let err = parse_device_description(
            r#"<root xmlns="urn:schemas-upnp-org:service-1-0"></root>"#,
            &base(),
            &http(),
        )
        .unwrap_err();

        assert!(matches!(err, UpnpError::Parse(_)));
    }

    #[test]
    fn rejects_empty_document() {
        let err = parse_device_description("", &base(), &http()).unwrap_err();
        assert!(matches!(err, UpnpError::Parse(_)));
    }

    #[rstest]
    #[case("/igdupnp/control/WANCIC", "https://fritz.box:49443/igdupnp/control/WANCIC")]
    #[case(
        "http://192.168.178.1:49000/igdupnp/control/WANCIC",
        "https://fritz.box:49443/igdupnp/control/WANCIC"
    )]
    #[case("igddesc.xml", "https://fritz.box:49443/igddesc.xml")]
    fn urls_resolve_against_the_request_authority(#[case] text: &str, #[case] expected: &str) {
        let resolved = resolve_against_base(&base(), text).unwrap();
        assert_eq!(resolved.as_str(), expected);
    }
}
