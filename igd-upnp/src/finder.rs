//! Discovery orchestration.
//!
//! A [`DeviceFinder`] runs one discovery at a time against a directly
//! supplied description document URL. Gateways in scope do not advertise
//! themselves, so there is no multicast search; the caller knows the URL.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::debug;
use url::Url;

use crate::description::DeviceDescriptionFetcher;
use crate::device::Device;

const EVENT_CHANNEL_CAPACITY: usize = 32;
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Events emitted during device discovery.
#[derive(Debug, Clone)]
pub enum DiscoveryEvent {
    /// A device tree finished assembling.
    DeviceAdded(Arc<Device>),
    /// A previously added device went away, identified by its UDN.
    /// Discovery itself never emits this; it exists for consumers that
    /// track device lifetimes through other channels.
    DeviceRemoved { udn: String },
    /// The current discovery run finished, successfully or not.
    SearchComplete,
}

/// Discovers a device tree from its description document URL.
///
/// One discovery runs at a time per finder; a second `find_device` while
/// one is in flight is rejected. Devices accumulate across runs.
pub struct DeviceFinder {
    http: reqwest::Client,
    devices: Mutex<Vec<Arc<Device>>>,
    events: broadcast::Sender<DiscoveryEvent>,
    searching: AtomicBool,
    cancelled: AtomicBool,
}

impl DeviceFinder {
    /// Create a finder with a default HTTP client: 10 second request
    /// timeout, self-signed certificates tolerated (gateways serve their
    /// TLS port with one).
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .unwrap_or_default();
        Self::with_client(http)
    }

    /// Create a finder using an already configured HTTP client. The client
    /// is shared with every spawned fetcher and every produced service.
    pub fn with_client(http: reqwest::Client) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            http,
            devices: Mutex::new(Vec::new()),
            events,
            searching: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Subscribe to discovery events.
    pub fn subscribe(&self) -> broadcast::Receiver<DiscoveryEvent> {
        self.events.subscribe()
    }

    /// Snapshot of every device discovered so far.
    pub fn devices(&self) -> Vec<Arc<Device>> {
        self.devices.lock().clone()
    }

    pub fn searching(&self) -> bool {
        self.searching.load(Ordering::SeqCst)
    }

    /// Best-effort cancellation of the run in flight.
    ///
    /// Bookkeeping stops at the next completion boundary and no further
    /// events are emitted for the run; in-flight HTTP requests are not
    /// guaranteed to be aborted.
    pub fn cancel_find(&self) {
        if !self.searching.load(Ordering::SeqCst) {
            return;
        }
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Run one discovery against `description_document_url`.
    ///
    /// The URL's scheme and authority become the base for every URL in the
    /// fetched documents. Emits [`DiscoveryEvent::DeviceAdded`] per
    /// assembled root device and [`DiscoveryEvent::SearchComplete`] when
    /// nothing is left in flight; failures fold into an empty, complete
    /// run. Calling this while a run is in flight logs and does nothing.
    pub async fn find_device(&self, description_document_url: &Url) {
        if self.searching.swap(true, Ordering::SeqCst) {
            debug!("already searching");
            return;
        }
        self.cancelled.store(false, Ordering::SeqCst);

        let base_url = base_of(description_document_url);
        let fetcher = DeviceDescriptionFetcher::new(self.http.clone(), base_url);

        let mut emit = |device: Arc<Device>| {
            if self.cancelled.load(Ordering::SeqCst) {
                return;
            }
            self.devices.lock().push(device.clone());
            let _ = self.events.send(DiscoveryEvent::DeviceAdded(device));
        };
        fetcher
            .run(description_document_url, &self.cancelled, &mut emit)
            .await;

        self.searching.store(false, Ordering::SeqCst);
        if !self.cancelled.load(Ordering::SeqCst) {
            let _ = self.events.send(DiscoveryEvent::SearchComplete);
        }
    }
}

impl Default for DeviceFinder {
    fn default() -> Self {
        Self::new()
    }
}

/// The scheme + authority of `url`, with path, query and fragment cleared.
fn base_of(url: &Url) -> Url {
    let mut base = url.clone();
    base.set_path("/");
    base.set_query(None);
    base.set_fragment(None);
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_keeps_scheme_and_authority() {
        let url = Url::parse("https://fritz.box:49443/igddesc.xml?x=1#frag").unwrap();
        assert_eq!(base_of(&url).as_str(), "https://fritz.box:49443/");
    }

    #[test]
    fn finder_starts_idle() {
        let finder = DeviceFinder::new();
        assert!(!finder.searching());
        assert!(finder.devices().is_empty());
    }

    #[test]
    fn cancel_without_a_run_is_a_no_op() {
        let finder = DeviceFinder::new();
        finder.cancel_find();
        assert!(!finder.cancelled.load(Ordering::SeqCst));
    }
}
