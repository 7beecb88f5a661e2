//! Read the WAN byte rates from a gateway once and print them.
//!
//! Usage: cargo run -p igd-sdk-upnp --example addon_infos [description-url]

use std::sync::Arc;

use igd_upnp::{Device, DeviceFinder, DiscoveryEvent, InvokeActionResult, Service};
use url::Url;

const DEFAULT_DESCRIPTION_URL: &str = "https://fritz.box:49443/igddesc.xml";
const WAN_DEVICE_TYPE: &str = "urn:schemas-upnp-org:device:WANDevice:1";
const WAN_COMMON_INTERFACE_CONFIG_SERVICE_TYPE: &str =
    "urn:schemas-upnp-org:service:WANCommonInterfaceConfig:1";
const GET_ADDON_INFOS_ACTION_NAME: &str = "GetAddonInfos";
const NEW_BYTE_SEND_RATE_ARGUMENT: &str = "NewByteSendRate";
const NEW_BYTE_RECEIVE_RATE_ARGUMENT: &str = "NewByteReceiveRate";

/// Depth-first search for the WAN common interface configuration service.
fn find_wan_common_config(device: &Arc<Device>) -> Option<Arc<Service>> {
    if device.device_type() == WAN_DEVICE_TYPE {
        device
            .services()
            .iter()
            .find(|service| {
                service.service_type_identifier() == WAN_COMMON_INTERFACE_CONFIG_SERVICE_TYPE
            })
            .cloned()
    } else {
        device.children().iter().find_map(find_wan_common_config)
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DESCRIPTION_URL.to_string());
    let url = Url::parse(&url).expect("invalid description URL");

    let finder = DeviceFinder::new();
    finder.find_device(&url).await;

    let service = finder
        .devices()
        .iter()
        .find_map(find_wan_common_config)
        .expect("gateway exposes no WAN common interface configuration service");

    let mut invocations = service.on_action_invoked();
    if service.invoke_action(GET_ADDON_INFOS_ACTION_NAME, &[]) != InvokeActionResult::Success {
        eprintln!("invocation failed");
        return;
    }

    let invoked = invocations.recv().await.expect("no invocation result");
    for argument in [NEW_BYTE_RECEIVE_RATE_ARGUMENT, NEW_BYTE_SEND_RATE_ARGUMENT] {
        match invoked.output_arguments.get(argument) {
            Some(value) => println!("{}: {} bytes/s", argument, value),
            None => println!("{}: not reported", argument),
        }
    }
}
