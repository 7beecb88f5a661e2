//! Discover a gateway and print its device/service tree.
//!
//! Usage: cargo run -p igd-sdk-upnp --example dump_device_tree [description-url]

use igd_upnp::{Device, DeviceFinder, DiscoveryEvent};
use url::Url;

const DEFAULT_DESCRIPTION_URL: &str = "https://fritz.box:49443/igddesc.xml";

fn dump_device(device: &Device, indent: usize) {
    let pad = "  ".repeat(indent);
    println!("{}{} <{}>", pad, device.friendly_name(), device.device_type());
    for service in device.services() {
        println!("{}  [{}]", pad, service.id());
        for action in service.actions() {
            println!("{}    {}", pad, action.name());
        }
    }
    for child in device.children() {
        dump_device(child, indent + 1);
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
    let mut events = finder.subscribe();
    finder.find_device(&url).await;

    while let Ok(event) = events.try_recv() {
        match event {
            DiscoveryEvent::DeviceAdded(device) => dump_device(&device, 0),
            DiscoveryEvent::SearchComplete => println!("search complete"),
            DiscoveryEvent::DeviceRemoved { udn } => println!("device removed: {}", udn),
        }
    }
}
