//! UPnP internet-gateway discovery and control
//!
//! This crate discovers a hierarchical UPnP device — typically a home
//! internet gateway — from its description document URL, assembles an
//! immutable device/service tree, and invokes service actions over SOAP.
//! Service descriptions are fetched concurrently; a device finalizes once
//! its whole subtree has settled, in whatever order the fetches finish.
//!
//! # Quick Start
//!
//! ```no_run
//! use igd_upnp::{DeviceFinder, DiscoveryEvent};
//! use url::Url;
//!
//! # async fn run() {
//! let finder = DeviceFinder::new();
//! let mut events = finder.subscribe();
//!
//! let url = Url::parse("https://fritz.box:49443/igddesc.xml").unwrap();
//! finder.find_device(&url).await;
//!
//! while let Ok(event) = events.try_recv() {
//!     if let DiscoveryEvent::DeviceAdded(device) = event {
//!         println!("found {}", device.friendly_name());
//!     }
//! }
//! # }
//! ```

mod action;
mod description;
mod device;
mod error;
mod finder;
mod scpd;
mod service;
mod state_variable;
mod xml;

pub use action::{Action, Argument, Direction};
pub use device::Device;
pub use error::{Result, UpnpError};
pub use finder::{DeviceFinder, DiscoveryEvent};
pub use service::{ActionInvoked, InvokeActionResult, Service};
pub use state_variable::{DataType, StateVariable, UnknownDataType};
