//! The immutable device tree produced by discovery.

use std::sync::{Arc, OnceLock, Weak};

use url::Url;

use crate::service::Service;

/// A node in a discovered UPnP device tree.
///
/// Values are immutable once discovery hands them out. Parent and root
/// links are weak: keeping any part of the tree alive requires holding the
/// root (or any ancestor) through an `Arc`.
#[derive(Debug)]
pub struct Device {
    device_type: String,
    friendly_name: String,
    description: String,
    manufacturer_name: String,
    manufacturer_url: Option<Url>,
    model_name: String,
    model_number: String,
    model_url: Option<Url>,
    serial_number: String,
    unique_device_name: String,
    upc: String,
    presentation_url: Option<Url>,
    icon_url: Option<Url>,
    services: Vec<Arc<Service>>,
    children: Vec<Arc<Device>>,
    parent: OnceLock<Weak<Device>>,
    root: OnceLock<Weak<Device>>,
}

impl Device {
    /// Embedded devices, in completion order.
    pub fn children(&self) -> &[Arc<Device>] {
        &self.children
    }

    /// The model description text.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// A device with no parent is the root of its tree.
    pub fn is_root_device(&self) -> bool {
        self.parent.get().is_none()
    }

    pub fn manufacturer_name(&self) -> &str {
        &self.manufacturer_name
    }

    pub fn manufacturer_url(&self) -> Option<&Url> {
        self.manufacturer_url.as_ref()
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn model_number(&self) -> &str {
        &self.model_number
    }

    pub fn model_url(&self) -> Option<&Url> {
        self.model_url.as_ref()
    }

    pub fn parent_device(&self) -> Option<Arc<Device>> {
        self.parent.get().and_then(Weak::upgrade)
    }

    pub fn presentation_url(&self) -> Option<&Url> {
        self.presentation_url.as_ref()
    }

    /// The root of this device's tree; for the root device, itself.
    pub fn root_device(&self) -> Option<Arc<Device>> {
        self.root.get().and_then(Weak::upgrade)
    }

    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    /// Services owned by this device, in completion order.
    pub fn services(&self) -> &[Arc<Service>] {
        &self.services
    }

    /// The device type URI.
    pub fn device_type(&self) -> &str {
        &self.device_type
    }

    /// The stable unique identifier (UDN).
    pub fn unique_device_name(&self) -> &str {
        &self.unique_device_name
    }

    pub fn upc(&self) -> &str {
        &self.upc
    }

    pub fn icon_url(&self) -> Option<&Url> {
        self.icon_url.as_ref()
    }

    /// Inject parent and root back-links into a completed tree.
    ///
    /// Runs exactly once per tree, right after the root is frozen into its
    /// `Arc`; the links are write-once cells, so a repeated call cannot
    /// rewire an already linked tree.
    pub(crate) fn link_tree(root: &Arc<Device>) {
        let _ = root.root.set(Arc::downgrade(root));
        Self::link_children(root, root);
    }

    fn link_children(parent: &Arc<Device>, root: &Arc<Device>) {
        for child in &parent.children {
            let _ = child.parent.set(Arc::downgrade(parent));
            let _ = child.root.set(Arc::downgrade(root));
            Self::link_children(child, root);
        }
    }
}

/// Incremental construction of one device node during description parsing.
///
/// Setters mirror the description elements; services and completed child
/// devices are absorbed as their own construction finishes. `build` freezes
/// the node.
#[derive(Debug, Default)]
pub(crate) struct DeviceBuilder {
    device_type: String,
    friendly_name: String,
    description: String,
    manufacturer_name: String,
    manufacturer_url: Option<Url>,
    model_name: String,
    model_number: String,
    model_url: Option<Url>,
    serial_number: String,
    unique_device_name: String,
    upc: String,
    services: Vec<Arc<Service>>,
    children: Vec<Arc<Device>>,
}

impl DeviceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device_type(&mut self, text: String) -> &mut Self {
        self.device_type = text;
        self
    }

    pub fn friendly_name(&mut self, text: String) -> &mut Self {
        self.friendly_name = text;
        self
    }

    pub fn description(&mut self, text: String) -> &mut Self {
        self.description = text;
        self
    }

    pub fn manufacturer_name(&mut self, text: String) -> &mut Self {
        self.manufacturer_name = text;
        self
    }

    pub fn manufacturer_url(&mut self, text: String) -> &mut Self {
        self.manufacturer_url = Url::parse(&text).ok();
        self
    }

    pub fn model_name(&mut self, text: String) -> &mut Self {
        self.model_name = text;
        self
    }

    pub fn model_number(&mut self, text: String) -> &mut Self {
        self.model_number = text;
        self
    }

    pub fn model_url(&mut self, text: String) -> &mut Self {
        self.model_url = Url::parse(&text).ok();
        self
    }

    pub fn serial_number(&mut self, text: String) -> &mut Self {
        self.serial_number = text;
        self
    }

    pub fn unique_device_name(&mut self, text: String) -> &mut Self {
        self.unique_device_name = text;
        self
    }

    pub fn upc(&mut self, text: String) -> &mut Self {
        self.upc = text;
        self
    }

    pub fn add_service(&mut self, service: Service) {
        self.services.push(Arc::new(service));
    }

    pub fn add_child(&mut self, child: Arc<Device>) {
        self.children.push(child);
    }

    pub fn build(self) -> Device {
        Device {
            device_type: self.device_type,
            friendly_name: self.friendly_name,
            description: self.description,
            manufacturer_name: self.manufacturer_name,
            manufacturer_url: self.manufacturer_url,
            model_name: self.model_name,
            model_number: self.model_number,
            model_url: self.model_url,
            serial_number: self.serial_number,
            unique_device_name: self.unique_device_name,
            upc: self.upc,
            // The description parser carries no presentation or icon URLs.
            presentation_url: None,
            icon_url: None,
            services: self.services,
            children: self.children,
            parent: OnceLock::new(),
            root: OnceLock::new(),
        }
    }
}
