// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! USB device hot-plug monitoring
use serde::{Deserialize, Serialize};

use crate::display::Effect;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsbDevice {
    /// IORegistry entry name, `None` when it could not be read
    pub name: Option<String>,
    pub registry_id: u64,
}

impl UsbDevice {
    pub fn new(name: Option<String>, registry_id: u64) -> Self {
        Self { name, registry_id }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unknown>")
    }
}

// USB events for device monitoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsbEvent {
    Added(UsbDevice),
    Removed(UsbDevice),
}

impl UsbEvent {
    pub fn device(&self) -> &UsbDevice {
        match self {
            UsbEvent::Added(d) | UsbEvent::Removed(d) => d,
        }
    }

    /// Run-on effect this event corresponds to
    pub fn effect(&self) -> Effect {
        match self {
            UsbEvent::Added(_) => Effect::Add,
            UsbEvent::Removed(_) => Effect::Remove,
        }
    }

    pub fn dispatch(&self, delegate: &mut dyn UsbWatcherDelegate) {
        match self {
            UsbEvent::Added(d) => delegate.device_added(d),
            UsbEvent::Removed(d) => delegate.device_removed(d),
        }
    }
}

/// Receives hot-plug callbacks from a [`UsbWatcher`]
///
/// Both methods run on the thread that drives the run loop.
pub trait UsbWatcherDelegate {
    fn device_added(&mut self, device: &UsbDevice);
    fn device_removed(&mut self, device: &UsbDevice);
}

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "macos")]
pub use macos::{list_devices, UsbWatcher};

#[cfg(not(target_os = "macos"))]
pub use fallback::{list_devices, UsbWatcher};

#[cfg(not(target_os = "macos"))]
mod fallback {
    use super::{UsbDevice, UsbWatcherDelegate};
    use crate::error::{Error, Result};

    fn unsupported() -> Error {
        Error::UnsupportedPlatform(format!(
            "USB hot-plug notifications need IOKit (running on {})",
            std::env::consts::OS
        ))
    }

    /// Placeholder watcher, construction always fails off macOS
    pub struct UsbWatcher {
        _private: (),
    }

    impl UsbWatcher {
        pub fn new<D: UsbWatcherDelegate + 'static>(_delegate: D) -> Result<Self> {
            Err(unsupported())
        }

        pub fn run(&self) {}
    }

    pub fn list_devices() -> Result<Vec<UsbDevice>> {
        Err(unsupported())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        added: Vec<String>,
        removed: Vec<String>,
    }

    impl UsbWatcherDelegate for Recorder {
        fn device_added(&mut self, device: &UsbDevice) {
            self.added.push(device.display_name().to_string());
        }

        fn device_removed(&mut self, device: &UsbDevice) {
            self.removed.push(device.display_name().to_string());
        }
    }

    #[test]
    fn test_display_name() {
        let named = UsbDevice::new(Some("USB Receiver".to_string()), 42);
        assert_eq!(named.display_name(), "USB Receiver");
        let unnamed = UsbDevice::new(None, 43);
        assert_eq!(unnamed.display_name(), "<unknown>");
    }

    #[test]
    fn test_event_effect() {
        let dev = UsbDevice::new(Some("Keyboard".to_string()), 1);
        assert_eq!(UsbEvent::Added(dev.clone()).effect(), Effect::Add);
        assert_eq!(UsbEvent::Removed(dev).effect(), Effect::Remove);
    }

    #[test]
    fn test_dispatch_routes_to_delegate() {
        let mut rec = Recorder::default();
        UsbEvent::Added(UsbDevice::new(Some("A".to_string()), 1)).dispatch(&mut rec);
        UsbEvent::Removed(UsbDevice::new(Some("B".to_string()), 2)).dispatch(&mut rec);
        UsbEvent::Added(UsbDevice::new(None, 3)).dispatch(&mut rec);
        assert_eq!(rec.added, vec!["A", "<unknown>"]);
        assert_eq!(rec.removed, vec!["B"]);
    }

    #[test]
    fn test_usb_device_serialization() {
        let device = UsbDevice::new(Some("USB Receiver".to_string()), 0x1000_0abc);
        let json = serde_json::to_string(&device).unwrap();
        let deserialized: UsbDevice = serde_json::from_str(&json).unwrap();
        assert_eq!(device, deserialized);
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_watcher_unsupported_off_macos() {
        let err = UsbWatcher::new(Recorder::default()).err().unwrap();
        assert!(matches!(err, crate::error::Error::UnsupportedPlatform(_)));
        assert!(list_devices().is_err());
    }
}
