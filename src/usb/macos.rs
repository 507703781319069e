// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

// macOS USB hot-plug watcher
//
// Data sources:
// - IOKit IOServiceAddMatchingNotification - IOServiceMatched / IOServiceTerminate
//   notifications for the IOUSBDevice class, delivered through an
//   IONotificationPort attached to the current CFRunLoop
// - IOKit IOServiceGetMatchingServices - one-shot enumeration
// - IORegistryEntryGetName - human readable device name

use core_foundation::base::TCFType;
use core_foundation::dictionary::CFMutableDictionaryRef;
use core_foundation::runloop::{kCFRunLoopCommonModes, CFRunLoop, CFRunLoopSource};
use io_kit_sys::ret::kIOReturnSuccess;
use io_kit_sys::types::*;
use io_kit_sys::*;
use std::ffi::{c_char, c_void, CStr};

use super::{UsbDevice, UsbEvent, UsbWatcherDelegate};
use crate::error::{Error, Result};

const USB_DEVICE_CLASS: &[u8] = b"IOUSBDevice\0";
const MATCHED_NOTIFICATION: &[u8] = b"IOServiceMatched\0";
const TERMINATED_NOTIFICATION: &[u8] = b"IOServiceTerminate\0";

/// Callback state shared with IOKit through the refcon pointer
struct Inner {
    delegate: Box<dyn UsbWatcherDelegate>,
    added: io_iterator_t,
    removed: io_iterator_t,
}

impl Inner {
    /// Report every pending device on `iterator`. Draining also re-arms it.
    unsafe fn drain(&mut self, iterator: io_iterator_t) {
        let added = if iterator == self.added {
            true
        } else if iterator == self.removed {
            false
        } else {
            log::warn!("Notification for unexpected iterator {}", iterator);
            return;
        };

        loop {
            let service = IOIteratorNext(iterator);
            if service == 0 {
                break;
            }
            let device = device_info(service);
            IOObjectRelease(service);

            let event = if added {
                UsbEvent::Added(device)
            } else {
                UsbEvent::Removed(device)
            };
            event.dispatch(self.delegate.as_mut());
        }
    }
}

extern "C" fn on_notification(refcon: *mut c_void, iterator: io_iterator_t) {
    if refcon.is_null() {
        return;
    }
    unsafe {
        let inner = &mut *(refcon as *mut Inner);
        inner.drain(iterator);
    }
}

unsafe fn device_info(service: io_object_t) -> UsbDevice {
    let mut name_buf = [0 as c_char; 128];
    let name = if IORegistryEntryGetName(service, name_buf.as_mut_ptr()) == kIOReturnSuccess {
        Some(
            CStr::from_ptr(name_buf.as_ptr())
                .to_string_lossy()
                .into_owned(),
        )
    } else {
        None
    };

    let mut registry_id: u64 = 0;
    if IORegistryEntryGetRegistryEntryID(service, &mut registry_id) != kIOReturnSuccess {
        registry_id = 0;
    }

    UsbDevice { name, registry_id }
}

unsafe fn usb_matching() -> Result<CFMutableDictionaryRef> {
    let matching = IOServiceMatching(USB_DEVICE_CLASS.as_ptr() as *const c_char);
    if matching.is_null() {
        return Err(Error::SystemError(
            "Failed to create matching dictionary for IOUSBDevice".to_string(),
        ));
    }
    Ok(matching)
}

/// Watches IOUSBDevice arrivals and removals
///
/// Callbacks are delivered by the run loop the watcher was created on, so
/// create it on the thread that calls [`UsbWatcher::run`].
pub struct UsbWatcher {
    port: IONotificationPortRef,
    inner: *mut Inner,
}

impl UsbWatcher {
    /// Register for notifications and report already connected devices as
    /// added.
    pub fn new<D: UsbWatcherDelegate + 'static>(delegate: D) -> Result<Self> {
        let port = unsafe { IONotificationPortCreate(kIOMasterPortDefault) };
        if port.is_null() {
            return Err(Error::SystemError(
                "IONotificationPortCreate returned NULL".to_string(),
            ));
        }

        let inner = Box::into_raw(Box::new(Inner {
            delegate: Box::new(delegate),
            added: 0,
            removed: 0,
        }));
        // From here on Drop releases whatever was registered
        let watcher = UsbWatcher { port, inner };

        unsafe {
            watcher.add_notification(MATCHED_NOTIFICATION, &mut (*inner).added)?;
            (*inner).drain((*inner).added);

            watcher.add_notification(TERMINATED_NOTIFICATION, &mut (*inner).removed)?;
            (*inner).drain((*inner).removed);

            let source =
                CFRunLoopSource::wrap_under_get_rule(IONotificationPortGetRunLoopSource(port));
            CFRunLoop::get_current().add_source(&source, kCFRunLoopCommonModes);
        }

        log::debug!("USB watcher registered");
        Ok(watcher)
    }

    unsafe fn add_notification(
        &self,
        notification: &'static [u8],
        iterator: *mut io_iterator_t,
    ) -> Result<()> {
        // IOServiceAddMatchingNotification consumes the dictionary reference
        let matching = usb_matching()?;
        let kr = IOServiceAddMatchingNotification(
            self.port,
            notification.as_ptr() as *const c_char,
            matching,
            on_notification,
            self.inner as *mut c_void,
            iterator,
        );
        if kr != kIOReturnSuccess {
            return Err(Error::IoKit {
                call: "IOServiceAddMatchingNotification",
                code: kr,
            });
        }
        Ok(())
    }

    /// Block in `CFRunLoopRun`, dispatching notifications to the delegate
    pub fn run(&self) {
        CFRunLoop::run_current();
    }
}

impl Drop for UsbWatcher {
    fn drop(&mut self) {
        unsafe {
            let inner = Box::from_raw(self.inner);
            if inner.added != 0 {
                IOObjectRelease(inner.added);
            }
            if inner.removed != 0 {
                IOObjectRelease(inner.removed);
            }
            IONotificationPortDestroy(self.port);
            drop(inner);
        }
    }
}

/// Enumerate currently connected USB devices
pub fn list_devices() -> Result<Vec<UsbDevice>> {
    let mut devices = Vec::new();
    unsafe {
        let matching = usb_matching()?;
        let mut iter: io_iterator_t = 0;
        let kr = IOServiceGetMatchingServices(kIOMasterPortDefault, matching, &mut iter);
        if kr != kIOReturnSuccess {
            return Err(Error::IoKit {
                call: "IOServiceGetMatchingServices",
                code: kr,
            });
        }

        loop {
            let service = IOIteratorNext(iter);
            if service == 0 {
                break;
            }
            devices.push(device_info(service));
            IOObjectRelease(service);
        }
        IOObjectRelease(iter);
    }
    Ok(devices)
}
