// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Hot-plug delegate that switches monitor inputs when the target device
//! appears or disappears.

use crate::config::Settings;
use crate::display::{build_arguments, Effect, InputSwitcher, MonitorInput};
use crate::error::Result;
use crate::usb::{UsbDevice, UsbEvent, UsbWatcherDelegate};

pub struct SwitchDelegate<S: InputSwitcher> {
    target: String,
    effect: Effect,
    values: Vec<MonitorInput>,
    switcher: S,
}

impl<S: InputSwitcher> SwitchDelegate<S> {
    pub fn new(
        target: impl Into<String>,
        effect: Effect,
        values: Vec<MonitorInput>,
        switcher: S,
    ) -> Self {
        Self {
            target: target.into(),
            effect,
            values,
            switcher,
        }
    }

    pub fn from_settings(settings: &Settings, switcher: S) -> Self {
        Self::new(
            settings.device.clone(),
            settings.effect,
            settings.values.clone(),
            switcher,
        )
    }

    pub fn switcher(&self) -> &S {
        &self.switcher
    }

    /// Exact, case-sensitive name comparison
    pub fn is_match(&self, device: &UsbDevice) -> bool {
        device.name.as_deref() == Some(self.target.as_str())
    }

    /// Run the switch if `event` is the configured transition of the target
    /// device. `None` means nothing was run.
    pub fn handle(&self, event: &UsbEvent) -> Option<Result<String>> {
        let device = event.device();
        match event {
            UsbEvent::Added(_) => log::info!("device added: {}", device.display_name()),
            UsbEvent::Removed(_) => log::info!("device removed: {}", device.display_name()),
        }

        if event.effect() != self.effect || !self.is_match(device) {
            return None;
        }

        if self.values.is_empty() {
            log::warn!("{} matched but no monitor inputs are configured", self.target);
            return None;
        }

        log::info!(
            "Switching {} monitor(s) on {} of {}",
            self.values.len(),
            self.effect,
            self.target
        );
        Some(self.switcher.switch_inputs(&build_arguments(&self.values)))
    }

    fn on_event(&self, event: UsbEvent) {
        match self.handle(&event) {
            Some(Ok(output)) => {
                let output = output.trim();
                if !output.is_empty() {
                    log::info!("{}", output);
                }
            }
            Some(Err(e)) => log::error!("Failed to switch monitor input: {}", e),
            None => {}
        }
    }
}

impl<S: InputSwitcher> UsbWatcherDelegate for SwitchDelegate<S> {
    fn device_added(&mut self, device: &UsbDevice) {
        self.on_event(UsbEvent::Added(device.clone()));
    }

    fn device_removed(&mut self, device: &UsbDevice) {
        self.on_event(UsbEvent::Removed(device.clone()));
    }
}
