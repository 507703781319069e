// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Monitor Changer
//!
//! Watches USB hot-plug notifications and, when a named device is plugged
//! in or removed, runs an external DDC/CI tool (m1ddc or compatible) to move
//! one or more monitors to another input.
//!
//! ```no_run
//! use monchlib::display::{DdcTool, Effect, MonitorInput};
//! use monchlib::switcher::SwitchDelegate;
//! use monchlib::usb::UsbWatcher;
//!
//! # fn main() -> monchlib::Result<()> {
//! let tool = DdcTool::new(DdcTool::resolve(None)?);
//! let delegate = SwitchDelegate::new(
//!     "USB Receiver",
//!     Effect::Add,
//!     vec![MonitorInput::new("1", "15")],
//!     tool,
//! );
//! let watcher = UsbWatcher::new(delegate)?;
//! watcher.run();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod display;
pub mod error;
pub mod switcher;
pub mod usb;

pub use error::{Error, Result};
