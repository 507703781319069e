// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Configuration file and settings resolution
//!
//! Every key of the TOML file is optional; command line values override
//! whatever the file provides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::display::{Effect, MonitorInput};
use crate::error::{Error, Result};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter string understood by `env_logger`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub device: Option<String>,
    pub run_on: Option<String>,
    pub values: Vec<String>,
    pub ddc_path: Option<PathBuf>,
    pub dry_run: bool,
    pub log_level: LogLevel,
}

impl Config {
    /// `<config dir>/monitor-changer/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("monitor-changer").join("config.toml"))
    }

    /// Load from TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("TOML parse error: {}", e)))
    }

    /// An explicit path must exist; a missing default file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with_default(explicit, Self::default_path())
    }

    fn load_with_default(explicit: Option<&Path>, default: Option<PathBuf>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_toml_file(path),
            None => match default {
                Some(path) if path.exists() => {
                    log::debug!("Loading config from {}", path.display());
                    Self::from_toml_file(&path)
                }
                _ => Ok(Self::default()),
            },
        }
    }

    /// Generate sample config
    pub fn sample_toml() -> String {
        r#"# Monitor Changer Configuration
# Name of the USB device as shown by `monitor-changer --list-devices`
device = "USB Receiver"
# Switch when the device is plugged in ("add") or unplugged ("remove")
run_on = "add"
# monitorId,inputId pairs passed to `m1ddc display <id> set input <input>`
values = ["1,15", "2,15"]
# ddc_path = "/opt/homebrew/bin/m1ddc"
dry_run = false
log_level = "Info"
"#
        .into()
    }
}

/// Overrides collected from the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub device: Option<String>,
    pub run_on: Option<String>,
    pub values: Vec<String>,
    pub ddc_path: Option<PathBuf>,
    pub dry_run: bool,
}

/// Validated settings ready to drive the watcher
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub device: String,
    pub effect: Effect,
    pub values: Vec<MonitorInput>,
    pub ddc_path: Option<PathBuf>,
    pub dry_run: bool,
}

impl Settings {
    pub fn resolve(cli: CliOverrides, config: Config) -> Result<Self> {
        let device = cli
            .device
            .or(config.device)
            .ok_or_else(|| Error::MissingArgument("device name".to_string()))?;
        if device.is_empty() {
            return Err(Error::InvalidValue("device name must not be empty".to_string()));
        }

        let effect = cli
            .run_on
            .or(config.run_on)
            .ok_or_else(|| {
                Error::MissingArgument(format!("--run-on ({})", Effect::accepted()))
            })?
            .parse::<Effect>()?;

        let raw_values = if cli.values.is_empty() {
            config.values
        } else {
            cli.values
        };
        if raw_values.is_empty() {
            return Err(Error::MissingArgument(
                "--values (monitorId,inputId)".to_string(),
            ));
        }
        let values = raw_values
            .iter()
            .map(|v| v.parse::<MonitorInput>())
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            device,
            effect,
            values,
            ddc_path: cli.ddc_path.or(config.ddc_path),
            dry_run: cli.dry_run || config.dry_run,
        })
    }
}
