// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Display input switching: run-on effects, monitor/input pairs and the
//! argument list handed to the DDC tool.
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub mod ddc;

pub use ddc::{DdcTool, InputSwitcher};

/// Device transition that triggers an input switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Add,
    Remove,
}

impl Effect {
    pub const ALL: [Effect; 2] = [Effect::Add, Effect::Remove];

    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Add => "add",
            Effect::Remove => "remove",
        }
    }

    /// Comma separated list of accepted run-on names, for help and error text
    pub fn accepted() -> String {
        Self::ALL
            .iter()
            .map(Effect::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Effect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| {
                Error::InvalidEffect(format!(
                    "Accepted run ons are {}. Your input: {}",
                    Self::accepted(),
                    s
                ))
            })
    }
}

/// One `monitorId,inputId` pair
///
/// The monitor id is whatever the DDC tool accepts after `display` (an index
/// or a UUID), so it is kept as text. The input id is the raw VCP 0x60 value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MonitorInput {
    pub monitor_id: String,
    pub input_id: String,
}

impl MonitorInput {
    pub fn new(monitor_id: impl Into<String>, input_id: impl Into<String>) -> Self {
        Self {
            monitor_id: monitor_id.into(),
            input_id: input_id.into(),
        }
    }
}

impl fmt::Display for MonitorInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.monitor_id, self.input_id)
    }
}

impl FromStr for MonitorInput {
    type Err = Error;

    /// Accepts `^[^,]+,[0-9]+$`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            Error::InvalidValue(format!(
                "Value {} does not match desired input: monitorId,inputId",
                s
            ))
        };

        let (monitor, input) = s.split_once(',').ok_or_else(invalid)?;
        if monitor.is_empty()
            || input.is_empty()
            || !input.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        Ok(Self::new(monitor, input))
    }
}

impl Serialize for MonitorInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonitorInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Build the DDC tool argument list: `display <monitor> set input <input>`
/// repeated for every pair, in order.
pub fn build_arguments(pairs: &[MonitorInput]) -> Vec<String> {
    let mut arguments = Vec::with_capacity(pairs.len() * 5);
    for pair in pairs {
        arguments.push("display".to_string());
        arguments.push(pair.monitor_id.clone());
        arguments.push("set".to_string());
        arguments.push("input".to_string());
        arguments.push(pair.input_id.clone());
    }
    arguments
}
