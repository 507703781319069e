// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Error types for Monitor Changer

use std::io;
use thiserror::Error;

/// Result type alias for Monitor Changer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Monitor Changer
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Run-on effect other than `add` / `remove`
    #[error("Invalid effect: {0}")]
    InvalidEffect(String),

    /// Malformed `monitorId,inputId` pair
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Required setting given neither on the command line nor in the config
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    /// Unsupported platform
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// IOKit call returned a non-success code
    #[error("IOKit error: {call} returned {code:#x}")]
    IoKit { call: &'static str, code: i32 },

    /// System error
    #[error("System error: {0}")]
    SystemError(String),

    /// Display control binary could not be located
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Command execution failed
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
