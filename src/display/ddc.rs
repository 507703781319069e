// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

// External DDC/CI tool invocation (m1ddc or a compatible binary)
//
// The tool is called as:
//   m1ddc display <monitor> set input <input> [display <monitor> set input <input> ...]

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Environment variable that points at the DDC tool binary
pub const DDC_PATH_ENV: &str = "MONITOR_CHANGER_DDC";

/// Binary name looked up on `PATH`
pub const DDC_BINARY: &str = "m1ddc";

/// Location used by earlier releases, relative to the home directory
const LEGACY_RELATIVE_PATH: &str = "Documents/open-source/m1ddc/m1ddc";

/// Something that can apply a DDC argument list
pub trait InputSwitcher {
    /// Apply `args` and return whatever the tool printed on stdout
    fn switch_inputs(&self, args: &[String]) -> Result<String>;
}

/// Runs the external DDC tool
#[derive(Debug, Clone)]
pub struct DdcTool {
    path: PathBuf,
    dry_run: bool,
}

impl DdcTool {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dry_run: false,
        }
    }

    /// Log the command line instead of running it
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Locate the tool binary.
    ///
    /// Order: `explicit`, `$MONITOR_CHANGER_DDC`, `m1ddc` on `PATH`, then
    /// `~/Documents/open-source/m1ddc/m1ddc`.
    pub fn resolve(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return existing(path.to_path_buf(), "configured DDC tool");
        }

        if let Some(path) = std::env::var_os(DDC_PATH_ENV) {
            return existing(PathBuf::from(path), DDC_PATH_ENV);
        }

        if let Ok(path) = which::which(DDC_BINARY) {
            log::debug!("Found {} on PATH at {}", DDC_BINARY, path.display());
            return Ok(path);
        }

        if let Some(home) = dirs::home_dir() {
            let legacy = home.join(LEGACY_RELATIVE_PATH);
            if legacy.exists() {
                return Ok(legacy);
            }
        }

        Err(Error::ToolNotFound(format!(
            "could not locate '{}'. Pass --ddc-path, set {} or install it on PATH",
            DDC_BINARY, DDC_PATH_ENV
        )))
    }

    fn command_line(&self, args: &[String]) -> String {
        std::iter::once(self.path.display().to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn existing(path: PathBuf, source: &str) -> Result<PathBuf> {
    if path.exists() {
        Ok(path)
    } else {
        Err(Error::ToolNotFound(format!(
            "{} does not exist ({})",
            path.display(),
            source
        )))
    }
}

impl InputSwitcher for DdcTool {
    fn switch_inputs(&self, args: &[String]) -> Result<String> {
        if self.dry_run {
            log::info!("dry run: {}", self.command_line(args));
            return Ok(String::new());
        }

        log::debug!("Executing {}", self.command_line(args));

        let child = Command::new(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::CommandFailed(format!("failed to run {}: {}", self.path.display(), e))
            })?;

        let output = child.wait_with_output().map_err(|e| {
            Error::CommandFailed(format!(
                "failed to wait for {}: {}",
                self.path.display(),
                e
            ))
        })?;

        if !output.status.success() {
            log::warn!("{} exited with {}", self.path.display(), output.status);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_explicit_missing() {
        let missing = Path::new("/nonexistent/monitor-changer/m1ddc");
        let err = DdcTool::resolve(Some(missing)).unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(_)));
    }

    #[test]
    fn test_resolve_explicit_existing() {
        let here = std::env::current_exe().unwrap();
        assert_eq!(DdcTool::resolve(Some(here.as_path())).unwrap(), here);
    }

    #[test]
    fn test_dry_run_does_not_spawn() {
        let tool = DdcTool::new("/nonexistent/m1ddc").with_dry_run(true);
        let out = tool.switch_inputs(&args(&["display", "1", "set", "input", "15"]));
        assert_eq!(out.unwrap(), "");
    }

    #[test]
    fn test_spawn_failure_is_command_failed() {
        let tool = DdcTool::new("/nonexistent/m1ddc");
        let err = tool.switch_inputs(&[]).unwrap_err();
        assert!(matches!(err, Error::CommandFailed(_)));
    }

    #[test]
    fn test_command_line() {
        let tool = DdcTool::new("/opt/bin/m1ddc");
        assert_eq!(
            tool.command_line(&args(&["display", "2", "set", "input", "17"])),
            "/opt/bin/m1ddc display 2 set input 17"
        );
    }

    // The only test that touches MONITOR_CHANGER_DDC, so nothing races on it
    #[test]
    fn test_resolve_env_precedence() {
        let here = std::env::current_exe().unwrap();
        let missing = Path::new("/nonexistent/monitor-changer/env-m1ddc");

        std::env::set_var(DDC_PATH_ENV, &here);
        assert_eq!(DdcTool::resolve(None).unwrap(), here);

        std::env::set_var(DDC_PATH_ENV, missing);
        let err = DdcTool::resolve(None).unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(_)));
        assert!(err.to_string().contains(DDC_PATH_ENV));

        // explicit path beats the environment
        assert_eq!(DdcTool::resolve(Some(here.as_path())).unwrap(), here);

        std::env::remove_var(DDC_PATH_ENV);
    }

    #[test]
    fn test_accessors() {
        let tool = DdcTool::new("/opt/bin/m1ddc").with_dry_run(true);
        assert_eq!(tool.path(), Path::new("/opt/bin/m1ddc"));
        assert!(tool.is_dry_run());
        assert!(!DdcTool::new("/opt/bin/m1ddc").is_dry_run());
    }

    #[cfg(unix)]
    fn script(name: &str, body: &str) -> String {
        let dir = std::env::temp_dir().join(format!("monitor-changer-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, format!("{}\n", body)).unwrap();
        path.display().to_string()
    }

    // Scripts are passed to /bin/sh rather than executed directly
    #[cfg(unix)]
    #[test]
    fn test_runs_tool_and_captures_stdout() {
        let echo = script("echo-args", "echo \"$@\"");
        let fail = script("fail", "echo partial; exit 3");
        let sh = DdcTool::new("/bin/sh");

        let out = sh
            .switch_inputs(&args(&[echo.as_str(), "display", "1", "set", "input", "15"]))
            .unwrap();
        assert_eq!(out.trim(), "display 1 set input 15");

        let out = sh.switch_inputs(&args(&[fail.as_str()])).unwrap();
        assert_eq!(out.trim(), "partial");
    }
}
