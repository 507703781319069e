// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! CLI tool for Monitor Changer

use clap::Parser;
use std::path::PathBuf;

use monchlib::config::{CliOverrides, Config, LogLevel, Settings};
use monchlib::display::ddc::DDC_BINARY;
use monchlib::display::{DdcTool, Effect};
use monchlib::switcher::SwitchDelegate;
use monchlib::usb::{self, UsbDevice, UsbWatcher};

#[derive(Parser)]
#[command(name = "monitor-changer")]
#[command(about = "Switch monitor inputs when a USB device is plugged in or removed", long_about = None)]
#[command(version)]
struct Cli {
    /// Name of the USB device to watch (see --list-devices)
    name: Option<String>,

    #[arg(short, long, help = format!("Run on effect: {}", Effect::accepted()))]
    run_on: Option<String>,

    /// Monitor id, input id (repeat for several monitors)
    #[arg(short, long = "values", value_name = "MONITOR_ID,INPUT_ID")]
    values: Vec<String>,

    /// Path to m1ddc or a compatible DDC tool
    #[arg(long)]
    ddc_path: Option<PathBuf>,

    /// Configuration file (defaults to <config dir>/monitor-changer/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log the DDC command instead of running it
    #[arg(long)]
    dry_run: bool,

    /// Print connected USB devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Output format for --list-devices (json or text)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Print a sample configuration file and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            device: self.name.clone(),
            run_on: self.run_on.clone(),
            values: self.values.clone(),
            ddc_path: self.ddc_path.clone(),
            dry_run: self.dry_run,
        }
    }
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("{}", error_message(e.as_ref()));
        std::process::exit(1);
    }
}

/// Plain `Error: <message>` line, without the Debug form of the error
fn error_message(err: &dyn std::error::Error) -> String {
    format!("Error: {}", err)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.print_config {
        print!("{}", Config::sample_toml());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        config.log_level
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_filter()))
        .init();

    if cli.list_devices {
        return handle_list_devices(&cli.format);
    }

    let settings = Settings::resolve(cli.overrides(), config)?;

    let tool_path = match DdcTool::resolve(settings.ddc_path.as_deref()) {
        Ok(path) => path,
        Err(e) if settings.dry_run => {
            log::warn!("{}; dry run continues with '{}'", e, DDC_BINARY);
            PathBuf::from(DDC_BINARY)
        }
        Err(e) => return Err(e.into()),
    };
    let tool = DdcTool::new(tool_path).with_dry_run(settings.dry_run);
    log::debug!(
        "Using DDC tool at {} (dry run: {})",
        tool.path().display(),
        tool.is_dry_run()
    );

    let delegate = SwitchDelegate::from_settings(&settings, tool);
    let watcher = UsbWatcher::new(delegate)?;

    log::info!(
        "Watching for {} of '{}' ({} monitor input(s))",
        settings.effect,
        settings.device,
        settings.values.len()
    );
    watcher.run();

    Ok(())
}

/// Handle --list-devices
fn handle_list_devices(format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let devices = usb::list_devices()?;
    print!("{}", render_devices(&devices, format)?);
    Ok(())
}

fn render_devices(
    devices: &[UsbDevice],
    format: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    match format.to_lowercase().as_str() {
        "json" => Ok(format!("{}\n", serde_json::to_string_pretty(devices)?)),
        "text" => Ok(devices
            .iter()
            .map(|device| format!("{}\n", device.display_name()))
            .collect()),
        _ => Err(format!("Unknown format '{}'. Supported: json, text", format).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_uses_display() {
        let err = "plug".parse::<Effect>().unwrap_err();
        let boxed: Box<dyn std::error::Error> = err.into();
        assert_eq!(
            error_message(boxed.as_ref()),
            "Error: Invalid effect: Accepted run ons are add, remove. Your input: plug"
        );
    }

    #[test]
    fn test_error_message_invalid_value() {
        let err = Settings::resolve(
            CliOverrides {
                device: Some("Dock".to_string()),
                run_on: Some("add".to_string()),
                values: vec!["1:15".to_string()],
                ..Default::default()
            },
            Config::default(),
        )
        .unwrap_err();
        assert_eq!(
            error_message(&err),
            "Error: Invalid value: Value 1:15 does not match desired input: monitorId,inputId"
        );
    }

    #[test]
    fn test_render_devices_text() {
        let devices = vec![
            UsbDevice::new(Some("USB Receiver".to_string()), 1),
            UsbDevice::new(None, 2),
        ];
        assert_eq!(
            render_devices(&devices, "TEXT").unwrap(),
            "USB Receiver\n<unknown>\n"
        );
    }

    #[test]
    fn test_render_devices_json() {
        let devices = vec![UsbDevice::new(Some("Dock".to_string()), 7)];
        let out = render_devices(&devices, "json").unwrap();
        let parsed: Vec<UsbDevice> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, devices);
    }

    #[test]
    fn test_unknown_format_single_message() {
        let err = render_devices(&[], "yaml").unwrap_err();
        assert_eq!(
            error_message(err.as_ref()),
            "Error: Unknown format 'yaml'. Supported: json, text"
        );
    }
}
