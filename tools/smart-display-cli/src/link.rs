//! Opening the display link
//!
//! The transport takes any `Write + Send`; this picks the serial port or the
//! capture link depending on how the tool was invoked.

use anyhow::{Context, Result};
use colored::Colorize;
use smart_display::{CaptureLink, Transport};
use std::path::Path;

use crate::config::DisplayConfig;

/// Start a transport on the serial port, or on a capture link writing to
/// `debug` when that is set
pub fn open(config: &DisplayConfig, debug: Option<&Path>) -> Result<Transport> {
    if let Some(path) = debug {
        println!(
            "{} Debug mode: rendering to {}",
            "[*]".cyan().bold(),
            path.display().to_string().white()
        );
        let link = CaptureLink::new(config.width, config.height).with_output(path);
        return Transport::spawn(link).context("Failed to start link writer");
    }

    open_serial(config)
}

#[cfg(feature = "serial")]
fn open_serial(config: &DisplayConfig) -> Result<Transport> {
    use std::time::Duration;

    let port = serialport::new(&config.port, config.baud_rate)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .flow_control(serialport::FlowControl::None)
        .timeout(Duration::from_secs(1))
        .open()
        .with_context(|| format!("Failed to open serial port: {}", config.port))?;

    println!(
        "{} Connected to {} at {} baud",
        "[OK]".green().bold(),
        config.port.white(),
        config.baud_rate
    );
    Transport::spawn(port).context("Failed to start link writer")
}

#[cfg(not(feature = "serial"))]
fn open_serial(config: &DisplayConfig) -> Result<Transport> {
    anyhow::bail!(
        "Cannot open {}: built without serial support. Rebuild with --features serial or pass --debug <png>",
        config.port
    )
}

/// Print available serial ports
#[cfg(feature = "serial")]
pub fn print_ports() -> Result<()> {
    let ports = serialport::available_ports().context("Failed to enumerate serial ports")?;

    if ports.is_empty() {
        println!("{}", "No serial ports found".yellow());
        return Ok(());
    }

    println!("{}", "Available serial ports:".cyan().bold());
    for port in ports {
        match port.port_type {
            serialport::SerialPortType::UsbPort(info) => {
                println!(
                    "  {} [{:04x}:{:04x}] {}",
                    port.port_name.white().bold(),
                    info.vid,
                    info.pid,
                    info.product.unwrap_or_default().dimmed()
                );
            }
            _ => println!("  {}", port.port_name.white().bold()),
        }
    }

    Ok(())
}
