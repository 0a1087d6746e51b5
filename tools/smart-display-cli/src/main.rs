//! Smart Display
//!
//! Drives a USB serial RGB565 display: renders a status view on the host and
//! sends only the tiles that changed since the last refresh.
//!
//! # Usage
//!
//! ```bash
//! # Refresh the clock view every second on /dev/ttyACM0 (requires serial feature)
//! smart-display run -p /dev/ttyACM0
//!
//! # Render ten refreshes into a PNG instead of a real display
//! smart-display run --debug screen.png --count 10
//!
//! # One-shot commands
//! smart-display clear
//! smart-display brightness 40
//!
//! # List available serial ports (requires serial feature)
//! smart-display ports
//! ```

mod config;
mod link;
mod view;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use smart_display::{DisplayController, FontRenderer, Framebuffer, Orientation, UpdateMode};
use std::path::{Path, PathBuf};
use std::thread;

use config::DisplayConfig;
use view::StatusView;

/// Smart Display
///
/// Damage-tracking driver for serial RGB565 displays
#[derive(Parser)]
#[command(name = "smart-display")]
#[command(version = "0.1.0")]
#[command(about = "Damage-tracking driver for serial RGB565 smart displays")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Serial port path (e.g., /dev/ttyACM0)
    #[arg(short, long, global = true)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long, global = true)]
    baud: Option<u32>,

    /// Screen orientation (portrait, reverse-portrait, landscape, reverse-landscape)
    #[arg(short, long, global = true)]
    orientation: Option<Orientation>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw the status view and keep it up to date
    Run {
        /// Render into this PNG instead of the serial port; rewritten after
        /// every refresh
        #[arg(long)]
        debug: Option<PathBuf>,

        /// Stop after this many refreshes
        #[arg(short = 'n', long)]
        count: Option<u64>,

        /// Refresh interval in milliseconds
        #[arg(short, long)]
        interval: Option<u64>,

        /// TrueType font for text
        #[arg(short, long)]
        font: Option<PathBuf>,

        /// Brightness 0-100
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        brightness: Option<u8>,
    },

    /// Clear the screen to white
    Clear,

    /// Set backlight brightness
    Brightness {
        /// Level 0-100
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        level: u8,
    },

    /// List available serial ports (requires --features serial)
    #[cfg(feature = "serial")]
    Ports,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = DisplayConfig::load_or_default(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(baud) = cli.baud {
        config.baud_rate = baud;
    }
    if let Some(orientation) = cli.orientation {
        config.orientation = orientation;
    }

    match cli.command {
        Commands::Run {
            debug,
            count,
            interval,
            font,
            brightness,
        } => {
            if let Some(ms) = interval {
                config.interval_ms = ms;
            }
            if font.is_some() {
                config.font = font;
            }
            if brightness.is_some() {
                config.brightness = brightness;
            }
            handle_run(&config, debug.as_deref(), count)
        }
        Commands::Clear => handle_clear(&config),
        Commands::Brightness { level } => handle_brightness(&config, level),
        #[cfg(feature = "serial")]
        Commands::Ports => link::print_ports(),
    }
}

fn connect(config: &DisplayConfig, debug: Option<&Path>) -> Result<DisplayController> {
    let geometry = config.geometry()?;
    let transport = link::open(config, debug)?;
    Ok(DisplayController::new(geometry, transport).with_segment_size(config.segment_size))
}

fn load_font(config: &DisplayConfig) -> Result<Option<FontRenderer>> {
    let Some(path) = &config.font else {
        return Ok(None);
    };
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read font: {}", path.display()))?;
    let font = FontRenderer::new(&data, config.font_size)
        .with_context(|| format!("Failed to load font: {}", path.display()))?;
    Ok(Some(font))
}

fn handle_run(config: &DisplayConfig, debug: Option<&Path>, count: Option<u64>) -> Result<()> {
    let font = load_font(config)?;
    if font.is_none() {
        log::info!("no font configured, drawing gauges only");
    }
    let view = StatusView::new(font, format!("{} @ {}", config.port, config.baud_rate));

    let mut controller = connect(config, debug)?;
    let geometry = controller.geometry();
    controller.set_orientation(config.orientation)?;
    if let Some(level) = config.brightness {
        controller.set_brightness(level)?;
    }

    let mut fb = Framebuffer::new(geometry.width(), geometry.height());
    view.draw(&mut fb, chrono::Local::now().naive_local(), 0);
    controller.update(&fb, UpdateMode::Full)?;
    controller.flush()?;

    println!(
        "{} Refreshing every {} ms{}",
        "[*]".cyan().bold(),
        config.interval_ms,
        count.map(|n| format!(", {} times", n)).unwrap_or_default()
    );

    let mut refreshes = 0u64;
    while count.map_or(true, |n| refreshes < n) {
        thread::sleep(config.interval());
        refreshes += 1;

        view.draw(&mut fb, chrono::Local::now().naive_local(), refreshes);
        let report = controller.update(&fb, UpdateMode::Diff)?;
        controller.flush()?;
        log::debug!(
            "refresh {}: {} tiles, {} bytes",
            refreshes,
            report.regions,
            report.bytes
        );
    }

    let stats = controller.shutdown()?;
    println!(
        "{} Done: {} refreshes, {} buffers, {} bytes written",
        "[OK]".green().bold(),
        refreshes,
        stats.buffers,
        stats.bytes
    );
    if stats.failed > 0 {
        eprintln!(
            "{} {} writes failed and were dropped",
            "[ERROR]".red().bold(),
            stats.failed
        );
    }

    Ok(())
}

fn handle_clear(config: &DisplayConfig) -> Result<()> {
    let controller = connect(config, None)?;
    // The firmware clears in portrait orientation
    controller.set_orientation(Orientation::Portrait)?;
    controller.clear()?;
    controller.shutdown()?;

    println!("{} Screen cleared", "[OK]".green().bold());
    Ok(())
}

fn handle_brightness(config: &DisplayConfig, level: u8) -> Result<()> {
    let controller = connect(config, None)?;
    controller.set_brightness(level)?;
    controller.shutdown()?;

    println!("{} Brightness set to {}", "[OK]".green().bold(), level);
    Ok(())
}
