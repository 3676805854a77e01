//! Character LCD Control Tool
//!
//! CLI for driving an HD44780 display on a PCF8574 I2C backpack.

mod config;

use anyhow::{Context, Result};
use charlcd_hw::transport::list_controllers;
use charlcd_hw::{CharLcd, Glyph, I2cTransport};
use clap::{Parser, Subcommand};
use config::Config;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config/default.toml";

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Switch {
    On,
    Off,
}

#[derive(Parser)]
#[command(name = "charlcdctl")]
#[command(about = "Control tool for HD44780 character LCDs on an I2C backpack")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (default: config/default.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Expander I2C address, decimal or 0x-prefixed hex
    #[arg(long, value_parser = parse_byte)]
    address: Option<u8>,

    /// I2C controller to use (e.g. i2c-1, 1, or part of the adapter name)
    #[arg(long)]
    controller: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print text, one argument per row
    Print {
        /// Text to show; further arguments go to the following rows
        #[arg(required = true)]
        text: Vec<String>,

        /// Starting row
        #[arg(long, default_value = "0")]
        row: usize,

        /// Starting column
        #[arg(long, default_value = "0")]
        col: u8,

        /// Keep the current contents instead of clearing first
        #[arg(long)]
        no_clear: bool,
    },
    /// Clear the display
    Clear,
    /// Move the cursor home and undo display shifts
    Home,
    /// Move the cursor
    Goto {
        /// Column
        x: u8,
        /// Row
        row: usize,
    },
    /// Move the cursor to the start of the second row
    SecondLine,
    /// Switch the backlight
    Backlight {
        #[arg(value_enum)]
        state: Switch,
    },
    /// Custom character commands
    Symbol {
        #[command(subcommand)]
        action: SymbolCommands,
    },
    /// Set display, cursor and blink flags
    Display {
        /// Show the underline cursor
        #[arg(long)]
        cursor: bool,

        /// Blink the cursor cell
        #[arg(long)]
        blink: bool,

        /// Turn the display off (contents are kept)
        #[arg(long)]
        off: bool,
    },
    /// List I2C controllers
    Controllers,
    /// Show the effective configuration
    Config {
        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,

        /// Write the effective configuration to this file instead
        #[arg(long, conflicts_with = "json")]
        save: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum SymbolCommands {
    /// Store a 5x8 glyph in a CGRAM slot
    Create {
        /// Slot (0-7)
        slot: u8,

        /// Eight row bitmaps, top to bottom (e.g. 0x0E)
        #[arg(num_args = 8, value_parser = parse_byte)]
        rows: Vec<u8>,
    },
    /// Print the glyph stored in a slot
    Print {
        /// Slot (0-7)
        slot: u8,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref(), cli.verbose))
        .init();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(address) = cli.address {
        config.device.address = address.into();
    }
    if let Some(controller) = cli.controller {
        config.device.controller = Some(controller);
    }

    // Commands that never touch the display
    match cli.command {
        Commands::Controllers => return handle_controllers().await,
        Commands::Config { json, ref save } => {
            return handle_config(&config, json, save.as_deref())
        }
        _ => {}
    }

    let settings = config.settings()?;
    let lcd = CharLcd::open(
        config.device.address,
        config.device.controller.as_deref(),
        settings,
    )
    .await
    .with_context(|| {
        format!(
            "Failed to open LCD at address {:#04x}",
            config.device.address
        )
    })?;

    handle_display(cli.command, &lcd)
}

/// `RUST_LOG` wins when set and valid; otherwise `-v` picks debug over warn.
fn log_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(if verbose { "debug" } else { "warn" }))
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None if Path::new(DEFAULT_CONFIG).exists() => Config::load(DEFAULT_CONFIG)
            .with_context(|| format!("Failed to load config from {}", DEFAULT_CONFIG)),
        None => {
            debug!("No config file, using defaults");
            Ok(Config::default())
        }
    }
}

/// Accepts `39`, `0x27` or `0X27`.
fn parse_byte(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid byte '{}': {}", s, e))
}

async fn handle_controllers() -> Result<()> {
    let controllers = list_controllers()
        .await
        .context("Failed to enumerate I2C controllers")?;

    if controllers.is_empty() {
        println!("No I2C controllers found (is the i2c-dev module loaded?)");
        return Ok(());
    }

    println!("I2C controllers:");
    for controller in controllers {
        println!("  {}", controller);
    }

    Ok(())
}

fn handle_config(config: &Config, json: bool, save: Option<&Path>) -> Result<()> {
    if let Some(path) = save {
        config
            .save(path)
            .with_context(|| format!("Failed to save config to {}", path.display()))?;
        println!("Configuration saved to {}", path.display());
        return Ok(());
    }

    let text = if json {
        serde_json::to_string_pretty(config).context("Failed to serialize configuration")?
    } else {
        toml::to_string_pretty(config).context("Failed to serialize configuration")?
    };
    println!("{}", text);
    Ok(())
}

fn handle_display(command: Commands, lcd: &CharLcd<I2cTransport>) -> Result<()> {
    match command {
        Commands::Print {
            text,
            row,
            col,
            no_clear,
        } => {
            if !no_clear {
                lcd.clear_screen()?;
            }
            for (offset, line) in text.iter().enumerate() {
                let x = if offset == 0 { col } else { 0 };
                lcd.goto_xy(x, row + offset)?;
                lcd.print(line)
                    .with_context(|| format!("Failed to print '{}'", line))?;
            }
        }
        Commands::Clear => {
            lcd.clear_screen()?;
            println!("Display cleared");
        }
        Commands::Home => {
            lcd.return_home()?;
        }
        Commands::Goto { x, row } => {
            lcd.goto_xy(x, row)?;
        }
        Commands::SecondLine => {
            lcd.goto_second_line()?;
        }
        Commands::Backlight { state } => match state {
            Switch::On => {
                lcd.turn_on_backlight()?;
                println!("Backlight turned on");
            }
            Switch::Off => {
                lcd.turn_off_backlight()?;
                println!("Backlight turned off");
            }
        },
        Commands::Symbol { action } => handle_symbol(action, lcd)?,
        Commands::Display { cursor, blink, off } => {
            lcd.set_display_control(!off, cursor, blink)?;
            println!(
                "Display {} (cursor: {}, blink: {})",
                if off { "off" } else { "on" },
                if cursor { "on" } else { "off" },
                if blink { "on" } else { "off" }
            );
        }
        Commands::Controllers | Commands::Config { .. } => {
            anyhow::bail!("Command does not use the display")
        }
    }

    Ok(())
}

fn handle_symbol(action: SymbolCommands, lcd: &CharLcd<I2cTransport>) -> Result<()> {
    match action {
        SymbolCommands::Create { slot, rows } => {
            let glyph = Glyph::new(&rows, slot)?;
            lcd.store_glyph(&glyph)?;
            println!("Symbol stored in slot {}", slot);
        }
        SymbolCommands::Print { slot } => {
            lcd.print_symbol(slot)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_byte() {
        assert_eq!(parse_byte("39"), Ok(0x27));
        assert_eq!(parse_byte("0x27"), Ok(0x27));
        assert_eq!(parse_byte("0X3f"), Ok(0x3F));
        assert!(parse_byte("0x100").is_err());
        assert!(parse_byte("lcd").is_err());
    }

    #[test]
    fn test_symbol_create_takes_eight_rows() {
        let cli = Cli::try_parse_from([
            "charlcdctl", "symbol", "create", "2", "0x00", "0x0A", "0x1F", "0x1F", "0x0E",
            "0x04", "0x00", "0x00",
        ])
        .unwrap();
        match cli.command {
            Commands::Symbol {
                action: SymbolCommands::Create { slot, rows },
            } => {
                assert_eq!(slot, 2);
                assert_eq!(rows, vec![0x00, 0x0A, 0x1F, 0x1F, 0x0E, 0x04, 0x00, 0x00]);
            }
            _ => panic!("expected symbol create"),
        }

        assert!(Cli::try_parse_from(["charlcdctl", "symbol", "create", "2", "0x00"]).is_err());
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from([
            "charlcdctl",
            "--address",
            "0x3f",
            "--controller",
            "i2c-1",
            "backlight",
            "off",
        ])
        .unwrap();
        assert_eq!(cli.address, Some(0x3F));
        assert_eq!(cli.controller.as_deref(), Some("i2c-1"));
        assert!(matches!(
            cli.command,
            Commands::Backlight { state: Switch::Off }
        ));
    }

    #[test]
    fn test_log_filter_prefers_rust_log() {
        assert_eq!(log_filter(Some("charlcd_hw=trace"), false).to_string(), "charlcd_hw=trace");
        assert_eq!(log_filter(None, true).to_string(), "debug");
        assert_eq!(log_filter(None, false).to_string(), "warn");
        assert_eq!(log_filter(Some(""), true).to_string(), "debug");
    }

    #[test]
    fn test_config_save_conflicts_with_json() {
        assert!(Cli::try_parse_from(["charlcdctl", "config", "--json", "--save", "out.toml"]).is_err());
        let cli = Cli::try_parse_from(["charlcdctl", "config", "--save", "out.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config { json: false, save: Some(ref path) } if path == Path::new("out.toml")
        ));
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        assert!(load_config(Some(Path::new("/nonexistent/charlcd.toml"))).is_err());
    }
}
