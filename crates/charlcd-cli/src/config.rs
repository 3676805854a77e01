//! Configuration management.

use anyhow::{Context, Result};
use charlcd_hw::{
    CursorDirection, InitOptions, LcdSettings, LineAddressTable, PinMap, Timing,
    DEFAULT_ADDRESS,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Bus and addressing
    #[serde(default)]
    pub device: DeviceConfig,

    /// Expander pin assignment
    #[serde(default)]
    pub pins: PinsConfig,

    /// Display flags applied at init
    #[serde(default)]
    pub display: DisplayConfig,

    /// Optional extra waits
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Device configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    /// 7-bit I2C address of the expander
    #[serde(default = "default_address")]
    pub address: u16,

    /// I2C adapter selector (e.g. "i2c-1"); first adapter if unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,

    /// DDRAM base address of each row
    #[serde(default = "default_line_addresses")]
    pub line_addresses: Vec<u8>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            controller: None,
            line_addresses: default_line_addresses(),
        }
    }
}

/// Expander bit of each LCD line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PinsConfig {
    #[serde(default = "default_rs")]
    pub rs: u8,
    #[serde(default = "default_rw")]
    pub rw: u8,
    #[serde(default = "default_en")]
    pub en: u8,
    #[serde(default = "default_bl")]
    pub bl: u8,
    #[serde(default = "default_d4")]
    pub d4: u8,
    #[serde(default = "default_d5")]
    pub d5: u8,
    #[serde(default = "default_d6")]
    pub d6: u8,
    #[serde(default = "default_d7")]
    pub d7: u8,

    /// Backlight state after init
    #[serde(default = "default_true")]
    pub backlight: bool,
}

impl Default for PinsConfig {
    fn default() -> Self {
        Self {
            rs: default_rs(),
            rw: default_rw(),
            en: default_en(),
            bl: default_bl(),
            d4: default_d4(),
            d5: default_d5(),
            d6: default_d6(),
            d7: default_d7(),
            backlight: true,
        }
    }
}

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub display_on: bool,

    #[serde(default)]
    pub cursor_on: bool,

    #[serde(default)]
    pub blink_on: bool,

    /// Cursor moves left to right after each character
    #[serde(default = "default_true")]
    pub increment: bool,

    /// Shift the display instead of the cursor
    #[serde(default)]
    pub shift: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            display_on: true,
            cursor_on: false,
            blink_on: false,
            increment: true,
            shift: false,
        }
    }
}

/// Timing configuration. Zero disables a wait.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TimingConfig {
    /// Wait after every byte written, in milliseconds
    #[serde(default)]
    pub write_delay_ms: u64,

    /// Wait after every enable pulse, in milliseconds
    #[serde(default)]
    pub pulse_settle_ms: u64,
}

// Default value functions
fn default_address() -> u16 {
    DEFAULT_ADDRESS
}

fn default_line_addresses() -> Vec<u8> {
    LineAddressTable::default().as_slice().to_vec()
}

fn default_true() -> bool {
    true
}

fn default_rs() -> u8 {
    0
}

fn default_rw() -> u8 {
    1
}

fn default_en() -> u8 {
    2
}

fn default_bl() -> u8 {
    3
}

fn default_d4() -> u8 {
    4
}

fn default_d5() -> u8 {
    5
}

fn default_d6() -> u8 {
    6
}

fn default_d7() -> u8 {
    7
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse configuration")?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path.as_ref(), content).context("Failed to write configuration file")?;
        Ok(())
    }

    /// Validates the configuration into driver settings.
    pub fn settings(&self) -> Result<LcdSettings> {
        let p = &self.pins;
        let pins = PinMap::new(p.rs, p.rw, p.en, p.d4, p.d5, p.d6, p.d7, p.bl)
            .context("Invalid [pins] configuration")?
            .with_backlight(p.backlight);

        let lines = LineAddressTable::new(self.device.line_addresses.clone())
            .context("Invalid device.line_addresses")?;

        let d = &self.display;
        let init = InitOptions {
            display_on: d.display_on,
            cursor_on: d.cursor_on,
            blink_on: d.blink_on,
            direction: if d.increment {
                CursorDirection::Right
            } else {
                CursorDirection::Left
            },
            shift: d.shift,
        };

        let timing = Timing {
            write_delay: millis(self.timing.write_delay_ms),
            pulse_settle: millis(self.timing.pulse_settle_ms),
        };

        Ok(LcdSettings {
            pins,
            lines,
            init,
            timing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.settings().unwrap(), LcdSettings::default());
    }

    #[test]
    fn test_parse_full_file() {
        let config = Config::parse(
            r#"
            [device]
            address = 0x3F
            controller = "i2c-1"
            line_addresses = [0x00, 0x40, 0x14, 0x54]

            [pins]
            rs = 4
            rw = 5
            en = 7
            bl = 6
            d4 = 0
            d5 = 1
            d6 = 2
            d7 = 3
            backlight = false

            [display]
            cursor_on = true
            increment = false

            [timing]
            write_delay_ms = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.device.address, 0x3F);
        assert_eq!(config.device.controller.as_deref(), Some("i2c-1"));

        let settings = config.settings().unwrap();
        assert_eq!(settings.lines, LineAddressTable::four_line_20());
        assert_eq!(
            settings.pins,
            PinMap::new(4, 5, 7, 0, 1, 2, 3, 6)
                .unwrap()
                .with_backlight(false)
        );
        assert!(settings.init.cursor_on);
        assert_eq!(settings.init.direction, CursorDirection::Left);
        assert_eq!(settings.timing.write_delay, Some(Duration::from_millis(5)));
        assert_eq!(settings.timing.pulse_settle, None);
    }

    #[test]
    fn test_duplicate_pins_rejected() {
        let config = Config::parse("[pins]\nrs = 3\n").unwrap();
        assert!(config.settings().is_err());
    }

    #[test]
    fn test_empty_line_table_rejected() {
        let config = Config::parse("[device]\nline_addresses = []\n").unwrap();
        assert!(config.settings().is_err());
    }

    #[test]
    fn test_shipped_default_file() {
        let config = Config::parse(include_str!("../../../config/default.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut config = Config::default();
        config.device.address = 0x3F;
        config.device.controller = Some("i2c-2".to_string());
        config.timing.pulse_settle_ms = 1;

        let path = std::env::temp_dir().join(format!("charlcd-config-{}.toml", std::process::id()));
        config.save(&path).unwrap();
        let loaded = Config::load(&path);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.unwrap(), config);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), config);
    }
}
