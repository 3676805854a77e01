//! Character LCD Hardware Library
//!
//! Drives HD44780-compatible character displays through a PCF8574-class I2C
//! port expander wired for the controller's 4-bit bus.

pub mod error;
pub mod lcd;
pub mod lines;
pub mod pins;
pub mod transport;

pub use error::{BusError, ConfigurationError, Error, Result};
pub use lcd::{CharLcd, CursorDirection, Glyph, InitOptions, LcdSettings, Timing};
pub use lines::LineAddressTable;
pub use pins::{PinMap, PinRole};
pub use transport::{I2cController, I2cTransport, Transport};

/// Most common PCF8574 backpack address (PCF8574A boards use 0x3F).
pub const DEFAULT_ADDRESS: u16 = 0x27;
