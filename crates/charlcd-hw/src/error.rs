//! Error types for the character LCD driver.

use crate::pins::PinRole;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when configuring or driving the display.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid pin map or line address table.
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    /// No I2C controller matched the selector during session start.
    #[error("No I2C controller available ({0})")]
    BusUnavailable(String),

    /// A transport write failed mid-protocol. The controller state is
    /// indeterminate until the init sequence is run again.
    #[error("I2C transfer failed: {0}")]
    Transfer(#[from] BusError),

    /// CGRAM bitmap has the wrong length or the slot is out of range.
    #[error("Invalid glyph: {len} rows for slot {slot} (need 8 rows, slot 0-7)")]
    InvalidGlyph { len: usize, slot: u8 },

    /// Row index outside the line address table.
    #[error("Row {row} out of range (display has {rows} rows)")]
    Index { row: usize, rows: usize },

    /// Character has no code in the controller's 8-bit character set.
    #[error("Character {0:?} has no HD44780 character code")]
    UnsupportedCharacter(char),

    /// DDRAM/CGRAM address does not fit the instruction.
    #[error("Address 0x{0:02X} out of range")]
    InvalidAddress(u8),
}

/// Construction-time configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Two control lines were mapped to the same expander bit.
    #[error("{first} and {second} both mapped to bit {bit}")]
    DuplicatePin {
        first: PinRole,
        second: PinRole,
        bit: u8,
    },

    /// A control line was mapped outside the expander's 8 bits.
    #[error("{role} mapped to bit {bit} (must be 0-7)")]
    OutOfRange { role: PinRole, bit: u8 },

    /// The line address table has no rows.
    #[error("line address table is empty")]
    EmptyLineTable,
}

/// Errors reported by a [`Transport`](crate::transport::Transport).
#[derive(Error, Debug)]
pub enum BusError {
    /// Linux i2c-dev error.
    #[error("I2C error: {0}")]
    I2c(#[from] i2cdev::linux::LinuxI2CError),

    /// I/O error outside the i2c-dev ioctl path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}
