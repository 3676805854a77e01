//! Expander pin assignment.
//!
//! A PCF8574 backpack exposes the LCD's control and data lines on the eight
//! bits of the expander's output port. Which bit drives which line depends on
//! the vendor, so every line is configured by bit index and validated once.

use crate::error::ConfigurationError;

/// Logical line driven through the expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinRole {
    /// Register select (0 = instruction, 1 = data).
    Rs,
    /// Read/write. Always driven low.
    Rw,
    /// Enable strobe.
    En,
    D4,
    D5,
    D6,
    D7,
    /// Backlight transistor.
    Bl,
}

impl PinRole {
    /// All roles in configuration order.
    pub const ALL: [PinRole; 8] = [
        PinRole::Rs,
        PinRole::Rw,
        PinRole::En,
        PinRole::D4,
        PinRole::D5,
        PinRole::D6,
        PinRole::D7,
        PinRole::Bl,
    ];

    /// Data lines, least significant nibble bit first.
    pub const DATA: [PinRole; 4] = [PinRole::D4, PinRole::D5, PinRole::D6, PinRole::D7];
}

impl std::fmt::Display for PinRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinRole::Rs => write!(f, "RS"),
            PinRole::Rw => write!(f, "RW"),
            PinRole::En => write!(f, "EN"),
            PinRole::D4 => write!(f, "D4"),
            PinRole::D5 => write!(f, "D5"),
            PinRole::D6 => write!(f, "D6"),
            PinRole::D7 => write!(f, "D7"),
            PinRole::Bl => write!(f, "BL"),
        }
    }
}

/// Validated mapping of LCD lines to expander bits.
///
/// Immutable once built; all bit indices are in `0..8` and pairwise distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMap {
    bits: [u8; 8],
    backlight: bool,
}

impl PinMap {
    /// Builds a pin map from one bit index per line.
    ///
    /// The backlight starts on; see [`PinMap::with_backlight`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rs: u8,
        rw: u8,
        en: u8,
        d4: u8,
        d5: u8,
        d6: u8,
        d7: u8,
        bl: u8,
    ) -> Result<Self, ConfigurationError> {
        let bits = [rs, rw, en, d4, d5, d6, d7, bl];

        for (role, &bit) in PinRole::ALL.iter().zip(bits.iter()) {
            if bit > 7 {
                return Err(ConfigurationError::OutOfRange { role: *role, bit });
            }
        }

        for i in 0..bits.len() {
            for j in (i + 1)..bits.len() {
                if bits[i] == bits[j] {
                    return Err(ConfigurationError::DuplicatePin {
                        first: PinRole::ALL[i],
                        second: PinRole::ALL[j],
                        bit: bits[i],
                    });
                }
            }
        }

        Ok(Self {
            bits,
            backlight: true,
        })
    }

    /// The common backpack wiring: RS=P0, RW=P1, EN=P2, BL=P3, D4..D7=P4..P7.
    pub fn standard() -> Self {
        Self {
            bits: [0, 1, 2, 4, 5, 6, 7, 3],
            backlight: true,
        }
    }

    /// Sets the backlight state a new session starts with.
    pub fn with_backlight(mut self, on: bool) -> Self {
        self.backlight = on;
        self
    }

    /// Initial backlight state.
    pub fn backlight_default(&self) -> bool {
        self.backlight
    }

    /// Expander bit index of a line.
    pub fn bit(&self, role: PinRole) -> u8 {
        self.bits[role as usize]
    }

    /// Single-bit mask of a line.
    pub fn mask(&self, role: PinRole) -> u8 {
        1 << self.bit(role)
    }
}

impl Default for PinMap {
    fn default() -> Self {
        Self::standard()
    }
}
