//! User-defined characters in CGRAM.

use super::protocol::cgram_slot_address;
use crate::{Error, Result};

/// Rows per 5x8 glyph.
pub const GLYPH_ROWS: usize = 8;

/// Number of CGRAM glyph slots.
pub const GLYPH_SLOTS: u8 = 8;

/// A 5x8 bitmap bound to a CGRAM slot.
///
/// Row bytes are sent as given; only the low five bits are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    rows: [u8; GLYPH_ROWS],
    slot: u8,
}

impl Glyph {
    /// Validates a bitmap and slot.
    pub fn new(bitmap: &[u8], slot: u8) -> Result<Self> {
        let rows: [u8; GLYPH_ROWS] = bitmap.try_into().map_err(|_| Error::InvalidGlyph {
            len: bitmap.len(),
            slot,
        })?;
        Self::check_slot(slot, bitmap.len())?;
        Ok(Self { rows, slot })
    }

    /// Checks a slot index on its own, for printing a stored glyph.
    pub(crate) fn check_slot(slot: u8, len: usize) -> Result<()> {
        if slot >= GLYPH_SLOTS {
            return Err(Error::InvalidGlyph { len, slot });
        }
        Ok(())
    }

    pub fn rows(&self) -> &[u8; GLYPH_ROWS] {
        &self.rows
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    /// Set CGRAM address instruction for the first row of this glyph.
    pub fn address_command(&self) -> u8 {
        cgram_slot_address(self.slot)
    }
}
