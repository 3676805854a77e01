//! HD44780 character LCD driven in 4-bit mode through the expander.

mod bus;
mod device;
mod glyph;
mod init;
#[cfg(test)]
mod mock;

pub mod protocol;

pub use bus::{DisplayState, Timing};
pub use device::{CharLcd, LcdSettings};
pub use glyph::{Glyph, GLYPH_ROWS, GLYPH_SLOTS};
pub use init::{InitOptions, InitStep};
pub use protocol::{CursorDirection, Register};
