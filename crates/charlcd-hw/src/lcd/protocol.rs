//! HD44780 instruction encoding and expander byte layout.
//!
//! Instruction set (RS = 0):
//! - `0000_0001` clear display
//! - `0000_001-` return home
//! - `0000_01IS` entry mode (I = increment, S = shift display)
//! - `0000_1DCB` display control (D = display, C = cursor, B = blink)
//! - `0001_SR--` cursor/display shift (S = shift display, R = right)
//! - `001D_NF--` function set (D = 8-bit, N = two lines, F = 5x10 font)
//! - `01AA_AAAA` set CGRAM address
//! - `1AAA_AAAA` set DDRAM address
//!
//! In 4-bit mode every byte travels as two nibbles on D4..D7, high nibble first.

use crate::pins::{PinMap, PinRole};
use std::time::Duration;

/// Clear display instruction.
pub const CLEAR_DISPLAY: u8 = 0b0000_0001;

/// Return home instruction.
pub const RETURN_HOME: u8 = 0b0000_0010;

/// Entry mode set instruction base.
pub const ENTRY_MODE_SET: u8 = 0b0000_0100;

/// Display on/off control instruction base.
pub const DISPLAY_CONTROL: u8 = 0b0000_1000;

/// Cursor or display shift instruction base.
pub const CURSOR_SHIFT: u8 = 0b0001_0000;

/// Function set instruction base.
pub const FUNCTION_SET: u8 = 0b0010_0000;

/// Set CGRAM address instruction base.
pub const SET_CGRAM_ADDRESS: u8 = 0b0100_0000;

/// Set DDRAM address instruction base.
pub const SET_DDRAM_ADDRESS: u8 = 0b1000_0000;

/// DDRAM address 0x40 (start of the second controller line) with the set bit.
pub const SECOND_LINE: u8 = 0xC0;

/// Function set, 8-bit interface, as a lone high nibble.
pub const FUNCTION_SET_8BIT_NIBBLE: u8 = 0b0011;

/// Function set, 4-bit interface, as a lone high nibble.
pub const FUNCTION_SET_4BIT_NIBBLE: u8 = 0b0010;

/// Function set: 4-bit interface, two lines, 5x8 font.
pub const FUNCTION_SET_4BIT_TWO_LINE: u8 = FUNCTION_SET | 0b0000_1000;

/// Largest DDRAM address.
pub const MAX_DDRAM_ADDRESS: u8 = 0x7F;

/// Largest CGRAM address.
pub const MAX_CGRAM_ADDRESS: u8 = 0x3F;

/// Power-up settling time before the first instruction.
pub const POWER_ON_DELAY: Duration = Duration::from_millis(100);

/// Wait between the 8-bit function set repeats.
pub const FUNCTION_SET_DELAY: Duration = Duration::from_millis(5);

/// Execution time of clear display / return home.
pub const CLEAR_DELAY: Duration = Duration::from_millis(5);

/// Register selected by the RS line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// RS = 0.
    Instruction,
    /// RS = 1, DDRAM or CGRAM data.
    Data,
}

/// Cursor movement after a data write.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum CursorDirection {
    /// Decrement the address counter.
    Left,
    /// Increment the address counter (left to right text).
    #[default]
    Right,
}

/// Builds the expander output byte for one nibble.
///
/// Each of the low four bits of `nibble` lands on the bit mapped to D4..D7.
/// RS is set for [`Register::Data`], BL follows `backlight`, and RW and EN
/// are always low.
pub fn build_expander_byte(nibble: u8, register: Register, pins: &PinMap, backlight: bool) -> u8 {
    let mut byte = 0u8;
    for (i, role) in PinRole::DATA.iter().enumerate() {
        if nibble & (1 << i) != 0 {
            byte |= pins.mask(*role);
        }
    }
    if register == Register::Data {
        byte |= pins.mask(PinRole::Rs);
    }
    if backlight {
        byte |= pins.mask(PinRole::Bl);
    }
    byte
}

/// Splits a byte into its (high, low) nibbles.
pub fn split_nibbles(value: u8) -> (u8, u8) {
    ((value >> 4) & 0x0F, value & 0x0F)
}

/// Entry mode set instruction.
pub fn entry_mode(direction: CursorDirection, shift: bool) -> u8 {
    let mut command = ENTRY_MODE_SET;
    if direction == CursorDirection::Right {
        command |= 0b0000_0010;
    }
    if shift {
        command |= 0b0000_0001;
    }
    command
}

/// Display on/off control instruction.
pub fn display_control(display_on: bool, cursor_on: bool, blink_on: bool) -> u8 {
    let mut command = DISPLAY_CONTROL;
    if display_on {
        command |= 0b0000_0100;
    }
    if cursor_on {
        command |= 0b0000_0010;
    }
    if blink_on {
        command |= 0b0000_0001;
    }
    command
}

/// Cursor or display shift instruction.
pub fn cursor_shift(display_shift: bool, direction: CursorDirection) -> u8 {
    let mut command = CURSOR_SHIFT;
    if display_shift {
        command |= 0b0000_1000;
    }
    if direction == CursorDirection::Right {
        command |= 0b0000_0100;
    }
    command
}

/// Set DDRAM address for column `x` of a row starting at `row_base`.
///
/// Matches the controller's addressing: the column is OR'd into the base,
/// not added, so `x` must stay below the row's width.
pub fn goto_address(x: u8, row_base: u8) -> u8 {
    x | row_base | SET_DDRAM_ADDRESS
}

/// Set CGRAM address instruction selecting the first row of glyph `slot`.
pub fn cgram_slot_address(slot: u8) -> u8 {
    SET_CGRAM_ADDRESS | (slot << 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every pin map whose eight lines are a permutation of bits 0..8.
    fn all_pin_maps() -> Vec<PinMap> {
        fn permute(prefix: &mut Vec<u8>, out: &mut Vec<PinMap>) {
            if prefix.len() == 8 {
                let b = prefix.as_slice();
                out.push(PinMap::new(b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]).unwrap());
                return;
            }
            for bit in 0..8 {
                if !prefix.contains(&bit) {
                    prefix.push(bit);
                    permute(prefix, out);
                    prefix.pop();
                }
            }
        }
        let mut out = Vec::new();
        permute(&mut Vec::new(), &mut out);
        out
    }

    #[test]
    fn test_builder_standard_wiring() {
        let pins = PinMap::standard();
        assert_eq!(
            build_expander_byte(0b0011, Register::Instruction, &pins, false),
            0x30
        );
        assert_eq!(build_expander_byte(0b0100, Register::Data, &pins, true), 0x49);
        assert_eq!(build_expander_byte(0, Register::Instruction, &pins, true), 0x08);
    }

    #[test]
    fn test_builder_mapped_bits_follow_inputs() {
        for pins in all_pin_maps() {
            for nibble in 0..16u8 {
                for register in [Register::Instruction, Register::Data] {
                    for backlight in [false, true] {
                        let byte = build_expander_byte(nibble, register, &pins, backlight);
                        for (i, role) in PinRole::DATA.iter().enumerate() {
                            let expected = nibble & (1 << i) != 0;
                            assert_eq!(byte & pins.mask(*role) != 0, expected);
                        }
                        assert_eq!(
                            byte & pins.mask(PinRole::Rs) != 0,
                            register == Register::Data
                        );
                        assert_eq!(byte & pins.mask(PinRole::Bl) != 0, backlight);
                        assert_eq!(byte & pins.mask(PinRole::Rw), 0);
                        assert_eq!(byte & pins.mask(PinRole::En), 0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_builder_ignores_high_bits() {
        let pins = PinMap::standard();
        assert_eq!(
            build_expander_byte(0xF5, Register::Instruction, &pins, false),
            build_expander_byte(0x05, Register::Instruction, &pins, false)
        );
    }

    #[test]
    fn test_split_nibbles() {
        assert_eq!(split_nibbles(0x28), (0x2, 0x8));
        assert_eq!(split_nibbles(0xC0), (0xC, 0x0));
    }

    #[test]
    fn test_command_encoding() {
        assert_eq!(entry_mode(CursorDirection::Right, false), 0x06);
        assert_eq!(entry_mode(CursorDirection::Left, true), 0x05);
        assert_eq!(display_control(true, false, false), 0x0C);
        assert_eq!(display_control(true, true, true), 0x0F);
        assert_eq!(cursor_shift(true, CursorDirection::Left), 0x18);
        assert_eq!(cursor_shift(false, CursorDirection::Right), 0x14);
        assert_eq!(FUNCTION_SET_4BIT_TWO_LINE, 0x28);
        assert_eq!(goto_address(3, 0x40), 0xC3);
        assert_eq!(goto_address(0, 0x40), SECOND_LINE);
        assert_eq!(cgram_slot_address(3), 0x58);
    }
}
