//! 4-bit bus cycles through the expander.

use super::protocol::{build_expander_byte, split_nibbles, Register, CLEAR_DELAY, CLEAR_DISPLAY};
use crate::pins::{PinMap, PinRole};
use crate::transport::{Delay, Transport};
use crate::Result;
use std::time::Duration;
use tracing::{trace, warn};

/// Optional extra waits for modules with marginal timing. Both are off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timing {
    /// Wait after every two-nibble write.
    pub write_delay: Option<Duration>,
    /// Wait after every enable pulse.
    pub pulse_settle: Option<Duration>,
}

/// Runtime state mirrored in software.
///
/// Only the backlight is tracked; cursor position and display flags are
/// write-only to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayState {
    pub backlight: bool,
}

/// Expander connection plus everything needed to build its bytes.
pub(crate) struct ExpanderBus<T, D> {
    transport: T,
    delay: D,
    pins: PinMap,
    timing: Timing,
    pub(crate) state: DisplayState,
}

impl<T: Transport, D: Delay> ExpanderBus<T, D> {
    pub(crate) fn new(transport: T, delay: D, pins: PinMap, timing: Timing) -> Self {
        Self {
            transport,
            delay,
            pins,
            timing,
            state: DisplayState {
                backlight: pins.backlight_default(),
            },
        }
    }

    pub(crate) fn into_transport(self) -> T {
        self.transport
    }

    pub(crate) fn wait(&mut self, duration: Duration) {
        self.delay.delay(duration);
    }

    fn send(&mut self, byte: u8) -> Result<()> {
        trace!("Expander <- {:08b}", byte);
        self.transport.write(&[byte]).map_err(|e| {
            warn!("Expander write failed, controller state is indeterminate: {}", e);
            e
        })?;
        Ok(())
    }

    /// Strobes EN around `base`: one write with EN high, one with EN low.
    ///
    /// The backlight bit is re-applied from the live state on both writes.
    pub(crate) fn pulse_enable(&mut self, base: u8) -> Result<()> {
        let bl = self.pins.mask(PinRole::Bl);
        let en = self.pins.mask(PinRole::En);
        let byte = if self.state.backlight {
            base | bl
        } else {
            base & !bl
        };

        self.send(byte | en)?;
        self.send(byte & !en)?;

        if let Some(settle) = self.timing.pulse_settle {
            self.delay.delay(settle);
        }
        Ok(())
    }

    /// Presents one nibble on D4..D7 and clocks it in.
    pub(crate) fn pulse(&mut self, nibble: u8, register: Register) -> Result<()> {
        let base = build_expander_byte(nibble, register, &self.pins, self.state.backlight);
        self.pulse_enable(base)
    }

    /// Writes a full byte as high nibble then low nibble.
    pub(crate) fn write(&mut self, value: u8, register: Register) -> Result<()> {
        let (high, low) = split_nibbles(value);
        self.pulse(high, register)?;
        self.pulse(low, register)?;

        if let Some(delay) = self.timing.write_delay {
            self.delay.delay(delay);
        }
        Ok(())
    }

    /// Clear display, then the mandatory execution wait.
    pub(crate) fn clear_screen(&mut self) -> Result<()> {
        let (high, low) = split_nibbles(CLEAR_DISPLAY);
        self.pulse(high, Register::Instruction)?;
        self.pulse(low, Register::Instruction)?;
        self.delay.delay(CLEAR_DELAY);
        Ok(())
    }
}
