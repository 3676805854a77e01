//! Power-on initialization by instruction.
//!
//! The controller may come up in 8-bit mode or halfway through a 4-bit
//! transfer. Three lone `0011` nibbles force it into a known 8-bit state, a
//! lone `0010` switches it to 4-bit mode, and from then on every instruction
//! is two nibbles. Busy is never polled; fixed waits cover every step.

use super::bus::ExpanderBus;
use super::protocol::{
    display_control, entry_mode, split_nibbles, CursorDirection, Register,
    FUNCTION_SET_4BIT_NIBBLE, FUNCTION_SET_4BIT_TWO_LINE, FUNCTION_SET_8BIT_NIBBLE,
    FUNCTION_SET_DELAY, POWER_ON_DELAY,
};
use crate::transport::{Delay, Transport};
use crate::Result;
use tracing::debug;

/// Display flags applied by the init sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitOptions {
    pub display_on: bool,
    pub cursor_on: bool,
    pub blink_on: bool,
    pub direction: CursorDirection,
    pub shift: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            display_on: true,
            cursor_on: false,
            blink_on: false,
            direction: CursorDirection::Right,
            shift: false,
        }
    }
}

/// Steps of the init sequence, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    PowerOn,
    SwitchTo4Bit,
    FunctionSetTwoLine,
    DisplayControl,
    ClearAndHome,
    EntryModeSet,
    Ready,
}

impl InitStep {
    /// Step that follows this one, `None` once ready.
    pub fn next(self) -> Option<InitStep> {
        match self {
            InitStep::PowerOn => Some(InitStep::SwitchTo4Bit),
            InitStep::SwitchTo4Bit => Some(InitStep::FunctionSetTwoLine),
            InitStep::FunctionSetTwoLine => Some(InitStep::DisplayControl),
            InitStep::DisplayControl => Some(InitStep::ClearAndHome),
            InitStep::ClearAndHome => Some(InitStep::EntryModeSet),
            InitStep::EntryModeSet => Some(InitStep::Ready),
            InitStep::Ready => None,
        }
    }
}

impl std::fmt::Display for InitStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitStep::PowerOn => write!(f, "power-on"),
            InitStep::SwitchTo4Bit => write!(f, "switch-to-4-bit"),
            InitStep::FunctionSetTwoLine => write!(f, "function-set"),
            InitStep::DisplayControl => write!(f, "display-control"),
            InitStep::ClearAndHome => write!(f, "clear"),
            InitStep::EntryModeSet => write!(f, "entry-mode"),
            InitStep::Ready => write!(f, "ready"),
        }
    }
}

/// Runs the whole sequence from [`InitStep::PowerOn`].
///
/// A failure leaves the controller in an unknown state; the only recovery is
/// running the sequence again from the start.
pub(crate) fn run<T: Transport, D: Delay>(
    bus: &mut ExpanderBus<T, D>,
    options: &InitOptions,
) -> Result<()> {
    let mut step = InitStep::PowerOn;
    while let Some(next) = step.next() {
        debug!("LCD init: {}", step);
        execute(bus, step, options)?;
        step = next;
    }
    debug!("LCD init: {}", step);
    Ok(())
}

fn execute<T: Transport, D: Delay>(
    bus: &mut ExpanderBus<T, D>,
    step: InitStep,
    options: &InitOptions,
) -> Result<()> {
    match step {
        InitStep::PowerOn => {
            bus.wait(POWER_ON_DELAY);
            bus.pulse(FUNCTION_SET_8BIT_NIBBLE, Register::Instruction)?;
            bus.wait(FUNCTION_SET_DELAY);
            bus.pulse(FUNCTION_SET_8BIT_NIBBLE, Register::Instruction)?;
            bus.wait(FUNCTION_SET_DELAY);
            bus.pulse(FUNCTION_SET_8BIT_NIBBLE, Register::Instruction)
        }
        InitStep::SwitchTo4Bit => bus.pulse(FUNCTION_SET_4BIT_NIBBLE, Register::Instruction),
        InitStep::FunctionSetTwoLine => pulse_pair(bus, FUNCTION_SET_4BIT_TWO_LINE),
        InitStep::DisplayControl => pulse_pair(
            bus,
            display_control(options.display_on, options.cursor_on, options.blink_on),
        ),
        InitStep::ClearAndHome => bus.clear_screen(),
        InitStep::EntryModeSet => pulse_pair(bus, entry_mode(options.direction, options.shift)),
        InitStep::Ready => Ok(()),
    }
}

/// An instruction as two bare pulses, without the optional write delay.
fn pulse_pair<T: Transport, D: Delay>(bus: &mut ExpanderBus<T, D>, command: u8) -> Result<()> {
    let (high, low) = split_nibbles(command);
    bus.pulse(high, Register::Instruction)?;
    bus.pulse(low, Register::Instruction)
}
