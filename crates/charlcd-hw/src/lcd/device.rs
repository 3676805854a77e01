//! Character LCD session.

use super::bus::{DisplayState, ExpanderBus, Timing};
use super::glyph::{Glyph, GLYPH_ROWS};
use super::init::{self, InitOptions};
use super::protocol::{
    cursor_shift, display_control, entry_mode, goto_address, CursorDirection, Register,
    CLEAR_DELAY, MAX_CGRAM_ADDRESS, MAX_DDRAM_ADDRESS, RETURN_HOME, SECOND_LINE,
    SET_CGRAM_ADDRESS, SET_DDRAM_ADDRESS,
};
use crate::lines::LineAddressTable;
use crate::pins::PinMap;
use crate::transport::{select_controller, Delay, I2cTransport, ThreadDelay, Transport};
use crate::{BusError, Error, Result};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Everything a session needs besides its transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LcdSettings {
    pub pins: PinMap,
    pub lines: LineAddressTable,
    pub init: InitOptions,
    pub timing: Timing,
}

/// An initialized HD44780 display behind a PCF8574 expander.
///
/// All operations serialize on an internal lock, so the two nibbles of an
/// instruction are never interleaved with another caller's writes.
pub struct CharLcd<T, D = ThreadDelay> {
    bus: Mutex<ExpanderBus<T, D>>,
    lines: LineAddressTable,
    init: InitOptions,
}

impl CharLcd<I2cTransport> {
    /// Finds the controller, opens the expander at `address` and initializes
    /// the display.
    ///
    /// `controller` selects the i2c-dev adapter (see
    /// [`I2cController::matches`](crate::transport::I2cController::matches));
    /// `None` uses the lowest-numbered one.
    pub async fn open(address: u16, controller: Option<&str>, settings: LcdSettings) -> Result<Self> {
        let controller = select_controller(controller).await?;
        info!("Using I2C controller {}", controller);

        run_blocking(move || {
            let transport = I2cTransport::open(&controller, address)?;
            Self::start_blocking(transport, ThreadDelay, settings)
        })
        .await
    }
}

impl<T, D> CharLcd<T, D>
where
    T: Transport + Send + 'static,
    D: Delay + Send + 'static,
{
    /// Initializes the display over an already opened transport.
    pub async fn start(transport: T, delay: D, settings: LcdSettings) -> Result<Self> {
        run_blocking(move || Self::start_blocking(transport, delay, settings)).await
    }
}

/// Init waits block, so session start runs off the async executor.
async fn run_blocking<R, F>(f: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Transfer(BusError::Other(format!("session start aborted: {}", e))))?
}

impl<T: Transport, D: Delay> CharLcd<T, D> {
    fn start_blocking(transport: T, delay: D, settings: LcdSettings) -> Result<Self> {
        let LcdSettings {
            pins,
            lines,
            init: options,
            timing,
        } = settings;

        let mut bus = ExpanderBus::new(transport, delay, pins, timing);
        init::run(&mut bus, &options)?;
        info!("LCD ready ({} rows)", lines.rows());

        Ok(Self {
            bus: Mutex::new(bus),
            lines,
            init: options,
        })
    }

    fn bus(&self) -> MutexGuard<'_, ExpanderBus<T, D>> {
        // A panic mid-write leaves the controller indeterminate either way;
        // callers recover with reinitialize().
        self.bus.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-runs the full init sequence. The only recovery after a transfer error.
    pub fn reinitialize(&self) -> Result<()> {
        let mut bus = self.bus();
        init::run(&mut *bus, &self.init)?;
        info!("LCD reinitialized");
        Ok(())
    }

    /// Ends the session and hands back the transport.
    pub fn into_transport(self) -> T {
        self.bus
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_transport()
    }

    /// Row base addresses in use.
    pub fn lines(&self) -> &LineAddressTable {
        &self.lines
    }

    /// Sends an instruction byte (RS = 0).
    pub fn send_command(&self, command: u8) -> Result<()> {
        self.bus().write(command, Register::Instruction)
    }

    /// Sends a data byte (RS = 1).
    pub fn send_data(&self, data: u8) -> Result<()> {
        self.bus().write(data, Register::Data)
    }

    /// Clears the display and homes the cursor. Blocks for the execution time.
    pub fn clear_screen(&self) -> Result<()> {
        self.bus().clear_screen()
    }

    /// Homes the cursor and undoes display shifts. Blocks for the execution time.
    pub fn return_home(&self) -> Result<()> {
        let mut bus = self.bus();
        bus.write(RETURN_HOME, Register::Instruction)?;
        bus.wait(CLEAR_DELAY);
        Ok(())
    }

    /// Moves the cursor to column `x` of `row`.
    pub fn goto_xy(&self, x: u8, row: usize) -> Result<()> {
        let base = self.lines.address(row)?;
        debug!("Cursor to ({}, {})", x, row);
        self.send_command(goto_address(x, base))
    }

    /// Moves the cursor to the start of controller line 2 (DDRAM 0x40).
    pub fn goto_second_line(&self) -> Result<()> {
        self.send_command(SECOND_LINE)
    }

    pub fn set_entry_mode(&self, direction: CursorDirection, shift: bool) -> Result<()> {
        self.send_command(entry_mode(direction, shift))
    }

    pub fn set_display_control(&self, display_on: bool, cursor_on: bool, blink_on: bool) -> Result<()> {
        self.send_command(display_control(display_on, cursor_on, blink_on))
    }

    /// Moves the cursor, or with `display_shift` scrolls the whole display, by one.
    pub fn cursor_shift(&self, display_shift: bool, direction: CursorDirection) -> Result<()> {
        self.send_command(cursor_shift(display_shift, direction))
    }

    pub fn set_ddram_address(&self, address: u8) -> Result<()> {
        if address > MAX_DDRAM_ADDRESS {
            return Err(Error::InvalidAddress(address));
        }
        self.send_command(SET_DDRAM_ADDRESS | address)
    }

    pub fn set_cgram_address(&self, address: u8) -> Result<()> {
        if address > MAX_CGRAM_ADDRESS {
            return Err(Error::InvalidAddress(address));
        }
        self.send_command(SET_CGRAM_ADDRESS | address)
    }

    /// Prints one character.
    ///
    /// Only characters with a code point up to U+00FF map onto the controller's
    /// 8-bit character set; nothing is transliterated.
    pub fn print_char(&self, c: char) -> Result<()> {
        let code = char_code(c)?;
        self.send_data(code)
    }

    /// Prints a string, one character at a time.
    ///
    /// Stops at the first error; characters before it have been written.
    pub fn print(&self, text: &str) -> Result<()> {
        let mut bus = self.bus();
        for c in text.chars() {
            bus.write(char_code(c)?, Register::Data)?;
        }
        Ok(())
    }

    /// Writes raw character codes.
    pub fn print_bytes(&self, codes: &[u8]) -> Result<()> {
        let mut bus = self.bus();
        for &code in codes {
            bus.write(code, Register::Data)?;
        }
        Ok(())
    }

    /// Snapshot of the state mirrored in software.
    pub fn state(&self) -> DisplayState {
        self.bus().state
    }

    /// Current backlight state.
    pub fn backlight(&self) -> bool {
        self.state().backlight
    }

    pub fn turn_on_backlight(&self) -> Result<()> {
        self.set_backlight(true)
    }

    pub fn turn_off_backlight(&self) -> Result<()> {
        self.set_backlight(false)
    }

    /// Updates the backlight and pushes it out with a no-op instruction.
    pub fn set_backlight(&self, on: bool) -> Result<()> {
        let mut bus = self.bus();
        bus.state.backlight = on;
        debug!("Backlight {}", if on { "on" } else { "off" });
        bus.write(0x00, Register::Instruction)
    }

    /// Stores an 8-row bitmap in CGRAM `slot`.
    ///
    /// Ends with a clear so that later data writes address DDRAM again.
    pub fn create_symbol(&self, bitmap: &[u8], slot: u8) -> Result<()> {
        let glyph = Glyph::new(bitmap, slot)?;
        self.store_glyph(&glyph)
    }

    /// Stores a validated glyph in CGRAM.
    pub fn store_glyph(&self, glyph: &Glyph) -> Result<()> {
        let mut bus = self.bus();
        bus.write(glyph.address_command(), Register::Instruction)?;
        for &row in glyph.rows() {
            bus.write(row, Register::Data)?;
        }
        bus.clear_screen()?;
        debug!("Stored glyph in CGRAM slot {}", glyph.slot());
        Ok(())
    }

    /// Prints the glyph stored in CGRAM `slot`.
    pub fn print_symbol(&self, slot: u8) -> Result<()> {
        Glyph::check_slot(slot, GLYPH_ROWS)?;
        self.send_data(slot)
    }
}

fn char_code(c: char) -> Result<u8> {
    u8::try_from(u32::from(c)).map_err(|_| Error::UnsupportedCharacter(c))
}
