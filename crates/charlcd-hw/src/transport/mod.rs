//! Byte transport to the port expander.
//!
//! The driver only ever needs two capabilities from its environment: an
//! atomic write of a byte array to the expander, and a blocking wait.

mod linux;

pub use linux::{list_controllers, select_controller, I2cController, I2cTransport};

use crate::error::BusError;
use std::time::Duration;

/// Write-only connection to an I2C port expander.
pub trait Transport {
    /// Writes `bytes` to the expander in a single I2C transaction.
    fn write(&mut self, bytes: &[u8]) -> Result<(), BusError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        (**self).write(bytes)
    }
}

/// Blocking delay source for controller timing.
pub trait Delay {
    /// Blocks the caller for at least `duration`.
    fn delay(&mut self, duration: Duration);

    fn delay_ms(&mut self, ms: u64) {
        self.delay(Duration::from_millis(ms));
    }
}

/// [`Delay`] backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
