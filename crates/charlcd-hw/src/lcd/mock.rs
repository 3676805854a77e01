//! Recording transport and delay for tests.

use super::bus::{ExpanderBus, Timing};
use crate::error::BusError;
use crate::pins::PinMap;
use crate::transport::{Delay, Transport};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One observable side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Write(Vec<u8>),
    Delay(Duration),
}

/// Shared, ordered event log.
#[derive(Debug, Clone, Default)]
pub struct Log(Arc<Mutex<Vec<Event>>>);

impl Log {
    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    /// Every written byte, in order.
    pub fn writes(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Write(bytes) => Some(bytes),
                Event::Delay(_) => None,
            })
            .flatten()
            .collect()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

#[derive(Debug)]
pub struct RecordingTransport {
    log: Log,
    remaining: Option<usize>,
}

impl RecordingTransport {
    /// Accepts `writes` more writes, then fails every one after.
    pub fn fail_after(mut self, writes: usize) -> Self {
        self.remaining = Some(writes);
        self
    }
}

impl Transport for RecordingTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Err(BusError::Other("injected failure".to_string()));
            }
            *remaining -= 1;
        }
        self.log.push(Event::Write(bytes.to_vec()));
        Ok(())
    }
}

#[derive(Debug)]
pub struct RecordingDelay {
    log: Log,
}

impl Delay for RecordingDelay {
    fn delay(&mut self, duration: Duration) {
        self.log.push(Event::Delay(duration));
    }
}

/// A transport and delay writing into the same log.
pub fn recorder() -> (RecordingTransport, RecordingDelay, Log) {
    let log = Log::default();
    (
        RecordingTransport {
            log: log.clone(),
            remaining: None,
        },
        RecordingDelay { log: log.clone() },
        log,
    )
}

pub(crate) fn recording_bus(
    pins: PinMap,
    timing: Timing,
) -> (ExpanderBus<RecordingTransport, RecordingDelay>, Log) {
    let (transport, delay, log) = recorder();
    (ExpanderBus::new(transport, delay, pins, timing), log)
}
