//! MIDI transport.
//!
//! This is the only module (besides the optional `midir` backend) that blocks:
//! triplets are written one at a time with a short pause between them, and
//! replies are collected by polling the port for a fixed drain window. The
//! device answers a request with one burst of note messages, so the drain
//! window bounds how long an exchange may take.

mod simulated;

#[cfg(feature = "midir")]
mod midi_port;

use std::thread::sleep;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::protocol::triplet::MidiTriplet;

#[cfg(feature = "midir")]
pub use midi_port::MidirPort;
pub use simulated::SimulatedDevice;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("MIDI port '{name}' not found")]
    PortNotFound { name: String },
    #[error("MIDI port error: {0}")]
    Port(String),
    #[error("MIDI port is closed")]
    Closed,
}

/// A bidirectional MIDI port carrying raw messages.
pub trait MidiPort {
    /// Write one MIDI message.
    fn send(&mut self, message: &[u8]) -> Result<(), TransportError>;

    /// Return every message received since the last call, without waiting.
    fn poll(&mut self) -> Result<Vec<Vec<u8>>, TransportError>;
}

impl<P: MidiPort + ?Sized> MidiPort for Box<P> {
    fn send(&mut self, message: &[u8]) -> Result<(), TransportError> {
        (**self).send(message)
    }

    fn poll(&mut self) -> Result<Vec<Vec<u8>>, TransportError> {
        (**self).poll()
    }
}

/// Timing used when talking to a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// Pause after each triplet sent.
    pub pause: Duration,
    /// How long to keep collecting a reply.
    pub drain_window: Duration,
    /// Sleep between polls while draining.
    pub poll_interval: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            pause: Duration::from_millis(2),
            drain_window: Duration::from_millis(500),
            poll_interval: Duration::from_millis(2),
        }
    }
}

pub fn send_triplet<P: MidiPort + ?Sized>(
    port: &mut P,
    triplet: MidiTriplet,
    pause: Duration,
) -> Result<(), TransportError> {
    port.send(&triplet.to_bytes())?;
    if !pause.is_zero() {
        sleep(pause);
    }
    Ok(())
}

pub fn send_sequence<P: MidiPort + ?Sized>(
    port: &mut P,
    sequence: &[MidiTriplet],
    config: &TransportConfig,
) -> Result<(), TransportError> {
    info!(triplets = sequence.len(), "sending MIDI sequence");
    debug!(sequence = ?sequence, "MIDI sequence contents");
    for &triplet in sequence {
        send_triplet(port, triplet, config.pause)?;
    }
    Ok(())
}

/// Collect whatever the port has pending right now.
pub fn drain_once<P: MidiPort + ?Sized>(port: &mut P) -> Result<Vec<Vec<u8>>, TransportError> {
    port.poll()
}

/// Collect messages for the whole drain window, whether or not any arrive.
///
/// A zero drain window returns immediately with nothing.
pub fn drain_incoming<P: MidiPort + ?Sized>(
    port: &mut P,
    config: &TransportConfig,
) -> Result<Vec<Vec<u8>>, TransportError> {
    if config.drain_window.is_zero() {
        return Ok(Vec::new());
    }
    let deadline = Instant::now() + config.drain_window;
    let mut drained = Vec::new();
    while Instant::now() <= deadline {
        drained.extend(drain_once(port)?);
        sleep(config.poll_interval);
    }
    debug!(messages = drained.len(), "drained MIDI input");
    Ok(drained)
}
