use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::protocol::coders::LedState;

/// Where a session is in its handshake lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unconnected,
    Handshaking,
    Ready,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Unconnected => "unconnected",
            SessionState::Handshaking => "handshaking",
            SessionState::Ready => "ready",
        };
        f.write_str(label)
    }
}

/// Last-known-good values reported by the adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceState {
    pub serial_number: Option<String>,
    pub millivolts: Option<u16>,
    pub led_state: Option<LedState>,
    pub refreshed_at: Option<Instant>,
}

impl DeviceState {
    pub(crate) fn touch(&mut self) {
        self.refreshed_at = Some(Instant::now());
    }

    /// Forget everything; the next handshake starts from scratch.
    pub fn invalidate(&mut self) {
        *self = DeviceState::default();
    }

    pub fn age(&self) -> Option<Duration> {
        self.refreshed_at.map(|at| at.elapsed())
    }
}

/// A complete reading of the adapter.
///
/// # Examples
/// ```
/// use vflex_core::{DeviceSnapshot, LedState};
///
/// let snapshot = DeviceSnapshot {
///     serial_number: "12345678".to_string(),
///     millivolts: 12_000,
///     led_state: LedState::On,
/// };
/// assert_eq!(snapshot.volts(), 12.0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub serial_number: String,
    pub millivolts: u16,
    pub led_state: LedState,
}

impl DeviceSnapshot {
    pub fn volts(&self) -> f64 {
        f64::from(self.millivolts) / 1000.0
    }
}
