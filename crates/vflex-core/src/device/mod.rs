//! Device session.
//!
//! [`VFlex`] owns a [`MidiPort`] and drives the adapter through an explicit
//! `Unconnected -> Handshaking -> Ready` state machine. The adapter only
//! answers reliably right after a serial-number/voltage handshake, so every
//! operation runs a fresh handshake before its own exchange. Exchanges are
//! strictly one request, one reply; `&mut self` keeps them serialized.
//!
//! With `safe_adjust` on, the session refuses to continue when the adapter's
//! serial number changes between handshakes, or when the voltage observed
//! before a `set_voltage` differs from the last value this session stored.
//! Either mismatch clears the cached state.

mod state;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::protocol::catalog::{
    GET_LED_STATE_SEQUENCE, GET_SERIAL_NUMBER_SEQUENCE, GET_VOLTAGE_SEQUENCE,
};
use crate::protocol::coders::{
    LedState, decode_led_state, decode_serial_number, get_millivolts_from_protocol_message,
};
use crate::protocol::commands::{set_led_state_command, set_voltage_command};
use crate::protocol::error::ProtocolError;
use crate::protocol::framing::{prepare_for_sending, prepare_frame};
use crate::protocol::reassembly::{protocol_message_from_midi_messages, triplets_from_raw};
use crate::protocol::triplet::MidiTriplet;
use crate::transport::{
    MidiPort, TransportConfig, TransportError, drain_incoming, send_sequence,
};
use crate::units::{VoltageInputError, volts_to_millivolts};

pub use state::{DeviceSnapshot, DeviceState, SessionState};

/// Port name the adapter registers with the operating system.
pub const DEFAULT_PORT_NAME: &str = "Werewolf vFlex";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("invalid voltage: {0}")]
    VoltageInput(#[from] VoltageInputError),
    #[error("device session is {state}, not ready")]
    NotReady { state: SessionState },
    #[error("device has not reported its {field}")]
    MissingValue { field: &'static str },
    #[error(
        "the serial number does not match the last fetched serial number (first: {old}, last: {new})"
    )]
    SerialNumberMismatch { old: String, new: String },
    #[error("voltage changed from {stored} mV to {current} mV since it was last read")]
    VoltageMismatch { stored: u16, current: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Enforce the serial-number and voltage guards.
    pub safe_adjust: bool,
    pub transport: TransportConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            safe_adjust: true,
            transport: TransportConfig::default(),
        }
    }
}

/// A session with one vFlex adapter.
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use vflex_core::{SessionConfig, SimulatedDevice, TransportConfig, VFlex};
///
/// let config = SessionConfig {
///     transport: TransportConfig {
///         pause: Duration::ZERO,
///         drain_window: Duration::from_millis(5),
///         poll_interval: Duration::from_millis(1),
///     },
///     ..SessionConfig::default()
/// };
/// let mut vflex = VFlex::new(SimulatedDevice::new("12345678", 5_000), config);
/// assert_eq!(vflex.set_voltage(12_000)?, 12_000);
/// assert_eq!(vflex.serial_number()?, "12345678");
/// # Ok::<(), vflex_core::SessionError>(())
/// ```
pub struct VFlex<P: MidiPort> {
    port: P,
    config: SessionConfig,
    state: SessionState,
    cache: DeviceState,
}

impl<P: MidiPort> VFlex<P> {
    pub fn new(port: P, config: SessionConfig) -> Self {
        Self {
            port,
            config,
            state: SessionState::Unconnected,
            cache: DeviceState::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn cached(&self) -> &DeviceState {
        &self.cache
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn into_port(self) -> P {
        self.port
    }

    /// Run the serial-number/voltage handshake.
    ///
    /// On success the session is `Ready`; on any failure it drops back to
    /// `Unconnected`.
    pub fn wake_up(&mut self) -> Result<(), SessionError> {
        info!("running wake-up handshake");
        self.state = SessionState::Handshaking;
        let result = self
            .fetch_serial_number()
            .and_then(|()| self.fetch_voltage().map(|_| ()));
        self.state = match result {
            Ok(()) => SessionState::Ready,
            Err(_) => SessionState::Unconnected,
        };
        result
    }

    pub fn get_voltage(&mut self) -> Result<u16, SessionError> {
        self.wake_up()?;
        self.fetch_voltage()
    }

    pub fn get_led_state(&mut self) -> Result<LedState, SessionError> {
        self.wake_up()?;
        self.fetch_led_state()
    }

    /// Set the output voltage and return what the adapter reports back.
    pub fn set_voltage(&mut self, millivolts: u16) -> Result<u16, SessionError> {
        let stored = self.cache.millivolts;
        self.wake_up()?;
        if self.config.safe_adjust {
            if let (Some(stored), Some(current)) = (stored, self.cache.millivolts) {
                if stored != current {
                    self.cache.invalidate();
                    self.state = SessionState::Unconnected;
                    return Err(SessionError::VoltageMismatch { stored, current });
                }
            }
        }

        let frame = prepare_frame(set_voltage_command(millivolts)?)?;
        let message = self.exchange(&prepare_for_sending(&frame)?)?;
        let returned = get_millivolts_from_protocol_message(&message)?;
        debug!(returned_millivolts = returned, "voltage returned after setting");
        self.cache.millivolts = Some(returned);
        self.cache.touch();
        Ok(returned)
    }

    pub fn set_voltage_volts(&mut self, volts: f64) -> Result<u16, SessionError> {
        let millivolts = volts_to_millivolts(volts)?;
        self.set_voltage(millivolts)
    }

    /// Set the LED behaviour, then read it back.
    pub fn set_led_state(&mut self, led_state: LedState) -> Result<LedState, SessionError> {
        self.wake_up()?;
        let frame = prepare_frame(set_led_state_command(led_state))?;
        let echoed = decode_led_state(&self.exchange(&prepare_for_sending(&frame)?)?)?;
        debug!(%echoed, "LED state returned after setting");
        self.fetch_led_state()
    }

    /// Handshake, then read the LED state so every field is fresh.
    pub fn read_state(&mut self) -> Result<DeviceSnapshot, SessionError> {
        self.wake_up()?;
        self.fetch_led_state()?;
        self.snapshot()
    }

    pub fn serial_number(&self) -> Result<&str, SessionError> {
        self.require_ready()?;
        self.cache
            .serial_number
            .as_deref()
            .ok_or(SessionError::MissingValue {
                field: "serial number",
            })
    }

    /// Cached values as one reading; needs a `Ready` session with all fields known.
    pub fn snapshot(&self) -> Result<DeviceSnapshot, SessionError> {
        let serial_number = self.serial_number()?.to_string();
        let millivolts = self
            .cache
            .millivolts
            .ok_or(SessionError::MissingValue { field: "voltage" })?;
        let led_state = self
            .cache
            .led_state
            .ok_or(SessionError::MissingValue { field: "LED state" })?;
        Ok(DeviceSnapshot {
            serial_number,
            millivolts,
            led_state,
        })
    }

    fn require_ready(&self) -> Result<(), SessionError> {
        if self.state != SessionState::Ready {
            return Err(SessionError::NotReady { state: self.state });
        }
        Ok(())
    }

    fn fetch_serial_number(&mut self) -> Result<(), SessionError> {
        let decoded = self
            .exchange(&GET_SERIAL_NUMBER_SEQUENCE)
            .and_then(|message| decode_serial_number(&message).map_err(SessionError::from));
        let fetched = match decoded {
            Ok(serial_number) => serial_number,
            Err(SessionError::Protocol(err)) if !self.config.safe_adjust => {
                warn!(error = %err, "failed to decode serial number, continuing");
                return Ok(());
            }
            Err(err) => {
                error!(error = %err, "failed to decode serial number");
                return Err(err);
            }
        };

        if self.config.safe_adjust {
            if let Some(known) = self.cache.serial_number.as_deref() {
                if known != fetched {
                    let old = known.to_string();
                    self.cache.invalidate();
                    return Err(SessionError::SerialNumberMismatch { old, new: fetched });
                }
            }
        }
        debug!(serial_number = %fetched, "serial number fetched");
        self.cache.serial_number = Some(fetched);
        self.cache.touch();
        Ok(())
    }

    fn fetch_voltage(&mut self) -> Result<u16, SessionError> {
        let message = self.exchange(&GET_VOLTAGE_SEQUENCE)?;
        let millivolts = get_millivolts_from_protocol_message(&message)?;
        self.cache.millivolts = Some(millivolts);
        self.cache.touch();
        Ok(millivolts)
    }

    fn fetch_led_state(&mut self) -> Result<LedState, SessionError> {
        let message = self.exchange(&GET_LED_STATE_SEQUENCE)?;
        let led_state = decode_led_state(&message)?;
        self.cache.led_state = Some(led_state);
        self.cache.touch();
        Ok(led_state)
    }

    fn exchange(&mut self, sequence: &[MidiTriplet]) -> Result<Vec<u8>, SessionError> {
        send_sequence(&mut self.port, sequence, &self.config.transport)?;
        let raw = drain_incoming(&mut self.port, &self.config.transport)?;
        let triplets = triplets_from_raw(&raw)?;
        Ok(protocol_message_from_midi_messages(&triplets)?)
    }
}
