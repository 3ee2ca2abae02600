use std::collections::VecDeque;

use tracing::{debug, warn};

use super::{MidiPort, TransportError};
use crate::protocol::coders::{LedState, decode_millivolts, encode_led_state, encode_millivolts};
use crate::protocol::error::ProtocolError;
use crate::protocol::framing::{prepare_for_sending, prepare_frame};
use crate::protocol::layout;
use crate::protocol::reassembly::{protocol_message_from_midi_messages, triplets_from_raw};
use crate::protocol::triplet::MidiTriplet;

/// An in-memory adapter that answers the vFlex protocol.
///
/// Requests are buffered until `COMMAND_END` arrives, then decoded and
/// answered the way the hardware does: GET queries report the current value,
/// SET commands update it and echo the new value back. Unknown commands and
/// malformed requests get no reply, so the caller sees an empty drain.
///
/// # Examples
/// ```
/// use vflex_core::{
///     GET_VOLTAGE_SEQUENCE, MidiPort, SimulatedDevice, get_millivolts_from_protocol_message,
///     protocol_message_from_midi_messages, triplets_from_raw,
/// };
///
/// let mut device = SimulatedDevice::new("SIM00001", 12_000);
/// for triplet in GET_VOLTAGE_SEQUENCE {
///     device.send(&triplet.to_bytes())?;
/// }
/// let reply = triplets_from_raw(&device.poll()?)?;
/// let message = protocol_message_from_midi_messages(&reply)?;
/// assert_eq!(get_millivolts_from_protocol_message(&message)?, 12_000);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    serial_number: String,
    millivolts: u16,
    led_state: LedState,
    request: Vec<MidiTriplet>,
    outbox: VecDeque<Vec<u8>>,
    received: Vec<Vec<u8>>,
}

impl SimulatedDevice {
    pub fn new(serial_number: impl Into<String>, millivolts: u16) -> Self {
        Self {
            serial_number: serial_number.into(),
            millivolts,
            led_state: LedState::Off,
            request: Vec::new(),
            outbox: VecDeque::new(),
            received: Vec::new(),
        }
    }

    pub fn with_led_state(mut self, led_state: LedState) -> Self {
        self.led_state = led_state;
        self
    }

    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    /// Swap the reported serial number, as if another adapter were plugged in.
    pub fn set_serial_number(&mut self, serial_number: impl Into<String>) {
        self.serial_number = serial_number.into();
    }

    pub fn millivolts(&self) -> u16 {
        self.millivolts
    }

    /// Change the output behind the session's back.
    pub fn set_millivolts(&mut self, millivolts: u16) {
        self.millivolts = millivolts;
    }

    pub fn led_state(&self) -> LedState {
        self.led_state
    }

    /// Every raw message written to the device so far.
    pub fn received(&self) -> &[Vec<u8>] {
        &self.received
    }

    fn handle_request(&mut self) {
        let request = std::mem::take(&mut self.request);
        let message = match protocol_message_from_midi_messages(&request) {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "simulated device ignored malformed request");
                return;
            }
        };
        match self.respond(&message) {
            Ok(Some(reply)) => self.queue_reply(&reply),
            Ok(None) => debug!(message = ?message, "simulated device has no reply"),
            Err(err) => warn!(error = %err, "simulated device failed to build a reply"),
        }
    }

    fn respond(&mut self, message: &[u8]) -> Result<Option<Vec<u8>>, ProtocolError> {
        let Some(&command) = message.get(layout::COMMAND_OFFSET) else {
            return Ok(None);
        };
        let payload = &message[layout::PAYLOAD_OFFSET.min(message.len())..];
        let reply = match (command, payload) {
            (layout::CMD_GET_SERIAL_NUMBER, []) => {
                let mut reply = vec![layout::CMD_GET_SERIAL_NUMBER];
                reply.extend_from_slice(self.serial_number.as_bytes());
                reply
            }
            (layout::CMD_GET_VOLTAGE, []) => self.voltage_reply(),
            (layout::CMD_GET_LED_STATE, []) => self.led_reply(),
            (layout::CMD_SET_VOLTAGE, [high, low]) => {
                self.millivolts = decode_millivolts(*high, *low);
                self.voltage_reply()
            }
            (layout::CMD_SET_LED_STATE, [state]) => {
                self.led_state = LedState::from(*state == layout::LED_ON);
                self.led_reply()
            }
            _ => return Ok(None),
        };
        prepare_frame(reply).map(Some)
    }

    fn voltage_reply(&self) -> Vec<u8> {
        let (high, low) = encode_millivolts(self.millivolts);
        vec![layout::CMD_GET_VOLTAGE, high, low]
    }

    fn led_reply(&self) -> Vec<u8> {
        vec![layout::CMD_GET_LED_STATE, encode_led_state(self.led_state)]
    }

    fn queue_reply(&mut self, frame: &[u8]) {
        match prepare_for_sending(frame) {
            Ok(sequence) => self
                .outbox
                .extend(sequence.iter().map(|triplet| triplet.to_bytes().to_vec())),
            Err(err) => warn!(error = %err, "simulated device failed to encode a reply"),
        }
    }
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new("SIM00001", 5_000)
    }
}

impl MidiPort for SimulatedDevice {
    fn send(&mut self, message: &[u8]) -> Result<(), TransportError> {
        self.received.push(message.to_vec());
        let triplet = match triplets_from_raw(&[message]) {
            Ok(mut triplets) => triplets.remove(0),
            Err(err) => {
                warn!(error = %err, "simulated device dropped a partial message");
                return Ok(());
            }
        };
        if triplet == layout::COMMAND_START {
            self.request.clear();
        }
        self.request.push(triplet);
        if triplet == layout::COMMAND_END {
            self.handle_request();
        }
        Ok(())
    }

    fn poll(&mut self) -> Result<Vec<Vec<u8>>, TransportError> {
        Ok(self.outbox.drain(..).collect())
    }
}
