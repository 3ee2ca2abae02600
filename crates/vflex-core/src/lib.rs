//! vflex core library for driving a Werewolf vFlex power adapter over MIDI.
//!
//! The device speaks a small length-prefixed command protocol tunneled inside
//! MIDI note messages. This crate is layered the same way the data flows:
//! `protocol` frames commands and nibble-splits them into MIDI triplets,
//! reassembles inbound triplets into protocol messages and decodes typed
//! fields; `transport` pushes triplets through a [`MidiPort`] and drains the
//! replies; `device` runs the wake-up handshake and caches what the adapter
//! reported.
//!
//! Invariants:
//! - `protocol` is pure: no I/O, no shared state, safe to call from any thread.
//! - A protocol message's first byte is its own total length.
//! - Field coders check length before command byte and never repair input.
//!
//! # Examples
//! ```
//! use vflex_core::{
//!     GET_VOLTAGE_SEQUENCE, get_millivolts_from_protocol_message, prepare_for_sending,
//!     prepare_frame, protocol_message_from_midi_messages,
//! };
//!
//! let frame = prepare_frame([18u8, 0x2E, 0xE0])?;
//! assert_eq!(frame, vec![4, 18, 0x2E, 0xE0]);
//!
//! let triplets = prepare_for_sending(&frame)?;
//! let message = protocol_message_from_midi_messages(&triplets)?;
//! assert_eq!(get_millivolts_from_protocol_message(&message)?, 12_000);
//! assert_eq!(GET_VOLTAGE_SEQUENCE.len(), 4);
//! # Ok::<(), vflex_core::ProtocolError>(())
//! ```

pub mod device;
pub mod protocol;
pub mod transport;
pub mod units;

pub use device::{
    DEFAULT_PORT_NAME, DeviceSnapshot, DeviceState, SessionConfig, SessionError, SessionState,
    VFlex,
};
pub use protocol::catalog::{
    GET_LED_STATE_SEQUENCE, GET_SERIAL_NUMBER_SEQUENCE, GET_VOLTAGE_SEQUENCE,
};
pub use protocol::coders::{
    LedState, decode_led_state, decode_millivolts, decode_serial_number, encode_led_state,
    encode_millivolts, get_millivolts_from_protocol_message,
};
pub use protocol::commands::{set_led_state_command, set_voltage_command};
pub use protocol::error::ProtocolError;
pub use protocol::framing::{
    FramePayload, Frames, byte_to_triplet, prepare_for_sending, prepare_frame,
};
pub use protocol::reassembly::{
    protocol_message_from_midi_messages, reassemble, triplets_from_raw,
    validate_and_trim_protocol_message,
};
pub use protocol::triplet::MidiTriplet;
#[cfg(feature = "midir")]
pub use transport::MidirPort;
pub use transport::{MidiPort, SimulatedDevice, TransportConfig, TransportError};
pub use units::{VoltageInputError, parse_volts, volts_to_millivolts};
