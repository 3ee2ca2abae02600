//! Typed field coders.
//!
//! Every decoder validates the exact message length first and the command
//! byte second, then reads its payload. Nothing is repaired or partially
//! decoded: a message that fails either check is returned inside the error.

pub mod led;
pub mod serial;
pub mod voltage;

pub use led::{LedState, decode_led_state, encode_led_state};
pub use serial::decode_serial_number;
pub use voltage::{decode_millivolts, encode_millivolts, get_millivolts_from_protocol_message};
