use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::error::ProtocolError;
use crate::protocol::layout;
use crate::protocol::reader::MessageReader;

/// LED behaviour reported by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedState {
    Off,
    On,
}

impl LedState {
    pub fn is_on(self) -> bool {
        self == LedState::On
    }
}

impl From<bool> for LedState {
    fn from(on: bool) -> Self {
        if on { LedState::On } else { LedState::Off }
    }
}

impl fmt::Display for LedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedState::Off => f.write_str("off"),
            LedState::On => f.write_str("on"),
        }
    }
}

pub fn encode_led_state(state: LedState) -> u8 {
    match state {
        LedState::Off => layout::LED_OFF,
        LedState::On => layout::LED_ON,
    }
}

/// Decode a GET_LED_STATE response.
///
/// # Errors
/// Length and command checks as for every coder; `InvalidLedState` when the
/// state byte is neither 0 nor 1.
pub fn decode_led_state(message: &[u8]) -> Result<LedState, ProtocolError> {
    let reader = MessageReader::new(message);
    reader.require_exact_len(layout::LED_STATE_MESSAGE_LEN)?;
    reader.require_command(layout::CMD_GET_LED_STATE)?;
    match reader.read_u8(layout::PAYLOAD_OFFSET)? {
        layout::LED_OFF => Ok(LedState::Off),
        layout::LED_ON => Ok(LedState::On),
        value => Err(ProtocolError::InvalidLedState { value }),
    }
}
