//! SET command payload builders.
//!
//! Builders return unframed payloads (`[command, ...]`); pass them through
//! `prepare_frame` and `prepare_for_sending` before they reach a port.

use super::coders::{LedState, encode_led_state, encode_millivolts};
use super::error::ProtocolError;
use super::layout;

/// Payload that asks the adapter to switch its output voltage.
///
/// # Examples
/// ```
/// use vflex_core::set_voltage_command;
///
/// assert_eq!(set_voltage_command(12_000)?, vec![0x92, 0x2E, 0xE0]);
/// # Ok::<(), vflex_core::ProtocolError>(())
/// ```
///
/// # Errors
/// `VoltageOutOfRange` above 48000 mV.
pub fn set_voltage_command(millivolts: u16) -> Result<Vec<u8>, ProtocolError> {
    if millivolts > layout::MAX_MILLIVOLTS {
        return Err(ProtocolError::VoltageOutOfRange { millivolts });
    }
    let (high, low) = encode_millivolts(millivolts);
    Ok(vec![layout::CMD_SET_VOLTAGE, high, low])
}

/// Payload that sets the LED behaviour.
pub fn set_led_state_command(state: LedState) -> Vec<u8> {
    vec![layout::CMD_SET_LED_STATE, encode_led_state(state)]
}

#[cfg(test)]
mod tests {
    use super::{set_led_state_command, set_voltage_command};
    use crate::protocol::coders::LedState;
    use crate::protocol::error::ProtocolError;
    use crate::protocol::layout;

    #[test]
    fn voltage_command_layout() {
        assert_eq!(
            set_voltage_command(5000).unwrap(),
            vec![layout::CMD_SET_VOLTAGE, 0x13, 0x88]
        );
        assert_eq!(
            set_voltage_command(layout::MAX_MILLIVOLTS).unwrap(),
            vec![layout::CMD_SET_VOLTAGE, 0xBB, 0x80]
        );
    }

    #[test]
    fn voltage_command_rejects_above_maximum() {
        assert_eq!(
            set_voltage_command(48_001).unwrap_err(),
            ProtocolError::VoltageOutOfRange { millivolts: 48_001 }
        );
    }

    #[test]
    fn led_command_layout() {
        assert_eq!(
            set_led_state_command(LedState::On),
            vec![layout::CMD_SET_LED_STATE, layout::LED_ON]
        );
        assert_eq!(
            set_led_state_command(LedState::Off),
            vec![layout::CMD_SET_LED_STATE, layout::LED_OFF]
        );
    }
}
