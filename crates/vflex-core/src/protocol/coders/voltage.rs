use crate::protocol::error::ProtocolError;
use crate::protocol::layout;
use crate::protocol::reader::MessageReader;

/// Split millivolts into the big-endian `(high, low)` byte pair.
pub fn encode_millivolts(millivolts: u16) -> (u8, u8) {
    let [high, low] = millivolts.to_be_bytes();
    (high, low)
}

/// Join a big-endian `(high, low)` byte pair back into millivolts.
pub fn decode_millivolts(high: u8, low: u8) -> u16 {
    u16::from_be_bytes([high, low])
}

/// Read the millivolts reported by a GET_VOLTAGE response.
///
/// # Examples
/// ```
/// use vflex_core::get_millivolts_from_protocol_message;
///
/// assert_eq!(get_millivolts_from_protocol_message(&[4, 18, 0x2E, 0xE0])?, 12_000);
/// # Ok::<(), vflex_core::ProtocolError>(())
/// ```
pub fn get_millivolts_from_protocol_message(message: &[u8]) -> Result<u16, ProtocolError> {
    let reader = MessageReader::new(message);
    reader.require_exact_len(layout::VOLTAGE_MESSAGE_LEN)?;
    reader.require_command(layout::CMD_GET_VOLTAGE)?;
    reader.read_u16_be(layout::VOLTAGE_RANGE)
}

#[cfg(test)]
mod tests {
    use super::{decode_millivolts, encode_millivolts, get_millivolts_from_protocol_message};
    use crate::protocol::error::ProtocolError;
    use crate::protocol::layout;

    #[test]
    fn reads_millivolts() {
        let mv = get_millivolts_from_protocol_message(&[4, layout::CMD_GET_VOLTAGE, 19, 136]);
        assert_eq!(mv.unwrap(), 5000);
    }

    #[test]
    fn rejects_short_and_long_messages() {
        assert!(matches!(
            get_millivolts_from_protocol_message(&[1, 2]),
            Err(ProtocolError::InvalidProtocolMessageLength { expected: 4, .. })
        ));
        assert!(matches!(
            get_millivolts_from_protocol_message(&[1, 2, 3, 4, 5]),
            Err(ProtocolError::InvalidProtocolMessageLength { expected: 4, .. })
        ));
    }

    #[test]
    fn rejects_wrong_command() {
        let err = get_millivolts_from_protocol_message(&[4, layout::CMD_GET_VOLTAGE - 1, 16, 32])
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::IncorrectCommandByte {
                expected: layout::CMD_GET_VOLTAGE,
                ..
            }
        ));
    }

    #[test]
    fn length_is_checked_before_command() {
        let err = get_millivolts_from_protocol_message(&[4, 0x00, 0x2E]).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidProtocolMessageLength { .. }));
    }

    #[test]
    fn encode_and_decode_are_paired() {
        for millivolts in [5000u16, 12000, 12500, 15000, 48000] {
            let (high, low) = encode_millivolts(millivolts);
            assert_eq!((u16::from(high) << 8) | u16::from(low), millivolts);
            assert_eq!(decode_millivolts(high, low), millivolts);
        }
    }
}
