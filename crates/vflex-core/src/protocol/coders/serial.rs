use crate::protocol::error::ProtocolError;
use crate::protocol::layout;
use crate::protocol::reader::MessageReader;

/// Decode a GET_SERIAL_NUMBER response into its ASCII serial number.
///
/// # Examples
/// ```
/// use vflex_core::decode_serial_number;
///
/// let message = [10, 8, b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8'];
/// assert_eq!(decode_serial_number(&message)?, "12345678");
/// # Ok::<(), vflex_core::ProtocolError>(())
/// ```
pub fn decode_serial_number(message: &[u8]) -> Result<String, ProtocolError> {
    let reader = MessageReader::new(message);
    reader.require_exact_len(layout::SERIAL_NUMBER_MESSAGE_LEN)?;
    reader.require_command(layout::CMD_GET_SERIAL_NUMBER)?;
    reader.read_ascii(layout::PAYLOAD_OFFSET..layout::SERIAL_NUMBER_MESSAGE_LEN)
}
