use thiserror::Error;

/// Errors returned by vFlex protocol framing, reassembly and field decoding.
///
/// None of these are retryable inside the protocol layer: each one carries the
/// offending input (and the expected value, where there is one) so a failure
/// can be diagnosed without re-running the exchange.
///
/// # Examples
/// ```
/// use vflex_core::ProtocolError;
///
/// let err = ProtocolError::InvalidProtocolMessageLength {
///     message: vec![4, 18, 0x2E],
///     expected: 4,
/// };
/// assert_eq!(err.to_string(), "expected 4 bytes but got 3 in protocol message [4, 18, 46]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("no command frames provided")]
    EmptyCommand,
    #[error("command payload must be an ordered sequence, not a set")]
    RejectedUnorderedInput,
    #[error("payload value {value} is not a protocol byte (0-255)")]
    InvalidInput { value: i128 },
    #[error("payload of {payload_len} bytes does not fit a single frame")]
    FrameTooLong { payload_len: usize },
    #[error("pre-transport stream of {len} values is not a multiple of 3")]
    MalformedTripletAlignment { len: usize },
    #[error("expected {expected} bytes but got {} in protocol message {message:?}", .message.len())]
    InvalidProtocolMessageLength { message: Vec<u8>, expected: usize },
    #[error("expected command number {expected}, but got {actual} in protocol message {message:?}")]
    IncorrectCommandByte {
        message: Vec<u8>,
        expected: u8,
        actual: u8,
    },
    #[error("MIDI message {message:?} is not a complete 3-byte triplet")]
    TruncatedMidiMessage { message: Vec<u8> },
    #[error("serial number payload is not ASCII in protocol message {message:?}")]
    InvalidSerialNumber { message: Vec<u8> },
    #[error("invalid LED state byte: {value}")]
    InvalidLedState { value: u8 },
    #[error("voltage {millivolts} mV is above the supported maximum")]
    VoltageOutOfRange { millivolts: u16 },
}
