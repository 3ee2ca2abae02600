//! Inbound message reassembly.
//!
//! Received MIDI messages are checked to be whole triplets, control markers are
//! dropped by value, and each remaining note triplet contributes one protocol
//! byte rebuilt from its two nibbles. Reassembly is positional: triplet order is
//! byte order. The declared length in the first byte is then validated, and
//! anything the transport delivered past it is discarded.

use tracing::trace;

use super::error::ProtocolError;
use super::layout;
use super::triplet::MidiTriplet;

/// Convert raw inbound MIDI messages into triplets.
///
/// # Errors
/// `TruncatedMidiMessage` for any message that is not exactly 3 bytes.
pub fn triplets_from_raw<M: AsRef<[u8]>>(
    messages: &[M],
) -> Result<Vec<MidiTriplet>, ProtocolError> {
    messages
        .iter()
        .map(|message| MidiTriplet::try_from(message.as_ref()))
        .collect()
}

/// Rebuild protocol bytes from note triplets, skipping control markers.
pub fn reassemble(triplets: &[MidiTriplet]) -> Vec<u8> {
    triplets
        .iter()
        .filter(|triplet| !triplet.is_control())
        .map(|triplet| {
            if triplet.status != layout::NOTE_STATUS {
                trace!(%triplet, "reassembling triplet with unexpected status");
            }
            ((triplet.data1 & layout::NIBBLE_MASK) << 4) | (triplet.data2 & layout::NIBBLE_MASK)
        })
        .collect()
}

/// Check the declared length and trim trailing bytes beyond it.
///
/// # Examples
/// ```
/// use vflex_core::validate_and_trim_protocol_message;
///
/// let trimmed = validate_and_trim_protocol_message(&[4, 18, 0x2E, 0xE0, 0xFF])?;
/// assert_eq!(trimmed, vec![4, 18, 0x2E, 0xE0]);
/// # Ok::<(), vflex_core::ProtocolError>(())
/// ```
///
/// # Errors
/// `InvalidProtocolMessageLength` when the message is empty, declares a zero
/// length, or is shorter than it declares.
pub fn validate_and_trim_protocol_message(message: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let declared = match message.get(layout::LENGTH_OFFSET) {
        Some(&0) | None => {
            return Err(ProtocolError::InvalidProtocolMessageLength {
                message: message.to_vec(),
                expected: layout::LENGTH_OFFSET + 1,
            });
        }
        Some(&len) => len as usize,
    };
    if message.len() < declared {
        return Err(ProtocolError::InvalidProtocolMessageLength {
            message: message.to_vec(),
            expected: declared,
        });
    }
    Ok(message[..declared].to_vec())
}

/// Reassemble a received transport sequence into one validated protocol message.
pub fn protocol_message_from_midi_messages(
    triplets: &[MidiTriplet],
) -> Result<Vec<u8>, ProtocolError> {
    validate_and_trim_protocol_message(&reassemble(triplets))
}
