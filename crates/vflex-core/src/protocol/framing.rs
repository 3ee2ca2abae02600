//! Outbound command framing.
//!
//! A raw command payload becomes a frame by prefixing its total length; one or
//! more frames become a transport sequence by nibble-splitting every byte into
//! a note triplet and wrapping the result in the start/end control markers.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use super::error::ProtocolError;
use super::layout;
use super::triplet::MidiTriplet;

/// An ordered command payload that can be framed.
///
/// Implemented for slices, vectors and arrays of integers. Integer types wider
/// than `u8` are narrowed per element and fail with
/// [`ProtocolError::InvalidInput`] when a value does not fit a byte. Sets are
/// accepted by the type system only to be rejected with
/// [`ProtocolError::RejectedUnorderedInput`]: byte order is what the device
/// executes, and a set has none.
pub trait FramePayload {
    fn into_payload(self) -> Result<Vec<u8>, ProtocolError>;
}

impl FramePayload for &[u8] {
    fn into_payload(self) -> Result<Vec<u8>, ProtocolError> {
        Ok(self.to_vec())
    }
}

impl FramePayload for Vec<u8> {
    fn into_payload(self) -> Result<Vec<u8>, ProtocolError> {
        Ok(self)
    }
}

impl FramePayload for &Vec<u8> {
    fn into_payload(self) -> Result<Vec<u8>, ProtocolError> {
        Ok(self.clone())
    }
}

impl<const N: usize> FramePayload for [u8; N] {
    fn into_payload(self) -> Result<Vec<u8>, ProtocolError> {
        Ok(self.to_vec())
    }
}

impl<const N: usize> FramePayload for &[u8; N] {
    fn into_payload(self) -> Result<Vec<u8>, ProtocolError> {
        Ok(self.to_vec())
    }
}

macro_rules! impl_wide_payload {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FramePayload for &[$ty] {
                fn into_payload(self) -> Result<Vec<u8>, ProtocolError> {
                    narrow_all(self.iter().copied())
                }
            }

            impl FramePayload for Vec<$ty> {
                fn into_payload(self) -> Result<Vec<u8>, ProtocolError> {
                    narrow_all(self)
                }
            }

            impl<const N: usize> FramePayload for [$ty; N] {
                fn into_payload(self) -> Result<Vec<u8>, ProtocolError> {
                    narrow_all(self)
                }
            }
        )*
    };
}

impl_wide_payload!(u16, u32, u64, i16, i32, i64);

impl<T, S> FramePayload for HashSet<T, S> {
    fn into_payload(self) -> Result<Vec<u8>, ProtocolError> {
        Err(ProtocolError::RejectedUnorderedInput)
    }
}

impl<T, S> FramePayload for &HashSet<T, S> {
    fn into_payload(self) -> Result<Vec<u8>, ProtocolError> {
        Err(ProtocolError::RejectedUnorderedInput)
    }
}

impl<T> FramePayload for BTreeSet<T> {
    fn into_payload(self) -> Result<Vec<u8>, ProtocolError> {
        Err(ProtocolError::RejectedUnorderedInput)
    }
}

impl<T> FramePayload for &BTreeSet<T> {
    fn into_payload(self) -> Result<Vec<u8>, ProtocolError> {
        Err(ProtocolError::RejectedUnorderedInput)
    }
}

fn narrow_all<T, I>(values: I) -> Result<Vec<u8>, ProtocolError>
where
    I: IntoIterator<Item = T>,
    T: Copy + Into<i128> + TryInto<u8>,
{
    values
        .into_iter()
        .map(|value| {
            <T as TryInto<u8>>::try_into(value).map_err(|_| ProtocolError::InvalidInput {
                value: value.into(),
            })
        })
        .collect()
}

/// Prefix a command payload with its frame length (`payload.len() + 1`).
///
/// # Examples
/// ```
/// use vflex_core::prepare_frame;
///
/// assert_eq!(prepare_frame([18u8])?, vec![2, 18]);
/// assert_eq!(prepare_frame(vec![0x92u8, 0x2E, 0xE0])?, vec![4, 0x92, 0x2E, 0xE0]);
/// # Ok::<(), vflex_core::ProtocolError>(())
/// ```
///
/// # Errors
/// `RejectedUnorderedInput` for sets, `InvalidInput` for values outside
/// 0..=255, `FrameTooLong` when the length byte would overflow.
pub fn prepare_frame<P: FramePayload>(payload: P) -> Result<Vec<u8>, ProtocolError> {
    let payload = payload.into_payload()?;
    if payload.len() > layout::MAX_PAYLOAD_LEN {
        return Err(ProtocolError::FrameTooLong {
            payload_len: payload.len(),
        });
    }
    let mut frame = Vec::with_capacity(payload.len() + 1);
    frame.push((payload.len() + 1) as u8);
    frame.extend_from_slice(&payload);
    debug!(frame = ?frame, "prepared command frame");
    Ok(frame)
}

/// Encode one protocol byte as a note triplet carrying its two nibbles.
///
/// # Examples
/// ```
/// use vflex_core::{MidiTriplet, byte_to_triplet};
///
/// assert_eq!(byte_to_triplet(0x2E), MidiTriplet::new(0x90, 0x02, 0x0E));
/// ```
pub const fn byte_to_triplet(protocol_byte: u8) -> MidiTriplet {
    MidiTriplet::new(
        layout::NOTE_STATUS,
        (protocol_byte >> 4) & layout::NIBBLE_MASK,
        protocol_byte & layout::NIBBLE_MASK,
    )
}

/// One flat frame or a list of frames, as accepted by [`prepare_for_sending`].
#[derive(Debug, Clone, Copy)]
pub enum Frames<'a> {
    Single(&'a [u8]),
    Many(&'a [Vec<u8>]),
}

impl Frames<'_> {
    fn is_empty(&self) -> bool {
        match self {
            Frames::Single(frame) => frame.is_empty(),
            Frames::Many(frames) => frames.is_empty(),
        }
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &[u8]> + '_> {
        match self {
            Frames::Single(frame) => Box::new(std::iter::once(*frame)),
            Frames::Many(frames) => Box::new(frames.iter().map(Vec::as_slice)),
        }
    }
}

impl<'a> From<&'a [u8]> for Frames<'a> {
    fn from(frame: &'a [u8]) -> Self {
        Frames::Single(frame)
    }
}

impl<'a> From<&'a Vec<u8>> for Frames<'a> {
    fn from(frame: &'a Vec<u8>) -> Self {
        Frames::Single(frame)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Frames<'a> {
    fn from(frame: &'a [u8; N]) -> Self {
        Frames::Single(frame)
    }
}

impl<'a> From<&'a [Vec<u8>]> for Frames<'a> {
    fn from(frames: &'a [Vec<u8>]) -> Self {
        Frames::Many(frames)
    }
}

impl<'a> From<&'a Vec<Vec<u8>>> for Frames<'a> {
    fn from(frames: &'a Vec<Vec<u8>>) -> Self {
        Frames::Many(frames)
    }
}

impl<'a, const N: usize> From<&'a [Vec<u8>; N]> for Frames<'a> {
    fn from(frames: &'a [Vec<u8>; N]) -> Self {
        Frames::Many(frames)
    }
}

/// Turn one or more frames into a transport sequence:
/// `COMMAND_START`, one note triplet per frame byte, `COMMAND_END`.
///
/// # Examples
/// ```
/// use vflex_core::protocol::layout::{COMMAND_END, COMMAND_START};
/// use vflex_core::{MidiTriplet, prepare_for_sending};
///
/// let sequence = prepare_for_sending(&[2u8, 18])?;
/// assert_eq!(
///     sequence,
///     vec![
///         COMMAND_START,
///         MidiTriplet::new(0x90, 0x0, 0x2),
///         MidiTriplet::new(0x90, 0x1, 0x2),
///         COMMAND_END,
///     ]
/// );
/// # Ok::<(), vflex_core::ProtocolError>(())
/// ```
///
/// # Errors
/// `EmptyCommand` when no frames are given.
pub fn prepare_for_sending<'a, F>(frames: F) -> Result<Vec<MidiTriplet>, ProtocolError>
where
    F: Into<Frames<'a>>,
{
    let frames = frames.into();
    if frames.is_empty() {
        return Err(ProtocolError::EmptyCommand);
    }

    let mut pre_transport = Vec::new();
    for frame in frames.iter() {
        for &byte in frame {
            pre_transport.extend_from_slice(&byte_to_triplet(byte).to_bytes());
        }
    }

    let mut sequence = Vec::with_capacity(pre_transport.len() / layout::TRIPLET_LEN + 2);
    sequence.push(layout::COMMAND_START);
    sequence.extend(split_to_triplets(&pre_transport)?);
    sequence.push(layout::COMMAND_END);
    Ok(sequence)
}

fn split_to_triplets(stream: &[u8]) -> Result<Vec<MidiTriplet>, ProtocolError> {
    if stream.len() % layout::TRIPLET_LEN != 0 {
        return Err(ProtocolError::MalformedTripletAlignment { len: stream.len() });
    }
    Ok(stream
        .chunks_exact(layout::TRIPLET_LEN)
        .map(|chunk| MidiTriplet::new(chunk[0], chunk[1], chunk[2]))
        .collect())
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashSet};

    use super::{byte_to_triplet, prepare_for_sending, prepare_frame, split_to_triplets};
    use crate::protocol::error::ProtocolError;
    use crate::protocol::layout;
    use crate::protocol::triplet::MidiTriplet;

    #[test]
    fn prepare_frame_adds_length() {
        let frame = prepare_frame([layout::CMD_GET_VOLTAGE]).unwrap();
        assert_eq!(frame, vec![2, layout::CMD_GET_VOLTAGE]);
    }

    #[test]
    fn prepare_frame_accepts_wider_integers() {
        let frame = prepare_frame(vec![i32::from(layout::CMD_SET_VOLTAGE), 2, 3]).unwrap();
        assert_eq!(frame, vec![4, layout::CMD_SET_VOLTAGE, 2, 3]);
    }

    #[test]
    fn prepare_frame_rejects_out_of_range_values() {
        let err = prepare_frame(vec![18i32, 256]).unwrap_err();
        assert_eq!(err, ProtocolError::InvalidInput { value: 256 });

        let err = prepare_frame([-1i64]).unwrap_err();
        assert_eq!(err, ProtocolError::InvalidInput { value: -1 });
    }

    #[test]
    fn prepare_frame_rejects_sets() {
        let hashed: HashSet<u8> = [1, 2, 3].into_iter().collect();
        assert_eq!(
            prepare_frame(hashed).unwrap_err(),
            ProtocolError::RejectedUnorderedInput
        );

        let ordered_set: BTreeSet<u8> = [layout::CMD_GET_SERIAL_NUMBER].into_iter().collect();
        assert_eq!(
            prepare_frame(&ordered_set).unwrap_err(),
            ProtocolError::RejectedUnorderedInput
        );
    }

    #[test]
    fn prepare_frame_rejects_oversized_payload() {
        let payload = vec![0u8; layout::MAX_PAYLOAD_LEN + 1];
        let err = prepare_frame(payload).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::FrameTooLong {
                payload_len: layout::MAX_PAYLOAD_LEN + 1
            }
        );

        let frame = prepare_frame(vec![0u8; layout::MAX_PAYLOAD_LEN]).unwrap();
        assert_eq!(frame[0], u8::MAX);
        assert_eq!(frame.len(), u8::MAX as usize);
    }

    #[test]
    fn byte_to_triplet_splits_nibbles() {
        assert_eq!(
            byte_to_triplet(0xE0),
            MidiTriplet::new(layout::NOTE_STATUS, 0x0E, 0x00)
        );
        assert_eq!(
            byte_to_triplet(0x0F),
            MidiTriplet::new(layout::NOTE_STATUS, 0x00, 0x0F)
        );
    }

    #[test]
    fn prepare_for_sending_rejects_empty_input() {
        let none: &[Vec<u8>] = &[];
        assert_eq!(
            prepare_for_sending(none).unwrap_err(),
            ProtocolError::EmptyCommand
        );
        let empty_frame: &[u8] = &[];
        assert_eq!(
            prepare_for_sending(empty_frame).unwrap_err(),
            ProtocolError::EmptyCommand
        );
    }

    #[test]
    fn prepare_for_sending_concatenates_frames() {
        let frames = vec![vec![2, layout::CMD_GET_SERIAL_NUMBER], vec![2, layout::CMD_GET_VOLTAGE]];
        let sequence = prepare_for_sending(&frames).unwrap();

        assert_eq!(sequence.len(), 6);
        assert_eq!(sequence[0], layout::COMMAND_START);
        assert_eq!(sequence[2], byte_to_triplet(layout::CMD_GET_SERIAL_NUMBER));
        assert_eq!(sequence[4], byte_to_triplet(layout::CMD_GET_VOLTAGE));
        assert_eq!(sequence[5], layout::COMMAND_END);
    }

    #[test]
    fn single_frame_and_list_of_one_are_equivalent() {
        let frame = prepare_frame([layout::CMD_GET_LED_STATE]).unwrap();
        let single = prepare_for_sending(&frame).unwrap();
        let listed = prepare_for_sending(&[frame.clone()]).unwrap();
        assert_eq!(single, listed);
    }

    #[test]
    fn split_to_triplets_requires_alignment() {
        let err = split_to_triplets(&[0x90, 0x01]).unwrap_err();
        assert_eq!(err, ProtocolError::MalformedTripletAlignment { len: 2 });
        assert_eq!(
            split_to_triplets(&[0x90, 0x01, 0x02]).unwrap(),
            vec![MidiTriplet::new(0x90, 0x01, 0x02)]
        );
    }
}
