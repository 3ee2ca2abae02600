use std::fmt;

use super::error::ProtocolError;
use super::layout;

/// One 3-byte MIDI message: a status byte and two data bytes.
///
/// Outbound protocol bytes travel as note triplets
/// (`NOTE_STATUS, high nibble, low nibble`); message boundaries are marked by
/// the fixed [`COMMAND_START`](layout::COMMAND_START) and
/// [`COMMAND_END`](layout::COMMAND_END) control triplets.
///
/// # Examples
/// ```
/// use vflex_core::MidiTriplet;
///
/// let triplet = MidiTriplet::new(0x90, 0x02, 0x0E);
/// assert_eq!(triplet.to_bytes(), [0x90, 0x02, 0x0E]);
/// assert!(!triplet.is_control());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MidiTriplet {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl MidiTriplet {
    pub const fn new(status: u8, data1: u8, data2: u8) -> Self {
        Self {
            status,
            data1,
            data2,
        }
    }

    pub const fn to_bytes(self) -> [u8; layout::TRIPLET_LEN] {
        [self.status, self.data1, self.data2]
    }

    /// True for the start/end markers, compared by value.
    pub fn is_control(&self) -> bool {
        *self == layout::COMMAND_START || *self == layout::COMMAND_END
    }
}

impl From<(u8, u8, u8)> for MidiTriplet {
    fn from((status, data1, data2): (u8, u8, u8)) -> Self {
        Self::new(status, data1, data2)
    }
}

impl From<[u8; layout::TRIPLET_LEN]> for MidiTriplet {
    fn from([status, data1, data2]: [u8; layout::TRIPLET_LEN]) -> Self {
        Self::new(status, data1, data2)
    }
}

impl From<MidiTriplet> for (u8, u8, u8) {
    fn from(value: MidiTriplet) -> Self {
        (value.status, value.data1, value.data2)
    }
}

impl TryFrom<&[u8]> for MidiTriplet {
    type Error = ProtocolError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        match bytes {
            [status, data1, data2] => Ok(Self::new(*status, *data1, *data2)),
            _ => Err(ProtocolError::TruncatedMidiMessage {
                message: bytes.to_vec(),
            }),
        }
    }
}

impl fmt::Display for MidiTriplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:#04x}, {:#04x}, {:#04x})",
            self.status, self.data1, self.data2
        )
    }
}

#[cfg(test)]
mod tests {
    use super::MidiTriplet;
    use crate::protocol::error::ProtocolError;
    use crate::protocol::layout;

    #[test]
    fn control_markers_are_recognised_by_value() {
        assert!(layout::COMMAND_START.is_control());
        assert!(layout::COMMAND_END.is_control());
        assert!(MidiTriplet::new(0x80, 0x00, 0x00).is_control());
        assert!(!MidiTriplet::new(layout::NOTE_STATUS, 0x00, 0x00).is_control());
    }

    #[test]
    fn try_from_accepts_exactly_three_bytes() {
        let triplet = MidiTriplet::try_from(&[0x90u8, 0x01, 0x02][..]).unwrap();
        assert_eq!(triplet, MidiTriplet::from((0x90, 0x01, 0x02)));
    }

    #[test]
    fn try_from_rejects_short_message() {
        let err = MidiTriplet::try_from(&[0x90u8, 0x01][..]).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::TruncatedMidiMessage { ref message } if message == &vec![0x90, 0x01]
        ));
    }

    #[test]
    fn display_is_hex() {
        let triplet = MidiTriplet::new(0x90, 0x01, 0x0F);
        assert_eq!(triplet.to_string(), "(0x90, 0x01, 0x0f)");
    }
}
