use super::error::ProtocolError;
use super::layout;

pub struct MessageReader<'a> {
    message: &'a [u8],
}

impl<'a> MessageReader<'a> {
    pub fn new(message: &'a [u8]) -> Self {
        Self { message }
    }

    /// Length is checked before anything else is read.
    pub fn require_exact_len(&self, expected: usize) -> Result<(), ProtocolError> {
        if self.message.len() != expected {
            return Err(ProtocolError::InvalidProtocolMessageLength {
                message: self.message.to_vec(),
                expected,
            });
        }
        Ok(())
    }

    pub fn require_command(&self, expected: u8) -> Result<(), ProtocolError> {
        let actual = self.read_u8(layout::COMMAND_OFFSET)?;
        if actual != expected {
            return Err(ProtocolError::IncorrectCommandByte {
                message: self.message.to_vec(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, ProtocolError> {
        self.message
            .get(offset)
            .copied()
            .ok_or_else(|| ProtocolError::InvalidProtocolMessageLength {
                message: self.message.to_vec(),
                expected: offset + 1,
            })
    }

    pub fn read_u16_be(&self, range: std::ops::Range<usize>) -> Result<u16, ProtocolError> {
        let end = range.end;
        match self.read_slice(range)? {
            [high, low] => Ok(u16::from_be_bytes([*high, *low])),
            _ => Err(ProtocolError::InvalidProtocolMessageLength {
                message: self.message.to_vec(),
                expected: end,
            }),
        }
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], ProtocolError> {
        self.message
            .get(range.clone())
            .ok_or_else(|| ProtocolError::InvalidProtocolMessageLength {
                message: self.message.to_vec(),
                expected: range.end,
            })
    }

    pub fn read_ascii(&self, range: std::ops::Range<usize>) -> Result<String, ProtocolError> {
        let bytes = self.read_slice(range)?;
        if !bytes.is_ascii() {
            return Err(ProtocolError::InvalidSerialNumber {
                message: self.message.to_vec(),
            });
        }
        Ok(bytes.iter().map(|&b| char::from(b)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::MessageReader;
    use crate::protocol::error::ProtocolError;

    #[test]
    fn require_exact_len_rejects_short_and_long() {
        let reader = MessageReader::new(&[1, 2, 3]);
        assert!(reader.require_exact_len(3).is_ok());
        assert!(matches!(
            reader.require_exact_len(4),
            Err(ProtocolError::InvalidProtocolMessageLength { expected: 4, .. })
        ));
        assert!(matches!(
            reader.require_exact_len(2),
            Err(ProtocolError::InvalidProtocolMessageLength { expected: 2, .. })
        ));
    }

    #[test]
    fn read_u8_out_of_bounds() {
        let reader = MessageReader::new(&[1]);
        let err = reader.read_u8(1).unwrap_err();
        assert!(err.to_string().contains("expected 2 bytes but got 1"));
    }

    #[test]
    fn read_u16_be_is_big_endian() {
        let reader = MessageReader::new(&[4, 18, 0x13, 0x88]);
        assert_eq!(reader.read_u16_be(2..4).unwrap(), 5000);
    }

    #[test]
    fn read_ascii_rejects_high_bytes() {
        let reader = MessageReader::new(&[4, 8, b'A', 0xC3]);
        assert!(matches!(
            reader.read_ascii(2..4),
            Err(ProtocolError::InvalidSerialNumber { .. })
        ));
    }
}
