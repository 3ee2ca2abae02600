use super::triplet::MidiTriplet;

/// Status byte carried by every note triplet that encodes a protocol byte.
pub const NOTE_STATUS: u8 = 0x90;

/// Control triplet opening a transport sequence.
pub const COMMAND_START: MidiTriplet = MidiTriplet::new(0x80, 0x00, 0x00);
/// Control triplet closing a transport sequence.
pub const COMMAND_END: MidiTriplet = MidiTriplet::new(0xA0, 0x00, 0x00);

pub const CMD_GET_SERIAL_NUMBER: u8 = 8;
pub const CMD_GET_LED_STATE: u8 = 15;
pub const CMD_GET_VOLTAGE: u8 = 18;
pub const CMD_SET_LED_STATE: u8 = 0x8F;
pub const CMD_SET_VOLTAGE: u8 = 0x92;

pub const LENGTH_OFFSET: usize = 0;
pub const COMMAND_OFFSET: usize = 1;
pub const PAYLOAD_OFFSET: usize = 2;

pub const NIBBLE_MASK: u8 = 0x0F;
pub const TRIPLET_LEN: usize = 3;
/// Largest payload whose frame length still fits in the length byte.
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize - 1;

pub const SERIAL_NUMBER_LEN: usize = 8;
pub const SERIAL_NUMBER_MESSAGE_LEN: usize = PAYLOAD_OFFSET + SERIAL_NUMBER_LEN;
pub const LED_STATE_MESSAGE_LEN: usize = PAYLOAD_OFFSET + 1;
pub const VOLTAGE_MESSAGE_LEN: usize = PAYLOAD_OFFSET + 2;
pub const VOLTAGE_RANGE: std::ops::Range<usize> = PAYLOAD_OFFSET..VOLTAGE_MESSAGE_LEN;

pub const LED_OFF: u8 = 0;
pub const LED_ON: u8 = 1;

/// Highest output the adapter supports (48.00 V).
pub const MAX_MILLIVOLTS: u16 = 48_000;
