//! Ready-to-send GET query sequences.
//!
//! A GET query is a one-byte payload, so its frame is `[2, command]` and its
//! transport sequence is always four triplets long. The sequences are built at
//! compile time and can be sent any number of times.

use super::framing::byte_to_triplet;
use super::layout;
use super::triplet::MidiTriplet;

const SINGLE_BYTE_FRAME_LEN: u8 = 2;

const fn single_byte_query(command: u8) -> [MidiTriplet; 4] {
    [
        layout::COMMAND_START,
        byte_to_triplet(SINGLE_BYTE_FRAME_LEN),
        byte_to_triplet(command),
        layout::COMMAND_END,
    ]
}

pub const GET_SERIAL_NUMBER_SEQUENCE: [MidiTriplet; 4] =
    single_byte_query(layout::CMD_GET_SERIAL_NUMBER);
pub const GET_VOLTAGE_SEQUENCE: [MidiTriplet; 4] = single_byte_query(layout::CMD_GET_VOLTAGE);
pub const GET_LED_STATE_SEQUENCE: [MidiTriplet; 4] = single_byte_query(layout::CMD_GET_LED_STATE);
