//! vFlex protocol encoding and decoding.
//!
//! The protocol follows a layered structure:
//! - `layout`: markers, command ids and message offsets (source of truth)
//! - `triplet`: the MIDI triplet value type
//! - `framing`: length-prefixing and triplet encoding for outbound commands
//! - `reassembly`: inbound triplets back into validated protocol messages
//! - `reader`: checked access to protocol message fields
//! - `coders`: typed field decoding (voltage, LED state, serial number)
//! - `commands` / `catalog`: SET command builders and ready-made GET sequences
//! - `error`: explicit, actionable errors
//!
//! Everything here is pure and contains no I/O; the `transport` and `device`
//! modules own timing and port access.

pub mod catalog;
pub mod coders;
pub mod commands;
pub mod error;
pub mod framing;
pub mod layout;
pub mod reassembly;
pub(crate) mod reader;
pub mod triplet;
