//! Volts input conversion.
//!
//! Users think in volts with at most two decimals ("12", "5.5", "20.01"); the
//! protocol carries whole millivolts. Input is rounded to two decimal places
//! before scaling, so 12.014 V becomes 12010 mV.

use thiserror::Error;

use crate::protocol::layout::MAX_MILLIVOLTS;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VoltageInputError {
    #[error("'{input}' is not a voltage")]
    NotANumber { input: String },
    #[error("{volts} V is outside 0.00-48.00 V")]
    OutOfRange { volts: f64 },
}

/// Convert volts to millivolts, rounding to two decimal places.
///
/// # Examples
/// ```
/// use vflex_core::volts_to_millivolts;
///
/// assert_eq!(volts_to_millivolts(12.0)?, 12_000);
/// assert_eq!(volts_to_millivolts(5.5)?, 5_500);
/// assert_eq!(volts_to_millivolts(12.01)?, 12_010);
/// # Ok::<(), vflex_core::VoltageInputError>(())
/// ```
pub fn volts_to_millivolts(volts: f64) -> Result<u16, VoltageInputError> {
    if !volts.is_finite() {
        return Err(VoltageInputError::NotANumber {
            input: volts.to_string(),
        });
    }
    let centivolts = (volts * 100.0).round();
    if centivolts < 0.0 || centivolts * 10.0 > f64::from(MAX_MILLIVOLTS) {
        return Err(VoltageInputError::OutOfRange { volts });
    }
    Ok(centivolts as u16 * 10)
}

/// Parse user text such as `"12"` or `"20.01"` into millivolts.
pub fn parse_volts(input: &str) -> Result<u16, VoltageInputError> {
    let volts: f64 = input
        .trim()
        .parse()
        .map_err(|_| VoltageInputError::NotANumber {
            input: input.to_string(),
        })?;
    volts_to_millivolts(volts)
}
