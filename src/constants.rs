//! SunSpec Constants
//!
//! This module defines constants used by the SunSpec model decoder, based on the
//! SunSpec Alliance information model conventions.

/// "Not implemented" value of a `uint16`, `enum16` or `bitfield16` register
pub const SUNSPEC_NAN_UINT16: u16 = 0xFFFF;

/// "Not implemented" value of an `int16` or `sunssf` register
pub const SUNSPEC_NAN_INT16: i16 = i16::MIN;

/// "Not implemented" value of a `uint32`, `acc32` or `bitfield32` register
pub const SUNSPEC_NAN_UINT32: u32 = 0xFFFF_FFFF;

/// "Not implemented" value of an `int32` register
pub const SUNSPEC_NAN_INT32: i32 = i32::MIN;

/// Number of words in a model header (model ID, model length)
pub const SUNSPEC_MODEL_HEADER_LENGTH: u32 = 2;

/// Seconds between the Unix epoch and the SunSpec epoch (2000-01-01T00:00:00Z)
pub const SUNSPEC_EPOCH_OFFSET_SECS: i64 = 946_684_800;

/// Metadata key of the sticky "power factor encoded as integer percent" flag
pub const METADATA_INTEGER_PF_PERCENT: &str = "IntPfPct";

/// Divisor applied to power factor values once the percent latch is set
pub const POWER_FACTOR_PERCENT_DIVISOR: f64 = 100.0;
