//! # SunSpec Error Handling
//!
//! This module defines the SunSpecError enum, which represents the different error
//! types that can occur in the sunspec-rs crate.
//!
//! A register holding its "not implemented" sentinel is not an error: getters
//! report it as `None`. The variants below are configuration or transport faults
//! that abort decoding of a model block.

use thiserror::Error;

/// Represents the different error types that can occur while decoding SunSpec models.
#[derive(Debug, Error)]
pub enum SunSpecError {
    /// Indicates a model ID that the requested accessor family does not handle.
    #[error("Unsupported model: {0}")]
    UnsupportedModel(u16),

    /// Indicates a register read beyond the populated range of the register store.
    #[error("Register read out of range: {count} word(s) at address {address}")]
    OutOfRange { address: u32, count: u16 },

    /// Indicates a declared model length shorter than the family's fixed block.
    #[error("Model {model_id} length {length} is shorter than its fixed block length {fixed}")]
    ModelLength { model_id: u16, length: u16, fixed: u16 },

    /// Indicates a repeating block count larger than the declared model length holds.
    #[error("Model {model_id} repeating block count {count} exceeds capacity {capacity}")]
    RepeatingBlockCount {
        model_id: u16,
        count: u16,
        capacity: u16,
    },

    /// Indicates an invalid hexadecimal register dump.
    #[error("Invalid hexadecimal string")]
    InvalidHexString,

    /// Indicates a malformed register snapshot.
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}
