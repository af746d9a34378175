//! # sunspec-rs - A Rust Crate for Decoding SunSpec Modbus Models
//!
//! The sunspec-rs crate turns raw Modbus holding register snapshots from SunSpec
//! compliant devices (inverters, meters and their companion models) into typed
//! engineering values.
//!
//! ## Features
//!
//! - Register descriptors for the common, inverter (integer and floating point),
//!   nameplate, basic settings, multiple MPPT and integer meter models
//! - "Not implemented" sentinel detection for every wire type, reported as `None`
//! - Scale factor application with exact decimal results
//! - Sticky detection of devices reporting power factor as a whole percentage
//! - Phase and sign-reversal views over any inverter or meter accessor
//! - Repeating block (DC module) access for the multiple MPPT extension
//! - JSON register snapshots and a `sunspec-decode` command line tool
//! - Support for logging and error handling
//!
//! ## Usage
//!
//! ```rust
//! use sunspec_rs::model::{
//!     AcEnergyAccessor, AccessorViews, InverterAccessor, InverterModelAccessor, ModelData,
//! };
//!
//! let mut words = vec![0u16; 52];
//! words[2 + 12] = 7; // W
//! words[2 + 13] = 1; // W_SF
//! let data = ModelData::with_words(40_069, &words);
//!
//! let inverter = InverterModelAccessor::new(&data, 103, 40_069, 50).unwrap();
//! assert_eq!(inverter.active_power().unwrap(), Some(70));
//! assert_eq!(inverter.reversed().active_power().unwrap(), Some(-70));
//! assert_eq!(inverter.dc_power().unwrap(), Some(0));
//! ```

pub mod constants;
pub mod error;
pub mod logging;
pub mod model;
pub mod snapshot;

pub use crate::error::SunSpecError;
pub use crate::logging::{init_logger, log_info};

pub use model::{
    AcEnergyAccessor, AcPhase, AccessorViews, InverterAccessor, InverterModelAccessor,
    MeterAccessor, ModelAccessor, ModelData, ModelId, PhaseView, Reading, Reversed,
};
pub use snapshot::{decode_models, DecodeOptions, DecodedModel, Snapshot};
