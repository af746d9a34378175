//! # SunSpec Models
//!
//! Typed accessors over raw register snapshots, one family per group of SunSpec
//! model IDs. Every accessor borrows a [`ModelData`] store, knows the base
//! address and length of its model block, and exposes semantic getters that
//! return `Ok(None)` for values the device does not report.

pub mod descriptor;
pub mod data;
pub mod ids;
pub mod accessor;
pub mod ac;
pub mod state;
pub mod views;
pub mod inverter;
pub mod meter;
pub mod mppt;
pub mod nameplate;
pub mod settings;
pub mod common;

pub use ac::{AcEnergyAccessor, AcPhase};
pub use accessor::{BaseModelAccessor, ModelAccessor, Reading};
pub use common::CommonModelAccessor;
pub use data::{MetadataValue, ModelData};
pub use descriptor::{Classification, RawValue, RegisterDescriptor, RegisterMap, WireType};
pub use ids::ModelId;
pub use inverter::{
    FloatInverterModelAccessor, IntegerInverterModelAccessor, InverterAccessor,
    InverterModelAccessor, InverterStatus,
};
pub use meter::{IntegerMeterModelAccessor, MeterAccessor};
pub use mppt::{DcModuleAccessor, MpptExtensionModelAccessor};
pub use nameplate::{DerType, EeiQuadrant, NameplateModelAccessor};
pub use settings::{ApparentPowerCalculation, ConnectedPhase, SettingsModelAccessor, VarAction};
pub use state::{
    DcModuleEvents, DcModuleOperatingState, InverterEvents, InverterOperatingState, MeterEvents,
};
pub use views::{AccessorViews, PhaseView, Reversed};
