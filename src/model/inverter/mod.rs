//! # Inverter Models
//!
//! Inverter measurements come in two wire encodings: integer registers with
//! shared scale factors (models 101-103) and IEEE-754 floats (models 111-113).
//! Both implement [`InverterAccessor`]; [`InverterModelAccessor`] selects the
//! encoding once, from the model ID, and dispatches to it.
//!
//! ## Usage
//!
//! ```rust
//! use sunspec_rs::model::{AcEnergyAccessor, InverterModelAccessor, ModelData};
//!
//! let mut words = vec![0u16; 52];
//! words[2] = 354; // A
//! words[6] = (-2i16) as u16; // A_SF
//! let data = ModelData::with_words(40069, &words);
//!
//! let inverter = InverterModelAccessor::new(&data, 103, 40069, 50).unwrap();
//! assert_eq!(inverter.current().unwrap(), Some(3.54));
//! ```

pub mod float;
pub mod integer;
pub mod status;

use enum_dispatch::enum_dispatch;

use crate::error::SunSpecError;
use crate::model::ac::{AcEnergyAccessor, AcPhase};
use crate::model::accessor::{ModelAccessor, Reading};
use crate::model::data::ModelData;
use crate::model::ids::ModelId;
use crate::model::state::{InverterEvents, InverterOperatingState};
use crate::model::views::impl_accessor_views;

pub use float::{FloatInverterModelAccessor, FloatInverterRegister};
pub use integer::{IntegerInverterModelAccessor, IntegerInverterRegister};
pub use status::InverterStatus;

/// Inverter specific measurements, on top of the AC measurements.
#[enum_dispatch]
pub trait InverterAccessor: AcEnergyAccessor {
    /// DC input current in A.
    fn dc_current(&self) -> Reading<f32>;

    /// DC input voltage in V.
    fn dc_voltage(&self) -> Reading<f32>;

    /// DC input power in W.
    fn dc_power(&self) -> Reading<i32>;

    /// Cabinet temperature in °C.
    fn cabinet_temperature(&self) -> Reading<f32>;

    fn heat_sink_temperature(&self) -> Reading<f32>;

    fn transformer_temperature(&self) -> Reading<f32>;

    fn other_temperature(&self) -> Reading<f32>;

    fn operating_state(&self) -> Reading<InverterOperatingState>;

    /// Vendor specific operating state code.
    fn vendor_operating_state(&self) -> Reading<u16>;

    /// Active events; a device not reporting events has none set.
    fn events(&self) -> Result<InverterEvents, SunSpecError>;

    /// The four vendor event registers, `EvtVnd1` in the lowest 32 bits.
    fn vendor_events(&self) -> Result<u128, SunSpecError>;
}

/// An inverter model accessor of either wire encoding.
#[enum_dispatch(ModelAccessor, AcEnergyAccessor, InverterAccessor)]
#[derive(Clone, Debug)]
pub enum InverterModelAccessor<'a> {
    Integer(IntegerInverterModelAccessor<'a>),
    Float(FloatInverterModelAccessor<'a>),
}

impl_accessor_views!(InverterModelAccessor);

impl<'a> InverterModelAccessor<'a> {
    /// Creates the accessor matching `model_id`.
    ///
    /// Fails with [`SunSpecError::UnsupportedModel`] for any model that is not an
    /// inverter model.
    pub fn new(
        data: &'a ModelData,
        model_id: u16,
        base_address: u32,
        model_length: u16,
    ) -> Result<Self, SunSpecError> {
        match ModelId::from_id(model_id)? {
            ModelId::SinglePhaseInverterInteger
            | ModelId::SplitPhaseInverterInteger
            | ModelId::ThreePhaseInverterInteger => Ok(IntegerInverterModelAccessor::new(
                data,
                model_id,
                base_address,
                model_length,
            )?
            .into()),
            ModelId::SinglePhaseInverterFloat
            | ModelId::SplitPhaseInverterFloat
            | ModelId::ThreePhaseInverterFloat => Ok(FloatInverterModelAccessor::new(
                data,
                model_id,
                base_address,
                model_length,
            )?
            .into()),
            _ => Err(SunSpecError::UnsupportedModel(model_id)),
        }
    }
}

/// Returns true if a model with `model_id` reports `phase` individually.
///
/// Single phase models report phase A only, split phase models A and B.
pub(crate) fn reports_phase(model_id: ModelId, phase: AcPhase) -> bool {
    let count = model_id.phase_count();
    match phase {
        AcPhase::Total => true,
        AcPhase::PhaseA => count >= 1,
        AcPhase::PhaseB => count >= 2,
        AcPhase::PhaseC => count >= 3,
    }
}

/// Packs the four vendor event bitfields into one value.
pub(crate) fn combine_vendor_events(fields: [u32; 4]) -> u128 {
    fields
        .iter()
        .enumerate()
        .fold(0u128, |acc, (i, bits)| acc | (u128::from(*bits) << (32 * i)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_phase_by_model() {
        assert!(reports_phase(ModelId::SinglePhaseInverterInteger, AcPhase::PhaseA));
        assert!(!reports_phase(ModelId::SinglePhaseInverterInteger, AcPhase::PhaseB));
        assert!(reports_phase(ModelId::SplitPhaseInverterFloat, AcPhase::PhaseB));
        assert!(!reports_phase(ModelId::SplitPhaseInverterFloat, AcPhase::PhaseC));
        assert!(reports_phase(ModelId::ThreePhaseInverterInteger, AcPhase::PhaseC));
    }

    #[test]
    fn test_combine_vendor_events() {
        let combined = combine_vendor_events([0x1, 0x2, 0x0, 0x8000_0000]);
        assert_eq!(combined, 1 | (2u128 << 32) | (1u128 << 127));
    }
}
