//! SunSpec model identifiers handled by this crate.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::Serialize;

use crate::error::SunSpecError;

/// A SunSpec model number.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
)]
#[repr(u16)]
pub enum ModelId {
    Common = 1,
    SinglePhaseInverterInteger = 101,
    SplitPhaseInverterInteger = 102,
    ThreePhaseInverterInteger = 103,
    SinglePhaseInverterFloat = 111,
    SplitPhaseInverterFloat = 112,
    ThreePhaseInverterFloat = 113,
    Nameplate = 120,
    BasicSettings = 121,
    MultipleMppt = 160,
    SinglePhaseMeterInteger = 201,
    SplitPhaseMeterInteger = 202,
    WyeThreePhaseMeterInteger = 203,
    DeltaThreePhaseMeterInteger = 204,
}

impl ModelId {
    /// Looks up a model number, failing with [`SunSpecError::UnsupportedModel`]
    /// for numbers this crate does not decode.
    pub fn from_id(id: u16) -> Result<Self, SunSpecError> {
        Self::try_from(id).map_err(|_| SunSpecError::UnsupportedModel(id))
    }

    pub fn id(self) -> u16 {
        self.into()
    }

    pub fn description(self) -> &'static str {
        match self {
            ModelId::Common => "Common",
            ModelId::SinglePhaseInverterInteger => "Inverter (Single Phase)",
            ModelId::SplitPhaseInverterInteger => "Inverter (Split-Phase)",
            ModelId::ThreePhaseInverterInteger => "Inverter (Three Phase)",
            ModelId::SinglePhaseInverterFloat => "Inverter (Single Phase) FLOAT",
            ModelId::SplitPhaseInverterFloat => "Inverter (Split-Phase) FLOAT",
            ModelId::ThreePhaseInverterFloat => "Inverter (Three Phase) FLOAT",
            ModelId::Nameplate => "Inverter Controls Nameplate Ratings",
            ModelId::BasicSettings => "Inverter Controls Basic Settings",
            ModelId::MultipleMppt => "Multiple MPPT Inverter Extension Model",
            ModelId::SinglePhaseMeterInteger => "Meter (Single Phase)",
            ModelId::SplitPhaseMeterInteger => "Meter (Split-Phase)",
            ModelId::WyeThreePhaseMeterInteger => "Meter (Wye-Connect Three Phase)",
            ModelId::DeltaThreePhaseMeterInteger => "Meter (Delta-Connect Three Phase)",
        }
    }

    /// Number of AC phases the model reports individually.
    ///
    /// Returns 0 for models that carry no AC measurements.
    pub fn phase_count(self) -> u8 {
        match self {
            ModelId::SinglePhaseInverterInteger
            | ModelId::SinglePhaseInverterFloat
            | ModelId::SinglePhaseMeterInteger => 1,
            ModelId::SplitPhaseInverterInteger
            | ModelId::SplitPhaseInverterFloat
            | ModelId::SplitPhaseMeterInteger => 2,
            ModelId::ThreePhaseInverterInteger
            | ModelId::ThreePhaseInverterFloat
            | ModelId::WyeThreePhaseMeterInteger
            | ModelId::DeltaThreePhaseMeterInteger => 3,
            _ => 0,
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id(), self.description())
    }
}
