//! Inverter controls basic settings (model 121).

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::Serialize;

use crate::error::SunSpecError;
use crate::model::accessor::{
    delegate_model_accessor, to_f32, to_i32, BaseModelAccessor, ModelAccessor, Reading,
};
use crate::model::data::ModelData;
use crate::model::descriptor::register_map;
use crate::model::ids::ModelId;
use crate::model::nameplate::EeiQuadrant;

/// VAR action on a change between charging and discharging (`VArAct`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Serialize)]
#[repr(u16)]
pub enum VarAction {
    Switch = 1,
    Maintain = 2,
}

/// How total apparent power is calculated (`ClcTotVA`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Serialize)]
#[repr(u16)]
pub enum ApparentPowerCalculation {
    Vector = 1,
    Arithmetic = 2,
}

/// Phase a single phase inverter is connected to (`ConnPh`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Serialize)]
#[repr(u16)]
pub enum ConnectedPhase {
    A = 1,
    B = 2,
    C = 3,
}

register_map! {
    /// Registers of the basic settings model, relative to the block address.
    pub enum SettingsRegister {
        ActivePowerMaximum => (0, UInt16),
        VoltageReference => (1, UInt16),
        VoltageReferenceOffset => (2, Int16),
        VoltageMaximum => (3, UInt16),
        VoltageMinimum => (4, UInt16),
        ApparentPowerMaximum => (5, UInt16),
        ReactivePowerMaximumQ1 => (6, Int16),
        ReactivePowerMaximumQ2 => (7, Int16),
        ReactivePowerMaximumQ3 => (8, Int16),
        ReactivePowerMaximumQ4 => (9, Int16),
        RampRateDefault => (10, UInt16),
        PowerFactorMinimumQ1 => (11, Int16),
        PowerFactorMinimumQ2 => (12, Int16),
        PowerFactorMinimumQ3 => (13, Int16),
        PowerFactorMinimumQ4 => (14, Int16),
        VarAction => (15, UInt16, Enumeration),
        ApparentPowerCalculation => (16, UInt16, Enumeration),
        RampRateMaximum => (17, UInt16),
        NominalFrequency => (18, UInt16),
        ConnectedPhase => (19, UInt16, Enumeration),
        ActivePowerMaximumScaleFactor => (20, Int16, ScaleFactor),
        VoltageReferenceScaleFactor => (21, Int16, ScaleFactor),
        VoltageReferenceOffsetScaleFactor => (22, Int16, ScaleFactor),
        VoltageMinMaxScaleFactor => (23, Int16, ScaleFactor),
        ApparentPowerMaximumScaleFactor => (24, Int16, ScaleFactor),
        ReactivePowerMaximumScaleFactor => (25, Int16, ScaleFactor),
        RampRateDefaultScaleFactor => (26, Int16, ScaleFactor),
        PowerFactorMinimumScaleFactor => (27, Int16, ScaleFactor),
        RampRateMaximumScaleFactor => (28, Int16, ScaleFactor),
        NominalFrequencyScaleFactor => (29, Int16, ScaleFactor),
    }
}

use SettingsRegister as Reg;

const REACTIVE_POWER_MAXIMUMS: [Reg; 4] = [
    Reg::ReactivePowerMaximumQ1,
    Reg::ReactivePowerMaximumQ2,
    Reg::ReactivePowerMaximumQ3,
    Reg::ReactivePowerMaximumQ4,
];

const POWER_FACTOR_MINIMUMS: [Reg; 4] = [
    Reg::PowerFactorMinimumQ1,
    Reg::PowerFactorMinimumQ2,
    Reg::PowerFactorMinimumQ3,
    Reg::PowerFactorMinimumQ4,
];

/// Accessor for the basic settings model.
#[derive(Clone, Debug)]
pub struct SettingsModelAccessor<'a> {
    base: BaseModelAccessor<'a>,
}

delegate_model_accessor!(SettingsModelAccessor);

impl<'a> SettingsModelAccessor<'a> {
    pub const FIXED_BLOCK_LENGTH: u16 = 30;

    pub fn new(
        data: &'a ModelData,
        model_id: u16,
        base_address: u32,
        model_length: u16,
    ) -> Result<Self, SunSpecError> {
        let id = ModelId::from_id(model_id)?;
        if id != ModelId::BasicSettings {
            return Err(SunSpecError::UnsupportedModel(model_id));
        }
        let base = BaseModelAccessor::new(
            data,
            id,
            base_address,
            model_length,
            Self::FIXED_BLOCK_LENGTH,
            0,
        )?;
        Ok(Self { base })
    }

    fn scaled_i32(&self, value: Reg, scale_factor: Reg) -> Reading<i32> {
        Ok(to_i32(self.base.read_scaled(value, scale_factor)?))
    }

    fn scaled_f32(&self, value: Reg, scale_factor: Reg) -> Reading<f32> {
        Ok(to_f32(self.base.read_scaled(value, scale_factor)?))
    }

    /// Maximum active power output setting in W.
    pub fn active_power_maximum(&self) -> Reading<i32> {
        self.scaled_i32(Reg::ActivePowerMaximum, Reg::ActivePowerMaximumScaleFactor)
    }

    /// Voltage at the point of common coupling, in V.
    pub fn voltage_reference(&self) -> Reading<f32> {
        self.scaled_f32(Reg::VoltageReference, Reg::VoltageReferenceScaleFactor)
    }

    /// Offset between the PCC and the inverter terminals, in V.
    pub fn voltage_reference_offset(&self) -> Reading<f32> {
        self.scaled_f32(
            Reg::VoltageReferenceOffset,
            Reg::VoltageReferenceOffsetScaleFactor,
        )
    }

    pub fn voltage_maximum(&self) -> Reading<f32> {
        self.scaled_f32(Reg::VoltageMaximum, Reg::VoltageMinMaxScaleFactor)
    }

    pub fn voltage_minimum(&self) -> Reading<f32> {
        self.scaled_f32(Reg::VoltageMinimum, Reg::VoltageMinMaxScaleFactor)
    }

    /// Maximum apparent power setting in VA.
    pub fn apparent_power_maximum(&self) -> Reading<i32> {
        self.scaled_i32(Reg::ApparentPowerMaximum, Reg::ApparentPowerMaximumScaleFactor)
    }

    /// Maximum reactive power setting in VAR for `quadrant`.
    pub fn reactive_power_maximum(&self, quadrant: EeiQuadrant) -> Reading<i32> {
        self.scaled_i32(
            REACTIVE_POWER_MAXIMUMS[quadrant.index()],
            Reg::ReactivePowerMaximumScaleFactor,
        )
    }

    /// Default ramp rate of active power, in % of `WMax` per second.
    pub fn ramp_rate_default(&self) -> Reading<f32> {
        self.scaled_f32(Reg::RampRateDefault, Reg::RampRateDefaultScaleFactor)
    }

    /// Minimum power factor setting for `quadrant`, as a decimal.
    pub fn power_factor_minimum(&self, quadrant: EeiQuadrant) -> Reading<f32> {
        self.scaled_f32(
            POWER_FACTOR_MINIMUMS[quadrant.index()],
            Reg::PowerFactorMinimumScaleFactor,
        )
    }

    pub fn var_action(&self) -> Reading<VarAction> {
        self.base.read_enum(Reg::VarAction)
    }

    pub fn apparent_power_calculation(&self) -> Reading<ApparentPowerCalculation> {
        self.base.read_enum(Reg::ApparentPowerCalculation)
    }

    /// Maximum ramp rate, in % of `WMax` per second.
    pub fn ramp_rate_maximum(&self) -> Reading<f32> {
        self.scaled_f32(Reg::RampRateMaximum, Reg::RampRateMaximumScaleFactor)
    }

    /// Nominal grid frequency in Hz.
    pub fn nominal_frequency(&self) -> Reading<f32> {
        self.scaled_f32(Reg::NominalFrequency, Reg::NominalFrequencyScaleFactor)
    }

    pub fn connected_phase(&self) -> Reading<ConnectedPhase> {
        self.base.read_enum(Reg::ConnectedPhase)
    }
}
