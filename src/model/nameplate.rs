//! Inverter controls nameplate ratings (model 120).

use std::collections::BTreeMap;
use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::Serialize;

use crate::error::SunSpecError;
use crate::model::accessor::{
    delegate_model_accessor, to_f32, to_i32, BaseModelAccessor, ModelAccessor, Reading,
};
use crate::model::data::ModelData;
use crate::model::descriptor::register_map;
use crate::model::ids::ModelId;

/// One of the four EEI power quadrants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum EeiQuadrant {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl EeiQuadrant {
    pub const ALL: [EeiQuadrant; 4] = [
        EeiQuadrant::Q1,
        EeiQuadrant::Q2,
        EeiQuadrant::Q3,
        EeiQuadrant::Q4,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            EeiQuadrant::Q1 => 0,
            EeiQuadrant::Q2 => 1,
            EeiQuadrant::Q3 => 2,
            EeiQuadrant::Q4 => 3,
        }
    }
}

impl fmt::Display for EeiQuadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.index() + 1)
    }
}

/// Type of distributed energy resource (`DERTyp`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Serialize)]
#[repr(u16)]
pub enum DerType {
    Pv = 4,
    PvStorage = 82,
}

impl DerType {
    pub fn description(self) -> &'static str {
        match self {
            DerType::Pv => "PV",
            DerType::PvStorage => "PV + storage",
        }
    }
}

register_map! {
    /// Registers of the nameplate model, relative to the block address.
    pub enum NameplateRegister {
        DerType => (0, UInt16, Enumeration),
        ActivePowerRating => (1, UInt16),
        ActivePowerRatingScaleFactor => (2, Int16, ScaleFactor),
        ApparentPowerRating => (3, UInt16),
        ApparentPowerRatingScaleFactor => (4, Int16, ScaleFactor),
        ReactivePowerRatingQ1 => (5, Int16),
        ReactivePowerRatingQ2 => (6, Int16),
        ReactivePowerRatingQ3 => (7, Int16),
        ReactivePowerRatingQ4 => (8, Int16),
        ReactivePowerRatingScaleFactor => (9, Int16, ScaleFactor),
        CurrentRating => (10, UInt16),
        CurrentRatingScaleFactor => (11, Int16, ScaleFactor),
        PowerFactorRatingQ1 => (12, Int16),
        PowerFactorRatingQ2 => (13, Int16),
        PowerFactorRatingQ3 => (14, Int16),
        PowerFactorRatingQ4 => (15, Int16),
        PowerFactorRatingScaleFactor => (16, Int16, ScaleFactor),
        EnergyRating => (17, UInt16),
        EnergyRatingScaleFactor => (18, Int16, ScaleFactor),
        ChargeCapacity => (19, UInt16),
        ChargeCapacityScaleFactor => (20, Int16, ScaleFactor),
        MaxChargeRate => (21, UInt16),
        MaxChargeRateScaleFactor => (22, Int16, ScaleFactor),
        MaxDischargeRate => (23, UInt16),
        MaxDischargeRateScaleFactor => (24, Int16, ScaleFactor),
        Pad => (25, UInt16),
    }
}

use NameplateRegister as Reg;

const REACTIVE_POWER_RATINGS: [Reg; 4] = [
    Reg::ReactivePowerRatingQ1,
    Reg::ReactivePowerRatingQ2,
    Reg::ReactivePowerRatingQ3,
    Reg::ReactivePowerRatingQ4,
];

const POWER_FACTOR_RATINGS: [Reg; 4] = [
    Reg::PowerFactorRatingQ1,
    Reg::PowerFactorRatingQ2,
    Reg::PowerFactorRatingQ3,
    Reg::PowerFactorRatingQ4,
];

/// Accessor for the nameplate ratings model.
#[derive(Clone, Debug)]
pub struct NameplateModelAccessor<'a> {
    base: BaseModelAccessor<'a>,
}

delegate_model_accessor!(NameplateModelAccessor);

impl<'a> NameplateModelAccessor<'a> {
    pub const FIXED_BLOCK_LENGTH: u16 = 26;

    pub fn new(
        data: &'a ModelData,
        model_id: u16,
        base_address: u32,
        model_length: u16,
    ) -> Result<Self, SunSpecError> {
        let id = ModelId::from_id(model_id)?;
        if id != ModelId::Nameplate {
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

    pub fn der_type(&self) -> Reading<DerType> {
        self.base.read_enum(Reg::DerType)
    }

    /// Continuous active power output capability in W.
    pub fn active_power_rating(&self) -> Reading<i32> {
        Ok(to_i32(self.base.read_scaled(
            Reg::ActivePowerRating,
            Reg::ActivePowerRatingScaleFactor,
        )?))
    }

    /// Continuous apparent power output capability in VA.
    pub fn apparent_power_rating(&self) -> Reading<i32> {
        Ok(to_i32(self.base.read_scaled(
            Reg::ApparentPowerRating,
            Reg::ApparentPowerRatingScaleFactor,
        )?))
    }

    /// Continuous reactive power capability in VAR for `quadrant`.
    pub fn reactive_power_rating(&self, quadrant: EeiQuadrant) -> Reading<i32> {
        Ok(to_i32(self.base.read_scaled(
            REACTIVE_POWER_RATINGS[quadrant.index()],
            Reg::ReactivePowerRatingScaleFactor,
        )?))
    }

    /// Maximum RMS AC current in A.
    pub fn current_rating(&self) -> Reading<f32> {
        Ok(to_f32(self.base.read_scaled(
            Reg::CurrentRating,
            Reg::CurrentRatingScaleFactor,
        )?))
    }

    /// Minimum power factor capability for `quadrant`, as a decimal.
    pub fn power_factor_rating(&self, quadrant: EeiQuadrant) -> Reading<f32> {
        Ok(to_f32(self.base.read_scaled(
            POWER_FACTOR_RATINGS[quadrant.index()],
            Reg::PowerFactorRatingScaleFactor,
        )?))
    }

    /// Nominal energy rating of storage in Wh.
    pub fn energy_rating(&self) -> Reading<i32> {
        Ok(to_i32(self.base.read_scaled(
            Reg::EnergyRating,
            Reg::EnergyRatingScaleFactor,
        )?))
    }

    /// Usable capacity of the battery in Ah.
    pub fn charge_capacity(&self) -> Reading<i32> {
        Ok(to_i32(self.base.read_scaled(
            Reg::ChargeCapacity,
            Reg::ChargeCapacityScaleFactor,
        )?))
    }

    /// Maximum rate of energy transfer into the storage device, in W.
    pub fn max_charge_rate(&self) -> Reading<i32> {
        Ok(to_i32(self.base.read_scaled(
            Reg::MaxChargeRate,
            Reg::MaxChargeRateScaleFactor,
        )?))
    }

    /// Maximum rate of energy transfer out of the storage device, in W.
    pub fn max_discharge_rate(&self) -> Reading<i32> {
        Ok(to_i32(self.base.read_scaled(
            Reg::MaxDischargeRate,
            Reg::MaxDischargeRateScaleFactor,
        )?))
    }

    /// Reported ratings keyed `nameplate.<name>`, omitting absent values.
    pub fn device_info(&self) -> Result<BTreeMap<String, String>, SunSpecError> {
        let mut info = BTreeMap::new();
        let mut put = |key: &str, value: Option<String>| {
            if let Some(v) = value {
                info.insert(format!("nameplate.{key}"), v);
            }
        };
        put("type", self.der_type()?.map(|t| t.description().to_string()));
        put("activePowerRating", self.active_power_rating()?.map(|v| v.to_string()));
        put("apparentPowerRating", self.apparent_power_rating()?.map(|v| v.to_string()));
        put("currentRating", self.current_rating()?.map(|v| v.to_string()));
        put("energyRating", self.energy_rating()?.map(|v| v.to_string()));
        put("chargeCapacity", self.charge_capacity()?.map(|v| v.to_string()));
        put("maxChargeRate", self.max_charge_rate()?.map(|v| v.to_string()));
        put("maxDischargeRate", self.max_discharge_rate()?.map(|v| v.to_string()));
        Ok(info)
    }
}
