//! Integer inverter models (101, 102, 103).
//!
//! Every measurement is an integer register paired with a scale factor shared by
//! its quantity group (one `A_SF` for the total and all phase currents, and so on).

use crate::error::SunSpecError;
use crate::model::ac::{AcEnergyAccessor, AcPhase};
use crate::model::accessor::{
    average_present, delegate_model_accessor, to_f32, to_i32, to_i64, BaseModelAccessor,
    ModelAccessor, Reading,
};
use crate::model::data::ModelData;
use crate::model::descriptor::register_map;
use crate::model::ids::ModelId;
use crate::model::inverter::{combine_vendor_events, reports_phase, InverterAccessor};
use crate::model::state::{InverterEvents, InverterOperatingState};
use crate::model::views::impl_accessor_views;

register_map! {
    /// Registers of the integer inverter models, relative to the block address.
    pub enum IntegerInverterRegister {
        CurrentTotal => (0, UInt16),
        CurrentPhaseA => (1, UInt16),
        CurrentPhaseB => (2, UInt16),
        CurrentPhaseC => (3, UInt16),
        CurrentScaleFactor => (4, Int16, ScaleFactor),
        VoltagePhaseAPhaseB => (5, UInt16),
        VoltagePhaseBPhaseC => (6, UInt16),
        VoltagePhaseCPhaseA => (7, UInt16),
        VoltagePhaseANeutral => (8, UInt16),
        VoltagePhaseBNeutral => (9, UInt16),
        VoltagePhaseCNeutral => (10, UInt16),
        VoltageScaleFactor => (11, Int16, ScaleFactor),
        ActivePowerTotal => (12, Int16),
        ActivePowerScaleFactor => (13, Int16, ScaleFactor),
        Frequency => (14, UInt16),
        FrequencyScaleFactor => (15, Int16, ScaleFactor),
        ApparentPowerTotal => (16, Int16),
        ApparentPowerScaleFactor => (17, Int16, ScaleFactor),
        ReactivePowerTotal => (18, Int16),
        ReactivePowerScaleFactor => (19, Int16, ScaleFactor),
        PowerFactorAverage => (20, Int16),
        PowerFactorScaleFactor => (21, Int16, ScaleFactor),
        ActiveEnergyExported => (22, UInt32, Accumulator),
        ActiveEnergyScaleFactor => (24, Int16, ScaleFactor),
        DcCurrentTotal => (25, UInt16),
        DcCurrentScaleFactor => (26, Int16, ScaleFactor),
        DcVoltageTotal => (27, UInt16),
        DcVoltageScaleFactor => (28, Int16, ScaleFactor),
        DcPowerTotal => (29, Int16),
        DcPowerScaleFactor => (30, Int16, ScaleFactor),
        TemperatureCabinet => (31, Int16),
        TemperatureHeatSink => (32, Int16),
        TemperatureTransformer => (33, Int16),
        TemperatureOther => (34, Int16),
        TemperatureScaleFactor => (35, Int16, ScaleFactor),
        OperatingState => (36, UInt16, Enumeration),
        VendorOperatingState => (37, UInt16, Enumeration),
        EventsBitmask => (38, UInt32, Bitfield),
        EventsReservedBitmask => (40, UInt32, Bitfield),
        VendorEventsBitmask1 => (42, UInt32, Bitfield),
        VendorEventsBitmask2 => (44, UInt32, Bitfield),
        VendorEventsBitmask3 => (46, UInt32, Bitfield),
        VendorEventsBitmask4 => (48, UInt32, Bitfield),
    }
}

use IntegerInverterRegister as Reg;

/// Accessor for the integer inverter models.
#[derive(Clone, Debug)]
pub struct IntegerInverterModelAccessor<'a> {
    base: BaseModelAccessor<'a>,
}

delegate_model_accessor!(IntegerInverterModelAccessor);
impl_accessor_views!(IntegerInverterModelAccessor);

impl<'a> IntegerInverterModelAccessor<'a> {
    /// Length of the fixed block in words.
    pub const FIXED_BLOCK_LENGTH: u16 = 50;

    pub fn new(
        data: &'a ModelData,
        model_id: u16,
        base_address: u32,
        model_length: u16,
    ) -> Result<Self, SunSpecError> {
        let id = match ModelId::from_id(model_id)? {
            id @ (ModelId::SinglePhaseInverterInteger
            | ModelId::SplitPhaseInverterInteger
            | ModelId::ThreePhaseInverterInteger) => id,
            _ => return Err(SunSpecError::UnsupportedModel(model_id)),
        };
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

    /// The underlying decoding primitives.
    pub fn base(&self) -> &BaseModelAccessor<'a> {
        &self.base
    }

    fn scaled_f32(&self, value: Reg, scale_factor: Reg) -> Reading<f32> {
        Ok(to_f32(self.base.read_scaled(value, scale_factor)?))
    }

    fn scaled_i32(&self, value: Reg, scale_factor: Reg) -> Reading<i32> {
        Ok(to_i32(self.base.read_scaled(value, scale_factor)?))
    }

    fn phase_voltage(&self, phase: AcPhase) -> Result<Option<f64>, SunSpecError> {
        let register = match phase {
            AcPhase::PhaseA => Reg::VoltagePhaseANeutral,
            AcPhase::PhaseB => Reg::VoltagePhaseBNeutral,
            AcPhase::PhaseC => Reg::VoltagePhaseCNeutral,
            AcPhase::Total => return Ok(None),
        };
        if !reports_phase(self.model_id(), phase) {
            return Ok(None);
        }
        self.base.read_scaled(register, Reg::VoltageScaleFactor)
    }

    fn phase_line_voltage(&self, phase: AcPhase) -> Result<Option<f64>, SunSpecError> {
        let register = match phase {
            AcPhase::PhaseA => Reg::VoltagePhaseAPhaseB,
            AcPhase::PhaseB => Reg::VoltagePhaseBPhaseC,
            AcPhase::PhaseC => Reg::VoltagePhaseCPhaseA,
            AcPhase::Total => return Ok(None),
        };
        if !reports_phase(self.model_id(), phase) {
            return Ok(None);
        }
        self.base.read_scaled(register, Reg::VoltageScaleFactor)
    }
}

impl AcEnergyAccessor for IntegerInverterModelAccessor<'_> {
    fn frequency(&self) -> Reading<f32> {
        self.scaled_f32(Reg::Frequency, Reg::FrequencyScaleFactor)
    }

    fn neutral_current(&self) -> Reading<f32> {
        Ok(None)
    }

    fn current_for(&self, phase: AcPhase) -> Reading<f32> {
        let register = match phase {
            AcPhase::Total => Reg::CurrentTotal,
            AcPhase::PhaseA => Reg::CurrentPhaseA,
            AcPhase::PhaseB => Reg::CurrentPhaseB,
            AcPhase::PhaseC => Reg::CurrentPhaseC,
        };
        if !reports_phase(self.model_id(), phase) {
            return Ok(None);
        }
        self.scaled_f32(register, Reg::CurrentScaleFactor)
    }

    fn voltage_for(&self, phase: AcPhase) -> Reading<f32> {
        if phase != AcPhase::Total {
            return Ok(to_f32(self.phase_voltage(phase)?));
        }
        let mut values = Vec::with_capacity(3);
        for p in AcPhase::PHASES {
            values.push(self.phase_voltage(p)?);
        }
        Ok(to_f32(average_present(values)))
    }

    fn line_voltage_for(&self, phase: AcPhase) -> Reading<f32> {
        if phase != AcPhase::Total {
            return Ok(to_f32(self.phase_line_voltage(phase)?));
        }
        let mut values = Vec::with_capacity(3);
        for p in AcPhase::PHASES {
            values.push(self.phase_line_voltage(p)?);
        }
        Ok(to_f32(average_present(values)))
    }

    fn power_factor_for(&self, phase: AcPhase) -> Reading<f32> {
        if phase != AcPhase::Total {
            return Ok(None);
        }
        Ok(to_f32(self.base.read_power_factor(
            Reg::PowerFactorAverage,
            Reg::PowerFactorScaleFactor,
        )?))
    }

    fn active_power_for(&self, phase: AcPhase) -> Reading<i32> {
        if phase != AcPhase::Total {
            return Ok(None);
        }
        self.scaled_i32(Reg::ActivePowerTotal, Reg::ActivePowerScaleFactor)
    }

    fn apparent_power_for(&self, phase: AcPhase) -> Reading<i32> {
        if phase != AcPhase::Total {
            return Ok(None);
        }
        self.scaled_i32(Reg::ApparentPowerTotal, Reg::ApparentPowerScaleFactor)
    }

    fn reactive_power_for(&self, phase: AcPhase) -> Reading<i32> {
        if phase != AcPhase::Total {
            return Ok(None);
        }
        self.scaled_i32(Reg::ReactivePowerTotal, Reg::ReactivePowerScaleFactor)
    }

    fn active_energy_delivered_for(&self, phase: AcPhase) -> Reading<i64> {
        if phase != AcPhase::Total {
            return Ok(None);
        }
        Ok(to_i64(self.base.read_scaled(
            Reg::ActiveEnergyExported,
            Reg::ActiveEnergyScaleFactor,
        )?))
    }

    fn active_energy_received_for(&self, _phase: AcPhase) -> Reading<i64> {
        Ok(None)
    }

    fn apparent_energy_delivered_for(&self, _phase: AcPhase) -> Reading<i64> {
        Ok(None)
    }

    fn apparent_energy_received_for(&self, _phase: AcPhase) -> Reading<i64> {
        Ok(None)
    }

    fn reactive_energy_delivered_for(&self, _phase: AcPhase) -> Reading<i64> {
        Ok(None)
    }

    fn reactive_energy_received_for(&self, _phase: AcPhase) -> Reading<i64> {
        Ok(None)
    }
}

impl InverterAccessor for IntegerInverterModelAccessor<'_> {
    fn dc_current(&self) -> Reading<f32> {
        self.scaled_f32(Reg::DcCurrentTotal, Reg::DcCurrentScaleFactor)
    }

    fn dc_voltage(&self) -> Reading<f32> {
        self.scaled_f32(Reg::DcVoltageTotal, Reg::DcVoltageScaleFactor)
    }

    fn dc_power(&self) -> Reading<i32> {
        self.scaled_i32(Reg::DcPowerTotal, Reg::DcPowerScaleFactor)
    }

    fn cabinet_temperature(&self) -> Reading<f32> {
        self.scaled_f32(Reg::TemperatureCabinet, Reg::TemperatureScaleFactor)
    }

    fn heat_sink_temperature(&self) -> Reading<f32> {
        self.scaled_f32(Reg::TemperatureHeatSink, Reg::TemperatureScaleFactor)
    }

    fn transformer_temperature(&self) -> Reading<f32> {
        self.scaled_f32(Reg::TemperatureTransformer, Reg::TemperatureScaleFactor)
    }

    fn other_temperature(&self) -> Reading<f32> {
        self.scaled_f32(Reg::TemperatureOther, Reg::TemperatureScaleFactor)
    }

    fn operating_state(&self) -> Reading<InverterOperatingState> {
        self.base.read_enum(Reg::OperatingState)
    }

    fn vendor_operating_state(&self) -> Reading<u16> {
        self.base.read_u16(Reg::VendorOperatingState)
    }

    fn events(&self) -> Result<InverterEvents, SunSpecError> {
        Ok(InverterEvents::from_bits_retain(
            self.base.read_bitfield(Reg::EventsBitmask)?,
        ))
    }

    fn vendor_events(&self) -> Result<u128, SunSpecError> {
        Ok(combine_vendor_events([
            self.base.read_bitfield(Reg::VendorEventsBitmask1)?,
            self.base.read_bitfield(Reg::VendorEventsBitmask2)?,
            self.base.read_bitfield(Reg::VendorEventsBitmask3)?,
            self.base.read_bitfield(Reg::VendorEventsBitmask4)?,
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::descriptor::assert_register_table;

    #[test]
    fn test_register_table_is_contiguous() {
        assert_register_table::<IntegerInverterRegister>(
            IntegerInverterModelAccessor::FIXED_BLOCK_LENGTH,
        );
    }
}
