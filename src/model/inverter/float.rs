//! Floating point inverter models (111, 112, 113).
//!
//! Same measurements as the integer models, each stored as a big-endian
//! IEEE-754 register pair with no scale factor.

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
    /// Registers of the floating point inverter models, relative to the block address.
    pub enum FloatInverterRegister {
        CurrentTotal => (0, Float32),
        CurrentPhaseA => (2, Float32),
        CurrentPhaseB => (4, Float32),
        CurrentPhaseC => (6, Float32),
        VoltagePhaseAPhaseB => (8, Float32),
        VoltagePhaseBPhaseC => (10, Float32),
        VoltagePhaseCPhaseA => (12, Float32),
        VoltagePhaseANeutral => (14, Float32),
        VoltagePhaseBNeutral => (16, Float32),
        VoltagePhaseCNeutral => (18, Float32),
        ActivePowerTotal => (20, Float32),
        Frequency => (22, Float32),
        ApparentPowerTotal => (24, Float32),
        ReactivePowerTotal => (26, Float32),
        PowerFactorAverage => (28, Float32),
        ActiveEnergyExported => (30, Float32, Accumulator),
        DcCurrentTotal => (32, Float32),
        DcVoltageTotal => (34, Float32),
        DcPowerTotal => (36, Float32),
        TemperatureCabinet => (38, Float32),
        TemperatureHeatSink => (40, Float32),
        TemperatureTransformer => (42, Float32),
        TemperatureOther => (44, Float32),
        OperatingState => (46, UInt16, Enumeration),
        VendorOperatingState => (47, UInt16, Enumeration),
        EventsBitmask => (48, UInt32, Bitfield),
        EventsReservedBitmask => (50, UInt32, Bitfield),
        VendorEventsBitmask1 => (52, UInt32, Bitfield),
        VendorEventsBitmask2 => (54, UInt32, Bitfield),
        VendorEventsBitmask3 => (56, UInt32, Bitfield),
        VendorEventsBitmask4 => (58, UInt32, Bitfield),
    }
}

use FloatInverterRegister as Reg;

/// Accessor for the floating point inverter models.
#[derive(Clone, Debug)]
pub struct FloatInverterModelAccessor<'a> {
    base: BaseModelAccessor<'a>,
}

delegate_model_accessor!(FloatInverterModelAccessor);
impl_accessor_views!(FloatInverterModelAccessor);

impl<'a> FloatInverterModelAccessor<'a> {
    /// Length of the fixed block in words.
    pub const FIXED_BLOCK_LENGTH: u16 = 60;

    pub fn new(
        data: &'a ModelData,
        model_id: u16,
        base_address: u32,
        model_length: u16,
    ) -> Result<Self, SunSpecError> {
        let id = match ModelId::from_id(model_id)? {
            id @ (ModelId::SinglePhaseInverterFloat
            | ModelId::SplitPhaseInverterFloat
            | ModelId::ThreePhaseInverterFloat) => id,
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

    fn float(&self, register: Reg) -> Result<Option<f64>, SunSpecError> {
        Ok(self.base.read_f32(register)?.map(f64::from))
    }

    fn phase_float(
        &self,
        phase: AcPhase,
        registers: [Reg; 3],
    ) -> Result<Option<f64>, SunSpecError> {
        if !reports_phase(self.model_id(), phase) {
            return Ok(None);
        }
        match phase {
            AcPhase::PhaseA => self.float(registers[0]),
            AcPhase::PhaseB => self.float(registers[1]),
            AcPhase::PhaseC => self.float(registers[2]),
            AcPhase::Total => Ok(None),
        }
    }

    fn averaged(&self, phase: AcPhase, registers: [Reg; 3]) -> Reading<f32> {
        if phase != AcPhase::Total {
            return Ok(to_f32(self.phase_float(phase, registers)?));
        }
        let mut values = Vec::with_capacity(3);
        for p in AcPhase::PHASES {
            values.push(self.phase_float(p, registers)?);
        }
        Ok(to_f32(average_present(values)))
    }
}

const LINE_NEUTRAL_VOLTAGES: [Reg; 3] = [
    Reg::VoltagePhaseANeutral,
    Reg::VoltagePhaseBNeutral,
    Reg::VoltagePhaseCNeutral,
];

const LINE_LINE_VOLTAGES: [Reg; 3] = [
    Reg::VoltagePhaseAPhaseB,
    Reg::VoltagePhaseBPhaseC,
    Reg::VoltagePhaseCPhaseA,
];

impl AcEnergyAccessor for FloatInverterModelAccessor<'_> {
    fn frequency(&self) -> Reading<f32> {
        self.base.read_f32(Reg::Frequency)
    }

    fn neutral_current(&self) -> Reading<f32> {
        Ok(None)
    }

    fn current_for(&self, phase: AcPhase) -> Reading<f32> {
        if phase == AcPhase::Total {
            return self.base.read_f32(Reg::CurrentTotal);
        }
        let currents = [Reg::CurrentPhaseA, Reg::CurrentPhaseB, Reg::CurrentPhaseC];
        Ok(to_f32(self.phase_float(phase, currents)?))
    }

    fn voltage_for(&self, phase: AcPhase) -> Reading<f32> {
        self.averaged(phase, LINE_NEUTRAL_VOLTAGES)
    }

    fn line_voltage_for(&self, phase: AcPhase) -> Reading<f32> {
        self.averaged(phase, LINE_LINE_VOLTAGES)
    }

    fn power_factor_for(&self, phase: AcPhase) -> Reading<f32> {
        if phase != AcPhase::Total {
            return Ok(None);
        }
        let pf = self.float(Reg::PowerFactorAverage)?;
        Ok(to_f32(self.base.resolve_power_factor(pf)))
    }

    fn active_power_for(&self, phase: AcPhase) -> Reading<i32> {
        if phase != AcPhase::Total {
            return Ok(None);
        }
        Ok(to_i32(self.float(Reg::ActivePowerTotal)?))
    }

    fn apparent_power_for(&self, phase: AcPhase) -> Reading<i32> {
        if phase != AcPhase::Total {
            return Ok(None);
        }
        Ok(to_i32(self.float(Reg::ApparentPowerTotal)?))
    }

    fn reactive_power_for(&self, phase: AcPhase) -> Reading<i32> {
        if phase != AcPhase::Total {
            return Ok(None);
        }
        Ok(to_i32(self.float(Reg::ReactivePowerTotal)?))
    }

    fn active_energy_delivered_for(&self, phase: AcPhase) -> Reading<i64> {
        if phase != AcPhase::Total {
            return Ok(None);
        }
        Ok(to_i64(self.float(Reg::ActiveEnergyExported)?))
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

impl InverterAccessor for FloatInverterModelAccessor<'_> {
    fn dc_current(&self) -> Reading<f32> {
        self.base.read_f32(Reg::DcCurrentTotal)
    }

    fn dc_voltage(&self) -> Reading<f32> {
        self.base.read_f32(Reg::DcVoltageTotal)
    }

    fn dc_power(&self) -> Reading<i32> {
        Ok(to_i32(self.float(Reg::DcPowerTotal)?))
    }

    fn cabinet_temperature(&self) -> Reading<f32> {
        self.base.read_f32(Reg::TemperatureCabinet)
    }

    fn heat_sink_temperature(&self) -> Reading<f32> {
        self.base.read_f32(Reg::TemperatureHeatSink)
    }

    fn transformer_temperature(&self) -> Reading<f32> {
        self.base.read_f32(Reg::TemperatureTransformer)
    }

    fn other_temperature(&self) -> Reading<f32> {
        self.base.read_f32(Reg::TemperatureOther)
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
        assert_register_table::<FloatInverterRegister>(
            FloatInverterModelAccessor::FIXED_BLOCK_LENGTH,
        );
    }
}
