//! # Multiple MPPT Extension (model 160)
//!
//! The fixed block carries the scale factors shared by every DC module plus the
//! module count; each repeating block instance describes one MPPT input. Module
//! values are read at the module's own base address while their scale factors
//! are read from the fixed block.
//!
//! ## Usage
//!
//! ```rust
//! use sunspec_rs::model::{ModelData, MpptExtensionModelAccessor};
//!
//! // fixed block of 8 words followed by two modules of 20 words
//! let mut words = vec![0u16; 2 + 8 + 40];
//! words[2] = (-1i16) as u16; // DCA_SF
//! words[8] = 2; // N
//! words[2 + 8 + 20 + 9] = 125; // module 2 DCA
//! let data = ModelData::with_words(40200, &words);
//!
//! let mppt = MpptExtensionModelAccessor::new(&data, 160, 40200, 48).unwrap();
//! let modules = mppt.dc_modules().unwrap();
//! assert_eq!(modules.len(), 2);
//! assert_eq!(modules[1].base_address(), 40230);
//! assert_eq!(modules[1].dc_current().unwrap(), Some(12.5));
//! ```

use chrono::{DateTime, TimeZone, Utc};

use crate::constants::SUNSPEC_EPOCH_OFFSET_SECS;
use crate::error::SunSpecError;
use crate::model::accessor::{
    delegate_model_accessor, to_f32, to_i32, to_i64, BaseModelAccessor, ModelAccessor, Reading,
};
use crate::model::data::ModelData;
use crate::model::descriptor::register_map;
use crate::model::ids::ModelId;
use crate::model::state::{DcModuleEvents, DcModuleOperatingState};

register_map! {
    /// Fixed block registers of the multiple MPPT extension.
    pub enum MpptRegister {
        DcCurrentScaleFactor => (0, Int16, ScaleFactor),
        DcVoltageScaleFactor => (1, Int16, ScaleFactor),
        DcPowerScaleFactor => (2, Int16, ScaleFactor),
        DcEnergyScaleFactor => (3, Int16, ScaleFactor),
        EventsBitmask => (4, UInt32, Bitfield),
        ModuleCount => (6, UInt16),
        TimestampPeriod => (7, UInt16),
    }
}

register_map! {
    /// Registers of one DC module, relative to the module's base address.
    pub enum DcModuleRegister {
        InputId => (0, UInt16),
        InputName => (1, String(8)),
        DcCurrent => (9, UInt16),
        DcVoltage => (10, UInt16),
        DcPower => (11, UInt16),
        DcEnergy => (12, UInt32, Accumulator),
        Timestamp => (14, UInt32),
        Temperature => (16, Int16),
        OperatingState => (17, UInt16, Enumeration),
        EventsBitmask => (18, UInt32, Bitfield),
    }
}

/// Accessor for the multiple MPPT inverter extension model.
#[derive(Clone, Debug)]
pub struct MpptExtensionModelAccessor<'a> {
    base: BaseModelAccessor<'a>,
}

delegate_model_accessor!(MpptExtensionModelAccessor);

impl<'a> MpptExtensionModelAccessor<'a> {
    pub const FIXED_BLOCK_LENGTH: u16 = 8;
    pub const REPEATING_BLOCK_LENGTH: u16 = 20;

    pub fn new(
        data: &'a ModelData,
        model_id: u16,
        base_address: u32,
        model_length: u16,
    ) -> Result<Self, SunSpecError> {
        let id = ModelId::from_id(model_id)?;
        if id != ModelId::MultipleMppt {
            return Err(SunSpecError::UnsupportedModel(model_id));
        }
        let base = BaseModelAccessor::new(
            data,
            id,
            base_address,
            model_length,
            Self::FIXED_BLOCK_LENGTH,
            Self::REPEATING_BLOCK_LENGTH,
        )?;
        Ok(Self { base })
    }

    /// Number of DC modules.
    ///
    /// Taken from `N`; when the device does not report it, the number of
    /// repeating block instances the model length holds. Fails with
    /// [`SunSpecError::RepeatingBlockCount`] when `N` claims more modules than
    /// the model length holds.
    pub fn module_count(&self) -> Result<u16, SunSpecError> {
        let capacity = self.repeating_block_instance_count();
        match self.base.read_u16(MpptRegister::ModuleCount)? {
            Some(count) if count > capacity => Err(SunSpecError::RepeatingBlockCount {
                model_id: self.model_id().id(),
                count,
                capacity,
            }),
            Some(count) => Ok(count),
            None => Ok(capacity),
        }
    }

    /// Interval between module timestamps, in seconds.
    pub fn timestamp_period(&self) -> Reading<u16> {
        self.base.read_u16(MpptRegister::TimestampPeriod)
    }

    pub fn events(&self) -> Result<DcModuleEvents, SunSpecError> {
        Ok(DcModuleEvents::from_bits_retain(
            self.base.read_bitfield(MpptRegister::EventsBitmask)?,
        ))
    }

    /// The module at zero-based `index`.
    pub fn dc_module(&self, index: u16) -> DcModuleAccessor<'a> {
        let offset = u32::from(Self::FIXED_BLOCK_LENGTH)
            + u32::from(index) * u32::from(Self::REPEATING_BLOCK_LENGTH);
        DcModuleAccessor {
            base: self.base,
            index,
            base_address: self.block_address().saturating_add(offset),
        }
    }

    /// Every module, in register order.
    pub fn dc_modules(&self) -> Result<Vec<DcModuleAccessor<'a>>, SunSpecError> {
        Ok((0..self.module_count()?).map(|i| self.dc_module(i)).collect())
    }
}

/// One DC input of a multiple MPPT inverter.
#[derive(Clone, Copy, Debug)]
pub struct DcModuleAccessor<'a> {
    base: BaseModelAccessor<'a>,
    index: u16,
    base_address: u32,
}

impl DcModuleAccessor<'_> {
    /// Zero-based position of the module in the repeating block.
    pub fn index(&self) -> u16 {
        self.index
    }

    /// Address of the first word of this module's block.
    pub fn base_address(&self) -> u32 {
        self.base_address
    }

    fn scaled(&self, value: DcModuleRegister, scale_factor: MpptRegister) -> Reading<f64> {
        self.base.read_scaled_at(
            value,
            self.base_address,
            scale_factor,
            self.base.block_address(),
        )
    }

    pub fn input_id(&self) -> Reading<u16> {
        self.base.read_u16_at(DcModuleRegister::InputId, self.base_address)
    }

    pub fn input_name(&self) -> Result<String, SunSpecError> {
        self.base
            .read_string_at(DcModuleRegister::InputName, self.base_address)
    }

    pub fn dc_current(&self) -> Reading<f32> {
        Ok(to_f32(self.scaled(
            DcModuleRegister::DcCurrent,
            MpptRegister::DcCurrentScaleFactor,
        )?))
    }

    pub fn dc_voltage(&self) -> Reading<f32> {
        Ok(to_f32(self.scaled(
            DcModuleRegister::DcVoltage,
            MpptRegister::DcVoltageScaleFactor,
        )?))
    }

    pub fn dc_power(&self) -> Reading<i32> {
        Ok(to_i32(self.scaled(
            DcModuleRegister::DcPower,
            MpptRegister::DcPowerScaleFactor,
        )?))
    }

    /// Lifetime energy in Wh.
    pub fn dc_energy(&self) -> Reading<i64> {
        Ok(to_i64(self.scaled(
            DcModuleRegister::DcEnergy,
            MpptRegister::DcEnergyScaleFactor,
        )?))
    }

    /// Time of the module's last update.
    pub fn timestamp(&self) -> Reading<DateTime<Utc>> {
        let Some(secs) = self
            .base
            .read_u32_at(DcModuleRegister::Timestamp, self.base_address)?
        else {
            return Ok(None);
        };
        Ok(Utc
            .timestamp_opt(i64::from(secs) + SUNSPEC_EPOCH_OFFSET_SECS, 0)
            .single())
    }

    /// Module temperature in °C.
    pub fn temperature(&self) -> Reading<f32> {
        Ok(self
            .base
            .read_i16_at(DcModuleRegister::Temperature, self.base_address)?
            .map(f32::from))
    }

    pub fn operating_state(&self) -> Reading<DcModuleOperatingState> {
        self.base
            .read_enum_at(DcModuleRegister::OperatingState, self.base_address)
    }

    pub fn events(&self) -> Result<DcModuleEvents, SunSpecError> {
        Ok(DcModuleEvents::from_bits_retain(
            self.base
                .read_bitfield_at(DcModuleRegister::EventsBitmask, self.base_address)?,
        ))
    }
}
