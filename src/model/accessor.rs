//! # Base Model Accessor
//!
//! Decoding primitives shared by every model family. A [`BaseModelAccessor`]
//! knows where one model block sits in a [`ModelData`] store and reads fields
//! described by a [`RegisterMap`] relative to a base address chosen per call.
//! The plain `read_*` methods use the model's block address; the `read_*_at`
//! variants take an explicit base, which is how repeating block instances reuse
//! one descriptor set.
//!
//! Every read returns `Ok(None)` for a register holding its "not implemented"
//! sentinel and `Err(SunSpecError::OutOfRange)` when the store was not populated
//! at the requested address.

use enum_dispatch::enum_dispatch;
use log::debug;
use num_enum::TryFromPrimitive;

use crate::constants::{
    METADATA_INTEGER_PF_PERCENT, POWER_FACTOR_PERCENT_DIVISOR, SUNSPEC_MODEL_HEADER_LENGTH,
};
use crate::error::SunSpecError;
use crate::model::data::{MetadataValue, ModelData};
use crate::model::descriptor::{decode_string, RawValue, RegisterMap, WireType};
use crate::model::ids::ModelId;

/// Result of a getter: `Ok(None)` when the device does not report the value.
pub type Reading<T> = Result<Option<T>, SunSpecError>;

/// Identity and geometry of a model block.
#[enum_dispatch]
pub trait ModelAccessor {
    fn model_id(&self) -> ModelId;

    /// Address of the model header.
    fn base_address(&self) -> u32;

    /// Model length in words, excluding the header.
    fn model_length(&self) -> u16;

    fn fixed_block_length(&self) -> u16;

    fn repeating_block_instance_length(&self) -> u16 {
        0
    }

    /// Address of the first word after the model header.
    fn block_address(&self) -> u32 {
        self.base_address().saturating_add(SUNSPEC_MODEL_HEADER_LENGTH)
    }

    fn repeating_block_instance_count(&self) -> u16 {
        match self.repeating_block_instance_length() {
            0 => 0,
            len => self.model_length().saturating_sub(self.fixed_block_length()) / len,
        }
    }
}

/// Returns `raw * 10^scale_factor`.
///
/// Negative exponents divide by the exact power of ten, so the result is the
/// closest `f64` to the decimal value.
pub fn scale_value(raw: f64, scale_factor: i32) -> f64 {
    if scale_factor < 0 {
        raw / 10f64.powi(-scale_factor)
    } else {
        raw * 10f64.powi(scale_factor)
    }
}

/// Averages the values that are present, or returns `None` if none are.
pub fn average_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}

/// Narrows a scaled value to the `f32` used for electrical measurements.
pub fn to_f32(value: Option<f64>) -> Option<f32> {
    value.map(|v| v as f32)
}

/// Rounds a scaled value to whole watts / volt-amperes.
pub fn to_i32(value: Option<f64>) -> Option<i32> {
    value.map(|v| v.round() as i32)
}

/// Rounds a scaled value to whole watt-hours.
pub fn to_i64(value: Option<f64>) -> Option<i64> {
    value.map(|v| v.round() as i64)
}

/// Shared decoding state of one model block.
#[derive(Clone, Copy, Debug)]
pub struct BaseModelAccessor<'a> {
    data: &'a ModelData,
    model_id: ModelId,
    base_address: u32,
    model_length: u16,
    fixed_block_length: u16,
    repeating_block_instance_length: u16,
}

impl<'a> BaseModelAccessor<'a> {
    /// Creates an accessor for the block whose header is at `base_address`.
    ///
    /// Fails with [`SunSpecError::ModelLength`] when `model_length` cannot hold
    /// the fixed block, and with [`SunSpecError::OutOfRange`] when the block
    /// would run past the end of the address space.
    pub fn new(
        data: &'a ModelData,
        model_id: ModelId,
        base_address: u32,
        model_length: u16,
        fixed_block_length: u16,
        repeating_block_instance_length: u16,
    ) -> Result<Self, SunSpecError> {
        if model_length < fixed_block_length {
            return Err(SunSpecError::ModelLength {
                model_id: model_id.id(),
                length: model_length,
                fixed: fixed_block_length,
            });
        }
        let last_offset = SUNSPEC_MODEL_HEADER_LENGTH + u32::from(model_length) - 1;
        if base_address.checked_add(last_offset).is_none() {
            return Err(SunSpecError::OutOfRange {
                address: base_address,
                count: model_length.saturating_add(SUNSPEC_MODEL_HEADER_LENGTH as u16),
            });
        }
        Ok(Self {
            data,
            model_id,
            base_address,
            model_length,
            fixed_block_length,
            repeating_block_instance_length,
        })
    }

    pub fn data(&self) -> &'a ModelData {
        self.data
    }

    fn words<R: RegisterMap>(&self, register: R, base: u32) -> Result<Vec<u16>, SunSpecError> {
        let d = register.descriptor();
        let address = d.address(base).ok_or(SunSpecError::OutOfRange {
            address: base,
            count: d.word_length,
        })?;
        self.data.words(address, d.word_length)
    }

    fn read_as<R: RegisterMap>(
        &self,
        register: R,
        base: u32,
        wire_type: WireType,
    ) -> Reading<RawValue> {
        Ok(wire_type.decode(&self.words(register, base)?))
    }

    /// Reads a register using the wire type of its descriptor.
    pub fn read_value<R: RegisterMap>(&self, register: R) -> Reading<RawValue> {
        self.read_value_at(register, self.block_address())
    }

    pub fn read_value_at<R: RegisterMap>(&self, register: R, base: u32) -> Reading<RawValue> {
        self.read_as(register, base, register.descriptor().wire_type)
    }

    pub fn read_u16<R: RegisterMap>(&self, register: R) -> Reading<u16> {
        self.read_u16_at(register, self.block_address())
    }

    pub fn read_u16_at<R: RegisterMap>(&self, register: R, base: u32) -> Reading<u16> {
        Ok(match self.read_as(register, base, WireType::UInt16)? {
            Some(RawValue::UInt16(v)) => Some(v),
            _ => None,
        })
    }

    pub fn read_i16<R: RegisterMap>(&self, register: R) -> Reading<i16> {
        self.read_i16_at(register, self.block_address())
    }

    pub fn read_i16_at<R: RegisterMap>(&self, register: R, base: u32) -> Reading<i16> {
        Ok(match self.read_as(register, base, WireType::Int16)? {
            Some(RawValue::Int16(v)) => Some(v),
            _ => None,
        })
    }

    pub fn read_u32<R: RegisterMap>(&self, register: R) -> Reading<u32> {
        self.read_u32_at(register, self.block_address())
    }

    pub fn read_u32_at<R: RegisterMap>(&self, register: R, base: u32) -> Reading<u32> {
        Ok(match self.read_as(register, base, WireType::UInt32)? {
            Some(RawValue::UInt32(v)) => Some(v),
            _ => None,
        })
    }

    pub fn read_i32<R: RegisterMap>(&self, register: R) -> Reading<i32> {
        self.read_i32_at(register, self.block_address())
    }

    pub fn read_i32_at<R: RegisterMap>(&self, register: R, base: u32) -> Reading<i32> {
        Ok(match self.read_as(register, base, WireType::Int32)? {
            Some(RawValue::Int32(v)) => Some(v),
            _ => None,
        })
    }

    pub fn read_f32<R: RegisterMap>(&self, register: R) -> Reading<f32> {
        self.read_f32_at(register, self.block_address())
    }

    pub fn read_f32_at<R: RegisterMap>(&self, register: R, base: u32) -> Reading<f32> {
        Ok(match self.read_as(register, base, WireType::Float32)? {
            Some(RawValue::Float32(v)) => Some(v),
            _ => None,
        })
    }

    /// Reads `value` and applies the exponent stored in `scale_factor`.
    ///
    /// Absent if either register holds its sentinel.
    pub fn read_scaled<V: RegisterMap, S: RegisterMap>(
        &self,
        value: V,
        scale_factor: S,
    ) -> Reading<f64> {
        let block = self.block_address();
        self.read_scaled_at(value, block, scale_factor, block)
    }

    /// Like [`read_scaled`](Self::read_scaled), with separate base addresses for
    /// the value and for its scale factor.
    pub fn read_scaled_at<V: RegisterMap, S: RegisterMap>(
        &self,
        value: V,
        value_base: u32,
        scale_factor: S,
        scale_factor_base: u32,
    ) -> Reading<f64> {
        let Some(raw) = self.read_value_at(value, value_base)? else {
            return Ok(None);
        };
        let Some(sf) = self.read_i16_at(scale_factor, scale_factor_base)? else {
            return Ok(None);
        };
        Ok(Some(scale_value(raw.as_f64(), i32::from(sf))))
    }

    /// Reads a bitfield register, normalising "not implemented" to no bits set.
    pub fn read_bitfield<R: RegisterMap>(&self, register: R) -> Result<u32, SunSpecError> {
        self.read_bitfield_at(register, self.block_address())
    }

    pub fn read_bitfield_at<R: RegisterMap>(
        &self,
        register: R,
        base: u32,
    ) -> Result<u32, SunSpecError> {
        Ok(match self.read_value_at(register, base)? {
            Some(RawValue::UInt16(v)) => u32::from(v),
            Some(RawValue::UInt32(v)) => v,
            _ => 0,
        })
    }

    /// Reads a string register, trimmed of trailing padding.
    pub fn read_string<R: RegisterMap>(&self, register: R) -> Result<String, SunSpecError> {
        self.read_string_at(register, self.block_address())
    }

    pub fn read_string_at<R: RegisterMap>(
        &self,
        register: R,
        base: u32,
    ) -> Result<String, SunSpecError> {
        Ok(decode_string(&self.words(register, base)?))
    }

    /// Reads an `enum16` register into `E`; unknown codes are absent.
    pub fn read_enum<R, E>(&self, register: R) -> Reading<E>
    where
        R: RegisterMap,
        E: TryFromPrimitive<Primitive = u16>,
    {
        self.read_enum_at(register, self.block_address())
    }

    pub fn read_enum_at<R, E>(&self, register: R, base: u32) -> Reading<E>
    where
        R: RegisterMap,
        E: TryFromPrimitive<Primitive = u16>,
    {
        let Some(code) = self.read_u16_at(register, base)? else {
            return Ok(None);
        };
        match E::try_from_primitive(code) {
            Ok(v) => Ok(Some(v)),
            Err(_) => {
                debug!(
                    "Model {} register {register:?} has unknown code {code}",
                    self.model_id.id()
                );
                Ok(None)
            }
        }
    }

    /// Reads a power factor, resolving devices that report whole percentages.
    ///
    /// Once a value outside `[-1, 1]` has been seen the device is flagged in the
    /// store's metadata and every later value is divided by 100, even values that
    /// would themselves look like decimals.
    pub fn read_power_factor<V: RegisterMap, S: RegisterMap>(
        &self,
        value: V,
        scale_factor: S,
    ) -> Reading<f64> {
        let Some(raw) = self.read_value(value)? else {
            return Ok(None);
        };
        let Some(sf) = self.read_i16(scale_factor)? else {
            return Ok(None);
        };
        let sf = i32::from(sf);
        let pf = scale_value(raw.as_f64(), sf);
        if self.power_factor_is_percent(pf) {
            // shifting the exponent keeps the division exact
            Ok(Some(scale_value(raw.as_f64(), sf - 2)))
        } else {
            Ok(Some(pf))
        }
    }

    /// Applies the percent latch to an already decoded power factor.
    pub fn resolve_power_factor(&self, pf: Option<f64>) -> Option<f64> {
        pf.map(|pf| {
            if self.power_factor_is_percent(pf) {
                pf / POWER_FACTOR_PERCENT_DIVISOR
            } else {
                pf
            }
        })
    }

    fn power_factor_is_percent(&self, pf: f64) -> bool {
        if self.data.metadata_flag(METADATA_INTEGER_PF_PERCENT) {
            return true;
        }
        if pf.abs() > 1.0 {
            debug!(
                "Model {} power factor {pf} outside [-1, 1]; treating device values as percent",
                self.model_id.id()
            );
            self.data
                .set_metadata(METADATA_INTEGER_PF_PERCENT, MetadataValue::Flag(true));
            return true;
        }
        false
    }
}

impl ModelAccessor for BaseModelAccessor<'_> {
    fn model_id(&self) -> ModelId {
        self.model_id
    }

    fn base_address(&self) -> u32 {
        self.base_address
    }

    fn model_length(&self) -> u16 {
        self.model_length
    }

    fn fixed_block_length(&self) -> u16 {
        self.fixed_block_length
    }

    fn repeating_block_instance_length(&self) -> u16 {
        self.repeating_block_instance_length
    }
}

/// Implements [`ModelAccessor`] for a family accessor holding a `base` field.
macro_rules! delegate_model_accessor {
    ($ty:ident) => {
        impl $crate::model::accessor::ModelAccessor for $ty<'_> {
            fn model_id(&self) -> $crate::model::ids::ModelId {
                $crate::model::accessor::ModelAccessor::model_id(&self.base)
            }

            fn base_address(&self) -> u32 {
                $crate::model::accessor::ModelAccessor::base_address(&self.base)
            }

            fn model_length(&self) -> u16 {
                $crate::model::accessor::ModelAccessor::model_length(&self.base)
            }

            fn fixed_block_length(&self) -> u16 {
                $crate::model::accessor::ModelAccessor::fixed_block_length(&self.base)
            }

            fn repeating_block_instance_length(&self) -> u16 {
                $crate::model::accessor::ModelAccessor::repeating_block_instance_length(&self.base)
            }
        }
    };
}

pub(crate) use delegate_model_accessor;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::descriptor::register_map;
    use proptest::prelude::*;

    register_map! {
        enum TestRegister {
            First => (0, UInt16),
            Second => (1, UInt16),
        }
    }

    #[test]
    fn test_block_past_address_space_is_rejected() {
        let data = ModelData::new();
        let result = BaseModelAccessor::new(
            &data,
            ModelId::ThreePhaseInverterInteger,
            u32::MAX - 1,
            50,
            50,
            0,
        );
        assert!(matches!(
            result,
            Err(SunSpecError::OutOfRange { address, count: 52 }) if address == u32::MAX - 1
        ));
    }

    #[test]
    fn test_block_ending_at_last_address() {
        let data = ModelData::with_words(u32::MAX - 3, &[160, 2, 7, 8]);
        let base =
            BaseModelAccessor::new(&data, ModelId::MultipleMppt, u32::MAX - 3, 2, 0, 0).unwrap();
        assert_eq!(base.block_address(), u32::MAX - 1);
        assert_eq!(base.read_u16(TestRegister::First).unwrap(), Some(7));
        assert_eq!(base.read_u16(TestRegister::Second).unwrap(), Some(8));
        assert!(matches!(
            base.read_u16_at(TestRegister::Second, u32::MAX),
            Err(SunSpecError::OutOfRange { address: u32::MAX, count: 1 })
        ));
    }

    #[test]
    fn test_scale_value_exact_decimals() {
        assert_eq!(scale_value(354.0, -2), 3.54);
        assert_eq!(scale_value(-1235.0, 0), -1235.0);
        assert_eq!(scale_value(12.0, 3), 12000.0);
        assert_eq!(scale_value(-7.0, -10), -7e-10);
        assert_eq!(scale_value(28495.0, -1), 2849.5);
    }

    #[test]
    fn test_average_present_ignores_absent() {
        assert_eq!(average_present([Some(200.0), Some(210.0), None]), Some(205.0));
        assert_eq!(average_present([None, None, None]), None);
        assert_eq!(average_present([Some(120.0)]), Some(120.0));
    }

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(to_i32(Some(24767.4)), Some(24767));
        assert_eq!(to_i32(Some(-70.5)), Some(-71));
        assert_eq!(to_i64(Some(17534384.0)), Some(17534384));
        assert_eq!(to_i64(None), None);
    }

    proptest! {
        #[test]
        fn prop_scale_value_positive_exponent(raw in -32767i32..=32767, sf in 0i32..=10) {
            let expected = i64::from(raw) * 10i64.pow(sf as u32);
            prop_assert_eq!(scale_value(f64::from(raw), sf), expected as f64);
        }

        #[test]
        fn prop_scale_value_negative_exponent(raw in -32767i32..=32767, sf in -10i32..0) {
            let decimal: f64 = format!("{raw}e{sf}").parse().unwrap();
            prop_assert_eq!(scale_value(f64::from(raw), sf), decimal);
        }
    }
}
