//! Common model (model 1): device identification.

use std::collections::BTreeMap;

use crate::error::SunSpecError;
use crate::model::accessor::{delegate_model_accessor, BaseModelAccessor, ModelAccessor, Reading};
use crate::model::data::ModelData;
use crate::model::descriptor::register_map;
use crate::model::ids::ModelId;

register_map! {
    /// Registers of the common model, relative to the block address.
    pub enum CommonRegister {
        Manufacturer => (0, String(16)),
        Model => (16, String(16)),
        Options => (32, String(8)),
        Version => (40, String(8)),
        SerialNumber => (48, String(16)),
        DeviceAddress => (64, UInt16),
        Pad => (65, UInt16),
    }
}

use CommonRegister as Reg;

/// Accessor for the common model.
#[derive(Clone, Debug)]
pub struct CommonModelAccessor<'a> {
    base: BaseModelAccessor<'a>,
}

delegate_model_accessor!(CommonModelAccessor);

impl<'a> CommonModelAccessor<'a> {
    pub const FIXED_BLOCK_LENGTH: u16 = 66;

    /// Creates the accessor; devices omitting the trailing pad word (length 65)
    /// are accepted.
    pub fn new(
        data: &'a ModelData,
        model_id: u16,
        base_address: u32,
        model_length: u16,
    ) -> Result<Self, SunSpecError> {
        let id = ModelId::from_id(model_id)?;
        if id != ModelId::Common {
            return Err(SunSpecError::UnsupportedModel(model_id));
        }
        let fixed = if model_length == Self::FIXED_BLOCK_LENGTH - 1 {
            model_length
        } else {
            Self::FIXED_BLOCK_LENGTH
        };
        let base = BaseModelAccessor::new(data, id, base_address, model_length, fixed, 0)?;
        Ok(Self { base })
    }

    pub fn manufacturer(&self) -> Result<String, SunSpecError> {
        self.base.read_string(Reg::Manufacturer)
    }

    pub fn model(&self) -> Result<String, SunSpecError> {
        self.base.read_string(Reg::Model)
    }

    pub fn options(&self) -> Result<String, SunSpecError> {
        self.base.read_string(Reg::Options)
    }

    pub fn version(&self) -> Result<String, SunSpecError> {
        self.base.read_string(Reg::Version)
    }

    pub fn serial_number(&self) -> Result<String, SunSpecError> {
        self.base.read_string(Reg::SerialNumber)
    }

    /// Modbus device address.
    pub fn device_address(&self) -> Reading<u16> {
        self.base.read_u16(Reg::DeviceAddress)
    }

    /// Identification keyed `manufacturer`, `model`, `options`, `version`,
    /// `serial` and `address`, omitting empty values.
    pub fn device_info(&self) -> Result<BTreeMap<String, String>, SunSpecError> {
        let mut info = BTreeMap::new();
        let fields = [
            ("manufacturer", self.manufacturer()?),
            ("model", self.model()?),
            ("options", self.options()?),
            ("version", self.version()?),
            ("serial", self.serial_number()?),
        ];
        for (key, value) in fields {
            if !value.is_empty() {
                info.insert(key.to_string(), value);
            }
        }
        if let Some(address) = self.device_address()? {
            info.insert("address".to_string(), address.to_string());
        }
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::descriptor::assert_register_table;

    fn pack(text: &str, words: usize) -> Vec<u16> {
        let mut bytes = text.as_bytes().to_vec();
        bytes.resize(words * 2, 0);
        bytes
            .chunks(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect()
    }

    #[test]
    fn test_register_table_is_contiguous() {
        assert_register_table::<CommonRegister>(CommonModelAccessor::FIXED_BLOCK_LENGTH);
    }

    #[test]
    fn test_device_info() {
        let mut block = Vec::new();
        block.extend(pack("Fronius", 16));
        block.extend(pack("Symo 15.0-3", 16));
        block.extend(pack("", 8));
        block.extend(pack("1.2.3", 8));
        block.extend(pack("SN-0042", 16));
        block.push(1);
        let data = ModelData::with_words(40_002, &block);

        let common = CommonModelAccessor::new(&data, 1, 40_000, 65).unwrap();
        let info = common.device_info().unwrap();
        assert_eq!(info["manufacturer"], "Fronius");
        assert_eq!(info["model"], "Symo 15.0-3");
        assert_eq!(info["version"], "1.2.3");
        assert_eq!(info["serial"], "SN-0042");
        assert_eq!(info["address"], "1");
        assert!(!info.contains_key("options"));
    }

    #[test]
    fn test_short_common_model_rejected() {
        let data = ModelData::new();
        assert!(matches!(
            CommonModelAccessor::new(&data, 1, 40_000, 64),
            Err(SunSpecError::ModelLength { .. })
        ));
    }
}
