//! # Register Snapshots
//!
//! A snapshot is a JSON document holding a contiguous run of register words and
//! the placement of the models found in it:
//!
//! ```json
//! {
//!   "start": 40000,
//!   "hex": "0001 0042 ...",
//!   "models": [{ "id": 103, "base": 40069, "length": 50 }]
//! }
//! ```
//!
//! The words may be given either as a `words` array or as a `hex` dump of the
//! big-endian register bytes. [`decode_models`] turns a loaded snapshot into one
//! [`DecodedModel`] report per placement.
//!
//! ## Usage
//!
//! ```rust
//! use sunspec_rs::snapshot::{decode_hex_words, Snapshot};
//!
//! assert_eq!(decode_hex_words("0162 FFFE").unwrap(), vec![0x0162, 0xFFFE]);
//!
//! let snapshot = Snapshot::from_json(r#"{"start": 0, "words": [1, 2], "models": []}"#).unwrap();
//! assert_eq!(snapshot.model_data().unwrap().len(), 2);
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::Level;
use nom::{combinator::all_consuming, multi::many0, number::complete::be_u16, IResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::SunSpecError;
use crate::logging::{log_model, log_warn};
use crate::model::data::fits_address_space;
use crate::model::{
    AcEnergyAccessor, AcPhase, AccessorViews, CommonModelAccessor, InverterAccessor,
    InverterModelAccessor, InverterStatus, IntegerMeterModelAccessor, MeterAccessor, ModelData,
    ModelId, MpptExtensionModelAccessor, NameplateModelAccessor, Reading, SettingsModelAccessor,
};

/// Placement of one model block within a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPlacement {
    pub id: u16,
    /// Address of the model header.
    pub base: u32,
    /// Model length in words, excluding the header.
    pub length: u16,
}

/// A register snapshot as read from disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Address of the first word.
    pub start: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<u16>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
    #[serde(default)]
    pub models: Vec<ModelPlacement>,
}

impl Snapshot {
    pub fn from_json(text: &str) -> Result<Self, SunSpecError> {
        serde_json::from_str(text).map_err(|e| SunSpecError::Snapshot(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SunSpecError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| SunSpecError::Snapshot(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// The register words, from whichever of `words` and `hex` is present.
    pub fn register_words(&self) -> Result<Vec<u16>, SunSpecError> {
        match (&self.words, &self.hex) {
            (Some(words), None) => Ok(words.clone()),
            (None, Some(hex)) => decode_hex_words(hex),
            (Some(_), Some(_)) => Err(SunSpecError::Snapshot(
                "both \"words\" and \"hex\" given".to_string(),
            )),
            (None, None) => Err(SunSpecError::Snapshot(
                "one of \"words\" or \"hex\" is required".to_string(),
            )),
        }
    }

    /// A register store populated with the snapshot's words.
    ///
    /// Fails when the words would run past the last register address.
    pub fn model_data(&self) -> Result<ModelData, SunSpecError> {
        let words = self.register_words()?;
        if !fits_address_space(self.start, words.len()) {
            return Err(SunSpecError::Snapshot(format!(
                "{} word(s) at start {} run past the end of the address space",
                words.len(),
                self.start
            )));
        }
        Ok(ModelData::with_words(self.start, &words))
    }
}

fn parse_words(input: &[u8]) -> IResult<&[u8], Vec<u16>> {
    all_consuming(many0(be_u16))(input)
}

/// Decodes a hex dump of big-endian register bytes into words.
///
/// Whitespace is ignored. The dump must hold a whole number of words.
pub fn decode_hex_words(text: &str) -> Result<Vec<u16>, SunSpecError> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.len() % 4 != 0 {
        return Err(SunSpecError::InvalidHexString);
    }
    let bytes = hex::decode(&cleaned).map_err(|_| SunSpecError::InvalidHexString)?;
    let (_, words) = parse_words(&bytes).map_err(|_| SunSpecError::InvalidHexString)?;
    Ok(words)
}

/// Options applied while decoding a snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Report inverters and meters through the sign-reversal view.
    pub reversed: bool,
    /// Also report the individual phases of inverters and meters.
    pub phases: bool,
}

/// Decoded values of one model block.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DecodedModel {
    pub id: u16,
    pub description: String,
    pub base: u32,
    pub length: u16,
    pub values: BTreeMap<String, Value>,
}

fn put<T: Serialize>(
    values: &mut BTreeMap<String, Value>,
    key: &str,
    reading: Reading<T>,
) -> Result<(), SunSpecError> {
    if let Some(v) = reading? {
        values.insert(key.to_string(), json!(v));
    }
    Ok(())
}

fn ac_values<A: AcEnergyAccessor>(
    ac: &A,
    values: &mut BTreeMap<String, Value>,
) -> Result<(), SunSpecError> {
    put(values, "frequency", ac.frequency())?;
    put(values, "current", ac.current())?;
    put(values, "voltage", ac.voltage())?;
    put(values, "lineVoltage", ac.line_voltage())?;
    put(values, "powerFactor", ac.power_factor())?;
    put(values, "watts", ac.active_power())?;
    put(values, "voltAmps", ac.apparent_power())?;
    put(values, "voltAmpsReactive", ac.reactive_power())?;
    put(values, "wattHours", ac.active_energy_delivered())?;
    put(values, "wattHoursReverse", ac.active_energy_received())?;
    put(values, "voltAmpHours", ac.apparent_energy_delivered())?;
    put(values, "voltAmpHoursReverse", ac.apparent_energy_received())?;
    put(values, "voltAmpReactiveHours", ac.reactive_energy_delivered())?;
    put(values, "voltAmpReactiveHoursReverse", ac.reactive_energy_received())?;
    Ok(())
}

fn phase_values<A: AcEnergyAccessor + AccessorViews>(
    ac: &A,
    values: &mut BTreeMap<String, Value>,
) -> Result<(), SunSpecError> {
    for phase in AcPhase::PHASES {
        let view = ac.accessor_for_phase(phase);
        let mut phase_values = BTreeMap::new();
        ac_values(&view, &mut phase_values)?;
        for (key, value) in phase_values {
            if key != "frequency" {
                values.insert(format!("{key}_{}", phase.key()), value);
            }
        }
    }
    Ok(())
}

fn inverter_values<A: InverterAccessor + AccessorViews>(
    inverter: &A,
    options: DecodeOptions,
    values: &mut BTreeMap<String, Value>,
) -> Result<(), SunSpecError> {
    ac_values(inverter, values)?;
    if options.phases {
        phase_values(inverter, values)?;
    }
    put(values, "dcCurrent", inverter.dc_current())?;
    put(values, "dcVoltage", inverter.dc_voltage())?;
    put(values, "dcPower", inverter.dc_power())?;
    put(values, "temp", inverter.cabinet_temperature())?;
    put(values, "temp_heatSink", inverter.heat_sink_temperature())?;
    put(values, "temp_transformer", inverter.transformer_temperature())?;
    put(values, "temp_other", inverter.other_temperature())?;
    let status = InverterStatus::read(inverter)?;
    if let Some(message) = status.message() {
        values.insert("status".to_string(), json!(message));
    }
    values.insert("operatingState".to_string(), json!(status.operating_state));
    values.insert("vendorEvents".to_string(), json!(inverter.vendor_events()?.to_string()));
    Ok(())
}

fn meter_values<A: MeterAccessor + AccessorViews>(
    meter: &A,
    options: DecodeOptions,
    values: &mut BTreeMap<String, Value>,
) -> Result<(), SunSpecError> {
    ac_values(meter, values)?;
    if options.phases {
        phase_values(meter, values)?;
    }
    put(values, "wattHoursImported", meter.active_energy_imported())?;
    put(values, "wattHoursExported", meter.active_energy_exported())?;
    put(values, "voltAmpHoursImported", meter.apparent_energy_imported())?;
    put(values, "voltAmpHoursExported", meter.apparent_energy_exported())?;
    put(values, "voltAmpReactiveHoursImported", meter.reactive_energy_imported())?;
    put(values, "voltAmpReactiveHoursExported", meter.reactive_energy_exported())?;
    values.insert(
        "events".to_string(),
        json!(meter.meter_events()?.descriptions()),
    );
    Ok(())
}

fn decode_model(
    data: &ModelData,
    placement: &ModelPlacement,
    options: DecodeOptions,
) -> Result<BTreeMap<String, Value>, SunSpecError> {
    let ModelPlacement { id, base, length } = *placement;
    let mut values = BTreeMap::new();
    match ModelId::from_id(id)? {
        ModelId::Common => {
            let common = CommonModelAccessor::new(data, id, base, length)?;
            for (key, value) in common.device_info()? {
                values.insert(key, json!(value));
            }
        }
        ModelId::SinglePhaseInverterInteger
        | ModelId::SplitPhaseInverterInteger
        | ModelId::ThreePhaseInverterInteger
        | ModelId::SinglePhaseInverterFloat
        | ModelId::SplitPhaseInverterFloat
        | ModelId::ThreePhaseInverterFloat => {
            let inverter = InverterModelAccessor::new(data, id, base, length)?;
            if options.reversed {
                inverter_values(&inverter.reversed(), options, &mut values)?;
            } else {
                inverter_values(&inverter, options, &mut values)?;
            }
        }
        ModelId::SinglePhaseMeterInteger
        | ModelId::SplitPhaseMeterInteger
        | ModelId::WyeThreePhaseMeterInteger
        | ModelId::DeltaThreePhaseMeterInteger => {
            let meter = IntegerMeterModelAccessor::new(data, id, base, length)?;
            if options.reversed {
                meter_values(&meter.reversed(), options, &mut values)?;
            } else {
                meter_values(&meter, options, &mut values)?;
            }
        }
        ModelId::Nameplate => {
            let nameplate = NameplateModelAccessor::new(data, id, base, length)?;
            for (key, value) in nameplate.device_info()? {
                values.insert(key, json!(value));
            }
        }
        ModelId::BasicSettings => {
            let settings = SettingsModelAccessor::new(data, id, base, length)?;
            put(&mut values, "activePowerMaximum", settings.active_power_maximum())?;
            put(&mut values, "apparentPowerMaximum", settings.apparent_power_maximum())?;
            put(&mut values, "voltageReference", settings.voltage_reference())?;
            put(&mut values, "voltageMaximum", settings.voltage_maximum())?;
            put(&mut values, "voltageMinimum", settings.voltage_minimum())?;
            put(&mut values, "nominalFrequency", settings.nominal_frequency())?;
            put(&mut values, "connectedPhase", settings.connected_phase())?;
        }
        ModelId::MultipleMppt => {
            let mppt = MpptExtensionModelAccessor::new(data, id, base, length)?;
            values.insert("moduleCount".to_string(), json!(mppt.module_count()?));
            let mut modules = Vec::new();
            for module in mppt.dc_modules()? {
                let mut m = BTreeMap::new();
                put(&mut m, "id", module.input_id())?;
                m.insert("name".to_string(), json!(module.input_name()?));
                put(&mut m, "dcCurrent", module.dc_current())?;
                put(&mut m, "dcVoltage", module.dc_voltage())?;
                put(&mut m, "dcPower", module.dc_power())?;
                put(&mut m, "wattHours", module.dc_energy())?;
                put(&mut m, "timestamp", module.timestamp())?;
                put(&mut m, "temp", module.temperature())?;
                put(&mut m, "operatingState", module.operating_state())?;
                modules.push(m);
            }
            values.insert("modules".to_string(), json!(modules));
        }
    }
    Ok(values)
}

/// Decodes every model placed in `snapshot`.
///
/// Placements of models this crate does not decode are skipped with a warning.
pub fn decode_models(
    snapshot: &Snapshot,
    options: DecodeOptions,
) -> Result<Vec<DecodedModel>, SunSpecError> {
    let data = snapshot.model_data()?;
    let mut decoded = Vec::with_capacity(snapshot.models.len());
    for placement in &snapshot.models {
        let model_id = match ModelId::from_id(placement.id) {
            Ok(id) => id,
            Err(e) => {
                log_warn(&format!("Skipping model at {}: {e}", placement.base));
                continue;
            }
        };
        log_model(Level::Debug, model_id, placement.base, "decoding");
        decoded.push(DecodedModel {
            id: placement.id,
            description: model_id.description().to_string(),
            base: placement.base,
            length: placement.length,
            values: decode_model(&data, placement, options)?,
        });
    }
    Ok(decoded)
}
