//! Integration tests for the integer and floating point inverter accessors.

use sunspec_rs::constants::METADATA_INTEGER_PF_PERCENT;
use sunspec_rs::model::{
    AcEnergyAccessor, AcPhase, AccessorViews, InverterAccessor, InverterEvents,
    InverterModelAccessor, InverterOperatingState, InverterStatus, MetadataValue, ModelAccessor,
    ModelData, ModelId,
};

const BASE: u32 = 69;
const BLOCK: usize = 2;

fn sf(v: i16) -> u16 {
    v as u16
}

/// Register words of a three phase integer inverter (header included).
fn three_phase_words() -> Vec<u16> {
    let mut w = vec![0u16; 52];
    w[0] = 103;
    w[1] = 50;
    let b = &mut w[BLOCK..];
    b[0] = 8689;
    b[1] = 2895;
    b[2] = 2902;
    b[3] = 2892;
    b[4] = sf(-2);
    b[5] = 4986;
    b[6] = 4952;
    b[7] = 4951;
    b[8] = 2849;
    b[9] = 2851;
    b[10] = 2814;
    b[11] = sf(-1);
    b[12] = 24767;
    b[13] = 0;
    b[14] = 5999;
    b[15] = sf(-2);
    b[16] = 24797;
    b[17] = 0;
    b[18] = sf(-1235);
    b[19] = 0;
    b[20] = sf(-9987);
    b[21] = sf(-2);
    b[22] = 0x010B;
    b[23] = 0x8DB0;
    b[24] = 0;
    b[25] = 3120;
    b[26] = sf(-2);
    b[27] = 8058;
    b[28] = sf(-1);
    b[29] = 25144;
    b[30] = 0;
    b[31] = 0x8000;
    b[32] = 5531;
    b[33] = 0x8000;
    b[34] = 0x8000;
    b[35] = sf(-2);
    b[36] = 4;
    b[37] = 0xFFFF;
    w
}

fn float_words(model_id: u16, pairs: &[(usize, f32)]) -> Vec<u16> {
    let mut w = vec![0u16; 62];
    w[0] = model_id;
    w[1] = 60;
    for (offset, value) in pairs {
        let bits = value.to_bits();
        w[BLOCK + offset] = (bits >> 16) as u16;
        w[BLOCK + offset + 1] = bits as u16;
    }
    w
}

/// Tests the block geometry of a three phase integer inverter.
#[test]
fn test_block_geometry() {
    let data = ModelData::with_words(BASE, &three_phase_words());
    let inverter = InverterModelAccessor::new(&data, 103, BASE, 50).unwrap();
    assert!(matches!(inverter, InverterModelAccessor::Integer(_)));
    assert_eq!(inverter.model_id(), ModelId::ThreePhaseInverterInteger);
    assert_eq!(inverter.base_address(), 69);
    assert_eq!(inverter.block_address(), 71);
    assert_eq!(inverter.fixed_block_length(), 50);
    assert_eq!(inverter.repeating_block_instance_length(), 0);
    assert_eq!(inverter.repeating_block_instance_count(), 0);
    assert_eq!(inverter.model_length(), 50);
}

/// Tests current, voltage and frequency of the three phase vector.
#[test]
fn test_current_voltage_frequency() {
    let data = ModelData::with_words(BASE, &three_phase_words());
    let inverter = InverterModelAccessor::new(&data, 103, BASE, 50).unwrap();

    assert_eq!(inverter.current().unwrap(), Some(86.89));
    assert_eq!(inverter.current_for(AcPhase::PhaseA).unwrap(), Some(28.95));
    assert_eq!(inverter.current_for(AcPhase::PhaseB).unwrap(), Some(29.02));
    assert_eq!(inverter.current_for(AcPhase::PhaseC).unwrap(), Some(28.92));

    assert_eq!(inverter.voltage_for(AcPhase::PhaseA).unwrap(), Some(284.9));
    assert_eq!(inverter.voltage_for(AcPhase::PhaseB).unwrap(), Some(285.1));
    assert_eq!(inverter.voltage_for(AcPhase::PhaseC).unwrap(), Some(281.4));
    let average = inverter.voltage().unwrap().unwrap();
    assert!((average - 283.8).abs() < 0.01, "average {average}");

    assert_eq!(inverter.line_voltage_for(AcPhase::PhaseA).unwrap(), Some(498.6));
    assert_eq!(inverter.line_voltage_for(AcPhase::PhaseB).unwrap(), Some(495.2));
    assert_eq!(inverter.line_voltage_for(AcPhase::PhaseC).unwrap(), Some(495.1));

    assert_eq!(inverter.frequency().unwrap(), Some(59.99));
    assert_eq!(inverter.neutral_current().unwrap(), None);
}

/// Tests power, energy, DC and temperature values of the three phase vector.
#[test]
fn test_power_energy_dc() {
    let data = ModelData::with_words(BASE, &three_phase_words());
    let inverter = InverterModelAccessor::new(&data, 103, BASE, 50).unwrap();

    assert_eq!(inverter.active_power().unwrap(), Some(24767));
    assert_eq!(inverter.apparent_power().unwrap(), Some(24797));
    assert_eq!(inverter.reactive_power().unwrap(), Some(-1235));
    assert_eq!(inverter.active_energy_delivered().unwrap(), Some(17_534_384));
    assert_eq!(inverter.active_energy_received().unwrap(), None);
    assert_eq!(inverter.apparent_energy_delivered().unwrap(), None);
    assert_eq!(inverter.reactive_energy_received().unwrap(), None);

    assert_eq!(inverter.dc_current().unwrap(), Some(31.2));
    assert_eq!(inverter.dc_voltage().unwrap(), Some(805.8));
    assert_eq!(inverter.dc_power().unwrap(), Some(25144));

    assert_eq!(inverter.cabinet_temperature().unwrap(), None);
    assert_eq!(inverter.heat_sink_temperature().unwrap(), Some(55.31));
    assert_eq!(inverter.transformer_temperature().unwrap(), None);

    assert_eq!(
        inverter.operating_state().unwrap(),
        Some(InverterOperatingState::Mppt)
    );
    assert_eq!(inverter.vendor_operating_state().unwrap(), None);
    assert_eq!(inverter.events().unwrap(), InverterEvents::empty());
    assert_eq!(inverter.vendor_events().unwrap(), 0);
}

/// Tests that a percent power factor engages the sticky latch.
#[test]
fn test_power_factor_percent_latch() {
    let data = ModelData::with_words(BASE, &three_phase_words());
    let inverter = InverterModelAccessor::new(&data, 103, BASE, 50).unwrap();

    assert!(data.metadata(METADATA_INTEGER_PF_PERCENT).is_none());
    assert_eq!(inverter.power_factor().unwrap(), Some(-0.9987));
    assert_eq!(
        data.metadata(METADATA_INTEGER_PF_PERCENT),
        Some(MetadataValue::Flag(true))
    );
}

/// Tests that a decimal power factor leaves the latch unset.
#[test]
fn test_power_factor_decimal_scale() {
    let mut words = three_phase_words();
    words[BLOCK + 21] = sf(-4);
    let data = ModelData::with_words(BASE, &words);
    let inverter = InverterModelAccessor::new(&data, 103, BASE, 50).unwrap();

    assert_eq!(inverter.power_factor().unwrap(), Some(-0.9987));
    assert!(!data.metadata_flag(METADATA_INTEGER_PF_PERCENT));
}

/// Tests that the latch persists across refreshes of the same store.
#[test]
fn test_power_factor_latch_is_sticky() {
    let pf_address = BASE + 2 + 20;
    let mut data = ModelData::with_words(BASE, &three_phase_words());

    let read = |data: &mut ModelData, raw: i16, scale: i16| {
        data.update_words(pf_address, &[sf(raw), sf(scale)]);
        let inverter = InverterModelAccessor::new(data, 103, BASE, 50).unwrap();
        inverter.power_factor().unwrap()
    };

    assert_eq!(read(&mut data, 85, -2), Some(0.85));
    assert_eq!(read(&mut data, 95, 0), Some(0.95));
    assert_eq!(read(&mut data, 85, -2), Some(0.0085));
}

/// Tests that the float encoding applies the same latch.
#[test]
fn test_float_power_factor_latch() {
    let mut data = ModelData::with_words(BASE, &float_words(113, &[(28, 0.85)]));
    let pf = |data: &ModelData| {
        InverterModelAccessor::new(data, 113, BASE, 60)
            .unwrap()
            .power_factor()
            .unwrap()
    };
    assert_eq!(pf(&data), Some(0.85));

    let bits = 95.0f32.to_bits();
    data.update_words(BASE + 2 + 28, &[(bits >> 16) as u16, bits as u16]);
    assert_eq!(pf(&data), Some(0.95));
}

/// Tests that the integer and float encodings of the same current agree.
#[test]
fn test_integer_and_float_encodings_agree() {
    let mut int_words = vec![0u16; 52];
    int_words[BLOCK] = 354;
    int_words[BLOCK + 4] = sf(-2);
    let int_data = ModelData::with_words(BASE, &int_words);
    let integer = InverterModelAccessor::new(&int_data, 101, BASE, 50).unwrap();

    let mut float_words = vec![0u16; 62];
    float_words[BLOCK] = 0x4062;
    float_words[BLOCK + 1] = 0x8F5C;
    let float_data = ModelData::with_words(BASE, &float_words);
    let float = InverterModelAccessor::new(&float_data, 111, BASE, 60).unwrap();

    assert!(matches!(float, InverterModelAccessor::Float(_)));
    assert_eq!(integer.current().unwrap(), Some(3.54));
    assert_eq!(float.current().unwrap(), integer.current().unwrap());
}

/// Tests that a NaN float register is absent.
#[test]
fn test_float_nan_is_absent() {
    let data = ModelData::with_words(BASE, &float_words(113, &[(20, f32::NAN), (22, 50.0)]));
    let inverter = InverterModelAccessor::new(&data, 113, BASE, 60).unwrap();
    assert_eq!(inverter.active_power().unwrap(), None);
    assert_eq!(inverter.frequency().unwrap(), Some(50.0));
}

/// Tests that the line-to-neutral average skips phases that are not reported.
#[test]
fn test_voltage_average_of_present_phases() {
    let mut words = vec![0u16; 52];
    words[BLOCK + 8] = 200;
    words[BLOCK + 9] = 210;
    words[BLOCK + 10] = 0xFFFF;
    let data = ModelData::with_words(BASE, &words);
    let inverter = InverterModelAccessor::new(&data, 103, BASE, 50).unwrap();
    assert_eq!(inverter.voltage().unwrap(), Some(205.0));
}

/// Tests that a single phase model only reports phase A.
#[test]
fn test_single_phase_model_reports_phase_a() {
    let mut words = vec![0u16; 52];
    words[BLOCK + 1] = 10;
    words[BLOCK + 2] = 20;
    words[BLOCK + 8] = 240;
    words[BLOCK + 9] = 250;
    let data = ModelData::with_words(BASE, &words);
    let inverter = InverterModelAccessor::new(&data, 101, BASE, 50).unwrap();

    assert_eq!(inverter.current_for(AcPhase::PhaseA).unwrap(), Some(10.0));
    assert_eq!(inverter.current_for(AcPhase::PhaseB).unwrap(), None);
    assert_eq!(inverter.voltage().unwrap(), Some(240.0));
}

/// Tests the phase view over an inverter.
#[test]
fn test_phase_view() {
    let data = ModelData::with_words(BASE, &three_phase_words());
    let inverter = InverterModelAccessor::new(&data, 103, BASE, 50).unwrap();
    let phase_b = inverter.accessor_for_phase(AcPhase::PhaseB);

    assert_eq!(phase_b.phase(), AcPhase::PhaseB);
    assert_eq!(phase_b.current().unwrap(), Some(29.02));
    assert_eq!(phase_b.voltage().unwrap(), Some(285.1));
    assert_eq!(phase_b.line_voltage().unwrap(), Some(495.2));
    assert_eq!(phase_b.frequency().unwrap(), Some(59.99));
    assert_eq!(phase_b.power_factor().unwrap(), None);
    assert_eq!(phase_b.active_power().unwrap(), None);
    assert_eq!(phase_b.apparent_power().unwrap(), None);
    assert_eq!(phase_b.reactive_power().unwrap(), None);
    assert_eq!(phase_b.active_energy_delivered().unwrap(), None);
    assert_eq!(phase_b.dc_power().unwrap(), None);
    assert_eq!(phase_b.heat_sink_temperature().unwrap(), Some(55.31));
    assert_eq!(phase_b.block_address(), 71);

    let total = inverter.accessor_for_phase(AcPhase::Total);
    assert_eq!(total.active_power().unwrap(), Some(24767));
    assert_eq!(total.dc_power().unwrap(), Some(25144));
}

/// Tests the sign-reversal view over an inverter.
#[test]
fn test_reversed_view() {
    let mut words = vec![0u16; 52];
    words[BLOCK + 8] = 240;
    words[BLOCK + 12] = 70;
    words[BLOCK + 14] = 50;
    words[BLOCK + 18] = 12;
    words[BLOCK + 20] = sf(-90);
    words[BLOCK + 21] = sf(-2);
    words[BLOCK + 23] = 100;
    words[BLOCK + 25] = 5;
    words[BLOCK + 29] = 120;
    let data = ModelData::with_words(BASE, &words);
    let inverter = InverterModelAccessor::new(&data, 101, BASE, 50).unwrap();
    let reversed = inverter.reversed();

    assert_eq!(reversed.active_power().unwrap(), Some(-70));
    assert_eq!(reversed.reactive_power().unwrap(), Some(-12));
    assert_eq!(reversed.active_energy_delivered().unwrap(), None);
    assert_eq!(reversed.active_energy_received().unwrap(), Some(100));
    assert_eq!(reversed.dc_current().unwrap(), Some(-5.0));
    assert_eq!(reversed.dc_power().unwrap(), Some(-120));
    assert_eq!(reversed.voltage().unwrap(), Some(240.0));
    assert_eq!(reversed.frequency().unwrap(), Some(50.0));
    assert_eq!(reversed.power_factor().unwrap(), Some(-0.9));

    let restored = reversed.reversed();
    assert_eq!(restored.active_power().unwrap(), Some(70));
    assert_eq!(restored.active_energy_delivered().unwrap(), Some(100));
}

/// Tests the inverter status summary.
#[test]
fn test_inverter_status() {
    let mut words = three_phase_words();
    words[BLOCK + 36] = 7;
    words[BLOCK + 39] = 0x0021;
    let data = ModelData::with_words(BASE, &words);
    let inverter = InverterModelAccessor::new(&data, 103, BASE, 50).unwrap();
    let status = InverterStatus::read(&inverter).unwrap();

    assert_eq!(status.operating_state, Some(InverterOperatingState::Fault));
    assert!(!status.is_ignored());
    assert_eq!(
        status.message().as_deref(),
        Some("One or more faults exist; Ground fault, Cabinet open")
    );
}

/// Tests that reading outside the populated store is an error, not absence.
#[test]
fn test_unpopulated_register_is_out_of_range() {
    let data = ModelData::with_words(BASE, &three_phase_words()[..20]);
    let inverter = InverterModelAccessor::new(&data, 103, BASE, 50).unwrap();
    assert!(inverter.current().is_ok());
    assert!(inverter.dc_power().is_err());
}
