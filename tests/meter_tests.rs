//! Integration tests for the integer meter accessor and its views.

use sunspec_rs::model::{
    AcEnergyAccessor, AcPhase, AccessorViews, IntegerMeterModelAccessor, MeterAccessor,
    MeterEvents, ModelAccessor, ModelData, ModelId, Reversed,
};

const BASE: u32 = 69;
const BLOCK: usize = 2;

fn sf(v: i16) -> u16 {
    v as u16
}

fn put_u32(words: &mut [u16], offset: usize, value: u32) {
    words[BLOCK + offset] = (value >> 16) as u16;
    words[BLOCK + offset + 1] = value as u16;
}

/// Register words of a wye meter with two loaded phases (header included).
fn wye_meter_words() -> Vec<u16> {
    let mut w = vec![0u16; 107];
    w[0] = 203;
    w[1] = 105;
    {
        let b = &mut w[BLOCK..];
        // current
        b[0] = 5348;
        b[1] = 2681;
        b[2] = 2667;
        b[3] = 0;
        b[4] = sf(-2);
        // voltage
        b[5] = 820;
        b[6] = 1230;
        b[7] = 1229;
        b[8] = 2;
        b[9] = 1639;
        b[10] = 2459;
        b[11] = 1228;
        b[12] = 1230;
        b[13] = sf(-1);
        // frequency
        b[14] = 6001;
        b[15] = sf(-2);
        // power
        b[16] = 654;
        b[17] = 328;
        b[18] = 326;
        b[19] = 0;
        b[20] = 1;
        b[21] = 659;
        b[22] = 330;
        b[23] = 328;
        b[24] = 0;
        b[25] = 1;
        b[26] = sf(-79);
        b[27] = sf(-39);
        b[28] = sf(-39);
        b[29] = 0;
        b[30] = 1;
        // power factor
        b[31] = 9925;
        b[32] = 9930;
        b[33] = 9930;
        b[34] = 10000;
        b[35] = sf(-4);
        b[52] = 1;
        b[69] = 1;
        b[102] = 1;
        // events: under voltage
        b[104] = 0x0008;
    }
    put_u32(&mut w, 36, 0);
    put_u32(&mut w, 38, 2);
    put_u32(&mut w, 40, 0xFFFF_FFFF);
    put_u32(&mut w, 44, 90663);
    put_u32(&mut w, 46, 45456);
    put_u32(&mut w, 48, 125);
    put_u32(&mut w, 53, 22);
    put_u32(&mut w, 55, 24);
    put_u32(&mut w, 57, 16);
    put_u32(&mut w, 61, 98693);
    put_u32(&mut w, 70, 0x36D2);
    put_u32(&mut w, 72, 0x1BDD);
    put_u32(&mut w, 74, 0xFFFF_FFFF);
    put_u32(&mut w, 78, 0x28);
    put_u32(&mut w, 80, 0x18);
    put_u32(&mut w, 82, 0xFFFF_FFFF);
    put_u32(&mut w, 86, 0xFFFF_FFFF);
    put_u32(&mut w, 88, 0);
    put_u32(&mut w, 94, 0x1D63);
    put_u32(&mut w, 96, 0x0E49);
    w
}

fn meter(data: &ModelData) -> IntegerMeterModelAccessor<'_> {
    IntegerMeterModelAccessor::new(data, 203, BASE, 105).unwrap()
}

/// Tests the block geometry of a wye meter.
#[test]
fn test_block_geometry() {
    let data = ModelData::with_words(BASE, &wye_meter_words());
    let meter = meter(&data);
    assert_eq!(meter.model_id(), ModelId::WyeThreePhaseMeterInteger);
    assert_eq!(meter.block_address(), 71);
    assert_eq!(meter.fixed_block_length(), 105);
    assert_eq!(meter.repeating_block_instance_count(), 0);
}

/// Tests current, voltage and frequency, totals and phases.
#[test]
fn test_current_voltage_frequency() {
    let data = ModelData::with_words(BASE, &wye_meter_words());
    let meter = meter(&data);

    assert_eq!(meter.current().unwrap(), Some(53.48));
    assert_eq!(meter.accessor_for_phase(AcPhase::PhaseA).current().unwrap(), Some(26.81));
    assert_eq!(meter.accessor_for_phase(AcPhase::PhaseB).current().unwrap(), Some(26.67));
    assert_eq!(meter.accessor_for_phase(AcPhase::PhaseC).current().unwrap(), Some(0.0));

    assert_eq!(meter.voltage().unwrap(), Some(82.0));
    assert_eq!(meter.voltage_for(AcPhase::PhaseA).unwrap(), Some(123.0));
    assert_eq!(meter.voltage_for(AcPhase::PhaseB).unwrap(), Some(122.9));
    assert_eq!(meter.voltage_for(AcPhase::PhaseC).unwrap(), Some(0.2));
    assert_eq!(meter.line_voltage().unwrap(), Some(163.9));
    assert_eq!(meter.line_voltage_for(AcPhase::PhaseA).unwrap(), Some(245.9));

    assert_eq!(meter.frequency().unwrap(), Some(60.01));
    assert_eq!(meter.neutral_current().unwrap(), None);
}

/// Tests power and power factor, which meters report per phase.
#[test]
fn test_power_and_power_factor() {
    let data = ModelData::with_words(BASE, &wye_meter_words());
    let meter = meter(&data);
    let phase_a = meter.accessor_for_phase(AcPhase::PhaseA);

    assert_eq!(meter.active_power().unwrap(), Some(6540));
    assert_eq!(phase_a.active_power().unwrap(), Some(3280));
    assert_eq!(meter.apparent_power().unwrap(), Some(6590));
    assert_eq!(phase_a.apparent_power().unwrap(), Some(3300));
    assert_eq!(meter.reactive_power().unwrap(), Some(-790));
    assert_eq!(phase_a.reactive_power().unwrap(), Some(-390));

    assert_eq!(meter.power_factor().unwrap(), Some(0.9925));
    assert_eq!(phase_a.power_factor().unwrap(), Some(0.993));
    assert_eq!(
        meter.accessor_for_phase(AcPhase::PhaseC).power_factor().unwrap(),
        Some(1.0)
    );
}

/// Tests that meter power factor values above one are not treated as percent.
#[test]
fn test_meter_power_factor_is_not_latched() {
    let mut words = wye_meter_words();
    words[BLOCK + 31] = 95;
    words[BLOCK + 35] = 0;
    let data = ModelData::with_words(BASE, &words);
    assert_eq!(meter(&data).power_factor().unwrap(), Some(95.0));
    assert!(data.metadata_snapshot().is_empty());
}

/// Tests imported and exported energy, and their delivered/received aliases.
#[test]
fn test_energy() {
    let data = ModelData::with_words(BASE, &wye_meter_words());
    let meter = meter(&data);
    let phase_a = meter.accessor_for_phase(AcPhase::PhaseA);
    let phase_b = meter.accessor_for_phase(AcPhase::PhaseB);

    assert_eq!(meter.active_energy_imported().unwrap(), Some(906_630));
    assert_eq!(phase_a.active_energy_imported().unwrap(), Some(454_560));
    assert_eq!(phase_b.active_energy_imported().unwrap(), Some(1250));
    assert_eq!(meter.active_energy_exported().unwrap(), Some(0));
    assert_eq!(phase_a.active_energy_exported().unwrap(), Some(20));
    assert_eq!(phase_b.active_energy_exported().unwrap(), None);

    assert_eq!(meter.apparent_energy_exported().unwrap(), Some(220));
    assert_eq!(phase_a.apparent_energy_exported().unwrap(), Some(240));
    assert_eq!(meter.apparent_energy_imported().unwrap(), Some(986_930));

    assert_eq!(meter.active_energy_delivered().unwrap(), Some(906_630));
    assert_eq!(meter.active_energy_received().unwrap(), Some(0));
    assert_eq!(meter.apparent_energy_delivered().unwrap(), Some(986_930));
}

/// Tests reactive energy quadrant sums.
#[test]
fn test_reactive_energy_quadrants() {
    let data = ModelData::with_words(BASE, &wye_meter_words());
    let meter = meter(&data);

    assert_eq!(
        meter.reactive_energy_imported().unwrap(),
        Some((0x36D2 + 0x28) * 10)
    );
    assert_eq!(
        meter.reactive_energy_imported_for(AcPhase::PhaseA).unwrap(),
        Some((0x1BDD + 0x18) * 10)
    );
    // both quadrants absent
    assert_eq!(meter.reactive_energy_imported_for(AcPhase::PhaseB).unwrap(), None);
    // Q3 absent, Q4 present
    assert_eq!(meter.reactive_energy_exported().unwrap(), Some(0x1D63 * 10));
    assert_eq!(
        meter.reactive_energy_exported_for(AcPhase::PhaseA).unwrap(),
        Some(0x0E49 * 10)
    );
    assert_eq!(meter.reactive_energy_delivered().unwrap(), Some((0x36D2 + 0x28) * 10));
}

/// Tests the meter event bitfield.
#[test]
fn test_meter_events() {
    let data = ModelData::with_words(BASE, &wye_meter_words());
    let events = meter(&data).meter_events().unwrap();
    assert_eq!(events, MeterEvents::UNDER_VOLTAGE);
    assert_eq!(events.descriptions(), vec!["Voltage below threshold"]);
}

/// Tests that the reversed view negates power and swaps imported/exported energy.
#[test]
fn test_reversed_meter() {
    let mut words = wye_meter_words();
    put_u32(&mut words, 36, 5);
    put_u32(&mut words, 44, 100);
    words[BLOCK + 52] = 0;
    let data = ModelData::with_words(BASE, &words);
    let meter = meter(&data);
    let reversed = meter.reversed();

    assert_eq!(reversed.active_power().unwrap(), Some(-6540));
    assert_eq!(reversed.reactive_power().unwrap(), Some(790));
    assert_eq!(reversed.apparent_power().unwrap(), Some(6590));
    assert_eq!(reversed.active_energy_delivered().unwrap(), Some(5));
    assert_eq!(reversed.active_energy_received().unwrap(), Some(100));
    assert_eq!(reversed.active_energy_imported().unwrap(), Some(5));
    assert_eq!(reversed.active_energy_exported().unwrap(), Some(100));
    assert_eq!(reversed.apparent_energy_delivered().unwrap(), Some(220));
    assert_eq!(
        reversed.reactive_energy_delivered().unwrap(),
        meter.reactive_energy_delivered().unwrap()
    );
    assert_eq!(reversed.voltage().unwrap(), meter.voltage().unwrap());
    assert_eq!(reversed.frequency().unwrap(), meter.frequency().unwrap());
    assert_eq!(reversed.power_factor().unwrap(), meter.power_factor().unwrap());
    assert_eq!(reversed.meter_events().unwrap(), MeterEvents::UNDER_VOLTAGE);
}

/// Tests that reversing twice through the view API restores the original
/// accessor, while nesting two reversal wrappers flips twice.
#[test]
fn test_double_reversal() {
    let data = ModelData::with_words(BASE, &wye_meter_words());
    let meter = meter(&data);

    let restored = meter.reversed().reversed();
    assert_eq!(restored.active_power().unwrap(), Some(6540));

    let nested = Reversed::new(Reversed::new(meter.clone()));
    assert_eq!(nested.active_power().unwrap(), Some(6540));
    assert_eq!(nested.active_energy_imported().unwrap(), Some(906_630));
}

/// Tests that a phase view of a reversed meter keeps the reversal.
#[test]
fn test_phase_view_of_reversed_meter() {
    let data = ModelData::with_words(BASE, &wye_meter_words());
    let meter = meter(&data);
    let phase_a = meter.reversed().accessor_for_phase(AcPhase::PhaseA);

    assert_eq!(phase_a.active_power().unwrap(), Some(-3280));
    assert_eq!(phase_a.active_energy_received().unwrap(), Some(454_560));
    assert_eq!(phase_a.current().unwrap(), Some(26.81));
}
