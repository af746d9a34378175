//! Operating states and event bitmasks reported by SunSpec models.
//!
//! Enumerated registers map onto `#[repr(u16)]` enums; event registers onto
//! `bitflags` types. Event bits without a name here are retained when decoding
//! so that vendor-reserved bits are not silently lost.

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::Serialize;

/// Inverter operating state (`St`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Serialize)]
#[repr(u16)]
pub enum InverterOperatingState {
    Off = 1,
    Sleeping = 2,
    Starting = 3,
    Mppt = 4,
    Throttled = 5,
    ShuttingDown = 6,
    Fault = 7,
    Standby = 8,
}

impl InverterOperatingState {
    pub fn description(self) -> &'static str {
        match self {
            InverterOperatingState::Off => "Off",
            InverterOperatingState::Sleeping => "Sleeping (auto-shutdown)",
            InverterOperatingState::Starting => "Starting up",
            InverterOperatingState::Mppt => "Tracking power point",
            InverterOperatingState::Throttled => "Forced power reduction",
            InverterOperatingState::ShuttingDown => "Shutting down",
            InverterOperatingState::Fault => "One or more faults exist",
            InverterOperatingState::Standby => "Standby",
        }
    }
}

/// DC module operating state (`DCSt`) of the multiple MPPT extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Serialize)]
#[repr(u16)]
pub enum DcModuleOperatingState {
    Off = 1,
    Sleeping = 2,
    Starting = 3,
    Mppt = 4,
    Throttled = 5,
    ShuttingDown = 6,
    Fault = 7,
    Standby = 8,
    Test = 9,
    Reserved = 10,
}

impl DcModuleOperatingState {
    pub fn description(self) -> &'static str {
        match self {
            DcModuleOperatingState::Off => "Off",
            DcModuleOperatingState::Sleeping => "Sleeping",
            DcModuleOperatingState::Starting => "Starting up",
            DcModuleOperatingState::Mppt => "Tracking power point",
            DcModuleOperatingState::Throttled => "Forced power reduction",
            DcModuleOperatingState::ShuttingDown => "Shutting down",
            DcModuleOperatingState::Fault => "One or more faults exist",
            DcModuleOperatingState::Standby => "Standby",
            DcModuleOperatingState::Test => "Test",
            DcModuleOperatingState::Reserved => "Reserved",
        }
    }
}

bitflags! {
    /// Inverter event flags (`Evt1`).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct InverterEvents: u32 {
        const GROUND_FAULT = 1 << 0;
        const DC_OVER_VOLTAGE = 1 << 1;
        const AC_DISCONNECT = 1 << 2;
        const DC_DISCONNECT = 1 << 3;
        const GRID_DISCONNECT = 1 << 4;
        const CABINET_OPEN = 1 << 5;
        const MANUAL_SHUTDOWN = 1 << 6;
        const OVER_TEMPERATURE = 1 << 7;
        const OVER_FREQUENCY = 1 << 8;
        const UNDER_FREQUENCY = 1 << 9;
        const AC_OVER_VOLTAGE = 1 << 10;
        const AC_UNDER_VOLTAGE = 1 << 11;
        const BLOWN_STRING_FUSE = 1 << 12;
        const UNDER_TEMPERATURE = 1 << 13;
        const MEMORY_LOSS = 1 << 14;
        const HW_TEST_FAILURE = 1 << 15;
    }
}

/// Human readable descriptions of the named inverter events.
pub const INVERTER_EVENT_DESCRIPTIONS: &[(InverterEvents, &str)] = &[
    (InverterEvents::GROUND_FAULT, "Ground fault"),
    (InverterEvents::DC_OVER_VOLTAGE, "DC over voltage"),
    (InverterEvents::AC_DISCONNECT, "AC disconnect open"),
    (InverterEvents::DC_DISCONNECT, "DC disconnect open"),
    (InverterEvents::GRID_DISCONNECT, "Grid disconnect"),
    (InverterEvents::CABINET_OPEN, "Cabinet open"),
    (InverterEvents::MANUAL_SHUTDOWN, "Manual shutdown"),
    (InverterEvents::OVER_TEMPERATURE, "Over temperature"),
    (InverterEvents::OVER_FREQUENCY, "Frequency above limit"),
    (InverterEvents::UNDER_FREQUENCY, "Frequency under limit"),
    (InverterEvents::AC_OVER_VOLTAGE, "AC voltage above limit"),
    (InverterEvents::AC_UNDER_VOLTAGE, "AC voltage under limit"),
    (InverterEvents::BLOWN_STRING_FUSE, "Blown string fuse on input"),
    (InverterEvents::UNDER_TEMPERATURE, "Under temperature"),
    (InverterEvents::MEMORY_LOSS, "Generic memory or communication error"),
    (InverterEvents::HW_TEST_FAILURE, "Hardware test failure"),
];

impl InverterEvents {
    /// Descriptions of the set events, in bit order.
    pub fn descriptions(self) -> Vec<&'static str> {
        INVERTER_EVENT_DESCRIPTIONS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, desc)| *desc)
            .collect()
    }
}

bitflags! {
    /// Meter event flags (`Evt`).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MeterEvents: u32 {
        const POWER_FAILURE = 1 << 2;
        const UNDER_VOLTAGE = 1 << 3;
        const LOW_POWER_FACTOR = 1 << 4;
        const OVER_CURRENT = 1 << 5;
        const OVER_VOLTAGE = 1 << 6;
        const MISSING_SENSOR = 1 << 7;
    }
}

/// Human readable descriptions of the named meter events.
pub const METER_EVENT_DESCRIPTIONS: &[(MeterEvents, &str)] = &[
    (MeterEvents::POWER_FAILURE, "Loss of power or phase"),
    (MeterEvents::UNDER_VOLTAGE, "Voltage below threshold"),
    (MeterEvents::LOW_POWER_FACTOR, "Power factor below threshold"),
    (MeterEvents::OVER_CURRENT, "Current input over threshold"),
    (MeterEvents::OVER_VOLTAGE, "Voltage input over threshold"),
    (MeterEvents::MISSING_SENSOR, "Sensor not connected"),
];

impl MeterEvents {
    /// Descriptions of the set events, in bit order.
    pub fn descriptions(self) -> Vec<&'static str> {
        METER_EVENT_DESCRIPTIONS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, desc)| *desc)
            .collect()
    }
}

bitflags! {
    /// DC module event flags (`Evt` and `DCEvt` of the multiple MPPT extension).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DcModuleEvents: u32 {
        const GROUND_FAULT = 1 << 0;
        const INPUT_OVER_VOLTAGE = 1 << 1;
        const DC_DISCONNECT = 1 << 3;
        const CABINET_OPEN = 1 << 5;
        const MANUAL_SHUTDOWN = 1 << 6;
        const OVER_TEMPERATURE = 1 << 7;
        const BLOWN_FUSE = 1 << 12;
        const UNDER_TEMPERATURE = 1 << 13;
        const MEMORY_LOSS = 1 << 14;
        const ARC_DETECTION = 1 << 15;
        const TEST_FAILED = 1 << 19;
        const INPUT_UNDER_VOLTAGE = 1 << 20;
        const INPUT_OVER_CURRENT = 1 << 21;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operating_state_codes() {
        assert_eq!(
            InverterOperatingState::try_from(4u16).unwrap(),
            InverterOperatingState::Mppt
        );
        assert!(InverterOperatingState::try_from(0u16).is_err());
        assert_eq!(u16::from(DcModuleOperatingState::Test), 9);
    }

    #[test]
    fn test_event_descriptions_in_bit_order() {
        let events = InverterEvents::OVER_TEMPERATURE | InverterEvents::GROUND_FAULT;
        assert_eq!(events.descriptions(), vec!["Ground fault", "Over temperature"]);
        assert!(InverterEvents::empty().descriptions().is_empty());
    }

    #[test]
    fn test_unnamed_bits_are_retained() {
        let events = MeterEvents::from_bits_retain(0x0001_0004);
        assert!(events.contains(MeterEvents::POWER_FAILURE));
        assert_eq!(events.bits(), 0x0001_0004);
        assert_eq!(events.descriptions(), vec!["Loss of power or phase"]);
    }
}
