//! AC measurement interface shared by inverter and meter models.

use std::fmt;

use enum_dispatch::enum_dispatch;
use serde::Serialize;

use crate::model::accessor::Reading;

/// An AC phase, or the device as a whole.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AcPhase {
    Total,
    PhaseA,
    PhaseB,
    PhaseC,
}

impl AcPhase {
    /// The three individual phases.
    pub const PHASES: [AcPhase; 3] = [AcPhase::PhaseA, AcPhase::PhaseB, AcPhase::PhaseC];

    /// Short key used when reporting per-phase values, empty for `Total`.
    pub fn key(self) -> &'static str {
        match self {
            AcPhase::Total => "",
            AcPhase::PhaseA => "a",
            AcPhase::PhaseB => "b",
            AcPhase::PhaseC => "c",
        }
    }
}

impl fmt::Display for AcPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AcPhase::Total => "Total",
            AcPhase::PhaseA => "PhaseA",
            AcPhase::PhaseB => "PhaseB",
            AcPhase::PhaseC => "PhaseC",
        };
        f.write_str(name)
    }
}

/// AC electrical measurements.
///
/// The `*_for` methods take the phase to report. For `PhaseA`, `PhaseB` and
/// `PhaseC` line voltage means the AB, BC and CA line respectively. Energies are
/// in Wh/VAh/VARh; "delivered" is energy flowing out of the device towards the
/// grid side being measured.
#[enum_dispatch]
pub trait AcEnergyAccessor {
    /// Line frequency in Hz.
    fn frequency(&self) -> Reading<f32>;

    /// Neutral current in A.
    fn neutral_current(&self) -> Reading<f32>;

    fn current_for(&self, phase: AcPhase) -> Reading<f32>;

    /// Line-to-neutral voltage. For `Total`, the average of the reported phases.
    fn voltage_for(&self, phase: AcPhase) -> Reading<f32>;

    /// Line-to-line voltage. For `Total`, the average of the reported lines.
    fn line_voltage_for(&self, phase: AcPhase) -> Reading<f32>;

    /// Power factor as a decimal in `[-1, 1]`.
    fn power_factor_for(&self, phase: AcPhase) -> Reading<f32>;

    fn active_power_for(&self, phase: AcPhase) -> Reading<i32>;

    fn apparent_power_for(&self, phase: AcPhase) -> Reading<i32>;

    fn reactive_power_for(&self, phase: AcPhase) -> Reading<i32>;

    fn active_energy_delivered_for(&self, phase: AcPhase) -> Reading<i64>;

    fn active_energy_received_for(&self, phase: AcPhase) -> Reading<i64>;

    fn apparent_energy_delivered_for(&self, phase: AcPhase) -> Reading<i64>;

    fn apparent_energy_received_for(&self, phase: AcPhase) -> Reading<i64>;

    fn reactive_energy_delivered_for(&self, phase: AcPhase) -> Reading<i64>;

    fn reactive_energy_received_for(&self, phase: AcPhase) -> Reading<i64>;

    fn current(&self) -> Reading<f32> {
        self.current_for(AcPhase::Total)
    }

    fn voltage(&self) -> Reading<f32> {
        self.voltage_for(AcPhase::Total)
    }

    fn line_voltage(&self) -> Reading<f32> {
        self.line_voltage_for(AcPhase::Total)
    }

    fn power_factor(&self) -> Reading<f32> {
        self.power_factor_for(AcPhase::Total)
    }

    fn active_power(&self) -> Reading<i32> {
        self.active_power_for(AcPhase::Total)
    }

    fn apparent_power(&self) -> Reading<i32> {
        self.apparent_power_for(AcPhase::Total)
    }

    fn reactive_power(&self) -> Reading<i32> {
        self.reactive_power_for(AcPhase::Total)
    }

    fn active_energy_delivered(&self) -> Reading<i64> {
        self.active_energy_delivered_for(AcPhase::Total)
    }

    fn active_energy_received(&self) -> Reading<i64> {
        self.active_energy_received_for(AcPhase::Total)
    }

    fn apparent_energy_delivered(&self) -> Reading<i64> {
        self.apparent_energy_delivered_for(AcPhase::Total)
    }

    fn apparent_energy_received(&self) -> Reading<i64> {
        self.apparent_energy_received_for(AcPhase::Total)
    }

    fn reactive_energy_delivered(&self) -> Reading<i64> {
        self.reactive_energy_delivered_for(AcPhase::Total)
    }

    fn reactive_energy_received(&self) -> Reading<i64> {
        self.reactive_energy_received_for(AcPhase::Total)
    }
}
