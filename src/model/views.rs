//! # Accessor Views
//!
//! Decorators over a model accessor:
//!
//! - [`PhaseView`] narrows the AC getters to one phase. Quantities a model only
//!   reports as device totals read as absent for an individual phase, while
//!   temperatures, states and events pass through.
//! - [`Reversed`] flips the sign of directional quantities for a device wired
//!   with reversed polarity: active and reactive power, DC current and DC power
//!   are negated, active and apparent energy delivered/received (and a meter's
//!   imported/exported) are swapped. Voltage, current, frequency, power factor,
//!   reactive energy, temperatures, states and events are unchanged.
//!
//! [`AccessorViews::reversed`] on a [`Reversed`] view returns the wrapped
//! accessor instead of wrapping again. Nesting `Reversed::new` directly flips
//! twice.

use crate::error::SunSpecError;
use crate::model::ac::{AcEnergyAccessor, AcPhase};
use crate::model::accessor::{ModelAccessor, Reading};
use crate::model::ids::ModelId;
use crate::model::inverter::InverterAccessor;
use crate::model::meter::MeterAccessor;
use crate::model::state::{InverterEvents, InverterOperatingState, MeterEvents};

/// Constructors for the phase and sign-reversal views.
pub trait AccessorViews: Sized + Clone {
    /// The type returned by [`reversed`](Self::reversed).
    type Reversed;

    /// A view of this accessor narrowed to `phase`.
    fn accessor_for_phase(&self, phase: AcPhase) -> PhaseView<Self> {
        PhaseView::new(self.clone(), phase)
    }

    /// A view of this accessor with directional quantities reversed.
    fn reversed(&self) -> Self::Reversed;
}

/// Implements [`AccessorViews`] for a family accessor with one lifetime parameter.
macro_rules! impl_accessor_views {
    ($ty:ident) => {
        impl<'a> $crate::model::views::AccessorViews for $ty<'a> {
            type Reversed = $crate::model::views::Reversed<$ty<'a>>;

            fn reversed(&self) -> Self::Reversed {
                $crate::model::views::Reversed::new(self.clone())
            }
        }
    };
}

pub(crate) use impl_accessor_views;

fn negate_f32(reading: Reading<f32>) -> Reading<f32> {
    Ok(reading?.map(|v| -v))
}

fn negate_i32(reading: Reading<i32>) -> Reading<i32> {
    Ok(reading?.map(i32::saturating_neg))
}

/// An accessor narrowed to a single AC phase.
///
/// Asking the view for [`AcPhase::Total`] reads its own phase; asking for an
/// explicit phase reads that phase from the wrapped accessor.
#[derive(Clone, Debug)]
pub struct PhaseView<A> {
    inner: A,
    phase: AcPhase,
}

impl<A> PhaseView<A> {
    pub fn new(inner: A, phase: AcPhase) -> Self {
        Self { inner, phase }
    }

    pub fn phase(&self) -> AcPhase {
        self.phase
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn into_inner(self) -> A {
        self.inner
    }

    fn narrow(&self, phase: AcPhase) -> AcPhase {
        match phase {
            AcPhase::Total => self.phase,
            p => p,
        }
    }
}

impl<A: Clone> AccessorViews for PhaseView<A> {
    type Reversed = Reversed<PhaseView<A>>;

    fn reversed(&self) -> Self::Reversed {
        Reversed::new(self.clone())
    }
}

impl<A: ModelAccessor> ModelAccessor for PhaseView<A> {
    fn model_id(&self) -> ModelId {
        self.inner.model_id()
    }

    fn base_address(&self) -> u32 {
        self.inner.base_address()
    }

    fn model_length(&self) -> u16 {
        self.inner.model_length()
    }

    fn fixed_block_length(&self) -> u16 {
        self.inner.fixed_block_length()
    }

    fn repeating_block_instance_length(&self) -> u16 {
        self.inner.repeating_block_instance_length()
    }
}

impl<A: AcEnergyAccessor> AcEnergyAccessor for PhaseView<A> {
    fn frequency(&self) -> Reading<f32> {
        self.inner.frequency()
    }

    fn neutral_current(&self) -> Reading<f32> {
        self.inner.neutral_current()
    }

    fn current_for(&self, phase: AcPhase) -> Reading<f32> {
        self.inner.current_for(self.narrow(phase))
    }

    fn voltage_for(&self, phase: AcPhase) -> Reading<f32> {
        self.inner.voltage_for(self.narrow(phase))
    }

    fn line_voltage_for(&self, phase: AcPhase) -> Reading<f32> {
        self.inner.line_voltage_for(self.narrow(phase))
    }

    fn power_factor_for(&self, phase: AcPhase) -> Reading<f32> {
        self.inner.power_factor_for(self.narrow(phase))
    }

    fn active_power_for(&self, phase: AcPhase) -> Reading<i32> {
        self.inner.active_power_for(self.narrow(phase))
    }

    fn apparent_power_for(&self, phase: AcPhase) -> Reading<i32> {
        self.inner.apparent_power_for(self.narrow(phase))
    }

    fn reactive_power_for(&self, phase: AcPhase) -> Reading<i32> {
        self.inner.reactive_power_for(self.narrow(phase))
    }

    fn active_energy_delivered_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.active_energy_delivered_for(self.narrow(phase))
    }

    fn active_energy_received_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.active_energy_received_for(self.narrow(phase))
    }

    fn apparent_energy_delivered_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.apparent_energy_delivered_for(self.narrow(phase))
    }

    fn apparent_energy_received_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.apparent_energy_received_for(self.narrow(phase))
    }

    fn reactive_energy_delivered_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.reactive_energy_delivered_for(self.narrow(phase))
    }

    fn reactive_energy_received_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.reactive_energy_received_for(self.narrow(phase))
    }
}

impl<A: InverterAccessor> InverterAccessor for PhaseView<A> {
    fn dc_current(&self) -> Reading<f32> {
        match self.phase {
            AcPhase::Total => self.inner.dc_current(),
            _ => Ok(None),
        }
    }

    fn dc_voltage(&self) -> Reading<f32> {
        match self.phase {
            AcPhase::Total => self.inner.dc_voltage(),
            _ => Ok(None),
        }
    }

    fn dc_power(&self) -> Reading<i32> {
        match self.phase {
            AcPhase::Total => self.inner.dc_power(),
            _ => Ok(None),
        }
    }

    fn cabinet_temperature(&self) -> Reading<f32> {
        self.inner.cabinet_temperature()
    }

    fn heat_sink_temperature(&self) -> Reading<f32> {
        self.inner.heat_sink_temperature()
    }

    fn transformer_temperature(&self) -> Reading<f32> {
        self.inner.transformer_temperature()
    }

    fn other_temperature(&self) -> Reading<f32> {
        self.inner.other_temperature()
    }

    fn operating_state(&self) -> Reading<InverterOperatingState> {
        self.inner.operating_state()
    }

    fn vendor_operating_state(&self) -> Reading<u16> {
        self.inner.vendor_operating_state()
    }

    fn events(&self) -> Result<InverterEvents, SunSpecError> {
        self.inner.events()
    }

    fn vendor_events(&self) -> Result<u128, SunSpecError> {
        self.inner.vendor_events()
    }
}

impl<A: MeterAccessor> MeterAccessor for PhaseView<A> {
    fn active_energy_imported_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.active_energy_imported_for(self.narrow(phase))
    }

    fn active_energy_exported_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.active_energy_exported_for(self.narrow(phase))
    }

    fn apparent_energy_imported_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.apparent_energy_imported_for(self.narrow(phase))
    }

    fn apparent_energy_exported_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.apparent_energy_exported_for(self.narrow(phase))
    }

    fn reactive_energy_imported_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.reactive_energy_imported_for(self.narrow(phase))
    }

    fn reactive_energy_exported_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.reactive_energy_exported_for(self.narrow(phase))
    }

    fn meter_events(&self) -> Result<MeterEvents, SunSpecError> {
        self.inner.meter_events()
    }
}

/// An accessor with directional quantities reversed.
#[derive(Clone, Debug)]
pub struct Reversed<A> {
    inner: A,
}

impl<A> Reversed<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn into_inner(self) -> A {
        self.inner
    }
}

impl<A: Clone> AccessorViews for Reversed<A> {
    type Reversed = A;

    fn reversed(&self) -> A {
        self.inner.clone()
    }
}

impl<A: ModelAccessor> ModelAccessor for Reversed<A> {
    fn model_id(&self) -> ModelId {
        self.inner.model_id()
    }

    fn base_address(&self) -> u32 {
        self.inner.base_address()
    }

    fn model_length(&self) -> u16 {
        self.inner.model_length()
    }

    fn fixed_block_length(&self) -> u16 {
        self.inner.fixed_block_length()
    }

    fn repeating_block_instance_length(&self) -> u16 {
        self.inner.repeating_block_instance_length()
    }
}

impl<A: AcEnergyAccessor> AcEnergyAccessor for Reversed<A> {
    fn frequency(&self) -> Reading<f32> {
        self.inner.frequency()
    }

    fn neutral_current(&self) -> Reading<f32> {
        self.inner.neutral_current()
    }

    fn current_for(&self, phase: AcPhase) -> Reading<f32> {
        self.inner.current_for(phase)
    }

    fn voltage_for(&self, phase: AcPhase) -> Reading<f32> {
        self.inner.voltage_for(phase)
    }

    fn line_voltage_for(&self, phase: AcPhase) -> Reading<f32> {
        self.inner.line_voltage_for(phase)
    }

    fn power_factor_for(&self, phase: AcPhase) -> Reading<f32> {
        self.inner.power_factor_for(phase)
    }

    fn active_power_for(&self, phase: AcPhase) -> Reading<i32> {
        negate_i32(self.inner.active_power_for(phase))
    }

    fn apparent_power_for(&self, phase: AcPhase) -> Reading<i32> {
        self.inner.apparent_power_for(phase)
    }

    fn reactive_power_for(&self, phase: AcPhase) -> Reading<i32> {
        negate_i32(self.inner.reactive_power_for(phase))
    }

    fn active_energy_delivered_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.active_energy_received_for(phase)
    }

    fn active_energy_received_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.active_energy_delivered_for(phase)
    }

    fn apparent_energy_delivered_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.apparent_energy_received_for(phase)
    }

    fn apparent_energy_received_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.apparent_energy_delivered_for(phase)
    }

    fn reactive_energy_delivered_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.reactive_energy_delivered_for(phase)
    }

    fn reactive_energy_received_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.reactive_energy_received_for(phase)
    }
}

impl<A: InverterAccessor> InverterAccessor for Reversed<A> {
    fn dc_current(&self) -> Reading<f32> {
        negate_f32(self.inner.dc_current())
    }

    fn dc_voltage(&self) -> Reading<f32> {
        self.inner.dc_voltage()
    }

    fn dc_power(&self) -> Reading<i32> {
        negate_i32(self.inner.dc_power())
    }

    fn cabinet_temperature(&self) -> Reading<f32> {
        self.inner.cabinet_temperature()
    }

    fn heat_sink_temperature(&self) -> Reading<f32> {
        self.inner.heat_sink_temperature()
    }

    fn transformer_temperature(&self) -> Reading<f32> {
        self.inner.transformer_temperature()
    }

    fn other_temperature(&self) -> Reading<f32> {
        self.inner.other_temperature()
    }

    fn operating_state(&self) -> Reading<InverterOperatingState> {
        self.inner.operating_state()
    }

    fn vendor_operating_state(&self) -> Reading<u16> {
        self.inner.vendor_operating_state()
    }

    fn events(&self) -> Result<InverterEvents, SunSpecError> {
        self.inner.events()
    }

    fn vendor_events(&self) -> Result<u128, SunSpecError> {
        self.inner.vendor_events()
    }
}

impl<A: MeterAccessor> MeterAccessor for Reversed<A> {
    fn active_energy_imported_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.active_energy_exported_for(phase)
    }

    fn active_energy_exported_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.active_energy_imported_for(phase)
    }

    fn apparent_energy_imported_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.apparent_energy_exported_for(phase)
    }

    fn apparent_energy_exported_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.apparent_energy_imported_for(phase)
    }

    fn reactive_energy_imported_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.reactive_energy_imported_for(phase)
    }

    fn reactive_energy_exported_for(&self, phase: AcPhase) -> Reading<i64> {
        self.inner.reactive_energy_exported_for(phase)
    }

    fn meter_events(&self) -> Result<MeterEvents, SunSpecError> {
        self.inner.meter_events()
    }
}
