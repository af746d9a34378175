//! Operating status summary of an inverter.

use serde::Serialize;

use crate::error::SunSpecError;
use crate::model::inverter::InverterAccessor;
use crate::model::state::{InverterEvents, InverterOperatingState};

/// States in which an inverter produces nothing worth recording.
pub const IGNORED_OPERATING_STATES: [InverterOperatingState; 3] = [
    InverterOperatingState::Off,
    InverterOperatingState::Sleeping,
    InverterOperatingState::Standby,
];

/// Operating state and events of an inverter at one poll.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InverterStatus {
    pub operating_state: Option<InverterOperatingState>,
    pub vendor_operating_state: Option<u16>,
    #[serde(serialize_with = "serialize_events")]
    pub events: InverterEvents,
}

impl InverterStatus {
    /// Reads the status registers of `inverter`.
    pub fn read<A: InverterAccessor + ?Sized>(inverter: &A) -> Result<Self, SunSpecError> {
        Ok(Self {
            operating_state: inverter.operating_state()?,
            vendor_operating_state: inverter.vendor_operating_state()?,
            events: inverter.events()?,
        })
    }

    /// True when the inverter is off, sleeping or in standby.
    pub fn is_ignored(&self) -> bool {
        self.operating_state
            .is_some_and(|state| IGNORED_OPERATING_STATES.contains(&state))
    }

    /// Status text: the state description followed by the active event descriptions.
    ///
    /// Returns `None` when neither a state nor any named event is reported.
    pub fn message(&self) -> Option<String> {
        let events = self.events.descriptions().join(", ");
        match (self.operating_state, events.is_empty()) {
            (Some(state), true) => Some(state.description().to_string()),
            (Some(state), false) => Some(format!("{}; {events}", state.description())),
            (None, false) => Some(events),
            (None, true) => None,
        }
    }
}

fn serialize_events<S: serde::Serializer>(
    events: &InverterEvents,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(events.descriptions())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(state: Option<InverterOperatingState>, events: InverterEvents) -> InverterStatus {
        InverterStatus {
            operating_state: state,
            vendor_operating_state: None,
            events,
        }
    }

    #[test]
    fn test_ignored_states() {
        let no_events = InverterEvents::empty();
        assert!(status(Some(InverterOperatingState::Sleeping), no_events).is_ignored());
        assert!(!status(Some(InverterOperatingState::Mppt), no_events).is_ignored());
        assert!(!status(None, no_events).is_ignored());
    }

    #[test]
    fn test_message() {
        let s = status(
            Some(InverterOperatingState::Fault),
            InverterEvents::GROUND_FAULT | InverterEvents::CABINET_OPEN,
        );
        assert_eq!(
            s.message().as_deref(),
            Some("One or more faults exist; Ground fault, Cabinet open")
        );
        assert_eq!(
            status(Some(InverterOperatingState::Mppt), InverterEvents::empty())
                .message()
                .as_deref(),
            Some("Tracking power point")
        );
        assert_eq!(status(None, InverterEvents::empty()).message(), None);
    }
}
