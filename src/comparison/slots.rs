use super::summary::LapSummary;
use crate::{
    LapDeltaError,
    colors::ColorToken,
    telemetry::{LapInfo, LapSeries},
};

/// Number of driver slots in a comparison
pub const SLOT_COUNT: usize = 3;

/// A lap bound to a driver slot, resolved once when the lap is picked
#[derive(Clone, Debug, PartialEq)]
pub struct BoundLap {
    pub info: LapInfo,
    /// Telemetry as delivered, used for the delta curves
    pub series: LapSeries,
    /// Telemetry with the first lap correction applied, used on the track map
    pub aligned: LapSeries,
    pub summary: LapSummary,
    pub color: Option<ColorToken>,
}

/// Fixed set of driver slots, each optionally holding a lap
#[derive(Clone, Debug, Default)]
pub struct SlotBindings {
    slots: [Option<BoundLap>; SLOT_COUNT],
}

impl SlotBindings {
    pub fn get(&self, slot: usize) -> Option<&BoundLap> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Binds `lap` to `slot`, returning the lap it replaces
    pub fn bind(&mut self, slot: usize, lap: BoundLap) -> Result<Option<BoundLap>, LapDeltaError> {
        Ok(self.slot_mut(slot)?.replace(lap))
    }

    pub fn clear(&mut self, slot: usize) -> Result<Option<BoundLap>, LapDeltaError> {
        Ok(self.slot_mut(slot)?.take())
    }

    /// Bound slots in slot order
    pub fn bound(&self) -> impl Iterator<Item = (usize, &BoundLap)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, lap)| lap.as_ref().map(|lap| (slot, lap)))
    }

    pub fn bound_count(&self) -> usize {
        self.bound().count()
    }

    /// First bound slot, every other lap is compared against it
    pub fn reference(&self) -> Option<(usize, &BoundLap)> {
        self.bound().next()
    }

    fn slot_mut(&mut self, slot: usize) -> Result<&mut Option<BoundLap>, LapDeltaError> {
        self.slots
            .get_mut(slot)
            .ok_or(LapDeltaError::SlotOutOfRange { slot })
    }
}
