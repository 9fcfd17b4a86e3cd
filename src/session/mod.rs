// Session kind handling: which laps can be picked and how they are corrected

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::{LapInfo, LapSeries};

/// Broad session type. Qualifying-like sessions (including sprint
/// qualifying/shootout) are flying lap sessions, everything else behaves
/// like a race.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    Race,
    Qualifying,
}

impl SessionKind {
    pub fn from_session_name(name: &str) -> Self {
        match name.trim() {
            "Qualifying" | "Sprint Qualifying" | "Sprint Shootout" => SessionKind::Qualifying,
            _ => SessionKind::Race,
        }
    }

    /// Whether a lap can be offered for comparison. Qualifying in/out laps are
    /// not representative and are hidden.
    pub fn is_selectable(&self, lap: &LapInfo) -> bool {
        match self {
            SessionKind::Qualifying => !lap.is_box_lap(),
            SessionKind::Race => true,
        }
    }

    /// Race lap 1 starts from the grid, so its sector 1 is not comparable
    pub fn sector1_time(&self, lap: &LapInfo) -> Option<Duration> {
        match self {
            SessionKind::Race if lap.lap_number == 1 => None,
            _ => lap.sector_times[0],
        }
    }

    /// Distance offset to apply to a lap so it lines up with a full flying lap.
    ///
    /// Only race lap 1 needs it: the car starts behind the line, so its
    /// distance is shifted by the difference between `reference_max_distance`
    /// (usually the session's fastest lap) and the lap's own distance covered.
    pub fn first_lap_offset(&self, lap: &LapSeries, reference_max_distance: f64) -> Option<f64> {
        match self {
            SessionKind::Race if lap.lap_number == 1 => {
                lap.max_distance().map(|max| reference_max_distance - max)
            }
            _ => None,
        }
    }

    /// Applies [`SessionKind::first_lap_offset`] if needed
    pub fn align_first_lap(
        &self,
        lap: &LapSeries,
        reference_max_distance: Option<f64>,
    ) -> LapSeries {
        match reference_max_distance.and_then(|reference| self.first_lap_offset(lap, reference)) {
            Some(offset) => lap.with_distance_offset(offset),
            None => lap.clone(),
        }
    }
}

/// Laps offered in the lap picker, in session order
pub fn selectable_laps(kind: SessionKind, laps: &[LapInfo]) -> Vec<&LapInfo> {
    laps.iter().filter(|lap| kind.is_selectable(lap)).collect()
}

/// Fastest valid lap among the selectable ones
pub fn personal_best(kind: SessionKind, laps: &[LapInfo]) -> Option<&LapInfo> {
    selectable_laps(kind, laps)
        .into_iter()
        .filter(|lap| !lap.deleted)
        .filter_map(|lap| lap.lap_time.map(|time| (lap, time)))
        .min_by_key(|(_, time)| *time)
        .map(|(lap, _)| lap)
}
