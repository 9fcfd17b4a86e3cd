pub mod loader;
pub mod writer;

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::track::CircuitInfo;

pub use loader::{LapProvider, LoadedLap, SessionFile, load_session_jsonl};
pub use writer::write_session;

/// Driver abbreviation as used by the timing feed (e.g. "VER")
pub type DriverId = String;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LapTelemetrySample {
    /// Meters traveled since the start of the lap
    pub distance: f64,
    /// Elapsed time since the start of the lap
    #[serde(with = "duration_secs")]
    pub time_offset: Duration,
    /// Car position on the circuit map
    pub x: f64,
    pub y: f64,
    /// Speed in km/h
    pub speed: f64,
    /// Throttle use. 0=off throttle to 100=full throttle
    pub throttle: f64,
    /// Brake use. 0=released to 1=applied
    pub brake: f64,
    pub rpm: f64,
    pub gear: u8,
    /// Raw DRS state as reported by the timing feed
    pub drs: u8,
}

/// Ordered telemetry for exactly one lap of one driver.
///
/// A series is never mutated in place once built: corrections such as the
/// first lap distance offset produce a new series.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LapSeries {
    pub driver: DriverId,
    pub lap_number: u32,
    pub is_personal_best: bool,
    pub samples: Vec<LapTelemetrySample>,
}

impl LapSeries {
    pub fn new(
        driver: impl Into<DriverId>,
        lap_number: u32,
        samples: Vec<LapTelemetrySample>,
    ) -> Self {
        Self {
            driver: driver.into(),
            lap_number,
            is_personal_best: false,
            samples,
        }
    }

    pub fn with_personal_best(mut self, is_personal_best: bool) -> Self {
        self.is_personal_best = is_personal_best;
        self
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn min_distance(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.distance).reduce(f64::min)
    }

    pub fn max_distance(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.distance).reduce(f64::max)
    }

    /// Copy of this series with every distance moved by `offset` meters
    pub fn with_distance_offset(&self, offset: f64) -> Self {
        let samples = self
            .samples
            .iter()
            .map(|s| LapTelemetrySample {
                distance: s.distance + offset,
                ..s.clone()
            })
            .collect();
        Self {
            samples,
            ..self.clone()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum TyreCompound {
    Soft,
    Medium,
    Hard,
    Intermediate,
    Wet,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for TyreCompound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TyreCompound::Soft => write!(f, "Soft"),
            TyreCompound::Medium => write!(f, "Medium"),
            TyreCompound::Hard => write!(f, "Hard"),
            TyreCompound::Intermediate => write!(f, "Intermediate"),
            TyreCompound::Wet => write!(f, "Wet"),
            TyreCompound::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Timing data for a lap as published by the timing feed. Everything here is
/// passed through for display, the analytics only look at the samples.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LapInfo {
    pub driver: DriverId,
    pub team: String,
    pub lap_number: u32,
    #[serde(with = "option_duration_secs")]
    pub lap_time: Option<Duration>,
    #[serde(with = "sector_durations")]
    pub sector_times: [Option<Duration>; 3],
    pub compound: TyreCompound,
    /// Lap ended in the pit lane
    pub pit_in: bool,
    /// Lap started from the pit lane
    pub pit_out: bool,
    /// Lap time deleted by race control
    pub deleted: bool,
}

impl LapInfo {
    pub fn is_box_lap(&self) -> bool {
        self.pit_in || self.pit_out
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionInfo {
    pub year: i32,
    pub event: String,
    /// Session name as published in the schedule, e.g. "Sprint Shootout"
    pub name: String,
    pub circuit: CircuitInfo,
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self {
            year: 0,
            event: "Unknown".to_string(),
            name: "Race".to_string(),
            circuit: CircuitInfo::default(),
        }
    }
}

/// One line of a session JSON-lines file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SessionRecord {
    SessionChange(SessionInfo),
    LapStart(LapInfo),
    DataPoint(LapTelemetrySample),
}

// Durations are stored as fractional seconds, which is how timing feeds publish them.
pub(crate) mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

pub(crate) mod option_duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.map(|d| d.as_secs_f64()).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<f64>::deserialize(deserializer)?
            .map(|secs| Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom))
            .transpose()
    }
}

pub(crate) mod sector_durations {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &[Option<Duration>; 3],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value
            .map(|sector| sector.map(|d| d.as_secs_f64()))
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[Option<Duration>; 3], D::Error> {
        let raw = <[Option<f64>; 3]>::deserialize(deserializer)?;
        let mut sectors = [None; 3];
        for (slot, secs) in sectors.iter_mut().zip(raw) {
            *slot = secs
                .map(Duration::try_from_secs_f64)
                .transpose()
                .map_err(serde::de::Error::custom)?;
        }
        Ok(sectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(distance: f64, secs: f64) -> LapTelemetrySample {
        LapTelemetrySample {
            distance,
            time_offset: Duration::from_secs_f64(secs),
            ..Default::default()
        }
    }

    #[test]
    fn test_distance_offset_builds_new_series() {
        let lap = LapSeries::new("HAM", 1, vec![sample(10., 0.), sample(20., 1.)]);
        let shifted = lap.with_distance_offset(5.);

        assert_eq!(shifted.min_distance(), Some(15.));
        assert_eq!(shifted.max_distance(), Some(25.));
        assert_eq!(lap.min_distance(), Some(10.));
        assert_eq!(shifted.samples[1].time_offset, Duration::from_secs(1));
    }

    #[test]
    fn test_lap_info_deserializes_fractional_seconds() {
        let json = r#"{"driver":"LEC","team":"Ferrari","lap_number":7,"lap_time":90.123,"sector_times":[28.5,null,31.0],"compound":"SOFT"}"#;
        let info: LapInfo = serde_json::from_str(json).unwrap();

        assert!((info.lap_time.unwrap().as_secs_f64() - 90.123).abs() < 1e-6);
        assert!((info.sector_times[0].unwrap().as_secs_f64() - 28.5).abs() < 1e-6);
        assert_eq!(info.sector_times[1], None);
        assert_eq!(info.compound, TyreCompound::Soft);
        assert!(!info.is_box_lap());
    }

    #[test]
    fn test_unknown_compound_falls_back() {
        let info: LapInfo = serde_json::from_str(r#"{"compound":"TEST_UNKNOWN"}"#).unwrap();
        assert_eq!(info.compound, TyreCompound::Unknown);
    }
}
