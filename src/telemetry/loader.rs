use std::path::Path;

use itertools::Itertools;
use log::{info, warn};

use super::{DriverId, LapInfo, LapSeries, LapTelemetrySample, SessionInfo, SessionRecord};
use crate::{
    LapDeltaError,
    session::{SessionKind, personal_best},
    track::{CircuitGeometryProvider, CircuitInfo},
};

/// A lap resolved by a [`LapProvider`]: its timing data and its telemetry
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedLap {
    pub info: LapInfo,
    pub series: LapSeries,
}

/// Source of session laps for the comparison session
pub trait LapProvider {
    fn session(&self) -> &SessionInfo;

    fn kind(&self) -> SessionKind {
        SessionKind::from_session_name(&self.session().name)
    }

    /// Drivers in order of first appearance
    fn drivers(&self) -> Vec<DriverId>;

    /// Every lap of `driver` in session order
    fn laps_for(&self, driver: &str) -> Vec<&LapInfo>;

    fn load_lap(&self, driver: &str, lap_number: u32) -> Result<LoadedLap, LapDeltaError>;

    /// Fastest valid lap of the whole session
    fn fastest_lap(&self) -> Option<LoadedLap>;
}

#[derive(Clone, Debug, Default)]
struct StoredLap {
    info: LapInfo,
    samples: Vec<LapTelemetrySample>,
}

/// Session laps loaded from a JSON-lines file
#[derive(Clone, Debug, Default)]
pub struct SessionFile {
    info: SessionInfo,
    laps: Vec<StoredLap>,
}

impl SessionFile {
    fn stored_lap(&self, driver: &str, lap_number: u32) -> Option<&StoredLap> {
        self.laps
            .iter()
            .find(|lap| lap.info.driver == driver && lap.info.lap_number == lap_number)
    }

    fn resolve(&self, stored: &StoredLap) -> LoadedLap {
        let driver_laps = self
            .laps
            .iter()
            .filter(|lap| lap.info.driver == stored.info.driver)
            .map(|lap| lap.info.clone())
            .collect_vec();
        let is_personal_best = personal_best(self.kind(), &driver_laps)
            .is_some_and(|best| best.lap_number == stored.info.lap_number);
        LoadedLap {
            info: stored.info.clone(),
            series: LapSeries::new(
                stored.info.driver.clone(),
                stored.info.lap_number,
                stored.samples.clone(),
            )
            .with_personal_best(is_personal_best),
        }
    }
}

impl LapProvider for SessionFile {
    fn session(&self) -> &SessionInfo {
        &self.info
    }

    fn drivers(&self) -> Vec<DriverId> {
        self.laps
            .iter()
            .map(|lap| lap.info.driver.clone())
            .unique()
            .collect()
    }

    fn laps_for(&self, driver: &str) -> Vec<&LapInfo> {
        self.laps
            .iter()
            .filter(|lap| lap.info.driver == driver)
            .map(|lap| &lap.info)
            .collect()
    }

    fn load_lap(&self, driver: &str, lap_number: u32) -> Result<LoadedLap, LapDeltaError> {
        self.stored_lap(driver, lap_number)
            .map(|stored| self.resolve(stored))
            .ok_or_else(|| LapDeltaError::LapNotFound {
                driver: driver.to_string(),
                lap_number,
            })
    }

    fn fastest_lap(&self) -> Option<LoadedLap> {
        let all_laps = self.laps.iter().map(|lap| lap.info.clone()).collect_vec();
        let fastest = personal_best(self.kind(), &all_laps)?;
        self.stored_lap(&fastest.driver, fastest.lap_number)
            .map(|stored| self.resolve(stored))
    }
}

impl CircuitGeometryProvider for SessionFile {
    fn circuit(&self, session: &SessionInfo) -> Result<CircuitInfo, LapDeltaError> {
        if session.event != self.info.event || session.year != self.info.year {
            warn!(
                "Circuit requested for {} {} but file holds {} {}",
                session.year, session.event, self.info.year, self.info.event
            );
        }
        Ok(self.info.circuit.clone())
    }
}

/// Reads the first session from a JSON-lines file. Data points belong to the
/// lap started by the closest preceding `LapStart` record.
pub fn load_session_jsonl(source_file: &Path) -> Result<SessionFile, LapDeltaError> {
    if !source_file.exists() {
        return Err(LapDeltaError::InvalidTelemetryFile {
            path: format!("{:?}", source_file),
        });
    }

    let records = serde_jsonlines::json_lines(source_file)
        .map_err(|e| LapDeltaError::TelemetryLoaderError { source: e })?
        .collect::<Result<Vec<SessionRecord>, std::io::Error>>()
        .map_err(|e| LapDeltaError::TelemetryLoaderError { source: e })?;

    let mut session = SessionFile::default();
    let mut seen_session = false;
    let mut orphan_points = 0usize;
    for record in records {
        match record {
            SessionRecord::SessionChange(info) => {
                if seen_session {
                    info!("Ignoring additional session {} in {:?}", info.name, source_file);
                    break;
                }
                seen_session = true;
                session.info = info;
            }
            SessionRecord::LapStart(lap_info) => {
                session.laps.push(StoredLap {
                    info: lap_info,
                    samples: Vec::new(),
                });
            }
            SessionRecord::DataPoint(sample) => match session.laps.last_mut() {
                Some(lap) => lap.samples.push(sample),
                None => orphan_points += 1,
            },
        }
    }

    if !seen_session {
        return Err(LapDeltaError::InvalidTelemetryFile {
            path: format!("{:?}", source_file),
        });
    }
    if orphan_points > 0 {
        warn!(
            "Dropped {} data points recorded before the first lap in {:?}",
            orphan_points, source_file
        );
    }
    info!(
        "Loaded {:?}: {} {} {}, {} laps from {} drivers",
        source_file,
        session.info.year,
        session.info.event,
        session.info.name,
        session.laps.len(),
        session.drivers().len()
    );
    Ok(session)
}
