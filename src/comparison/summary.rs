use std::time::Duration;

use serde::Serialize;

use crate::{
    format::format_optional_duration,
    session::SessionKind,
    telemetry::{DriverId, LapInfo, TyreCompound},
};

/// Per-lap scalars shown next to the plots
#[derive(Clone, Debug, PartialEq)]
pub struct LapSummary {
    pub driver: DriverId,
    pub lap_number: u32,
    pub lap_time: Option<Duration>,
    pub sector_times: [Option<Duration>; 3],
    pub compound: TyreCompound,
    pub is_personal_best: bool,
}

impl LapSummary {
    pub fn resolve(kind: SessionKind, info: &LapInfo, is_personal_best: bool) -> Self {
        Self {
            driver: info.driver.clone(),
            lap_number: info.lap_number,
            lap_time: info.lap_time,
            sector_times: [
                kind.sector1_time(info),
                info.sector_times[1],
                info.sector_times[2],
            ],
            compound: info.compound,
            is_personal_best,
        }
    }

    pub fn formatted(&self) -> LapSummaryView {
        LapSummaryView {
            driver: self.driver.clone(),
            lap_number: self.lap_number,
            lap_time: format_optional_duration(self.lap_time),
            sector_times: self.sector_times.map(format_optional_duration),
            compound: self.compound.to_string(),
            is_personal_best: self.is_personal_best,
        }
    }
}

/// [`LapSummary`] with every time already formatted for display
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LapSummaryView {
    pub driver: DriverId,
    pub lap_number: u32,
    pub lap_time: String,
    pub sector_times: [String; 3],
    pub compound: String,
    pub is_personal_best: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_race_lap_one_summary() {
        let info = LapInfo {
            driver: "ALO".to_string(),
            lap_number: 1,
            lap_time: Some(Duration::from_millis(98_765)),
            sector_times: [
                Some(Duration::from_millis(40_000)),
                Some(Duration::from_millis(30_123)),
                Some(Duration::from_millis(28_642)),
            ],
            compound: TyreCompound::Medium,
            ..Default::default()
        };

        let view = LapSummary::resolve(SessionKind::Race, &info, false).formatted();

        assert_eq!(view.lap_time, "1:38.765");
        assert_eq!(view.sector_times, ["-", "0:30.123", "0:28.642"]);
        assert_eq!(view.compound, "Medium");

        let view = LapSummary::resolve(SessionKind::Qualifying, &info, true).formatted();
        assert_eq!(view.sector_times[0], "0:40.000");
        assert!(view.is_personal_best);
    }
}
