use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

/// Display color handed to renderers as-is, e.g. "#3671C6"
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorToken(pub String);

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub trait ColorLookup {
    fn color_for(&self, driver: &str, team: &str, year: i32) -> Option<ColorToken>;
}

/// Colors from the user config.
///
/// Before `driver_color_from_year` teammates share the team color, from that
/// season on each driver has their own.
#[derive(Clone, Debug, Default)]
pub struct SeasonColorLookup {
    driver_colors: HashMap<String, String>,
    team_colors: HashMap<String, String>,
    driver_color_from_year: i32,
}

impl SeasonColorLookup {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            driver_colors: config
                .driver_colors
                .iter()
                .map(|(driver, color)| (driver.to_uppercase(), color.clone()))
                .collect(),
            team_colors: config
                .team_colors
                .iter()
                .map(|(team, color)| (team.to_lowercase(), color.clone()))
                .collect(),
            driver_color_from_year: config.driver_color_from_year,
        }
    }
}

impl ColorLookup for SeasonColorLookup {
    fn color_for(&self, driver: &str, team: &str, year: i32) -> Option<ColorToken> {
        let color = if year >= self.driver_color_from_year {
            self.driver_colors.get(&driver.to_uppercase())
        } else {
            self.team_colors.get(&team.to_lowercase())
        };
        color.cloned().map(ColorToken)
    }
}
