use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Clear,
    Cloudy,
    Rain,
    Fog,
    Storm,
}

impl Default for Weather {
    fn default() -> Self {
        Weather::Clear
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Weather::Clear => "clear",
            Weather::Cloudy => "cloudy",
            Weather::Rain => "rain",
            Weather::Fog => "fog",
            Weather::Storm => "storm",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Weather {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clear" => Ok(Weather::Clear),
            "cloudy" => Ok(Weather::Cloudy),
            "rain" => Ok(Weather::Rain),
            "fog" => Ok(Weather::Fog),
            "storm" => Ok(Weather::Storm),
            _ => Err(format!("Unknown weather {}!", s)),
        }
    }
}

/// Environment holds the externally toggled race conditions that influence the driving speed.
///
/// * `weather` - Current weather
/// * `temperature` - (°C) Track temperature
/// * `safety_car` - True while the safety car is deployed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    pub weather: Weather,
    pub temperature: f64,
    pub safety_car: bool,
}
