use crate::core::environment::Weather;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// RaceControl contains the runtime toggles that can be applied to a running race from outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum RaceControl {
    SafetyCar { deployed: bool },
    Weather { weather: Weather, temperature: f64 },
    Stop,
}

/// * `t_race` - (ms) Race time from which on the command is applied
/// * `cmd` - Command to apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlEntry {
    pub t_race: f64,
    #[serde(flatten)]
    pub cmd: RaceControl,
}

/// Parses the commands of the interactive race control: `sc on`, `sc off`,
/// `weather <clear|cloudy|rain|fog|storm> <temperature>`, and `stop`.
impl FromStr for RaceControl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();

        match tokens.as_slice() {
            ["sc", "on"] => Ok(RaceControl::SafetyCar { deployed: true }),
            ["sc", "off"] => Ok(RaceControl::SafetyCar { deployed: false }),
            ["weather", weather, temperature] => Ok(RaceControl::Weather {
                weather: weather.parse()?,
                temperature: temperature
                    .parse()
                    .map_err(|_| format!("Invalid temperature {}!", temperature))?,
            }),
            ["stop"] => Ok(RaceControl::Stop),
            _ => Err(format!("Unknown race control command '{}'!", s.trim())),
        }
    }
}
