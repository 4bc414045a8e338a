use crate::core::driver::DriverState;
use crate::core::environment::Weather;
use serde::{Deserialize, Serialize};

/// RaceState is the race-level part of a snapshot.
///
/// * `track` - Track identifier
/// * `lap` - Lap currently run by the leader (0 before the start)
/// * `tot_no_laps` - Total number of laps in the race
/// * `time` - (ms) Elapsed race time
/// * `weather` - Current weather
/// * `temperature` - (°C) Track temperature
/// * `safety_car` - True while the safety car is deployed
/// * `chequered` - True as soon as the leader completed the final lap
/// * `percent_complete` - (%) lap / tot_no_laps, 100 once the race is over
/// * `finished` - True once every driver finished or retired
/// * `stopped` - True if the race was stopped before it was over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceState {
    pub track: String,
    pub lap: u32,
    pub tot_no_laps: u32,
    pub time: f64,
    pub weather: Weather,
    pub temperature: f64,
    pub safety_car: bool,
    pub chequered: bool,
    pub percent_complete: f64,
    pub finished: bool,
    pub stopped: bool,
}

/// Snapshot is the immutable state of the race after a time step. Drivers are sorted by ascending
/// id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub race: RaceState,
    pub drivers: Vec<DriverState>,
}

impl Snapshot {
    pub fn get_driver(&self, id: &str) -> Option<&DriverState> {
        self.drivers.iter().find(|driver| driver.id == id)
    }

    /// get_drivers_by_position returns the drivers sorted by ascending position.
    pub fn get_drivers_by_position(&self) -> Vec<&DriverState> {
        let mut drivers: Vec<&DriverState> = self.drivers.iter().collect();
        drivers.sort_by_key(|driver| driver.position);
        drivers
    }
}
