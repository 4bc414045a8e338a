use log::warn;
use serde::{Deserialize, Serialize};

/// * `id` - Unique driver identifier, e.g. VER
/// * `name` - Driver name, e.g. Max Verstappen
/// * `team` - Team the driver races for
/// * `color` - Hex-code of the team color (used by renderers)
/// * `t_driver` - (ms) Time loss per lap due to driver and car abilities
/// * `fuel_start` - (%) Fuel level at the race start
/// * `b_fuel_per_lap` - (%/lap) Fuel consumption per lap
/// * `pit_threshold` - (%) The driver pits at the end of the lap in which the fuel level drops
/// below this value
/// * `t_pit_standstill` - (ms) Standstill time during a pit stop
/// * `boosts` - Number of boost activations available during the race
#[derive(Debug, Deserialize, Clone)]
pub struct DriverPars {
    pub id: String,
    pub name: String,
    pub team: String,
    pub color: String,
    pub t_driver: f64,
    pub fuel_start: f64,
    pub b_fuel_per_lap: f64,
    pub pit_threshold: f64,
    pub t_pit_standstill: f64,
    #[serde(default)]
    pub boosts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitState {
    Racing,
    Pitting,
}

/// DriverState is the immutable per-driver part of a race snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverState {
    pub id: String,
    pub name: String,
    pub team: String,
    pub color: String,
    pub position: u32,
    pub progress: f64,
    pub distance: f64,
    pub compl_laps: u32,
    pub fuel: f64,
    pub pit_state: PitState,
    pub t_last_standstill: f64,
    pub boosts_left: u32,
    pub boost_act: bool,
    pub last_laptime: Option<f64>,
    pub best_laptime: Option<f64>,
    pub race_time: f64,
    pub finished: bool,
    pub retired: bool,
}

impl DriverState {
    /// is_running returns true if the driver neither finished nor retired.
    pub fn is_running(&self) -> bool {
        !self.finished && !self.retired
    }

    /// on_track returns true if the driver is running, not in the pit lane and already crossed
    /// the start line.
    pub fn on_track(&self) -> bool {
        self.is_running() && self.pit_state == PitState::Racing && self.distance >= 0.0
    }
}

/// Driver holds the mutable state of a driver during the race. The race progress is kept as
/// `distance` in percent of a lap (negative on the starting grid), `progress` is the position
/// within the current lap.
#[derive(Debug)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub team: String,
    pub color: String,
    pub t_driver: f64,
    b_fuel_per_lap: f64,
    pit_threshold: f64,
    t_pit_standstill: f64,
    pub grid_pos: u32,
    pub position: u32,
    // race progress
    pub distance: f64,
    distance_prev: f64,
    pub compl_laps: u32,
    compl_laps_prev: u32,
    t_prog_start: f64,
    t_prog: f64,
    // fuel and pit stop
    pub fuel: f64,
    fuel_warned: bool,
    pub pit_state: PitState,
    t_standstill: f64,
    t_last_standstill: f64,
    // boost
    pub boosts_left: u32,
    t_boost_left: f64,
    // timing
    pub laptimes: Vec<f64>,
    pub best_laptime: Option<f64>,
    t_lap_start: f64,
    pub race_time: f64,
    pub finished: bool,
    pub retired: bool,
}

impl Driver {
    pub fn new(driver_pars: &DriverPars, grid_pos: u32, distance_start: f64) -> Driver {
        Driver {
            id: driver_pars.id.to_owned(),
            name: driver_pars.name.to_owned(),
            team: driver_pars.team.to_owned(),
            color: driver_pars.color.to_owned(),
            t_driver: driver_pars.t_driver,
            b_fuel_per_lap: driver_pars.b_fuel_per_lap,
            pit_threshold: driver_pars.pit_threshold,
            t_pit_standstill: driver_pars.t_pit_standstill,
            grid_pos,
            position: grid_pos,
            distance: distance_start,
            distance_prev: distance_start,
            compl_laps: 0,
            compl_laps_prev: 0,
            t_prog_start: 0.0,
            t_prog: 0.0,
            fuel: driver_pars.fuel_start,
            fuel_warned: false,
            pit_state: PitState::Racing,
            t_standstill: 0.0,
            t_last_standstill: 0.0,
            boosts_left: driver_pars.boosts,
            t_boost_left: 0.0,
            laptimes: vec![],
            best_laptime: None,
            t_lap_start: 0.0,
            race_time: 0.0,
            finished: false,
            retired: false,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.finished && !self.retired
    }

    /// on_track returns true if the driver is running, not in the pit lane and already crossed
    /// the start line.
    pub fn on_track(&self) -> bool {
        self.is_running() && self.pit_state == PitState::Racing && self.distance >= 0.0
    }

    pub fn boost_act(&self) -> bool {
        self.t_boost_left > 0.0
    }

    /// get_progress returns the position within the current lap in [0.0, 100.0).
    pub fn get_progress(&self) -> f64 {
        let progress = self.distance.rem_euclid(100.0);

        // rem_euclid can round up to the modulus for tiny negative values
        if progress >= 100.0 {
            0.0
        } else {
            progress
        }
    }

    /// get_new_lap returns a bool indicating if the driver crossed the finish line within the
    /// current time step (not true when crossing the start line coming from the grid).
    pub fn get_new_lap(&self) -> bool {
        self.compl_laps > self.compl_laps_prev
    }

    /// freeze keeps the race progress of a driver that does not move anymore (finished or
    /// retired) such that no lap transition is detected.
    pub fn freeze(&mut self) {
        self.distance_prev = self.distance;
        self.compl_laps_prev = self.compl_laps;
        self.t_prog = 0.0;
        self.t_boost_left = 0.0;
    }

    /// update_race_prog increments the race progress according to the current lap time. Only the
    /// last `t_prog` of the time step are driven, starting at race time `t_prog_start`.
    pub fn update_race_prog(&mut self, laptime: f64, t_prog_start: f64, t_prog: f64) {
        // update previous state
        self.distance_prev = self.distance;
        self.compl_laps_prev = self.compl_laps;
        self.t_prog_start = t_prog_start;
        self.t_prog = t_prog;

        if t_prog <= 0.0 {
            return;
        }

        let mut delta_distance = t_prog / laptime * 100.0;

        // a driver crosses the line at most once per time step
        if delta_distance > 100.0 {
            warn!(
                "Driver {} would cover more than one lap within a single time step!",
                self.id
            );
            delta_distance = 100.0;
        }

        self.distance += delta_distance;
        self.burn_fuel(delta_distance);

        // negative distances on the grid do not lead to a new lap
        if self.distance >= 0.0 {
            let compl_laps = (self.distance / 100.0).floor() as u32;

            if compl_laps > self.compl_laps {
                self.compl_laps = compl_laps
            }
        }
    }

    fn burn_fuel(&mut self, delta_distance: f64) {
        self.fuel -= self.b_fuel_per_lap * delta_distance / 100.0;

        if self.fuel < 0.0 {
            if !self.fuel_warned {
                warn!("Remaining fuel of driver {} is negative!", self.id);
                self.fuel_warned = true;
            }

            // assure that the fuel level is not negative (and therefore lap time decreases)
            self.fuel = 0.0;
        }
    }

    /// get_t_cross returns the race time at which the driver crossed the finish line within the
    /// current time step (linearly interpolated).
    pub fn get_t_cross(&self) -> f64 {
        let s_line = self.compl_laps as f64 * 100.0;
        let frac = (s_line - self.distance_prev) / (self.distance - self.distance_prev);
        self.t_prog_start + frac.max(0.0).min(1.0) * self.t_prog
    }

    /// record_lap stores the lap time of the lap that was completed at race time t_cross.
    pub fn record_lap(&mut self, t_cross: f64) -> f64 {
        let laptime = t_cross - self.t_lap_start;
        self.laptimes.push(laptime);
        self.t_lap_start = t_cross;
        self.race_time = t_cross;

        if self.best_laptime.map_or(true, |best| laptime < best) {
            self.best_laptime = Some(laptime)
        }
        laptime
    }

    pub fn get_pit_requested(&self) -> bool {
        self.fuel < self.pit_threshold
    }

    /// enter_pit switches the driver into the pit stop. The driver is placed exactly on the line
    /// (the pit box is assumed to be there) and already stood still for t_standstill.
    pub fn enter_pit(&mut self, t_standstill: f64) {
        if self.pit_state != PitState::Racing {
            panic!("Driver {} tried to enter the pits while pitting!", self.id)
        }

        self.pit_state = PitState::Pitting;
        self.t_standstill = t_standstill;
        self.distance = self.compl_laps as f64 * 100.0;
        self.t_boost_left = 0.0;
    }

    /// increment_t_standstill increases the standstill time of a pitting driver and returns the
    /// part of the time step the driver can already drive after leaving the pit (refueled).
    pub fn increment_t_standstill(&mut self, timestep_size: f64) -> f64 {
        if self.pit_state != PitState::Pitting {
            panic!("Driver {} is not in standstill!", self.id)
        }

        self.t_standstill += timestep_size;

        if self.t_standstill < self.t_pit_standstill {
            return 0.0;
        }

        let t_drive = (self.t_standstill - self.t_pit_standstill).min(timestep_size);
        self.t_last_standstill = self.t_pit_standstill;
        self.t_standstill = 0.0;
        self.fuel = 100.0;
        self.fuel_warned = false;
        self.pit_state = PitState::Racing;
        t_drive
    }

    pub fn act_boost(&mut self, t_boost_duration: f64) {
        if self.boosts_left == 0 {
            panic!("Driver {} has no boost left!", self.id)
        }
        self.boosts_left -= 1;
        self.t_boost_left = t_boost_duration;
    }

    pub fn update_boost(&mut self, timestep_size: f64, safety_car: bool) {
        if safety_car {
            self.t_boost_left = 0.0
        } else if self.t_boost_left > 0.0 {
            self.t_boost_left = (self.t_boost_left - timestep_size).max(0.0)
        }
    }

    pub fn finish(&mut self, t_cross: f64) {
        self.finished = true;
        self.race_time = t_cross;
        self.t_boost_left = 0.0;
    }

    pub fn retire(&mut self) {
        self.retired = true;
        self.t_boost_left = 0.0;
    }

    pub fn get_state(&self) -> DriverState {
        DriverState {
            id: self.id.to_owned(),
            name: self.name.to_owned(),
            team: self.team.to_owned(),
            color: self.color.to_owned(),
            position: self.position,
            progress: self.get_progress(),
            distance: self.distance,
            compl_laps: self.compl_laps,
            fuel: self.fuel,
            pit_state: self.pit_state,
            t_last_standstill: self.t_last_standstill,
            boosts_left: self.boosts_left,
            boost_act: self.boost_act(),
            last_laptime: self.laptimes.last().copied(),
            best_laptime: self.best_laptime,
            race_time: self.race_time,
            finished: self.finished,
            retired: self.retired,
        }
    }
}
