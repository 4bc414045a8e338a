use crate::core::driver::{Driver, DriverPars, DriverState, PitState};
use crate::core::environment::Environment;
use crate::core::speed_model::SpeedModel;
use helpers::general::{argsort, is_permutation, SortOrder};
use log::error;

/// * `boost_allowed` - Boosts can be activated in the current time step
/// * `boost_window` - (%) A driver can activate a boost if the gap to the car in front is smaller
/// * `t_boost_duration` - (ms) Duration of a boost activation
#[derive(Debug, Clone)]
pub struct TickRules {
    pub boost_allowed: bool,
    pub boost_window: f64,
    pub t_boost_duration: f64,
}

/// DriverTable owns all drivers of the race (sorted by ascending id) and advances them time step
/// by time step. It keeps the positions consistent with the race progress.
#[derive(Debug)]
pub struct DriverTable {
    drivers: Vec<Driver>,
    tot_no_laps: u32,
}

impl DriverTable {
    /// The drivers are placed on the grid in the order of driver_pars_all, the first one on pole
    /// at the start line and the others grid_spacing (%) behind each other.
    pub fn new(driver_pars_all: &[DriverPars], tot_no_laps: u32, grid_spacing: f64) -> DriverTable {
        let mut drivers: Vec<Driver> = driver_pars_all
            .iter()
            .enumerate()
            .map(|(i, driver_pars)| {
                Driver::new(driver_pars, i as u32 + 1, -(i as f64) * grid_spacing)
            })
            .collect();

        drivers.sort_by(|a, b| a.id.cmp(&b.id));

        let mut driver_table = DriverTable {
            drivers,
            tot_no_laps,
        };
        driver_table.update_positions();
        driver_table
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Driver> {
        self.drivers
            .binary_search_by(|driver| driver.id.as_str().cmp(id))
            .ok()
            .map(|idx| &self.drivers[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Driver> {
        self.drivers.iter()
    }

    /// get_leader_compl_laps returns the highest number of completed laps among all drivers.
    pub fn get_leader_compl_laps(&self) -> u32 {
        self.drivers
            .iter()
            .map(|driver| driver.compl_laps)
            .max()
            .unwrap_or(0)
    }

    /// get_all_done checks if all drivers have either finished or retired.
    pub fn get_all_done(&self) -> bool {
        self.drivers.iter().all(|driver| !driver.is_running())
    }

    pub fn get_states(&self) -> Vec<DriverState> {
        self.drivers.iter().map(|driver| driver.get_state()).collect()
    }

    /// retire takes a running driver out of the race and returns true if it was running.
    pub fn retire(&mut self, id: &str) -> bool {
        let idx = match self
            .drivers
            .binary_search_by(|driver| driver.id.as_str().cmp(id))
        {
            Ok(idx) => idx,
            Err(_) => return false,
        };

        if !self.drivers[idx].is_running() {
            return false;
        }

        self.drivers[idx].retire();
        self.update_positions();
        true
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHOD ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// The method simulates one time step of size timestep_size starting at race time t_start.
    /// Execution order:
    /// 1. Update the race progress of each running driver on the basis of the lap time returned by
    /// the speed model. Pitting drivers stand still until their standstill time is over.
    /// 2. Handle lap transitions in the order in which the drivers crossed the line: record lap
    /// times, finish drivers after the chequered flag, and send drivers with low fuel into the
    /// pits.
    /// 3. Recalculate the positions.
    /// 4. Activate boosts for drivers close enough to the car in front.
    pub fn tick(
        &mut self,
        t_start: f64,
        timestep_size: f64,
        env: &Environment,
        model: &mut dyn SpeedModel,
        rules: &TickRules,
    ) {
        let chequered_prev = self.get_leader_compl_laps() >= self.tot_no_laps;

        // update race progress
        for driver in self.drivers.iter_mut() {
            if !driver.is_running() {
                driver.freeze();
                continue;
            }

            let t_drive = match driver.pit_state {
                PitState::Racing => timestep_size,
                PitState::Pitting => driver.increment_t_standstill(timestep_size),
            };

            let laptime = if t_drive > 0.0 {
                model.laptime(driver, env)
            } else {
                f64::INFINITY
            };

            driver.update_race_prog(laptime, t_start + timestep_size - t_drive, t_drive);
            driver.update_boost(timestep_size, env.safety_car);
        }

        // handle lap transitions
        self.handle_lap_transitions(t_start + timestep_size, chequered_prev);

        // update positions and check them
        self.update_positions();
        self.check_positions();

        // boosts are activated on the basis of the gaps after the current time step
        self.handle_boosts(rules);
    }

    // ---------------------------------------------------------------------------------------------
    // TABLE PARTS ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// The method handles the drivers that crossed the line within the current time step. The
    /// chequered flag becomes active at the moment the leader completes the final lap, every
    /// running driver crossing the line afterward finishes the race.
    fn handle_lap_transitions(&mut self, t_end: f64, chequered_prev: bool) {
        let crossings_unsorted: Vec<(f64, usize)> = self
            .drivers
            .iter()
            .enumerate()
            .filter(|(_, driver)| driver.is_running() && driver.get_new_lap())
            .map(|(i, driver)| (driver.get_t_cross(), i))
            .collect();

        if crossings_unsorted.is_empty() {
            return;
        }

        // sort by crossing time (stable, ties are kept in id order)
        let t_crosses: Vec<f64> = crossings_unsorted.iter().map(|x| x.0).collect();
        let crossings: Vec<(f64, usize)> = argsort(&t_crosses, SortOrder::Ascending)
            .into_iter()
            .map(|i| crossings_unsorted[i])
            .collect();

        // determine the time at which the chequered flag got active within this step
        let t_flag = if chequered_prev {
            Some(f64::NEG_INFINITY)
        } else {
            crossings
                .iter()
                .find(|(_, i)| self.drivers[*i].compl_laps >= self.tot_no_laps)
                .map(|x| x.0)
        };

        for (t_cross, i) in crossings.into_iter() {
            let driver = &mut self.drivers[i];
            driver.record_lap(t_cross);

            if t_flag.map_or(false, |t_flag| t_cross >= t_flag) {
                driver.finish(t_cross);
            } else if driver.get_pit_requested() {
                driver.enter_pit(t_end - t_cross);
            }
        }
    }

    /// The method recalculates the positions. Ranking order:
    /// 1. running and finished drivers before retired drivers,
    /// 2. more completed laps first,
    /// 3. with equal completed laps, running drivers (by distance) before finished drivers (by
    /// crossing time) since finished drivers completed their last lap after the chequered flag.
    /// Ties are broken by ascending id (the drivers are stored in this order and the sort is
    /// stable).
    fn update_positions(&mut self) {
        let keys: Vec<(u8, f64, u8, f64)> = self
            .drivers
            .iter()
            .map(|driver| {
                let key_done = if driver.finished {
                    (1, driver.race_time)
                } else {
                    (0, -driver.distance)
                };
                (
                    driver.retired as u8,
                    -(driver.compl_laps as f64),
                    key_done.0,
                    key_done.1,
                )
            })
            .collect();

        for (rank, idx) in argsort(&keys, SortOrder::Ascending).into_iter().enumerate() {
            self.drivers[idx].position = rank as u32 + 1;
        }
    }

    /// The method assures that the positions are a permutation of 1..=N. Violations are
    /// programming errors: debug builds panic, release builds log the error and recalculate the
    /// positions.
    fn check_positions(&mut self) {
        let positions: Vec<u32> = self.drivers.iter().map(|driver| driver.position).collect();

        if !is_permutation(&positions) {
            debug_assert!(false, "Positions {:?} are not a permutation!", positions);
            error!(
                "Positions {:?} are not a permutation, recalculating them!",
                positions
            );
            self.update_positions();
        }
    }

    /// The method activates a boost for every driver that is racing on track, has boosts left,
    /// and is within the boost window behind the car in front (the car in front must be on track
    /// as well).
    fn handle_boosts(&mut self, rules: &TickRules) {
        if !rules.boost_allowed {
            return;
        }

        let mut idxs_by_pos = vec![0; self.drivers.len()];

        for (i, driver) in self.drivers.iter().enumerate() {
            idxs_by_pos[driver.position as usize - 1] = i;
        }

        for pos_idx in 1..idxs_by_pos.len() {
            let front = &self.drivers[idxs_by_pos[pos_idx - 1]];
            let rear = &self.drivers[idxs_by_pos[pos_idx]];

            if !(front.on_track() && rear.on_track())
                || rear.boosts_left == 0
                || rear.boost_act()
            {
                continue;
            }

            let gap = front.distance - rear.distance;

            if 0.0 < gap && gap <= rules.boost_window {
                self.drivers[idxs_by_pos[pos_idx]].act_boost(rules.t_boost_duration);
            }
        }
    }
}
