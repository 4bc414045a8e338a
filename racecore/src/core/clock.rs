/// RaceClock tracks the race time and the lap run by the race leader.
///
/// * `time` - (ms) Elapsed race time
/// * `lap` - Lap currently run by the leader (0 before the start, at most tot_no_laps)
/// * `chequered` - True as soon as the leader completed the final lap
/// * `race_over` - True as soon as every driver finished or retired, no further ticks are
/// processed afterwards
#[derive(Debug, Clone)]
pub struct RaceClock {
    pub time: f64,
    pub lap: u32,
    pub tot_no_laps: u32,
    pub chequered: bool,
    pub race_over: bool,
}

impl RaceClock {
    pub fn new(tot_no_laps: u32) -> RaceClock {
        RaceClock {
            time: 0.0,
            lap: 0,
            tot_no_laps,
            chequered: false,
            race_over: false,
        }
    }

    /// advance increases the race time by timestep_size.
    pub fn advance(&mut self, timestep_size: f64) {
        if self.race_over {
            panic!("Tried to advance the clock of a race that is over!")
        }
        debug_assert!(timestep_size > 0.0, "Time step size must be positive!");

        self.time += timestep_size;
    }

    /// update_lap sets the lap on the basis of the number of laps completed by the leader and
    /// returns true if the leader started a new lap. The chequered flag is shown once the leader
    /// completed all laps (i.e. would start lap tot_no_laps + 1).
    pub fn update_lap(&mut self, leader_compl_laps: u32) -> bool {
        if leader_compl_laps >= self.tot_no_laps {
            self.chequered = true
        }

        let lap = (leader_compl_laps + 1).min(self.tot_no_laps);

        if lap > self.lap {
            self.lap = lap;
            true
        } else {
            false
        }
    }

    pub fn set_race_over(&mut self) {
        self.race_over = true
    }

    /// get_percent_complete returns lap / tot_no_laps in percent (100 once the race is over).
    pub fn get_percent_complete(&self) -> f64 {
        if self.race_over {
            100.0
        } else {
            self.lap as f64 / self.tot_no_laps as f64 * 100.0
        }
    }
}
