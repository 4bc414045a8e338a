use crate::core::clock::RaceClock;
use crate::core::driver_table::{DriverTable, TickRules};
use crate::core::environment::{Environment, Weather};
use crate::core::event_generator::{observe, GeneratorPars};
use crate::core::events::{Event, EventKind};
use crate::core::race_control::RaceControl;
use crate::core::snapshot::{RaceState, Snapshot};
use crate::core::speed_model::{BaseSpeedModel, SpeedModel};
use crate::post::race_result::{ClassificationEntry, DriverStatus, RaceResult};
use crate::pre::check_sim_opts_pars::check_sim_pars;
use crate::pre::read_sim_pars::SimPars;
use anyhow::Context;
use helpers::buffer::RingBuffer;
use helpers::general::InputValueError;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

fn default_event_buffer_len() -> usize {
    50
}

/// * `tot_no_laps` - Total number of laps in the race
/// * `weather` - Weather at the race start
/// * `temperature` - (°C) Track temperature at the race start
/// * `seed` - Seed of the random number generators (lap time variation, crashes)
/// * `collision_threshold` - (%) Two drivers on track collide if their lap progresses are closer
/// * `grid_spacing` - (%) Distance between two grid positions
/// * `boost_allowed_lap` - Boosts can be used from this lap of the leader onwards
/// * `boost_window` - (%) A driver can activate a boost if the gap to the car in front is smaller
/// * `t_boost_duration` - (ms) Duration of a boost activation
/// * `crash_probability` - Probability that a collision takes the rear driver out of the race
/// * `event_buffer_len` - Number of recent events visible to consumers
#[derive(Debug, Deserialize, Clone)]
pub struct RacePars {
    pub tot_no_laps: u32,
    pub weather: Weather,
    pub temperature: f64,
    #[serde(default)]
    pub seed: u64,
    pub collision_threshold: f64,
    pub grid_spacing: f64,
    pub boost_allowed_lap: u32,
    pub boost_window: f64,
    pub t_boost_duration: f64,
    pub crash_probability: f64,
    #[serde(default = "default_event_buffer_len")]
    pub event_buffer_len: usize,
}

/// Race is the simulation context. It owns everything that belongs to one race such that several
/// independent races can be simulated at the same time. All mutation happens synchronously
/// within simulate_timestep, consumers only get immutable snapshots and events.
#[derive(Debug)]
pub struct Race {
    pub clock: RaceClock,
    track_name: String,
    env: Environment,
    driver_table: DriverTable,
    speed_model: Box<dyn SpeedModel>,
    rng: StdRng,
    gen_pars: GeneratorPars,
    boost_allowed_lap: u32,
    boost_window: f64,
    t_boost_duration: f64,
    crash_probability: f64,
    timestep_size_max: f64,
    event_log: RingBuffer<Event>,
    next_seq: u64,
    prev_snapshot: Snapshot,
    stopped: bool,
}

impl Race {
    /// The method creates a race from the parameters. Invalid parameters (e.g. no drivers or no
    /// laps) are rejected such that the race never starts in an inconsistent state.
    pub fn new(sim_pars: &SimPars, speed_model: Box<dyn SpeedModel>) -> anyhow::Result<Race> {
        check_sim_pars(sim_pars).context("Failed to initialize the race!")?;

        let race_pars = &sim_pars.race_pars;

        let mut race = Race {
            clock: RaceClock::new(race_pars.tot_no_laps),
            track_name: sim_pars.track_pars.name.to_owned(),
            env: Environment {
                weather: race_pars.weather,
                temperature: race_pars.temperature,
                safety_car: false,
            },
            driver_table: DriverTable::new(
                &sim_pars.driver_pars_all,
                race_pars.tot_no_laps,
                race_pars.grid_spacing,
            ),
            speed_model,
            rng: StdRng::seed_from_u64(race_pars.seed),
            gen_pars: GeneratorPars {
                collision_threshold: race_pars.collision_threshold,
            },
            boost_allowed_lap: race_pars.boost_allowed_lap,
            boost_window: race_pars.boost_window,
            t_boost_duration: race_pars.t_boost_duration,
            crash_probability: race_pars.crash_probability,
            timestep_size_max: 0.5 * sim_pars.track_pars.t_base,
            event_log: RingBuffer::new(race_pars.event_buffer_len),
            next_seq: 0,
            prev_snapshot: Snapshot {
                race: RaceState {
                    track: String::new(),
                    lap: 0,
                    tot_no_laps: 0,
                    time: 0.0,
                    weather: Weather::default(),
                    temperature: 0.0,
                    safety_car: false,
                    chequered: false,
                    percent_complete: 0.0,
                    finished: false,
                    stopped: false,
                },
                drivers: vec![],
            },
            stopped: false,
        };

        race.prev_snapshot = race.snapshot();
        Ok(race)
    }

    /// with_base_model creates a race that uses the BaseSpeedModel of the track.
    pub fn with_base_model(sim_pars: &SimPars) -> anyhow::Result<Race> {
        let speed_model = BaseSpeedModel::new(
            &sim_pars.track_pars,
            sim_pars.race_pars.seed.wrapping_add(1),
        );
        Race::new(sim_pars, Box::new(speed_model))
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHOD ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// The method simulates one time step of timestep_size (ms) and returns the events created
    /// within it (sorted by priority). Execution order:
    /// 1. Advance the clock.
    /// 2. Advance the drivers (progress, lap transitions, pit stops, positions, boosts).
    /// 3. Update the lap of the leader and the chequered flag, check if the race is over.
    /// 4. Compare the new snapshot with the previous one to create the events.
    /// 5. Apply the consequences of collisions (possible crashes) and compare again if a driver
    /// retired, such that crashes are part of the same step.
    /// 6. Record the events.
    ///
    /// Once the race is over or stopped, the method does nothing and returns no events. The time
    /// step must be smaller than the minimum lap time (0.5 * t_base) such that a driver crosses
    /// the line at most once per step.
    pub fn simulate_timestep(&mut self, timestep_size: f64) -> anyhow::Result<Vec<Event>> {
        if self.stopped || self.clock.race_over {
            return Ok(vec![]);
        }

        if !(timestep_size > 0.0 && timestep_size < self.timestep_size_max) {
            return Err(InputValueError).context(format!(
                "timestep_size must be positive and smaller than {:.3}ms, but is {}ms!",
                self.timestep_size_max, timestep_size
            ));
        }

        let t_start = self.clock.time;
        self.clock.advance(timestep_size);

        let rules = TickRules {
            boost_allowed: !self.env.safety_car && self.clock.lap >= self.boost_allowed_lap,
            boost_window: self.boost_window,
            t_boost_duration: self.t_boost_duration,
        };

        self.driver_table.tick(
            t_start,
            timestep_size,
            &self.env,
            self.speed_model.as_mut(),
            &rules,
        );

        self.clock
            .update_lap(self.driver_table.get_leader_compl_laps());

        if self.driver_table.get_all_done() {
            self.clock.set_race_over()
        }

        let mut cur_snapshot = self.snapshot();
        let mut events = observe(&self.prev_snapshot, &cur_snapshot, &self.gen_pars);

        if self.handle_collisions(&events) {
            if self.driver_table.get_all_done() {
                self.clock.set_race_over()
            }

            // the retired rear drivers are not on track anymore, therefore the collisions are
            // taken over from the first comparison
            let mut events_retired: Vec<Event> = events
                .into_iter()
                .filter(|event| matches!(event.kind, EventKind::Collision { .. }))
                .collect();

            cur_snapshot = self.snapshot();
            for event in observe(&self.prev_snapshot, &cur_snapshot, &self.gen_pars) {
                if !events_retired.contains(&event) {
                    events_retired.push(event)
                }
            }

            events_retired.sort_by_key(|event| event.kind.get_priority());
            events = events_retired;
        }

        self.prev_snapshot = cur_snapshot;

        Ok(self.record(events))
    }

    // ---------------------------------------------------------------------------------------------
    // RACE CONTROL --------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// stop ends the race immediately. Stopping is idempotent, it returns true only if the race
    /// was actually stopped by this call.
    pub fn stop(&mut self) -> bool {
        if self.stopped || self.clock.race_over {
            return false;
        }

        self.stopped = true;
        info!(
            "Race stopped at {:.3}s in lap {}",
            self.clock.time / 1000.0,
            self.clock.lap
        );
        true
    }

    /// set_safety_car deploys or clears the safety car (the system event follows with the next
    /// time step).
    pub fn set_safety_car(&mut self, deployed: bool) {
        self.env.safety_car = deployed
    }

    pub fn set_weather(&mut self, weather: Weather, temperature: f64) {
        self.env.weather = weather;
        self.env.temperature = temperature;
    }

    pub fn apply_control(&mut self, cmd: &RaceControl) {
        match cmd {
            RaceControl::SafetyCar { deployed } => self.set_safety_car(*deployed),
            RaceControl::Weather {
                weather,
                temperature,
            } => self.set_weather(*weather, *temperature),
            RaceControl::Stop => {
                self.stop();
            }
        }
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// handle_collisions takes the rear driver of a collision out of the race with the
    /// configured crash probability. It returns true if any driver retired.
    fn handle_collisions(&mut self, events: &[Event]) -> bool {
        let mut retired = false;

        if self.crash_probability <= 0.0 {
            return retired;
        }

        for event in events.iter() {
            if let EventKind::Collision { agents, .. } = &event.kind {
                if self.rng.gen::<f64>() < self.crash_probability
                    && self.driver_table.retire(&agents[1])
                {
                    info!(
                        "Driver {} retires after the collision with {}",
                        agents[1], agents[0]
                    );
                    retired = true;
                }
            }
        }

        retired
    }

    /// record assigns the sequence numbers and stores the events in the bounded event log.
    fn record(&mut self, mut events: Vec<Event>) -> Vec<Event> {
        for event in events.iter_mut() {
            event.seq = self.next_seq;
            self.next_seq += 1;
            self.event_log.push(event.clone());
        }
        events
    }

    pub fn get_race_over(&self) -> bool {
        self.clock.race_over
    }

    pub fn get_stopped(&self) -> bool {
        self.stopped
    }

    pub fn get_environment(&self) -> &Environment {
        &self.env
    }

    pub fn get_driver_table(&self) -> &DriverTable {
        &self.driver_table
    }

    /// get_no_events returns the number of events recorded since the race start.
    pub fn get_no_events(&self) -> u64 {
        self.next_seq
    }

    /// get_recent_events returns the last event_buffer_len events, newest first.
    pub fn get_recent_events(&self) -> Vec<Event> {
        self.event_log.iter_newest_first().cloned().collect()
    }

    /// race_state combines the clock and the environment into the race-level state.
    pub fn race_state(&self) -> RaceState {
        RaceState {
            track: self.track_name.to_owned(),
            lap: self.clock.lap,
            tot_no_laps: self.clock.tot_no_laps,
            time: self.clock.time,
            weather: self.env.weather,
            temperature: self.env.temperature,
            safety_car: self.env.safety_car,
            chequered: self.clock.chequered,
            percent_complete: self.clock.get_percent_complete(),
            finished: self.clock.race_over,
            stopped: self.stopped,
        }
    }

    /// snapshot returns the current immutable state of the race.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            race: self.race_state(),
            drivers: self.driver_table.get_states(),
        }
    }

    /// get_race_result returns a race result struct of the race (classification ordered by
    /// position).
    pub fn get_race_result(&self) -> RaceResult {
        let mut drivers: Vec<_> = self.driver_table.iter().collect();
        drivers.sort_by_key(|driver| driver.position);

        RaceResult {
            track: self.track_name.to_owned(),
            tot_no_laps: self.clock.tot_no_laps,
            classification: drivers
                .iter()
                .map(|driver| ClassificationEntry {
                    position: driver.position,
                    id: driver.id.to_owned(),
                    name: driver.name.to_owned(),
                    team: driver.team.to_owned(),
                    compl_laps: driver.compl_laps,
                    race_time: driver.race_time,
                    best_laptime: driver.best_laptime,
                    status: if driver.finished {
                        DriverStatus::Finished
                    } else if driver.retired {
                        DriverStatus::Retired
                    } else {
                        DriverStatus::Running
                    },
                })
                .collect(),
            laptimes: drivers
                .iter()
                .map(|driver| driver.laptimes.to_owned())
                .collect(),
            no_events: self.next_seq,
            stopped: self.stopped,
        }
    }
}
