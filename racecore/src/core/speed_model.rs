use crate::core::driver::Driver;
use crate::core::environment::Environment;
use crate::core::track::{Track, TrackPars};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::collections::HashMap;

/// SpeedModel determines how fast a driver currently is. The returned lap time (ms) is the time
/// the driver would need for a full lap under the current conditions; the driver table converts it
/// into race progress for each time step. Implementations must return finite, positive lap times
/// that do not decrease with increasing fuel level.
pub trait SpeedModel: Send + std::fmt::Debug {
    fn laptime(&mut self, driver: &Driver, env: &Environment) -> f64;
}

/// BaseSpeedModel combines a base lap time, the driver-specific time loss, and the fuel mass
/// effect. The result is scaled by weather and track temperature factors. Boosts reduce the lap
/// time, the safety car enforces a minimum lap time. An optional random variation is sampled once
/// per driver and lap.
#[derive(Debug)]
pub struct BaseSpeedModel {
    track: Track,
    rng: StdRng,
    noise: Option<Normal<f64>>,
    lap_noise: HashMap<String, (u32, f64)>,
}

impl BaseSpeedModel {
    pub fn new(track_pars: &TrackPars, seed: u64) -> BaseSpeedModel {
        let track = Track::new(track_pars);

        let noise = if track.laptime_std > 0.0 {
            Normal::new(0.0, track.laptime_std).ok()
        } else {
            None
        };

        BaseSpeedModel {
            track,
            rng: StdRng::seed_from_u64(seed),
            noise,
            lap_noise: HashMap::new(),
        }
    }

    /// get_lap_noise returns the random lap time variation of the driver's current lap (limited
    /// to three standard deviations).
    fn get_lap_noise(&mut self, driver: &Driver) -> f64 {
        let normal = match self.noise {
            Some(normal) => normal,
            None => return 0.0,
        };

        if let Some(&(lap, noise)) = self.lap_noise.get(&driver.id) {
            if lap == driver.compl_laps {
                return noise;
            }
        }

        let lim = 3.0 * self.track.laptime_std;
        let noise = normal.sample(&mut self.rng).max(-lim).min(lim);
        self.lap_noise
            .insert(driver.id.to_owned(), (driver.compl_laps, noise));
        noise
    }
}

impl SpeedModel for BaseSpeedModel {
    fn laptime(&mut self, driver: &Driver, env: &Environment) -> f64 {
        let noise = self.get_lap_noise(driver);

        let mut laptime = (self.track.t_base
            + driver.t_driver
            + driver.fuel * self.track.s_fuel
            + noise)
            * self.track.get_weather_factor(env.weather)
            * self.track.get_temperature_factor(env.temperature);

        // t_boost is negative
        if driver.boost_act() {
            laptime += self.track.t_boost
        }

        if env.safety_car && laptime < self.track.get_min_laptime_sc() {
            laptime = self.track.get_min_laptime_sc()
        }

        // keep the lap time physically reasonable for extreme parameter combinations
        laptime.max(0.5 * self.track.t_base)
    }
}
