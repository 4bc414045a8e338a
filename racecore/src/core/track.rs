use crate::core::environment::Weather;
use helpers::general::lin_interp;
use serde::Deserialize;

/// * `clear`, `cloudy`, `rain`, `fog`, `storm` - Lap time factors for the respective weather
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WeatherFactors {
    pub clear: f64,
    pub cloudy: f64,
    pub rain: f64,
    pub fog: f64,
    pub storm: f64,
}

impl Default for WeatherFactors {
    fn default() -> Self {
        WeatherFactors {
            clear: 1.0,
            cloudy: 1.005,
            rain: 1.08,
            fog: 1.04,
            storm: 1.15,
        }
    }
}

impl WeatherFactors {
    pub fn get(&self, weather: Weather) -> f64 {
        match weather {
            Weather::Clear => self.clear,
            Weather::Cloudy => self.cloudy,
            Weather::Rain => self.rain,
            Weather::Fog => self.fog,
            Weather::Storm => self.storm,
        }
    }

    pub fn all(&self) -> [f64; 5] {
        [self.clear, self.cloudy, self.rain, self.fog, self.storm]
    }
}

fn default_temp_laptime_factors() -> Vec<[f64; 2]> {
    vec![[10.0, 1.01], [25.0, 1.0], [45.0, 1.015]]
}

/// * `name` - Track name (used as track identifier)
/// * `t_base` - (ms) Base lap time on a free track with an empty tank
/// * `s_fuel` - (ms/%) Lap time fuel sensitivity
/// * `t_boost` - (ms) Lap time change while a boost is active (negative)
/// * `sc_factor` - Factor applied to t_base to obtain the minimum lap time behind the safety car
/// * `weather_factors` - Lap time factors for every weather
/// * `temp_laptime_factors` - (°C, -) Lap time factor as a function of the track temperature,
/// temperatures must be increasing
/// * `laptime_std` - (ms) Standard deviation of the random lap time variation (zero disables it)
#[derive(Debug, Deserialize, Clone)]
pub struct TrackPars {
    pub name: String,
    pub t_base: f64,
    pub s_fuel: f64,
    pub t_boost: f64,
    pub sc_factor: f64,
    #[serde(default)]
    pub weather_factors: WeatherFactors,
    #[serde(default = "default_temp_laptime_factors")]
    pub temp_laptime_factors: Vec<[f64; 2]>,
    #[serde(default)]
    pub laptime_std: f64,
}

#[derive(Debug, Clone)]
pub struct Track {
    pub name: String,
    pub t_base: f64,
    pub s_fuel: f64,
    pub t_boost: f64,
    sc_factor: f64,
    weather_factors: WeatherFactors,
    temps: Vec<f64>,
    temp_factors: Vec<f64>,
    pub laptime_std: f64,
}

impl Track {
    pub fn new(track_pars: &TrackPars) -> Track {
        Track {
            name: track_pars.name.to_owned(),
            t_base: track_pars.t_base,
            s_fuel: track_pars.s_fuel,
            t_boost: track_pars.t_boost,
            sc_factor: track_pars.sc_factor,
            weather_factors: track_pars.weather_factors.to_owned(),
            temps: track_pars.temp_laptime_factors.iter().map(|x| x[0]).collect(),
            temp_factors: track_pars.temp_laptime_factors.iter().map(|x| x[1]).collect(),
            laptime_std: track_pars.laptime_std,
        }
    }

    /// The method returns the minimum lap time that must be kept while the safety car is out.
    pub fn get_min_laptime_sc(&self) -> f64 {
        self.t_base * self.sc_factor
    }

    pub fn get_weather_factor(&self, weather: Weather) -> f64 {
        self.weather_factors.get(weather)
    }

    /// The method returns the lap time factor for the given track temperature (linearly
    /// interpolated, constant outside the tabulated range).
    pub fn get_temperature_factor(&self, temperature: f64) -> f64 {
        lin_interp(temperature, &self.temps, &self.temp_factors)
    }
}
