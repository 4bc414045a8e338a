use crate::pre::read_sim_pars::SimPars;
use crate::pre::sim_opts::SimOpts;
use anyhow::Context;
use approx::ulps_eq;
use helpers::general::InputValueError;
use std::collections::HashSet;

/// check_sim_opts_pars assures that the inserted options and parameters are within reasonable
/// limits and raises an error if not.
pub fn check_sim_opts_pars(sim_opts: &SimOpts, sim_pars: &SimPars) -> anyhow::Result<()> {
    // PART 1: SIMULATION OPTIONS
    if !(1.0 <= sim_opts.timestep_size && sim_opts.timestep_size <= 1000.0) {
        return Err(InputValueError).context(format!(
            "timestep_size is {:.3}ms, which is not within the reasonable range of [1.0, 1000.0]ms!",
            sim_opts.timestep_size
        ));
    }

    if sim_opts.no_sim_runs < 1 {
        return Err(InputValueError).context(format!(
            "no_sim_runs must be at least equal to one, but is {}!",
            sim_opts.no_sim_runs
        ));
    }

    if sim_opts.feed && sim_opts.no_sim_runs != 1 {
        return Err(InputValueError)
            .context("If the live feed is activated, no_sim_runs must be equal to one!");
    }

    if sim_opts.feed && !(0.1 <= sim_opts.realtime_factor && sim_opts.realtime_factor <= 100.0) {
        return Err(InputValueError).context(format!(
            "realtime_factor is {:.3}, which is not within the reasonable range of [0.1, 100.0]!",
            sim_opts.realtime_factor
        ));
    }

    if sim_pars.track_pars.t_base * 0.5 <= sim_opts.timestep_size {
        return Err(InputValueError).context(
            "timestep_size must be considerably smaller than the base lap time such that a \
            driver cannot complete more than one lap within a single time step!",
        );
    }

    // PART 2: SIMULATION PARAMETERS
    check_sim_pars(sim_pars)
}

/// check_sim_pars checks the simulation parameters. It is called before any race is created, a
/// failing check is a configuration error.
pub fn check_sim_pars(sim_pars: &SimPars) -> anyhow::Result<()> {
    // RACE ----------------------------------------------------------------------------------------
    let race_pars = &sim_pars.race_pars;

    if race_pars.tot_no_laps < 1 {
        return Err(InputValueError).context("tot_no_laps must be at least equal to one!");
    }

    if !(0.0 <= race_pars.collision_threshold && race_pars.collision_threshold < 50.0) {
        return Err(InputValueError).context(format!(
            "collision_threshold is {:.3}%, which is not within the required range [0.0, 50.0)%!",
            race_pars.collision_threshold
        ));
    }

    if !(race_pars.grid_spacing > race_pars.collision_threshold
        && race_pars.grid_spacing * (sim_pars.driver_pars_all.len() as f64) < 100.0)
    {
        return Err(InputValueError).context(
            "grid_spacing must be greater than collision_threshold and the whole grid must fit \
            into a single lap!",
        );
    }

    if race_pars.boost_window < 0.0 || race_pars.t_boost_duration < 0.0 {
        return Err(InputValueError)
            .context("boost_window and t_boost_duration must not be negative!");
    }

    if !(0.0 <= race_pars.crash_probability && race_pars.crash_probability <= 1.0) {
        return Err(InputValueError).context(format!(
            "crash_probability is {:.3}, which is not within the required range [0.0, 1.0]!",
            race_pars.crash_probability
        ));
    }

    if race_pars.event_buffer_len < 1 {
        return Err(InputValueError).context("event_buffer_len must be at least equal to one!");
    }

    // TRACK ---------------------------------------------------------------------------------------
    let track_pars = &sim_pars.track_pars;

    if track_pars.t_base <= 0.0 || track_pars.s_fuel < 0.0 || track_pars.t_boost > 0.0 {
        return Err(InputValueError).context(
            "t_base must be positive, s_fuel must not be negative, and t_boost must not be \
            positive!",
        );
    }

    if track_pars.sc_factor < 1.0 {
        return Err(InputValueError).context("sc_factor must be at least equal to one!");
    }

    if track_pars
        .weather_factors
        .all()
        .iter()
        .any(|&factor| factor <= 0.0)
    {
        return Err(InputValueError).context("All weather factors must be positive!");
    }

    if track_pars.temp_laptime_factors.is_empty()
        || track_pars
            .temp_laptime_factors
            .iter()
            .any(|x| x[1] <= 0.0)
    {
        return Err(InputValueError).context(
            "temp_laptime_factors must contain at least one entry and all factors must be \
            positive!",
        );
    }

    for i in 1..track_pars.temp_laptime_factors.len() {
        let temp_prev = track_pars.temp_laptime_factors[i - 1][0];
        let temp_cur = track_pars.temp_laptime_factors[i][0];

        if temp_cur < temp_prev || ulps_eq!(temp_cur, temp_prev) {
            return Err(InputValueError)
                .context("Temperatures in temp_laptime_factors must be strictly increasing!");
        }
    }

    if !(track_pars.laptime_std >= 0.0 && track_pars.laptime_std.is_finite()) {
        return Err(InputValueError).context("laptime_std must not be negative!");
    }

    // DRIVERS -------------------------------------------------------------------------------------
    if sim_pars.driver_pars_all.is_empty() {
        return Err(InputValueError).context("There must be at least one driver in the race!");
    }

    let mut ids: HashSet<&str> = HashSet::with_capacity(sim_pars.driver_pars_all.len());

    for driver_pars in sim_pars.driver_pars_all.iter() {
        if driver_pars.id.is_empty() || !ids.insert(driver_pars.id.as_str()) {
            return Err(InputValueError).context(format!(
                "Driver id '{}' is empty or not unique!",
                driver_pars.id
            ));
        }

        driver_pars
            .color
            .parse::<css_color_parser::Color>()
            .map_err(|_| InputValueError)
            .context(format!(
                "Could not parse color {} of driver {}!",
                driver_pars.color, driver_pars.id
            ))?;

        if !(0.0 < driver_pars.fuel_start && driver_pars.fuel_start <= 100.0) {
            return Err(InputValueError).context(format!(
                "fuel_start of driver {} is not within the required range (0.0, 100.0]%!",
                driver_pars.id
            ));
        }

        if driver_pars.b_fuel_per_lap < 0.0
            || !(0.0 <= driver_pars.pit_threshold && driver_pars.pit_threshold < 100.0)
            || driver_pars.t_pit_standstill < 0.0
        {
            return Err(InputValueError).context(format!(
                "Fuel consumption, pit threshold, or pit standstill time of driver {} is invalid!",
                driver_pars.id
            ));
        }

        if track_pars.t_base + driver_pars.t_driver <= 0.0 {
            return Err(InputValueError).context(format!(
                "t_driver of driver {} leads to a non-positive lap time!",
                driver_pars.id
            ));
        }
    }

    // RACE CONTROL --------------------------------------------------------------------------------
    if sim_pars
        .race_control
        .iter()
        .any(|entry| !(entry.t_race >= 0.0 && entry.t_race.is_finite()))
    {
        return Err(InputValueError).context("Race control entries must have t_race >= 0.0!");
    }

    Ok(())
}
