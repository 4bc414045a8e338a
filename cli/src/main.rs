use clap::Parser;
use log::{info, warn, LevelFilter};
use racecore::core::handle_race::{handle_race, EventOutput};
use racecore::core::race_control::RaceControl;
use racecore::interfaces::consumer_interface::UPDATE_CHANNEL_CAPACITY;
use racecore::interfaces::feed_interface::FeedInterface;
use racecore::post::race_result::RaceResult;
use racecore::pre::check_sim_opts_pars::check_sim_opts_pars;
use racecore::pre::read_sim_pars::read_sim_pars;
use racecore::pre::sim_opts::SimOpts;
use rayon::prelude::*;
use std::cmp::min;
use std::collections::HashMap;
use std::io::BufRead;
use std::thread;
use std::time::Instant;

// set maximum number of concurrently running jobs in case of running more than a single simulation
const MAX_NO_CONCURRENT_JOBS: u32 = 200;

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments and read simulation parameters
    let sim_opts: SimOpts = SimOpts::parse();

    env_logger::Builder::new()
        .filter_level(if sim_opts.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    let mut sim_pars = read_sim_pars(sim_opts.parfile_path.as_path())?;

    if let Some(seed) = sim_opts.seed {
        sim_pars.race_pars.seed = seed
    }

    // check simulation options and parameters
    check_sim_opts_pars(&sim_opts, &sim_pars)?;

    // print race details
    info!(
        "Simulating {} laps at {} with {} drivers and a time step size of {:.3}ms",
        sim_pars.race_pars.tot_no_laps,
        sim_pars.track_pars.name,
        sim_pars.driver_pars_all.len(),
        sim_opts.timestep_size
    );

    let event_output = if sim_opts.json {
        EventOutput::Json
    } else {
        EventOutput::Log
    };

    // EXECUTION -----------------------------------------------------------------------------------
    if sim_opts.feed {
        // LIVE FEED CASE --------------------------------------------------------------------------
        // create channels for the updates (bounded, the race never waits for the feed) and the
        // race control commands
        let (tx, rx) = flume::bounded(UPDATE_CHANNEL_CAPACITY);
        let (ctrl_tx, ctrl_rx) = flume::unbounded::<RaceControl>();

        // create a separate thread for the race (executed in real-time) -> sim_opts and sim_pars
        // get moved and must therefore be copied to be still available afterwards
        let sim_opts_thread = sim_opts.clone();
        let sim_pars_thread = sim_pars.clone();

        let race_handle = thread::spawn(move || {
            handle_race(
                &sim_pars_thread,
                sim_opts_thread.timestep_size,
                sim_opts_thread.debug,
                EventOutput::Silent,
                Some(&tx),
                Some(&ctrl_rx),
                sim_opts_thread.realtime_factor,
            )
        });

        // race control commands are read from stdin, the thread ends with stdin or the race
        let _ = thread::spawn(move || {
            let stdin = std::io::stdin();

            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(x) => x,
                    Err(_) => break,
                };

                if line.trim().is_empty() {
                    continue;
                }

                match line.parse::<RaceControl>() {
                    Ok(cmd) => {
                        if ctrl_tx.send(cmd).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("{}", e),
                }
            }
        });

        // the feed is consumed in the main thread
        let mut feed_interface = FeedInterface::new(rx);

        while feed_interface.wait_update() {
            for event in feed_interface.take_new_events() {
                if sim_opts.json {
                    println!("{}", serde_json::to_string(&event)?);
                } else {
                    info!("{}", event);
                }
            }
        }

        let race_result = match race_handle.join() {
            Ok(x) => x?,
            Err(_) => anyhow::bail!("Race thread panicked!"),
        };

        race_result.print_classification();
    } else if sim_opts.no_sim_runs == 1 {
        // SINGLE RUN ------------------------------------------------------------------------------
        let t_start = Instant::now();

        let race_result = handle_race(
            &sim_pars,
            sim_opts.timestep_size,
            sim_opts.debug,
            event_output,
            None,
            None,
            1.0,
        )?;

        info!(
            "Execution time (total): {}ms",
            t_start.elapsed().as_millis()
        );

        // POST-PROCESSING -------------------------------------------------------------------------
        race_result.print_classification();
        race_result.print_lap_times();
    } else {
        // MULTIPLE RUNS ---------------------------------------------------------------------------
        let t_start = Instant::now();
        let mut race_results: Vec<RaceResult> = Vec::with_capacity(sim_opts.no_sim_runs as usize);
        let mut no_races_left = sim_opts.no_sim_runs;

        while no_races_left > 0 {
            // calculate number of simulation runs to execute in current loop
            let tmp_no_sim_runs = min(no_races_left, MAX_NO_CONCURRENT_JOBS);
            let seed_offset = (sim_opts.no_sim_runs - no_races_left) as u64;

            // simulate the races (consecutive seeds) and save the results
            let tmp_results = (0..tmp_no_sim_runs)
                .into_par_iter()
                .map(|i| {
                    let mut sim_pars_run = sim_pars.clone();
                    sim_pars_run.race_pars.seed = sim_pars
                        .race_pars
                        .seed
                        .wrapping_add(seed_offset + i as u64);

                    handle_race(
                        &sim_pars_run,
                        sim_opts.timestep_size,
                        false,
                        EventOutput::Silent,
                        None,
                        None,
                        1.0,
                    )
                })
                .collect::<anyhow::Result<Vec<RaceResult>>>()?;
            race_results.extend(tmp_results);

            // reduce remaining simulation runs
            no_races_left -= tmp_no_sim_runs;
        }

        info!(
            "Execution time (total): {}ms",
            t_start.elapsed().as_millis()
        );

        // POST-PROCESSING -------------------------------------------------------------------------
        print_win_counts(&race_results);
    }

    Ok(())
}

/// print_win_counts prints how often every driver won within a batch of races.
fn print_win_counts(race_results: &[RaceResult]) {
    let mut win_counts: HashMap<&str, u32> = HashMap::new();

    for race_result in race_results.iter() {
        let winner = race_result.get_winner().unwrap_or("none");
        *win_counts.entry(winner).or_insert(0) += 1;
    }

    let mut win_counts: Vec<(&str, u32)> = win_counts.into_iter().collect();
    win_counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    for (id, no_wins) in win_counts.iter() {
        info!(
            "RESULT: {:5} won {:4} of {} races ({:.1}%)",
            id,
            no_wins,
            race_results.len(),
            *no_wins as f64 / race_results.len() as f64 * 100.0
        );
    }
}
