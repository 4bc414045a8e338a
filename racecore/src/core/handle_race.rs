use crate::core::events::Event;
use crate::core::race::Race;
use crate::core::race_control::{ControlEntry, RaceControl};
use crate::interfaces::consumer_interface::{RaceUpdate, MAX_UPDATE_FREQUENCY};
use crate::post::race_result::RaceResult;
use crate::pre::read_sim_pars::SimPars;
use anyhow::Context;
use flume::{Receiver, Sender, TryRecvError, TrySendError};
use helpers::buffer::RingBuffer;
use helpers::general::InputValueError;
use log::{debug, info, warn};
use std::thread::sleep;
use std::time::{Duration, Instant};

/// Defines how the events of a race are written out while it is simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutput {
    Silent,
    Log,
    Json,
}

/// handle_race creates and simulates a race on the basis of the inserted parameters, and returns
/// the results for post-processing. If a sender is inserted, the race is simulated in real-time
/// and updates are sent to the consumer without ever blocking the simulation (updates are dropped
/// if the consumer lags behind). Once the consumer disconnected, the rest of the race is
/// simulated as fast as possible. Race control commands can be inserted at runtime through ctrl_rx
/// in addition to the commands scheduled in the parameters.
pub fn handle_race(
    sim_pars: &SimPars,
    timestep_size: f64,
    print_debug: bool,
    event_output: EventOutput,
    tx: Option<&Sender<RaceUpdate>>,
    ctrl_rx: Option<&Receiver<RaceControl>>,
    realtime_factor: f64,
) -> anyhow::Result<RaceResult> {
    if !(realtime_factor > 0.0) {
        return Err(InputValueError).context("realtime_factor must be positive!");
    }

    // create the race
    let mut race = Race::with_base_model(sim_pars)?;

    // scheduled race control commands in chronological order
    let mut schedule: Vec<ControlEntry> = sim_pars.race_control.to_owned();
    schedule.sort_by(|a, b| a.t_race.total_cmp(&b.t_race));
    let mut schedule_idx = 0;

    let mut tx = tx;
    let mut ctrl_rx = ctrl_rx;

    let mut t_race_update_print = 0.0;
    let mut t_race_update_feed = f64::NEG_INFINITY;
    let mut unsent_events: Vec<Event> = vec![];
    let mut no_dropped_updates: u64 = 0;
    let mut lap_leader_prev = 0;
    let mut tick_durations: RingBuffer<u32> = RingBuffer::new(50);

    // simulate the race -> execute simulation steps until the race is over or stopped
    while !race.get_race_over() && !race.get_stopped() {
        let t_start = Instant::now();

        // apply race control commands that are due
        while schedule_idx < schedule.len() && schedule[schedule_idx].t_race <= race.clock.time {
            info!(
                "Race control at {:.3}s: {:?}",
                race.clock.time / 1000.0,
                schedule[schedule_idx].cmd
            );
            race.apply_control(&schedule[schedule_idx].cmd);
            schedule_idx += 1;
        }

        if let Some(rx) = ctrl_rx {
            loop {
                match rx.try_recv() {
                    Ok(cmd) => {
                        info!("Race control at {:.3}s: {:?}", race.clock.time / 1000.0, cmd);
                        race.apply_control(&cmd)
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        ctrl_rx = None;
                        break;
                    }
                }
            }
        }

        // a stop command ends the race before the next time step
        if race.get_stopped() {
            break;
        }

        // simulate time step
        let events = race.simulate_timestep(timestep_size)?;
        write_events(&events, event_output)?;

        // print debug information if indicated
        if print_debug && race.clock.lap > lap_leader_prev {
            let order: Vec<String> = race
                .snapshot()
                .get_drivers_by_position()
                .iter()
                .map(|driver| driver.id.to_owned())
                .collect();
            debug!("Lap {}: {}", race.clock.lap, order.join(", "));
            lap_leader_prev = race.clock.lap;
        }

        // without consumer (none inserted or disconnected) the race is simulated as fast as
        // possible
        if tx.is_none() {
            continue;
        }

        // REAL-TIME SIMULATION --------------------------------------------------------------------
        unsent_events.extend(events);

        // print status (with a maximum of 1 Hz)
        if race.clock.time > t_race_update_print + 999.9 {
            info!(
                "Simulating... Current race time is {:.3}s, current lap is {}",
                race.clock.time / 1000.0,
                race.clock.lap
            );
            t_race_update_print = race.clock.time;

            if let Some(avg) = tick_durations.get_avg() {
                debug!("Average calculation time per time step: {:.0}us", avg)
            }
        }

        // update consumer
        if let Some(sender) = tx {
            if race.clock.time > t_race_update_feed + 1000.0 / MAX_UPDATE_FREQUENCY - 0.001 {
                let update = RaceUpdate::new(
                    race.snapshot(),
                    std::mem::take(&mut unsent_events),
                    race.get_recent_events(),
                )?;

                match sender.try_send(update) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        no_dropped_updates += 1;
                        debug!(
                            "Consumer lags behind, dropped update ({} in total)",
                            no_dropped_updates
                        )
                    }
                    Err(TrySendError::Disconnected(_)) => {
                        warn!("Consumer disconnected, continuing the race without it!");
                        tx = None;
                    }
                }
                t_race_update_feed = race.clock.time;
            }
        }

        if tx.is_none() {
            continue;
        }

        // sleep until time step is finished in real-time as well (calculation in ms)
        tick_durations.push(t_start.elapsed().as_micros() as u32);

        let t_sleep =
            (timestep_size / realtime_factor) as i64 - t_start.elapsed().as_millis() as i64;

        if t_sleep > 0 {
            sleep(Duration::from_millis(t_sleep as u64));
        } else {
            warn!("Could not keep up with real-time!")
        }
    }

    // send final update such that the consumer sees the end of the race
    if let Some(sender) = tx {
        let update = RaceUpdate::new(race.snapshot(), unsent_events, race.get_recent_events())?;

        if sender.send_timeout(update, Duration::from_secs(1)).is_err() {
            warn!("Could not deliver the final update to the consumer!")
        }
    }

    if no_dropped_updates > 0 {
        info!(
            "{} updates were dropped since the consumer lagged behind",
            no_dropped_updates
        )
    }

    Ok(race.get_race_result())
}

/// write_events writes the events of a time step according to the selected event output.
fn write_events(events: &[Event], event_output: EventOutput) -> anyhow::Result<()> {
    match event_output {
        EventOutput::Silent => {}
        EventOutput::Log => {
            for event in events.iter() {
                info!("{}", event)
            }
        }
        EventOutput::Json => {
            for event in events.iter() {
                println!(
                    "{}",
                    serde_json::to_string(event).context("Failed to serialize event!")?
                )
            }
        }
    }
    Ok(())
}
