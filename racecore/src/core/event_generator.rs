use crate::core::driver::{DriverState, PitState};
use crate::core::events::{Event, EventKind};
use crate::core::snapshot::Snapshot;
use std::collections::HashMap;

/// * `collision_threshold` - (%) Two drivers on track collide if the distance between their lap
/// progresses is smaller or equal
#[derive(Debug, Clone)]
pub struct GeneratorPars {
    pub collision_threshold: f64,
}

/// observe compares two consecutive snapshots and returns the events that happened in between.
/// The function is pure: everything it needs is contained in the two snapshots. The returned
/// events carry the race time of the current snapshot and are sorted by their priority (stable,
/// i.e. events of equal priority keep their creation order).
pub fn observe(prev: &Snapshot, cur: &Snapshot, gen_pars: &GeneratorPars) -> Vec<Event> {
    let mut kinds: Vec<EventKind> = vec![];

    let prev_drivers: HashMap<&str, &DriverState> = prev
        .drivers
        .iter()
        .map(|driver| (driver.id.as_str(), driver))
        .collect();

    // pairs of drivers contained in both snapshots
    let pairs: Vec<(&DriverState, &DriverState)> = cur
        .drivers
        .iter()
        .filter_map(|driver| {
            prev_drivers
                .get(driver.id.as_str())
                .map(|&driver_prev| (driver_prev, driver))
        })
        .collect();

    for &(driver_prev, driver_cur) in pairs.iter() {
        kinds.extend(observe_driver(driver_prev, driver_cur, cur.race.lap));
    }

    kinds.extend(observe_overtakes(&pairs));
    kinds.extend(observe_collisions(&pairs, cur.race.lap, gen_pars.collision_threshold));
    kinds.extend(observe_race(prev, cur));

    // stable sort by priority
    kinds.sort_by_key(|kind| kind.get_priority());

    kinds
        .into_iter()
        .map(|kind| Event::new(cur.race.time, kind))
        .collect()
}

// -------------------------------------------------------------------------------------------------
// RULES -------------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------

/// observe_driver creates the per-driver events. Drivers that already finished or retired in the
/// previous snapshot do not create any further events.
fn observe_driver(prev: &DriverState, cur: &DriverState, lap: u32) -> Vec<EventKind> {
    let mut kinds = vec![];

    if !prev.is_running() {
        return kinds;
    }

    if cur.compl_laps > prev.compl_laps {
        if let Some(lap_time) = cur.last_laptime {
            kinds.push(EventKind::LapComplete {
                agent_id: cur.id.to_owned(),
                lap: cur.compl_laps,
                lap_time,
                best_lap: prev.best_laptime.map_or(true, |best| lap_time < best),
            })
        }
    }

    if cur.finished {
        kinds.push(EventKind::AgentFinished {
            agent_id: cur.id.to_owned(),
            final_position: cur.position,
            total_time: cur.race_time,
        });
    }

    if cur.retired {
        kinds.push(EventKind::Crash {
            agent_id: cur.id.to_owned(),
            lap,
        });
    }

    match (prev.pit_state, cur.pit_state) {
        (PitState::Racing, PitState::Pitting) => kinds.push(EventKind::PitStop {
            agent_id: cur.id.to_owned(),
            lap: cur.compl_laps,
            fuel: cur.fuel,
        }),
        (PitState::Pitting, PitState::Racing) => kinds.push(EventKind::PitComplete {
            agent_id: cur.id.to_owned(),
            lap: cur.compl_laps,
            t_standstill: cur.t_last_standstill,
        }),
        _ => {}
    }

    if cur.boosts_left < prev.boosts_left {
        kinds.push(EventKind::BoostUsed {
            agent_id: cur.id.to_owned(),
            boosts_left: cur.boosts_left,
        })
    }

    kinds
}

/// observe_overtakes creates an overtake event for every pair of drivers whose relative order
/// changed. Pairs are skipped if one of the drivers already finished or retired before, or retired
/// within the current step (losing positions by retiring is not an overtake).
fn observe_overtakes(pairs: &[(&DriverState, &DriverState)]) -> Vec<EventKind> {
    let mut kinds = vec![];

    for i in 0..pairs.len() {
        for j in i + 1..pairs.len() {
            let (a_prev, a_cur) = pairs[i];
            let (b_prev, b_cur) = pairs[j];

            if !(a_prev.is_running() && b_prev.is_running()) || a_cur.retired || b_cur.retired {
                continue;
            }

            let (winner, loser) = if a_prev.position > b_prev.position
                && a_cur.position < b_cur.position
            {
                (a_cur, b_cur)
            } else if b_prev.position > a_prev.position && b_cur.position < a_cur.position {
                (b_cur, a_cur)
            } else {
                continue;
            };

            kinds.push(EventKind::Overtake {
                overtaker: winner.id.to_owned(),
                overtaken: loser.id.to_owned(),
                position: winner.position,
            });
        }
    }

    // present overtakes from the front to the back
    kinds.sort_by_key(|kind| match kind {
        EventKind::Overtake { position, .. } => *position,
        _ => 0,
    });

    kinds
}

/// check_overlap checks if two drivers are on track and within the collision threshold of each
/// other (circular distance of the lap progresses, lapping included).
fn check_overlap(a: &DriverState, b: &DriverState, collision_threshold: f64) -> bool {
    if !(a.on_track() && b.on_track()) {
        return false;
    }

    let delta = (a.progress - b.progress).abs();
    delta.min(100.0 - delta) <= collision_threshold
}

/// observe_collisions creates a collision event when two drivers start to overlap. Drivers that
/// keep overlapping do not create further events until they separated.
fn observe_collisions(
    pairs: &[(&DriverState, &DriverState)],
    lap: u32,
    collision_threshold: f64,
) -> Vec<EventKind> {
    let mut kinds = vec![];

    for i in 0..pairs.len() {
        for j in i + 1..pairs.len() {
            let (a_prev, a_cur) = pairs[i];
            let (b_prev, b_cur) = pairs[j];

            if check_overlap(a_cur, b_cur, collision_threshold)
                && !check_overlap(a_prev, b_prev, collision_threshold)
            {
                let (front, rear) = if a_cur.position < b_cur.position {
                    (a_cur, b_cur)
                } else {
                    (b_cur, a_cur)
                };

                kinds.push(EventKind::Collision {
                    agents: [front.id.to_owned(), rear.id.to_owned()],
                    lap,
                })
            }
        }
    }

    kinds
}

/// observe_race creates system events for changes of the race-level state.
fn observe_race(prev: &Snapshot, cur: &Snapshot) -> Vec<EventKind> {
    let mut messages: Vec<String> = vec![];

    if prev.race.time <= 0.0 && cur.race.time > 0.0 {
        messages.push(format!(
            "Lights out at {}, {} laps to go",
            cur.race.track, cur.race.tot_no_laps
        ))
    }

    if !prev.race.safety_car && cur.race.safety_car {
        messages.push("Safety car deployed".to_owned())
    } else if prev.race.safety_car && !cur.race.safety_car {
        messages.push("Safety car in this lap, racing resumes".to_owned())
    }

    if prev.race.weather != cur.race.weather {
        messages.push(format!(
            "Weather changes to {} ({:.1}°C)",
            cur.race.weather, cur.race.temperature
        ))
    }

    if !prev.race.chequered && cur.race.chequered {
        messages.push("Chequered flag".to_owned())
    }

    if !prev.race.finished && cur.race.finished {
        messages.push("All drivers are back, race over".to_owned())
    }

    messages
        .into_iter()
        .map(|message| EventKind::System { message })
        .collect()
}
