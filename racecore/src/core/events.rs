use serde::{Deserialize, Serialize};
use std::fmt;

/// EventKind contains the type-specific payload of an event. Drivers are referenced by id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Overtake {
        overtaker: String,
        overtaken: String,
        position: u32,
    },
    Collision {
        agents: [String; 2],
        lap: u32,
    },
    PitStop {
        agent_id: String,
        lap: u32,
        fuel: f64,
    },
    PitComplete {
        agent_id: String,
        lap: u32,
        t_standstill: f64,
    },
    LapComplete {
        agent_id: String,
        lap: u32,
        lap_time: f64,
        best_lap: bool,
    },
    BoostUsed {
        agent_id: String,
        boosts_left: u32,
    },
    AgentFinished {
        agent_id: String,
        final_position: u32,
        total_time: f64,
    },
    Crash {
        agent_id: String,
        lap: u32,
    },
    System {
        message: String,
    },
}

impl EventKind {
    /// get_priority returns the display priority of the event (lower values first) that is used to
    /// order the events created within a single time step.
    pub fn get_priority(&self) -> u8 {
        match self {
            EventKind::AgentFinished { .. } => 0,
            EventKind::Collision { .. } | EventKind::Crash { .. } => 1,
            EventKind::Overtake { .. } => 2,
            EventKind::LapComplete { best_lap: true, .. } => 3,
            EventKind::BoostUsed { .. }
            | EventKind::PitStop { .. }
            | EventKind::PitComplete { .. } => 4,
            EventKind::LapComplete { .. } => 5,
            EventKind::System { .. } => 6,
        }
    }

    /// get_agent_id returns the id of the driver the event belongs to (the overtaker in case of an
    /// overtake, none for collisions and system events).
    pub fn get_agent_id(&self) -> Option<&str> {
        match self {
            EventKind::Overtake { overtaker, .. } => Some(overtaker.as_str()),
            EventKind::PitStop { agent_id, .. }
            | EventKind::PitComplete { agent_id, .. }
            | EventKind::LapComplete { agent_id, .. }
            | EventKind::BoostUsed { agent_id, .. }
            | EventKind::AgentFinished { agent_id, .. }
            | EventKind::Crash { agent_id, .. } => Some(agent_id.as_str()),
            EventKind::Collision { .. } | EventKind::System { .. } => None,
        }
    }
}

/// Event is an immutable record of something notable that happened within a time step.
///
/// * `seq` - Sequence number, assigned when the event is recorded by the race (strictly increasing
/// in creation order)
/// * `time` - (ms) Race time at the end of the time step in which the event was created
/// * `kind` - Type and payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub seq: u64,
    pub time: f64,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn new(time: f64, kind: EventKind) -> Event {
        Event { seq: 0, time, kind }
    }
}

/// format_laptime converts a time in ms into the usual m:ss.sss representation.
pub fn format_laptime(t: f64) -> String {
    let t_ms = t.round().max(0.0) as u64;
    format!("{}:{:02}.{:03}", t_ms / 60000, t_ms / 1000 % 60, t_ms % 1000)
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventKind::Overtake {
                overtaker,
                overtaken,
                position,
            } => write!(f, "OVERTAKE  {} passes {} for P{}", overtaker, overtaken, position),
            EventKind::Collision { agents, lap } => write!(
                f,
                "COLLISION {} and {} in lap {}",
                agents[0], agents[1], lap
            ),
            EventKind::PitStop { agent_id, lap, fuel } => write!(
                f,
                "PIT       {} enters the pits after lap {} ({:.1}% fuel)",
                agent_id, lap, fuel
            ),
            EventKind::PitComplete {
                agent_id,
                t_standstill,
                ..
            } => write!(
                f,
                "PIT OUT   {} leaves the pits ({:.1}s standstill)",
                agent_id,
                t_standstill / 1000.0
            ),
            EventKind::LapComplete {
                agent_id,
                lap,
                lap_time,
                best_lap,
            } => write!(
                f,
                "LAP       {} lap {} in {}{}",
                agent_id,
                lap,
                format_laptime(*lap_time),
                if *best_lap { " (personal best)" } else { "" }
            ),
            EventKind::BoostUsed {
                agent_id,
                boosts_left,
            } => write!(f, "BOOST     {} ({} left)", agent_id, boosts_left),
            EventKind::AgentFinished {
                agent_id,
                final_position,
                total_time,
            } => write!(
                f,
                "FINISH    {} finishes P{} ({})",
                agent_id,
                final_position,
                format_laptime(*total_time)
            ),
            EventKind::Crash { agent_id, lap } => {
                write!(f, "CRASH     {} out of the race in lap {}", agent_id, lap)
            }
            EventKind::System { message } => write!(f, "SYSTEM    {}", message),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{:>10}] {}", format_laptime(self.time), self.kind)
    }
}
