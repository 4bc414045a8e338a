use crate::core::events::format_laptime;
use log::info;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Finished,
    Running,
    Retired,
}

/// ClassificationEntry contains the result of a single driver.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationEntry {
    pub position: u32,
    pub id: String,
    pub name: String,
    pub team: String,
    pub compl_laps: u32,
    pub race_time: f64,
    pub best_laptime: Option<f64>,
    pub status: DriverStatus,
}

/// RaceResult contains all race information that is required for post-processing the results.
/// laptimes are given in the order of the classification.
#[derive(Debug, Clone, Serialize)]
pub struct RaceResult {
    pub track: String,
    pub tot_no_laps: u32,
    pub classification: Vec<ClassificationEntry>,
    pub laptimes: Vec<Vec<f64>>,
    pub no_events: u64,
    pub stopped: bool,
}

impl RaceResult {
    /// get_winner returns the id of the driver that won the race (none if nobody finished).
    pub fn get_winner(&self) -> Option<&str> {
        self.classification
            .first()
            .filter(|entry| entry.status == DriverStatus::Finished)
            .map(|entry| entry.id.as_str())
    }

    /// get_fastest_lap returns the id of the driver with the fastest lap and the lap time.
    pub fn get_fastest_lap(&self) -> Option<(&str, f64)> {
        self.classification
            .iter()
            .filter_map(|entry| entry.best_laptime.map(|t| (entry.id.as_str(), t)))
            .fold(None, |best: Option<(&str, f64)>, cur| match best {
                Some(best) if best.1 <= cur.1 => Some(best),
                _ => Some(cur),
            })
    }

    /// print_classification prints the final classification to the log.
    pub fn print_classification(&self) {
        let winner_time = self
            .classification
            .first()
            .map(|entry| entry.race_time)
            .unwrap_or(0.0);

        let mut tmp_string = String::new();

        for entry in self.classification.iter() {
            let gap = match entry.status {
                DriverStatus::Retired => "DNF".to_owned(),
                DriverStatus::Running => "running".to_owned(),
                DriverStatus::Finished if entry.position == 1 => format_laptime(entry.race_time),
                DriverStatus::Finished if entry.compl_laps < self.tot_no_laps => {
                    format!("+{} lap(s)", self.tot_no_laps - entry.compl_laps)
                }
                DriverStatus::Finished => {
                    format!("+{:.3}s", (entry.race_time - winner_time) / 1000.0)
                }
            };

            let best = entry
                .best_laptime
                .map_or_else(|| "-".to_owned(), format_laptime);

            writeln!(
                &mut tmp_string,
                "{:3}. {:5} {:24} {:16} {:3} laps {:>12}  best {}",
                entry.position, entry.id, entry.name, entry.team, entry.compl_laps, gap, best
            )
            .unwrap();
        }

        info!(
            "RESULT: Classification {} ({} laps{})\n{}",
            self.track,
            self.tot_no_laps,
            if self.stopped { ", stopped" } else { "" },
            tmp_string
        );

        if let Some((id, t)) = self.get_fastest_lap() {
            info!("RESULT: Fastest lap {} {}", id, format_laptime(t));
        }
    }

    /// print_lap_times prints the lap times of all drivers to the log.
    pub fn print_lap_times(&self) {
        let mut tmp_string = String::from("lap, ");

        for (i, entry) in self.classification.iter().enumerate() {
            if i < self.classification.len() - 1 {
                write!(&mut tmp_string, "{:>9}, ", entry.id).unwrap();
            } else {
                writeln!(&mut tmp_string, "{:>9}", entry.id).unwrap();
            }
        }

        let max_no_laps = self.laptimes.iter().map(|x| x.len()).max().unwrap_or(0);

        for lap in 0..max_no_laps {
            write!(&mut tmp_string, "{:3}, ", lap + 1).unwrap();

            for (i, laptimes) in self.laptimes.iter().enumerate() {
                let laptime = laptimes
                    .get(lap)
                    .map_or_else(|| "-".to_owned(), |&t| format_laptime(t));

                if i < self.laptimes.len() - 1 {
                    write!(&mut tmp_string, "{:>9}, ", laptime).unwrap();
                } else {
                    writeln!(&mut tmp_string, "{:>9}", laptime).unwrap();
                }
            }
        }

        info!("RESULT: Lap times\n{}", tmp_string);
    }
}
