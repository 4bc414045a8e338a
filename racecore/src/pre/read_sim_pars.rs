use crate::core::driver::DriverPars;
use crate::core::race::RacePars;
use crate::core::race_control::ControlEntry;
use crate::core::track::TrackPars;
use anyhow::Context;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::Path;

/// SimPars is used to store all other parameter structs. The driver roster is given in grid
/// order, race_control contains scheduled runtime toggles (optional).
#[derive(Debug, Deserialize, Clone)]
pub struct SimPars {
    pub race_pars: RacePars,
    pub track_pars: TrackPars,
    pub driver_pars_all: Vec<DriverPars>,
    #[serde(default)]
    pub race_control: Vec<ControlEntry>,
}

/// read_sim_pars reads the JSON file and decodes the JSON string into the simulation parameters
/// struct.
pub fn read_sim_pars(filepath: &Path) -> anyhow::Result<SimPars> {
    // open file
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;

    // read and parse parameter file content
    let pars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    Ok(pars)
}

/// parse_sim_pars decodes simulation parameters from a JSON string.
pub fn parse_sim_pars(json: &str) -> anyhow::Result<SimPars> {
    serde_json::from_str(json).context("Failed to parse simulation parameters!")
}
