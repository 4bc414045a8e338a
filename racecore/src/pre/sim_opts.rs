use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    author = "Alexander Heilmeier <alexander.heilmeier@tum.de>",
    name = "RACECORE",
    about = "A race-event simulation core feeding live race dashboards"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug printing of the race order at every new lap of the leader
    #[clap(short, long)]
    pub debug: bool,

    /// Activate the live feed (race is then simulated in real-time with the inserted real-time
    /// factor, events are printed by a separate subscriber, race control commands are read from
    /// stdin)
    #[clap(short, long)]
    pub feed: bool,

    /// Print events as JSON lines instead of log messages
    #[clap(short, long)]
    pub json: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set number of simulation runs (must be one in case the live feed is activated)
    #[clap(short, long, default_value = "1")]
    pub no_sim_runs: u32,

    /// Set path to the simulation parameter file
    #[clap(short, long)]
    pub parfile_path: PathBuf,

    /// Set real-time factor (only relevant in case the live feed is activated)
    #[clap(short, long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Override the seed of the parameter file (runs of a batch use consecutive seeds)
    #[clap(short, long)]
    pub seed: Option<u64>,

    /// Set simulation timestep size in milliseconds, should be in the range [1.0, 1000.0]
    #[clap(short, long, default_value = "200.0")]
    pub timestep_size: f64,
}
