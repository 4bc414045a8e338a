use crate::core::events::Event;
use crate::core::snapshot::Snapshot;
use anyhow::Context;
use serde::Serialize;

/// (Hz) Maximum frequency (in race time) with which updates are sent to consumers
pub const MAX_UPDATE_FREQUENCY: f64 = 20.0;

/// Capacity of the update channel, updates are dropped if a consumer lags behind
pub const UPDATE_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// parse_color converts a hex color to a rgb color.
pub fn parse_color(color: &str) -> anyhow::Result<RgbColor> {
    let tmp_color = color
        .parse::<css_color_parser::Color>()
        .context(format!("Could not parse hex color {}!", color))?;

    Ok(RgbColor {
        r: tmp_color.r,
        g: tmp_color.g,
        b: tmp_color.b,
    })
}

/// RaceUpdate is sent to consumers (renderers, commentary) after a time step. It is a read-only
/// view model.
///
/// * `snapshot` - Race state after the time step
/// * `colors` - Driver colors in the order of snapshot.drivers
/// * `events` - Events created since the previous update
/// * `recent_events` - Last events of the race, newest first (bounded)
#[derive(Debug, Clone, Serialize)]
pub struct RaceUpdate {
    pub snapshot: Snapshot,
    pub colors: Vec<RgbColor>,
    pub events: Vec<Event>,
    pub recent_events: Vec<Event>,
}

impl RaceUpdate {
    pub fn new(
        snapshot: Snapshot,
        events: Vec<Event>,
        recent_events: Vec<Event>,
    ) -> anyhow::Result<RaceUpdate> {
        let colors = snapshot
            .drivers
            .iter()
            .map(|driver| parse_color(&driver.color))
            .collect::<anyhow::Result<Vec<RgbColor>>>()?;

        Ok(RaceUpdate {
            snapshot,
            colors,
            events,
            recent_events,
        })
    }
}
