use std::{fs, path::Path, time::Duration};

use hungry_worm_core::{
    LevelLayout, SessionRules, DEFAULT_RESPAWN_DELAY, DEFAULT_TIME_PER_MOVE,
};
use serde::Deserialize;
use tracing::debug;

use crate::{parse_markers, parse_walls, LevelError, TileLayers};

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Level description as authored on disk.
///
/// Timings are stored in seconds. Missing timings fall back to the defaults
/// exposed by the core crate.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LevelAsset {
    name: String,
    #[serde(default)]
    time_per_move: Option<f64>,
    #[serde(default)]
    respawn_delay: Option<f64>,
    #[serde(default)]
    fruit_goal: Option<u32>,
    layers: TileLayers,
}

impl LevelAsset {
    /// Parses a level from TOML source.
    pub fn from_toml_str(contents: &str) -> Result<Self, LevelError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses the level stored at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let asset = Self::from_toml_str(&contents)?;
        debug!(name = %asset.name, path = %path.display(), "level asset loaded");
        Ok(asset)
    }

    /// Display name of the level.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds the validated marker and wall layout.
    pub fn layout(&self) -> Result<LevelLayout, LevelError> {
        let markers = parse_markers(&self.layers)?;
        let walls = parse_walls(&self.layers)?;
        debug!(
            name = %self.name,
            columns = walls.columns(),
            rows = walls.rows(),
            spawn_points = markers.spawn_points().len(),
            fruit_points = markers.fruit_points().len(),
            hazard_points = markers.hazard_points().len(),
            "level layout parsed"
        );
        Ok(LevelLayout::new(markers, walls))
    }

    /// Builds the session rules, validating the authored timings.
    pub fn rules(&self) -> Result<SessionRules, LevelError> {
        let time_per_move = seconds("time_per_move", self.time_per_move, DEFAULT_TIME_PER_MOVE)?;
        let respawn_delay = seconds("respawn_delay", self.respawn_delay, DEFAULT_RESPAWN_DELAY)?;
        Ok(SessionRules::new(
            time_per_move,
            respawn_delay,
            self.fruit_goal,
        ))
    }
}

fn seconds(
    field: &'static str,
    value: Option<f64>,
    default: Duration,
) -> Result<Duration, LevelError> {
    let Some(value) = value else {
        return Ok(default);
    };

    let nanos = (value * NANOS_PER_SECOND).round();
    if !nanos.is_finite() || nanos < 1.0 || nanos > u64::MAX as f64 {
        return Err(LevelError::InvalidTiming { field, value });
    }
    Ok(Duration::from_nanos(nanos as u64))
}
