#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level marker extraction and the TOML level asset loader.
//!
//! A level is authored as two glyph layers of equal size. The `markers` layer
//! carries spawn (`S`), fruit (`F`) and hazard (`H`) points, the `walls` layer
//! carries impassable cells (`#`). Both use `.` or a space for empty cells.

mod asset;

use std::{
    collections::{BTreeMap, BTreeSet},
    path::PathBuf,
};

use hungry_worm_core::{Cell, LevelMarkerSet, MarkerSetError, WallGeometry};
use serde::Deserialize;
use thiserror::Error;

pub use asset::LevelAsset;

/// Name of the layer carrying spawn, fruit and hazard markers.
pub const MARKER_LAYER: &str = "markers";
/// Name of the layer carrying wall tiles.
pub const WALL_LAYER: &str = "walls";

/// Errors raised while reading or validating a level.
#[derive(Debug, Error)]
pub enum LevelError {
    /// A required layer is absent from the level.
    #[error("level is missing the `{layer}` layer")]
    MissingLayer {
        /// Name of the missing layer.
        layer: &'static str,
    },
    /// A row is ragged or the two layers disagree on their size.
    #[error("layer `{layer}` row {row} is {found} cells wide, expected {expected}")]
    DimensionMismatch {
        /// Layer whose row does not match.
        layer: &'static str,
        /// Zero-based row index.
        row: usize,
        /// Expected width of the row.
        expected: usize,
        /// Width actually found.
        found: usize,
    },
    /// A layer contains a glyph it does not understand.
    #[error("layer `{layer}` has unknown glyph {glyph:?} at {cell:?}")]
    UnknownGlyph {
        /// Layer containing the glyph.
        layer: &'static str,
        /// Offending glyph.
        glyph: char,
        /// Cell of the glyph.
        cell: Cell,
    },
    /// A marker sits on a wall tile.
    #[error("marker at {cell:?} is placed on a wall")]
    MarkerOnWall {
        /// Cell carrying both a marker and a wall.
        cell: Cell,
    },
    /// The level defines no creature spawn point.
    #[error("level defines no spawn points")]
    NoSpawnPoints,
    /// The level defines no fruit point.
    #[error("level defines no fruit points")]
    NoFruitPoints,
    /// Marker sets could not be assembled.
    #[error(transparent)]
    Markers(#[from] MarkerSetError),
    /// A timing value is zero, negative or not finite.
    #[error("`{field}` must be a positive number of seconds, got {value}")]
    InvalidTiming {
        /// Name of the offending setting.
        field: &'static str,
        /// Value found in the level.
        value: f64,
    },
    /// The level file could not be read.
    #[error("failed to read level at {}", .path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The level document is not valid TOML for a level.
    #[error("failed to parse level toml contents")]
    Parse(#[from] toml::de::Error),
}

/// Named glyph layers of a level, each a list of rows from top to bottom.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TileLayers {
    layers: BTreeMap<String, Vec<String>>,
}

impl TileLayers {
    /// Creates an empty layer collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a layer.
    #[must_use]
    pub fn with_layer<I, S>(mut self, name: &str, rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let _ = self
            .layers
            .insert(name.to_owned(), rows.into_iter().map(Into::into).collect());
        self
    }

    /// Rows of the named layer, if present.
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&[String]> {
        self.layers.get(name).map(Vec::as_slice)
    }
}

/// Extracts the spawn, fruit and hazard points of a level.
///
/// The wall layer is read as well so markers placed on walls are rejected.
pub fn parse_markers(layers: &TileLayers) -> Result<LevelMarkerSet, LevelError> {
    let (markers, walls) = checked_layers(layers)?;

    let mut spawn = BTreeSet::new();
    let mut fruit = BTreeSet::new();
    let mut hazard = BTreeSet::new();
    for (cell, glyph) in glyphs(markers) {
        let set = match glyph {
            'S' => &mut spawn,
            'F' => &mut fruit,
            'H' => &mut hazard,
            '.' | ' ' => continue,
            glyph => {
                return Err(LevelError::UnknownGlyph {
                    layer: MARKER_LAYER,
                    glyph,
                    cell,
                })
            }
        };
        if is_wall_glyph(walls, cell) {
            return Err(LevelError::MarkerOnWall { cell });
        }
        let _ = set.insert(cell);
    }

    if spawn.is_empty() {
        return Err(LevelError::NoSpawnPoints);
    }
    if fruit.is_empty() {
        return Err(LevelError::NoFruitPoints);
    }

    Ok(LevelMarkerSet::new(spawn, fruit, hazard)?)
}

/// Extracts the wall geometry of a level.
pub fn parse_walls(layers: &TileLayers) -> Result<WallGeometry, LevelError> {
    let (_, walls) = checked_layers(layers)?;

    let mut cells = BTreeSet::new();
    for (cell, glyph) in glyphs(walls) {
        match glyph {
            '#' => {
                let _ = cells.insert(cell);
            }
            '.' | ' ' => {}
            glyph => {
                return Err(LevelError::UnknownGlyph {
                    layer: WALL_LAYER,
                    glyph,
                    cell,
                })
            }
        }
    }

    let rows = walls.len();
    let columns = walls.first().map_or(0, |row| row.chars().count());
    Ok(WallGeometry::new(
        grid_extent(columns),
        grid_extent(rows),
        cells,
    ))
}

fn checked_layers(layers: &TileLayers) -> Result<(&[String], &[String]), LevelError> {
    let markers = layers
        .layer(MARKER_LAYER)
        .ok_or(LevelError::MissingLayer {
            layer: MARKER_LAYER,
        })?;
    let walls = layers
        .layer(WALL_LAYER)
        .ok_or(LevelError::MissingLayer { layer: WALL_LAYER })?;

    check_rectangular(MARKER_LAYER, markers)?;
    check_rectangular(WALL_LAYER, walls)?;

    let rows = markers.len().max(walls.len());
    for row in 0..rows {
        let expected = markers.get(row).map_or(0, |line| line.chars().count());
        let found = walls.get(row).map_or(0, |line| line.chars().count());
        if expected != found {
            return Err(LevelError::DimensionMismatch {
                layer: WALL_LAYER,
                row,
                expected,
                found,
            });
        }
    }

    Ok((markers, walls))
}

fn check_rectangular(layer: &'static str, rows: &[String]) -> Result<(), LevelError> {
    let Some(expected) = rows.first().map(|row| row.chars().count()) else {
        return Ok(());
    };

    for (row, line) in rows.iter().enumerate() {
        let found = line.chars().count();
        if found != expected {
            return Err(LevelError::DimensionMismatch {
                layer,
                row,
                expected,
                found,
            });
        }
    }
    Ok(())
}

fn glyphs(rows: &[String]) -> impl Iterator<Item = (Cell, char)> + '_ {
    rows.iter().enumerate().flat_map(|(row, line)| {
        line.chars()
            .enumerate()
            .map(move |(column, glyph)| (grid_cell(column, row), glyph))
    })
}

fn is_wall_glyph(walls: &[String], cell: Cell) -> bool {
    let (Ok(row), Ok(column)) = (usize::try_from(cell.row()), usize::try_from(cell.column()))
    else {
        return false;
    };
    walls
        .get(row)
        .and_then(|line| line.chars().nth(column))
        .map_or(false, |glyph| glyph == '#')
}

fn grid_cell(column: usize, row: usize) -> Cell {
    Cell::new(grid_index(column), grid_index(row))
}

fn grid_index(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn grid_extent(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layers(markers: &[&str], walls: &[&str]) -> TileLayers {
        TileLayers::new()
            .with_layer(MARKER_LAYER, markers.iter().copied())
            .with_layer(WALL_LAYER, walls.iter().copied())
    }

    #[test]
    fn markers_are_read_by_glyph() {
        let layers = layers(
            &["S...", ".F.H", "...F"],
            &["....", "....", "...."],
        );

        let markers = parse_markers(&layers).expect("valid markers");

        assert_eq!(
            markers.spawn_points().iter().copied().collect::<Vec<_>>(),
            vec![Cell::new(0, 0)]
        );
        assert_eq!(
            markers.fruit_points().iter().copied().collect::<Vec<_>>(),
            vec![Cell::new(1, 1), Cell::new(3, 2)]
        );
        assert_eq!(
            markers.hazard_points().iter().copied().collect::<Vec<_>>(),
            vec![Cell::new(3, 1)]
        );
    }

    #[test]
    fn walls_are_read_with_grid_size() {
        let layers = layers(&["S.F", "...", "..."], &["###", "#..", "..#"]);

        let walls = parse_walls(&layers).expect("valid walls");

        assert_eq!(walls.columns(), 3);
        assert_eq!(walls.rows(), 3);
        assert_eq!(walls.cells().len(), 5);
        assert!(walls.blocks(Cell::new(2, 2)));
        assert!(!walls.blocks(Cell::new(1, 1)));
    }

    #[test]
    fn missing_layer_is_reported() {
        let layers = TileLayers::new().with_layer(MARKER_LAYER, ["SF"]);

        assert!(matches!(
            parse_markers(&layers),
            Err(LevelError::MissingLayer { layer: WALL_LAYER })
        ));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let layers = layers(&["S.F", ".."], &["...", "..."]);

        assert!(matches!(
            parse_markers(&layers),
            Err(LevelError::DimensionMismatch {
                layer: MARKER_LAYER,
                row: 1,
                expected: 3,
                found: 2,
            })
        ));
    }

    #[test]
    fn layers_of_different_height_are_rejected() {
        let layers = layers(&["S.F"], &["...", "..."]);

        assert!(matches!(
            parse_walls(&layers),
            Err(LevelError::DimensionMismatch { row: 1, .. })
        ));
    }

    #[test]
    fn unknown_glyph_is_reported_with_cell() {
        let layers = layers(&["S.F", ".x."], &["...", "..."]);

        match parse_markers(&layers) {
            Err(LevelError::UnknownGlyph { layer, glyph, cell }) => {
                assert_eq!(layer, MARKER_LAYER);
                assert_eq!(glyph, 'x');
                assert_eq!(cell, Cell::new(1, 1));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn marker_on_wall_is_rejected() {
        let layers = layers(&["S.F", "..H"], &["...", "..#"]);

        assert!(matches!(
            parse_markers(&layers),
            Err(LevelError::MarkerOnWall { cell }) if cell == Cell::new(2, 1)
        ));
    }

    #[test]
    fn spawn_and_fruit_points_are_required() {
        assert!(matches!(
            parse_markers(&layers(&["..F"], &["..."])),
            Err(LevelError::NoSpawnPoints)
        ));
        assert!(matches!(
            parse_markers(&layers(&["S.H"], &["..."])),
            Err(LevelError::NoFruitPoints)
        ));
    }
}
