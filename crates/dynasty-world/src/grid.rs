//! A rectangular tile grid with blocked terrain.
//!
//! [`GridMap`] is the default [`WorldQuery`] implementation used by the
//! engine and the tests. Tiles are either open or blocked; rows grow
//! southward and columns grow eastward from `(0, 0)`.
//!
//! Maps can be built empty, scattered with blocked tiles from a seeded RNG,
//! or parsed from ASCII art (`.` open, `#` blocked).

use std::collections::BTreeSet;

use rand::RngCore;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use dynasty_types::Position;

use crate::error::WorldError;
use crate::query::WorldQuery;

/// A rectangular grid of open and blocked tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMap {
    name: String,
    rows: i32,
    cols: i32,
    blocked: BTreeSet<Position>,
}

impl GridMap {
    /// An all-open grid.
    ///
    /// # Errors
    ///
    /// [`WorldError::EmptyGrid`] for a zero dimension,
    /// [`WorldError::TooLarge`] if a dimension exceeds `i32::MAX`.
    pub fn new(name: impl Into<String>, rows: u32, cols: u32) -> Result<Self, WorldError> {
        if rows == 0 || cols == 0 {
            return Err(WorldError::EmptyGrid { rows, cols });
        }
        let too_large = || WorldError::TooLarge { rows, cols };
        Ok(Self {
            name: name.into(),
            rows: i32::try_from(rows).map_err(|_overflow| too_large())?,
            cols: i32::try_from(cols).map_err(|_overflow| too_large())?,
            blocked: BTreeSet::new(),
        })
    }

    /// A grid where each tile is independently blocked with probability
    /// `density`, drawn from `rng`.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new), plus [`WorldError::InvalidDensity`] for a
    /// density outside `[0, 1)`.
    pub fn scattered(
        name: impl Into<String>,
        rows: u32,
        cols: u32,
        density: f64,
        rng: &mut dyn RngCore,
    ) -> Result<Self, WorldError> {
        if !(0.0..1.0).contains(&density) {
            return Err(WorldError::InvalidDensity(density));
        }
        let mut map = Self::new(name, rows, cols)?;
        let tiles: Vec<Position> = map.positions().collect();
        for tile in tiles {
            if rand::Rng::random_bool(rng, density) {
                map.blocked.insert(tile);
            }
        }
        debug!(
            map = %map.name,
            rows,
            cols,
            blocked = map.blocked.len(),
            "scattered grid generated"
        );
        Ok(map)
    }

    /// Parse a grid from ASCII art: one line per row, `.` open, `#` blocked.
    /// Blank lines and surrounding whitespace are ignored.
    ///
    /// # Errors
    ///
    /// [`WorldError::RaggedRow`] if rows differ in width,
    /// [`WorldError::UnknownTile`] for any other character, and the
    /// dimension errors of [`new`](Self::new).
    pub fn from_ascii(name: impl Into<String>, art: &str) -> Result<Self, WorldError> {
        let lines: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let width = lines.first().map_or(0, |line| line.chars().count());
        let mut blocked = BTreeSet::new();

        for (row, line) in lines.iter().enumerate() {
            let actual = line.chars().count();
            if actual != width {
                return Err(WorldError::RaggedRow {
                    row,
                    expected: width,
                    actual,
                });
            }
            for (col, tile) in line.chars().enumerate() {
                match tile {
                    '.' => {}
                    '#' => {
                        let too_large = || WorldError::TooLarge {
                            rows: u32::MAX,
                            cols: u32::MAX,
                        };
                        blocked.insert(Position::new(
                            i32::try_from(row).map_err(|_overflow| too_large())?,
                            i32::try_from(col).map_err(|_overflow| too_large())?,
                        ));
                    }
                    other => return Err(WorldError::UnknownTile(other)),
                }
            }
        }

        let dimension = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        let mut map = Self::new(name, dimension(lines.len()), dimension(width))?;
        map.blocked = blocked;
        Ok(map)
    }

    /// Block or unblock a tile.
    ///
    /// # Errors
    ///
    /// [`WorldError::OutOfBounds`] if `position` is outside the grid.
    pub fn set_blocked(&mut self, position: Position, blocked: bool) -> Result<(), WorldError> {
        if !self.in_bounds(position) {
            return Err(WorldError::OutOfBounds(position));
        }
        if blocked {
            self.blocked.insert(position);
        } else {
            self.blocked.remove(&position);
        }
        Ok(())
    }

    /// Number of rows.
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    /// Number of columns.
    pub const fn cols(&self) -> i32 {
        self.cols
    }

    /// Number of blocked tiles.
    pub fn blocked_count(&self) -> usize {
        self.blocked.len()
    }

    /// Every tile, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| Position::new(row, col)))
    }
}

impl WorldQuery for GridMap {
    fn name(&self) -> &str {
        &self.name
    }

    fn in_bounds(&self, position: Position) -> bool {
        (0..self.rows).contains(&position.row) && (0..self.cols).contains(&position.col)
    }

    fn is_passable(&self, position: Position) -> bool {
        self.in_bounds(position) && !self.blocked.contains(&position)
    }

    fn random_passable(
        &self,
        rng: &mut dyn RngCore,
        occupied: &BTreeSet<Position>,
    ) -> Option<Position> {
        let candidates: Vec<Position> = self
            .positions()
            .filter(|tile| !self.blocked.contains(tile) && !occupied.contains(tile))
            .collect();
        candidates.choose(rng).copied()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn empty_dimensions_rejected() {
        assert!(matches!(
            GridMap::new("void", 0, 4),
            Err(WorldError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn ascii_map_blocks_walls() {
        let map = GridMap::from_ascii(
            "keep",
            "
            ..#
            .#.
            ",
        )
        .unwrap();
        assert_eq!(map.rows(), 2);
        assert_eq!(map.cols(), 3);
        assert!(map.is_passable(Position::new(0, 0)));
        assert!(!map.is_passable(Position::new(0, 2)));
        assert!(!map.is_passable(Position::new(1, 1)));
        assert!(!map.is_passable(Position::new(-1, 0)));
        assert!(!map.is_passable(Position::new(2, 0)));
    }

    #[test]
    fn ragged_ascii_rejected() {
        let result = GridMap::from_ascii("bad", "...\n..");
        assert!(matches!(result, Err(WorldError::RaggedRow { row: 1, .. })));
        assert!(matches!(
            GridMap::from_ascii("bad", ".x."),
            Err(WorldError::UnknownTile('x'))
        ));
    }

    #[test]
    fn neighbors_stay_in_bounds() {
        let map = GridMap::new("field", 3, 3).unwrap();
        assert_eq!(map.neighbors(Position::new(0, 0)).len(), 2);
        assert_eq!(map.neighbors(Position::new(1, 1)).len(), 4);

        let mut occupied = BTreeSet::new();
        occupied.insert(Position::new(0, 1));
        let open = map.open_neighbors(Position::new(0, 0), &occupied);
        assert_eq!(open, vec![Position::new(1, 0)]);
    }

    #[test]
    fn random_passable_avoids_walls_and_occupants() {
        let map = GridMap::from_ascii("corridor", "#..#").unwrap();
        let mut occupied = BTreeSet::new();
        occupied.insert(Position::new(0, 1));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(
                map.random_passable(&mut rng, &occupied),
                Some(Position::new(0, 2))
            );
        }
        occupied.insert(Position::new(0, 2));
        assert_eq!(map.random_passable(&mut rng, &occupied), None);
    }

    #[test]
    fn scattered_is_reproducible_for_a_seed() {
        let a = GridMap::scattered("wild", 12, 12, 0.2, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = GridMap::scattered("wild", 12, 12, 0.2, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
        assert!(matches!(
            GridMap::scattered("wild", 2, 2, 1.5, &mut StdRng::seed_from_u64(1)),
            Err(WorldError::InvalidDensity(_))
        ));
    }

    #[test]
    fn set_blocked_checks_bounds() {
        let mut map = GridMap::new("field", 2, 2).unwrap();
        map.set_blocked(Position::new(1, 1), true).unwrap();
        assert_eq!(map.blocked_count(), 1);
        assert!(map.set_blocked(Position::new(5, 5), true).is_err());
        let json = serde_json::to_string(&map).unwrap();
        let back: GridMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
