//! The query interface the kernel consumes from the world.
//!
//! The kernel never owns terrain. It asks a [`WorldQuery`] whether a tile is
//! inside the map and walkable, which tiles border a position, and for a
//! random walkable tile when spawning. Character occupancy is kernel state
//! and is passed in where it matters.

use std::collections::BTreeSet;

use rand::RngCore;

use dynasty_types::{Direction, Position};

/// Pure, read-only queries against the world map.
pub trait WorldQuery {
    /// Human-readable map name.
    fn name(&self) -> &str;

    /// Whether `position` lies inside the map.
    fn in_bounds(&self, position: Position) -> bool;

    /// Whether the terrain at `position` can be walked on. Out-of-bounds
    /// positions are never passable.
    fn is_passable(&self, position: Position) -> bool;

    /// A uniformly random passable tile not in `occupied`, or `None` if
    /// every passable tile is taken.
    fn random_passable(
        &self,
        rng: &mut dyn RngCore,
        occupied: &BTreeSet<Position>,
    ) -> Option<Position>;

    /// In-bounds tiles one orthogonal step from `position`, in
    /// [`Direction::ALL`] order.
    fn neighbors(&self, position: Position) -> Vec<Position> {
        Direction::ALL
            .into_iter()
            .filter_map(|direction| position.step(direction))
            .filter(|neighbor| self.in_bounds(*neighbor))
            .collect()
    }

    /// Passable tiles one orthogonal step from `position` not in `occupied`.
    fn open_neighbors(&self, position: Position, occupied: &BTreeSet<Position>) -> Vec<Position> {
        self.neighbors(position)
            .into_iter()
            .filter(|neighbor| self.is_passable(*neighbor) && !occupied.contains(neighbor))
            .collect()
    }
}
