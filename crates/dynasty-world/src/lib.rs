//! Grid geography for the Dynasty kernel.
//!
//! The kernel consumes the world through the [`WorldQuery`] trait: bounds,
//! passability, neighbours and random spawn tiles. [`GridMap`] is the
//! rectangular implementation the engine ships with.
//!
//! # Modules
//!
//! - [`query`] -- The [`WorldQuery`] trait.
//! - [`grid`] -- [`GridMap`]: open and blocked tiles, seeded scattering,
//!   ASCII parsing.
//! - [`error`] -- Error types for map construction.

pub mod error;
pub mod grid;
pub mod query;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use grid::GridMap;
pub use query::WorldQuery;
