//! Error type for kernel operations.
//!
//! [`KernelError`] is what [`SimulationContext`](crate::SimulationContext)
//! returns. Expected terminations (an action whose validity check fails)
//! never surface here; only invariant violations and bad input do.

use dynasty_agents::{AgentError, UnsupportedOperationError};
use dynasty_ledger::{LedgerAnomaly, LedgerError};
use dynasty_types::{CharacterId, Position};
use dynasty_world::WorldError;

use crate::clock::ClockError;
use crate::lineage::LineageError;
use crate::scheduler::SchedulerError;

/// Errors surfaced by the simulation kernel.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// Character-level failure (unknown talent or skill, dead actor).
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    /// Configuration named something the kernel cannot perform.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedOperationError),

    /// A ledger entry failed validation.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Legacy was created or destroyed outside a seed.
    #[error("conservation violated: {0}")]
    Conservation(LedgerAnomaly),

    /// Lineage invariant violated.
    #[error("lineage error: {0}")]
    Lineage(#[from] LineageError),

    /// An action could not be registered.
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// The clock could not advance.
    #[error("clock error: {0}")]
    Clock(#[from] ClockError),

    /// The world rejected a query.
    #[error("world error: {0}")]
    World(#[from] WorldError),

    /// No character with this identifier.
    #[error("unknown character {0}")]
    UnknownCharacter(CharacterId),

    /// A spawn tile is blocked or already occupied.
    #[error("cannot spawn at {0}: tile blocked or occupied")]
    SpawnBlocked(Position),

    /// No free passable tile remains.
    #[error("no free passable tile to spawn on")]
    NoFreeTile,

    /// Legacy arithmetic overflowed.
    #[error("legacy overflow for character {0}")]
    LegacyOverflow(CharacterId),
}
