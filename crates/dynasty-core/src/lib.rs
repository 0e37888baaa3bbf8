//! Simulation context, action scheduling, combat and lineages for the
//! Dynasty kernel.
//!
//! Everything here runs on one thread, driven by
//! [`SimulationContext::advance`]: NPC policies pick actions, the
//! [`ActionScheduler`] fires whatever came due, and the context settles
//! activities and checks that legacy was conserved.
//!
//! # Modules
//!
//! - [`scheduler`] -- Generic [`ActionScheduler`] and the [`ActionHost`]
//!   seam that interprets effects.
//! - [`actions`] -- The kernel's effect and validity-check payloads.
//! - [`context`] -- [`SimulationContext`]: state, triggers and queries.
//! - [`lineage`] -- [`Lineage`] and [`LineageTracker`]: legacy, successor
//!   points and successor scheduling.
//! - [`registry`] -- [`RankedRegistry`], ordered by legacy.
//! - [`events`] -- [`KernelEvent`] change notifications.
//! - [`spawn`] -- Archetype kinds and [`SpawnRequest`].
//! - [`clock`] -- Tick counter and simulated time.
//! - [`config`] -- Configuration loading from `dynasty-config.yaml`.
//! - [`runner`] -- Bounded headless runs.
//! - [`error`] -- [`KernelError`].
//!
//! Standard attacks, skills and death handling live in a private `combat`
//! module; NPC behaviour in a private `policy` module. Both extend
//! [`SimulationContext`].

pub mod actions;
pub mod clock;
mod combat;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod lineage;
mod policy;
pub mod registry;
pub mod runner;
pub mod scheduler;
pub mod spawn;

// Re-export primary types at crate root.
pub use actions::{KernelCheck, KernelEffect, KernelScheduler};
pub use clock::{ClockError, SimulationClock};
pub use config::{ConfigError, LineageConfig, SimulationConfig};
pub use context::{KernelSettings, SimulationContext, TickReport};
pub use error::KernelError;
pub use events::{EventQueue, KernelEvent};
pub use lineage::{HeirTemplate, Lineage, LineageError, LineageTracker};
pub use registry::RankedRegistry;
pub use runner::{
    NoOpCallback, RunnerError, SimulationEndReason, SimulationResult, TickCallback, run_ticks,
    step,
};
pub use scheduler::{ActionHost, ActionScheduler, ActionSpec, AdvanceReport, SchedulerError};
pub use spawn::{ArchetypeKind, SpawnRequest};
