//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup and the tick
//! loop so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or conversion failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: dynasty_core::ConfigError,
    },

    /// Grid construction failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: dynasty_world::WorldError,
    },

    /// A kernel operation failed.
    #[error("kernel error: {source}")]
    Kernel {
        /// The underlying kernel error.
        #[from]
        source: dynasty_core::KernelError,
    },

    /// A tick of the run loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: dynasty_core::RunnerError,
    },

    /// Initial characters could not be placed.
    #[error("spawner error: {message}")]
    Spawner {
        /// Description of the spawner failure.
        message: String,
    },

    /// The log subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
