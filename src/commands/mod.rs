//! Command implementations for the `amp` binary

pub mod monitoring;
pub mod mutate;

pub use monitoring::render_monitoring;
pub use mutate::{mutate_manifests, MutateOutcome};
