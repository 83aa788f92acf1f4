//! API management operator toolkit
//!
//! Library half of the `amp` binary. The convergence engine lives in
//! `amp-reconcilers` and the manifest builders in `amp-monitoring`; this
//! crate wires them to files and YAML so the commands can be tested without
//! spawning a process.

pub mod commands;
