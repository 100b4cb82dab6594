//! History store, snapshot manager and the calculator facade.

/// Orchestrating command surface.
pub mod calculator;
/// Bounded calculation log.
pub mod history;
/// Undo/redo snapshots.
pub mod snapshot;
/// Result statistics.
pub mod stats;
