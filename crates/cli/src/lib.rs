//! Command implementations behind the `forge` binary.

pub mod commands;
pub mod context;
pub mod progress;

pub use context::AppContext;
