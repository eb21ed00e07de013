//! Factories, fixtures, and database helpers for tests across the workspace.

pub mod factories;
pub mod fixtures;
pub mod helpers;

pub use factories::*;
pub use fixtures::*;
pub use helpers::*;
