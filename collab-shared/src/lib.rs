pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::Settings;
pub use shared::*;

