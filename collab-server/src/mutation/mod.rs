pub mod engine;

pub use engine::MutationEngine;
