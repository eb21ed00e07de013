pub mod collab;
pub mod consistency;
pub mod mutation;
pub mod presentation;
pub mod protocol;
pub mod snapshot;
pub mod state;

pub use state::AppState;
