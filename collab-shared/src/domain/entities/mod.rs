pub mod access_grant;
pub mod block;
pub mod edge;
pub mod editor_session;
pub mod room;
pub mod subflow;
pub mod workflow;

pub use access_grant::{AccessGrant, Role};
pub use block::Block;
pub use edge::Edge;
pub use editor_session::{Cursor, EditorSession, Selection};
pub use room::Room;
pub use subflow::Subflow;
pub use workflow::Workflow;
