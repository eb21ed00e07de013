pub mod access_grant_repository;
pub mod block_repository;
pub mod edge_repository;
pub mod subflow_repository;
pub mod workflow_repository;

pub use access_grant_repository::AccessGrantRepository;
pub use block_repository::BlockRepository;
pub use edge_repository::EdgeRepository;
pub use subflow_repository::SubflowRepository;
pub use workflow_repository::WorkflowRepository;
