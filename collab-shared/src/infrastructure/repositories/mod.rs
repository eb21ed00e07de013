pub mod access_grant_repository_impl;
pub mod block_repository_impl;
pub mod edge_repository_impl;
pub mod subflow_repository_impl;
pub mod workflow_repository_impl;

pub use access_grant_repository_impl::AccessGrantRepositoryImpl;
pub use block_repository_impl::BlockRepositoryImpl;
pub use edge_repository_impl::EdgeRepositoryImpl;
pub use subflow_repository_impl::SubflowRepositoryImpl;
pub use workflow_repository_impl::WorkflowRepositoryImpl;
