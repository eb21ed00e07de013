pub mod authorization;
pub mod token_verifier;

pub use authorization::{AuthorizationService, OperationDecision, ResolvedAccess};
pub use token_verifier::{HandshakeIdentity, HttpTokenVerifier, StaticTokenVerifier, TokenVerifier};
