//! Handshake token verification (4.1).
//!
//! The collaboration server accepts a single bearer-style one-time token at
//! connect time — no cookie session fallback, sockets have no cookie jar.
//! Verification is delegated to an external endpoint; this module only
//! wraps that call and maps its outcome onto the error taxonomy.

use async_trait::async_trait;
use collab_shared::shared::{CollabError, CollabResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the external verifier hands back on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeIdentity {
    pub user_id: Uuid,
    pub display_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_org_id: Option<Uuid>,
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// `token` absent → `AuthRequired`. Present but rejected by the external
    /// verifier → `InvalidSession`. The token is single-use; this call does
    /// not mutate the token store beyond what the external verifier already does.
    async fn verify(&self, token: Option<&str>) -> CollabResult<HandshakeIdentity>;
}

/// Production implementation: one HTTP callout to `Settings.auth.token_verification_url`.
pub struct HttpTokenVerifier {
    client: reqwest::Client,
    verification_url: String,
}

impl HttpTokenVerifier {
    pub fn new(verification_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            verification_url,
        }
    }
}

#[async_trait]
impl TokenVerifier for HttpTokenVerifier {
    async fn verify(&self, token: Option<&str>) -> CollabResult<HandshakeIdentity> {
        let token = token.ok_or(CollabError::AuthRequired)?;
        assert!(!token.is_empty(), "handshake token must not be an empty string");

        let response = self
            .client
            .post(&self.verification_url)
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "token verification callout failed");
                CollabError::InvalidSession("verification endpoint unreachable".to_string())
            })?;

        if !response.status().is_success() {
            return Err(CollabError::InvalidSession(format!(
                "verification endpoint returned {}",
                response.status()
            )));
        }

        response
            .json::<HandshakeIdentity>()
            .await
            .map_err(|e| CollabError::InvalidSession(format!("malformed verification response: {e}")))
    }
}

/// Test double — maps known token strings to fixed identities, for use by
/// the test factories instead of a real HTTP callout.
#[derive(Default)]
pub struct StaticTokenVerifier {
    known: std::collections::HashMap<String, HandshakeIdentity>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, identity: HandshakeIdentity) -> Self {
        self.known.insert(token.into(), identity);
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: Option<&str>) -> CollabResult<HandshakeIdentity> {
        let token = token.ok_or(CollabError::AuthRequired)?;
        self.known
            .get(token)
            .cloned()
            .ok_or_else(|| CollabError::InvalidSession("unknown test token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(user_id: Uuid) -> HandshakeIdentity {
        HandshakeIdentity {
            user_id,
            display_name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            active_org_id: None,
        }
    }

    #[tokio::test]
    async fn missing_token_is_auth_required() {
        let verifier = StaticTokenVerifier::new();
        let err = verifier.verify(None).await.unwrap_err();
        assert_eq!(err.wire_type(), "AuthRequired");
    }

    #[tokio::test]
    async fn unknown_token_is_invalid_session() {
        let verifier = StaticTokenVerifier::new();
        let err = verifier.verify(Some("nope")).await.unwrap_err();
        assert_eq!(err.wire_type(), "InvalidSession");
    }

    #[tokio::test]
    async fn known_token_resolves_identity() {
        let user_id = Uuid::new_v4();
        let verifier = StaticTokenVerifier::new().with_token("tok-1", identity(user_id));
        let resolved = verifier.verify(Some("tok-1")).await.unwrap();
        assert_eq!(resolved.user_id, user_id);
    }
}
