use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::entities::VerifiedIdentity;
use crate::domain::ports::IdentityVerifier;

// Claims read from a verified identity token.
#[derive(Debug, Deserialize)]
struct IdentityClaims {
    sub: String,
    firebase: FirebaseClaims,
}

// Nested block carrying the sign-in provider tag.
#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sign_in_provider: String,
}

// Verifies identity tokens against the auth provider's published signing
// keys. Failure strings carry the provider detail for logging; the HTTP
// layer never exposes them.
pub struct FirebaseTokenVerifier {
    http: reqwest::Client,
    jwks_url: String,
    project_id: String,
    issuer: String,
    // Decoding keys cached by kid, refreshed when an unknown kid shows up.
    keys: RwLock<HashMap<String, DecodingKey>>,
}

impl FirebaseTokenVerifier {
    pub fn new(
        project_id: impl Into<String>,
        jwks_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let project_id = project_id.into();

        Ok(Self {
            http,
            jwks_url: jwks_url.into(),
            issuer: format!("https://securetoken.google.com/{project_id}"),
            project_id,
            keys: RwLock::new(HashMap::new()),
        })
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, String> {
        if let Some(key) = self.keys.read().await.get(kid) {
            return Ok(key.clone());
        }

        // Unknown kid means the provider rotated its keys; refresh the set.
        let jwks: JwkSet = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|err| format!("jwks fetch failed: {err}"))?
            .error_for_status()
            .map_err(|err| format!("jwks fetch failed: {err}"))?
            .json()
            .await
            .map_err(|err| format!("jwks decode failed: {err}"))?;

        let mut keys = self.keys.write().await;
        keys.clear();
        for jwk in &jwks.keys {
            let Some(id) = jwk.common.key_id.clone() else {
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(id, key);
                }
                Err(err) => tracing::warn!(kid = %id, error = %err, "skipping unusable jwk"),
            }
        }

        keys.get(kid)
            .cloned()
            .ok_or_else(|| format!("no signing key for kid {kid}"))
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseTokenVerifier {
    async fn verify(&self, assertion: &str) -> Result<VerifiedIdentity, String> {
        let header =
            decode_header(assertion).map_err(|err| format!("malformed token header: {err}"))?;
        let kid = header
            .kid
            .ok_or_else(|| "token header has no kid".to_string())?;
        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[&self.issuer]);

        let token = decode::<IdentityClaims>(assertion, &key, &validation)
            .map_err(|err| format!("token rejected: {err}"))?;

        Ok(VerifiedIdentity {
            subject_id: token.claims.sub,
            provider_tag: token.claims.firebase.sign_in_provider,
        })
    }
}
