//! HS256 bearer token verification.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use domains::{DomainError, ExternalIdentity, IdentityProvider, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("the signing secret is empty")]
    EmptySecret,

    #[error("token rejected: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("token has no subject")]
    MissingSubject,
}

impl From<TokenError> for DomainError {
    fn from(err: TokenError) -> Self {
        DomainError::Forbidden(err.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub exp: i64,
}

impl Claims {
    pub fn into_identity(self) -> ExternalIdentity {
        ExternalIdentity { subject: self.sub, email: self.email, name: self.user_metadata.name }
    }
}

pub struct JwtIdentityProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    audience: Option<String>,
}

impl std::fmt::Debug for JwtIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIdentityProvider")
            .field("keys", &"[REDACTED]")
            .field("audience", &self.audience)
            .finish()
    }
}

impl JwtIdentityProvider {
    /// With an `audience`, tokens must carry a matching `aud` claim;
    /// without one, `aud` is not checked.
    pub fn new(secret: &str, audience: Option<String>) -> std::result::Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            audience,
        })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        match &self.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        validation
    }

    pub fn verify(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation())?;
        if data.claims.sub.trim().is_empty() {
            return Err(TokenError::MissingSubject);
        }
        Ok(data.claims)
    }

    /// Signs a token for `identity` valid for `ttl`.
    pub fn issue(&self, identity: &ExternalIdentity, ttl: Duration) -> std::result::Result<String, TokenError> {
        let claims = Claims {
            sub: identity.subject.clone(),
            email: identity.email.clone(),
            user_metadata: UserMetadata { name: identity.name.clone() },
            aud: self.audience.clone(),
            exp: (Utc::now() + ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn resolve(&self, token: &str) -> Result<ExternalIdentity> {
        let claims = self.verify(token).inspect_err(|e| debug!(error = %e, "bearer token rejected"))?;
        Ok(claims.into_identity())
    }
}
