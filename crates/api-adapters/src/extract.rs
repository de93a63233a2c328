//! Request extractors: the calling user and the JSON procedure input.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use domains::DomainError;
use serde::de::DeserializeOwned;
use services::Actor;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller. Rejects with `FORBIDDEN` when the bearer token
/// is missing or does not verify.
pub struct CurrentUser(pub Actor);

/// The caller if a valid bearer token was sent; public procedures use this.
pub struct MaybeUser(pub Option<Actor>);

/// A JSON body decoded into `T`; malformed input is `BAD_REQUEST`.
/// An empty body reads as `{}`.
pub struct Input<T>(pub T);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| DomainError::forbidden("authentication required"))?;
        let actor = state.services.auth.authenticate(token).await?;
        Ok(CurrentUser(actor))
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(MaybeUser(None));
        };
        match state.services.auth.authenticate(token).await {
            Ok(actor) => Ok(MaybeUser(Some(actor))),
            Err(DomainError::Forbidden(_)) => Ok(MaybeUser(None)),
            Err(other) => Err(other.into()),
        }
    }
}

impl<S, T> FromRequest<S> for Input<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        decode(&body).map(Input)
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) { b"{}" } else { body };
    serde_json::from_slice(body).map_err(|err| ApiError::bad_request(format!("invalid input: {err}")))
}
