//! Identity resolution: turns the `Authorization` header into the calling
//! user before any handler logic runs.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use parley_shared::UserId;
use parley_store::Database;

use crate::api::AppState;
use crate::error::ServerError;

/// Maps a bearer credential to an existing user.
///
/// `Ok(None)` means the credential is well-formed for transport but names
/// nobody; the request is rejected as unauthorized.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, db: &Database, credential: &str) -> parley_core::Result<Option<UserId>>;
}

/// The credential is the decimal user id handed out by `POST /session`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserIdBearer;

impl IdentityResolver for UserIdBearer {
    fn resolve(&self, db: &Database, credential: &str) -> parley_core::Result<Option<UserId>> {
        let Some(id) = UserId::parse(credential) else {
            return Ok(None);
        };
        Ok(db.user_exists(id)?.then_some(id))
    }
}

/// Token part of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub UserId);

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credential = bearer_token(&parts.headers)
            .ok_or(ServerError::Unauthorized)?
            .to_string();

        let resolver = state.resolver.clone();
        let user = state
            .run(move |db| resolver.resolve(db, &credential))
            .await?;

        match user {
            Some(id) => Ok(Caller(id)),
            None => {
                tracing::debug!("unknown bearer credential");
                Err(ServerError::Unauthorized)
            }
        }
    }
}
