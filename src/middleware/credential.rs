use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::query::{last_value, query_pairs};

/// The optional `username` query parameter identifying the calling teacher.
///
/// Never rejects: whether a credential is required, and whether it is valid,
/// is decided by `AnnouncementService::require_auth` so that authorization is
/// always checked before any input validation. A repeated `username` keeps
/// the last value.
#[derive(Debug, Clone, Default)]
pub struct Credential(pub Option<String>);

impl Credential {
    pub fn username(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for Credential
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Credential(last_value(&query_pairs(&parts.uri), "username")))
    }
}
