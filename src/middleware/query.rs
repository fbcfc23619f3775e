use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query},
    http::{request::Parts, Uri},
};

use crate::models::announcement::AnnouncementParams;

/// Key/value pairs of the query string in order. Never fails: a query that
/// cannot be decoded yields no pairs.
pub fn query_pairs(uri: &Uri) -> Vec<(String, String)> {
    Query::<Vec<(String, String)>>::try_from_uri(uri)
        .map(|Query(pairs)| pairs)
        .unwrap_or_default()
}

/// Value of `key`; when repeated, the last occurrence wins.
pub fn last_value(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

/// Announcement fields read leniently so a malformed or repeated parameter
/// can never reject the request ahead of the credential check.
impl<S> FromRequestParts<S> for AnnouncementParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let pairs = query_pairs(&parts.uri);
        Ok(AnnouncementParams {
            message: last_value(&pairs, "message"),
            expiration: last_value(&pairs, "expiration"),
            start: last_value(&pairs, "start"),
        })
    }
}
