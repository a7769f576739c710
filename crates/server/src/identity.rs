//! Caller identity.
//!
//! Authentication happens upstream (identity provider + proxy); the server
//! only asks an [`IdentityResolver`] who the caller is.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum_extra::headers::{Error as HeaderError, Header, HeaderMapExt};

pub static USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

/// Resolves the calling user from a request, or `None` if unauthenticated.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Option<String>;
}

/// `TypedHeader` for the user id forwarded by the identity proxy.
#[derive(Debug)]
struct UserIdHeader(String);

impl Header for UserIdHeader {
    fn name() -> &'static HeaderName {
        &USER_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, HeaderError>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(HeaderError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(HeaderError::invalid());
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(HeaderError::invalid());
        }

        Ok(UserIdHeader(value.to_string()))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        match HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-user-id header"),
        }
    }
}

/// Trusts the `x-user-id` header set by the upstream identity proxy.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeaderIdentity;

impl IdentityResolver for HeaderIdentity {
    fn resolve(&self, headers: &HeaderMap) -> Option<String> {
        headers.typed_get::<UserIdHeader>().map(|header| header.0)
    }
}
