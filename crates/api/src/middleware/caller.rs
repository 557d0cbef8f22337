//! Caller identity extractor for the streaming session registry.

use std::convert::Infallible;
use std::fmt;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Header the front-end sets to a stable per-tab identifier.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Slot shared by callers that send no identifier.
pub const DEFAULT_CALLER: &str = "default";

const MAX_CLIENT_ID_LEN: usize = 128;

/// Identity owning a slot in the session registry.
///
/// Read from the `x-client-id` header; requests without a usable value
/// share [`DEFAULT_CALLER`].
///
/// ```ignore
/// async fn handler(caller: CallerId) -> AppResult<Json<()>> {
///     tracing::info!(caller = %caller, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallerId(String);

impl CallerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_header(value: Option<&str>) -> Self {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty() && v.len() <= MAX_CLIENT_ID_LEN)
            .map(Self::new)
            .unwrap_or_default()
    }
}

impl Default for CallerId {
    fn default() -> Self {
        Self::new(DEFAULT_CALLER)
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CallerId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(CLIENT_ID_HEADER)
            .and_then(|v| v.to_str().ok());
        Ok(Self::from_header(header))
    }
}
