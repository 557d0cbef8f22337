/// Errors surfaced by the client library.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request to the proxy failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The proxy answered with an error status.
    #[error("Proxy error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The proxy, or something in front of it, answered 408 or 5xx without
    /// a readable error body. Usually transient.
    #[error("Proxy unavailable ({status})")]
    Unavailable { status: u16 },

    /// The media transport failed to connect, speak or stop.
    #[error("Media transport error: {0}")]
    Transport(String),

    /// The call is not valid in the session's current state.
    #[error("Invalid session state: {0}")]
    InvalidState(String),
}
