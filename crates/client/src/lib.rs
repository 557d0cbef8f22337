//! Client library for the avatarcast proxy.
//!
//! [`ProxyClient`] wraps every proxy endpoint. [`poller`] follows a render
//! job to completion and [`live`] drives a streaming session over an
//! abstract media transport.

pub mod error;
pub mod live;
pub mod poller;
pub mod proxy;

pub use error::ClientError;
pub use live::{LiveSessionController, LiveTransport, SessionBackend};
pub use poller::{poll_until_terminal, PollConfig, PollOutcome, StatusSource};
pub use proxy::ProxyClient;
