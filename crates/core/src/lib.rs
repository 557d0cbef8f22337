//! Domain types and pure request-shaping logic for the avatar proxy.
//!
//! Nothing in this crate performs I/O. The vendor crate sends what is
//! built here; the API crate validates client input against it.

pub mod agent;
pub mod character;
pub mod error;
pub mod generation;
pub mod streaming;
pub mod upload;
pub mod video_status;

/// Returns `Some(s)` when `s` is present and not just whitespace.
pub(crate) fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}
