//! Ergonomic wrapping of `Result` and `Option` values into chain nodes.

use std::fmt;

use super::{BoxError, Error, Result};

/// Extension trait turning failures into chain links at call sites.
///
/// `wrap_msg` adds a plain wrapping node; `track_msg` additionally captures
/// the call-site frame. Use the closure variants when the message is
/// expensive to build — they only run on the failure path.
///
/// # Example
///
/// ```rust
/// use errlink::{Result, WrapExt};
///
/// fn read_config(path: &str) -> Result<String> {
///     std::fs::read_to_string(path)
///         .wrap_with(|| format!("failed to read config at {path}"))
/// }
/// ```
pub trait WrapExt<T> {
    /// Wraps the failure in a plain node carrying `msg`.
    fn wrap_msg(self, msg: impl Into<String>) -> Result<T>;

    /// Wraps the failure in a plain node; `msg` is built lazily.
    fn wrap_with<C, F>(self, msg: F) -> Result<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;

    /// Wraps the failure in a node that also captures the caller's frame.
    fn track_msg(self, msg: impl Into<String>) -> Result<T>;
}

impl<T, E> WrapExt<T> for std::result::Result<T, E>
where
    E: Into<BoxError>,
{
    fn wrap_msg(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::wrap(e, msg))
    }

    fn wrap_with<C, F>(self, msg: F) -> Result<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::wrap(e, msg().to_string()))
    }

    fn track_msg(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::track_skip(1, e, msg))
    }
}

impl<T> WrapExt<T> for Option<T> {
    fn wrap_msg(self, msg: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| Error::new(msg))
    }

    fn wrap_with<C, F>(self, msg: F) -> Result<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::new(msg().to_string()))
    }

    fn track_msg(self, msg: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| Error::trace_skip(1, msg))
    }
}
