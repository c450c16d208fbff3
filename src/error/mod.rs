//! # Chain-link error representation
//!
//! This module provides the core [`Error`] node type: a single link in a
//! finite, singly-linked error chain. Each node carries a fixed message, an
//! optional signed 64-bit code, an append-only multi-value tag store, an
//! optional call-site [`Frame`](crate::Frame), and an optional inner error —
//! which may be another node of this library or any foreign
//! `std::error::Error` value.
//!
//! ## Design
//!
//! 1. **Interoperability**: the chain is walkable by anything that follows
//!    `std::error::Error::source`, and the library itself walks foreign
//!    errors the same way.
//! 2. **Two notions of "innermost"**: [`Error::root_cause`] unwraps through
//!    *every* link regardless of type; [`Error::origin`] stops at the first
//!    value that is not a node of this library. The distinction matters as
//!    soon as a wrapped foreign error wraps something else itself.
//! 3. **Thread safety**: `set_code`/`set_tag`/`get_tag` are safe to call
//!    concurrently on the same node; message, trace and inner link are fixed
//!    at construction and read without locking.
//! 4. **No-throw traversal**: visitor callbacks that panic are contained at
//!    the traversal boundary and surface as ordinary error values.
//!
//! ## Quick start
//!
//! ```rust
//! use errlink::Error;
//!
//! let base = std::io::Error::new(std::io::ErrorKind::TimedOut, "db timeout");
//! let err = Error::wrap(base, "query failed");
//! let err = Error::wrap(err, "request failed");
//! err.set_code(500);
//!
//! assert_eq!(
//!     err.to_string(),
//!     "code(500), request failed, query failed, db timeout"
//! );
//! assert_eq!(err.nearest_code(), 500);
//! ```

mod ext;
mod render;
mod traverse;

pub use ext::WrapExt;
pub use traverse::{CodeReadable, CodedError};


use std::error::Error as StdError;
use std::fmt;
use std::io::Write as IoWrite;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::frame::{self, Frame};
use crate::logging::{ErrorSink, FatalSink, WarnSink};
use crate::metrics;

/// Result type alias for operations that fail with an [`Error`] chain.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error type used for chain links and traversal outcomes.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Sentinel wrapped by the node produced when a traversal visitor panics
/// with a payload that is not itself an error value.
#[derive(Debug, thiserror::Error)]
#[error("!!!panic")]
pub struct UntypedExecutionFailure;

/// Returns true when `err`'s chain contains the
/// [`UntypedExecutionFailure`] sentinel.
pub fn is_untyped_execution_failure(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.downcast_ref::<UntypedExecutionFailure>().is_some() {
            return true;
        }
        current = e.source();
    }
    false
}

/// A single link in an error chain.
///
/// Created by the constructors below ([`Error::new`], [`Error::coded`],
/// [`Error::wrap`], [`Error::trace`], [`Error::track`] and their `_skip`
/// variants), then optionally annotated in place with [`Error::set_code`]
/// and [`Error::set_tag`].
#[derive(Debug)]
pub struct Error {
    msg: String,
    code: AtomicI64,
    code_set: AtomicBool,
    tags: RwLock<Vec<(String, String)>>,
    trace: Option<Frame>,
    inner: Option<BoxError>,
}

impl Error {
    fn bare(msg: impl Into<String>) -> Self {
        metrics::observer().record_created();
        Self {
            msg: msg.into(),
            code: AtomicI64::new(0),
            code_set: AtomicBool::new(false),
            tags: RwLock::new(Vec::new()),
            trace: None,
            inner: None,
        }
    }

    // ==================== Constructors ====================

    /// Creates a plain node: no trace, no inner error.
    pub fn new(msg: impl Into<String>) -> Self {
        Self::bare(msg)
    }

    /// Creates a plain node with its code already set.
    pub fn coded(code: i64, msg: impl Into<String>) -> Self {
        Self::bare(msg).with_code(code)
    }

    /// Creates a node wrapping `inner`, which becomes the next link of the
    /// chain. `inner` may be another [`Error`] or any foreign error.
    pub fn wrap(inner: impl Into<BoxError>, msg: impl Into<String>) -> Self {
        let mut err = Self::bare(msg);
        err.inner = Some(inner.into());
        metrics::observer().record_wrapped();
        err
    }

    /// Creates a node carrying the caller's call-site frame.
    pub fn trace(msg: impl Into<String>) -> Self {
        Self::trace_skip(0, msg)
    }

    /// Like [`Error::trace`], skipping `skip` additional stack levels.
    pub fn trace_skip(skip: usize, msg: impl Into<String>) -> Self {
        let mut err = Self::bare(msg);
        err.trace = frame::capture(skip);
        if err.trace.is_some() {
            metrics::observer().record_traced();
        }
        err
    }

    /// Creates a node that both wraps `inner` and carries the caller's
    /// call-site frame.
    ///
    /// When `inner` already carries a frame identical to the one that would
    /// be captured here, no frame is attached (trace collapsing).
    pub fn track(inner: impl Into<BoxError>, msg: impl Into<String>) -> Self {
        Self::track_skip(0, inner, msg)
    }

    /// Like [`Error::track`], skipping `skip` additional stack levels.
    pub fn track_skip(skip: usize, inner: impl Into<BoxError>, msg: impl Into<String>) -> Self {
        let mut err = Self::bare(msg);
        let inner = inner.into();
        err.trace = frame::capture_for_wrap(skip, &*inner);
        err.inner = Some(inner);
        metrics::observer().record_wrapped();
        if err.trace.is_some() {
            metrics::observer().record_traced();
        }
        err
    }

    #[cfg(test)]
    pub(crate) fn with_test_frame(mut self, frame: Frame) -> Self {
        self.trace = Some(frame);
        self
    }

    // ==================== Accessors ====================

    /// The message fixed at construction.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// This node's call-site frame, when constructed by a tracing
    /// constructor.
    pub fn trace_info(&self) -> Option<&Frame> {
        self.trace.as_ref()
    }

    // ==================== Codes ====================

    /// Sets this node's code in place and marks it explicitly set.
    ///
    /// Safe for concurrent use; fluent:
    ///
    /// ```rust
    /// use errlink::Error;
    ///
    /// let err = Error::new("payment declined");
    /// err.set_code(402).set_tag("provider", "acme");
    /// assert_eq!(err.current_code(), 402);
    /// ```
    pub fn set_code(&self, code: i64) -> &Self {
        self.code.store(code, Ordering::Release);
        self.code_set.store(true, Ordering::Release);
        if code != 0 {
            metrics::observer().record_coded(code);
        }
        self
    }

    /// Consuming variant of [`Error::set_code`] for construction-time
    /// chaining.
    #[must_use]
    pub fn with_code(self, code: i64) -> Self {
        self.set_code(code);
        self
    }

    /// This node's code; 0 when never set.
    pub fn current_code(&self) -> i64 {
        self.code.load(Ordering::Acquire)
    }

    /// True iff [`Error::set_code`] (or a code-bearing constructor) was
    /// invoked on this exact node, regardless of the value assigned.
    pub fn has_current_code(&self) -> bool {
        self.code_set.load(Ordering::Acquire)
    }

    // ==================== Tags ====================

    /// Appends `value` under `key`. The same key may receive multiple
    /// values; insertion order is preserved. Safe for concurrent use.
    pub fn set_tag(&self, key: impl Into<String>, value: impl Into<String>) -> &Self {
        let mut tags = self.tags.write().unwrap_or_else(PoisonError::into_inner);
        tags.push((key.into(), value.into()));
        self
    }

    /// Returns every value recorded under `key`, in insertion order.
    ///
    /// The returned vector is a defensive copy: an absent key yields an
    /// empty vector, and mutating the result never affects the node.
    pub fn get_tag(&self, key: &str) -> Vec<String> {
        let tags = self.tags.read().unwrap_or_else(PoisonError::into_inner);
        tags.iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    pub(crate) fn tag_pairs(&self) -> Vec<(String, String)> {
        let tags = self.tags.read().unwrap_or_else(PoisonError::into_inner);
        tags.clone()
    }

    // ==================== Logging ====================

    /// Renders the full chain with traces and forwards it to a warn sink.
    pub fn log_warn(&self, sink: &dyn WarnSink) -> &Self {
        sink.warn(&self.to_chain_string(true, "\n"));
        self
    }

    /// Renders the full chain with traces and forwards it to an error sink.
    pub fn log_error(&self, sink: &dyn ErrorSink) -> &Self {
        sink.error(&self.to_chain_string(true, "\n"));
        self
    }

    /// Renders the full chain with traces and forwards it to a fatal sink.
    ///
    /// The rendered text is additionally written to standard output before
    /// returning, so it survives a sink that buffers or never flushes ahead
    /// of process termination.
    pub fn log_fatal(&self, sink: &dyn FatalSink) -> &Self {
        let rendered = self.to_chain_string(true, "\n");
        sink.fatal(&rendered);
        let mut stdout = std::io::stdout();
        let _ = writeln!(stdout, "{rendered}");
        let _ = stdout.flush();
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_chain_string(false, ", "))
    }
}

impl StdError for Error {
    /// The single unwrap primitive every walking algorithm composes on.
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}
