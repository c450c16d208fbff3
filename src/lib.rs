//! errlink — chain-link error representation
//!
//! A foundational library for constructing, annotating, wrapping and
//! traversing chains of errors, with optional call-site capture at each
//! link.
//!
//! # Features
//!
//! - **Chain model**: each [`Error`] node links to an inner error — another
//!   node or any foreign `std::error::Error` — forming a finite chain
//!   walkable through the standard `source()` capability
//! - **Codes**: signed 64-bit codes with nearest/current/root extraction
//!   semantics and a [`Code`] registry newtype for domain constants
//! - **Tags**: append-only, ordered, multi-value annotations, safe under
//!   concurrent mutation
//! - **Traces**: `{function, file, line}` frames captured by the tracing
//!   constructors, rendered as `function@file:line`
//! - **Contained traversal**: visitor panics are converted into ordinary
//!   error values at the traversal boundary
//! - **Observability**: constructive operations notify a process-wide
//!   metrics observer; rendered chains flow to pluggable log sinks backed
//!   by `tracing`
//!
//! # Example
//!
//! ```rust
//! use errlink::Error;
//!
//! fn fetch(symbol: &str) -> errlink::Result<f64> {
//!     if symbol.is_empty() {
//!         return Err(Error::coded(400, "symbol cannot be empty"));
//!     }
//!     Ok(42.0)
//! }
//!
//! let err = fetch("").unwrap_err();
//! assert_eq!(err.nearest_code(), 400);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
// Uniform suppressions, justified once:
// - module_name_repetitions: library naming convention (ErrorSink in logging)
// - must_use_candidate: not every accessor needs #[must_use]
// - return_self_not_must_use: fluent setters return Self without must_use
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod code;
pub mod error;
pub mod frame;
pub mod logging;
pub mod metrics;

pub use code::Code;
pub use error::{
    is_untyped_execution_failure, BoxError, CodeReadable, CodedError, Error, Result,
    UntypedExecutionFailure, WrapExt,
};
pub use frame::Frame;
pub use logging::{ErrorSink, FatalSink, TracingSink, WarnSink};
pub use metrics::{metrics, reset_metrics, ErrorMetrics, MetricsObserver, MetricsSnapshot};

/// Convenience imports.
///
/// ```rust
/// use errlink::prelude::*;
/// ```
pub mod prelude {
    pub use crate::code::Code;
    pub use crate::error::{BoxError, Error, Result, WrapExt};
    pub use crate::frame::Frame;
    pub use crate::logging::{
        init_logging, try_init_logging, LogConfig, LogFormat, LogLevel, TracingSink,
    };
    pub use crate::metrics::{metrics, reset_metrics, MetricsSnapshot};
}
