//! Domain error-code registry support.
//!
//! [`Code`] is an `i64` newtype meant to be declared as constants by
//! applications (`const INVALID_INPUT: Code = Code(1001);`). Each code
//! value doubles as a spawner: its methods mirror the [`Error`]
//! constructors and stamp the new node with the code, so call sites create
//! consistently classified errors in one expression.

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BoxError, Error};

/// A signed 64-bit error code that spawns pre-coded chain nodes.
///
/// # Example
///
/// ```rust
/// use errlink::Code;
///
/// const INVALID_INPUT: Code = Code(1001);
///
/// let err = INVALID_INPUT.err("validation failed: input cannot be empty");
/// assert_eq!(err.current_code(), 1001);
/// assert_eq!(err.to_string(), "code(1001), validation failed: input cannot be empty");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Code(pub i64);

impl Code {
    /// The raw `i64` value.
    pub const fn i64(self) -> i64 {
        self.0
    }

    /// Creates a plain node stamped with this code.
    pub fn err(self, msg: impl Into<String>) -> Error {
        Error::new(msg).with_code(self.0)
    }

    /// Wraps `inner` in a node stamped with this code.
    pub fn wrap(self, inner: impl Into<BoxError>, msg: impl Into<String>) -> Error {
        Error::wrap(inner, msg).with_code(self.0)
    }

    /// Creates a traced node stamped with this code.
    pub fn trace(self, msg: impl Into<String>) -> Error {
        Error::trace_skip(0, msg).with_code(self.0)
    }

    /// Like [`Code::trace`], skipping `skip` additional stack levels.
    pub fn trace_skip(self, skip: usize, msg: impl Into<String>) -> Error {
        Error::trace_skip(skip, msg).with_code(self.0)
    }

    /// Wraps `inner` in a traced node stamped with this code.
    pub fn track(self, inner: impl Into<BoxError>, msg: impl Into<String>) -> Error {
        Error::track_skip(0, inner, msg).with_code(self.0)
    }

    /// Like [`Code::track`], skipping `skip` additional stack levels.
    pub fn track_skip(self, skip: usize, inner: impl Into<BoxError>, msg: impl Into<String>) -> Error {
        Error::track_skip(skip, inner, msg).with_code(self.0)
    }

    /// Collapses an arbitrary error outcome into a `(code, message)` pair
    /// for boundary layers (API responses, process exit paths).
    ///
    /// A `None` error yields `(succ, "")`. Otherwise the code is the
    /// chain's nearest non-zero code, falling back to `unknown`, and the
    /// message is `prefix_msg, ` (when non-empty) followed by the rendered
    /// chain with a leading `code(<N>), ` prefix stripped so the code is
    /// not reported twice.
    pub fn dump(
        succ: Code,
        unknown: Code,
        err: Option<&(dyn StdError + 'static)>,
        prefix_msg: &str,
    ) -> (Code, String) {
        let Some(err) = err else {
            return (succ, String::new());
        };

        let mut out = String::new();
        if !prefix_msg.is_empty() {
            out.push_str(prefix_msg);
            out.push_str(", ");
        }

        let mut code = unknown;
        let mut rendered = err.to_string();
        if let Some(node) = err.downcast_ref::<Error>() {
            let nearest = node.nearest_code();
            if nearest != 0 {
                code = Code(nearest);
            }
            let code_str = node.code_str();
            if !code_str.is_empty() && rendered.starts_with(&code_str) {
                rendered = rendered[code_str.len()..].to_string();
            }
        }
        out.push_str(&rendered);
        (code, out)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Code> for i64 {
    fn from(code: Code) -> Self {
        code.0
    }
}
