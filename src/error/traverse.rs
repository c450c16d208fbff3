//! Chain traversal: root-walks, source-walks and code extraction.
//!
//! Two walking primitives with distinct stopping rules:
//!
//! - the **root-walk** ([`Error::traverse_to_root`]) follows the generic
//!   `std::error::Error::source` capability through every link, foreign or
//!   not, down to the innermost value;
//! - the **source-walk** ([`Error::traverse_to_source`]) stays within this
//!   library's own node type and stops at the first link whose inner is
//!   absent or foreign — it does not continue past a foreign error even when
//!   that error has a `source()` of its own.
//!
//! Both contain visitor panics at the traversal boundary and convert them
//! into ordinary returned errors.

use std::error::Error as StdError;
use std::panic::{catch_unwind, AssertUnwindSafe};

use super::{BoxError, Error, UntypedExecutionFailure};
use crate::metrics;

/// Capability for error types that expose a current (single-link) code.
///
/// Traversal recognizes this capability on this crate's own [`Error`] node
/// and on the [`CodedError`] carrier; arbitrary trait objects cannot be
/// queried for it at runtime, so foreign errors participate in code
/// extraction by wrapping themselves in a [`CodedError`].
pub trait CodeReadable {
    /// This link's own code, 0 when unset.
    fn current_code(&self) -> i64;
}

impl CodeReadable for Error {
    fn current_code(&self) -> i64 {
        Error::current_code(self)
    }
}

/// A foreign-compatible error carrier attaching a code to any error value.
///
/// `CodedError` is itself a foreign value from the chain's point of view
/// (the source-walk stops at it), but the code-walk reads its code like it
/// reads a node's.
///
/// # Example
///
/// ```rust
/// use errlink::{CodedError, Error};
///
/// let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
/// let err = Error::wrap(CodedError::new(404, io), "lookup failed");
/// assert_eq!(err.nearest_code(), 404);
/// ```
#[derive(Debug)]
pub struct CodedError {
    code: i64,
    inner: BoxError,
}

impl CodedError {
    /// Attaches `code` to `inner`.
    pub fn new(code: i64, inner: impl Into<BoxError>) -> Self {
        Self {
            code,
            inner: inner.into(),
        }
    }
}

impl CodeReadable for CodedError {
    fn current_code(&self) -> i64 {
        self.code
    }
}

impl std::fmt::Display for CodedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for CodedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.inner)
    }
}

/// Reads a link's code where the link exposes the capability.
fn link_code(err: &(dyn StdError + 'static)) -> Option<i64> {
    if let Some(node) = err.downcast_ref::<Error>() {
        Some(node.current_code())
    } else if let Some(coded) = err.downcast_ref::<CodedError>() {
        Some(coded.current_code())
    } else {
        None
    }
}

/// Converts a caught panic payload into an ordinary error value. An error
/// payload passes through; anything else is wrapped around the
/// [`UntypedExecutionFailure`] sentinel with its text representation.
fn contain_panic(payload: Box<dyn std::any::Any + Send>) -> BoxError {
    let payload = match payload.downcast::<BoxError>() {
        Ok(err) => return *err,
        Err(other) => other,
    };
    let payload = match payload.downcast::<Error>() {
        Ok(err) => return Box::new(*err),
        Err(other) => other,
    };
    let text = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-printable panic payload".to_string()
    };
    Box::new(Error::wrap(UntypedExecutionFailure, format!("panic = {text}")))
}

impl Error {
    /// Iterates the chain from this node to the root, following the generic
    /// `source()` capability through every link.
    pub fn chain(&self) -> impl Iterator<Item = &(dyn StdError + 'static)> {
        std::iter::successors(Some(self as &(dyn StdError + 'static)), |err| (*err).source())
    }

    /// The innermost value reachable by repeatedly unwrapping, regardless of
    /// type. Returns this node itself when it has no inner error.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }

    /// The first place control left this library's own chain: walks only
    /// through nodes of this library and returns the stopping value — this
    /// node, a deeper node without an inner, or the first foreign error.
    ///
    /// Unlike [`Error::root_cause`], a foreign error terminates the walk
    /// even when it could be unwrapped further.
    pub fn origin(&self) -> &(dyn StdError + 'static) {
        let mut current: &Error = self;
        loop {
            match current.inner.as_deref() {
                None => return current,
                Some(inner) => match inner.downcast_ref::<Error>() {
                    Some(next) => current = next,
                    None => return inner as &(dyn StdError + 'static),
                },
            }
        }
    }

    /// Visits every link from this node to the root.
    ///
    /// A visitor returning `Err` stops the walk immediately and propagates
    /// that error; the visitor is never called again afterwards. A visitor
    /// panic is contained at this boundary and returned as an error value.
    pub fn traverse_to_root<F>(&self, mut visit: F) -> std::result::Result<(), BoxError>
    where
        F: FnMut(&(dyn StdError + 'static)) -> std::result::Result<(), BoxError>,
    {
        metrics::observer().record_traverse();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let mut current: Option<&(dyn StdError + 'static)> = Some(self);
            while let Some(err) = current {
                visit(err)?;
                current = err.source();
            }
            Ok(())
        }));
        match outcome {
            Ok(result) => result,
            Err(payload) => Err(contain_panic(payload)),
        }
    }

    /// Visits this library's own links down to the source.
    ///
    /// `is_source` is true at the link whose inner is absent or foreign;
    /// the walk stops after that call. A foreign terminal is additionally
    /// visited exactly once, with `is_source == true`. Short-circuit and
    /// panic containment rules match [`Error::traverse_to_root`].
    pub fn traverse_to_source<F>(&self, mut visit: F) -> std::result::Result<(), BoxError>
    where
        F: FnMut(&(dyn StdError + 'static), bool) -> std::result::Result<(), BoxError>,
    {
        metrics::observer().record_traverse();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let mut current: &Error = self;
            loop {
                match current.inner.as_deref() {
                    None => {
                        visit(current, true)?;
                        return Ok(());
                    }
                    Some(inner) => match inner.downcast_ref::<Error>() {
                        Some(next) => {
                            visit(current, false)?;
                            current = next;
                        }
                        None => {
                            visit(current, false)?;
                            visit(inner as &(dyn StdError + 'static), true)?;
                            return Ok(());
                        }
                    },
                }
            }
        }));
        match outcome {
            Ok(result) => result,
            Err(payload) => Err(contain_panic(payload)),
        }
    }

    /// Visits every link of the root-walk together with its code, reading
    /// the code where the link exposes one and defaulting to 0 otherwise.
    pub fn traverse_code<F>(&self, mut visit: F) -> std::result::Result<(), BoxError>
    where
        F: FnMut(&(dyn StdError + 'static), i64) -> std::result::Result<(), BoxError>,
    {
        self.traverse_to_root(|err| visit(err, link_code(err).unwrap_or(0)))
    }

    /// The first non-zero code encountered scanning from this node toward
    /// the root; 0 when the whole chain carries none.
    ///
    /// "Nearest" means closest to this node — the scan starts here and
    /// stops at the first non-zero code, not at the deepest one.
    pub fn nearest_code(&self) -> i64 {
        self.chain()
            .filter_map(link_code)
            .find(|code| *code != 0)
            .unwrap_or(0)
    }

    /// The code carried by the terminal link of the source-walk — the
    /// single value [`Error::origin`] returns — or 0 when that link exposes
    /// none. Intermediate links are not inspected.
    pub fn root_code(&self) -> i64 {
        link_code(self.origin()).unwrap_or(0)
    }

    /// True iff the chain carries any non-zero code.
    ///
    /// A chain where every code was explicitly set to 0 reports `false`:
    /// "any code" means "any non-zero code". Use
    /// [`Error::has_current_code`] to distinguish "set to 0" from "never
    /// set" on a single node.
    pub fn has_any_code(&self) -> bool {
        self.nearest_code() != 0
    }
}
