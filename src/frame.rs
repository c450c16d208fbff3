//! Call-site trace records.
//!
//! A [`Frame`] is an immutable `{function, file, line}` snapshot taken at the
//! moment a tracing constructor runs. Its textual rendering
//! (`function@file:line`) is computed at most once and cached, since every
//! field is fixed at creation.

use std::sync::OnceLock;

use serde::Serialize;

/// A captured call-site: function name, file path and line number.
///
/// Equality compares only the three captured fields; the render cache is
/// ignored. A frame is owned by exactly one error node and is never mutated
/// after creation.
///
/// # Example
///
/// ```rust
/// use errlink::Frame;
///
/// let frame = Frame::new("fetch_ticker", "src/exchange.rs", 42);
/// assert_eq!(frame.rendered(), "fetch_ticker@src/exchange.rs:42");
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    #[serde(rename = "func")]
    function: String,
    file: String,
    line: u32,
    #[serde(skip)]
    rendered: OnceLock<String>,
}

impl Frame {
    /// Creates a frame from already-resolved call-site fields.
    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line,
            rendered: OnceLock::new(),
        }
    }

    /// Function name, last path component only.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Source file path.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Line number within [`Self::file`].
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The cached `function@file:line` rendering.
    pub fn rendered(&self) -> &str {
        self.rendered
            .get_or_init(|| format!("{}@{}:{}", self.function, self.file, self.line))
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.function == other.function && self.file == other.file && self.line == other.line
    }
}

impl Eq for Frame {}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.rendered())
    }
}

/// Symbol prefixes belonging to this crate's capture machinery. Frames whose
/// resolved name matches one of these are not attributable to the caller.
const INTERNAL_PREFIXES: &[&str] = &[
    "backtrace::",
    "errlink::frame::",
    "errlink::error::Error::trace",
    "errlink::error::Error::track",
    "errlink::code::Code::trace",
    "errlink::code::Code::track",
];

fn is_internal(name: &str) -> bool {
    INTERNAL_PREFIXES.iter().any(|p| name.contains(p))
}

/// Trims a resolved symbol down to its last path component, dropping the
/// trailing monomorphization hash (`::h0123456789abcdef`) when present.
fn shorten_symbol(name: &str) -> String {
    let name = match name.rfind("::h") {
        Some(idx) if name[idx + 3..].chars().all(|c| c.is_ascii_hexdigit()) => &name[..idx],
        _ => name,
    };
    match name.rfind("::") {
        Some(idx) => name[idx + 2..].to_string(),
        None => name.to_string(),
    }
}

/// Captures the caller's frame, skipping `skip` additional levels.
///
/// `skip == 0` resolves to the immediate caller of the tracing constructor.
/// Returns `None` when the stack cannot be resolved that deep (stripped
/// binaries, inlined frames); capture failure is not a recoverable condition
/// this library reports through its error values.
pub fn capture(skip: usize) -> Option<Frame> {
    let bt = backtrace::Backtrace::new();
    let mut resolved = Vec::new();
    for frame in bt.frames() {
        for symbol in frame.symbols() {
            let Some(name) = symbol.name().map(|n| n.to_string()) else {
                continue;
            };
            let file = symbol
                .filename()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            let line = symbol.lineno().unwrap_or(0);
            resolved.push((name, file, line));
        }
    }
    let first = resolved.iter().position(|(name, _, _)| !is_internal(name))?;
    let (name, file, line) = resolved.get(first + skip)?;
    Some(Frame::new(shorten_symbol(name), file.clone(), *line))
}

/// Captures a frame for a wrapping constructor, applying the trace-collapsing
/// rule: when `inner` is a node of this library whose own frame is identical
/// to the one just captured, no new frame is attached. This avoids duplicate
/// adjacent frames when a just-traced error is immediately re-tracked.
pub(crate) fn capture_for_wrap(
    skip: usize,
    inner: &(dyn std::error::Error + 'static),
) -> Option<Frame> {
    // this function's own frame is already excluded by the prefix filter
    let frame = capture(skip)?;
    collapse_duplicate(frame, inner)
}

/// Returns `None` when `inner` already carries a frame structurally equal to
/// `frame`, otherwise hands `frame` back.
pub(crate) fn collapse_duplicate(
    frame: Frame,
    inner: &(dyn std::error::Error + 'static),
) -> Option<Frame> {
    match inner.downcast_ref::<crate::Error>() {
        Some(node) if node.trace_info() == Some(&frame) => None,
        _ => Some(frame),
    }
}
