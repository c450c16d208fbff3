//! Textual rendering of a chain.
//!
//! The renderer runs the source-walk and writes one segment per visited
//! link. Nodes of this library are decorated (code prefix, tags, optional
//! trace); foreign terminals render their own `Display` output verbatim.
//!
//! Consecutive equal codes collapse to a single printed prefix: a node's
//! `code(<N>), ` prefix appears only when its code is non-zero and differs
//! from the code of the previously rendered node (`last_code`, seeded at 0
//! before the walk begins).

use std::fmt::Write;

use super::Error;

impl Error {
    /// Builds the chain representation, joining links with `sep`.
    ///
    /// `Display` is `to_chain_string(false, ", ")`; the log helpers use
    /// `to_chain_string(true, "\n")`.
    ///
    /// ```rust
    /// use errlink::Error;
    ///
    /// let a = Error::new("root").with_code(7);
    /// let b = Error::wrap(a, "mid").with_code(7);
    /// let c = Error::wrap(b, "top").with_code(9);
    /// assert_eq!(c.to_chain_string(false, "; "), "code(9), top; code(7), mid; root");
    /// ```
    pub fn to_chain_string(&self, print_trace: bool, sep: &str) -> String {
        let mut out = String::new();
        let mut last_code = 0i64;
        let _ = self.traverse_to_source(|err, is_source| {
            match err.downcast_ref::<Error>() {
                Some(node) => node.write_self_to(&mut out, print_trace, &mut last_code),
                None => {
                    let _ = write!(out, "{err}");
                }
            }
            if !is_source {
                out.push_str(sep);
            }
            Ok(())
        });
        out
    }

    /// This node's rendered code prefix: `code(<N>), ` when the current
    /// code is non-zero, otherwise the empty string.
    pub fn code_str(&self) -> String {
        let code = self.current_code();
        if code == 0 {
            String::new()
        } else {
            format!("code({code}), ")
        }
    }

    fn write_self_to(&self, out: &mut String, print_trace: bool, last_code: &mut i64) {
        let code = self.current_code();
        if code != 0 && code != *last_code {
            let _ = write!(out, "code({code}), ");
        }
        *last_code = code;
        out.push_str(&self.msg);
        for (key, value) in self.tag_pairs() {
            let _ = write!(out, "[{key}:{value}] ");
        }
        if print_trace {
            if let Some(frame) = self.trace_info() {
                out.push(' ');
                out.push_str(frame.rendered());
            }
        }
    }
}
