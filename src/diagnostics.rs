//! Error handling (spec.md §7) and the `Diagnostic` shape used by the
//! linter (C12) and the parser's error-recovery path (C7). Hand-rolled
//! `std::error::Error` implementations, not `thiserror`/`anyhow` — the
//! ambient stack this repo is built on favors explicit enums over
//! macro-derived error types.

use std::fmt;
use std::path::PathBuf;

use crate::span::{PackedSpan, RuleId, Span};

/// The top-level error type threaded through CLI-facing operations.
/// Each variant corresponds to one row of spec.md §7's error-kind
/// table; recoverable anomalies (lex/parse errors, lint findings) are
/// represented as [`Diagnostic`]s instead and never constructed here.
#[derive(Debug)]
pub enum ZzError {
    /// Resource exhaustion: propagate immediately, abort the current
    /// operation.
    OutOfMemory,
    /// Filesystem error that should be logged and skipped so the next
    /// file in a batch continues.
    FileSkipped { path: PathBuf, source: std::io::Error },
    /// Filesystem error with no safe continuation.
    Io(std::io::Error),
    /// `zz.zon` failed to parse; callers fall back to built-in
    /// defaults and log a warning rather than propagating this.
    ConfigMalformed { path: PathBuf, message: String },
    /// The formatter's own idempotence/invariant check failed; callers
    /// log and write the original source unchanged.
    Unformattable { message: String },
    /// A CLI surface named in spec.md §6 that is intentionally a thin,
    /// not-yet-wired stub (e.g. `deps --update`), kept honest about its
    /// thinness instead of faking behavior it doesn't have.
    NotImplemented { what: String },
}

impl fmt::Display for ZzError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZzError::OutOfMemory => write!(f, "out of memory"),
            ZzError::FileSkipped { path, source } => write!(f, "skipping {}: {}", path.display(), source),
            ZzError::Io(err) => write!(f, "I/O error: {err}"),
            ZzError::ConfigMalformed { path, message } => write!(f, "{}: {}", path.display(), message),
            ZzError::Unformattable { message } => write!(f, "unformattable: {message}"),
            ZzError::NotImplemented { what } => write!(f, "not yet implemented: {what}"),
        }
    }
}

impl std::error::Error for ZzError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ZzError::FileSkipped { source, .. } => Some(source),
            ZzError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ZzError {
    fn from(err: std::io::Error) -> Self {
        ZzError::Io(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// A single lint or parse-error finding: `{rule_id, severity, message,
/// span, optional_fix}` (spec.md §3).
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub rule_id: RuleId,
    pub severity: Severity,
    pub message: String,
    pub span: PackedSpan,
    pub fix: Option<Edit>,
}

impl Diagnostic {
    pub fn new(rule_id: RuleId, severity: Severity, message: impl Into<String>, span: Span) -> Self {
        Diagnostic {
            rule_id,
            severity,
            message: message.into(),
            span: span.pack(),
            fix: None,
        }
    }

    pub fn with_fix(mut self, fix: Edit) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Renders `LEVEL: message  at PATH:LINE` (spec.md §6's diagnostic
    /// convention). `line` is 1-based and computed by the caller, since
    /// a `Diagnostic` alone only carries a byte span.
    pub fn render(&self, path: &str, line: u32) -> String {
        format!("{}: {}  at {}:{}", self.severity, self.message, path, line)
    }
}

/// A proposed or applied edit: `{range, replacement, generation}`
/// (spec.md §3, consumed by C13).
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub range: PackedSpan,
    pub replacement: Vec<u8>,
    pub generation: u32,
}

/// Computes the 1-based line number of a byte offset, for rendering
/// diagnostics per spec.md §6.
pub fn line_of(source: &str, offset: u32) -> u32 {
    1 + source.as_bytes()[..(offset as usize).min(source.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::json;

    #[test]
    fn render_matches_level_message_at_path_line_convention() {
        let diag = Diagnostic::new(json::OBJECT, Severity::Warning, "duplicate key", Span::new(0, 1));
        assert_eq!(diag.render("foo.json", 3), "WARNING: duplicate key  at foo.json:3");
    }

    #[test]
    fn line_of_counts_preceding_newlines() {
        let src = "a\nb\nc";
        assert_eq!(line_of(src, 0), 1);
        assert_eq!(line_of(src, 2), 2);
        assert_eq!(line_of(src, 4), 3);
    }
}
