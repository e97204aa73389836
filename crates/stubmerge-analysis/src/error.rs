//! Error types for the stubmerge-analysis crate.

use std::backtrace::Backtrace;
use std::fmt;

use stubmerge_syntax::EditError;

/// Error type for merge rewrite application.
///
/// Detection itself has no error mode: a chain that matches nothing is an
/// expected negative result. A rewrite, however, runs against source that
/// may have changed since its diagnostic was produced; any violated
/// precondition aborts the whole edit scope with no partial mutation.
#[derive(Debug)]
pub struct RewriteError {
    kind: RewriteErrorKind,
    backtrace: Backtrace,
}

/// Internal error variants. Not exposed publicly; use `is_xxx()` methods instead.
#[derive(Debug)]
pub(crate) enum RewriteErrorKind {
    /// A run member no longer exists or is no longer a call to the target
    /// method; the source changed since detection.
    StaleRun { target: String },
    /// The targeted call has no argument list to convert.
    NotConvertible { method: String },
    /// A text edit failed.
    Edit(EditError),
}

impl RewriteError {
    pub(crate) fn new(kind: RewriteErrorKind) -> Self {
        Self {
            kind,
            backtrace: Backtrace::capture(),
        }
    }

    pub(crate) fn stale(target: &str) -> Self {
        Self::new(RewriteErrorKind::StaleRun {
            target: target.to_owned(),
        })
    }

    /// Returns true if the rewrite found its run outdated by a later edit.
    pub fn is_stale_run(&self) -> bool {
        matches!(self.kind, RewriteErrorKind::StaleRun { .. })
    }

    /// Returns true if the targeted call had nothing to convert.
    pub fn is_not_convertible(&self) -> bool {
        matches!(self.kind, RewriteErrorKind::NotConvertible { .. })
    }

    /// Returns true if a text edit failed.
    pub fn is_edit(&self) -> bool {
        matches!(self.kind, RewriteErrorKind::Edit(_))
    }

    /// Returns the backtrace captured when this error was created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl From<EditError> for RewriteError {
    fn from(err: EditError) -> Self {
        Self::new(RewriteErrorKind::Edit(err))
    }
}

impl fmt::Display for RewriteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteErrorKind::StaleRun { target } => write!(
                f,
                "consecutive `{target}` calls changed since detection; re-run analysis"
            ),
            RewriteErrorKind::NotConvertible { method } => {
                write!(f, "`{method}` call has no convertible arguments")
            }
            RewriteErrorKind::Edit(err) => {
                write!(f, "text edit failed: {err}")
            }
        }
    }
}

impl fmt::Display for RewriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Summary of what happened.
        writeln!(f, "{}", self.kind)?;

        // Backtrace (will be empty unless RUST_BACKTRACE is set).
        write!(f, "{}", self.backtrace)
    }
}

impl std::error::Error for RewriteError {}
