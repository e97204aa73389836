//! Error types for the stubmerge-syntax crate.

use std::backtrace::Backtrace;
use std::fmt;

use crate::model::TextRange;

/// Error type for document edit operations.
///
/// Edits fail only when a caller presents a range that does not exist in
/// (or is not aligned with) the current text, which means the caller is
/// holding state from a superseded parse.
#[derive(Debug)]
pub struct EditError {
    kind: EditErrorKind,
    backtrace: Backtrace,
}

/// Internal error variants. Not exposed publicly; use `is_xxx()` methods instead.
#[derive(Debug)]
pub(crate) enum EditErrorKind {
    /// The edit range lies outside the current document text.
    OutOfBounds { range: TextRange, len: usize },
    /// The edit range does not fall on character boundaries.
    Misaligned(TextRange),
}

impl EditError {
    pub(crate) fn new(kind: EditErrorKind) -> Self {
        Self {
            kind,
            backtrace: Backtrace::capture(),
        }
    }

    /// Returns true if the edit range lay outside the document.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self.kind, EditErrorKind::OutOfBounds { .. })
    }

    /// Returns true if the edit range split a multi-byte character.
    pub fn is_misaligned(&self) -> bool {
        matches!(self.kind, EditErrorKind::Misaligned(_))
    }

    /// Returns the backtrace captured when this error was created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for EditErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditErrorKind::OutOfBounds { range, len } => write!(
                f,
                "edit range {}..{} outside document of length {len}",
                range.start, range.end
            ),
            EditErrorKind::Misaligned(range) => write!(
                f,
                "edit range {}..{} not on character boundaries",
                range.start, range.end
            ),
        }
    }
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Summary of what happened.
        writeln!(f, "{}", self.kind)?;

        // Backtrace (will be empty unless RUST_BACKTRACE is set).
        write!(f, "{}", self.backtrace)
    }
}

impl std::error::Error for EditError {}
