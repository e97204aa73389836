//! Invocation arena and text-range primitives.
//!
//! A parse produces a [`SourceModel`]: an arena of [`Invocation`] records
//! addressed by [`InvocationId`], plus the roots of every call chain found
//! in the document. The arena is an immutable snapshot of one parse; after
//! any committed edit it is rebuilt wholesale rather than patched, so no
//! record can dangle into stale text.

use serde::Serialize;

/// Half-open byte range `start..end` into the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted range {start}..{end}");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Slices the range out of `text`.
    ///
    /// Ranges are only ever produced by the parser over the same text, so
    /// indexing cannot go out of bounds while the parse is current.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Arena index of one [`Invocation`].
///
/// Ids are only meaningful against the [`SourceModel`] that produced them;
/// a re-parse invalidates all previously handed-out ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvocationId(pub(crate) u32);

impl InvocationId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// One argument expression of a call, as raw text.
///
/// Argument shape (class literal vs. constructor call) is classified on
/// demand by the analysis crate and never cached here, so the text and any
/// classification of it can only disagree across an edit, at which point
/// the whole model is rebuilt anyway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentExpr {
    pub text: String,
    pub range: TextRange,
}

/// Read-only view of one call in a fluent chain.
///
/// `range` spans from the start of the chain's receiver through this call's
/// closing parenthesis, mirroring how a method-call node covers its whole
/// receiver subexpression in a real syntax tree. The half-open range
/// `prev.range.end .. call.range.end` therefore covers exactly the
/// `.method(args)` text of `call`, which is what the merge rewriter deletes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Method name of this call.
    pub method: String,
    /// Range of the method-name token; diagnostics anchor here.
    pub method_range: TextRange,
    /// Dotted receiver path before the first call (`Mockito`, `mocked`, ...).
    /// Only the chain root carries one; later calls are qualified by their
    /// predecessor.
    pub receiver: Option<String>,
    /// Ordered argument expressions.
    pub args: Vec<ArgumentExpr>,
    /// Chain start through this call's closing parenthesis.
    pub range: TextRange,
    /// The preceding call in the chain, if any.
    pub qualifier: Option<InvocationId>,
    /// The call whose qualifier is this call, if any.
    pub next: Option<InvocationId>,
}

impl Invocation {
    pub fn has_arguments(&self) -> bool {
        !self.args.is_empty()
    }

    /// Range between the call's parentheses, excluding them.
    ///
    /// Needed when appending arguments to a call whose argument list is
    /// currently empty.
    pub fn argument_list_interior(&self) -> TextRange {
        // The parser guarantees range.end sits just past the `)`.
        match (self.args.first(), self.args.last()) {
            (Some(first), Some(last)) => {
                TextRange::new(first.range.start, last.range.end)
            }
            _ => TextRange::new(self.range.end - 1, self.range.end - 1),
        }
    }
}

/// Immutable snapshot of every call chain found in one parse of a document.
#[derive(Debug, Default)]
pub struct SourceModel {
    invocations: Vec<Invocation>,
    roots: Vec<InvocationId>,
}

impl SourceModel {
    pub(crate) fn new(
        invocations: Vec<Invocation>,
        roots: Vec<InvocationId>,
    ) -> Self {
        Self { invocations, roots }
    }

    /// Chain roots in document order.
    pub fn roots(&self) -> &[InvocationId] {
        &self.roots
    }

    pub fn get(&self, id: InvocationId) -> &Invocation {
        &self.invocations[id.index()]
    }

    pub fn invocation_count(&self) -> usize {
        self.invocations.len()
    }
}
