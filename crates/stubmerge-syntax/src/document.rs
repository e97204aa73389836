//! Editable document with transactional edit scopes and stable handles.
//!
//! The source model is a snapshot of one parse; any committed edit
//! invalidates it wholesale. A [`Handle`] therefore names a call by its
//! position in the chain structure (chain ordinal plus call index) rather
//! than by offset or arena id, and is re-resolved against the current model
//! after every commit. The handle does not own the call it points at, it
//! only locates it; if the structure changed underneath, resolution returns
//! `None` and the caller aborts.

use serde::Serialize;
use tracing::debug;

use crate::error::{EditError, EditErrorKind};
use crate::model::{InvocationId, SourceModel, TextRange};
use crate::parse::parse_source;

/// A text buffer paired with the source model of its current content.
#[derive(Debug)]
pub struct Document {
    text: String,
    model: SourceModel,
}

/// Stable position of one call: chain ordinal in document order, call
/// index within the chain. Survives offset shifts; does not survive the
/// named call itself disappearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Handle {
    pub chain: usize,
    pub call: usize,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let model = parse_source(&text);
        Self { text, model }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn model(&self) -> &SourceModel {
        &self.model
    }

    /// Resolves a handle against the current model.
    pub fn resolve(&self, handle: Handle) -> Option<InvocationId> {
        resolve_in(&self.model, handle)
    }

    /// Computes the handle naming `call` in the current model.
    pub fn handle_of(&self, call: InvocationId) -> Option<Handle> {
        for (chain, &root) in self.model.roots().iter().enumerate() {
            let mut current = root;
            let mut index = 0;
            loop {
                if current == call {
                    return Some(Handle { chain, call: index });
                }
                let Some(next) = self.model.get(current).next else {
                    // End of this chain; the call may live in a later one.
                    break;
                };
                current = next;
                index += 1;
            }
        }
        None
    }

    /// Runs `f` inside a transactional edit scope.
    ///
    /// On `Ok` the accumulated edits are kept and a final commit re-parses
    /// the model. On `Err` the document is restored to its pre-transaction
    /// text: either every edit applies or none does.
    pub fn transact<T, E>(
        &mut self,
        f: impl FnOnce(&mut EditTx<'_>) -> Result<T, E>,
    ) -> Result<T, E> {
        let snapshot = self.text.clone();
        let mut tx = EditTx { doc: self };
        match f(&mut tx) {
            Ok(value) => {
                self.reparse();
                Ok(value)
            }
            Err(err) => {
                debug!("edit transaction aborted, restoring snapshot");
                self.text = snapshot;
                self.reparse();
                Err(err)
            }
        }
    }

    fn reparse(&mut self) {
        self.model = parse_source(&self.text);
    }

    fn check_range(&self, range: TextRange) -> Result<(), EditError> {
        if range.end > self.text.len() {
            return Err(EditError::new(EditErrorKind::OutOfBounds {
                range,
                len: self.text.len(),
            }));
        }
        if !self.text.is_char_boundary(range.start)
            || !self.text.is_char_boundary(range.end)
        {
            return Err(EditError::new(EditErrorKind::Misaligned(range)));
        }
        Ok(())
    }
}

/// Edit scope handed to [`Document::transact`] closures.
///
/// Edits apply to the text immediately, but the model only advances at
/// [`EditTx::commit`]. Offsets and handles must be re-read after each
/// commit; between edits of one batch the model is stale by design.
pub struct EditTx<'a> {
    doc: &'a mut Document,
}

impl EditTx<'_> {
    pub fn text(&self) -> &str {
        &self.doc.text
    }

    /// Model as of the last commit barrier.
    pub fn model(&self) -> &SourceModel {
        &self.doc.model
    }

    /// Resolves a handle against the model as of the last commit.
    pub fn resolve(&self, handle: Handle) -> Option<InvocationId> {
        resolve_in(&self.doc.model, handle)
    }

    /// Replaces `range` with `new_text`.
    pub fn replace_range(
        &mut self,
        range: TextRange,
        new_text: &str,
    ) -> Result<(), EditError> {
        self.doc.check_range(range)?;
        self.doc.text.replace_range(range.start..range.end, new_text);
        Ok(())
    }

    /// Inserts `new_text` at `offset`.
    pub fn insert(
        &mut self,
        offset: usize,
        new_text: &str,
    ) -> Result<(), EditError> {
        self.replace_range(TextRange::new(offset, offset), new_text)
    }

    /// Deletes the text covered by `range`.
    pub fn delete_range(&mut self, range: TextRange) -> Result<(), EditError> {
        self.replace_range(range, "")
    }

    /// Commit barrier: re-parses the model from the current text so that
    /// subsequent resolutions see the edits applied so far.
    pub fn commit(&mut self) {
        self.doc.reparse();
    }
}

fn resolve_in(model: &SourceModel, handle: Handle) -> Option<InvocationId> {
    let mut current = *model.roots().get(handle.chain)?;
    for _ in 0..handle.call {
        current = model.get(current).next?;
    }
    Some(current)
}
