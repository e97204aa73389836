//! Lightweight source model for fluent stubbing call chains.
//!
//! This crate parses Java-like test sources just far enough to expose the
//! structure the merge analysis needs: fluent call chains, each call's name
//! and argument texts with byte ranges, and qualifier links between
//! consecutive calls. It deliberately performs no name binding or type
//! resolution.
//!
//! The other half of the crate is the editable [`Document`]: a text buffer
//! with transactional edit scopes, an explicit commit barrier that re-parses
//! the source model, and stable position [`Handle`]s that re-resolve against
//! the current parse instead of caching raw offsets.

pub mod chain;
pub mod document;
pub mod error;
pub mod lexer;
pub mod model;
pub mod parse;

pub use chain::collect_chain;
pub use document::{Document, EditTx, Handle};
pub use error::EditError;
pub use model::{
    ArgumentExpr, Invocation, InvocationId, SourceModel, TextRange,
};
pub use parse::parse_source;
