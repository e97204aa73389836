//! Consecutive stubbing-call detection and merge rewriting.
//!
//! This crate analyzes fluent mocking-library call chains (Mockito,
//! BDDMockito, MockedStatic dialects) for maximal runs of consecutive calls
//! to the same stubbing method, e.g.
//!
//! ```java
//! Mockito.when(mock.greet()).thenReturn("a").thenReturn("b");
//! ```
//!
//! and can merge such a run into a single call with the arguments
//! concatenated:
//!
//! ```java
//! Mockito.when(mock.greet()).thenReturn("a", "b");
//! ```
//!
//! For `*Throw()` calls, whose arguments may mix class literals
//! (`IOException.class`) and constructed throwables (`new IOException()`),
//! the merge additionally offers an argument conversion policy so the
//! merged call's arguments are homogeneous.
//!
//! Pipeline: chain collection ([`stubmerge_syntax`]) → run detection
//! ([`detect`]) per analyzer descriptor ([`descriptor`]) → strategy
//! planning ([`plan`]) → diagnostic registration ([`registrar`]) → merge
//! rewriting ([`rewrite`]) on demand.

pub mod classify;
pub mod convert;
pub mod descriptor;
pub mod detect;
pub mod error;
pub mod plan;
pub mod registrar;
pub mod rewrite;

pub use classify::ArgumentShape;
pub use convert::{applicable_conversion, convert_throw_arguments};
pub use descriptor::{
    CallAnalyzer, ChainFamily, return_merge_analyzers, throw_merge_analyzers,
};
pub use detect::{Run, detect_runs};
pub use error::RewriteError;
pub use plan::MergeStrategy;
pub use registrar::{
    Diagnostic, DiagnosticSink, ProposedAction, RunLocation,
    analyze_document,
};
pub use rewrite::apply_merge;
