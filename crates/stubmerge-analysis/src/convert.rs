//! Standalone argument conversion for a single `*Throw()` call.
//!
//! Independent of run merging: when one throw-stubbing call's arguments
//! are homogeneous — all class literals, or all default-constructor
//! instances — the inverse form is an equivalent spelling, and this module
//! flips between them. A non-default constructor argument disqualifies the
//! conversion to class literals, since it would drop the constructor
//! arguments.

use stubmerge_syntax::{Document, Handle, Invocation};
use tracing::debug;

use crate::classify::{ArgumentShape, classify};
use crate::descriptor::{DO_THROW, THEN_THROW, WILL_THROW};
use crate::error::{RewriteError, RewriteErrorKind};
use crate::plan::MergeStrategy;

const THROW_METHODS: &[&str] = &[DO_THROW, THEN_THROW, WILL_THROW];

/// Returns the conversion applicable to `call`, if any.
///
/// `Some(ToConstructedInstance)` when every argument is a class literal,
/// `Some(ToTypeLiteral)` when every argument is a default construction.
pub fn applicable_conversion(call: &Invocation) -> Option<MergeStrategy> {
    if !THROW_METHODS.contains(&call.method.as_str())
        || !call.has_arguments()
    {
        return None;
    }
    let shapes: Vec<_> =
        call.args.iter().map(|a| classify(&a.text)).collect();

    if shapes.iter().all(|s| *s == ArgumentShape::TypeLiteral) {
        return Some(MergeStrategy::ToConstructedInstance);
    }
    if shapes.iter().all(|s| {
        *s == ArgumentShape::ConstructedInstance { has_ctor_args: false }
    }) {
        return Some(MergeStrategy::ToTypeLiteral);
    }
    None
}

/// Converts the arguments of the call named by `handle`.
///
/// Returns the applied conversion. Fails without mutating when the handle
/// no longer resolves or the call's arguments are not convertible.
pub fn convert_throw_arguments(
    document: &mut Document,
    handle: Handle,
) -> Result<MergeStrategy, RewriteError> {
    document.transact(|tx| {
        let id = tx.resolve(handle).ok_or_else(|| {
            RewriteError::new(RewriteErrorKind::NotConvertible {
                method: String::from("<unresolved>"),
            })
        })?;
        let call = tx.model().get(id);
        let strategy = applicable_conversion(call).ok_or_else(|| {
            RewriteError::new(RewriteErrorKind::NotConvertible {
                method: call.method.clone(),
            })
        })?;

        let args = call.args.clone();
        for argument in args.iter().rev() {
            let converted = strategy.convert(&argument.text);
            tx.replace_range(argument.range, &converted)?;
        }
        tx.commit();
        debug!(?strategy, "converted throw-stubbing arguments");
        Ok(strategy)
    })
}

#[cfg(test)]
mod tests {
    use stubmerge_syntax::Document;

    use super::*;

    fn call_handle(doc: &Document, chain: usize, call: usize) -> Handle {
        let handle = Handle { chain, call };
        assert!(doc.resolve(handle).is_some());
        handle
    }

    #[test]
    fn class_literals_convert_to_constructions() {
        let mut doc = Document::new(
            "Mockito.when(x).thenThrow(A.class, b.B.class);",
        );
        let handle = call_handle(&doc, 0, 1);
        let applied = convert_throw_arguments(&mut doc, handle).unwrap();
        assert_eq!(applied, MergeStrategy::ToConstructedInstance);
        assert_eq!(
            doc.text(),
            "Mockito.when(x).thenThrow(new A(), new b.B());"
        );
    }

    #[test]
    fn default_constructions_convert_to_class_literals() {
        let mut doc =
            Document::new("BDDMockito.willThrow(new A(), new B()).given(x);");
        let handle = call_handle(&doc, 0, 0);
        let applied = convert_throw_arguments(&mut doc, handle).unwrap();
        assert_eq!(applied, MergeStrategy::ToTypeLiteral);
        assert_eq!(
            doc.text(),
            "BDDMockito.willThrow(A.class, B.class).given(x);"
        );
    }

    #[test]
    fn non_default_constructor_blocks_conversion() {
        let mut doc = Document::new(
            r#"Mockito.doThrow(new A(), new B("msg")).when(mock);"#,
        );
        let original = doc.text().to_owned();
        let handle = call_handle(&doc, 0, 0);
        let err = convert_throw_arguments(&mut doc, handle).unwrap_err();
        assert!(err.is_not_convertible());
        assert_eq!(doc.text(), original);
    }

    #[test]
    fn mixed_shapes_are_not_convertible() {
        let doc =
            Document::new("Mockito.doThrow(A.class, new B()).when(mock);");
        let id = doc.resolve(Handle { chain: 0, call: 0 }).unwrap();
        assert_eq!(applicable_conversion(doc.model().get(id)), None);
    }

    #[test]
    fn unrelated_methods_are_not_convertible() {
        let doc = Document::new("Mockito.when(x).thenReturn(A.class);");
        let id = doc.resolve(Handle { chain: 0, call: 1 }).unwrap();
        assert_eq!(applicable_conversion(doc.model().get(id)), None);
    }
}
