//! Chain collection: the full call sequence around any call in a chain.

use crate::model::{InvocationId, SourceModel};

/// Collects the whole chain containing `call`, in call order.
///
/// Walks qualifier links back to the root (the first call whose qualifier
/// is not itself a call), then forward again. Works from any position in
/// the chain and never fails: a call with no links at all yields a
/// single-element chain.
pub fn collect_chain(
    model: &SourceModel,
    call: InvocationId,
) -> Vec<InvocationId> {
    let mut root = call;
    while let Some(qualifier) = model.get(root).qualifier {
        root = qualifier;
    }

    let mut chain = vec![root];
    let mut current = root;
    while let Some(next) = model.get(current).next {
        chain.push(next);
        current = next;
    }
    chain
}
