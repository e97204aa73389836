//! Merge rewriting: collapses a run of consecutive calls into one call.
//!
//! The rewrite runs inside a single transactional edit scope and applies
//! its steps in a fixed order, committing between batches so that offset
//! bookkeeping stays valid:
//!
//! 1. convert the first run member's arguments in place;
//! 2. append each subsequent member's (converted) arguments onto the first
//!    member's argument list, in run order, committing after each append —
//!    a later member's text must be read before any deletion shifts it;
//! 3. repeatedly delete the call directly after the first member, which
//!    consumes one `.target(args)` chunk per deletion without re-locating
//!    anything else.
//!
//! Run members are addressed through stable handles re-resolved after each
//! commit. If any precondition fails — a member vanished or is no longer a
//! call to the target method — the whole scope aborts and the document is
//! left untouched.

use itertools::Itertools;
use stubmerge_syntax::{Document, EditTx, Handle, Invocation, TextRange};
use tracing::debug;

use crate::error::RewriteError;
use crate::registrar::ProposedAction;

/// Applies one proposed merge action to the document.
///
/// All-or-nothing: on error the document text is unchanged. A stale run
/// (source edited since the diagnostic was produced) surfaces as
/// [`RewriteError::is_stale_run`]; the caller is expected to re-analyze.
pub fn apply_merge(
    document: &mut Document,
    action: &ProposedAction,
) -> Result<(), RewriteError> {
    let location = &action.location;
    let target = location.target_method.as_str();
    let first_handle = Handle {
        chain: location.chain,
        call: location.first_member,
    };

    document.transact(|tx| {
        // Every member must still be a call to the target method before
        // the first edit lands; the run is not re-validated mid-rewrite.
        for offset in 0..location.member_count {
            member_call(tx, first_handle, offset, target)?;
        }

        convert_first_member(tx, first_handle, target, action)?;
        append_trailing_arguments(tx, first_handle, target, action)?;
        remove_trailing_calls(tx, first_handle, target, location.member_count)
    })?;

    debug!(
        target,
        members = location.member_count,
        strategy = ?action.strategy,
        "merged consecutive calls"
    );
    Ok(())
}

/// Resolves the run member `offset` calls after the first one and checks
/// it still is a call to the target method.
fn member_call<'a>(
    tx: &'a EditTx<'_>,
    first: Handle,
    offset: usize,
    target: &str,
) -> Result<&'a Invocation, RewriteError> {
    let handle = Handle {
        chain: first.chain,
        call: first.call + offset,
    };
    let id = tx.resolve(handle).ok_or_else(|| RewriteError::stale(target))?;
    let call = tx.model().get(id);
    if call.method != target {
        return Err(RewriteError::stale(target));
    }
    Ok(call)
}

/// Step 1: convert the first member's arguments in place.
///
/// Arguments are rewritten back to front so that each edit leaves the
/// not-yet-edited ranges untouched; one commit closes the batch.
fn convert_first_member(
    tx: &mut EditTx<'_>,
    first: Handle,
    target: &str,
    action: &ProposedAction,
) -> Result<(), RewriteError> {
    let args = member_call(tx, first, 0, target)?.args.clone();
    for argument in args.iter().rev() {
        let converted = action.strategy.convert(&argument.text);
        if converted != argument.text {
            tx.replace_range(argument.range, &converted)?;
        }
    }
    tx.commit();
    Ok(())
}

/// Step 2: append each later member's converted arguments to the first
/// member, committing per member so the next member's text is read from a
/// current parse.
fn append_trailing_arguments(
    tx: &mut EditTx<'_>,
    first: Handle,
    target: &str,
    action: &ProposedAction,
) -> Result<(), RewriteError> {
    for offset in 1..action.location.member_count {
        let member = member_call(tx, first, offset, target)?;
        let appended = member
            .args
            .iter()
            .map(|argument| action.strategy.convert(&argument.text))
            .join(", ");
        if appended.is_empty() {
            continue;
        }

        let receiver = member_call(tx, first, 0, target)?;
        let insert_at = receiver.argument_list_interior().end;
        let text = if receiver.has_arguments() {
            format!(", {appended}")
        } else {
            appended
        };
        tx.insert(insert_at, &text)?;
        tx.commit();
    }
    Ok(())
}

/// Step 3: delete the trailing run members.
///
/// Each pass removes the half-open range between the first member's end
/// and the end of the call chained directly onto it, i.e. one
/// `.target(args)` chunk, then commits. Boundaries always come from the
/// current parse, so nothing has to be re-located after the shift.
fn remove_trailing_calls(
    tx: &mut EditTx<'_>,
    first: Handle,
    target: &str,
    member_count: usize,
) -> Result<(), RewriteError> {
    for _ in 1..member_count {
        let receiver = member_call(tx, first, 0, target)?;
        let trailing = member_call(tx, first, 1, target)?;
        let range =
            TextRange::new(receiver.range.end, trailing.range.end);
        tx.delete_range(range)?;
        tx.commit();
    }
    Ok(())
}
