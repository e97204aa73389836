//! Run detection: maximal groups of consecutive target-method calls.

use stubmerge_syntax::{InvocationId, SourceModel};
use tracing::debug;

use crate::descriptor::CallAnalyzer;

/// A maximal run of consecutive calls to an analyzer's target method.
///
/// `members` are indices into the collected chain, strictly increasing and
/// contiguous, always at least two of them. A run is a transient product of
/// one detection pass; it must never outlive an edit to the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub members: Vec<usize>,
}

impl Run {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn first_member(&self) -> usize {
        self.members[0]
    }

    pub fn last_member(&self) -> usize {
        self.members[self.members.len() - 1]
    }
}

/// Scans a collected chain for runs of the analyzer's target method.
///
/// Single left-to-right pass starting at the analyzer's start index. A call
/// joins the current group when its name equals the target method and the
/// analyzer's extra condition holds; any other call flushes the group.
/// Groups of fewer than two calls are discarded: a single occurrence has
/// nothing to merge with. Distinct runs in one chain are returned
/// separately, in chain order.
pub fn detect_runs(
    model: &SourceModel,
    chain: &[InvocationId],
    analyzer: &CallAnalyzer,
) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut current = Vec::new();

    for (index, &id) in
        chain.iter().enumerate().skip(analyzer.start_index())
    {
        let call = model.get(id);
        if call.method == analyzer.consecutive_method
            && analyzer.accepts_member(call)
        {
            current.push(index);
        } else {
            flush(&mut runs, &mut current);
        }
    }
    // Matching calls at the end of the chain close out the final run.
    flush(&mut runs, &mut current);

    if !runs.is_empty() {
        debug!(
            dialect = analyzer.dialect,
            target = analyzer.consecutive_method,
            runs = runs.len(),
            "detected consecutive-call runs"
        );
    }
    runs
}

fn flush(runs: &mut Vec<Run>, current: &mut Vec<usize>) {
    if current.len() > 1 {
        runs.push(Run {
            members: std::mem::take(current),
        });
    } else {
        current.clear();
    }
}

#[cfg(test)]
mod tests {
    use stubmerge_syntax::{collect_chain, parse_source};

    use super::*;
    use crate::descriptor::{return_merge_analyzers, throw_merge_analyzers};

    fn runs_in(source: &str, analyzer: &CallAnalyzer) -> Vec<Run> {
        let model = parse_source(source);
        let chain = collect_chain(&model, model.roots()[0]);
        detect_runs(&model, &chain, analyzer)
    }

    #[test]
    fn consecutive_calls_form_one_run() {
        let runs = runs_in(
            "Mockito.doReturn(1).doReturn(2).doReturn(3).when(mock)",
            &return_merge_analyzers()[0],
        );
        assert_eq!(runs, vec![Run { members: vec![0, 1, 2] }]);
    }

    #[test]
    fn skipped_first_call_is_never_a_member() {
        let runs = runs_in(
            "Mockito.when(x).thenReturn(1).thenReturn(2)",
            &return_merge_analyzers()[2],
        );
        assert_eq!(runs, vec![Run { members: vec![1, 2] }]);
    }

    #[test]
    fn single_occurrence_is_not_a_run() {
        let runs = runs_in(
            "Mockito.when(x).thenReturn(1)",
            &return_merge_analyzers()[2],
        );
        assert!(runs.is_empty());
    }

    #[test]
    fn interleaved_calls_split_runs() {
        let runs = runs_in(
            "Mockito.doReturn(1).doReturn(2).doThrow(e).doReturn(3).doReturn(4).when(mock)",
            &return_merge_analyzers()[0],
        );
        assert_eq!(
            runs,
            vec![
                Run { members: vec![0, 1] },
                Run { members: vec![3, 4] },
            ]
        );
        // Emitted runs never share a chain index.
        let mut seen = std::collections::HashSet::new();
        for run in &runs {
            for &member in &run.members {
                assert!(seen.insert(member));
            }
        }
    }

    #[test]
    fn zero_argument_throw_call_breaks_the_run() {
        let runs = runs_in(
            "Mockito.doThrow(a).doThrow().doThrow(b).when(mock)",
            &throw_merge_analyzers()[0],
        );
        // The bare doThrow() fails the extra condition, so neither side
        // reaches the two-call minimum.
        assert!(runs.is_empty());
    }

    #[test]
    fn trailing_run_at_end_of_chain_is_emitted() {
        let runs = runs_in(
            "BDDMockito.given(x).willReturn(1).willReturn(2)",
            &return_merge_analyzers()[1],
        );
        assert_eq!(runs, vec![Run { members: vec![1, 2] }]);
    }
}
