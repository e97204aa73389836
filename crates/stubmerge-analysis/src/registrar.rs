//! Diagnostic registration: one diagnostic per detected run.
//!
//! For every chain in a document, the first matching analyzer of each
//! registry (return-merge, throw-merge) is selected and its runs are
//! reported into a [`DiagnosticSink`]. Each diagnostic is anchored at the
//! last run member's method name, carries a message naming the target
//! method, and proposes one merge action per strategy the planner offers.

use serde::Serialize;
use stubmerge_syntax::{
    Document, InvocationId, SourceModel, TextRange, collect_chain,
};
use tracing::debug;

use crate::descriptor::{
    CallAnalyzer, return_merge_analyzers, throw_merge_analyzers,
};
use crate::detect::{Run, detect_runs};
use crate::plan::{MergeStrategy, plan_run_strategies};

/// Where a run lives: chain ordinal in document order, first member's call
/// index within the chain, member count, and the target method name.
///
/// Purely structural, so it stays meaningful for the rewriter after the
/// offsets captured in the diagnostic anchor have shifted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunLocation {
    pub chain: usize,
    pub first_member: usize,
    pub member_count: usize,
    pub target_method: String,
}

/// One actionable merge proposal attached to a diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct ProposedAction {
    pub label: String,
    pub strategy: MergeStrategy,
    pub location: RunLocation,
}

/// One reported run of consecutive calls.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Range of the last run member's method-name token.
    pub anchor: TextRange,
    pub message: String,
    pub actions: Vec<ProposedAction>,
}

/// Sink the registrar writes diagnostics into.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Analyzes every chain of `document` and collects the diagnostics.
pub fn analyze_document(document: &Document) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    analyze_into(document, &mut diagnostics);
    diagnostics
}

/// Analyzes every chain of `document` into `sink`.
///
/// The return-merge and throw-merge registries are applied independently;
/// within a registry, the first analyzer whose starter matches the chain's
/// opening call wins (registry order is the documented priority).
pub fn analyze_into(document: &Document, sink: &mut dyn DiagnosticSink) {
    let model = document.model();
    for (chain_ordinal, &root) in model.roots().iter().enumerate() {
        let chain = collect_chain(model, root);
        for registry in
            [return_merge_analyzers(), throw_merge_analyzers()]
        {
            let opener = model.get(chain[0]);
            let Some(analyzer) =
                registry.iter().find(|a| a.can_analyze(opener))
            else {
                continue;
            };
            for run in detect_runs(model, &chain, analyzer) {
                sink.report(diagnostic_for(
                    model,
                    &chain,
                    chain_ordinal,
                    &run,
                    analyzer,
                ));
            }
        }
    }
}

fn diagnostic_for(
    model: &SourceModel,
    chain: &[InvocationId],
    chain_ordinal: usize,
    run: &Run,
    analyzer: &CallAnalyzer,
) -> Diagnostic {
    // Run members are consecutive chain positions; a gap would have been
    // flushed by the detector.
    debug_assert!(
        run.members
            .windows(2)
            .all(|pair| pair[1] == pair[0] + 1)
    );

    let location = RunLocation {
        chain: chain_ordinal,
        first_member: run.first_member(),
        member_count: run.len(),
        target_method: analyzer.consecutive_method.to_owned(),
    };

    let actions = plan_run_strategies(model, chain, run, analyzer)
        .into_iter()
        .map(|strategy| ProposedAction {
            label: action_label(analyzer.consecutive_method, strategy),
            strategy,
            location: location.clone(),
        })
        .collect();

    let last = model.get(chain[run.last_member()]);
    debug!(
        dialect = analyzer.dialect,
        members = run.len(),
        anchor_start = last.method_range.start,
        "registered consecutive-call diagnostic"
    );
    Diagnostic {
        anchor: last.method_range,
        message: format!(
            "{} consecutive `{}` calls can be merged into a single call",
            run.len(),
            analyzer.consecutive_method
        ),
        actions,
    }
}

fn action_label(target: &str, strategy: MergeStrategy) -> String {
    match strategy.conversion_label() {
        Some(conversion) => format!(
            "Merge with previous consecutive {target} calls, converting arguments to {conversion}"
        ),
        None => format!("Merge with previous consecutive {target} calls"),
    }
}
