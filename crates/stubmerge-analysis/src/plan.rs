//! Merge strategy planning: which argument conversions to offer for a run.
//!
//! Return-merge runs concatenate arguments verbatim. Throw-merge runs may
//! mix class-literal and constructed-throwable arguments, and the merged
//! call should be homogeneous, so the planner scans every member's
//! argument shapes and picks the offered strategies from a fixed decision
//! table (see [`plan_throw_strategies`]).

use serde::Serialize;
use stubmerge_syntax::{InvocationId, SourceModel};
use tracing::debug;

use crate::classify::{
    ArgumentShape, classify, constructed_type_name, type_literal_operand,
};
use crate::descriptor::CallAnalyzer;
use crate::detect::Run;

/// How arguments are converted while merging a run into one call.
///
/// Each variant carries a pure text conversion applied per argument;
/// arguments the conversion does not apply to pass through verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Concatenate arguments as written.
    NoConversion,
    /// Rewrite constructed instances to class literals:
    /// `new IOException()` → `IOException.class`.
    ToTypeLiteral,
    /// Rewrite class literals to constructed instances:
    /// `IOException.class` → `new IOException()`.
    ToConstructedInstance,
    /// Same conversion as [`MergeStrategy::ToConstructedInstance`], offered
    /// as the only choice when a non-default constructor argument forces
    /// the constructed form (the action label carries no conversion
    /// suffix).
    ToConstructedInstanceNoSuffix,
}

impl MergeStrategy {
    /// Converts one argument's text under this strategy.
    ///
    /// Arguments of any shape the strategy does not target are returned
    /// unchanged, so conversion can never lose a non-default constructor
    /// argument: only the class-literal form is ever rewritten away from.
    pub fn convert(self, argument: &str) -> String {
        match self {
            MergeStrategy::NoConversion => argument.trim().to_owned(),
            MergeStrategy::ToTypeLiteral => {
                match constructed_type_name(argument) {
                    // Dropping constructor arguments would change behavior,
                    // so only default constructions convert.
                    Some(name)
                        if classify(argument)
                            == ArgumentShape::ConstructedInstance {
                                has_ctor_args: false,
                            } =>
                    {
                        format!("{name}.class")
                    }
                    _ => argument.trim().to_owned(),
                }
            }
            MergeStrategy::ToConstructedInstance
            | MergeStrategy::ToConstructedInstanceNoSuffix => {
                match type_literal_operand(argument) {
                    Some(operand) => format!("new {operand}()"),
                    None => argument.trim().to_owned(),
                }
            }
        }
    }

    /// Human-readable conversion suffix for action labels, when any.
    pub fn conversion_label(self) -> Option<&'static str> {
        match self {
            MergeStrategy::NoConversion
            | MergeStrategy::ToConstructedInstanceNoSuffix => None,
            MergeStrategy::ToTypeLiteral => Some("class objects"),
            MergeStrategy::ToConstructedInstance => Some("throwables"),
        }
    }
}

/// Plans the strategies to offer for one detected run.
///
/// Return-merge runs need no argument reasoning and always merge verbatim.
pub fn plan_run_strategies(
    model: &SourceModel,
    chain: &[InvocationId],
    run: &Run,
    analyzer: &CallAnalyzer,
) -> Vec<MergeStrategy> {
    if analyzer.exception_aware {
        plan_throw_strategies(model, chain, run, analyzer)
    } else {
        vec![MergeStrategy::NoConversion]
    }
}

/// Decision table over the argument shapes of a throw-merge run:
///
/// | type literals | constructed | non-default ctor | offered            |
/// |---------------|-------------|------------------|--------------------|
/// | yes           | no          | –                | no conversion      |
/// | no            | yes         | –                | no conversion      |
/// | yes           | yes         | yes              | to constructed (forced) |
/// | yes           | yes         | no               | both, user picks   |
///
/// Arguments classified `Other` are excluded from the decision; a run with
/// only such arguments merges verbatim.
fn plan_throw_strategies(
    model: &SourceModel,
    chain: &[InvocationId],
    run: &Run,
    analyzer: &CallAnalyzer,
) -> Vec<MergeStrategy> {
    let mut has_type_literal = false;
    let mut has_constructed = false;
    let mut has_non_default_ctor = false;

    for &member in &run.members {
        let call = model.get(chain[member]);
        for argument in &call.args {
            match classify(&argument.text) {
                ArgumentShape::TypeLiteral => has_type_literal = true,
                ArgumentShape::ConstructedInstance { has_ctor_args } => {
                    has_constructed = true;
                    has_non_default_ctor |= has_ctor_args;
                }
                ArgumentShape::Other => {}
            }
        }
    }

    debug!(
        dialect = analyzer.dialect,
        has_type_literal,
        has_constructed,
        has_non_default_ctor,
        "planned throw-merge strategies"
    );

    match (has_type_literal, has_constructed) {
        (true, true) if has_non_default_ctor => {
            vec![MergeStrategy::ToConstructedInstanceNoSuffix]
        }
        (true, true) => vec![
            MergeStrategy::ToTypeLiteral,
            MergeStrategy::ToConstructedInstance,
        ],
        _ => vec![MergeStrategy::NoConversion],
    }
}
