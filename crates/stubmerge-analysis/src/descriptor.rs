//! Analyzer descriptors: per-dialect configuration for run detection.
//!
//! Each supported call-chain dialect gets one immutable [`CallAnalyzer`]
//! describing which method opens such a chain, which method the detector
//! looks for consecutiveness of, whether the first chain element can be
//! skipped, and whether the dialect stubs exceptions (which switches on
//! argument-shape reasoning in the planner).
//!
//! The detection algorithm itself is identical across dialects; only this
//! configuration data varies, so descriptors are plain data built by a
//! fluent builder with named factory presets and collected into static
//! registries.

use std::sync::LazyLock;

use stubmerge_syntax::Invocation;

pub const DO_RETURN: &str = "doReturn";
pub const DO_THROW: &str = "doThrow";
pub const DO_NOTHING: &str = "doNothing";
pub const DO_ANSWER: &str = "doAnswer";
pub const DO_CALL_REAL_METHOD: &str = "doCallRealMethod";
pub const GIVEN: &str = "given";
pub const WHEN: &str = "when";
pub const WILL: &str = "will";
pub const WILL_RETURN: &str = "willReturn";
pub const WILL_THROW: &str = "willThrow";
pub const WILL_DO_NOTHING: &str = "willDoNothing";
pub const WILL_ANSWER: &str = "willAnswer";
pub const WILL_CALL_REAL_METHOD: &str = "willCallRealMethod";
pub const THEN_RETURN: &str = "thenReturn";
pub const THEN_THROW: &str = "thenThrow";

/// The mocking-entry class a chain dialect belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainFamily {
    Mockito,
    BddMockito,
    MockedStatic,
}

/// Whether a dialect's chain openers are static calls on the family class
/// or instance calls on a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StarterKind {
    Static,
    Instance,
}

/// Immutable per-dialect analysis configuration.
#[derive(Debug)]
pub struct CallAnalyzer {
    /// Stable dialect id, used in logs and to document registry priority.
    pub dialect: &'static str,
    pub family: ChainFamily,
    /// The method name whose consecutiveness the analysis looks for,
    /// e.g. `doReturn`, `thenReturn`.
    pub consecutive_method: &'static str,
    /// Whether to skip the first call in a chain. For e.g. `Mockito.when()`
    /// it is certain that `when()` will never match `thenReturn()`, so the
    /// scan can start at the next call.
    pub skip_first_call: bool,
    /// Set for `*Throw()` dialects: the planner must reason about argument
    /// shapes, and a call without arguments cannot participate in a merge.
    pub exception_aware: bool,
    starters: &'static [&'static str],
    starter_kind: StarterKind,
}

impl CallAnalyzer {
    // Named factory presets.

    pub fn for_mockito(consecutive_method: &'static str) -> Builder {
        Builder::new(ChainFamily::Mockito, consecutive_method)
    }

    pub fn for_bdd_mockito(consecutive_method: &'static str) -> Builder {
        Builder::new(ChainFamily::BddMockito, consecutive_method)
    }

    pub fn for_mocked_static(consecutive_method: &'static str) -> Builder {
        Builder::new(ChainFamily::MockedStatic, consecutive_method)
    }

    /// Returns whether `call` could begin a chain of this dialect.
    ///
    /// Static dialects require the receiver path to end in the family class
    /// name (`Mockito.when`, `org.mockito.Mockito.when`). Instance dialects
    /// accept a variable-looking receiver: without name binding, a
    /// lowercase-initial identifier is the closest textual analogue of an
    /// instance call.
    pub fn can_analyze(&self, call: &Invocation) -> bool {
        if !self.starters.contains(&call.method.as_str()) {
            return false;
        }
        let Some(receiver) = call.receiver.as_deref() else {
            return false;
        };
        match self.starter_kind {
            StarterKind::Static => {
                let simple =
                    receiver.rsplit('.').next().unwrap_or(receiver);
                match self.family {
                    ChainFamily::Mockito => simple == "Mockito",
                    ChainFamily::BddMockito => simple == "BDDMockito",
                    // MockedStatic chains open on an instance variable,
                    // never on the class itself.
                    ChainFamily::MockedStatic => false,
                }
            }
            StarterKind::Instance => {
                !receiver.contains('.')
                    && receiver
                        .chars()
                        .next()
                        .is_some_and(|c| c.is_lowercase() || c == '_')
            }
        }
    }

    /// Chain index the detection scan starts at.
    pub fn start_index(&self) -> usize {
        usize::from(self.skip_first_call)
    }

    /// Extra per-call condition on top of the method-name match.
    ///
    /// Defaults to true; exception-aware dialects require at least one
    /// argument, because a zero-argument call cannot take part in the
    /// argument-shape decision.
    pub fn accepts_member(&self, call: &Invocation) -> bool {
        !self.exception_aware || call.has_arguments()
    }
}

/// Builder for [`CallAnalyzer`].
pub struct Builder {
    family: ChainFamily,
    dialect: &'static str,
    consecutive_method: &'static str,
    starters: &'static [&'static str],
    starter_kind: StarterKind,
    skip_first_call: bool,
    exception_aware: bool,
}

impl Builder {
    fn new(family: ChainFamily, consecutive_method: &'static str) -> Self {
        Self {
            family,
            dialect: "",
            consecutive_method,
            starters: &[],
            starter_kind: StarterKind::Static,
            skip_first_call: false,
            exception_aware: false,
        }
    }

    pub fn dialect(mut self, dialect: &'static str) -> Self {
        self.dialect = dialect;
        self
    }

    /// Configures the chain openers as static calls on the family class.
    pub fn in_chains_beginning_with_static(
        mut self,
        starters: &'static [&'static str],
    ) -> Self {
        self.starters = starters;
        self.starter_kind = StarterKind::Static;
        self
    }

    /// Configures the chain openers as instance calls.
    pub fn in_chains_beginning_with_instance(
        mut self,
        starters: &'static [&'static str],
    ) -> Self {
        self.starters = starters;
        self.starter_kind = StarterKind::Instance;
        self
    }

    /// Skips the first call of a chain during detection.
    pub fn skipping_first_call(mut self) -> Self {
        self.skip_first_call = true;
        self
    }

    /// Marks the dialect as exception-stubbing: arguments are shape-
    /// classified by the planner and zero-argument calls are not run
    /// members.
    pub fn classifying_exception_arguments(mut self) -> Self {
        self.exception_aware = true;
        self
    }

    pub fn build(self) -> CallAnalyzer {
        CallAnalyzer {
            dialect: self.dialect,
            family: self.family,
            consecutive_method: self.consecutive_method,
            skip_first_call: self.skip_first_call,
            exception_aware: self.exception_aware,
            starters: self.starters,
            starter_kind: self.starter_kind,
        }
    }
}

/// Return-merge dialects in priority order. When a chain matches more than
/// one dialect, the first match wins:
/// 1. `mockito-do` — `Mockito.do*()...` chains, target `doReturn`
/// 2. `bddmockito-will` — `BDDMockito.given()/will*()...`, target `willReturn`
/// 3. `mockito-when` — `Mockito.when()...`, target `thenReturn` (skips `when`)
static RETURN_MERGE: LazyLock<Vec<CallAnalyzer>> = LazyLock::new(|| {
    vec![
        CallAnalyzer::for_mockito(DO_RETURN)
            .dialect("mockito-do")
            .in_chains_beginning_with_static(&[
                DO_RETURN,
                DO_THROW,
                DO_NOTHING,
                DO_ANSWER,
                DO_CALL_REAL_METHOD,
            ])
            .build(),
        CallAnalyzer::for_bdd_mockito(WILL_RETURN)
            .dialect("bddmockito-will")
            .in_chains_beginning_with_static(&[
                GIVEN,
                WILL_RETURN,
                WILL_THROW,
                WILL,
                WILL_DO_NOTHING,
                WILL_ANSWER,
                WILL_CALL_REAL_METHOD,
            ])
            .build(),
        CallAnalyzer::for_mockito(THEN_RETURN)
            .dialect("mockito-when")
            .skipping_first_call()
            .in_chains_beginning_with_static(&[WHEN])
            .build(),
    ]
});

/// Throw-merge dialects in priority order (first match wins):
/// 1. `mockito-do-throw` — `Mockito.do*()...`, target `doThrow`
/// 2. `bddmockito-will-throw` — chains opened by `willThrow` itself
/// 3. `bddmockito-given-throw` — `BDDMockito.given()/will*()...`
/// 4. `mockito-when-throw` — `Mockito.when()...`, target `thenThrow` (skip 1)
/// 5. `mockedstatic-when-throw` — `mocked.when()...` instance chains (skip 1)
static THROW_MERGE: LazyLock<Vec<CallAnalyzer>> = LazyLock::new(|| {
    vec![
        CallAnalyzer::for_mockito(DO_THROW)
            .dialect("mockito-do-throw")
            .classifying_exception_arguments()
            .in_chains_beginning_with_static(&[
                DO_RETURN,
                DO_THROW,
                DO_NOTHING,
                DO_ANSWER,
                DO_CALL_REAL_METHOD,
            ])
            .build(),
        CallAnalyzer::for_bdd_mockito(WILL_THROW)
            .dialect("bddmockito-will-throw")
            .classifying_exception_arguments()
            .in_chains_beginning_with_static(&[WILL_THROW])
            .build(),
        CallAnalyzer::for_bdd_mockito(WILL_THROW)
            .dialect("bddmockito-given-throw")
            .classifying_exception_arguments()
            .in_chains_beginning_with_static(&[
                GIVEN,
                WILL_RETURN,
                WILL,
                WILL_DO_NOTHING,
                WILL_ANSWER,
                WILL_CALL_REAL_METHOD,
            ])
            .build(),
        CallAnalyzer::for_mockito(THEN_THROW)
            .dialect("mockito-when-throw")
            .classifying_exception_arguments()
            .skipping_first_call()
            .in_chains_beginning_with_static(&[WHEN])
            .build(),
        CallAnalyzer::for_mocked_static(THEN_THROW)
            .dialect("mockedstatic-when-throw")
            .classifying_exception_arguments()
            .skipping_first_call()
            .in_chains_beginning_with_instance(&[WHEN])
            .build(),
    ]
});

/// The return-merge analyzer registry.
pub fn return_merge_analyzers() -> &'static [CallAnalyzer] {
    &RETURN_MERGE
}

/// The throw-merge analyzer registry.
pub fn throw_merge_analyzers() -> &'static [CallAnalyzer] {
    &THROW_MERGE
}

#[cfg(test)]
mod tests {
    use stubmerge_syntax::parse_source;

    use super::*;

    fn first_call_matches(source: &str, analyzer: &CallAnalyzer) -> bool {
        let model = parse_source(source);
        analyzer.can_analyze(model.get(model.roots()[0]))
    }

    #[test]
    fn static_starter_requires_the_family_class() {
        let when = &return_merge_analyzers()[2];
        assert!(first_call_matches("Mockito.when(x).thenReturn(1)", when));
        assert!(first_call_matches(
            "org.mockito.Mockito.when(x).thenReturn(1)",
            when
        ));
        assert!(!first_call_matches(
            "BDDMockito.when(x).thenReturn(1)",
            when
        ));
        assert!(!first_call_matches("when(x).thenReturn(1)", when));
    }

    #[test]
    fn instance_starter_accepts_variable_receivers_only() {
        let mocked = &throw_merge_analyzers()[4];
        assert!(first_call_matches(
            "mocked.when(Util::greet).thenThrow(e)",
            mocked
        ));
        assert!(!first_call_matches(
            "Mockito.when(x).thenThrow(e)",
            mocked
        ));
        // The class itself never opens such a chain.
        assert!(!first_call_matches(
            "MockedStatic.when(x).thenThrow(e)",
            mocked
        ));
    }

    #[test]
    fn starter_whitelists_cover_compatible_openers() {
        let do_family = &return_merge_analyzers()[0];
        assert!(first_call_matches(
            "Mockito.doThrow(e).doReturn(1).doReturn(2)",
            do_family
        ));
        assert!(!first_call_matches(
            "Mockito.verify(mock).doReturn(1)",
            do_family
        ));
    }

    #[test]
    fn exception_aware_dialects_reject_zero_argument_members() {
        let throw = &throw_merge_analyzers()[0];
        let model = parse_source("Mockito.doThrow().when(mock)");
        let call = model.get(model.roots()[0]);
        assert!(!throw.accepts_member(call));
    }

    #[test]
    fn registries_have_expected_shape() {
        assert_eq!(return_merge_analyzers().len(), 3);
        assert_eq!(throw_merge_analyzers().len(), 5);
        assert_eq!(
            return_merge_analyzers()
                .iter()
                .filter(|a| a.skip_first_call)
                .count(),
            1
        );
        assert_eq!(
            throw_merge_analyzers()
                .iter()
                .filter(|a| a.skip_first_call)
                .count(),
            2
        );
        assert!(
            throw_merge_analyzers().iter().all(|a| a.exception_aware)
        );
    }
}
