//! End-to-end merge scenarios: analyze a source, apply a proposed action,
//! check the rewritten text and that re-analysis converges.

use stubmerge_analysis::{
    MergeStrategy, analyze_document, apply_merge,
};
use stubmerge_syntax::Document;

/// Applies the first diagnostic's action chosen by `pick` and returns the
/// rewritten text.
fn merge_with(
    source: &str,
    pick: impl Fn(&[stubmerge_analysis::ProposedAction]) -> usize,
) -> String {
    let mut doc = Document::new(source);
    let diagnostics = analyze_document(&doc);
    assert!(!diagnostics.is_empty(), "no diagnostic for {source:?}");
    let action = diagnostics[0].actions[pick(&diagnostics[0].actions)].clone();
    apply_merge(&mut doc, &action).unwrap();
    doc.text().to_owned()
}

fn merge(source: &str) -> String {
    merge_with(source, |_| 0)
}

#[test]
fn merges_a_run_in_the_middle_of_a_chain() {
    // Calls before and after the run survive untouched.
    assert_eq!(
        merge(r#"Mockito.doReturn("x").doReturn("y").when(mock).greet();"#),
        r#"Mockito.doReturn("x", "y").when(mock).greet();"#
    );
}

#[test]
fn merges_when_then_return_chain() {
    assert_eq!(
        merge("Mockito.when(mock.greet()).thenReturn(1).thenReturn(2);"),
        "Mockito.when(mock.greet()).thenReturn(1, 2);"
    );
}

#[test]
fn merged_run_is_gone_on_re_analysis() {
    let mut doc = Document::new(
        "Mockito.when(x).thenReturn(1).thenReturn(2).thenReturn(3);",
    );
    let diagnostics = analyze_document(&doc);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].actions[0].location.member_count, 3);

    apply_merge(&mut doc, &diagnostics[0].actions[0]).unwrap();
    assert_eq!(doc.text(), "Mockito.when(x).thenReturn(1, 2, 3);");
    assert!(analyze_document(&doc).is_empty());
}

#[test]
fn single_call_is_never_reported() {
    let doc = Document::new("Mockito.when(x).thenReturn(1);");
    assert!(analyze_document(&doc).is_empty());
}

#[test]
fn mixed_throw_run_offers_a_choice_of_conversion() {
    let source =
        "Mockito.when(x).thenThrow(Ex1.class).thenThrow(new Ex2());";
    let doc = Document::new(source);
    let diagnostics = analyze_document(&doc);
    let strategies: Vec<_> =
        diagnostics[0].actions.iter().map(|a| a.strategy).collect();
    assert_eq!(
        strategies,
        vec![
            MergeStrategy::ToTypeLiteral,
            MergeStrategy::ToConstructedInstance,
        ]
    );

    assert_eq!(
        merge_with(source, |_| 0),
        "Mockito.when(x).thenThrow(Ex1.class, Ex2.class);"
    );
    assert_eq!(
        merge_with(source, |_| 1),
        "Mockito.when(x).thenThrow(new Ex1(), new Ex2());"
    );
}

#[test]
fn non_default_constructor_argument_is_preserved_verbatim() {
    let source =
        r#"Mockito.when(x).thenThrow(Ex1.class).thenThrow(new Ex2("msg"));"#;
    let doc = Document::new(source);
    let diagnostics = analyze_document(&doc);

    // Only the constructed form can keep `"msg"`, so it is the one choice.
    assert_eq!(diagnostics[0].actions.len(), 1);
    assert_eq!(
        diagnostics[0].actions[0].strategy,
        MergeStrategy::ToConstructedInstanceNoSuffix
    );

    assert_eq!(
        merge(source),
        r#"Mockito.when(x).thenThrow(new Ex1(), new Ex2("msg"));"#
    );
}

#[test]
fn disjoint_runs_merge_one_at_a_time() {
    let mut doc = Document::new(
        "Mockito.doReturn(1).doReturn(2).doThrow(e).doReturn(3).doReturn(4).when(mock);",
    );

    // Two independent diagnostics; applying the first leaves the second
    // run intact but stale, so it is re-detected before its own merge.
    let diagnostics = analyze_document(&doc);
    assert_eq!(diagnostics.len(), 2);
    apply_merge(&mut doc, &diagnostics[0].actions[0]).unwrap();
    assert_eq!(
        doc.text(),
        "Mockito.doReturn(1, 2).doThrow(e).doReturn(3).doReturn(4).when(mock);"
    );

    let diagnostics = analyze_document(&doc);
    assert_eq!(diagnostics.len(), 1);
    apply_merge(&mut doc, &diagnostics[0].actions[0]).unwrap();
    assert_eq!(
        doc.text(),
        "Mockito.doReturn(1, 2).doThrow(e).doReturn(3, 4).when(mock);"
    );
    assert!(analyze_document(&doc).is_empty());
}

#[test]
fn bdd_mockito_throw_chains_merge_across_dialects() {
    assert_eq!(
        merge("BDDMockito.willThrow(A.class).willThrow(B.class).given(mock).greet();"),
        "BDDMockito.willThrow(A.class, B.class).given(mock).greet();"
    );
    assert_eq!(
        merge("BDDMockito.given(x).willReturn(1).willReturn(2);"),
        "BDDMockito.given(x).willReturn(1, 2);"
    );
}

#[test]
fn mocked_static_chains_merge_like_instance_dialect() {
    assert_eq!(
        merge("mocked.when(Util::greet).thenThrow(A.class).thenThrow(B.class);"),
        "mocked.when(Util::greet).thenThrow(A.class, B.class);"
    );
}

#[test]
fn surrounding_code_is_untouched() {
    let source = "\
        void setUp() {\n\
            var mock = Mockito.mock(Service.class);\n\
            Mockito.when(mock.greet()).thenReturn(\"a\").thenReturn(\"b\");\n\
            mock.run();\n\
        }\n";
    let merged = merge(source);
    assert!(merged.contains(
        "Mockito.when(mock.greet()).thenReturn(\"a\", \"b\");"
    ));
    assert!(merged.contains("var mock = Mockito.mock(Service.class);"));
    assert!(merged.contains("mock.run();"));
}
