//! Driver behaviour over whole archives: unit iteration, annotation
//! targeting, accumulation across partial classes, and idempotence.

use indoc::indoc;
use pretty_assertions::assert_eq;
use stereotyper::{annotate, AnnotatedArchive, Context, EngineError};

fn run(xml: &str) -> AnnotatedArchive {
    annotate(xml, &Context::default()).expect("archive should annotate")
}

fn all_method_labels(annotated: &AnnotatedArchive, name: &str) -> Vec<String> {
    annotated
        .report
        .units
        .iter()
        .flat_map(|u| &u.classes)
        .flat_map(|c| &c.methods)
        .find(|m| m.name == name)
        .unwrap_or_else(|| panic!("no method named {name}"))
        .stereotypes
        .clone()
}

#[test]
fn multi_unit_archives_process_in_document_order() {
    let archive = indoc! {r#"
        <unit>
          <unit language="C++" filename="a.cpp">
            <class>class <name>A</name> <block>{
              <public>
                <function><type><name>void</name></type> <name>noop</name><parameter_list>()</parameter_list> <block>{ }</block></function>
              </public>
            }</block>;</class>
          </unit>
          <unit language="Java" filename="B.java">
            <class>class <name>B</name> <block>{
              <function><type><name>void</name></type> <name>idle</name><parameter_list>()</parameter_list> <block>{ }</block></function>
            }</block></class>
          </unit>
        </unit>
    "#};
    let annotated = run(archive);

    let units = &annotated.report.units;
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].language, "C++");
    assert_eq!(units[1].language, "Java");
    assert_eq!(units[0].classes[0].name, "A");
    assert_eq!(units[1].classes[0].name, "B");
}

#[test]
fn unknown_language_units_are_skipped_but_processing_continues() {
    let archive = indoc! {r#"
        <unit>
          <unit language="Rust">
            <class>class <name>Ignored</name></class>
          </unit>
          <unit language="Java" filename="Keep.java">
            <class>class <name>Keep</name> <block>{
              <function><type><name>void</name></type> <name>idle</name><parameter_list>()</parameter_list> <block>{ }</block></function>
            }</block></class>
          </unit>
        </unit>
    "#};
    let annotated = run(archive);

    assert_eq!(annotated.report.units.len(), 1);
    assert_eq!(annotated.report.units[0].classes[0].name, "Keep");
    // The skipped unit's class element is untouched; only the Java class
    // and its method carry annotations.
    assert!(annotated.xml.contains("<class><name>Ignored</name></class>"));
    assert_eq!(annotated.xml.matches("stereotype=").count(), 2);
}

#[test]
fn annotated_output_still_parses_and_is_idempotent() {
    let archive = indoc! {r#"
        <unit language="Java" filename="P.java">
          <class>class <name>P</name> <block>{
            <decl_stmt><decl><type><specifier>private</specifier> <name>int</name></type> <name>n</name></decl>;</decl_stmt>
            <function><type><name>int</name></type> <name>getN</name><parameter_list>()</parameter_list> <block>{
              <return>return <expr><name>n</name></expr>;</return>
            }</block></function>
          }</block></class>
        </unit>
    "#};
    let first = run(archive);
    let second = run(&first.xml);

    let first_json = serde_json::to_string(&first.report).unwrap();
    let second_json = serde_json::to_string(&second.report).unwrap();
    assert_eq!(first_json, second_json);
    assert_eq!(first.xml, second.xml);
}

#[test]
fn partial_csharp_classes_accumulate_within_a_unit() {
    let archive = indoc! {r#"
        <unit language="C#" filename="Acc.cs">
          <class>class <name>Acc</name> <block>{
            <decl_stmt><decl><type><specifier>private</specifier> <name>int</name></type> <name>total</name></decl>;</decl_stmt>
            <function><type><name>int</name></type> <name>GetTotal</name><parameter_list>()</parameter_list> <block>{
              <return>return <expr><name>total</name></expr>;</return>
            }</block></function>
          }</block></class>
          <class>class <name>Acc</name> <block>{
            <function><type><name>void</name></type> <name>SetTotal</name><parameter_list>(<parameter><decl><type><name>int</name></type> <name>v</name></decl></parameter>)</parameter_list> <block>{
              <expr_stmt><expr><name>total</name> <operator>=</operator> <name>v</name></expr>;</expr_stmt>
            }</block></function>
          }</block></class>
        </unit>
    "#};
    let annotated = run(archive);

    // One merged class, classified over both halves.
    let classes = &annotated.report.units[0].classes;
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].xpaths.len(), 2);
    assert_eq!(all_method_labels(&annotated, "SetTotal"), vec!["set"]);
    assert_eq!(
        classes[0].stereotypes,
        vec!["data-class".to_string(), "small-class".to_string()]
    );
    // Both occurrences carry the class annotation.
    assert_eq!(
        annotated
            .xml
            .matches(r#"stereotype="data-class small-class""#)
            .count(),
        2
    );
}

#[test]
fn back_referenced_types_share_the_previous_concrete_type() {
    let archive = indoc! {r#"
        <unit language="Java" filename="Pair.java">
          <class>class <name>Pair</name> <block>{
            <decl_stmt><decl><type><specifier>private</specifier> <name>int</name></type> <name>x</name></decl>, <decl><type ref="prev"/> <name>y</name></decl>;</decl_stmt>
            <function><type><name>int</name></type> <name>getY</name><parameter_list>()</parameter_list> <block>{
              <return>return <expr><name>y</name></expr>;</return>
            }</block></function>
          }</block></class>
        </unit>
    "#};
    let annotated = run(archive);
    assert_eq!(all_method_labels(&annotated, "getY"), vec!["get"]);
}

#[test]
fn csharp_property_accessors_become_synthetic_methods() {
    let archive = indoc! {r#"
        <unit language="C#" filename="Counter.cs">
          <class>class <name>Counter</name> <block>{
            <decl_stmt><decl><type><specifier>private</specifier> <name>int</name></type> <name>count</name></decl>;</decl_stmt>
            <property><type><name>int</name></type> <name>Count</name> <block>{
              <function><name>get</name> <block>{
                <return>return <expr><name>count</name></expr>;</return>
              }</block></function>
              <function><name>set</name> <block>{
                <expr_stmt><expr><name>count</name> <operator>=</operator> <name>value</name></expr>;</expr_stmt>
              }</block></function>
            }</block></property>
          }</block></class>
        </unit>
    "#};
    let annotated = run(archive);

    assert_eq!(all_method_labels(&annotated, "get"), vec!["get"]);
    assert_eq!(all_method_labels(&annotated, "set"), vec!["set"]);
    // The accessor annotation lands on the function element nested in the
    // property.
    let get_xpath = &annotated.report.units[0].classes[0].methods[0].xpath;
    assert!(get_xpath.contains("/property[1]/block[1]/function[1]"), "{get_xpath}");
}

#[test]
fn constructor_family_preempts_and_empties_the_class() {
    let archive = indoc! {r#"
        <unit language="C++" filename="res.cpp">
          <class>class <name>Res</name> <block>{
            <public>
              <constructor><name>Res</name><parameter_list>()</parameter_list> <block>{ }</block></constructor>
              <constructor><name>Res</name><parameter_list>(<parameter><decl><type><specifier>const</specifier> <name>Res</name><operator>&amp;</operator></type> <name>other</name></decl></parameter>)</parameter_list> <block>{ }</block></constructor>
              <destructor><name>~Res</name><parameter_list>()</parameter_list> <block>{ }</block></destructor>
            </public>
          }</block>;</class>
        </unit>
    "#};
    let annotated = run(archive);

    let methods = &annotated.report.units[0].classes[0].methods;
    let labels: Vec<&[String]> = methods.iter().map(|m| m.stereotypes.as_slice()).collect();
    assert_eq!(
        labels,
        vec![
            &["constructor".to_string()][..],
            &["copy-constructor".to_string()][..],
            &["destructor".to_string()][..],
        ]
    );
    // Nothing but constructors and a destructor: the class is empty.
    assert_eq!(
        annotated.report.units[0].classes[0].stereotypes,
        vec!["empty".to_string()]
    );
}

#[test]
fn anonymous_structs_are_processed_without_names() {
    let archive = indoc! {r#"
        <unit language="C++" filename="anon.cpp">
          <struct>struct <block>{
            <public type="default">
              <decl_stmt><decl><type><name>int</name></type> <name>v</name></decl>;</decl_stmt>
              <function><type><name>int</name></type> <name>value</name><parameter_list>()</parameter_list> <specifier>const</specifier> <block>{
                <return>return <expr><name>v</name></expr>;</return>
              }</block></function>
            </public>
          }</block>;</struct>
        </unit>
    "#};
    let annotated = run(archive);

    let class = &annotated.report.units[0].classes[0];
    assert_eq!(class.name, "");
    assert_eq!(all_method_labels(&annotated, "value"), vec!["get"]);
}

#[test]
fn returning_this_is_not_a_getter() {
    let archive = indoc! {r#"
        <unit language="Java" filename="Builder.java">
          <class>class <name>Builder</name> <block>{
            <decl_stmt><decl><type><specifier>private</specifier> <name>int</name></type> <name>n</name></decl>;</decl_stmt>
            <function><type><name>Builder</name></type> <name>self</name><parameter_list>()</parameter_list> <block>{
              <return>return <expr><name>this</name></expr>;</return>
            }</block></function>
          }</block></class>
        </unit>
    "#};
    let annotated = run(archive);

    let labels = all_method_labels(&annotated, "self");
    assert!(!labels.contains(&"get".to_string()), "got {labels:?}");
    // Bare `this` still counts as attribute use on the accessor side.
    assert!(labels.contains(&"property".to_string()), "got {labels:?}");
}

#[test]
fn this_qualified_write_is_a_setter() {
    let archive = indoc! {r#"
        <unit language="Java" filename="Cell.java">
          <class>class <name>Cell</name> <block>{
            <decl_stmt><decl><type><specifier>private</specifier> <name>int</name></type> <name>n</name></decl>;</decl_stmt>
            <function><type><name>void</name></type> <name>store</name><parameter_list>(<parameter><decl><type><name>int</name></type> <name>v</name></decl></parameter>)</parameter_list> <block>{
              <expr_stmt><expr><name><name>this</name><operator>.</operator><name>n</name></name> <operator>=</operator> <name>v</name></expr>;</expr_stmt>
            }</block></function>
          }</block></class>
        </unit>
    "#};
    let annotated = run(archive);
    assert_eq!(all_method_labels(&annotated, "store"), vec!["set"]);
}

#[test]
fn external_receiver_calls_make_a_controller() {
    let archive = indoc! {r#"
        <unit language="C#" filename="Runner.cs">
          <class>class <name>Runner</name> <block>{
            <function><type><name>void</name></type> <name>Run</name><parameter_list>(<parameter><decl><type><name>Engine</name></type> <name>e</name></decl></parameter>)</parameter_list> <block>{
              <expr_stmt><expr><call><name><name>e</name><operator>.</operator><name>Start</name></name><argument_list>()</argument_list></call></expr>;</expr_stmt>
            }</block></function>
          }</block></class>
        </unit>
    "#};
    let annotated = run(archive);
    assert_eq!(all_method_labels(&annotated, "Run"), vec!["controller"]);
}

#[test]
fn member_dispatch_counts_toward_commands() {
    let archive = indoc! {r#"
        <unit language="Java" filename="Relay.java">
          <class>class <name>Relay</name> <block>{
            <decl_stmt><decl><type><specifier>private</specifier> <name>Worker</name></type> <name>worker</name></decl>;</decl_stmt>
            <function><type><name>void</name></type> <name>tick</name><parameter_list>()</parameter_list> <block>{
              <expr_stmt><expr><call><name><name>worker</name><operator>.</operator><name>run</name></name><argument_list>()</argument_list></call></expr>;</expr_stmt>
            }</block></function>
          }</block></class>
        </unit>
    "#};
    let annotated = run(archive);

    let labels = all_method_labels(&annotated, "tick");
    assert!(labels.contains(&"command".to_string()), "got {labels:?}");
    // Worker is an external non-primitive attribute, so the method also
    // collaborates.
    assert!(labels.contains(&"collaborator".to_string()), "got {labels:?}");
}

#[test]
fn ignored_calls_never_reach_the_counters() {
    let archive = indoc! {r#"
        <unit language="C++" filename="quiet.cpp">
          <class>class <name>Quiet</name> <block>{
            <public>
              <function><type><name>void</name></type> <name>check</name><parameter_list>()</parameter_list> <block>{
                <expr_stmt><expr><call><name>assert</name><argument_list>(<argument><expr><literal>1</literal></expr></argument>)</argument_list></call></expr>;</expr_stmt>
              }</block></function>
            </public>
          }</block>;</class>
        </unit>
    "#};
    let annotated = run(archive);

    // With its only call ignored the method has no calls at all.
    assert_eq!(all_method_labels(&annotated, "check"), vec!["incidental"]);
}

#[test]
fn malformed_archives_are_fatal() {
    let ctx = Context::default();
    assert!(matches!(
        annotate("<unit language=\"Java\"><open", &ctx),
        Err(EngineError::MalformedArchive(_))
    ));
    assert!(matches!(
        annotate("<unit><unit/></unit>", &ctx),
        Err(EngineError::MissingLanguage(0))
    ));
}

#[test]
fn taxonomy_restriction_rejects_computed_labels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("labels.txt");
    std::fs::write(&path, "constructor\ndestructor\n").unwrap();

    let ctx = Context {
        taxonomy: stereotyper::Taxonomy::load(&path).unwrap(),
        ..Context::default()
    };
    let archive = indoc! {r#"
        <unit language="Java" filename="X.java">
          <class>class <name>X</name> <block>{
            <function><type><name>void</name></type> <name>idle</name><parameter_list>()</parameter_list> <block>{ }</block></function>
          }</block></class>
        </unit>
    "#};
    assert!(matches!(
        annotate(archive, &ctx),
        Err(EngineError::UnknownLabel(_))
    ));
}
