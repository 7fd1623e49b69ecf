//! Binary-level behaviour: exit codes, file outputs, warnings.

use assert_cmd::Command;
use indoc::indoc;

const ARCHIVE: &str = indoc! {r#"
    <unit language="C++" filename="point.cpp">
      <class>class <name>Point</name> <block>{
        <public>
          <decl_stmt><decl><type><name>int</name></type> <name>x</name></decl>;</decl_stmt>
          <function><type><name>int</name></type> <name>getX</name><parameter_list>()</parameter_list> <specifier>const</specifier> <block>{
            <return>return <expr><name>x</name></expr>;</return>
          }</block></function>
        </public>
      }</block>;</class>
    </unit>
"#};

#[test]
fn annotates_to_stdout_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.xml");
    std::fs::write(&input, ARCHIVE).unwrap();

    Command::cargo_bin("stereotyper")
        .unwrap()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicates::str::contains(r#"stereotype="get""#));
}

#[test]
fn writes_output_and_report_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.xml");
    let output = dir.path().join("out.xml");
    let report = dir.path().join("report.json");
    std::fs::write(&input, ARCHIVE).unwrap();

    Command::cargo_bin("stereotyper")
        .unwrap()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--report")
        .arg(&report)
        .assert()
        .success();

    let annotated = std::fs::read_to_string(&output).unwrap();
    assert!(annotated.contains(r#"stereotype="get""#));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(report["method_totals"]["get"], 1);
}

#[test]
fn reads_archive_from_stdin() {
    Command::cargo_bin("stereotyper")
        .unwrap()
        .arg("-")
        .write_stdin(ARCHIVE)
        .assert()
        .success()
        .stdout(predicates::str::contains("stereotype="));
}

#[test]
fn malformed_archives_exit_nonzero() {
    Command::cargo_bin("stereotyper")
        .unwrap()
        .arg("-")
        .write_stdin("<unit language=\"C++\"><broken")
        .assert()
        .failure();
}

#[test]
fn unknown_language_warns_on_stderr_but_succeeds() {
    Command::cargo_bin("stereotyper")
        .unwrap()
        .arg("-")
        .write_stdin("<unit><unit language=\"Rust\"/></unit>")
        .assert()
        .success()
        .stderr(predicates::str::contains("unknown language 'Rust'"));
}

#[test]
fn broken_primitives_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.xml");
    let primitives = dir.path().join("primitives.txt");
    std::fs::write(&input, ARCHIVE).unwrap();
    std::fs::write(&primitives, "[C++]\nint\n").unwrap();

    Command::cargo_bin("stereotyper")
        .unwrap()
        .arg(&input)
        .arg("--primitives")
        .arg(&primitives)
        .assert()
        .failure()
        .stderr(predicates::str::contains("missing entries"));
}
