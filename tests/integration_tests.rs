// tests/integration_tests.rs
//
// End-to-end coverage through the public library API (config parsing,
// trace decoding, the scheduler, and report serialization) plus a CLI
// round-trip through the compiled binary, in the style of
// tests/timing_simulator.rs.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tomasulo_sim::config::load_unit_classes;
use tomasulo_sim::scheduler::Scheduler;
use tomasulo_sim::trace::decode_program;

fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const FULL_CONFIG: &str = r#"
"integer": {"fu": 2, "rs": 4, "cc": 1}
"divider": {"fu": 1, "rs": 2, "cc": 6}
"multiplier": {"fu": 1, "rs": 2, "cc": 3}
"load": {"fu": 1, "rs": 2, "cc": 3}
"store": {"fu": 1, "rs": 2, "cc": 1}
"#;

#[test]
fn config_and_trace_feed_the_scheduler_end_to_end() {
    let config_file = write_fixture(FULL_CONFIG);
    // add $2, $3, $4 then halt
    let trace_file = write_fixture("0270\n6800\n");

    let configs = load_unit_classes(config_file.path()).unwrap();
    let program = decode_program(trace_file.path()).unwrap();
    assert_eq!(program.len(), 2);

    let report = Scheduler::new(&configs, program).run().unwrap();
    assert!(report.cycles > 0);
    assert_eq!(report.integer.iter().map(|u| u.instructions).sum::<usize>(), 2);
}

#[test]
fn unknown_opcode_is_dropped_before_simulation() {
    let config_file = write_fixture(FULL_CONFIG);
    // unknown opcode 30, then halt
    let trace_file = write_fixture("f000\n6800\n");

    let configs = load_unit_classes(config_file.path()).unwrap();
    let program = decode_program(trace_file.path()).unwrap();
    assert_eq!(program.len(), 1);

    let report = Scheduler::new(&configs, program).run().unwrap();
    assert_eq!(report.integer.iter().map(|u| u.instructions).sum::<usize>(), 1);
}

#[test]
fn malformed_config_line_is_an_error_and_nothing_runs() {
    let config_file = write_fixture("\"vector\": {\"fu\": 1, \"rs\": 1, \"cc\": 1}\n");
    assert!(load_unit_classes(config_file.path()).is_err());
}

#[test]
fn cli_round_trip_writes_a_json_report() {
    let config_file = write_fixture(FULL_CONFIG);
    let trace_file = write_fixture("6800\n");
    let output_file = tempfile::NamedTempFile::new().unwrap();

    let mut cmd = Command::cargo_bin("tomasulo-sim").unwrap();
    cmd.arg(trace_file.path())
        .arg(config_file.path())
        .arg(output_file.path())
        .assert()
        .success();

    let contents = std::fs::read_to_string(output_file.path()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["cycles"], 4);
    assert_eq!(parsed["integer"][0]["instructions"], 1);
    assert_eq!(parsed["reg reads"], 0);
    assert_eq!(parsed["stalls"], 0);
}

#[test]
fn cli_reports_a_nonzero_exit_and_no_output_on_bad_config() {
    let config_file = write_fixture("\"vector\": {\"fu\": 1, \"rs\": 1, \"cc\": 1}\n");
    let trace_file = write_fixture("6800\n");
    let output_file = tempfile::NamedTempFile::new().unwrap();
    std::fs::remove_file(output_file.path()).unwrap();

    let mut cmd = Command::cargo_bin("tomasulo-sim").unwrap();
    cmd.arg(trace_file.path())
        .arg(config_file.path())
        .arg(output_file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("config error"));

    assert!(!output_file.path().exists());
}
