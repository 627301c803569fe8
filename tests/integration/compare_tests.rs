//! Command-level comparison runs

use crate::common::{sample_data, CliTestRunner};
use clap::Parser;
use dbdiff::cli::Cli;
use dbdiff::commands::{resolve_config, run_comparison};
use dbdiff::report::{JsonFormatter, PrettyPrinter};
use dbdiff::{DbDiffError, Finding, Stage, UnkeyedTablePolicy};

fn runner_with_orders(left: usize, right: usize) -> CliTestRunner {
    let runner = CliTestRunner::new().unwrap();
    runner
        .fixture()
        .create_sample_db(
            "a.db3",
            &format!("{}\n{}", sample_data::BASE_USERS, sample_data::orders(left)),
        )
        .unwrap();
    runner
        .fixture()
        .create_sample_db(
            "b.db3",
            &format!("{}\n{}", sample_data::BASE_USERS, sample_data::orders(right)),
        )
        .unwrap();
    runner
}

fn parse(runner: &CliTestRunner, extra: &[&str]) -> Cli {
    let a = runner.arg("a.db3");
    let b = runner.arg("b.db3");
    let mut args = vec!["dbdiff", "--no-progress", a.as_str(), b.as_str()];
    args.extend(extra);
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn test_pretty_and_json_runs_succeed() {
    let runner = runner_with_orders(4, 3);
    let a = runner.arg("a.db3");
    let b = runner.arg("b.db3");

    runner.expect_success(&[a.as_str(), b.as_str()]);
    runner.expect_success(&["--format", "json", a.as_str(), b.as_str()]);
}

#[test]
fn test_differences_do_not_fail_the_command() {
    let runner = runner_with_orders(6, 1);
    let a = runner.arg("a.db3");
    let b = runner.arg("b.db3");

    assert!(runner.run_command(&[a.as_str(), b.as_str()]).is_ok());
}

#[test]
fn test_invalid_format_is_a_config_error() {
    let runner = runner_with_orders(1, 1);
    let a = runner.arg("a.db3");
    let b = runner.arg("b.db3");

    let err = runner.expect_failure(&["--format", "yaml", a.as_str(), b.as_str()]);
    assert!(matches!(err, DbDiffError::Config { .. }));
}

#[test]
fn test_pretty_report_text() {
    let runner = runner_with_orders(5, 4);
    let report = run_comparison(&parse(&runner, &[])).unwrap();

    let text = PrettyPrinter::render_report(&report);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "==========Schemas are identical==========",
            "==========Key constraints are identical==========",
            "==========Data count differences==========",
            "Table orders has 5 entries in (a.db3) and 4 entries in (b.db3)",
            "==========Data differences==========",
            "Table orders has 5 entries in (a.db3) and 4 entries in (b.db3).",
            "Table orders: 4 equal rows, 1 unequal rows",
        ]
    );
}

#[test]
fn test_json_report_structure() {
    let runner = runner_with_orders(2, 2);
    let report = run_comparison(&parse(&runner, &[])).unwrap();

    let json = JsonFormatter::format_report(&report).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed["labels"]["left"], "a.db3");
    assert_eq!(parsed["labels"]["right"], "b.db3");
    assert_eq!(parsed["halted_at"], serde_json::Value::Null);
    assert_eq!(parsed["stages"].as_array().unwrap().len(), 4);
    assert!(parsed["started_at"].is_string());
}

#[test]
fn test_max_differences_flag_limits_printed_rows() {
    let runner = CliTestRunner::new().unwrap();
    runner
        .fixture()
        .create_sample_db("a.db3", &sample_data::orders(6))
        .unwrap();
    runner
        .fixture()
        .create_sample_db(
            "b.db3",
            &format!("{}\nUPDATE orders SET total = -1;", sample_data::orders(6)),
        )
        .unwrap();

    let report = run_comparison(&parse(&runner, &["--max-differences", "2"])).unwrap();

    let printed = report
        .findings(Stage::Data)
        .iter()
        .filter(|f| matches!(f, Finding::RowMismatch { .. }))
        .count();
    assert_eq!(printed, 2);
    assert!(report.findings(Stage::Data).contains(&Finding::TableSummary {
        table: "orders".to_string(),
        equal: 0,
        unequal: 6,
    }));
}

#[test]
fn test_flags_override_defaults() {
    let runner = runner_with_orders(1, 1);
    let cli = parse(
        &runner,
        &[
            "--max-differences",
            "0",
            "--unkeyed-tables",
            "skip",
            "--hide-skipped-tables",
        ],
    );

    let config = resolve_config(&cli).unwrap();
    assert_eq!(config.max_differences, 0);
    assert_eq!(config.unkeyed_tables, UnkeyedTablePolicy::Skip);
    assert!(!config.report_skipped_tables);
}

#[test]
fn test_unkeyed_skip_flag_compares_loose_tables_as_empty() {
    let runner = CliTestRunner::new().unwrap();
    let loose = "CREATE TABLE loose (v TEXT);";
    runner
        .fixture()
        .create_db("a.db3", &format!("{} INSERT INTO loose VALUES ('a');", loose))
        .unwrap();
    runner
        .fixture()
        .create_db("b.db3", &format!("{} INSERT INTO loose VALUES ('b');", loose))
        .unwrap();

    let reported = run_comparison(&parse(&runner, &[])).unwrap();
    assert_eq!(reported.findings(Stage::Data).len(), 2);

    let skipped = run_comparison(&parse(&runner, &["--unkeyed-tables", "skip"])).unwrap();
    assert!(skipped.is_identical());
}
