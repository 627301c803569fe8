//! End-to-end comparison scenarios over snapshot files on disk

use crate::common::{assertions::*, sample_data, CliTestRunner, TestFixture};
use dbdiff::{CompareConfig, DbDiffError, Finding, Stage, UnkeyedTablePolicy};

#[test]
fn test_missing_table_stops_after_schema_stage() {
    let fixture = TestFixture::new().unwrap();
    fixture
        .create_sample_db("before.db3", sample_data::BASE_USERS)
        .unwrap();
    fixture
        .create_db(
            "after.db3",
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT UNIQUE);",
        )
        .unwrap();

    let report = fixture.compare_default("before.db3", "after.db3");

    assert_eq!(report.halted_at, Some(Stage::Schema));
    assert_eq!(report.stages.len(), 1);
    assert_eq!(
        report.findings(Stage::Schema),
        &[Finding::MissingTables {
            present_in: "before.db3".to_string(),
            absent_from: "after.db3".to_string(),
            tables: vec!["orders".to_string()],
        }]
    );
    assert!(report.findings(Stage::Counts).is_empty());
    assert!(report.findings(Stage::Data).is_empty());
}

#[test]
fn test_extra_row_reports_count_and_length_only() {
    let fixture = TestFixture::new().unwrap();
    fixture
        .create_sample_db(
            "left.db3",
            &format!("{}\n{}", sample_data::BASE_USERS, sample_data::orders(5)),
        )
        .unwrap();
    fixture
        .create_sample_db(
            "right.db3",
            &format!("{}\n{}", sample_data::BASE_USERS, sample_data::orders(4)),
        )
        .unwrap();

    let report = fixture.compare_default("left.db3", "right.db3");

    assert_eq!(report.halted_at, None);
    assert_eq!(report.stages.len(), 4);
    assert_eq!(
        report.findings(Stage::Counts),
        &[Finding::RowCountMismatch {
            table: "orders".to_string(),
            left_name: "left.db3".to_string(),
            left_count: 5,
            right_name: "right.db3".to_string(),
            right_count: 4,
        }]
    );

    assert_eq!(table_summary(&report, "orders"), Some((4, 1)));
    assert_eq!(table_summary(&report, "users"), None);
    assert_eq!(
        count_findings(&report, Stage::Data, |f| matches!(
            f,
            Finding::LengthMismatch { .. }
        )),
        1
    );
    assert_eq!(
        count_findings(&report, Stage::Data, |f| matches!(f, Finding::RowMismatch { .. })),
        0
    );
}

#[test]
fn test_unkeyed_table_is_reported_then_skipped() {
    let fixture = TestFixture::new().unwrap();
    fixture
        .create_sample_db(
            "a.db3",
            "CREATE TABLE audit_log (message TEXT); INSERT INTO audit_log VALUES ('one');",
        )
        .unwrap();
    fixture
        .create_sample_db(
            "b.db3",
            "CREATE TABLE audit_log (message TEXT); INSERT INTO audit_log VALUES ('two');",
        )
        .unwrap();

    let report = fixture.compare_default("a.db3", "b.db3");
    assert_eq!(report.halted_at, None);
    assert_eq!(
        count_findings(&report, Stage::Data, |f| matches!(
            f,
            Finding::NotComparable { table, .. } if table == "audit_log"
        )),
        2
    );

    let skip = CompareConfig::default().with_unkeyed_tables(UnkeyedTablePolicy::Skip);
    let report = fixture.compare("a.db3", "b.db3", skip).unwrap();
    assert_identical(&report);
}

#[test]
fn test_wrong_extensions_abort_before_connecting() {
    let runner = CliTestRunner::new().unwrap();
    let first = runner.arg("first.sqlite");
    let second = runner.arg("second.txt");

    let err = runner.expect_failure(&[first.as_str(), second.as_str()]);

    assert!(matches!(err, DbDiffError::InvalidInput { .. }));
    assert!(!runner.fixture().root().join("first.sqlite").exists());
    assert!(!runner.fixture().root().join("second.txt").exists());
}

#[test]
fn test_changed_value_is_reported_at_its_position() {
    let fixture = TestFixture::new().unwrap();
    let data = format!("{}\n{}", sample_data::BASE_USERS, sample_data::orders(3));
    fixture.create_sample_db("a.db3", &data).unwrap();
    fixture
        .create_sample_db(
            "b.db3",
            &format!("{}\nUPDATE orders SET note = 'changed' WHERE id = 2;", data),
        )
        .unwrap();

    let report = fixture.compare_default("a.db3", "b.db3");

    assert!(report.findings(Stage::Counts).is_empty());
    let mismatch = report
        .findings(Stage::Data)
        .iter()
        .find(|f| matches!(f, Finding::RowMismatch { .. }))
        .expect("a row mismatch");
    assert_eq!(
        mismatch.to_string(),
        "--------Difference in table orders at row 2--------\n\
         (a.db3): (2, 102, 20.5, 'order 2')\n\
         (b.db3): (2, 102, 20.5, 'changed')"
    );
    assert_eq!(table_summary(&report, "orders"), Some((2, 1)));
}

#[test]
fn test_column_difference_reported_per_table() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_sample_db("a.db3", "").unwrap();
    fixture
        .create_sample_db("b.db3", "ALTER TABLE users ADD COLUMN age INTEGER;")
        .unwrap();

    let report = fixture.compare_default("a.db3", "b.db3");

    assert_eq!(report.halted_at, Some(Stage::Schema));
    assert_eq!(
        report.findings(Stage::Schema),
        &[Finding::ColumnMismatch {
            table: "users".to_string(),
            left_only: vec![],
            right_only: vec!["age".to_string()],
        }]
    );
}

#[test]
fn test_dropped_index_stops_after_constraint_stage() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_sample_db("a.db3", "").unwrap();
    fixture
        .create_sample_db("b.db3", "DROP INDEX idx_orders_user;")
        .unwrap();

    let report = fixture.compare_default("a.db3", "b.db3");

    assert_eq!(report.halted_at, Some(Stage::Constraints));
    assert_eq!(report.stages.len(), 2);
    let finding = &report.findings(Stage::Constraints)[0];
    match finding {
        Finding::IndexMismatch {
            table,
            left_only,
            right_only,
        } => {
            assert_eq!(table, "orders");
            assert_eq!(left_only.len(), 1);
            assert_eq!(left_only[0].name, "idx_orders_user");
            assert!(right_only.is_empty());
        }
        other => panic!("Expected an index mismatch, got {:?}", other),
    }
}
