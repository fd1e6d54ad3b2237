//! Tests for full reconciliation passes

use super::{FailingSink, accident_schemas, plan, run, try_run};
use crate::app::adapters::{InMemoryFiles, InMemorySchemas, MemorySink};
use crate::app::models::{FailureReason, RunVerdict, UnitKey};
use crate::app::services::run_orchestrator::{RunOrchestrator, RunPlan};

#[test]
fn test_units_enumerate_year_outermost() {
    let plan = plan(&[2017, 2018], &["Atlantic", "Bergen"], &["Accidents", "Drivers"]);

    let ids: Vec<String> = plan.units().iter().map(|u| u.stem()).collect();

    assert_eq!(
        ids,
        vec![
            "Atlantic_2017_Accidents",
            "Atlantic_2017_Drivers",
            "Bergen_2017_Accidents",
            "Bergen_2017_Drivers",
            "Atlantic_2018_Accidents",
            "Atlantic_2018_Drivers",
            "Bergen_2018_Accidents",
            "Bergen_2018_Drivers",
        ]
    );
}

#[test]
fn test_short_row_is_reported_and_clean_run_publishes() {
    let unit = UnitKey::new(2020, "Camden", "Accidents");
    let files = InMemoryFiles::new().with_file(unit, "1,2,3\n1,2\n");
    let mut sink = MemorySink::new();

    let orchestrator = RunOrchestrator::new(plan(&[2020], &["Camden"], &["Accidents"]));
    let captured = run(&orchestrator, &accident_schemas(), &files, &mut sink);

    assert_eq!(captured.outcome.verdict, RunVerdict::Pass);
    assert_eq!(
        captured.issues,
        "Problematic rows in file Camden_2020_Accidents/Camden2020Accidents.txt:\n\
         Row 2: [\"1\", \"2\"]\n"
    );
    assert_eq!(captured.table_report, "");

    let published = sink.table("crash_newjersey").unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published.records()[0].get("a"), Some("1"));
    assert_eq!(published.records()[0].get("c"), Some("3"));

    assert_eq!(captured.outcome.stats.problematic_rows, 1);
    assert_eq!(captured.outcome.stats.records_merged, 1);
    assert_eq!(captured.outcome.published.len(), 1);
    assert_eq!(captured.outcome.published[0].external_name, "crash_newjersey");
}

#[test]
fn test_missing_data_file_fails_without_publishing() {
    let present = UnitKey::new(2020, "Camden", "Accidents");
    let files = InMemoryFiles::new().with_file(present, "1,2,3\n");
    let mut sink = MemorySink::new();

    let orchestrator =
        RunOrchestrator::new(plan(&[2020], &["Camden", "CountyX"], &["Accidents"]));
    let captured = run(&orchestrator, &accident_schemas(), &files, &mut sink);

    let missing_id = "CountyX_2020_Accidents/CountyX2020Accidents.txt".to_string();
    assert_eq!(
        captured.outcome.verdict,
        RunVerdict::Fail {
            reasons: vec![FailureReason::MissingDataFile(missing_id.clone())]
        }
    );
    assert_eq!(
        captured.issues,
        "Data file for CountyX in 2020 for table Accidents not found.\n"
    );
    assert_eq!(
        captured.table_report,
        format!("Missing files:\n{}\n", missing_id)
    );
    assert_eq!(sink.publish_calls(), 0);
    assert!(captured.outcome.published.is_empty());
    assert_eq!(captured.outcome.stats.units_missing, 1);
}

#[test]
fn test_column_discrepancy_fails_without_publishing() {
    let schemas = InMemorySchemas::new()
        .with_table("Drivers", &["id", "age"])
        .with_table_for_year("Drivers", 2018, &["id"]);
    let files = InMemoryFiles::new()
        .with_file(UnitKey::new(2017, "Camden", "Drivers"), "1,40\n")
        .with_file(UnitKey::new(2018, "Camden", "Drivers"), "2\n");
    let mut sink = MemorySink::new();

    let orchestrator = RunOrchestrator::new(plan(&[2017, 2018], &["Camden"], &["Drivers"]));
    let captured = run(&orchestrator, &schemas, &files, &mut sink);

    assert!(!captured.outcome.is_pass());
    assert_eq!(
        captured.table_report,
        "\nDiscrepancies in columns:\n\
         Table: Drivers\n\
         File: Camden_2018_Drivers/Camden2018Drivers.txt\n\
         Missing columns: age\n"
    );
    assert_eq!(sink.publish_calls(), 0);
    assert_eq!(captured.outcome.stats.discrepancies, 1);
}

#[test]
fn test_missing_schema_contributes_nothing() {
    let files = InMemoryFiles::new()
        .with_file(UnitKey::new(2019, "Camden", "Accidents"), "1,2,3\n")
        .with_file(UnitKey::new(2019, "Camden", "Pedestrians"), "1,2,3\n");
    let mut sink = MemorySink::new();

    let orchestrator =
        RunOrchestrator::new(plan(&[2019], &["Camden"], &["Accidents", "Pedestrians"]));
    let captured = run(&orchestrator, &accident_schemas(), &files, &mut sink);

    assert!(captured.outcome.is_pass());
    assert_eq!(
        captured.issues,
        "Field names file for table 'Pedestrians' not found.\n"
    );
    assert_eq!(sink.table_names(), vec!["crash_newjersey", "crash_nj_pedestrians"]);
    let pedestrians = sink.table("crash_nj_pedestrians").unwrap();
    assert!(pedestrians.is_empty());
    assert!(pedestrians.columns().is_empty());
    assert_eq!(captured.outcome.stats.missing_schemas, 1);
    assert_eq!(captured.outcome.stats.units_empty, 1);
}

#[test]
fn test_missing_unit_never_reuses_previous_records() {
    let files = InMemoryFiles::new()
        .with_file(UnitKey::new(2017, "Atlantic", "Drivers"), "1,30\n2,31\n");
    let mut sink = MemorySink::new();

    let orchestrator =
        RunOrchestrator::new(plan(&[2017], &["Atlantic", "Bergen"], &["Drivers"]));
    let captured = run(&orchestrator, &accident_schemas(), &files, &mut sink);

    assert!(!captured.outcome.is_pass());
    assert_eq!(captured.outcome.stats.records_merged, 2);
    assert_eq!(captured.outcome.stats.discrepancies, 0);
}

#[test]
fn test_runs_are_deterministic() {
    let files = InMemoryFiles::new()
        .with_file(UnitKey::new(2017, "Atlantic", "Accidents"), "1,2,3\n4,5\n\"x\n")
        .with_file(UnitKey::new(2017, "Atlantic", "Drivers"), "1,30\n");
    let orchestrator =
        RunOrchestrator::new(plan(&[2017], &["Atlantic", "Bergen"], &["Accidents", "Drivers"]));

    let mut first_sink = MemorySink::new();
    let mut second_sink = MemorySink::new();
    let first = run(&orchestrator, &accident_schemas(), &files, &mut first_sink);
    let second = run(&orchestrator, &accident_schemas(), &files, &mut second_sink);

    assert!(!first.issues.is_empty());
    assert_eq!(first.issues, second.issues);
    assert_eq!(first.table_report, second.table_report);
    assert_eq!(first.outcome.verdict, second.outcome.verdict);
    assert_eq!(first.outcome.stats, second.outcome.stats);
}

#[test]
fn test_empty_tables_are_published_with_declared_columns() {
    let files = InMemoryFiles::new()
        .with_file(UnitKey::new(2021, "Warren", "Accidents"), "1,2,3\n")
        .with_file(UnitKey::new(2021, "Warren", "Drivers"), "");
    let mut sink = MemorySink::new();

    let orchestrator = RunOrchestrator::new(plan(&[2021], &["Warren"], &["Accidents", "Drivers"]));
    let captured = run(&orchestrator, &accident_schemas(), &files, &mut sink);

    assert!(captured.outcome.is_pass());
    assert_eq!(sink.table_names(), vec!["crash_newjersey", "crash_nj_drivers"]);
    let drivers = sink.table("crash_nj_drivers").unwrap();
    assert!(drivers.is_empty());
    assert_eq!(drivers.columns(), ["id".to_string(), "age".to_string()]);
    assert_eq!(captured.outcome.published[1].rows, 0);
    assert_eq!(captured.outcome.stats.units_empty, 1);
}

#[test]
fn test_passing_rerun_replaces_stale_table() {
    let orchestrator = RunOrchestrator::new(plan(&[2018], &["Ocean"], &["Accidents", "Drivers"]));
    let mut sink = MemorySink::new();

    let first_files = InMemoryFiles::new()
        .with_file(UnitKey::new(2018, "Ocean", "Accidents"), "1,2,3\n")
        .with_file(UnitKey::new(2018, "Ocean", "Drivers"), "7,55\n");
    let first = run(&orchestrator, &accident_schemas(), &first_files, &mut sink);
    assert!(first.outcome.is_pass());
    assert_eq!(sink.table("crash_nj_drivers").unwrap().len(), 1);

    // The only driver row is now short, so no driver records survive
    let second_files = InMemoryFiles::new()
        .with_file(UnitKey::new(2018, "Ocean", "Accidents"), "1,2,3\n")
        .with_file(UnitKey::new(2018, "Ocean", "Drivers"), "7\n");
    let second = run(&orchestrator, &accident_schemas(), &second_files, &mut sink);

    assert!(second.outcome.is_pass());
    assert_eq!(second.outcome.stats.problematic_rows, 1);
    assert_eq!(sink.table("crash_nj_drivers").unwrap().len(), 0);
    assert_eq!(sink.table("crash_newjersey").unwrap().len(), 1);
}

#[test]
fn test_failed_publish_rolls_back_every_table() {
    let files = InMemoryFiles::new()
        .with_file(UnitKey::new(2018, "Ocean", "Accidents"), "1,2,3\n")
        .with_file(UnitKey::new(2018, "Ocean", "Drivers"), "7,55\n");
    let orchestrator = RunOrchestrator::new(plan(&[2018], &["Ocean"], &["Accidents", "Drivers"]));
    let mut sink = FailingSink::new(MemorySink::new(), "crash_nj_drivers");

    let (result, _, table_report) = try_run(&orchestrator, &accident_schemas(), &files, &mut sink);

    assert!(result.is_err());
    assert_eq!(table_report, "");
    assert_eq!(sink.inner.publish_calls(), 1);
    assert!(sink.inner.table_names().is_empty());

    // A later group on the same sink is unaffected by the abandoned one
    sink.fail_on = String::new();
    let captured = run(&orchestrator, &accident_schemas(), &files, &mut sink);
    assert!(captured.outcome.is_pass());
    assert_eq!(
        sink.inner.table_names(),
        vec!["crash_newjersey", "crash_nj_drivers"]
    );
}

#[test]
fn test_invalid_field_list_aborts_before_any_report_output() {
    // Drivers in 2019 has a duplicate field; Accidents units come first
    let schemas = accident_schemas().with_table_for_year("Drivers", 2019, &["id", "ID"]);
    let files = InMemoryFiles::new()
        .with_file(UnitKey::new(2018, "Ocean", "Accidents"), "1,2\n")
        .with_file(UnitKey::new(2018, "Ocean", "Drivers"), "7,55\n")
        .with_file(UnitKey::new(2019, "Ocean", "Accidents"), "1,2,3\n")
        .with_file(UnitKey::new(2019, "Ocean", "Drivers"), "7,55\n");
    let orchestrator =
        RunOrchestrator::new(plan(&[2018, 2019], &["Ocean"], &["Accidents", "Drivers"]));
    let mut sink = MemorySink::new();

    let (result, issues, table_report) = try_run(&orchestrator, &schemas, &files, &mut sink);

    assert!(result.is_err());
    assert_eq!(issues, "");
    assert_eq!(table_report, "");
    assert_eq!(sink.publish_calls(), 0);
    assert!(orchestrator.check_schemas(&accident_schemas()).is_ok());
}

#[test]
fn test_dry_run_never_publishes() {
    let files = InMemoryFiles::new()
        .with_file(UnitKey::new(2021, "Warren", "Accidents"), "1,2,3\n");
    let mut sink = MemorySink::new();

    let orchestrator =
        RunOrchestrator::new(plan(&[2021], &["Warren"], &["Accidents"])).dry_run();
    let captured = run(&orchestrator, &accident_schemas(), &files, &mut sink);

    assert!(captured.outcome.is_pass());
    assert_eq!(sink.publish_calls(), 0);
    assert!(captured.outcome.published.is_empty());
}

#[test]
fn test_publishes_every_table_under_external_names() {
    let files = InMemoryFiles::new()
        .with_file(UnitKey::new(2018, "Ocean", "Accidents"), "1,2,3\n")
        .with_file(UnitKey::new(2018, "Ocean", "Drivers"), "7,55\n");
    let mut sink = MemorySink::new();

    let plan: RunPlan = plan(&[2018], &["Ocean"], &["Accidents", "Drivers"]);
    let captured = run(&RunOrchestrator::new(plan), &accident_schemas(), &files, &mut sink);

    assert!(captured.outcome.is_pass());
    assert_eq!(sink.table_names(), vec!["crash_newjersey", "crash_nj_drivers"]);
    assert_eq!(sink.table("crash_nj_drivers").unwrap().records()[0].get("age"), Some("55"));
}
