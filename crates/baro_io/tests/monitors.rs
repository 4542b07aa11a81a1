// crates/baro_io/tests/monitors.rs

//! 监视器与驱动循环的集成测试

use baro_foundation::PhysicalConstants;
use baro_io::{read_snapshots, InitialConditions, SnapshotMonitor, SummaryMonitor};
use baro_physics::{AtmosphericState, ForcingSpec, Formulation, ModelBuilder, ModelRunner, Monitor};
use chrono::{Duration, NaiveDate, NaiveDateTime};

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2017, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn solid_body_state(linearized: bool) -> AtmosphericState {
    InitialConditions::solid_body(37, 72, 10.0)
        .unwrap()
        .into_state(linearized, 15, PhysicalConstants::earth(), start())
        .unwrap()
}

#[test]
fn test_snapshot_overwrite_and_append() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.jsonl");
    let state = solid_body_state(true);

    let mut monitor = SnapshotMonitor::create(&path, false).unwrap();
    monitor.store(&state).unwrap();
    monitor.store(&state).unwrap();
    assert_eq!(monitor.records(), 2);
    assert_eq!(read_snapshots(&path).unwrap().len(), 2);

    let mut appended = SnapshotMonitor::create(&path, true).unwrap();
    appended.store(&state).unwrap();
    assert_eq!(read_snapshots(&path).unwrap().len(), 3);

    let mut fresh = SnapshotMonitor::create(&path, false).unwrap();
    fresh.store(&state).unwrap();
    assert_eq!(read_snapshots(&path).unwrap().len(), 1);
}

#[test]
fn test_snapshot_record_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.jsonl");
    let state = solid_body_state(true);

    let mut monitor = SnapshotMonitor::create(&path, false).unwrap();
    monitor.store(&state).unwrap();

    let records = read_snapshots(&path).unwrap();
    let record = &records[0];
    assert_eq!(record.time, start());
    assert_eq!(record.latitude.len(), 37);
    assert_eq!(record.longitude.len(), 72);
    for name in ["vorticity_prime", "u_wind_bar", "streamfunction_bar", "v_wind_prime"] {
        assert!(record.fields.contains_key(name), "缺少 {name}");
    }

    let u_eq = record.value("u_wind_bar", 18, 0).unwrap();
    assert!((u_eq - 10.0).abs() < 1e-8);
    assert_eq!(record.value("vorticity_prime", 0, 0), Some(0.0));
    assert_eq!(record.value("vorticity_prime", 99, 0), None);
}

#[test]
fn test_read_snapshots_reports_bad_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.jsonl");
    std::fs::write(&path, "{\"time\": \"nope\"}\n").unwrap();
    let err = read_snapshots(&path).unwrap_err();
    assert!(matches!(err, baro_io::IoError::ParseError { line: 1, .. }));
}

#[test]
fn test_summary_monitor() {
    let state = solid_body_state(false);
    let mut monitor = SummaryMonitor::new();
    monitor.store(&state).unwrap();

    let (time, stats) = monitor.last().unwrap();
    assert_eq!(*time, start());
    let u = stats.iter().find(|s| s.name == "u_wind").unwrap();
    assert!((u.max - 10.0).abs() < 1e-8);
    assert!(u.min.abs() < 1e-8);
    let v = stats.iter().find(|s| s.name == "v_wind").unwrap();
    assert!(v.rms < 1e-8);
}

#[test]
fn test_runner_writes_on_cadence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.jsonl");
    let state = solid_body_state(true);

    let stepper = ModelBuilder::new(Formulation::Linear, 15, PhysicalConstants::earth())
        .with_diffusion(2.338e16)
        .with_forcing(ForcingSpec::single((35.0, 160.0), 4e-10, 7.0))
        .with_damping(14.7)
        .with_tendency_diagnostics(true)
        .build(&state)
        .unwrap();

    let snapshot = SnapshotMonitor::create(&path, false).unwrap();
    let mut runner = ModelRunner::new(stepper)
        .with_monitor(Box::new(snapshot), 6)
        .with_monitor(Box::new(SummaryMonitor::new()), 12);
    assert_eq!(runner.monitor_names(), vec!["snapshot", "summary"]);

    let end = start() + Duration::hours(12);
    let (last, summary) = runner.run(state, Duration::hours(1), end).unwrap();
    assert_eq!(summary.steps, 13);
    // 快照 0/6/12 时，统计 0/12 时
    assert_eq!(summary.stores, 5);
    assert_eq!(last.time, start() + Duration::hours(13));

    let records = read_snapshots(&path).unwrap();
    let times: Vec<i64> = records
        .iter()
        .map(|r| (r.time - start()).num_hours())
        .collect();
    assert_eq!(times, vec![0, 6, 12]);

    let last_record = records.last().unwrap();
    assert!(last_record.fields.contains_key("dynamics_absolute_vorticity"));
    assert!(last_record.fields.contains_key("forcing_vorticity_tendency"));

    // 强迫在 12 小时后已产生正涡度扰动
    let peak = last_record.fields["vorticity_prime"]
        .iter()
        .flatten()
        .fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    assert!(peak > 0.0);
}
