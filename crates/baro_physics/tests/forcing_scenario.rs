// crates/baro_physics/tests/forcing_scenario.rs

//! 端到端强迫场景
//!
//! 静止初态，赤道 (0°, 0°) 处单个高斯强迫（振幅 1e-9，宽度 5°），
//! T42、2° 规则网格、Δt = 15 分钟，积分一步。

use std::sync::{Arc, Mutex};

use baro_foundation::PhysicalConstants;
use baro_physics::{
    AtmosphericState, ForcingSpec, Formulation, ModelBuilder, ModelRunner, Monitor, MonitorError,
};
use baro_spectral::SphericalGrid;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use ndarray::Array2;

const AMPLITUDE: f64 = 1e-9;
const WIDTH_DEG: f64 = 5.0;
const DT_SECONDS: f64 = 900.0;

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2017, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn rest_state(linearized: bool) -> AtmosphericState {
    let grid = SphericalGrid::regular(91, 180).unwrap();
    let zero = Array2::zeros(grid.shape());
    AtmosphericState::from_winds(
        grid.latitudes().to_vec(),
        grid.longitudes().to_vec(),
        &zero,
        &zero,
        &zero,
        &zero,
        linearized,
        42,
        PhysicalConstants::earth(),
        start(),
    )
    .unwrap()
}

fn builder(formulation: Formulation) -> ModelBuilder {
    ModelBuilder::new(formulation, 42, PhysicalConstants::earth())
        .with_diffusion(2.338e16)
        .with_forcing(ForcingSpec::single((0.0, 0.0), AMPLITUDE, WIDTH_DEG))
}

/// 记录每次输出时刻与诊断量名
#[derive(Clone, Default)]
struct Recorder {
    records: Arc<Mutex<Vec<(NaiveDateTime, Vec<String>)>>>,
}

impl Monitor for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn store(&mut self, state: &AtmosphericState) -> Result<(), MonitorError> {
        let names = state.named_fields()?.into_iter().map(|(n, _)| n).collect();
        self.records
            .lock()
            .map_err(|e| e.to_string())?
            .push((state.time, names));
        Ok(())
    }
}

fn check_single_step(state: &AtmosphericState) {
    let grid = state.transform().grid();
    let zeta = state.flow.vorticity.grid().unwrap();
    let expected_peak = DT_SECONDS * AMPLITUDE;

    // 峰值位于强迫中心：赤道为第 45 行，经度 0 为第 0 列
    let peak = zeta[[45, 0]];
    let max = zeta.iter().cloned().fold(f64::MIN, f64::max);
    assert_eq!(peak, max);
    let ratio = peak / expected_peak;
    assert!(ratio > 0.9 && ratio < 1.02, "peak ratio = {ratio}");

    // 远场只剩截断振铃
    let mut far_max = 0.0_f64;
    let mut far_sum = 0.0;
    let mut far_count = 0usize;
    for ((j, k), v) in zeta.indexed_iter() {
        let d = SphericalGrid::great_circle_degrees(0.0, 0.0, grid.latitudes()[j], grid.longitudes()[k]);
        if d > 30.0 {
            far_max = far_max.max(v.abs());
            far_sum += v.abs();
            far_count += 1;
        }
    }
    assert!(far_max < 5e-3 * peak, "far max = {}", far_max / peak);
    assert!(far_sum / (far_count as f64) < 1e-3 * peak);

    // 面积分 ≈ Δt·A·π(w·a)²
    let a = PhysicalConstants::earth().planetary_radius;
    let integral = grid.integrate(zeta).unwrap() * a * a;
    let expected = expected_peak * std::f64::consts::PI * (WIDTH_DEG.to_radians() * a).powi(2);
    assert!(
        (integral / expected - 1.0).abs() < 0.02,
        "integral ratio = {}",
        integral / expected
    );
}

#[test]
fn test_single_step_nonlinear() {
    let state = rest_state(false);
    let mut stepper = builder(Formulation::Nonlinear).build(&state).unwrap();
    let (diagnostics, pending) = stepper.step(&state, Duration::minutes(15)).unwrap();
    assert!(diagnostics.contains("dynamics_absolute_vorticity"));

    let next = pending.advance(Duration::minutes(15)).unwrap();
    assert_eq!(next.time, start() + Duration::minutes(15));
    check_single_step(&next);
}

#[test]
fn test_single_step_linear() {
    let state = rest_state(true);
    let mut stepper = builder(Formulation::Linear)
        .with_damping(14.7)
        .build(&state)
        .unwrap();
    let (_, pending) = stepper.step(&state, Duration::minutes(15)).unwrap();
    let next = pending.advance(Duration::minutes(15)).unwrap();
    check_single_step(&next);
    assert_eq!(
        next.field_names()[0],
        "vorticity_prime",
    );
}

#[test]
fn test_runner_single_step_and_store() {
    let state = rest_state(false);
    let stepper = builder(Formulation::Nonlinear)
        .with_tendency_diagnostics(true)
        .build(&state)
        .unwrap();
    let recorder = Recorder::default();
    let records = recorder.records.clone();

    let mut runner = ModelRunner::new(stepper).with_monitor(Box::new(recorder), 6);
    let (final_state, summary) = runner
        .run(state, Duration::minutes(15), start())
        .unwrap();

    assert_eq!(summary.steps, 1);
    assert_eq!(summary.stores, 1);
    assert_eq!(summary.end, start());
    check_single_step(&final_state);

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    let (time, names) = &records[0];
    assert_eq!(*time, start());
    assert!(names.contains(&"forcing_vorticity_tendency".to_string()));
    assert!(names.contains(&"dynamics_absolute_vorticity".to_string()));
}
