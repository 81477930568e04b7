//! End-to-end tests for the causality pipeline: known coupled systems in,
//! causality verdicts out.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use dimcausal_analysis::{infer_causality, CausalityEngine};
use dimcausal_core::config::CausalityConfig;
use dimcausal_core::result::CausalDirection;
use dimcausal_core::series::TimeSeries;

/// Independent uniform white noise.
fn white_noise(n: usize, seed: u64) -> TimeSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    TimeSeries::new((0..n).map(|_| rng.gen::<f64>()).collect()).unwrap()
}

/// Unidirectionally coupled chaotic maps: X is an autonomous logistic
/// map, Y blends its own logistic dynamics with the current X state.
/// X drives Y; Y never feeds back into X.
fn coupled_pair(n: usize, coupling: f64, seed: u64) -> (TimeSeries, TimeSeries) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut x: f64 = 0.2 + 0.6 * rng.gen::<f64>();
    let mut y: f64 = 0.2 + 0.6 * rng.gen::<f64>();
    let mut xs = Vec::with_capacity(n);
    let mut ys = Vec::with_capacity(n);
    // Burn in past transients.
    for _ in 0..200 {
        let x_next = 3.9 * x * (1.0 - x);
        let y_next = (1.0 - coupling) * 3.9 * y * (1.0 - y) + coupling * x;
        x = x_next;
        y = y_next;
    }
    for _ in 0..n {
        let x_next = 3.9 * x * (1.0 - x);
        let y_next = (1.0 - coupling) * 3.9 * y * (1.0 - y) + coupling * x;
        x = x_next;
        y = y_next;
        xs.push(x);
        ys.push(y);
    }
    (TimeSeries::new(xs).unwrap(), TimeSeries::new(ys).unwrap())
}

fn config() -> CausalityConfig {
    CausalityConfig {
        embedding_dim: 3,
        time_delay: 1,
        neighbor_count: 10,
        ..Default::default()
    }
}

#[test]
fn test_driver_is_detected_across_seeds() {
    for seed in [1, 2, 3] {
        let (x, y) = coupled_pair(2000, 0.5, seed);
        let result = infer_causality(&x, &y, &config()).unwrap();
        assert_eq!(
            result.direction,
            CausalDirection::XCausesY,
            "seed {seed}: {:?}",
            result.decision
        );
        assert!(
            result.strength_x_to_y > 0.5,
            "seed {seed}: strength {}",
            result.strength_x_to_y
        );
        assert_eq!(result.strength_y_to_x, 0.0);
    }
}

#[test]
fn test_reversed_inputs_reverse_the_verdict() {
    let (x, y) = coupled_pair(2000, 0.5, 7);
    let forward = infer_causality(&x, &y, &config()).unwrap();
    let reversed = infer_causality(&y, &x, &config()).unwrap();
    assert_eq!(forward.direction, CausalDirection::XCausesY);
    assert_eq!(reversed.direction, CausalDirection::YCausesX);
    assert!((forward.strength_x_to_y - reversed.strength_y_to_x).abs() < 1e-9);
}

#[test]
fn test_independent_noise_finds_no_causality() {
    for seed in [11, 22, 33, 44, 55] {
        let x = white_noise(1000, seed);
        let y = white_noise(1000, seed + 1000);
        let result = infer_causality(&x, &y, &config()).unwrap();
        assert!(
            matches!(
                result.direction,
                CausalDirection::None | CausalDirection::Undetermined
            ),
            "seed {seed}: got {:?} with {:?}",
            result.direction,
            result.decision
        );
    }
}

#[test]
fn test_identical_series_report_circular_coupling() {
    let (x, _) = coupled_pair(1500, 0.0, 5);
    let result = infer_causality(&x, &x.clone(), &config()).unwrap();
    // One attractor seen through two identical observables: every space
    // shares the same dimension.
    assert_eq!(result.direction, CausalDirection::Both);
}

#[test]
fn test_joint_dimension_sits_between_marginal_and_product() {
    let (x, y) = coupled_pair(2000, 0.5, 3);
    let result = infer_causality(&x, &y, &config()).unwrap();
    // The driven marginal and the joint space see the full system; the
    // driver's marginal sees less, the product reference sees more.
    assert!(result.stats_x.mean < result.stats_joint.mean);
    assert!(result.stats_joint.mean < result.stats_product.mean);
}

#[test]
fn test_results_are_bit_identical_across_runs() {
    let (x, y) = coupled_pair(1200, 0.4, 9);
    let first = infer_causality(&x, &y, &config()).unwrap();
    let second = infer_causality(&x, &y, &config()).unwrap();
    // Serialized form catches any nondeterminism down to the last bit.
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_result_serializes_as_plain_record() {
    let (x, y) = coupled_pair(1200, 0.4, 13);
    let result = infer_causality(&x, &y, &config()).unwrap();
    let value: serde_json::Value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["direction"], "x_causes_y");
    assert!(value["stats_joint"]["mean"].is_f64());
    assert!(value["stats_joint"]["sample_count"].is_u64());
    assert!(value["trimming"]["x"]["boundary_removed"].is_u64());
    assert!(value["decision"]["p_gap"].is_f64());
}

#[test]
fn test_sweep_consensus_matches_single_k_verdict() {
    let (x, y) = coupled_pair(2000, 0.5, 2);
    let engine = CausalityEngine::new(config()).unwrap();
    let sweep = engine.infer_sweep(&x, &y, &[6, 8, 10]).unwrap();
    assert_eq!(sweep.entries.len(), 3);
    assert_eq!(sweep.consensus, CausalDirection::XCausesY);
    for entry in &sweep.entries {
        assert_eq!(
            entry.result.direction,
            CausalDirection::XCausesY,
            "k = {}",
            entry.neighbor_count
        );
    }
}

#[test]
fn test_downsampling_preserves_the_verdict() {
    let (x, y) = coupled_pair(4000, 0.5, 4);
    let config = CausalityConfig { downsample_rate: 2, ..config() };
    let result = infer_causality(&x, &y, &config).unwrap();
    assert_eq!(result.direction, CausalDirection::XCausesY);
    // Half the points survive embedding and downsampling, minus trimming.
    let total = result.stats_x.sample_count
        + result.trimming.x.boundary_removed
        + result.trimming.x.undefined_removed
        + result.trimming.x.outlier_removed;
    assert_eq!(total, (4000usize - 2).div_ceil(2));
}

#[test]
fn test_trim_reports_account_for_every_point() {
    let (x, y) = coupled_pair(1500, 0.5, 6);
    let result = infer_causality(&x, &y, &config()).unwrap();
    for report in [
        result.trimming.x,
        result.trimming.y,
        result.trimming.joint,
        result.trimming.product,
    ] {
        let total = report.surviving
            + report.boundary_removed
            + report.undefined_removed
            + report.outlier_removed;
        assert_eq!(total, 1500 - 2);
        assert_eq!(report.boundary_removed, 4);
    }
}
