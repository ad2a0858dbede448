use super::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn params(base: f64, shift: f64, variance: f64, failure: f64) -> SimulationParameters {
    SimulationParameters {
        base_duration: base,
        mode_shift: shift,
        variance_multiplier: variance,
        failure_probability: failure,
    }
}

#[test]
fn test_standard_uncertainty_floor_and_cap() {
    assert_eq!(standard_uncertainty(10.0, 0.0), 0.2);
    assert_eq!(standard_uncertainty(10.0, 3.0), 0.3);
    assert_eq!(standard_uncertainty(10.0, 40.0), 0.5);
    assert_eq!(standard_uncertainty(0.0, 5.0), 0.2);
}

#[test]
fn test_standard_and_forensic_uncertainty_asymmetry() {
    // The standard shape never goes below 20%; the forensic shape does when
    // the variance multiplier is below 1.0.
    assert_eq!(standard_uncertainty(10.0, 0.1), 0.2);
    assert!((forensic_uncertainty(0.5) - 0.1).abs() < 1e-12);
    assert_eq!(forensic_uncertainty(1.0), 0.2);
    assert_eq!(forensic_uncertainty(4.0), 0.5);
}

#[test]
fn test_standard_shape() {
    let t = Triangular::standard(10.0, 0.0);
    assert!((t.min() - 8.0).abs() < 1e-12);
    assert_eq!(t.mode(), 10.0);
    assert!((t.max() - 12.0).abs() < 1e-12);
}

#[test]
fn test_forensic_shape_shifts_mode() {
    let t = Triangular::forensic(&params(10.0, 0.2, 1.0, 0.0));
    assert!((t.mode() - 12.0).abs() < 1e-12);
    assert!((t.min() - 9.6).abs() < 1e-9);
    assert!((t.max() - 14.4).abs() < 1e-9);
}

#[test]
fn test_negative_mode_shift_keeps_valid_shape() {
    let t = Triangular::forensic(&params(1.0, -1.5, 1.0, 0.0));
    assert!(t.min() <= t.mode());
    assert!(t.mode() <= t.max());

    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..100 {
        assert!(t.sample(&mut rng) >= MIN_DRAW_DAYS);
    }
}

#[test]
fn test_inverse_cdf_endpoints() {
    let t = Triangular::new(2.0, 5.0, 8.0);
    assert_eq!(t.inverse_cdf(0.0), 2.0);
    assert_eq!(t.inverse_cdf(1.0), 8.0);
    assert!((t.inverse_cdf(0.5) - 5.0).abs() < 1e-12);
}

#[test]
fn test_degenerate_shape_returns_mode() {
    let t = Triangular::new(3.0, 3.0, 3.0);
    assert_eq!(t.inverse_cdf(0.7), 3.0);
}

#[test]
fn test_draws_stay_in_support() {
    let t = Triangular::standard(5.0, 1.0);
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..1000 {
        let d = t.sample(&mut rng);
        assert!(d >= t.min() - 1e-12 && d <= t.max() + 1e-12);
    }
}

#[test]
fn test_certain_failure_stretches_every_draw() {
    let draw = DurationDraw::forensic(&params(10.0, 0.0, 0.0, 1.0));
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..200 {
        let d = draw.sample(&mut rng);
        assert!((15.0..20.0).contains(&d), "draw {} outside 1.5x-2x", d);
    }
}
