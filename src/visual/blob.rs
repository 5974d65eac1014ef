//! Pure waveform synthesis for the blob outline.
//!
//! A closed outline is sampled at 101 angular steps over one full turn (the
//! first and last points coincide). Three superimposed waves perturb the
//! radius and a uniform pulsation term breathes the whole shape.

use std::f64::consts::TAU;

/// Angular segments per turn; the sampled path has `OUTLINE_SEGMENTS + 1`
/// points, closing on itself.
pub const OUTLINE_SEGMENTS: usize = 100;

/// Radial perturbation at angle `theta` for phase `t`.
///
/// The third term carries no noise factor on purpose: low-noise moods still
/// show a small baseline ripple instead of collapsing to a circle.
pub fn radial_offset(theta: f64, t: f64, noise: f64) -> f64 {
    (3.0 * theta + t).sin() * 20.0 * noise
        + (5.0 * theta - 2.0 * t).cos() * 15.0 * noise
        + (7.0 * theta + 0.5 * t).sin() * 10.0
}

/// Uniform pulsation applied to every sample of a frame.
pub fn pulse(t: f64, base_radius: f64, pulse_rate: f64) -> f64 {
    (10.0 * t).sin() * base_radius * pulse_rate * 10.0
}

/// Sample radius per angular step. Index `i` corresponds to
/// `theta = TAU * i / OUTLINE_SEGMENTS`; the table has 101 entries.
pub fn sample_radii(base_radius: f64, t: f64, noise: f64, pulse_rate: f64) -> Vec<f64> {
    let pulse = pulse(t, base_radius, pulse_rate);
    (0..=OUTLINE_SEGMENTS)
        .map(|i| {
            let theta = TAU * i as f64 / OUTLINE_SEGMENTS as f64;
            base_radius + radial_offset(theta, t, noise) + pulse
        })
        .collect()
}

/// The closed outline as points around `center`.
pub fn sample_outline(
    center: (f64, f64),
    base_radius: f64,
    t: f64,
    noise: f64,
    pulse_rate: f64,
) -> Vec<(f64, f64)> {
    sample_radii(base_radius, t, noise, pulse_rate)
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let theta = TAU * i as f64 / OUTLINE_SEGMENTS as f64;
            (center.0 + theta.cos() * r, center.1 + theta.sin() * r)
        })
        .collect()
}

/// Outline radius at an arbitrary angle, linearly interpolated between the
/// two neighboring samples (the straight segments of the closed path).
pub fn radius_at(radii: &[f64], theta: f64) -> f64 {
    let pos = theta.rem_euclid(TAU) / TAU * OUTLINE_SEGMENTS as f64;
    let i = pos.floor() as usize;
    let frac = pos - i as f64;
    let a = radii[i.min(OUTLINE_SEGMENTS)];
    let b = radii[(i + 1).min(OUTLINE_SEGMENTS)];
    a + (b - a) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_closes_on_itself() {
        let points = sample_outline((50.0, 50.0), 30.0, 17.3, 0.8, 0.02);
        assert_eq!(points.len(), OUTLINE_SEGMENTS + 1);
        let first = points[0];
        let last = points[OUTLINE_SEGMENTS];
        assert!((first.0 - last.0).abs() < 1e-6);
        assert!((first.1 - last.1).abs() < 1e-6);
    }

    #[test]
    fn test_zero_noise_keeps_baseline_ripple() {
        // With noise at zero only the third wave survives; the outline must
        // still deviate from a circle somewhere.
        let radii = sample_radii(30.0, 1.0, 0.0, 0.0);
        let max = radii.iter().cloned().fold(f64::MIN, f64::max);
        let min = radii.iter().cloned().fold(f64::MAX, f64::min);
        assert!(max - min > 1.0);
        // And the deviation is bounded by the wave's 10 px amplitude.
        assert!(max <= 40.0 + 1e-9);
        assert!(min >= 20.0 - 1e-9);
    }

    #[test]
    fn test_pulse_is_angle_independent() {
        let with_pulse = sample_radii(30.0, 0.4, 0.0, 0.05);
        let without = sample_radii(30.0, 0.4, 0.0, 0.0);
        let delta = pulse(0.4, 30.0, 0.05);
        for (a, b) in with_pulse.iter().zip(without.iter()) {
            assert!((a - b - delta).abs() < 1e-9);
        }
    }

    #[test]
    fn test_radius_interpolation_hits_samples_exactly() {
        let radii = sample_radii(30.0, 2.0, 0.5, 0.01);
        for i in 0..=OUTLINE_SEGMENTS {
            let theta = TAU * i as f64 / OUTLINE_SEGMENTS as f64;
            assert!((radius_at(&radii, theta) - radii[i]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_radius_interpolation_wraps_past_full_turn() {
        let radii = sample_radii(30.0, 2.0, 0.5, 0.01);
        assert!((radius_at(&radii, TAU + 0.1) - radius_at(&radii, 0.1)).abs() < 1e-9);
        assert!((radius_at(&radii, -0.1) - radius_at(&radii, TAU - 0.1)).abs() < 1e-9);
    }
}
