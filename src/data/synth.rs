//! Synthetic duration/view-rate samples from known curve parameters.
//!
//! Used to sanity-check the fitter end to end (`viewfit simulate`, then
//! `viewfit fit`) and by tests that need noisy data with a known answer.
//! Generation is fully determined by the seed.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{RationalParams, Sample};
use crate::error::AppError;
use crate::models::{denominator, evaluate};

/// What to generate.
#[derive(Debug, Clone)]
pub struct SynthSpec {
    pub params: RationalParams,
    pub n: usize,
    /// Duration range in minutes; `x` is drawn uniformly from `[x_min, x_max]`.
    pub x_min: f64,
    pub x_max: f64,
    /// Standard deviation of additive Gaussian noise on `y`.
    pub noise_sd: f64,
    pub seed: u64,
}

/// Generate `spec.n` samples, sorted by `x`.
///
/// Noisy `y` values are clamped at zero since view rates cannot be negative.
pub fn generate_samples(spec: &SynthSpec) -> Result<Vec<Sample>, AppError> {
    if spec.n == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }
    if !(spec.x_min.is_finite() && spec.x_max.is_finite() && spec.x_min > 0.0 && spec.x_max > spec.x_min) {
        return Err(AppError::new(
            2,
            format!(
                "Invalid duration range [{}, {}] (must be finite, >0, and max>min).",
                spec.x_min, spec.x_max
            ),
        ));
    }
    if !spec.params.is_finite() {
        return Err(AppError::new(2, "Curve parameters must be finite."));
    }
    // 1 + c·x is linear in x, so checking both ends covers the whole range.
    if denominator(spec.x_min, &spec.params) * denominator(spec.x_max, &spec.params) <= 0.0 {
        return Err(AppError::new(
            2,
            format!("Curve has a pole inside [{}, {}].", spec.x_min, spec.x_max),
        ));
    }

    if !(spec.noise_sd.is_finite() && spec.noise_sd >= 0.0) {
        return Err(AppError::new(
            2,
            format!("Noise level must be finite and >= 0, got {}.", spec.noise_sd),
        ));
    }

    let noise = Normal::new(0.0, spec.noise_sd)
        .map_err(|e| AppError::new(2, format!("Invalid noise level {}: {e}", spec.noise_sd)))?;
    let mut rng = StdRng::seed_from_u64(spec.seed);

    let mut samples: Vec<Sample> = (0..spec.n)
        .map(|_| {
            let x = rng.gen_range(spec.x_min..=spec.x_max);
            let y = (evaluate(x, &spec.params) + noise.sample(&mut rng)).max(0.0);
            Sample::new(x, y)
        })
        .collect();

    samples.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> SynthSpec {
        SynthSpec {
            params: RationalParams::new(100.0, 2.0, 0.1),
            n: 50,
            x_min: 1.0,
            x_max: 60.0,
            noise_sd: 1.0,
            seed: 42,
        }
    }

    #[test]
    fn same_seed_same_samples() {
        let a = generate_samples(&spec()).unwrap();
        let b = generate_samples(&spec()).unwrap();
        assert_eq!(a, b);

        let mut other = spec();
        other.seed = 43;
        assert_ne!(a, generate_samples(&other).unwrap());
    }

    #[test]
    fn samples_stay_in_range_and_sorted() {
        let samples = generate_samples(&spec()).unwrap();
        assert_eq!(samples.len(), 50);
        for w in samples.windows(2) {
            assert!(w[0].x <= w[1].x);
        }
        for s in &samples {
            assert!(s.x >= 1.0 && s.x <= 60.0);
            assert!(s.y >= 0.0);
        }
    }

    #[test]
    fn zero_noise_lies_on_the_curve() {
        let mut s = spec();
        s.noise_sd = 0.0;
        for sample in generate_samples(&s).unwrap() {
            assert_eq!(sample.y, evaluate(sample.x, &s.params));
        }
    }

    #[test]
    fn rejects_pole_inside_range() {
        let mut s = spec();
        s.params.c = -0.1; // pole at x = 10
        assert_eq!(generate_samples(&s).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn rejects_negative_or_non_finite_noise() {
        for sd in [-1.0, f64::NAN, f64::INFINITY] {
            let mut s = spec();
            s.noise_sd = sd;
            assert_eq!(generate_samples(&s).unwrap_err().exit_code(), 2, "noise_sd={sd}");
        }
    }

    #[test]
    fn rejects_bad_settings() {
        let mut s = spec();
        s.n = 0;
        assert!(generate_samples(&s).is_err());


        let mut s = spec();
        s.x_max = s.x_min;
        assert!(generate_samples(&s).is_err());
    }
}
