//! Synthetic dissolution profiles for demos and manual testing.
//!
//! The profile follows first-order release
//!
//! `q(t) = scale · (1 - exp(-k · t))`
//!
//! sampled every `interval` minutes starting at `t = 0`, with additive
//! Gaussian noise. Noisy values are clamped into `[0, scale)` so the
//! first-order transform stays defined.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DemoConfig, Observation, ObservationSet};
use crate::error::{AppError, EXIT_USAGE};

/// Keep generated quantities this far below the scale.
const SCALE_MARGIN: f64 = 1e-3;

pub fn generate_profile(config: &DemoConfig) -> Result<ObservationSet, AppError> {
    if config.count == 0 {
        return Err(AppError::new(EXIT_USAGE, "Sample count must be > 0."));
    }
    if !(config.interval.is_finite() && config.interval > 0.0) {
        return Err(AppError::new(EXIT_USAGE, "Sampling interval must be finite and > 0."));
    }
    if !(config.rate.is_finite() && config.rate > 0.0) {
        return Err(AppError::new(EXIT_USAGE, "Rate constant must be finite and > 0."));
    }
    if !(config.scale.is_finite() && config.scale > 0.0) {
        return Err(AppError::new(EXIT_USAGE, "Scale must be finite and > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.noise.max(0.0))
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Noise distribution error: {e}")))?;

    let upper = config.scale * (1.0 - SCALE_MARGIN);
    let points: Vec<Observation> = (0..config.count)
        .map(|i| {
            let time = i as f64 * config.interval;
            let clean = config.scale * -(-config.rate * time).exp_m1();
            let quantity = (clean + normal.sample(&mut rng)).clamp(0.0, upper);
            Observation { time, quantity }
        })
        .collect();

    Ok(ObservationSet::from_observations(&points))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_is_reproducible_for_a_seed() {
        let config = DemoConfig::default();
        let a = generate_profile(&config).unwrap();
        let b = generate_profile(&config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), config.count);

        let other = generate_profile(&DemoConfig { seed: 7, ..config }).unwrap();
        assert_ne!(a, other);
    }

    #[test]
    fn profile_stays_below_scale() {
        let config = DemoConfig {
            rate: 0.5,
            noise: 5.0,
            count: 40,
            ..DemoConfig::default()
        };
        let set = generate_profile(&config).unwrap();
        assert!(set.quantities().iter().all(|&q| (0.0..config.scale).contains(&q)));
    }

    #[test]
    fn noiseless_profile_fits_first_order_exactly() {
        let config = DemoConfig {
            noise: 0.0,
            ..DemoConfig::default()
        };
        let set = generate_profile(&config).unwrap();
        let fit = crate::fit::fit_first_order(set.times(), set.quantities(), &crate::fit::FitOptions::default())
            .unwrap();
        assert!((fit.k - config.rate).abs() < 1e-8, "k={}", fit.k);
        assert!((fit.a0 - config.scale).abs() < 1e-6, "a0={}", fit.a0);
    }

    #[test]
    fn zero_count_is_rejected() {
        let config = DemoConfig {
            count: 0,
            ..DemoConfig::default()
        };
        assert!(generate_profile(&config).is_err());
    }
}
