use crate::core::error::SimError;
use rand::distributions::Uniform;
use rand::Rng;
use rand_distr::{Distribution, Exp, LogNormal, Normal};
use serde::{Deserialize, Serialize};

/// Distribution of a duration (inter-arrival gap or stage service time).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeDistribution {
    Fixed { value: f64 },
    Exponential { mean: f64 },
    Uniform { min: f64, max: f64 },
    Normal { mean: f64, std_dev: f64 },
    /// Parameters of the underlying normal distribution
    LogNormal { mu: f64, sigma: f64 },
}

impl TimeDistribution {
    pub fn fixed(value: f64) -> Self {
        TimeDistribution::Fixed { value }
    }

    pub fn exponential(mean: f64) -> Self {
        TimeDistribution::Exponential { mean }
    }

    /// Check the parameters can build a distribution. Does not guarantee every
    /// sample is non-negative (a normal can still dip below zero).
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |msg: String| -> Result<(), SimError> { Err(SimError::InvalidDistribution(msg)) };
        match *self {
            TimeDistribution::Fixed { value } => {
                if !value.is_finite() || value < 0.0 {
                    return invalid(format!("fixed value {} must be finite and >= 0", value));
                }
            }
            TimeDistribution::Exponential { mean } => {
                if !mean.is_finite() || mean <= 0.0 {
                    return invalid(format!("exponential mean {} must be finite and > 0", mean));
                }
            }
            TimeDistribution::Uniform { min, max } => {
                if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
                    return invalid(format!("uniform range [{}, {}] must satisfy 0 <= min <= max", min, max));
                }
            }
            TimeDistribution::Normal { mean, std_dev } => {
                if !mean.is_finite() || !std_dev.is_finite() || std_dev < 0.0 || Normal::new(mean, std_dev).is_err() {
                    return invalid(format!("normal({}, {}) is not a valid distribution", mean, std_dev));
                }
            }
            TimeDistribution::LogNormal { mu, sigma } => {
                if !mu.is_finite() || !sigma.is_finite() || sigma < 0.0 || LogNormal::new(mu, sigma).is_err() {
                    return invalid(format!("log-normal({}, {}) is not a valid distribution", mu, sigma));
                }
            }
        }
        Ok(())
    }

    /// Draw one duration. Negative or non-finite draws are errors, never clamped.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, SimError> {
        self.validate()?;

        let value = match *self {
            TimeDistribution::Fixed { value } => value,
            TimeDistribution::Exponential { mean } => Exp::new(1.0 / mean)
                .map_err(|e| SimError::InvalidDistribution(e.to_string()))?
                .sample(rng),
            TimeDistribution::Uniform { min, max } => {
                if min == max {
                    min
                } else {
                    Uniform::new(min, max).sample(rng)
                }
            }
            TimeDistribution::Normal { mean, std_dev } => Normal::new(mean, std_dev)
                .map_err(|e| SimError::InvalidDistribution(e.to_string()))?
                .sample(rng),
            TimeDistribution::LogNormal { mu, sigma } => LogNormal::new(mu, sigma)
                .map_err(|e| SimError::InvalidDistribution(e.to_string()))?
                .sample(rng),
        };

        if !value.is_finite() || value < 0.0 {
            return Err(SimError::NegativeSample { value });
        }
        Ok(value)
    }

    /// Expected value of a draw
    pub fn mean(&self) -> f64 {
        match *self {
            TimeDistribution::Fixed { value } => value,
            TimeDistribution::Exponential { mean } => mean,
            TimeDistribution::Uniform { min, max } => (min + max) / 2.0,
            TimeDistribution::Normal { mean, .. } => mean,
            TimeDistribution::LogNormal { mu, sigma } => (mu + sigma * sigma / 2.0).exp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fixed_always_returns_value() {
        let mut rng = StdRng::seed_from_u64(1);
        let dist = TimeDistribution::fixed(4.0);
        for _ in 0..5 {
            assert_eq!(dist.sample(&mut rng).unwrap(), 4.0);
        }
    }

    #[test]
    fn test_exponential_sample_mean_is_close() {
        let mut rng = StdRng::seed_from_u64(7);
        let dist = TimeDistribution::exponential(20.0);
        let n = 20_000;
        let total: f64 = (0..n).map(|_| dist.sample(&mut rng).unwrap()).sum();
        let mean = total / n as f64;
        assert!((mean - 20.0).abs() < 1.0, "sample mean {} too far from 20", mean);
    }

    #[test]
    fn test_uniform_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let dist = TimeDistribution::Uniform { min: 2.0, max: 3.0 };
        for _ in 0..1000 {
            let v = dist.sample(&mut rng).unwrap();
            assert!((2.0..3.0).contains(&v));
        }
        let degenerate = TimeDistribution::Uniform { min: 2.0, max: 2.0 };
        assert_eq!(degenerate.sample(&mut rng).unwrap(), 2.0);
    }

    #[test]
    fn test_negative_normal_draw_is_an_error() {
        let mut rng = StdRng::seed_from_u64(11);
        let dist = TimeDistribution::Normal { mean: -50.0, std_dev: 1.0 };
        assert!(dist.validate().is_ok());
        assert!(matches!(
            dist.sample(&mut rng),
            Err(SimError::NegativeSample { .. })
        ));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let bad = [
            TimeDistribution::fixed(-1.0),
            TimeDistribution::exponential(0.0),
            TimeDistribution::Uniform { min: 3.0, max: 1.0 },
            TimeDistribution::Normal { mean: 1.0, std_dev: -1.0 },
            TimeDistribution::LogNormal { mu: 0.0, sigma: f64::NAN },
        ];
        for dist in bad {
            assert!(
                matches!(dist.validate(), Err(SimError::InvalidDistribution(_))),
                "{:?} should be rejected",
                dist
            );
        }
    }

    #[test]
    fn test_same_seed_same_draws() {
        let dist = TimeDistribution::LogNormal { mu: 1.0, sigma: 0.5 };
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..10 {
            assert_eq!(dist.sample(&mut a).unwrap(), dist.sample(&mut b).unwrap());
        }
    }
}
