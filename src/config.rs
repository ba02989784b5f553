//! Engine configuration
//!
//! Every field has a default, so a config file only needs the keys it
//! overrides:
//!
//! ```yaml
//! relaxation:
//!   max_rounds: 2
//! narration_timeout_ms: 2000
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// How empty threshold queries are loosened
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaxationPolicy {
    /// Relaxations allowed per query, across all predicates; at most three
    pub max_rounds: usize,
    /// Fraction of the current literal moved per relaxation
    pub step_fraction: f64,
}

/// Upper bound on `RelaxationPolicy::max_rounds`
pub const MAX_RELAXATION_ROUNDS: usize = 3;

impl Default for RelaxationPolicy {
    fn default() -> Self {
        Self {
            max_rounds: MAX_RELAXATION_ROUNDS,
            step_fraction: 0.10,
        }
    }
}

/// Which text literals widen to numbers on numeric columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiteralPolicy {
    /// `k` and `m` suffixes (`"80k"` is 80000)
    pub magnitude_suffixes: bool,
    /// trailing `%` (`"40%"` is 0.4)
    pub percent_suffix: bool,
}

impl Default for LiteralPolicy {
    fn default() -> Self {
        Self {
            magnitude_suffixes: true,
            percent_suffix: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub relaxation: RelaxationPolicy,
    pub literals: LiteralPolicy,
    pub narration_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            relaxation: RelaxationPolicy::default(),
            literals: LiteralPolicy::default(),
            narration_timeout_ms: 10_000,
        }
    }
}

impl EngineConfig {
    pub fn narration_timeout(&self) -> Duration {
        Duration::from_millis(self.narration_timeout_ms)
    }

    pub fn with_relaxation(mut self, relaxation: RelaxationPolicy) -> Self {
        self.relaxation = relaxation;
        self
    }

    pub fn with_narration_timeout(mut self, timeout: Duration) -> Self {
        self.narration_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.relaxation.max_rounds > MAX_RELAXATION_ROUNDS {
            return Err(ParseError::Invalid(format!(
                "relaxation.max_rounds must be at most {}, got {}",
                MAX_RELAXATION_ROUNDS, self.relaxation.max_rounds
            )));
        }
        let fraction = self.relaxation.step_fraction;
        if !fraction.is_finite() || fraction <= 0.0 {
            return Err(ParseError::Invalid(format!(
                "relaxation.step_fraction must be a positive number, got {}",
                fraction
            )));
        }
        if self.narration_timeout_ms == 0 {
            return Err(ParseError::Invalid(
                "narration_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.relaxation.max_rounds, 3);
        assert_eq!(config.relaxation.step_fraction, 0.10);
        assert!(config.literals.magnitude_suffixes);
        assert_eq!(config.narration_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_yaml() {
        let config: EngineConfig = serde_yaml::from_str("relaxation:\n  max_rounds: 2\n").unwrap();
        assert_eq!(config.relaxation.max_rounds, 2);
        assert_eq!(config.relaxation.step_fraction, 0.10);
        assert_eq!(config.narration_timeout_ms, 10_000);
    }

    #[test]
    fn test_validate_rejects_zero_fraction() {
        let config = EngineConfig::default().with_relaxation(RelaxationPolicy {
            max_rounds: 3,
            step_fraction: 0.0,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_caps_rounds() {
        let config = EngineConfig::default().with_relaxation(RelaxationPolicy {
            max_rounds: 5,
            step_fraction: 0.10,
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_rounds"));

        let config = EngineConfig::default().with_relaxation(RelaxationPolicy {
            max_rounds: MAX_RELAXATION_ROUNDS,
            step_fraction: 0.10,
        });
        assert!(config.validate().is_ok());
    }
}
