use std::str::FromStr;

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, info, warn};

use crate::draws::BitEncoding;
use crate::error::{AnalysisError, Result};
use crate::{DEFAULT_BLOCK_SIZE, DEFAULT_MAX_LAG, DEFAULT_SAMPLE_SIZE, DEFAULT_SERIAL_BLOCK};

/// Upper bound on the Monte Carlo reference size.
pub const MAX_SAMPLE_SIZE: usize = 1_000_000;
pub const MIN_BLOCK_SIZE: usize = 8;

/// Scalar parameters shared by the analyses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub max_lag: usize,
    pub block_size: usize,
    pub serial_block: usize,
    pub encoding: BitEncoding,
    pub sample_size: usize,
    /// Seed for the Monte Carlo reference; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            max_lag: DEFAULT_MAX_LAG,
            block_size: DEFAULT_BLOCK_SIZE,
            serial_block: DEFAULT_SERIAL_BLOCK,
            encoding: BitEncoding::default(),
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: None,
        }
    }
}

fn env_value<T: FromStr>(key: &'static str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| AnalysisError::InvalidParameter {
                name: key,
                reason: format!("{:?}: {}", raw, e),
            }),
        Err(_) => Ok(None),
    }
}

impl AnalysisConfig {
    /// Build a configuration from `LOTTO_*` environment variables.
    ///
    /// Unset variables keep their defaults; set but unparsable ones are an
    /// error. The result is validated before it is returned.
    pub fn from_env() -> Result<Self> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            max_lag: env_value("LOTTO_MAX_LAG")?.unwrap_or(defaults.max_lag),
            block_size: env_value("LOTTO_BLOCK_SIZE")?.unwrap_or(defaults.block_size),
            serial_block: env_value("LOTTO_SERIAL_BLOCK")?.unwrap_or(defaults.serial_block),
            encoding: env_value("LOTTO_ENCODING")?.unwrap_or(defaults.encoding),
            sample_size: env_value("LOTTO_SAMPLE_SIZE")?.unwrap_or(defaults.sample_size),
            seed: env_value("LOTTO_SEED")?.or(defaults.seed),
        };
        config.validate()?;
        debug!("Analysis configuration: {:?}", config);
        Ok(config)
    }

    /// Check every parameter against the range the analyses accept.
    pub fn validate(&self) -> Result<()> {
        let invalid = |name: &'static str, reason: String| {
            warn!("Rejected configuration {}: {}", name, reason);
            Err(AnalysisError::InvalidParameter { name, reason })
        };

        if self.max_lag == 0 {
            return invalid("max_lag", "must be at least 1".to_string());
        }
        if self.block_size < MIN_BLOCK_SIZE {
            return invalid(
                "block_size",
                format!("must be at least {}, got {}", MIN_BLOCK_SIZE, self.block_size),
            );
        }
        if !(2..=4).contains(&self.serial_block) {
            return invalid(
                "serial_block",
                format!("must be between 2 and 4, got {}", self.serial_block),
            );
        }
        if self.sample_size == 0 || self.sample_size > MAX_SAMPLE_SIZE {
            return invalid(
                "sample_size",
                format!("must be within 1..={}, got {}", MAX_SAMPLE_SIZE, self.sample_size),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range() {
        let small_block = AnalysisConfig {
            block_size: 4,
            ..AnalysisConfig::default()
        };
        assert!(small_block.validate().is_err());

        let serial = AnalysisConfig {
            serial_block: 5,
            ..AnalysisConfig::default()
        };
        assert!(serial.validate().is_err());

        let no_samples = AnalysisConfig {
            sample_size: 0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            no_samples.validate(),
            Err(AnalysisError::InvalidParameter { name: "sample_size", .. })
        ));
    }
}
