//! Model configuration.
//!
//! Defaults can be overridden through environment variables, which are
//! read by [`ModelConfig::from_env`].

use std::num::ParseFloatError;

/// Environment variable overriding [`ModelConfig::gamma`].
pub const RL_MODEL_GAMMA: &str = "RL_MODEL_GAMMA";

/// Environment variable overriding [`ModelConfig::default_value`].
pub const RL_MODEL_DEFAULT_VALUE: &str = "RL_MODEL_DEFAULT_VALUE";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}: {source}")]
    Parse {
        key: &'static str,
        value: String,
        source: ParseFloatError,
    },

    #[error("discount factor {gamma} is outside [0, 1]")]
    InvalidGamma { gamma: f64 },
}

/// Parameters shared by the tables of one model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Discount factor applied to future rewards.
    pub gamma: f64,
    /// Initial value of every leaf in freshly made tables.
    pub default_value: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            default_value: 0.0,
        }
    }
}

impl ModelConfig {
    /// The default configuration, with overrides from the process
    /// environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// The default configuration, with overrides from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(gamma) = parse(&lookup, RL_MODEL_GAMMA)? {
            config.gamma = gamma;
        }
        if let Some(value) = parse(&lookup, RL_MODEL_DEFAULT_VALUE)? {
            config.default_value = value;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_gamma(self.gamma)
    }
}

/// Checks that `gamma` is a usable discount factor.
pub fn validate_gamma(gamma: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&gamma) {
        Ok(())
    } else {
        Err(ConfigError::InvalidGamma { gamma })
    }
}

fn parse<F>(lookup: &F, key: &'static str) -> Result<Option<f64>, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|source| ConfigError::Parse { key, value, source })
        })
        .transpose()
}
