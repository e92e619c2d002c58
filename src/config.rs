use std::env;

use crate::{Error, Result};

#[derive(Clone, Debug)]
pub struct DbConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl DbConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            url: required("DB_URL")?,
            namespace: required("DB_NS")?,
            database: required("DB_NAME")?,
            username: required("DB_USER")?,
            password: required("DB_PASSWORD")?,
        })
    }
}

/// Thresholds driving the rating prompt and playback counting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatsConfig {
    /// Plays before the first prompt; a second prompt fires at twice this.
    pub min_rating_prompt_threshold: u64,
    /// Interval between prompts once past the second one.
    pub max_rating_prompt_threshold: u64,
    /// Shorter plays are not counted towards the prompt.
    pub playback_min_duration_secs: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            min_rating_prompt_threshold: 5,
            max_rating_prompt_threshold: 10,
            playback_min_duration_secs: 30.0,
        }
    }
}

impl StatsConfig {
    pub fn new(min: u64, max: u64, playback_min_duration_secs: f64) -> Result<Self> {
        if min == 0 {
            return Err(Error::ConfigInvalid {
                name: "MIN_RATING_PROMPT_THRESHOLD".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if max == 0 {
            return Err(Error::ConfigInvalid {
                name: "MAX_RATING_PROMPT_THRESHOLD".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !playback_min_duration_secs.is_finite() || playback_min_duration_secs < 0.0 {
            return Err(Error::ConfigInvalid {
                name: "PLAYBACK_MIN_DURATION_SECONDS".to_string(),
                reason: "must be a non-negative number".to_string(),
            });
        }

        Ok(Self {
            min_rating_prompt_threshold: min,
            max_rating_prompt_threshold: max,
            playback_min_duration_secs,
        })
    }

    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Self::new(
            optional("MIN_RATING_PROMPT_THRESHOLD", defaults.min_rating_prompt_threshold)?,
            optional("MAX_RATING_PROMPT_THRESHOLD", defaults.max_rating_prompt_threshold)?,
            optional(
                "PLAYBACK_MIN_DURATION_SECONDS",
                defaults.playback_min_duration_secs,
            )?,
        )
    }

    /// Whether a user with `count` qualifying plays should be asked for a rating.
    pub fn should_prompt_at(&self, count: u64) -> bool {
        let min = self.min_rating_prompt_threshold;
        let second = min.saturating_mul(2);

        if count == min || count == second {
            return true;
        }

        count > second && (count - second) % self.max_rating_prompt_threshold == 0
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::ConfigMissing {
        name: name.to_string(),
    })
}

fn optional<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| Error::ConfigInvalid {
            name: name.to_string(),
            reason: format!("cannot parse '{raw}'"),
        }),
        Err(_) => Ok(default),
    }
}
