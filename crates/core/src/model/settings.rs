use std::time::Duration;

use thiserror::Error;

use crate::model::config::SessionConfig;

/// Shortest tick the elapsed-time display may use.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizSettings {
    tick_interval: Duration,
    default_config: SessionConfig,
}

#[derive(Clone, Debug, Default)]
pub struct QuizSettingsDraft {
    pub tick_interval: Option<Duration>,
    pub default_config: Option<SessionConfig>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("tick interval must be at least 100ms")]
    TickTooShort,

    #[error("default question count must be > 0")]
    InvalidQuestionCount,

    #[error("default start position must be >= 1")]
    InvalidStartFrom,
}

impl QuizSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft, filling unset fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the tick is too short or the default config is degenerate.
    pub fn validate(self) -> Result<QuizSettings, SettingsError> {
        let tick_interval = self.tick_interval.unwrap_or(Duration::from_secs(1));
        if tick_interval < MIN_TICK_INTERVAL {
            return Err(SettingsError::TickTooShort);
        }

        let default_config = self.default_config.unwrap_or_default();
        if default_config.number_of_questions == 0 {
            return Err(SettingsError::InvalidQuestionCount);
        }
        if default_config.start_from == 0 {
            return Err(SettingsError::InvalidStartFrom);
        }

        Ok(QuizSettings {
            tick_interval,
            default_config,
        })
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            default_config: SessionConfig::default(),
        }
    }
}

impl QuizSettings {
    /// How often the elapsed-time display is refreshed during a test.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Config a fresh setup screen starts with.
    #[must_use]
    pub fn default_config(&self) -> SessionConfig {
        self.default_config
    }
}
