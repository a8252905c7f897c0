//! Chat operation options.

use std::time::Duration;

use nextchat_models::ModelCapabilities;
use serde::{Deserialize, Serialize};

use crate::errors::{ChatError, ChatResult};

/// Default per-round timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(150);

/// Default cap on request rounds per chat operation.
pub const DEFAULT_MAX_ROUNDS: u32 = 10;

/// Default animation frame interval.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Options for a chat operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatOptions {
    /// Per-round timeout; also bounds the gap between two stream frames.
    pub request_timeout: Duration,
    /// Multiplier applied to `request_timeout` for image and reasoning models.
    pub slow_request_multiplier: u32,
    /// Maximum request rounds, tool continuations included.
    pub max_rounds: u32,
    /// Interval between two animation frames.
    pub frame_interval: Duration,
    /// Selected plugin ids.
    pub plugins: Vec<String>,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            slow_request_multiplier: 4,
            max_rounds: DEFAULT_MAX_ROUNDS,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            plugins: Vec::new(),
        }
    }
}

impl ChatOptions {
    /// Create default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-round timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the slow-model timeout multiplier.
    #[must_use]
    pub fn with_slow_request_multiplier(mut self, multiplier: u32) -> Self {
        self.slow_request_multiplier = multiplier;
        self
    }

    /// Set the round limit.
    #[must_use]
    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Set the animation frame interval.
    #[must_use]
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Select plugins by id.
    #[must_use]
    pub fn with_plugins<I, S>(mut self, plugins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plugins = plugins.into_iter().map(Into::into).collect();
        self
    }

    /// Timeout for one round against a model with `caps`.
    #[must_use]
    pub fn timeout_for(&self, caps: &ModelCapabilities) -> Duration {
        if caps.is_slow() {
            self.request_timeout
                .saturating_mul(self.slow_request_multiplier.max(1))
        } else {
            self.request_timeout
        }
    }

    /// Check the options.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero timeout, frame interval or
    /// round limit.
    pub fn validate(&self) -> ChatResult<()> {
        if self.request_timeout.is_zero() {
            return Err(ChatError::config("request_timeout must be positive"));
        }
        if self.frame_interval.is_zero() {
            return Err(ChatError::config("frame_interval must be positive"));
        }
        if self.max_rounds == 0 {
            return Err(ChatError::config("max_rounds must be at least 1"));
        }
        Ok(())
    }
}
