use std::time::Duration;

use gnsswire_frame::FrameConfig;

/// How long a command may wait for its response by default.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(5000);

/// Session driver configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Per-command response deadline, unless overridden per request.
    pub command_timeout: Duration,
    /// Framing limits for the inbound stream.
    pub frame: FrameConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            frame: FrameConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }
}
