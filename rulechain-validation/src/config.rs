// Engine configuration

/// Rule set configuration
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Log rule set results at `debug`
    pub enable_logging: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enable_logging: true,
        }
    }
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable/disable logging
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }
}
