//! Session configuration

use std::time::Duration;

/// Settings fixed when a session is created
///
/// # Examples
///
/// ```rust
/// use jrmt_client::SessionConfig;
/// use std::time::Duration;
///
/// let config = SessionConfig::default()
///     .with_timeout(Duration::from_secs(5))
///     .with_version_tagging(false);
/// assert_eq!(config.timeout, Some(Duration::from_secs(5)));
/// assert!(config.describe_on_connect);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Bound on the wait for each reply; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Run the `system.describe` handshake when connecting
    pub describe_on_connect: bool,
    /// Emit the `jsonrpc: "1.1"` member on requests
    pub version_tagging: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            describe_on_connect: true,
            version_tagging: true,
        }
    }
}

impl SessionConfig {
    /// Same as [`SessionConfig::default`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every reply wait by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Wait for replies indefinitely
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Enable or skip the handshake on connect
    pub fn with_describe_on_connect(mut self, enable: bool) -> Self {
        self.describe_on_connect = enable;
        self
    }

    /// Enable or disable the `jsonrpc` version member
    pub fn with_version_tagging(mut self, enable: bool) -> Self {
        self.version_tagging = enable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.timeout, None);
        assert!(config.describe_on_connect);
        assert!(config.version_tagging);
        assert_eq!(config, SessionConfig::new());
    }

    #[test]
    fn test_setters_chain() {
        let config = SessionConfig::new()
            .with_timeout(Duration::from_millis(250))
            .with_describe_on_connect(false)
            .with_version_tagging(false);
        assert_eq!(config.timeout, Some(Duration::from_millis(250)));
        assert!(!config.describe_on_connect);
        assert!(!config.version_tagging);

        assert_eq!(config.without_timeout().timeout, None);
    }
}
