//! Sender configuration.

use std::time::Duration;

use gsvc_proto::ProtocolConfig;

use crate::{Result, SenderError};

/// Sender configuration
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// Listen address, `host:port`
    pub bind: String,
    /// Number of sources; ids are `0..source_count`
    pub source_count: u16,
    /// Frame-rate ceiling per connection (0 = unlimited)
    pub max_fps: u32,
    /// Capture rate of each synthetic source
    pub capture_fps: u32,
    /// Log stats every N sent frames (0 disables)
    pub log_every: u64,
    /// Synthetic payload size in bytes
    pub payload_size: usize,
    /// Header settings
    pub protocol: ProtocolConfig,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:9000".to_string(),
            source_count: 1,
            max_fps: 0,
            capture_fps: 30,
            log_every: 120,
            payload_size: 64 * 1024,
            protocol: ProtocolConfig::default(),
        }
    }
}

impl SenderConfig {
    /// Minimum spacing between frames sent to one client, if capped.
    pub fn send_interval(&self) -> Option<Duration> {
        (self.max_fps > 0).then(|| Duration::from_secs(1) / self.max_fps)
    }

    /// Spacing between frames from one synthetic source.
    pub fn capture_interval(&self) -> Duration {
        Duration::from_secs(1) / self.capture_fps.max(1)
    }

    /// Reject settings that cannot work before binding.
    pub fn validate(&self) -> Result<()> {
        if self.bind.is_empty() {
            return Err(SenderError::Config("bind address is empty".to_string()));
        }
        if self.source_count == 0 {
            return Err(SenderError::Config("at least one source is required".to_string()));
        }
        if self.capture_fps == 0 {
            return Err(SenderError::Config("capture rate must be positive".to_string()));
        }
        if self.payload_size > self.protocol.max_payload_size as usize {
            return Err(SenderError::Config(format!(
                "payload size {} exceeds the {} byte limit",
                self.payload_size, self.protocol.max_payload_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SenderConfig::default();
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.source_count, 1);
        assert_eq!(config.max_fps, 0);
        assert_eq!(config.log_every, 120);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unlimited_rate_has_no_interval() {
        assert_eq!(SenderConfig::default().send_interval(), None);

        let capped = SenderConfig { max_fps: 20, ..Default::default() };
        assert_eq!(capped.send_interval(), Some(Duration::from_millis(50)));
    }

    #[test]
    fn zero_sources_is_rejected() {
        let config = SenderConfig { source_count: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(SenderError::Config(_))));
    }

    #[test]
    fn payload_over_protocol_limit_is_rejected() {
        let config = SenderConfig { payload_size: 2 * 1024 * 1024, ..Default::default() };
        assert!(matches!(config.validate(), Err(SenderError::Config(_))));

        let at_limit = SenderConfig { payload_size: 1024 * 1024, ..Default::default() };
        assert!(at_limit.validate().is_ok());

        let lowered = SenderConfig {
            payload_size: 4096,
            protocol: ProtocolConfig::default().with_max_payload_size(1024),
            ..Default::default()
        };
        assert!(matches!(lowered.validate(), Err(SenderError::Config(_))));
    }
}
