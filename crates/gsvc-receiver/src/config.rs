//! Receiver configuration.

use std::time::Duration;

use gsvc_core::{ProtocolConfig, ResyncPolicy};

use crate::ReceiverError;

/// Receiver configuration
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    /// Sender address, `host:port`
    pub addr: String,
    /// Limit on connection establishment only; steady-state reads never time out
    pub connect_timeout: Duration,
    /// Log stats every N frames (0 disables)
    pub log_every: u64,
    /// Header validation settings
    pub protocol: ProtocolConfig,
    /// Behaviour after a protocol error
    pub resync: ResyncPolicy,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9000".to_string(),
            connect_timeout: Duration::from_secs(5),
            log_every: 120,
            protocol: ProtocolConfig::default(),
            resync: ResyncPolicy::Disabled,
        }
    }
}

impl ReceiverConfig {
    /// Reject settings that cannot work before any connection is made.
    pub fn validate(&self) -> Result<(), ReceiverError> {
        if self.addr.is_empty() {
            return Err(ReceiverError::Config("address is empty".to_string()));
        }
        if self.connect_timeout.is_zero() {
            return Err(ReceiverError::Config("connect timeout must be positive".to_string()));
        }
        if let ResyncPolicy::ScanForMagic { max_skip: 0 } = self.resync {
            return Err(ReceiverError::Config("resync max skip must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ReceiverConfig::default();
        assert_eq!(config.addr, "127.0.0.1:9000");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.log_every, 120);
        assert_eq!(config.protocol.max_payload_size, 1_048_576);
        assert_eq!(config.resync, ResyncPolicy::Disabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unusable_settings() {
        let zero_timeout = ReceiverConfig { connect_timeout: Duration::ZERO, ..Default::default() };
        assert!(matches!(zero_timeout.validate(), Err(ReceiverError::Config(_))));

        let zero_skip = ReceiverConfig {
            resync: ResyncPolicy::ScanForMagic { max_skip: 0 },
            ..Default::default()
        };
        assert!(matches!(zero_skip.validate(), Err(ReceiverError::Config(_))));
    }
}
