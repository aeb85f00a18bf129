//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::{Address, Result, RoscaError, constants};

/// Configuration for a single engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The only identity allowed to change the token allow-list.
    pub administrator: Address,
    /// The address that holds deposited funds between rounds.
    pub pool: Address,
    /// Initial capacity reserved for the notification log.
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,
}

fn default_notification_capacity() -> usize {
    constants::DEFAULT_NOTIFICATION_CAPACITY
}

impl EngineConfig {
    #[must_use]
    pub fn new(administrator: Address, pool: Address) -> Self {
        Self {
            administrator,
            pool,
            notification_capacity: constants::DEFAULT_NOTIFICATION_CAPACITY,
        }
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| RoscaError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject zero identities.
    pub fn validate(&self) -> Result<()> {
        if self.administrator.is_zero() {
            return Err(RoscaError::Configuration(
                "administrator must not be the zero address".into(),
            ));
        }
        if self.pool.is_zero() {
            return Err(RoscaError::Configuration(
                "pool must not be the zero address".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_json_applies_defaults() {
        let json = r#"{
            "administrator": "0x00000000000000000000000000000000000000aa",
            "pool": "0x00000000000000000000000000000000000000bb"
        }"#;
        let cfg = EngineConfig::from_json(json).unwrap();
        assert_eq!(cfg.administrator, Address::from_low_u64(0xaa));
        assert_eq!(cfg.pool, Address::from_low_u64(0xbb));
        assert_eq!(cfg.notification_capacity, 1024);
    }

    #[test]
    fn zero_administrator_rejected() {
        let cfg = EngineConfig::new(Address::ZERO, Address::from_low_u64(1));
        assert!(matches!(cfg.validate(), Err(RoscaError::Configuration(_))));
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        let err = EngineConfig::from_json("{\"pool\": 1}").unwrap_err();
        assert!(matches!(err, RoscaError::Configuration(_)));
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = EngineConfig::new(Address::from_low_u64(1), Address::from_low_u64(2));
        let json = serde_json::to_string(&cfg).unwrap();
        let back = EngineConfig::from_json(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
