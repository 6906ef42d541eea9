//! Configuration type definitions

use quickpeek_protocol::MAX_BUFFER_ID;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum serialized config size (binary)
pub const MAX_CONFIG_SIZE: usize = 16;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A value is outside its allowed range
    Invalid,
    /// Deserialization failed
    Deserialize,
    /// Serialization failed
    Serialize,
}

/// Coordinator tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoordinatorConfig {
    /// Largest buffer id accepted by a Draw request
    pub max_buffer_id: u8,
    /// Busy-status polls before a takeback is abandoned
    pub takeback_max_polls: u16,
    /// Delay between busy-status polls (ms)
    pub takeback_poll_interval_ms: u32,
    /// Wake lock hold time after a discarded event (ms)
    pub wakelock_grace_ms: u32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_buffer_id: MAX_BUFFER_ID,
            takeback_max_polls: 50,
            takeback_poll_interval_ms: 10,
            wakelock_grace_ms: 1000,
        }
    }
}

impl CoordinatorConfig {
    /// Check value ranges
    ///
    /// The companion cannot address buffer ids above [`MAX_BUFFER_ID`] and
    /// the takeback handshake needs at least one poll.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_buffer_id > MAX_BUFFER_ID || self.takeback_max_polls == 0 {
            return Err(ConfigError::Invalid);
        }
        Ok(())
    }

    /// Worst-case takeback wait in milliseconds
    pub fn takeback_budget_ms(&self) -> u32 {
        (self.takeback_max_polls as u32).saturating_mul(self.takeback_poll_interval_ms)
    }

    /// Decode a validated config from postcard bytes
    #[cfg(feature = "serde")]
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        config.validate()?;
        Ok(config)
    }

    /// Encode into `buf`, returning the used prefix
    #[cfg(feature = "serde")]
    pub fn to_postcard<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Serialize)
    }
}
