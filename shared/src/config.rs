use thiserror::Error;

use crate::constants::{INTERNAL_CHANNEL_COUNT, MAX_CHANNEL_COUNT, MAX_CLIENTS};

/// Errors raised while validating a server or client configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A display name does not fit in its fixed capacity
    #[error("Name of {length} bytes exceeds the maximum of {max} bytes. Names are never truncated silently")]
    NameTooLong { length: usize, max: usize },

    /// User channels plus the internal channels exceed what the transport allows
    #[error("{requested} user channels requested, but at most {max} fit alongside the internal protocol channels")]
    TooManyChannels { requested: usize, max: usize },

    /// More client slots than the protocol can address
    #[error("{requested} client slots requested, but at most {max} are supported")]
    TooManyClients { requested: usize, max: usize },
}

/// Largest user channel count that still leaves room for the internal channels
pub const fn max_user_channels() -> usize {
    MAX_CHANNEL_COUNT - INTERNAL_CHANNEL_COUNT
}

pub fn validate_channel_count(channel_count: usize) -> Result<(), ConfigError> {
    if channel_count > max_user_channels() {
        return Err(ConfigError::TooManyChannels {
            requested: channel_count,
            max: max_user_channels(),
        });
    }
    Ok(())
}

pub fn validate_max_clients(max_clients: usize) -> Result<(), ConfigError> {
    if max_clients > MAX_CLIENTS {
        return Err(ConfigError::TooManyClients {
            requested: max_clients,
            max: MAX_CLIENTS,
        });
    }
    Ok(())
}

/// Total transport channels a host needs for `user_channel_count` user channels
pub fn total_channel_count(user_channel_count: usize) -> usize {
    user_channel_count + INTERNAL_CHANNEL_COUNT
}
