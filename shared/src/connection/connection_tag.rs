use std::fmt;

use crate::{connection::error::ProtocolViolation, constants::PROTOCOL_VERSION};

/// Purpose of an incoming connection, announced in the transport's connect data
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ConnectionKind {
    /// A one-shot status probe. Never occupies a slot.
    Query = 0,
    /// A client that wants a slot
    Client = 1,
}

impl ConnectionKind {
    pub fn to_code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Result<Self, ProtocolViolation> {
        match code {
            0 => Ok(ConnectionKind::Query),
            1 => Ok(ConnectionKind::Client),
            kind => Err(ProtocolViolation::UnknownConnectionKind { kind }),
        }
    }
}

/// The 32-bit value passed as connect data: the connection kind in the low
/// half and the protocol version in the high half.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionTag(u32);

impl ConnectionTag {
    pub fn new(kind: ConnectionKind) -> Self {
        Self(u32::from(kind.to_code()) | u32::from(PROTOCOL_VERSION) << 16)
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn version(self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// Decodes the connection kind, rejecting tags from other protocol versions
    pub fn kind(self) -> Result<ConnectionKind, ProtocolViolation> {
        let version = self.version();
        if version != PROTOCOL_VERSION {
            return Err(ProtocolViolation::UnsupportedProtocolVersion {
                version,
                expected: PROTOCOL_VERSION,
            });
        }
        ConnectionKind::from_code((self.0 & 0xFFFF) as u16)
    }
}

impl From<ConnectionKind> for ConnectionTag {
    fn from(kind: ConnectionKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for ConnectionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}
