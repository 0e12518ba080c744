use std::fmt;

/// Why a connection ended.
///
/// Travels as a small integer in the `data` field of the transport's
/// disconnect event. The numbering is part of the wire protocol (see
/// [`PROTOCOL_VERSION`](crate::PROTOCOL_VERSION)) and must never be reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DisconnectReason {
    /// No reason was given, the transport timed out, or the peer broke protocol
    Unknown = 0,
    /// The remote side chose to leave
    Manual = 1,
    /// The server rejected the client's credentials
    AuthFailure = 2,
    /// The server is shutting down
    ServerShutdown = 3,
    /// Every client slot on the server is taken
    ServerFull = 4,
    /// The client did not complete the handshake in time
    ReplyTimeout = 5,
}

const UNKNOWN_TEXT: &str = "unknown";

impl DisconnectReason {
    pub const ALL: [DisconnectReason; 6] = [
        DisconnectReason::Unknown,
        DisconnectReason::Manual,
        DisconnectReason::AuthFailure,
        DisconnectReason::ServerShutdown,
        DisconnectReason::ServerFull,
        DisconnectReason::ReplyTimeout,
    ];

    pub fn to_code(self) -> u32 {
        self as u32
    }

    /// Returns `None` for codes outside the enumeration
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(DisconnectReason::Unknown),
            1 => Some(DisconnectReason::Manual),
            2 => Some(DisconnectReason::AuthFailure),
            3 => Some(DisconnectReason::ServerShutdown),
            4 => Some(DisconnectReason::ServerFull),
            5 => Some(DisconnectReason::ReplyTimeout),
            _ => None,
        }
    }

    /// Like [`from_code`](Self::from_code), but folds unrecognized codes into `Unknown`
    pub fn from_code_lossy(code: u32) -> Self {
        Self::from_code(code).unwrap_or(DisconnectReason::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DisconnectReason::Unknown => UNKNOWN_TEXT,
            DisconnectReason::Manual => "manual",
            DisconnectReason::AuthFailure => "authentication failure",
            DisconnectReason::ServerShutdown => "server shutdown",
            DisconnectReason::ServerFull => "server is full",
            DisconnectReason::ReplyTimeout => "reply timeout",
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable text for a raw disconnect code. Never panics: codes outside
/// the enumeration read as `"unknown"`.
pub fn disconnect_reason_as_text(code: u32) -> &'static str {
    match DisconnectReason::from_code(code) {
        Some(reason) => reason.as_str(),
        None => UNKNOWN_TEXT,
    }
}
