use std::fmt;

// Broker error taxonomy. Every failure is terminal for the request; nothing
// here is retried. Variants carrying a String keep the upstream detail for
// server-side logging only.
#[derive(Debug)]
pub enum BrokerError {
    MissingCredential,
    InvalidCredential(String),
    UnknownProvider(String),
    MissingRoomId,
    RoomNotFound,
    GuestMismatch,
    NoExpiry,
    Expired,
    MintingFailure(String),
    StorageFailure(String),
}

impl fmt::Display for BrokerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokerError::MissingCredential => write!(f, "missing credential"),
            BrokerError::InvalidCredential(detail) => {
                write!(f, "invalid credential: {detail}")
            }
            BrokerError::UnknownProvider(tag) => write!(f, "unknown provider: {tag}"),
            BrokerError::MissingRoomId => write!(f, "room id is missing"),
            BrokerError::RoomNotFound => write!(f, "room not found"),
            BrokerError::GuestMismatch => write!(f, "caller is not the guest in this room"),
            BrokerError::NoExpiry => write!(f, "room has no expiry date"),
            BrokerError::Expired => write!(f, "room has expired"),
            BrokerError::MintingFailure(detail) => write!(f, "minting failure: {detail}"),
            BrokerError::StorageFailure(detail) => write!(f, "storage failure: {detail}"),
        }
    }
}

impl std::error::Error for BrokerError {}
