use ulid::Ulid;

#[derive(Debug)]
pub enum EngineError {
    /// Request rejected before any scan (non-positive duration, bad category).
    InvalidRequest(&'static str),
    /// Settings document fails validation.
    InvalidSettings(&'static str),
    LimitExceeded(&'static str),
    UnknownShop(String),
    NotFound(Ulid),
    /// Write-time: candidate overlaps an existing same-category booking.
    Conflict(Ulid),
    /// Write-time: all parallel bays for the category are taken.
    CapacityExceeded(u32),
    /// Settings or bookings unreadable — availability is unknown, which is
    /// not the same thing as fully booked.
    Store(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            EngineError::InvalidSettings(msg) => write!(f, "invalid settings: {msg}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::UnknownShop(id) => write!(f, "unknown shop: {id}"),
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::Conflict(id) => write!(f, "conflict with booking: {id}"),
            EngineError::CapacityExceeded(cap) => {
                write!(f, "capacity {cap} exceeded: all bays occupied")
            }
            EngineError::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}
