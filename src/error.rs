use crate::domain::{StatusCode, TicketId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Failed to load board: {0}")]
    LoadFailed(String),

    #[error("Failed to move ticket {ticket_id} to status {status}: {reason}")]
    SyncFailed {
        ticket_id: TicketId,
        status: StatusCode,
        reason: String,
    },

    #[error("Ticket {0} already has a move in flight")]
    MoveInFlight(TicketId),

    #[error("Ticket not found: {0}")]
    TicketNotFound(TicketId),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    Other(String),
}
