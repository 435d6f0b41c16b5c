//! # Ticketboard Core
//!
//! Column state reconciliation engine for drag-and-drop support ticket boards.
//!
//! This crate normalizes the status labels a ticket service hands out into
//! stable board columns, keeps track of which ticket sits in which column,
//! turns drag gestures into reorders or column moves, and syncs column moves
//! back to the service with optimistic updates and rollback. It knows nothing
//! about rendering or the HTTP transport; the service is reached through the
//! [`Backend`] trait.

pub mod backend;
pub mod config;
pub mod domain;
pub mod error;
pub mod session;
pub mod sync;

// Re-export commonly used types
pub use backend::{Backend, StatusUpdate, TicketGroups};
pub use config::BoardConfig;
pub use domain::{
    board::BoardState,
    drag::{DragInterpreter, DropResolution, ResolvedMove, VoidReason},
    status::{normalize, ColumnKey, StatusCode, StatusDefinition},
    ticket::{Ticket, TicketId, UserId},
};
pub use error::{BoardError, Result};
pub use session::{BoardSession, DropOutcome};
pub use sync::{load_board, MoveReconciler, MoveReport, PendingMove};
