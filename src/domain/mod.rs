pub mod board;
pub mod drag;
pub mod status;
pub mod ticket;

pub use board::BoardState;
pub use drag::{resolve_drop, DragInterpreter, DropResolution, ResolvedMove, VoidReason};
pub use status::{normalize, ColumnKey, LabelMap, StatusCode, StatusDefinition, StatusMap};
pub use ticket::{Ticket, TicketId, UserId};
