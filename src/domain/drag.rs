use crate::domain::board::BoardState;
use crate::domain::status::{ColumnKey, StatusCode};
use crate::domain::ticket::{Ticket, TicketId};
use std::str::FromStr;
use tracing::{debug, warn};

/// Why a finished drag produced no action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoidReason {
    /// Released outside any droppable area
    NoDropTarget,
    /// The dragged ticket is no longer on the board
    SourceNotFound,
    /// The drop target is neither a column nor a ticket on the board
    DestinationNotFound,
    /// The destination column has no status code to sync with
    MissingStatusCode(ColumnKey),
}

/// A ticket changing columns, ready for the reconciler
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMove {
    pub ticket: Ticket,
    pub from: ColumnKey,
    pub to: ColumnKey,
    pub new_status: StatusCode,
}

/// Outcome of interpreting a drop
#[derive(Debug, Clone, PartialEq)]
pub enum DropResolution {
    Void(VoidReason),
    /// Applied locally, nothing to sync
    Reordered {
        column: ColumnKey,
        from_index: usize,
        to_index: usize,
    },
    Move(ResolvedMove),
}

/// Resolves what a drop means without touching the board
pub fn resolve_drop(state: &BoardState, dragged: TicketId, target: Option<&str>) -> DropResolution {
    let Some(target) = target else {
        return DropResolution::Void(VoidReason::NoDropTarget);
    };

    let Some((source, from_index)) = state.position_of(dragged) else {
        return DropResolution::Void(VoidReason::SourceNotFound);
    };
    let source = source.clone();

    let as_column = ColumnKey::from_label(target);
    let target_ticket = TicketId::from_str(target).ok();

    let on_column = state.has_column(&as_column);

    let destination = if on_column {
        as_column
    } else if let Some(key) = target_ticket.and_then(|id| state.column_of(id)) {
        key.clone()
    } else {
        return DropResolution::Void(VoidReason::DestinationNotFound);
    };

    if destination == source {
        let len = state.column(&source).map(<[Ticket]>::len).unwrap_or(0);
        let to_index = target_ticket
            .filter(|_| !on_column)
            .and_then(|id| state.position_of(id))
            .map(|(_, index)| index)
            .unwrap_or(len.saturating_sub(1));

        return DropResolution::Reordered {
            column: source,
            from_index,
            to_index,
        };
    }

    let Some(new_status) = state.status_code(&destination) else {
        return DropResolution::Void(VoidReason::MissingStatusCode(destination));
    };

    match state.find_ticket(dragged) {
        Some(ticket) => DropResolution::Move(ResolvedMove {
            ticket: ticket.clone(),
            from: source,
            to: destination,
            new_status,
        }),
        None => DropResolution::Void(VoidReason::SourceNotFound),
    }
}

/// Turns start/end gesture signals into board actions
///
/// Keeps the ticket picked up at drag start so the UI can render an overlay.
/// Reorders are applied to the board on drag end; column moves are handed
/// back for the reconciler.
#[derive(Debug, Default)]
pub struct DragInterpreter {
    active: Option<Ticket>,
}

impl DragInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_drag_start(&mut self, state: &BoardState, dragged: TicketId) -> Option<&Ticket> {
        self.active = state.find_ticket(dragged).cloned();
        if self.active.is_none() {
            debug!(ticket_id = %dragged, "drag started on a ticket not on the board");
        }
        self.active.as_ref()
    }

    /// Ticket currently being dragged
    pub fn active(&self) -> Option<&Ticket> {
        self.active.as_ref()
    }

    pub fn on_drag_end(
        &mut self,
        state: &mut BoardState,
        dragged: TicketId,
        target: Option<&str>,
    ) -> DropResolution {
        self.active = None;

        let resolution = resolve_drop(state, dragged, target);
        match &resolution {
            DropResolution::Reordered {
                column,
                from_index,
                to_index,
            } => {
                if from_index != to_index {
                    if let Err(e) = state.reorder(column, *from_index, *to_index) {
                        debug!(error = %e, "reorder skipped");
                    }
                }
                debug!(ticket_id = %dragged, column = %column, to_index, "ticket reordered");
            }
            DropResolution::Move(mv) => {
                debug!(
                    ticket_id = %dragged,
                    from = %mv.from,
                    to = %mv.to,
                    status = %mv.new_status,
                    "column move resolved"
                );
            }
            DropResolution::Void(VoidReason::MissingStatusCode(column)) => {
                warn!(
                    ticket_id = %dragged,
                    column = %column,
                    "destination column has no status code, move cannot be synced"
                );
            }
            DropResolution::Void(reason) => {
                debug!(ticket_id = %dragged, ?reason, "drop ignored");
            }
        }
        resolution
    }
}
