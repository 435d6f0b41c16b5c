use crate::{
    backend::{Backend, StatusUpdate},
    domain::{BoardState, ColumnKey, ResolvedMove, StatusCode, TicketId, UserId},
    error::{BoardError, Result},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, sync::Arc};
use tracing::{debug, warn};
use uuid::Uuid;

/// Correlation id of one column move, carried through its log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveId(Uuid);

impl MoveId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MoveId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A column move applied to the board but not yet confirmed by the backend
///
/// The ticket stays locked against further moves until the pending move is
/// passed to [`MoveReconciler::finish`].
#[derive(Debug)]
#[must_use = "the ticket stays in flight until the move is finished"]
pub struct PendingMove {
    id: MoveId,
    ticket_id: TicketId,
    from: ColumnKey,
    to: ColumnKey,
    original_index: usize,
    original_status: StatusCode,
    new_status: StatusCode,
    acting_user: UserId,
    generation: u64,
    started_at: DateTime<Utc>,
}

impl PendingMove {
    pub fn id(&self) -> MoveId {
        self.id
    }

    pub fn ticket_id(&self) -> TicketId {
        self.ticket_id
    }

    pub fn from(&self) -> &ColumnKey {
        &self.from
    }

    pub fn to(&self) -> &ColumnKey {
        &self.to
    }

    pub fn new_status(&self) -> StatusCode {
        self.new_status
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The status update to send for this move
    pub fn request(&self) -> StatusUpdate {
        StatusUpdate {
            ticket_id: self.ticket_id,
            new_status: self.new_status,
            acting_user: self.acting_user,
        }
    }
}

/// A column move the backend accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub move_id: MoveId,
    pub ticket_id: TicketId,
    pub from: ColumnKey,
    pub to: ColumnKey,
    pub status: StatusCode,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Applies column moves optimistically and reconciles them with the backend
///
/// A move goes through [`begin`](Self::begin), which patches the board right
/// away, and [`finish`](Self::finish), which keeps the patch if the backend
/// accepted the update or reverts it otherwise. Between the two the board is
/// free for other gestures. A ticket can have one unresolved move at a time.
pub struct MoveReconciler {
    backend: Arc<dyn Backend>,
    acting_user: UserId,
    in_flight: HashSet<TicketId>,
}

impl MoveReconciler {
    pub fn new(backend: Arc<dyn Backend>, acting_user: UserId) -> Self {
        Self {
            backend,
            acting_user,
            in_flight: HashSet::new(),
        }
    }

    pub fn acting_user(&self) -> UserId {
        self.acting_user
    }

    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    pub fn is_in_flight(&self, id: TicketId) -> bool {
        self.in_flight.contains(&id)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Moves the ticket to the end of its destination column with the new
    /// status code, before the backend has answered
    pub fn begin(&mut self, state: &mut BoardState, mv: ResolvedMove) -> Result<PendingMove> {
        let ticket_id = mv.ticket.id;

        if self.in_flight.contains(&ticket_id) {
            return Err(BoardError::MoveInFlight(ticket_id));
        }
        if state.column_of(ticket_id) != Some(&mv.from) {
            return Err(BoardError::TicketNotFound(ticket_id));
        }
        if !state.has_column(&mv.to) {
            return Err(BoardError::ColumnNotFound(mv.to.to_string()));
        }

        let (_, original_index, current) = state
            .remove_ticket(ticket_id)
            .ok_or(BoardError::TicketNotFound(ticket_id))?;
        let original_status = current.status;
        state.insert_ticket(&mv.to, None, current.with_status(mv.new_status))?;

        self.in_flight.insert(ticket_id);

        let pending = PendingMove {
            id: MoveId::new(),
            ticket_id,
            from: mv.from,
            to: mv.to,
            original_index,
            original_status,
            new_status: mv.new_status,
            acting_user: self.acting_user,
            generation: state.generation(),
            started_at: Utc::now(),
        };

        debug!(
            move_id = %pending.id,
            ticket_id = %ticket_id,
            from = %pending.from,
            to = %pending.to,
            status = %pending.new_status,
            "optimistic move applied"
        );
        Ok(pending)
    }

    /// Settles a pending move with the backend's answer
    ///
    /// On failure the ticket goes back to its original column, position and
    /// status code, and the error is returned for the UI to show.
    pub fn finish(
        &mut self,
        state: &mut BoardState,
        pending: PendingMove,
        outcome: Result<()>,
    ) -> Result<MoveReport> {
        self.in_flight.remove(&pending.ticket_id);

        match outcome {
            Ok(()) => {
                debug!(move_id = %pending.id, ticket_id = %pending.ticket_id, "move confirmed");
                Ok(MoveReport {
                    move_id: pending.id,
                    ticket_id: pending.ticket_id,
                    from: pending.from,
                    to: pending.to,
                    status: pending.new_status,
                    started_at: pending.started_at,
                    finished_at: Utc::now(),
                })
            }
            Err(e) => {
                warn!(
                    move_id = %pending.id,
                    ticket_id = %pending.ticket_id,
                    error = %e,
                    "status update failed, rolling back"
                );
                Self::rollback(state, &pending);
                Err(BoardError::SyncFailed {
                    ticket_id: pending.ticket_id,
                    status: pending.new_status,
                    reason: e.to_string(),
                })
            }
        }
    }

    fn rollback(state: &mut BoardState, pending: &PendingMove) {
        if state.generation() != pending.generation {
            warn!(
                move_id = %pending.id,
                ticket_id = %pending.ticket_id,
                "board reloaded while the move was in flight, keeping the reloaded state"
            );
            return;
        }
        if !state.has_column(&pending.from) {
            warn!(move_id = %pending.id, column = %pending.from, "source column gone, cannot roll back");
            return;
        }

        let Some((_, _, ticket)) = state.remove_ticket(pending.ticket_id) else {
            warn!(move_id = %pending.id, ticket_id = %pending.ticket_id, "ticket left the board, nothing to roll back");
            return;
        };

        let restored = ticket.with_status(pending.original_status);
        if let Err(e) = state.insert_ticket(&pending.from, Some(pending.original_index), restored) {
            warn!(move_id = %pending.id, error = %e, "rollback failed");
        }
    }

    /// Runs a column move end to end: optimistic patch, status update, and
    /// rollback if the update fails
    pub async fn apply_move(
        &mut self,
        state: &mut BoardState,
        mv: ResolvedMove,
    ) -> Result<MoveReport> {
        let pending = self.begin(state, mv)?;
        let outcome = self.backend.update_ticket_status(&pending.request()).await;
        self.finish(state, pending, outcome)
    }
}
