use crate::{
    backend::{Backend, TicketGroups},
    domain::{BoardState, ColumnKey, StatusDefinition},
    error::{BoardError, Result},
};
use chrono::Utc;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Fetches the status catalogue and the grouped tickets concurrently and
/// merges them into a fresh board
///
/// Both reads must succeed; nothing is produced from a partial response.
pub async fn load_board(backend: &dyn Backend) -> Result<BoardState> {
    let (statuses, groups) =
        tokio::try_join!(backend.fetch_statuses(), backend.fetch_tickets_grouped())
            .map_err(|e| BoardError::LoadFailed(e.to_string()))?;

    let mut state = merge(statuses, groups);
    state.mark_loaded(Utc::now());

    debug!(
        columns = state.columns().count(),
        tickets = state.ticket_count(),
        "board loaded"
    );
    Ok(state)
}

/// Builds a board from the catalogue and the backend's own grouping
///
/// Every catalogue status becomes a column, even when empty. Groups are
/// keyed by their normalized label; a group absent from the catalogue takes
/// its status code from its first ticket and its label from the raw group
/// name.
///
/// Groups are visited in ascending order of their raw names, so backfilled
/// columns come in that order, and of two groups sharing a key the one whose
/// raw name sorts last keeps the column.
pub fn merge(statuses: Vec<StatusDefinition>, groups: TicketGroups) -> BoardState {
    let mut state = BoardState::new();

    for status in statuses {
        let key = status.key();
        state.set_status(key.clone(), status.id);
        state.set_label(key.clone(), status.label);
        state.set_column(key, Vec::new());
    }

    let mut seen = HashSet::new();
    for (raw, tickets) in groups {
        let key = ColumnKey::from_label(&raw);

        if !seen.insert(key.clone()) {
            warn!(group = %raw, column = %key, "two ticket groups share a column, keeping the later one");
        }

        if state.status_code(&key).is_none() {
            if let Some(first) = tickets.first() {
                state.set_status(key.clone(), first.status);
            }
        }
        if state.label(&key).is_none() {
            state.set_label(key.clone(), raw);
        }

        state.set_column(key, tickets);
    }

    state
}
