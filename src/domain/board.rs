use crate::domain::status::{ColumnKey, LabelMap, StatusCode, StatusMap};
use crate::domain::ticket::{Ticket, TicketId};
use crate::error::{BoardError, Result};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// In-memory board: ordered ticket lists per column plus the status and
/// label catalogues they were built from
///
/// A ticket id lives in at most one column. `index` mirrors the column lists
/// so lookups by id don't scan every column.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    columns: HashMap<ColumnKey, Vec<Ticket>>,
    order: Vec<ColumnKey>,
    statuses: StatusMap,
    labels: LabelMap,
    index: HashMap<TicketId, ColumnKey>,
    generation: u64,
    loaded_at: Option<DateTime<Utc>>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty column if the key is not on the board yet
    pub fn ensure_column(&mut self, key: ColumnKey) {
        if !self.columns.contains_key(&key) {
            self.order.push(key.clone());
            self.columns.insert(key, Vec::new());
        }
    }

    /// Replaces the whole ticket list of a column, creating it if needed
    pub fn set_column(&mut self, key: ColumnKey, tickets: Vec<Ticket>) {
        self.ensure_column(key.clone());

        if let Some(previous) = self.columns.get(&key) {
            for ticket in previous {
                self.index.remove(&ticket.id);
            }
        }

        let mut seen = HashSet::with_capacity(tickets.len());
        let tickets: Vec<Ticket> = tickets
            .into_iter()
            .filter(|ticket| {
                let first = seen.insert(ticket.id);
                if !first {
                    warn!(
                        ticket_id = %ticket.id,
                        column = %key,
                        "ticket listed twice in one column, keeping the first"
                    );
                }
                first
            })
            .collect();

        for ticket in &tickets {
            if let Some(other) = self.index.get(&ticket.id).filter(|o| **o != key).cloned() {
                warn!(
                    ticket_id = %ticket.id,
                    from = %other,
                    to = %key,
                    "ticket listed under two columns, keeping the later one"
                );
                if let Some(list) = self.columns.get_mut(&other) {
                    list.retain(|t| t.id != ticket.id);
                }
            }
            self.index.insert(ticket.id, key.clone());
        }

        self.columns.insert(key, tickets);
    }

    pub fn set_status(&mut self, key: ColumnKey, code: StatusCode) {
        self.statuses.insert(key, code);
    }

    pub fn set_label(&mut self, key: ColumnKey, label: String) {
        self.labels.insert(key, label);
    }

    pub fn status_code(&self, key: &ColumnKey) -> Option<StatusCode> {
        self.statuses.get(key).copied()
    }

    pub fn label(&self, key: &ColumnKey) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn statuses(&self) -> &StatusMap {
        &self.statuses
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    /// Iterates columns in the order they first appeared
    pub fn columns(&self) -> impl Iterator<Item = (&ColumnKey, &[Ticket])> {
        self.order
            .iter()
            .filter_map(|key| self.columns.get(key).map(|list| (key, list.as_slice())))
    }

    pub fn column(&self, key: &ColumnKey) -> Option<&[Ticket]> {
        self.columns.get(key).map(Vec::as_slice)
    }

    pub fn has_column(&self, key: &ColumnKey) -> bool {
        self.columns.contains_key(key)
    }

    /// Gets the column currently holding a ticket
    pub fn column_of(&self, id: TicketId) -> Option<&ColumnKey> {
        self.index.get(&id)
    }

    /// Gets the column and index of a ticket
    pub fn position_of(&self, id: TicketId) -> Option<(&ColumnKey, usize)> {
        let key = self.index.get(&id)?;
        let index = self.columns.get(key)?.iter().position(|t| t.id == id)?;
        Some((key, index))
    }

    pub fn find_ticket(&self, id: TicketId) -> Option<&Ticket> {
        let (key, index) = self.position_of(id)?;
        self.columns.get(key).and_then(|list| list.get(index))
    }

    pub fn ticket_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Moves a ticket inside its column, array-move style
    ///
    /// The ticket at `from` is taken out and reinserted at `to`; `to` is
    /// clamped to the end of the list.
    pub fn reorder(&mut self, key: &ColumnKey, from: usize, to: usize) -> Result<()> {
        let list = self
            .columns
            .get_mut(key)
            .ok_or_else(|| BoardError::ColumnNotFound(key.to_string()))?;

        if from >= list.len() {
            return Err(BoardError::Other(format!(
                "index {} out of range for column {}",
                from, key
            )));
        }

        let ticket = list.remove(from);
        let to = to.min(list.len());
        list.insert(to, ticket);
        Ok(())
    }

    /// Takes a ticket off the board, returning where it was
    pub fn remove_ticket(&mut self, id: TicketId) -> Option<(ColumnKey, usize, Ticket)> {
        let key = self.index.remove(&id)?;
        let list = self.columns.get_mut(&key)?;
        let index = list.iter().position(|t| t.id == id)?;
        let ticket = list.remove(index);
        Some((key, index, ticket))
    }

    /// Places a ticket in a column at `index`, or at the end when `None`
    ///
    /// Any copy of the same ticket elsewhere on the board is removed first.
    pub fn insert_ticket(
        &mut self,
        key: &ColumnKey,
        index: Option<usize>,
        ticket: Ticket,
    ) -> Result<()> {
        if !self.columns.contains_key(key) {
            return Err(BoardError::ColumnNotFound(key.to_string()));
        }

        self.remove_ticket(ticket.id);

        let id = ticket.id;
        if let Some(list) = self.columns.get_mut(key) {
            let at = index.unwrap_or(list.len()).min(list.len());
            list.insert(at, ticket);
        }
        self.index.insert(id, key.clone());
        Ok(())
    }

    /// Swaps in a freshly loaded board, bumping the generation
    pub fn replace_with(&mut self, fresh: BoardState) {
        let generation = self.generation.max(fresh.generation) + 1;
        *self = BoardState {
            generation,
            loaded_at: Some(fresh.loaded_at.unwrap_or_else(Utc::now)),
            ..fresh
        };
    }

    /// Counter bumped on every wholesale replace
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub(crate) fn mark_loaded(&mut self, at: DateTime<Utc>) {
        self.loaded_at = Some(at);
    }

    /// Checks that every ticket sits in exactly one column and every
    /// occupied column has a status code
    pub fn is_consistent(&self) -> bool {
        let listed: usize = self.columns.values().map(Vec::len).sum();
        if listed != self.index.len() {
            return false;
        }

        self.columns.iter().all(|(key, list)| {
            (list.is_empty() || self.statuses.contains_key(key))
                && list
                    .iter()
                    .all(|t| self.index.get(&t.id) == Some(key))
        })
    }
}

impl PartialEq for BoardState {
    /// Compares board content; generation and load time are bookkeeping
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
            && self.columns == other.columns
            && self.statuses == other.statuses
            && self.labels == other.labels
    }
}
