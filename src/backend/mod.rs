use crate::{
    domain::{StatusCode, StatusDefinition, Ticket, TicketId, UserId},
    error::Result,
};
use async_trait::async_trait;
use std::collections::BTreeMap;

pub mod memory;
pub mod wire;

/// Tickets grouped by the backend's own raw status label
///
/// Iteration is in ascending byte order of the raw labels, whatever order the
/// backend listed them in.
pub type TicketGroups = BTreeMap<String, Vec<Ticket>>;

/// Payload of the one mutation the board issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    pub ticket_id: TicketId,
    pub new_status: StatusCode,
    pub acting_user: UserId,
}

/// Remote ticket service the board reads from and syncs moves to
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetches the canonical status catalogue
    async fn fetch_statuses(&self) -> Result<Vec<StatusDefinition>>;

    /// Fetches tickets grouped by status label, as the backend groups them
    /// (label casing and accents are not guaranteed to match the catalogue)
    async fn fetch_tickets_grouped(&self) -> Result<TicketGroups>;

    /// Sets a ticket's status code on behalf of a user
    async fn update_ticket_status(&self, update: &StatusUpdate) -> Result<()>;
}
