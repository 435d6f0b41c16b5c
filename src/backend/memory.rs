use crate::{
    backend::{wire, Backend, StatusUpdate, TicketGroups},
    domain::{ColumnKey, StatusDefinition, Ticket},
    error::{BoardError, Result},
};
use async_trait::async_trait;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    statuses: Vec<StatusDefinition>,
    groups: TicketGroups,
    updates: Vec<StatusUpdate>,
    load_calls: usize,
    fail_loads: bool,
    fail_updates: bool,
}

/// In-process ticket service
///
/// Keeps a status catalogue and tickets grouped by status label. A status
/// update regroups the ticket under the catalogue label of its new status,
/// so a reload reflects accepted moves. Every update call is recorded, and
/// loads or updates can be made to fail.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    inner: Mutex<Inner>,
}

impl InMemoryBackend {
    pub fn new(statuses: Vec<StatusDefinition>, groups: TicketGroups) -> Self {
        Self {
            inner: Mutex::new(Inner {
                statuses,
                groups,
                ..Inner::default()
            }),
        }
    }

    /// Builds a backend from captured response bodies of the ticket service
    pub fn from_wire(statuses_body: &str, tickets_body: &str) -> Result<Self> {
        Ok(Self::new(
            wire::decode_statuses(statuses_body)?,
            wire::decode_ticket_groups(tickets_body)?,
        ))
    }

    pub async fn set_fail_loads(&self, fail: bool) {
        self.inner.lock().await.fail_loads = fail;
    }

    pub async fn set_fail_updates(&self, fail: bool) {
        self.inner.lock().await.fail_updates = fail;
    }

    /// Every status update received so far, accepted or not
    pub async fn updates(&self) -> Vec<StatusUpdate> {
        self.inner.lock().await.updates.clone()
    }

    pub async fn load_calls(&self) -> usize {
        self.inner.lock().await.load_calls
    }

    /// Adds a ticket under a raw group label, as ticket creation would
    pub async fn add_ticket(&self, group: &str, ticket: Ticket) {
        self.inner
            .lock()
            .await
            .groups
            .entry(group.to_string())
            .or_default()
            .push(ticket);
    }

    pub async fn groups(&self) -> TicketGroups {
        self.inner.lock().await.groups.clone()
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn fetch_statuses(&self) -> Result<Vec<StatusDefinition>> {
        let mut inner = self.inner.lock().await;
        inner.load_calls += 1;
        if inner.fail_loads {
            return Err(BoardError::Backend("status catalogue unavailable".to_string()));
        }
        Ok(inner.statuses.clone())
    }

    async fn fetch_tickets_grouped(&self) -> Result<TicketGroups> {
        let inner = self.inner.lock().await;
        if inner.fail_loads {
            return Err(BoardError::Backend("ticket listing unavailable".to_string()));
        }
        Ok(inner.groups.clone())
    }

    async fn update_ticket_status(&self, update: &StatusUpdate) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.updates.push(*update);

        if inner.fail_updates {
            return Err(BoardError::Backend(format!(
                "status update for ticket {} rejected",
                update.ticket_id
            )));
        }

        let label = inner
            .statuses
            .iter()
            .find(|s| s.id == update.new_status)
            .map(|s| s.label.clone())
            .ok_or_else(|| BoardError::Backend(format!("unknown status {}", update.new_status)))?;

        let mut found = None;
        for (group, tickets) in inner.groups.iter_mut() {
            if let Some(pos) = tickets.iter().position(|t| t.id == update.ticket_id) {
                found = Some((group.clone(), tickets.remove(pos)));
                break;
            }
        }

        let (old_group, ticket) = found.ok_or(BoardError::TicketNotFound(update.ticket_id))?;
        if inner.groups.get(&old_group).is_some_and(Vec::is_empty) {
            inner.groups.remove(&old_group);
        }

        // Reuse whatever spelling the listing already uses for this status
        let key = ColumnKey::from_label(&label);
        let group = inner
            .groups
            .keys()
            .find(|g| ColumnKey::from_label(g) == key)
            .cloned()
            .unwrap_or(label);

        inner
            .groups
            .entry(group)
            .or_default()
            .push(ticket.with_status(update.new_status));
        Ok(())
    }
}
