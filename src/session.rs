use crate::{
    backend::Backend,
    config::BoardConfig,
    domain::{BoardState, ColumnKey, DragInterpreter, DropResolution, Ticket, TicketId, VoidReason},
    error::Result,
    sync::{load_board, MoveReconciler, MoveReport, PendingMove},
};
use std::sync::Arc;
use tracing::{info, warn};

/// What a finished drag did to the board
#[derive(Debug)]
#[must_use = "a pending column move has to be completed or finished"]
pub enum DropOutcome {
    Void(VoidReason),
    Reordered {
        column: ColumnKey,
        from_index: usize,
        to_index: usize,
    },
    /// Column move applied optimistically, waiting for the backend
    Pending(PendingMove),
}

/// One rendered board: its state, gesture handling and backend sync
///
/// Sessions share nothing but the backend handle, so several boards can
/// live side by side.
pub struct BoardSession {
    config: BoardConfig,
    backend: Arc<dyn Backend>,
    state: BoardState,
    drag: DragInterpreter,
    reconciler: MoveReconciler,
}

impl BoardSession {
    pub fn new(config: BoardConfig, backend: Arc<dyn Backend>) -> Self {
        let reconciler = MoveReconciler::new(Arc::clone(&backend), config.acting_user_id);
        Self {
            config,
            backend,
            state: BoardState::new(),
            drag: DragInterpreter::new(),
            reconciler,
        }
    }

    /// Creates a session and performs the first load
    pub async fn open(config: BoardConfig, backend: Arc<dyn Backend>) -> Result<Self> {
        config.validate()?;
        let mut session = Self::new(config, backend);
        session.reload().await?;
        Ok(session)
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Rebuilds the board from the backend
    ///
    /// The current board is kept when the load fails.
    pub async fn reload(&mut self) -> Result<()> {
        match load_board(self.backend.as_ref()).await {
            Ok(fresh) => {
                self.state.replace_with(fresh);
                info!(
                    board = %self.config.name,
                    generation = self.state.generation(),
                    tickets = self.state.ticket_count(),
                    "board reloaded"
                );
                Ok(())
            }
            Err(e) => {
                warn!(board = %self.config.name, error = %e, "reload failed, keeping current board");
                Err(e)
            }
        }
    }

    pub fn ticket(&self, id: TicketId) -> Option<&Ticket> {
        self.state.find_ticket(id)
    }

    /// Presentation label of a column, falling back to its key
    pub fn label<'a>(&'a self, key: &'a ColumnKey) -> &'a str {
        self.state.label(key).unwrap_or(key.as_str())
    }

    pub fn active_ticket(&self) -> Option<&Ticket> {
        self.drag.active()
    }

    pub fn has_move_in_flight(&self, id: TicketId) -> bool {
        self.reconciler.is_in_flight(id)
    }

    pub fn drag_start(&mut self, id: TicketId) -> Option<&Ticket> {
        self.drag.on_drag_start(&self.state, id)
    }

    /// Resolves a drop; reorders are applied and column moves are begun
    /// optimistically before this returns
    pub fn drag_end(&mut self, id: TicketId, target: Option<&str>) -> Result<DropOutcome> {
        match self.drag.on_drag_end(&mut self.state, id, target) {
            DropResolution::Void(reason) => Ok(DropOutcome::Void(reason)),
            DropResolution::Reordered {
                column,
                from_index,
                to_index,
            } => Ok(DropOutcome::Reordered {
                column,
                from_index,
                to_index,
            }),
            DropResolution::Move(mv) => {
                let pending = self.reconciler.begin(&mut self.state, mv)?;
                Ok(DropOutcome::Pending(pending))
            }
        }
    }

    /// Sends the status update of a pending move and settles it
    pub async fn complete(&mut self, pending: PendingMove) -> Result<MoveReport> {
        let backend = self.reconciler.backend();
        let outcome = backend.update_ticket_status(&pending.request()).await;
        self.finish(pending, outcome)
    }

    /// Settles a pending move whose update the caller sent itself
    pub fn finish(&mut self, pending: PendingMove, outcome: Result<()>) -> Result<MoveReport> {
        self.reconciler.finish(&mut self.state, pending, outcome)
    }

    /// Handles a whole drop, waiting for the backend on column moves
    ///
    /// Returns the report of a synced column move, or `None` when the drop
    /// was void or only reordered a column.
    pub async fn drop_ticket(
        &mut self,
        id: TicketId,
        target: Option<&str>,
    ) -> Result<Option<MoveReport>> {
        match self.drag_end(id, target)? {
            DropOutcome::Pending(pending) => self.complete(pending).await.map(Some),
            DropOutcome::Void(_) | DropOutcome::Reordered { .. } => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{memory::InMemoryBackend, StatusUpdate, TicketGroups};
    use crate::domain::{StatusCode, StatusDefinition, UserId};
    use crate::error::BoardError;

    fn ticket(id: i64, status: i64) -> Ticket {
        Ticket::new(TicketId(id), StatusCode(status), format!("Ticket {}", id))
    }

    /// abierto: [3, 2, 1], en revision: [], cerrado: [4]
    fn backend() -> Arc<InMemoryBackend> {
        let mut groups = TicketGroups::new();
        groups.insert(
            "abierto ".to_string(),
            vec![ticket(3, 1), ticket(2, 1), ticket(1, 1)],
        );
        groups.insert("CERRADO".to_string(), vec![ticket(4, 4)]);
        Arc::new(InMemoryBackend::new(
            vec![
                StatusDefinition::new(1, "Abierto"),
                StatusDefinition::new(2, "En Revisión"),
                StatusDefinition::new(4, "Cerrado"),
            ],
            groups,
        ))
    }

    async fn session(backend: &Arc<InMemoryBackend>) -> BoardSession {
        BoardSession::open(BoardConfig::new(UserId(7)), backend.clone())
            .await
            .unwrap()
    }

    fn ids(session: &BoardSession, label: &str) -> Vec<i64> {
        session
            .state()
            .column(&ColumnKey::from_label(label))
            .unwrap()
            .iter()
            .map(|t| t.id.value())
            .collect()
    }

    #[tokio::test]
    async fn test_open_loads_board() {
        let backend = backend();
        let session = session(&backend).await;

        let labels: Vec<&str> = session
            .state()
            .columns()
            .map(|(key, _)| session.label(key))
            .collect();
        assert_eq!(labels, vec!["Abierto", "En Revisión", "Cerrado"]);
        assert_eq!(session.ticket(TicketId(4)).unwrap().title(), Some("Ticket 4"));
        assert_eq!(session.state().generation(), 1);
    }

    #[tokio::test]
    async fn test_open_rejects_invalid_config() {
        let backend = backend();
        let result = BoardSession::open(BoardConfig::new(UserId(0)), backend.clone()).await;
        assert!(matches!(result, Err(BoardError::ConfigError(_))));
        assert_eq!(backend.load_calls().await, 0);
    }

    #[tokio::test]
    async fn test_reorder_issues_no_remote_call() {
        let backend = backend();
        let mut session = session(&backend).await;

        session.drag_start(TicketId(1));
        assert_eq!(session.active_ticket().map(|t| t.id), Some(TicketId(1)));

        let report = session.drop_ticket(TicketId(1), Some("3")).await.unwrap();

        assert!(report.is_none());
        assert!(session.active_ticket().is_none());
        assert_eq!(ids(&session, "abierto"), vec![1, 3, 2]);
        assert_eq!(ids(&session, "cerrado"), vec![4]);
        assert!(backend.updates().await.is_empty());
    }

    #[tokio::test]
    async fn test_column_move() {
        let backend = backend();
        let mut session = session(&backend).await;

        let report = session
            .drop_ticket(TicketId(1), Some("Cerrado"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.to.as_str(), "cerrado");
        assert_eq!(ids(&session, "abierto"), vec![3, 2]);
        assert_eq!(ids(&session, "cerrado"), vec![4, 1]);
        assert_eq!(session.ticket(TicketId(1)).unwrap().status, StatusCode(4));
        assert_eq!(
            backend.updates().await,
            vec![StatusUpdate {
                ticket_id: TicketId(1),
                new_status: StatusCode(4),
                acting_user: UserId(7),
            }]
        );

        // The backend regrouped the ticket, so a reload agrees with the board
        session.reload().await.unwrap();
        assert_eq!(ids(&session, "cerrado"), vec![4, 1]);
    }

    #[tokio::test]
    async fn test_failed_move_rolls_back() {
        let backend = backend();
        let mut session = session(&backend).await;
        let before = session.state().clone();
        backend.set_fail_updates(true).await;

        let result = session.drop_ticket(TicketId(2), Some("4")).await;

        assert!(matches!(result, Err(BoardError::SyncFailed { .. })));
        assert_eq!(session.state(), &before);
        assert_eq!(backend.updates().await.len(), 1);
        assert!(!session.has_move_in_flight(TicketId(2)));
    }

    #[tokio::test]
    async fn test_drop_outside_changes_nothing() {
        let backend = backend();
        let mut session = session(&backend).await;
        let before = session.state().clone();

        let outcome = session.drag_end(TicketId(1), None).unwrap();
        assert!(matches!(outcome, DropOutcome::Void(VoidReason::NoDropTarget)));

        let outcome = session.drag_end(TicketId(1), Some("papelera")).unwrap();
        assert!(matches!(outcome, DropOutcome::Void(VoidReason::DestinationNotFound)));

        assert_eq!(session.state(), &before);
        assert!(backend.updates().await.is_empty());
    }

    #[tokio::test]
    async fn test_pending_move_visible_before_completion() {
        let backend = backend();
        let mut session = session(&backend).await;

        let pending = match session.drag_end(TicketId(3), Some("en revision")).unwrap() {
            DropOutcome::Pending(pending) => pending,
            other => panic!("expected a pending move, got {:?}", other),
        };

        assert_eq!(ids(&session, "en revision"), vec![3]);
        assert!(session.has_move_in_flight(TicketId(3)));

        // A second drag of the same ticket waits for the first to settle
        let result = session.drag_end(TicketId(3), Some("cerrado"));
        assert!(matches!(result, Err(BoardError::MoveInFlight(TicketId(3)))));

        // Other gestures still go through
        let outcome = session.drag_end(TicketId(1), Some("2")).unwrap();
        assert!(matches!(outcome, DropOutcome::Reordered { .. }));
        assert_eq!(ids(&session, "abierto"), vec![1, 2]);

        session.complete(pending).await.unwrap();
        assert!(!session.has_move_in_flight(TicketId(3)));
        assert_eq!(session.ticket(TicketId(3)).unwrap().status, StatusCode(2));
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_board() {
        let backend = backend();
        let mut session = session(&backend).await;
        let before = session.state().clone();
        backend.set_fail_loads(true).await;

        let result = session.reload().await;

        assert!(matches!(result, Err(BoardError::LoadFailed(_))));
        assert_eq!(session.state(), &before);
        assert_eq!(session.state().generation(), 1);
    }

    #[tokio::test]
    async fn test_reload_picks_up_new_tickets() {
        let backend = backend();
        let mut session = session(&backend).await;

        backend.add_ticket("abierto ", ticket(5, 1)).await;
        session.reload().await.unwrap();

        assert_eq!(session.state().ticket_count(), 5);
        assert!(session.ticket(TicketId(5)).is_some());
        assert!(session.state().is_consistent());
    }

    #[tokio::test]
    async fn test_ticket_listed_twice_loads_once() {
        let mut groups = TicketGroups::new();
        groups.insert("Abierto".to_string(), vec![ticket(1, 1), ticket(1, 1)]);
        let backend = Arc::new(InMemoryBackend::new(
            vec![StatusDefinition::new(1, "Abierto"), StatusDefinition::new(4, "Cerrado")],
            groups,
        ));
        let mut session = session(&backend).await;

        assert_eq!(ids(&session, "abierto"), vec![1]);
        assert!(session.state().is_consistent());

        session.drop_ticket(TicketId(1), Some("Cerrado")).await.unwrap();

        assert!(ids(&session, "abierto").is_empty());
        assert_eq!(ids(&session, "cerrado"), vec![1]);
        assert!(session.state().is_consistent());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let backend = backend();
        let mut first = session(&backend).await;
        let second = session(&backend).await;

        let outcome = first.drag_end(TicketId(1), Some("3")).unwrap();
        assert!(matches!(outcome, DropOutcome::Reordered { to_index: 0, .. }));

        assert_eq!(ids(&first, "abierto"), vec![1, 3, 2]);
        assert_eq!(ids(&second, "abierto"), vec![3, 2, 1]);
    }
}
