//! Keeping the board in step with the backend: wholesale loads and
//! optimistic column moves.

pub mod loader;
pub mod reconciler;

pub use loader::{load_board, merge};
pub use reconciler::{MoveId, MoveReconciler, MoveReport, PendingMove};
