// Inbound half of replication: merges change notifications from the store
// into a console's local state.

mod handler;
mod strategy;

pub use handler::{MatchSyncHandler, RemoteClockListener};
pub use strategy::{LastWriterWins, ReconciliationStrategy};
