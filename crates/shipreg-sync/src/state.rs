use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SyncError, SyncResult};

/// Progress of a single `create_shipment` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationState {
    Idle,
    DocumentUploading,
    LedgerSubmitting,
    LedgerConfirmed,
    IndexWriting,
    Done,
    /// Ledger record exists; the index write failed.
    PartialSuccess,
    /// Nothing reached the ledger. An uploaded document may be orphaned.
    Failed,
}

impl CreationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::PartialSuccess | Self::Failed)
    }

    /// Allowed transitions:
    /// - the happy path, one step at a time
    /// - `Failed` from `DocumentUploading` or `LedgerSubmitting`
    /// - `PartialSuccess` from `IndexWriting` (the index write of a
    ///   confirmed ledger record)
    pub fn can_transition_to(&self, next: CreationState) -> bool {
        use CreationState::*;

        matches!(
            (self, next),
            (Idle, DocumentUploading)
                | (DocumentUploading, LedgerSubmitting)
                | (LedgerSubmitting, LedgerConfirmed)
                | (LedgerConfirmed, IndexWriting)
                | (IndexWriting, Done)
                | (IndexWriting, PartialSuccess)
                | (DocumentUploading, Failed)
                | (LedgerSubmitting, Failed)
        )
    }
}

/// Validated state holder that records every state visited.
#[derive(Debug)]
pub struct CreationMachine {
    state: CreationState,
    trace: Vec<CreationState>,
}

impl CreationMachine {
    pub fn new() -> Self {
        Self {
            state: CreationState::Idle,
            trace: vec![CreationState::Idle],
        }
    }

    pub fn state(&self) -> CreationState {
        self.state
    }

    pub fn advance(&mut self, next: CreationState) -> SyncResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(SyncError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        debug!(from = ?self.state, to = ?next, "creation state");
        self.state = next;
        self.trace.push(next);
        Ok(())
    }

    pub fn into_trace(self) -> Vec<CreationState> {
        self.trace
    }
}

impl Default for CreationMachine {
    fn default() -> Self {
        Self::new()
    }
}
