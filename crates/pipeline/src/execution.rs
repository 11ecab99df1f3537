use lambda_runtime::tracing;
use serde_json::json;

/// Where an execution is in the chain.
///
/// `Started → Seeded → Detected → Updated(n)… → Completed`, with any
/// non-terminal state able to move to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Started,
    Seeded,
    Detected { languages: usize },
    Updated { count: usize },
    Completed,
    Failed,
}

impl ExecutionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionState::Completed | ExecutionState::Failed)
    }
}

/// Summary of a completed execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub execution_name: String,
    pub key: String,
    /// Language codes written, in the order they were detected
    pub languages_updated: Vec<String>,
    pub state: ExecutionState,
}

impl ExecutionReport {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "executionName": self.execution_name,
            "key": self.key,
            "languagesUpdated": self.languages_updated,
        })
    }
}

/// Tracks the state of one execution and logs every transition.
#[derive(Debug)]
pub(crate) struct ExecutionTracker {
    state: ExecutionState,
}

impl ExecutionTracker {
    pub(crate) fn start() -> Self {
        tracing::debug!(state = ?ExecutionState::Started, "Execution started");

        Self {
            state: ExecutionState::Started,
        }
    }

    pub(crate) fn state(&self) -> ExecutionState {
        self.state
    }

    pub(crate) fn advance(&mut self, next: ExecutionState) {
        if self.state.is_terminal() {
            tracing::warn!(from = ?self.state, to = ?next, "Ignoring transition out of terminal state");
            return;
        }

        tracing::debug!(from = ?self.state, to = ?next, "Execution transition");

        self.state = next;
    }
}
