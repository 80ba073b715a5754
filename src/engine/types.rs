//! Engine types
//!
//! Operation outcomes and running statistics for the pagination engine.

use std::fmt;

/// What happened to a requested operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    /// The fetch succeeded and its result replaced the state
    Applied,
    /// Every attempt failed; the message was stored in `state.error`
    Failed {
        /// Displayable failure message
        message: String,
    },
    /// The operation was not started
    Skipped(SkipReason),
    /// The operation finished but its result was thrown away
    Discarded(DiscardReason),
}

impl OperationOutcome {
    /// Create a failed outcome
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Check if the result reached the state (success or failure)
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Applied | Self::Failed { .. })
    }

    /// Check if the fetch succeeded and was applied
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    /// Check if the operation failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Check if the operation never started
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// Check if the result was thrown away
    pub fn is_discarded(&self) -> bool {
        matches!(self, Self::Discarded(_))
    }
}

impl fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => f.write_str("applied"),
            Self::Failed { message } => write!(f, "failed: {message}"),
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::Discarded(reason) => write!(f, "discarded: {reason}"),
        }
    }
}

/// Why an operation was not started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The engine is not attached to a live owner
    Detached,
    /// A conflicting operation is already running
    InFlight,
    /// The source reported no further data
    NoMoreData,
    /// Cursor mode without a cursor to continue from
    NoCursor,
    /// Nothing has been loaded yet; run an initial load first
    NotLoaded,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Detached => "engine is detached",
            Self::InFlight => "an operation is already in flight",
            Self::NoMoreData => "no more data",
            Self::NoCursor => "no cursor",
            Self::NotLoaded => "nothing loaded yet",
        };
        f.write_str(reason)
    }
}

/// Why a finished operation's result was thrown away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// A later operation or a reset took ownership of the state
    Superseded,
    /// The owner detached while the operation was running
    Detached,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Superseded => f.write_str("superseded"),
            Self::Detached => f.write_str("detached"),
        }
    }
}

/// Counters over the lifetime of an engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Operations that started a fetch
    pub started: u64,
    /// Successful results applied to the state
    pub applied: u64,
    /// Failures applied to the state
    pub failed: u64,
    /// Results thrown away as stale or detached
    pub discarded: u64,
    /// Requests that never started
    pub skipped: u64,
}

impl EngineStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations started but not yet resolved
    pub fn pending(&self) -> u64 {
        self.started
            .saturating_sub(self.applied + self.failed + self.discarded)
    }

    pub(crate) fn record(&mut self, outcome: &OperationOutcome) {
        match outcome {
            OperationOutcome::Applied => self.applied += 1,
            OperationOutcome::Failed { .. } => self.failed += 1,
            OperationOutcome::Skipped(_) => self.skipped += 1,
            OperationOutcome::Discarded(_) => self.discarded += 1,
        }
    }
}
