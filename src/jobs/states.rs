use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-side job states as reported by status endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    /// Accepted but not yet picked up
    NotStarted,
    /// Running on the server
    InProgress,
    /// Finished; a result payload can be downloaded
    Complete,
    /// Finished with an error described by the job's message
    Failed,
}

impl JobState {
    /// Check if this is a terminal state (polling stops)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    pub fn is_pending(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NOT_STARTED"),
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Complete => write!(f, "COMPLETE"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

impl std::str::FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_STARTED" => Ok(Self::NotStarted),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETE" => Ok(Self::Complete),
            "FAILED" => Ok(Self::Failed),
            _ => Err(format!("Invalid job state: {s}")),
        }
    }
}

impl Default for JobState {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// Outcome of polling: the terminal status, or the caller withdrew interest.
/// Cancellation is local; the remote job may keep running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult<S> {
    Terminal(S),
    Cancelled,
}

impl<S> PollResult<S> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn terminal(self) -> Option<S> {
        match self {
            Self::Terminal(status) => Some(status),
            Self::Cancelled => None,
        }
    }
}
