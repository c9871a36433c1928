use std::fmt;

/// How a dispatch pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// Every handler ran
    Completed,
    /// A handler suppressed the event and the rest of the chain was skipped
    Suppressed,
}

/// Result of one successful dispatch pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub status: DispatchStatus,
    /// Number of handlers that ran
    pub invoked: usize,
    /// Node whose handler left the event suppressed
    pub suppressed_by: Option<String>,
}

impl DispatchOutcome {
    pub fn completed(invoked: usize) -> Self {
        Self {
            status: DispatchStatus::Completed,
            invoked,
            suppressed_by: None,
        }
    }

    pub fn suppressed(invoked: usize, node: String) -> Self {
        Self {
            status: DispatchStatus::Suppressed,
            invoked,
            suppressed_by: Some(node),
        }
    }

    pub fn is_suppressed(&self) -> bool {
        self.status == DispatchStatus::Suppressed
    }
}

impl fmt::Display for DispatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchStatus::Completed => write!(f, "COMPLETED"),
            DispatchStatus::Suppressed => write!(f, "SUPPRESSED"),
        }
    }
}
