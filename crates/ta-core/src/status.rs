//! Run status reported to callers.
//!
//! Timeouts are a status, not an error: a run that ran out of budget still
//! hands back whatever partial result it has.

/// Outcome of a simulation or search run.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// Ran to completion.
    Success,
    /// Stopped early on the time budget or the horizon.
    Timeout,
    /// Stopped on an error; no usable result.
    Failed,
    /// Never started.
    #[default]
    NotRun,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "SUCCESS",
            Status::Timeout => "TIMEOUT",
            Status::Failed  => "FAILED",
            Status::NotRun  => "NOT_RUN",
        }
    }

    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
