/// Worker lifecycle definitions
///
/// A worker owns one chunk of the URL list. Workers for empty chunks never
/// run and go straight from `Idle` to `Done`.
use crate::ScrapeError;
use std::fmt;

/// Represents the current state of a worker in the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkerState {
    /// Created but not yet started
    #[default]
    Idle,

    /// Fetching and extracting its chunk, one URL at a time
    Running,

    /// Finished and handed its partial result over
    Done,
}

impl WorkerState {
    /// Returns true if the worker has handed off its result
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: WorkerState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running) | (Self::Running, Self::Done) | (Self::Idle, Self::Done)
        )
    }

    /// Moves to `next`, rejecting transitions the lifecycle does not allow
    pub fn transition(&mut self, next: WorkerState) -> Result<(), ScrapeError> {
        if !self.can_transition_to(next) {
            return Err(ScrapeError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
