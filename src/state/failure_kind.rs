use std::fmt;

/// Classification of per-URL failures
///
/// Every URL that does not produce a record lands in the failure ledger with
/// one of these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    /// Network or transport error, non-2xx status, timeout
    Fetch,

    /// Page fetched but its structure did not match the expected schema
    Extraction,

    /// Never attempted because the run was cancelled first
    Cancelled,

    /// The owning worker panicked before handing off its result
    WorkerPanicked,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Extraction => "extraction",
            Self::Cancelled => "cancelled",
            Self::WorkerPanicked => "worker_panicked",
        }
    }

    /// Returns all failure kinds in reporting order
    pub fn all() -> [Self; 4] {
        [
            Self::Fetch,
            Self::Extraction,
            Self::Cancelled,
            Self::WorkerPanicked,
        ]
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
