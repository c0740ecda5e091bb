//! State module for tracking run progress
//!
//! # Components
//!
//! - `WorkerState`: Lifecycle of one worker in the pool (idle, running, done)
//! - `FailureKind`: Why a URL ended up in the failure ledger instead of the results

mod failure_kind;
mod worker_state;

pub use failure_kind::FailureKind;
pub use worker_state::WorkerState;
