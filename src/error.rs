use std::collections::TryReserveError;
use std::result;
use thiserror::Error;

/// Errors surfaced by the checked map operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Checked indexed access on a key that is not in the map.
    #[error("key does not exist")]
    KeyNotFound,
    /// A new tree node could not be allocated. The map is unchanged.
    #[error("failed to allocate tree node: {0}")]
    AllocationFailed(#[from] TryReserveError),
}

pub type Result<T> = result::Result<T, Error>;
