pub mod contests;
pub mod matcher;
pub mod solution_links;

use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no contest data received from the contest source for any resource")]
    NoContestData,
    #[error("store operation failed: {0}")]
    StoreError(#[from] StoreError),
}
