pub mod models;
pub mod retry;
pub mod scheduler;
pub mod sources;
pub mod store;
pub mod sync;

pub use scheduler::Scheduler;
pub use sync::{
    contests::{ContestSyncReport, ContestSynchronizer},
    solution_links::{SolutionLinkSyncReport, SolutionLinkSynchronizer},
    SyncError,
};
