pub mod clist;
pub mod youtube;

use thiserror::Error;

pub use clist::{ClistClient, ClistContest, ContestQuery, ContestSource};
pub use youtube::{PlaylistVideo, VideoSource, YouTubeClient};

pub type Result<T> = std::result::Result<T, SourceError>;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to request to external source: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("invalid url given: {0}")]
    InvalidUrlError(#[from] url::ParseError),
    #[error("{0} is not configured")]
    MissingCredential(&'static str),
    #[error("{0}")]
    UnexpectedError(String),
}
