mod api;
mod fetcher;

pub use api::{GithubClient, Repo};
pub use fetcher::{spawn_fetch_run, FetchSnapshot};

use thiserror::Error;

/// Per-item fetch outcomes. `NotFound` is an expected condition (a repository
/// without a README), not a user-visible error; it is counted against the run
/// but never surfaced.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("readme not found")]
    NotFound,
    #[error("github api error: {0}")]
    Api(String),
}
