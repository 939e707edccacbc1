#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("index out of range")]
    OutOfRange,
    #[error("fetch failed: {0:#}")]
    Fetch(anyhow::Error),
    #[error("unable to retrieve subreddit {0}")]
    Subreddit(String),
    #[error("unable to load subscriptions")]
    Subscription,
    #[error("could not access user account")]
    Account,
    #[error("unrecognized order {0:?}")]
    UnrecognizedOrder(String),
}

impl ContentError {
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, ContentError::OutOfRange)
    }
}

pub type Result<T, E = ContentError> = std::result::Result<T, E>;
