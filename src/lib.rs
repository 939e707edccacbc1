#![allow(clippy::uninlined_format_args)]

pub mod app;
pub mod comments;
pub mod config;
pub mod content;
pub mod data;
pub mod error;
pub mod listing;
pub mod loader;
pub mod record;
pub mod reddit;
pub mod submission;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
pub use content::{Content, Index};
pub use error::ContentError;
pub use listing::{SubredditContent, SubscriptionContent};
pub use submission::SubmissionContent;
