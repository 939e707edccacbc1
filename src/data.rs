use std::sync::Arc;

use anyhow::{Context, Result};

use crate::reddit::{self, CommentSort, SortOption};

/// Pull-based upstream listing. `None` means the source is exhausted.
pub type Stream<T> = Box<dyn Iterator<Item = Result<T>> + Send>;

const SUBSCRIPTIONS_PATH: &str = "/subreddits/mine/subscriber.json";

pub trait FeedService: Send + Sync {
    fn front_page(&self, order: Option<SortOption>) -> Result<Stream<reddit::Post>>;
    fn subreddit(&self, name: &str, order: Option<SortOption>) -> Result<Stream<reddit::Post>>;
    fn search(
        &self,
        query: &str,
        subreddit: Option<&str>,
        order: Option<SortOption>,
    ) -> Result<Stream<reddit::Post>>;
    fn user_submitted(&self, order: Option<SortOption>) -> Result<Stream<reddit::Post>>;
    fn is_authenticated(&self) -> bool;
}

pub trait SubscriptionService: Send + Sync {
    fn subscriptions(&self) -> Result<Stream<reddit::Subreddit>>;
}

pub trait CommentService: Send + Sync {
    fn load_submission(
        &self,
        url: &str,
        order: Option<CommentSort>,
    ) -> Result<reddit::SubmissionTree>;
    fn load_more(
        &self,
        link_id: &str,
        more: &reddit::MoreComments,
        order: Option<CommentSort>,
    ) -> Result<Vec<reddit::CommentNode>>;
}

pub struct RedditFeedService {
    client: Arc<reddit::Client>,
}

impl RedditFeedService {
    pub fn new(client: Arc<reddit::Client>) -> Self {
        Self { client }
    }
}

impl FeedService for RedditFeedService {
    fn front_page(&self, order: Option<SortOption>) -> Result<Stream<reddit::Post>> {
        let path = format!("/{}.json", order.unwrap_or_default().as_str());
        Ok(Box::new(self.client.paginate(&path, Vec::new())))
    }

    fn subreddit(&self, name: &str, order: Option<SortOption>) -> Result<Stream<reddit::Post>> {
        let path = format!(
            "/r/{}/{}.json",
            name.trim_start_matches("r/"),
            order.unwrap_or_default().as_str()
        );
        Ok(Box::new(self.client.paginate(&path, Vec::new())))
    }

    fn search(
        &self,
        query: &str,
        subreddit: Option<&str>,
        order: Option<SortOption>,
    ) -> Result<Stream<reddit::Post>> {
        let mut params = vec![("q".to_string(), query.to_string())];
        if let Some(order) = order {
            params.push(("sort".into(), order.as_str().into()));
        }
        let path = match subreddit {
            Some(name) => {
                params.push(("restrict_sr".into(), "on".into()));
                format!("/r/{}/search.json", name.trim_start_matches("r/"))
            }
            None => "/search.json".to_string(),
        };
        Ok(Box::new(self.client.paginate(&path, params)))
    }

    fn user_submitted(&self, order: Option<SortOption>) -> Result<Stream<reddit::Post>> {
        let user = self.client.me().context("resolve current user")?;
        let mut params = Vec::new();
        if let Some(order) = order {
            params.push(("sort".to_string(), order.as_str().to_string()));
        }
        let path = format!("/user/{user}/submitted.json");
        Ok(Box::new(self.client.paginate(&path, params)))
    }

    fn is_authenticated(&self) -> bool {
        self.client.is_authenticated()
    }
}

pub struct RedditSubscriptionService {
    client: Arc<reddit::Client>,
}

impl RedditSubscriptionService {
    pub fn new(client: Arc<reddit::Client>) -> Self {
        Self { client }
    }
}

impl SubscriptionService for RedditSubscriptionService {
    fn subscriptions(&self) -> Result<Stream<reddit::Subreddit>> {
        Ok(Box::new(self.client.paginate(SUBSCRIPTIONS_PATH, Vec::new())))
    }
}

pub struct RedditCommentService {
    client: Arc<reddit::Client>,
}

impl RedditCommentService {
    pub fn new(client: Arc<reddit::Client>) -> Self {
        Self { client }
    }
}

impl CommentService for RedditCommentService {
    fn load_submission(
        &self,
        url: &str,
        order: Option<CommentSort>,
    ) -> Result<reddit::SubmissionTree> {
        self.client
            .submission(url, order)
            .context("fetch submission")
    }

    fn load_more(
        &self,
        link_id: &str,
        more: &reddit::MoreComments,
        order: Option<CommentSort>,
    ) -> Result<Vec<reddit::CommentNode>> {
        self.client
            .more_children(link_id, more, order)
            .context("fetch more comments")
    }
}
