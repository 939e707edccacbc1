use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::content::{humanize_timestamp, wrap_text};
use crate::reddit::{self, CommentNode, MoreComments, Post, Subreddit};

const DELETED: &str = "[deleted]";

/// Where a submission's link points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlType {
    SelfPost,
    CrossPost,
    External,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub title: String,
    pub text: String,
    pub author: String,
    pub score: i64,
    pub comments: i64,
    pub created: String,
    pub permalink: String,
    pub subreddit: String,
    pub flair: Option<String>,
    pub url_full: String,
    /// Display form of the link, `self.<subreddit>` for reddit-hosted posts.
    pub url: String,
    pub url_type: UrlType,
    pub likes: Option<bool>,
    pub gold: bool,
    pub nsfw: bool,
    /// Position in the listing this was read from.
    pub index: Option<usize>,
}

impl Submission {
    pub fn from_post(post: &Post) -> Self {
        static REDDIT_LINK: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^https?://(www\.)?(np\.)?redd(it\.com|\.it)/r/.*")
                .expect("valid reddit link regex")
        });

        let flair = post
            .link_flair_text
            .as_deref()
            .map(str::trim)
            .filter(|flair| !flair.is_empty())
            .map(|flair| {
                if flair.starts_with('[') {
                    flair.to_string()
                } else {
                    format!("[{flair}]")
                }
            });

        let (url_type, url) = if after_subreddit(&post.permalink) == after_subreddit(&post.url) {
            (UrlType::SelfPost, format!("self.{}", post.subreddit))
        } else if REDDIT_LINK.is_match(&post.url) {
            let target = post.url.split('/').nth(4).unwrap_or_default();
            (UrlType::CrossPost, format!("self.{target}"))
        } else {
            (UrlType::External, post.url.clone())
        };

        Self {
            title: post.title.clone(),
            text: post.selftext.clone(),
            author: author_name(&post.author),
            score: post.score,
            comments: post.num_comments,
            created: humanize_timestamp(post.created_utc, false),
            permalink: post.permalink.clone(),
            subreddit: post.subreddit.clone(),
            flair,
            url_full: post.url.clone(),
            url,
            url_type,
            likes: post.likes,
            gold: post.gilded > 0,
            nsfw: post.over_18,
            index: None,
        }
    }
}

fn after_subreddit(link: &str) -> &str {
    link.rsplit("/r/").next().unwrap_or(link)
}

fn author_name(author: &str) -> String {
    if author.trim().is_empty() {
        DELETED.to_string()
    } else {
        author.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentBody {
    pub body: String,
    pub author: String,
    /// Written by the submission's author.
    pub is_author: bool,
    pub score: i64,
    pub created: String,
    pub flair: Option<String>,
    pub likes: Option<bool>,
    pub gold: bool,
    pub permalink: String,
}

impl CommentBody {
    pub fn from_comment(comment: &reddit::Comment, submission_author: &str) -> Self {
        let author = author_name(&comment.author);
        Self {
            body: comment.body.clone(),
            is_author: author != DELETED && author == submission_author,
            author,
            score: comment.score,
            created: humanize_timestamp(comment.created_utc, false),
            flair: comment
                .author_flair_text
                .clone()
                .filter(|flair| !flair.trim().is_empty()),
            likes: comment.likes,
            gold: comment.gilded > 0,
            permalink: comment.permalink.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub data: Arc<Submission>,
    pub split_title: Vec<String>,
    pub split_text: Vec<String>,
    pub n_rows: usize,
    pub offset: usize,
}

impl Header {
    pub fn new(data: Submission) -> Self {
        Self {
            data: Arc::new(data),
            split_title: Vec::new(),
            split_text: Vec::new(),
            n_rows: 0,
            offset: 0,
        }
    }

    /// Layout used at the top of a submission page.
    pub(crate) fn layout_page(&mut self, n_cols: usize) {
        let width = n_cols.saturating_sub(2);
        self.split_title = wrap_text(&self.data.title, width);
        self.split_text = wrap_text(&self.data.text, width);
        self.n_rows = self.split_title.len() + self.split_text.len() + 5;
        self.offset = 0;
    }

    /// Layout used for a row of a subreddit listing.
    pub(crate) fn layout_listing(&mut self, n_cols: usize) {
        self.split_title = wrap_text(&self.data.title, n_cols);
        self.split_text.clear();
        self.n_rows = self.split_title.len() + 3;
        self.offset = 0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub data: Arc<CommentBody>,
    pub depth: usize,
    pub split_body: Vec<String>,
    pub n_rows: usize,
    pub offset: usize,
}

/// A collapsed subtree. Owns the records it replaced until expanded again.
#[derive(Debug, Clone, PartialEq)]
pub struct HiddenComment {
    pub depth: usize,
    pub count: usize,
    pub cache: Vec<Record>,
    pub n_rows: usize,
    pub offset: usize,
}

impl HiddenComment {
    pub fn body(&self) -> &'static str {
        "Hidden"
    }
}

/// Stand-in for sibling comments that have not been fetched yet.
#[derive(Debug, Clone)]
pub struct Continuation {
    pub handle: Arc<MoreComments>,
    pub depth: usize,
    pub count: usize,
    pub n_rows: usize,
    pub offset: usize,
}

impl PartialEq for Continuation {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.handle, &other.handle)
            && self.depth == other.depth
            && self.count == other.count
            && self.n_rows == other.n_rows
            && self.offset == other.offset
    }
}

impl Continuation {
    pub fn body(&self) -> &'static str {
        "More comments"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionInfo {
    /// Display name, `/r/<name>`.
    pub name: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub data: Arc<SubscriptionInfo>,
    pub split_title: Vec<String>,
    pub n_rows: usize,
    pub offset: usize,
}

impl Subscription {
    pub fn from_subreddit(subreddit: &Subreddit) -> Self {
        Self {
            data: Arc::new(SubscriptionInfo {
                name: format!("/r/{}", subreddit.display_name),
                title: subreddit.title.clone(),
            }),
            split_title: Vec::new(),
            n_rows: 0,
            offset: 0,
        }
    }

    pub(crate) fn layout(&mut self, n_cols: usize) {
        self.split_title = wrap_text(&self.data.title, n_cols);
        self.n_rows = self.split_title.len() + 1;
        self.offset = 0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Header(Header),
    Comment(Comment),
    HiddenComment(HiddenComment),
    Continuation(Continuation),
    Subscription(Subscription),
}

/// Indentation rule for nested comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indent {
    pub size: usize,
    pub max_level: usize,
}

impl Default for Indent {
    fn default() -> Self {
        Self {
            size: 2,
            max_level: 8,
        }
    }
}

impl Indent {
    /// Depths past `max_level` share the deepest column.
    pub fn offset(&self, depth: usize) -> usize {
        depth.min(self.max_level) * self.size
    }
}

impl Record {
    /// Projects one flattened reply-tree node.
    pub fn from_node(node: CommentNode, depth: usize, submission_author: &str) -> Self {
        match node {
            CommentNode::Comment(comment) => Record::Comment(Comment {
                data: Arc::new(CommentBody::from_comment(&comment, submission_author)),
                depth,
                split_body: Vec::new(),
                n_rows: 0,
                offset: 0,
            }),
            CommentNode::More(more) => Record::Continuation(Continuation {
                count: more.count,
                handle: Arc::new(more),
                depth,
                n_rows: 0,
                offset: 0,
            }),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Record::Header(_) => "Submission",
            Record::Comment(_) => "Comment",
            Record::HiddenComment(_) => "HiddenComment",
            Record::Continuation(_) => "MoreComments",
            Record::Subscription(_) => "Subscription",
        }
    }

    /// Nesting depth for comment-tree records.
    pub fn depth(&self) -> Option<usize> {
        match self {
            Record::Comment(c) => Some(c.depth),
            Record::HiddenComment(h) => Some(h.depth),
            Record::Continuation(m) => Some(m.depth),
            Record::Header(_) | Record::Subscription(_) => None,
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            Record::Header(h) => h.offset,
            Record::Comment(c) => c.offset,
            Record::HiddenComment(h) => h.offset,
            Record::Continuation(m) => m.offset,
            Record::Subscription(s) => s.offset,
        }
    }

    /// How many comments this record accounts for when folded into a parent.
    pub(crate) fn subsumed_count(&self) -> usize {
        match self {
            Record::HiddenComment(h) => h.count,
            Record::Continuation(m) => m.count,
            _ => 1,
        }
    }

    pub(crate) fn layout_comment(&mut self, n_cols: usize, indent: Indent) {
        match self {
            Record::Comment(c) => {
                c.offset = indent.offset(c.depth);
                c.split_body = wrap_text(&c.data.body, n_cols.saturating_sub(c.offset));
                c.n_rows = c.split_body.len() + 1;
            }
            Record::HiddenComment(h) => {
                h.offset = indent.offset(h.depth);
                h.n_rows = 1;
            }
            Record::Continuation(m) => {
                m.offset = indent.offset(m.depth);
                m.n_rows = 1;
            }
            Record::Header(h) => h.layout_page(n_cols),
            Record::Subscription(s) => s.layout(n_cols),
        }
    }

    pub(crate) fn layout_listing(&mut self, n_cols: usize) {
        match self {
            Record::Header(h) => h.layout_listing(n_cols),
            Record::Subscription(s) => s.layout(n_cols),
            other => other.layout_comment(n_cols, Indent::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(permalink: &str, url: &str) -> Post {
        Post {
            title: "A title".into(),
            subreddit: "python".into(),
            author: "alice".into(),
            permalink: permalink.into(),
            url: url.into(),
            ..Post::default()
        }
    }

    #[test]
    fn classifies_self_posts() {
        let data = Submission::from_post(&post(
            "/r/python/comments/abc/a_title/",
            "https://www.reddit.com/r/python/comments/abc/a_title/",
        ));
        assert_eq!(data.url_type, UrlType::SelfPost);
        assert_eq!(data.url, "self.python");
    }

    #[test]
    fn classifies_cross_posts() {
        let data = Submission::from_post(&post(
            "/r/python/comments/abc/a_title/",
            "https://np.reddit.com/r/rust/comments/def/other/",
        ));
        assert_eq!(data.url_type, UrlType::CrossPost);
        assert_eq!(data.url, "self.rust");
    }

    #[test]
    fn classifies_external_links() {
        let data = Submission::from_post(&post(
            "/r/python/comments/abc/a_title/",
            "https://example.com/article",
        ));
        assert_eq!(data.url_type, UrlType::External);
        assert_eq!(data.url, "https://example.com/article");
    }

    #[test]
    fn brackets_flair_and_marks_deleted_authors() {
        let mut raw = post("/r/a/comments/1/", "https://example.com");
        raw.link_flair_text = Some(" Discussion ".into());
        raw.author = String::new();
        let data = Submission::from_post(&raw);
        assert_eq!(data.flair.as_deref(), Some("[Discussion]"));
        assert_eq!(data.author, "[deleted]");

        raw.link_flair_text = Some("[Meta]".into());
        assert_eq!(
            Submission::from_post(&raw).flair.as_deref(),
            Some("[Meta]")
        );
    }

    #[test]
    fn comment_author_matches_submitter() {
        let comment = reddit::Comment {
            author: "alice".into(),
            body: "hi".into(),
            gilded: 2,
            ..reddit::Comment::default()
        };
        let body = CommentBody::from_comment(&comment, "alice");
        assert!(body.is_author);
        assert!(body.gold);
        assert!(!CommentBody::from_comment(&comment, "bob").is_author);
    }

    #[test]
    fn indent_caps_at_max_level() {
        let indent = Indent {
            size: 2,
            max_level: 3,
        };
        assert_eq!(indent.offset(1), 2);
        assert_eq!(indent.offset(3), 6);
        assert_eq!(indent.offset(9), 6);
    }

    #[test]
    fn comment_layout_wraps_inside_indent() {
        let comment = reddit::Comment {
            body: "aaaa bbbb cccc".into(),
            ..reddit::Comment::default()
        };
        let mut record = Record::from_node(CommentNode::Comment(comment), 2, "op");
        record.layout_comment(12, Indent::default());
        let Record::Comment(c) = &record else {
            panic!("expected comment");
        };
        assert_eq!(c.offset, 4);
        assert_eq!(c.split_body, vec!["aaaa", "bbbb", "cccc"]);
        assert_eq!(c.n_rows, 4);
    }
}
