use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::{anyhow, bail, ensure, Context, Result};
use parking_lot::RwLock;
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::header::{HeaderMap, AUTHORIZATION, USER_AGENT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

pub const OAUTH_BASE_URL: &str = "https://oauth.reddit.com/";
pub const PUBLIC_BASE_URL: &str = "https://www.reddit.com/";

const PAGE_SIZE: u32 = 25;

pub trait TokenProvider: Send + Sync {
    /// Bearer token to send with the next request.
    fn access_token(&self) -> Result<String>;
}

/// Bearer token supplied up front, e.g. from the config file.
pub struct StaticToken {
    access_token: String,
}

impl StaticToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

impl TokenProvider for StaticToken {
    fn access_token(&self) -> Result<String> {
        Ok(self.access_token.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub user_agent: String,
    pub base_url: Option<String>,
    pub http_client: Option<HttpClient>,
}

#[derive(Debug, Clone, Default)]
pub struct ListingOptions {
    pub after: Option<String>,
    pub limit: Option<u32>,
    pub extra: Vec<(String, String)>,
}

impl ListingOptions {
    fn into_params(self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(after) = self.after {
            params.push(("after".into(), after));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".into(), limit.to_string()));
        }
        params.extend(self.extra);
        params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    #[default]
    Hot,
    Top,
    Rising,
    New,
    Controversial,
}

impl SortOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Hot => "hot",
            SortOption::Top => "top",
            SortOption::Rising => "rising",
            SortOption::New => "new",
            SortOption::Controversial => "controversial",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hot" => Some(SortOption::Hot),
            "top" => Some(SortOption::Top),
            "rising" => Some(SortOption::Rising),
            "new" => Some(SortOption::New),
            "controversial" => Some(SortOption::Controversial),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CommentSort {
    Confidence,
    Top,
    New,
    Controversial,
    Old,
    Qa,
}

impl CommentSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentSort::Confidence => "confidence",
            CommentSort::Top => "top",
            CommentSort::New => "new",
            CommentSort::Controversial => "controversial",
            CommentSort::Old => "old",
            CommentSort::Qa => "qa",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "confidence" | "best" => Some(CommentSort::Confidence),
            "top" => Some(CommentSort::Top),
            "new" => Some(CommentSort::New),
            "controversial" => Some(CommentSort::Controversial),
            "old" => Some(CommentSort::Old),
            "qa" => Some(CommentSort::Qa),
            _ => None,
        }
    }
}

pub struct Client {
    token_provider: Option<Arc<dyn TokenProvider>>,
    http: HttpClient,
    user_agent: String,
    base_url: Url,
    rate: RwLock<RateLimit>,
}

/// Quota reported by the last response's `x-ratelimit-*` headers.
#[derive(Debug, Clone, Default)]
struct RateLimit {
    used: f64,
    remaining: f64,
    reset_at: Option<SystemTime>,
}

impl RateLimit {
    /// Time left before the quota resets, while it is used up.
    fn exhausted_for(&self, now: SystemTime) -> Option<Duration> {
        if self.used == 0.0 || self.remaining > 0.0 {
            return None;
        }
        self.reset_at
            .and_then(|reset| reset.duration_since(now).ok())
            .filter(|wait| !wait.is_zero())
    }
}

impl Client {
    /// Without a token provider requests go to the public JSON endpoints.
    pub fn new(
        token_provider: Option<Arc<dyn TokenProvider>>,
        config: ClientConfig,
    ) -> Result<Self> {
        if config.user_agent.trim().is_empty() {
            bail!("reddit client user agent required");
        }
        let base = config.base_url.unwrap_or_else(|| {
            if token_provider.is_some() {
                OAUTH_BASE_URL.to_string()
            } else {
                PUBLIC_BASE_URL.to_string()
            }
        });
        let base_url = Url::parse(&base)?;
        let http = match config.http_client {
            Some(client) => client,
            None => HttpClient::builder()
                .timeout(Duration::from_secs(20))
                .build()?,
        };

        Ok(Client {
            token_provider,
            http,
            user_agent: config.user_agent,
            base_url,
            rate: RwLock::new(RateLimit::default()),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token_provider.is_some()
    }

    pub fn listing<T>(&self, path: &str, opts: ListingOptions) -> Result<Listing<T>>
    where
        T: DeserializeOwned,
    {
        let params = opts.into_params();
        let resp = self.request(Method::GET, path, &params)?;
        let listing: ListingEnvelope<T> = resp.json().context("reddit: decode listing")?;
        Ok(listing.data)
    }

    /// Lazily walks every page of a listing, one element per pull.
    pub fn paginate<T>(self: &Arc<Self>, path: &str, params: Vec<(String, String)>) -> Paginator<T>
    where
        T: DeserializeOwned,
    {
        Paginator {
            client: self.clone(),
            path: path.to_string(),
            params,
            buffer: VecDeque::new(),
            after: None,
            finished: false,
        }
    }

    pub fn me(&self) -> Result<String> {
        let resp = self.request(Method::GET, "/api/v1/me", &[])?;
        let identity: Identity = resp.json().context("reddit: decode identity")?;
        Ok(identity.name)
    }

    pub fn submission(&self, url: &str, sort: Option<CommentSort>) -> Result<SubmissionTree> {
        let path = submission_path(url)?;
        let mut params = Vec::new();
        if let Some(sort) = sort {
            params.push(("sort".to_string(), sort.as_str().to_string()));
        }
        let resp = self.request(Method::GET, &path, &params)?;
        let payload: Vec<Value> = resp.json()?;
        ensure!(
            payload.len() >= 2,
            "reddit: comments payload missing elements"
        );
        let mut payload = payload.into_iter();
        let post_listing: ListingEnvelope<Post> =
            serde_json::from_value(payload.next().unwrap_or_default())
                .context("reddit: decode post listing")?;
        let comments: CommentListingEnvelope =
            serde_json::from_value(payload.next().unwrap_or_default())
                .context("reddit: decode comment listing")?;
        let post = post_listing
            .data
            .children
            .into_iter()
            .next()
            .map(|thing| thing.data)
            .ok_or_else(|| anyhow!("reddit: post listing empty"))?;
        Ok(SubmissionTree {
            post,
            comments: comments.data.children,
        })
    }

    /// Resolves a continuation marker into the reply tree it stands for.
    pub fn more_children(
        &self,
        link_id: &str,
        more: &MoreComments,
        sort: Option<CommentSort>,
    ) -> Result<Vec<CommentNode>> {
        if more.children.is_empty() {
            return Ok(Vec::new());
        }
        let mut params = vec![
            ("api_type".to_string(), "json".to_string()),
            ("link_id".to_string(), link_id.to_string()),
            ("children".to_string(), more.children.join(",")),
        ];
        if let Some(sort) = sort {
            params.push(("sort".to_string(), sort.as_str().to_string()));
        }
        let resp = self.request(Method::GET, "/api/morechildren.json", &params)?;
        let payload: MoreChildrenResponse = resp.json().context("reddit: decode more children")?;
        if let Some(err) = payload.json.errors.first() {
            let joined = err
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            bail!("reddit: more children error: {}", joined);
        }
        let things = payload.json.data.map(|data| data.things).unwrap_or_default();
        Ok(nest_replies(things))
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Response> {
        if let Some(wait) = self.rate.read().exhausted_for(SystemTime::now()) {
            bail!("reddit: rate limit exhausted, resets in {}s", wait.as_secs().max(1));
        }

        let mut url = self.base_url.join(path)?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        debug!(%url, "reddit request");

        let mut req = self.http.request(method, url);
        req = req.header(USER_AGENT, self.user_agent.clone());
        if let Some(provider) = &self.token_provider {
            let token = provider.access_token()?;
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let resp = req.send()?;
        self.capture_rate(resp.headers());
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            match status.as_u16() {
                401 => Err(anyhow!("reddit: unauthorized")),
                403 => Err(anyhow!("reddit: forbidden")),
                404 => Err(anyhow!("reddit: not found")),
                429 => Err(anyhow!("reddit: rate limited: {}", body)),
                _ => Err(anyhow!("reddit: api error {}: {}", status, body)),
            }
        }
    }

    fn capture_rate(&self, headers: &HeaderMap) {
        let remaining = header_float(headers, "x-ratelimit-remaining");
        let used = header_float(headers, "x-ratelimit-used");
        let reset = header_float(headers, "x-ratelimit-reset");
        if remaining == 0.0 && used == 0.0 && reset == 0.0 {
            return;
        }
        debug!(remaining, used, reset, "reddit rate limit");
        let reset_at = SystemTime::now().checked_add(Duration::from_secs_f64(reset.max(0.0)));
        let mut rate = self.rate.write();
        rate.remaining = remaining;
        rate.used = used;
        rate.reset_at = reset_at;
    }
}

fn header_float(headers: &HeaderMap, key: &str) -> f64 {
    headers
        .get(key)
        .and_then(|value| value.to_str().ok())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn submission_path(url: &str) -> Result<String> {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };
    let trimmed = path.trim_end_matches('/');
    ensure!(
        trimmed.contains("/comments/"),
        "reddit: not a submission url: {url}"
    );
    Ok(format!("{trimmed}.json"))
}

/// Rebuilds a flat `morechildren` batch into a tree using parent ids.
///
/// Children always follow their parent in the batch, so walking it backwards
/// sees every child before its parent.
fn nest_replies(things: Vec<CommentNode>) -> Vec<CommentNode> {
    let parents: HashSet<String> = things
        .iter()
        .filter_map(|node| match node {
            CommentNode::Comment(comment) => Some(comment.name.clone()),
            CommentNode::More(_) => None,
        })
        .collect();

    let mut pending: HashMap<String, Vec<CommentNode>> = HashMap::new();
    let mut roots = Vec::new();
    for mut node in things.into_iter().rev() {
        if let CommentNode::Comment(comment) = &mut node {
            let mut replies = pending.remove(&comment.name).unwrap_or_default();
            replies.reverse();
            comment.replies = Some(replies);
        }
        let parent = node.parent_id().to_string();
        if parents.contains(&parent) {
            pending.entry(parent).or_default().push(node);
        } else {
            roots.push(node);
        }
    }
    roots.reverse();
    roots
}

pub struct Paginator<T> {
    client: Arc<Client>,
    path: String,
    params: Vec<(String, String)>,
    buffer: VecDeque<T>,
    after: Option<String>,
    finished: bool,
}

impl<T> Iterator for Paginator<T>
where
    T: DeserializeOwned,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.buffer.pop_front() {
            return Some(Ok(item));
        }
        if self.finished {
            return None;
        }

        let opts = ListingOptions {
            after: self.after.clone(),
            limit: Some(PAGE_SIZE),
            extra: self.params.clone(),
        };
        match self.client.listing::<T>(&self.path, opts) {
            Ok(listing) => {
                self.after = listing.after;
                if self.after.is_none() {
                    self.finished = true;
                }
                self.buffer
                    .extend(listing.children.into_iter().map(|thing| thing.data));
                match self.buffer.pop_front() {
                    Some(item) => Some(Ok(item)),
                    None => {
                        self.finished = true;
                        None
                    }
                }
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing<T> {
    pub after: Option<String>,
    pub before: Option<String>,
    pub children: Vec<Thing<T>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thing<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Post {
    pub id: String,
    pub name: String,
    pub title: String,
    pub subreddit: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub likes: Option<bool>,
    #[serde(default)]
    pub num_comments: i64,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub over_18: bool,
    #[serde(default)]
    pub gilded: i64,
    #[serde(default)]
    pub link_flair_text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SubmissionTree {
    pub post: Post,
    pub comments: Vec<CommentNode>,
}

/// One element of a reply tree: a comment or a continuation marker.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum CommentNode {
    #[serde(rename = "t1")]
    Comment(Comment),
    #[serde(rename = "more")]
    More(MoreComments),
}

impl CommentNode {
    pub fn parent_id(&self) -> &str {
        match self {
            CommentNode::Comment(comment) => &comment.parent_id,
            CommentNode::More(more) => &more.parent_id,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Comment {
    pub id: String,
    pub name: String,
    pub body: String,
    pub author: String,
    pub score: i64,
    pub likes: Option<bool>,
    pub created_utc: f64,
    pub author_flair_text: Option<String>,
    pub permalink: String,
    pub gilded: i64,
    pub parent_id: String,
    /// `None` when the payload carried no reply field at all, which is not the
    /// same as an empty reply list.
    pub replies: Option<Vec<CommentNode>>,
}

impl<'de> Deserialize<'de> for Comment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct CommentHelper {
            id: String,
            name: String,
            #[serde(default)]
            body: String,
            #[serde(default)]
            author: String,
            #[serde(default)]
            score: i64,
            #[serde(default)]
            likes: Option<bool>,
            #[serde(default)]
            created_utc: f64,
            #[serde(default)]
            author_flair_text: Option<String>,
            #[serde(default)]
            permalink: String,
            #[serde(default)]
            gilded: i64,
            #[serde(default)]
            parent_id: String,
            #[serde(default)]
            replies: Option<Value>,
        }

        let helper = CommentHelper::deserialize(deserializer)?;
        let replies = match helper.replies {
            None | Some(Value::Null) => None,
            Some(Value::String(_)) => Some(Vec::new()),
            Some(value) => Some(
                serde_json::from_value::<CommentListingEnvelope>(value)
                    .map(|listing| listing.data.children)
                    .map_err(<D::Error as serde::de::Error>::custom)?,
            ),
        };
        Ok(Comment {
            id: helper.id,
            name: helper.name,
            body: helper.body,
            author: helper.author,
            score: helper.score,
            likes: helper.likes,
            created_utc: helper.created_utc,
            author_flair_text: helper.author_flair_text,
            permalink: helper.permalink,
            gilded: helper.gilded,
            parent_id: helper.parent_id,
            replies,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MoreComments {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Subreddit {
    #[serde(default)]
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subscribers: i64,
    #[serde(default, rename = "over18")]
    pub over_18: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ListingEnvelope<T> {
    kind: String,
    data: Listing<T>,
}

#[derive(Debug, Clone, Deserialize)]
struct CommentListingEnvelope {
    data: CommentListing,
}

#[derive(Debug, Clone, Deserialize)]
struct CommentListing {
    #[serde(default)]
    children: Vec<CommentNode>,
}

#[derive(Debug, Clone, Deserialize)]
struct Identity {
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct MoreChildrenResponse {
    json: MoreChildrenBody,
}

#[derive(Debug, Clone, Deserialize)]
struct MoreChildrenBody {
    #[serde(default)]
    errors: Vec<Vec<Value>>,
    #[serde(default)]
    data: Option<MoreChildrenData>,
}

#[derive(Debug, Clone, Deserialize)]
struct MoreChildrenData {
    #[serde(default)]
    things: Vec<CommentNode>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(nodes: &[CommentNode]) -> Vec<String> {
        nodes
            .iter()
            .map(|node| match node {
                CommentNode::Comment(comment) => comment.name.clone(),
                CommentNode::More(more) => format!("more:{}", more.count),
            })
            .collect()
    }

    #[test]
    fn decodes_reply_tree_with_markers() {
        let payload = json!({
            "kind": "Listing",
            "data": {
                "children": [
                    {"kind": "t1", "data": {
                        "id": "a", "name": "t1_a", "body": "first", "author": "alice",
                        "parent_id": "t3_x",
                        "replies": {"kind": "Listing", "data": {"children": [
                            {"kind": "t1", "data": {"id": "b", "name": "t1_b", "body": "reply",
                                "parent_id": "t1_a", "replies": ""}},
                            {"kind": "more", "data": {"id": "c", "name": "t1_c", "count": 4,
                                "parent_id": "t1_a", "children": ["c", "d"]}}
                        ]}}
                    }},
                    {"kind": "t1", "data": {"id": "e", "name": "t1_e", "body": "bare"}}
                ]
            }
        });
        let listing: CommentListingEnvelope = serde_json::from_value(payload).unwrap();
        let roots = listing.data.children;
        assert_eq!(names(&roots), vec!["t1_a", "t1_e"]);

        let CommentNode::Comment(first) = &roots[0] else {
            panic!("expected comment");
        };
        let replies = first.replies.as_ref().unwrap();
        assert_eq!(names(replies), vec!["t1_b", "more:4"]);
        let CommentNode::Comment(reply) = &replies[0] else {
            panic!("expected comment");
        };
        assert_eq!(reply.replies.as_ref().map(Vec::len), Some(0));

        let CommentNode::Comment(bare) = &roots[1] else {
            panic!("expected comment");
        };
        assert!(bare.replies.is_none());
    }

    #[test]
    fn nests_more_children_batch_by_parent() {
        let things: Vec<CommentNode> = serde_json::from_value(json!([
            {"kind": "t1", "data": {"id": "a", "name": "t1_a", "parent_id": "t1_root", "replies": ""}},
            {"kind": "t1", "data": {"id": "b", "name": "t1_b", "parent_id": "t1_a", "replies": ""}},
            {"kind": "t1", "data": {"id": "c", "name": "t1_c", "parent_id": "t1_b", "replies": ""}},
            {"kind": "t1", "data": {"id": "d", "name": "t1_d", "parent_id": "t1_a", "replies": ""}},
            {"kind": "more", "data": {"name": "t1_m", "count": 2, "parent_id": "t1_root"}},
            {"kind": "t1", "data": {"id": "e", "name": "t1_e", "parent_id": "t1_root", "replies": ""}}
        ]))
        .unwrap();

        let roots = nest_replies(things);
        assert_eq!(names(&roots), vec!["t1_a", "more:2", "t1_e"]);
        let CommentNode::Comment(a) = &roots[0] else {
            panic!("expected comment");
        };
        let a_replies = a.replies.as_ref().unwrap();
        assert_eq!(names(a_replies), vec!["t1_b", "t1_d"]);
        let CommentNode::Comment(b) = &a_replies[0] else {
            panic!("expected comment");
        };
        assert_eq!(names(b.replies.as_ref().unwrap()), vec!["t1_c"]);
    }

    #[test]
    fn submission_path_accepts_urls_and_permalinks() {
        assert_eq!(
            submission_path("https://www.reddit.com/r/Python/comments/2xmo63/a_title/").unwrap(),
            "/r/Python/comments/2xmo63/a_title.json"
        );
        assert_eq!(
            submission_path("/r/rust/comments/abc/").unwrap(),
            "/r/rust/comments/abc.json"
        );
        assert!(submission_path("https://www.reddit.com/r/rust").is_err());
    }

    #[test]
    fn sort_options_round_trip_names() {
        for sort in [
            SortOption::Hot,
            SortOption::Top,
            SortOption::Rising,
            SortOption::New,
            SortOption::Controversial,
        ] {
            assert_eq!(SortOption::parse(sort.as_str()), Some(sort));
        }
        assert_eq!(SortOption::parse("best"), None);
        assert_eq!(CommentSort::parse("best"), Some(CommentSort::Confidence));
    }

    #[test]
    fn undecodable_replies_fail_the_comment() {
        let result = serde_json::from_value::<CommentNode>(json!({
            "kind": "t1",
            "data": {"id": "a", "name": "t1_a", "replies": {"kind": "Listing", "data": {"children": 7}}}
        }));
        assert!(result.is_err());
    }

    fn rate_headers(remaining: &str, used: &str, reset: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", remaining.parse().unwrap());
        headers.insert("x-ratelimit-used", used.parse().unwrap());
        headers.insert("x-ratelimit-reset", reset.parse().unwrap());
        headers
    }

    fn test_client(base_url: &str) -> Client {
        Client::new(
            None,
            ClientConfig {
                user_agent: "rtv-test/0.1".into(),
                base_url: Some(base_url.into()),
                ..ClientConfig::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn exhausted_quota_refuses_requests_until_reset() {
        // Unroutable port: the call must fail before any connection attempt.
        let client = test_client("http://127.0.0.1:9/");
        client.capture_rate(&rate_headers("0", "600", "120"));
        let err = client.me().unwrap_err();
        assert!(err.to_string().contains("rate limit exhausted"), "{err:#}");

        let now = SystemTime::now();
        assert!(client.rate.read().exhausted_for(now).is_some());
        assert!(client
            .rate
            .read()
            .exhausted_for(now + Duration::from_secs(121))
            .is_none());
    }

    #[test]
    fn remaining_quota_allows_requests() {
        let client = test_client("http://127.0.0.1:9/");
        client.capture_rate(&rate_headers("42", "558", "120"));
        assert!(client.rate.read().exhausted_for(SystemTime::now()).is_none());

        client.capture_rate(&HeaderMap::new());
        assert_eq!(client.rate.read().remaining, 42.0);
    }

    #[test]
    fn client_requires_user_agent() {
        assert!(Client::new(None, ClientConfig::default()).is_err());
        let client = Client::new(
            None,
            ClientConfig {
                user_agent: "rtv-test/0.1".into(),
                ..ClientConfig::default()
            },
        )
        .unwrap();
        assert!(!client.is_authenticated());
    }
}
