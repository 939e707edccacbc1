use std::sync::Arc;

use tracing::debug;

use crate::content::{Content, Index, DEFAULT_COLS};
use crate::data::{FeedService, Stream, SubscriptionService};
use crate::error::{ContentError, Result};
use crate::loader::Loader;
use crate::record::{Header, Record, Submission, Subscription};
use crate::reddit::{Post, SortOption, Subreddit};

type Opener<T> = Box<dyn Fn() -> anyhow::Result<Stream<T>> + Send + Sync>;

/// Upstream element that can be projected into a listing row.
pub trait ListingItem: Send + 'static {
    /// Projects the element found at `index` of its listing.
    fn into_record(self, index: usize) -> Record;

    /// Error reported when a listing of this kind turns out to be empty.
    fn empty_error(name: &str) -> ContentError;
}

impl ListingItem for Post {
    fn into_record(self, index: usize) -> Record {
        let mut data = Submission::from_post(&self);
        data.index = Some(index);
        data.title = format!("{}. {}", index + 1, data.title);
        Record::Header(Header::new(data))
    }

    fn empty_error(name: &str) -> ContentError {
        ContentError::Subreddit(name.to_string())
    }
}

impl ListingItem for Subreddit {
    fn into_record(self, _index: usize) -> Record {
        Record::Subscription(Subscription::from_subreddit(&self))
    }

    fn empty_error(_name: &str) -> ContentError {
        ContentError::Subscription
    }
}

/// Append-only cache over a paginated upstream listing.
///
/// Elements are pulled one at a time, each inside a loader scope, only when
/// an index past the end of the cache is requested. Once the upstream is
/// exhausted or a pull fails, everything at or past the end reports
/// [`ContentError::OutOfRange`] until [`ListingContent::refresh`].
pub struct ListingContent<T> {
    name: String,
    order: Option<SortOption>,
    opener: Opener<T>,
    loader: Arc<Loader>,
    stream: Option<Stream<T>>,
    records: Vec<Record>,
    exhausted: bool,
}

pub type SubredditContent = ListingContent<Post>;
pub type SubscriptionContent = ListingContent<Subreddit>;

impl<T: ListingItem> ListingContent<T> {
    /// Builds the listing and fetches its first element so an empty or
    /// unreachable source is reported up front.
    pub fn new<F>(
        name: impl Into<String>,
        order: Option<SortOption>,
        opener: F,
        loader: Arc<Loader>,
    ) -> Result<Self>
    where
        F: Fn() -> anyhow::Result<Stream<T>> + Send + Sync + 'static,
    {
        let mut content = Self {
            name: name.into(),
            order,
            opener: Box::new(opener),
            loader,
            stream: None,
            records: Vec::new(),
            exhausted: false,
        };
        content.ensure_first()?;
        Ok(content)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> Option<SortOption> {
        self.order
    }

    /// Number of elements fetched so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops everything fetched so far and starts over from the first element.
    pub fn refresh(&mut self) -> Result<()> {
        debug!(name = %self.name, cached = self.records.len(), "refreshing listing");
        self.records.clear();
        self.stream = None;
        self.exhausted = false;
        self.ensure_first()
    }

    fn ensure_first(&mut self) -> Result<()> {
        match self.get(Index::Item(0), DEFAULT_COLS) {
            Ok(_) => Ok(()),
            Err(ContentError::OutOfRange) => Err(T::empty_error(&self.name)),
            Err(err) => Err(err),
        }
    }

    fn pull(&mut self) -> Result<()> {
        let opener = &self.opener;
        let stream = &mut self.stream;
        let pulled = self.loader.run(|| {
            if stream.is_none() {
                *stream = Some(opener()?);
            }
            match stream.as_mut() {
                Some(upstream) => upstream.next().transpose(),
                None => Ok(None),
            }
        });

        match pulled {
            Ok(Some(item)) => {
                let index = self.records.len();
                self.records.push(item.into_record(index));
                Ok(())
            }
            Ok(None) => {
                debug!(name = %self.name, len = self.records.len(), "listing exhausted");
                self.exhausted = true;
                Err(ContentError::OutOfRange)
            }
            Err(err) => {
                debug!(name = %self.name, len = self.records.len(), "listing stopped after failed pull");
                self.exhausted = true;
                Err(ContentError::Fetch(err))
            }
        }
    }
}

impl<T: ListingItem> Content for ListingContent<T> {
    fn get(&mut self, index: Index, n_cols: usize) -> Result<Record> {
        let Index::Item(position) = index else {
            return Err(ContentError::OutOfRange);
        };
        while position >= self.records.len() {
            if self.exhausted {
                return Err(ContentError::OutOfRange);
            }
            self.pull()?;
        }

        let mut record = self.records[position].clone();
        record.layout_listing(n_cols);
        Ok(record)
    }
}

impl SubredditContent {
    /// Opens a subreddit listing from a user-typed name such as `python`,
    /// `/r/python/new`, `front` or `me`.
    ///
    /// An explicit `order` wins over one embedded in the name. With a `query`
    /// the listing is a search, restricted to the subreddit unless the name
    /// is `front`.
    pub fn from_name(
        service: Arc<dyn FeedService>,
        name: &str,
        loader: Arc<Loader>,
        order: Option<&str>,
        query: Option<&str>,
    ) -> Result<Self> {
        let mut name = name.trim_matches(&[' ', '/'][..]);
        if let Some(stripped) = name.strip_prefix("r/") {
            name = stripped;
        }

        let mut order = order.map(str::to_string);
        if let Some((base, embedded)) = name.split_once('/') {
            name = base;
            if order.is_none() {
                order = Some(embedded.to_string());
            }
        }
        let order = match order.as_deref() {
            None => None,
            Some(value) => Some(
                SortOption::parse(value)
                    .ok_or_else(|| ContentError::UnrecognizedOrder(value.to_string()))?,
            ),
        };

        let display_name = format!("/r/{name}");
        let name = name.to_string();
        let query = query.map(str::to_string);

        if name == "me" {
            if !service.is_authenticated() {
                return Err(ContentError::Account);
            }
            return Self::new(
                display_name,
                order,
                move || service.user_submitted(order),
                loader,
            );
        }

        if let Some(query) = query {
            let subreddit = (name != "front").then_some(name);
            return Self::new(
                display_name,
                order,
                move || service.search(&query, subreddit.as_deref(), order),
                loader,
            );
        }

        if name == "front" {
            Self::new(display_name, order, move || service.front_page(order), loader)
        } else {
            Self::new(
                display_name,
                order,
                move || service.subreddit(&name, order),
                loader,
            )
        }
    }
}

impl SubscriptionContent {
    pub fn from_user(service: Arc<dyn SubscriptionService>, loader: Arc<Loader>) -> Result<Self> {
        Self::new(
            "Subscriptions",
            None,
            move || service.subscriptions(),
            loader,
        )
    }
}
