use std::sync::Arc;

use tracing::debug;

use crate::comments::flatten;
use crate::content::{Content, Index};
use crate::data::CommentService;
use crate::error::{ContentError, Result};
use crate::loader::Loader;
use crate::record::{Header, HiddenComment, Indent, Record, Submission};
use crate::reddit::{CommentSort, MoreComments, SubmissionTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionOptions {
    pub indent_size: usize,
    pub max_indent_level: usize,
    pub order: Option<CommentSort>,
}

impl Default for SubmissionOptions {
    fn default() -> Self {
        let indent = Indent::default();
        Self {
            indent_size: indent.size,
            max_indent_level: indent.max_level,
            order: None,
        }
    }
}

enum Toggle {
    Collapse(usize),
    Expand,
    Load(Arc<MoreComments>, usize),
}

/// One submission and its flattened comment tree.
///
/// Comments are stored in display order. Collapsing and expanding subtrees
/// and loading continuation markers rewrite that order in place.
pub struct SubmissionContent {
    name: String,
    order: Option<CommentSort>,
    indent: Indent,
    service: Arc<dyn CommentService>,
    loader: Arc<Loader>,
    link_id: String,
    author: String,
    header: Header,
    comments: Vec<Record>,
}

impl SubmissionContent {
    pub fn new(
        tree: SubmissionTree,
        service: Arc<dyn CommentService>,
        loader: Arc<Loader>,
        options: SubmissionOptions,
    ) -> Self {
        let SubmissionTree { post, comments } = tree;
        let data = Submission::from_post(&post);
        let author = data.author.clone();
        let comments: Vec<Record> = flatten(comments, 0)
            .into_iter()
            .map(|item| Record::from_node(item.node, item.depth, &author))
            .collect();
        debug!(permalink = %data.permalink, comments = comments.len(), "submission loaded");

        Self {
            name: data.permalink.clone(),
            order: options.order,
            indent: Indent {
                size: options.indent_size,
                max_level: options.max_indent_level,
            },
            service,
            loader,
            link_id: post.name,
            author,
            header: Header::new(data),
            comments,
        }
    }

    /// Fetches the submission behind `url` inside a loader scope.
    pub fn from_url(
        service: Arc<dyn CommentService>,
        url: &str,
        loader: Arc<Loader>,
        options: SubmissionOptions,
    ) -> Result<Self> {
        let url = url.replace("http:", "https:");
        let tree = loader
            .run(|| service.load_submission(&url, options.order))
            .map_err(ContentError::Fetch)?;
        Ok(Self::new(tree, service, loader, options))
    }

    /// The submission permalink.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> Option<CommentSort> {
        self.order
    }

    /// Number of comment-tree records, not counting the header.
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Flips the record at `index` between its open and closed forms.
    ///
    /// A comment folds together with its replies into one hidden record, a
    /// hidden record unfolds back into what it replaced, and a continuation
    /// marker is replaced by the comments it stands for. The header is left
    /// alone. If loading a continuation fails nothing changes.
    pub fn toggle(&mut self, index: Index) -> Result<()> {
        let Index::Item(position) = index else {
            return Ok(());
        };
        let action = match self.comments.get(position) {
            None => return Err(ContentError::OutOfRange),
            Some(Record::Comment(comment)) => Toggle::Collapse(comment.depth),
            Some(Record::HiddenComment(_)) => Toggle::Expand,
            Some(Record::Continuation(more)) => Toggle::Load(more.handle.clone(), more.depth),
            Some(Record::Header(_)) => return Ok(()),
            Some(Record::Subscription(_)) => {
                panic!("subscription records cannot be toggled inside a submission")
            }
        };

        match action {
            Toggle::Collapse(depth) => self.collapse(position, depth),
            Toggle::Expand => self.expand(position),
            Toggle::Load(handle, depth) => return self.load_more(position, &handle, depth),
        }
        Ok(())
    }

    fn collapse(&mut self, position: usize, depth: usize) {
        let end = self.comments[position + 1..]
            .iter()
            .position(|record| record.depth().map_or(true, |d| d <= depth))
            .map_or(self.comments.len(), |run| position + 1 + run);

        let cache: Vec<Record> = self.comments.drain(position..end).collect();
        let count = cache.iter().map(Record::subsumed_count).sum();
        self.comments.insert(
            position,
            Record::HiddenComment(HiddenComment {
                depth,
                count,
                cache,
                n_rows: 0,
                offset: 0,
            }),
        );
    }

    fn expand(&mut self, position: usize) {
        if let Record::HiddenComment(hidden) = self.comments.remove(position) {
            self.comments.splice(position..position, hidden.cache);
        }
    }

    fn load_more(&mut self, position: usize, handle: &MoreComments, depth: usize) -> Result<()> {
        let service = &self.service;
        let link_id = &self.link_id;
        let order = self.order;
        let nodes = self
            .loader
            .run(|| service.load_more(link_id, handle, order))
            .map_err(ContentError::Fetch)?;

        let author = &self.author;
        let records: Vec<Record> = flatten(nodes, depth)
            .into_iter()
            .map(|item| Record::from_node(item.node, item.depth, author))
            .collect();
        debug!(parent = %handle.parent_id, loaded = records.len(), "continuation resolved");
        self.comments.splice(position..=position, records);
        Ok(())
    }
}

impl Content for SubmissionContent {
    fn get(&mut self, index: Index, n_cols: usize) -> Result<Record> {
        let mut record = match index {
            Index::Header => Record::Header(self.header.clone()),
            Index::Item(position) => self
                .comments
                .get(position)
                .cloned()
                .ok_or(ContentError::OutOfRange)?,
        };
        record.layout_comment(n_cols, self.indent);
        Ok(record)
    }
}
