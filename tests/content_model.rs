use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use rtv::data::{CommentService, FeedService, Stream};
use rtv::loader::Loader;
use rtv::record::Record;
use rtv::reddit::{Comment, CommentNode, CommentSort, MoreComments, Post, SortOption, SubmissionTree};
use rtv::submission::SubmissionOptions;
use rtv::{Content, ContentError, Index, SubmissionContent, SubredditContent};

fn post(title: &str) -> Post {
    Post {
        name: format!("t3_{title}"),
        title: title.into(),
        author: "op".into(),
        subreddit: "rust".into(),
        permalink: format!("/r/rust/comments/{title}/"),
        url: format!("https://www.reddit.com/r/rust/comments/{title}/"),
        ..Post::default()
    }
}

fn reply(name: &str, replies: Vec<CommentNode>) -> CommentNode {
    CommentNode::Comment(Comment {
        name: name.into(),
        author: "someone".into(),
        body: name.into(),
        replies: Some(replies),
        ..Comment::default()
    })
}

struct Thread;

impl CommentService for Thread {
    fn load_submission(&self, _url: &str, _order: Option<CommentSort>) -> Result<SubmissionTree> {
        Ok(SubmissionTree {
            post: post("thread"),
            comments: vec![
                reply("c1", vec![]),
                reply("c2", vec![reply("c2a", vec![]), reply("c2b", vec![])]),
                reply("c3", vec![]),
                CommentNode::More(MoreComments {
                    count: 0,
                    ..MoreComments::default()
                }),
            ],
        })
    }

    fn load_more(
        &self,
        _link_id: &str,
        _more: &MoreComments,
        _order: Option<CommentSort>,
    ) -> Result<Vec<CommentNode>> {
        Err(anyhow!("not expected"))
    }
}

fn depths(content: &mut SubmissionContent) -> Vec<usize> {
    content
        .iterate(Index::Item(0), 1, 70)
        .map(|record| record.unwrap().depth().unwrap())
        .collect()
}

#[test]
fn submission_walkthrough() {
    let mut content = SubmissionContent::from_url(
        Arc::new(Thread),
        "http://www.reddit.com/r/rust/comments/thread/",
        Arc::new(Loader::silent()),
        SubmissionOptions::default(),
    )
    .unwrap();

    assert_eq!(depths(&mut content), vec![0, 0, 1, 1, 0]);
    assert_eq!(content.iterate(Index::Header, -1, 70).count(), 0);

    content.toggle(Index::Item(1)).unwrap();
    match content.get(Index::Item(1), 70).unwrap() {
        Record::HiddenComment(hidden) => assert_eq!(hidden.count, 3),
        other => panic!("expected hidden comment, got {}", other.kind()),
    }
    assert_eq!(depths(&mut content), vec![0, 0, 0]);

    content.toggle(Index::Item(1)).unwrap();
    assert_eq!(depths(&mut content), vec![0, 0, 1, 1, 0]);
}

struct Feed {
    pulls: Arc<AtomicUsize>,
}

impl FeedService for Feed {
    fn front_page(&self, _order: Option<SortOption>) -> Result<Stream<Post>> {
        let pulls = self.pulls.clone();
        Ok(Box::new((0..5).map(move |n| {
            pulls.fetch_add(1, Ordering::SeqCst);
            if n == 3 {
                Err(anyhow!("connection reset"))
            } else {
                Ok(post(&format!("p{n}")))
            }
        })))
    }

    fn subreddit(&self, _name: &str, order: Option<SortOption>) -> Result<Stream<Post>> {
        self.front_page(order)
    }

    fn search(
        &self,
        _query: &str,
        _subreddit: Option<&str>,
        order: Option<SortOption>,
    ) -> Result<Stream<Post>> {
        self.front_page(order)
    }

    fn user_submitted(&self, order: Option<SortOption>) -> Result<Stream<Post>> {
        self.front_page(order)
    }

    fn is_authenticated(&self) -> bool {
        false
    }
}

#[test]
fn listing_stops_after_a_failed_pull() {
    let pulls = Arc::new(AtomicUsize::new(0));
    let loader = Arc::new(Loader::silent());
    let mut content = SubredditContent::from_name(
        Arc::new(Feed {
            pulls: pulls.clone(),
        }),
        "front",
        loader.clone(),
        None,
        None,
    )
    .unwrap();
    assert_eq!(content.name(), "/r/front");

    for index in 0..3 {
        content.get(Index::Item(index), 70).unwrap();
    }
    let err = content.get(Index::Item(3), 70).unwrap_err();
    assert!(matches!(err, ContentError::Fetch(_)));
    assert_eq!(loader.exception().as_deref(), Some("connection reset"));
    assert_eq!(content.len(), 3);

    assert!(content.get(Index::Item(3), 70).unwrap_err().is_out_of_range());
    assert_eq!(pulls.load(Ordering::SeqCst), 4);

    content.refresh().unwrap();
    assert_eq!(content.len(), 1);
}
