use std::collections::VecDeque;

use tracing::debug;

use crate::reddit::{Comment, CommentNode};

/// A reply-tree node with its nesting depth.
#[derive(Debug, Clone)]
pub struct Flattened {
    pub node: CommentNode,
    pub depth: usize,
}

/// Flattens a reply tree into preorder, tagging each node with its depth.
///
/// Roots sit at `root_depth` and every child one level below its parent.
/// Continuation markers that claim zero remaining comments are dropped.
pub fn flatten(roots: Vec<CommentNode>, root_depth: usize) -> Vec<Flattened> {
    let mut work: VecDeque<Flattened> = roots
        .into_iter()
        .map(|node| Flattened {
            node,
            depth: root_depth,
        })
        .collect();

    let mut out = Vec::with_capacity(work.len());
    while let Some(mut item) = work.pop_front() {
        match &mut item.node {
            CommentNode::More(more) => {
                if more.count == 0 {
                    debug!(parent = %more.parent_id, "dropping empty continuation marker");
                    continue;
                }
            }
            CommentNode::Comment(comment) => {
                if comment.replies.is_none() {
                    adopt_orphan(comment, &mut work);
                }
                let children = comment.replies.replace(Vec::new()).unwrap_or_default();
                let depth = item.depth + 1;
                for node in children.into_iter().rev() {
                    work.push_front(Flattened { node, depth });
                }
            }
        }
        out.push(item);
    }
    out
}

/// Compatibility shim for payloads where a comment arrives with no reply field
/// and the continuation marker for its replies was emitted as the following
/// sibling instead. The next pending node becomes the comment's only child.
fn adopt_orphan(comment: &mut Comment, work: &mut VecDeque<Flattened>) {
    let adopted = work.pop_front().map(|item| item.node);
    if adopted.is_some() {
        debug!(comment = %comment.name, "reattaching orphaned sibling as reply");
    }
    comment.replies = Some(adopted.into_iter().collect());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reddit::MoreComments;

    fn comment(name: &str, replies: Vec<CommentNode>) -> CommentNode {
        CommentNode::Comment(Comment {
            name: name.into(),
            body: name.into(),
            replies: Some(replies),
            ..Comment::default()
        })
    }

    fn unset(name: &str) -> CommentNode {
        CommentNode::Comment(Comment {
            name: name.into(),
            replies: None,
            ..Comment::default()
        })
    }

    fn more(count: usize) -> CommentNode {
        CommentNode::More(MoreComments {
            count,
            ..MoreComments::default()
        })
    }

    fn shape(flat: &[Flattened]) -> Vec<(String, usize)> {
        flat.iter()
            .map(|item| {
                let label = match &item.node {
                    CommentNode::Comment(c) => c.name.clone(),
                    CommentNode::More(m) => format!("more:{}", m.count),
                };
                (label, item.depth)
            })
            .collect()
    }

    fn expected(items: &[(&str, usize)]) -> Vec<(String, usize)> {
        items.iter().map(|(n, d)| (n.to_string(), *d)).collect()
    }

    #[test]
    fn flattens_in_preorder_with_depths() {
        let roots = vec![
            comment("c1", vec![]),
            comment("c2", vec![comment("c2a", vec![]), comment("c2b", vec![])]),
            comment("c3", vec![]),
        ];
        assert_eq!(
            shape(&flatten(roots, 0)),
            expected(&[("c1", 0), ("c2", 0), ("c2a", 1), ("c2b", 1), ("c3", 0)])
        );
    }

    #[test]
    fn deep_chains_keep_sibling_order() {
        let roots = vec![
            comment(
                "a",
                vec![comment("a1", vec![comment("a1x", vec![])]), comment("a2", vec![])],
            ),
            comment("b", vec![]),
        ];
        assert_eq!(
            shape(&flatten(roots, 0)),
            expected(&[("a", 0), ("a1", 1), ("a1x", 2), ("a2", 1), ("b", 0)])
        );
    }

    #[test]
    fn starts_at_given_root_depth() {
        let roots = vec![comment("x", vec![comment("y", vec![])]), more(3)];
        assert_eq!(
            shape(&flatten(roots, 4)),
            expected(&[("x", 4), ("y", 5), ("more:3", 4)])
        );
    }

    #[test]
    fn drops_empty_continuation_markers() {
        let roots = vec![comment("c1", vec![more(0)]), more(0), more(2)];
        assert_eq!(
            shape(&flatten(roots, 0)),
            expected(&[("c1", 0), ("more:2", 0)])
        );
    }

    #[test]
    fn orphaned_marker_becomes_child_of_previous_comment() {
        let roots = vec![unset("c1"), more(5), comment("c2", vec![])];
        assert_eq!(
            shape(&flatten(roots, 0)),
            expected(&[("c1", 0), ("more:5", 1), ("c2", 0)])
        );
    }

    #[test]
    fn orphan_repair_with_nothing_left_is_a_no_op() {
        let roots = vec![comment("c1", vec![]), unset("c2")];
        assert_eq!(
            shape(&flatten(roots, 0)),
            expected(&[("c1", 0), ("c2", 0)])
        );
    }
}
