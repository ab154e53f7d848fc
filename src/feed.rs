use chrono::{DateTime, Utc};

use crate::types::{ReviewDecision, Subject};

/// An index-bearing comment in the activity feed: a top-level comment, or
/// for PRs an inline review-thread comment carrying its file location.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedComment {
    pub author: String,
    pub body: String,
    pub updated_at: DateTime<Utc>,
    pub location: Option<(String, u64)>,
}

#[derive(Debug, Clone)]
pub enum FeedKind {
    Comment(FeedComment),
    Review {
        author: String,
        body: String,
        decision: ReviewDecision,
    },
}

/// One entry of the merged activity feed. `nav_index` is `Some` for
/// exactly the index-bearing subset, contiguous from zero in
/// ascending-timestamp order.
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub updated_at: DateTime<Utc>,
    pub nav_index: Option<usize>,
    pub kind: FeedKind,
}

/// All index-bearing comments of a subject in navigation order: top-level
/// comments plus, for PRs, every inline review-thread comment, stable-sorted
/// ascending by update time. Position in the returned vec is the
/// navigation index.
pub fn comments(subject: &Subject) -> Vec<FeedComment> {
    let mut out: Vec<FeedComment> = Vec::new();

    if subject.is_pr {
        for thread in &subject.review_threads {
            for c in &thread.comments {
                out.push(FeedComment {
                    author: c.author.clone(),
                    body: c.body.clone(),
                    updated_at: c.updated_at,
                    location: Some((thread.path.clone(), thread.line)),
                });
            }
        }
    }

    for c in &subject.comments {
        out.push(FeedComment {
            author: c.author.clone(),
            body: c.body.clone(),
            updated_at: c.updated_at,
            location: None,
        });
    }

    out.sort_by_key(|c| c.updated_at);
    out
}

/// The full display sequence: indexed comments merged chronologically with
/// unindexed whole-PR reviews. Reviews interleave at their timestamp but
/// never consume a navigation index.
pub fn assemble(subject: &Subject) -> Vec<FeedItem> {
    let mut items: Vec<FeedItem> = comments(subject)
        .into_iter()
        .enumerate()
        .map(|(i, c)| FeedItem {
            updated_at: c.updated_at,
            nav_index: Some(i),
            kind: FeedKind::Comment(c),
        })
        .collect();

    if subject.is_pr {
        for review in &subject.reviews {
            items.push(FeedItem {
                updated_at: review.updated_at,
                nav_index: None,
                kind: FeedKind::Review {
                    author: review.author.clone(),
                    body: review.body.clone(),
                    decision: review.decision,
                },
            });
        }
    }

    items.sort_by_key(|i| i.updated_at);
    items
}

/// Number of index-bearing items for a subject.
pub fn nav_len(subject: &Subject) -> usize {
    let inline = if subject.is_pr {
        subject
            .review_threads
            .iter()
            .map(|t| t.comments.len())
            .sum()
    } else {
        0
    };
    subject.comments.len() + inline
}
