use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Open/closed state of the viewed issue or pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectState {
    Open,
    Closed,
    Merged,
}

impl fmt::Display for SubjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectState::Open => write!(f, "Open"),
            SubjectState::Closed => write!(f, "Closed"),
            SubjectState::Merged => write!(f, "Merged"),
        }
    }
}

/// A top-level comment on an issue or pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

/// One inline review thread on a PR: a file location plus its ordered
/// comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewThread {
    pub path: String,
    pub line: u64,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewDecision {
    Pending,
    Commented,
    Approved,
    ChangesRequested,
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewDecision::Pending => write!(f, "pending"),
            ReviewDecision::Commented => write!(f, "commented"),
            ReviewDecision::Approved => write!(f, "approved"),
            ReviewDecision::ChangesRequested => write!(f, "changes requested"),
        }
    }
}

/// A whole-PR review (approve / request changes / comment).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    pub body: String,
    pub decision: ReviewDecision,
    pub updated_at: DateTime<Utc>,
}

/// Snapshot of the issue or pull request shown in the detail view.
///
/// Replaced wholesale on refresh. The only field-level mutation this
/// program performs is appending the optimistic local echo of a comment
/// the user just submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub is_pr: bool,
    pub title: String,
    pub body: Option<String>,
    pub state: SubjectState,
    pub author: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub comments: Vec<Comment>,
    pub review_threads: Vec<ReviewThread>,
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subject {
    /// "owner/repo" as used for cache keys and `gh -R`.
    pub fn repo_key(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    pub fn url(&self) -> String {
        let kind = if self.is_pr { "pull" } else { "issues" };
        format!(
            "https://github.com/{}/{}/{}/{}",
            self.owner, self.repo, kind, self.number
        )
    }

    /// Two snapshots refer to the same subject when repo and number match.
    pub fn same_identity(&self, other: &Subject) -> bool {
        self.owner == other.owner && self.repo == other.repo && self.number == other.number
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap()
    }

    pub fn comment(author: &str, body: &str, hour: u32) -> Comment {
        Comment {
            author: author.to_string(),
            body: body.to_string(),
            updated_at: ts(hour),
        }
    }

    pub fn issue(number: u64, comments: Vec<Comment>) -> Subject {
        Subject {
            owner: "o".to_string(),
            repo: "r".to_string(),
            number,
            is_pr: false,
            title: "Test issue".to_string(),
            body: Some("body".to_string()),
            state: SubjectState::Open,
            author: "author".to_string(),
            labels: vec![],
            assignees: vec![],
            comments,
            review_threads: vec![],
            reviews: vec![],
            created_at: ts(0),
            updated_at: ts(0),
        }
    }

    pub fn pr(number: u64) -> Subject {
        Subject {
            is_pr: true,
            ..issue(number, vec![])
        }
    }
}
