use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::models::IssueState as OctoIssueState;
use octocrab::Octocrab;
use serde_json::Value;

use crate::error::{PerchError, Result};
use crate::types::{Comment, Review, ReviewDecision, ReviewThread, Subject, SubjectState};

/// Read-side collaborator: everything the detail view fetches. Mutations
/// go through the `gh` CLI instead (see `crate::gh`).
#[async_trait]
pub trait Backend: Send + Sync + std::fmt::Debug {
    async fn get_current_user(&self) -> Result<String>;
    async fn get_issue(&self, owner: &str, repo: &str, number: u64) -> Result<Subject>;
    async fn get_pr(&self, owner: &str, repo: &str, number: u64) -> Result<Subject>;
    async fn list_labels(&self, owner: &str, repo: &str) -> Result<Vec<String>>;
}

pub struct GitHub {
    client: Octocrab,
}

impl std::fmt::Debug for GitHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHub").finish_non_exhaustive()
    }
}

impl From<octocrab::Error> for PerchError {
    fn from(err: octocrab::Error) -> Self {
        PerchError::Api(err.to_string())
    }
}

impl GitHub {
    pub fn new(token: String) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token)
            .build()
            .map_err(|e| PerchError::Auth(e.to_string()))?;

        Ok(Self { client })
    }

    /// Top-level conversation comments; the same endpoint serves issues
    /// and PRs.
    async fn list_comments(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<Comment>> {
        let url = format!("/repos/{}/{}/issues/{}/comments?per_page=100", owner, repo, number);
        let response: Value = self.client.get(&url, None::<&()>).await?;
        Ok(response
            .as_array()
            .map(|comments| comments.iter().filter_map(parse_comment).collect())
            .unwrap_or_default())
    }

    /// Inline review comments grouped into per-location threads.
    async fn list_review_threads(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ReviewThread>> {
        let url = format!("/repos/{}/{}/pulls/{}/comments?per_page=100", owner, repo, number);
        let response: Value = self.client.get(&url, None::<&()>).await?;

        let mut threads: Vec<ReviewThread> = Vec::new();
        for raw in response.as_array().into_iter().flatten() {
            let Some(comment) = parse_comment(raw) else {
                continue;
            };
            let path = raw
                .get("path")
                .and_then(|p| p.as_str())
                .unwrap_or_default()
                .to_string();
            let line = raw
                .get("line")
                .or_else(|| raw.get("original_line"))
                .and_then(|l| l.as_u64())
                .unwrap_or(0);

            match threads.iter_mut().find(|t| t.path == path && t.line == line) {
                Some(thread) => thread.comments.push(comment),
                None => threads.push(ReviewThread {
                    path,
                    line,
                    comments: vec![comment],
                }),
            }
        }
        Ok(threads)
    }

    async fn list_reviews(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<Review>> {
        let url = format!("/repos/{}/{}/pulls/{}/reviews?per_page=100", owner, repo, number);
        let response: Value = self.client.get(&url, None::<&()>).await?;

        Ok(response
            .as_array()
            .map(|reviews| {
                reviews
                    .iter()
                    .map(|raw| Review {
                        author: login_of(raw.get("user")),
                        body: raw
                            .get("body")
                            .and_then(|b| b.as_str())
                            .unwrap_or_default()
                            .to_string(),
                        decision: match raw.get("state").and_then(|s| s.as_str()) {
                            Some("PENDING") => ReviewDecision::Pending,
                            Some("APPROVED") => ReviewDecision::Approved,
                            Some("CHANGES_REQUESTED") => ReviewDecision::ChangesRequested,
                            _ => ReviewDecision::Commented,
                        },
                        updated_at: time_of(raw.get("submitted_at")),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

fn login_of(user: Option<&Value>) -> String {
    user.and_then(|u| u.get("login"))
        .and_then(|l| l.as_str())
        .unwrap_or("unknown")
        .to_string()
}

fn time_of(value: Option<&Value>) -> DateTime<Utc> {
    value
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

fn parse_comment(raw: &Value) -> Option<Comment> {
    let body = raw.get("body")?.as_str()?.to_string();
    Some(Comment {
        author: login_of(raw.get("user")),
        body,
        updated_at: time_of(raw.get("updated_at").or_else(|| raw.get("created_at"))),
    })
}

#[async_trait]
impl Backend for GitHub {
    async fn get_current_user(&self) -> Result<String> {
        let user = self.client.current().user().await?;
        Ok(user.login)
    }

    async fn get_issue(&self, owner: &str, repo: &str, number: u64) -> Result<Subject> {
        let issue = self.client.issues(owner, repo).get(number).await?;
        let comments = self.list_comments(owner, repo, number).await?;

        Ok(Subject {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            is_pr: false,
            title: issue.title,
            body: issue.body,
            state: match issue.state {
                OctoIssueState::Closed => SubjectState::Closed,
                _ => SubjectState::Open,
            },
            author: issue.user.login,
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            assignees: issue.assignees.into_iter().map(|a| a.login).collect(),
            comments,
            review_threads: vec![],
            reviews: vec![],
            created_at: issue.created_at,
            updated_at: issue.updated_at,
        })
    }

    async fn get_pr(&self, owner: &str, repo: &str, number: u64) -> Result<Subject> {
        let pr = self.client.pulls(owner, repo).get(number).await?;
        let comments = self.list_comments(owner, repo, number).await?;
        let review_threads = self.list_review_threads(owner, repo, number).await?;
        let reviews = self.list_reviews(owner, repo, number).await?;

        let state = match pr.merged_at {
            Some(_) => SubjectState::Merged,
            None => match pr.state {
                Some(OctoIssueState::Closed) => SubjectState::Closed,
                _ => SubjectState::Open,
            },
        };

        Ok(Subject {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            is_pr: true,
            title: pr.title.unwrap_or_default(),
            body: pr.body,
            state,
            author: pr
                .user
                .map(|u| u.login)
                .unwrap_or_else(|| "unknown".to_string()),
            labels: pr
                .labels
                .unwrap_or_default()
                .into_iter()
                .map(|l| l.name)
                .collect(),
            assignees: pr
                .assignees
                .unwrap_or_default()
                .into_iter()
                .map(|a| a.login)
                .collect(),
            comments,
            review_threads,
            reviews,
            created_at: pr.created_at.unwrap_or_else(Utc::now),
            updated_at: pr.updated_at.unwrap_or_else(Utc::now),
        })
    }

    async fn list_labels(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        let url = format!("/repos/{}/{}/labels?per_page=100", owner, repo);
        let response: Value = self.client.get(&url, None::<&()>).await?;
        Ok(response
            .as_array()
            .map(|labels| {
                labels
                    .iter()
                    .filter_map(|l| l.get("name").and_then(|n| n.as_str()))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }
}
