//! Mutating actions, issued through the `gh` CLI. The argument shapes are
//! a fixed contract with that tool; nothing here reinterprets them.

use tokio::process::Command;

use crate::error::{PerchError, Result};

fn subcommand(is_pr: bool) -> &'static str {
    if is_pr {
        "pr"
    } else {
        "issue"
    }
}

async fn run(args: &[&str]) -> Result<()> {
    let output = Command::new("gh")
        .args(args)
        .output()
        .await
        .map_err(|e| PerchError::Api(format!("failed to run gh: {e}")))?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr.trim();
        Err(PerchError::Api(if detail.is_empty() {
            format!("gh exited with {}", output.status)
        } else {
            detail.to_string()
        }))
    }
}

pub async fn comment(repo: &str, number: u64, is_pr: bool, body: &str) -> Result<()> {
    run(&[
        subcommand(is_pr),
        "comment",
        &number.to_string(),
        "-R",
        repo,
        "-b",
        body,
    ])
    .await
}

pub async fn add_labels(repo: &str, number: u64, is_pr: bool, labels: &[String]) -> Result<()> {
    run(&[
        subcommand(is_pr),
        "edit",
        &number.to_string(),
        "-R",
        repo,
        "--add-label",
        &labels.join(","),
    ])
    .await
}

pub async fn assign(repo: &str, number: u64, is_pr: bool, users: &[String]) -> Result<()> {
    run(&[
        subcommand(is_pr),
        "edit",
        &number.to_string(),
        "-R",
        repo,
        "--add-assignee",
        &users.join(","),
    ])
    .await
}

pub async fn unassign(repo: &str, number: u64, is_pr: bool, users: &[String]) -> Result<()> {
    run(&[
        subcommand(is_pr),
        "edit",
        &number.to_string(),
        "-R",
        repo,
        "--remove-assignee",
        &users.join(","),
    ])
    .await
}

pub async fn close(repo: &str, number: u64, is_pr: bool) -> Result<()> {
    run(&[subcommand(is_pr), "close", &number.to_string(), "-R", repo]).await
}

pub async fn reopen(repo: &str, number: u64, is_pr: bool) -> Result<()> {
    run(&[subcommand(is_pr), "reopen", &number.to_string(), "-R", repo]).await
}
