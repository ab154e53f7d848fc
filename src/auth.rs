use std::process::Command;

use crate::error::{PerchError, Result};

/// Try to capture a token from a CLI command's stdout.
fn try_cli_token(command: &str) -> Option<String> {
    let output = Command::new("sh").args(["-c", command]).output().ok()?;

    if output.status.success() {
        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !token.is_empty() {
            return Some(token);
        }
    }
    None
}

/// Resolve a GitHub token: GITHUB_TOKEN, then `gh auth token`. Mutations
/// already require a logged-in `gh`, so its stored credentials are the
/// natural fallback for the read side too.
pub fn load_token() -> Result<String> {
    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        if !token.is_empty() {
            return Ok(token);
        }
    }

    if let Some(token) = try_cli_token("gh auth token") {
        return Ok(token);
    }

    Err(PerchError::Auth(
        "no GitHub token found; set GITHUB_TOKEN or run `gh auth login`".to_string(),
    ))
}
