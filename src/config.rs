use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// "owner/repo" used when the CLI omits the repository argument.
    pub default_repo: Option<String>,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("perch").join("config.toml"))
}

impl Config {
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        toml::from_str::<Config>(&content).unwrap_or_default()
    }
}

/// Figure out "owner/repo" from the current checkout's origin remote.
pub fn detect_repo() -> Option<String> {
    let output = std::process::Command::new("git")
        .args(["remote", "get-url", "origin"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    extract_repo(&url)
}

/// Extract "owner/repo" from SSH (git@host:...), ssh:// or HTTPS remote URLs.
fn extract_repo(url: &str) -> Option<String> {
    let path = if let Some(rest) = url.strip_prefix("git@") {
        // git@host:owner/repo.git
        rest.split_once(':')?.1
    } else if url.contains("://") {
        // https://host/owner/repo.git or ssh://git@host/owner/repo.git
        let without_scheme = url.split("://").nth(1)?;
        without_scheme.split_once('/')?.1
    } else {
        return None;
    };

    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut parts = path.split('/');
    let owner = parts.next()?;
    let repo = parts.next()?;
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some(format!("{}/{}", owner, repo))
}
