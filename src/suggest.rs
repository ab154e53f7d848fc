/// Autocomplete panel shown under the input box while labeling.
///
/// Holds the fetched suggestion set and the fetch status surfaced inline
/// (loading spinner, error line). Filtering against the token under the
/// cursor happens here; fetching and caching are the controller's job.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Failed(String),
}

#[derive(Debug, Default)]
pub struct SuggestPanel {
    pub status: FetchStatus,
    visible: bool,
    suggestions: Vec<String>,
    active_token: String,
    exclude: Vec<String>,
}

impl SuggestPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn active_token(&self) -> &str {
        &self.active_token
    }

    pub fn set_suggestions(&mut self, suggestions: Vec<String>) {
        self.suggestions = suggestions;
    }

    pub fn set_loading(&mut self) {
        self.status = FetchStatus::Loading;
        self.visible = true;
    }

    pub fn set_error(&mut self, err: String) {
        self.status = FetchStatus::Failed(err);
        self.visible = true;
    }

    pub fn set_success(&mut self) {
        self.status = FetchStatus::Idle;
    }

    /// Show the dropdown for the token under the cursor, excluding labels
    /// already present in the input.
    pub fn show(&mut self, active_token: String, exclude: Vec<String>) {
        self.active_token = active_token;
        self.exclude = exclude;
        self.visible = true;
        if self.status != FetchStatus::Loading {
            self.status = FetchStatus::Idle;
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.active_token.clear();
        self.exclude.clear();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Suggestions minus already-present labels, prefix-filtered by the
    /// active token (case-insensitive).
    pub fn matches(&self) -> Vec<&str> {
        let prefix = self.active_token.to_lowercase();
        self.suggestions
            .iter()
            .filter(|s| !self.exclude.iter().any(|e| e.eq_ignore_ascii_case(s)))
            .filter(|s| s.to_lowercase().starts_with(&prefix))
            .map(String::as_str)
            .collect()
    }
}

/// The comma-delimited token enclosing `offset` in `text`, trimmed.
pub fn token_at_cursor(text: &str, offset: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let offset = offset.min(chars.len());

    let start = chars[..offset]
        .iter()
        .rposition(|&c| c == ',')
        .map(|i| i + 1)
        .unwrap_or(0);
    let end = chars[offset..]
        .iter()
        .position(|&c| c == ',')
        .map(|i| offset + i)
        .unwrap_or(chars.len());

    chars[start..end].iter().collect::<String>().trim().to_string()
}

/// All non-empty comma-separated labels in the input, trimmed.
pub fn all_labels(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
