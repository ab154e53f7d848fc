use std::io::Write;
use std::process::Command;

use crate::error::{PerchError, Result};

/// Lines starting with this marker are stripped from the edited file.
pub const COMMENT_MARKER: char = '#';

/// What the editor invocation is commenting on; travels with the result
/// back into the event loop.
#[derive(Debug, Clone)]
pub struct EditorContext {
    pub number: u64,
    pub repo: String,
    pub is_pr: bool,
    pub section_id: usize,
}

/// Editor resolution: $EDITOR, then $VISUAL, then vi.
pub fn editor_cmd() -> String {
    if let Ok(editor) = std::env::var("EDITOR") {
        if !editor.is_empty() {
            return editor;
        }
    }
    if let Ok(visual) = std::env::var("VISUAL") {
        if !visual.is_empty() {
            return visual;
        }
    }
    "vi".to_string()
}

/// Instructional header written to the temp file before the editor opens.
pub fn header(ctx: &EditorContext) -> String {
    let kind = if ctx.is_pr { "PR" } else { "issue" };
    format!(
        "# Comment on {} #{} in {}\n\
         # Lines starting with '#' will be ignored.\n\
         # Save and quit to submit. Leave empty to cancel.\n",
        kind, ctx.number, ctx.repo,
    )
}

/// Drop marker lines, join the rest, and trim. A file holding only marker
/// lines (or nothing) yields an empty body.
pub fn strip_marker_lines(content: &str) -> String {
    let lines: Vec<&str> = content
        .lines()
        .filter(|line| !line.starts_with(COMMENT_MARKER))
        .collect();
    lines.join("\n").trim().to_string()
}

/// Compose the temp file, hand the terminal to the editor, and read back
/// the submitted body. Blocks until the editor exits. The temp file is
/// removed unconditionally when this returns, success or failure.
pub fn run(ctx: &EditorContext) -> Result<String> {
    run_with(&editor_cmd(), ctx)
}

fn run_with(editor: &str, ctx: &EditorContext) -> Result<String> {
    // NamedTempFile deletes the backing file on drop, covering every exit
    // path below.
    let mut file = tempfile::Builder::new()
        .prefix("perch-comment-")
        .suffix(".md")
        .tempfile()?;
    file.write_all(header(ctx).as_bytes())?;
    file.flush()?;

    let status = Command::new(editor)
        .arg(file.path())
        .status()
        .map_err(|e| PerchError::Editor(format!("failed to launch {editor}: {e}")))?;

    if !status.success() {
        return Err(PerchError::Editor(format!(
            "{editor} exited with {status}"
        )));
    }

    let content = std::fs::read_to_string(file.path())?;
    Ok(strip_marker_lines(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> EditorContext {
        EditorContext {
            number: 42,
            repo: "o/r".to_string(),
            is_pr: false,
            section_id: 0,
        }
    }

    #[test]
    fn header_names_subject_and_repo() {
        let h = header(&ctx());
        assert!(h.contains("42"));
        assert!(h.contains("o/r"));
        assert!(h.contains("issue"));
        assert!(h.lines().all(|l| l.starts_with('#')));
    }

    #[test]
    fn header_says_pr_for_pull_requests() {
        let mut c = ctx();
        c.is_pr = true;
        assert!(header(&c).contains("PR #42"));
    }

    #[test]
    fn strip_drops_marker_lines() {
        assert_eq!(strip_marker_lines("hello\n# ignored\nworld"), "hello\nworld");
    }

    #[test]
    fn strip_of_marker_only_file_is_empty() {
        assert_eq!(strip_marker_lines("# one\n# two\n"), "");
        assert_eq!(strip_marker_lines(""), "");
    }

    #[test]
    fn strip_trims_surrounding_blank_lines() {
        assert_eq!(strip_marker_lines("# header\n\nbody\n\n"), "body");
    }

    #[cfg(unix)]
    #[test]
    fn run_with_captures_edited_body_and_removes_temp_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("editor.sh");
        std::fs::write(
            &script,
            "#!/bin/sh\necho 'hello' >> \"$1\"\necho '# still ignored' >> \"$1\"\necho 'world' >> \"$1\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let body = run_with(script.to_str().unwrap(), &ctx()).unwrap();
        assert_eq!(body, "hello\nworld");
    }

    #[cfg(unix)]
    #[test]
    fn run_with_reports_nonzero_exit_as_editor_error() {
        let err = run_with("false", &ctx()).unwrap_err();
        assert!(matches!(err, PerchError::Editor(_)));
    }

    #[cfg(unix)]
    #[test]
    fn run_with_reports_spawn_failure_as_editor_error() {
        let err = run_with("/nonexistent/editor-binary", &ctx()).unwrap_err();
        assert!(matches!(err, PerchError::Editor(_)));
    }
}
