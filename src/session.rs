//! Preview session state.
//!
//! Tracks what a preview surface needs: the source under edit, the last
//! formatted output, the changed-line count, and the most recent failure.
//! Language and source persist across restarts; everything else is
//! recomputed.

use serde::{Deserialize, Serialize};

use crate::coordinator::FormatOutcome;
use crate::language::Language;
use crate::samples;
use par_fmt_config::persistence::{blob_path, read_blob, write_blob};

/// Blob name for persisted session state.
pub const SESSION_STORE_NAME: &str = "clang-format-ui";

/// The slice of session state that survives a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub language: Language,
    pub source_code: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            language: Language::default(),
            source_code: samples::sample_for(Language::default()).to_string(),
        }
    }
}

/// One preview session: source in, formatted preview out.
#[derive(Debug, Clone)]
pub struct PreviewSession {
    language: Language,
    source_code: String,
    formatted_code: String,
    is_formatting: bool,
    elapsed_millis: Option<u64>,
    changed_lines: usize,
    last_error: Option<String>,
}

impl Default for PreviewSession {
    fn default() -> Self {
        Self::from_state(SessionState::default())
    }
}

impl PreviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a session from persisted state.
    pub fn from_state(state: SessionState) -> Self {
        Self {
            language: state.language,
            source_code: state.source_code,
            formatted_code: String::new(),
            is_formatting: false,
            elapsed_millis: None,
            changed_lines: 0,
            last_error: None,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn source_code(&self) -> &str {
        &self.source_code
    }

    pub fn formatted_code(&self) -> &str {
        &self.formatted_code
    }

    pub fn is_formatting(&self) -> bool {
        self.is_formatting
    }

    /// Engine time for the last successful format, if any.
    pub fn elapsed_millis(&self) -> Option<u64> {
        self.elapsed_millis
    }

    pub fn changed_lines(&self) -> usize {
        self.changed_lines
    }

    /// Message from the last failed format, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Switch language and load its sample source. Selecting the current
    /// language again also reloads the sample.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        self.source_code = samples::sample_for(language).to_string();
    }

    pub fn set_source_code(&mut self, source: impl Into<String>) {
        self.source_code = source.into();
    }

    /// Restore the built-in sample for the current language.
    pub fn reset_source_code(&mut self) {
        self.source_code = samples::sample_for(self.language).to_string();
    }

    /// Mark a format as in flight.
    pub fn begin_format(&mut self) {
        self.is_formatting = true;
    }

    /// Fold a settled format outcome into the preview.
    ///
    /// Success replaces the preview and recomputes the changed-line count.
    /// Failure records the message and keeps the previous preview; when
    /// there is none yet, the raw source stands in so the surface is never
    /// blank.
    pub fn apply_outcome(&mut self, outcome: FormatOutcome) {
        self.is_formatting = false;
        match outcome {
            Ok(result) => {
                // Blank input formats to an empty preview with no diff.
                self.changed_lines = if result.formatted_text.is_empty()
                    && self.source_code.trim().is_empty()
                {
                    0
                } else {
                    line_diff_count(&self.source_code, &result.formatted_text)
                };
                self.elapsed_millis = Some(result.elapsed_millis);
                self.formatted_code = result.formatted_text;
                self.last_error = None;
            }
            Err(failure) => {
                log::warn!("Format request failed: {failure}");
                self.last_error = Some(failure.to_string());
                self.elapsed_millis = None;
                self.changed_lines = 0;
                if self.formatted_code.is_empty() {
                    self.formatted_code = self.source_code.clone();
                }
            }
        }
    }

    /// The persistable slice of this session.
    pub fn state(&self) -> SessionState {
        SessionState {
            language: self.language,
            source_code: self.source_code.clone(),
        }
    }

    /// Load the persisted session, falling back to defaults when the blob
    /// is absent or unreadable.
    pub fn load() -> Self {
        Self::load_from(&blob_path(SESSION_STORE_NAME))
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        let Some(text) = read_blob(path) else {
            return Self::default();
        };
        match serde_yaml_ng::from_str::<SessionState>(&text) {
            Ok(state) => Self::from_state(state),
            Err(e) => {
                log::warn!("Ignoring corrupt session blob {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Persist language and source.
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&blob_path(SESSION_STORE_NAME))
    }

    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let text = serde_yaml_ng::to_string(&self.state())?;
        write_blob(path, &text)
    }
}

/// Count of line positions where `original` and `formatted` differ,
/// compared pairwise up to the longer text.
pub fn line_diff_count(original: &str, formatted: &str) -> usize {
    let original_lines: Vec<&str> = original.lines().collect();
    let formatted_lines: Vec<&str> = formatted.lines().collect();
    let max_lines = original_lines.len().max(formatted_lines.len());
    (0..max_lines)
        .filter(|&i| original_lines.get(i) != formatted_lines.get(i))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{FailureKind, FormatFailure, FormatResult};

    #[test]
    fn test_new_session_defaults() {
        let session = PreviewSession::new();
        assert_eq!(session.language(), Language::Cpp);
        assert_eq!(session.source_code(), samples::CPP_SAMPLE);
        assert_eq!(session.formatted_code(), "");
        assert!(!session.is_formatting());
        assert_eq!(session.elapsed_millis(), None);
        assert_eq!(session.changed_lines(), 0);
        assert_eq!(session.last_error(), None);
    }

    #[test]
    fn test_set_language_loads_sample() {
        let mut session = PreviewSession::new();
        session.set_language(Language::C);
        assert_eq!(session.source_code(), samples::C_SAMPLE);

        // Re-selecting the current language reloads the sample too.
        session.set_source_code("int main() { return 1; }");
        session.set_language(Language::C);
        assert_eq!(session.source_code(), samples::C_SAMPLE);
    }

    #[test]
    fn test_reset_source_code() {
        let mut session = PreviewSession::new();
        session.set_source_code("// scratch");
        session.reset_source_code();
        assert_eq!(session.source_code(), samples::CPP_SAMPLE);
    }

    #[test]
    fn test_apply_success_updates_preview() {
        let mut session = PreviewSession::new();
        session.set_source_code("int main() {\nreturn 0;\n}");
        session.begin_format();
        session.apply_outcome(Ok(FormatResult {
            formatted_text: "int main() {\n  return 0;\n}".to_string(),
            elapsed_millis: 7,
        }));

        assert!(!session.is_formatting());
        assert_eq!(session.formatted_code(), "int main() {\n  return 0;\n}");
        assert_eq!(session.elapsed_millis(), Some(7));
        assert_eq!(session.changed_lines(), 1);
        assert_eq!(session.last_error(), None);
    }

    #[test]
    fn test_apply_failure_keeps_last_good_preview() {
        let mut session = PreviewSession::new();
        session.set_source_code("int x;");
        session.apply_outcome(Ok(FormatResult {
            formatted_text: "int x;\n".to_string(),
            elapsed_millis: 3,
        }));

        session.begin_format();
        session.apply_outcome(Err(FormatFailure::new(
            FailureKind::EngineError,
            "format failed: unbalanced braces",
        )));

        assert!(!session.is_formatting());
        assert_eq!(session.formatted_code(), "int x;\n");
        assert_eq!(session.elapsed_millis(), None);
        assert_eq!(session.changed_lines(), 0);
        assert_eq!(
            session.last_error(),
            Some("engine error: format failed: unbalanced braces")
        );
    }

    #[test]
    fn test_apply_failure_without_prior_preview_shows_source() {
        let mut session = PreviewSession::new();
        session.set_source_code("int x;");
        session.apply_outcome(Err(FormatFailure::new(
            FailureKind::EngineUnavailable,
            "engine channel closed",
        )));
        assert_eq!(session.formatted_code(), "int x;");
    }

    #[test]
    fn test_success_clears_previous_error() {
        let mut session = PreviewSession::new();
        session.apply_outcome(Err(FormatFailure::new(FailureKind::Timeout, "late")));
        assert!(session.last_error().is_some());

        session.apply_outcome(Ok(FormatResult {
            formatted_text: "x".to_string(),
            elapsed_millis: 1,
        }));
        assert_eq!(session.last_error(), None);
    }

    #[test]
    fn test_line_diff_count_pairwise() {
        assert_eq!(line_diff_count("a\nb\nc", "a\nb\nc"), 0);
        assert_eq!(line_diff_count("a\nb\nc", "a\nB\nc"), 1);
        // Length difference counts every unpaired line.
        assert_eq!(line_diff_count("a", "a\nb\nc"), 2);
        assert_eq!(line_diff_count("", ""), 0);
    }

    #[test]
    fn test_state_round_trip() {
        let mut session = PreviewSession::new();
        session.set_language(Language::C);
        session.set_source_code("int y;");

        let restored = PreviewSession::from_state(session.state());
        assert_eq!(restored.language(), Language::C);
        assert_eq!(restored.source_code(), "int y;");
        assert_eq!(restored.formatted_code(), "");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.yaml");

        let mut session = PreviewSession::new();
        session.set_language(Language::C);
        session.set_source_code("int z;");
        session.save_to(&path).unwrap();

        let loaded = PreviewSession::load_from(&path);
        assert_eq!(loaded.language(), Language::C);
        assert_eq!(loaded.source_code(), "int z;");
    }

    #[test]
    fn test_load_missing_blob_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = PreviewSession::load_from(&dir.path().join("absent.yaml"));
        assert_eq!(loaded.language(), Language::Cpp);
        assert_eq!(loaded.source_code(), samples::CPP_SAMPLE);
    }

    #[test]
    fn test_load_corrupt_blob_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.yaml");
        std::fs::write(&path, "language: {not: [valid").unwrap();

        let loaded = PreviewSession::load_from(&path);
        assert_eq!(loaded.language(), Language::Cpp);
    }
}
