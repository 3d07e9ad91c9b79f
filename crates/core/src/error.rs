// ABOUTME: Error types for ReadX extraction including ErrorCode enum and ExtractError struct.
// ABOUTME: Separates fatal anchor failures from section failures that degrade to omitted fields.

use std::fmt;

/// Error codes representing different categories of extraction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// No tweet container matched any configured selector.
    ContainerNotFound,
    /// The article rich-text view or its editor root could not be located.
    EditorRootNotFound,
    /// A tweet container was found but none of the text selectors matched.
    TextNotFound,
    /// An optional section (author, metric, timestamp, block) was not found.
    SectionMissing,
    /// An element was found but an attribute on it did not parse.
    MalformedAttribute,
    /// Reader settings could not be loaded or saved.
    Settings,
}

impl ErrorCode {
    /// Stable machine-readable reason string.
    pub fn reason(&self) -> &'static str {
        match self {
            ErrorCode::ContainerNotFound => "container-not-found",
            ErrorCode::EditorRootNotFound => "not-initialized",
            ErrorCode::TextNotFound => "text-not-found",
            ErrorCode::SectionMissing => "section-missing",
            ErrorCode::MalformedAttribute => "malformed-attribute",
            ErrorCode::Settings => "settings",
        }
    }

    /// Returns true for codes that abort a whole extraction call.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ErrorCode::ContainerNotFound | ErrorCode::EditorRootNotFound | ErrorCode::TextNotFound
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// The main error type for extraction operations.
#[derive(Debug, thiserror::Error)]
pub struct ExtractError {
    pub code: ErrorCode,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "readx: {}: {}", self.op, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ExtractError {
    fn new(code: ErrorCode, op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self {
            code,
            op: op.into(),
            source,
        }
    }

    /// Create a ContainerNotFound error.
    pub fn container_not_found(op: impl Into<String>) -> Self {
        Self::new(ErrorCode::ContainerNotFound, op, None)
    }

    /// Create an EditorRootNotFound error.
    pub fn editor_root_not_found(op: impl Into<String>) -> Self {
        Self::new(ErrorCode::EditorRootNotFound, op, None)
    }

    /// Create a TextNotFound error.
    pub fn text_not_found(op: impl Into<String>) -> Self {
        Self::new(ErrorCode::TextNotFound, op, None)
    }

    /// Create a SectionMissing error.
    pub fn section_missing(op: impl Into<String>) -> Self {
        Self::new(ErrorCode::SectionMissing, op, None)
    }

    /// Create a MalformedAttribute error carrying the offending value.
    pub fn malformed_attribute(op: impl Into<String>, attr: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::MalformedAttribute,
            op,
            Some(anyhow::anyhow!("{}={:?}", attr, value)),
        )
    }

    /// Create a Settings error.
    pub fn settings(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorCode::Settings, op, source)
    }

    /// Machine-readable reason, e.g. `container-not-found`.
    pub fn reason(&self) -> &'static str {
        self.code.reason()
    }

    /// Single human-readable message suitable for the display surface.
    pub fn user_message(&self) -> &'static str {
        match self.code {
            ErrorCode::ContainerNotFound | ErrorCode::TextNotFound => {
                "Could not extract the post. Make sure you are on a post page."
            }
            ErrorCode::EditorRootNotFound => {
                "Could not extract the article. The page may still be loading."
            }
            ErrorCode::SectionMissing | ErrorCode::MalformedAttribute => {
                "Part of the content could not be read."
            }
            ErrorCode::Settings => "Reader settings could not be saved or loaded.",
        }
    }

    /// Returns true if this is a ContainerNotFound error.
    pub fn is_container_not_found(&self) -> bool {
        self.code == ErrorCode::ContainerNotFound
    }

    /// Returns true if this is an EditorRootNotFound error.
    pub fn is_editor_root_not_found(&self) -> bool {
        self.code == ErrorCode::EditorRootNotFound
    }

    /// Returns true if this error aborts the extraction.
    pub fn is_fatal(&self) -> bool {
        self.code.is_fatal()
    }
}

/// Convert a section result into an optional field.
///
/// Non-fatal failures are logged at debug level and mapped to `None`.
/// Fatal codes never reach this helper; they are propagated with `?`.
pub(crate) fn degrade<T>(result: Result<T, ExtractError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(reason = err.reason(), op = %err.op, "section degraded: {}", err);
            None
        }
    }
}
