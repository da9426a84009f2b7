//! Diagnostics reported while parsing and rendering a document.

use std::fmt;

use docfence_snippets::SnippetWarning;

/// Diagnostic codes. The string forms are stable and consumed by tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    InvalidForm,
    InvalidZone,
    InvalidImage,
    InvalidVideo,
    InvalidMonikerRange,
    InvalidTabGroup,
    TagNotFound,
    MultipleTagsWithSameName,
    CodeSnippetNotFound,
    InvalidCode,
    /// Malformed attribute list or fence.
    InvalidAttributes,
    /// Directive not allowed at this position.
    InvalidNesting,
    /// End marker with no matching open directive.
    UnmatchedClose,
    /// Directive still open at end of document.
    UnterminatedDirective,
}

impl DiagnosticCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidForm => "invalid-form",
            Self::InvalidZone => "invalid-zone",
            Self::InvalidImage => "invalid-image",
            Self::InvalidVideo => "invalid-video",
            Self::InvalidMonikerRange => "invalid-moniker-range",
            Self::InvalidTabGroup => "invalid-tab-group",
            Self::TagNotFound => "tag-not-found",
            Self::MultipleTagsWithSameName => "mutiple-tags-with-same-name",
            Self::CodeSnippetNotFound => "codesnippet-not-found",
            Self::InvalidCode => "invalid-code",
            Self::InvalidAttributes => "invalid-attributes",
            Self::InvalidNesting => "invalid-nesting",
            Self::UnmatchedClose => "unmatched-close",
            Self::UnterminatedDirective => "unterminated-directive",
        }
    }

    /// Code for a snippet resolution warning.
    #[must_use]
    pub fn for_snippet(warning: &SnippetWarning) -> Self {
        match warning {
            SnippetWarning::TagNotFound(_)
            | SnippetWarning::RegionNotFound(_)
            | SnippetWarning::UnclosedTag { .. } => Self::TagNotFound,
            SnippetWarning::MultipleTagsWithSameName { .. } => Self::MultipleTagsWithSameName,
            SnippetWarning::SourceNotFound(_) => Self::CodeSnippetNotFound,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported problem, located by 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    pub line: usize,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, line: usize, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            line,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: [{}] {}", self.line, self.code, self.message)
    }
}
