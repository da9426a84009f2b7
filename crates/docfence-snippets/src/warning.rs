//! Non-fatal snippet resolution outcomes.

use std::fmt;

use crate::tag::TagName;

/// Warning produced while resolving a snippet.
///
/// Resolution never fails: a warning is attached and the snippet is either
/// empty (nothing found) or the first candidate (ambiguous).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetWarning {
    /// No tag marker pair with the requested name.
    TagNotFound(TagName),
    /// No region with the requested name.
    RegionNotFound(TagName),
    /// Several same-named spans that nesting could not tell apart.
    MultipleTagsWithSameName {
        name: TagName,
        /// Start lines of every candidate, 1-based.
        lines: Vec<usize>,
    },
    /// The requested tag was opened but never closed.
    UnclosedTag { name: TagName, line: usize },
    /// The source file could not be loaded.
    SourceNotFound(String),
}

impl SnippetWarning {
    /// Diagnostic code reported to the host.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::TagNotFound(_) | Self::RegionNotFound(_) | Self::UnclosedTag { .. } => {
                "tag-not-found"
            }
            // Misspelling kept for compatibility with existing consumers.
            Self::MultipleTagsWithSameName { .. } => "mutiple-tags-with-same-name",
            Self::SourceNotFound(_) => "codesnippet-not-found",
        }
    }

    /// Whether the snippet came back empty because of this warning.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        !matches!(self, Self::MultipleTagsWithSameName { .. })
    }
}

impl fmt::Display for SnippetWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TagNotFound(name) => write!(f, "tag \"{name}\" not found"),
            Self::RegionNotFound(name) => write!(f, "region \"{name}\" not found"),
            Self::MultipleTagsWithSameName { name, lines } => {
                let lines: Vec<String> = lines.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "multiple tags named \"{name}\" at lines {}, using the first",
                    lines.join(", ")
                )
            }
            Self::UnclosedTag { name, line } => {
                write!(f, "tag \"{name}\" opened at line {line} is never closed")
            }
            Self::SourceNotFound(path) => write!(f, "code snippet source \"{path}\" not found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            SnippetWarning::TagNotFound(TagName::new("a")).code(),
            "tag-not-found"
        );
        assert_eq!(
            SnippetWarning::MultipleTagsWithSameName {
                name: TagName::new("a"),
                lines: vec![1, 5],
            }
            .code(),
            "mutiple-tags-with-same-name"
        );
        assert_eq!(
            SnippetWarning::SourceNotFound("a.cs".to_owned()).code(),
            "codesnippet-not-found"
        );
    }

    #[test]
    fn test_display() {
        let warning = SnippetWarning::MultipleTagsWithSameName {
            name: TagName::new("Main"),
            lines: vec![3, 9],
        };
        assert_eq!(
            warning.to_string(),
            "multiple tags named \"Main\" at lines 3, 9, using the first"
        );
        assert!(!warning.is_not_found());
        assert!(SnippetWarning::RegionNotFound(TagName::new("r")).is_not_found());
    }
}
