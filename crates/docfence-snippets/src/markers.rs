//! Tag and region marker recognition.
//!
//! Tag markers are comments holding `<name>` or `</name>`:
//!
//! ```text
//! // <snippet1>
//! # </snippet1>
//! <!-- <config> -->
//! ```
//!
//! Region markers follow each language's folding syntax (`#region Name`,
//! `#End Region`, `//#region`, `#pragma region`, ...). A region without a
//! name is still tracked so that nesting stays balanced.

use crate::language::{Language, all_comment_styles, all_region_styles};
use crate::tag::TagName;

/// A comment syntax able to carry tag markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CommentStyle {
    open: &'static str,
    close: Option<&'static str>,
}

impl CommentStyle {
    pub(crate) const fn line(open: &'static str) -> Self {
        Self { open, close: None }
    }

    pub(crate) const fn block(open: &'static str, close: &'static str) -> Self {
        Self {
            open,
            close: Some(close),
        }
    }

    fn parse_tag(self, trimmed: &str) -> Option<Marker> {
        let rest = trimmed.strip_prefix(self.open)?;
        let rest = match self.close {
            Some(close) => rest.strip_suffix(close)?,
            None => rest,
        };
        let inner = rest.trim().strip_prefix('<')?.strip_suffix('>')?.trim();

        let (is_end, name) = match inner.strip_prefix('/') {
            Some(name) => (true, name.trim()),
            None => (false, inner),
        };
        if !is_valid_tag_name(name) {
            return None;
        }

        let name = TagName::new(name);
        Some(if is_end {
            Marker::TagEnd(name)
        } else {
            Marker::TagStart(name)
        })
    }
}

fn is_valid_tag_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Region marker syntax of a language family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RegionStyle {
    /// `#region Name` / `#endregion`
    CSharp,
    /// `#Region "Name"` / `#End Region`, case-insensitive
    VisualBasic,
    /// `//#region Name` / `//#endregion`
    SlashRegion,
    /// `#pragma region Name` / `#pragma endregion`
    Pragma,
    /// `# region Name` / `# endregion`
    HashRegion,
    /// `<!-- #region Name -->` / `<!-- #endregion -->`
    Xml,
}

impl RegionStyle {
    fn parse(self, trimmed: &str) -> Option<Marker> {
        match self {
            Self::CSharp => parse_region_keywords(trimmed, "#region", "#endregion"),
            Self::VisualBasic => {
                let lower = trimmed.to_ascii_lowercase();
                let words: Vec<&str> = lower.split_whitespace().collect();
                if words.first() == Some(&"#end") && words.get(1) == Some(&"region") {
                    return Some(Marker::RegionEnd);
                }
                keyword_rest(&lower, "#region")?;
                // Slice the original to keep the name's case.
                let name = trimmed.get("#region".len()..)?.trim();
                Some(region_start(strip_quotes(name)))
            }
            Self::SlashRegion => {
                let rest = trimmed.strip_prefix("//")?.trim_start();
                parse_region_keywords(rest, "#region", "#endregion")
            }
            Self::Pragma => {
                let rest = keyword_rest(trimmed, "#pragma")?;
                parse_region_keywords(rest, "region", "endregion")
            }
            Self::HashRegion => {
                let rest = trimmed.strip_prefix('#')?.trim_start();
                parse_region_keywords(rest, "region", "endregion")
            }
            Self::Xml => {
                let rest = trimmed.strip_prefix("<!--")?.strip_suffix("-->")?.trim();
                parse_region_keywords(rest, "#region", "#endregion")
            }
        }
    }
}

/// Return the trimmed text after `keyword` if it is followed by whitespace or nothing.
fn keyword_rest<'a>(s: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = s.strip_prefix(keyword)?;
    match rest.chars().next() {
        None => Some(""),
        Some(c) if c.is_whitespace() => Some(rest.trim()),
        Some(_) => None,
    }
}

fn parse_region_keywords(s: &str, start: &str, end: &str) -> Option<Marker> {
    if keyword_rest(s, end).is_some() {
        return Some(Marker::RegionEnd);
    }
    keyword_rest(s, start).map(region_start)
}

fn region_start(name: &str) -> Marker {
    if name.is_empty() {
        Marker::RegionStart(None)
    } else {
        Marker::RegionStart(Some(TagName::new(name)))
    }
}

fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

/// A recognized marker line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Marker {
    TagStart(TagName),
    TagEnd(TagName),
    RegionStart(Option<TagName>),
    RegionEnd,
}

/// Marker syntaxes in effect for one source file.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkerSyntax {
    comments: &'static [CommentStyle],
    regions: &'static [RegionStyle],
}

impl MarkerSyntax {
    /// Syntax for a known language, or every known syntax when unknown.
    pub(crate) fn for_language(language: Option<Language>) -> Self {
        match language {
            Some(lang) => Self {
                comments: lang.comment_styles(),
                regions: lang.region_styles(),
            },
            None => Self {
                comments: all_comment_styles(),
                regions: all_region_styles(),
            },
        }
    }

    /// Classify a line as a marker.
    pub(crate) fn classify(&self, line: &str) -> Option<Marker> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.regions
            .iter()
            .find_map(|style| style.parse(trimmed))
            .or_else(|| self.comments.iter().find_map(|style| style.parse_tag(trimmed)))
    }
}
