//! Inclusion reference parsing.
//!
//! A reference is written either as a path with a query string and optional
//! fragment (`Program.cs?range=1-3&highlight=2`, `Program.cs#Main`,
//! `Program.cs#L3-L7`) or as separate key/value pairs taken from directive
//! attributes.

use crate::language::Language;
use crate::range::{LineSet, LineSpan, RangeError, parse_spans};
use crate::tag::TagName;

/// Error parsing an inclusion reference.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("inclusion reference has no source path")]
    MissingSource,

    #[error("invalid {key}: {source}")]
    Range {
        key: &'static str,
        #[source]
        source: RangeError,
    },

    #[error("{key} \"{value}\" is not an integer")]
    NotAnInteger { key: &'static str, value: String },

    #[error("{key} is empty")]
    EmptyValue { key: &'static str },

    #[error("\"{0}\" given more than once")]
    Duplicate(&'static str),

    #[error("{first} cannot be combined with {second}")]
    Conflict {
        first: &'static str,
        second: &'static str,
    },
}

/// Which lines of the source file to take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    FullFile,
    /// Spans evaluated in the order given, duplicates kept.
    LineRange(Vec<LineSpan>),
    NamedTag(TagName),
    NamedRegion(TagName),
}

/// Parsed inclusion reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetQuery {
    pub source_path: String,
    pub selector: Selector,
    /// Positions to highlight, relative to the selected output lines.
    pub highlight: Option<LineSet>,
    /// Dedent width. Negative or absent means auto-detect.
    pub dedent: Option<i32>,
    /// Language override for marker syntax and the rendered class.
    pub language: Option<String>,
    pub interactive: Option<String>,
}

impl SnippetQuery {
    /// Parse `path[?query][#fragment]`.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty path, malformed numbers or ranges, and
    /// selectors that cannot be combined.
    pub fn parse(reference: &str) -> Result<Self, QueryError> {
        Self::parse_with(reference, std::iter::empty::<(&str, &str)>())
    }

    /// Parse `path[?query][#fragment]` followed by extra key/value pairs.
    ///
    /// Used by directives whose attributes add to an inline reference.
    ///
    /// # Errors
    ///
    /// Same as [`SnippetQuery::parse`].
    pub fn parse_with<I, K, V>(reference: &str, extra: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let reference = reference.trim();
        let (rest, fragment) = match reference.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (reference, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, query),
            None => (rest, ""),
        };

        let mut pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
            match line_fragment(fragment) {
                Some(range) => pairs.push(("range".to_owned(), range)),
                None => pairs.push(("name".to_owned(), fragment.to_owned())),
            }
        }

        pairs.extend(
            extra
                .into_iter()
                .map(|(key, value)| (key.as_ref().to_owned(), value.as_ref().to_owned())),
        );
        Self::from_pairs(path, pairs)
    }

    /// Build a query from a source path and key/value pairs.
    ///
    /// Recognized keys: `name`/`id`, `region`, `start`, `end`, `range`,
    /// `highlight`, `dedent`, `language`, `interactive`. Others are ignored.
    ///
    /// # Errors
    ///
    /// Same as [`SnippetQuery::parse`].
    pub fn from_pairs<I, K, V>(source_path: &str, pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let source_path = source_path.trim();
        if source_path.is_empty() {
            return Err(QueryError::MissingSource);
        }

        let mut parts = Parts::default();
        for (key, value) in pairs {
            parts.set(key.as_ref(), value.as_ref().trim())?;
        }

        Ok(Self {
            source_path: source_path.to_owned(),
            selector: parts.selector()?,
            highlight: parts.highlight,
            dedent: parts.dedent,
            language: parts.language,
            interactive: parts.interactive,
        })
    }

    /// Language for marker syntax: the override if known, else the extension.
    #[must_use]
    pub fn language_hint(&self) -> Option<Language> {
        match &self.language {
            Some(name) => Language::parse(name),
            None => Language::from_path(&self.source_path),
        }
    }

    /// Language name for the rendered code block.
    ///
    /// Known aliases such as `cs` or `c#` become the canonical name; an
    /// unknown override is kept, lowercased.
    #[must_use]
    pub fn language_name(&self) -> Option<String> {
        match (&self.language, self.language_hint()) {
            (_, Some(lang)) => Some(lang.name().to_owned()),
            (Some(name), None) => Some(name.trim().to_ascii_lowercase()),
            (None, None) => None,
        }
    }
}

/// Turn `L3` or `L3-L7` into range syntax.
fn line_fragment(fragment: &str) -> Option<String> {
    let rest = fragment.strip_prefix('L')?;
    let (start, end) = match rest.split_once('-') {
        Some((start, end)) => (start, Some(end.strip_prefix('L').unwrap_or(end))),
        None => (rest, None),
    };

    let is_number = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_number(start) || !end.is_none_or(is_number) {
        return None;
    }
    Some(match end {
        Some(end) => format!("{start}-{end}"),
        None => start.to_owned(),
    })
}

#[derive(Default)]
struct Parts {
    tag: Option<TagName>,
    region: Option<TagName>,
    start: Option<usize>,
    end: Option<usize>,
    range: Option<Vec<LineSpan>>,
    highlight: Option<LineSet>,
    dedent: Option<i32>,
    language: Option<String>,
    interactive: Option<String>,
}

fn put<T>(slot: &mut Option<T>, key: &'static str, value: T) -> Result<(), QueryError> {
    if slot.is_some() {
        return Err(QueryError::Duplicate(key));
    }
    *slot = Some(value);
    Ok(())
}

fn non_empty(key: &'static str, value: &str) -> Result<(), QueryError> {
    if value.is_empty() {
        return Err(QueryError::EmptyValue { key });
    }
    Ok(())
}

fn parse_line(key: &'static str, value: &str) -> Result<usize, QueryError> {
    value.parse().map_err(|_| QueryError::NotAnInteger {
        key,
        value: value.to_owned(),
    })
}

impl Parts {
    fn set(&mut self, key: &str, value: &str) -> Result<(), QueryError> {
        match key.to_ascii_lowercase().as_str() {
            "name" | "id" => {
                non_empty("name", value)?;
                put(&mut self.tag, "name", TagName::new(value))
            }
            "region" => {
                non_empty("region", value)?;
                put(&mut self.region, "region", TagName::new(value))
            }
            "start" => put(&mut self.start, "start", parse_line("start", value)?),
            "end" => put(&mut self.end, "end", parse_line("end", value)?),
            "range" => {
                let spans =
                    parse_spans(value).map_err(|source| QueryError::Range { key: "range", source })?;
                put(&mut self.range, "range", spans)
            }
            "highlight" => {
                let set = LineSet::parse(value).map_err(|source| QueryError::Range {
                    key: "highlight",
                    source,
                })?;
                put(&mut self.highlight, "highlight", set)
            }
            "dedent" => {
                let amount = value.parse().map_err(|_| QueryError::NotAnInteger {
                    key: "dedent",
                    value: value.to_owned(),
                })?;
                put(&mut self.dedent, "dedent", amount)
            }
            "language" => {
                non_empty("language", value)?;
                put(&mut self.language, "language", value.to_owned())
            }
            "interactive" => put(&mut self.interactive, "interactive", value.to_owned()),
            other => {
                tracing::debug!(key = other, "ignoring unknown snippet query key");
                Ok(())
            }
        }
    }

    fn selector(&mut self) -> Result<Selector, QueryError> {
        let has_lines = self.start.is_some() || self.end.is_some() || self.range.is_some();

        match (self.tag.take(), self.region.take()) {
            (Some(_), Some(_)) => Err(QueryError::Conflict {
                first: "name",
                second: "region",
            }),
            (Some(_), None) if has_lines => Err(QueryError::Conflict {
                first: "name",
                second: "range",
            }),
            (None, Some(_)) if has_lines => Err(QueryError::Conflict {
                first: "region",
                second: "range",
            }),
            (Some(tag), None) => Ok(Selector::NamedTag(tag)),
            (None, Some(region)) => Ok(Selector::NamedRegion(region)),
            (None, None) if has_lines => Ok(Selector::LineRange(self.line_spans()?)),
            (None, None) => Ok(Selector::FullFile),
        }
    }

    /// `start`/`end` first, then `range` in order.
    fn line_spans(&mut self) -> Result<Vec<LineSpan>, QueryError> {
        let mut spans = Vec::new();
        match (self.start, self.end) {
            (None, None) => {}
            (start, end) => {
                let start = start.unwrap_or(1);
                if let Some(end) = end
                    && end < start
                {
                    return Err(QueryError::Range {
                        key: "end",
                        source: RangeError::Reversed { start, end },
                    });
                }
                spans.push(LineSpan::new(start, end));
            }
        }
        spans.extend(self.range.take().unwrap_or_default());
        Ok(spans)
    }
}
