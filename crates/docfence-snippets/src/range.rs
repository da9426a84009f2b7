//! Line range mini-grammar shared by `range` and `highlight`.
//!
//! A range list is a comma-separated sequence of `N`, `N-` or `N-M` tokens
//! (1-based, inclusive). `N-` runs to the last line.

use std::fmt;

/// Error parsing a range list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("empty range token in \"{0}\"")]
    EmptyToken(String),
    #[error("\"{0}\" is not a line number")]
    NotANumber(String),
    #[error("range {start}-{end} ends before it starts")]
    Reversed { start: usize, end: usize },
}

/// One `N`, `N-` or `N-M` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    /// First line, 1-based.
    pub start: usize,
    /// Last line, inclusive. `None` runs to the end of the file.
    pub end: Option<usize>,
}

impl LineSpan {
    #[must_use]
    pub fn single(line: usize) -> Self {
        Self {
            start: line,
            end: Some(line),
        }
    }

    #[must_use]
    pub fn new(start: usize, end: Option<usize>) -> Self {
        Self { start, end }
    }

    /// Line numbers covered by this span, clipped to `1..=line_count`.
    pub fn lines(&self, line_count: usize) -> std::ops::RangeInclusive<usize> {
        if line_count == 0 {
            #[allow(clippy::reversed_empty_ranges)]
            return 1..=0;
        }
        let start = self.start.clamp(1, line_count);
        let end = self.end.unwrap_or(line_count).clamp(1, line_count);
        start..=end
    }

    fn parse(token: &str, whole: &str) -> Result<Self, RangeError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(RangeError::EmptyToken(whole.to_owned()));
        }

        let Some((start, end)) = token.split_once('-') else {
            return Ok(Self::single(parse_number(token)?));
        };

        let start = parse_number(start.trim())?;
        let end = end.trim();
        if end.is_empty() {
            return Ok(Self::new(start, None));
        }

        let end = parse_number(end)?;
        if end < start {
            return Err(RangeError::Reversed { start, end });
        }
        Ok(Self::new(start, Some(end)))
    }
}

impl fmt::Display for LineSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) if end == self.start => write!(f, "{}", self.start),
            Some(end) => write!(f, "{}-{end}", self.start),
            None => write!(f, "{}-", self.start),
        }
    }
}

fn parse_number(s: &str) -> Result<usize, RangeError> {
    s.parse()
        .map_err(|_| RangeError::NotANumber(s.to_owned()))
}

/// Parse a comma-separated range list, keeping the order given.
pub(crate) fn parse_spans(input: &str) -> Result<Vec<LineSpan>, RangeError> {
    input
        .split(',')
        .map(|token| LineSpan::parse(token, input))
        .collect()
}

/// Expand spans in order, preserving duplicates.
pub(crate) fn expand_spans(spans: &[LineSpan], line_count: usize) -> Vec<usize> {
    spans.iter().flat_map(|span| span.lines(line_count)).collect()
}

/// Set of output positions to highlight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSet {
    spans: Vec<LineSpan>,
}

impl LineSet {
    /// Parse the `highlight` grammar.
    ///
    /// # Example
    ///
    /// ```
    /// use docfence_snippets::LineSet;
    ///
    /// let set = LineSet::parse("2-3,5").unwrap();
    /// assert_eq!(set.positions(10), vec![2, 3, 5]);
    /// ```
    pub fn parse(input: &str) -> Result<Self, RangeError> {
        Ok(Self {
            spans: parse_spans(input)?,
        })
    }

    /// Sorted, de-duplicated positions within `1..=total`.
    #[must_use]
    pub fn positions(&self, total: usize) -> Vec<usize> {
        let mut positions = expand_spans(&self.spans, total);
        positions.sort_unstable();
        positions.dedup();
        positions
    }

    #[must_use]
    pub fn spans(&self) -> &[LineSpan] {
        &self.spans
    }
}

impl fmt::Display for LineSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, span) in self.spans.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{span}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_tokens() {
        let spans = parse_spans("1-2,10,29-").unwrap();
        assert_eq!(
            spans,
            vec![
                LineSpan::new(1, Some(2)),
                LineSpan::single(10),
                LineSpan::new(29, None),
            ]
        );
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let spans = parse_spans(" 3 , 5 - 6 ").unwrap();
        assert_eq!(spans, vec![LineSpan::single(3), LineSpan::new(5, Some(6))]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_spans("1,,2"),
            Err(RangeError::EmptyToken("1,,2".to_owned()))
        );
        assert_eq!(
            parse_spans("a-3"),
            Err(RangeError::NotANumber("a".to_owned()))
        );
        assert_eq!(
            parse_spans("5-3"),
            Err(RangeError::Reversed { start: 5, end: 3 })
        );
    }

    #[test]
    fn test_expand_keeps_order_and_duplicates() {
        let spans = parse_spans("3,1,3").unwrap();
        assert_eq!(expand_spans(&spans, 5), vec![3, 1, 3]);
    }

    #[test]
    fn test_expand_open_ended_runs_to_end() {
        let spans = parse_spans("1-2,10,20-21,29-").unwrap();
        let lines = expand_spans(&spans, 31);
        assert_eq!(lines, vec![1, 2, 10, 20, 21, 29, 30, 31]);
    }

    #[test]
    fn test_expand_clips_out_of_bounds() {
        let spans = parse_spans("0-2,4-99").unwrap();
        assert_eq!(expand_spans(&spans, 5), vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_expand_empty_file() {
        let spans = parse_spans("1-3").unwrap();
        assert!(expand_spans(&spans, 0).is_empty());
    }

    #[test]
    fn test_line_set_positions_sorted_and_unique() {
        let set = LineSet::parse("5,2-3,3").unwrap();
        assert_eq!(set.positions(4), vec![2, 3, 4]);
    }

    #[test]
    fn test_line_set_display() {
        let set = LineSet::parse("2-3, 5,7-").unwrap();
        assert_eq!(set.to_string(), "2-3,5,7-");
    }
}
