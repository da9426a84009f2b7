//! Line selection against file content.
//!
//! Tag and region markers are paired with a stack. An end marker closes the
//! innermost open marker of the same name, so same-named spans may nest.
//! When several complete spans match a name, spans nested inside another
//! candidate are dropped, an exact-case match is preferred over a
//! case-insensitive one, and any ambiguity left is settled by taking the
//! first span with a warning.

use crate::markers::{Marker, MarkerSyntax};
use crate::postprocess::{dedent, highlight_positions};
use crate::query::{Selector, SnippetQuery};
use crate::range::expand_spans;
use crate::tag::TagName;
use crate::warning::SnippetWarning;

/// Result of resolving a query against one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSnippet {
    /// Selected lines as `(source line number, text)`, dedented.
    pub lines: Vec<(usize, String)>,
    /// Output positions to highlight, 1-based.
    pub highlight: Vec<usize>,
    pub warnings: Vec<SnippetWarning>,
}

impl ResolvedSnippet {
    /// Snippet for a source file that could not be loaded.
    #[must_use]
    pub fn source_not_found(path: &str) -> Self {
        Self {
            warnings: vec![SnippetWarning::SourceNotFound(path.to_owned())],
            ..Self::default()
        }
    }

    /// Selected text, each line terminated by `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (_, line) in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Whether nothing was found, so a placeholder should be shown.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.lines.is_empty() && self.warnings.iter().any(SnippetWarning::is_not_found)
    }
}

/// Resolve `query` against the full text of its source file.
#[must_use]
pub fn resolve(query: &SnippetQuery, content: &str) -> ResolvedSnippet {
    let source: Vec<&str> = content.lines().collect();
    let syntax = MarkerSyntax::for_language(query.language_hint());
    let mut warnings = Vec::new();

    let numbers = match &query.selector {
        Selector::FullFile => (1..=source.len()).collect(),
        Selector::LineRange(spans) => expand_spans(spans, source.len()),
        Selector::NamedTag(name) => {
            let spans = tag_spans(&source, syntax);
            select_span(&spans.complete, name, &mut warnings)
                .map(|span| inner_lines(&source, syntax, span))
                .unwrap_or_else(|| {
                    warnings.push(not_found_tag(&spans, name));
                    Vec::new()
                })
        }
        Selector::NamedRegion(name) => {
            let spans = region_spans(&source, syntax);
            select_span(&spans.complete, name, &mut warnings)
                .map(|span| inner_lines(&source, syntax, span))
                .unwrap_or_else(|| {
                    warnings.push(SnippetWarning::RegionNotFound(name.clone()));
                    Vec::new()
                })
        }
    };

    let mut texts: Vec<String> = numbers
        .iter()
        .map(|&n| source.get(n - 1).map_or_else(String::new, |line| (*line).to_owned()))
        .collect();
    dedent(&mut texts, query.dedent);

    let lines: Vec<(usize, String)> = numbers.into_iter().zip(texts).collect();
    let highlight = highlight_positions(query.highlight.as_ref(), lines.len());

    ResolvedSnippet {
        lines,
        highlight,
        warnings,
    }
}

/// A complete marker pair, 0-based indices of the marker lines.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Span {
    name: TagName,
    start: usize,
    end: usize,
}

impl Span {
    fn contains(&self, other: &Span) -> bool {
        self.start < other.start && other.end < self.end
    }
}

struct TagSpans {
    complete: Vec<Span>,
    unclosed: Vec<(TagName, usize)>,
}

fn tag_spans(source: &[&str], syntax: MarkerSyntax) -> TagSpans {
    let mut open: Vec<(TagName, usize)> = Vec::new();
    let mut complete = Vec::new();

    for (idx, line) in source.iter().enumerate() {
        match syntax.classify(line) {
            Some(Marker::TagStart(name)) => open.push((name, idx)),
            Some(Marker::TagEnd(name)) => {
                if let Some(pos) = open.iter().rposition(|(open_name, _)| *open_name == name) {
                    let (name, start) = open.remove(pos);
                    complete.push(Span {
                        name,
                        start,
                        end: idx,
                    });
                }
            }
            _ => {}
        }
    }

    for (name, idx) in &open {
        tracing::debug!(tag = %name, line = idx + 1, "unclosed snippet tag");
    }

    TagSpans {
        complete,
        unclosed: open,
    }
}

fn region_spans(source: &[&str], syntax: MarkerSyntax) -> TagSpans {
    let mut open: Vec<(Option<TagName>, usize)> = Vec::new();
    let mut complete = Vec::new();

    for (idx, line) in source.iter().enumerate() {
        match syntax.classify(line) {
            Some(Marker::RegionStart(name)) => open.push((name, idx)),
            Some(Marker::RegionEnd) => {
                // Unnamed regions only keep the stack balanced.
                if let Some((Some(name), start)) = open.pop() {
                    complete.push(Span {
                        name,
                        start,
                        end: idx,
                    });
                }
            }
            _ => {}
        }
    }

    let unclosed = open
        .into_iter()
        .filter_map(|(name, idx)| name.map(|name| (name, idx)))
        .collect();
    TagSpans { complete, unclosed }
}

fn not_found_tag(spans: &TagSpans, name: &TagName) -> SnippetWarning {
    match spans.unclosed.iter().find(|(open, _)| open == name) {
        Some((open, idx)) => SnippetWarning::UnclosedTag {
            name: open.clone(),
            line: idx + 1,
        },
        None => SnippetWarning::TagNotFound(name.clone()),
    }
}

fn select_span<'a>(
    spans: &'a [Span],
    name: &TagName,
    warnings: &mut Vec<SnippetWarning>,
) -> Option<&'a Span> {
    let candidates: Vec<&Span> = spans.iter().filter(|s| s.name == *name).collect();

    let outermost: Vec<&Span> = candidates
        .iter()
        .copied()
        .filter(|span| !candidates.iter().any(|other| other.contains(span)))
        .collect();

    let exact: Vec<&Span> = outermost
        .iter()
        .copied()
        .filter(|span| span.name.is_exactly(name))
        .collect();
    let mut chosen = if exact.is_empty() { outermost } else { exact };
    chosen.sort_by_key(|span| span.start);

    if chosen.len() > 1 {
        warnings.push(SnippetWarning::MultipleTagsWithSameName {
            name: name.clone(),
            lines: chosen.iter().map(|span| span.start + 1).collect(),
        });
    }
    chosen.first().copied()
}

/// Line numbers strictly inside `span`, skipping every marker line.
fn inner_lines(source: &[&str], syntax: MarkerSyntax, span: &Span) -> Vec<usize> {
    (span.start + 1..span.end)
        .filter(|&idx| syntax.classify(source[idx]).is_none())
        .map(|idx| idx + 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::LineSet;
    use pretty_assertions::assert_eq;

    fn query(reference: &str) -> SnippetQuery {
        SnippetQuery::parse(reference).unwrap()
    }

    fn numbered(count: usize) -> String {
        (1..=count).map(|n| format!("line{n}\n")).collect()
    }

    #[test]
    fn test_tag_is_case_insensitive() {
        let content = "// <tag1>\nline1\n// </tag1>\n";
        let snippet = resolve(&query("a.cs#Tag1"), content);
        assert_eq!(snippet.text(), "line1\n");
        assert_eq!(snippet.lines, vec![(2, "line1".to_owned())]);
        assert!(snippet.warnings.is_empty());
    }

    #[test]
    fn test_range_order_and_open_end() {
        let content = numbered(31);
        let snippet = resolve(&query("a.txt?range=1-2,10,20-21,29-"), &content);
        let numbers: Vec<usize> = snippet.lines.iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, vec![1, 2, 10, 20, 21, 29, 30, 31]);
    }

    #[test]
    fn test_reversed_list_keeps_order() {
        let content = numbered(5);
        let snippet = resolve(&query("a.txt?range=3,1"), &content);
        assert_eq!(snippet.text(), "line3\nline1\n");
    }

    #[test]
    fn test_nested_duplicate_uses_outer_without_warning() {
        let content = "\
// <tag1>
a
// <tag1>
b
// </tag1>
c
// </tag1>
";
        let snippet = resolve(&query("a.cs#Tag1"), content);
        assert_eq!(snippet.text(), "a\nb\nc\n");
        assert!(snippet.warnings.is_empty());
    }

    #[test]
    fn test_sibling_duplicates_warn_and_use_first() {
        let content = "\
// <dup>
first
// </dup>
// <dup>
second
// </dup>
";
        let snippet = resolve(&query("a.cs#dup"), content);
        assert_eq!(snippet.text(), "first\n");
        assert_eq!(
            snippet.warnings,
            vec![SnippetWarning::MultipleTagsWithSameName {
                name: TagName::new("dup"),
                lines: vec![1, 4],
            }]
        );
    }

    #[test]
    fn test_exact_case_wins_over_insensitive() {
        let content = "\
// <main>
lower
// </main>
// <Main>
upper
// </Main>
";
        let snippet = resolve(&query("a.cs#Main"), content);
        assert_eq!(snippet.text(), "upper\n");
        assert!(snippet.warnings.is_empty());
    }

    #[test]
    fn test_tag_matches_range_minus_markers() {
        let content = "\
class A
{
    // <body>
    int x;
    // <inner>
    int y;
    // </inner>
    // </body>
}
";
        let by_tag = resolve(&query("a.cs#body"), content);
        let by_range = resolve(&query("a.cs?range=4,6"), content);
        assert_eq!(by_tag.text(), by_range.text());
        assert_eq!(by_tag.text(), "int x;\nint y;\n");
    }

    #[test]
    fn test_tag_not_found() {
        let snippet = resolve(&query("a.cs#missing"), "// <a>\nx\n// </a>\n");
        assert!(snippet.lines.is_empty());
        assert!(snippet.is_not_found());
        assert_eq!(snippet.warnings[0].code(), "tag-not-found");
    }

    #[test]
    fn test_unclosed_tag_reported() {
        let snippet = resolve(&query("a.cs#open"), "// <open>\nx\n");
        assert_eq!(
            snippet.warnings,
            vec![SnippetWarning::UnclosedTag {
                name: TagName::new("open"),
                line: 1,
            }]
        );
        assert!(snippet.is_not_found());
    }

    #[test]
    fn test_named_region_inside_unnamed() {
        let content = "\
#region
    #region Helpers
    void Help() {}
    #endregion
    void Other() {}
#endregion
";
        let snippet = resolve(&query("a.cs?region=helpers"), content);
        assert_eq!(snippet.text(), "void Help() {}\n");
        assert_eq!(snippet.lines[0].0, 3);
    }

    #[test]
    fn test_region_not_found() {
        let snippet = resolve(&query("a.cs?region=nope"), "#region\n#endregion\n");
        assert_eq!(
            snippet.warnings,
            vec![SnippetWarning::RegionNotFound(TagName::new("nope"))]
        );
    }

    #[test]
    fn test_python_markers_by_extension() {
        let content = "\
import os
# <setup>
def setup():
    pass
# </setup>
";
        let snippet = resolve(&query("tool.py#setup"), content);
        assert_eq!(snippet.text(), "def setup():\n    pass\n");
    }

    #[test]
    fn test_dedent_and_highlight_apply_to_output() {
        let content = "a\n        b\n        c\n            d\n";
        let mut q = query("a.txt?range=2-4&dedent=-1");
        q.highlight = Some(LineSet::parse("1,3").unwrap());
        let snippet = resolve(&q, content);
        assert_eq!(snippet.text(), "b\nc\n    d\n");
        assert_eq!(snippet.highlight, vec![1, 3]);
    }

    #[test]
    fn test_full_file_with_fixed_dedent() {
        let snippet = resolve(&query("a.txt?dedent=2"), "    x\n  y\n");
        assert_eq!(snippet.text(), "  x\ny\n");
    }

    #[test]
    fn test_source_not_found() {
        let snippet = ResolvedSnippet::source_not_found("gone.cs");
        assert!(snippet.is_not_found());
        assert_eq!(snippet.warnings[0].code(), "codesnippet-not-found");
    }
}
