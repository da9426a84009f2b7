//! Dedent and highlight over a resolved selection.

use crate::range::LineSet;

/// Strip leading whitespace from every line.
///
/// `Some(n)` with `n >= 0` strips up to `n` whitespace characters per line.
/// A negative amount or `None` strips the smallest indentation found on any
/// non-blank line. Blank lines do not count toward that minimum and lose at
/// most their own whitespace.
pub fn dedent(lines: &mut [String], amount: Option<i32>) {
    let width = match amount.and_then(|n| usize::try_from(n).ok()) {
        Some(width) => width,
        None => lines
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| leading_whitespace(line))
            .min()
            .unwrap_or(0),
    };
    if width == 0 {
        return;
    }

    for line in lines.iter_mut() {
        let strip = leading_whitespace(line).min(width);
        let byte_offset = line
            .char_indices()
            .nth(strip)
            .map_or(line.len(), |(idx, _)| idx);
        line.drain(..byte_offset);
    }
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Output positions to highlight, 1-based over the selected lines.
#[must_use]
pub fn highlight_positions(highlight: Option<&LineSet>, selected: usize) -> Vec<usize> {
    highlight.map_or_else(Vec::new, |set| set.positions(selected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_auto_dedent_uses_minimum_non_blank() {
        let mut selected = lines(&["    if x {", "        y();", "", "  ", "    }"]);
        dedent(&mut selected, Some(-1));
        assert_eq!(selected, lines(&["if x {", "    y();", "", "", "}"]));
    }

    #[test]
    fn test_none_is_auto() {
        let mut selected = lines(&["\tfoo", "\t\tbar"]);
        dedent(&mut selected, None);
        assert_eq!(selected, lines(&["foo", "\tbar"]));
    }

    #[test]
    fn test_fixed_dedent_never_goes_negative() {
        let mut selected = lines(&["      six", "  two", "none"]);
        dedent(&mut selected, Some(4));
        assert_eq!(selected, lines(&["  six", "two", "none"]));
    }

    #[test]
    fn test_zero_is_noop() {
        let mut selected = lines(&["  a", "    b"]);
        dedent(&mut selected, Some(0));
        assert_eq!(selected, lines(&["  a", "    b"]));
    }

    #[test]
    fn test_auto_dedent_is_idempotent() {
        let mut selected = lines(&["      a", "        b", "", "      c"]);
        dedent(&mut selected, Some(-1));
        let once = selected.clone();
        dedent(&mut selected, Some(-1));
        assert_eq!(selected, once);
    }

    #[test]
    fn test_highlight_positions_are_output_relative() {
        let set = LineSet::parse("1,3-").unwrap();
        assert_eq!(highlight_positions(Some(&set), 4), vec![1, 3, 4]);
        assert!(highlight_positions(None, 4).is_empty());
    }
}
