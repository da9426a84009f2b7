//! Code fence tracking.
//!
//! Directive fences and tab headings inside fenced code blocks are content,
//! so the tokenizer asks the tracker about every line before classifying it.

/// Where a line sits relative to fenced code blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FenceLine {
    /// Opens a code block.
    Opening,
    /// Inside a code block.
    Inside,
    /// Closes a code block.
    Closing,
    /// Ordinary Markdown.
    Outside,
}

impl FenceLine {
    /// Whether the line belongs to a code block, fences included.
    pub(crate) fn is_code(self) -> bool {
        !matches!(self, Self::Outside)
    }
}

/// Tracks the open code fence while scanning line by line.
///
/// A fence is three or more backticks or tildes. It is closed by a line of
/// the same character, at least as long, with nothing but whitespace after.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Classify `line` and advance the fence state.
    pub(crate) fn classify(&mut self, line: &str) -> FenceLine {
        let trimmed = line.trim_start();
        match self.open {
            Some((ch, len)) => {
                if closes(trimmed, ch, len) {
                    self.open = None;
                    FenceLine::Closing
                } else {
                    FenceLine::Inside
                }
            }
            None => match opening(trimmed) {
                Some(fence) => {
                    self.open = Some(fence);
                    FenceLine::Opening
                }
                None => FenceLine::Outside,
            },
        }
    }
}

fn run_length(s: &str, ch: char) -> usize {
    s.chars().take_while(|&c| c == ch).count()
}

fn opening(trimmed: &str) -> Option<(char, usize)> {
    let ch = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = run_length(trimmed, ch);
    // A backtick fence's info string may not contain backticks.
    if len < 3 || (ch == '`' && trimmed[len..].contains('`')) {
        return None;
    }
    Some((ch, len))
}

fn closes(trimmed: &str, ch: char, min_len: usize) -> bool {
    let len = run_length(trimmed, ch);
    len >= min_len && trimmed[len..].trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_all(lines: &[&str]) -> Vec<FenceLine> {
        let mut tracker = FenceTracker::new();
        lines.iter().map(|line| tracker.classify(line)).collect()
    }

    #[test]
    fn test_backtick_block() {
        assert_eq!(
            classify_all(&["```markdown", ":::zone target=\"pdf\":::", "```", ":::row:::"]),
            vec![
                FenceLine::Opening,
                FenceLine::Inside,
                FenceLine::Closing,
                FenceLine::Outside,
            ]
        );
    }

    #[test]
    fn test_closing_must_match_char_and_length() {
        assert_eq!(
            classify_all(&["````", "```", "~~~~", "`````  "]),
            vec![
                FenceLine::Opening,
                FenceLine::Inside,
                FenceLine::Inside,
                FenceLine::Closing,
            ]
        );
    }

    #[test]
    fn test_closing_fence_takes_no_info_string() {
        assert_eq!(
            classify_all(&["~~~", "~~~ python", "~~~"]),
            vec![FenceLine::Opening, FenceLine::Inside, FenceLine::Closing]
        );
    }

    #[test]
    fn test_indented_fence() {
        assert_eq!(
            classify_all(&["    ```cs", "  ```"]),
            vec![FenceLine::Opening, FenceLine::Closing]
        );
    }

    #[test]
    fn test_not_fences() {
        assert_eq!(
            classify_all(&["``inline``", "```a`b", ":::"]),
            vec![FenceLine::Outside, FenceLine::Outside, FenceLine::Outside]
        );
        assert!(!FenceLine::Outside.is_code());
        assert!(FenceLine::Closing.is_code());
    }
}
