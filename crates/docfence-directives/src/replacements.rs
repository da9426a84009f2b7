//! Opaque spans inside Markdown text.
//!
//! Inline `:::no-loc text="...":::` spans must reach the output verbatim, so
//! they are swapped for placeholder tokens before the text run goes through
//! pulldown-cmark and swapped back in the rendered HTML.

use std::sync::LazyLock;

use regex::Regex;

use crate::attrs::Attributes;
use crate::html::escape_html;

static INLINE_NO_LOC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i):::no-loc\s+((?:[A-Za-z][\w.:-]*="(?:[^"\\\n]|\\.)*"\s*)+):::"#).unwrap()
});

/// Whether `text` holds an inline no-loc span the inline scan would pick up.
pub(crate) fn has_inline_no_loc(text: &str) -> bool {
    INLINE_NO_LOC_RE.is_match(text)
}

/// Collects placeholder replacements for one text run.
///
/// # Example
///
/// ```
/// use docfence_directives::Replacements;
///
/// let mut replacements = Replacements::new();
/// let text = replacements.protect_inline(r#"Run :::no-loc text="*args*"::: now"#);
/// let mut html = format!("<p>{text}</p>");
/// replacements.apply(&mut html);
///
/// assert_eq!(html, "<p>Run *args* now</p>");
/// ```
#[derive(Debug, Default)]
pub struct Replacements {
    items: Vec<(String, String)>,
}

impl Replacements {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a replacement of every occurrence of `from` with `to`.
    ///
    /// Replacements are applied in the order they are added.
    pub fn add(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.items.push((from.into(), to.into()));
    }

    /// Allocate a placeholder that [`apply`](Self::apply) turns into `html`.
    ///
    /// Placeholders are plain alphanumeric words that Markdown leaves alone.
    /// The trailing `Z` keeps `DFNOLOC1Z` from matching inside `DFNOLOC10Z`.
    pub fn placeholder(&mut self, html: impl Into<String>) -> String {
        let token = format!("DFNOLOC{}Z", self.items.len());
        self.add(token.clone(), html);
        token
    }

    /// Swap inline no-loc spans in `text` for placeholders.
    ///
    /// A span whose attributes do not parse, or that has no `text`, is left
    /// as written.
    pub fn protect_inline(&mut self, text: &str) -> String {
        if !text.contains(":::") {
            return text.to_owned();
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in INLINE_NO_LOC_RE.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let value = Attributes::parse(&caps[1])
                .ok()
                .and_then(|attrs| attrs.get("text").map(str::to_owned));
            let Some(value) = value else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);
            out.push_str(&self.placeholder(escape_html(&value)));
            last = whole.end();
        }
        out.push_str(&text[last..]);
        out
    }

    /// Apply all registered replacements, consuming the collector.
    pub fn apply(self, html: &mut String) {
        for (from, to) in self.items {
            if html.contains(&from) {
                *html = html.replace(&from, &to);
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_replacements() {
        let mut html = "unchanged".to_owned();
        Replacements::new().apply(&mut html);
        assert_eq!(html, "unchanged");
    }

    #[test]
    fn test_replacement_order() {
        let mut html = "aaa".to_owned();
        let mut replacements = Replacements::new();
        replacements.add("a", "bb");
        replacements.add("bb", "c");
        replacements.apply(&mut html);
        assert_eq!(html, "ccc");
    }

    #[test]
    fn test_placeholders_are_distinct() {
        let mut replacements = Replacements::new();
        let tokens: Vec<String> = (0..12)
            .map(|n| replacements.placeholder(n.to_string()))
            .collect();
        assert_eq!(replacements.len(), 12);

        let mut html = format!("{}|{}|{}", tokens[1], tokens[10], tokens[11]);
        replacements.apply(&mut html);
        assert_eq!(html, "1|10|11");
    }

    #[test]
    fn test_protect_inline_escapes_value() {
        let mut replacements = Replacements::new();
        let text = replacements
            .protect_inline(r#"A :::no-loc text="<Foo> & **bar**"::: and :::NO-LOC text="x":::."#);
        assert_eq!(text, "A DFNOLOC0Z and DFNOLOC1Z.");

        let mut html = text;
        replacements.apply(&mut html);
        assert_eq!(html, "A &lt;Foo&gt; &amp; **bar** and x.");
    }

    #[test]
    fn test_protect_inline_leaves_malformed_spans() {
        let mut replacements = Replacements::new();
        let input = r#"keep :::no-loc title="x"::: and :::zone:::"#;
        assert_eq!(replacements.protect_inline(input), input);
        assert!(replacements.is_empty());
    }
}
