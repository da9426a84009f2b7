//! Line tokenizer for directive documents.
//!
//! Classifies each line as a directive fence, a tab heading, a heading, a
//! thematic break or plain text. Recognized fences:
//!
//! ```text
//! :::zone target="docs":::      open (paired family, trailing ::: optional)
//! :::zone-end:::                close
//! ::: zone-end                  close
//! :::form action="a" submitText="Go":::   self-closing
//! [!code-csharp[](Program.cs#Main)]       classic snippet reference
//! ```
//!
//! Anything that does not parse cleanly stays plain text. Lines inside fenced
//! code blocks are never classified.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::attrs::Attributes;
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::fence::FenceTracker;
use crate::replacements::has_inline_no_loc;

const FENCE: &str = ":::";

static TAB_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}(#{1,6})[ \t]+\[([^\]]*)\]\(#tab/([^/)\s]*)(?:/([^)\s]*))?\)[ \t]*#*[ \t]*$")
        .unwrap()
});

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]|$)").unwrap());

static THEMATIC_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,})$").unwrap()
});

static CLASSIC_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*\[!code-([\w#+.-]*)\[([^\]]*)\]\(\s*<?([^)\s">]+)>?(?:\s+"([^"]*)")?\s*\)\]\s*$"#)
        .unwrap()
});

/// Directive names known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveName {
    Zone,
    Moniker,
    Row,
    Column,
    Image,
    Video,
    Form,
    NoLoc,
    Code,
}

impl DirectiveName {
    /// Case-insensitive lookup.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "zone" => Some(Self::Zone),
            "moniker" => Some(Self::Moniker),
            "row" => Some(Self::Row),
            "column" => Some(Self::Column),
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            "form" => Some(Self::Form),
            "no-loc" => Some(Self::NoLoc),
            "code" => Some(Self::Code),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zone => "zone",
            Self::Moniker => "moniker",
            Self::Row => "row",
            Self::Column => "column",
            Self::Image => "image",
            Self::Video => "video",
            Self::Form => "form",
            Self::NoLoc => "no-loc",
            Self::Code => "code",
        }
    }

    /// Whether a fence with these attributes has a body and an end marker.
    #[must_use]
    pub fn is_paired(self, attributes: &Attributes) -> bool {
        match self {
            Self::Zone | Self::Moniker | Self::Row | Self::Column => true,
            Self::Image => attributes
                .get("type")
                .is_some_and(|t| t.trim().eq_ignore_ascii_case("complex")),
            Self::Video | Self::Form | Self::NoLoc | Self::Code => false,
        }
    }

    /// Whether only the paired form exists, so an open fence may omit `:::`.
    fn is_always_paired(self) -> bool {
        matches!(self, Self::Zone | Self::Moniker | Self::Row | Self::Column)
    }
}

/// A recognized directive fence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveToken {
    pub name: DirectiveName,
    pub attributes: Attributes,
    pub self_closing: bool,
    /// Body lines, 0-based and end-exclusive. Empty for self-closing
    /// directives. A paired body starts right after the fence; its extent
    /// is known only once the block tree is built.
    pub body: Range<usize>,
    /// 1-based source line.
    pub line: usize,
    /// Source text, used when the fence is demoted to text.
    pub raw: String,
}

/// `# [Title](#tab/id/condition)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabHeading {
    pub level: usize,
    pub title: String,
    pub id: String,
    pub condition: Option<String>,
    pub line: usize,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Open(DirectiveToken),
    SelfClosing(DirectiveToken),
    Close {
        name: DirectiveName,
        line: usize,
        raw: String,
    },
    TabHeading(TabHeading),
    /// ATX heading that is not a tab heading.
    Heading {
        level: usize,
        line: usize,
        raw: String,
    },
    ThematicBreak {
        line: usize,
        raw: String,
    },
    Text {
        line: usize,
        raw: String,
    },
}

impl Token {
    /// 1-based source line.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::Open(token) | Self::SelfClosing(token) => token.line,
            Self::TabHeading(heading) => heading.line,
            Self::Close { line, .. }
            | Self::Heading { line, .. }
            | Self::ThematicBreak { line, .. }
            | Self::Text { line, .. } => *line,
        }
    }

    /// Source text of the line.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Open(token) | Self::SelfClosing(token) => &token.raw,
            Self::TabHeading(heading) => &heading.raw,
            Self::Close { raw, .. }
            | Self::Heading { raw, .. }
            | Self::ThematicBreak { raw, .. }
            | Self::Text { raw, .. } => raw,
        }
    }
}

/// Tokens of one document with the structural diagnostics found on the way.
#[derive(Debug, Default)]
pub struct Tokenized {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Tokenize a document.
///
/// # Example
///
/// ```
/// use docfence_directives::{DirectiveName, Token, tokenize};
///
/// let tokenized = tokenize(":::row:::\ntext\n:::row-end:::\n");
/// assert!(matches!(tokenized.tokens[0], Token::Open(ref t) if t.name == DirectiveName::Row));
/// assert!(matches!(tokenized.tokens[2], Token::Close { name: DirectiveName::Row, .. }));
/// ```
#[must_use]
pub fn tokenize(input: &str) -> Tokenized {
    let mut out = Tokenized::default();
    let mut fence = FenceTracker::new();

    for (idx, line) in input.lines().enumerate() {
        let line_num = idx + 1;
        let token = if fence.classify(line).is_code() {
            text(line, line_num)
        } else {
            classify_line(line, line_num, &mut out.diagnostics)
        };
        out.tokens.push(token);
    }

    out
}

fn text(line: &str, line_num: usize) -> Token {
    Token::Text {
        line: line_num,
        raw: line.to_owned(),
    }
}

fn classify_line(line: &str, line_num: usize, diagnostics: &mut Vec<Diagnostic>) -> Token {
    let trimmed = line.trim();

    if trimmed.starts_with(FENCE) {
        return directive_line(line, trimmed, line_num, diagnostics);
    }
    if trimmed.starts_with("[!code")
        && let Some(token) = classic_code(line, line_num)
    {
        return token;
    }
    if let Some(caps) = TAB_HEADING_RE.captures(line) {
        return Token::TabHeading(TabHeading {
            level: caps[1].len(),
            title: caps[2].trim().to_owned(),
            id: caps[3].to_owned(),
            condition: caps
                .get(4)
                .map(|m| m.as_str().to_owned())
                .filter(|c| !c.is_empty()),
            line: line_num,
            raw: line.to_owned(),
        });
    }
    if let Some(caps) = HEADING_RE.captures(line) {
        return Token::Heading {
            level: caps[1].len(),
            line: line_num,
            raw: line.to_owned(),
        };
    }
    if THEMATIC_BREAK_RE.is_match(line) {
        return Token::ThematicBreak {
            line: line_num,
            raw: line.to_owned(),
        };
    }
    text(line, line_num)
}

fn directive_line(
    line: &str,
    trimmed: &str,
    line_num: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Token {
    let after = &trimmed[FENCE.len()..];
    // `::::` and a bare `:::` are not directive fences.
    if after.starts_with(':') || after.trim().is_empty() {
        return text(line, line_num);
    }

    let after = after.trim_start();
    let name_len = after
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(after.len());
    let word = after[..name_len].to_ascii_lowercase();
    let rest = &after[name_len..];

    if let Some(base) = word.strip_suffix("-end") {
        return match DirectiveName::parse(base) {
            Some(name) if is_close_tail(rest) => Token::Close {
                name,
                line: line_num,
                raw: line.to_owned(),
            },
            _ => text(line, line_num),
        };
    }

    let Some(name) = DirectiveName::parse(&word) else {
        return text(line, line_num);
    };
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) && !rest.starts_with(FENCE) {
        return text(line, line_num);
    }

    let rest = rest.trim_end();
    let (attr_text, terminated) = match rest.strip_suffix(FENCE) {
        Some(inner) => (inner, true),
        None => (rest, false),
    };

    // A no-loc span sharing its line with prose belongs to the inline scan.
    if name == DirectiveName::NoLoc
        && (attr_text.contains(FENCE) || !terminated)
        && has_inline_no_loc(line)
    {
        return text(line, line_num);
    }

    let reject = |diagnostics: &mut Vec<Diagnostic>, message: String| {
        diagnostics.push(Diagnostic::new(
            DiagnosticCode::InvalidAttributes,
            line_num,
            message,
        ));
        text(line, line_num)
    };

    if attr_text.contains(FENCE) {
        return reject(
            diagnostics,
            format!("unexpected text after closing ::: of {}", name.as_str()),
        );
    }
    if !terminated && !name.is_always_paired() {
        return reject(diagnostics, format!("{} must end with :::", name.as_str()));
    }

    let attributes = match Attributes::parse_recovering(attr_text) {
        Ok((attributes, errors)) => {
            for error in errors {
                diagnostics.push(Diagnostic::new(
                    DiagnosticCode::InvalidAttributes,
                    line_num,
                    error.to_string(),
                ));
            }
            attributes
        }
        Err(error) => return reject(diagnostics, error.to_string()),
    };

    let paired = name.is_paired(&attributes);
    let token = DirectiveToken {
        name,
        attributes,
        self_closing: !paired,
        body: if paired { line_num..line_num } else { 0..0 },
        line: line_num,
        raw: line.to_owned(),
    };
    if paired {
        Token::Open(token)
    } else {
        Token::SelfClosing(token)
    }
}

/// What may follow `name-end`: nothing, or a closing `:::`.
fn is_close_tail(rest: &str) -> bool {
    let rest = rest.trim();
    rest.is_empty() || rest == FENCE
}

/// `[!code-lang[title](path?query#fragment "title")]`
fn classic_code(line: &str, line_num: usize) -> Option<Token> {
    let caps = CLASSIC_CODE_RE.captures(line)?;
    let mut attributes = Attributes::new();
    attributes.insert("source", &caps[3]);
    if !caps[1].is_empty() {
        attributes.insert("language", &caps[1]);
    }
    let title = caps
        .get(4)
        .map_or_else(|| caps[2].trim(), |m| m.as_str().trim());
    if !title.is_empty() {
        attributes.insert("title", title);
    }

    Some(Token::SelfClosing(DirectiveToken {
        name: DirectiveName::Code,
        attributes,
        self_closing: true,
        body: 0..0,
        line: line_num,
        raw: line.to_owned(),
    }))
}
