//! Directive attribute lists.
//!
//! Parses the text between a directive name and its closing `:::`:
//!
//! ```text
//! action="create-resource" submitText="Create" model="./form.json"
//! ```
//!
//! Every attribute is `name="value"`. Inside a value `\"` is a quote and
//! `\\` a backslash. A value may not span lines, including through a
//! trailing `\` continuation.

use std::fmt;

/// Error parsing an attribute list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    #[error("malformed attributes: {0}")]
    MalformedAttributes(String),

    #[error("attribute \"{0}\" has no value")]
    AttributeMissingValue(String),

    #[error("attribute \"{0}\" given more than once")]
    DuplicateAttribute(String),

    #[error("invalid attribute name \"{0}\"")]
    InvalidAttributeName(String),

    #[error("value of attribute \"{0}\" spans more than one line")]
    MultiLineValue(String),
}

impl AttributeError {
    /// Whether parsing can continue past this error.
    ///
    /// A duplicate keeps the first value; every other error rejects the list.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DuplicateAttribute(_))
    }
}

/// Ordered attribute list with unique, case-sensitive names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    items: Vec<(String, String)>,
}

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an attribute list, failing on the first error.
    ///
    /// # Example
    ///
    /// ```
    /// use docfence_directives::Attributes;
    ///
    /// let attrs = Attributes::parse(r#"pivot="a,b" target="docs""#).unwrap();
    /// assert_eq!(attrs.get("pivot"), Some("a,b"));
    /// assert_eq!(attrs.get("Target"), None);
    /// ```
    pub fn parse(input: &str) -> Result<Self, AttributeError> {
        let (attrs, mut errors) = Self::parse_recovering(input)?;
        if errors.is_empty() {
            Ok(attrs)
        } else {
            Err(errors.remove(0))
        }
    }

    /// Parse an attribute list, keeping the first value of duplicates.
    ///
    /// Recoverable errors are returned alongside the attributes.
    pub fn parse_recovering(input: &str) -> Result<(Self, Vec<AttributeError>), AttributeError> {
        let mut attrs = Self::new();
        let mut errors = Vec::new();
        let mut scanner = Scanner::new(input);

        while scanner.skip_whitespace() {
            let name = scanner.name()?;
            let value = scanner.value(&name)?;
            if attrs.contains(&name) {
                errors.push(AttributeError::DuplicateAttribute(name));
            } else {
                attrs.items.push((name, value));
            }
        }

        Ok((attrs, errors))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Value with surrounding whitespace removed, `None` if absent or blank.
    #[must_use]
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).map(str::trim).filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|(key, _)| key == name)
    }

    /// Set a value, replacing an existing one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.items.iter_mut().find(|(key, _)| *key == name) {
            Some(item) => item.1 = value,
            None => self.items.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (key, value)) in self.items.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            let escaped = value.replace('\\', r"\\").replace('"', r#"\""#);
            write!(f, r#"{key}="{escaped}""#)?;
        }
        Ok(())
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Skip whitespace; returns whether input remains.
    fn skip_whitespace(&mut self) -> bool {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
        self.pos < self.input.len()
    }

    fn name(&mut self) -> Result<String, AttributeError> {
        let rest = self.rest();
        let len = rest.find(|c: char| !is_name_char(c)).unwrap_or(rest.len());
        let name = &rest[..len];

        let starts_with_letter = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
        let terminator = rest[len..].chars().next();
        let clean_end = matches!(terminator, None | Some('='))
            || terminator.is_some_and(char::is_whitespace);

        if !starts_with_letter || !clean_end {
            // Report the whole run up to `=` or whitespace.
            let bad_len = rest
                .find(|c: char| c == '=' || c.is_whitespace())
                .unwrap_or(rest.len());
            return Err(AttributeError::InvalidAttributeName(
                rest[..bad_len].to_owned(),
            ));
        }

        self.pos += len;
        Ok(name.to_owned())
    }

    fn value(&mut self, name: &str) -> Result<String, AttributeError> {
        if self.peek() != Some('=') {
            return Err(AttributeError::AttributeMissingValue(name.to_owned()));
        }
        self.pos += 1;

        if self.peek() != Some('"') {
            return Err(AttributeError::MalformedAttributes(format!(
                "expected '\"' after {name}="
            )));
        }
        self.pos += 1;

        let mut value = String::new();
        let mut chars = self.rest().char_indices();
        while let Some((idx, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += idx + 1;
                    return self.after_value(name).map(|()| value);
                }
                '\n' | '\r' => return Err(AttributeError::MultiLineValue(name.to_owned())),
                '\\' => match chars.next() {
                    Some((_, '"')) => value.push('"'),
                    Some((_, '\\')) => value.push('\\'),
                    Some((_, '\n' | '\r')) | None => {
                        return Err(AttributeError::MultiLineValue(name.to_owned()));
                    }
                    Some((_, other)) => {
                        value.push('\\');
                        value.push(other);
                    }
                },
                other => value.push(other),
            }
        }

        Err(AttributeError::MalformedAttributes(format!(
            "unbalanced quote in value of {name}"
        )))
    }

    fn after_value(&self, name: &str) -> Result<(), AttributeError> {
        match self.peek() {
            None => Ok(()),
            Some(c) if c.is_whitespace() => Ok(()),
            Some(c) => Err(AttributeError::MalformedAttributes(format!(
                "unexpected '{c}' after value of {name}"
            ))),
        }
    }
}
