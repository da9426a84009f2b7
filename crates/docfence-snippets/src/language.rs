//! Source languages recognized for snippet markers.
//!
//! Only the comment and region marker syntax of each language matters here;
//! nothing else about the source is parsed.

use crate::markers::{CommentStyle, RegionStyle};

const SLASH: CommentStyle = CommentStyle::line("//");
const HASH: CommentStyle = CommentStyle::line("#");
const DASH: CommentStyle = CommentStyle::line("--");
const QUOTE: CommentStyle = CommentStyle::line("'");
const BLOCK: CommentStyle = CommentStyle::block("/*", "*/");
const XML: CommentStyle = CommentStyle::block("<!--", "-->");
const FSHARP_BLOCK: CommentStyle = CommentStyle::block("(*", "*)");

const ALL_COMMENTS: &[CommentStyle] = &[SLASH, HASH, DASH, QUOTE, BLOCK, XML, FSHARP_BLOCK];
const ALL_REGIONS: &[RegionStyle] = &[
    RegionStyle::CSharp,
    RegionStyle::VisualBasic,
    RegionStyle::SlashRegion,
    RegionStyle::Pragma,
    RegionStyle::HashRegion,
    RegionStyle::Xml,
];

/// Languages with known marker syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    CSharp,
    VisualBasic,
    FSharp,
    Cpp,
    C,
    Java,
    JavaScript,
    TypeScript,
    Go,
    Rust,
    Kotlin,
    Swift,
    Php,
    Python,
    Ruby,
    PowerShell,
    Shell,
    Yaml,
    Sql,
    Lua,
    Xml,
    Html,
    Css,
}

impl Language {
    /// Parse a language name as written in `language="..."` or a `code-` prefix.
    ///
    /// Returns None for names without known marker syntax.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "csharp" | "cs" | "c#" => Some(Self::CSharp),
            "vb" | "vbnet" | "visualbasic" => Some(Self::VisualBasic),
            "fsharp" | "fs" | "f#" => Some(Self::FSharp),
            "cpp" | "c++" | "cplusplus" => Some(Self::Cpp),
            "c" => Some(Self::C),
            "java" => Some(Self::Java),
            "javascript" | "js" => Some(Self::JavaScript),
            "typescript" | "ts" => Some(Self::TypeScript),
            "go" | "golang" => Some(Self::Go),
            "rust" | "rs" => Some(Self::Rust),
            "kotlin" | "kt" => Some(Self::Kotlin),
            "swift" => Some(Self::Swift),
            "php" => Some(Self::Php),
            "python" | "py" => Some(Self::Python),
            "ruby" | "rb" => Some(Self::Ruby),
            "powershell" | "ps1" | "pwsh" => Some(Self::PowerShell),
            "bash" | "sh" | "shell" => Some(Self::Shell),
            "yaml" | "yml" => Some(Self::Yaml),
            "sql" | "tsql" => Some(Self::Sql),
            "lua" => Some(Self::Lua),
            "xml" | "xaml" | "csproj" => Some(Self::Xml),
            "html" | "htm" | "razor" | "cshtml" => Some(Self::Html),
            "css" | "scss" | "less" => Some(Self::Css),
            _ => None,
        }
    }

    /// Detect the language from a file path's extension.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "h" | "hpp" | "cc" | "cxx" => Some(Self::Cpp),
            "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "tsx" => Some(Self::TypeScript),
            "psm1" => Some(Self::PowerShell),
            "fsx" | "fsi" => Some(Self::FSharp),
            "kts" => Some(Self::Kotlin),
            "config" | "props" | "targets" | "resx" | "vbproj" | "fsproj" => Some(Self::Xml),
            other => Self::parse(other),
        }
    }

    /// Name used in the rendered `lang-*` class.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::CSharp => "csharp",
            Self::VisualBasic => "vb",
            Self::FSharp => "fsharp",
            Self::Cpp => "cpp",
            Self::C => "c",
            Self::Java => "java",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Kotlin => "kotlin",
            Self::Swift => "swift",
            Self::Php => "php",
            Self::Python => "python",
            Self::Ruby => "ruby",
            Self::PowerShell => "powershell",
            Self::Shell => "bash",
            Self::Yaml => "yaml",
            Self::Sql => "sql",
            Self::Lua => "lua",
            Self::Xml => "xml",
            Self::Html => "html",
            Self::Css => "css",
        }
    }

    /// Comment syntaxes that may carry `<tag>` markers.
    pub(crate) fn comment_styles(self) -> &'static [CommentStyle] {
        match self {
            Self::CSharp
            | Self::Cpp
            | Self::C
            | Self::Java
            | Self::JavaScript
            | Self::TypeScript
            | Self::Go
            | Self::Rust
            | Self::Kotlin
            | Self::Swift => &[SLASH, BLOCK],
            Self::FSharp => &[SLASH, FSHARP_BLOCK],
            Self::Php => &[SLASH, HASH, BLOCK],
            Self::VisualBasic => &[QUOTE],
            Self::Python | Self::Ruby | Self::PowerShell | Self::Shell | Self::Yaml => &[HASH],
            Self::Sql | Self::Lua => &[DASH],
            Self::Xml | Self::Html => &[XML],
            Self::Css => &[BLOCK],
        }
    }

    /// Region marker syntaxes.
    pub(crate) fn region_styles(self) -> &'static [RegionStyle] {
        match self {
            Self::CSharp => &[RegionStyle::CSharp],
            Self::VisualBasic => &[RegionStyle::VisualBasic],
            Self::FSharp | Self::JavaScript | Self::TypeScript => &[RegionStyle::SlashRegion],
            Self::Cpp | Self::C => &[RegionStyle::Pragma],
            Self::Python | Self::PowerShell => &[RegionStyle::HashRegion],
            Self::Xml | Self::Html => &[RegionStyle::Xml],
            Self::Java
            | Self::Go
            | Self::Rust
            | Self::Kotlin
            | Self::Swift
            | Self::Php
            | Self::Ruby
            | Self::Shell
            | Self::Yaml
            | Self::Sql
            | Self::Lua
            | Self::Css => &[],
        }
    }
}

/// Comment syntaxes to try when the language is unknown.
pub(crate) fn all_comment_styles() -> &'static [CommentStyle] {
    ALL_COMMENTS
}

/// Region syntaxes to try when the language is unknown.
pub(crate) fn all_region_styles() -> &'static [RegionStyle] {
    ALL_REGIONS
}
