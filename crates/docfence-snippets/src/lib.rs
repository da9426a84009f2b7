//! Source snippet inclusion.
//!
//! Extracts a precise subset of lines from a source file and post-processes
//! them for display. A reference such as `Program.cs?range=1-3,10&highlight=2`
//! or `Program.cs#Main` is parsed into a [`SnippetQuery`], resolved against the
//! file content by [`resolve`], then dedented and highlight-marked.
//!
//! # Selection
//!
//! - **Full file**: no selector.
//! - **Line ranges**: `range=1-2,10,29-` and/or `start`/`end`, evaluated in
//!   the order given, duplicates preserved.
//! - **Tags**: comment markers such as `// <snippet1>` ... `// </snippet1>`,
//!   matched case-insensitively.
//! - **Regions**: language region markers such as `#region Name` ... `#endregion`.
//!
//! # Example
//!
//! ```
//! use docfence_snippets::{SnippetQuery, resolve};
//!
//! let content = "class A {\n    // <body>\n    int x;\n    // </body>\n}\n";
//! let query = SnippetQuery::parse("A.cs#Body").unwrap();
//! let snippet = resolve(&query, content);
//!
//! assert_eq!(snippet.text(), "int x;\n");
//! assert!(snippet.warnings.is_empty());
//! ```
//!
//! File content is loaded through a [`ContentCache`] shared by every query of
//! one build run.

mod cache;
mod language;
mod markers;
mod postprocess;
mod query;
mod range;
mod resolve;
mod tag;
mod warning;

pub use cache::{ContentCache, SourceFile, normalize_path};
pub use language::Language;
pub use postprocess::{dedent, highlight_positions};
pub use query::{QueryError, Selector, SnippetQuery};
pub use range::{LineSet, LineSpan, RangeError};
pub use resolve::{ResolvedSnippet, resolve};
pub use tag::TagName;
pub use warning::SnippetWarning;
