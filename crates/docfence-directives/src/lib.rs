//! Triple-colon Markdown directives.
//!
//! Extends Markdown with block directives written as fences:
//!
//! ```markdown
//! :::zone target="docs" pivot="windows,linux":::
//! Shown for Windows and Linux readers.
//! :::zone-end:::
//!
//! :::row:::
//!    :::column span="2":::
//!    Wide column.
//!    :::column-end:::
//! :::row-end:::
//!
//! :::image type="content" source="media/chart.png" alt-text="Sales chart":::
//! :::code source="Program.cs" id="Main" highlight="2-3":::
//! ```
//!
//! Tab groups are written as headings whose link targets `#tab/<id>`:
//!
//! ```markdown
//! # [Windows](#tab/windows)
//! ...
//! # [Linux](#tab/linux)
//! ...
//! ---
//! ```
//!
//! # Pipeline
//!
//! ```text
//! markdown ─▶ tokenize ─▶ NestingMachine ─▶ block tree ─▶ handlers + pulldown-cmark ─▶ HTML
//!                 │              │                               │
//!                 └──────────────┴───────── diagnostics ─────────┘
//! ```
//!
//! A malformed directive never stops the document: structural problems turn
//! the fence into plain text, invalid attributes drop or unwrap the block,
//! and each case is reported as a [`Diagnostic`].
//!
//! # Example
//!
//! ```
//! use docfence_directives::{DocfenceEngine, EngineOptions};
//!
//! let engine = DocfenceEngine::new(EngineOptions::default());
//! let result = engine.render("guide.md", ":::moniker range=\">= v2\":::\nNew in v2.\n:::moniker-end:::\n");
//!
//! assert_eq!(
//!     result.html,
//!     "<div data-moniker=\"&gt;= v2\">\n<p>New in v2.</p>\n</div>\n"
//! );
//! ```

mod attrs;
mod diagnostic;
mod engine;
mod fence;
mod handlers;
mod html;
mod ids;
mod nesting;
mod node;
mod render;
mod replacements;
mod tabs;
mod tokenizer;

pub use attrs::{AttributeError, Attributes};
pub use docfence_config::{CliSettings, ConfigError};
pub use diagnostic::{Diagnostic, DiagnosticCode};
pub use engine::{DocfenceEngine, EngineOptions, RenderResult};
pub use handlers::ReadFile;
pub use nesting::NestingMachine;
pub use node::{BlockKind, BlockNode, Node, TextRun};
pub use replacements::Replacements;
pub use tabs::TabIds;
pub use tokenizer::{DirectiveName, DirectiveToken, TabHeading, Token, Tokenized, tokenize};
