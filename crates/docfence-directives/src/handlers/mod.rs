//! Per-directive validation and markup.
//!
//! Each handler checks the attributes of one block kind and decides how the
//! block renders:
//!
//! | outcome  | used for                                              |
//! |----------|-------------------------------------------------------|
//! | `Wrap`   | valid container: markup around the rendered children  |
//! | `Leaf`   | valid self-closing directive                          |
//! | `Unwrap` | invalid container whose content is still user content |
//! | `Drop`   | invalid directive with nothing worth keeping          |
//!
//! Invalid blocks report a diagnostic through [`HandlerContext::report`] and
//! never affect their siblings.

mod code;
mod form;
mod image;
mod layout;
mod moniker;
mod noloc;
mod video;
mod zone;

use std::io;
use std::path::Path;

use docfence_snippets::ContentCache;

use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::engine::EngineOptions;
use crate::ids::short_hash;
use crate::node::{BlockKind, BlockNode};

/// How a block renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Wrap { open: String, close: String },
    Leaf(String),
    Unwrap,
    Drop,
}

impl Outcome {
    fn wrap(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self::Wrap {
            open: open.into(),
            close: close.into(),
        }
    }
}

/// File reader used to load snippet sources.
pub type ReadFile = dyn Fn(&Path) -> io::Result<String> + Send + Sync;

/// Everything a handler may consult while rendering one document.
pub(crate) struct HandlerContext<'a> {
    pub options: &'a EngineOptions,
    pub document_id: &'a str,
    pub cache: &'a ContentCache,
    pub read_file: &'a ReadFile,
    pub diagnostics: &'a mut Vec<Diagnostic>,
    /// Line of the block being handled.
    pub line: usize,
    next_id: usize,
}

impl<'a> HandlerContext<'a> {
    pub(crate) fn new(
        options: &'a EngineOptions,
        document_id: &'a str,
        cache: &'a ContentCache,
        read_file: &'a ReadFile,
        diagnostics: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            options,
            document_id,
            cache,
            read_file,
            diagnostics,
            line: 0,
            next_id: 0,
        }
    }

    /// Record a diagnostic at the current block.
    pub(crate) fn report(&mut self, code: DiagnosticCode, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::new(code, self.line, message));
    }

    /// Deterministic element id, unique within the document.
    pub(crate) fn element_id(&mut self, kind: &str) -> String {
        let ordinal = self.next_id.to_string();
        self.next_id += 1;
        let hash = short_hash(&[
            &self.options.document_id_salt,
            self.document_id,
            kind,
            &ordinal,
        ]);
        format!("{kind}-{hash}")
    }
}

/// Validate `node` and decide its markup.
///
/// Tab groups and panels are laid out by the renderer and never reach here.
pub(crate) fn handle(node: &BlockNode, ctx: &mut HandlerContext<'_>) -> Outcome {
    ctx.line = node.line;
    match node.kind {
        BlockKind::Zone => zone::handle(node, ctx),
        BlockKind::Moniker => moniker::handle(node, ctx),
        BlockKind::Row => layout::row(),
        BlockKind::Column => layout::column(node, ctx),
        BlockKind::Image => image::handle(node, ctx),
        BlockKind::Video => video::handle(node, ctx),
        BlockKind::Form => form::handle(node, ctx),
        BlockKind::NoLoc => noloc::handle(node, ctx),
        BlockKind::Code => code::handle(node, ctx),
        BlockKind::TabGroup | BlockKind::TabPanel => Outcome::Unwrap,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use docfence_snippets::ContentCache;

    use super::{HandlerContext, Outcome, ReadFile, handle};
    use crate::attrs::Attributes;
    use crate::diagnostic::Diagnostic;
    use crate::engine::EngineOptions;
    use crate::node::{BlockKind, BlockNode};

    fn no_files(path: &Path) -> std::io::Result<String> {
        Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            path.display().to_string(),
        ))
    }

    /// Run one handler on a block parsed from an attribute list.
    pub(crate) fn run(kind: BlockKind, attrs: &str) -> (Outcome, Vec<Diagnostic>) {
        run_with(kind, attrs, &EngineOptions::default(), &no_files)
    }

    pub(crate) fn run_with(
        kind: BlockKind,
        attrs: &str,
        options: &EngineOptions,
        read_file: &ReadFile,
    ) -> (Outcome, Vec<Diagnostic>) {
        let attributes = Attributes::parse(attrs).unwrap();
        let node = BlockNode::new(kind, attributes, 7);
        let cache = ContentCache::new();
        let mut diagnostics = Vec::new();
        let outcome = {
            let mut ctx =
                HandlerContext::new(options, "docs/page.md", &cache, read_file, &mut diagnostics);
            handle(&node, &mut ctx)
        };
        (outcome, diagnostics)
    }
}
