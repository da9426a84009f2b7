//! Document rendering entry point.
//!
//! [`DocfenceEngine`] owns the options, the file reader and the content
//! cache shared by every document of a build run. Each call to
//! [`DocfenceEngine::render`] tokenizes, builds and renders one document with
//! its own nesting machine, so documents can be rendered in parallel.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use docfence_config::{CliSettings, Config, ConfigError};
use docfence_snippets::ContentCache;
use rayon::prelude::*;

use crate::diagnostic::Diagnostic;
use crate::handlers::{HandlerContext, ReadFile};
use crate::nesting::NestingMachine;
use crate::node::Node;
use crate::render::render_nodes;
use crate::tabs::TabIds;
use crate::tokenizer::tokenize;

/// Rendering options, usually taken from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Root directory of snippet sources.
    pub source_dir: PathBuf,
    /// Dedent for snippets whose query gives none. `None` means auto.
    pub default_dedent: Option<i32>,
    /// Placeholder text for snippets that cannot be resolved.
    pub not_found_message: String,
    /// Salt mixed into generated ids.
    pub document_id_salt: String,
    /// Largest accepted video `max-width`, in pixels.
    pub max_video_width: u32,
    /// Prefix of tab group ids.
    pub tab_id_prefix: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl EngineOptions {
    /// Options from `docfence.toml` with host overrides applied.
    ///
    /// Without `config_path` the file is searched for from the current
    /// directory upwards; without one there, defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(
        config_path: Option<&Path>,
        settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let config = Config::load(config_path, settings)?;
        tracing::debug!(
            config = ?config.config_path,
            source_dir = %config.snippets_resolved.source_dir.display(),
            "Loaded configuration"
        );
        Ok(Self::from(&config))
    }
}

impl From<&Config> for EngineOptions {
    fn from(config: &Config) -> Self {
        let snippets = &config.snippets_resolved;
        Self {
            source_dir: snippets.source_dir.clone(),
            default_dedent: snippets.default_dedent,
            not_found_message: snippets.not_found_message.clone(),
            document_id_salt: config.directives.document_id_salt.clone(),
            max_video_width: config.directives.max_video_width,
            tab_id_prefix: config.tabs.id_prefix.clone(),
        }
    }
}

/// Output of rendering one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    pub html: String,
    /// Block tree the HTML was rendered from.
    pub tree: Vec<Node>,
    /// Every problem found, ordered by line.
    pub diagnostics: Vec<Diagnostic>,
}

/// Renders directive documents.
///
/// # Example
///
/// ```
/// use docfence_directives::{DiagnosticCode, DocfenceEngine, EngineOptions};
///
/// let engine = DocfenceEngine::new(EngineOptions::default());
/// let result = engine.render(
///     "docs/index.md",
///     ":::zone pivot=\"windows,linux\":::\nHello\n:::zone-end:::\n:::form submitText=\"Go\":::\n",
/// );
///
/// assert!(result.html.contains(r#"data-pivot="windows linux""#));
/// assert!(!result.html.contains("<form"));
/// assert_eq!(result.diagnostics[0].code, DiagnosticCode::InvalidForm);
/// ```
pub struct DocfenceEngine {
    options: EngineOptions,
    read_file: Arc<ReadFile>,
    cache: Arc<ContentCache>,
}

impl DocfenceEngine {
    /// Create an engine that reads snippet sources from disk.
    #[must_use]
    pub fn new(options: EngineOptions) -> Self {
        let read_file: Arc<ReadFile> = Arc::new(|path: &Path| std::fs::read_to_string(path));
        Self {
            options,
            read_file,
            cache: Arc::new(ContentCache::new()),
        }
    }

    /// Read snippet sources through `read_file` instead of the filesystem.
    #[must_use]
    pub fn with_read_file<F>(mut self, read_file: F) -> Self
    where
        F: Fn(&Path) -> io::Result<String> + Send + Sync + 'static,
    {
        self.read_file = Arc::new(read_file);
        self
    }

    /// Share a content cache with other engines of the same run.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<ContentCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    /// Tokenize and build the block tree without rendering.
    #[must_use]
    pub fn parse(&self, document_id: &str, markdown: &str) -> (Vec<Node>, Vec<Diagnostic>) {
        let tokenized = tokenize(markdown);
        let tab_ids = TabIds::new(
            &self.options.tab_id_prefix,
            &self.options.document_id_salt,
            document_id,
        );
        let (tree, mut diagnostics) = NestingMachine::build(tokenized.tokens, tab_ids);
        let mut all = tokenized.diagnostics;
        all.append(&mut diagnostics);
        (tree, all)
    }

    /// Render one document.
    ///
    /// Never fails: every problem becomes a diagnostic, is logged, and
    /// affects only the block it occurs in.
    #[must_use]
    pub fn render(&self, document_id: &str, markdown: &str) -> RenderResult {
        let (tree, mut diagnostics) = self.parse(document_id, markdown);

        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        {
            let mut ctx = HandlerContext::new(
                &self.options,
                document_id,
                &self.cache,
                self.read_file.as_ref(),
                &mut diagnostics,
            );
            render_nodes(&tree, &mut ctx, &mut html);
        }

        diagnostics.sort_by_key(|diagnostic| diagnostic.line);
        for diagnostic in &diagnostics {
            tracing::warn!(
                document = document_id,
                code = %diagnostic.code,
                line = diagnostic.line,
                "{}",
                diagnostic.message
            );
        }

        RenderResult {
            html,
            tree,
            diagnostics,
        }
    }

    /// Render `(document_id, markdown)` pairs in parallel, keeping order.
    #[must_use]
    pub fn render_batch(&self, documents: &[(&str, &str)]) -> Vec<RenderResult> {
        documents
            .par_iter()
            .map(|(document_id, markdown)| self.render(document_id, markdown))
            .collect()
    }
}

impl fmt::Debug for DocfenceEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocfenceEngine")
            .field("options", &self.options)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
