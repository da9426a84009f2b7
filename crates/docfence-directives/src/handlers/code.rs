//! `:::code source="Program.cs" id="Main" highlight="2":::` and the classic
//! `[!code-csharp[](Program.cs#Main)]` form.
//!
//! The source reference may carry its own query and fragment; directive
//! attributes add to it. Relative paths resolve against the directory of the
//! document inside the snippet root, a leading `/` against the root itself.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use docfence_snippets::{ResolvedSnippet, SnippetQuery, resolve};

use super::{HandlerContext, Outcome};
use crate::diagnostic::DiagnosticCode;
use crate::html::{attr, escape_html};
use crate::node::BlockNode;

/// Attributes that describe the block rather than the selection.
const NON_QUERY_ATTRIBUTES: &[&str] = &["source", "title"];

pub(super) fn handle(node: &BlockNode, ctx: &mut HandlerContext<'_>) -> Outcome {
    let attrs = &node.attributes;
    let Some(source) = attrs.get_non_empty("source") else {
        ctx.report(DiagnosticCode::InvalidCode, "code requires source");
        return Outcome::Drop;
    };

    let pairs = attrs
        .iter()
        .filter(|(key, _)| !NON_QUERY_ATTRIBUTES.contains(key));
    let mut query = match SnippetQuery::parse_with(source, pairs) {
        Ok(query) => query,
        Err(e) => {
            ctx.report(DiagnosticCode::InvalidCode, e.to_string());
            return Outcome::Drop;
        }
    };
    let Some(language) = query.language_name() else {
        ctx.report(
            DiagnosticCode::InvalidCode,
            format!(
                "language is required when it cannot be inferred from \"{}\"",
                query.source_path
            ),
        );
        return Outcome::Drop;
    };
    if query.dedent.is_none() {
        query.dedent = ctx.options.default_dedent;
    }

    let snippet = load(&query, ctx);
    for warning in &snippet.warnings {
        ctx.report(DiagnosticCode::for_snippet(warning), warning.to_string());
    }
    if snippet.is_not_found() {
        return Outcome::Leaf(format!(
            r#"<div class="codesnippet-not-found">{}</div>"#,
            escape_html(&ctx.options.not_found_message)
        ));
    }

    let mut open = format!("<code{}", attr("class", &format!("lang-{language}")));
    if !snippet.highlight.is_empty() {
        open.push_str(&attr("highlight-lines", &compact_lines(&snippet.highlight)));
    }
    if let Some(interactive) = &query.interactive {
        open.push_str(&attr("data-interactive", interactive));
    }
    if let Some(title) = attrs.get_non_empty("title") {
        open.push_str(&attr("title", title));
    }
    Outcome::Leaf(format!(
        "<pre>{open}>{}</code></pre>",
        escape_html(&snippet.text())
    ))
}

fn load(query: &SnippetQuery, ctx: &HandlerContext<'_>) -> ResolvedSnippet {
    let path = source_path(query, ctx);
    let read_file = ctx.read_file;
    let file = ctx.cache.get_or_load(&path, |path| match read_file(path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Snippet source not readable");
            None
        }
    });
    match file {
        Some(file) => resolve(query, &file.content),
        None => ResolvedSnippet::source_not_found(&query.source_path),
    }
}

fn source_path(query: &SnippetQuery, ctx: &HandlerContext<'_>) -> PathBuf {
    let root = &ctx.options.source_dir;
    match query.source_path.strip_prefix('/') {
        Some(absolute) => root.join(absolute),
        None => {
            let document_dir = Path::new(ctx.document_id)
                .parent()
                .unwrap_or(Path::new(""));
            root.join(document_dir).join(&query.source_path)
        }
    }
}

/// `[1, 2, 3, 5]` as `1-3,5`.
fn compact_lines(lines: &[usize]) -> String {
    let mut out = String::new();
    let mut idx = 0;
    while idx < lines.len() {
        let start = lines[idx];
        let mut end = start;
        while idx + 1 < lines.len() && lines[idx + 1] == end + 1 {
            end += 1;
            idx += 1;
        }
        if !out.is_empty() {
            out.push(',');
        }
        if start == end {
            let _ = write!(out, "{start}");
        } else {
            let _ = write!(out, "{start}-{end}");
        }
        idx += 1;
    }
    out
}
