//! HTML rendering of the block tree.
//!
//! Text runs are plain Markdown rendered with pulldown-cmark. Blocks get
//! their markup from the handlers; tab groups are laid out here.

use pulldown_cmark::{Options, Parser};

use crate::handlers::{self, HandlerContext, Outcome};
use crate::node::{BlockKind, BlockNode, Node};
use crate::replacements::Replacements;
use crate::tabs;

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM
}

/// Render `nodes` in order, appending to `out`.
pub(crate) fn render_nodes(nodes: &[Node], ctx: &mut HandlerContext<'_>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(run) => render_markdown(&run.text, out),
            Node::Block(block) => render_block(block, ctx, out),
        }
    }
}

fn render_block(block: &BlockNode, ctx: &mut HandlerContext<'_>, out: &mut String) {
    match block.kind {
        BlockKind::TabGroup => render_tab_group(block, ctx, out),
        BlockKind::TabPanel => render_nodes(&block.children, ctx, out),
        _ => match handlers::handle(block, ctx) {
            Outcome::Wrap { open, close } => {
                out.push_str(&open);
                out.push('\n');
                render_nodes(&block.children, ctx, out);
                out.push_str(&close);
                out.push('\n');
            }
            Outcome::Leaf(html) => {
                out.push_str(&html);
                out.push('\n');
            }
            Outcome::Unwrap => render_nodes(&block.children, ctx, out),
            Outcome::Drop => {}
        },
    }
}

fn render_tab_group(group: &BlockNode, ctx: &mut HandlerContext<'_>, out: &mut String) {
    out.push_str(&tabs::group_open(group));
    let panels = group.children.iter().filter_map(|child| match child {
        Node::Block(panel) if panel.kind == BlockKind::TabPanel => Some(panel),
        _ => None,
    });
    for (idx, panel) in panels.enumerate() {
        out.push_str(&tabs::panel_open(panel, idx));
        out.push('\n');
        render_nodes(&panel.children, ctx, out);
        out.push_str("</section>\n");
    }
    out.push_str("</div>\n");
}

/// Render one Markdown text run, keeping inline no-loc spans opaque.
pub(crate) fn render_markdown(text: &str, out: &mut String) {
    if text.trim().is_empty() {
        return;
    }
    let mut replacements = Replacements::new();
    let text = replacements.protect_inline(text);

    let mut html = String::with_capacity(text.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, Parser::new_ext(&text, parser_options()));
    replacements.apply(&mut html);
    out.push_str(&html);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn markdown(text: &str) -> String {
        let mut out = String::new();
        render_markdown(text, &mut out);
        out
    }

    #[test]
    fn test_markdown_run() {
        assert_eq!(markdown("Some *text*.\n"), "<p>Some <em>text</em>.</p>\n");
        assert_eq!(markdown("\n  \n"), "");
    }

    #[test]
    fn test_inline_no_loc_is_opaque() {
        assert_eq!(
            markdown("Use :::no-loc text=\"*Azure*\"::: here.\n"),
            "<p>Use *Azure* here.</p>\n"
        );
    }

    #[test]
    fn test_gfm_tables() {
        let html = markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }
}
