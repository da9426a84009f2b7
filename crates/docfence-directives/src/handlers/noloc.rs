//! `:::no-loc text="...":::` on a line of its own.

use super::{HandlerContext, Outcome};
use crate::diagnostic::DiagnosticCode;
use crate::html::escape_html;
use crate::node::BlockNode;

/// The text is emitted as written; only HTML special characters are escaped.
pub(super) fn handle(node: &BlockNode, ctx: &mut HandlerContext<'_>) -> Outcome {
    match node.attributes.get("text").filter(|text| !text.is_empty()) {
        Some(text) => Outcome::Leaf(escape_html(text)),
        None => {
            ctx.report(DiagnosticCode::InvalidAttributes, "no-loc requires text");
            Outcome::Drop
        }
    }
}
