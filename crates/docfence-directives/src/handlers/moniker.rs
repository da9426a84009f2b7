//! `:::moniker range=">= product-2.0":::`

use super::{HandlerContext, Outcome};
use crate::diagnostic::DiagnosticCode;
use crate::html::attr;
use crate::node::BlockNode;

pub(super) fn handle(node: &BlockNode, ctx: &mut HandlerContext<'_>) -> Outcome {
    match node.attributes.get_non_empty("range") {
        Some(range) => Outcome::wrap(format!("<div{}>", attr("data-moniker", range)), "</div>"),
        None => {
            ctx.report(
                DiagnosticCode::InvalidMonikerRange,
                "moniker requires a non-empty range",
            );
            Outcome::Unwrap
        }
    }
}
