//! `:::row:::` and `:::column span="2":::`

use super::{HandlerContext, Outcome};
use crate::diagnostic::DiagnosticCode;
use crate::node::BlockNode;

pub(super) fn row() -> Outcome {
    Outcome::wrap(r#"<section class="row">"#, "</section>")
}

/// Column with a `span{n}` size class. A bad span falls back to 1.
pub(super) fn column(node: &BlockNode, ctx: &mut HandlerContext<'_>) -> Outcome {
    let span = match node.attributes.get("span").map(str::trim) {
        None => 1,
        Some(value) => match value.parse::<u32>() {
            Ok(span) if span > 0 => span,
            _ => {
                ctx.report(
                    DiagnosticCode::InvalidAttributes,
                    format!("column span must be a positive integer, got \"{value}\""),
                );
                1
            }
        },
    };
    Outcome::wrap(format!(r#"<div class="column span{span}">"#), "</div>")
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run;
    use super::*;
    use crate::node::BlockKind;

    #[test]
    fn test_row() {
        assert_eq!(
            run(BlockKind::Row, "").0,
            Outcome::wrap(r#"<section class="row">"#, "</section>")
        );
    }

    #[test]
    fn test_column_span() {
        let (outcome, diagnostics) = run(BlockKind::Column, r#"span="3""#);
        assert!(diagnostics.is_empty());
        assert_eq!(outcome, Outcome::wrap(r#"<div class="column span3">"#, "</div>"));
        assert_eq!(
            run(BlockKind::Column, "").0,
            Outcome::wrap(r#"<div class="column span1">"#, "</div>")
        );
    }

    #[test]
    fn test_bad_span_falls_back() {
        for span in ["0", "-1", "two"] {
            let (outcome, diagnostics) = run(BlockKind::Column, &format!(r#"span="{span}""#));
            assert_eq!(outcome, Outcome::wrap(r#"<div class="column span1">"#, "</div>"));
            assert_eq!(diagnostics[0].code, DiagnosticCode::InvalidAttributes);
        }
    }
}
