//! `:::form action="..." submitText="..." model="...":::`

use super::{HandlerContext, Outcome};
use crate::diagnostic::DiagnosticCode;
use crate::html::{attr, escape_html};
use crate::node::BlockNode;

pub(super) fn handle(node: &BlockNode, ctx: &mut HandlerContext<'_>) -> Outcome {
    let attrs = &node.attributes;
    let (Some(action), Some(submit_text)) =
        (attrs.get_non_empty("action"), attrs.get_non_empty("submitText"))
    else {
        ctx.report(
            DiagnosticCode::InvalidForm,
            "form requires both action and submitText",
        );
        return Outcome::Drop;
    };

    let model = attrs
        .get_non_empty("model")
        .map(|model| attr("data-model", model))
        .unwrap_or_default();
    Outcome::Leaf(format!(
        r#"<form class="chromeless-form"{model}{}><div></div><button class="button is-primary" disabled="disabled" type="submit">{}</button></form>"#,
        attr("data-action", action),
        escape_html(submit_text),
    ))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run;
    use super::*;
    use crate::node::BlockKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_form_markup() {
        let (outcome, diagnostics) = run(
            BlockKind::Form,
            r#"model="./form.json" action="create" submitText="Create &amp; go""#,
        );
        assert!(diagnostics.is_empty());
        assert_eq!(
            outcome,
            Outcome::Leaf(
                r#"<form class="chromeless-form" data-model="./form.json" data-action="create"><div></div><button class="button is-primary" disabled="disabled" type="submit">Create &amp;amp; go</button></form>"#
                    .to_owned()
            )
        );
    }

    #[test]
    fn test_missing_action_drops_form() {
        let (outcome, diagnostics) = run(BlockKind::Form, r#"submitText="Create""#);
        assert_eq!(outcome, Outcome::Drop);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::InvalidForm);
        assert_eq!(diagnostics[0].line, 7);
    }

    #[test]
    fn test_blank_submit_text_is_missing() {
        let (outcome, diagnostics) = run(BlockKind::Form, r#"action="a" submitText="  ""#);
        assert_eq!(outcome, Outcome::Drop);
        assert_eq!(diagnostics[0].code, DiagnosticCode::InvalidForm);
    }
}
