//! `:::zone target="docs" pivot="a,b":::`

use super::{HandlerContext, Outcome};
use crate::diagnostic::DiagnosticCode;
use crate::html::attr;
use crate::node::BlockNode;

const TARGETS: &[&str] = &["docs", "chromeless", "pdf"];

pub(super) fn handle(node: &BlockNode, ctx: &mut HandlerContext<'_>) -> Outcome {
    match validate(node) {
        Ok(open) => Outcome::wrap(open, "</div>"),
        Err(message) => {
            ctx.report(DiagnosticCode::InvalidZone, message);
            Outcome::Unwrap
        }
    }
}

fn validate(node: &BlockNode) -> Result<String, String> {
    let target = node
        .attributes
        .get("target")
        .map(|target| target.trim().to_ascii_lowercase());
    let pivot = node.attributes.get("pivot").map(normalize_pivot).transpose()?;

    if target.is_none() && pivot.is_none() {
        return Err("zone requires target or pivot".to_owned());
    }
    if let Some(target) = &target
        && !TARGETS.contains(&target.as_str())
    {
        return Err(format!(
            "invalid zone target \"{target}\", expected one of {}",
            TARGETS.join(", ")
        ));
    }

    let mut classes = vec!["zone"];
    let mut data = String::new();
    if let Some(target) = &target {
        classes.push("has-target");
        data.push_str(&attr("data-target", target));
    }
    if let Some(pivot) = &pivot {
        classes.push("has-pivot");
        data.push_str(&attr("data-pivot", pivot));
    }
    Ok(format!(r#"<div class="{}"{data}>"#, classes.join(" ")))
}

/// Split on commas and whitespace and rejoin with single spaces.
fn normalize_pivot(pivot: &str) -> Result<String, String> {
    let tokens: Vec<&str> = pivot
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .collect();
    if tokens.is_empty() {
        return Err("zone pivot is empty".to_owned());
    }
    if let Some(bad) = tokens
        .iter()
        .find(|token| !token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
    {
        return Err(format!("invalid zone pivot \"{bad}\""));
    }
    Ok(tokens.join(" "))
}
