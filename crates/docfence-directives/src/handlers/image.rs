//! `:::image type="content" source="a.png" alt-text="...":::`
//!
//! `type="complex"` is paired: its body becomes a visually hidden long
//! description linked through `aria-describedby`.

use super::{HandlerContext, Outcome};
use crate::diagnostic::DiagnosticCode;
use crate::html::attr;
use crate::node::BlockNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageType {
    Content,
    Icon,
    Complex,
}

impl ImageType {
    fn parse(value: Option<&str>) -> Result<Self, String> {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("" | "content") => Ok(Self::Content),
            Some("icon") => Ok(Self::Icon),
            Some("complex") => Ok(Self::Complex),
            Some(other) => Err(format!(
                "invalid image type \"{other}\", expected content, icon or complex"
            )),
        }
    }
}

pub(super) fn handle(node: &BlockNode, ctx: &mut HandlerContext<'_>) -> Outcome {
    match render(node, ctx) {
        Ok(outcome) => outcome,
        Err(message) => {
            ctx.report(DiagnosticCode::InvalidImage, message);
            Outcome::Drop
        }
    }
}

fn render(node: &BlockNode, ctx: &mut HandlerContext<'_>) -> Result<Outcome, String> {
    let attrs = &node.attributes;
    let kind = ImageType::parse(attrs.get("type"))?;
    let source = attrs
        .get_non_empty("source")
        .ok_or_else(|| "image requires source".to_owned())?;
    let alt_text = attrs.get_non_empty("alt-text");
    if kind != ImageType::Icon && alt_text.is_none() {
        return Err("image requires alt-text unless type is icon".to_owned());
    }
    let border = match attrs.get("border").map(|b| b.trim().to_ascii_lowercase()) {
        None => kind != ImageType::Icon,
        Some(value) if value == "true" => true,
        Some(value) if value == "false" => false,
        Some(value) => return Err(format!("image border must be true or false, got \"{value}\"")),
    };
    let lightbox = attrs.get_non_empty("lightbox");
    let link = attrs.get_non_empty("link");
    if lightbox.is_some() && link.is_some() {
        return Err("image lightbox and link cannot be combined".to_owned());
    }

    let mut img = format!("<img{}", attr("src", source));
    match kind {
        ImageType::Icon => img.push_str(r#" role="presentation" alt="""#),
        ImageType::Content | ImageType::Complex => {
            img.push_str(&attr("alt", alt_text.unwrap_or_default()));
        }
    }
    if let Some(scope) = attrs.get_non_empty("loc-scope") {
        img.push_str(&attr("data-loc-scope", scope));
    }
    let description_id = (kind == ImageType::Complex).then(|| ctx.element_id("image-description"));
    if let Some(id) = &description_id {
        img.push_str(&attr("aria-describedby", id));
    }
    img.push('>');

    if border {
        img = format!(r#"<span class="mx-imgBorder">{img}</span>"#);
    }
    if let Some(target) = lightbox {
        img = format!(
            r#"<a{} data-linktype="relative-path">{img}</a>"#,
            attr("href", &format!("{target}#lightbox"))
        );
    } else if let Some(link) = link {
        img = format!("<a{}>{img}</a>", attr("href", link));
    }
    let open = format!(r#"<p class="image">{img}</p>"#);

    Ok(match description_id {
        Some(id) => Outcome::wrap(
            format!(r#"{open}<div{} class="visually-hidden">"#, attr("id", &id)),
            "</div>",
        ),
        None => Outcome::Leaf(open),
    })
}
