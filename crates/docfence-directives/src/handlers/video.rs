//! `:::video source="https://..." title="..." max-width="640":::`
//!
//! Known providers get their privacy-friendly embed URL:
//!
//! | provider                 | embed                                     |
//! |--------------------------|-------------------------------------------|
//! | YouTube                  | `https://www.youtube-nocookie.com/embed/ID` |
//! | Vimeo                    | `https://player.vimeo.com/video/ID`       |
//! | Channel 9                | `.../player?nocookie=true`                |
//! | Microsoft video player   | `...?nocookie=true`                       |
//!
//! Other hosts are embedded as written.

use url::Url;

use super::{HandlerContext, Outcome};
use crate::diagnostic::DiagnosticCode;
use crate::html::attr;
use crate::node::BlockNode;

pub(super) fn handle(node: &BlockNode, ctx: &mut HandlerContext<'_>) -> Outcome {
    match render(node, ctx.options.max_video_width) {
        Ok(html) => Outcome::Leaf(html),
        Err(message) => {
            ctx.report(DiagnosticCode::InvalidVideo, message);
            Outcome::Drop
        }
    }
}

fn render(node: &BlockNode, max_width_limit: u32) -> Result<String, String> {
    let attrs = &node.attributes;
    let source = attrs
        .get_non_empty("source")
        .ok_or_else(|| "video requires source".to_owned())?;
    let title = attrs
        .get_non_empty("title")
        .ok_or_else(|| "video requires title".to_owned())?;
    let max_width = attrs
        .get("max-width")
        .map(|value| parse_max_width(value, max_width_limit))
        .transpose()?;

    let url = Url::parse(source).map_err(|e| format!("invalid video source \"{source}\": {e}"))?;
    let src = embed_url(&url).unwrap_or_else(|| source.to_owned());

    let style = max_width
        .map(|width| attr("style", &format!("max-width: {width}px;")))
        .unwrap_or_default();
    Ok(format!(
        r#"<div class="embeddedvideo"><iframe{}{} allowFullScreen="true" frameBorder="0"{style}></iframe></div>"#,
        attr("src", &src),
        attr("title", title),
    ))
}

fn parse_max_width(value: &str, limit: u32) -> Result<u32, String> {
    match value.trim().parse::<u32>() {
        Ok(width) if width > 0 && width <= limit => Ok(width),
        Ok(width) => Err(format!("video max-width {width} is outside 1..={limit}")),
        Err(_) => Err(format!("video max-width must be a number, got \"{value}\"")),
    }
}

/// Provider-specific embed URL, `None` for unknown hosts.
fn embed_url(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    match host {
        "youtube.com" | "m.youtube.com" => {
            let id = match segments.next()? {
                "watch" => url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, v)| v.into_owned())?,
                "embed" => segments.next()?.to_owned(),
                _ => return None,
            };
            Some(format!("https://www.youtube-nocookie.com/embed/{id}"))
        }
        "youtu.be" => Some(format!(
            "https://www.youtube-nocookie.com/embed/{}",
            segments.next()?
        )),
        "vimeo.com" => {
            let id = segments.next().filter(|id| id.chars().all(|c| c.is_ascii_digit()))?;
            Some(format!("https://player.vimeo.com/video/{id}"))
        }
        "channel9.msdn.com" => {
            let mut embed = url.clone();
            if !url.path().trim_end_matches('/').ends_with("/player") {
                let path = format!("{}/player", url.path().trim_end_matches('/'));
                embed.set_path(&path);
            }
            Some(with_nocookie(embed))
        }
        "microsoft.com" if url.path().to_ascii_lowercase().contains("/videoplayer/") => {
            Some(with_nocookie(url.clone()))
        }
        _ => None,
    }
}

fn with_nocookie(mut url: Url) -> String {
    if !url.query_pairs().any(|(key, _)| key == "nocookie") {
        url.query_pairs_mut().append_pair("nocookie", "true");
    }
    url.into()
}
