//! Tab groups built from tab headings.
//!
//! ```markdown
//! # [Windows](#tab/windows)
//! Install with winget.
//! # [Linux](#tab/linux/apt)
//! Install with apt.
//! ---
//! ```
//!
//! Consecutive tab headings of one level form a group. The group ends at a
//! thematic break, at a plain heading of the same or a higher level, or when
//! the enclosing directive closes.
//!
//! # Output HTML Structure
//!
//! ```html
//! <div class="tabGroup" id="tabgroup_1a2b3c4d">
//!   <ul role="tablist">
//!     <li role="presentation"><a href="#tabgroup_1a2b3c4d_windows" role="tab"
//!         aria-controls="tabgroup_1a2b3c4d_windows" data-tab="windows"
//!         tabindex="0" aria-selected="true">Windows</a></li>
//!     ...
//!   </ul>
//!   <section id="tabgroup_1a2b3c4d_windows" role="tabpanel" data-tab="windows">
//!     ...
//!   </section>
//!   <section ... hidden="hidden">...</section>
//! </div>
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::html::escape_html;
use crate::ids::short_hash;
use crate::node::{BlockKind, BlockNode, Node};

/// Generates group and panel ids for one document.
///
/// Group ids hash the salt, document id and group ordinal. Panel ids append
/// the tab id and condition; repeats within the document get `-1`, `-2`, ...
#[derive(Debug)]
pub struct TabIds {
    prefix: String,
    salt: String,
    document_id: String,
    next_group: usize,
    seen: HashMap<String, usize>,
}

impl TabIds {
    #[must_use]
    pub fn new(prefix: &str, salt: &str, document_id: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
            salt: salt.to_owned(),
            document_id: document_id.to_owned(),
            next_group: 0,
            seen: HashMap::new(),
        }
    }

    pub(crate) fn group_id(&mut self) -> String {
        let ordinal = self.next_group.to_string();
        self.next_group += 1;
        let hash = short_hash(&[&self.salt, &self.document_id, "tabs", &ordinal]);
        format!("{}{hash}", self.prefix)
    }

    pub(crate) fn panel_id(&mut self, group_id: &str, tab: &str, condition: Option<&str>) -> String {
        let mut id = format!("{group_id}_{tab}");
        if let Some(condition) = condition {
            let _ = write!(id, "_{condition}");
        }

        let count = self.seen.entry(id.clone()).or_insert(0);
        if *count > 0 {
            let _ = write!(id, "-{count}");
        }
        *count += 1;
        id
    }
}

/// Opening markup of a group: container and tab list.
pub(crate) fn group_open(group: &BlockNode) -> String {
    let group_id = group.attributes.get("id").unwrap_or_default();
    let mut html = format!(
        r#"<div class="tabGroup" id="{}">"#,
        escape_html(group_id)
    );
    html.push_str("\n<ul role=\"tablist\">\n");

    let panels = group.children.iter().filter_map(|child| match child {
        Node::Block(block) if block.kind == BlockKind::TabPanel => Some(block),
        _ => None,
    });
    for (idx, panel) in panels.enumerate() {
        let selected = idx == 0;
        let id = escape_html(panel.attributes.get("id").unwrap_or_default());
        let _ = writeln!(
            html,
            r##"<li role="presentation"><a href="#{id}" role="tab" aria-controls="{id}" data-tab="{}"{} tabindex="{}" aria-selected="{selected}">{}</a></li>"##,
            escape_html(panel.attributes.get("tab").unwrap_or_default()),
            condition_attr(panel),
            if selected { "0" } else { "-1" },
            escape_html(panel.attributes.get("title").unwrap_or_default()),
        );
    }
    html.push_str("</ul>\n");
    html
}

/// Opening tag of the `index`-th panel of its group.
pub(crate) fn panel_open(panel: &BlockNode, index: usize) -> String {
    let hidden = if index == 0 { "" } else { r#" hidden="hidden""# };
    format!(
        r#"<section id="{}" role="tabpanel" data-tab="{}"{}{hidden}>"#,
        escape_html(panel.attributes.get("id").unwrap_or_default()),
        escape_html(panel.attributes.get("tab").unwrap_or_default()),
        condition_attr(panel),
    )
}

fn condition_attr(panel: &BlockNode) -> String {
    panel
        .attributes
        .get("condition")
        .map(|c| format!(r#" data-condition="{}""#, escape_html(c)))
        .unwrap_or_default()
}
