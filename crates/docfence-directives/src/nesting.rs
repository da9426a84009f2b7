//! Block nesting state machine.
//!
//! Consumes tokens in document order and builds the block tree. The machine
//! is threaded through the document one token at a time with
//! [`NestingMachine::step`], which returns the next state and the diagnostics
//! the token produced.
//!
//! Containment rules:
//!
//! | block    | rule                                              |
//! |----------|---------------------------------------------------|
//! | row      | only columns; other text moves in front of the row |
//! | column   | only directly inside a row                        |
//! | zone     | anything except a zone as a direct child          |
//! | moniker  | anything except a moniker at any depth below      |
//! | tabs     | heading-derived panels; panels hold anything      |
//!
//! A fence that breaks a rule is demoted to text, and so is the end marker
//! that pairs with it. An end marker that does not match the innermost open
//! directive is kept as text. Directives still open
//! at the end are closed there. Every case is reported and none stops the
//! parse.

use crate::attrs::Attributes;
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::node::{BlockKind, BlockNode, Node, push_text};
use crate::tabs::TabIds;
use crate::tokenizer::{DirectiveName, DirectiveToken, TabHeading, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Directive(DirectiveName),
    TabGroup { level: usize },
    TabPanel { level: usize },
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    node: BlockNode,
    /// Openers demoted to text in this frame whose end marker is still due.
    demoted: Vec<DirectiveName>,
    /// Last line moved out of a row, so a run of stray text is reported once.
    last_stray_line: Option<usize>,
}

impl Frame {
    fn new(kind: FrameKind, node: BlockNode) -> Self {
        Self {
            kind,
            node,
            demoted: Vec::new(),
            last_stray_line: None,
        }
    }

    fn is_tab(&self) -> bool {
        !matches!(self.kind, FrameKind::Directive(_))
    }
}

/// Builds the block tree of one document.
#[derive(Debug)]
pub struct NestingMachine {
    root: Vec<Node>,
    root_demoted: Vec<DirectiveName>,
    stack: Vec<Frame>,
    tab_ids: TabIds,
}

impl NestingMachine {
    #[must_use]
    pub fn new(tab_ids: TabIds) -> Self {
        Self {
            root: Vec::new(),
            root_demoted: Vec::new(),
            stack: Vec::new(),
            tab_ids,
        }
    }

    /// Build the tree for a whole token stream.
    #[must_use]
    pub fn build(tokens: Vec<Token>, tab_ids: TabIds) -> (Vec<Node>, Vec<Diagnostic>) {
        let (machine, mut diagnostics) = tokens.into_iter().fold(
            (Self::new(tab_ids), Vec::new()),
            |(machine, mut diagnostics), token| {
                let (machine, emitted) = machine.step(token);
                diagnostics.extend(emitted);
                (machine, diagnostics)
            },
        );
        let (nodes, emitted) = machine.finish();
        diagnostics.extend(emitted);
        (nodes, diagnostics)
    }

    /// Consume one token.
    #[must_use]
    pub fn step(mut self, token: Token) -> (Self, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        match token {
            Token::Text { line, raw } => self.text(&raw, line, &mut diagnostics),
            Token::Open(token) => self.open(token, &mut diagnostics),
            Token::SelfClosing(token) => self.self_closing(token, &mut diagnostics),
            Token::Close { name, line, raw } => self.close(name, line, &raw, &mut diagnostics),
            Token::TabHeading(heading) => self.tab_heading(heading, &mut diagnostics),
            Token::Heading { level, line, raw } => {
                self.close_tab_groups_at(level);
                self.text(&raw, line, &mut diagnostics);
            }
            Token::ThematicBreak { line, raw } => {
                if self.in_tab_panel().is_some() {
                    self.close_tab_group();
                } else {
                    self.text(&raw, line, &mut diagnostics);
                }
            }
        }
        (self, diagnostics)
    }

    /// Close whatever is still open and return the tree.
    #[must_use]
    pub fn finish(mut self) -> (Vec<Node>, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        while let Some(frame) = self.stack.last() {
            if let FrameKind::Directive(name) = frame.kind {
                diagnostics.push(Diagnostic::new(
                    DiagnosticCode::UnterminatedDirective,
                    frame.node.line,
                    format!("{} is never closed, closing at end of document", name.as_str()),
                ));
            }
            self.pop_into_parent();
        }
        (self.root, diagnostics)
    }

    /// Open depth, tab frames included.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn children(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.node.children,
            None => &mut self.root,
        }
    }

    /// Children of the frame below the top one.
    fn outer_children(&mut self) -> &mut Vec<Node> {
        match self.stack.len() {
            0 | 1 => &mut self.root,
            len => &mut self.stack[len - 2].node.children,
        }
    }

    fn demoted(&mut self) -> &mut Vec<DirectiveName> {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.demoted,
            None => &mut self.root_demoted,
        }
    }

    fn parent_kind(&self) -> Option<BlockKind> {
        self.stack.last().map(|frame| frame.node.kind)
    }

    fn pop_into_parent(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.children().push(Node::Block(frame.node));
        }
    }

    fn text(&mut self, raw: &str, line: usize, diagnostics: &mut Vec<Diagnostic>) {
        if self.parent_kind() != Some(BlockKind::Row) {
            push_text(self.children(), raw, line);
            return;
        }
        if raw.trim().is_empty() {
            return;
        }
        let continues_run = self
            .stack
            .last()
            .and_then(|frame| frame.last_stray_line)
            .is_some_and(|last| last + 1 == line);
        if !continues_run {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::InvalidNesting,
                line,
                "text inside a row must be in a column, moving it before the row",
            ));
        }
        self.demoted_text(raw, line);
    }

    /// Keep a line that lost its directive meaning as text of the current
    /// block. Rows hold only columns, so there it goes in front of the row.
    fn demoted_text(&mut self, raw: &str, line: usize) {
        if self.parent_kind() != Some(BlockKind::Row) {
            push_text(self.children(), raw, line);
            return;
        }
        if let Some(frame) = self.stack.last_mut() {
            frame.last_stray_line = Some(line);
        }
        push_text(self.outer_children(), raw, line);
    }

    /// Check containment for a new child block.
    fn check_nesting(&self, child: BlockKind) -> Result<(), String> {
        let parent = self.parent_kind();
        match child {
            BlockKind::Column if parent != Some(BlockKind::Row) => {
                Err("column must be directly inside a row".to_owned())
            }
            BlockKind::Column => Ok(()),
            _ if parent == Some(BlockKind::Row) => Err("a row may only contain columns".to_owned()),
            BlockKind::Zone if parent == Some(BlockKind::Zone) => {
                Err("zone cannot be nested directly inside a zone".to_owned())
            }
            BlockKind::Moniker
                if self
                    .stack
                    .iter()
                    .any(|frame| frame.node.kind == BlockKind::Moniker) =>
            {
                Err("moniker cannot be nested inside a moniker".to_owned())
            }
            _ => Ok(()),
        }
    }

    /// Demote a directive line to text when it breaks containment.
    fn admit(
        &mut self,
        kind: BlockKind,
        line: usize,
        raw: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> bool {
        match self.check_nesting(kind) {
            Ok(()) => true,
            Err(message) => {
                diagnostics.push(Diagnostic::new(DiagnosticCode::InvalidNesting, line, message));
                self.demoted_text(raw, line);
                false
            }
        }
    }

    fn open(&mut self, token: DirectiveToken, diagnostics: &mut Vec<Diagnostic>) {
        let kind = BlockKind::from(token.name);
        if !self.admit(kind, token.line, &token.raw, diagnostics) {
            self.demoted().push(token.name);
            return;
        }
        self.stack.push(Frame::new(
            FrameKind::Directive(token.name),
            BlockNode::new(kind, token.attributes, token.line),
        ));
    }

    fn self_closing(&mut self, token: DirectiveToken, diagnostics: &mut Vec<Diagnostic>) {
        let kind = BlockKind::from(token.name);
        if !self.admit(kind, token.line, &token.raw, diagnostics) {
            return;
        }
        let node = BlockNode::new(kind, token.attributes, token.line);
        self.children().push(Node::Block(node));
    }

    fn close(&mut self, name: DirectiveName, line: usize, raw: &str, diagnostics: &mut Vec<Diagnostic>) {
        // The end of a demoted opener is text like the opener was.
        if self.demoted().last() == Some(&name) {
            self.demoted().pop();
            self.demoted_text(raw, line);
            return;
        }

        // Tab frames close implicitly with their enclosing directive.
        let target = self.stack.iter().rposition(|frame| !frame.is_tab());
        let matches = target
            .is_some_and(|idx| self.stack[idx].kind == FrameKind::Directive(name));

        match target {
            Some(idx) if matches => {
                while self.stack.len() > idx {
                    self.pop_into_parent();
                }
            }
            _ => {
                let open = target.and_then(|idx| match self.stack[idx].kind {
                    FrameKind::Directive(open) => Some(open.as_str()),
                    _ => None,
                });
                let message = match open {
                    Some(open) => format!("{}-end does not close the open {open}", name.as_str()),
                    None => format!("{}-end has no open {}", name.as_str(), name.as_str()),
                };
                diagnostics.push(Diagnostic::new(DiagnosticCode::UnmatchedClose, line, message));
                self.demoted_text(raw, line);
            }
        }
    }

    /// Level of the innermost open panel, if the top frame is a panel.
    fn in_tab_panel(&self) -> Option<usize> {
        match self.stack.last()?.kind {
            FrameKind::TabPanel { level } => Some(level),
            _ => None,
        }
    }

    /// Close the innermost panel and its group.
    fn close_tab_group(&mut self) {
        if self.in_tab_panel().is_some() {
            self.pop_into_parent();
            self.pop_into_parent();
        }
    }

    /// Close groups whose level is at or below a plain heading's level.
    fn close_tab_groups_at(&mut self, heading_level: usize) {
        while self
            .in_tab_panel()
            .is_some_and(|level| heading_level <= level)
        {
            self.close_tab_group();
        }
    }

    fn tab_heading(&mut self, heading: TabHeading, diagnostics: &mut Vec<Diagnostic>) {
        if heading.id.is_empty() {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::InvalidTabGroup,
                heading.line,
                format!("tab \"{}\" has an empty id", heading.title),
            ));
            self.demoted_text(&heading.raw, heading.line);
            return;
        }

        while let Some(level) = self.in_tab_panel() {
            if heading.level < level {
                self.close_tab_group();
                continue;
            }
            if heading.level == level {
                // Next panel of the same group.
                self.pop_into_parent();
                self.open_panel(heading);
                return;
            }
            // Deeper: a group nested in the current panel.
            break;
        }

        if !self.admit(BlockKind::TabGroup, heading.line, &heading.raw, diagnostics) {
            return;
        }
        let mut attributes = Attributes::new();
        attributes.insert("id", self.tab_ids.group_id());
        self.stack.push(Frame::new(
            FrameKind::TabGroup {
                level: heading.level,
            },
            BlockNode::new(BlockKind::TabGroup, attributes, heading.line),
        ));
        self.open_panel(heading);
    }

    fn open_panel(&mut self, heading: TabHeading) {
        let group_id = self
            .stack
            .last()
            .and_then(|frame| frame.node.attributes.get("id"))
            .unwrap_or_default()
            .to_owned();
        let panel_id = self
            .tab_ids
            .panel_id(&group_id, &heading.id, heading.condition.as_deref());

        let mut attributes = Attributes::new();
        attributes.insert("id", panel_id);
        attributes.insert("tab", heading.id);
        attributes.insert("title", heading.title);
        if let Some(condition) = heading.condition {
            attributes.insert("condition", condition);
        }
        self.stack.push(Frame::new(
            FrameKind::TabPanel {
                level: heading.level,
            },
            BlockNode::new(BlockKind::TabPanel, attributes, heading.line),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TextRun;
    use crate::tokenizer::tokenize;
    use pretty_assertions::assert_eq;

    fn build(input: &str) -> (Vec<Node>, Vec<Diagnostic>) {
        let tokenized = tokenize(input);
        assert!(tokenized.diagnostics.is_empty(), "{:?}", tokenized.diagnostics);
        NestingMachine::build(tokenized.tokens, TabIds::new("tabgroup_", "", "doc.md"))
    }

    fn block(node: &Node) -> &BlockNode {
        match node {
            Node::Block(block) => block,
            Node::Text(run) => panic!("expected block, got text {run:?}"),
        }
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<DiagnosticCode> {
        diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_row_with_columns() {
        let (nodes, diagnostics) = build(
            ":::row:::\n\n   :::column:::\n   A\n   :::column-end:::\n   :::column span=\"2\":::\n   B\n   :::column-end:::\n:::row-end:::\n",
        );
        assert!(diagnostics.is_empty());
        assert_eq!(nodes.len(), 1);
        let row = block(&nodes[0]);
        assert_eq!(row.kind, BlockKind::Row);
        assert_eq!(row.children.len(), 2);
        assert_eq!(block(&row.children[1]).attributes.get("span"), Some("2"));
    }

    #[test]
    fn test_zone_directly_in_zone_is_demoted() {
        let (nodes, diagnostics) = build(
            ":::zone target=\"docs\":::\nA\n:::zone target=\"pdf\":::\nB\n:::zone-end:::\nC\n:::zone-end:::\n",
        );
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::InvalidNesting]);
        assert_eq!(diagnostics[0].line, 3);
        assert_eq!(nodes.len(), 1);
        let zone = block(&nodes[0]);
        assert_eq!(
            zone.children,
            vec![Node::Text(TextRun {
                text: "A\n:::zone target=\"pdf\":::\nB\n:::zone-end:::\nC\n".to_owned(),
                line: 2,
            })]
        );
    }

    #[test]
    fn test_demoted_moniker_end_stays_inside_outer_moniker() {
        let (nodes, diagnostics) = build(
            ":::moniker range=\"a\":::\n:::zone:::\n:::moniker range=\"b\":::\nx\n:::moniker-end:::\n:::zone-end:::\ny\n:::moniker-end:::\nafter\n",
        );
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::InvalidNesting]);
        assert_eq!(nodes.len(), 2);
        let moniker = block(&nodes[0]);
        assert_eq!(moniker.kind, BlockKind::Moniker);
        let zone = block(&moniker.children[0]);
        assert_eq!(
            zone.children,
            vec![Node::Text(TextRun {
                text: ":::moniker range=\"b\":::\nx\n:::moniker-end:::\n".to_owned(),
                line: 3,
            })]
        );
        assert_eq!(
            moniker.children[1],
            Node::Text(TextRun {
                text: "y\n".to_owned(),
                line: 7,
            })
        );
    }

    #[test]
    fn test_demoted_column_end_is_text() {
        let (nodes, diagnostics) = build(":::column:::\nx\n:::column-end:::\n");
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::InvalidNesting]);
        assert_eq!(
            nodes,
            vec![Node::Text(TextRun {
                text: ":::column:::\nx\n:::column-end:::\n".to_owned(),
                line: 1,
            })]
        );
    }

    #[test]
    fn test_moniker_below_moniker_is_demoted() {
        let (_, diagnostics) = build(
            ":::moniker range=\"a\"\n:::row:::\n:::column:::\n:::moniker range=\"b\"\n:::column-end:::\n:::row-end:::\n:::moniker-end\n",
        );
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::InvalidNesting]);
    }

    #[test]
    fn test_column_outside_row_and_non_column_inside_row() {
        let (nodes, diagnostics) =
            build(":::column:::\nx\n:::row:::\n:::zone:::\n:::row-end:::\n");
        assert_eq!(
            codes(&diagnostics),
            vec![DiagnosticCode::InvalidNesting, DiagnosticCode::InvalidNesting]
        );
        assert_eq!(
            nodes[0],
            Node::Text(TextRun {
                text: ":::column:::\nx\n:::zone:::\n".to_owned(),
                line: 1,
            })
        );
        let row = block(&nodes[1]);
        assert_eq!(row.kind, BlockKind::Row);
        assert!(row.children.is_empty());
    }

    #[test]
    fn test_text_directly_in_row_moves_before_row() {
        let (nodes, diagnostics) = build(
            ":::row:::\nstray paragraph\nsecond line\n:::column:::\nx\n:::column-end:::\nlate\n:::row-end:::\n",
        );
        assert_eq!(
            codes(&diagnostics),
            vec![DiagnosticCode::InvalidNesting, DiagnosticCode::InvalidNesting]
        );
        assert_eq!(diagnostics[0].line, 2);
        assert_eq!(diagnostics[1].line, 7);
        assert_eq!(nodes.len(), 2);
        assert_eq!(
            nodes[0],
            Node::Text(TextRun {
                text: "stray paragraph\nsecond line\nlate\n".to_owned(),
                line: 2,
            })
        );
        let row = block(&nodes[1]);
        assert_eq!(row.children.len(), 1);
        assert_eq!(block(&row.children[0]).kind, BlockKind::Column);
    }

    #[test]
    fn test_unmatched_close_is_text() {
        let (nodes, diagnostics) = build("before\n:::zone-end:::\nafter\n");
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::UnmatchedClose]);
        assert_eq!(
            nodes,
            vec![Node::Text(TextRun {
                text: "before\n:::zone-end:::\nafter\n".to_owned(),
                line: 1,
            })]
        );
    }

    #[test]
    fn test_mismatched_close_keeps_directive_open() {
        let (nodes, diagnostics) = build(":::zone:::\n:::moniker-end:::\nx\n");
        assert_eq!(
            codes(&diagnostics),
            vec![
                DiagnosticCode::UnmatchedClose,
                DiagnosticCode::UnterminatedDirective,
            ]
        );
        assert_eq!(block(&nodes[0]).kind, BlockKind::Zone);
    }

    #[test]
    fn test_unterminated_row_is_closed_at_end() {
        let (nodes, diagnostics) = build(":::row:::\n:::column:::\ncontent\n");
        assert_eq!(
            codes(&diagnostics),
            vec![
                DiagnosticCode::UnterminatedDirective,
                DiagnosticCode::UnterminatedDirective,
            ]
        );
        assert_eq!(diagnostics[0].line, 2);
        assert_eq!(diagnostics[1].line, 1);
        let row = block(&nodes[0]);
        let column = block(&row.children[0]);
        assert_eq!(column.kind, BlockKind::Column);
    }

    #[test]
    fn test_tab_group_from_headings() {
        let (nodes, diagnostics) = build(
            "# [Windows](#tab/windows)\nwin\n# [Linux](#tab/linux/apt)\nlinux\n---\nafter\n",
        );
        assert!(diagnostics.is_empty());
        assert_eq!(nodes.len(), 2);

        let group = block(&nodes[0]);
        assert_eq!(group.kind, BlockKind::TabGroup);
        let group_id = group.attributes.get("id").unwrap();
        assert!(group_id.starts_with("tabgroup_"));

        let panels: Vec<&BlockNode> = group.children.iter().map(block).collect();
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[0].attributes.get("title"), Some("Windows"));
        assert_eq!(
            panels[1].attributes.get("id"),
            Some(format!("{group_id}_linux_apt").as_str())
        );
        assert_eq!(panels[1].attributes.get("condition"), Some("apt"));

        assert_eq!(
            nodes[1],
            Node::Text(TextRun {
                text: "after\n".to_owned(),
                line: 6,
            })
        );
    }

    #[test]
    fn test_tab_group_ends_at_heading() {
        let (nodes, _) = build("## [A](#tab/a)\na\n## Next\ntext\n");
        assert_eq!(block(&nodes[0]).kind, BlockKind::TabGroup);
        let Node::Text(run) = &nodes[1] else {
            panic!("expected text");
        };
        assert_eq!(run.text, "## Next\ntext\n");

        // A deeper plain heading stays inside the panel.
        let (nodes, _) = build("## [A](#tab/a)\n### Detail\n");
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_nested_tab_group() {
        let (nodes, _) = build(
            "# [A](#tab/a)\n## [A1](#tab/a1)\nx\n## [A2](#tab/a2)\ny\n# [B](#tab/b)\nz\n",
        );
        assert_eq!(nodes.len(), 1);
        let outer = block(&nodes[0]);
        assert_eq!(outer.children.len(), 2);
        let first_panel = block(&outer.children[0]);
        let inner = block(&first_panel.children[0]);
        assert_eq!(inner.kind, BlockKind::TabGroup);
        assert_eq!(inner.children.len(), 2);
    }

    #[test]
    fn test_tab_group_closes_with_enclosing_directive() {
        let (nodes, diagnostics) = build(":::zone:::\n# [A](#tab/a)\nx\n:::zone-end:::\nafter\n");
        assert!(diagnostics.is_empty());
        let zone = block(&nodes[0]);
        assert_eq!(block(&zone.children[0]).kind, BlockKind::TabGroup);
        assert!(matches!(nodes[1], Node::Text(_)));
    }

    #[test]
    fn test_duplicate_tab_ids_get_suffix() {
        let (nodes, _) = build("# [A](#tab/a)\n# [A again](#tab/a)\n");
        let group = block(&nodes[0]);
        let group_id = group.attributes.get("id").unwrap();
        let ids: Vec<&str> = group
            .children
            .iter()
            .map(|child| block(child).attributes.get("id").unwrap())
            .collect();
        assert_eq!(ids, vec![format!("{group_id}_a"), format!("{group_id}_a-1")]);
    }

    #[test]
    fn test_empty_tab_id_is_invalid() {
        let (nodes, diagnostics) = build("# [A](#tab/)\n");
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::InvalidTabGroup]);
        assert!(matches!(nodes[0], Node::Text(_)));
    }

    #[test]
    fn test_step_threads_state() {
        let tokens = tokenize(":::zone:::\ntext\n:::zone-end:::\n").tokens;
        let mut machine = NestingMachine::new(TabIds::new("t_", "", "d"));
        let mut depths = Vec::new();
        for token in tokens {
            let (next, diagnostics) = machine.step(token);
            assert!(diagnostics.is_empty());
            depths.push(next.depth());
            machine = next;
        }
        assert_eq!(depths, vec![1, 1, 0]);
    }
}
