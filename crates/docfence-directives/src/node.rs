//! Block tree built from the token stream.

use crate::attrs::Attributes;
use crate::tokenizer::DirectiveName;

/// Kinds of block in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Zone,
    Moniker,
    TabGroup,
    TabPanel,
    Row,
    Column,
    Image,
    Video,
    Form,
    NoLoc,
    Code,
}

impl From<DirectiveName> for BlockKind {
    fn from(name: DirectiveName) -> Self {
        match name {
            DirectiveName::Zone => Self::Zone,
            DirectiveName::Moniker => Self::Moniker,
            DirectiveName::Row => Self::Row,
            DirectiveName::Column => Self::Column,
            DirectiveName::Image => Self::Image,
            DirectiveName::Video => Self::Video,
            DirectiveName::Form => Self::Form,
            DirectiveName::NoLoc => Self::NoLoc,
            DirectiveName::Code => Self::Code,
        }
    }
}

/// Consecutive plain Markdown lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    /// Lines joined with `\n`, each terminated.
    pub text: String,
    /// 1-based line of the first line.
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockNode {
    pub kind: BlockKind,
    /// Directive attributes. Tab groups and panels carry generated ones
    /// (`id`, and for panels `tab`, `title`, `condition`).
    pub attributes: Attributes,
    pub children: Vec<Node>,
    /// 1-based line of the opening fence or heading.
    pub line: usize,
}

impl BlockNode {
    #[must_use]
    pub fn new(kind: BlockKind, attributes: Attributes, line: usize) -> Self {
        Self {
            kind,
            attributes,
            children: Vec::new(),
            line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Block(BlockNode),
    Text(TextRun),
}

/// Append a text line, merging with a preceding text run.
pub(crate) fn push_text(children: &mut Vec<Node>, raw: &str, line: usize) {
    if let Some(Node::Text(run)) = children.last_mut() {
        run.text.push_str(raw);
        run.text.push('\n');
        return;
    }
    children.push(Node::Text(TextRun {
        text: format!("{raw}\n"),
        line,
    }));
}

impl Node {
    /// Depth of the deepest block below and including this node.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Text(_) => 0,
            Self::Block(block) => 1 + block.children.iter().map(Node::depth).max().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_text_merges_runs() {
        let mut node = BlockNode::new(BlockKind::Zone, Attributes::new(), 1);
        push_text(&mut node.children, "a", 2);
        push_text(&mut node.children, "b", 3);
        node.children.push(Node::Block(BlockNode::new(
            BlockKind::Form,
            Attributes::new(),
            4,
        )));
        push_text(&mut node.children, "c", 5);

        assert_eq!(node.children.len(), 3);
        assert_eq!(
            node.children[0],
            Node::Text(TextRun {
                text: "a\nb\n".to_owned(),
                line: 2,
            })
        );
        assert_eq!(Node::Block(node).depth(), 2);
    }
}
