pub mod generator;
pub mod op;
pub mod render;

use crate::program::op::{Operator, Terminal};

/// A node of an expression tree. Every subtree is exclusively owned by its parent.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Function(Operator, Vec<Node>),
    Terminal(Terminal),
}

impl Node {
    pub fn variable(index: usize) -> Self {
        Node::Terminal(Terminal::Variable(index))
    }

    pub fn constant(value: f64) -> Self {
        Node::Terminal(Terminal::Constant(value))
    }

    pub fn binary(op: Operator, lhs: Node, rhs: Node) -> Self {
        Node::Function(op, vec![lhs, rhs])
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Node::Terminal(_))
    }

    /// Number of nodes in this subtree, itself included.
    pub fn size(&self) -> usize {
        match self {
            Node::Terminal(_) => 1,
            Node::Function(_, children) => 1 + children.iter().map(Node::size).sum::<usize>(),
        }
    }

    /// Depth of this subtree; a lone terminal has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            Node::Terminal(_) => 0,
            Node::Function(_, children) => {
                1 + children.iter().map(Node::depth).max().unwrap_or(0)
            }
        }
    }

    fn nth(&self, remaining: &mut usize) -> Option<&Node> {
        if *remaining == 0 {
            return Some(self);
        }
        *remaining -= 1;
        if let Node::Function(_, children) = self {
            for child in children {
                let size = child.size();
                if *remaining >= size {
                    *remaining -= size;
                    continue;
                }
                return child.nth(remaining);
            }
        }
        None
    }

    fn nth_mut(&mut self, remaining: &mut usize) -> Option<&mut Node> {
        if *remaining == 0 {
            return Some(self);
        }
        *remaining -= 1;
        if let Node::Function(_, children) = self {
            for child in children.iter_mut() {
                let size = child.size();
                if *remaining >= size {
                    *remaining -= size;
                    continue;
                }
                return child.nth_mut(remaining);
            }
        }
        None
    }
}

/// A complete expression: the root node of a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    root: Node,
}

impl Program {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    pub fn size(&self) -> usize {
        self.root.size()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Returns the subtree rooted at the `index`-th node in preorder.
    pub fn subtree(&self, index: usize) -> Option<&Node> {
        let mut remaining = index;
        self.root.nth(&mut remaining)
    }

    pub fn subtree_mut(&mut self, index: usize) -> Option<&mut Node> {
        let mut remaining = index;
        self.root.nth_mut(&mut remaining)
    }

    /// Swaps the subtree at preorder `index` for `replacement`, handing back the old subtree.
    /// Returns `None` (and leaves the tree untouched) when `index` is out of range.
    pub fn replace_subtree(&mut self, index: usize, replacement: Node) -> Option<Node> {
        self.subtree_mut(index)
            .map(|slot| std::mem::replace(slot, replacement))
    }
}

impl From<Node> for Program {
    fn from(root: Node) -> Self {
        Program::new(root)
    }
}
