//! Ordered (plane) tree shapes.
//!
//! A [`Tree`] carries no payload: only the number and the order of the children of every
//! node. Children are never sorted, so two trees are shape-equivalent only when their
//! ordered structures match exactly.
//!
//! Canonical encoding
//!  - [`Tree::canonical_string`] is an unsorted AHU encoding: `"(" + children + ")"`, a leaf
//!    being `"()"`.
//!  - [`Tree::canonical_binary`] maps `(` to `1` and `)` to `0`, so the encoding always starts
//!    with a `1` and never collides through leading zeroes.
//!  - [`Tree::canonical_integer`] parses the binary encoding in base 2. It is memoised per node
//!    and is the fast equality key used by [`Tree::is_shape_equivalent_to`].
//!
//! All traversals are iterative, deep trees never recurse on the call stack.
use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use num_bigint::BigUint;
use once_cell::sync::{Lazy, OnceCell};
use smallvec::{SmallVec, smallvec};
use strum::EnumIs;

static LEAF_CANONICAL_INTEGER: Lazy<BigUint> = Lazy::new(|| BigUint::from(2u8));

/// An immutable, finite, ordered tree without labels.
///
/// Example
/// ```
/// use hyformula::tree::Tree;
///
/// let t = Tree::new([Tree::leaf(), Tree::new([Tree::leaf()])]);
/// assert_eq!(t.size(), 4);
/// assert_eq!(t.canonical_string(), "(()(()))");
/// assert_eq!(t.to_string(), "★(★, ★(★))");
/// ```
#[derive(Clone, EnumIs)]
pub enum Tree {
    /// A node without children.
    Leaf,

    /// A node with at least one child.
    Node(Arc<TreeNode>),
}

/// Inner node of a [`Tree`], shared between every tree that contains it.
pub struct TreeNode {
    children: SmallVec<[Tree; 4]>,
    size: usize,
    canonical_integer: OnceCell<BigUint>,
}

impl Tree {
    /// The tree reduced to a single vertex.
    #[inline]
    pub const fn leaf() -> Self {
        Tree::Leaf
    }

    /// Build a tree from its ordered children. An empty sequence yields a leaf.
    pub fn new<I: IntoIterator<Item = Tree>>(children: I) -> Self {
        let children: SmallVec<[Tree; 4]> = children.into_iter().collect();
        if children.is_empty() {
            return Tree::Leaf;
        }

        let size = 1 + children.iter().map(Tree::size).sum::<usize>();
        Tree::Node(Arc::new(TreeNode {
            children,
            size,
            canonical_integer: OnceCell::new(),
        }))
    }

    /// The ordered children of the root.
    #[inline]
    pub fn children(&self) -> &[Tree] {
        match self {
            Tree::Leaf => &[],
            Tree::Node(node) => &node.children,
        }
    }

    /// Number of immediate children.
    #[inline]
    pub fn degree(&self) -> usize {
        self.children().len()
    }

    /// Total number of vertices.
    #[inline]
    pub fn size(&self) -> usize {
        match self {
            Tree::Leaf => 1,
            Tree::Node(node) => node.size,
        }
    }

    /// Returns `true` if both trees share the same allocation.
    pub fn ptr_eq(&self, other: &Tree) -> bool {
        match (self, other) {
            (Tree::Leaf, Tree::Leaf) => true,
            (Tree::Node(a), Tree::Node(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Visit the canonical encoding, `true` for an opening and `false` for a closing bracket.
    fn walk_encoding(&self, mut emit: impl FnMut(bool)) {
        enum Frame<'a> {
            Enter(&'a Tree),
            Exit,
        }

        let mut stack: SmallVec<[Frame<'_>; 32]> = smallvec![Frame::Enter(self)];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(tree) => {
                    emit(true);
                    stack.push(Frame::Exit);
                    stack.extend(tree.children().iter().rev().map(Frame::Enter));
                }
                Frame::Exit => emit(false),
            }
        }
    }

    /// Unsorted AHU encoding of this ordered tree.
    pub fn canonical_string(&self) -> String {
        let mut out = String::with_capacity(2 * self.size());
        self.walk_encoding(|open| out.push(if open { '(' } else { ')' }));
        out
    }

    /// Canonical encoding with `(` mapped to `1` and `)` mapped to `0`.
    pub fn canonical_binary(&self) -> String {
        let mut out = String::with_capacity(2 * self.size());
        self.walk_encoding(|open| out.push(if open { '1' } else { '0' }));
        out
    }

    fn compute_canonical_integer(&self) -> BigUint {
        // Bits are packed big-endian, left-padded with zeroes to a whole number of bytes.
        let bits = 2 * self.size();
        let mut bytes = vec![0u8; bits.div_ceil(8)];
        let mut position = bytes.len() * 8 - bits;
        self.walk_encoding(|open| {
            if open {
                bytes[position / 8] |= 0x80 >> (position % 8);
            }
            position += 1;
        });
        BigUint::from_bytes_be(&bytes)
    }

    fn canonical_integer_ref(&self) -> &BigUint {
        match self {
            Tree::Leaf => &*LEAF_CANONICAL_INTEGER,
            Tree::Node(node) => node
                .canonical_integer
                .get_or_init(|| self.compute_canonical_integer()),
        }
    }

    /// The canonical binary encoding read as a base-2 integer.
    ///
    /// Two ordered trees are shape-equivalent if and only if their canonical integers are equal.
    pub fn canonical_integer(&self) -> BigUint {
        self.canonical_integer_ref().clone()
    }

    /// Compare two trees through their canonical integers.
    pub fn is_shape_equivalent_to(&self, other: &Tree) -> bool {
        self.ptr_eq(other)
            || (self.size() == other.size()
                && self.canonical_integer_ref() == other.canonical_integer_ref())
    }

    /// Iterate over every sub-tree, depth-first, children in ascending order, starting with
    /// `self`.
    pub fn iter_depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            stack: smallvec![self],
        }
    }

    /// Select a sub-tree by following child indexes (0-based) from the root.
    ///
    /// The empty path selects `self`. Returns `None` as soon as an index is out of range.
    pub fn select(&self, path: &[usize]) -> Option<&Tree> {
        path.iter()
            .try_fold(self, |tree, &index| tree.children().get(index))
    }

    /// Write this tree in function notation, consuming one label per vertex in depth-first
    /// order, e.g. `0(1, 0(2))`.
    ///
    /// Fails with [`fmt::Error`] if `labels` yields fewer items than [`Tree::size`].
    pub fn write_indexed<W, L, I>(&self, out: &mut W, labels: I) -> fmt::Result
    where
        W: fmt::Write,
        L: fmt::Display,
        I: IntoIterator<Item = L>,
    {
        enum Frame<'a> {
            Enter { tree: &'a Tree, first: bool },
            Exit,
        }

        let mut labels = labels.into_iter();
        let mut stack: SmallVec<[Frame<'_>; 32]> = smallvec![Frame::Enter {
            tree: self,
            first: true,
        }];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter { tree, first } => {
                    if !first {
                        out.write_str(", ")?;
                    }
                    write!(out, "{}", labels.next().ok_or(fmt::Error)?)?;

                    if !tree.is_leaf() {
                        out.write_char('(')?;
                        stack.push(Frame::Exit);
                        for (index, child) in tree.children().iter().enumerate().rev() {
                            stack.push(Frame::Enter {
                                tree: child,
                                first: index == 0,
                            });
                        }
                    }
                }
                Frame::Exit => out.write_char(')')?,
            }
        }

        Ok(())
    }

    /// Multiline box-drawing rendering, useful to eyeball a shape.
    ///
    /// ```text
    /// ⬤━┳━⬤
    ///   ┣━⬤━━━⬤
    ///   ┗━⬤
    /// ```
    pub fn vertical(&self) -> String {
        struct Frame<'a> {
            tree: &'a Tree,
            prefix: String,
            is_root: bool,
            is_first: bool,
            is_last: bool,
        }

        let mut out = String::new();
        let mut stack = vec![Frame {
            tree: self,
            prefix: String::new(),
            is_root: true,
            is_first: true,
            is_last: true,
        }];

        while let Some(frame) = stack.pop() {
            if !frame.is_root && !frame.is_first {
                out.push('\n');
                out.push_str(&frame.prefix);
            }
            out.push_str(match (frame.is_root, frame.is_first, frame.is_last) {
                (true, _, _) => "⬤",
                (false, true, true) => "━━━⬤",
                (false, true, false) => "━┳━⬤",
                (false, false, false) => " ┣━⬤",
                (false, false, true) => " ┗━⬤",
            });

            let child_prefix = if frame.is_root {
                format!("{} ", frame.prefix)
            } else if frame.is_last {
                format!("{}    ", frame.prefix)
            } else {
                format!("{} ┃  ", frame.prefix)
            };

            let degree = frame.tree.degree();
            for (index, child) in frame.tree.children().iter().enumerate().rev() {
                stack.push(Frame {
                    tree: child,
                    prefix: child_prefix.clone(),
                    is_root: false,
                    is_first: index == 0,
                    is_last: index + 1 == degree,
                });
            }
        }

        out
    }
}

impl Drop for TreeNode {
    fn drop(&mut self) {
        // Unlink uniquely owned descendants iteratively, long chains would otherwise recurse.
        let mut pending: Vec<Tree> = self.children.drain(..).collect();
        while let Some(tree) = pending.pop() {
            if let Tree::Node(node) = tree {
                if let Some(mut inner) = Arc::into_inner(node) {
                    pending.extend(inner.children.drain(..));
                }
            }
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Tree::Leaf
    }
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.is_shape_equivalent_to(other)
    }
}

impl Eq for Tree {}

impl Hash for Tree {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_integer_ref().hash(state);
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indexed(f, std::iter::repeat("★"))
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tree({})", self.canonical_string())
    }
}

/// Depth-first, ascending-children iterator over the sub-trees of a [`Tree`].
pub struct DepthFirst<'a> {
    stack: SmallVec<[&'a Tree; 16]>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a Tree;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.stack.pop()?;
        self.stack.extend(tree.children().iter().rev());
        Some(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(depth: usize) -> Tree {
        (0..depth).fold(Tree::leaf(), |t, _| Tree::new([t]))
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let t = chain(100_000);
        assert_eq!(t.size(), 100_001);
        assert_eq!(t.canonical_binary().len(), 200_002);
        assert_eq!(t.iter_depth_first().count(), 100_001);
        assert!(t.is_shape_equivalent_to(&chain(100_000)));
    }

    #[test]
    fn vertical_rendering() {
        let t = Tree::new([
            Tree::new([Tree::leaf()]),
            Tree::new([Tree::leaf(), Tree::leaf()]),
            Tree::leaf(),
        ]);
        let expected = "⬤━┳━⬤━━━⬤\n  ┣━⬤━┳━⬤\n  ┃   ┗━⬤\n  ┗━⬤";
        assert_eq!(t.vertical(), expected);
    }

    #[test]
    fn indexed_notation_requires_enough_labels() {
        let t = Tree::new([Tree::leaf(), Tree::leaf()]);
        let mut out = String::new();
        assert!(t.write_indexed(&mut out, [0, 1]).is_err());

        let mut out = String::new();
        t.write_indexed(&mut out, [0, 1, 0]).unwrap();
        assert_eq!(out, "0(1, 0)");
    }
}
