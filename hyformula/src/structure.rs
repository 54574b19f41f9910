//! Pointer-annotated formula topologies.
//!
//! A [`Structure`] is an ordered tree whose vertices carry a [`Pointer`], the index of the
//! connector a formula places at that vertex. The same pointer may appear several times.
//!
//! A structure is *canonical* when its pointers, read depth-first and left to right, form a
//! [`BoundedSequence`](crate::sequence::BoundedSequence): the root holds `p0` and every newly
//! introduced pointer is exactly one above the largest pointer seen so far. Only canonical
//! structures are paired with connectors by default, see
//! [`CanonicityPolicy`](crate::config::CanonicityPolicy).
use std::{
    collections::HashSet,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use smallvec::{SmallVec, smallvec};

use crate::{
    registry::{HashConsed, Registry, salted_hash},
    sequence::LabelSequence,
    tree::Tree,
};

const STRUCTURE_SALT: u64 = 0x7374_7275_6374_7500;

/// Index of a connector inside a formula's connector sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pointer(pub usize);

impl Pointer {
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for Pointer {
    fn from(value: usize) -> Self {
        Pointer(value)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// An immutable, hash-consed pointer tree.
///
/// Example:
/// ```rust
/// # use hyformula::registry::Registry;
/// let registry = Registry::default();
/// let p1 = registry.structure(1, []);
/// let p0 = registry.structure(0, []);
/// let s = registry.structure(0, [p1, p0]);
/// assert!(s.is_canonical());
/// assert_eq!(s.pointers_count(), 2);
/// assert_eq!(s.to_string(), "p0(p1, p0)");
///
/// let skipped = registry.structure(0, [registry.structure(2, [])]);
/// assert!(!skipped.is_canonical());
/// ```
#[derive(Clone)]
pub struct Structure(Arc<StructureNode>);

struct StructureNode {
    pointer: Pointer,
    subs: SmallVec<[Structure; 4]>,
    shape: Tree,
    /// Distinct pointers in order of first appearance, depth-first.
    first_appearances: Box<[Pointer]>,
    /// Distinct pointers in ascending order.
    pointers: Box<[Pointer]>,
    is_canonical: bool,
    hash: u64,
}

impl Structure {
    /// Build and intern a structure in the [global registry](Registry::global).
    pub fn new<P, I>(pointer: P, subs: I) -> Self
    where
        P: Into<Pointer>,
        I: IntoIterator<Item = Structure>,
    {
        Registry::global().structure(pointer, subs)
    }

    /// A structure reduced to a single vertex, in the [global registry](Registry::global).
    pub fn leaf(pointer: impl Into<Pointer>) -> Self {
        Self::new(pointer, [])
    }

    fn build(pointer: Pointer, subs: SmallVec<[Structure; 4]>) -> Self {
        let shape = Tree::new(subs.iter().map(|sub| sub.0.shape.clone()));

        // Canonical iff pointers are introduced as 0, 1, 2, ... which only depends on the first
        // appearances of each sub-structure.
        let mut seen: HashSet<Pointer> = HashSet::new();
        let mut first_appearances = vec![pointer];
        seen.insert(pointer);
        for sub in &subs {
            for &p in sub.0.first_appearances.iter() {
                if seen.insert(p) {
                    first_appearances.push(p);
                }
            }
        }
        let is_canonical = first_appearances
            .iter()
            .enumerate()
            .all(|(index, p)| p.0 == index);

        let mut pointers = first_appearances.clone();
        pointers.sort_unstable();

        let mut hasher_input: SmallVec<[u64; 5]> = smallvec![pointer.0 as u64];
        hasher_input.extend(subs.iter().map(|sub| sub.0.hash));
        let hash = salted_hash(STRUCTURE_SALT, hasher_input.as_slice());

        Self(Arc::new(StructureNode {
            pointer,
            subs,
            shape,
            first_appearances: first_appearances.into_boxed_slice(),
            pointers: pointers.into_boxed_slice(),
            is_canonical,
            hash,
        }))
    }

    #[inline]
    pub fn pointer(&self) -> Pointer {
        self.0.pointer
    }

    /// The ordered immediate sub-structures.
    #[inline]
    pub fn sub_structures(&self) -> &[Structure] {
        &self.0.subs
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.0.subs.is_empty()
    }

    /// Distinct pointers used by this structure, in ascending order.
    #[inline]
    pub fn pointers(&self) -> &[Pointer] {
        &self.0.pointers
    }

    #[inline]
    pub fn pointers_count(&self) -> usize {
        self.0.pointers.len()
    }

    /// Returns `true` if the depth-first pointer sequence is a bounded sequence. Computed at
    /// construction.
    #[inline]
    pub fn is_canonical(&self) -> bool {
        self.0.is_canonical
    }

    /// Check canonicity by walking the pointers depth-first.
    ///
    /// `running_max` is the largest pointer introduced before this structure, `None` when this
    /// structure is the traversal root (its pointer must then be `p0`). Every pointer must be at
    /// most one above the running maximum, which is threaded from each sub-structure into its
    /// next sibling. Returns the running maximum after the walk, or `None` as soon as a pointer
    /// skips ahead.
    pub fn check_canonicity(&self, running_max: Option<usize>) -> Option<usize> {
        let mut iter = self.iter_depth_first();
        let mut max = match running_max {
            Some(max) => max,
            None => {
                let root = iter.next()?;
                if root.pointer().0 != 0 {
                    return None;
                }
                0
            }
        };

        for node in iter {
            let p = node.pointer().0;
            if p > max + 1 {
                return None;
            }
            max = max.max(p);
        }
        Some(max)
    }

    /// Total number of vertices.
    #[inline]
    pub fn size(&self) -> usize {
        self.0.shape.size()
    }

    /// The shape of this structure, without pointers.
    #[inline]
    pub fn tree(&self) -> &Tree {
        &self.0.shape
    }

    /// Pointers in depth-first order, repetitions included.
    pub fn pointer_sequence(&self) -> LabelSequence {
        LabelSequence::from_non_empty(self.iter_depth_first().map(|s| s.pointer().0).collect())
    }

    /// Iterate over every sub-structure, depth-first, starting with `self`.
    pub fn iter_depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            stack: smallvec![self],
        }
    }

    /// The canonical structure of the same shape, interned in the
    /// [global registry](Registry::global).
    pub fn canonicalize(&self) -> Structure {
        Registry::global().canonicalize_structure(self)
    }

    /// Returns `true` if both structures share the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Structure) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn first_appearances(&self) -> &[Pointer] {
        &self.0.first_appearances
    }
}

impl Registry {
    /// Build and intern a structure. Never fails: canonicity is recorded, not enforced.
    pub fn structure<P, I>(&self, pointer: P, subs: I) -> Structure
    where
        P: Into<Pointer>,
        I: IntoIterator<Item = Structure>,
    {
        self.structures
            .intern(Structure::build(pointer.into(), subs.into_iter().collect()))
    }

    /// Relabel `structure` so that pointers are introduced in order, `p0` first.
    pub fn canonicalize_structure(&self, structure: &Structure) -> Structure {
        if structure.is_canonical() {
            return structure.clone();
        }

        let first_appearances = structure.first_appearances();
        self.relabel_structure(structure, |p| {
            let rank = first_appearances.iter().position(|q| *q == p).unwrap_or(p.0);
            Pointer(rank)
        })
    }

    /// Rebuild `structure` bottom-up with every pointer mapped through `relabel`.
    pub(crate) fn relabel_structure(
        &self,
        structure: &Structure,
        relabel: impl Fn(Pointer) -> Pointer,
    ) -> Structure {
        enum Frame<'a> {
            Enter(&'a Structure),
            Exit(&'a Structure),
        }

        let mut stack: SmallVec<[Frame<'_>; 32]> = smallvec![Frame::Enter(structure)];
        let mut built: Vec<Structure> = Vec::new();

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(node) => {
                    stack.push(Frame::Exit(node));
                    stack.extend(node.sub_structures().iter().rev().map(Frame::Enter));
                }
                Frame::Exit(node) => {
                    let subs = built.split_off(built.len() - node.sub_structures().len());
                    built.push(self.structure(relabel(node.pointer()), subs));
                }
            }
        }

        debug_assert_eq!(built.len(), 1);
        built.pop().unwrap_or_else(|| structure.clone())
    }
}

impl Drop for StructureNode {
    fn drop(&mut self) {
        let mut pending: Vec<Structure> = self.subs.drain(..).collect();
        while let Some(structure) = pending.pop() {
            if let Some(mut inner) = Arc::into_inner(structure.0) {
                pending.extend(inner.subs.drain(..));
            }
        }
    }
}

impl PartialEq for Structure {
    fn eq(&self, other: &Self) -> bool {
        let mut pending: SmallVec<[(&Structure, &Structure); 16]> = smallvec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if a.ptr_eq(b) {
                continue;
            }
            if a.0.hash != b.0.hash
                || a.0.pointer != b.0.pointer
                || a.0.subs.len() != b.0.subs.len()
            {
                return false;
            }
            pending.extend(a.0.subs.iter().zip(b.0.subs.iter()));
        }
        true
    }
}

impl Eq for Structure {}

impl Hash for Structure {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl HashConsed for Structure {
    const KIND: &'static str = "structure";

    fn content_hash(&self) -> u64 {
        self.0.hash
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tree()
            .write_indexed(f, self.iter_depth_first().map(Structure::pointer))
    }
}

impl fmt::Debug for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Structure({})", self)
    }
}

/// Depth-first, left-to-right iterator over the sub-structures of a [`Structure`].
pub struct DepthFirst<'a> {
    stack: SmallVec<[&'a Structure; 16]>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a Structure;

    fn next(&mut self) -> Option<Self::Item> {
        let structure = self.stack.pop()?;
        self.stack.extend(structure.sub_structures().iter().rev());
        Some(structure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn siblings_share_the_running_maximum() {
        let registry = Registry::default();
        let leaf = |p: usize| registry.structure(p, []);

        // p0(p1, p2): p2 is introduced after p1 in the sibling.
        let ok = registry.structure(0, [leaf(1), leaf(2)]);
        assert!(ok.is_canonical());
        assert_eq!(ok.check_canonicity(None), Some(2));

        // p0(p2, p1): p2 skips ahead, even though each sibling alone looks fine.
        let ko = registry.structure(0, [leaf(2), leaf(1)]);
        assert!(!ko.is_canonical());
        assert_eq!(ko.check_canonicity(None), None);
    }

    #[test]
    fn eager_flag_agrees_with_walk() {
        let registry = Registry::default();
        let leaf = |p: usize| registry.structure(p, []);
        let candidates = [
            registry.structure(0, [leaf(1), registry.structure(2, [leaf(0), leaf(3)])]),
            registry.structure(0, [leaf(1), registry.structure(3, [leaf(2)])]),
            registry.structure(1, [leaf(0)]),
            registry.structure(0, [registry.structure(0, [leaf(0)]), leaf(1)]),
        ];
        for s in &candidates {
            assert_eq!(s.is_canonical(), s.check_canonicity(None).is_some(), "{}", s);
        }
    }

    #[test]
    fn nested_check_starts_from_running_max() {
        let registry = Registry::default();
        let sub = registry.structure(3, [registry.structure(2, [])]);
        assert_eq!(sub.check_canonicity(Some(2)), Some(3));
        assert_eq!(sub.check_canonicity(Some(1)), None);
    }

    #[test]
    fn deep_chain_is_dropped_iteratively() {
        let registry = Registry::default();
        let mut s = registry.structure(0, []);
        for _ in 0..50_000 {
            s = Structure::build(Pointer(0), smallvec![s]);
        }
        assert_eq!(s.size(), 50_001);
        assert!(s.is_canonical());
        drop(s);
    }
}
