use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use crate::{
    error::FormulaResult,
    registry::{HashConsed, Registry, salted_hash},
    sequence::{check_bounded, fmt_tuple},
};

const BOUNDED_SEQUENCE_SALT: u64 = 0x7267_665f_7365_7100;

/// A restricted growth function sequence.
///
/// Invariant: the sequence is non-empty, its first element is `0`, and every following
/// element is at most one above the maximum of the elements before it. The invariant is
/// checked at construction; violating input is rejected, never repaired.
///
/// Example:
/// ```rust
/// # use hyformula::sequence::BoundedSequence;
/// let s = BoundedSequence::new([0, 1, 1, 2]).unwrap();
/// assert_eq!(s.max_value(), 2);
/// assert!(BoundedSequence::new([0, 2]).unwrap_err().is_growth_violation());
/// assert!(BoundedSequence::new([1, 0]).unwrap_err().is_first_element_not_zero());
/// ```
#[derive(Clone)]
pub struct BoundedSequence(Arc<BoundedSequenceData>);

struct BoundedSequenceData {
    values: Box<[usize]>,
    max_value: usize,
    hash: u64,
}

impl BoundedSequence {
    /// Validate `values` and intern them in the [global registry](Registry::global).
    pub fn new(values: impl Into<Vec<usize>>) -> FormulaResult<Self> {
        Registry::global().bounded_sequence(values)
    }

    /// Build a sequence whose invariant is already known to hold.
    pub(crate) fn from_checked(values: Vec<usize>, max_value: usize) -> Self {
        debug_assert_eq!(check_bounded(&values).ok(), Some(max_value));
        let hash = salted_hash(BOUNDED_SEQUENCE_SALT, values.as_slice());
        Self(Arc::new(BoundedSequenceData {
            values: values.into_boxed_slice(),
            max_value,
            hash,
        }))
    }

    #[inline]
    pub fn values(&self) -> &[usize] {
        &self.0.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.values.len()
    }

    /// Always `false`, a bounded sequence holds at least one element.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<usize> {
        self.0.values.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.values.iter().copied()
    }

    #[inline]
    pub fn max_value(&self) -> usize {
        self.0.max_value
    }

    /// Number of distinct values, i.e. the number of blocks of the set partition of positions
    /// encoded by this sequence.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.0.max_value + 1
    }

    /// Positions grouped by value: block `i` lists, in ascending order, the positions holding
    /// value `i`.
    pub fn blocks(&self) -> Vec<Vec<usize>> {
        let mut blocks = vec![Vec::new(); self.block_count()];
        for (position, value) in self.iter().enumerate() {
            blocks[value].push(position);
        }
        blocks
    }

    /// A bounded sequence is its own canonical form.
    #[inline]
    pub fn canonical_form(&self) -> &BoundedSequence {
        self
    }

    /// Element-wise equality. A bounded sequence is its own canonical form, so this is also
    /// canonical equivalence.
    pub fn is_canonically_equivalent_to(&self, other: &BoundedSequence) -> bool {
        self == other
    }

    /// Returns `true` if both sequences share the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &BoundedSequence) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Registry {
    /// Validate `values` and return the interned [`BoundedSequence`].
    pub fn bounded_sequence(&self, values: impl Into<Vec<usize>>) -> FormulaResult<BoundedSequence> {
        let values = values.into();
        let max_value = check_bounded(&values)?;
        Ok(self
            .bounded_sequences
            .intern(BoundedSequence::from_checked(values, max_value)))
    }
}

impl TryFrom<Vec<usize>> for BoundedSequence {
    type Error = crate::error::FormulaError;

    fn try_from(values: Vec<usize>) -> Result<Self, Self::Error> {
        BoundedSequence::new(values)
    }
}

impl AsRef<[usize]> for BoundedSequence {
    fn as_ref(&self) -> &[usize] {
        self.values()
    }
}

impl PartialEq for BoundedSequence {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.0.hash == other.0.hash && self.0.values == other.0.values)
    }
}

impl Eq for BoundedSequence {}

impl PartialEq<[usize]> for BoundedSequence {
    fn eq(&self, other: &[usize]) -> bool {
        self.values() == other
    }
}

impl<const N: usize> PartialEq<[usize; N]> for BoundedSequence {
    fn eq(&self, other: &[usize; N]) -> bool {
        self.values() == other.as_slice()
    }
}

impl Hash for BoundedSequence {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl HashConsed for BoundedSequence {
    const KIND: &'static str = "bounded sequence";

    fn content_hash(&self) -> u64 {
        self.0.hash
    }
}

impl fmt::Display for BoundedSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_tuple(self.values(), f)
    }
}

impl fmt::Debug for BoundedSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoundedSequence")?;
        fmt_tuple(self.values(), f)
    }
}
