use std::{fmt, sync::Arc};

use once_cell::sync::OnceCell;

use crate::{
    error::{FormulaError, FormulaResult},
    sequence::{BoundedSequence, check_bounded, first_appearance_relabeling, fmt_tuple},
};

/// A finite, non-empty sequence of non-negative integers without growth constraint.
///
/// Its [canonical form](LabelSequence::canonical_form) relabels every distinct value by order
/// of first appearance, starting at `0`, and is computed once per instance.
///
/// Example:
/// ```rust
/// # use hyformula::sequence::LabelSequence;
/// let s = LabelSequence::new([3, 5, 3, 1, 5, 2]).unwrap();
/// assert_eq!(s.canonical_form(), &[0, 1, 0, 2, 1, 3]);
/// assert!(!s.is_bounded());
/// ```
#[derive(Clone)]
pub struct LabelSequence {
    values: Arc<[usize]>,
    canonical_form: OnceCell<BoundedSequence>,
}

impl LabelSequence {
    /// Fails with [`FormulaError::EmptyCollection`] if `values` is empty, an empty sequence
    /// has no canonical form.
    pub fn new(values: impl Into<Vec<usize>>) -> FormulaResult<Self> {
        let values: Vec<usize> = values.into();
        if values.is_empty() {
            return Err(FormulaError::EmptyCollection {
                collection: "LabelSequence",
            });
        }
        Ok(Self::from_non_empty(values))
    }

    pub(crate) fn from_non_empty(values: Vec<usize>) -> Self {
        debug_assert!(!values.is_empty());
        Self {
            values: values.into(),
            canonical_form: OnceCell::new(),
        }
    }

    #[inline]
    pub fn values(&self) -> &[usize] {
        &self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`, see [`LabelSequence::new`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.values.iter().copied()
    }

    pub fn max_value(&self) -> usize {
        self.values.iter().copied().max().unwrap_or_default()
    }

    /// Returns `true` if the sequence already satisfies the [`BoundedSequence`] constraint.
    pub fn is_bounded(&self) -> bool {
        check_bounded(&self.values).is_ok()
    }

    /// Relabel by order of first appearance. Bounded sequences are fixed points.
    pub fn canonical_form(&self) -> &BoundedSequence {
        self.canonical_form.get_or_init(|| {
            let relabeled = first_appearance_relabeling(&self.values);
            let max_value = relabeled.iter().copied().max().unwrap_or_default();
            BoundedSequence::from_checked(relabeled, max_value)
        })
    }

    /// Two label sequences are canonically equivalent iff their canonical forms are equal.
    pub fn is_canonically_equivalent_to(&self, other: &LabelSequence) -> bool {
        self.len() == other.len() && self.canonical_form() == other.canonical_form()
    }

    /// Append `other` to this sequence. The result is not necessarily bounded.
    pub fn concatenate(&self, other: &LabelSequence) -> LabelSequence {
        Self::from_non_empty(self.iter().chain(other.iter()).collect())
    }

    /// Concatenate `self` followed by every sequence of `others`.
    pub fn concatenate_all<'a>(&self, others: impl IntoIterator<Item = &'a LabelSequence>) -> LabelSequence {
        let mut values = self.values.to_vec();
        for other in others {
            values.extend_from_slice(other.values());
        }
        Self::from_non_empty(values)
    }
}

impl TryFrom<Vec<usize>> for LabelSequence {
    type Error = FormulaError;

    fn try_from(values: Vec<usize>) -> Result<Self, Self::Error> {
        LabelSequence::new(values)
    }
}

impl From<&BoundedSequence> for LabelSequence {
    fn from(sequence: &BoundedSequence) -> Self {
        Self {
            values: sequence.values().into(),
            canonical_form: OnceCell::with_value(sequence.clone()),
        }
    }
}

impl AsRef<[usize]> for LabelSequence {
    fn as_ref(&self) -> &[usize] {
        self.values()
    }
}

impl PartialEq for LabelSequence {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for LabelSequence {}

impl std::hash::Hash for LabelSequence {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.values.hash(state);
    }
}

impl fmt::Display for LabelSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_tuple(self.values(), f)
    }
}

impl fmt::Debug for LabelSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LabelSequence")?;
        fmt_tuple(self.values(), f)
    }
}
