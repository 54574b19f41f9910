//! Integer sequences used to label tree shapes.
//!
//! - [`BoundedSequence`]: a restricted growth function sequence `(n0, …, nk)` with `n0 = 0` and
//!   `nj ≤ 1 + max(n0, …, n(j-1))`. It is the canonical form of a labeling where only the order
//!   of first appearance matters, and encodes a set partition of its positions.
//! - [`LabelSequence`]: any non-empty sequence of non-negative integers, with a memoised
//!   [`LabelSequence::canonical_form`].
use std::{collections::HashMap, fmt};

pub mod bounded;
pub mod label;

pub use bounded::BoundedSequence;
pub use label::LabelSequence;

use crate::error::{FormulaError, FormulaResult};

/// Check the restricted growth constraint and return the maximum value of `values`.
pub(crate) fn check_bounded(values: &[usize]) -> FormulaResult<usize> {
    let (&first, rest) = values
        .split_first()
        .ok_or(FormulaError::EmptyCollection {
            collection: "BoundedSequence",
        })?;

    if first != 0 {
        return Err(FormulaError::FirstElementNotZero {
            found: first,
            sequence: values.to_vec(),
        });
    }

    let mut max = 0;
    for (offset, &value) in rest.iter().enumerate() {
        if value > max + 1 {
            return Err(FormulaError::GrowthViolation {
                index: offset + 1,
                value,
                bound: max + 1,
                sequence: values.to_vec(),
            });
        }
        max = max.max(value);
    }

    Ok(max)
}

/// Relabel `values` by order of first appearance, starting at `0`.
pub(crate) fn first_appearance_relabeling(values: &[usize]) -> Vec<usize> {
    let mut mapping: HashMap<usize, usize> = HashMap::with_capacity(values.len());
    values
        .iter()
        .map(|&value| {
            let next = mapping.len();
            *mapping.entry(value).or_insert(next)
        })
        .collect()
}

pub(crate) fn fmt_tuple(values: &[usize], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("(")?;
    for (index, value) in values.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", value)?;
    }
    f.write_str(")")
}
