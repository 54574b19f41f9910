//! Formulas: a canonical [`Structure`] bound to a [`ConnectorSequence`].
//!
//! The connector placed at a vertex is the connector whose index is the rank of the vertex's
//! pointer among the distinct pointers of the structure. For a canonical structure the rank of
//! `pi` is `i`, so `pi` resolves to the `i`-th connector.
use std::{
    fmt::{self, Write},
    hash::{Hash, Hasher},
    sync::Arc,
};

use log::warn;

use crate::{
    connector::{Connector, ConnectorSequence, Preferences},
    error::{FormulaError, FormulaResult},
    registry::{HashConsed, Registry, salted_hash},
    structure::{Pointer, Structure},
};

const FORMULA_SALT: u64 = 0x666f_726d_756c_6100;

/// An immutable, hash-consed formula.
///
/// Invariant: `connectors.len() == structure.pointers_count()`. Unless the registry permits it,
/// the structure is also canonical.
///
/// Example:
/// ```rust
/// # use hyformula::registry::Registry;
/// let registry = Registry::default();
/// let and = registry.declare(None, "and");
/// let p = registry.declare(None, "p");
/// let q = registry.declare(None, "q");
///
/// let structure = registry.structure(0, [registry.structure(1, []), registry.structure(2, [])]);
/// let connectors = registry.connector_sequence([and, p, q]).unwrap();
/// let phi = registry.formula(connectors, structure).unwrap();
/// assert_eq!(phi.to_string(), "and(p, q)");
/// assert_eq!(phi.formula_degree(), 1);
/// ```
#[derive(Clone)]
pub struct Formula(Arc<FormulaNode>);

struct FormulaNode {
    connectors: ConnectorSequence,
    structure: Structure,
    hash: u64,
}

impl Formula {
    /// Validate and intern a formula in the [global registry](Registry::global).
    pub fn new(connectors: ConnectorSequence, structure: Structure) -> FormulaResult<Self> {
        Registry::global().formula(connectors, structure)
    }

    #[inline]
    pub fn connectors(&self) -> &ConnectorSequence {
        &self.0.connectors
    }

    #[inline]
    pub fn structure(&self) -> &Structure {
        &self.0.structure
    }

    /// Connector resolved by a pointer known to appear in the structure.
    fn resolve(&self, pointer: Pointer) -> &Connector {
        let rank = self
            .structure()
            .pointers()
            .partition_point(|p| *p < pointer);
        &self.connectors()[rank]
    }

    /// The connector a pointer resolves to, or `None` if the structure does not use it.
    pub fn connector_of(&self, pointer: impl Into<Pointer>) -> Option<&Connector> {
        let rank = self
            .structure()
            .pointers()
            .binary_search(&pointer.into())
            .ok()?;
        self.connectors().get(rank)
    }

    /// The connector at the root of the formula.
    pub fn root_connector(&self) -> &Connector {
        self.resolve(self.structure().pointer())
    }

    /// Number of vertices.
    #[inline]
    pub fn tree_size(&self) -> usize {
        self.structure().size()
    }

    /// Number of vertices that are not leaves.
    pub fn formula_degree(&self) -> usize {
        self.structure()
            .iter_depth_first()
            .filter(|s| !s.is_leaf())
            .count()
    }

    /// Compare the vertices of `self` with the vertices of `other` rooted at `at`, both
    /// depth-first.
    fn matches_at(&self, other: &Formula, at: &Structure) -> bool {
        self.structure().tree().is_shape_equivalent_to(at.tree())
            && self
                .structure()
                .iter_depth_first()
                .zip(at.iter_depth_first())
                .all(|(a, b)| self.resolve(a.pointer()) == other.resolve(b.pointer()))
    }

    fn warn_if_non_canonical(&self) {
        if !self.structure().is_canonical() {
            warn!(
                "Formula {} uses the non-canonical structure {}; equivalence is computed on resolved connectors.",
                self,
                self.structure()
            );
        }
    }

    /// Two formulas are equivalent when their structures have the same shape and every pair of
    /// corresponding vertices resolves to the same connector.
    ///
    /// The connector sequences themselves are not compared: `(f, f)` over `p0(p1)` is
    /// equivalent to `(f)` over `p0(p0)`.
    pub fn is_formula_equivalent_to(&self, other: &Formula) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.warn_if_non_canonical();
        other.warn_if_non_canonical();
        self.matches_at(other, other.structure())
    }

    /// Returns `true` if `self` is equivalent to some sub-formula of `other`, `other` included.
    pub fn is_sub_formula_of(&self, other: &Formula) -> bool {
        self.warn_if_non_canonical();
        other.warn_if_non_canonical();
        other
            .structure()
            .iter_depth_first()
            .any(|at| self.matches_at(other, at))
    }

    /// The formulas rooted at the children of the root, in the
    /// [global registry](Registry::global).
    pub fn immediate_sub_formulas(&self) -> Vec<Formula> {
        Registry::global().immediate_sub_formulas(self)
    }

    /// Every sub-formula, depth-first, starting with `self`, in the
    /// [global registry](Registry::global).
    pub fn sub_formulas(&self) -> Vec<Formula> {
        Registry::global().sub_formulas(self)
    }

    /// Render with each connector's representation hook, in function notation.
    pub fn represent(&self, preferences: &Preferences) -> String {
        let mut out = String::new();
        let labels = self
            .structure()
            .iter_depth_first()
            .map(|s| self.resolve(s.pointer()).represent(preferences));
        let written = self.structure().tree().write_indexed(&mut out, labels);
        debug_assert!(written.is_ok());
        out
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Formula) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Registry {
    /// Validate and intern a formula.
    ///
    /// Fails with [`FormulaError::ArityMismatch`] unless there is exactly one connector per
    /// distinct pointer, and with [`FormulaError::NonCanonicalStructure`] if the structure is not
    /// canonical and the registry [rejects](crate::config::CanonicityPolicy::Reject) such
    /// structures.
    pub fn formula(&self, connectors: ConnectorSequence, structure: Structure) -> FormulaResult<Formula> {
        if connectors.len() != structure.pointers_count() {
            return Err(FormulaError::ArityMismatch {
                connectors: connectors.len(),
                pointers: structure.pointers_count(),
                structure: structure.to_string(),
            });
        }

        if !structure.is_canonical() && self.config().canonicity.is_reject() {
            return Err(FormulaError::NonCanonicalStructure {
                structure: structure.to_string(),
                pointer_sequence: structure.pointer_sequence().values().to_vec(),
            });
        }

        Ok(self.intern_formula(connectors, structure))
    }

    fn intern_formula(&self, connectors: ConnectorSequence, structure: Structure) -> Formula {
        let hash = salted_hash(
            FORMULA_SALT,
            &[connectors.content_hash(), structure.content_hash()],
        );
        self.formulas.intern(Formula(Arc::new(FormulaNode {
            connectors,
            structure,
            hash,
        })))
    }

    /// The formula rooted at `at`, a vertex of `formula`: its connectors are the connectors
    /// `at` uses, in order of first appearance, and its structure is `at` canonicalised.
    fn sub_formula_at(&self, formula: &Formula, at: &Structure) -> Formula {
        if at.ptr_eq(formula.structure()) && at.is_canonical() {
            return formula.clone();
        }

        let connectors = at
            .first_appearances()
            .iter()
            .map(|p| formula.resolve(*p).clone())
            .collect();
        let connectors = self.intern_connector_sequence(connectors);
        let structure = self.canonicalize_structure(at);
        self.intern_formula(connectors, structure)
    }

    /// The formulas rooted at the children of the root of `formula`.
    pub fn immediate_sub_formulas(&self, formula: &Formula) -> Vec<Formula> {
        formula
            .structure()
            .sub_structures()
            .iter()
            .map(|at| self.sub_formula_at(formula, at))
            .collect()
    }

    /// Every sub-formula of `formula`, depth-first, starting with `formula` itself.
    pub fn sub_formulas(&self, formula: &Formula) -> Vec<Formula> {
        formula
            .structure()
            .iter_depth_first()
            .map(|at| self.sub_formula_at(formula, at))
            .collect()
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.0.hash == other.0.hash
                && self.0.connectors == other.0.connectors
                && self.0.structure == other.0.structure)
    }
}

impl Eq for Formula {}

impl Hash for Formula {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl HashConsed for Formula {
    const KIND: &'static str = "formula";

    fn content_hash(&self) -> u64 {
        self.0.hash
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = self
            .structure()
            .iter_depth_first()
            .map(|s| self.resolve(s.pointer()));
        self.structure().tree().write_indexed(f, labels)
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = String::new();
        write!(rendered, "{}", self)?;
        f.debug_struct("Formula")
            .field("formula", &rendered)
            .field("connectors", self.connectors())
            .field("structure", self.structure())
            .finish()
    }
}
