//! Hyformula: hash-consed values for the structural core of a formal-logic engine.
//!
//! A formula is split into two independent parts:
//!  - a [`Structure`](structure::Structure): the ordered tree of the formula where every vertex
//!    carries a pointer `pi`;
//!  - a [`ConnectorSequence`](connector::ConnectorSequence): the connectors the pointers refer
//!    to, `pi` resolving to the `i`-th connector.
//!
//! Formula equivalence then reduces to comparing tree shapes through their canonical integer
//! encodings (see [`tree`]) and walking both structures in lock-step.
//!
//! Interning
//!  - Connectors, connector sequences, bounded sequences, structures and formulas are interned
//!    in a [`Registry`](registry::Registry). Equal values built through the same registry share
//!    one allocation.
//!  - Every value type has convenience constructors using [`Registry::global`]. Pass an explicit
//!    registry to keep state isolated.
//!
//! Example
//! ```
//! use hyformula::prelude::*;
//!
//! let registry = Registry::default();
//! let implies = registry.declare(None, "implies");
//! let p = registry.declare(None, "p");
//!
//! // implies(p, p)
//! let structure = registry.structure(0, [registry.structure(1, []), registry.structure(1, [])]);
//! let connectors = registry.connector_sequence([implies, p]).unwrap();
//! let phi = registry.formula(connectors, structure).unwrap();
//! assert_eq!(phi.to_string(), "implies(p, p)");
//!
//! let again = registry
//!     .formula(phi.connectors().clone(), phi.structure().clone())
//!     .unwrap();
//! assert!(phi.ptr_eq(&again));
//! assert_eq!(phi.structure().tree().canonical_string(), "(()())");
//! ```

/// Registry configuration, loadable from TOML.
pub mod config;
/// Interned atomic symbols and sequences of them.
pub mod connector;
/// Error type shared by every fallible constructor.
pub mod error;
pub mod formula;
/// Hash-consing caches.
pub mod registry;
pub mod sequence;
pub mod structure;
/// Ordered tree shapes and their canonical encodings.
pub mod tree;

pub mod prelude {
    //! Convenient re-exports for end users.
    pub use crate::config::{CanonicityPolicy, RegistryConfig};
    pub use crate::connector::{Connector, ConnectorSequence, Preferences, Representation};
    pub use crate::error::{FormulaError, FormulaResult};
    pub use crate::formula::Formula;
    pub use crate::registry::Registry;
    pub use crate::sequence::{BoundedSequence, LabelSequence};
    pub use crate::structure::{Pointer, Structure};
    pub use crate::tree::Tree;
}
