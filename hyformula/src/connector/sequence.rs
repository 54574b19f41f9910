use std::{
    fmt,
    hash::{Hash, Hasher},
    ops::Index,
    sync::Arc,
};

use uuid::Uuid;

use crate::{
    connector::Connector,
    error::{FormulaError, FormulaResult},
    registry::{HashConsed, Registry, salted_hash},
};

const CONNECTOR_SEQUENCE_SALT: u64 = 0x636f_6e6e_7365_7100;

/// A non-empty, ordered sequence of connectors, possibly with repetitions.
///
/// Example:
/// ```rust
/// # use hyformula::registry::Registry;
/// let registry = Registry::default();
/// let and = registry.declare(None, "and");
/// let p = registry.declare(None, "p");
/// let s = registry.connector_sequence([and, p.clone(), p]).unwrap();
/// assert_eq!(s.to_string(), "(and, p, p)");
/// assert!(registry.connector_sequence([]).unwrap_err().is_empty_collection());
/// ```
#[derive(Clone)]
pub struct ConnectorSequence(Arc<ConnectorSequenceData>);

struct ConnectorSequenceData {
    connectors: Box<[Connector]>,
    hash: u64,
}

impl ConnectorSequence {
    /// Build and intern a sequence in the [global registry](Registry::global).
    pub fn new<I: IntoIterator<Item = Connector>>(connectors: I) -> FormulaResult<Self> {
        Registry::global().connector_sequence(connectors)
    }

    fn from_non_empty(connectors: Vec<Connector>) -> Self {
        debug_assert!(!connectors.is_empty());
        let uids: Vec<Uuid> = connectors.iter().map(Connector::uid).collect();
        let hash = salted_hash(CONNECTOR_SEQUENCE_SALT, uids.as_slice());
        Self(Arc::new(ConnectorSequenceData {
            connectors: connectors.into_boxed_slice(),
            hash,
        }))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.connectors.len()
    }

    /// Always `false`, a connector sequence holds at least one connector.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Connector> {
        self.0.connectors.get(index)
    }

    #[inline]
    pub fn as_slice(&self) -> &[Connector] {
        &self.0.connectors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Connector> {
        self.0.connectors.iter()
    }

    /// Concatenate two sequences in the [global registry](Registry::global).
    pub fn concatenate(&self, other: &ConnectorSequence) -> ConnectorSequence {
        Registry::global().concatenate_connector_sequences(self, other)
    }

    #[inline]
    pub fn ptr_eq(&self, other: &ConnectorSequence) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Registry {
    /// Build and intern a connector sequence. Fails on an empty input.
    pub fn connector_sequence<I: IntoIterator<Item = Connector>>(
        &self,
        connectors: I,
    ) -> FormulaResult<ConnectorSequence> {
        let connectors: Vec<Connector> = connectors.into_iter().collect();
        if connectors.is_empty() {
            return Err(FormulaError::EmptyCollection {
                collection: "ConnectorSequence",
            });
        }
        Ok(self.intern_connector_sequence(connectors))
    }

    /// `a` followed by `b`, interned in this registry.
    pub fn concatenate_connector_sequences(
        &self,
        a: &ConnectorSequence,
        b: &ConnectorSequence,
    ) -> ConnectorSequence {
        self.intern_connector_sequence(a.iter().chain(b.iter()).cloned().collect())
    }

    pub(crate) fn intern_connector_sequence(&self, connectors: Vec<Connector>) -> ConnectorSequence {
        self.connector_sequences
            .intern(ConnectorSequence::from_non_empty(connectors))
    }
}

impl Index<usize> for ConnectorSequence {
    type Output = Connector;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0.connectors[index]
    }
}

impl<'a> IntoIterator for &'a ConnectorSequence {
    type Item = &'a Connector;
    type IntoIter = std::slice::Iter<'a, Connector>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl PartialEq for ConnectorSequence {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.0.hash == other.0.hash && self.0.connectors == other.0.connectors)
    }
}

impl Eq for ConnectorSequence {}

impl Hash for ConnectorSequence {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl HashConsed for ConnectorSequence {
    const KIND: &'static str = "connector sequence";

    fn content_hash(&self) -> u64 {
        self.0.hash
    }
}

impl fmt::Display for ConnectorSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (index, connector) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", connector)?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for ConnectorSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
