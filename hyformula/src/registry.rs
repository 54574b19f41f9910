//! Hash-consing registry.
//!
//! A [`Registry`] owns one grow-only cache per interned value type:
//! [`Connector`] (keyed by UID), [`ConnectorSequence`], [`BoundedSequence`], [`Structure`] and
//! [`Formula`] (keyed by a precomputed 64-bit content hash). Constructing a value that is
//! already cached returns the cached instance, so structurally equal values share one
//! allocation.
//!
//! Most callers use [`Registry::global`], the process-wide registry behind the convenience
//! constructors of every value type. Tests and embedders that need isolated state create
//! their own registry with [`Registry::new`] and call the constructors on it.
use std::{
    collections::BTreeMap,
    fmt,
    hash::{DefaultHasher, Hash, Hasher},
};

use log::{debug, info, trace};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use smallvec::{SmallVec, smallvec};
use uuid::Uuid;

use crate::{
    config::RegistryConfig, connector::Connector, connector::sequence::ConnectorSequence,
    formula::Formula, sequence::BoundedSequence, structure::Structure,
};

static GLOBAL_REGISTRY: Lazy<Registry> = Lazy::new(Registry::default);

/// Values stored in an [`Interner`].
///
/// `content_hash` must be stable for equal values; it is computed once at construction and
/// cached by every implementor.
pub(crate) trait HashConsed: Clone + PartialEq + fmt::Display {
    /// Human readable name of the cache, used in log records.
    const KIND: &'static str;

    fn content_hash(&self) -> u64;
}

/// Hash a value with a per-type salt, so that equal payloads of distinct types never share a
/// hash.
pub(crate) fn salted_hash<T: Hash + ?Sized>(salt: u64, value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    salt.hash(&mut hasher);
    value.hash(&mut hasher);
    hasher.finish()
}

/// A grow-only hash-consing table.
pub(crate) struct Interner<T> {
    entries: RwLock<BTreeMap<u64, SmallVec<[T; 1]>>>,
}

impl<T: HashConsed> Interner<T> {
    fn new() -> Self {
        Self {
            entries: Default::default(),
        }
    }

    /// Return the cached value equal to `candidate`, inserting `candidate` if there is none.
    ///
    /// # A note on concurrency
    /// The lookup happens under an upgradable read lock which is only upgraded for insertion.
    /// Only one upgradable reader may exist at a time, so two threads racing to insert the same
    /// value always end up with the same instance, and no reader observes a partial insertion.
    ///
    /// # About hash collisions
    /// Values are bucketed by their 64-bit content hash. Distinct values sharing a hash are kept
    /// side by side in the same bucket and compared structurally; a collision only costs a few
    /// extra comparisons.
    pub(crate) fn intern(&self, candidate: T) -> T {
        let h = candidate.content_hash();
        let mut entries = self.entries.upgradable_read();

        if let Some(bucket) = entries.get(&h) {
            if let Some(existing) = bucket.iter().find(|existing| **existing == candidate) {
                trace!("{} cache hit for {} (hash 0x{:016x}).", T::KIND, existing, h);
                return existing.clone();
            }
        }

        entries.with_upgraded(|entries| {
            if let Some(bucket) = entries.get_mut(&h) {
                info!(
                    "Detected an hash collision on hash 0x{:016x} in the {} cache. The following values collided:\n{}\n - {}",
                    h,
                    T::KIND,
                    bucket
                        .iter()
                        .map(|value| format!(" - {}", value))
                        .collect::<Vec<_>>()
                        .join("\n"),
                    candidate,
                );
                bucket.push(candidate.clone());
            } else {
                debug!(
                    "New {} encountered {}. Registered with hash 0x{:016x}.",
                    T::KIND,
                    candidate,
                    h
                );
                entries.insert(h, smallvec![candidate.clone()]);
            }
            candidate
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().values().map(SmallVec::len).sum()
    }
}

/// Owner of the hash-consing caches.
///
/// Example:
/// ```rust
/// # use hyformula::registry::Registry;
/// let registry = Registry::default();
/// let a = registry.bounded_sequence([0, 1, 1, 2]).unwrap();
/// let b = registry.bounded_sequence(vec![0, 1, 1, 2]).unwrap();
/// assert!(a.ptr_eq(&b));
/// assert_eq!(registry.bounded_sequence_count(), 1);
/// ```
pub struct Registry {
    config: RegistryConfig,
    pub(crate) connectors: RwLock<BTreeMap<Uuid, Connector>>,
    pub(crate) connector_sequences: Interner<ConnectorSequence>,
    pub(crate) bounded_sequences: Interner<BoundedSequence>,
    pub(crate) structures: Interner<Structure>,
    pub(crate) formulas: Interner<Formula>,
}

impl Registry {
    /// Create an empty registry using `config`.
    pub fn new(config: RegistryConfig) -> Self {
        debug!("Creating formula registry with {:?}.", config);
        Self {
            config,
            connectors: Default::default(),
            connector_sequences: Interner::new(),
            bounded_sequences: Interner::new(),
            structures: Interner::new(),
            formulas: Interner::new(),
        }
    }

    /// The process-wide registry, created with the default configuration on first use.
    pub fn global() -> &'static Registry {
        &GLOBAL_REGISTRY
    }

    #[inline]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn connector_count(&self) -> usize {
        self.connectors.read().len()
    }

    pub fn connector_sequence_count(&self) -> usize {
        self.connector_sequences.len()
    }

    pub fn bounded_sequence_count(&self) -> usize {
        self.bounded_sequences.len()
    }

    pub fn structure_count(&self) -> usize {
        self.structures.len()
    }

    pub fn formula_count(&self) -> usize {
        self.formulas.len()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("connectors", &self.connector_count())
            .field("connector_sequences", &self.connector_sequence_count())
            .field("bounded_sequences", &self.bounded_sequence_count())
            .field("structures", &self.structure_count())
            .field("formulas", &self.formula_count())
            .finish()
    }
}
