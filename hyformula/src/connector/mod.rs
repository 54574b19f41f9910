//! Interned atomic symbols.
//!
//! A [`Connector`] is identified by a [`Uuid`] and nothing else: declaring the same UID twice
//! returns the instance created by the first declaration, whatever label or representation the
//! second declaration carries.
use std::{cmp::Ordering, collections::BTreeMap, fmt, hash::Hash, str::FromStr, sync::Arc};

use log::{debug, trace};
use uuid::Uuid;

use crate::{
    error::{FormulaError, FormulaResult},
    registry::Registry,
};

pub mod sequence;

pub use sequence::ConnectorSequence;

/// Rendering preferences handed to a [`Representation`], e.g. `"format" => "latex"`.
pub type Preferences = BTreeMap<String, String>;

/// Hook rendering a connector according to some [`Preferences`].
///
/// Returning `None` makes [`Connector::represent`] fall back to the connector's label.
/// Closures with the matching signature implement this trait.
pub trait Representation: Send + Sync {
    fn represent(&self, connector: &Connector, preferences: &Preferences) -> Option<String>;
}

impl<F> Representation for F
where
    F: Fn(&Connector, &Preferences) -> Option<String> + Send + Sync,
{
    fn represent(&self, connector: &Connector, preferences: &Preferences) -> Option<String> {
        self(connector, preferences)
    }
}

/// A globally unique atomic symbol.
///
/// Equality, ordering and hashing only depend on [`Connector::uid`].
///
/// Example:
/// ```rust
/// # use hyformula::{connector::Connector, registry::Registry};
/// let registry = Registry::default();
/// let and = registry.declare(None, "and");
/// let same = registry.declare(Some(and.uid()), "∧");
/// assert!(and.ptr_eq(&same));
/// assert_eq!(same.fallback_label(), "and");
/// ```
#[derive(Clone)]
pub struct Connector(Arc<ConnectorData>);

struct ConnectorData {
    uid: Uuid,
    fallback_label: String,
    representation: Option<Arc<dyn Representation>>,
}

impl Connector {
    /// Declare a connector in the [global registry](Registry::global).
    pub fn declare(uid: Option<Uuid>, fallback_label: impl Into<String>) -> Self {
        Registry::global().declare(uid, fallback_label)
    }

    /// Declare a connector from its textual UID in the [global registry](Registry::global).
    pub fn declare_str(uid: &str, fallback_label: impl Into<String>) -> FormulaResult<Self> {
        Registry::global().declare_str(uid, fallback_label)
    }

    /// Declare a connector with a representation hook in the
    /// [global registry](Registry::global).
    pub fn declare_with_representation(
        uid: Option<Uuid>,
        fallback_label: impl Into<String>,
        representation: impl Representation + 'static,
    ) -> Self {
        Registry::global().declare_with_representation(uid, fallback_label, representation)
    }

    #[inline]
    pub fn uid(&self) -> Uuid {
        self.0.uid
    }

    #[inline]
    pub fn fallback_label(&self) -> &str {
        &self.0.fallback_label
    }

    /// Render this connector with its representation hook, or its fallback label if there is
    /// no hook or the hook declines.
    pub fn represent(&self, preferences: &Preferences) -> String {
        self.0
            .representation
            .as_ref()
            .and_then(|hook| hook.represent(self, preferences))
            .unwrap_or_else(|| self.0.fallback_label.clone())
    }

    /// Returns `true` if both connectors are the same cached instance.
    #[inline]
    pub fn ptr_eq(&self, other: &Connector) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Registry {
    /// Declare a connector, generating a fresh random UID when `uid` is `None`.
    ///
    /// If a connector with this UID already exists, it is returned unchanged and
    /// `fallback_label` is ignored.
    pub fn declare(&self, uid: Option<Uuid>, fallback_label: impl Into<String>) -> Connector {
        self.declare_connector(uid, fallback_label.into(), None)
    }

    /// Like [`Registry::declare`] with a textual UID, as found in configuration bundles.
    pub fn declare_str(&self, uid: &str, fallback_label: impl Into<String>) -> FormulaResult<Connector> {
        let parsed = Uuid::from_str(uid).map_err(|source| FormulaError::InvalidUid {
            uid: uid.to_string(),
            source,
        })?;
        Ok(self.declare(Some(parsed), fallback_label))
    }

    /// Like [`Registry::declare`], attaching `representation` to a newly created connector.
    pub fn declare_with_representation(
        &self,
        uid: Option<Uuid>,
        fallback_label: impl Into<String>,
        representation: impl Representation + 'static,
    ) -> Connector {
        self.declare_connector(uid, fallback_label.into(), Some(Arc::new(representation)))
    }

    /// Look up a previously declared connector.
    pub fn connector(&self, uid: &Uuid) -> Option<Connector> {
        self.connectors.read().get(uid).cloned()
    }

    fn declare_connector(
        &self,
        uid: Option<Uuid>,
        fallback_label: String,
        representation: Option<Arc<dyn Representation>>,
    ) -> Connector {
        let uid = uid.unwrap_or_else(Uuid::new_v4);
        let mut connectors = self.connectors.upgradable_read();

        if let Some(existing) = connectors.get(&uid) {
            trace!(
                "Connector {} already declared as '{}'.",
                uid,
                existing.fallback_label()
            );
            return existing.clone();
        }

        connectors.with_upgraded(|connectors| {
            debug!("Declared connector '{}' with uid {}.", fallback_label, uid);
            connectors
                .entry(uid)
                .or_insert_with(|| {
                    Connector(Arc::new(ConnectorData {
                        uid,
                        fallback_label,
                        representation,
                    }))
                })
                .clone()
        })
    }
}

impl PartialEq for Connector {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.uid == other.0.uid
    }
}

impl Eq for Connector {}

impl PartialOrd for Connector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Connector {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.uid.cmp(&other.0.uid)
    }
}

impl Hash for Connector {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.uid.hash(state);
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.fallback_label)
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Connector({}, {})", self.0.fallback_label, self.0.uid)
    }
}
