//! PropertyMap - immutable property mappings
//!
//! Fixtures build one map per phase instead of editing a shared map in
//! place: [`PropertyMap::with`] and [`PropertyMap::without`] return new maps
//! and leave the receiver untouched.

use crate::error::ManifestError;
use indexmap::IndexMap;
use probity_identity::FieldSource;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Name of the property carrying the ensure state
pub const ENSURE: &str = "ensure";

/// Declared presence of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnsureState {
    /// Resource must exist
    #[default]
    Present,
    /// Resource must not exist
    Absent,
}

impl EnsureState {
    /// Manifest keyword
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

impl Display for EnsureState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnsureState {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            other => Err(ManifestError::InvalidEnsure(other.to_string())),
        }
    }
}

/// Property name to string value
///
/// Iteration follows insertion order so rendered fixtures are reproducible;
/// equality ignores order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap {
    entries: IndexMap<String, String>,
}

impl PropertyMap {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a builder
    #[inline]
    #[must_use]
    pub fn builder() -> PropertyMapBuilder {
        PropertyMapBuilder::default()
    }

    /// Value for a key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether the key is present
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parsed `ensure` entry, if any
    ///
    /// # Errors
    /// Returns [`ManifestError::InvalidEnsure`] for values other than
    /// present/absent.
    pub fn ensure(&self) -> Result<Option<EnsureState>, ManifestError> {
        self.get(ENSURE).map(str::parse).transpose()
    }

    /// New map with one entry set; an existing key keeps its position
    #[must_use]
    pub fn with(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(key.into(), value.into());
        Self { entries }
    }

    /// New map with the given keys removed
    #[must_use]
    pub fn without<I, K>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut entries = self.entries.clone();
        for key in keys {
            entries.shift_remove(key.as_ref());
        }
        Self { entries }
    }

    /// New map with `other` layered on top; its values win
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        let mut entries = self.entries.clone();
        for (k, v) in &other.entries {
            entries.insert(k.clone(), v.clone());
        }
        Self { entries }
    }

    /// New map keeping only keys accepted by `keep`
    #[must_use]
    pub fn filtered(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(k, _)| keep(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl FieldSource for PropertyMap {
    fn field_value(&self, name: &str) -> Option<&str> {
        self.get(name)
    }
}

impl<K, V> FromIterator<(K, V)> for PropertyMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PropertyMap {
    type Item = (&'a String, &'a String);
    type IntoIter = indexmap::map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Builder for [`PropertyMap`]
#[derive(Debug, Default)]
pub struct PropertyMapBuilder {
    entries: IndexMap<String, String>,
}

impl PropertyMapBuilder {
    /// Set an entry
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Set an entry only when `condition` holds
    #[must_use]
    pub fn set_if(self, condition: bool, key: impl Into<String>, value: impl Into<String>) -> Self {
        if condition {
            self.set(key, value)
        } else {
            self
        }
    }

    /// Set the ensure entry
    #[must_use]
    pub fn ensure(self, state: EnsureState) -> Self {
        self.set(ENSURE, state.as_str())
    }

    /// Copy every entry of an existing map
    #[must_use]
    pub fn extend(mut self, other: &PropertyMap) -> Self {
        for (k, v) in other.iter() {
            self.entries.insert(k.to_string(), v.to_string());
        }
        self
    }

    /// Finish
    #[must_use]
    pub fn build(self) -> PropertyMap {
        PropertyMap {
            entries: self.entries,
        }
    }
}
