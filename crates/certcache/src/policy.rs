// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Write propagation and read repair policies for layered caches.

use std::{fmt, str::FromStr, sync::Arc};

use bytes::Bytes;

use crate::Error;

/// Order in which a layered cache propagates `put` and `delete` calls.
///
/// The policy applies to the whole chain. Reads always go from the shallowest
/// layer to the deepest, whatever the write policy.
///
/// # Examples
///
/// ```
/// use certcache::WritePolicy;
///
/// assert_eq!(WritePolicy::default(), WritePolicy::DeepFirst);
///
/// let policy: WritePolicy = "SHALLOW_FIRST".parse().unwrap();
/// assert_eq!(policy, WritePolicy::ShallowFirst);
///
/// assert!("sideways".parse::<WritePolicy>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WritePolicy {
    /// Write the deepest layer first and the shallowest layer last.
    ///
    /// The deepest layer is usually the durable one (a managed database), so a
    /// failure there stops the write before any ephemeral layer claims to hold
    /// data that never reached durable storage.
    #[default]
    DeepFirst,
    /// Write the shallowest layer first and the deepest layer last.
    ShallowFirst,
}

impl WritePolicy {
    /// Returns the canonical name of this policy.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeepFirst => "deep-first",
            Self::ShallowFirst => "shallow-first",
        }
    }

    /// Iterates `layers` in the order this policy writes them.
    pub(crate) fn write_order<T>(self, layers: &[T]) -> impl Iterator<Item = &T> {
        let (shallow_first, deep_first) = match self {
            Self::ShallowFirst => (Some(layers.iter()), None),
            Self::DeepFirst => (None, Some(layers.iter().rev())),
        };
        shallow_first.into_iter().flatten().chain(deep_first.into_iter().flatten())
    }
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WritePolicy {
    type Err = Error;

    /// Parses `deep-first` or `shallow-first`.
    ///
    /// Matching ignores ASCII case and treats `_` like `-`, so `DEEP_FIRST`
    /// is accepted as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "deep-first" => Ok(Self::DeepFirst),
            "shallow-first" => Ok(Self::ShallowFirst),
            _ => Err(Error::configuration(format!("unrecognized write policy {s:?}"))),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for WritePolicy {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for WritePolicy {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Decides whether a value found in a deep layer is copied into the
/// shallower layers that missed it.
///
/// Read repair is off by default: a hit on a deep layer is returned without
/// touching any other layer.
///
/// # Examples
///
/// ```
/// use certcache::ReadRepair;
///
/// let never = ReadRepair::never();
/// let always = ReadRepair::always();
/// let small_only = ReadRepair::when(|_key, data| data.len() < 64 * 1024);
/// ```
#[derive(Clone, Default)]
pub struct ReadRepair(RepairType);

type RepairPredicate = Arc<dyn Fn(&str, &Bytes) -> bool + Send + Sync>;

#[derive(Clone, Default)]
enum RepairType {
    #[default]
    Never,
    Always,
    When(RepairPredicate),
}

impl fmt::Debug for ReadRepair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            RepairType::Never => write!(f, "Never"),
            RepairType::Always => write!(f, "Always"),
            RepairType::When(_) => write!(f, "When(<closure>)"),
        }
    }
}

impl ReadRepair {
    /// Never writes deep hits back to shallower layers.
    #[must_use]
    pub fn never() -> Self {
        Self(RepairType::Never)
    }

    /// Always writes deep hits back to shallower layers.
    #[must_use]
    pub fn always() -> Self {
        Self(RepairType::Always)
    }

    /// Writes deep hits back when `predicate` returns `true` for the key and payload.
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&str, &Bytes) -> bool + Send + Sync + 'static,
    {
        Self(RepairType::When(Arc::new(predicate)))
    }

    #[inline]
    pub(crate) fn should_repair(&self, key: &str, data: &Bytes) -> bool {
        match &self.0 {
            RepairType::Never => false,
            RepairType::Always => true,
            RepairType::When(predicate) => predicate(key, data),
        }
    }
}
