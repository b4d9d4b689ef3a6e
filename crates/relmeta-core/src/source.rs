//! Configuration sources
//!
//! Provides [`ConfigurationSource`], the provenance level attached to every
//! configured value. All override decisions in the workspace reduce to the
//! total order defined here.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Provenance level of a configured value
///
/// Ordered `Convention < DataAnnotation < Explicit`. A write tagged with a
/// source may replace a value recorded at the same or a weaker source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfigurationSource {
    /// Inferred automatically by a convention pass
    Convention,

    /// Discovered from attributes/annotations on the mapped type
    DataAnnotation,

    /// Set by a direct user configuration call
    Explicit,
}

impl ConfigurationSource {
    /// All sources in ascending order
    pub const ALL: [Self; 3] = [Self::Convention, Self::DataAnnotation, Self::Explicit];

    /// Whether a write at `self` may replace a value recorded at `current`
    ///
    /// An unset `current` is always overridden. Ties favor the incoming write.
    #[inline]
    #[must_use]
    pub fn overrides(self, current: Option<Self>) -> bool {
        match current {
            Some(current) => self >= current,
            None => true,
        }
    }

    /// Like [`overrides`](Self::overrides) but ties lose
    #[inline]
    #[must_use]
    pub fn overrides_strictly(self, current: Option<Self>) -> bool {
        match current {
            Some(current) => self > current,
            None => true,
        }
    }

    /// The stronger of `self` and `other`
    ///
    /// Used to ratchet a recorded source upward; an unset `other` yields `self`.
    #[inline]
    #[must_use]
    pub fn max(self, other: Option<Self>) -> Self {
        match other {
            Some(other) if other > self => other,
            _ => self,
        }
    }

    /// Source used by convention-facing calls
    #[inline]
    #[must_use]
    pub const fn from_data_annotation(from_data_annotation: bool) -> Self {
        if from_data_annotation {
            Self::DataAnnotation
        } else {
            Self::Convention
        }
    }

    /// Stable lowercase name
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Convention => "convention",
            Self::DataAnnotation => "data_annotation",
            Self::Explicit => "explicit",
        }
    }
}

impl Display for ConfigurationSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
