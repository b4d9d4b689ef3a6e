//! Source-tracked values
//!
//! Provides [`Tracked<T>`], a value paired with the configuration source that
//! last set it. Every configurable attribute in the workspace is stored as a
//! `Tracked` so the override rule lives in exactly one place.

use crate::source::ConfigurationSource;

/// A value stamped with the source that produced it
///
/// # Rules
/// - A write is accepted when its source overrides the recorded one, or when
///   it re-affirms the value already held.
/// - The recorded source only ever moves upward.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tracked<T> {
    value: T,
    source: Option<ConfigurationSource>,
}

impl<T> Tracked<T> {
    /// Create an unconfigured value (no recorded source)
    #[inline]
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            value,
            source: None,
        }
    }

    /// Create a value already recorded at `source`
    #[inline]
    #[must_use]
    pub const fn with_source(value: T, source: ConfigurationSource) -> Self {
        Self {
            value,
            source: Some(source),
        }
    }

    /// Current value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Source that last set the value, if any
    #[inline]
    #[must_use]
    pub fn source(&self) -> Option<ConfigurationSource> {
        self.source
    }

    /// Whether any source has configured this value
    #[inline]
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.source.is_some()
    }

    /// Write unconditionally and ratchet the recorded source
    ///
    /// Callers are expected to have checked [`can_set`](Self::can_set).
    pub fn set(&mut self, value: T, source: ConfigurationSource) {
        self.value = value;
        self.source = Some(source.max(self.source));
    }
}

impl<T: PartialEq> Tracked<T> {
    /// Whether a write of `value` at `source` would be accepted
    #[inline]
    #[must_use]
    pub fn can_set(&self, value: &T, source: ConfigurationSource) -> bool {
        source.overrides(self.source) || self.value == *value
    }

    /// Write if [`can_set`](Self::can_set) allows it
    ///
    /// Returns `false` without mutating when the write is rejected.
    pub fn try_set(&mut self, value: T, source: ConfigurationSource) -> bool {
        if !self.can_set(&value, source) {
            return false;
        }

        self.set(value, source);
        true
    }
}
