//! Annotation store
//!
//! Provides [`AnnotationStore`], an ordered key/value bag where every entry
//! carries the [`ConfigurationSource`] that wrote it. Metadata objects compose
//! a store and delegate to it rather than re-implementing the negotiation.

use crate::source::ConfigurationSource;
use serde_json::Value;
use std::collections::BTreeMap;

/// A single named annotation
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    name: String,
    value: Value,
    source: ConfigurationSource,
}

impl Annotation {
    /// Create annotation
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, value: Value, source: ConfigurationSource) -> Self {
        Self {
            name: name.into(),
            value,
            source,
        }
    }

    /// Annotation name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Annotation value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Source that last wrote the annotation
    #[inline]
    #[must_use]
    pub fn configuration_source(&self) -> ConfigurationSource {
        self.source
    }
}

/// Ordered annotation bag with per-key configuration sources
///
/// Keys iterate in lexical order so debug output is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationStore {
    entries: BTreeMap<String, Annotation>,
}

impl AnnotationStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an annotation by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Annotation> {
        self.entries.get(name)
    }

    /// Look up only the value
    #[inline]
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).map(Annotation::value)
    }

    /// Whether a write of `value` under `name` at `source` would be accepted
    #[must_use]
    pub fn can_set(&self, name: &str, value: &Value, source: ConfigurationSource) -> bool {
        match self.entries.get(name) {
            Some(existing) => source.overrides(Some(existing.source)) || existing.value == *value,
            None => true,
        }
    }

    /// Write an annotation if allowed, returning the stored entry
    ///
    /// Returns `None` without mutating when a stronger source already holds a
    /// different value.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: Value,
        source: ConfigurationSource,
    ) -> Option<&Annotation> {
        let name = name.into();
        if !self.can_set(&name, &value, source) {
            tracing::debug!(annotation = %name, %source, "annotation write rejected");
            return None;
        }

        let recorded = self.entries.get(&name).map(|a| a.source);
        let annotation = Annotation::new(name.clone(), value, source.max(recorded));
        self.entries.insert(name.clone(), annotation);
        self.entries.get(&name)
    }

    /// Whether `source` may remove the annotation under `name`
    ///
    /// Removing an absent annotation is always allowed.
    #[must_use]
    pub fn can_remove(&self, name: &str, source: ConfigurationSource) -> bool {
        self.entries
            .get(name)
            .map_or(true, |existing| source.overrides(Some(existing.source)))
    }

    /// Remove an annotation if allowed
    ///
    /// Returns the removed entry, or `None` when absent or when a stronger
    /// source owns it.
    pub fn remove(&mut self, name: &str, source: ConfigurationSource) -> Option<Annotation> {
        if !self.can_remove(name, source) {
            tracing::debug!(annotation = %name, %source, "annotation removal rejected");
            return None;
        }

        self.entries.remove(name)
    }

    /// Iterate annotations in name order
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.entries.values()
    }

    /// Number of annotations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the annotations block used by metadata debug strings
    ///
    /// Empty when the store has no entries; otherwise starts with a newline.
    #[must_use]
    pub fn to_debug_string(&self, indent: usize) -> String {
        if self.entries.is_empty() {
            return String::new();
        }

        let indent_string = " ".repeat(indent);
        let mut out = String::new();
        out.push('\n');
        out.push_str(&indent_string);
        out.push_str("Annotations:");
        for annotation in self.entries.values() {
            out.push('\n');
            out.push_str(&indent_string);
            out.push_str("  ");
            out.push_str(&annotation.name);
            out.push_str(": ");
            out.push_str(&render_value(&annotation.value));
        }
        out
    }
}

// Strings render bare; everything else as compact JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
