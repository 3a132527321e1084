//! Multi-writer class/style composition.
//!
//! Several independent bindings may write to one element's `class` or
//! `style` - a static base list from [`crate::update::ElementUpdate`] plus
//! any number of signal-driven writers. Each writer's contribution is keyed
//! by its [`OwnerId`] in an explicit ordered map, and the element's
//! effective value is recomputed by a pure fold over all entries, in owner
//! insertion order, whenever any single owner's entry changes. Writers never
//! clobber each other.
//!
//! Composition rules:
//! - String entries concatenate in owner order.
//! - Object entries shallow-merge across owners; a later owner overrides an
//!   earlier owner's value for the same property/name.
//! - A `false` value in a class toggle map means "class name absent".
//!
//! The layer maps live on the element (see [`crate::dom::Node`]); this
//! module owns the tokens, the specs, and the fold.

// =============================================================================
// Owner tokens
// =============================================================================

/// Identity of one contributing writer.
///
/// [`OwnerId::BASE`] is the element's own entry, used by
/// [`crate::update::update_element`]. Every [`crate::refs::ElementRef`]
/// carries its own runtime-issued token, so ref writers and the base entry
/// compose instead of overwriting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerId(u64);

impl OwnerId {
    /// The element's own base entry.
    pub const BASE: OwnerId = OwnerId(0);

    pub(crate) fn new(raw: u64) -> Self {
        OwnerId(raw)
    }
}

// =============================================================================
// Specs
// =============================================================================

/// One owner's class contribution.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassSpec {
    /// Literal class list, e.g. `"card card--wide"`.
    Names(String),
    /// Conditional class map: names with `false` are absent.
    Toggles(Vec<(String, bool)>),
}

impl From<&str> for ClassSpec {
    fn from(names: &str) -> Self {
        ClassSpec::Names(names.to_string())
    }
}

impl From<String> for ClassSpec {
    fn from(names: String) -> Self {
        ClassSpec::Names(names)
    }
}

/// One owner's style contribution.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleSpec {
    /// Raw css text, e.g. `"color: red; margin: 0"`.
    Css(String),
    /// Property map, shallow-merged across owners.
    Props(Vec<(String, String)>),
}

impl From<&str> for StyleSpec {
    fn from(css: &str) -> Self {
        StyleSpec::Css(css.to_string())
    }
}

impl From<String> for StyleSpec {
    fn from(css: String) -> Self {
        StyleSpec::Css(css)
    }
}

// =============================================================================
// Layer maps
// =============================================================================

/// Ordered owner → [`ClassSpec`] map.
#[derive(Default, Clone)]
pub(crate) struct ClassLayers {
    entries: Vec<(OwnerId, ClassSpec)>,
}

impl ClassLayers {
    /// Replace `owner`'s entry in place, or append a new one.
    pub(crate) fn set(&mut self, owner: OwnerId, spec: ClassSpec) {
        match self.entries.iter_mut().find(|(id, _)| *id == owner) {
            Some(entry) => entry.1 = spec,
            None => self.entries.push((owner, spec)),
        }
    }

    pub(crate) fn remove(&mut self, owner: OwnerId) {
        self.entries.retain(|(id, _)| *id != owner);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fold all entries into the effective `class` value.
    pub(crate) fn compose(&self) -> String {
        let mut names: Vec<&str> = Vec::new();
        for (_, spec) in &self.entries {
            match spec {
                ClassSpec::Names(list) => names.extend(list.split_whitespace()),
                ClassSpec::Toggles(toggles) => {
                    names.extend(
                        toggles
                            .iter()
                            .filter(|(_, on)| *on)
                            .map(|(name, _)| name.as_str()),
                    );
                }
            }
        }
        names.join(" ")
    }
}

/// Ordered owner → [`StyleSpec`] map.
#[derive(Default, Clone)]
pub(crate) struct StyleLayers {
    entries: Vec<(OwnerId, StyleSpec)>,
}

impl StyleLayers {
    pub(crate) fn set(&mut self, owner: OwnerId, spec: StyleSpec) {
        match self.entries.iter_mut().find(|(id, _)| *id == owner) {
            Some(entry) => entry.1 = spec,
            None => self.entries.push((owner, spec)),
        }
    }

    pub(crate) fn remove(&mut self, owner: OwnerId) {
        self.entries.retain(|(id, _)| *id != owner);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fold all entries into the effective `style` css text: css strings
    /// concatenated in owner order, then merged properties with later owners
    /// overriding the same property name.
    pub(crate) fn compose(&self) -> String {
        let mut css_parts: Vec<String> = Vec::new();
        let mut merged: Vec<(String, String)> = Vec::new();

        for (_, spec) in &self.entries {
            match spec {
                StyleSpec::Css(css) => {
                    let trimmed = css.trim().trim_end_matches(';').to_string();
                    if !trimmed.is_empty() {
                        css_parts.push(trimmed);
                    }
                }
                StyleSpec::Props(props) => {
                    for (name, value) in props {
                        match merged.iter_mut().find(|(n, _)| n == name) {
                            Some(entry) => entry.1 = value.clone(),
                            None => merged.push((name.clone(), value.clone())),
                        }
                    }
                }
            }
        }

        for (name, value) in merged {
            css_parts.push(format!("{name}: {value}"));
        }
        css_parts.join("; ")
    }
}

// =============================================================================
// Tests
// =============================================================================
