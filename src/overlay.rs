//! Lazily localized data trees.
//!
//! Game data marks localizable strings with [`MARKER_PREFIX`]. [`overlay`]
//! walks a freshly parsed document once and turns each marked string into a
//! [`TranslatableField`]. Fields hold only the original text; the translation
//! is looked up every time the field is read, so switching the active locale
//! changes what already-loaded data reads as without walking it again.

use std::collections::{
    BTreeMap,
    BTreeSet,
};

use serde_json::Value;

use crate::service::LocalizationService;

/// Prefix that marks a data string as localizable.
pub const MARKER_PREFIX: &str = "__ ";

/// A localizable string.
///
/// Reading yields, in order: the override if one was written, the active
/// locale's translation of `key` if its bundle has one, or `key` itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatableField {
    /// Original text with the marker stripped
    key: String,
    /// Value written by game logic, shadowing any translation
    override_value: Option<Value>,
}

impl TranslatableField {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), override_value: None }
    }

    /// Original (untranslated) text.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn override_value(&self) -> Option<&Value> {
        self.override_value.as_ref()
    }

    /// Store a value that is returned instead of any translation.
    pub fn set_override(&mut self, value: impl Into<Value>) {
        self.override_value = Some(value.into());
    }

    /// Remove the override so reads translate again.
    pub fn clear_override(&mut self) -> Option<Value> {
        self.override_value.take()
    }

    /// Current value of the field.
    #[must_use]
    pub fn resolve(&self, service: &LocalizationService) -> Value {
        self.override_value
            .clone()
            .unwrap_or_else(|| Value::String(service.translate(&self.key)))
    }

    /// Current text of the field, or `None` if the override is not a string.
    #[must_use]
    pub fn text(&self, service: &LocalizationService) -> Option<String> {
        match &self.override_value {
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => None,
            None => Some(service.translate(&self.key)),
        }
    }
}

/// A node of an overlaid data tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayNode {
    /// Value kept as parsed. Never an array or object.
    Literal(Value),
    /// Marked string, resolved on read
    Translatable(TranslatableField),
    Array(Vec<OverlayNode>),
    Object(BTreeMap<String, OverlayNode>),
}

/// Build an overlaid tree from a parsed document.
///
/// Every string property starting with [`MARKER_PREFIX`], at any depth, becomes
/// a [`TranslatableField`]. Array elements count as properties. A document
/// that is itself a scalar is returned as a literal, marked or not.
///
/// # Examples
/// ```
/// use game_i18n_overlay::overlay::overlay;
/// use serde_json::json;
///
/// let node = overlay(json!({"name": "__ Potion", "price": 50}));
///
/// let name = node.get("name").and_then(|n| n.as_translatable());
/// assert_eq!(name.map(|f| f.key()), Some("Potion"));
/// ```
#[must_use]
pub fn overlay(root: Value) -> OverlayNode {
    match root {
        Value::Object(_) | Value::Array(_) => overlay_property(root),
        scalar => OverlayNode::Literal(scalar),
    }
}

/// Convert one property value, recursing into containers.
fn overlay_property(value: Value) -> OverlayNode {
    match value {
        Value::String(s) => match s.strip_prefix(MARKER_PREFIX) {
            Some(key) => OverlayNode::Translatable(TranslatableField::new(key)),
            None => OverlayNode::Literal(Value::String(s)),
        },
        Value::Array(items) => {
            OverlayNode::Array(items.into_iter().map(overlay_property).collect())
        }
        Value::Object(map) => OverlayNode::Object(
            map.into_iter().map(|(key, value)| (key, overlay_property(value))).collect(),
        ),
        scalar => OverlayNode::Literal(scalar),
    }
}

impl OverlayNode {
    /// Child of an object node.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Object(map) => map.get(key),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Self> {
        match self {
            Self::Object(map) => map.get_mut(key),
            _ => None,
        }
    }

    /// Look up a node by JSON Pointer (RFC 6901), e.g. `/actors/1/name`.
    #[must_use]
    pub fn pointer(&self, pointer: &str) -> Option<&Self> {
        if pointer.is_empty() {
            return Some(self);
        }
        let tokens = pointer.strip_prefix('/')?;
        tokens.split('/').map(unescape_token).try_fold(self, |node, token| match node {
            Self::Object(map) => map.get(&token),
            Self::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
            Self::Literal(_) | Self::Translatable(_) => None,
        })
    }

    /// Mutable variant of [`OverlayNode::pointer`].
    #[must_use]
    pub fn pointer_mut(&mut self, pointer: &str) -> Option<&mut Self> {
        if pointer.is_empty() {
            return Some(self);
        }
        let tokens = pointer.strip_prefix('/')?;
        tokens.split('/').map(unescape_token).try_fold(self, |node, token| match node {
            Self::Object(map) => map.get_mut(&token),
            Self::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
            Self::Literal(_) | Self::Translatable(_) => None,
        })
    }

    #[must_use]
    pub const fn as_translatable(&self) -> Option<&TranslatableField> {
        match self {
            Self::Translatable(field) => Some(field),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_translatable(&self) -> bool {
        matches!(self, Self::Translatable(_))
    }

    /// Text of a string or translatable node as currently read.
    #[must_use]
    pub fn text(&self, service: &LocalizationService) -> Option<String> {
        match self {
            Self::Literal(Value::String(s)) => Some(s.clone()),
            Self::Translatable(field) => field.text(service),
            _ => None,
        }
    }

    /// Materialize the tree as plain JSON, resolving every field.
    #[must_use]
    pub fn resolve(&self, service: &LocalizationService) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Translatable(field) => field.resolve(service),
            Self::Array(items) => Value::Array(items.iter().map(|n| n.resolve(service)).collect()),
            Self::Object(map) => Value::Object(
                map.iter().map(|(key, node)| (key.clone(), node.resolve(service))).collect(),
            ),
        }
    }

    /// Write `value` into this node.
    ///
    /// A translatable node keeps its key and stores `value` as its override.
    /// Any other node is replaced by a literal.
    pub fn assign(&mut self, value: impl Into<Value>) {
        match self {
            Self::Translatable(field) => field.set_override(value),
            other => *other = overlay_literal(value.into()),
        }
    }

    /// Original texts of every translatable field in the tree.
    #[must_use]
    pub fn translatable_keys(&self) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();
        self.collect_keys(&mut keys);
        keys
    }

    /// Number of translatable fields in the tree.
    #[must_use]
    pub fn translatable_count(&self) -> usize {
        match self {
            Self::Literal(_) => 0,
            Self::Translatable(_) => 1,
            Self::Array(items) => items.iter().map(Self::translatable_count).sum(),
            Self::Object(map) => map.values().map(Self::translatable_count).sum(),
        }
    }

    /// Depth-first key collection.
    fn collect_keys(&self, keys: &mut BTreeSet<String>) {
        match self {
            Self::Literal(_) => {}
            Self::Translatable(field) => {
                keys.insert(field.key.clone());
            }
            Self::Array(items) => items.iter().for_each(|n| n.collect_keys(keys)),
            Self::Object(map) => map.values().for_each(|n| n.collect_keys(keys)),
        }
    }
}

/// Convert an assigned value without marker processing.
fn overlay_literal(value: Value) -> OverlayNode {
    match value {
        Value::Array(items) => OverlayNode::Array(items.into_iter().map(overlay_literal).collect()),
        Value::Object(map) => OverlayNode::Object(
            map.into_iter().map(|(key, value)| (key, overlay_literal(value))).collect(),
        ),
        scalar => OverlayNode::Literal(scalar),
    }
}

/// Decode `~1` and `~0` escapes in a pointer token.
fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}
