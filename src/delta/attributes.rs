//! Attribute maps: merge rules used by compose, transform, invert and diff
//!
//! Attributes are a flat `key -> JSON value` map. A `null` value is a
//! first-class "remove this attribute" instruction and is distinct from the
//! key being absent. An empty map is always reported as `None`.

use serde_json::{Map, Value};

/// Flat formatting attributes attached to a run
pub type AttributeMap = Map<String, Value>;

fn non_empty(map: AttributeMap) -> Option<AttributeMap> {
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

/// Merge `b` on top of `a`.
///
/// Keys of `b` win. When `keep_null` is false, `null` values coming from `b`
/// are dropped (the destination is a fresh insert, so there is nothing left to
/// remove); when true they are kept (the destination is a retain).
pub fn compose(
    a: Option<&AttributeMap>,
    b: Option<&AttributeMap>,
    keep_null: bool,
) -> Option<AttributeMap> {
    let mut attributes: AttributeMap = match b {
        Some(b) if !keep_null => b
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        Some(b) => b.clone(),
        None => AttributeMap::new(),
    };

    if let Some(a) = a {
        for (key, value) in a {
            let overridden = b.is_some_and(|b| b.contains_key(key));
            if !overridden {
                attributes.insert(key.clone(), value.clone());
            }
        }
    }

    non_empty(attributes)
}

/// Rebase `b`'s attribute change over a concurrent change `a`.
///
/// Without priority the incoming change wins untouched. With priority, every
/// key `a` already set is stripped from `b`.
pub fn transform(
    a: Option<&AttributeMap>,
    b: Option<&AttributeMap>,
    priority: bool,
) -> Option<AttributeMap> {
    let Some(a) = a else {
        return b.cloned();
    };
    let b = b?;
    if !priority {
        return Some(b.clone());
    }

    let attributes = b
        .iter()
        .filter(|(key, _)| !a.contains_key(*key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    non_empty(attributes)
}

/// Attribute change that undoes `attr` when applied over `base`.
///
/// Keys `attr` does not touch are ignored; keys whose value `attr` leaves
/// equal are omitted.
pub fn invert(attr: Option<&AttributeMap>, base: Option<&AttributeMap>) -> Option<AttributeMap> {
    let empty = AttributeMap::new();
    let attr = attr.unwrap_or(&empty);
    let base = base.unwrap_or(&empty);

    let mut inverted: AttributeMap = base
        .iter()
        .filter(|(key, value)| attr.get(*key).is_some_and(|changed| changed != *value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    for key in attr.keys() {
        if !base.contains_key(key) {
            inverted.insert(key.clone(), Value::Null);
        }
    }

    non_empty(inverted)
}

/// Attribute change turning `a` into `b`; removed keys map to `null`.
pub fn diff(a: Option<&AttributeMap>, b: Option<&AttributeMap>) -> Option<AttributeMap> {
    let empty = AttributeMap::new();
    let a = a.unwrap_or(&empty);
    let b = b.unwrap_or(&empty);

    let mut attributes = AttributeMap::new();
    for key in a.keys().chain(b.keys()) {
        if attributes.contains_key(key) || a.get(key) == b.get(key) {
            continue;
        }
        let value = b.get(key).cloned().unwrap_or(Value::Null);
        attributes.insert(key.clone(), value);
    }

    non_empty(attributes)
}
