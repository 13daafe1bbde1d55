//! Attribute and object metadata as reported by the engine.

use std::collections::BTreeMap;

use prodrisk_core::ProdriskResult;

use crate::engine::Engine;

/// Either one metadata entry or all entries known to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Info {
    Value(String),
    All(BTreeMap<String, String>),
}

impl Info {
    /// Look up one key; a single value answers any key.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            Info::Value(value) => Some(value),
            Info::All(entries) => entries.get(key).map(String::as_str),
        }
    }

    pub fn into_map(self) -> Option<BTreeMap<String, String>> {
        match self {
            Info::All(entries) => Some(entries),
            Info::Value(_) => None,
        }
    }
}

/// Metadata of an attribute of `object_type`.
///
/// With `key` set (and non-empty) only that entry is read; otherwise every
/// key in the engine's live list of attribute info keys is read.
pub fn get_attribute_info(
    engine: &dyn Engine,
    object_type: &str,
    attribute: &str,
    key: Option<&str>,
) -> ProdriskResult<Info> {
    match key.filter(|k| !k.is_empty()) {
        Some(key) => engine.attribute_info(object_type, attribute, key).map(Info::Value),
        None => engine
            .valid_attribute_info_keys()?
            .into_iter()
            .map(|key| {
                let value = engine.attribute_info(object_type, attribute, &key)?;
                Ok((key, value))
            })
            .collect::<ProdriskResult<_>>()
            .map(Info::All),
    }
}

/// Metadata of an object type, same contract as [`get_attribute_info`].
pub fn get_object_info(
    engine: &dyn Engine,
    object_type: &str,
    key: Option<&str>,
) -> ProdriskResult<Info> {
    match key.filter(|k| !k.is_empty()) {
        Some(key) => engine.object_info(object_type, key).map(Info::Value),
        None => engine
            .valid_object_info_keys()?
            .into_iter()
            .map(|key| {
                let value = engine.object_info(object_type, &key)?;
                Ok((key, value))
            })
            .collect::<ProdriskResult<_>>()
            .map(Info::All),
    }
}
