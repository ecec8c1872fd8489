//! Per-node metadata authored in the asset (`prop.*` extras).
//!
//! Values are a closed set of variants. Typed reads go through
//! [`Properties::get`], which reports a mismatched variant as
//! [`GaleError::PropertyType`] instead of panicking.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::errors::{GaleError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    String(String),
}

impl PropertyValue {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Int(_) => "int",
            PropertyValue::Float(_) => "float",
            PropertyValue::String(_) => "string",
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        PropertyValue::Int(i64::from(v))
    }
}

impl From<f32> for PropertyValue {
    fn from(v: f32) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::String(v)
    }
}

/// Conversion from a stored [`PropertyValue`] into a concrete type.
pub trait FromProperty: Sized {
    const TYPE_NAME: &'static str;

    fn from_property(value: &PropertyValue) -> Option<Self>;
}

impl FromProperty for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromProperty for i64 {
    const TYPE_NAME: &'static str = "int";

    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromProperty for i32 {
    const TYPE_NAME: &'static str = "int";

    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Int(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }
}

// Blender exports whole-numbered floats as integers.
impl FromProperty for f32 {
    const TYPE_NAME: &'static str = "float";

    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }
}

impl FromProperty for String {
    const TYPE_NAME: &'static str = "string";

    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}

/// Read-only string-keyed property bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    values: FxHashMap<String, PropertyValue>,
}

impl Properties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.values.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(key)
    }

    /// Reads `key` as `T`. Missing keys and mismatched variants are errors.
    pub fn get<T: FromProperty>(&self, key: &str) -> Result<T> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| GaleError::PropertyMissing {
                key: key.to_owned(),
            })?;
        Self::convert(key, value)
    }

    /// Reads `key` as `T`, falling back to `default` when it is missing.
    /// A present value of the wrong variant is still an error.
    pub fn get_or<T: FromProperty>(&self, key: &str, default: T) -> Result<T> {
        match self.values.get(key) {
            Some(value) => Self::convert(key, value),
            None => Ok(default),
        }
    }

    fn convert<T: FromProperty>(key: &str, value: &PropertyValue) -> Result<T> {
        T::from_property(value).ok_or_else(|| GaleError::PropertyType {
            key: key.to_owned(),
            expected: T::TYPE_NAME,
            found: value.type_name(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Properties::new();
        for (k, v) in iter {
            props.insert(k, v);
        }
        props
    }
}
