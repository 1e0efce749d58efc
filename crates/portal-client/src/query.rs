//! Query-string building for resource filters.
//!
//! Any value that serializes to a map can be used as a filter. Entries are
//! emitted in serialization order (struct field order, or insertion order
//! for [`Filters`]). `null` and empty-string values are dropped, arrays
//! become repeated keys, and nested objects are rejected.
//!
//! Keys and values are percent-encoded like `encodeURIComponent`: a space
//! is sent as `%20`, never `+`.

use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Build `?k=v&...` from a filter value; empty string when nothing remains.
///
/// ```rust
/// use portal_client::query::build_query;
/// use serde_json::json;
///
/// let query = build_query(&json!({"a": 1, "b": [2, 3], "c": "", "d": null})).unwrap();
/// assert_eq!(query, "?a=1&b=2&b=3");
/// ```
pub fn build_query<F: Serialize + ?Sized>(filters: &F) -> ApiResult<String> {
    let raw = serde_json::to_string(filters)
        .map_err(|e| ApiError::InvalidRequest(format!("filters are not serializable: {}", e)))?;
    let entries: OrderedEntries = serde_json::from_str(&raw)
        .map_err(|e| ApiError::InvalidRequest(format!("filters must be a map: {}", e)))?;

    let mut pairs = Vec::with_capacity(entries.0.len());
    for (key, value) in &entries.0 {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(rendered) = render_scalar(key, item)? {
                        pairs.push((key.as_str(), rendered));
                    }
                }
            }
            other => {
                if let Some(rendered) = render_scalar(key, other)? {
                    pairs.push((key.as_str(), rendered));
                }
            }
        }
    }

    Ok(query_string(pairs.iter().map(|(k, v)| (*k, v.as_str()))))
}

/// Join already-filtered pairs into `?k=v&...`; empty string for no pairs.
///
/// Unlike [`build_query`], empty values are kept (`term=`).
pub fn query_string<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let joined = pairs
        .into_iter()
        .map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
        .collect::<Vec<_>>()
        .join("&");

    if joined.is_empty() {
        String::new()
    } else {
        format!("?{}", joined)
    }
}

/// Percent-encode one query component.
///
/// ```rust
/// use portal_client::query::encode_component;
///
/// assert_eq!(encode_component("a b+c&d"), "a%20b%2Bc%26d");
/// ```
pub fn encode_component(value: &str) -> String {
    // `+` in the input is already escaped as %2B, so every `+` left is a space.
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn render_scalar(key: &str, value: &Value) -> ApiResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Array(_) | Value::Object(_) => Err(ApiError::InvalidRequest(format!(
            "filter '{}' must be a scalar or a list of scalars",
            key
        ))),
    }
}

/// Top-level entries of a serialized filter, in the order they were written.
struct OrderedEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of filter values")
            }

            // `None` filters
            fn visit_unit<E>(self) -> Result<OrderedEntries, E> {
                Ok(OrderedEntries(Vec::new()))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<OrderedEntries, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    entries.push((key, value));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_any(EntriesVisitor)
    }
}

/// Ad-hoc filter map that keeps insertion order.
///
/// Re-inserting a key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    entries: Vec<(String, Value)>,
}

impl Filters {
    /// Empty filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Filters::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `pageNumber` and `pageSize`.
    pub fn page(self, page_number: u32, page_size: u32) -> Self {
        self.with("pageNumber", page_number).with("pageSize", page_size)
    }

    /// Set or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Value for `key`, if set.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Number of entries, including ones that will be dropped as empty.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Filters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
