//! Query Types
//!
//! Request options shared by entity reads, query and search, plus the
//! response envelopes Bullhorn wraps results in.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Optional request parameters (`fields`, `sort`, `count`, ...).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryOptions {
    pub fields: Option<String>,
    pub sort: Option<String>,
    pub order_by: Option<String>,
    pub count: Option<u32>,
    pub start: Option<u32>,
    pub meta: Option<String>,
    /// Parameters without a dedicated field, sent as-is.
    pub extra: BTreeMap<String, String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Comma-separated list of fields to return.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = fields
            .into_iter()
            .map(|f| f.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.fields = Some(joined);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn start(mut self, start: u32) -> Self {
        self.start = Some(start);
        self
    }

    pub fn meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Options as a JSON object, numbers kept numeric.
    pub fn to_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if let Some(fields) = &self.fields {
            map.insert("fields".to_string(), Value::from(fields.clone()));
        }
        if let Some(sort) = &self.sort {
            map.insert("sort".to_string(), Value::from(sort.clone()));
        }
        if let Some(order_by) = &self.order_by {
            map.insert("orderBy".to_string(), Value::from(order_by.clone()));
        }
        if let Some(count) = self.count {
            map.insert("count".to_string(), Value::from(count));
        }
        if let Some(start) = self.start {
            map.insert("start".to_string(), Value::from(start));
        }
        if let Some(meta) = &self.meta {
            map.insert("meta".to_string(), Value::from(meta.clone()));
        }
        for (key, value) in &self.extra {
            map.insert(key.clone(), Value::from(value.clone()));
        }
        map
    }

    /// Options as query-string pairs.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.to_json()
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(s) => (key, s),
                other => (key, other.to_string()),
            })
            .collect()
    }
}

/// Single-entity read envelope: `{"data": {...}}`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EntityResponse<T = Value> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// One page of a query or search.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct QueryPage<T = Value> {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub count: u64,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Result of create, update, delete, relate and unrelate calls.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeResponse {
    #[serde(default)]
    pub changed_entity_type: Option<String>,
    #[serde(default)]
    pub changed_entity_id: Option<i64>,
    #[serde(default)]
    pub change_type: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}
