//! Flat UPI records

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::CONTEXT_KEY;

/// A UPI as a flat map of record field name to optional value
///
/// Decoded records also carry a context entry (serialized under
/// [`CONTEXT_KEY`]) naming the payload as a property resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpiRecord {
    #[serde(rename = "@reso.context", default, skip_serializing_if = "Option::is_none")]
    context: Option<String>,
    #[serde(flatten)]
    fields: BTreeMap<String, Option<String>>,
}

impl UpiRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, field: impl Into<String>, value: Option<&str>) -> Self {
        self.set(field, value.map(String::from));
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: Option<String>) {
        self.fields.insert(field.into(), value);
    }

    /// Value for a field; `None` when absent or null
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_deref())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> &BTreeMap<String, Option<String>> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The `@reso.context` value, if any
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn set_context(&mut self, context: impl Into<String>) {
        self.context = Some(context.into());
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.set_context(context);
        self
    }

    /// Drop the context entry, leaving only record fields
    pub fn without_context(mut self) -> Self {
        self.context = None;
        self
    }

    /// Render as the JSON payload collaborators consume
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        if let Some(context) = &self.context {
            map.insert(CONTEXT_KEY.to_string(), context.clone().into());
        }
        for (field, value) in &self.fields {
            let value = match value {
                Some(v) => serde_json::Value::String(v.clone()),
                None => serde_json::Value::Null,
            };
            map.insert(field.clone(), value);
        }
        serde_json::Value::Object(map)
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for UpiRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        Self {
            context: None,
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.map(Into::into)))
                .collect(),
        }
    }
}

/// Context value for a decoded property resource of the given version
pub fn property_context(version: &str) -> String {
    format!("urn:reso:metadata:{}:resource:property", version)
}
