//! Content type schema, saved values and the save event that carries them.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::SizeSpec;

/// Field type that carries an image and may declare a cache directive.
pub const IMAGE_FIELD_TYPE: &str = "image";

/// Cache directive declared on an image field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Alias names to warm.
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Literal sizes to warm.
    #[serde(default)]
    pub sizes: Vec<SizeSpec>,
}

impl CacheConfig {
    /// Returns true if the directive names no alias and no size.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty() && self.sizes.is_empty()
    }
}

/// Definition of a single field in a content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field type name (e.g. "text", "image").
    #[serde(rename = "type")]
    pub field_type: String,

    /// Optional cache directive.
    #[serde(default)]
    pub cache: Option<CacheConfig>,
}

impl FieldDefinition {
    /// Create a field definition without a cache directive.
    pub fn new(field_type: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            cache: None,
        }
    }

    /// Builder method to attach a cache directive.
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Returns the cache directive if this is an image field with a
    /// non-empty one.
    pub fn image_cache(&self) -> Option<&CacheConfig> {
        if self.field_type != IMAGE_FIELD_TYPE {
            return None;
        }
        self.cache.as_ref().filter(|cache| !cache.is_empty())
    }
}

/// Schema of one content type: its fields in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContentTypeSchema {
    #[serde(default, deserialize_with = "ordered_fields")]
    fields: Vec<(String, FieldDefinition)>,
}

impl ContentTypeSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to append a field.
    pub fn with_field(mut self, key: impl Into<String>, definition: FieldDefinition) -> Self {
        self.fields.push((key.into(), definition));
        self
    }

    /// Iterate fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDefinition)> {
        self.fields.iter().map(|(key, def)| (key.as_str(), def))
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field is declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// JSON objects are unordered in serde's data model, so walk the map by hand
// to keep declaration order.
fn ordered_fields<'de, D>(deserializer: D) -> Result<Vec<(String, FieldDefinition)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct FieldsVisitor;

    impl<'de> Visitor<'de> for FieldsVisitor {
        type Value = Vec<(String, FieldDefinition)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of field key to field definition")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, definition)) = map.next_entry::<String, FieldDefinition>()? {
                fields.push((key, definition));
            }
            Ok(fields)
        }
    }

    deserializer.deserialize_map(FieldsVisitor)
}

/// Saved field values of one content record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedValues(HashMap<String, Value>);

impl SavedValues {
    /// Create an empty value set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set a raw value.
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Builder method to set an image value pointing at `file`.
    pub fn with_image(self, key: impl Into<String>, file: impl Into<String>) -> Self {
        let file: String = file.into();
        self.with_value(key, serde_json::json!({ "file": file }))
    }

    /// Get the raw value for a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get the image file path stored for a field.
    ///
    /// Accepts either an object with a `file` member or a bare string.
    /// Missing, null and empty paths all yield `None`.
    pub fn image_file(&self, key: &str) -> Option<&str> {
        let file = match self.0.get(key)? {
            Value::Object(obj) => obj.get("file")?.as_str()?,
            Value::String(path) => path.as_str(),
            _ => return None,
        };
        let file = file.trim();
        (!file.is_empty()).then_some(file)
    }
}

impl From<HashMap<String, Value>> for SavedValues {
    fn from(values: HashMap<String, Value>) -> Self {
        Self(values)
    }
}

/// Notification that a content record was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveEvent {
    /// Name of the record's content type.
    pub content_type: String,

    /// Saved field values.
    pub values: SavedValues,
}

impl SaveEvent {
    /// Create a new SaveEvent.
    pub fn new(content_type: impl Into<String>, values: SavedValues) -> Self {
        Self {
            content_type: content_type.into(),
            values,
        }
    }
}

/// Read-only lookup of content type schemas, owned by the host.
pub trait SchemaSource: Send + Sync {
    /// Get the schema of a content type.
    fn schema(&self, content_type: &str) -> Option<ContentTypeSchema>;
}

impl SchemaSource for HashMap<String, ContentTypeSchema> {
    fn schema(&self, content_type: &str) -> Option<ContentTypeSchema> {
        self.get(content_type).cloned()
    }
}
