//! Static host capabilities loaded from a JSON site document.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thumbwarm_core::{AliasDefinition, AliasRegistry, ContentTypeSchema, CropMode, SchemaSource};
use tracing::debug;

use crate::error::HostError;

/// Alias entry as written in the site document: `{"size": [w, h],
/// "cropping": "fit"}`.
#[derive(Debug, Clone, Deserialize)]
struct AliasEntry {
    size: [u32; 2],
    #[serde(default)]
    cropping: CropMode,
}

/// Content type schemas and thumbnail aliases held in memory.
///
/// Implements both host capabilities the engine needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticHost {
    #[serde(default)]
    contenttypes: HashMap<String, ContentTypeSchema>,
    #[serde(default)]
    aliases: HashMap<String, AliasEntry>,
}

impl StaticHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a site document.
    pub fn from_json_str(json: &str) -> Result<Self, HostError> {
        let host: Self = serde_json::from_str(json)?;
        debug!(
            content_types = host.contenttypes.len(),
            aliases = host.aliases.len(),
            "Loaded site document"
        );
        Ok(host)
    }

    /// Read and parse a site document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Builder method to register a content type schema.
    pub fn with_content_type(mut self, name: impl Into<String>, schema: ContentTypeSchema) -> Self {
        self.contenttypes.insert(name.into(), schema);
        self
    }

    /// Builder method to register an alias.
    pub fn with_alias(mut self, alias: AliasDefinition) -> Self {
        self.aliases.insert(
            alias.name,
            AliasEntry {
                size: [alias.width, alias.height],
                cropping: alias.crop_mode,
            },
        );
        self
    }

    /// Names of all known content types.
    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.contenttypes.keys().map(String::as_str)
    }
}

impl SchemaSource for StaticHost {
    fn schema(&self, content_type: &str) -> Option<ContentTypeSchema> {
        self.contenttypes.get(content_type).cloned()
    }
}

impl AliasRegistry for StaticHost {
    fn alias(&self, name: &str) -> Option<AliasDefinition> {
        self.aliases.get(name).map(|entry| {
            AliasDefinition::new(name, entry.size[0], entry.size[1], entry.cropping)
        })
    }
}
