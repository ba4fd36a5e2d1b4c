//! Field scanning: find the image fields of a saved record that declare a
//! cache directive.

use crate::{ContentTypeSchema, SavedValues, SizeSpec, SourceMissingError};

/// An image field of a saved record whose thumbnails should be warmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheableImageField {
    pub field_key: String,
    pub source_file: String,
    pub alias_names: Vec<String>,
    pub size_specs: Vec<SizeSpec>,
}

/// Scan a saved record for cacheable image fields, in schema order.
///
/// Fails with [`SourceMissingError`] as soon as an image field with a
/// non-empty cache directive has no saved file.
pub fn scan(
    schema: &ContentTypeSchema,
    values: &SavedValues,
) -> Result<Vec<CacheableImageField>, SourceMissingError> {
    let mut fields = Vec::new();

    for (key, definition) in schema.fields() {
        let Some(cache) = definition.image_cache() else {
            continue;
        };

        let source_file = values
            .image_file(key)
            .ok_or_else(|| SourceMissingError {
                field: key.to_string(),
            })?;

        fields.push(CacheableImageField {
            field_key: key.to_string(),
            source_file: source_file.to_string(),
            alias_names: cache.aliases.clone(),
            size_specs: cache.sizes.clone(),
        });
    }

    Ok(fields)
}
