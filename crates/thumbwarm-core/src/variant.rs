//! Variant types: literal size specs, identities and the requests built
//! from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CropMode};

/// A literal, unnamed thumbnail size from a field's cache directive.
///
/// Deserializes from either `{"width": 200, "height": 100, "crop": "c"}` or
/// the compact `"200x100c"` form used in thumbnail paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SizeSpecRepr")]
pub struct SizeSpec {
    pub width: u32,
    pub height: u32,
    #[serde(rename = "crop", skip_serializing_if = "Option::is_none")]
    pub crop_code: Option<char>,
}

impl SizeSpec {
    /// Create a new SizeSpec.
    pub fn new(width: u32, height: u32, crop_code: Option<char>) -> Self {
        Self {
            width,
            height,
            crop_code,
        }
    }

    /// Crop mode this spec resolves to.
    pub fn crop_mode(&self) -> CropMode {
        CropMode::from_code_or_default(self.crop_code)
    }
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)?;
        if let Some(code) = self.crop_code {
            write!(f, "{}", code)?;
        }
        Ok(())
    }
}

impl FromStr for SizeSpec {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidSizeSpec(s.to_string());

        let (width, rest) = s.trim().split_once('x').ok_or_else(invalid)?;
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (height, suffix) = rest.split_at(digits_end);

        let mut suffix_chars = suffix.chars();
        let crop_code = suffix_chars.next();
        if suffix_chars.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            width: width.parse().map_err(|_| invalid())?,
            height: height.parse().map_err(|_| invalid())?,
            crop_code,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeSpecRepr {
    Compact(String),
    Full {
        width: u32,
        height: u32,
        #[serde(default)]
        crop: Option<char>,
    },
}

impl TryFrom<SizeSpecRepr> for SizeSpec {
    type Error = CoreError;

    fn try_from(repr: SizeSpecRepr) -> Result<Self, Self::Error> {
        match repr {
            SizeSpecRepr::Compact(s) => s.parse(),
            SizeSpecRepr::Full {
                width,
                height,
                crop,
            } => Ok(Self::new(width, height, crop)),
        }
    }
}

/// Normalized key of a variant: two requests with equal identities produce
/// the same thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantIdentity {
    pub source_file: String,
    pub width: u32,
    pub height: u32,
    pub crop_mode: CropMode,
}

impl VariantIdentity {
    /// Size and crop segment of the thumbnail path, e.g. `200x100c`.
    pub fn size_segment(&self) -> String {
        format!("{}x{}{}", self.width, self.height, self.crop_mode.code())
    }

    /// Non-empty `/`-separated segments of the source file path.
    pub fn source_segments(&self) -> impl Iterator<Item = &str> {
        self.source_file.split('/').filter(|segment| !segment.is_empty())
    }

    /// Thumbnail path relative to the thumbnail route, e.g.
    /// `200x100c/2024-05/photo.jpg`. Not percent-encoded.
    pub fn thumb_path(&self) -> String {
        format!(
            "{}/{}",
            self.size_segment(),
            self.source_file.trim_start_matches('/')
        )
    }
}

impl fmt::Display for VariantIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.thumb_path())
    }
}

/// Which cache directive entry produced a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantEntry {
    Alias(String),
    Size(SizeSpec),
}

impl fmt::Display for VariantEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alias(name) => write!(f, "alias '{}'", name),
            Self::Size(spec) => write!(f, "size {}", spec),
        }
    }
}

/// Field and entry a variant (or a configuration error) came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantOrigin {
    pub field: String,
    pub entry: VariantEntry,
}

impl VariantOrigin {
    /// Origin for an alias entry.
    pub fn alias(field: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            entry: VariantEntry::Alias(name.into()),
        }
    }

    /// Origin for a literal size entry.
    pub fn size(field: impl Into<String>, spec: SizeSpec) -> Self {
        Self {
            field: field.into(),
            entry: VariantEntry::Size(spec),
        }
    }
}

impl fmt::Display for VariantOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.entry)
    }
}

/// One concrete thumbnail to warm, with resolved dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRequest {
    identity: VariantIdentity,
    origin: VariantOrigin,
}

impl VariantRequest {
    /// Create a new request. Dimensions must already be density-adjusted.
    pub fn new(
        source_file: impl Into<String>,
        width: u32,
        height: u32,
        crop_mode: CropMode,
        origin: VariantOrigin,
    ) -> Result<Self, CoreError> {
        let source_file = source_file.into();
        if source_file.is_empty() {
            return Err(CoreError::EmptySourceFile);
        }

        Ok(Self {
            identity: VariantIdentity {
                source_file,
                width,
                height,
                crop_mode,
            },
            origin,
        })
    }

    /// Deduplication and addressing key.
    pub fn identity(&self) -> &VariantIdentity {
        &self.identity
    }

    /// Where this request came from.
    pub fn origin(&self) -> &VariantOrigin {
        &self.origin
    }

    pub fn source_file(&self) -> &str {
        &self.identity.source_file
    }

    pub fn width(&self) -> u32 {
        self.identity.width
    }

    pub fn height(&self) -> u32 {
        self.identity.height
    }

    pub fn crop_mode(&self) -> CropMode {
        self.identity.crop_mode
    }
}
