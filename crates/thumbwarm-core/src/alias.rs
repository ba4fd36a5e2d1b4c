//! Alias definitions and the registry they are looked up in.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// How the backend fits a source image into the requested box.
///
/// Deserializes through [`FromStr`], so alias documents may use full names
/// in any case or the one-letter codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum CropMode {
    #[default]
    Crop,
    Resize,
    Border,
    Fit,
}

impl CropMode {
    /// Resolve a one-letter crop code (`c`, `r`, `b`, `f`).
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'c' => Some(Self::Crop),
            'r' => Some(Self::Resize),
            'b' => Some(Self::Border),
            'f' => Some(Self::Fit),
            _ => None,
        }
    }

    /// Resolve an optional crop code, falling back to [`CropMode::Crop`] when
    /// the code is absent or unrecognized.
    pub fn from_code_or_default(code: Option<char>) -> Self {
        code.and_then(Self::from_code).unwrap_or_default()
    }

    /// The one-letter code used in thumbnail paths.
    pub fn code(&self) -> char {
        match self {
            Self::Crop => 'c',
            Self::Resize => 'r',
            Self::Border => 'b',
            Self::Fit => 'f',
        }
    }
}

impl fmt::Display for CropMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Crop => "crop",
            Self::Resize => "resize",
            Self::Border => "border",
            Self::Fit => "fit",
        };
        f.write_str(name)
    }
}

impl FromStr for CropMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crop" | "c" => Ok(Self::Crop),
            "resize" | "r" => Ok(Self::Resize),
            "border" | "borders" | "b" => Ok(Self::Border),
            "fit" | "f" => Ok(Self::Fit),
            other => Err(CoreError::InvalidCropMode(other.to_string())),
        }
    }
}

impl TryFrom<String> for CropMode {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A named, pre-configured thumbnail shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasDefinition {
    /// Alias name as referenced from field cache config.
    pub name: String,

    /// Target width in pixels.
    pub width: u32,

    /// Target height in pixels.
    pub height: u32,

    /// Crop mode applied by the backend.
    #[serde(default)]
    pub crop_mode: CropMode,
}

impl AliasDefinition {
    /// Create a new AliasDefinition.
    pub fn new(name: impl Into<String>, width: u32, height: u32, crop_mode: CropMode) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            crop_mode,
        }
    }
}

/// Read-only lookup of alias definitions, owned by the host.
pub trait AliasRegistry: Send + Sync {
    /// Look up an alias by name.
    fn alias(&self, name: &str) -> Option<AliasDefinition>;
}

impl AliasRegistry for HashMap<String, AliasDefinition> {
    fn alias(&self, name: &str) -> Option<AliasDefinition> {
        self.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_code_mapping() {
        assert_eq!(CropMode::from_code('c'), Some(CropMode::Crop));
        assert_eq!(CropMode::from_code('r'), Some(CropMode::Resize));
        assert_eq!(CropMode::from_code('b'), Some(CropMode::Border));
        assert_eq!(CropMode::from_code('f'), Some(CropMode::Fit));
        assert_eq!(CropMode::from_code('x'), None);
    }

    #[test]
    fn test_crop_code_defaults_to_crop() {
        assert_eq!(CropMode::from_code_or_default(None), CropMode::Crop);
        assert_eq!(CropMode::from_code_or_default(Some('z')), CropMode::Crop);
        assert_eq!(CropMode::from_code_or_default(Some('f')), CropMode::Fit);
    }

    #[test]
    fn test_crop_mode_from_str() {
        assert_eq!("Resize".parse::<CropMode>().unwrap(), CropMode::Resize);
        assert_eq!("b".parse::<CropMode>().unwrap(), CropMode::Border);
        assert!(matches!(
            "stretch".parse::<CropMode>(),
            Err(CoreError::InvalidCropMode(_))
        ));
    }

    #[test]
    fn test_crop_mode_deserialize_accepts_codes_and_casings() {
        let modes: Vec<CropMode> =
            serde_json::from_str(r#"["fit", "Resize", "b", "BORDERS", "c"]"#).unwrap();
        assert_eq!(
            modes,
            vec![
                CropMode::Fit,
                CropMode::Resize,
                CropMode::Border,
                CropMode::Border,
                CropMode::Crop
            ]
        );
        assert!(serde_json::from_str::<CropMode>(r#""stretch""#).is_err());
        assert_eq!(serde_json::to_string(&CropMode::Border).unwrap(), r#""border""#);
    }

    #[test]
    fn test_hashmap_registry() {
        let mut registry = HashMap::new();
        registry.insert(
            "small".to_string(),
            AliasDefinition::new("small", 160, 120, CropMode::Fit),
        );

        assert_eq!(registry.alias("small").map(|a| a.width), Some(160));
        assert!(registry.alias("large").is_none());
    }
}
