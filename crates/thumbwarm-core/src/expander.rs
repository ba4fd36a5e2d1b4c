//! Variant expansion: turn cacheable image fields into concrete requests.

use crate::{
    AliasRegistry, CacheableImageField, CropMode, VariantOrigin, VariantRequest, WarmupOutcome,
};

/// File-name marker for high-density sources.
pub const DENSITY_SUFFIX: &str = "@2x";

/// One entry of a warm-up plan.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedVariant {
    /// A request to hand to the backend.
    Request(VariantRequest),
    /// A directive entry that could not be resolved; its outcome is final.
    Rejected(WarmupOutcome),
}

impl PlannedVariant {
    /// The request, if this entry will be executed.
    pub fn request(&self) -> Option<&VariantRequest> {
        match self {
            Self::Request(request) => Some(request),
            Self::Rejected(_) => None,
        }
    }
}

/// Expand fields into a plan: for each field its aliases first, then its
/// literal sizes.
///
/// Unknown aliases become [`PlannedVariant::Rejected`] entries and expansion
/// carries on with the remaining entries.
pub fn expand(fields: &[CacheableImageField], registry: &dyn AliasRegistry) -> Vec<PlannedVariant> {
    let mut plan = Vec::new();

    for field in fields {
        let (source_file, scale) = resolve_density(&field.source_file);

        for name in &field.alias_names {
            let origin = VariantOrigin::alias(&field.field_key, name);
            let planned = match registry.alias(name) {
                Some(def) => build(source_file, scale, def.width, def.height, def.crop_mode, origin),
                None => PlannedVariant::Rejected(WarmupOutcome::config_error(
                    origin,
                    format!("Invalid cache alias configuration for: {}", name),
                )),
            };
            plan.push(planned);
        }

        for spec in &field.size_specs {
            let origin = VariantOrigin::size(&field.field_key, *spec);
            plan.push(build(
                source_file,
                scale,
                spec.width,
                spec.height,
                spec.crop_mode(),
                origin,
            ));
        }
    }

    plan
}

/// Strip the density suffix and return the generation path and the scale
/// factor to apply to dimensions.
pub fn resolve_density(source_file: &str) -> (&str, u32) {
    match source_file.strip_suffix(DENSITY_SUFFIX) {
        Some(stripped) => (stripped, 2),
        None => (source_file, 1),
    }
}

fn build(
    source_file: &str,
    scale: u32,
    width: u32,
    height: u32,
    crop_mode: CropMode,
    origin: VariantOrigin,
) -> PlannedVariant {
    let (Some(width), Some(height)) = (width.checked_mul(scale), height.checked_mul(scale)) else {
        return PlannedVariant::Rejected(WarmupOutcome::config_error(
            origin,
            format!("Dimensions {}x{} overflow at density x{}", width, height, scale),
        ));
    };

    match VariantRequest::new(source_file, width, height, crop_mode, origin.clone()) {
        Ok(request) => PlannedVariant::Request(request),
        Err(e) => PlannedVariant::Rejected(WarmupOutcome::config_error(origin, e.to_string())),
    }
}
