//! Static attribute schemas for every recognised light type.
//!
//! Each schema lists the attributes the light panel binds (DISPLAY) and the
//! attributes the copy tool offers (TRANSFER). Order is display order.
//! `exposure` and `aiExposure` form the only alias group.

use super::attrs::{AttrDef, AttrKind, AttrSchema, FLAG_DISPLAY, FLAG_TRANSFER};

use AttrKind::{Boolean, Scalar, VectorTriple};

// Shorthand flag combos
const D: u8 = FLAG_DISPLAY;
const T: u8 = FLAG_TRANSFER;
const DT: u8 = FLAG_DISPLAY | FLAG_TRANSFER;

/// Alias group shared by `exposure` (Arnold-native lights) and `aiExposure`
/// (Maya lights with the Arnold extension).
pub const EXPOSURE_GROUP: &str = "exposure";

const fn exposure(flags: u8) -> AttrDef {
    AttrDef::new("exposure", Scalar, flags).aliased(EXPOSURE_GROUP)
}

const fn ai_exposure(flags: u8) -> AttrDef {
    AttrDef::new("aiExposure", Scalar, flags).aliased(EXPOSURE_GROUP)
}

// ============================================================================
// Maya lights
// ============================================================================

const POINT_DEFS: &[AttrDef] = &[
    AttrDef::new("color", VectorTriple, DT),
    AttrDef::new("intensity", Scalar, DT),
    AttrDef::new("emitDiffuse", Boolean, DT),
    AttrDef::new("emitSpecular", Boolean, DT),
    AttrDef::new("decayRate", Scalar, T),
    AttrDef::new("aiUseColorTemperature", Boolean, DT),
    AttrDef::new("aiColorTemperature", Scalar, DT),
    ai_exposure(DT),
    AttrDef::new("aiSamples", Scalar, DT),
    AttrDef::new("aiRadius", Scalar, DT),
    AttrDef::new("aiNormalize", Boolean, DT),
    AttrDef::new("aiRoundness", Scalar, T),
    AttrDef::new("aiCastShadows", Boolean, DT),
    AttrDef::new("aiShadowDensity", Scalar, DT),
    AttrDef::new("aiCastVolumetricShadows", Boolean, T),
    AttrDef::new("aiVolumeSamples", Scalar, DT),
    AttrDef::new("aiCamera", Scalar, T),
    AttrDef::new("aiTransmission", Scalar, T),
    AttrDef::new("aiDiffuse", Scalar, T),
    AttrDef::new("aiSpecular", Scalar, T),
    AttrDef::new("aiSss", Scalar, T),
    AttrDef::new("aiIndirect", Scalar, T),
    AttrDef::new("aiVolume", Scalar, T),
    AttrDef::new("aiMaxBounces", Scalar, T),
];

pub static POINT_SCHEMA: AttrSchema = AttrSchema::new("pointLight", POINT_DEFS);

const SPOT_DEFS: &[AttrDef] = &[
    AttrDef::new("color", VectorTriple, DT),
    AttrDef::new("intensity", Scalar, DT),
    AttrDef::new("emitDiffuse", Boolean, DT),
    AttrDef::new("emitSpecular", Boolean, DT),
    AttrDef::new("decayRate", Scalar, T),
    AttrDef::new("coneAngle", Scalar, DT),
    AttrDef::new("penumbraAngle", Scalar, T),
    AttrDef::new("dropoff", Scalar, T),
    AttrDef::new("aiUseColorTemperature", Boolean, DT),
    AttrDef::new("aiColorTemperature", Scalar, DT),
    ai_exposure(DT),
    AttrDef::new("aiSamples", Scalar, DT),
    AttrDef::new("aiRadius", Scalar, DT),
    AttrDef::new("aiNormalize", Boolean, DT),
    AttrDef::new("aiRoundness", Scalar, DT),
    AttrDef::new("aiCastShadows", Boolean, DT),
    AttrDef::new("aiShadowDensity", Scalar, DT),
    AttrDef::new("aiCastVolumetricShadows", Boolean, DT),
    AttrDef::new("aiVolumeSamples", Scalar, DT),
    AttrDef::new("aiAspectRatio", Scalar, DT),
    AttrDef::new("aiLensRadius", Scalar, DT),
    AttrDef::new("aiDiffuse", Scalar, T),
    AttrDef::new("aiSpecular", Scalar, T),
    AttrDef::new("aiSss", Scalar, T),
    AttrDef::new("aiIndirect", Scalar, T),
    AttrDef::new("aiVolume", Scalar, T),
    AttrDef::new("aiMaxBounces", Scalar, T),
];

pub static SPOT_SCHEMA: AttrSchema = AttrSchema::new("spotLight", SPOT_DEFS);

const VOLUME_DEFS: &[AttrDef] = &[
    AttrDef::new("color", VectorTriple, DT),
    AttrDef::new("intensity", Scalar, DT),
    AttrDef::new("emitDiffuse", Boolean, DT),
    AttrDef::new("emitSpecular", Boolean, DT),
    AttrDef::new("lightShape", Scalar, T),
    AttrDef::new("aiUseColorTemperature", Boolean, T),
    AttrDef::new("aiColorTemperature", Scalar, T),
    ai_exposure(T),
    AttrDef::new("aiSamples", Scalar, T),
    AttrDef::new("aiNormalize", Boolean, T),
    AttrDef::new("aiCastShadows", Boolean, T),
    AttrDef::new("aiShadowDensity", Scalar, T),
    AttrDef::new("aiCastVolumetricShadows", Boolean, T),
    AttrDef::new("aiVolumeSamples", Scalar, T),
    AttrDef::new("aiCamera", Scalar, T),
    AttrDef::new("aiTransmission", Scalar, T),
    AttrDef::new("aiDiffuse", Scalar, T),
    AttrDef::new("aiSpecular", Scalar, T),
    AttrDef::new("aiSss", Scalar, T),
    AttrDef::new("aiIndirect", Scalar, T),
    AttrDef::new("aiVolume", Scalar, T),
    AttrDef::new("aiMaxBounces", Scalar, T),
    AttrDef::new("aiRadius", Scalar, T),
];

pub static VOLUME_SCHEMA: AttrSchema = AttrSchema::new("volumeLight", VOLUME_DEFS);

const DIRECTIONAL_DEFS: &[AttrDef] = &[
    AttrDef::new("color", VectorTriple, DT),
    AttrDef::new("intensity", Scalar, DT),
    AttrDef::new("emitDiffuse", Boolean, DT),
    AttrDef::new("emitSpecular", Boolean, DT),
    AttrDef::new("aiUseColorTemperature", Boolean, T),
    AttrDef::new("aiColorTemperature", Scalar, T),
    ai_exposure(T),
    AttrDef::new("aiAngle", Scalar, DT),
    AttrDef::new("aiSamples", Scalar, T),
    AttrDef::new("aiNormalize", Boolean, T),
    AttrDef::new("aiCastShadows", Boolean, T),
    AttrDef::new("aiShadowDensity", Scalar, T),
    AttrDef::new("aiCastVolumetricShadows", Boolean, T),
    AttrDef::new("aiVolumeSamples", Scalar, T),
    AttrDef::new("aiDiffuse", Scalar, T),
    AttrDef::new("aiSpecular", Scalar, T),
    AttrDef::new("aiSss", Scalar, T),
    AttrDef::new("aiIndirect", Scalar, T),
    AttrDef::new("aiVolume", Scalar, T),
    AttrDef::new("aiMaxBounces", Scalar, T),
];

pub static DIRECTIONAL_SCHEMA: AttrSchema = AttrSchema::new("directionalLight", DIRECTIONAL_DEFS);

const AMBIENT_DEFS: &[AttrDef] = &[
    AttrDef::new("color", VectorTriple, DT),
    AttrDef::new("intensity", Scalar, DT),
    AttrDef::new("ambientShade", Scalar, DT),
];

pub static AMBIENT_SCHEMA: AttrSchema = AttrSchema::new("ambientLight", AMBIENT_DEFS);

const AREA_DEFS: &[AttrDef] = &[
    AttrDef::new("color", VectorTriple, DT),
    AttrDef::new("intensity", Scalar, DT),
    AttrDef::new("emitDiffuse", Boolean, DT),
    AttrDef::new("emitSpecular", Boolean, DT),
    AttrDef::new("decayRate", Scalar, T),
    AttrDef::new("normalize", Boolean, T),
    AttrDef::new("aiUseColorTemperature", Boolean, T),
    AttrDef::new("aiColorTemperature", Scalar, T),
    ai_exposure(T),
    AttrDef::new("aiSamples", Scalar, T),
    AttrDef::new("aiNormalize", Boolean, T),
    AttrDef::new("aiCastShadows", Boolean, T),
    AttrDef::new("aiShadowDensity", Scalar, DT),
    AttrDef::new("aiResolution", Scalar, T),
    AttrDef::new("aiSpread", Scalar, T),
    AttrDef::new("aiCastVolumetricShadows", Boolean, T),
    AttrDef::new("aiVolumeSamples", Scalar, T),
    AttrDef::new("aiCamera", Scalar, T),
    AttrDef::new("aiTransmission", Scalar, T),
    AttrDef::new("aiDiffuse", Scalar, T),
    AttrDef::new("aiSpecular", Scalar, T),
    AttrDef::new("aiSss", Scalar, T),
    AttrDef::new("aiIndirect", Scalar, T),
    AttrDef::new("aiVolume", Scalar, T),
    AttrDef::new("aiMaxBounces", Scalar, T),
];

pub static AREA_SCHEMA: AttrSchema = AttrSchema::new("areaLight", AREA_DEFS);

// ============================================================================
// Arnold lights
// ============================================================================

const AI_AREA_DEFS: &[AttrDef] = &[
    AttrDef::new("color", VectorTriple, DT),
    AttrDef::new("intensity", Scalar, DT),
    exposure(D),
    AttrDef::new("aiUseColorTemperature", Boolean, DT),
    AttrDef::new("aiColorTemperature", Scalar, DT),
    ai_exposure(T),
    AttrDef::new("aiSamples", Scalar, DT),
    AttrDef::new("aiNormalize", Boolean, DT),
    AttrDef::new("aiShadowColor", VectorTriple, T),
    AttrDef::new("aiCastShadows", Boolean, DT),
    AttrDef::new("aiShadowDensity", Scalar, DT),
    AttrDef::new("aiResolution", Scalar, DT),
    AttrDef::new("aiSpread", Scalar, DT),
    AttrDef::new("aiRoundness", Scalar, D),
    AttrDef::new("aiSoftEdge", Scalar, D),
    AttrDef::new("aiCastVolumetricShadows", Boolean, DT),
    AttrDef::new("aiVolumeSamples", Scalar, DT),
    AttrDef::new("aiCamera", Scalar, T),
    AttrDef::new("aiTransmission", Scalar, T),
    AttrDef::new("aiDiffuse", Scalar, T),
    AttrDef::new("aiSpecular", Scalar, T),
    AttrDef::new("aiSss", Scalar, T),
    AttrDef::new("aiIndirect", Scalar, T),
    AttrDef::new("aiVolume", Scalar, T),
    AttrDef::new("aiMaxBounces", Scalar, T),
];

pub static AI_AREA_SCHEMA: AttrSchema = AttrSchema::new("aiAreaLight", AI_AREA_DEFS);

const AI_SKY_DOME_DEFS: &[AttrDef] = &[
    AttrDef::new("color", VectorTriple, DT),
    AttrDef::new("intensity", Scalar, DT),
    AttrDef::new("resolution", Scalar, T),
    AttrDef::new("aiUseColorTemperature", Boolean, T),
    AttrDef::new("aiColorTemperature", Scalar, T),
    AttrDef::new("format", Scalar, T),
    ai_exposure(T),
    AttrDef::new("aiSamples", Scalar, T),
    AttrDef::new("aiNormalize", Boolean, T),
    AttrDef::new("aiCastShadows", Boolean, T),
    AttrDef::new("aiShadowColor", VectorTriple, T),
    AttrDef::new("portalMode", Scalar, T),
    AttrDef::new("aiAovIndirect", Boolean, T),
    AttrDef::new("aiCastVolumetricShadows", Boolean, T),
    AttrDef::new("aiVolumeSamples", Scalar, T),
    AttrDef::new("aiCamera", Scalar, T),
    AttrDef::new("aiTransmission", Scalar, T),
    AttrDef::new("aiDiffuse", Scalar, T),
    AttrDef::new("aiSpecular", Scalar, T),
    AttrDef::new("aiSss", Scalar, T),
    AttrDef::new("aiIndirect", Scalar, T),
    AttrDef::new("aiVolume", Scalar, T),
    AttrDef::new("aiMaxBounces", Scalar, T),
];

pub static AI_SKY_DOME_SCHEMA: AttrSchema = AttrSchema::new("aiSkyDomeLight", AI_SKY_DOME_DEFS);

const AI_MESH_DEFS: &[AttrDef] = &[
    AttrDef::new("color", VectorTriple, DT),
    AttrDef::new("intensity", Scalar, DT),
    ai_exposure(T),
    AttrDef::new("aiUseColorTemperature", Boolean, DT),
    AttrDef::new("aiColorTemperature", Scalar, T),
    AttrDef::new("lightVisible", Boolean, T),
    AttrDef::new("aiSamples", Scalar, T),
    AttrDef::new("aiNormalize", Boolean, T),
    AttrDef::new("aiCastShadows", Boolean, T),
    AttrDef::new("aiShadowDensity", Scalar, T),
    AttrDef::new("aiShadowColor", VectorTriple, T),
    AttrDef::new("aiCastVolumetricShadows", Boolean, T),
    AttrDef::new("aiVolumeSamples", Scalar, T),
    AttrDef::new("aiDiffuse", Scalar, T),
    AttrDef::new("aiSpecular", Scalar, T),
    AttrDef::new("aiSss", Scalar, T),
    AttrDef::new("aiIndirect", Scalar, T),
    AttrDef::new("aiVolume", Scalar, T),
    AttrDef::new("aiMaxBounces", Scalar, T),
];

pub static AI_MESH_SCHEMA: AttrSchema = AttrSchema::new("aiMeshLight", AI_MESH_DEFS);

const AI_PHOTOMETRIC_DEFS: &[AttrDef] = &[
    AttrDef::new("color", VectorTriple, DT),
    AttrDef::new("intensity", Scalar, DT),
    AttrDef::new("aiUseColorTemperature", Boolean, DT),
    AttrDef::new("aiColorTemperature", Scalar, T),
    exposure(DT),
    AttrDef::new("aiSamples", Scalar, T),
    AttrDef::new("aiRadius", Scalar, T),
    AttrDef::new("aiNormalize", Boolean, T),
    AttrDef::new("aiCastShadows", Boolean, T),
    AttrDef::new("aiShadowDensity", Scalar, T),
    AttrDef::new("aiShadowColor", VectorTriple, T),
    AttrDef::new("aiCastVolumetricShadows", Boolean, T),
    AttrDef::new("aiVolumeSamples", Scalar, T),
    AttrDef::new("aiDiffuse", Scalar, T),
    AttrDef::new("aiSpecular", Scalar, T),
    AttrDef::new("aiSss", Scalar, T),
    AttrDef::new("aiIndirect", Scalar, T),
    AttrDef::new("aiVolume", Scalar, T),
    AttrDef::new("aiMaxBounces", Scalar, T),
];

pub static AI_PHOTOMETRIC_SCHEMA: AttrSchema = AttrSchema::new("aiPhotometricLight", AI_PHOTOMETRIC_DEFS);

// ============================================================================
// Parent transform
// ============================================================================

// Bound through the light's parent, never transferred
const TRANSFORM_DEFS: &[AttrDef] = &[AttrDef::new("visibility", Boolean, D)];

pub static TRANSFORM_SCHEMA: AttrSchema = AttrSchema::new("transform", TRANSFORM_DEFS);

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> [&'static AttrSchema; 10] {
        [
            &POINT_SCHEMA,
            &SPOT_SCHEMA,
            &VOLUME_SCHEMA,
            &DIRECTIONAL_SCHEMA,
            &AMBIENT_SCHEMA,
            &AREA_SCHEMA,
            &AI_AREA_SCHEMA,
            &AI_SKY_DOME_SCHEMA,
            &AI_MESH_SCHEMA,
            &AI_PHOTOMETRIC_SCHEMA,
        ]
    }

    #[test]
    fn test_every_light_displays_color_and_intensity() {
        for schema in all() {
            let shown: Vec<&str> = schema.display_defs().map(|d| d.name).collect();
            assert!(shown.contains(&"color"), "{} missing color", schema.name);
            assert!(shown.contains(&"intensity"), "{} missing intensity", schema.name);
        }
    }

    #[test]
    fn test_no_duplicate_names() {
        for schema in all() {
            let mut names: Vec<&str> = schema.defs().iter().map(|d| d.name).collect();
            names.sort_unstable();
            let before = names.len();
            names.dedup();
            assert_eq!(before, names.len(), "{} has duplicates", schema.name);
        }
    }

    #[test]
    fn test_only_exposure_pair_is_aliased() {
        for schema in all() {
            for def in schema.defs() {
                match def.name {
                    "exposure" | "aiExposure" => assert_eq!(def.alias, Some(EXPOSURE_GROUP)),
                    _ => assert_eq!(def.alias, None, "{}.{}", schema.name, def.name),
                }
            }
        }
    }

    #[test]
    fn test_color_kinds() {
        assert_eq!(POINT_SCHEMA.get("color").map(|d| d.kind), Some(VectorTriple));
        assert_eq!(AI_MESH_SCHEMA.get("aiShadowColor").map(|d| d.kind), Some(VectorTriple));
        assert_eq!(SPOT_SCHEMA.get("emitDiffuse").map(|d| d.kind), Some(Boolean));
        assert_eq!(AMBIENT_SCHEMA.get("ambientShade").map(|d| d.kind), Some(Scalar));
    }
}
