//! Schema registry: entity type → ordered attribute descriptors.
//!
//! Built once, read-only afterwards; share it behind an `Arc`.
//! Lookups are lenient by default (unregistered type → no descriptors),
//! `lookup_strict` opts into [`Error::UnknownType`].
//!
//! The transform schema is kept apart: its attributes live on the light's
//! parent node and are neither light attributes nor transfer candidates.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use super::attr_schemas::*;
use super::attrs::{AttrDef, AttrSchema};
use super::entity_type::EntityType;
use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<EntityType, &'static AttrSchema>,
    transform: Option<&'static AttrSchema>,
}

impl SchemaRegistry {
    /// Empty registry; add entries with [`SchemaRegistry::with`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the full built-in light catalog.
    pub fn builtin() -> Self {
        Self::new()
            .with(EntityType::PointLight, &POINT_SCHEMA)
            .with(EntityType::SpotLight, &SPOT_SCHEMA)
            .with(EntityType::DirectionalLight, &DIRECTIONAL_SCHEMA)
            .with(EntityType::AmbientLight, &AMBIENT_SCHEMA)
            .with(EntityType::AreaLight, &AREA_SCHEMA)
            .with(EntityType::VolumeLight, &VOLUME_SCHEMA)
            .with(EntityType::AiAreaLight, &AI_AREA_SCHEMA)
            .with(EntityType::AiSkyDomeLight, &AI_SKY_DOME_SCHEMA)
            .with(EntityType::AiMeshLight, &AI_MESH_SCHEMA)
            .with(EntityType::AiPhotometricLight, &AI_PHOTOMETRIC_SCHEMA)
            .with_transform(&TRANSFORM_SCHEMA)
    }

    pub fn with(mut self, entity_type: EntityType, schema: &'static AttrSchema) -> Self {
        self.schemas.insert(entity_type, schema);
        self
    }

    pub fn with_transform(mut self, schema: &'static AttrSchema) -> Self {
        self.transform = Some(schema);
        self
    }

    /// Descriptors bound on the parent transform; empty when none registered.
    pub fn transform_defs(&self) -> &'static [AttrDef] {
        self.transform.map(|s| s.defs()).unwrap_or(&[])
    }

    /// Registered types in registration order.
    pub fn types(&self) -> impl Iterator<Item = EntityType> + '_ {
        self.schemas.keys().copied()
    }

    pub fn is_registered(&self, entity_type: EntityType) -> bool {
        self.schemas.contains_key(&entity_type)
    }

    /// Ordered descriptors; empty for an unregistered type.
    pub fn lookup(&self, entity_type: EntityType) -> &'static [AttrDef] {
        self.schemas.get(&entity_type).map(|s| s.defs()).unwrap_or(&[])
    }

    pub fn lookup_strict(&self, entity_type: EntityType) -> Result<&'static [AttrDef]> {
        self.schemas
            .get(&entity_type)
            .map(|s| s.defs())
            .ok_or_else(|| Error::UnknownType(entity_type.type_name().to_string()))
    }

    pub fn schema(&self, entity_type: EntityType) -> Option<&'static AttrSchema> {
        self.schemas.get(&entity_type).copied()
    }

    pub fn attributes_of(&self, entity_type: EntityType) -> BTreeSet<&'static str> {
        self.lookup(entity_type).iter().map(|d| d.name).collect()
    }

    pub fn descriptor(&self, entity_type: EntityType, attr: &str) -> Option<&'static AttrDef> {
        self.schema(entity_type).and_then(|s| s.get(attr))
    }

    /// Whether any registered schema names this attribute.
    pub fn knows_attribute(&self, attr: &str) -> bool {
        self.schemas.values().any(|s| s.contains(attr))
    }

    /// Alias group of `attr`, taken from the first schema that declares one.
    pub fn alias_group(&self, attr: &str) -> Option<&'static str> {
        self.schemas
            .values()
            .filter_map(|s| s.get(attr))
            .find_map(|d| d.alias)
    }

    /// Other attribute names in the same alias group as `attr`, across all types.
    pub fn alias_partners(&self, attr: &str) -> Vec<&'static str> {
        let Some(group) = self.alias_group(attr) else {
            return Vec::new();
        };
        let mut partners: Vec<&'static str> = Vec::new();
        for def in self.schemas.values().flat_map(|s| s.defs()) {
            if def.alias == Some(group) && def.name != attr && !partners.contains(&def.name) {
                partners.push(def.name);
            }
        }
        partners
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::attrs::{AttrKind, FLAG_DISPLAY};

    const TEST_DEFS: &[AttrDef] = &[
        AttrDef::new("color", AttrKind::VectorTriple, FLAG_DISPLAY),
        AttrDef::new("intensity", AttrKind::Scalar, FLAG_DISPLAY),
    ];
    static TEST_SCHEMA: AttrSchema = AttrSchema::new("pointLight", TEST_DEFS);

    #[test]
    fn test_builtin_covers_every_type() {
        let reg = SchemaRegistry::builtin();
        for t in EntityType::all() {
            assert!(reg.is_registered(*t), "{t} not registered");
            assert!(!reg.lookup(*t).is_empty());
        }
    }

    #[test]
    fn test_lookup_preserves_order() {
        let reg = SchemaRegistry::new().with(EntityType::PointLight, &TEST_SCHEMA);
        let names: Vec<&str> = reg.lookup(EntityType::PointLight).iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["color", "intensity"]);
        assert_eq!(
            reg.attributes_of(EntityType::PointLight),
            BTreeSet::from(["color", "intensity"])
        );
    }

    #[test]
    fn test_unregistered_lenient_and_strict() {
        let reg = SchemaRegistry::new().with(EntityType::PointLight, &TEST_SCHEMA);
        assert!(reg.lookup(EntityType::SpotLight).is_empty());
        assert!(reg.attributes_of(EntityType::SpotLight).is_empty());
        assert_eq!(
            reg.lookup_strict(EntityType::SpotLight),
            Err(Error::UnknownType("spotLight".to_string()))
        );
        assert!(reg.lookup_strict(EntityType::PointLight).is_ok());
    }

    #[test]
    fn test_alias_partners() {
        let reg = SchemaRegistry::builtin();
        assert_eq!(reg.alias_partners("aiExposure"), vec!["exposure"]);
        assert_eq!(reg.alias_partners("exposure"), vec!["aiExposure"]);
        assert!(reg.alias_partners("intensity").is_empty());
        assert!(reg.alias_partners("doesNotExist").is_empty());
    }

    #[test]
    fn test_knows_attribute() {
        let reg = SchemaRegistry::builtin();
        assert!(reg.knows_attribute("coneAngle"));
        assert!(reg.knows_attribute("ambientShade"));
        assert!(!reg.knows_attribute("visibility"));
    }

    #[test]
    fn test_transform_defs_kept_apart() {
        let reg = SchemaRegistry::builtin();
        let names: Vec<&str> = reg.transform_defs().iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["visibility"]);
        assert!(reg.transform_defs()[0].is_display());
        assert!(!reg.transform_defs()[0].is_transfer());
        assert!(SchemaRegistry::new().transform_defs().is_empty());
    }
}
