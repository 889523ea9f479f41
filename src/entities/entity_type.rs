//! EntityType - closed set of recognised light types.
//!
//! Type names match the host's node type strings, so parsing is the only
//! place a string type tag is looked at.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which renderer a light type ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightFamily {
    Maya,
    Arnold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    PointLight,
    SpotLight,
    DirectionalLight,
    AmbientLight,
    AreaLight,
    VolumeLight,
    AiAreaLight,
    AiSkyDomeLight,
    AiMeshLight,
    AiPhotometricLight,
}

impl EntityType {
    /// All recognised types, Maya family first.
    pub fn all() -> &'static [EntityType] {
        &[
            EntityType::PointLight,
            EntityType::SpotLight,
            EntityType::DirectionalLight,
            EntityType::AmbientLight,
            EntityType::AreaLight,
            EntityType::VolumeLight,
            EntityType::AiAreaLight,
            EntityType::AiSkyDomeLight,
            EntityType::AiMeshLight,
            EntityType::AiPhotometricLight,
        ]
    }

    /// Host node type string.
    pub fn type_name(&self) -> &'static str {
        match self {
            EntityType::PointLight => "pointLight",
            EntityType::SpotLight => "spotLight",
            EntityType::DirectionalLight => "directionalLight",
            EntityType::AmbientLight => "ambientLight",
            EntityType::AreaLight => "areaLight",
            EntityType::VolumeLight => "volumeLight",
            EntityType::AiAreaLight => "aiAreaLight",
            EntityType::AiSkyDomeLight => "aiSkyDomeLight",
            EntityType::AiMeshLight => "aiMeshLight",
            EntityType::AiPhotometricLight => "aiPhotometricLight",
        }
    }

    pub fn family(&self) -> LightFamily {
        match self {
            EntityType::AiAreaLight
            | EntityType::AiSkyDomeLight
            | EntityType::AiMeshLight
            | EntityType::AiPhotometricLight => LightFamily::Arnold,
            _ => LightFamily::Maya,
        }
    }
}

impl FromStr for EntityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::all()
            .iter()
            .copied()
            .find(|t| t.type_name() == s)
            .ok_or_else(|| Error::UnknownType(s.to_string()))
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.type_name())
    }
}
