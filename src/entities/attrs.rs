//! Attribute values, descriptors and schemas shared by every light type.
//!
//! Values are what the live store hands back; descriptors are the static
//! metadata (kind, flags, alias group) the registry owns. Notes:
//! - `Scalar` covers floats, ints, enum indices and angles alike; the store
//!   keeps the concrete representation.
//! - `VectorTriple` is a three-component double (colors).
//! - `Str` values exist on live nodes but have no descriptor kind, which is
//!   what makes them unsupported for transfer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Live attribute value as reported by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Vec3([f64; 3]),
    Str(String),
}

impl AttrValue {
    /// Store-side type name, used in logs and error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Bool(_) => "bool",
            AttrValue::Int(_) => "long",
            AttrValue::Float(_) => "double",
            AttrValue::Vec3(_) => "double3",
            AttrValue::Str(_) => "string",
        }
    }

    /// Descriptor kind this value belongs to, if any.
    pub fn kind(&self) -> Option<AttrKind> {
        match self {
            AttrValue::Bool(_) => Some(AttrKind::Boolean),
            AttrValue::Int(_) | AttrValue::Float(_) => Some(AttrKind::Scalar),
            AttrValue::Vec3(_) => Some(AttrKind::VectorTriple),
            AttrValue::Str(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<[f64; 3]> {
        match self {
            AttrValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }
}

/// Value kind of a schema attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttrKind {
    Boolean,
    Scalar,
    VectorTriple,
}

impl AttrKind {
    /// Whether a live value may be written to an attribute of this kind.
    pub fn accepts(&self, value: &AttrValue) -> bool {
        value.kind() == Some(*self)
    }
}

// Descriptor flags
/// Bound and shown by the light panel.
pub const FLAG_DISPLAY: u8 = 1 << 0;
/// Offered by the copy tool.
pub const FLAG_TRANSFER: u8 = 1 << 1;

/// Static metadata for one named attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrDef {
    pub name: &'static str,
    pub kind: AttrKind,
    pub flags: u8,
    /// Attributes sharing a group name are interchangeable transfer targets.
    pub alias: Option<&'static str>,
}

impl AttrDef {
    pub const fn new(name: &'static str, kind: AttrKind, flags: u8) -> Self {
        Self {
            name,
            kind,
            flags,
            alias: None,
        }
    }

    pub const fn aliased(self, group: &'static str) -> Self {
        Self {
            alias: Some(group),
            ..self
        }
    }

    pub fn is_display(&self) -> bool {
        self.flags & FLAG_DISPLAY != 0
    }

    pub fn is_transfer(&self) -> bool {
        self.flags & FLAG_TRANSFER != 0
    }
}

/// Ordered descriptor list for one entity type.
#[derive(Debug)]
pub struct AttrSchema {
    pub name: &'static str,
    defs: &'static [AttrDef],
}

impl AttrSchema {
    pub const fn new(name: &'static str, defs: &'static [AttrDef]) -> Self {
        Self { name, defs }
    }

    pub fn defs(&self) -> &'static [AttrDef] {
        self.defs
    }

    pub fn get(&self, attr: &str) -> Option<&'static AttrDef> {
        self.defs.iter().find(|d| d.name == attr)
    }

    pub fn contains(&self, attr: &str) -> bool {
        self.get(attr).is_some()
    }

    /// Descriptors the light panel binds, in display order.
    pub fn display_defs(&self) -> impl Iterator<Item = &'static AttrDef> {
        self.defs.iter().filter(|d| d.is_display())
    }
}

/// Numeric bounds declared by the store; `None` means unbounded in that direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttrBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AttrBounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Fill missing directions with `[-sentinel, sentinel]`.
    pub fn resolve(&self, sentinel: f64) -> (f64, f64) {
        (self.min.unwrap_or(-sentinel), self.max.unwrap_or(sentinel))
    }
}

/// Attribute container for one live node: name → value, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attrs {
    map: IndexMap<String, AttrValue>,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: AttrValue) {
        self.map.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.map.get(key)
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.map.get(key).and_then(AttrValue::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.map.get(key).and_then(AttrValue::as_bool)
    }

    /// Remove attribute by key, keeping the order of the rest
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.map.shift_remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Attribute names in creation order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kinds() {
        assert_eq!(AttrValue::Bool(true).kind(), Some(AttrKind::Boolean));
        assert_eq!(AttrValue::Int(3).kind(), Some(AttrKind::Scalar));
        assert_eq!(AttrValue::Float(0.5).kind(), Some(AttrKind::Scalar));
        assert_eq!(AttrValue::Vec3([1.0, 0.0, 0.0]).kind(), Some(AttrKind::VectorTriple));
        assert_eq!(AttrValue::Str("hdr".into()).kind(), None);
    }

    #[test]
    fn test_kind_accepts() {
        assert!(AttrKind::Scalar.accepts(&AttrValue::Int(4)));
        assert!(AttrKind::Scalar.accepts(&AttrValue::Float(4.0)));
        assert!(!AttrKind::Scalar.accepts(&AttrValue::Bool(true)));
        assert!(!AttrKind::Boolean.accepts(&AttrValue::Float(1.0)));
        assert!(AttrKind::VectorTriple.accepts(&AttrValue::Vec3([0.0; 3])));
    }

    #[test]
    fn test_bounds_resolve_sentinel() {
        assert_eq!(AttrBounds::default().resolve(10000.0), (-10000.0, 10000.0));
        assert_eq!(AttrBounds::new(Some(0.0), None).resolve(10000.0), (0.0, 10000.0));
        assert_eq!(AttrBounds::new(None, Some(5.0)).resolve(10000.0), (-10000.0, 5.0));
    }

    #[test]
    fn test_def_flags_and_alias() {
        const D: AttrDef = AttrDef::new("aiExposure", AttrKind::Scalar, FLAG_TRANSFER).aliased("exposure");
        assert!(D.is_transfer());
        assert!(!D.is_display());
        assert_eq!(D.alias, Some("exposure"));
    }

    #[test]
    fn test_attrs_keep_insertion_order() {
        let mut attrs = Attrs::new();
        attrs.set("intensity", AttrValue::Float(1.0));
        attrs.set("color", AttrValue::Vec3([1.0, 1.0, 1.0]));
        attrs.set("emitDiffuse", AttrValue::Bool(true));

        let keys: Vec<&str> = attrs.keys().collect();
        assert_eq!(keys, vec!["intensity", "color", "emitDiffuse"]);
        assert_eq!(attrs.get_float("intensity"), Some(1.0));
        assert_eq!(attrs.get_bool("emitDiffuse"), Some(true));
        assert_eq!(attrs.len(), 3);
    }
}
