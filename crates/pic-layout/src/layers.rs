//! GDS layers and the default per-layer technology tables

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// A GDS `(layer, datatype)` pair.
///
/// Serialized as `"layer/datatype"` so it can be used as a JSON or YAML map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Layer {
    pub layer: u16,
    pub datatype: u16,
}

impl Layer {
    pub const fn new(layer: u16, datatype: u16) -> Self {
        Self { layer, datatype }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.layer, self.datatype)
    }
}

impl FromStr for Layer {
    type Err = LayoutError;

    /// Accepts `1/0`, `1:0` and `(1, 0)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let mut parts = trimmed.split(|c| c == '/' || c == ':' || c == ',');
        let parse = |part: Option<&str>| -> Result<u16, LayoutError> {
            part.map(str::trim)
                .and_then(|p| p.parse::<u16>().ok())
                .ok_or_else(|| LayoutError::InvalidLayer(s.to_string()))
        };
        let layer = parse(parts.next())?;
        let datatype = parse(parts.next())?;
        if parts.next().is_some() {
            return Err(LayoutError::InvalidLayer(s.to_string()));
        }
        Ok(Self { layer, datatype })
    }
}

impl TryFrom<String> for Layer {
    type Error = LayoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Layer> for String {
    fn from(layer: Layer) -> Self {
        layer.to_string()
    }
}

impl From<(u16, u16)> for Layer {
    fn from((layer, datatype): (u16, u16)) -> Self {
        Self { layer, datatype }
    }
}

/// Waveguide core
pub const WG: Layer = Layer::new(1, 0);
/// Cladding exclusion, removed before simulation
pub const WGCLAD: Layer = Layer::new(111, 0);
pub const SLAB150: Layer = Layer::new(2, 0);
pub const SLAB90: Layer = Layer::new(3, 0);
pub const M1: Layer = Layer::new(41, 0);
pub const M2: Layer = Layer::new(45, 0);
pub const M3: Layer = Layer::new(49, 0);
/// Port markers
pub const PORT: Layer = Layer::new(60, 0);

/// Layer thickness in nm for the physical layers of the default stack.
pub fn layer2nm() -> BTreeMap<Layer, f64> {
    BTreeMap::from([(WG, 220.0)])
}

/// Material short name for each physical layer.
pub fn layer2material() -> BTreeMap<Layer, String> {
    BTreeMap::from([(WG, "si".to_string())])
}

/// Sidewall angles in degrees. Layers not listed are vertical (90).
pub fn layer2swa() -> BTreeMap<Layer, f64> {
    BTreeMap::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layer_forms() {
        assert_eq!("1/0".parse::<Layer>().unwrap(), WG);
        assert_eq!("111:0".parse::<Layer>().unwrap(), WGCLAD);
        assert_eq!("(49, 0)".parse::<Layer>().unwrap(), M3);
        assert!("1".parse::<Layer>().is_err());
        assert!("1/0/2".parse::<Layer>().is_err());
        assert!("a/b".parse::<Layer>().is_err());
    }

    #[test]
    fn test_layer_as_json_map_key() {
        let table = layer2nm();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"1/0":220.0}"#);

        let back: BTreeMap<Layer, f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
