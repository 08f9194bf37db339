//! Slot colors per type name
//!
//! Single source of truth for the colors the editor draws on variable slots.
//! Unknown types fall back to the wildcard color.

use crate::constants::types::WILDCARD;
use crate::error::{GlobalsError, Result};
use crate::nodes::TypeName;
use egui::Color32;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};

/// Built-in type colors
static DEFAULT_TYPE_COLORS: Lazy<HashMap<&'static str, Color32>> = Lazy::new(|| {
    HashMap::from([
        ("IMAGE", Color32::from_rgb(100, 181, 246)),       // Blue
        ("MASK", Color32::from_rgb(129, 199, 132)),        // Green
        ("LATENT", Color32::from_rgb(255, 138, 101)),      // Orange
        ("CONDITIONING", Color32::from_rgb(255, 169, 49)), // Amber
        ("MODEL", Color32::from_rgb(179, 157, 219)),       // Lavender
        ("CLIP", Color32::from_rgb(255, 213, 0)),          // Yellow
        ("VAE", Color32::from_rgb(255, 110, 110)),         // Red
        ("CONTROL_NET", Color32::from_rgb(0, 212, 170)),   // Teal
        ("STRING", Color32::from_rgb(119, 221, 119)),
        ("INT", Color32::from_rgb(126, 200, 227)),
        ("FLOAT", Color32::from_rgb(205, 180, 219)),
        ("BOOLEAN", Color32::from_rgb(255, 204, 128)),
    ])
});

/// Default color for wildcard and unrecognized types
pub const WILDCARD_COLOR: Color32 = Color32::from_rgb(170, 170, 170);

/// Type name to slot color table
#[derive(Debug, Clone, PartialEq)]
pub struct TypeColorMap {
    colors: HashMap<String, Color32>,
    wildcard: Color32,
}

impl TypeColorMap {
    /// The built-in table
    pub fn new() -> Self {
        Self {
            colors: DEFAULT_TYPE_COLORS
                .iter()
                .map(|(name, color)| (name.to_string(), *color))
                .collect(),
            wildcard: WILDCARD_COLOR,
        }
    }

    /// The built-in table with `#RRGGBB` overrides applied; `*` replaces the
    /// wildcard color
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Result<Self> {
        let mut map = Self::new();
        for (type_name, hex) in overrides {
            map.insert(type_name.as_str(), parse_hex_color(type_name, hex)?);
        }
        Ok(map)
    }

    pub fn insert(&mut self, type_name: &str, color: Color32) {
        if type_name == WILDCARD {
            self.wildcard = color;
        } else {
            self.colors.insert(type_name.to_string(), color);
        }
    }

    /// Color for a type, the wildcard color if the type is unknown
    pub fn color_for(&self, type_name: &TypeName) -> Color32 {
        if type_name.is_wildcard() {
            return self.wildcard;
        }
        self.colors
            .get(type_name.as_str())
            .copied()
            .unwrap_or(self.wildcard)
    }

    pub fn wildcard_color(&self) -> Color32 {
        self.wildcard
    }

    /// Number of concrete types with a configured color
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for TypeColorMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `#RRGGBB` (the leading `#` is optional)
pub fn parse_hex_color(type_name: &str, value: &str) -> Result<Color32> {
    let invalid = || GlobalsError::InvalidColor {
        type_name: type_name.to_string(),
        value: value.to_string(),
    };

    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).map_err(|_| invalid());
    Ok(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Format a color as `#RRGGBB`
pub fn to_hex(color: Color32) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r(), color.g(), color.b())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_types() {
        let map = TypeColorMap::new();
        assert_eq!(to_hex(map.color_for(&TypeName::new("IMAGE"))), "#64B5F6");
        assert_eq!(to_hex(map.color_for(&TypeName::new("MASK"))), "#81C784");
        assert_eq!(map.color_for(&TypeName::new("UPSCALE_MODEL")), WILDCARD_COLOR);
        assert_eq!(map.color_for(&TypeName::wildcard()), WILDCARD_COLOR);
        assert_eq!(map.len(), 12);
    }

    #[test]
    fn test_overrides() {
        let overrides = BTreeMap::from([
            ("IMAGE".to_string(), "#000000".to_string()),
            ("AUDIO".to_string(), "11aa22".to_string()),
            ("*".to_string(), "#FFFFFF".to_string()),
        ]);
        let map = TypeColorMap::with_overrides(&overrides).unwrap();
        assert_eq!(map.color_for(&TypeName::new("IMAGE")), Color32::from_rgb(0, 0, 0));
        assert_eq!(map.color_for(&TypeName::new("AUDIO")), Color32::from_rgb(0x11, 0xAA, 0x22));
        assert_eq!(map.wildcard_color(), Color32::WHITE);
        assert_eq!(map.color_for(&TypeName::new("NOPE")), Color32::WHITE);
    }

    #[test]
    fn test_invalid_hex_is_rejected() {
        for bad in ["#12345", "#GGGGGG", "", "#1234567", "#ééé"] {
            assert!(parse_hex_color("IMAGE", bad).is_err(), "accepted {bad:?}");
        }
    }
}
