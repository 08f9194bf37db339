//! Slot types and functionality for node connections

use super::data_type::TypeName;
use egui::Color32;
use serde::{Deserialize, Serialize};

/// Index of a slot within a node's input or output array
pub type SlotIndex = usize;

/// Unique identifier for a link
pub type LinkId = u64;

/// Side of a node a slot lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotSide {
    Input,
    Output,
}

/// Represents a typed connection point on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub index: SlotIndex,
    /// Name used to identify the slot (e.g. `_trigger`)
    pub name: String,
    /// Text drawn next to the slot
    pub label: String,
    pub slot_type: TypeName,
    pub side: SlotSide,
    /// Incoming link (inputs only)
    #[serde(default)]
    pub link: Option<LinkId>,
    /// Outgoing links (outputs only)
    #[serde(default)]
    pub links: Vec<LinkId>,
    /// Color drawn while connected
    #[serde(default, with = "color32_serde")]
    pub color_on: Option<Color32>,
    /// Color drawn while disconnected
    #[serde(default, with = "color32_serde")]
    pub color_off: Option<Color32>,
}

impl Slot {
    /// Creates a new slot
    pub fn new(index: SlotIndex, name: impl Into<String>, slot_type: TypeName, side: SlotSide) -> Self {
        let name = name.into();
        Self {
            index,
            label: name.clone(),
            name,
            slot_type,
            side,
            link: None,
            links: Vec::new(),
            color_on: None,
            color_off: None,
        }
    }

    /// Checks if this slot is an input
    pub fn is_input(&self) -> bool {
        matches!(self.side, SlotSide::Input)
    }

    /// Checks if this slot is an output
    pub fn is_output(&self) -> bool {
        matches!(self.side, SlotSide::Output)
    }

    /// Checks if any link is attached
    pub fn is_connected(&self) -> bool {
        self.link.is_some() || !self.links.is_empty()
    }
}

// Serde helper module for optional Color32
mod color32_serde {
    use egui::Color32;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(color: &Option<Color32>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        color
            .map(|c| [c.r(), c.g(), c.b(), c.a()])
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Color32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rgba = Option::<[u8; 4]>::deserialize(deserializer)?;
        Ok(rgba.map(|[r, g, b, a]| Color32::from_rgba_unmultiplied(r, g, b, a)))
    }
}
