//! Node types and core node functionality

use super::data_type::TypeName;
use super::port::{Slot, SlotSide};
use crate::constants::{node as consts, types};
use serde::{Deserialize, Serialize};

/// Unique identifier for a node
pub type NodeId = usize;

/// An editable value shown on a node (e.g. the variable name text box)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub name: String,
    pub value: String,
}

impl Widget {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Core node structure as exposed by the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Type discriminator, e.g. `SetNodeGlobal`
    pub node_type: String,
    pub title: String,
    #[serde(default)]
    pub inputs: Vec<Slot>,
    #[serde(default)]
    pub outputs: Vec<Slot>,
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

impl Node {
    /// Creates a new node of the given type with no slots or widgets
    pub fn new(id: NodeId, node_type: impl Into<String>) -> Self {
        let node_type = node_type.into();
        Self {
            id,
            title: node_type.clone(),
            node_type,
            inputs: vec![],
            outputs: vec![],
            widgets: vec![],
        }
    }

    /// Creates a Set node bound to `variable_name`
    ///
    /// Layout: input `value` (`*`), outputs `value` (`*`) and `trigger` (`STRING`).
    pub fn set_global(id: NodeId, variable_name: impl Into<String>) -> Self {
        let mut node = Self::new(id, consts::SET_NODE_TYPE);
        node.add_input(consts::VALUE_INPUT, TypeName::wildcard())
            .add_output(types::WILDCARD_LABEL, TypeName::wildcard())
            .add_output(consts::TRIGGER_OUTPUT, TypeName::new(types::TRIGGER_TYPE))
            .add_widget(consts::VARIABLE_NAME_WIDGET, variable_name);
        node.title = "Set Global Variable".to_string();
        node
    }

    /// Creates a Get node reading `variable_name`
    ///
    /// Layout: trigger-only input `_trigger` (`*`), output `value` (`*`).
    pub fn get_global(id: NodeId, variable_name: impl Into<String>) -> Self {
        let mut node = Self::new(id, consts::GET_NODE_TYPE);
        node.add_input(consts::TRIGGER_INPUT, TypeName::wildcard())
            .add_output(types::WILDCARD_LABEL, TypeName::wildcard())
            .add_widget(consts::VARIABLE_NAME_WIDGET, variable_name);
        node.title = "Get Global Variable".to_string();
        node
    }

    /// Adds an input slot to the node
    pub fn add_input(&mut self, name: impl Into<String>, slot_type: TypeName) -> &mut Self {
        let index = self.inputs.len();
        self.inputs.push(Slot::new(index, name, slot_type, SlotSide::Input));
        self
    }

    /// Adds an output slot to the node
    pub fn add_output(&mut self, name: impl Into<String>, slot_type: TypeName) -> &mut Self {
        let index = self.outputs.len();
        self.outputs.push(Slot::new(index, name, slot_type, SlotSide::Output));
        self
    }

    /// Adds a widget to the node
    pub fn add_widget(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.widgets.push(Widget::new(name, value));
        self
    }

    /// Sets the title of the node
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn widget(&self, name: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.name == name)
    }

    pub fn widget_mut(&mut self, name: &str) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|w| w.name == name)
    }

    /// The bound variable name, if the node has a non-empty one
    pub fn variable_name(&self) -> Option<&str> {
        self.widget(consts::VARIABLE_NAME_WIDGET)
            .map(|w| w.value.as_str())
            .filter(|name| !name.is_empty())
    }

    /// Check if this is a Set node
    pub fn is_set_node(&self) -> bool {
        self.node_type == consts::SET_NODE_TYPE
    }

    /// Check if this is a Get node
    pub fn is_get_node(&self) -> bool {
        self.node_type == consts::GET_NODE_TYPE
    }

    /// Check if this is either kind of global variable node
    pub fn is_global_variable_node(&self) -> bool {
        self.is_set_node() || self.is_get_node()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_node_layout() {
        let node = Node::set_global(3, "foo");
        assert!(node.is_set_node());
        assert_eq!(node.inputs.len(), 1);
        assert_eq!(node.outputs.len(), 2);
        assert_eq!(node.outputs[1].slot_type, "STRING");
        assert_eq!(node.variable_name(), Some("foo"));
    }

    #[test]
    fn test_get_node_layout() {
        let node = Node::get_global(4, "foo");
        assert!(node.is_get_node());
        assert_eq!(node.inputs[0].name, "_trigger");
        assert_eq!(node.outputs.len(), 1);
    }

    #[test]
    fn test_empty_or_missing_variable_name() {
        let node = Node::get_global(1, "");
        assert_eq!(node.variable_name(), None);

        let bare = Node::new(2, "GetNodeGlobal");
        assert_eq!(bare.variable_name(), None);
    }
}
