//! Applies a type to a node's output slot

use crate::nodes::{EditorGraph, NodeId, SlotIndex, TypeName};
use crate::theme::TypeColorMap;
use log::debug;

/// Set an output slot's type, label and colors
///
/// A redraw is requested only when the type actually changes, so repeated
/// calls with the same type are cheap. Returns whether the type changed; a
/// missing node or slot is ignored.
pub fn update_slot<G: EditorGraph + ?Sized>(
    graph: &mut G,
    colors: &TypeColorMap,
    node_id: NodeId,
    slot_index: SlotIndex,
    type_name: &TypeName,
) -> bool {
    let previous = {
        let Some(slot) = graph
            .node_mut(node_id)
            .and_then(|node| node.outputs.get_mut(slot_index))
        else {
            return false;
        };

        let color = colors.color_for(type_name);
        slot.label = type_name.label().to_string();
        slot.color_on = Some(color);
        slot.color_off = Some(color);
        std::mem::replace(&mut slot.slot_type, type_name.clone())
    };

    if previous == *type_name {
        return false;
    }
    graph.set_dirty_canvas(node_id);
    debug!("Node {}: {} -> {}", node_id, previous, type_name);
    true
}
