//! Execution prompt rewriting
//!
//! Get nodes have no data link to their Set node, so nothing forces the
//! backend to run the Set node first. Before a prompt is queued, every Get node
//! whose name matches a Set node gets its `_trigger` input wired to that Set
//! node's trigger output.

use crate::constants::node::{GET_NODE_TYPE, SET_NODE_TYPE, TRIGGER_INPUT, TRIGGER_OUTPUT_SLOT, VARIABLE_NAME_WIDGET};
use log::{info, warn};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Wire Get nodes to their Set nodes inside an execution prompt
///
/// Accepts either `{"prompt": {...}}` or the bare prompt map. Returns the
/// number of Get nodes connected; anything that isn't shaped like a prompt is
/// left as it was.
pub fn auto_connect_globals(request: &mut Value) -> usize {
    let prompt = if request.get("prompt").is_some() {
        request.get_mut("prompt")
    } else {
        Some(request)
    };
    let Some(prompt) = prompt.and_then(Value::as_object_mut) else {
        warn!("Prompt is not an object, skipping auto-connect");
        return 0;
    };

    let set_nodes = set_nodes_by_name(prompt);
    let mut connected = 0;
    for (node_id, node) in prompt.iter_mut() {
        if class_type(node) != Some(GET_NODE_TYPE) {
            continue;
        }
        let Some(set_id) = variable_name(node).and_then(|name| set_nodes.get(name)).cloned() else {
            continue;
        };
        let Some(inputs) = node.get_mut("inputs").and_then(Value::as_object_mut) else {
            continue;
        };
        info!("Auto-connect: {} -> {}", set_id, node_id);
        inputs.insert(
            TRIGGER_INPUT.to_string(),
            Value::Array(vec![Value::String(set_id), Value::from(TRIGGER_OUTPUT_SLOT)]),
        );
        connected += 1;
    }
    connected
}

/// Set node id per variable name; the lowest id wins when names repeat
fn set_nodes_by_name(prompt: &Map<String, Value>) -> HashMap<String, String> {
    let mut set_nodes: HashMap<String, String> = HashMap::new();
    for (node_id, node) in prompt {
        if class_type(node) != Some(SET_NODE_TYPE) {
            continue;
        }
        let Some(name) = variable_name(node) else {
            continue;
        };
        set_nodes
            .entry(name.to_string())
            .and_modify(|current| {
                if compare_ids(node_id, current) == Ordering::Less {
                    *current = node_id.clone();
                }
            })
            .or_insert_with(|| node_id.clone());
    }
    set_nodes
}

fn class_type(node: &Value) -> Option<&str> {
    node.get("class_type").and_then(Value::as_str)
}

fn variable_name(node: &Value) -> Option<&str> {
    node.get("inputs")
        .and_then(|inputs| inputs.get(VARIABLE_NAME_WIDGET))
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
}

/// Numeric ids compare as numbers, everything else as text after them
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
