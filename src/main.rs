//! globalvars - resolve global variable types in a saved graph
//!
//! Usage: `globalvars <graph.json> [config.json]`
//!
//! Runs one full pass over the graph and prints the type each Set/Get node
//! ends up with, followed by the variable registry as JSON.

use globalvars::constants::node::VALUE_SLOT;
use globalvars::{GlobalsError, NodeGraph, PropagationConfig, VariableSession};
use log::info;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if !(2..=3).contains(&args.len()) {
        let program = args.first().map_or("globalvars", String::as_str);
        eprintln!("Usage: {} <graph.json> [config.json]", program);
        return ExitCode::from(2);
    }

    match run(&args[1], args.get(2).map(String::as_str)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(graph_path: &str, config_path: Option<&str>) -> Result<(), GlobalsError> {
    let config = match config_path {
        Some(path) => PropagationConfig::load(path)?,
        None => PropagationConfig::default(),
    };
    let mut graph = NodeGraph::load(graph_path)?;
    let mut session = VariableSession::new(config)?;

    let report = session.recompute_all(&mut graph);
    info!(
        "Resolved {} set and {} get nodes, {} slots changed",
        report.set_nodes, report.get_nodes, report.slots_changed
    );

    for node in graph.nodes.values().filter(|node| node.is_global_variable_node()) {
        let Some(slot) = node.outputs.get(VALUE_SLOT) else {
            continue;
        };
        println!(
            "#{:<4} {:<14} {:<20} {:<14} label={}",
            node.id,
            node.node_type,
            node.variable_name().unwrap_or("<unnamed>"),
            slot.slot_type,
            slot.label
        );
    }

    println!("{}", serde_json::to_string_pretty(&session.registry().snapshot())?);
    Ok(())
}
