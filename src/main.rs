//! Wiregraph - headless driver for the graph engine
//!
//! Loads a graph document if one is given on the command line, otherwise
//! builds the built-in demo pipeline, then reports stats and persists the
//! result. Demonstrates the wiring a host (GUI or scripting shell) sets up:
//! controller + template provider + autosave observer on the change bus.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use wiregraph::{AutosaveObserver, GraphController, TemplateRegistry};

fn autosave_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wiregraph")
        .join(wiregraph::constants::autosave::DEFAULT_FILENAME)
}

fn build_demo_pipeline(controller: &mut GraphController) {
    controller.batch(|controller| {
        let source = controller.create_node("SOURCE", 0.0, 0.0).expect("built-in type");
        let split = controller.create_node("SPLIT", 150.0, 0.0).expect("built-in type");
        let upper = controller.create_node("TRANSFORM", 300.0, -60.0).expect("built-in type");
        let lower = controller.create_node("TRANSFORM", 300.0, 60.0).expect("built-in type");
        let merge = controller.create_node("MERGE", 450.0, 0.0).expect("built-in type");
        let sink = controller.create_node("SINK", 600.0, 0.0).expect("built-in type");

        controller.connect_nodes(source, 0, split, 0).expect("valid connection");
        controller.connect_nodes(split, 1, upper, 0).expect("valid connection");
        controller.connect_nodes(split, 2, lower, 0).expect("valid connection");
        controller.connect_nodes(upper, 1, merge, 0).expect("valid connection");
        controller.connect_nodes(lower, 1, merge, 1).expect("valid connection");
        controller.connect_nodes(merge, 2, sink, 0).expect("valid connection");
    });
}

fn main() {
    env_logger::init();

    let mut controller = GraphController::new(TemplateRegistry::with_builtins());

    let autosave_target = autosave_path();
    if let Some(parent) = autosave_target.parent() {
        if let Err(err) = std::fs::create_dir_all(parent) {
            log::warn!("could not create {}: {}", parent.display(), err);
        }
    }
    let autosave = Rc::new(RefCell::new(AutosaveObserver::new(&autosave_target)));
    controller.attach_observer(autosave.clone());

    let path = std::env::args().nth(1).map(PathBuf::from);
    match &path {
        Some(path) if path.exists() => match controller.load_from_file(path) {
            Ok(()) => log::info!("loaded {}", path.display()),
            Err(err) => {
                log::error!("load failed, starting empty: {}", err);
                build_demo_pipeline(&mut controller);
            }
        },
        _ => build_demo_pipeline(&mut controller),
    }

    let stats = controller.stats();
    println!(
        "graph: {} nodes, {} edges, {} sockets ({} unconnected)",
        stats.node_count,
        stats.edge_count,
        stats.socket_count,
        stats.unconnected_sockets()
    );
    println!("node types: {}", controller.available_node_types().join(", "));

    let out = path.unwrap_or_else(|| PathBuf::from("graph.json"));
    match controller.save_to_file(&out) {
        Ok(()) => println!("saved to {}", out.display()),
        Err(err) => eprintln!("save failed: {}", err),
    }

    // Teardown: persist anything the debounce window still holds
    autosave.borrow_mut().flush(controller.graph());
}
