// Demonstration: learn policy tables for a small floor plan, persist them and
// assemble an interest-biased route.
//
// Run from the repo root:
//   RUST_LOG=info cargo run --example build_and_route -- --algorithm sarsa --interests food,tech --max 2

use std::env;
use std::process;

use qroute::algorithms::rl::{Algorithm, LearningConfig};
use qroute::graph::{EdgeRecord, Graph, VertexRecord};
use qroute::policy_table::{CsvDirStore, PolicyTableBuilder};
use qroute::routing::{RouteAssembler, RouteQuery};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args: Vec<String> = env::args().collect();
    let algorithm: Algorithm = arg_value(&args, "--algorithm")
        .unwrap_or("qlearning")
        .parse()
        .unwrap_or_else(|e| {
            eprintln!("{}", e);
            process::exit(2);
        });
    let seed: u64 = arg_value(&args, "--seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let start: u32 = arg_value(&args, "--start")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let goal: u32 = arg_value(&args, "--goal")
        .and_then(|s| s.parse().ok())
        .unwrap_or(9);
    let interests = RouteQuery::parse_interests(arg_value(&args, "--interests").unwrap_or("food"));
    let max_waypoints: Option<usize> = arg_value(&args, "--max").and_then(|s| s.parse().ok());

    let graph = floor_plan();
    println!(
        "Floor plan: {} vertices, {} directed edges, categories {:?}",
        graph.vertex_count(),
        graph.edge_count(),
        graph.categories()
    );

    let dir = tempfile::tempdir().expect("temporary directory");
    let mut store = CsvDirStore::new(dir.path());
    let report = PolicyTableBuilder::new(LearningConfig::default(), algorithm)
        .with_seed(seed)
        .build_into(&graph, &mut store)
        .expect("policy table build");
    println!(
        "Run {}: {} tables, non-converged {:?}, failures {}, unsaved {}",
        report.run_id,
        report.tables.len(),
        report.non_converged(),
        report.failures.len(),
        report.save_failures.len()
    );

    let tables = store.load_all(algorithm).expect("stored tables");
    let mut query = RouteQuery::new(start, goal)
        .with_algorithm(algorithm)
        .with_interests(interests);
    query.max_waypoints = max_waypoints;

    match RouteAssembler::new(&graph, &tables).route(&query) {
        Ok(route) => {
            println!("Route: {}", route);
            println!("Waypoints: {:?}", route.waypoints);
            if !route.incidental.is_empty() {
                println!("Passed by: {:?}", route.incidental);
            }
        }
        Err(e) => {
            eprintln!("Routing failed: {}", e);
            process::exit(1);
        }
    }
}

/// A corridor of shops between the entrance (0) and the exit (9).
fn floor_plan() -> Graph {
    let vertex = |id: u32, name: &str, category: &str, x: f64, y: f64| VertexRecord {
        id,
        name: name.to_string(),
        category: Some(category.to_string()),
        x: Some(x),
        y: Some(y),
    };
    let vertices = vec![
        vertex(0, "Entrance", "", 0.0, 0.0),
        vertex(1, "Hall A", "", 10.0, 0.0),
        vertex(2, "Burger Place", "Food", 10.0, 8.0),
        vertex(3, "Phone Store", "Tech", 10.0, -8.0),
        vertex(4, "Hall B", "", 25.0, 0.0),
        vertex(5, "Coffee Bar", "Drink", 25.0, 8.0),
        vertex(6, "Game Shop", "Games", 25.0, -8.0),
        vertex(7, "Hall C", "", 40.0, 0.0),
        vertex(8, "Noodle House", "Food", 40.0, 8.0),
        vertex(9, "Exit", "", 50.0, 0.0),
    ];
    let edge = |start: u32, end: u32, weight: f64| EdgeRecord { start, end, weight };
    let edges = vec![
        edge(0, 1, 10.0),
        edge(1, 2, 8.0),
        edge(1, 3, 8.0),
        edge(1, 4, 15.0),
        edge(4, 5, 8.0),
        edge(4, 6, 8.0),
        edge(4, 7, 15.0),
        edge(7, 8, 8.0),
        edge(7, 9, 10.0),
    ];
    Graph::from_records(vertices, edges).expect("valid floor plan")
}

fn arg_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
