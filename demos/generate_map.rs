//! Example: Generate an island map
//!
//! Usage: `cargo run --example generate_map [SEED]`
//!
//! Set `RUST_LOG=voronoi_island=debug` to see per-pass timings.

use std::env;

use tracing_subscriber::EnvFilter;
use voronoi_island::*;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Voronoi Island Generation Example");
    println!("=================================\n");

    let mut builder = MapConfigBuilder::new()
        .dimensions(600.0, 600.0)
        .unwrap()
        .lloyd_iterations(2)
        .unwrap();
    if let Some(seed) = env::args().nth(1) {
        builder = builder.seed(seed);
    }
    let config = builder.build().unwrap();

    println!("Configuration:");
    println!("  Seed: {}", config.seed);
    println!("  Size: {} x {}", config.width, config.height);
    println!("  Point spacing: {}", config.point_spacing);
    println!("  Lloyd iterations: {}", config.lloyd_iterations);
    println!();

    println!("Generating island...");
    let map = match IslandMap::generate(config) {
        Ok(map) => map,
        Err(e) => {
            eprintln!("Generation failed: {e}");
            std::process::exit(1);
        }
    };

    let land = map.centers().iter().filter(|c| !c.water).count();
    let lakes = map.centers().iter().filter(|c| c.water && !c.ocean).count();
    let river_edges = map.edges().iter().filter(|e| e.river_volume > 0.0).count();

    println!("Statistics:");
    println!("  Centers: {}", map.center_count());
    println!("  Corners: {}", map.corners().len());
    println!("  Edges: {}", map.edges().len());
    println!("  Land: {land}, lake: {lakes}");
    println!("  River edges: {river_edges}");
    println!();

    println!("Biomes:");
    for biome in Biome::ALL {
        let count = map.centers().iter().filter(|c| c.biome == Some(biome)).count();
        if count > 0 {
            println!("  {:<28} {count}", biome.name());
        }
    }
    println!();

    let stats = map.index_stats();
    println!(
        "Spatial index: {} nodes, {} leaves, depth {}",
        stats.node_count, stats.leaf_count, stats.max_depth
    );

    let probe = map.bounds().center();
    if let Some(center) = map.center_at(probe) {
        println!(
            "Center at ({:.0}, {:.0}): #{} {:?}, elevation {:.2}, moisture {:.2}",
            probe.x,
            probe.y,
            center.id.index(),
            center.biome,
            center.elevation,
            center.moisture
        );
    }

    println!("\nGeneration complete!");
}
