//! Polygonal island map generation
//!
//! Builds a procedural island over a Voronoi/Delaunay dual graph: blue-noise
//! sites are triangulated, converted into polygon cells (centers), polygon
//! vertices (corners) and the edges between them, and then run through a
//! fixed pipeline of terrain passes (land and ocean, elevation, rivers,
//! moisture, biomes).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use voronoi_island::*;
//!
//! // Generate a map
//! let config = MapConfigBuilder::new()
//!     .seed("TEST")
//!     .dimensions(800.0, 600.0).unwrap()
//!     .lloyd_iterations(2).unwrap()
//!     .build().unwrap();
//!
//! let map = IslandMap::generate(config).unwrap();
//!
//! // Which cell is under the cursor?
//! if let Some(center) = map.center_at(DVec2::new(400.0, 300.0)) {
//!     println!("{:?} at elevation {:.2}", center.biome, center.elevation);
//! }
//! ```
//!
//! # Features
//!
//! - `serde`: Enables serialization support for configuration, graph and biomes

// Modules
pub mod error;
pub mod config;
pub mod graph;
pub mod generation;
pub mod terrain;
pub mod spatial;
pub mod map;

// Re-export core types for convenience
pub use error::{MapError, Result};
pub use config::{MapConfig, MapConfigBuilder};
pub use graph::{Center, CenterId, Corner, CornerId, Edge, EdgeId, Graph, Rect};
pub use map::IslandMap;
pub use terrain::{Biome, IslandShape, PerlinIsland, SquareIsland, TerrainSimulator};
pub use spatial::{QuadTree, QuadTreeStats};
pub use generation::LloydOptions;

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
