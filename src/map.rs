//! IslandMap main structure

use std::time::Instant;

use glam::DVec2;
use rand::Rng;
use rustc_hash::FxHashSet;
use tracing::info;

use crate::config::MapConfig;
use crate::error::Result;
use crate::generation::generate_graph;
use crate::graph::{Center, CenterId, Corner, Edge, Graph, Rect};
use crate::spatial::{depth_for, QuadTree, QuadTreeStats};
use crate::terrain::{IslandShape, PerlinIsland, TerrainSimulator};

/// Objects per quadtree node before it splits
const INDEX_BUCKET_SIZE: usize = 1;

/// A fully generated polygon island
///
/// Owns the center/corner/edge graph and a spatial index over the center
/// polygons. Nothing is mutated after generation, so a map can be shared
/// freely behind a plain reference.
///
/// # Examples
///
/// ```
/// use voronoi_island::*;
///
/// let config = MapConfigBuilder::new()
///     .seed("ISLAND")
///     .dimensions(200.0, 200.0)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let map = IslandMap::generate(config).unwrap();
/// println!("Generated {} centers", map.center_count());
///
/// if let Some(center) = map.center_at(DVec2::new(100.0, 100.0)) {
///     println!("Center of the map is {:?}", center.biome);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct IslandMap {
    /// Configuration used to generate this map
    config: MapConfig,

    graph: Graph,

    /// Centers keyed by the bounding box of their polygon
    index: QuadTree<CenterId>,
}

impl IslandMap {
    /// Generate a map with the default Perlin island shape
    ///
    /// The first value drawn from the seeded generator places the island in
    /// the noise volume, so the seed alone fixes the whole map.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` for an invalid configuration, or
    /// `InconsistentGraph` if the generated graph is malformed.
    pub fn generate(config: MapConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = config.rng();
        let shape = PerlinIsland::from_rng(config.width, config.height, &mut rng);
        Self::build(config, &shape, &mut rng)
    }

    /// Generate a map with a custom island shape
    ///
    /// # Example
    ///
    /// ```
    /// use voronoi_island::*;
    ///
    /// let config = MapConfigBuilder::new()
    ///     .seed("HALF")
    ///     .dimensions(100.0, 100.0)
    ///     .unwrap()
    ///     .build()
    ///     .unwrap();
    ///
    /// // Land only on the left half
    /// let shape = |p: DVec2| p.x < 50.0;
    /// let map = IslandMap::generate_with_shape(config, &shape).unwrap();
    /// assert!(map.centers().iter().any(|c| c.ocean));
    /// ```
    pub fn generate_with_shape<S>(config: MapConfig, shape: &S) -> Result<Self>
    where
        S: IslandShape + ?Sized,
    {
        config.validate()?;
        let mut rng = config.rng();
        Self::build(config, shape, &mut rng)
    }

    fn build<S, R>(config: MapConfig, shape: &S, rng: &mut R) -> Result<Self>
    where
        S: IslandShape + ?Sized,
        R: Rng + ?Sized,
    {
        let start = Instant::now();
        let bounds = Rect::from_size(config.width, config.height);

        let mut graph = generate_graph(&config, rng)?;
        TerrainSimulator::new(bounds).run(&mut graph, shape, rng)?;

        let mut index = QuadTree::new(
            bounds,
            INDEX_BUCKET_SIZE,
            depth_for(config.expected_center_count()),
        );
        for center in graph.centers() {
            index.insert(graph.center_bounds(center.id), center.id);
        }

        info!(
            seed = %config.seed,
            centers = graph.centers().len(),
            corners = graph.corners().len(),
            edges = graph.edges().len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "generated island map"
        );

        Ok(Self {
            config,
            graph,
            index,
        })
    }

    #[inline]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Seed the map was generated from (randomly created if none was given)
    #[inline]
    pub fn seed(&self) -> &str {
        &self.config.seed
    }

    /// Map rectangle
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.config.width, self.config.height)
    }

    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[inline]
    pub fn centers(&self) -> &[Center] {
        self.graph.centers()
    }

    #[inline]
    pub fn corners(&self) -> &[Corner] {
        self.graph.corners()
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        self.graph.edges()
    }

    #[inline]
    pub fn center_count(&self) -> usize {
        self.graph.centers().len()
    }

    /// Get a center by id, `None` if out of range
    #[inline]
    pub fn get_center(&self, id: CenterId) -> Option<&Center> {
        self.graph.center(id)
    }

    /// Find the center whose polygon contains `position`
    ///
    /// Candidates come from the spatial index. Among those whose polygon
    /// contains the point the nearest site wins; if none does (round-off on
    /// a shared boundary) the nearest candidate is returned. `None` if the
    /// point lies outside every indexed polygon box.
    pub fn center_at(&self, position: DVec2) -> Option<&Center> {
        let distance = |id: CenterId| self.graph[id].position.distance_squared(position);
        let nearest = |ids: Vec<CenterId>| {
            ids.into_iter()
                .min_by(|&a, &b| distance(a).total_cmp(&distance(b)))
        };

        let candidates: Vec<CenterId> = self.index.query_point(position).into_iter().copied().collect();
        let containing: Vec<CenterId> = candidates
            .iter()
            .copied()
            .filter(|&id| self.graph.center_contains(id, position))
            .collect();

        let id = nearest(containing).or_else(|| nearest(candidates))?;
        self.graph.center(id)
    }

    /// Find centers within a given hop count from a center (BFS)
    ///
    /// Includes `center` itself, sorted by id. Returns an empty vec if
    /// `center` is invalid.
    pub fn centers_within_hops(&self, center: CenterId, hops: usize) -> Vec<CenterId> {
        if self.graph.center(center).is_none() {
            return vec![];
        }

        let mut visited = FxHashSet::default();
        let mut current = vec![center];
        visited.insert(center);

        for _ in 0..hops {
            let mut next = Vec::new();
            for &id in &current {
                for &neighbor in &self.graph[id].neighbors {
                    if visited.insert(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
            current = next;
        }

        let mut found: Vec<CenterId> = visited.into_iter().collect();
        found.sort_unstable();
        found
    }

    /// Shape statistics of the spatial index
    pub fn index_stats(&self) -> QuadTreeStats {
        self.index.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfigBuilder;
    use crate::terrain::Biome;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_map(seed: &str) -> IslandMap {
        let config = MapConfigBuilder::new()
            .seed(seed)
            .dimensions(100.0, 100.0)
            .unwrap()
            .point_spacing(10.0)
            .unwrap()
            .build()
            .unwrap();
        IslandMap::generate(config).unwrap()
    }

    #[test]
    fn test_end_to_end() {
        let map = small_map("TEST");

        assert!(map.center_count() > 0);
        assert!(!map.corners().is_empty());
        assert!(!map.edges().is_empty());
        assert_eq!(map.seed(), "TEST");

        assert!(map.centers().iter().any(|c| c.ocean && c.border));
        for center in map.centers() {
            let biome = center.biome.expect("every center is classified");
            assert!(Biome::ALL.contains(&biome));
        }
    }

    #[test]
    fn test_determinism() {
        let a = small_map("same seed");
        let b = small_map("same seed");

        assert_eq!(a.center_count(), b.center_count());
        for (p, q) in a.centers().iter().zip(b.centers()) {
            assert_eq!(p.position, q.position);
            assert_eq!(p.biome, q.biome);
            assert_eq!((p.water, p.ocean, p.coast, p.border), (q.water, q.ocean, q.coast, q.border));
            assert_eq!(p.elevation, q.elevation);
            assert_eq!(p.moisture, q.moisture);
        }
        for (e, f) in a.edges().iter().zip(b.edges()) {
            assert_eq!(e.river_volume, f.river_volume);
        }
    }

    #[test]
    fn test_random_seed_reported() {
        let config = MapConfigBuilder::new()
            .dimensions(60.0, 60.0)
            .unwrap()
            .build()
            .unwrap();
        let map = IslandMap::generate(config).unwrap();
        assert_eq!(map.seed().len(), crate::config::GENERATED_SEED_LENGTH);
    }

    #[test]
    fn test_get_center() {
        let map = small_map("get");
        assert!(map.get_center(CenterId(0)).is_some());
        assert!(map.get_center(CenterId(map.center_count())).is_none());
    }

    #[test]
    fn test_center_at_own_site() {
        let map = small_map("sites");
        let bounds = map.bounds();
        for center in map.centers().iter().filter(|c| c.is_inside(&bounds)) {
            let found = map.center_at(center.position).unwrap();
            assert_eq!(found.id, center.id);
        }
    }

    #[test]
    fn test_center_at_is_nearest_site() {
        let map = small_map("nearest");
        let mut rng = ChaCha8Rng::seed_from_u64(17);

        for _ in 0..50 {
            let p = DVec2::new(rng.gen_range(1.0..99.0), rng.gen_range(1.0..99.0));
            let expected = map
                .centers()
                .iter()
                .min_by(|a, b| {
                    a.position
                        .distance_squared(p)
                        .total_cmp(&b.position.distance_squared(p))
                })
                .unwrap();
            assert_eq!(map.center_at(p).unwrap().id, expected.id);
        }
    }

    #[test]
    fn test_center_at_outside_map() {
        let map = small_map("outside");
        assert!(map.center_at(DVec2::new(-500.0, 50.0)).is_none());
        assert!(map.center_at(DVec2::new(50.0, 1000.0)).is_none());
    }

    #[test]
    fn test_centers_within_hops() {
        let map = small_map("hops");
        let start = map
            .centers()
            .iter()
            .find(|c| c.is_inside(&map.bounds()))
            .unwrap()
            .id;

        assert_eq!(map.centers_within_hops(start, 0), vec![start]);

        let one = map.centers_within_hops(start, 1);
        assert_eq!(one.len(), map.graph()[start].neighbors.len() + 1);
        for id in &map.graph()[start].neighbors {
            assert!(one.contains(id));
        }

        let two = map.centers_within_hops(start, 2);
        assert!(two.len() > one.len());
        assert!(one.iter().all(|id| two.contains(id)));

        assert!(map.centers_within_hops(CenterId(usize::MAX), 3).is_empty());
    }

    #[test]
    fn test_index_covers_map_centers() {
        let map = small_map("index");
        let stats = map.index_stats();
        let inside = map.centers().iter().filter(|c| c.is_inside(&map.bounds())).count();
        assert!(stats.object_count >= inside);
        assert!(stats.object_count <= map.center_count());
        assert!(stats.max_depth <= depth_for(map.config().expected_center_count()));
    }

    #[test]
    fn test_custom_shape() {
        let config = MapConfigBuilder::new()
            .seed("land")
            .dimensions(100.0, 100.0)
            .unwrap()
            .build()
            .unwrap();
        let map = IslandMap::generate_with_shape(config, &|_: DVec2| true).unwrap();

        let bounds = map.bounds();
        for center in map.centers().iter().filter(|c| c.is_inside(&bounds)) {
            assert!(center.border || !center.water);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MapConfig {
            width: -1.0,
            ..MapConfig::default()
        };
        assert!(IslandMap::generate(config).is_err());
    }
}
