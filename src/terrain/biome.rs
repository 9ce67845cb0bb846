//! Biome classification
//!
//! Water and beach cells are decided by their flags; every other cell is
//! looked up in a Whittaker-style table indexed by moisture and elevation.

use crate::graph::{Center, Graph};

/// Biome of a map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Biome {
    Snow,
    Tundra,
    Mountain,
    Taiga,
    Shrubland,
    TemperateDesert,
    TemperateRainForest,
    TemperateDeciduousForest,
    Grassland,
    TropicalRainForest,
    TropicalSeasonalForest,
    SubtropicalDesert,
    Ocean,
    Lake,
    Beach,
}

impl Biome {
    /// Every biome, in declaration order
    pub const ALL: [Biome; 15] = [
        Biome::Snow,
        Biome::Tundra,
        Biome::Mountain,
        Biome::Taiga,
        Biome::Shrubland,
        Biome::TemperateDesert,
        Biome::TemperateRainForest,
        Biome::TemperateDeciduousForest,
        Biome::Grassland,
        Biome::TropicalRainForest,
        Biome::TropicalSeasonalForest,
        Biome::SubtropicalDesert,
        Biome::Ocean,
        Biome::Lake,
        Biome::Beach,
    ];

    /// Check if this biome is a body of water
    pub fn is_water(&self) -> bool {
        matches!(self, Biome::Ocean | Biome::Lake)
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Biome::Snow => "Snow",
            Biome::Tundra => "Tundra",
            Biome::Mountain => "Mountain",
            Biome::Taiga => "Taiga",
            Biome::Shrubland => "Shrubland",
            Biome::TemperateDesert => "Temperate Desert",
            Biome::TemperateRainForest => "Temperate Rain Forest",
            Biome::TemperateDeciduousForest => "Temperate Deciduous Forest",
            Biome::Grassland => "Grassland",
            Biome::TropicalRainForest => "Tropical Rain Forest",
            Biome::TropicalSeasonalForest => "Tropical Seasonal Forest",
            Biome::SubtropicalDesert => "Subtropical Desert",
            Biome::Ocean => "Ocean",
            Biome::Lake => "Lake",
            Biome::Beach => "Beach",
        }
    }
}

impl std::fmt::Display for Biome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Coastal cells drier than this are beach
pub const BEACH_MOISTURE: f64 = 0.6;

/// Lower bounds of elevation bands 1, 2 and 3
pub const ELEVATION_BANDS: [f64; 3] = [0.3, 0.6, 0.85];

const MOISTURE_BANDS: usize = 6;

/// [moisture band][elevation band], driest and lowest first
pub const BIOME_TABLE: [[Biome; 4]; MOISTURE_BANDS] = {
    use Biome::*;
    [
        [SubtropicalDesert, TemperateDesert, TemperateDesert, Mountain],
        [Grassland, Grassland, TemperateDesert, Mountain],
        [TropicalSeasonalForest, Grassland, Shrubland, Tundra],
        [TropicalSeasonalForest, TemperateDeciduousForest, Shrubland, Snow],
        [TropicalRainForest, TemperateDeciduousForest, Taiga, Snow],
        [TropicalRainForest, TemperateRainForest, Taiga, Snow],
    ]
};

fn elevation_band(elevation: f64) -> usize {
    ELEVATION_BANDS.iter().filter(|&&t| elevation > t).count()
}

fn moisture_band(moisture: f64) -> usize {
    ((moisture * MOISTURE_BANDS as f64).floor().max(0.0) as usize).min(MOISTURE_BANDS - 1)
}

/// Land biome for an elevation/moisture pair
pub fn lookup(elevation: f64, moisture: f64) -> Biome {
    BIOME_TABLE[moisture_band(moisture)][elevation_band(elevation)]
}

/// Biome of a fully simulated center
pub fn classify(center: &Center) -> Biome {
    if center.ocean {
        Biome::Ocean
    } else if center.water {
        Biome::Lake
    } else if center.coast && center.moisture < BEACH_MOISTURE {
        Biome::Beach
    } else {
        lookup(center.elevation, center.moisture)
    }
}

/// Assign a biome to every center
pub fn assign_biomes(graph: &mut Graph) {
    for center in graph.centers_mut() {
        center.biome = Some(classify(center));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CenterId;
    use glam::DVec2;

    fn center(elevation: f64, moisture: f64) -> Center {
        let mut c = Center::new(CenterId(0), DVec2::ZERO);
        c.elevation = elevation;
        c.moisture = moisture;
        c
    }

    #[test]
    fn test_water_flags_win() {
        let mut c = center(0.9, 0.1);
        c.ocean = true;
        c.water = true;
        c.coast = true;
        assert_eq!(classify(&c), Biome::Ocean);

        c.ocean = false;
        assert_eq!(classify(&c), Biome::Lake);
    }

    #[test]
    fn test_beach() {
        let mut c = center(0.1, 0.59);
        c.coast = true;
        assert_eq!(classify(&c), Biome::Beach);

        c.moisture = 0.6;
        assert_eq!(classify(&c), Biome::TropicalSeasonalForest);
    }

    #[test]
    fn test_elevation_bands() {
        assert_eq!(elevation_band(0.0), 0);
        assert_eq!(elevation_band(0.3), 0);
        assert_eq!(elevation_band(0.31), 1);
        assert_eq!(elevation_band(0.6), 1);
        assert_eq!(elevation_band(0.7), 2);
        assert_eq!(elevation_band(0.86), 3);
        assert_eq!(elevation_band(1.0), 3);
    }

    #[test]
    fn test_moisture_bands() {
        assert_eq!(moisture_band(0.0), 0);
        assert_eq!(moisture_band(0.17), 1);
        assert_eq!(moisture_band(0.5), 3);
        assert_eq!(moisture_band(0.99), 5);
        assert_eq!(moisture_band(1.0), 5);
        assert_eq!(moisture_band(-0.1), 0);
    }

    #[test]
    fn test_table_lookup() {
        assert_eq!(lookup(0.1, 0.05), Biome::SubtropicalDesert);
        assert_eq!(lookup(0.95, 0.05), Biome::Mountain);
        assert_eq!(lookup(0.95, 0.95), Biome::Snow);
        assert_eq!(lookup(0.7, 0.7), Biome::Taiga);
        assert_eq!(lookup(0.4, 0.95), Biome::TemperateRainForest);
        assert_eq!(lookup(0.1, 0.95), Biome::TropicalRainForest);
    }

    #[test]
    fn test_table_has_no_water() {
        for row in BIOME_TABLE {
            for biome in row {
                assert!(!biome.is_water());
                assert_ne!(biome, Biome::Beach);
            }
        }
    }

    #[test]
    fn test_biome_helpers() {
        assert_eq!(Biome::ALL.len(), 15);
        assert!(Biome::Ocean.is_water());
        assert!(Biome::Lake.is_water());
        assert!(!Biome::Beach.is_water());
        assert_eq!(Biome::TemperateRainForest.to_string(), "Temperate Rain Forest");
        for pair in Biome::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_assign_biomes() {
        let mut graph = Graph::new();
        let a = graph.add_center(DVec2::ZERO);
        let b = graph.add_center(DVec2::ONE);
        graph[a].ocean = true;
        graph[a].water = true;
        graph[b].elevation = 0.5;
        graph[b].moisture = 0.4;

        assert!(graph[a].biome.is_none());
        assert_biomes(&mut graph);
        assert_eq!(graph[a].biome, Some(Biome::Ocean));
        assert_eq!(graph[b].biome, Some(Biome::Grassland));
    }

    fn assert_biomes(graph: &mut Graph) {
        assign_biomes(graph);
        assert!(graph.centers().iter().all(|c| c.biome.is_some()));
    }
}
