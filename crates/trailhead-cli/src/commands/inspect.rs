//! Heightmap inspection command

use std::path::Path;

use anyhow::{Context, Result};
use trailhead_core::SimConfig;
use trailhead_terrain::{Terrain, TerrainMesh};

use super::load_heightmap;

pub fn run(heightmap: &Path, dimension: Option<usize>, config: Option<&Path>) -> Result<()> {
    let config = SimConfig::load(config).context("Failed to load config")?;
    let field = load_heightmap(heightmap, dimension)
        .with_context(|| format!("Failed to load heightmap '{}'", heightmap.display()))?;

    let dim = field.dimension();
    let stats = field.stats();
    println!("Heightmap: {}", heightmap.display());
    println!("  Dimension:  {dim}x{dim} ({} samples)", dim * dim);
    println!(
        "  Elevation:  min {:.3}  max {:.3}  mean {:.3}",
        stats.min, stats.max, stats.mean
    );

    let mut terrain = Terrain::new(&config.terrain);
    terrain.publish(field);
    let mesh = TerrainMesh::generate(&terrain, config.terrain.mesh_segments);
    println!(
        "  Extent:     {} x {} world units",
        terrain.world_extent(),
        terrain.world_extent()
    );
    println!(
        "  Mesh:       {} vertices, {} triangles ({} segments)",
        mesh.vertex_count(),
        mesh.triangle_count(),
        mesh.segments
    );
    println!(
        "  Bounds:     [{:.2}, {:.2}, {:.2}] .. [{:.2}, {:.2}, {:.2}]",
        mesh.aabb_min[0],
        mesh.aabb_min[1],
        mesh.aabb_min[2],
        mesh.aabb_max[0],
        mesh.aabb_max[1],
        mesh.aabb_max[2]
    );
    Ok(())
}
