//! Trailhead Terrain - Heightfield-based terrain
//!
//! Provides `.raw`/PNG heightmap ingestion, nearest-sample elevation and
//! finite-difference normal queries, the loaded-or-not `Terrain` sampler the
//! simulation consults every frame, and snapped mesh generation for the
//! renderer. Does not depend on any renderer: meshes are raw vertex data.

pub mod heightfield;
pub mod mesh;
pub mod terrain;

pub use heightfield::{elevation, HeightField, HeightStats, HEIGHT_FLOOR, HEIGHT_RANGE};
pub use mesh::TerrainMesh;
pub use terrain::Terrain;
