//! Terrain mesh generation

use crate::terrain::Terrain;

/// Renderable terrain geometry covering the whole world extent
#[derive(Debug, Clone)]
pub struct TerrainMesh {
    /// Quads per edge (vertices per edge = segments + 1)
    pub segments: u32,
    /// Vertex positions in world space
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals
    pub normals: Vec<[f32; 3]>,
    /// UV coordinates normalized over the whole terrain
    pub uvs: Vec<[f32; 2]>,
    /// Triangle indices (CCW winding)
    pub indices: Vec<u32>,
    /// AABB minimum corner
    pub aabb_min: [f32; 3],
    /// AABB maximum corner
    pub aabb_max: [f32; 3],
}

impl TerrainMesh {
    /// Build a regular grid over the terrain's world extent and snap it to the
    /// current surface. An unloaded terrain yields a flat plane at y = 0.
    pub fn generate(terrain: &Terrain, segments: u32) -> Self {
        let segments = segments.max(1);
        let verts_per_edge = segments + 1;
        let vert_count = (verts_per_edge * verts_per_edge) as usize;
        let extent = terrain.world_extent();
        let half = extent * 0.5;

        let mut positions = Vec::with_capacity(vert_count);
        let mut uvs = Vec::with_capacity(vert_count);

        for vz in 0..verts_per_edge {
            for vx in 0..verts_per_edge {
                let u = vx as f32 / segments as f32;
                let v = vz as f32 / segments as f32;
                positions.push([u * extent - half, 0.0, v * extent - half]);
                uvs.push([u, v]);
            }
        }

        let index_count = (segments * segments * 6) as usize;
        let mut indices = Vec::with_capacity(index_count);

        for qz in 0..segments {
            for qx in 0..segments {
                let tl = qz * verts_per_edge + qx;
                let tr = tl + 1;
                let bl = tl + verts_per_edge;
                let br = bl + 1;

                indices.extend_from_slice(&[tl, bl, br, tl, br, tr]);
            }
        }

        let mut mesh = Self {
            segments,
            normals: vec![[0.0, 1.0, 0.0]; vert_count],
            positions,
            uvs,
            indices,
            aabb_min: [0.0; 3],
            aabb_max: [0.0; 3],
        };
        mesh.snap_to(terrain);
        mesh
    }

    /// Re-sample every vertex height and normal from the terrain.
    ///
    /// One-time batch pass run when the heightfield arrives after the mesh
    /// was built flat.
    pub fn snap_to(&mut self, terrain: &Terrain) {
        let mut aabb_min = [f32::MAX; 3];
        let mut aabb_max = [f32::MIN; 3];

        for (pos, normal) in self.positions.iter_mut().zip(self.normals.iter_mut()) {
            pos[1] = terrain.elevation_at(pos[0], pos[2]);
            *normal = terrain.normal_at(pos[0], pos[2]).to_array();

            for i in 0..3 {
                aabb_min[i] = aabb_min[i].min(pos[i]);
                aabb_max[i] = aabb_max[i].max(pos[i]);
            }
        }

        self.aabb_min = aabb_min;
        self.aabb_max = aabb_max;
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
