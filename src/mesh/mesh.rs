//! Indexed triangle mesh container

use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Half-open range of the index buffer holding one level of detail
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LodRecord {
    pub begin_index: u32,
    pub end_index: u32,
}

/// Indexed triangle mesh with vertices of type `T`.
///
/// Vertex positions are relative to `offset`, the lower corner of the region
/// the mesh was extracted from; consumers recover world positions by adding
/// it back. Indices come in multiples of three, one triangle each.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mesh<T> {
    pub vertices: Vec<T>,
    pub indices: Vec<u32>,
    pub offset: IVec3,
    pub lod_records: Vec<LodRecord>,
}

impl<T> Mesh<T> {
    /// Create an empty mesh at the origin
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            offset: IVec3::ZERO,
            lod_records: Vec::new(),
        }
    }

    /// Remove all geometry and reset the offset
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.offset = IVec3::ZERO;
        self.lod_records.clear();
    }

    /// True when the mesh holds no triangles
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex by index
    pub fn vertex(&self, index: u32) -> &T {
        &self.vertices[index as usize]
    }

    /// Append a vertex, returning its index
    pub fn add_vertex(&mut self, vertex: T) -> u32 {
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as u32
    }

    /// Append one triangle
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Drop every triangle whose three indices are not pairwise distinct
    pub fn remove_degenerate_triangles(&mut self) {
        let mut write = 0;
        for tri in 0..self.indices.len() / 3 {
            let base = tri * 3;
            let (i0, i1, i2) = (
                self.indices[base],
                self.indices[base + 1],
                self.indices[base + 2],
            );
            if i0 != i1 && i1 != i2 && i2 != i0 {
                self.indices[write] = i0;
                self.indices[write + 1] = i1;
                self.indices[write + 2] = i2;
                write += 3;
            }
        }
        self.indices.truncate(write);
    }

    /// Compact the vertex table down to the vertices the index buffer
    /// references, preserving order of first appearance, and rewrite the
    /// indices accordingly
    pub fn remove_unused_vertices(&mut self) {
        let mut used = vec![false; self.vertices.len()];
        for &index in &self.indices {
            used[index as usize] = true;
        }

        let mut remap = vec![0u32; self.vertices.len()];
        let mut write = 0;
        for read in 0..self.vertices.len() {
            if used[read] {
                self.vertices.swap(write, read);
                remap[read] = write as u32;
                write += 1;
            }
        }
        self.vertices.truncate(write);

        for index in &mut self.indices {
            *index = remap[*index as usize];
        }
    }
}

impl<T> Default for Mesh<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::vertex::CubicVertex;
    use crate::voxel::voxel::Voxel;

    fn mesh_with_vertices(count: u8) -> Mesh<u8> {
        let mut mesh = Mesh::new();
        for v in 0..count {
            mesh.add_vertex(v);
        }
        mesh
    }

    #[test]
    fn test_add_and_counts() {
        let mut mesh = mesh_with_vertices(3);
        mesh.add_triangle(0, 1, 2);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.index_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.is_empty());

        mesh.clear();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
    }

    #[test]
    fn test_remove_degenerate_triangles() {
        let mut mesh = mesh_with_vertices(5);
        mesh.add_triangle(0, 1, 2);
        mesh.add_triangle(3, 3, 4);
        mesh.add_triangle(2, 1, 2);
        mesh.add_triangle(2, 3, 4);
        mesh.remove_degenerate_triangles();
        assert_eq!(mesh.indices, vec![0, 1, 2, 2, 3, 4]);
    }

    #[test]
    fn test_remove_unused_preserves_first_appearance_order() {
        let mut mesh = mesh_with_vertices(6);
        // Vertices 0, 2 and 5 are never referenced
        mesh.add_triangle(3, 1, 4);
        mesh.remove_unused_vertices();
        assert_eq!(mesh.vertices, vec![1, 3, 4]);
        assert_eq!(mesh.indices, vec![1, 0, 2]);
    }

    #[test]
    fn test_remove_unused_on_fully_used_mesh_is_noop() {
        let mut mesh = mesh_with_vertices(3);
        mesh.add_triangle(0, 1, 2);
        mesh.remove_unused_vertices();
        assert_eq!(mesh.vertices, vec![0, 1, 2]);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut mesh: Mesh<CubicVertex<Voxel>> = Mesh::new();
        let a = mesh.add_vertex(CubicVertex {
            encoded_position: [0, 0, 0],
            data: Voxel::new(10, 20, 30, 1),
            ambient_occlusion: 3,
        });
        let b = mesh.add_vertex(CubicVertex {
            encoded_position: [1, 0, 0],
            data: Voxel::new(10, 20, 30, 1),
            ambient_occlusion: 2,
        });
        let c = mesh.add_vertex(CubicVertex {
            encoded_position: [0, 1, 0],
            data: Voxel::new(10, 20, 30, 1),
            ambient_occlusion: 3,
        });
        mesh.add_triangle(a, b, c);
        mesh.offset = IVec3::new(16, -16, 0);
        mesh.lod_records = vec![LodRecord {
            begin_index: 0,
            end_index: 3,
        }];

        let json = serde_json::to_string(&mesh).unwrap();
        let back: Mesh<CubicVertex<Voxel>> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mesh);
    }
}
