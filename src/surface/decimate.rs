//! Edge-collapse mesh simplification
//!
//! Reduces extractor output in place over repeated passes. A collapse moves
//! one vertex onto a neighbour and rewrites the triangles that referenced
//! it; eligibility is constrained so material boundaries keep their shape,
//! region seams stay watertight against independently decimated neighbours,
//! and no face flips over.

use glam::Vec3;

use crate::math::Region;
use crate::mesh::mesh::{LodRecord, Mesh};
use crate::mesh::vertex::{decode_position, CubicVertex, Vertex};

/// Default minimum normal agreement between collapse endpoints
pub const DEFAULT_NORMAL_THRESHOLD: f32 = 0.999;

/// Agreement required when an endpoint sits on a geometric edge. Kept
/// independent of the caller's threshold: adjacent regions must make the
/// same collapse decisions along their shared seam or cracks open.
const EDGE_NORMAL_THRESHOLD: f32 = 0.999;

/// A collapse may rotate a surviving face by at most acos of this
const FACE_FLIP_THRESHOLD: f32 = 0.9;

/// Components of a summed face normal below this count as zero
const NORMAL_AXIS_EPSILON: f32 = 0.001;

/// Squared distance under which two vertices are positional duplicates
const DUPLICATE_DISTANCE_SQUARED: f32 = 1e-3;

/// Vertex annotations consulted by the decimator
pub mod collapse_flags {
    /// Vertex lies on a boundary between two materials
    pub const MATERIAL_EDGE: u8 = 1 << 0;
    pub const NEGATIVE_X_FACE: u8 = 1 << 1;
    pub const POSITIVE_X_FACE: u8 = 1 << 2;
    pub const NEGATIVE_Y_FACE: u8 = 1 << 3;
    pub const POSITIVE_Y_FACE: u8 = 1 << 4;
    pub const NEGATIVE_Z_FACE: u8 = 1 << 5;
    pub const POSITIVE_Z_FACE: u8 = 1 << 6;

    /// All region-face bits. One set bit marks a face vertex, two an edge
    /// of the region, three a corner.
    pub const GEOMETRY_MASK: u8 = NEGATIVE_X_FACE
        | POSITIVE_X_FACE
        | NEGATIVE_Y_FACE
        | POSITIVE_Y_FACE
        | NEGATIVE_Z_FACE
        | POSITIVE_Z_FACE;
}

/// Whether every geometry bit set in `a` is also set in `b`.
///
/// Interior vertices may move onto face vertices, face vertices onto region
/// edges and edges onto corners, never the reverse: collapses may only
/// preserve or increase edge character.
fn geometry_flags_subset(a: u8, b: u8) -> bool {
    (a & collapse_flags::GEOMETRY_MASK) & !b == 0
}

/// Attribute access the decimator needs from a vertex type.
///
/// The eligibility tests are composed from whichever optional attributes the
/// type provides: vertex normals enable the normal-agreement and
/// edge-flag tests, while vertex types without normals fall back to
/// neighbourhood heuristics derived from face normals.
pub trait CollapseVertex {
    /// Mesh-relative position
    fn position(&self) -> Vec3;

    /// Whether two vertices carry the same material
    fn material_matches(&self, other: &Self) -> bool;

    /// Surface normal, for vertex types that carry one
    fn normal(&self) -> Option<Vec3> {
        None
    }

    /// `collapse_flags` annotations, for vertex types that carry them
    fn flags(&self) -> Option<u8> {
        None
    }
}

impl<V: Copy + PartialEq> CollapseVertex for CubicVertex<V> {
    fn position(&self) -> Vec3 {
        decode_position(self.encoded_position)
    }

    fn material_matches(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<V: Copy + PartialEq> CollapseVertex for Vertex<V> {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn material_matches(&self, other: &Self) -> bool {
        self.data == other.data
    }

    fn normal(&self) -> Option<Vec3> {
        Some(self.normal)
    }
}

/// Multi-pass edge-collapse simplifier.
///
/// Collapse decisions are advisory: an edge that fails a test simply stays.
/// Passes repeat until one collapses nothing.
///
/// ```
/// # use voxmesh::mesh::{Mesh, Vertex};
/// # use voxmesh::surface::decimate::MeshDecimator;
/// # let mut mesh: Mesh<Vertex<u8>> = Mesh::new();
/// let collapsed = MeshDecimator::new(&mut mesh).execute();
/// ```
pub struct MeshDecimator<'a, T> {
    mesh: &'a mut Mesh<T>,
    normal_threshold: f32,
    region: Option<Region>,
    triangles_using_vertex: Vec<Vec<u32>>,
    vertex_mapper: Vec<u32>,
    vertex_locked: Vec<bool>,
    triangle_normals: Vec<Vec3>,
    normal_axis_count: Vec<u8>,
    same_material_neighbours: Vec<u32>,
    has_duplicate: Vec<bool>,
}

impl<'a, T: CollapseVertex> MeshDecimator<'a, T> {
    pub fn new(mesh: &'a mut Mesh<T>) -> Self {
        Self {
            mesh,
            normal_threshold: DEFAULT_NORMAL_THRESHOLD,
            region: None,
            triangles_using_vertex: Vec::new(),
            vertex_mapper: Vec::new(),
            vertex_locked: Vec::new(),
            triangle_normals: Vec::new(),
            normal_axis_count: Vec::new(),
            same_material_neighbours: Vec::new(),
            has_duplicate: Vec::new(),
        }
    }

    /// Minimum normal agreement between collapse endpoints (default 0.999)
    pub fn with_normal_threshold(mut self, threshold: f32) -> Self {
        self.normal_threshold = threshold;
        self
    }

    /// Region the mesh was extracted from. Vertex types without normals
    /// have no edge flags to protect region seams; pinning the vertices
    /// outside the region serves as the substitute.
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Run decimation passes until one collapses zero edges.
    /// Returns the total number of collapsed edges.
    pub fn execute(mut self) -> u32 {
        let mut total = 0;
        loop {
            let collapsed = self.perform_pass();
            self.mesh.remove_degenerate_triangles();
            self.mesh.remove_unused_vertices();
            total += collapsed;
            log::debug!("decimation pass collapsed {} edges", collapsed);
            if collapsed == 0 {
                break;
            }
        }

        // Simplification invalidated any previous LOD structure; the whole
        // index buffer is now the only level.
        self.mesh.lod_records = vec![LodRecord {
            begin_index: 0,
            end_index: self.mesh.index_count() as u32,
        }];

        log::debug!(
            "decimation done: {} collapses, {} triangles remain",
            total,
            self.mesh.triangle_count()
        );
        total
    }

    fn perform_pass(&mut self) -> u32 {
        let vertex_count = self.mesh.vertex_count();
        let triangle_count = self.mesh.triangle_count();
        if vertex_count == 0 || triangle_count == 0 {
            return 0;
        }

        self.build_incidence();
        self.build_triangle_normals();
        self.build_normal_axis_counts();

        let uses_flags = self.mesh.vertices[0].flags().is_some();
        if uses_flags {
            self.count_same_material_neighbours();
        }
        let uses_normals = self.mesh.vertices[0].normal().is_some();
        if !uses_normals {
            self.mark_duplicates();
        }

        self.vertex_mapper = (0..vertex_count as u32).collect();
        self.vertex_locked = vec![false; vertex_count];

        let mut collapsed = 0;
        for tri in 0..triangle_count {
            for edge in 0..3 {
                let v0 = self.mesh.indices[tri * 3 + edge];
                let v1 = self.mesh.indices[tri * 3 + (edge + 1) % 3];

                if self.can_collapse(v0, v1) {
                    // Move v0 onto v1 and shut both out of this pass so no
                    // collapse chains form.
                    self.vertex_mapper[v0 as usize] = v1;
                    self.vertex_locked[v0 as usize] = true;
                    self.vertex_locked[v1 as usize] = true;
                    collapsed += 1;
                }
            }
        }

        if collapsed > 0 {
            for index in &mut self.mesh.indices {
                *index = self.vertex_mapper[*index as usize];
            }
        }

        collapsed
    }

    fn build_incidence(&mut self) {
        self.triangles_using_vertex = vec![Vec::new(); self.mesh.vertex_count()];
        for (i, &index) in self.mesh.indices.iter().enumerate() {
            self.triangles_using_vertex[index as usize].push((i / 3) as u32);
        }
    }

    fn build_triangle_normals(&mut self) {
        self.triangle_normals = self
            .mesh
            .indices
            .chunks_exact(3)
            .map(|tri| {
                let p0 = self.mesh.vertices[tri[0] as usize].position();
                let p1 = self.mesh.vertices[tri[1] as usize].position();
                let p2 = self.mesh.vertices[tri[2] as usize].position();
                (p1 - p0).cross(p2 - p0)
            })
            .collect();
    }

    /// Count the axes along which the summed face normals around each vertex
    /// have weight: 1 for a planar neighbourhood, 2 for an edge, 3 for a
    /// corner
    fn build_normal_axis_counts(&mut self) {
        self.normal_axis_count = self
            .triangles_using_vertex
            .iter()
            .map(|triangles| {
                let sum: Vec3 = triangles
                    .iter()
                    .map(|&tri| self.triangle_normals[tri as usize])
                    .sum();
                (sum.x.abs() > NORMAL_AXIS_EPSILON) as u8
                    + (sum.y.abs() > NORMAL_AXIS_EPSILON) as u8
                    + (sum.z.abs() > NORMAL_AXIS_EPSILON) as u8
            })
            .collect();
    }

    /// How many of each vertex's neighbours share its material. On an
    /// undecimated mesh a material-boundary vertex on a straight edge has
    /// exactly four; corners differ.
    fn count_same_material_neighbours(&mut self) {
        let vertices = &self.mesh.vertices;
        let mut neighbours: Vec<Vec<u32>> = vec![Vec::new(); vertices.len()];
        for tri in self.mesh.indices.chunks_exact(3) {
            for (a, b) in [(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)] {
                neighbours[tri[a] as usize].push(tri[b]);
            }
        }

        self.same_material_neighbours = neighbours
            .iter_mut()
            .enumerate()
            .map(|(v, list)| {
                list.sort_unstable();
                list.dedup();
                list.iter()
                    .filter(|&&other| vertices[v].material_matches(&vertices[other as usize]))
                    .count() as u32
            })
            .collect();
    }

    fn mark_duplicates(&mut self) {
        let vertices = &self.mesh.vertices;
        self.has_duplicate = vec![false; vertices.len()];
        for outer in 0..vertices.len() {
            for inner in outer + 1..vertices.len() {
                let distance_squared =
                    (vertices[inner].position() - vertices[outer].position()).length_squared();
                if distance_squared < DUPLICATE_DISTANCE_SQUARED {
                    self.has_duplicate[outer] = true;
                    self.has_duplicate[inner] = true;
                }
            }
        }
    }

    /// Whether moving `v0` onto `v1` is admissible. Tests run cheapest
    /// first; the face-flip check is always last.
    fn can_collapse(&self, v0: u32, v1: u32) -> bool {
        if self.vertex_locked[v0 as usize] || self.vertex_locked[v1 as usize] {
            return false;
        }

        let a = &self.mesh.vertices[v0 as usize];
        let b = &self.mesh.vertices[v1 as usize];

        if !a.material_matches(b) {
            return false;
        }

        match (a.normal(), b.normal()) {
            (Some(normal0), Some(normal1)) => {
                let flags0 = a.flags().unwrap_or(0);
                let flags1 = b.flags().unwrap_or(0);

                // A material boundary may only collapse along itself: both
                // endpoints on a straight stretch of the boundary, moving
                // parallel to an axis.
                if (flags0 | flags1) & collapse_flags::MATERIAL_EDGE != 0 {
                    let straight = self.same_material_neighbours[v0 as usize] == 4
                        && self.same_material_neighbours[v1 as usize] == 4;
                    if !straight || !self.movement_is_axis_aligned(a, b) {
                        return false;
                    }
                }

                if (flags0 | flags1) & collapse_flags::GEOMETRY_MASK != 0 {
                    if !geometry_flags_subset(flags0, flags1) {
                        return false;
                    }
                    if normal0.dot(normal1) <= EDGE_NORMAL_THRESHOLD {
                        return false;
                    }
                }

                if normal0.dot(normal1) < self.normal_threshold {
                    return false;
                }
            }
            _ => {
                // No stored normals: neighbourhood heuristics stand in for
                // the explicit edge tests.
                if self.normal_axis_count[v0 as usize] == 3 {
                    return false;
                }
                if self.has_duplicate[v0 as usize] {
                    return false;
                }
                if self.normal_axis_count[v0 as usize] > self.normal_axis_count[v1 as usize] {
                    return false;
                }
                if let Some(region) = self.region {
                    let offset = self.mesh.offset.as_vec3();
                    if !region.contains_point(a.position() + offset) {
                        return false;
                    }
                }
            }
        }

        !self.flips_any_face(v0, v1)
    }

    fn movement_is_axis_aligned(&self, a: &T, b: &T) -> bool {
        let movement = (b.position() - a.position()).normalize();
        movement.x.abs() > EDGE_NORMAL_THRESHOLD
            || movement.y.abs() > EDGE_NORMAL_THRESHOLD
            || movement.z.abs() > EDGE_NORMAL_THRESHOLD
    }

    /// Whether substituting `v1` for `v0` would flip any surviving triangle
    /// around `v0`. Positions are read through the vertex mapper so
    /// collapses already accepted this pass are honoured.
    fn flips_any_face(&self, v0: u32, v1: u32) -> bool {
        let position =
            |index: u32| self.mesh.vertices[self.vertex_mapper[index as usize] as usize].position();

        for &tri in &self.triangles_using_vertex[v0 as usize] {
            let base = tri as usize * 3;
            let old = [
                self.mesh.indices[base],
                self.mesh.indices[base + 1],
                self.mesh.indices[base + 2],
            ];
            if old[0] == old[1] || old[1] == old[2] || old[2] == old[0] {
                continue;
            }

            let new = old.map(|index| if index == v0 { v1 } else { index });
            if new[0] == new[1] || new[1] == new[2] || new[2] == new[0] {
                continue;
            }

            let old_normal = (position(old[1]) - position(old[0]))
                .cross(position(old[2]) - position(old[1]))
                .normalize();
            let new_normal = (position(new[1]) - position(new[0]))
                .cross(position(new[2]) - position(new[1]))
                .normalize();

            if old_normal.dot(new_normal) < FACE_FLIP_THRESHOLD {
                return true;
            }
        }

        false
    }
}
