//! Cubic surface extraction
//!
//! Produces the axis-aligned "blocky" look: the volume is swept once and a
//! quad is emitted wherever the caller's predicate separates two voxel
//! classes, with a per-vertex ambient occlusion term and optional coplanar
//! quad merging. Quads are triangulated along the diagonal that best
//! preserves the occlusion gradient.

use std::mem;
use std::time::Instant;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::math::Region;
use crate::mesh::mesh::{LodRecord, Mesh};
use crate::mesh::vertex::CubicVertex;
use crate::surface::quad::{merge_quad_pass, CubicFace, Quad, QuadPlanes};
use crate::voxel::sampler::Sampler;
use crate::voxel::volume::Volume;

/// Maximum number of vertices that can share one lattice corner.
///
/// Vertices at the same corner may still differ in material or ambient
/// occlusion and must then be kept apart. The surrounding 2x2x2 voxel group
/// bounds the number of distinct combinations at eight; a ninth is an
/// invariant violation.
pub const MAX_VERTICES_PER_POSITION: usize = 8;

/// Largest region dimension the byte-per-component vertex encoding can hold
pub const MAX_REGION_DIMENSION: i32 = 255;

/// Corner shadow term from the three neighbours diagonal to a face corner.
/// 0 is the darkest, 3 is no occlusion at all.
///
/// https://0fps.net/2013/07/03/ambient-occlusion-for-minecraft-like-worlds/
pub fn vertex_ambient_occlusion(side1: bool, side2: bool, corner: bool) -> u8 {
    if side1 && side2 {
        return 0;
    }
    3 - (side1 as u8 + side2 as u8 + corner as u8)
}

#[derive(Clone, Copy)]
struct SlotEntry<V> {
    index: u32,
    material: V,
    ambient_occlusion: u8,
}

/// Vertex dedup cache for one z-plane of lattice corners.
///
/// Each (x, y) column holds up to eight slots; a lookup probes the column in
/// order and either reuses a matching vertex or claims the first free slot.
struct SliceCache<V> {
    width: usize,
    slots: Vec<Option<SlotEntry<V>>>,
}

impl<V: Copy> SliceCache<V> {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            slots: vec![None; width * height * MAX_VERTICES_PER_POSITION],
        }
    }

    fn reset(&mut self) {
        self.slots.fill(None);
    }

    fn column_mut(&mut self, x: u32, y: u32) -> &mut [Option<SlotEntry<V>>] {
        let start = (y as usize * self.width + x as usize) * MAX_VERTICES_PER_POSITION;
        &mut self.slots[start..start + MAX_VERTICES_PER_POSITION]
    }
}

/// Reuse a matching vertex at this lattice corner or allocate a new one
fn find_or_add_vertex<V: Copy + PartialEq>(
    mesh: &mut Mesh<CubicVertex<V>>,
    cache: &mut SliceCache<V>,
    x: u32,
    y: u32,
    z: u32,
    material: V,
    ambient_occlusion: u8,
) -> Result<u32> {
    for slot in cache.column_mut(x, y) {
        match slot {
            Some(entry) => {
                if entry.material == material && entry.ambient_occlusion == ambient_occlusion {
                    return Ok(entry.index);
                }
            }
            None => {
                let index = mesh.add_vertex(CubicVertex {
                    encoded_position: [x as u8, y as u8, z as u8],
                    data: material,
                    ambient_occlusion,
                });
                *slot = Some(SlotEntry {
                    index,
                    material,
                    ambient_occlusion,
                });
                return Ok(index);
            }
        }
    }
    Err(Error::VertexSlotExhausted { x, y })
}

fn check_region_extent(region: Region) -> Result<()> {
    let dims = [
        ('x', region.width_in_voxels()),
        ('y', region.height_in_voxels()),
        ('z', region.depth_in_voxels()),
    ];
    for (axis, extent) in dims {
        if extent > MAX_REGION_DIMENSION {
            return Err(Error::RegionTooLarge { axis, extent });
        }
    }
    Ok(())
}

/// Extract the cubic surface of `region` into a fresh mesh.
///
/// `is_quad_needed(a, b)` decides whether a face separates the two voxels,
/// with its visible side toward `a`, and yields the material to stamp on the
/// face's vertices. `contributes_to_ao` selects the voxels that darken
/// corners. With `merge_quads` set, attribute-equal coplanar quads are
/// combined before triangulation.
///
/// A face shared by two extraction regions belongs to the region with the
/// greater coordinate on the separating axis, so neighbouring regions mesh
/// without overlap; when a voxel on a region's upper face changes, the
/// adjacent region must be re-extracted as well.
pub fn extract_cubic_mesh<V, Q, A>(
    volume: &V,
    region: Region,
    is_quad_needed: Q,
    contributes_to_ao: A,
    merge_quads: bool,
) -> Result<Mesh<CubicVertex<V::Voxel>>>
where
    V: Volume,
    V::Voxel: Copy + PartialEq,
    Q: Fn(V::Voxel, V::Voxel) -> Option<V::Voxel>,
    A: Fn(V::Voxel) -> bool,
{
    let mut mesh = Mesh::new();
    extract_cubic_mesh_into(
        volume,
        region,
        &mut mesh,
        is_quad_needed,
        contributes_to_ao,
        merge_quads,
    )?;
    Ok(mesh)
}

/// Extraction variant writing into a caller-supplied mesh.
///
/// The mesh is cleared first. Useful for mesh pooling: repeated extractions
/// reuse the vertex and index allocations.
pub fn extract_cubic_mesh_into<V, Q, A>(
    volume: &V,
    region: Region,
    mesh: &mut Mesh<CubicVertex<V::Voxel>>,
    is_quad_needed: Q,
    contributes_to_ao: A,
    merge_quads: bool,
) -> Result<()>
where
    V: Volume,
    V::Voxel: Copy + PartialEq,
    Q: Fn(V::Voxel, V::Voxel) -> Option<V::Voxel>,
    A: Fn(V::Voxel) -> bool,
{
    check_region_extent(region)?;

    let started = Instant::now();
    mesh.clear();

    let width = region.width_in_voxels().max(0) as usize;
    let height = region.height_in_voxels().max(0) as usize;
    let depth = region.depth_in_voxels().max(0) as usize;

    // Lattice corners span one more than the voxel count on each axis; the
    // extra column is slack for the +1 vertex coordinates.
    let mut previous_slice: SliceCache<V::Voxel> = SliceCache::new(width + 2, height + 2);
    let mut current_slice: SliceCache<V::Voxel> = SliceCache::new(width + 2, height + 2);
    let mut quad_planes = QuadPlanes::new(width + 1, height + 1, depth + 1);

    let corner_ao = |side1: V::Voxel, side2: V::Voxel, corner: V::Voxel| {
        vertex_ambient_occlusion(
            contributes_to_ao(side1),
            contributes_to_ao(side2),
            contributes_to_ao(corner),
        )
    };

    let mut sampler = Sampler::new(volume);

    for z in region.lower.z..=region.upper.z {
        let reg_z = (z - region.lower.z) as u32;

        for y in region.lower.y..=region.upper.y {
            let reg_y = (y - region.lower.y) as u32;

            sampler.set_position(region.lower.x, y, z);

            for x in region.lower.x..=region.upper.x {
                let reg_x = (x - region.lower.x) as u32;

                let current = sampler.voxel();
                let left = sampler.peek(-1, 0, 0);
                let before = sampler.peek(0, 0, -1);
                let below = sampler.peek(0, -1, 0);

                let left_before = sampler.peek(-1, 0, -1);
                let right_before = sampler.peek(1, 0, -1);
                let left_behind = sampler.peek(-1, 0, 1);

                let above_left = sampler.peek(-1, 1, 0);
                let above_before = sampler.peek(0, 1, -1);
                let above_left_before = sampler.peek(-1, 1, -1);
                let above_right_before = sampler.peek(1, 1, -1);

                let below_left = sampler.peek(-1, -1, 0);
                let below_right = sampler.peek(1, -1, 0);
                let below_before = sampler.peek(0, -1, -1);
                let below_behind = sampler.peek(0, -1, 1);
                let below_left_before = sampler.peek(-1, -1, -1);
                let below_right_before = sampler.peek(1, -1, -1);
                let below_left_behind = sampler.peek(-1, -1, 1);
                let below_right_behind = sampler.peek(1, -1, 1);

                // Face toward -X, between the current voxel and its left
                // neighbour. The quad's vertices live on the YZ plane at x.
                if let Some(material) = is_quad_needed(current, left) {
                    let above_left_behind = sampler.peek(-1, 1, 1);
                    let v0 = find_or_add_vertex(
                        mesh,
                        &mut previous_slice,
                        reg_x,
                        reg_y,
                        reg_z,
                        material,
                        corner_ao(left_before, below_left, below_left_before),
                    )?;
                    let v1 = find_or_add_vertex(
                        mesh,
                        &mut current_slice,
                        reg_x,
                        reg_y,
                        reg_z + 1,
                        material,
                        corner_ao(below_left, left_behind, below_left_behind),
                    )?;
                    let v2 = find_or_add_vertex(
                        mesh,
                        &mut current_slice,
                        reg_x,
                        reg_y + 1,
                        reg_z + 1,
                        material,
                        corner_ao(left_behind, above_left, above_left_behind),
                    )?;
                    let v3 = find_or_add_vertex(
                        mesh,
                        &mut previous_slice,
                        reg_x,
                        reg_y + 1,
                        reg_z,
                        material,
                        corner_ao(above_left, left_before, above_left_before),
                    )?;
                    quad_planes.push(
                        CubicFace::NegativeX,
                        reg_x as usize,
                        Quad::new(v0, v1, v2, v3),
                    );
                }

                // Face toward +X on the same plane, seen from the left
                // voxel's side. The sampler steps onto the left voxel so the
                // occlusion neighbours are the ones outward of the face.
                if let Some(material) = is_quad_needed(left, current) {
                    sampler.move_negative_x();

                    let right_before = sampler.peek(1, 0, -1);
                    let right_behind = sampler.peek(1, 0, 1);
                    let above_right = sampler.peek(1, 1, 0);
                    let above_right_before = sampler.peek(1, 1, -1);
                    let above_right_behind = sampler.peek(1, 1, 1);
                    let below_right = sampler.peek(1, -1, 0);
                    let below_right_before = sampler.peek(1, -1, -1);
                    let below_right_behind = sampler.peek(1, -1, 1);

                    let v0 = find_or_add_vertex(
                        mesh,
                        &mut previous_slice,
                        reg_x,
                        reg_y,
                        reg_z,
                        material,
                        corner_ao(below_right, right_before, below_right_before),
                    )?;
                    let v1 = find_or_add_vertex(
                        mesh,
                        &mut current_slice,
                        reg_x,
                        reg_y,
                        reg_z + 1,
                        material,
                        corner_ao(below_right, right_behind, below_right_behind),
                    )?;
                    let v2 = find_or_add_vertex(
                        mesh,
                        &mut current_slice,
                        reg_x,
                        reg_y + 1,
                        reg_z + 1,
                        material,
                        corner_ao(above_right, right_behind, above_right_behind),
                    )?;
                    let v3 = find_or_add_vertex(
                        mesh,
                        &mut previous_slice,
                        reg_x,
                        reg_y + 1,
                        reg_z,
                        material,
                        corner_ao(above_right, right_before, above_right_before),
                    )?;
                    quad_planes.push(
                        CubicFace::PositiveX,
                        reg_x as usize,
                        Quad::new(v0, v3, v2, v1),
                    );

                    sampler.move_positive_x();
                }

                // Face toward -Y, between the current voxel and the one below
                if let Some(material) = is_quad_needed(current, below) {
                    let v0 = find_or_add_vertex(
                        mesh,
                        &mut previous_slice,
                        reg_x,
                        reg_y,
                        reg_z,
                        material,
                        corner_ao(below_before, below_left, below_left_before),
                    )?;
                    let v1 = find_or_add_vertex(
                        mesh,
                        &mut previous_slice,
                        reg_x + 1,
                        reg_y,
                        reg_z,
                        material,
                        corner_ao(below_right, below_before, below_right_before),
                    )?;
                    let v2 = find_or_add_vertex(
                        mesh,
                        &mut current_slice,
                        reg_x + 1,
                        reg_y,
                        reg_z + 1,
                        material,
                        corner_ao(below_behind, below_right, below_right_behind),
                    )?;
                    let v3 = find_or_add_vertex(
                        mesh,
                        &mut current_slice,
                        reg_x,
                        reg_y,
                        reg_z + 1,
                        material,
                        corner_ao(below_left, below_behind, below_left_behind),
                    )?;
                    quad_planes.push(
                        CubicFace::NegativeY,
                        reg_y as usize,
                        Quad::new(v0, v1, v2, v3),
                    );
                }

                // Face toward +Y, seen from the voxel below
                if let Some(material) = is_quad_needed(below, current) {
                    sampler.move_negative_y();

                    let above_left = sampler.peek(-1, 1, 0);
                    let above_right = sampler.peek(1, 1, 0);
                    let above_before = sampler.peek(0, 1, -1);
                    let above_behind = sampler.peek(0, 1, 1);
                    let above_left_before = sampler.peek(-1, 1, -1);
                    let above_right_before = sampler.peek(1, 1, -1);
                    let above_left_behind = sampler.peek(-1, 1, 1);
                    let above_right_behind = sampler.peek(1, 1, 1);

                    let v0 = find_or_add_vertex(
                        mesh,
                        &mut previous_slice,
                        reg_x,
                        reg_y,
                        reg_z,
                        material,
                        corner_ao(above_before, above_left, above_left_before),
                    )?;
                    let v1 = find_or_add_vertex(
                        mesh,
                        &mut previous_slice,
                        reg_x + 1,
                        reg_y,
                        reg_z,
                        material,
                        corner_ao(above_right, above_before, above_right_before),
                    )?;
                    let v2 = find_or_add_vertex(
                        mesh,
                        &mut current_slice,
                        reg_x + 1,
                        reg_y,
                        reg_z + 1,
                        material,
                        corner_ao(above_behind, above_right, above_right_behind),
                    )?;
                    let v3 = find_or_add_vertex(
                        mesh,
                        &mut current_slice,
                        reg_x,
                        reg_y,
                        reg_z + 1,
                        material,
                        corner_ao(above_left, above_behind, above_left_behind),
                    )?;
                    quad_planes.push(
                        CubicFace::PositiveY,
                        reg_y as usize,
                        Quad::new(v0, v3, v2, v1),
                    );

                    sampler.move_positive_y();
                }

                // Face toward -Z, between the current voxel and the one
                // before it. All four corners lie on the completed plane.
                if let Some(material) = is_quad_needed(current, before) {
                    let v0 = find_or_add_vertex(
                        mesh,
                        &mut previous_slice,
                        reg_x,
                        reg_y,
                        reg_z,
                        material,
                        corner_ao(below_before, left_before, below_left_before),
                    )?;
                    let v1 = find_or_add_vertex(
                        mesh,
                        &mut previous_slice,
                        reg_x,
                        reg_y + 1,
                        reg_z,
                        material,
                        corner_ao(above_before, left_before, above_left_before),
                    )?;
                    let v2 = find_or_add_vertex(
                        mesh,
                        &mut previous_slice,
                        reg_x + 1,
                        reg_y + 1,
                        reg_z,
                        material,
                        corner_ao(above_before, right_before, above_right_before),
                    )?;
                    let v3 = find_or_add_vertex(
                        mesh,
                        &mut previous_slice,
                        reg_x + 1,
                        reg_y,
                        reg_z,
                        material,
                        corner_ao(below_before, right_before, below_right_before),
                    )?;
                    quad_planes.push(
                        CubicFace::NegativeZ,
                        reg_z as usize,
                        Quad::new(v0, v1, v2, v3),
                    );
                }

                // Face toward +Z, seen from the voxel before
                if let Some(material) = is_quad_needed(before, current) {
                    sampler.move_negative_z();

                    let left_behind = sampler.peek(-1, 0, 1);
                    let right_behind = sampler.peek(1, 0, 1);
                    let above_behind = sampler.peek(0, 1, 1);
                    let above_left_behind = sampler.peek(-1, 1, 1);
                    let above_right_behind = sampler.peek(1, 1, 1);
                    let below_behind = sampler.peek(0, -1, 1);
                    let below_left_behind = sampler.peek(-1, -1, 1);
                    let below_right_behind = sampler.peek(1, -1, 1);

                    let v0 = find_or_add_vertex(
                        mesh,
                        &mut previous_slice,
                        reg_x,
                        reg_y,
                        reg_z,
                        material,
                        corner_ao(below_behind, left_behind, below_left_behind),
                    )?;
                    let v1 = find_or_add_vertex(
                        mesh,
                        &mut previous_slice,
                        reg_x,
                        reg_y + 1,
                        reg_z,
                        material,
                        corner_ao(above_behind, left_behind, above_left_behind),
                    )?;
                    let v2 = find_or_add_vertex(
                        mesh,
                        &mut previous_slice,
                        reg_x + 1,
                        reg_y + 1,
                        reg_z,
                        material,
                        corner_ao(above_behind, right_behind, above_right_behind),
                    )?;
                    let v3 = find_or_add_vertex(
                        mesh,
                        &mut previous_slice,
                        reg_x + 1,
                        reg_y,
                        reg_z,
                        material,
                        corner_ao(below_behind, right_behind, below_right_behind),
                    )?;
                    quad_planes.push(
                        CubicFace::PositiveZ,
                        reg_z as usize,
                        Quad::new(v0, v3, v2, v1),
                    );

                    sampler.move_positive_z();
                }

                sampler.move_positive_x();
            }
        }

        // Corners on the plane between this slice and the next were written
        // into the current cache; carry them over so the next slice reuses
        // them instead of duplicating.
        mem::swap(&mut previous_slice, &mut current_slice);
        current_slice.reset();
    }

    for quad_list in quad_planes.slice_lists_mut() {
        if merge_quads {
            while merge_quad_pass(quad_list, mesh) {}
        }

        for quad in quad_list.iter() {
            let [q0, q1, q2, q3] = quad.vertices;
            let v00 = mesh.vertex(q3).ambient_occlusion as u16;
            let v01 = mesh.vertex(q0).ambient_occlusion as u16;
            let v10 = mesh.vertex(q2).ambient_occlusion as u16;
            let v11 = mesh.vertex(q1).ambient_occlusion as u16;

            // Split along the diagonal whose endpoints are the brighter
            // pair; interpolation then follows the occlusion gradient.
            if v00 + v11 > v01 + v10 {
                mesh.add_triangle(q1, q2, q3);
                mesh.add_triangle(q1, q3, q0);
            } else {
                mesh.add_triangle(q0, q1, q2);
                mesh.add_triangle(q0, q2, q3);
            }
        }
    }

    mesh.offset = region.lower_corner();
    mesh.remove_unused_vertices();
    mesh.lod_records = vec![LodRecord {
        begin_index: 0,
        end_index: mesh.index_count() as u32,
    }];

    log::trace!(
        "cubic surface extraction took {:.2?} ({}x{}x{} region, {} triangles)",
        started.elapsed(),
        width,
        height,
        depth,
        mesh.triangle_count()
    );

    Ok(())
}
