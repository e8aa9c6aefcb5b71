//! Volume storage contract and a dense array-backed implementation

use crate::math::Region;
use crate::voxel::voxel::Voxel;
use glam::IVec3;

/// Read access to voxel data.
///
/// Lookups are total: positions outside the stored extent resolve through the
/// implementor's border policy. The extraction core only requires that
/// `voxel` is O(1); paged or compressed backends satisfy the contract as long
/// as a lookup does not have to walk the whole store.
pub trait Volume {
    type Voxel: Copy;

    /// Sample the voxel at the given position
    fn voxel(&self, x: i32, y: i32, z: i32) -> Self::Voxel;
}

/// Dense volume over a fixed region.
///
/// Positions outside the region return the configured border voxel, so
/// extraction regions may safely touch or exceed the stored extent.
#[derive(Clone, Debug)]
pub struct ArrayVolume<T> {
    region: Region,
    border: T,
    data: Vec<T>,
}

impl<T: Copy> ArrayVolume<T> {
    /// Create a volume covering `region`, filled with `fill`, with `border`
    /// returned for all positions outside the region
    pub fn new(region: Region, fill: T, border: T) -> Self {
        let cells = (region.width_in_voxels().max(0) as usize)
            * (region.height_in_voxels().max(0) as usize)
            * (region.depth_in_voxels().max(0) as usize);
        Self {
            region,
            border,
            data: vec![fill; cells],
        }
    }

    /// Region this volume stores data for
    pub fn region(&self) -> Region {
        self.region
    }

    /// Voxel returned outside the stored region
    pub fn border(&self) -> T {
        self.border
    }

    /// Change the border voxel
    pub fn set_border(&mut self, border: T) {
        self.border = border;
    }

    fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if !self.region.contains(IVec3::new(x, y, z)) {
            return None;
        }
        let w = self.region.width_in_voxels() as usize;
        let h = self.region.height_in_voxels() as usize;
        let dx = (x - self.region.lower.x) as usize;
        let dy = (y - self.region.lower.y) as usize;
        let dz = (z - self.region.lower.z) as usize;
        Some((dz * h + dy) * w + dx)
    }

    /// Sample a voxel, applying the border policy
    pub fn get(&self, x: i32, y: i32, z: i32) -> T {
        match self.index(x, y, z) {
            Some(i) => self.data[i],
            None => self.border,
        }
    }

    /// Store a voxel; writes outside the region are discarded
    pub fn set(&mut self, x: i32, y: i32, z: i32, voxel: T) {
        if let Some(i) = self.index(x, y, z) {
            self.data[i] = voxel;
        }
    }
}

impl<T: Copy> Volume for ArrayVolume<T> {
    type Voxel = T;

    fn voxel(&self, x: i32, y: i32, z: i32) -> T {
        self.get(x, y, z)
    }
}

/// Binary sphere volume for benches and round-trip tests.
///
/// The sphere is centred in a `size`-sided cube with an empty border, colored
/// by position for visual variety when rendered.
pub fn solid_sphere(size: u32, radius: f32) -> ArrayVolume<Voxel> {
    let mut volume = ArrayVolume::new(Region::cube(size as i32), Voxel::EMPTY, Voxel::EMPTY);
    let center = size as f32 / 2.0;

    for z in 0..size {
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 - center + 0.5;
                let dy = y as f32 - center + 0.5;
                let dz = z as f32 - center + 0.5;
                let dist = (dx * dx + dy * dy + dz * dz).sqrt();

                if dist <= radius {
                    let r = ((x as f32 / size as f32) * 255.0) as u8;
                    let g = ((y as f32 / size as f32) * 255.0) as u8;
                    let b = ((z as f32 / size as f32) * 255.0) as u8;
                    volume.set(x as i32, y as i32, z as i32, Voxel::new(r, g, b, 1));
                }
            }
        }
    }

    volume
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut volume = ArrayVolume::new(Region::cube(4), 0u8, 255u8);
        assert_eq!(volume.get(1, 2, 3), 0);
        volume.set(1, 2, 3, 7);
        assert_eq!(volume.get(1, 2, 3), 7);
    }

    #[test]
    fn test_border_policy() {
        let volume = ArrayVolume::new(Region::cube(2), 1u8, 9u8);
        assert_eq!(volume.get(-1, 0, 0), 9);
        assert_eq!(volume.get(0, 2, 0), 9);
        assert_eq!(volume.get(0, 0, 0), 1);
    }

    #[test]
    fn test_out_of_region_write_discarded() {
        let mut volume = ArrayVolume::new(Region::cube(2), 0u8, 9u8);
        volume.set(5, 5, 5, 3);
        assert_eq!(volume.get(5, 5, 5), 9);
    }

    #[test]
    fn test_solid_sphere() {
        let volume = solid_sphere(8, 3.0);
        // Centre is solid, corner is empty
        assert!(!volume.get(4, 4, 4).is_empty());
        assert!(volume.get(0, 0, 0).is_empty());
    }
}
