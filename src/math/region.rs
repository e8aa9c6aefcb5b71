//! Closed integer axis-aligned region of voxel space

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned box of lattice cells; both corners are inclusive.
///
/// A region with any `upper` component below the matching `lower` component
/// contains no voxels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub lower: IVec3,
    pub upper: IVec3,
}

impl Region {
    /// Create a region from inclusive lower and upper corners
    pub fn new(lower: IVec3, upper: IVec3) -> Self {
        Self { lower, upper }
    }

    /// Create a region from its lower corner and per-axis voxel counts
    pub fn from_lower_and_size(lower: IVec3, size: IVec3) -> Self {
        Self {
            lower,
            upper: lower + size - IVec3::ONE,
        }
    }

    /// Cube-shaped region with the given side length, lower corner at origin
    pub fn cube(side: i32) -> Self {
        Self::from_lower_and_size(IVec3::ZERO, IVec3::splat(side))
    }

    /// Inclusive lower corner
    pub fn lower_corner(&self) -> IVec3 {
        self.lower
    }

    /// Inclusive upper corner
    pub fn upper_corner(&self) -> IVec3 {
        self.upper
    }

    /// Number of voxels spanned along X (negative when the region is inverted)
    pub fn width_in_voxels(&self) -> i32 {
        self.upper.x - self.lower.x + 1
    }

    /// Number of voxels spanned along Y
    pub fn height_in_voxels(&self) -> i32 {
        self.upper.y - self.lower.y + 1
    }

    /// Number of voxels spanned along Z
    pub fn depth_in_voxels(&self) -> i32 {
        self.upper.z - self.lower.z + 1
    }

    /// True when the region contains no voxels
    pub fn is_empty(&self) -> bool {
        self.upper.x < self.lower.x || self.upper.y < self.lower.y || self.upper.z < self.lower.z
    }

    /// Whether the lattice position lies inside the region (closed on all faces)
    pub fn contains(&self, p: IVec3) -> bool {
        p.x >= self.lower.x
            && p.x <= self.upper.x
            && p.y >= self.lower.y
            && p.y <= self.upper.y
            && p.z >= self.lower.z
            && p.z <= self.upper.z
    }

    /// Whether a continuous point lies inside the region (closed on all faces)
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.lower.x as f32
            && p.x <= self.upper.x as f32
            && p.y >= self.lower.y as f32
            && p.y <= self.upper.y as f32
            && p.z >= self.lower.z as f32
            && p.z <= self.upper.z as f32
    }

    /// Return this region translated by `amount`
    pub fn shifted(&self, amount: IVec3) -> Region {
        Region {
            lower: self.lower + amount,
            upper: self.upper + amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let region = Region::new(IVec3::new(-1, 0, 2), IVec3::new(3, 0, 4));
        assert_eq!(region.width_in_voxels(), 5);
        assert_eq!(region.height_in_voxels(), 1);
        assert_eq!(region.depth_in_voxels(), 3);
        assert!(!region.is_empty());
    }

    #[test]
    fn test_from_lower_and_size() {
        let region = Region::from_lower_and_size(IVec3::new(4, 4, 4), IVec3::splat(16));
        assert_eq!(region.upper_corner(), IVec3::new(19, 19, 19));
        assert_eq!(region, Region::cube(16).shifted(IVec3::splat(4)));
    }

    #[test]
    fn test_contains_is_closed() {
        let region = Region::cube(3);
        assert!(region.contains(IVec3::ZERO));
        assert!(region.contains(IVec3::splat(2)));
        assert!(!region.contains(IVec3::splat(3)));
        assert!(!region.contains(IVec3::new(-1, 0, 0)));

        assert!(region.contains_point(Vec3::splat(2.0)));
        assert!(region.contains_point(Vec3::new(0.0, 1.5, 2.0)));
        assert!(!region.contains_point(Vec3::splat(2.5)));
    }

    #[test]
    fn test_empty_region() {
        let region = Region::new(IVec3::ZERO, IVec3::new(-1, 3, 3));
        assert!(region.is_empty());
        assert!(!region.contains(IVec3::ZERO));
    }

    #[test]
    fn test_serde_roundtrip() {
        let region = Region::cube(8).shifted(IVec3::new(0, -8, 16));
        let json = serde_json::to_string(&region).unwrap();
        assert_eq!(serde_json::from_str::<Region>(&json).unwrap(), region);
    }
}
