//! Movable cursor over a volume
//!
//! The cubic extractor reasons about a 26-voxel stencil around each cell; the
//! sampler gives it O(1) access to the current cell and every one-step
//! neighbour without re-deriving positions.

use crate::voxel::volume::Volume;
use glam::IVec3;

/// Cursor positioned on one cell of a volume
pub struct Sampler<'a, V: Volume> {
    volume: &'a V,
    x: i32,
    y: i32,
    z: i32,
}

impl<'a, V: Volume> Sampler<'a, V> {
    /// Create a sampler positioned at the origin
    pub fn new(volume: &'a V) -> Self {
        Self {
            volume,
            x: 0,
            y: 0,
            z: 0,
        }
    }

    /// Move the cursor to an absolute position
    pub fn set_position(&mut self, x: i32, y: i32, z: i32) {
        self.x = x;
        self.y = y;
        self.z = z;
    }

    /// Current cursor position
    pub fn position(&self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    /// Step the cursor one voxel along +X
    pub fn move_positive_x(&mut self) {
        self.x += 1;
    }

    /// Step the cursor one voxel along +Y
    pub fn move_positive_y(&mut self) {
        self.y += 1;
    }

    /// Step the cursor one voxel along +Z
    pub fn move_positive_z(&mut self) {
        self.z += 1;
    }

    /// Step the cursor one voxel along -X
    pub fn move_negative_x(&mut self) {
        self.x -= 1;
    }

    /// Step the cursor one voxel along -Y
    pub fn move_negative_y(&mut self) {
        self.y -= 1;
    }

    /// Step the cursor one voxel along -Z
    pub fn move_negative_z(&mut self) {
        self.z -= 1;
    }

    /// Voxel under the cursor
    pub fn voxel(&self) -> V::Voxel {
        self.volume.voxel(self.x, self.y, self.z)
    }

    /// One-step neighbour peek; each offset must be in {-1, 0, 1}
    pub fn peek(&self, dx: i32, dy: i32, dz: i32) -> V::Voxel {
        debug_assert!(dx.abs() <= 1 && dy.abs() <= 1 && dz.abs() <= 1);
        self.volume.voxel(self.x + dx, self.y + dy, self.z + dz)
    }
}
