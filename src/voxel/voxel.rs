//! Example voxel payload
//!
//! The extraction core is generic over the per-cell datum; this 4-byte voxel
//! is the concrete payload used by the crate's tests, benches and demos.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Convert RGB888 to RGB565
pub fn rgb_to_565(r: u8, g: u8, b: u8) -> u16 {
    let r5 = (r as u16 >> 3) & 0x1F;
    let g6 = (g as u16 >> 2) & 0x3F;
    let b5 = (b as u16 >> 3) & 0x1F;
    (r5 << 11) | (g6 << 5) | b5
}

/// Convert RGB565 to RGB888
pub fn rgb565_to_rgb(color: u16) -> (u8, u8, u8) {
    let r5 = (color >> 11) & 0x1F;
    let g6 = (color >> 5) & 0x3F;
    let b5 = color & 0x1F;
    (
        ((r5 << 3) | (r5 >> 2)) as u8,
        ((g6 << 2) | (g6 >> 4)) as u8,
        ((b5 << 3) | (b5 >> 2)) as u8,
    )
}

/// Voxel flags
pub mod flags {
    pub const TRANSPARENT: u8 = 1 << 0;
    pub const EMISSIVE: u8 = 1 << 1;
}

/// Single voxel - exactly 4 bytes
#[repr(C)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
pub struct Voxel {
    /// RGB565 encoded color
    pub color: u16,
    /// Material ID
    pub material_id: u8,
    /// Flags (transparent, emissive)
    pub flags: u8,
}

impl Voxel {
    /// Empty/air voxel
    pub const EMPTY: Voxel = Voxel {
        color: 0,
        material_id: 0,
        flags: 0,
    };

    /// Create voxel from RGB888 values
    pub fn new(r: u8, g: u8, b: u8, material_id: u8) -> Self {
        Self {
            color: rgb_to_565(r, g, b),
            material_id,
            flags: 0,
        }
    }

    /// Create voxel from RGB565 color
    pub fn from_rgb565(color: u16, material_id: u8) -> Self {
        Self {
            color,
            material_id,
            flags: 0,
        }
    }

    /// Get RGB888 color
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        rgb565_to_rgb(self.color)
    }

    /// Check if voxel is empty (air)
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Check if voxel is transparent
    pub fn is_transparent(&self) -> bool {
        self.flags & flags::TRANSPARENT != 0
    }

    /// Set transparency flag
    pub fn set_transparent(&mut self, transparent: bool) {
        if transparent {
            self.flags |= flags::TRANSPARENT;
        } else {
            self.flags &= !flags::TRANSPARENT;
        }
    }

    /// Check if voxel is emissive
    pub fn is_emissive(&self) -> bool {
        self.flags & flags::EMISSIVE != 0
    }
}

/// Whether a voxel casts corner shadows onto neighbouring faces
pub fn occludes(v: Voxel) -> bool {
    !v.is_empty() && !v.is_transparent()
}

/// Face predicate for solid voxels.
///
/// A quad faces `a` wherever `a` is opaque and `b` is see-through; the quad
/// carries `a` as its material.
pub fn solid_quad_needed(a: Voxel, b: Voxel) -> Option<Voxel> {
    if occludes(a) && !occludes(b) {
        Some(a)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size() {
        assert_eq!(std::mem::size_of::<Voxel>(), 4);
    }

    #[test]
    fn test_rgb565_roundtrip() {
        for (r, g, b) in [(255, 0, 0), (0, 255, 0), (0, 0, 255), (128, 128, 128)] {
            let color = rgb_to_565(r, g, b);
            let (r2, g2, b2) = rgb565_to_rgb(color);
            // Allow small error due to bit depth reduction
            assert!((r as i32 - r2 as i32).abs() <= 8);
            assert!((g as i32 - g2 as i32).abs() <= 4);
            assert!((b as i32 - b2 as i32).abs() <= 8);
        }
    }

    #[test]
    fn test_empty() {
        assert!(Voxel::EMPTY.is_empty());
        assert!(!Voxel::new(255, 0, 0, 1).is_empty());
    }

    #[test]
    fn test_quad_predicate() {
        let stone = Voxel::new(120, 120, 120, 1);
        let mut glass = Voxel::new(200, 220, 255, 2);
        glass.set_transparent(true);

        assert_eq!(solid_quad_needed(stone, Voxel::EMPTY), Some(stone));
        assert_eq!(solid_quad_needed(Voxel::EMPTY, stone), None);
        assert_eq!(solid_quad_needed(stone, stone), None);
        // Transparent neighbours expose the face
        assert_eq!(solid_quad_needed(stone, glass), Some(stone));
        assert_eq!(solid_quad_needed(glass, stone), None);
    }

    #[test]
    fn test_occludes() {
        let stone = Voxel::new(120, 120, 120, 1);
        let mut glass = stone;
        glass.set_transparent(true);
        assert!(occludes(stone));
        assert!(!occludes(glass));
        assert!(!occludes(Voxel::EMPTY));
    }
}
