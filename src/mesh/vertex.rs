//! Mesh vertex types and position decoding

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Vertex emitted by the cubic extractor.
///
/// The position is one byte per component in region-relative lattice
/// coordinates, which caps extraction regions at 255 voxels per axis. Cube
/// corners sit between voxel centres; `decode_position` applies the
/// half-voxel shift.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CubicVertex<V> {
    pub encoded_position: [u8; 3],
    pub data: V,
    /// Corner shadow term, 0 (darkest) to 3 (unoccluded)
    pub ambient_occlusion: u8,
}

/// Decoded vertex with world-ready attributes
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertex<V> {
    pub position: Vec3,
    pub normal: Vec3,
    pub data: V,
    pub ambient_occlusion: u8,
}

/// Recover the region-relative position of an encoded vertex
pub fn decode_position(encoded: [u8; 3]) -> Vec3 {
    Vec3::new(encoded[0] as f32, encoded[1] as f32, encoded[2] as f32) - 0.5
}

/// Decode a cubic vertex.
///
/// Cubic meshes carry no analytic normal; the normal is zeroed and left for
/// consumers to derive per face.
pub fn decode_vertex<V: Copy>(vertex: &CubicVertex<V>) -> Vertex<V> {
    Vertex {
        position: decode_position(vertex.encoded_position),
        normal: Vec3::ZERO,
        data: vertex.data,
        ambient_occlusion: vertex.ambient_occlusion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_position() {
        assert_eq!(decode_position([0, 0, 0]), Vec3::splat(-0.5));
        assert_eq!(decode_position([1, 2, 3]), Vec3::new(0.5, 1.5, 2.5));
        assert_eq!(decode_position([255, 255, 255]), Vec3::splat(254.5));
    }

    #[test]
    fn test_decode_vertex() {
        let encoded = CubicVertex {
            encoded_position: [4, 0, 9],
            data: 7u8,
            ambient_occlusion: 2,
        };
        let decoded = decode_vertex(&encoded);
        assert_eq!(decoded.position, Vec3::new(3.5, -0.5, 8.5));
        assert_eq!(decoded.normal, Vec3::ZERO);
        assert_eq!(decoded.data, 7);
        assert_eq!(decoded.ambient_occlusion, 2);
    }
}
