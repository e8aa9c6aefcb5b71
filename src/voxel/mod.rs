//! Voxel payloads, volume storage and sampling

pub mod voxel;
pub mod volume;
pub mod sampler;

pub use voxel::Voxel;
pub use volume::{ArrayVolume, Volume};
pub use sampler::Sampler;
