//! Surface extraction and simplification

pub mod quad;
pub mod cubic;
pub mod decimate;

pub use cubic::{extract_cubic_mesh, extract_cubic_mesh_into};
pub use decimate::{CollapseVertex, MeshDecimator};
pub use quad::{CubicFace, Quad, QuadPlanes};
