
pub mod layered_mesh;
pub use layered_mesh::LayeredMeshRenderModule;

pub mod starfield;
pub use starfield::StarfieldRenderModule;
