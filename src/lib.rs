//! # Procedural Mesh
//!
//! Builds GPU-ready mesh buffers for a unit quad in three memory layouts:
//!
//! - **Separate arrays**: one array per attribute, packed by the mesh
//! - **Interleaved**: one stream of 36-byte vertex records with `f16` tangents and UVs
//! - **Multi-stream**: one stream per attribute
//!
//! The [`mesh`] module holds the layout-agnostic machinery (attribute schemas,
//! writable mesh data, finished meshes), [`quad`] the quad builders, and
//! [`host`] / [`component`] the collaborator that receives finished meshes.
//!
//! ```
//! use procedural_mesh::quad::{self, MeshLayout};
//!
//! let mesh = quad::build(MeshLayout::MultiStream).unwrap();
//! assert_eq!(mesh.buffer_count(), 4);
//! assert_eq!(mesh.indices(), vec![0, 2, 1, 1, 2, 3]);
//! ```

pub mod bounds;
pub mod component;
pub mod error;
pub mod host;
pub mod mesh;
pub mod quad;

pub use bounds::Bounds;
pub use component::ProceduralQuad;
pub use error::{MeshError, MeshResult};
pub use host::{HeadlessHost, MeshHandle, MeshHost};
pub use mesh::Mesh;
pub use quad::MeshLayout;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the library version.
pub fn init() {
    log::info!("procedural-mesh v{} initialized", VERSION);
}
