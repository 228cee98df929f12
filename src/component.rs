//! Scene component that generates its quad when enabled.

use crate::error::MeshResult;
use crate::host::{MeshHandle, MeshHost};
use crate::quad::{self, MeshLayout};

/// Builds a quad mesh through a host whenever it is enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProceduralQuad {
    /// Memory layout used for the generated mesh.
    pub layout: MeshLayout,
    mesh: Option<MeshHandle>,
}

impl ProceduralQuad {
    /// Create a component for the given layout.
    pub fn new(layout: MeshLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Handle of the most recently generated mesh.
    pub fn mesh(&self) -> Option<MeshHandle> {
        self.mesh
    }

    /// Generate a fresh quad mesh and remember its handle.
    pub fn on_enable<H: MeshHost + ?Sized>(&mut self, host: &mut H) -> MeshResult<MeshHandle> {
        if let Some(previous) = self.mesh {
            log::trace!("ProceduralQuad replacing mesh {:?}", previous);
        }
        let handle = quad::build_with(host, self.layout)?;
        log::info!("ProceduralQuad built {:?} mesh {:?}", self.layout, handle);
        self.mesh = Some(handle);
        Ok(handle)
    }
}
