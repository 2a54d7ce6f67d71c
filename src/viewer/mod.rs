//! Viewer lifecycle, surface selection and capability probing

mod probe;
mod service;
mod state;
mod surface;

pub use probe::{CapabilityProbe, DeferredProbe, FixedProbe, ProbeReply, SilentProbe};
pub use service::Viewer;
pub use state::{Capability, Command, Effect, ResolutionId, ViewerState};
pub use surface::{NativeSurface, Platform, SurfaceKind, select_surface};
