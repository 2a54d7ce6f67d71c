//! Native surface selection

use serde::{Deserialize, Serialize};

use super::state::Capability;
use crate::props::NativeProps;

/// Host platform the viewer runs on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    Android,
    Ios,
    /// Any platform without a native surface
    Other,
}

impl Platform {
    /// Only iOS has a preferred backend whose availability must be probed
    #[must_use]
    pub const fn has_capability_probe(self) -> bool {
        matches!(self, Platform::Ios)
    }

    /// Registered name of the primary native view
    #[must_use]
    pub const fn native_view_name(self) -> Option<&'static str> {
        match self {
            Platform::Android => Some("RCTPdf"),
            Platform::Ios => Some("RCTPdfView"),
            Platform::Other => None,
        }
    }
}

/// Which rendering surface hosts the document
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    PrimaryNative,
    FallbackGeneric,
}

/// Pick the surface for a platform.
///
/// `None` means the platform renders nothing. An unanswered probe counts as
/// unsupported.
#[must_use]
pub fn select_surface(
    platform: Platform,
    use_preferred_backend: bool,
    capability: Capability,
) -> Option<SurfaceKind> {
    match platform {
        Platform::Android => Some(SurfaceKind::PrimaryNative),
        Platform::Ios if use_preferred_backend && capability == Capability::Supported => {
            Some(SurfaceKind::PrimaryNative)
        }
        Platform::Ios => Some(SurfaceKind::FallbackGeneric),
        Platform::Other => None,
    }
}

/// Platform rendering surface driven by the viewer
pub trait NativeSurface {
    /// Apply a property patch
    fn set_native_props(&mut self, props: NativeProps);

    /// Called once when the viewer unmounts
    fn detach(&mut self) {}
}
