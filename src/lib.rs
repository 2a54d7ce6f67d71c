pub mod callbacks;
pub mod error;
pub mod event_source;
pub mod panic_handler;
pub mod props;
pub mod protocol;
pub mod settings;
pub mod source;
pub mod viewer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use callbacks::{NoopCallbacks, ViewerCallbacks};
pub use error::ViewerError;
pub use props::{FitPolicy, NativeProps, ViewerProps};
pub use protocol::{EventKind, PageSize, ParsedEvent, decode, dispatch};
pub use source::{AssetId, AssetRegistry, AssetResolver, SourceDescriptor, resolve};
pub use viewer::{Capability, Platform, SurfaceKind, Viewer};
