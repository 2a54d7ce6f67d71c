//! Recording doubles for host callbacks and native surfaces

use std::cell::RefCell;
use std::rc::Rc;

use crate::callbacks::{CallSink, HostCall, ViewerCallbacks};
use crate::props::NativeProps;
use crate::viewer::{NativeSurface, SurfaceKind};

/// Shared log of host callback invocations
#[derive(Clone, Default)]
pub struct RecordingCallbacks {
    calls: Rc<RefCell<Vec<HostCall>>>,
}

impl RecordingCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks to hand to a viewer; they append to this log
    pub fn boxed(&self) -> Box<dyn ViewerCallbacks> {
        let calls = self.calls.clone();
        Box::new(CallSink(move |call: HostCall| calls.borrow_mut().push(call)))
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::OnError { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Native surface that records every property patch
#[derive(Clone, Default)]
pub struct RecordingSurface {
    patches: Rc<RefCell<Vec<NativeProps>>>,
    kinds: Rc<RefCell<Vec<SurfaceKind>>>,
    detached: Rc<RefCell<bool>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory for [`crate::Viewer::attach_surface`]
    pub fn factory(&self) -> impl FnOnce(SurfaceKind) -> Box<dyn NativeSurface> + use<> {
        let surface = self.clone();
        move |kind: SurfaceKind| -> Box<dyn NativeSurface> {
            surface.kinds.borrow_mut().push(kind);
            Box::new(surface)
        }
    }

    pub fn patches(&self) -> Vec<NativeProps> {
        self.patches.borrow().clone()
    }

    /// Kinds this surface was created as
    pub fn created_as(&self) -> Vec<SurfaceKind> {
        self.kinds.borrow().clone()
    }

    pub fn is_detached(&self) -> bool {
        *self.detached.borrow()
    }
}

impl NativeSurface for RecordingSurface {
    fn set_native_props(&mut self, props: NativeProps) {
        self.patches.borrow_mut().push(props);
    }

    fn detach(&mut self) {
        *self.detached.borrow_mut() = true;
    }
}
