//! Host-visible callbacks

use serde::Serialize;
use serde_json::Value;

use crate::error::ViewerError;
use crate::protocol::PageSize;

/// Callbacks the host registers on a viewer.
///
/// Every method defaults to a no-op, so hosts only implement what they need.
pub trait ViewerCallbacks {
    fn on_load_complete(
        &mut self,
        _page_count: f64,
        _path: &str,
        _size: PageSize,
        _extra: Option<Value>,
    ) {
    }

    fn on_page_changed(&mut self, _page: f64, _page_count: f64) {}

    fn on_error(&mut self, _error: &ViewerError) {}

    fn on_page_single_tap(&mut self, _page: f64, _x: f64, _y: f64) {}

    fn on_scale_changed(&mut self, _scale: f64) {}

    fn on_press_link(&mut self, _url: &str) {}
}

/// Host that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallbacks;

impl ViewerCallbacks for NoopCallbacks {}

/// A single host callback invocation, as plain data
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "callback", rename_all = "camelCase")]
pub enum HostCall {
    #[serde(rename_all = "camelCase")]
    OnLoadComplete {
        page_count: f64,
        path: String,
        size: PageSize,
        #[serde(skip_serializing_if = "Option::is_none")]
        extra: Option<Value>,
    },
    #[serde(rename_all = "camelCase")]
    OnPageChanged { page: f64, page_count: f64 },
    OnError { message: String },
    OnPageSingleTap { page: f64, x: f64, y: f64 },
    OnScaleChanged { scale: f64 },
    OnPressLink { url: String },
}

/// Adapter turning every callback into a [`HostCall`] handed to a sink
pub struct CallSink<F: FnMut(HostCall)>(pub F);

impl<F: FnMut(HostCall)> ViewerCallbacks for CallSink<F> {
    fn on_load_complete(
        &mut self,
        page_count: f64,
        path: &str,
        size: PageSize,
        extra: Option<Value>,
    ) {
        (self.0)(HostCall::OnLoadComplete {
            page_count,
            path: path.to_string(),
            size,
            extra,
        });
    }

    fn on_page_changed(&mut self, page: f64, page_count: f64) {
        (self.0)(HostCall::OnPageChanged { page, page_count });
    }

    fn on_error(&mut self, error: &ViewerError) {
        (self.0)(HostCall::OnError {
            message: error.to_string(),
        });
    }

    fn on_page_single_tap(&mut self, page: f64, x: f64, y: f64) {
        (self.0)(HostCall::OnPageSingleTap { page, x, y });
    }

    fn on_scale_changed(&mut self, scale: f64) {
        (self.0)(HostCall::OnScaleChanged { scale });
    }

    fn on_press_link(&mut self, url: &str) {
        (self.0)(HostCall::OnPressLink {
            url: url.to_string(),
        });
    }
}
