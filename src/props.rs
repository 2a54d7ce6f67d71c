//! Layout and zoom options passed through to the native surface

use serde::{Deserialize, Serialize};

/// How a page is fitted into the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FitPolicy {
    Width,
    Height,
    #[default]
    Both,
}

impl FitPolicy {
    /// Numeric code understood by the native surfaces
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            FitPolicy::Width => 0,
            FitPolicy::Height => 1,
            FitPolicy::Both => 2,
        }
    }
}

/// Host-facing viewer options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerProps {
    pub page: u32,
    pub scale: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub horizontal: bool,
    pub spacing: u32,
    pub password: String,
    pub enable_antialiasing: bool,
    pub enable_annotation_rendering: bool,
    pub enable_paging: bool,
    pub enable_rtl: bool,
    pub fit_policy: FitPolicy,
    pub trust_all_certs: bool,
    pub single_page: bool,
    /// Opt in to the preferred backend where a capability probe exists
    pub use_preferred_backend: bool,
}

impl Default for ViewerProps {
    fn default() -> Self {
        Self {
            page: 1,
            scale: 1.0,
            min_scale: 1.0,
            max_scale: 3.0,
            horizontal: false,
            spacing: 10,
            password: String::new(),
            enable_antialiasing: true,
            enable_annotation_rendering: true,
            enable_paging: false,
            enable_rtl: false,
            fit_policy: FitPolicy::Both,
            trust_all_certs: true,
            single_page: false,
            use_preferred_backend: true,
        }
    }
}

impl ViewerProps {
    /// Full property patch for a freshly attached surface
    #[must_use]
    pub fn to_native(&self, path: &str) -> NativeProps {
        NativeProps {
            path: Some(path.to_string()),
            page: Some(f64::from(self.page)),
            scale: Some(self.scale),
            min_scale: Some(self.min_scale),
            max_scale: Some(self.max_scale),
            horizontal: Some(self.horizontal),
            spacing: Some(self.spacing),
            password: Some(self.password.clone()),
            enable_antialiasing: Some(self.enable_antialiasing),
            enable_annotation_rendering: Some(self.enable_annotation_rendering),
            enable_paging: Some(self.enable_paging),
            enable_rtl: Some(self.enable_rtl),
            fit_policy: Some(self.fit_policy.code()),
            trust_all_certs: Some(self.trust_all_certs),
            single_page: Some(self.single_page),
        }
    }
}

/// Partial property update sent to a native surface; absent fields are untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_antialiasing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_annotation_rendering: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_paging: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "enableRTL")]
    pub enable_rtl: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit_policy: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_all_certs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_page: Option<bool>,
}

impl NativeProps {
    /// Patch carrying only a page number
    #[must_use]
    pub fn page(page: f64) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }
}
