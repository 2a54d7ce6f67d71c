//! Source descriptors and their resolution to local file paths

use std::collections::HashMap;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

static NETWORK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("valid network regex"));
static ASSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^bundle-assets://").expect("valid asset regex"));
static BASE64_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^data:application/pdf;base64").expect("valid base64 regex")
});
static FILE_SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^file://").expect("valid file scheme regex"));

/// Opaque handle to a resource packaged with the host application
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub u32);

/// Host-supplied description of which document to render
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceDescriptor {
    /// Pre-resolved bundled resource handle
    Asset(AssetId),
    Uri {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
        #[serde(default)]
        cache: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expiration: Option<f64>,
    },
}

impl SourceDescriptor {
    /// Descriptor pointing at `uri` with caching disabled
    pub fn uri(uri: impl Into<String>) -> Self {
        Self::Uri {
            uri: Some(uri.into()),
            cache: false,
            expiration: None,
        }
    }

    /// Descriptor with no `uri` at all
    #[must_use]
    pub const fn empty() -> Self {
        Self::Uri {
            uri: None,
            cache: false,
            expiration: None,
        }
    }
}

/// A descriptor normalized to a concrete URI-like string
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSource {
    pub uri: String,
}

/// Host asset table used to turn bundled handles into URIs
pub trait AssetResolver {
    fn resolve_asset(&self, id: AssetId) -> Option<ResolvedSource>;
}

/// In-memory asset table
#[derive(Debug, Default, Clone)]
pub struct AssetRegistry {
    assets: HashMap<AssetId, String>,
    next_id: u32,
}

impl AssetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `uri` under a fresh handle.
    ///
    /// Handles start at 1 and skip any already taken by [`AssetRegistry::insert`].
    /// Returns `None` once the handle space is exhausted.
    pub fn register(&mut self, uri: impl Into<String>) -> Option<AssetId> {
        let mut candidate = self.next_id.checked_add(1)?;
        while self.assets.contains_key(&AssetId(candidate)) {
            candidate = candidate.checked_add(1)?;
        }
        self.next_id = candidate;
        let id = AssetId(candidate);
        self.assets.insert(id, uri.into());
        Some(id)
    }

    pub fn insert(&mut self, id: AssetId, uri: impl Into<String>) {
        self.assets.insert(id, uri.into());
    }
}

impl AssetResolver for AssetRegistry {
    fn resolve_asset(&self, id: AssetId) -> Option<ResolvedSource> {
        self.assets
            .get(&id)
            .map(|uri| ResolvedSource { uri: uri.clone() })
    }
}

/// How a resolved `uri` is interpreted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Network,
    PackagedAsset,
    InlineBase64,
    Local,
}

impl SourceKind {
    #[must_use]
    pub fn is_supported(self) -> bool {
        self == Self::Local
    }
}

/// Classify a uri by prefix, case-insensitively
#[must_use]
pub fn classify(uri: &str) -> SourceKind {
    if NETWORK_RE.is_match(uri) {
        SourceKind::Network
    } else if ASSET_RE.is_match(uri) {
        SourceKind::PackagedAsset
    } else if BASE64_RE.is_match(uri) {
        SourceKind::InlineBase64
    } else {
        SourceKind::Local
    }
}

/// Normalize a descriptor; `None` when it yields no usable `uri`.
pub fn normalize(
    descriptor: &SourceDescriptor,
    assets: &dyn AssetResolver,
) -> Option<ResolvedSource> {
    let resolved = match descriptor {
        SourceDescriptor::Asset(id) => assets.resolve_asset(*id)?,
        SourceDescriptor::Uri { uri, .. } => ResolvedSource { uri: uri.clone()? },
    };
    if resolved.uri.is_empty() {
        None
    } else {
        Some(resolved)
    }
}

/// Turn a descriptor into a local filesystem path.
///
/// Only files already materialized on local storage are accepted; the file
/// itself is not checked for existence.
pub fn resolve(
    descriptor: &SourceDescriptor,
    assets: &dyn AssetResolver,
) -> Result<String, ViewerError> {
    let source = normalize(descriptor, assets).ok_or(ViewerError::MissingSource)?;
    let kind = classify(&source.uri);
    if !kind.is_supported() {
        debug!("Rejecting {kind:?} source {}", source.uri);
        return Err(ViewerError::unsupported(source.uri));
    }

    Ok(FILE_SCHEME_RE.replace(&source.uri, "").into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_uri(uri: &str) -> Result<String, ViewerError> {
        resolve(&SourceDescriptor::uri(uri), &AssetRegistry::new())
    }

    #[test]
    fn strips_file_scheme_case_insensitively() {
        assert_eq!(resolve_uri("file:///tmp/a.pdf").unwrap(), "/tmp/a.pdf");
        assert_eq!(resolve_uri("FILE:///tmp/a.pdf").unwrap(), "/tmp/a.pdf");
        assert_eq!(resolve_uri("File://relative/b.pdf").unwrap(), "relative/b.pdf");
    }

    #[test]
    fn bare_paths_are_accepted_verbatim() {
        assert_eq!(resolve_uri("/sdcard/doc.pdf").unwrap(), "/sdcard/doc.pdf");
        assert_eq!(
            resolve_uri("content://media/doc.pdf").unwrap(),
            "content://media/doc.pdf"
        );
    }

    #[test]
    fn only_leading_file_scheme_is_stripped() {
        assert_eq!(
            resolve_uri("/data/file://weird.pdf").unwrap(),
            "/data/file://weird.pdf"
        );
    }

    #[test]
    fn unsupported_forms_are_rejected() {
        for uri in [
            "http://example.com/a.pdf",
            "HTTPS://example.com/a.pdf",
            "bundle-assets://doc.pdf",
            "data:application/pdf;base64,JVBERi0x",
            "DATA:application/PDF;BASE64,JVBERi0x",
        ] {
            match resolve_uri(uri) {
                Err(ViewerError::UnsupportedSource { uri: rejected }) => assert_eq!(rejected, uri),
                other => panic!("expected unsupported for {uri}, got {other:?}"),
            }
        }
    }

    #[test]
    fn classification_priority() {
        assert_eq!(classify("http://a"), SourceKind::Network);
        assert_eq!(classify("bundle-assets://a"), SourceKind::PackagedAsset);
        assert_eq!(classify("data:application/pdf;base64,AA"), SourceKind::InlineBase64);
        assert_eq!(classify("data:text/plain,AA"), SourceKind::Local);
        assert_eq!(classify("ftp://a"), SourceKind::Local);
    }

    #[test]
    fn missing_uri_fails() {
        let assets = AssetRegistry::new();
        assert!(matches!(
            resolve(&SourceDescriptor::empty(), &assets),
            Err(ViewerError::MissingSource)
        ));
        assert!(matches!(
            resolve(&SourceDescriptor::uri(""), &assets),
            Err(ViewerError::MissingSource)
        ));
    }

    #[test]
    fn asset_handles_resolve_through_registry() {
        let mut assets = AssetRegistry::new();
        let local = assets.register("file:///bundle/manual.pdf").unwrap();
        let remote = assets
            .register("http://localhost:8081/assets/manual.pdf")
            .unwrap();

        assert_eq!(
            resolve(&SourceDescriptor::Asset(local), &assets).unwrap(),
            "/bundle/manual.pdf"
        );
        assert!(matches!(
            resolve(&SourceDescriptor::Asset(remote), &assets),
            Err(ViewerError::UnsupportedSource { .. })
        ));
        assert!(matches!(
            resolve(&SourceDescriptor::Asset(AssetId(99)), &assets),
            Err(ViewerError::MissingSource)
        ));
    }

    #[test]
    fn register_skips_handles_taken_by_insert() {
        let mut assets = AssetRegistry::new();
        assets.insert(AssetId(2), "file:///first.pdf");
        assets.insert(AssetId(3), "file:///third.pdf");

        assert_eq!(assets.register("file:///one.pdf"), Some(AssetId(1)));
        assert_eq!(assets.register("file:///second.pdf"), Some(AssetId(4)));
        assert_eq!(
            assets.resolve_asset(AssetId(2)).map(|source| source.uri),
            Some("file:///first.pdf".to_string())
        );
        assert_eq!(
            assets.resolve_asset(AssetId(4)).map(|source| source.uri),
            Some("file:///second.pdf".to_string())
        );
    }

    #[test]
    fn register_stops_when_handles_run_out() {
        let mut assets = AssetRegistry::new();
        assets.insert(AssetId(u32::MAX), "file:///last.pdf");
        assets.next_id = u32::MAX - 1;

        assert_eq!(assets.register("file:///overflow.pdf"), None);
        assert_eq!(
            assets.resolve_asset(AssetId(u32::MAX)).map(|source| source.uri),
            Some("file:///last.pdf".to_string())
        );
    }

    #[test]
    fn descriptor_deserializes_from_both_shapes() {
        let from_object: SourceDescriptor =
            serde_json::from_str(r#"{"uri":"file:///a.pdf","cache":true}"#).unwrap();
        assert_eq!(
            from_object,
            SourceDescriptor::Uri {
                uri: Some("file:///a.pdf".to_string()),
                cache: true,
                expiration: None,
            }
        );

        let from_number: SourceDescriptor = serde_json::from_str("7").unwrap();
        assert_eq!(from_number, SourceDescriptor::Asset(AssetId(7)));

        let from_empty: SourceDescriptor = serde_json::from_str("{}").unwrap();
        assert_eq!(from_empty, SourceDescriptor::empty());
    }
}
