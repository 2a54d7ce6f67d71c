//! Viewer service - owns lifecycle state and talks to host and native surface

use std::collections::VecDeque;

use flume::Receiver;
use log::{debug, info, warn};

use super::probe::{CapabilityProbe, ProbeReply};
use super::state::{Capability, Command, Effect, ResolutionId, ViewerState};
use super::surface::{NativeSurface, Platform, SurfaceKind, select_surface};
use crate::callbacks::ViewerCallbacks;
use crate::error::ViewerError;
use crate::props::{NativeProps, ViewerProps};
use crate::protocol;
use crate::source::{self, AssetRegistry, AssetResolver, SourceDescriptor};

#[derive(Debug)]
struct PendingResolution {
    id: ResolutionId,
    descriptor: SourceDescriptor,
}

/// A mounted-or-not document viewer bridging host and native surface.
///
/// Everything runs on the caller's thread. Source resolution is queued by
/// [`Viewer::mount`] and [`Viewer::set_source`] and completes in
/// [`Viewer::poll`], which is also where probe answers are picked up.
pub struct Viewer {
    state: ViewerState,
    platform: Platform,
    props: ViewerProps,
    source: SourceDescriptor,
    assets: Box<dyn AssetResolver>,
    callbacks: Box<dyn ViewerCallbacks>,
    probe: Option<Box<dyn CapabilityProbe>>,
    probe_rx: Option<Receiver<bool>>,
    pending: VecDeque<PendingResolution>,
    surface: Option<Box<dyn NativeSurface>>,
    surface_kind: Option<SurfaceKind>,
}

impl Viewer {
    #[must_use]
    pub fn new(
        platform: Platform,
        source: SourceDescriptor,
        callbacks: Box<dyn ViewerCallbacks>,
    ) -> Self {
        Self {
            state: ViewerState::new(),
            platform,
            props: ViewerProps::default(),
            source,
            assets: Box::new(AssetRegistry::new()),
            callbacks,
            probe: None,
            probe_rx: None,
            pending: VecDeque::new(),
            surface: None,
            surface_kind: None,
        }
    }

    #[must_use]
    pub fn with_props(mut self, props: ViewerProps) -> Self {
        self.props = props;
        self
    }

    #[must_use]
    pub fn with_assets(mut self, assets: Box<dyn AssetResolver>) -> Self {
        self.assets = assets;
        self
    }

    /// Probe used on platforms that have one; ignored elsewhere
    #[must_use]
    pub fn with_probe(mut self, probe: Box<dyn CapabilityProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    #[must_use]
    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    /// Published path; empty while not ready
    #[must_use]
    pub fn path(&self) -> &str {
        &self.state.path
    }

    #[must_use]
    pub fn capability(&self) -> Capability {
        self.state.capability
    }

    #[must_use]
    pub fn props(&self) -> &ViewerProps {
        &self.props
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Number of queued resolutions not yet run by [`Viewer::poll`]
    #[must_use]
    pub fn pending_resolutions(&self) -> usize {
        self.pending.len()
    }

    /// Mount the viewer; a no-op while already mounted
    pub fn mount(&mut self) {
        if self.state.active {
            debug!("Viewer already mounted");
            return;
        }
        info!("Mounting viewer on {:?}", self.platform);
        self.surface_kind = None;
        let uri = self.normalized_uri(&self.source);
        let probe = self.platform.has_capability_probe();
        let effects = self.state.apply(Command::Mount { uri, probe });
        self.execute_effects(effects);
    }

    /// Replace the source descriptor.
    ///
    /// Re-resolves only when the normalized uri differs from the current one.
    pub fn set_source(&mut self, source: SourceDescriptor) {
        let uri = self.normalized_uri(&source);
        self.source = source;
        let effects = self.state.apply(Command::SourceChanged { uri });
        self.execute_effects(effects);
    }

    /// Replace layout options, pushing them to an attached surface
    pub fn set_props(&mut self, props: ViewerProps) {
        self.props = props;
        if self.state.is_ready() {
            let patch = self.props.to_native(&self.state.path);
            if let Some(surface) = self.surface.as_mut() {
                surface.set_native_props(patch);
            }
        }
    }

    pub fn unmount(&mut self) {
        info!("Unmounting viewer");
        let effects = self.state.apply(Command::Unmount);
        self.execute_effects(effects);
    }

    /// Apply a capability probe answer directly
    pub fn on_capability_probe_result(&mut self, supported: bool) {
        debug!("Capability probe answered {supported}");
        let effects = self.state.apply(Command::ProbeFinished(supported));
        self.execute_effects(effects);
    }

    /// Pick up probe answers and run queued resolutions.
    ///
    /// Each resolution outcome is returned to the caller; failures are also
    /// routed to the host's error callback while the viewer is mounted.
    pub fn poll(&mut self) -> Vec<Result<String, ViewerError>> {
        if let Some(rx) = self.probe_rx.take() {
            match rx.try_recv() {
                Ok(supported) => self.on_capability_probe_result(supported),
                Err(flume::TryRecvError::Empty) => self.probe_rx = Some(rx),
                Err(flume::TryRecvError::Disconnected) => {
                    debug!("Capability probe finished without an answer");
                }
            }
        }

        let mut outcomes = Vec::with_capacity(self.pending.len());
        while let Some(job) = self.pending.pop_front() {
            outcomes.push(self.complete_resolution(job));
        }
        outcomes
    }

    fn complete_resolution(&mut self, job: PendingResolution) -> Result<String, ViewerError> {
        match source::resolve(&job.descriptor, self.assets.as_ref()) {
            Ok(path) => {
                debug!("Resolution {:?} produced {path}", job.id);
                let effects = self.state.apply(Command::ResolutionSucceeded {
                    id: job.id,
                    path: path.clone(),
                });
                self.execute_effects(effects);
                Ok(path)
            }
            Err(err) => {
                warn!("Resolution {:?} failed: {err}", job.id);
                if self.state.accepts(job.id) {
                    self.callbacks.on_error(&err);
                }
                Err(err)
            }
        }
    }

    /// Surface the host should render right now; `None` while not ready
    #[must_use]
    pub fn surface_choice(&self) -> Option<SurfaceKind> {
        if !self.state.is_ready() {
            return None;
        }
        self.surface_kind.or_else(|| {
            select_surface(
                self.platform,
                self.props.use_preferred_backend,
                self.state.capability,
            )
        })
    }

    /// Attach the rendering surface, selecting its kind once per mount.
    ///
    /// `create` builds a surface of the chosen kind; it is not called when a
    /// surface is already attached or nothing can be rendered yet. A path
    /// reset releases the surface, so hosts attach again once a new path is
    /// published; the kind chosen first is kept until unmount.
    pub fn attach_surface<F>(&mut self, create: F) -> Option<SurfaceKind>
    where
        F: FnOnce(SurfaceKind) -> Box<dyn NativeSurface>,
    {
        let kind = self.surface_choice()?;
        if self.surface.is_some() {
            return Some(kind);
        }

        info!("Attaching {kind:?} surface for {}", self.state.path);
        let mut surface = create(kind);
        surface.set_native_props(self.props.to_native(&self.state.path));
        self.surface = Some(surface);
        self.surface_kind = Some(kind);
        Some(kind)
    }

    /// Jump to a page on the attached surface; dropped while not ready
    pub fn set_page(&mut self, page: Option<f64>) -> Result<(), ViewerError> {
        let page = match page {
            Some(page) if !page.is_nan() => page,
            _ => {
                return Err(ViewerError::invalid_argument(
                    "Specified pageNumber is not a number",
                ));
            }
        };

        match self.surface.as_mut() {
            Some(surface) if self.state.is_ready() => {
                surface.set_native_props(NativeProps::page(page));
            }
            _ => debug!("No surface rendering, dropping page {page}"),
        }
        Ok(())
    }

    /// Decode a native event message and invoke the matching host callback.
    ///
    /// Returns whether a callback fired. Malformed `loadComplete` payloads
    /// propagate as errors and never reach the host's error callback.
    /// Messages arriving while no surface can be rendering are dropped.
    pub fn handle_native_message(&mut self, raw: &str) -> Result<bool, ViewerError> {
        let event = protocol::decode(raw)?;
        if !self.state.is_ready() {
            debug!(
                "Dropping {:?} message while not ready: {raw}",
                event.kind()
            );
            return Ok(false);
        }
        Ok(protocol::dispatch(
            event,
            &self.state.path,
            self.callbacks.as_mut(),
        ))
    }

    fn normalized_uri(&self, descriptor: &SourceDescriptor) -> Option<String> {
        source::normalize(descriptor, self.assets.as_ref()).map(|source| source.uri)
    }

    fn execute_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PublishPath(path) => {
                    if path.is_empty() {
                        debug!("Path reset, viewer not ready");
                        self.release_surface();
                    } else {
                        info!("Document ready at {path}");
                    }
                }

                Effect::Resolve(id) => {
                    self.pending.push_back(PendingResolution {
                        id,
                        descriptor: self.source.clone(),
                    });
                }

                Effect::StartProbe => match self.probe.as_mut() {
                    Some(probe) => {
                        let (reply, rx) = ProbeReply::channel();
                        self.probe_rx = Some(rx);
                        probe.probe(reply);
                    }
                    None => warn!("No capability probe configured on {:?}", self.platform),
                },

                Effect::DetachSurface => {
                    self.probe_rx = None;
                    self.release_surface();
                }
            }
        }
    }

    fn release_surface(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            debug!("Detaching {:?} surface", self.surface_kind);
            surface.detach();
        }
    }
}
