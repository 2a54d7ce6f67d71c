//! Viewer lifecycle state

use log::debug;

/// Result of the preferred-backend capability probe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Capability {
    #[default]
    Unknown,
    Supported,
    Unsupported,
}

impl Capability {
    #[must_use]
    pub const fn from_probe(supported: bool) -> Self {
        if supported {
            Self::Supported
        } else {
            Self::Unsupported
        }
    }
}

/// Identifies one resolution triggered by a source change
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResolutionId(pub u64);

/// Mutable state owned by a viewer
#[derive(Clone, Debug, Default)]
pub struct ViewerState {
    /// Whether the viewer is mounted; nothing mutates after it goes false
    pub active: bool,

    /// Local document path, empty while not ready
    pub path: String,

    pub capability: Capability,

    /// Normalized uri of the current descriptor
    current_uri: Option<String>,

    /// Most recent resolution; completions from older ones are dropped
    latest: Option<ResolutionId>,

    next_id: u64,
}

impl ViewerState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a command and return resulting effects
    #[must_use]
    pub fn apply(&mut self, cmd: Command) -> Vec<Effect> {
        match cmd {
            Command::Mount { uri, probe } => {
                if self.active {
                    debug!("Ignoring mount of an already mounted viewer");
                    return vec![];
                }
                self.active = true;
                self.capability = Capability::Unknown;
                self.current_uri = uri;
                let mut effects = Vec::with_capacity(3);
                if probe {
                    effects.push(Effect::StartProbe);
                }
                effects.extend(self.begin_resolution());
                effects
            }

            Command::SourceChanged { uri } => {
                if self.current_uri == uri {
                    return vec![];
                }
                self.current_uri = uri;
                if self.active {
                    self.begin_resolution()
                } else {
                    vec![]
                }
            }

            Command::ResolutionSucceeded { id, path } => {
                if !self.accepts(id) {
                    return vec![];
                }
                self.path = path.clone();
                vec![Effect::PublishPath(path)]
            }

            Command::ProbeFinished(supported) => {
                if !self.active {
                    debug!("Dropping capability probe result after unmount");
                } else if self.capability != Capability::Unknown {
                    debug!("Capability already settled as {:?}", self.capability);
                } else {
                    self.capability = Capability::from_probe(supported);
                }
                vec![]
            }

            Command::Unmount => {
                if !self.active {
                    return vec![];
                }
                self.active = false;
                vec![Effect::DetachSurface]
            }
        }
    }

    /// Normalized uri of the current descriptor
    #[must_use]
    pub fn current_uri(&self) -> Option<&str> {
        self.current_uri.as_deref()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.active && !self.path.is_empty()
    }

    fn begin_resolution(&mut self) -> Vec<Effect> {
        self.next_id += 1;
        let id = ResolutionId(self.next_id);
        self.latest = Some(id);
        self.path.clear();
        vec![Effect::PublishPath(String::new()), Effect::Resolve(id)]
    }

    /// Whether a completion of `id` may still touch state or reach the host
    #[must_use]
    pub fn accepts(&self, id: ResolutionId) -> bool {
        if !self.active {
            debug!("Dropping resolution {id:?} after unmount");
            return false;
        }
        if self.latest != Some(id) {
            debug!("Dropping stale resolution {id:?}, latest is {:?}", self.latest);
            return false;
        }
        true
    }
}

/// Commands that drive the viewer lifecycle
#[derive(Clone, Debug)]
pub enum Command {
    /// Viewer mounted with the given normalized uri
    Mount { uri: Option<String>, probe: bool },
    /// Host supplied a new descriptor
    SourceChanged { uri: Option<String> },
    ResolutionSucceeded { id: ResolutionId, path: String },
    /// Capability probe answered
    ProbeFinished(bool),
    Unmount,
}

/// Effects produced by state changes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Publish a new path; empty means not ready and releases the surface
    PublishPath(String),
    /// Queue resolution of the current descriptor
    Resolve(ResolutionId),
    /// Issue the capability probe
    StartProbe,
    /// Release the native surface
    DetachSurface,
}
