//! Preferred-backend capability probe

use std::cell::RefCell;
use std::rc::Rc;

use flume::{Receiver, Sender};
use log::{debug, warn};

/// One-shot reply handle given to a probe.
///
/// Consumed by [`ProbeReply::send`], so a probe answers at most once.
#[derive(Debug)]
pub struct ProbeReply {
    tx: Sender<bool>,
}

impl ProbeReply {
    /// Create a reply handle and the receiver the viewer drains
    #[must_use]
    pub fn channel() -> (Self, Receiver<bool>) {
        let (tx, rx) = flume::bounded(1);
        (Self { tx }, rx)
    }

    pub fn send(self, supported: bool) {
        if self.tx.send(supported).is_err() {
            debug!("Capability probe answered after the viewer went away");
        }
    }
}

/// Asynchronously determines whether the preferred backend is available
pub trait CapabilityProbe {
    /// Start probing; answer through `reply` whenever ready, or never
    fn probe(&mut self, reply: ProbeReply);
}

/// Probe answering immediately with a fixed result
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe(pub bool);

impl CapabilityProbe for FixedProbe {
    fn probe(&mut self, reply: ProbeReply) {
        reply.send(self.0);
    }
}

/// Probe that never answers
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProbe;

impl CapabilityProbe for SilentProbe {
    fn probe(&mut self, reply: ProbeReply) {
        warn!("Capability probe unavailable, preferred backend stays unknown");
        drop(reply);
    }
}

/// Probe that hands its reply to the caller to answer later
#[derive(Debug, Clone, Default)]
pub struct DeferredProbe {
    slot: Rc<RefCell<Option<ProbeReply>>>,
}

impl DeferredProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the outstanding probe; returns false when none is pending
    pub fn answer(&self, supported: bool) -> bool {
        match self.slot.borrow_mut().take() {
            Some(reply) => {
                reply.send(supported);
                true
            }
            None => false,
        }
    }
}

impl CapabilityProbe for DeferredProbe {
    fn probe(&mut self, reply: ProbeReply) {
        *self.slot.borrow_mut() = Some(reply);
    }
}
