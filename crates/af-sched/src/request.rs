//! Playback requests and the reuse pool
//!
//! One [`PlayRequest`] describes a single queued playback intent. Requests
//! follow a strict single-ownership handoff — layer queue → active
//! playback → pool — which is what makes recycling them safe: a released
//! request is never referenced again by its prior owner.

use af_core::StateHandle;
use std::fmt;

/// One-shot completion callback, invoked at most once from the frame tick.
/// Never invoked after the request is cancelled or discarded.
pub type CompletionFn = Box<dyn FnOnce()>;

/// One queued playback intent
#[derive(Default)]
pub struct PlayRequest {
    /// Resolved state handle (carried by value, not re-looked-up)
    pub state: StateHandle,
    /// State name kept for diagnostics and remembered-loop copies
    pub state_name: String,
    /// Crossfade duration into the state (secs, >= 0)
    pub fade_secs: f32,
    /// Looping states complete as soon as their crossfade-in finishes
    pub looping: bool,
    /// Re-queue the layer's remembered loop at the queue head on completion
    pub return_to_previous: bool,
    /// Make the layer non-interruptible while this request plays
    pub lock_layer: bool,
    /// Fired exactly once on completion; dropped unfired on cancellation
    pub on_complete: Option<CompletionFn>,
}

impl fmt::Debug for PlayRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayRequest")
            .field("state", &self.state)
            .field("state_name", &self.state_name)
            .field("fade_secs", &self.fade_secs)
            .field("looping", &self.looping)
            .field("return_to_previous", &self.return_to_previous)
            .field("lock_layer", &self.lock_layer)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl PlayRequest {
    fn reset(&mut self) {
        self.state = 0;
        self.state_name.clear();
        self.fade_secs = 0.0;
        self.looping = false;
        self.return_to_previous = false;
        self.lock_layer = false;
        self.on_complete = None;
    }
}

/// Free-list of spent requests
///
/// Avoids per-call allocation on the hot play/queue path. Purely a
/// performance optimization; behavior is identical to plain allocation.
#[derive(Debug, Default)]
pub struct RequestPool {
    free: Vec<PlayRequest>,
}

impl RequestPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a zeroed request, recycled if one is available
    pub fn acquire(&mut self) -> PlayRequest {
        self.free.pop().unwrap_or_default()
    }

    /// Reset every field and return the request to the free list.
    /// Any un-fired completion callback is dropped here.
    pub fn release(&mut self, mut request: PlayRequest) {
        request.reset();
        self.free.push(request);
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }
}
