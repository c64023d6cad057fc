//! Per-layer scheduling state
//!
//! One entry per layer index, created lazily on first use. Holds the FIFO
//! request queue, the running playback task, the running fade-out, and the
//! remembered "last looping request" used by return-to-previous.
//!
//! Invariants: at most one active playback and at most one fade-out per
//! layer; requests are never shared between layers.

use crate::fader::WeightRamp;
use crate::playback::PlaybackTask;
use crate::request::{PlayRequest, RequestPool};
use std::collections::VecDeque;

/// Scheduling state for one layer index
#[derive(Debug, Default)]
pub struct LayerState {
    /// Pending requests, FIFO. Head insertion is used only by
    /// return-to-previous.
    pub queue: VecDeque<PlayRequest>,
    /// The running playback state machine, if any
    pub active: Option<PlaybackTask>,
    /// The running weight fade-out, if any
    pub fade_out: Option<WeightRamp>,
    /// Most recently queued looping request; replaced on each new loop
    pub remembered_loop: Option<PlayRequest>,
}

impl LayerState {
    /// Release every pending request back to the pool.
    /// The remembered loop survives; interrupt clears it separately.
    pub fn clear_pending(&mut self, pool: &mut RequestPool) {
        while let Some(request) = self.queue.pop_front() {
            pool.release(request);
        }
    }

    /// No playback running, nothing queued, no fade in flight
    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.queue.is_empty() && self.fade_out.is_none()
    }
}
