//! Playback state machine
//!
//! The per-layer task driving crossfade → fade window → clip end →
//! completion. One instance runs per layer at a time; the engine's frame
//! tick advances it, and the engine runs the unconditional finish step
//! (release lock, release request, start next) when it exits — on the
//! success path and on every early exit alike.
//!
//! The post-fade wait for a non-looping clip is a fixed sleep for the
//! derived remaining duration, re-checking executability each tick. State
//! divergence forced by the evaluator itself during that window is not
//! observed.

use crate::config::SchedulerConfig;
use crate::fader::WeightRamp;
use crate::request::PlayRequest;
use af_core::{AnimEvaluator, LayerId};

/// A layer counts as fully visible above this weight; the fade-in ramp is
/// skipped once it holds.
const WEIGHT_SETTLED: f32 = 0.995;

/// Phase of an active playback
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackPhase {
    /// First frame: diagnostics, then pick fade-in or crossfade directly
    Starting,
    /// Ramping the layer weight toward 1 before the crossfade is issued
    FadingIn(WeightRamp),
    /// Crossfade issued; waiting out the fade window
    FadeWindow { remaining_secs: f32 },
    /// Polling the evaluator for the settled target state and clip length
    ProbingLength { elapsed_secs: f32 },
    /// Fixed wait for the remainder of the clip
    AwaitingClipEnd { remaining_secs: f32 },
}

/// How a playback attempt left the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Ran to completion; the completion callback has fired
    Completed,
    /// Terminated early (non-executable, missing state, probe timeout);
    /// no callback fired
    Abandoned,
}

/// Result of advancing a playback task by one frame
#[derive(Debug, Clone, Copy)]
pub enum Step {
    Pending,
    Finished(Outcome),
}

/// One playback attempt for one request on one layer
#[derive(Debug)]
pub struct PlaybackTask {
    layer: LayerId,
    request: PlayRequest,
    phase: PlaybackPhase,
}

impl PlaybackTask {
    pub fn new(layer: LayerId, request: PlayRequest) -> Self {
        Self {
            layer,
            request,
            phase: PlaybackPhase::Starting,
        }
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn request(&self) -> &PlayRequest {
        &self.request
    }

    pub fn phase(&self) -> &PlaybackPhase {
        &self.phase
    }

    /// Hand the request back for the finish step
    pub fn into_request(self) -> PlayRequest {
        self.request
    }

    /// Advance by one frame of elapsed time.
    ///
    /// Zero-duration phases cascade within a single call (a crossfade on an
    /// already-visible layer is issued by the starting call itself); timed
    /// waits consume the frame's dt once.
    pub fn advance<E: AnimEvaluator>(
        &mut self,
        evaluator: &mut E,
        cfg: &SchedulerConfig,
        dt_secs: f32,
    ) -> Step {
        if !evaluator.is_ready() {
            return Step::Finished(Outcome::Abandoned);
        }
        let mut budget = dt_secs;
        let mut take_dt = || std::mem::replace(&mut budget, 0.0);

        loop {
            match &mut self.phase {
                PlaybackPhase::Starting => {
                    // Diagnostic builds verify the target state exists.
                    if cfg!(debug_assertions)
                        && !evaluator.has_state(self.layer, self.request.state)
                    {
                        log::error!(
                            "state '{}' ({:#010x}) not found on layer {}",
                            self.request.state_name,
                            self.request.state,
                            self.layer
                        );
                        return Step::Finished(Outcome::Abandoned);
                    }
                    let weight = evaluator.layer_weight(self.layer);
                    if weight >= WEIGHT_SETTLED {
                        self.issue_crossfade(evaluator);
                    } else {
                        self.phase = PlaybackPhase::FadingIn(WeightRamp::new(
                            weight,
                            1.0,
                            cfg.layer_fade_in_secs,
                        ));
                    }
                }
                PlaybackPhase::FadingIn(ramp) => {
                    let weight = ramp.advance(take_dt());
                    evaluator.set_layer_weight(self.layer, weight);
                    if !ramp.finished() {
                        return Step::Pending;
                    }
                    self.issue_crossfade(evaluator);
                }
                PlaybackPhase::FadeWindow { remaining_secs } => {
                    *remaining_secs -= take_dt();
                    if *remaining_secs > 0.0 {
                        return Step::Pending;
                    }
                    if self.request.looping {
                        // A loop runs indefinitely; it counts as complete
                        // as soon as its crossfade-in finishes.
                        self.fire_completion();
                        return Step::Finished(Outcome::Completed);
                    }
                    self.phase = PlaybackPhase::ProbingLength { elapsed_secs: 0.0 };
                }
                PlaybackPhase::ProbingLength { elapsed_secs } => {
                    let info = evaluator.current_state(self.layer);
                    let settled =
                        !evaluator.in_transition(self.layer) && info.handle == self.request.state;
                    if settled {
                        if let Some(length) = evaluator.current_clip_length(self.layer) {
                            let speed = if info.speed.abs() < f32::EPSILON {
                                1.0
                            } else {
                                info.speed.abs()
                            };
                            let remaining = length / speed - self.request.fade_secs;
                            if remaining > 0.0 {
                                self.phase = PlaybackPhase::AwaitingClipEnd {
                                    remaining_secs: remaining,
                                };
                                return Step::Pending;
                            }
                            self.fire_completion();
                            return Step::Finished(Outcome::Completed);
                        }
                    }
                    *elapsed_secs += take_dt();
                    if *elapsed_secs >= cfg.clip_probe_timeout_secs {
                        // Soft failure: exotic state graphs (multi-clip
                        // blend states) may never report a length.
                        log::debug!(
                            "clip length probe timed out for '{}' on layer {}",
                            self.request.state_name,
                            self.layer
                        );
                        return Step::Finished(Outcome::Abandoned);
                    }
                    return Step::Pending;
                }
                PlaybackPhase::AwaitingClipEnd { remaining_secs } => {
                    *remaining_secs -= take_dt();
                    if *remaining_secs > 0.0 {
                        return Step::Pending;
                    }
                    self.fire_completion();
                    return Step::Finished(Outcome::Completed);
                }
            }
        }
    }

    fn issue_crossfade<E: AnimEvaluator>(&mut self, evaluator: &mut E) {
        log::debug!(
            "crossfade to '{}' over {:.3}s on layer {}",
            self.request.state_name,
            self.request.fade_secs,
            self.layer
        );
        evaluator.crossfade_to(self.request.state, self.request.fade_secs, self.layer, 0.0);
        self.phase = PlaybackPhase::FadeWindow {
            remaining_secs: self.request.fade_secs,
        };
    }

    fn fire_completion(&mut self) {
        if let Some(callback) = self.request.on_complete.take() {
            callback();
        }
    }
}
