//! Skeletal evaluator abstraction
//!
//! The scheduler never samples or blends animation itself. It asks the
//! evaluator to crossfade between states, reads back transition and clip
//! info, and drives per-layer weights. Everything behind this trait
//! (blend-tree math, IK, retargeting) is out of scope.

use crate::{LayerId, ParamHandle, StateHandle, hash_name};

/// Snapshot of the state currently occupying a layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateInfo {
    /// Handle of the current state
    pub handle: StateHandle,
    /// Playback speed multiplier reported by the evaluator
    pub speed: f32,
}

/// External skeletal-animation evaluator (crossfade blending, clip
/// sampling, layer weighting)
pub trait AnimEvaluator {
    /// Number of layers exposed by the bound controller
    fn layer_count(&self) -> usize;

    /// Start a crossfade to `state` over `fade_secs` on `layer`,
    /// entering the target clip at `normalized_start` (0..1)
    fn crossfade_to(
        &mut self,
        state: StateHandle,
        fade_secs: f32,
        layer: LayerId,
        normalized_start: f32,
    );

    fn layer_weight(&self, layer: LayerId) -> f32;

    fn set_layer_weight(&mut self, layer: LayerId, weight: f32);

    /// Whether the layer is currently mid-transition between states
    fn in_transition(&self, layer: LayerId) -> bool;

    /// Info for the state currently occupying the layer
    fn current_state(&self, layer: LayerId) -> StateInfo;

    /// Natural length of the layer's current clip in seconds, if one is
    /// known. Multi-clip blend states may never report a length.
    fn current_clip_length(&self, layer: LayerId) -> Option<f32>;

    /// Diagnostic-only: whether the bound controller has `state` on `layer`
    fn has_state(&self, layer: LayerId, state: StateHandle) -> bool;

    fn set_float(&mut self, param: ParamHandle, value: f32);
    fn set_bool(&mut self, param: ParamHandle, value: bool);
    fn set_int(&mut self, param: ParamHandle, value: i32);
    fn set_trigger(&mut self, param: ParamHandle);

    /// Evaluator attached, enabled, and bound to a controller
    fn is_ready(&self) -> bool;

    /// Evaluator-side name hashing; must agree with [`hash_name`]
    fn string_to_handle(&self, name: &str) -> StateHandle {
        hash_name(name)
    }
}
