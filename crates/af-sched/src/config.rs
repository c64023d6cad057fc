//! Scheduler configuration
//!
//! Durations the scheduler falls back to when a request does not carry its
//! own: weight ramp times, the remembered-loop crossfade, and the
//! clip-length probe budget.

use af_core::AfResult;
use serde::{Deserialize, Serialize};

/// Scheduler timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Weight ramp duration when a layer activates (secs)
    #[serde(default = "default_layer_fade_in")]
    pub layer_fade_in_secs: f32,
    /// Weight ramp duration when a layer's queue drains (secs)
    #[serde(default = "default_idle_fade_out")]
    pub idle_fade_out_secs: f32,
    /// Crossfade used when a remembered loop is re-queued (secs)
    #[serde(default = "default_loop_return_fade")]
    pub loop_return_fade_secs: f32,
    /// Hard frame-time budget for the clip-length probe (secs)
    #[serde(default = "default_probe_timeout")]
    pub clip_probe_timeout_secs: f32,
}

fn default_layer_fade_in() -> f32 {
    0.25
}
fn default_idle_fade_out() -> f32 {
    0.2
}
fn default_loop_return_fade() -> f32 {
    0.25
}
fn default_probe_timeout() -> f32 {
    1.0
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            layer_fade_in_secs: 0.25,
            idle_fade_out_secs: 0.2,
            loop_return_fade_secs: 0.25,
            clip_probe_timeout_secs: 1.0,
        }
    }
}

impl SchedulerConfig {
    /// Parse a configuration from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> AfResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> AfResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
