//! # AnimForge Layer Scheduler
//!
//! Per-character animation layer scheduler sitting on top of an external
//! skeletal evaluator. The evaluator does the blending; this crate decides
//! *when* to ask it to transition and *when* a transition counts as done.
//!
//! ## Architecture
//!
//! - **Requests**: Pooled value objects describing one playback intent
//! - **Layer queues**: Per-layer FIFO of pending requests plus the
//!   remembered "last looping request" used by return-to-previous
//! - **Locks**: Layers whose active playback is non-interruptible
//! - **Playback**: The per-layer state machine driving
//!   crossfade → fade window → clip end → chain-to-next
//! - **Weight fades**: Independent per-layer ramps so interrupted or idle
//!   layers recede instead of holding their last pose
//!
//! ## Scheduling model
//!
//! Single-threaded cooperative, frame-driven. Every layer's playback task
//! and fade task is multiplexed onto one clock via
//! [`AnimLayerEngine::tick`]; shared state is only touched while a task is
//! running, so no locking is needed.

pub mod config;
pub mod engine;
pub mod fader;
pub mod layers;
pub mod playback;
pub mod request;

pub use config::*;
pub use engine::*;
pub use fader::*;
pub use layers::*;
pub use playback::*;
pub use request::*;
