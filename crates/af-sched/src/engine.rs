//! Animation layer engine
//!
//! Public façade (play / queue / interrupt / parameter setters) plus the
//! frame driver that multiplexes every layer's playback task and weight
//! fade onto one clock.
//!
//! Cancellation is synchronous: once `play` or `interrupt_layer` cancels a
//! playback, its request is back in the pool and its lock released before
//! the call returns. No cancelled task ever runs another side effect.

use crate::config::SchedulerConfig;
use crate::fader::WeightRamp;
use crate::layers::LayerState;
use crate::playback::{Outcome, PlaybackTask, Step};
use crate::request::{CompletionFn, RequestPool};
use af_core::{AfResult, AnimEvaluator, LayerId, resolve_param, resolve_state};
use std::collections::{HashMap, HashSet};

/// Options for a single play/queue call
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayOptions {
    /// Crossfade duration into the state (secs, clamped to >= 0)
    pub fade_secs: f32,
    /// Looping states complete at fade-in and become the layer's
    /// remembered loop
    pub looping: bool,
    /// On completion, re-queue the remembered loop at the queue head
    pub return_to_previous: bool,
    /// Make the layer non-interruptible until this request completes
    pub lock_layer: bool,
}

/// Per-character layer scheduler over an [`AnimEvaluator`]
pub struct AnimLayerEngine<E: AnimEvaluator> {
    evaluator: E,
    cfg: SchedulerConfig,
    layers: HashMap<LayerId, LayerState>,
    locks: HashSet<LayerId>,
    pool: RequestPool,
    enabled: bool,
}

impl<E: AnimEvaluator> AnimLayerEngine<E> {
    pub fn new(evaluator: E) -> Self {
        Self::with_config(evaluator, SchedulerConfig::default())
    }

    pub fn with_config(evaluator: E, cfg: SchedulerConfig) -> Self {
        Self {
            evaluator,
            cfg,
            layers: HashMap::new(),
            locks: HashSet::new(),
            pool: RequestPool::new(),
            enabled: true,
        }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.cfg
    }

    /// Disabling makes every entry point a no-op and terminates in-flight
    /// tasks on the next tick
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn executable(&self) -> bool {
        self.enabled && self.evaluator.is_ready()
    }

    fn valid_layer(&self, layer: LayerId) -> bool {
        if layer < self.evaluator.layer_count() {
            return true;
        }
        log::warn!(
            "layer {} out of range (evaluator has {})",
            layer,
            self.evaluator.layer_count()
        );
        false
    }

    /// Interrupt-and-replace: cancel the layer's active playback (callback
    /// never fires), drop everything queued, then queue `name`.
    ///
    /// No-op when the system is not executable or the layer is locked.
    /// Fails only on an empty state name.
    pub fn play(
        &mut self,
        name: &str,
        layer: LayerId,
        opts: PlayOptions,
        on_complete: Option<CompletionFn>,
    ) -> AfResult<()> {
        let state = resolve_state(name)?;
        if !self.executable() || !self.valid_layer(layer) {
            return Ok(());
        }
        if self.locks.contains(&layer) {
            log::debug!("play '{}' ignored: layer {} is locked", name, layer);
            return Ok(());
        }
        self.cancel_active(layer);
        {
            let Self { layers, pool, .. } = self;
            if let Some(slot) = layers.get_mut(&layer) {
                slot.clear_pending(pool);
            }
        }
        self.enqueue(state, name, layer, opts, on_complete);
        Ok(())
    }

    /// Append a request to the layer's queue; starts it immediately when
    /// the layer is idle. A looping request also becomes the layer's
    /// remembered loop.
    pub fn queue(
        &mut self,
        name: &str,
        layer: LayerId,
        opts: PlayOptions,
        on_complete: Option<CompletionFn>,
    ) -> AfResult<()> {
        let state = resolve_state(name)?;
        if !self.executable() || !self.valid_layer(layer) {
            return Ok(());
        }
        self.enqueue(state, name, layer, opts, on_complete);
        Ok(())
    }

    /// Stop everything on the layer: active playback (no callback), fade,
    /// queue, and remembered loop. `force` clears a lock regardless of its
    /// source. Idempotent on an already-idle, zero-weight layer.
    pub fn interrupt_layer(&mut self, layer: LayerId, fade_out_secs: f32, force: bool) {
        if !self.executable() || !self.valid_layer(layer) {
            return;
        }
        if self.locks.contains(&layer) {
            if !force {
                return;
            }
            self.locks.remove(&layer);
        }
        self.cancel_active(layer);
        {
            let Self { layers, pool, .. } = self;
            if let Some(slot) = layers.get_mut(&layer) {
                slot.fade_out = None;
                slot.clear_pending(pool);
                if let Some(remembered) = slot.remembered_loop.take() {
                    pool.release(remembered);
                }
            }
        }
        let weight = self.evaluator.layer_weight(layer);
        if fade_out_secs > 0.0 && weight > 0.0 {
            self.layers.entry(layer).or_default().fade_out =
                Some(WeightRamp::new(weight, 0.0, fade_out_secs));
        } else if weight != 0.0 {
            self.evaluator.set_layer_weight(layer, 0.0);
        }
    }

    pub fn is_layer_locked(&self, layer: LayerId) -> bool {
        self.locks.contains(&layer)
    }

    /// A playback is running or requests are pending on the layer
    pub fn is_layer_playing(&self, layer: LayerId) -> bool {
        self.layers
            .get(&layer)
            .is_some_and(|slot| slot.active.is_some() || !slot.queue.is_empty())
    }

    pub fn is_any_layer_playing(&self) -> bool {
        self.layers
            .values()
            .any(|slot| slot.active.is_some() || !slot.queue.is_empty())
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> AfResult<()> {
        let param = resolve_param(name)?;
        if self.executable() {
            self.evaluator.set_float(param, value);
        }
        Ok(())
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> AfResult<()> {
        let param = resolve_param(name)?;
        if self.executable() {
            self.evaluator.set_bool(param, value);
        }
        Ok(())
    }

    pub fn set_int(&mut self, name: &str, value: i32) -> AfResult<()> {
        let param = resolve_param(name)?;
        if self.executable() {
            self.evaluator.set_int(param, value);
        }
        Ok(())
    }

    pub fn set_trigger(&mut self, name: &str) -> AfResult<()> {
        let param = resolve_param(name)?;
        if self.executable() {
            self.evaluator.set_trigger(param);
        }
        Ok(())
    }

    /// Advance the frame clock: every layer's fade-out and playback task
    /// move by `dt_secs`. When the system is not executable, in-flight
    /// tasks terminate cleanly (locks released, no callbacks); queued
    /// requests stay put and restart on the next executable tick.
    pub fn tick(&mut self, dt_secs: f32) {
        if !self.executable() {
            self.abandon_all();
            return;
        }
        let mut indices: Vec<LayerId> = self.layers.keys().copied().collect();
        indices.sort_unstable();
        for layer in indices {
            self.tick_fade_out(layer, dt_secs);
            self.tick_playback(layer, dt_secs);
            // A non-executable frame cancels active tasks but keeps the
            // queues; restart any layer left with pending requests.
            self.try_start_next(layer);
        }
    }

    /// Synchronous cancellation of the layer's active playback: lock
    /// released, request back in the pool, callback dropped unfired.
    fn cancel_active(&mut self, layer: LayerId) {
        let task = self.layers.get_mut(&layer).and_then(|slot| slot.active.take());
        if let Some(task) = task {
            let request = task.into_request();
            if request.lock_layer {
                self.locks.remove(&layer);
            }
            self.pool.release(request);
        }
    }

    fn enqueue(
        &mut self,
        state: af_core::StateHandle,
        name: &str,
        layer: LayerId,
        opts: PlayOptions,
        on_complete: Option<CompletionFn>,
    ) {
        let mut request = self.pool.acquire();
        request.state = state;
        request.state_name.push_str(name);
        request.fade_secs = opts.fade_secs.max(0.0);
        request.looping = opts.looping;
        request.return_to_previous = opts.return_to_previous;
        request.lock_layer = opts.lock_layer;
        request.on_complete = on_complete;

        if opts.looping {
            // Independent copy for later return-to-previous; replaces the
            // previous remembered loop.
            let mut remembered = self.pool.acquire();
            remembered.state = state;
            remembered.state_name.push_str(name);
            remembered.fade_secs = self.cfg.loop_return_fade_secs;
            remembered.looping = true;
            let Self { layers, pool, .. } = self;
            let slot = layers.entry(layer).or_default();
            if let Some(old) = slot.remembered_loop.replace(remembered) {
                pool.release(old);
            }
        }

        let slot = self.layers.entry(layer).or_default();
        slot.queue.push_back(request);
        if slot.active.is_none() {
            self.try_start_next(layer);
        }
    }

    /// Dequeue and start the layer's next request, if idle and executable.
    /// Runs the task's first frame synchronously so a crossfade on an
    /// already-visible layer is issued by this call.
    fn try_start_next(&mut self, layer: LayerId) {
        if !self.executable() {
            return;
        }
        let request = {
            let Some(slot) = self.layers.get_mut(&layer) else {
                return;
            };
            if slot.active.is_some() {
                return;
            }
            let Some(request) = slot.queue.pop_front() else {
                return;
            };
            // A new playback always wins over an in-flight fade-out.
            slot.fade_out = None;
            request
        };
        if request.lock_layer {
            self.locks.insert(layer);
        }
        let mut task = PlaybackTask::new(layer, request);
        match task.advance(&mut self.evaluator, &self.cfg, 0.0) {
            Step::Pending => {
                if let Some(slot) = self.layers.get_mut(&layer) {
                    slot.active = Some(task);
                }
            }
            Step::Finished(outcome) => self.finish_playback(layer, task, outcome),
        }
    }

    fn tick_fade_out(&mut self, layer: LayerId, dt_secs: f32) {
        let ramp = self.layers.get_mut(&layer).and_then(|slot| slot.fade_out.take());
        if let Some(mut ramp) = ramp {
            let weight = ramp.advance(dt_secs);
            self.evaluator.set_layer_weight(layer, weight);
            // Completion leaves the slot empty so idle detection works.
            if !ramp.finished() {
                if let Some(slot) = self.layers.get_mut(&layer) {
                    slot.fade_out = Some(ramp);
                }
            }
        }
    }

    fn tick_playback(&mut self, layer: LayerId, dt_secs: f32) {
        let task = self.layers.get_mut(&layer).and_then(|slot| slot.active.take());
        if let Some(mut task) = task {
            match task.advance(&mut self.evaluator, &self.cfg, dt_secs) {
                Step::Pending => {
                    if let Some(slot) = self.layers.get_mut(&layer) {
                        slot.active = Some(task);
                    }
                }
                Step::Finished(outcome) => self.finish_playback(layer, task, outcome),
            }
        }
    }

    /// The unconditional finish step: chain logic, then release the lock,
    /// release the request, and attempt the next queued request. Runs
    /// exactly once per playback attempt, on every exit path.
    fn finish_playback(&mut self, layer: LayerId, task: PlaybackTask, outcome: Outcome) {
        let request = task.into_request();
        if outcome == Outcome::Completed && !request.looping {
            let chained = request.return_to_previous && self.requeue_remembered(layer);
            let queue_empty = self
                .layers
                .get(&layer)
                .is_none_or(|slot| slot.queue.is_empty());
            if !chained && queue_empty {
                self.start_idle_fade_out(layer);
            }
        }
        if request.lock_layer {
            self.locks.remove(&layer);
        }
        self.pool.release(request);
        self.try_start_next(layer);
    }

    /// Head-insert a fresh copy of the layer's remembered loop; it takes
    /// priority over anything queued during the finished playback
    fn requeue_remembered(&mut self, layer: LayerId) -> bool {
        let Self { layers, pool, .. } = self;
        let Some(slot) = layers.get_mut(&layer) else {
            return false;
        };
        let Some(remembered) = slot.remembered_loop.as_ref() else {
            return false;
        };
        let mut copy = pool.acquire();
        copy.state = remembered.state;
        copy.state_name.push_str(&remembered.state_name);
        copy.fade_secs = remembered.fade_secs;
        copy.looping = true;
        slot.queue.push_front(copy);
        true
    }

    /// An idle layer with nothing queued recedes instead of holding its
    /// last pose at full weight indefinitely
    fn start_idle_fade_out(&mut self, layer: LayerId) {
        let weight = self.evaluator.layer_weight(layer);
        if weight <= 0.0 {
            return;
        }
        if let Some(slot) = self.layers.get_mut(&layer) {
            slot.fade_out = Some(WeightRamp::new(weight, 0.0, self.cfg.idle_fade_out_secs));
        }
    }

    fn abandon_all(&mut self) {
        let indices: Vec<LayerId> = self.layers.keys().copied().collect();
        for layer in indices {
            self.cancel_active(layer);
            if let Some(slot) = self.layers.get_mut(&layer) {
                slot.fade_out = None;
            }
        }
    }
}
