//! Stable name → handle resolution
//!
//! Handles mirror the evaluator's string hashing: deterministic within a
//! run, never stable across runs. The memo caches are process-wide and
//! append-only. In-flight requests carry handles by value, so the caches
//! must only ever be cleared at full teardown (test isolation), never
//! mid-run.

use crate::{AfError, AfResult};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Animation state identifier (hash of the state name)
pub type StateHandle = u32;

/// Animator parameter identifier (hash of the parameter name)
pub type ParamHandle = u32;

/// Layer identifier (0-based index)
pub type LayerId = usize;

/// FNV-1a hash of a name; the canonical string→handle mapping
#[inline]
pub fn hash_name(name: &str) -> u32 {
    let mut hash: u32 = 2166136261;
    for byte in name.bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}

lazy_static::lazy_static! {
    static ref STATE_HANDLES: RwLock<HashMap<String, StateHandle>> =
        RwLock::new(HashMap::new());
    static ref PARAM_HANDLES: RwLock<HashMap<String, ParamHandle>> =
        RwLock::new(HashMap::new());
}

fn resolve_in(cache: &RwLock<HashMap<String, u32>>, name: &str) -> AfResult<u32> {
    if name.is_empty() {
        return Err(AfError::InvalidArgument("empty name".to_string()));
    }
    if let Some(handle) = cache.read().get(name) {
        return Ok(*handle);
    }
    let handle = hash_name(name);
    cache.write().insert(name.to_string(), handle);
    Ok(handle)
}

/// Resolve an animation state name to its stable handle (memoized)
pub fn resolve_state(name: &str) -> AfResult<StateHandle> {
    resolve_in(&STATE_HANDLES, name)
}

/// Resolve a parameter name to its stable handle (memoized)
pub fn resolve_param(name: &str) -> AfResult<ParamHandle> {
    resolve_in(&PARAM_HANDLES, name)
}

/// Drop every memoized handle. Full-teardown/test-isolation use only.
pub fn clear_handle_caches() {
    STATE_HANDLES.write().clear();
    PARAM_HANDLES.write().clear();
}
