// Copyright (c) 2021, KTH Royal Institute of Technology.
// SPDX-License-Identifier: AGPL-3.0-only

use crate::error::ArconResult;

/// Registry the hosting node hands to a [TimerFunction]
///
/// A key identifies at most one pending timer.
pub trait TimerRegistry {
    /// Schedule a timer for `key` at `timestamp`
    ///
    /// Fails if a timer for `key` is already pending.
    fn register(&mut self, key: u64, timestamp: u64) -> ArconResult<()>;
    /// Remove the pending timer for `key`, if any
    fn delete(&mut self, key: u64);
}

/// Optional capability for functions that react to timers
pub trait TimerFunction<OUT>: Send + Sync {
    /// Called once when the hosting node starts
    fn register_timers(&self, timers: &mut dyn TimerRegistry) -> ArconResult<()>;

    /// Called when the timer registered under `key` fires
    fn on_timer(
        &self,
        key: u64,
        timestamp: u64,
        timers: &mut dyn TimerRegistry,
    ) -> ArconResult<Vec<OUT>>;
}
