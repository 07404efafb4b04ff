// Copyright (c) 2021, KTH Royal Institute of Technology.
// SPDX-License-Identifier: AGPL-3.0-only

use crate::{error::ArconResult, function::TimerRegistry};
use core::time::Duration;
use hierarchical_hash_wheel_timer::{
    wheels::{quad_wheel::*, *},
    *,
};
use std::collections::{BTreeSet, HashMap};

/// Wheel entry: timer key and the registration it belongs to
type WheelEntry = (u64, u64);

#[derive(Clone, Copy, Debug)]
struct PendingTimer {
    time: u64,
    generation: u64,
}

/// Pending timers of a single node
///
/// Timers wait in a [QuadWheelWithOverflow] until time reaches them and are
/// then handed out ordered by time and key. The wheel cannot cancel entries,
/// so deleted or replaced registrations are dropped when they come out of it.
#[derive(Default)]
pub struct TimerQueue {
    wheel: QuadWheelWithOverflow<WheelEntry>,
    timers: HashMap<u64, PendingTimer>,
    due: BTreeSet<(u64, u64)>,
    current_time: u64,
    generation: u64,
}

impl TimerQueue {
    /// Time the queue has been advanced to
    #[inline]
    pub fn current_time(&self) -> u64 {
        self.current_time
    }

    /// Advances time to `now` and returns the `(key, time)` pairs due at or before it
    ///
    /// Returned timers stay pending until [TimerQueue::take] claims them.
    pub fn advance_to(&mut self, now: u64) -> ArconResult<Vec<(u64, u64)>> {
        if now > self.current_time {
            let mut time_left = now - self.current_time;
            while time_left > std::u32::MAX as u64 {
                self.tick_and_collect(std::u32::MAX);
                time_left -= std::u32::MAX as u64;
            }
            // this cast must be safe now
            self.tick_and_collect(time_left as u32);
        }

        Ok(self
            .due
            .iter()
            .take_while(|(time, _)| *time <= now)
            .map(|&(time, key)| (key, time))
            .collect())
    }

    /// Claims the due timer for `key` at `time`
    ///
    /// Returns false if it was deleted or replaced in the meantime.
    pub fn take(&mut self, key: u64, time: u64) -> bool {
        let pending_at = self.timers.get(&key).map_or(false, |p| p.time == time);
        if pending_at && self.due.remove(&(time, key)) {
            self.timers.remove(&key);
            true
        } else {
            false
        }
    }

    /// Puts back a claimed timer whose firing failed
    ///
    /// Does nothing if `key` got registered again in the meantime.
    pub fn restore(&mut self, key: u64, time: u64) {
        if self.timers.contains_key(&key) {
            return;
        }
        let generation = self.next_generation();
        self.timers.insert(key, PendingTimer { time, generation });
        self.due.insert((time, key));
    }

    /// Time of the pending timer for `key`
    pub fn get(&self, key: u64) -> Option<u64> {
        self.timers.get(&key).map(|pending| pending.time)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn tick_and_collect(&mut self, mut time_left: u32) {
        while time_left > 0 {
            match self.wheel.can_skip() {
                Skip::Empty => {
                    // Timer is empty, no point in ticking it
                    self.current_time += time_left as u64;
                    return;
                }
                Skip::Millis(skip_ms) => {
                    if skip_ms >= time_left {
                        self.wheel.skip(time_left);
                        self.current_time += time_left as u64;
                        return;
                    } else {
                        self.wheel.skip(skip_ms);
                        self.current_time += skip_ms as u64;
                        time_left -= skip_ms;
                    }
                }
                Skip::None => {
                    self.current_time += 1;
                    for entry in self.wheel.tick() {
                        self.mark_due(entry);
                    }
                    time_left -= 1;
                }
            }
        }
    }

    fn mark_due(&mut self, (key, generation): WheelEntry) {
        if let Some(pending) = self.timers.get(&key) {
            if pending.generation == generation {
                self.due.insert((pending.time, key));
            }
        }
    }
}

impl TimerRegistry for TimerQueue {
    fn register(&mut self, key: u64, timestamp: u64) -> ArconResult<()> {
        if let Some(existing) = self.timers.get(&key) {
            return crate::invalid_argument!(
                "Duplicate key {} registration for the same timer (pending at {})",
                key,
                existing.time
            );
        }

        let generation = self.next_generation();
        if timestamp <= self.current_time {
            self.timers.insert(key, PendingTimer { time: timestamp, generation });
            self.due.insert((timestamp, key));
            return Ok(());
        }

        let delay = timestamp - self.current_time;
        match self
            .wheel
            .insert_with_delay((key, generation), Duration::from_millis(delay))
        {
            Ok(_) => {
                self.timers.insert(key, PendingTimer { time: timestamp, generation });
                Ok(())
            }
            Err(TimerError::Expired(_)) => {
                self.timers.insert(key, PendingTimer { time: timestamp, generation });
                self.due.insert((timestamp, key));
                Ok(())
            }
            Err(f) => crate::reportable_error!("Could not insert timer entry! {:?}", f),
        }
    }

    fn delete(&mut self, key: u64) {
        if let Some(pending) = self.timers.remove(&key) {
            self.due.remove(&(pending.time, key));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn fire_all(timers: &mut TimerQueue, now: u64) -> Vec<(u64, u64)> {
        let due = timers.advance_to(now).unwrap();
        for &(key, time) in due.iter() {
            assert!(timers.take(key, time));
        }
        due
    }

    #[test]
    fn expires_in_time_then_key_order() {
        let mut timers = TimerQueue::default();
        timers.register(3, 20).unwrap();
        timers.register(2, 10).unwrap();
        timers.register(1, 10).unwrap();

        assert!(fire_all(&mut timers, 5).is_empty());
        assert_eq!(fire_all(&mut timers, 15), vec![(1, 10), (2, 10)]);
        assert!(fire_all(&mut timers, 15).is_empty());
        assert_eq!(fire_all(&mut timers, 20), vec![(3, 20)]);
        assert!(timers.is_empty());
        assert_eq!(timers.current_time(), 20);
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut timers = TimerQueue::default();
        timers.register(1, 10).unwrap();
        assert!(matches!(
            timers.register(1, 30),
            Err(Error::InvalidArgument { .. })
        ));
        assert_eq!(timers.get(1), Some(10));
    }

    #[test]
    fn delete_allows_reregistration() {
        let mut timers = TimerQueue::default();
        timers.register(1, 10).unwrap();
        timers.delete(1);
        timers.delete(1);
        assert!(timers.is_empty());
        timers.register(1, 30).unwrap();
        // the deleted registration at 10 must not fire
        assert!(fire_all(&mut timers, 29).is_empty());
        assert_eq!(fire_all(&mut timers, 30), vec![(1, 30)]);
    }

    #[test]
    fn past_registration_is_due_immediately() {
        let mut timers = TimerQueue::default();
        assert!(fire_all(&mut timers, 100).is_empty());
        timers.register(7, 50).unwrap();
        timers.register(8, 100).unwrap();
        assert_eq!(fire_all(&mut timers, 100), vec![(7, 50), (8, 100)]);
    }

    #[test]
    fn due_timers_stay_pending_until_taken() {
        let mut timers = TimerQueue::default();
        timers.register(1, 10).unwrap();
        assert_eq!(timers.advance_to(10).unwrap(), vec![(1, 10)]);
        assert_eq!(timers.advance_to(12).unwrap(), vec![(1, 10)]);

        timers.delete(1);
        assert!(!timers.take(1, 10));
        assert!(timers.advance_to(12).unwrap().is_empty());
    }

    #[test]
    fn restore_puts_claimed_timer_back() {
        let mut timers = TimerQueue::default();
        timers.register(1, 10).unwrap();
        assert_eq!(fire_all(&mut timers, 10), vec![(1, 10)]);
        timers.restore(1, 10);
        assert_eq!(timers.get(1), Some(10));
        assert_eq!(fire_all(&mut timers, 10), vec![(1, 10)]);

        // a newer registration wins over the restored one
        timers.register(1, 40).unwrap();
        timers.restore(1, 10);
        assert_eq!(timers.get(1), Some(40));
    }
}
