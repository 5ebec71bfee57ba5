//! Timer bookkeeping for Horizon Trellis.
//!
//! [`TimerManager`] only tracks deadlines; the per-thread
//! [`EventLoop`](crate::EventLoop) owns the callbacks and fires them.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};

use crate::error::{Result, TimerError};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// The type of timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Fires once after the specified duration.
    OneShot,
    /// Fires repeatedly at the specified interval.
    Repeating,
}

#[derive(Debug)]
struct TimerData {
    next_fire: Instant,
    interval: Duration,
    kind: TimerKind,
}

/// An entry in the timer queue (min-heap by fire time, then by insertion).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
    seq: u64,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time && self.seq == other.seq
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other
            .fire_time
            .cmp(&self.fire_time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Manages timer deadlines.
pub struct TimerManager {
    timers: SlotMap<TimerId, TimerData>,
    queue: BinaryHeap<TimerQueueEntry>,
    next_seq: u64,
}

impl TimerManager {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    fn schedule(&mut self, id: TimerId, fire_time: Instant) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(TimerQueueEntry { id, fire_time, seq });
    }

    fn start(&mut self, interval: Duration, kind: TimerKind) -> TimerId {
        let next_fire = Instant::now() + interval;
        let id = self.timers.insert(TimerData {
            next_fire,
            interval,
            kind,
        });
        self.schedule(id, next_fire);
        tracing::trace!(target: targets::TIMER, ?id, ?interval, ?kind, "timer started");
        id
    }

    /// Start a one-shot timer that fires after the specified duration.
    pub fn start_one_shot(&mut self, duration: Duration) -> TimerId {
        self.start(duration, TimerKind::OneShot)
    }

    /// Start a repeating timer; the first fire occurs after `interval`.
    pub fn start_repeating(&mut self, interval: Duration) -> TimerId {
        self.start(interval, TimerKind::Repeating)
    }

    /// Stop and remove a timer.
    pub fn stop(&mut self, id: TimerId) -> Result<()> {
        self.timers
            .remove(id)
            .map(|_| tracing::trace!(target: targets::TIMER, ?id, "timer stopped"))
            .ok_or_else(|| TimerError::InvalidTimerId.into())
    }

    /// Check if a timer is currently active.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Get the duration until the next timer fires, if any.
    pub fn time_until_next(&mut self) -> Option<Duration> {
        while let Some(entry) = self.queue.peek() {
            let stale = self
                .timers
                .get(entry.id)
                .is_none_or(|t| t.next_fire != entry.fire_time);
            if stale {
                self.queue.pop();
            } else {
                break;
            }
        }

        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_duration_since(Instant::now()))
    }

    /// Collect the timers that are due now, in deadline order.
    ///
    /// One-shot timers are removed; repeating timers are rescheduled one
    /// interval after `now`, so each fires at most once per call.
    #[tracing::instrument(skip(self), target = "horizon_trellis_core::timer", level = "trace")]
    pub fn process_expired(&mut self) -> Vec<TimerId> {
        let now = Instant::now();
        let mut fired = Vec::new();
        let mut rescheduled = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            let Some(timer) = self.timers.get_mut(entry.id) else {
                continue;
            };
            if timer.next_fire != entry.fire_time {
                continue;
            }

            tracing::trace!(target: targets::TIMER, id = ?entry.id, "timer fired");
            fired.push(entry.id);

            match timer.kind {
                TimerKind::OneShot => {
                    self.timers.remove(entry.id);
                }
                TimerKind::Repeating => {
                    timer.next_fire = now + timer.interval;
                    rescheduled.push((entry.id, timer.next_fire));
                }
            }
        }

        for (id, fire_time) in rescheduled {
            self.schedule(id, fire_time);
        }
        fired
    }

    /// Get the number of active timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_fires_once() {
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(Duration::ZERO);

        assert_eq!(timers.process_expired(), vec![id]);
        assert!(!timers.is_active(id));
        assert!(timers.process_expired().is_empty());
    }

    #[test]
    fn test_repeating_is_rescheduled() {
        let mut timers = TimerManager::new();
        let id = timers.start_repeating(Duration::ZERO);

        assert_eq!(timers.process_expired(), vec![id]);
        assert!(timers.is_active(id));
        timers.stop(id).unwrap();
        assert!(timers.stop(id).is_err());
    }

    #[test]
    fn test_expired_in_deadline_order() {
        let mut timers = TimerManager::new();
        let first = timers.start_one_shot(Duration::ZERO);
        let second = timers.start_one_shot(Duration::ZERO);
        let later = timers.start_one_shot(Duration::from_secs(60));

        assert_eq!(timers.process_expired(), vec![first, second]);
        assert!(timers.is_active(later));
        assert!(timers.time_until_next().unwrap() > Duration::from_secs(50));
    }

    #[test]
    fn test_stopped_timer_not_fired() {
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(Duration::ZERO);
        timers.stop(id).unwrap();
        assert!(timers.process_expired().is_empty());
        assert_eq!(timers.time_until_next(), None);
        assert_eq!(timers.active_count(), 0);
    }
}
