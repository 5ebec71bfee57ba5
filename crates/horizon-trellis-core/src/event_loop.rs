//! Per-thread event loop.
//!
//! Every thread that schedules timers, posts tasks or defers deletions owns
//! its own loop; work only runs when that thread pumps it with
//! [`EventLoop::process_events`] (or one of the bounded variants). Callbacks
//! run with no loop state borrowed, so they may schedule or cancel work
//! re-entrantly.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use std::time::Duration;
//! use horizon_trellis_core::EventLoop;
//!
//! let fired = Rc::new(Cell::new(false));
//! let flag = fired.clone();
//! EventLoop::start_timer(Duration::from_millis(5), move || flag.set(true));
//!
//! assert!(EventLoop::process_events_until(Duration::from_secs(1), || fired.get()));
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::logging::targets;
use crate::signal::Signal;
use crate::timer::{TimerId, TimerManager};

enum TimerCallback {
    Once(Box<dyn FnOnce()>),
    Repeating(Box<dyn FnMut()>),
}

type Task = Box<dyn FnOnce()>;

#[derive(Default)]
struct LoopState {
    timers: TimerManager,
    callbacks: HashMap<TimerId, TimerCallback>,
    tasks: VecDeque<Task>,
    deletions: Vec<Box<dyn Any>>,
}

thread_local! {
    static LOOP: RefCell<LoopState> = RefCell::new(LoopState::default());
}

/// Longest single sleep while waiting for the next deadline.
const MAX_IDLE_SLEEP: Duration = Duration::from_millis(2);

/// Handle to the current thread's event loop.
///
/// All functions operate on the calling thread's loop.
pub struct EventLoop;

impl EventLoop {
    /// Run `callback` once after `delay`.
    pub fn start_timer<F>(delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        LOOP.with_borrow_mut(|state| {
            let id = state.timers.start_one_shot(delay);
            state.callbacks.insert(id, TimerCallback::Once(Box::new(callback)));
            id
        })
    }

    /// Run `callback` every `interval` until the timer is stopped.
    pub fn start_repeating_timer<F>(interval: Duration, callback: F) -> TimerId
    where
        F: FnMut() + 'static,
    {
        LOOP.with_borrow_mut(|state| {
            let id = state.timers.start_repeating(interval);
            state
                .callbacks
                .insert(id, TimerCallback::Repeating(Box::new(callback)));
            id
        })
    }

    /// Stop a timer. Returns `false` if it was not active on this thread.
    pub fn stop_timer(id: TimerId) -> bool {
        let (callback, stopped) = LOOP.with_borrow_mut(|state| {
            (state.callbacks.remove(&id), state.timers.stop(id).is_ok())
        });
        // The callback may own the last handle to something that touches the
        // loop when dropped.
        drop(callback);
        stopped
    }

    /// Whether a timer is scheduled on this thread.
    pub fn is_timer_active(id: TimerId) -> bool {
        LOOP.with_borrow(|state| state.timers.is_active(id))
    }

    /// Number of active timers on this thread.
    pub fn active_timer_count() -> usize {
        LOOP.with_borrow(|state| state.timers.active_count())
    }

    /// Queue a task for the next [`process_events`](Self::process_events).
    pub fn post_task<F>(task: F)
    where
        F: FnOnce() + 'static,
    {
        LOOP.with_borrow_mut(|state| state.tasks.push_back(Box::new(task)));
    }

    /// Drop `value` during the next [`process_events`](Self::process_events).
    pub fn delete_later<T: 'static>(value: T) {
        LOOP.with_borrow_mut(|state| state.deletions.push(Box::new(value)));
    }

    /// Number of deferred deletions waiting on this thread.
    pub fn pending_deletions() -> usize {
        LOOP.with_borrow(|state| state.deletions.len())
    }

    /// Run expired timers, then posted tasks, then deferred deletions.
    ///
    /// Work scheduled while this runs waits for the next call. Returns the
    /// number of items processed.
    #[tracing::instrument(target = "horizon_trellis_core::event_loop", level = "trace")]
    pub fn process_events() -> usize {
        let expired = LOOP.with_borrow_mut(|state| state.timers.process_expired());
        let mut processed = 0;

        for id in expired {
            let callback = LOOP.with_borrow_mut(|state| state.callbacks.remove(&id));
            match callback {
                Some(TimerCallback::Once(callback)) => callback(),
                Some(TimerCallback::Repeating(mut callback)) => {
                    callback();
                    let stopped = LOOP.with_borrow_mut(|state| {
                        if state.timers.is_active(id) && !state.callbacks.contains_key(&id) {
                            state.callbacks.insert(id, TimerCallback::Repeating(callback));
                            None
                        } else {
                            Some(callback)
                        }
                    });
                    drop(stopped);
                }
                None => continue,
            }
            processed += 1;
        }

        let tasks: Vec<Task> = LOOP.with_borrow_mut(|state| state.tasks.drain(..).collect());
        processed += tasks.len();
        for task in tasks {
            task();
        }

        let deletions = LOOP.with_borrow_mut(|state| std::mem::take(&mut state.deletions));
        processed += deletions.len();
        drop(deletions);

        if processed > 0 {
            tracing::trace!(target: targets::EVENT_LOOP, processed, "processed events");
        }
        processed
    }

    /// Pump the loop for `duration`, sleeping between deadlines.
    pub fn process_events_for(duration: Duration) {
        let deadline = Instant::now() + duration;
        loop {
            Self::process_events();
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(Self::idle_sleep(deadline - now));
        }
    }

    /// Pump the loop until `predicate` holds or `timeout` elapses.
    ///
    /// Returns whether the predicate was satisfied.
    pub fn process_events_until<P>(timeout: Duration, mut predicate: P) -> bool
    where
        P: FnMut() -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            Self::process_events();
            if predicate() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            std::thread::sleep(Self::idle_sleep(deadline - now));
        }
    }

    fn idle_sleep(remaining: Duration) -> Duration {
        let has_tasks = LOOP.with_borrow(|state| !state.tasks.is_empty());
        if has_tasks {
            return Duration::ZERO;
        }
        let next = LOOP
            .with_borrow_mut(|state| state.timers.time_until_next())
            .unwrap_or(MAX_IDLE_SLEEP);
        next.min(remaining).min(MAX_IDLE_SLEEP)
    }
}

/// A restartable one-shot timer.
///
/// Starting the timer while it is pending cancels the pending fire, which
/// makes it a debouncer: only the last start within the interval fires.
/// The timer runs on the loop of the thread that started it.
pub struct SingleShotTimer {
    interval: Mutex<Duration>,
    pending: Arc<Mutex<Option<TimerId>>>,
    timeout: Arc<Signal<()>>,
}

impl SingleShotTimer {
    /// Create a stopped timer with the given interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: Mutex::new(interval),
            pending: Arc::new(Mutex::new(None)),
            timeout: Arc::new(Signal::new()),
        }
    }

    /// Signal emitted when the timer fires.
    pub fn timeout(&self) -> &Signal<()> {
        &self.timeout
    }

    pub fn interval(&self) -> Duration {
        *self.interval.lock()
    }

    /// Change the interval used by subsequent starts.
    pub fn set_interval(&self, interval: Duration) {
        *self.interval.lock() = interval;
    }

    /// Start (or restart) the timer.
    pub fn start(&self) {
        self.stop();
        let pending = self.pending.clone();
        let timeout = self.timeout.clone();
        let id = EventLoop::start_timer(self.interval(), move || {
            pending.lock().take();
            timeout.emit(());
        });
        *self.pending.lock() = Some(id);
    }

    /// Cancel a pending fire.
    pub fn stop(&self) {
        if let Some(id) = self.pending.lock().take() {
            EventLoop::stop_timer(id);
        }
    }

    /// Whether a fire is pending.
    pub fn is_active(&self) -> bool {
        self.pending
            .lock()
            .is_some_and(EventLoop::is_timer_active)
    }
}

impl Drop for SingleShotTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

static_assertions::assert_impl_all!(SingleShotTimer: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell as StdRefCell};
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_timer_fires_once() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let id = EventLoop::start_timer(Duration::ZERO, move || counter.set(counter.get() + 1));

        assert!(EventLoop::is_timer_active(id));
        EventLoop::process_events();
        EventLoop::process_events();
        assert_eq!(hits.get(), 1);
        assert!(!EventLoop::is_timer_active(id));
    }

    #[test]
    fn test_stop_timer_prevents_fire() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let id = EventLoop::start_timer(Duration::ZERO, move || counter.set(counter.get() + 1));

        assert!(EventLoop::stop_timer(id));
        assert!(!EventLoop::stop_timer(id));
        EventLoop::process_events();
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_repeating_timer_can_stop_itself() {
        let hits = Rc::new(Cell::new(0));
        let own_id: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));
        let counter = hits.clone();
        let id_cell = own_id.clone();
        let id = EventLoop::start_repeating_timer(Duration::ZERO, move || {
            counter.set(counter.get() + 1);
            if counter.get() == 3 {
                if let Some(id) = id_cell.get() {
                    EventLoop::stop_timer(id);
                }
            }
        });
        own_id.set(Some(id));

        for _ in 0..6 {
            EventLoop::process_events();
        }
        assert_eq!(hits.get(), 3);
        assert!(!EventLoop::is_timer_active(id));
    }

    #[test]
    fn test_tasks_run_in_order_and_may_post_more() {
        let log = Rc::new(StdRefCell::new(Vec::new()));
        for i in 0..3 {
            let log = log.clone();
            EventLoop::post_task(move || log.borrow_mut().push(i));
        }
        let nested = log.clone();
        EventLoop::post_task(move || {
            let inner = nested.clone();
            EventLoop::post_task(move || inner.borrow_mut().push(99));
        });

        EventLoop::process_events();
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        EventLoop::process_events();
        assert_eq!(*log.borrow(), vec![0, 1, 2, 99]);
    }

    #[test]
    fn test_delete_later_drops_on_next_pump() {
        let value = Arc::new(());
        EventLoop::delete_later(value.clone());
        assert_eq!(Arc::strong_count(&value), 2);
        assert_eq!(EventLoop::pending_deletions(), 1);

        EventLoop::process_events();
        assert_eq!(Arc::strong_count(&value), 1);
    }

    #[test]
    fn test_process_events_until_times_out() {
        let start = Instant::now();
        assert!(!EventLoop::process_events_until(Duration::from_millis(20), || false));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_single_shot_timer_debounces() {
        let timer = SingleShotTimer::new(Duration::from_millis(30));
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        timer.timeout().connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        timer.start();
        timer.start();
        timer.start();
        assert!(timer.is_active());

        assert!(EventLoop::process_events_until(Duration::from_secs(2), || {
            hits.load(Ordering::SeqCst) > 0
        }));
        EventLoop::process_events_for(Duration::from_millis(50));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!timer.is_active());
    }

    #[test]
    fn test_single_shot_timer_drop_cancels() {
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let timer = SingleShotTimer::new(Duration::ZERO);
            let counter = hits.clone();
            timer.timeout().connect(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            timer.start();
        }
        EventLoop::process_events();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
