//! Signal/slot system for Horizon Trellis.
//!
//! This module provides a type-safe, Qt-inspired signal/slot mechanism for
//! inter-object communication. Signals are emitted by objects when their state
//! changes, and connected slots (callbacks) are invoked in response.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`SignalConnection`] - Type-erased handle that can disconnect later
//! - [`ConnectionGuard`] - RAII guard that disconnects when dropped
//!
//! # Delivery
//!
//! Slots are always invoked directly on the emitting thread, in connection
//! order. The connection list is snapshotted before slots run, so a slot may
//! connect or disconnect (including itself) while being invoked; such changes
//! take effect on the next emission.
//!
//! # Example
//!
//! ```
//! use horizon_trellis_core::Signal;
//!
//! let text_changed = Signal::<String>::new();
//! let conn_id = text_changed.connect(|text| {
//!     println!("Text changed to: {}", text);
//! });
//!
//! text_changed.emit("Hello, World!".to_string());
//! text_changed.disconnect(conn_id);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple like `(String, i32)` for multiple arguments.
pub struct Signal<Args> {
    /// All active connections.
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connections.lock().insert(Arc::new(slot));
        tracing::trace!(target: targets::SIGNAL, ?id, "connected slot");
        id
    }

    /// Disconnect a slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        let removed = self.connections.lock().remove(id).is_some();
        tracing::trace!(target: targets::SIGNAL, ?id, removed, "disconnected slot");
        removed
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Whether the given connection is still active.
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.connections.lock().contains_key(id)
    }

    /// Block or unblock signal emission.
    ///
    /// While blocked, calls to `emit()` do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking every connected slot in connection order.
    #[tracing::instrument(skip_all, target = "horizon_trellis_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");
        for slot in slots {
            slot(&args);
        }
    }
}

impl<Args: Send + 'static> Signal<Args> {
    /// Connect a slot with automatic disconnection when the guard is dropped.
    pub fn connect_scoped<F>(self: &Arc<Self>, slot: F) -> ConnectionGuard
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        SignalConnection::from_shared(self, id).into_guard()
    }
}

impl<Args> fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().len())
            .field("blocked", &self.blocked.load(Ordering::SeqCst))
            .finish()
    }
}

type Disconnector = Arc<dyn Fn(ConnectionId) -> bool + Send + Sync>;

/// A type-erased handle to one connection of some signal.
///
/// The handle does not keep the signal's owner alive. Disconnecting after the
/// owner has been dropped is a no-op that returns `false`. Dropping the handle
/// leaves the connection in place; use [`ConnectionGuard`] for scoped
/// connections.
#[derive(Clone)]
pub struct SignalConnection {
    id: ConnectionId,
    disconnector: Disconnector,
}

impl SignalConnection {
    /// Create a handle for a connection made on a signal owned by `owner`.
    ///
    /// `signal` projects the owner to the signal the connection was made on.
    pub fn new<O, Args>(owner: &Arc<O>, signal: fn(&O) -> &Signal<Args>, id: ConnectionId) -> Self
    where
        O: ?Sized + Send + Sync + 'static,
        Args: 'static,
    {
        let weak: Weak<O> = Arc::downgrade(owner);
        Self {
            id,
            disconnector: Arc::new(move |id| {
                weak.upgrade()
                    .is_some_and(|owner| signal(&owner).disconnect(id))
            }),
        }
    }

    /// Create a handle for a connection made on a shared signal.
    pub fn from_shared<Args: Send + 'static>(signal: &Arc<Signal<Args>>, id: ConnectionId) -> Self {
        let weak = Arc::downgrade(signal);
        Self {
            id,
            disconnector: Arc::new(move |id| weak.upgrade().is_some_and(|s| s.disconnect(id))),
        }
    }

    /// The underlying connection id.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Disconnect the slot. Returns `true` if a live connection was removed.
    pub fn disconnect(&self) -> bool {
        (self.disconnector)(self.id)
    }

    /// Turn the handle into a guard that disconnects when dropped.
    pub fn into_guard(self) -> ConnectionGuard {
        ConnectionGuard {
            connection: Some(self),
        }
    }
}

impl fmt::Debug for SignalConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalConnection").field("id", &self.id).finish()
    }
}

/// RAII guard that disconnects its connection when dropped.
///
/// # Example
///
/// ```
/// use horizon_trellis_core::Signal;
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use std::sync::Arc;
///
/// let signal = Arc::new(Signal::<i32>::new());
/// let counter = Arc::new(AtomicI32::new(0));
/// {
///     let counter_clone = counter.clone();
///     let _guard = signal.connect_scoped(move |&n| {
///         counter_clone.fetch_add(n, Ordering::SeqCst);
///     });
///     signal.emit(42);
/// }
/// signal.emit(43);
/// assert_eq!(counter.load(Ordering::SeqCst), 42);
/// ```
#[derive(Debug)]
pub struct ConnectionGuard {
    connection: Option<SignalConnection>,
}

impl ConnectionGuard {
    /// The guarded connection id.
    pub fn id(&self) -> Option<ConnectionId> {
        self.connection.as_ref().map(SignalConnection::id)
    }

    /// Give up the guard without disconnecting.
    pub fn release(mut self) -> Option<SignalConnection> {
        self.connection.take()
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.disconnect();
        }
    }
}

static_assertions::assert_impl_all!(Signal<String>: Send, Sync);
static_assertions::assert_impl_all!(SignalConnection: Send, Sync);
static_assertions::assert_impl_all!(ConnectionGuard: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_signal_connect_emit() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(42);
        signal.emit(100);

        assert_eq!(*received.lock(), vec![42, 100]);
    }

    #[test]
    fn test_signal_disconnect() {
        let signal = Signal::<()>::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let id = signal.connect(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        signal.emit(());
        assert!(signal.disconnect(id));
        assert!(!signal.disconnect(id));
        signal.emit(());

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_signal_blocked() {
        let signal = Signal::<i32>::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        signal.connect(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        signal.set_blocked(true);
        signal.emit(1);
        assert!(signal.is_blocked());
        signal.set_blocked(false);
        signal.emit(2);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_slot_may_disconnect_itself() {
        let signal = Arc::new(Signal::<()>::new());
        let count = Arc::new(AtomicUsize::new(0));
        let id_cell: Arc<Mutex<Option<ConnectionId>>> = Arc::new(Mutex::new(None));

        let weak = Arc::downgrade(&signal);
        let count_clone = count.clone();
        let id_clone = id_cell.clone();
        let id = signal.connect(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
            if let (Some(signal), Some(id)) = (weak.upgrade(), *id_clone.lock()) {
                signal.disconnect(id);
            }
        });
        *id_cell.lock() = Some(id);

        signal.emit(());
        signal.emit(());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_signal_connection_outlives_owner() {
        struct Owner {
            changed: Signal<i32>,
        }

        let owner = Arc::new(Owner {
            changed: Signal::new(),
        });
        let id = owner.changed.connect(|_| {});
        let connection = SignalConnection::new(&owner, |o: &Owner| &o.changed, id);

        let second = connection.clone();
        assert!(connection.disconnect());
        assert!(!second.disconnect());

        let id = owner.changed.connect(|_| {});
        let connection = SignalConnection::new(&owner, |o: &Owner| &o.changed, id);
        drop(owner);
        assert!(!connection.disconnect());
    }

    #[test]
    fn test_connection_guard() {
        let signal = Arc::new(Signal::<i32>::new());
        let guard = signal.connect_scoped(|_| {});
        assert_eq!(signal.connection_count(), 1);
        drop(guard);
        assert_eq!(signal.connection_count(), 0);

        let guard = signal.connect_scoped(|_| {});
        let connection = guard.release();
        assert!(connection.is_some());
        assert_eq!(signal.connection_count(), 1);
    }
}
