//! Event handlers staged on builders.

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use horizon_trellis_core::widget::widgets::{CheckState, TreeItemId};
use horizon_trellis_core::{Point, Signal, SignalConnection, Variant};
use slotmap::Key;

/// The payload shape a handler expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    None,
    Bool,
    Int,
    Double,
    Text,
    Cell,
    Other,
}

/// A value carried by a native signal.
pub trait Payload: Send + Sync + 'static {
    const KIND: PayloadKind;

    fn as_bool(&self) -> Option<bool> {
        None
    }

    fn as_int(&self) -> Option<i32> {
        None
    }

    fn as_double(&self) -> Option<f64> {
        self.as_int().map(f64::from)
    }

    fn as_text(&self) -> Option<&str> {
        None
    }

    fn as_cell(&self) -> Option<(usize, usize)> {
        None
    }

    fn to_variant(&self) -> Variant;
}

impl Payload for () {
    const KIND: PayloadKind = PayloadKind::None;

    fn to_variant(&self) -> Variant {
        Variant::Bool(true)
    }
}

impl Payload for bool {
    const KIND: PayloadKind = PayloadKind::Bool;

    fn as_bool(&self) -> Option<bool> {
        Some(*self)
    }

    fn to_variant(&self) -> Variant {
        (*self).into()
    }
}

impl Payload for i32 {
    const KIND: PayloadKind = PayloadKind::Int;

    fn as_int(&self) -> Option<i32> {
        Some(*self)
    }

    fn to_variant(&self) -> Variant {
        (*self).into()
    }
}

impl Payload for f64 {
    const KIND: PayloadKind = PayloadKind::Double;

    fn as_double(&self) -> Option<f64> {
        Some(*self)
    }

    fn to_variant(&self) -> Variant {
        (*self).into()
    }
}

impl Payload for String {
    const KIND: PayloadKind = PayloadKind::Text;

    fn as_text(&self) -> Option<&str> {
        Some(self)
    }

    fn to_variant(&self) -> Variant {
        self.as_str().into()
    }
}

/// Reported as 0 (unchecked), 1 (partial) or 2 (checked).
impl Payload for CheckState {
    const KIND: PayloadKind = PayloadKind::Int;

    fn as_int(&self) -> Option<i32> {
        Some(match self {
            CheckState::Unchecked => 0,
            CheckState::PartiallyChecked => 1,
            CheckState::Checked => 2,
        })
    }

    fn to_variant(&self) -> Variant {
        self.as_int().unwrap_or_default().into()
    }
}

impl Payload for (usize, usize) {
    const KIND: PayloadKind = PayloadKind::Cell;

    fn as_cell(&self) -> Option<(usize, usize)> {
        Some(*self)
    }

    fn to_variant(&self) -> Variant {
        Variant::StringList(vec![self.0.to_string(), self.1.to_string()])
    }
}

/// A current cell that may be cleared; cell handlers skip `None`.
impl Payload for Option<(usize, usize)> {
    const KIND: PayloadKind = PayloadKind::Cell;

    fn as_cell(&self) -> Option<(usize, usize)> {
        *self
    }

    fn to_variant(&self) -> Variant {
        match self {
            Some(cell) => cell.to_variant(),
            None => Variant::StringList(Vec::new()),
        }
    }
}

/// Coordinate pairs such as scroll offsets, delivered as a point.
impl Payload for (i32, i32) {
    const KIND: PayloadKind = PayloadKind::Other;

    fn to_variant(&self) -> Variant {
        Point::new(self.0, self.1).into()
    }
}

/// Delivered as the key's raw bits; see [`tree_item_from_variant`].
impl Payload for TreeItemId {
    const KIND: PayloadKind = PayloadKind::Other;

    fn to_variant(&self) -> Variant {
        Variant::UInt(self.data().as_ffi())
    }
}

/// Recover a tree item delivered to a value handler.
pub fn tree_item_from_variant(value: &Variant) -> Option<TreeItemId> {
    match value {
        Variant::UInt(raw) => Some(slotmap::KeyData::from_ffi(*raw).into()),
        _ => None,
    }
}

impl Payload for NaiveDate {
    const KIND: PayloadKind = PayloadKind::Other;

    fn to_variant(&self) -> Variant {
        (*self).into()
    }
}

impl Payload for NaiveTime {
    const KIND: PayloadKind = PayloadKind::Other;

    fn to_variant(&self) -> Variant {
        (*self).into()
    }
}

impl Payload for NaiveDateTime {
    const KIND: PayloadKind = PayloadKind::Other;

    fn to_variant(&self) -> Variant {
        (*self).into()
    }
}

type Callback<A> = Arc<dyn Fn(A) + Send + Sync>;

/// A closure bound to a named event.
///
/// `Unit` and `Value` handlers accept any payload; the others only bind to
/// signals whose payload they can read.
#[derive(Clone)]
pub enum EventHandler {
    Unit(Arc<dyn Fn() + Send + Sync>),
    Bool(Callback<bool>),
    Int(Callback<i32>),
    Double(Callback<f64>),
    Text(Arc<dyn Fn(&str) + Send + Sync>),
    Cell(Arc<dyn Fn(usize, usize) + Send + Sync>),
    Value(Arc<dyn Fn(&Variant) + Send + Sync>),
}

impl EventHandler {
    pub fn unit(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self::Unit(Arc::new(f))
    }

    pub fn bool(f: impl Fn(bool) + Send + Sync + 'static) -> Self {
        Self::Bool(Arc::new(f))
    }

    pub fn int(f: impl Fn(i32) + Send + Sync + 'static) -> Self {
        Self::Int(Arc::new(f))
    }

    pub fn double(f: impl Fn(f64) + Send + Sync + 'static) -> Self {
        Self::Double(Arc::new(f))
    }

    pub fn text(f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self::Text(Arc::new(f))
    }

    pub fn cell(f: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        Self::Cell(Arc::new(f))
    }

    pub fn value(f: impl Fn(&Variant) + Send + Sync + 'static) -> Self {
        Self::Value(Arc::new(f))
    }

    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Unit(_) => PayloadKind::None,
            Self::Bool(_) => PayloadKind::Bool,
            Self::Int(_) => PayloadKind::Int,
            Self::Double(_) => PayloadKind::Double,
            Self::Text(_) => PayloadKind::Text,
            Self::Cell(_) => PayloadKind::Cell,
            Self::Value(_) => PayloadKind::Other,
        }
    }

    /// Whether the handler can be bound to a signal carrying `A`.
    pub fn accepts<A: Payload>(&self) -> bool {
        match self {
            Self::Unit(_) | Self::Value(_) => true,
            Self::Double(_) => matches!(A::KIND, PayloadKind::Double | PayloadKind::Int),
            other => other.kind() == A::KIND,
        }
    }

    /// Invoke with a signal payload.
    pub fn call<A: Payload>(&self, payload: &A) {
        match self {
            Self::Unit(f) => f(),
            Self::Bool(f) => {
                if let Some(value) = payload.as_bool() {
                    f(value);
                }
            }
            Self::Int(f) => {
                if let Some(value) = payload.as_int() {
                    f(value);
                }
            }
            Self::Double(f) => {
                if let Some(value) = payload.as_double() {
                    f(value);
                }
            }
            Self::Text(f) => {
                if let Some(value) = payload.as_text() {
                    f(value);
                }
            }
            Self::Cell(f) => {
                if let Some((row, column)) = payload.as_cell() {
                    f(row, column);
                }
            }
            Self::Value(f) => f(&payload.to_variant()),
        }
    }

    /// Connect to `signal` on `owner`, or `None` if the payload does not fit.
    pub fn bind<O, A>(&self, owner: &Arc<O>, signal: fn(&O) -> &Signal<A>) -> Option<SignalConnection>
    where
        O: Send + Sync + 'static,
        A: Payload,
    {
        if !self.accepts::<A>() {
            return None;
        }
        let handler = self.clone();
        let id = signal(owner).connect(move |payload: &A| handler.call(payload));
        Some(SignalConnection::new(owner, signal, id))
    }

    /// Connect to a signal carrying `A` after mapping its payload to `B`.
    pub fn bind_map<O, A, B>(
        &self,
        owner: &Arc<O>,
        signal: fn(&O) -> &Signal<A>,
        map: fn(&A) -> B,
    ) -> Option<SignalConnection>
    where
        O: Send + Sync + 'static,
        A: 'static,
        B: Payload,
    {
        if !self.accepts::<B>() {
            return None;
        }
        let handler = self.clone();
        let id = signal(owner).connect(move |payload: &A| handler.call(&map(payload)));
        Some(SignalConnection::new(owner, signal, id))
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventHandler").field(&self.kind()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Owner {
        changed: Signal<String>,
        toggled: Signal<bool>,
    }

    fn changed(owner: &Owner) -> &Signal<String> {
        &owner.changed
    }

    fn toggled(owner: &Owner) -> &Signal<bool> {
        &owner.toggled
    }

    fn owner() -> Arc<Owner> {
        Arc::new(Owner {
            changed: Signal::new(),
            toggled: Signal::new(),
        })
    }

    #[test]
    fn test_payload_adaptation() {
        let owner = owner();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let text = EventHandler::text(move |s| sink.lock().push(s.to_string()));
        let sink = seen.clone();
        let unit = EventHandler::unit(move || sink.lock().push("fired".to_string()));

        let first = text.bind(&owner, changed).unwrap();
        let _second = unit.bind(&owner, toggled).unwrap();
        owner.changed.emit("abc".into());
        owner.toggled.emit(true);
        assert_eq!(*seen.lock(), vec!["abc".to_string(), "fired".to_string()]);

        assert!(first.disconnect());
        owner.changed.emit("ignored".into());
        assert_eq!(seen.lock().len(), 2);
    }

    #[test]
    fn test_mismatched_payload_is_rejected() {
        let owner = owner();
        let handler = EventHandler::int(|_| {});
        assert!(handler.bind(&owner, changed).is_none());
        assert!(EventHandler::double(|_| {}).accepts::<i32>());
        assert!(!EventHandler::bool(|_| {}).accepts::<i32>());
    }

    #[test]
    fn test_mapped_binding() {
        let owner = owner();
        let lengths = Arc::new(Mutex::new(Vec::new()));
        let sink = lengths.clone();
        let handler = EventHandler::int(move |n| sink.lock().push(n));
        let _conn = handler
            .bind_map(&owner, changed, |s: &String| s.len() as i32)
            .unwrap();
        owner.changed.emit("four".into());
        assert_eq!(*lengths.lock(), vec![4]);
    }
}
