//! Core systems for Horizon Trellis.
//!
//! This crate provides the retained, headless layer that the declarative
//! builders in `horizon-trellis` sit on:
//!
//! - **Object Model**: Parent-child ownership, naming, destruction
//! - **Signal/Slot System**: Type-safe inter-object communication
//! - **Property System**: Reactive properties and the reflective [`Variant`] channel
//! - **Event Loop**: Per-thread timers, posted tasks and deferred deletion
//! - **Widgets**: Headless widget classes with typed and reflective APIs
//! - **Animation**: Property animations and animation groups
//! - **Application**: Process-wide palette and font
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_trellis_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Widget Example
//!
//! ```
//! use horizon_trellis_core::init_global_registry;
//! use horizon_trellis_core::widget::Widget;
//! use horizon_trellis_core::widget::widgets::PushButton;
//!
//! init_global_registry();
//! let button = PushButton::with_text("OK").unwrap();
//! button.set_property("text", "Cancel".into()).unwrap();
//! assert_eq!(button.property("text"), Some("Cancel".into()));
//! ```

pub mod animation;
mod application;
mod error;
pub mod event;
mod event_loop;
pub mod logging;
pub mod object;
pub mod property;
pub mod signal;
mod timer;
pub mod types;
pub mod variant;
pub mod widget;

pub use animation::{
    Animation, AnimationError, AnimationRef, AnimationState, DeletionPolicy, Direction, Easing,
    ParallelAnimationGroup, PauseAnimation, PropertyAnimation, SequentialAnimationGroup,
};
pub use application::{Application, ColorRole, Palette};
pub use error::{CoreError, Result, TimerError};
pub use event::{Key, KeyboardModifiers, MouseButton, WidgetEvent};
pub use event_loop::{EventLoop, SingleShotTimer};
pub use logging::{ObjectTreeDebug, TreeFormatOptions, TreeStyle};
pub use object::{
    Object, ObjectBase, ObjectError, ObjectId, ObjectResult, global_registry, init_global_registry,
};
pub use property::{Property, PropertyError};
pub use signal::{ConnectionGuard, ConnectionId, Signal, SignalConnection};
pub use timer::TimerId;
pub use types::{Color, ColorParseError, Font, Icon, Point, Rect, Size};
pub use variant::{FromVariant, Variant};
pub use widget::{Widget, WidgetRef};
