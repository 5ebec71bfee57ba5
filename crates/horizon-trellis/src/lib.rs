//! Horizon Trellis - declarative builders over a retained widget tree.
//!
//! This is the main crate. It layers a fluent API on top of the headless
//! toolkit in [`toolkit`] and the design tokens in [`style`]:
//!
//! - **Builders**: Staged configuration committed by `initialize()`
//! - **Lifecycle**: Mount, update and unmount hooks, effects, bound
//!   properties and per-element timing
//! - **Enhancement**: Accessibility, validation, visual effects, shortcuts and
//!   input behavior applied to any widget after the fact
//! - **Validation**: Ordered rule chains producing mergeable results
//! - **Animation**: Property tweens, presets and sequences
//! - **Errors**: A process-wide error manager with pluggable handlers
//! - **Memory**: Deferred deletion, object pools and self-clearing weak references
//!
//! # Example
//!
//! ```
//! use horizon_trellis::prelude::*;
//!
//! init_global_registry();
//! let mut name = LineEditBuilder::new()
//!     .placeholder("Your name")
//!     .object_name("name");
//! let edit = name.initialize().unwrap();
//!
//! enhance()
//!     .accessible_name("Name")
//!     .required(true)
//!     .tooltip("Who are you?")
//!     .apply_to(&edit);
//! assert_eq!(edit.widget_base().tool_tip(), "Who are you?");
//!
//! let rules = validate::<str>().field("Name").required().min_length(3);
//! assert!(!rules.validate("Al").is_valid());
//! ```

pub mod accessibility;
pub mod animation;
pub mod element;
pub mod enhancer;
pub mod error;
pub mod logging;
mod macros;
pub mod memory;
pub mod prelude;
pub mod validation;
pub mod widgets;

pub use horizon_trellis_core as toolkit;
pub use horizon_trellis_style as style;

pub use error::{Result, UiError};
