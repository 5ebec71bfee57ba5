//! Prelude module for Horizon Trellis.
//!
//! ```ignore
//! use horizon_trellis::prelude::*;
//! ```
//!
//! This provides access to:
//! - Every widget builder and the [`UiElement`] staging protocol
//! - The enhancer, validation chains and the animation builder
//! - The error manager and its context types
//! - Common toolkit types (`Widget`, `Point`, `Size`, `Color`, `Easing`)

// ============================================================================
// Builders
// ============================================================================

pub use crate::element::{
    EventHandler, LifecycleContext, LifecyclePhase, PerformanceMetrics, UiElement,
};
pub use crate::widgets::*;

// ============================================================================
// Cross-cutting services
// ============================================================================

pub use crate::accessibility::{AccessibilityManager, AccessibleRole, accessibility_for};
pub use crate::animation::{AnimationBuilder, AnimationConfig, AnimationSequence, animate, presets};
pub use crate::enhancer::{ComponentEnhancer, EnhancementConfig, enhance};
pub use crate::validation::{ValidationChain, ValidationResult, validate};

// ============================================================================
// Errors and ownership
// ============================================================================

pub use crate::error::{ErrorContext, ErrorContextScope, ErrorManager, ErrorSeverity, Result, UiError};
pub use crate::memory::{ObjectPool, UiBox, UiShared, WeakRef, WidgetHandle};

// ============================================================================
// Toolkit and theme
// ============================================================================

pub use horizon_trellis_core::{
    Animation, Color, Easing, EventLoop, Point, Size, Variant, Widget, WidgetRef,
    init_global_registry,
};
pub use horizon_trellis_style::{ThemeConfig, ThemeManager};
