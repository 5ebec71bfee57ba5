//! Logging targets for the declarative layer.
//!
//! Every module logs through `tracing` under one of the targets below, so a
//! subscriber can filter the builders, the enhancer or the error spine
//! independently:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_trellis::element=debug,horizon_trellis::enhancer=trace")
//!     .init();
//! ```

/// Target names for log filtering.
pub mod targets {
    /// Crate-level target.
    pub const TRELLIS: &str = "horizon_trellis";
    /// Builder staging and initialization.
    pub const ELEMENT: &str = "horizon_trellis::element";
    /// The enhancement layer.
    pub const ENHANCER: &str = "horizon_trellis::enhancer";
    /// Validation chains and rules.
    pub const VALIDATION: &str = "horizon_trellis::validation";
    /// The animation builder.
    pub const ANIMATION: &str = "horizon_trellis::animation";
    /// Reports forwarded by the error spine.
    pub const ERRORS: &str = "horizon_trellis::error";
    /// Output of [`TracingErrorHandler`](crate::error::TracingErrorHandler).
    pub const ERROR_HANDLER: &str = "horizon_trellis::error::handler";
    /// Ownership helpers and object pools.
    pub const MEMORY: &str = "horizon_trellis::memory";
    /// Accessibility registration and announcements.
    pub const ACCESSIBILITY: &str = "horizon_trellis::accessibility";
}
