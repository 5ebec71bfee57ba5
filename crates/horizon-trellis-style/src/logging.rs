//! Logging targets for the theme system.

/// Target names for log filtering.
pub mod targets {
    /// Theme loading, export and change notification.
    pub const THEME: &str = "horizon_trellis_style::theme";
}
