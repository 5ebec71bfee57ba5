//! Logging and debugging facilities for Horizon Trellis.
//!
//! This module provides:
//! - Stable `tracing` targets for every subsystem
//! - Debug visualization for the retained object tree
//!
//! # Tracing Integration
//!
//! Horizon Trellis uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_trellis_core::animation=debug")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! ```ignore
//! use horizon_trellis_core::logging::ObjectTreeDebug;
//!
//! let debug = ObjectTreeDebug::new();
//! println!("{}", debug.format_tree());
//! ```

use std::fmt::{self, Write as FmtWrite};

use crate::object::{ObjectId, ObjectResult, global_registry};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_trellis_core";
    /// Event loop target.
    pub const EVENT_LOOP: &str = "horizon_trellis_core::event_loop";
    /// Timer system target.
    pub const TIMER: &str = "horizon_trellis_core::timer";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_trellis_core::signal";
    /// Property system target.
    pub const PROPERTY: &str = "horizon_trellis_core::property";
    /// Object model target.
    pub const OBJECT: &str = "horizon_trellis_core::object";
    /// Widget layer target.
    pub const WIDGET: &str = "horizon_trellis_core::widget";
    /// Keyboard shortcut target.
    pub const SHORTCUT: &str = "horizon_trellis_core::shortcut";
    /// Animation target.
    pub const ANIMATION: &str = "horizon_trellis_core::animation";
    /// Application settings target.
    pub const APPLICATION: &str = "horizon_trellis_core::application";
}

/// Style options for object tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
}

/// Configuration for object tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show object IDs.
    pub show_ids: bool,
    /// Whether to show type names.
    pub show_types: bool,
    /// Whether to show dynamic property names.
    pub show_properties: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_types: true,
            show_properties: false,
            max_depth: None,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for minimal output (names only).
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_types: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing the object tree.
#[derive(Debug, Clone, Default)]
pub struct ObjectTreeDebug {
    options: TreeFormatOptions,
}

impl ObjectTreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format every root object and its subtree.
    pub fn format_tree(&self) -> ObjectResult<String> {
        let registry = global_registry()?;
        let mut output = String::new();
        let _ = writeln!(output, "Object Tree ({} total objects):", registry.object_count());
        let roots = registry.root_objects();
        if roots.is_empty() {
            output.push_str("  (empty)\n");
        }
        for root in roots {
            self.format_node(root, 0, &mut output)?;
        }
        Ok(output)
    }

    /// Format a subtree starting from a specific object.
    pub fn format_subtree(&self, root: ObjectId) -> ObjectResult<String> {
        let mut output = String::new();
        self.format_node(root, 0, &mut output)?;
        Ok(output)
    }

    fn format_node(&self, id: ObjectId, depth: usize, output: &mut String) -> ObjectResult<()> {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        let registry = global_registry()?;
        let name = registry.object_name(id)?;
        let children = registry.children(id)?;

        output.push_str(&self.prefix(depth));
        output.push_str(if name.is_empty() { "(unnamed)" } else { &name });
        if self.options.show_ids {
            let _ = write!(output, " [{id:?}]");
        }
        if self.options.show_types {
            let type_name = registry.type_name(id)?;
            let short = type_name.rsplit("::").next().unwrap_or(type_name);
            let _ = write!(output, " ({short})");
        }
        output.push('\n');

        if self.options.show_properties {
            for property in registry.dynamic_property_names(id)? {
                let _ = writeln!(output, "{}  .{property}", self.prefix(depth + 1));
            }
        }

        for child in children {
            self.format_node(child, depth + 1, output)?;
        }
        Ok(())
    }

    fn prefix(&self, depth: usize) -> String {
        if depth == 0 {
            return String::new();
        }
        let (indent, branch) = match self.options.style {
            TreeStyle::Ascii => ("|  ", "+-- "),
            TreeStyle::Unicode => ("\u{2502}  ", "\u{251c}\u{2500}\u{2500} "),
        };
        let mut prefix = indent.repeat(depth - 1);
        prefix.push_str(branch);
        prefix
    }
}

impl fmt::Display for ObjectTreeDebug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format_tree() {
            Ok(output) => write!(f, "{output}"),
            Err(e) => write!(f, "Error formatting object tree: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ObjectBase, init_global_registry};

    struct TestNode {
        base: ObjectBase,
    }

    impl TestNode {
        fn new(name: &str) -> Self {
            let node = Self {
                base: ObjectBase::new::<Self>().unwrap(),
            };
            node.base.set_name(name);
            node
        }
    }

    fn setup() {
        init_global_registry();
    }

    #[test]
    fn test_tree_format_hierarchy() {
        setup();
        let root = TestNode::new("window");
        let child = TestNode::new("button1");
        child.base.set_parent(Some(root.base.id())).unwrap();

        let output = ObjectTreeDebug::new().format_subtree(root.base.id()).unwrap();
        assert!(output.contains("window"));
        assert!(output.contains("button1"));
        assert!(output.contains("TestNode"));
    }

    #[test]
    fn test_tree_format_minimal() {
        setup();
        let node = TestNode::new("plain");

        let output = ObjectTreeDebug::with_options(TreeFormatOptions::minimal())
            .format_subtree(node.base.id())
            .unwrap();
        assert_eq!(output, "plain\n");
    }

    #[test]
    fn test_tree_format_all_mentions_count() {
        setup();
        let _node = TestNode::new("counted");
        let output = ObjectTreeDebug::new().format_tree().unwrap();
        assert!(output.starts_with("Object Tree ("));
    }
}
