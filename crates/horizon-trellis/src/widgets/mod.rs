//! Builders for the native widget classes.
//!
//! Every builder implements [`UiElement`](crate::element::UiElement) and maps
//! its event names onto the widget's signals. Besides the per-class names,
//! all builders accept:
//!
//! | Event | Payload |
//! |-------|---------|
//! | `hovered` | `bool`, pointer entered or left |
//! | `focusChanged` | `bool`, focus gained or lost |
//! | `enabledChanged` | `bool` |
//! | `visibleChanged` | `bool` |
//! | `styleSheetChanged` | effective style sheet text |

mod button;
mod check_box;
mod combo_box;
mod containers;
mod date_time;
mod item_views;
mod label;
mod lcd;
mod line_edit;
mod radio_button;
mod range;
mod text_edit;

pub use button::{ButtonBuilder, DEFAULT_LOADING_TEXT, DOUBLE_CLICK_INTERVAL};
pub use check_box::{CheckBoxBuilder, CheckBoxGroup, GroupValidator};
pub use combo_box::ComboBoxBuilder;
pub use containers::{FrameBuilder, GroupBoxBuilder, ScrollAreaBuilder, SplitterBuilder};
pub use date_time::{CalendarBuilder, DateTimeEditBuilder};
pub use item_views::{TableBuilder, TreeBuilder, TreeNode};
pub use label::{LABEL_STYLE_LAYER, LabelBuilder};
pub use lcd::LcdNumberBuilder;
pub use line_edit::{LINE_EDIT_VALIDATION_LAYER, LineEditBuilder, TextTransform};
pub use radio_button::{RadioButtonBuilder, RadioGroup};
pub use range::{DialBuilder, DoubleSpinBoxBuilder, ProgressBarBuilder, SliderBuilder, SpinBoxBuilder};
pub use text_edit::TextEditBuilder;

use std::sync::Arc;

use horizon_trellis_core::widget::widgets::{AbstractButton, CheckBox, PushButton, RadioButton};
use horizon_trellis_core::widget::Widget;
use horizon_trellis_core::{Signal, SignalConnection};

use crate::element::EventHandler;

/// Widgets built on [`AbstractButton`].
pub(crate) trait ButtonLike: Widget {
    fn abstract_button(&self) -> &AbstractButton;
}

impl ButtonLike for PushButton {
    fn abstract_button(&self) -> &AbstractButton {
        self.button()
    }
}

impl ButtonLike for CheckBox {
    fn abstract_button(&self) -> &AbstractButton {
        self.button()
    }
}

impl ButtonLike for RadioButton {
    fn abstract_button(&self) -> &AbstractButton {
        self.button()
    }
}

fn clicked<W: ButtonLike>(widget: &W) -> &Signal<bool> {
    &widget.abstract_button().clicked
}

fn toggled<W: ButtonLike>(widget: &W) -> &Signal<bool> {
    &widget.abstract_button().toggled
}

fn pressed<W: ButtonLike>(widget: &W) -> &Signal<()> {
    &widget.abstract_button().pressed
}

fn released<W: ButtonLike>(widget: &W) -> &Signal<()> {
    &widget.abstract_button().released
}

fn button_text_changed<W: ButtonLike>(widget: &W) -> &Signal<String> {
    &widget.abstract_button().text_changed
}

fn hover_changed<W: Widget>(widget: &W) -> &Signal<bool> {
    &widget.widget_base().hover_changed
}

fn focus_changed<W: Widget>(widget: &W) -> &Signal<bool> {
    &widget.widget_base().focus_changed
}

fn enabled_changed<W: Widget>(widget: &W) -> &Signal<bool> {
    &widget.widget_base().enabled_changed
}

fn visible_changed<W: Widget>(widget: &W) -> &Signal<bool> {
    &widget.widget_base().visible_changed
}

fn style_sheet_changed<W: Widget>(widget: &W) -> &Signal<String> {
    &widget.widget_base().style_sheet_changed
}

/// Events every widget answers.
pub(crate) fn bind_common<W: Widget>(
    widget: &Arc<W>,
    event: &str,
    handler: &EventHandler,
) -> Option<SignalConnection> {
    match event {
        "hovered" => handler.bind(widget, hover_changed::<W>),
        "focusChanged" => handler.bind(widget, focus_changed::<W>),
        "enabledChanged" => handler.bind(widget, enabled_changed::<W>),
        "visibleChanged" => handler.bind(widget, visible_changed::<W>),
        "styleSheetChanged" => handler.bind(widget, style_sheet_changed::<W>),
        _ => None,
    }
}

/// Button events followed by the common ones.
pub(crate) fn bind_button<W: ButtonLike>(
    widget: &Arc<W>,
    event: &str,
    handler: &EventHandler,
) -> Option<SignalConnection> {
    match event {
        "clicked" => handler.bind(widget, clicked::<W>),
        "toggled" => handler.bind(widget, toggled::<W>),
        "pressed" => handler.bind(widget, pressed::<W>),
        "released" => handler.bind(widget, released::<W>),
        "textChanged" => handler.bind(widget, button_text_changed::<W>),
        _ => bind_common(widget, event, handler),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_trellis_core::{WidgetEvent, init_global_registry};
    use parking_lot::Mutex;

    fn setup() {
        init_global_registry();
    }

    #[test]
    fn test_common_events_bind_to_base_signals() {
        setup();
        let button = PushButton::new().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler = EventHandler::bool(move |hovered| sink.lock().push(hovered));
        let _conn = bind_common(&button, "hovered", &handler).unwrap();

        let widget: &dyn Widget = &*button;
        widget.send_event(&WidgetEvent::Enter);
        widget.send_event(&WidgetEvent::Leave);
        assert_eq!(*seen.lock(), vec![true, false]);
        assert!(bind_common(&button, "nonsense", &handler).is_none());
    }

    #[test]
    fn test_button_events() {
        setup();
        let check = CheckBox::with_text("Agree").unwrap();
        let toggles = Arc::new(Mutex::new(Vec::new()));
        let sink = toggles.clone();
        let _conn = bind_button(&check, "toggled", &EventHandler::bool(move |on| sink.lock().push(on))).unwrap();
        check.button().click();
        check.button().click();
        assert_eq!(*toggles.lock(), vec![true, false]);
    }
}
