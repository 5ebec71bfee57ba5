//! Native widget classes.
//!
//! Every widget here is created with `new()` returning `Arc<Self>`, registers
//! itself in the widget index, and answers the reflective property channel
//! with its class properties on top of the [`WidgetBase`] ones.
//!
//! | Widget | Class properties |
//! |--------|------------------|
//! | [`PushButton`] | `text`, `checkable`, `checked`, `icon`, `default`, `flat` |
//! | [`CheckBox`] | button properties, `tristate`, `checkState` |
//! | [`RadioButton`] | button properties, `autoExclusive` |
//! | [`ComboBox`] | `items`, `currentIndex`, `currentText`, `editable`, `maxVisibleItems` |
//! | [`LineEdit`] | `text`, `placeholderText`, `readOnly`, `maxLength`, `echoMode`, `inputMask` |
//! | [`Label`] | `text`, `wordWrap`, `alignment`, `indent`, `pixmap` |
//! | [`Slider`], [`Dial`] | `minimum`, `maximum`, `value`, `singleStep`, `pageStep`, ... |
//! | [`SpinBox`], [`DoubleSpinBox`] | range properties, `prefix`, `suffix`, `wrapping` |
//! | [`ProgressBar`] | `minimum`, `maximum`, `value`, `format`, `textVisible` |
//! | [`GroupBox`] | `title`, `checkable`, `checked`, `flat` |
//! | [`ScrollArea`] | `widgetResizable`, `horizontalScrollValue`, `verticalScrollValue` |
//! | [`Splitter`] | `orientation`, `handleWidth`, `childrenCollapsible` |
//! | [`Frame`] | `frameShape`, `frameShadow`, `lineWidth` |
//! | [`TextEdit`] | `plainText`, `placeholderText`, `readOnly`, `lineWrap` |
//! | [`TableWidget`] | `rowCount`, `columnCount`, `horizontalHeaderLabels`, ... |
//! | [`TreeWidget`] | `columnCount`, `headerLabels`, `rootIsDecorated` |
//! | [`DateTimeEdit`] | `dateTime`, `date`, `time`, `displayFormat`, `calendarPopup` |
//! | [`CalendarWidget`] | `selectedDate`, `minimumDate`, `maximumDate`, `gridVisible` |
//! | [`LcdNumber`] | `digitCount`, `value`, `mode`, `smallDecimalPoint` |

mod abstract_button;
mod button_group;
mod calendar_widget;
mod check_box;
mod combo_box;
mod containers;
mod date_time_edit;
mod label;
mod lcd_number;
mod line_edit;
mod push_button;
mod radio_button;
mod range;
mod range_widgets;
mod table_widget;
mod text_edit;
mod tree_widget;

pub use abstract_button::AbstractButton;
pub use button_group::ButtonGroup;
pub use calendar_widget::CalendarWidget;
pub use check_box::{CheckBox, CheckState};
pub use combo_box::ComboBox;
pub use containers::{
    Frame, FrameShadow, FrameShape, GroupBox, ScrollArea, ScrollBarPolicy, Splitter,
};
pub use date_time_edit::{DEFAULT_DISPLAY_FORMAT, DateTimeEdit, DateTimeSection};
pub use label::{Alignment, Label};
pub use lcd_number::{LcdMode, LcdNumber};
pub use line_edit::{DEFAULT_MAX_LENGTH, EchoMode, LineEdit};
pub use push_button::PushButton;
pub use radio_button::RadioButton;
pub use range::{RangeModel, RangeValue};
pub use range_widgets::{
    Dial, DoubleSpinBox, Orientation, ProgressBar, Slider, SpinBox, TickPosition,
};
pub use table_widget::{Cell, TableWidget};
pub use text_edit::{LineWrapMode, TextEdit};
pub use tree_widget::{TreeItemId, TreeWidget};

use super::WidgetBase;

/// Base property names followed by a class's own names.
pub(crate) fn property_names_with(class: &[&'static str]) -> Vec<&'static str> {
    let mut names = WidgetBase::PROPERTY_NAMES.to_vec();
    names.extend_from_slice(class);
    names
}
