//! Label widget.

use std::sync::Arc;

use crate::object::{ObjectId, ObjectResult};
use crate::property::{Property, PropertyError};
use crate::signal::Signal;
use crate::types::Icon;
use crate::variant::Variant;
use crate::widget::{Widget, WidgetBase, expect, register_widget};

use super::property_names_with;

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Center => "Center",
            Self::Right => "Right",
            Self::Justify => "Justify",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Left" => Some(Self::Left),
            "Center" => Some(Self::Center),
            "Right" => Some(Self::Right),
            "Justify" => Some(Self::Justify),
            _ => None,
        }
    }
}

/// A text or image display.
pub struct Label {
    base: WidgetBase,
    text: Property<String>,
    alignment: Property<Alignment>,
    word_wrap: Property<bool>,
    indent: Property<i32>,
    pixmap: Property<Option<Icon>>,
    buddy: Property<Option<ObjectId>>,

    /// Emitted when the text changes.
    pub text_changed: Signal<String>,
}

impl Label {
    const CLASS_PROPERTIES: &'static [&'static str] =
        &["text", "alignment", "wordWrap", "indent", "pixmap"];

    pub fn new() -> ObjectResult<Arc<Self>> {
        Self::with_text("")
    }

    pub fn with_text(text: impl Into<String>) -> ObjectResult<Arc<Self>> {
        let label = Arc::new(Self {
            base: WidgetBase::new::<Self>()?,
            text: Property::new(text.into()),
            alignment: Property::default(),
            word_wrap: Property::new(false),
            indent: Property::new(-1),
            pixmap: Property::new(None),
            buddy: Property::new(None),
            text_changed: Signal::new(),
        });
        register_widget(&label);
        Ok(label)
    }

    pub fn text(&self) -> String {
        self.text.get()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        let text = text.into();
        if self.text.set(text.clone()) {
            self.text_changed.emit(text);
        }
    }

    pub fn clear(&self) {
        self.set_text("");
        self.pixmap.set(None);
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment.get()
    }

    pub fn set_alignment(&self, alignment: Alignment) {
        self.alignment.set(alignment);
    }

    pub fn word_wrap(&self) -> bool {
        self.word_wrap.get()
    }

    pub fn set_word_wrap(&self, wrap: bool) {
        self.word_wrap.set(wrap);
    }

    /// Text indent in pixels; `-1` uses the style default.
    pub fn indent(&self) -> i32 {
        self.indent.get()
    }

    pub fn set_indent(&self, indent: i32) {
        self.indent.set(indent.max(-1));
    }

    pub fn pixmap(&self) -> Option<Icon> {
        self.pixmap.get()
    }

    pub fn set_pixmap(&self, pixmap: Option<Icon>) {
        self.pixmap.set(pixmap);
    }

    /// The widget this label names, for mnemonics and accessibility.
    pub fn buddy(&self) -> Option<ObjectId> {
        self.buddy.get()
    }

    pub fn set_buddy(&self, buddy: Option<ObjectId>) {
        self.buddy.set(buddy);
    }
}

impl Widget for Label {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn class_name(&self) -> &'static str {
        "Label"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "text" => self.set_text(expect::<String>(&value, "string")?),
            "alignment" => {
                let alignment = match &value {
                    Variant::String(name) => Alignment::from_name(name),
                    _ => None,
                };
                self.set_alignment(alignment.ok_or(PropertyError::TypeMismatch {
                    expected: "alignment name",
                    got: value.type_name(),
                })?);
            }
            "wordWrap" => self.set_word_wrap(expect(&value, "bool")?),
            "indent" => self.set_indent(expect(&value, "int")?),
            "pixmap" => self.set_pixmap(Some(expect(&value, "icon")?)),
            _ => return self.base.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "text" => Some(self.text().into()),
            "alignment" => Some(self.alignment().name().into()),
            "wordWrap" => Some(self.word_wrap().into()),
            "indent" => Some(self.indent().into()),
            "pixmap" => self.pixmap().map(Variant::from),
            _ => self.base.property(name),
        }
    }

    fn property_names(&self) -> Vec<&'static str> {
        property_names_with(Self::CLASS_PROPERTIES)
    }
}

static_assertions::assert_impl_all!(Label: Send, Sync);
