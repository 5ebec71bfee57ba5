//! Type-tagged values for the reflective property channel.
//!
//! [`Variant`] is what travels through `set_property` / `property` on widgets
//! and what builders stage before a widget exists. [`FromVariant`] extracts a
//! typed value back out, widening numbers when no precision is lost.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::types::{Color, Font, Icon, Point, Rect, Size};

/// A dynamically typed property value.
#[derive(Clone)]
pub enum Variant {
    Int(i64),
    UInt(u64),
    Double(f64),
    Bool(bool),
    String(String),
    Color(Color),
    Font(Font),
    Size(Size),
    Point(Point),
    Rect(Rect),
    Icon(Icon),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    StringList(Vec<String>),
    /// An opaque handle (validators, menus, other widgets). Compared by identity.
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl Variant {
    /// Wrap any shared value as an opaque variant.
    pub fn opaque<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self::Opaque(value)
    }

    /// Name of the payload type, used in type-mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Double(_) => "double",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Color(_) => "color",
            Self::Font(_) => "font",
            Self::Size(_) => "size",
            Self::Point(_) => "point",
            Self::Rect(_) => "rect",
            Self::Icon(_) => "icon",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::DateTime(_) => "datetime",
            Self::StringList(_) => "stringlist",
            Self::Opaque(_) => "opaque",
        }
    }

    /// Extract a typed value.
    pub fn to<T: FromVariant>(&self) -> Option<T> {
        T::from_variant(self)
    }

    /// Downcast an opaque payload.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Self::Opaque(handle) => handle.clone().downcast::<T>().ok(),
            _ => None,
        }
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::UInt(a), Self::UInt(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Color(a), Self::Color(b)) => a == b,
            (Self::Font(a), Self::Font(b)) => a == b,
            (Self::Size(a), Self::Size(b)) => a == b,
            (Self::Point(a), Self::Point(b)) => a == b,
            (Self::Rect(a), Self::Rect(b)) => a == b,
            (Self::Icon(a), Self::Icon(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::StringList(a), Self::StringList(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "Int({v})"),
            Self::UInt(v) => write!(f, "UInt({v})"),
            Self::Double(v) => write!(f, "Double({v})"),
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::String(v) => write!(f, "String({v:?})"),
            Self::Color(v) => write!(f, "Color({v})"),
            Self::Font(v) => write!(f, "Font({v:?})"),
            Self::Size(v) => write!(f, "Size({}x{})", v.width, v.height),
            Self::Point(v) => write!(f, "Point({}, {})", v.x, v.y),
            Self::Rect(v) => write!(f, "Rect({v:?})"),
            Self::Icon(v) => write!(f, "Icon({:?})", v.source()),
            Self::Date(v) => write!(f, "Date({v})"),
            Self::Time(v) => write!(f, "Time({v})"),
            Self::DateTime(v) => write!(f, "DateTime({v})"),
            Self::StringList(v) => write!(f, "StringList({v:?})"),
            Self::Opaque(_) => write!(f, "Opaque(..)"),
        }
    }
}

macro_rules! variant_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Variant {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

variant_from! {
    i64 => Int,
    i32 => Int,
    i16 => Int,
    u64 => UInt,
    u32 => UInt,
    u16 => UInt,
    u8 => UInt,
    f64 => Double,
    f32 => Double,
    bool => Bool,
    String => String,
    &str => String,
    Color => Color,
    Font => Font,
    Size => Size,
    Point => Point,
    Rect => Rect,
    Icon => Icon,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    Vec<String> => StringList,
}

impl From<usize> for Variant {
    fn from(value: usize) -> Self {
        Self::UInt(value as u64)
    }
}

impl From<&[&str]> for Variant {
    fn from(value: &[&str]) -> Self {
        Self::StringList(value.iter().map(|s| s.to_string()).collect())
    }
}

/// Typed extraction from a [`Variant`].
pub trait FromVariant: Sized {
    fn from_variant(value: &Variant) -> Option<Self>;
}

/// Largest magnitude a double represents exactly for every smaller integer.
const F64_EXACT_INT: f64 = 9_007_199_254_740_992.0;

fn as_i64(value: &Variant) -> Option<i64> {
    match *value {
        Variant::Int(v) => Some(v),
        Variant::UInt(v) => i64::try_from(v).ok(),
        Variant::Double(v) if v.fract() == 0.0 && v.abs() <= F64_EXACT_INT => Some(v as i64),
        _ => None,
    }
}

fn as_u64(value: &Variant) -> Option<u64> {
    match *value {
        Variant::Int(v) => u64::try_from(v).ok(),
        Variant::UInt(v) => Some(v),
        Variant::Double(v) if v.fract() == 0.0 && (0.0..=F64_EXACT_INT).contains(&v) => {
            Some(v as u64)
        }
        _ => None,
    }
}

fn as_f64(value: &Variant) -> Option<f64> {
    match *value {
        Variant::Int(v) if (v as f64).abs() <= F64_EXACT_INT => Some(v as f64),
        Variant::UInt(v) if (v as f64) <= F64_EXACT_INT => Some(v as f64),
        Variant::Double(v) => Some(v),
        _ => None,
    }
}

macro_rules! integer_from_variant {
    ($via:ident => $($ty:ty),*) => {
        $(
            impl FromVariant for $ty {
                fn from_variant(value: &Variant) -> Option<Self> {
                    $via(value).and_then(|v| <$ty>::try_from(v).ok())
                }
            }
        )*
    };
}

integer_from_variant!(as_i64 => i64, i32, i16);
integer_from_variant!(as_u64 => u64, u32, u16, u8, usize);

impl FromVariant for f64 {
    fn from_variant(value: &Variant) -> Option<Self> {
        as_f64(value)
    }
}

impl FromVariant for f32 {
    fn from_variant(value: &Variant) -> Option<Self> {
        as_f64(value).map(|v| v as f32)
    }
}

macro_rules! clone_from_variant {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromVariant for $ty {
                fn from_variant(value: &Variant) -> Option<Self> {
                    match value {
                        Variant::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

clone_from_variant! {
    bool => Bool,
    String => String,
    Color => Color,
    Font => Font,
    Size => Size,
    Point => Point,
    Rect => Rect,
    Icon => Icon,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    Vec<String> => StringList,
}

impl FromVariant for Variant {
    fn from_variant(value: &Variant) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromVariant for Arc<dyn Any + Send + Sync> {
    fn from_variant(value: &Variant) -> Option<Self> {
        match value {
            Variant::Opaque(handle) => Some(handle.clone()),
            _ => None,
        }
    }
}
