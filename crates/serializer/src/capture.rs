//! The input side of the serializer: arbitrary runtime values.
//!
//! [`CaptureValue`] is an object-safe capability trait. A captured value
//! advertises the shapes it carries (text, bytes, sequence, entries, null,
//! custom representation) through total probes; a shape the value does not
//! have answers `None`/`false`. Probes must never panic — the dispatcher
//! treats them as infallible.

use std::any::Any;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::convert::ConvertError;
use crate::value::SafeValue;

/// A value captured for inclusion in an error-report payload.
///
/// Implementations exist for the common standard-library shapes (see the
/// impls below); the capture pipeline implements it for its own types to
/// make them serializable.
pub trait CaptureValue: Any {
    /// Concrete view for converter downcasts.
    fn as_any(&self) -> &dyn Any;

    /// Best-effort type name, used in opaque fallback rendering.
    fn type_label(&self) -> &'static str;

    /// Best-effort textual rendering, used in opaque fallback rendering
    /// and for mapping keys that are not text-shaped.
    fn render_text(&self) -> String;

    /// True for the absence value (`()`, `Option::None`).
    fn is_null(&self) -> bool {
        false
    }

    /// Text shape, if the value carries one.
    fn as_text(&self) -> Option<Cow<'_, str>> {
        None
    }

    /// Byte-string shape, if the value carries one.
    fn as_bytes(&self) -> Option<&[u8]> {
        None
    }

    /// Sequence shape: children in the value's natural iteration order.
    fn as_sequence(&self) -> Option<Vec<&dyn CaptureValue>> {
        None
    }

    /// Mapping shape: key/value pairs in the value's natural iteration
    /// order.
    fn as_entries(&self) -> Option<Vec<(&dyn CaptureValue, &dyn CaptureValue)>> {
        None
    }

    /// Custom-representation hook, if the value opts in. The probe itself
    /// is total; only invoking the hook may fail.
    fn custom_repr(&self) -> Option<&dyn CustomRepr> {
        None
    }
}

/// Capability a value may implement to supply a substitute value that is
/// serialized in its place.
pub trait CustomRepr {
    fn repr(&self) -> Result<Box<dyn CaptureValue>, ConvertError>;
}

/// Byte strings are captured through this wrapper; a bare `Vec<u8>` reads
/// as a sequence of integers, since Rust has no runtime text/bytes
/// distinction to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBytes(pub Vec<u8>);

impl CaptureValue for RawBytes {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "RawBytes"
    }

    fn render_text(&self) -> String {
        capture_encoding::normalize_bytes(&self.0)
    }

    fn as_bytes(&self) -> Option<&[u8]> {
        Some(&self.0)
    }
}

/// Heterogeneous key/value pairs, for captured mappings whose keys and
/// values do not share one static type.
#[derive(Default)]
pub struct CapturedEntries(pub Vec<(Box<dyn CaptureValue>, Box<dyn CaptureValue>)>);

impl CapturedEntries {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, key: impl CaptureValue, value: impl CaptureValue) {
        self.0.push((Box::new(key), Box::new(value)));
    }
}

impl CaptureValue for CapturedEntries {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "CapturedEntries"
    }

    fn render_text(&self) -> String {
        format!("<{} entries>", self.0.len())
    }

    fn as_entries(&self) -> Option<Vec<(&dyn CaptureValue, &dyn CaptureValue)>> {
        Some(self.0.iter().map(|(k, v)| (&**k, &**v)).collect())
    }
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

macro_rules! impl_capture_for_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CaptureValue for $ty {
                fn as_any(&self) -> &dyn Any {
                    self
                }

                fn type_label(&self) -> &'static str {
                    stringify!($ty)
                }

                fn render_text(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_capture_for_primitive!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

impl CaptureValue for String {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "String"
    }

    fn render_text(&self) -> String {
        self.clone()
    }

    fn as_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl CaptureValue for &'static str {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "str"
    }

    fn render_text(&self) -> String {
        (*self).to_string()
    }

    fn as_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(*self))
    }
}

impl CaptureValue for char {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "char"
    }

    fn render_text(&self) -> String {
        self.to_string()
    }

    fn as_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Null / absence
// ---------------------------------------------------------------------------

impl CaptureValue for () {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "()"
    }

    fn render_text(&self) -> String {
        "null".to_string()
    }

    fn is_null(&self) -> bool {
        true
    }
}

// `None` is the absence value; `Some` is transparent and forwards every
// probe to the inner value.
impl<T: CaptureValue> CaptureValue for Option<T> {
    fn as_any(&self) -> &dyn Any {
        match self {
            Some(inner) => inner.as_any(),
            None => self,
        }
    }

    fn type_label(&self) -> &'static str {
        match self {
            Some(inner) => inner.type_label(),
            None => "None",
        }
    }

    fn render_text(&self) -> String {
        match self {
            Some(inner) => inner.render_text(),
            None => "null".to_string(),
        }
    }

    fn is_null(&self) -> bool {
        match self {
            Some(inner) => inner.is_null(),
            None => true,
        }
    }

    fn as_text(&self) -> Option<Cow<'_, str>> {
        self.as_ref().and_then(CaptureValue::as_text)
    }

    fn as_bytes(&self) -> Option<&[u8]> {
        self.as_ref().and_then(CaptureValue::as_bytes)
    }

    fn as_sequence(&self) -> Option<Vec<&dyn CaptureValue>> {
        self.as_ref().and_then(CaptureValue::as_sequence)
    }

    fn as_entries(&self) -> Option<Vec<(&dyn CaptureValue, &dyn CaptureValue)>> {
        self.as_ref().and_then(CaptureValue::as_entries)
    }

    fn custom_repr(&self) -> Option<&dyn CustomRepr> {
        self.as_ref().and_then(CaptureValue::custom_repr)
    }
}

// ---------------------------------------------------------------------------
// Sequences
// ---------------------------------------------------------------------------

macro_rules! sequence_probe {
    () => {
        fn as_sequence(&self) -> Option<Vec<&dyn CaptureValue>> {
            Some(self.iter().map(|item| item as &dyn CaptureValue).collect())
        }
    };
}

impl<T: CaptureValue> CaptureValue for Vec<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn render_text(&self) -> String {
        format!("<{} elements>", self.len())
    }

    sequence_probe!();
}

impl<T: CaptureValue, const N: usize> CaptureValue for [T; N] {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn render_text(&self) -> String {
        format!("<{} elements>", N)
    }

    sequence_probe!();
}

impl<T: CaptureValue> CaptureValue for &'static [T] {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn render_text(&self) -> String {
        format!("<{} elements>", self.len())
    }

    sequence_probe!();
}

impl<T: CaptureValue> CaptureValue for BTreeSet<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn render_text(&self) -> String {
        format!("<{} elements>", self.len())
    }

    sequence_probe!();
}

impl<T: CaptureValue> CaptureValue for HashSet<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn render_text(&self) -> String {
        format!("<{} elements>", self.len())
    }

    sequence_probe!();
}

// ---------------------------------------------------------------------------
// Mappings
// ---------------------------------------------------------------------------

macro_rules! entries_probe {
    () => {
        fn as_entries(&self) -> Option<Vec<(&dyn CaptureValue, &dyn CaptureValue)>> {
            Some(
                self.iter()
                    .map(|(k, v)| (k as &dyn CaptureValue, v as &dyn CaptureValue))
                    .collect(),
            )
        }
    };
}

impl<K: CaptureValue, V: CaptureValue> CaptureValue for BTreeMap<K, V> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn render_text(&self) -> String {
        format!("<{} entries>", self.len())
    }

    entries_probe!();
}

impl<K: CaptureValue, V: CaptureValue> CaptureValue for HashMap<K, V> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn render_text(&self) -> String {
        format!("<{} entries>", self.len())
    }

    entries_probe!();
}

impl<K: CaptureValue, V: CaptureValue> CaptureValue for IndexMap<K, V> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn render_text(&self) -> String {
        format!("<{} entries>", self.len())
    }

    entries_probe!();
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

impl CaptureValue for Uuid {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "Uuid"
    }

    fn render_text(&self) -> String {
        // Canonical hyphenated form.
        self.to_string()
    }
}

// ---------------------------------------------------------------------------
// Smart pointers: transparent, forward every probe
// ---------------------------------------------------------------------------

macro_rules! impl_capture_for_pointer {
    ($($ptr:ident),* $(,)?) => {
        $(
            impl<T: CaptureValue + ?Sized> CaptureValue for $ptr<T> {
                fn as_any(&self) -> &dyn Any {
                    (**self).as_any()
                }

                fn type_label(&self) -> &'static str {
                    (**self).type_label()
                }

                fn render_text(&self) -> String {
                    (**self).render_text()
                }

                fn is_null(&self) -> bool {
                    (**self).is_null()
                }

                fn as_text(&self) -> Option<Cow<'_, str>> {
                    (**self).as_text()
                }

                fn as_bytes(&self) -> Option<&[u8]> {
                    (**self).as_bytes()
                }

                fn as_sequence(&self) -> Option<Vec<&dyn CaptureValue>> {
                    (**self).as_sequence()
                }

                fn as_entries(&self) -> Option<Vec<(&dyn CaptureValue, &dyn CaptureValue)>> {
                    (**self).as_entries()
                }

                fn custom_repr(&self) -> Option<&dyn CustomRepr> {
                    (**self).custom_repr()
                }
            }
        )*
    };
}

impl_capture_for_pointer!(Box, Rc, Arc);

// ---------------------------------------------------------------------------
// Safe values pass back through unchanged (see PassthroughConverter)
// ---------------------------------------------------------------------------

impl CaptureValue for SafeValue {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "SafeValue"
    }

    fn render_text(&self) -> String {
        self.to_json().to_string()
    }
}
