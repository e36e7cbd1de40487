//! The converter contract and the built-in converter set.
//!
//! A converter owns one family of value shapes: a total claim predicate
//! plus a conversion that may recurse into children through the dispatcher
//! callback. Conversion errors never escape a transform call; the
//! dispatcher absorbs them into an opaque fallback for the affected
//! subtree.

use capture_encoding::{normalize_bytes, normalize_str};
use thiserror::Error;
use uuid::Uuid;

use crate::capture::CaptureValue;
use crate::value::SafeValue;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// `convert` was invoked on a value the converter does not recognize.
    /// Only reachable through caller misuse, since the dispatcher checks
    /// `claims` first.
    #[error("converter does not recognize {0}")]
    Unclaimed(&'static str),
    /// The value's custom-representation hook failed.
    #[error("custom representation hook failed: {0}")]
    Hook(String),
    /// Free-form failure for third-party converters.
    #[error("{0}")]
    Message(String),
}

/// Recursion callback handed to converters for child values.
pub trait Recurse {
    fn transform(&mut self, value: &dyn CaptureValue) -> SafeValue;
}

/// A claim predicate plus conversion for one family of value shapes.
///
/// `claims` must be total: any inspection failure reads as "does not
/// claim". Converters are registered once at startup and shared read-only
/// across transform calls, hence `Send + Sync`.
pub trait Converter: Send + Sync {
    fn claims(&self, value: &dyn CaptureValue) -> bool;

    fn convert(
        &self,
        value: &dyn CaptureValue,
        recurse: &mut dyn Recurse,
    ) -> Result<SafeValue, ConvertError>;
}

// ---------------------------------------------------------------------------
// Built-ins, in registration order
// ---------------------------------------------------------------------------

/// Claims values that are already safe and clones them through unchanged,
/// making the pipeline idempotent on its own output.
pub struct PassthroughConverter;

impl Converter for PassthroughConverter {
    fn claims(&self, value: &dyn CaptureValue) -> bool {
        value.as_any().is::<SafeValue>()
    }

    fn convert(
        &self,
        value: &dyn CaptureValue,
        _recurse: &mut dyn Recurse,
    ) -> Result<SafeValue, ConvertError> {
        value
            .as_any()
            .downcast_ref::<SafeValue>()
            .cloned()
            .ok_or(ConvertError::Unclaimed(value.type_label()))
    }
}

/// Claims finite collections and recurses element-wise, preserving the
/// input's natural iteration order.
pub struct SequenceConverter;

impl Converter for SequenceConverter {
    fn claims(&self, value: &dyn CaptureValue) -> bool {
        value.as_sequence().is_some()
    }

    fn convert(
        &self,
        value: &dyn CaptureValue,
        recurse: &mut dyn Recurse,
    ) -> Result<SafeValue, ConvertError> {
        let items = value
            .as_sequence()
            .ok_or(ConvertError::Unclaimed(value.type_label()))?;
        Ok(SafeValue::Sequence(
            items.into_iter().map(|item| recurse.transform(item)).collect(),
        ))
    }
}

/// Claims identifier values with a canonical string form.
pub struct IdentifierConverter;

impl Converter for IdentifierConverter {
    fn claims(&self, value: &dyn CaptureValue) -> bool {
        value.as_any().is::<Uuid>()
    }

    fn convert(
        &self,
        value: &dyn CaptureValue,
        _recurse: &mut dyn Recurse,
    ) -> Result<SafeValue, ConvertError> {
        let id = value
            .as_any()
            .downcast_ref::<Uuid>()
            .ok_or(ConvertError::Unclaimed(value.type_label()))?;
        Ok(SafeValue::Text(id.to_string()))
    }
}

/// Claims key/value collections. Keys coerce to text: text-shaped keys go
/// through the normalizer, anything else falls back to its textual
/// rendering. Coercion is total.
pub struct MappingConverter;

fn coerce_key(key: &dyn CaptureValue) -> String {
    if let Some(text) = key.as_text() {
        return normalize_str(&text).into_owned();
    }
    if let Some(bytes) = key.as_bytes() {
        return normalize_bytes(bytes);
    }
    key.render_text()
}

impl Converter for MappingConverter {
    fn claims(&self, value: &dyn CaptureValue) -> bool {
        value.as_entries().is_some()
    }

    fn convert(
        &self,
        value: &dyn CaptureValue,
        recurse: &mut dyn Recurse,
    ) -> Result<SafeValue, ConvertError> {
        let entries = value
            .as_entries()
            .ok_or(ConvertError::Unclaimed(value.type_label()))?;
        Ok(SafeValue::Mapping(
            entries
                .into_iter()
                .map(|(key, child)| (coerce_key(key), recurse.transform(child)))
                .collect(),
        ))
    }
}

/// Claims text and byte-string values; both canonicalize through
/// `capture-encoding`.
pub struct TextConverter;

impl Converter for TextConverter {
    fn claims(&self, value: &dyn CaptureValue) -> bool {
        value.as_text().is_some() || value.as_bytes().is_some()
    }

    fn convert(
        &self,
        value: &dyn CaptureValue,
        _recurse: &mut dyn Recurse,
    ) -> Result<SafeValue, ConvertError> {
        if let Some(text) = value.as_text() {
            return Ok(SafeValue::Text(normalize_str(&text).into_owned()));
        }
        let bytes = value
            .as_bytes()
            .ok_or(ConvertError::Unclaimed(value.type_label()))?;
        Ok(SafeValue::Text(normalize_bytes(bytes)))
    }
}

/// Claims values exposing a custom-representation hook. Registered after
/// every structural converter, so a value that is both collection-shaped
/// and hook-carrying serializes structurally.
pub struct CustomReprConverter;

impl Converter for CustomReprConverter {
    fn claims(&self, value: &dyn CaptureValue) -> bool {
        value.custom_repr().is_some()
    }

    fn convert(
        &self,
        value: &dyn CaptureValue,
        recurse: &mut dyn Recurse,
    ) -> Result<SafeValue, ConvertError> {
        let hook = value
            .custom_repr()
            .ok_or(ConvertError::Unclaimed(value.type_label()))?;
        let substitute = hook.repr()?;
        Ok(recurse.transform(substitute.as_ref()))
    }
}

pub struct BooleanConverter;

impl Converter for BooleanConverter {
    fn claims(&self, value: &dyn CaptureValue) -> bool {
        value.as_any().is::<bool>()
    }

    fn convert(
        &self,
        value: &dyn CaptureValue,
        _recurse: &mut dyn Recurse,
    ) -> Result<SafeValue, ConvertError> {
        value
            .as_any()
            .downcast_ref::<bool>()
            .map(|v| SafeValue::Bool(*v))
            .ok_or(ConvertError::Unclaimed(value.type_label()))
    }
}

/// Exact value of any integer width that fits `i64`. A `u64`/`usize`
/// above `i64::MAX` is deliberately not claimed: it degrades to the
/// opaque fallback with its exact digits instead of being rounded
/// through a float.
fn integer_value(value: &dyn CaptureValue) -> Option<i64> {
    let any = value.as_any();
    if let Some(v) = any.downcast_ref::<i64>() {
        return Some(*v);
    }
    if let Some(v) = any.downcast_ref::<i32>() {
        return Some(i64::from(*v));
    }
    if let Some(v) = any.downcast_ref::<i16>() {
        return Some(i64::from(*v));
    }
    if let Some(v) = any.downcast_ref::<i8>() {
        return Some(i64::from(*v));
    }
    if let Some(v) = any.downcast_ref::<isize>() {
        return i64::try_from(*v).ok();
    }
    if let Some(v) = any.downcast_ref::<u8>() {
        return Some(i64::from(*v));
    }
    if let Some(v) = any.downcast_ref::<u16>() {
        return Some(i64::from(*v));
    }
    if let Some(v) = any.downcast_ref::<u32>() {
        return Some(i64::from(*v));
    }
    if let Some(v) = any.downcast_ref::<u64>() {
        return i64::try_from(*v).ok();
    }
    if let Some(v) = any.downcast_ref::<usize>() {
        return i64::try_from(*v).ok();
    }
    None
}

pub struct IntegerConverter;

impl Converter for IntegerConverter {
    fn claims(&self, value: &dyn CaptureValue) -> bool {
        integer_value(value).is_some()
    }

    fn convert(
        &self,
        value: &dyn CaptureValue,
        _recurse: &mut dyn Recurse,
    ) -> Result<SafeValue, ConvertError> {
        integer_value(value)
            .map(SafeValue::Integer)
            .ok_or(ConvertError::Unclaimed(value.type_label()))
    }
}

pub struct FloatConverter;

impl Converter for FloatConverter {
    fn claims(&self, value: &dyn CaptureValue) -> bool {
        let any = value.as_any();
        any.is::<f64>() || any.is::<f32>()
    }

    fn convert(
        &self,
        value: &dyn CaptureValue,
        _recurse: &mut dyn Recurse,
    ) -> Result<SafeValue, ConvertError> {
        let any = value.as_any();
        if let Some(v) = any.downcast_ref::<f64>() {
            return Ok(SafeValue::Float(*v));
        }
        any.downcast_ref::<f32>()
            .map(|v| SafeValue::Float(f64::from(*v)))
            .ok_or(ConvertError::Unclaimed(value.type_label()))
    }
}

pub struct NullConverter;

impl Converter for NullConverter {
    fn claims(&self, value: &dyn CaptureValue) -> bool {
        value.is_null()
    }

    fn convert(
        &self,
        _value: &dyn CaptureValue,
        _recurse: &mut dyn Recurse,
    ) -> Result<SafeValue, ConvertError> {
        Ok(SafeValue::Null)
    }
}
