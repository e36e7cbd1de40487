//! Safe-shape serialization of arbitrary captured values.
//!
//! Given any runtime value met while capturing a crash context, produce an
//! equivalent structure built only from JSON-safe shapes ([`SafeValue`]),
//! without ever failing the capture: unknown types, hostile representation
//! hooks, cyclic structures, and pathological nesting all degrade to
//! in-band textual fallbacks instead of errors.
//!
//! ```
//! use capture_serializer::{SafeValue, Serializer};
//!
//! let serializer = Serializer::default();
//! let report = serializer.transform(&vec![1_i64, 2, 3]);
//! assert_eq!(
//!     report,
//!     SafeValue::Sequence(vec![
//!         SafeValue::Integer(1),
//!         SafeValue::Integer(2),
//!         SafeValue::Integer(3),
//!     ])
//! );
//! ```

pub mod capture;
pub mod convert;
pub mod serializer;
pub mod value;

pub use capture::{CaptureValue, CapturedEntries, CustomRepr, RawBytes};
pub use convert::{ConvertError, Converter, Recurse};
pub use serializer::{
    Serializer, SerializerBuilder, DEFAULT_MAX_DEPTH, MAX_DEPTH_SENTINEL, RECURSION_SENTINEL,
};
pub use value::SafeValue;
