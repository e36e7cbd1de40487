//! The dispatcher: ordered converter registry plus the guarded
//! transformation driver.

use std::any::TypeId;

use crate::capture::CaptureValue;
use crate::convert::{
    BooleanConverter, Converter, CustomReprConverter, FloatConverter, IdentifierConverter,
    IntegerConverter, MappingConverter, NullConverter, PassthroughConverter, Recurse,
    SequenceConverter, TextConverter,
};
use crate::value::SafeValue;

/// Default nesting ceiling; generous for real payloads, finite for
/// hostile ones.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Sentinel emitted when a value already on the current path recurs.
pub const RECURSION_SENTINEL: &str = "<recursion>";

/// Sentinel emitted for levels past the depth ceiling.
pub const MAX_DEPTH_SENTINEL: &str = "<max depth exceeded>";

/// Builds a [`Serializer`]. Registration happens here, once, at startup;
/// the built serializer is immutable.
pub struct SerializerBuilder {
    converters: Vec<Box<dyn Converter>>,
    max_depth: usize,
}

impl SerializerBuilder {
    pub fn new() -> Self {
        Self {
            converters: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Appends a converter. Order is significant: for overlapping claims
    /// the earliest registration wins.
    pub fn register(mut self, converter: Box<dyn Converter>) -> Self {
        self.converters.push(converter);
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Appends the built-in converters in their canonical order: the
    /// safe-value pass-through first (cheapest, most specific), then the
    /// structural converters, then the custom-representation hook, then
    /// the primitives.
    pub fn with_default_converters(self) -> Self {
        self.register(Box::new(PassthroughConverter))
            .register(Box::new(SequenceConverter))
            .register(Box::new(IdentifierConverter))
            .register(Box::new(MappingConverter))
            .register(Box::new(TextConverter))
            .register(Box::new(CustomReprConverter))
            .register(Box::new(BooleanConverter))
            .register(Box::new(IntegerConverter))
            .register(Box::new(FloatConverter))
            .register(Box::new(NullConverter))
    }

    pub fn build(self) -> Serializer {
        Serializer {
            converters: self.converters,
            max_depth: self.max_depth,
        }
    }
}

impl Default for SerializerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Transforms arbitrary captured values into [`SafeValue`] trees.
///
/// Read-only after construction; one instance may serve concurrent
/// `transform` calls, each of which owns its own traversal state.
pub struct Serializer {
    converters: Vec<Box<dyn Converter>>,
    max_depth: usize,
}

impl Default for Serializer {
    fn default() -> Self {
        SerializerBuilder::new().with_default_converters().build()
    }
}

impl Serializer {
    /// First registered converter claiming `value`, if any.
    fn find(&self, value: &dyn CaptureValue) -> Option<&dyn Converter> {
        self.converters
            .iter()
            .map(AsRef::as_ref)
            .find(|converter| converter.claims(value))
    }

    /// Entry point. Always returns a value built from the safe shapes and
    /// never panics for any input graph: cycles and over-deep nesting
    /// render as sentinels, conversion failures as opaque fallbacks for
    /// the affected subtree only.
    pub fn transform(&self, value: &dyn CaptureValue) -> SafeValue {
        let mut walk = Walk {
            serializer: self,
            depth: 0,
            path: Vec::new(),
        };
        walk.transform(value)
    }
}

/// Best-effort rendering for values nothing claims or converts.
fn opaque_fallback(value: &dyn CaptureValue) -> SafeValue {
    SafeValue::Opaque(format!("<{}: {}>", value.type_label(), value.render_text()))
}

/// Identity of a value for cycle detection: the address of its concrete
/// `Any` view plus its concrete type. The address alone is not enough —
/// an array shares its address with its first element — and addresses on
/// the live path are only unique per type. Transparent wrappers forward
/// `as_any`, so a shared allocation keeps one identity no matter how it
/// is reached.
fn identity(value: &dyn CaptureValue) -> (usize, TypeId) {
    let any = value.as_any();
    (any as *const dyn std::any::Any as *const () as usize, any.type_id())
}

/// Traversal state owned by one `transform` call tree.
struct Walk<'a> {
    serializer: &'a Serializer,
    depth: usize,
    /// Identities of the values on the current path, root to leaf.
    path: Vec<(usize, TypeId)>,
}

impl Recurse for Walk<'_> {
    fn transform(&mut self, value: &dyn CaptureValue) -> SafeValue {
        let id = identity(value);
        if self.path.contains(&id) {
            return SafeValue::Opaque(RECURSION_SENTINEL.to_string());
        }
        if self.depth >= self.serializer.max_depth {
            return SafeValue::Opaque(MAX_DEPTH_SENTINEL.to_string());
        }
        self.path.push(id);
        self.depth += 1;

        let serializer = self.serializer;
        let result = match serializer.find(value) {
            Some(converter) => converter
                .convert(value, self)
                .unwrap_or_else(|_| opaque_fallback(value)),
            None => opaque_fallback(value),
        };

        self.depth -= 1;
        self.path.pop();
        result
    }
}
