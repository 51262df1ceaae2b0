//! The value model: runtime-inspectable descriptions of legal wire values.
//!
//! A [`Shape`] classifies JSON values structurally, the way the protocol
//! itself does: unions carry no discriminant tag, optional record fields may
//! be absent, and closed code sets reject values outside their declared
//! range. Shapes are plain data so a registry built from them can be
//! enumerated by tooling and tests.

use std::fmt;
use std::ops::RangeInclusive;

use serde_json::Value;


/// Kind of JSON scalar accepted by [`Shape::Primitive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, parse_display::Display)]
#[display(style = "lowercase")]
pub enum PrimitiveKind {
    String,
    Integer,
    Boolean,
    Float,
}

/// Structural description of a legal wire value.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Primitive(PrimitiveKind),
    /// Integer restricted to a closed range of legal codes.
    IntRange(RangeInclusive<i64>),
    /// String restricted to a closed set of legal literals.
    StringEnum(&'static [&'static str]),
    /// Object with a fixed set of named fields. Fields not declared here are
    /// passed through untouched.
    Record(Vec<Field>),
    /// Closed union of 2+ alternatives, matched first-in-declared-order.
    Union(Vec<Shape>),
    Sequence(Box<Shape>),
    /// Permits an explicit `null` in addition to the wrapped shape's values.
    Nullable(Box<Shape>),
    /// A shape with a semantic predicate the structural match alone cannot
    /// express, e.g. a range whose start must not come after its end. The
    /// predicate runs only on values that already match `inner`.
    Refined {
        inner: Box<Shape>,
        expected: &'static str,
        check: fn(&Value) -> bool,
    },
    /// Free-form JSON preserved losslessly and never interpreted.
    Opaque,
}

/// One named field of a [`Shape::Record`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
    pub optional: bool,
}

impl Field {
    pub fn required(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            optional: false,
        }
    }

    pub fn optional(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            optional: true,
        }
    }
}

/// A wire value that does not conform to the shape it was validated against.
///
/// `path` is a JSON-path-style locator into the offending value, `expected`
/// the rendered shape at that point, and `found` the value that was there.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("at {path}: expected {expected}, found {found}")]
pub struct ShapeError {
    pub path: String,
    pub expected: String,
    pub found: Value,
}

impl ShapeError {
    fn mismatch(shape: &Shape, found: &Value) -> Self {
        Self {
            path: String::new(),
            expected: shape.to_string(),
            found: found.clone(),
        }
    }

    fn in_field(mut self, name: &str) -> Self {
        self.path.insert_str(0, &format!(".{name}"));
        self
    }

    fn at_index(mut self, index: usize) -> Self {
        self.path.insert_str(0, &format!("[{index}]"));
        self
    }

    fn rooted(mut self) -> Self {
        self.path.insert(0, '$');
        self
    }
}

impl Shape {
    pub fn string() -> Self {
        Self::Primitive(PrimitiveKind::String)
    }

    pub fn integer() -> Self {
        Self::Primitive(PrimitiveKind::Integer)
    }

    pub fn boolean() -> Self {
        Self::Primitive(PrimitiveKind::Boolean)
    }

    pub fn float() -> Self {
        Self::Primitive(PrimitiveKind::Float)
    }

    /// Non-negative integer, e.g. a line number or UTF-16 character offset.
    pub fn uint() -> Self {
        Self::IntRange(0..=i64::MAX)
    }

    pub fn record(fields: impl Into<Vec<Field>>) -> Self {
        Self::Record(fields.into())
    }

    pub fn union(alternatives: impl Into<Vec<Shape>>) -> Self {
        let alternatives = alternatives.into();
        debug_assert!(alternatives.len() >= 2, "a closed union needs 2+ alternatives");
        Self::Union(alternatives)
    }

    pub fn sequence(element: Shape) -> Self {
        Self::Sequence(Box::new(element))
    }

    pub fn nullable(inner: Shape) -> Self {
        Self::Nullable(Box::new(inner))
    }

    pub fn refined(inner: Shape, expected: &'static str, check: fn(&Value) -> bool) -> Self {
        Self::Refined {
            inner: Box::new(inner),
            expected,
            check,
        }
    }

    /// Structural-match predicate: does `value` conform to this shape?
    pub fn matches(&self, value: &Value) -> bool {
        self.check(value).is_ok()
    }

    /// Like [`matches`](Self::matches), but reports where and why the value
    /// diverges from the shape.
    pub fn conformance(&self, value: &Value) -> Result<(), ShapeError> {
        self.check(value).map_err(ShapeError::rooted)
    }

    /// Validates an incoming wire value against this shape.
    ///
    /// Conforming values are returned unchanged, so
    /// `decode(encode(v)) == v` holds for every conforming `v`.
    pub fn decode(&self, wire: Value) -> Result<Value, ShapeError> {
        self.conformance(&wire)?;
        Ok(wire)
    }

    /// Validates an outgoing value against this shape before it is handed to
    /// the transport.
    pub fn encode(&self, value: Value) -> Result<Value, ShapeError> {
        self.conformance(&value)?;
        Ok(value)
    }

    fn check(&self, value: &Value) -> Result<(), ShapeError> {
        match self {
            Shape::Primitive(kind) => {
                let ok = match kind {
                    PrimitiveKind::String => value.is_string(),
                    PrimitiveKind::Integer => value.is_i64() || value.is_u64(),
                    PrimitiveKind::Boolean => value.is_boolean(),
                    PrimitiveKind::Float => value.is_number(),
                };
                if ok {
                    Ok(())
                } else {
                    Err(ShapeError::mismatch(self, value))
                }
            }
            Shape::IntRange(range) => match value.as_i64() {
                Some(code) if range.contains(&code) => Ok(()),
                _ => Err(ShapeError::mismatch(self, value)),
            },
            Shape::StringEnum(literals) => match value.as_str() {
                Some(s) if literals.contains(&s) => Ok(()),
                _ => Err(ShapeError::mismatch(self, value)),
            },
            Shape::Record(fields) => {
                let Some(object) = value.as_object() else {
                    return Err(ShapeError::mismatch(self, value));
                };
                for field in fields {
                    match object.get(field.name) {
                        None if field.optional => {}
                        None => {
                            return Err(ShapeError::mismatch(&field.shape, &Value::Null)
                                .in_field(field.name));
                        }
                        // An explicit null is legal for an optional field even
                        // when its shape is not itself nullable.
                        Some(Value::Null) if field.optional => {}
                        Some(present) => {
                            field
                                .shape
                                .check(present)
                                .map_err(|e| e.in_field(field.name))?;
                        }
                    }
                }
                Ok(())
            }
            Shape::Union(alternatives) => {
                if alternatives.iter().any(|alt| alt.check(value).is_ok()) {
                    Ok(())
                } else {
                    Err(ShapeError::mismatch(self, value))
                }
            }
            Shape::Sequence(element) => {
                let Some(items) = value.as_array() else {
                    return Err(ShapeError::mismatch(self, value));
                };
                for (index, item) in items.iter().enumerate() {
                    element.check(item).map_err(|e| e.at_index(index))?;
                }
                Ok(())
            }
            Shape::Nullable(inner) => {
                if value.is_null() {
                    Ok(())
                } else {
                    inner.check(value)
                }
            }
            Shape::Refined { inner, check, .. } => {
                inner.check(value)?;
                if check(value) {
                    Ok(())
                } else {
                    Err(ShapeError::mismatch(self, value))
                }
            }
            Shape::Opaque => Ok(()),
        }
    }

    /// The set of JSON kinds a value matching this shape can have on the wire.
    pub fn wire_kinds(&self) -> WireKinds {
        match self {
            Shape::Primitive(PrimitiveKind::String) | Shape::StringEnum(_) => WireKinds::STRING,
            Shape::Primitive(PrimitiveKind::Integer | PrimitiveKind::Float)
            | Shape::IntRange(_) => WireKinds::NUMBER,
            Shape::Primitive(PrimitiveKind::Boolean) => WireKinds::BOOLEAN,
            Shape::Record(_) => WireKinds::OBJECT,
            Shape::Union(alternatives) => alternatives
                .iter()
                .fold(WireKinds::empty(), |kinds, alt| kinds.or(alt.wire_kinds())),
            Shape::Sequence(_) => WireKinds::ARRAY,
            Shape::Nullable(inner) => inner.wire_kinds().or(WireKinds::NULL),
            Shape::Refined { inner, .. } => inner.wire_kinds(),
            Shape::Opaque => WireKinds::ALL,
        }
    }

    /// For a union, whether its alternatives accept pairwise-disjoint JSON
    /// kinds, i.e. no wire value can structurally match two of them. Shapes
    /// other than unions trivially satisfy this.
    pub fn has_disjoint_alternatives(&self) -> bool {
        let Shape::Union(alternatives) = self else {
            return true;
        };
        for (i, a) in alternatives.iter().enumerate() {
            for b in &alternatives[i + 1..] {
                if a.wire_kinds().intersects(b.wire_kinds()) {
                    return false;
                }
            }
        }
        true
    }

    /// Visits this shape and every shape nested inside it.
    pub fn for_each(&self, f: &mut impl FnMut(&Shape)) {
        f(self);
        match self {
            Shape::Record(fields) => {
                for field in fields {
                    field.shape.for_each(f);
                }
            }
            Shape::Union(alternatives) => {
                for alt in alternatives {
                    alt.for_each(f);
                }
            }
            Shape::Sequence(inner) | Shape::Nullable(inner) | Shape::Refined { inner, .. } => {
                inner.for_each(f);
            }
            Shape::Primitive(_) | Shape::IntRange(_) | Shape::StringEnum(_) | Shape::Opaque => {}
        }
    }
}

/// Set of JSON kinds, used to audit unions for structural ambiguity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireKinds(u8);

impl WireKinds {
    pub const NULL: Self = Self(1);
    pub const BOOLEAN: Self = Self(1 << 1);
    pub const NUMBER: Self = Self(1 << 2);
    pub const STRING: Self = Self(1 << 3);
    pub const ARRAY: Self = Self(1 << 4);
    pub const OBJECT: Self = Self(1 << 5);
    pub const ALL: Self = Self(0b11_1111);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Shape::Primitive(kind) => write!(f, "{kind}"),
            Shape::IntRange(range) => write!(f, "integer in {}..={}", range.start(), range.end()),
            Shape::StringEnum(literals) => {
                let mut first = true;
                for literal in *literals {
                    if !first {
                        write!(f, " | ")?;
                    }
                    first = false;
                    write!(f, "{literal:?}")?;
                }
                Ok(())
            }
            Shape::Record(fields) => {
                write!(f, "{{")?;
                let mut first = true;
                for field in fields {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    write!(f, "{}", field.name)?;
                    if field.optional {
                        write!(f, "?")?;
                    }
                }
                write!(f, "}}")
            }
            Shape::Union(alternatives) => {
                let mut first = true;
                for alt in alternatives {
                    if !first {
                        write!(f, " | ")?;
                    }
                    first = false;
                    write!(f, "{alt}")?;
                }
                Ok(())
            }
            Shape::Sequence(element) => {
                if matches!(**element, Shape::Union(_)) {
                    write!(f, "({element})[]")
                } else {
                    write!(f, "{element}[]")
                }
            }
            Shape::Nullable(inner) => write!(f, "{inner} | null"),
            Shape::Refined { expected, .. } => write!(f, "{expected}"),
            Shape::Opaque => write!(f, "any"),
        }
    }
}
