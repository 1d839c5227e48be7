//! Extraction of flags and sub-fields packed into an integer.
//!
//! A layout is a list of `(name, BitField)` pairs. Parsing a raw value
//! against a layout yields a [`Fields`] map from name to [`FieldValue`].

use std::collections::BTreeMap;

use serde::Serialize;

/// Decoded bitfield, keyed by field name.
pub type Fields = BTreeMap<&'static str, FieldValue>;

/// Where a named field lives inside the raw integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitField {
    /// A single bit, decoded as a boolean.
    Bit(u8),
    /// A run of bits with optional inversion and symbolic names.
    Span(Span),
}

/// A run of `width` bits starting at `start`.
///
/// Without a width the span is a single flag at `start`. `invert` turns the
/// result into a boolean and negates it. `names` maps numeric values to
/// symbolic names; values past the end of the table stay numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: u8,
    pub width: Option<u8>,
    pub invert: bool,
    pub names: Option<&'static [&'static str]>,
}

impl Span {
    /// A multi-bit unsigned sub-field.
    pub const fn bits(start: u8, width: u8) -> Self {
        Self {
            start,
            width: Some(width),
            invert: false,
            names: None,
        }
    }

    /// A single flag, addressed as a span.
    pub const fn flag(start: u8) -> Self {
        Self {
            start,
            width: None,
            invert: false,
            names: None,
        }
    }

    /// Negate the decoded value.
    pub const fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }

    /// Map the numeric value through a name table.
    pub const fn named(mut self, names: &'static [&'static str]) -> Self {
        self.names = Some(names);
        self
    }
}

/// A decoded field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Uint(u32),
    Enum {
        #[serde(rename = "enum")]
        name: &'static str,
        #[serde(rename = "val")]
        value: u32,
    },
}

impl FieldValue {
    /// Boolean view: flags as-is, numbers as non-zero.
    pub fn as_bool(&self) -> bool {
        match *self {
            FieldValue::Bool(b) => b,
            FieldValue::Uint(v) | FieldValue::Enum { value: v, .. } => v != 0,
        }
    }

    /// Numeric view: flags as 0/1.
    pub fn as_u32(&self) -> u32 {
        match *self {
            FieldValue::Bool(b) => u32::from(b),
            FieldValue::Uint(v) | FieldValue::Enum { value: v, .. } => v,
        }
    }

    /// Symbolic name, if the value was mapped through a name table.
    pub fn name(&self) -> Option<&'static str> {
        match *self {
            FieldValue::Enum { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Uint(v) => write!(f, "{v}"),
            FieldValue::Enum { name, .. } => f.write_str(name),
        }
    }
}

/// Test a single bit.
pub fn flag(bits: u32, index: u8) -> bool {
    index < 32 && bits & (1 << index) != 0
}

/// Extract `width` bits starting at `start`.
pub fn sub_field(bits: u32, start: u8, width: u8) -> u32 {
    if start >= 32 {
        return 0;
    }
    let mask = if width >= 32 {
        u32::MAX
    } else {
        (1u32 << width) - 1
    };
    (bits >> start) & mask
}

/// Map a number to its symbolic name; unknown values pass through as numbers.
pub fn map_enum(value: u32, names: &'static [&'static str]) -> FieldValue {
    match names.get(value as usize) {
        Some(&name) => FieldValue::Enum { name, value },
        None => FieldValue::Uint(value),
    }
}

/// Decode `bits` against a layout.
pub fn parse_bitfield(bits: u32, layout: &[(&'static str, BitField)]) -> Fields {
    let mut out = Fields::new();
    parse_bitfield_into(bits, layout, &mut out);
    out
}

/// Decode `bits` against a layout, adding to an existing map.
///
/// Used when one logical set of flags is spread over several raw bytes.
pub fn parse_bitfield_into(bits: u32, layout: &[(&'static str, BitField)], out: &mut Fields) {
    for &(name, field) in layout {
        out.insert(name, decode_field(bits, field));
    }
}

fn decode_field(bits: u32, field: BitField) -> FieldValue {
    let span = match field {
        BitField::Bit(index) => return FieldValue::Bool(flag(bits, index)),
        BitField::Span(span) => span,
    };

    let value = match span.width {
        Some(width) => sub_field(bits, span.start, width),
        None => u32::from(flag(bits, span.start)),
    };

    if span.invert {
        return FieldValue::Bool(value == 0);
    }

    match (span.names, span.width) {
        (Some(names), _) => map_enum(value, names),
        (None, Some(_)) => FieldValue::Uint(value),
        (None, None) => FieldValue::Bool(value != 0),
    }
}
