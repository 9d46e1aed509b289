//! Typed command values and the coercion of raw request strings into them.
//!
//! A [`CommandValue`] is what flows between the gateway and a protocol
//! driver: a typed [`Value`], the [`ResourceOperation`] it belongs to and the
//! millisecond origin at which it was produced. The value type tag is derived
//! from the payload, so the two can never disagree.

use std::fmt;
use std::num::{IntErrorKind, ParseFloatError, ParseIntError};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::profile::ResourceOperation;
use crate::time::{OriginMillis, now_millis};

/// Supported declared value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Bool,
    String,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
}

impl ValueType {
    pub const ALL: [Self; 12] = [
        Self::Bool,
        Self::String,
        Self::Uint8,
        Self::Uint16,
        Self::Uint32,
        Self::Uint64,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Float32,
        Self::Float64,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::String => "String",
            Self::Uint8 => "Uint8",
            Self::Uint16 => "Uint16",
            Self::Uint32 => "Uint32",
            Self::Uint64 => "Uint64",
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
        }
    }

    /// Whether data transforms apply to values of this type.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::Bool | Self::String)
    }

    #[must_use]
    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = CoercionError;

    /// Parse a declared type name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoercionError::UnsupportedType(s.to_string()))
    }
}

/// A typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Bool(bool),
    String(String),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
}

impl Value {
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::String(_) => ValueType::String,
            Self::Uint8(_) => ValueType::Uint8,
            Self::Uint16(_) => ValueType::Uint16,
            Self::Uint32(_) => ValueType::Uint32,
            Self::Uint64(_) => ValueType::Uint64,
            Self::Int8(_) => ValueType::Int8,
            Self::Int16(_) => ValueType::Int16,
            Self::Int32(_) => ValueType::Int32,
            Self::Int64(_) => ValueType::Int64,
            Self::Float32(_) => ValueType::Float32,
            Self::Float64(_) => ValueType::Float64,
        }
    }

    /// Parse `raw` as a value of `value_type`.
    ///
    /// # Errors
    ///
    /// Returns a [`CoercionError`] when `raw` is not a valid literal of the
    /// type or falls outside its range.
    pub fn parse(value_type: ValueType, raw: &str) -> Result<Self, CoercionError> {
        let value = match value_type {
            ValueType::Bool => Self::Bool(parse_bool(raw)?),
            ValueType::String => Self::String(raw.to_string()),
            ValueType::Uint8 => Self::Uint8(parse_unsigned(value_type, raw)?),
            ValueType::Uint16 => Self::Uint16(parse_unsigned(value_type, raw)?),
            ValueType::Uint32 => Self::Uint32(parse_unsigned(value_type, raw)?),
            ValueType::Uint64 => Self::Uint64(parse_unsigned(value_type, raw)?),
            ValueType::Int8 => Self::Int8(parse_int(value_type, raw)?),
            ValueType::Int16 => Self::Int16(parse_int(value_type, raw)?),
            ValueType::Int32 => Self::Int32(parse_int(value_type, raw)?),
            ValueType::Int64 => Self::Int64(parse_int(value_type, raw)?),
            ValueType::Float32 => Self::Float32(parse_float::<f32>(value_type, raw)?),
            ValueType::Float64 => Self::Float64(parse_float::<f64>(value_type, raw)?),
        };
        Ok(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Uint8(v) => write!(f, "{v}"),
            Self::Uint16(v) => write!(f, "{v}"),
            Self::Uint32(v) => write!(f, "{v}"),
            Self::Uint64(v) => write!(f, "{v}"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
        }
    }
}

/// A typed value bound to the operation that produced or consumes it.
///
/// Fields are private: a command value is never mutated, transforms and
/// mappings build a replacement with [`CommandValue::with_value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandValue {
    operation: ResourceOperation,
    origin: OriginMillis,
    value: Value,
}

impl CommandValue {
    #[must_use]
    pub fn new(operation: ResourceOperation, origin: OriginMillis, value: Value) -> Self {
        Self {
            operation,
            origin,
            value,
        }
    }

    #[must_use]
    pub fn operation(&self) -> &ResourceOperation {
        &self.operation
    }

    #[must_use]
    pub fn origin(&self) -> OriginMillis {
        self.origin
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }

    /// Same operation and origin, new payload.
    #[must_use]
    pub fn with_value(&self, value: Value) -> Self {
        Self {
            operation: self.operation.clone(),
            origin: self.origin,
            value,
        }
    }
}

impl fmt::Display for CommandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.operation.object, self.value, self.value_type())
    }
}

/// Why a raw string could not become a [`CommandValue`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoercionError {
    #[error("unsupported value type {0:?}")]
    UnsupportedType(String),

    #[error("cannot parse {value:?} as Bool")]
    InvalidBool { value: String },

    #[error("cannot parse {value:?} as {value_type}")]
    InvalidInteger {
        value_type: ValueType,
        value: String,
        #[source]
        source: Option<ParseIntError>,
    },

    #[error("cannot parse {value:?} as {value_type}")]
    InvalidFloat {
        value_type: ValueType,
        value: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("{value:?} is out of range for {value_type}")]
    OutOfRange { value_type: ValueType, value: String },

    #[error("{value:?} is not a finite {value_type}")]
    NotFinite { value_type: ValueType, value: String },
}

/// Coerce a raw request string into a value of the declared type.
///
/// The declared type name is matched case-insensitively. The resulting value
/// is stamped with `operation` and the current time.
///
/// # Errors
///
/// Returns [`CoercionError::UnsupportedType`] for an unknown type name, or
/// the parse error for `raw`.
pub fn coerce(
    declared_type: &str,
    operation: &ResourceOperation,
    raw: &str,
) -> Result<CommandValue, CoercionError> {
    let value_type = declared_type.parse::<ValueType>()?;
    let value = Value::parse(value_type, raw)?;
    Ok(CommandValue::new(operation.clone(), now_millis(), value))
}

fn parse_bool(raw: &str) -> Result<bool, CoercionError> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(CoercionError::InvalidBool {
            value: raw.to_string(),
        }),
    }
}

fn parse_int<T>(value_type: ValueType, raw: &str) -> Result<T, CoercionError>
where
    T: FromStr<Err = ParseIntError>,
{
    raw.parse::<T>().map_err(|source| match source.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => CoercionError::OutOfRange {
            value_type,
            value: raw.to_string(),
        },
        _ => CoercionError::InvalidInteger {
            value_type,
            value: raw.to_string(),
            source: Some(source),
        },
    })
}

/// Unsigned values take no sign at all, not even `+`.
fn parse_unsigned<T>(value_type: ValueType, raw: &str) -> Result<T, CoercionError>
where
    T: FromStr<Err = ParseIntError>,
{
    if raw.starts_with('+') {
        return Err(CoercionError::InvalidInteger {
            value_type,
            value: raw.to_string(),
            source: None,
        });
    }
    parse_int(value_type, raw)
}

/// Floats that only become infinite by overflowing the target precision are
/// out of range; spelled-out infinities and NaN are rejected outright.
fn parse_float<T>(value_type: ValueType, raw: &str) -> Result<T, CoercionError>
where
    T: FromStr<Err = ParseFloatError> + Into<f64> + Copy,
{
    let parsed = raw
        .parse::<T>()
        .map_err(|source| CoercionError::InvalidFloat {
            value_type,
            value: raw.to_string(),
            source,
        })?;
    let wide: f64 = parsed.into();
    if wide.is_finite() {
        return Ok(parsed);
    }
    let digits = raw.trim_start_matches(['+', '-']).to_ascii_lowercase();
    if wide.is_nan() || digits.starts_with("inf") {
        Err(CoercionError::NotFinite {
            value_type,
            value: raw.to_string(),
        })
    } else {
        Err(CoercionError::OutOfRange {
            value_type,
            value: raw.to_string(),
        })
    }
}
