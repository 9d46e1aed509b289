//! Data transforms, assertions and value mappings.
//!
//! Read transforms apply the resource's `mask`, `shift`, `base`, `scale` and
//! `offset` in that order; write transforms undo `offset`, `scale` and `base`
//! in that order. A transformed value keeps its type and must fit in it.
//! Bool and string values pass through untouched.
//!
//! Neutral parameters (`mask = 0`, `shift = 0`, `base = 0`, `scale = 1`,
//! `offset = 0`) are skipped.

use std::fmt;

use crate::profile::ValueProperties;
use crate::value::{CommandValue, Value, ValueType};

/// A transform could not be applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("{step} of {value} overflows {value_type}")]
    Overflow {
        step: &'static str,
        value_type: ValueType,
        value: String,
    },

    #[error("{step} parameter {parameter} cannot be applied to {value}")]
    InvalidParameter {
        step: &'static str,
        parameter: f64,
        value: String,
    },
}

/// Apply the read transform of `properties` to `value`.
///
/// # Errors
///
/// Returns a [`TransformError`] when a step overflows the value's type or a
/// parameter cannot be applied.
pub fn transform_read(
    value: &CommandValue,
    properties: &ValueProperties,
) -> Result<CommandValue, TransformError> {
    let value_type = value.value_type();
    if !value_type.is_numeric() {
        return Ok(value.clone());
    }
    let mut current = value.value().clone();

    if value_type.is_unsigned() {
        if let Some(mask) = properties.mask.filter(|m| *m != 0) {
            current = unsigned_step(&current, "mask", |v| Some(v & u128::from(mask)))?;
        }
        if let Some(shift) = properties.shift.filter(|s| *s != 0) {
            current = unsigned_step(&current, "shift", |v| {
                if shift > 0 {
                    v.checked_shl(shift.unsigned_abs())
                        .filter(|shifted| shifted >> shift.unsigned_abs() == v)
                } else {
                    v.checked_shr(shift.unsigned_abs())
                }
            })?;
        }
    }
    if let Some(base) = properties.base.filter(|b| *b != 0.0) {
        if base < 0.0 {
            return Err(invalid("base", base, &current));
        }
        current = float_step(&current, "base", |v| base.powf(v))?;
    }
    if let Some(scale) = properties.scale.filter(|s| (*s - 1.0).abs() > f64::EPSILON) {
        current = arith_step(&current, "scale", scale, i128::checked_mul, |v| v * scale)?;
    }
    if let Some(offset) = properties.offset.filter(|o| *o != 0.0) {
        current = arith_step(&current, "offset", offset, i128::checked_add, |v| v + offset)?;
    }

    Ok(value.with_value(current))
}

/// Apply the inverse (write) transform of `properties` to `value`.
///
/// # Errors
///
/// Returns a [`TransformError`] when a step overflows the value's type or a
/// parameter cannot be inverted (zero scale, non-positive base or operand).
pub fn transform_write(
    value: &CommandValue,
    properties: &ValueProperties,
) -> Result<CommandValue, TransformError> {
    let value_type = value.value_type();
    if !value_type.is_numeric() {
        return Ok(value.clone());
    }
    let mut current = value.value().clone();

    if let Some(offset) = properties.offset.filter(|o| *o != 0.0) {
        current = arith_step(&current, "offset", offset, i128::checked_sub, |v| v - offset)?;
    }
    if let Some(scale) = properties.scale.filter(|s| (*s - 1.0).abs() > f64::EPSILON) {
        if scale == 0.0 {
            return Err(invalid("scale", scale, &current));
        }
        current = arith_step(&current, "scale", scale, i128::checked_div, |v| v / scale)?;
    }
    if let Some(base) = properties.base.filter(|b| *b != 0.0) {
        if base <= 0.0 || (base - 1.0).abs() < f64::EPSILON || as_f64(&current) <= 0.0 {
            return Err(invalid("base", base, &current));
        }
        current = float_step(&current, "base", |v| v.log(base))?;
    }

    Ok(value.with_value(current))
}

/// A reading did not match its resource's assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFailure {
    pub value: String,
    pub assertion: String,
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Assertion failed for device resource, with value: {} and assertion: {}",
            self.value, self.assertion
        )
    }
}

impl AssertionFailure {
    /// Textual command value replacing the one that failed the assertion.
    #[must_use]
    pub fn to_command_value(&self, original: &CommandValue) -> CommandValue {
        original.with_value(Value::String(self.to_string()))
    }
}

/// Compare the textual form of `value` with `assertion`.
///
/// An absent or empty assertion always holds.
///
/// # Errors
///
/// Returns an [`AssertionFailure`] describing the mismatch.
pub fn check_assertion(
    value: &CommandValue,
    assertion: Option<&str>,
) -> Result<(), AssertionFailure> {
    let Some(assertion) = assertion.filter(|a| !a.is_empty()) else {
        return Ok(());
    };
    let text = value.value().to_string();
    if text == assertion {
        Ok(())
    } else {
        Err(AssertionFailure {
            value: text,
            assertion: assertion.to_string(),
        })
    }
}

/// Substitute `value` through its operation's mapping table.
///
/// Returns `None` when the table has no entry for the value's text; the
/// mapped value is always a string.
#[must_use]
pub fn map_value(value: &CommandValue) -> Option<CommandValue> {
    let text = value.value().to_string();
    let mapped = value.operation().mapped(&text)?;
    Some(value.with_value(Value::String(mapped.to_string())))
}

fn invalid(step: &'static str, parameter: f64, value: &Value) -> TransformError {
    TransformError::InvalidParameter {
        step,
        parameter,
        value: value.to_string(),
    }
}

fn overflow(step: &'static str, value: &Value) -> TransformError {
    TransformError::Overflow {
        step,
        value_type: value.value_type(),
        value: value.to_string(),
    }
}

fn unsigned_step(
    value: &Value,
    step: &'static str,
    op: impl FnOnce(u128) -> Option<u128>,
) -> Result<Value, TransformError> {
    let raw = match value {
        Value::Uint8(v) => u128::from(*v),
        Value::Uint16(v) => u128::from(*v),
        Value::Uint32(v) => u128::from(*v),
        Value::Uint64(v) => u128::from(*v),
        other => return Ok(other.clone()),
    };
    let result = op(raw).ok_or_else(|| overflow(step, value))?;
    let converted = match value {
        Value::Uint8(_) => u8::try_from(result).map(Value::Uint8).ok(),
        Value::Uint16(_) => u16::try_from(result).map(Value::Uint16).ok(),
        Value::Uint32(_) => u32::try_from(result).map(Value::Uint32).ok(),
        _ => u64::try_from(result).map(Value::Uint64).ok(),
    };
    converted.ok_or_else(|| overflow(step, value))
}

/// Integer operands with an integral parameter are computed exactly; anything
/// else goes through `f64`.
fn arith_step(
    value: &Value,
    step: &'static str,
    parameter: f64,
    int_op: impl FnOnce(i128, i128) -> Option<i128>,
    float_op: impl FnOnce(f64) -> f64,
) -> Result<Value, TransformError> {
    let (Some(operand), Some(parameter)) = (as_i128(value), integral(parameter)) else {
        return float_step(value, step, float_op);
    };
    int_op(operand, parameter)
        .and_then(|result| from_i128(value.value_type(), result))
        .ok_or_else(|| overflow(step, value))
}

fn as_i128(value: &Value) -> Option<i128> {
    match value {
        Value::Uint8(v) => Some(i128::from(*v)),
        Value::Uint16(v) => Some(i128::from(*v)),
        Value::Uint32(v) => Some(i128::from(*v)),
        Value::Uint64(v) => Some(i128::from(*v)),
        Value::Int8(v) => Some(i128::from(*v)),
        Value::Int16(v) => Some(i128::from(*v)),
        Value::Int32(v) => Some(i128::from(*v)),
        Value::Int64(v) => Some(i128::from(*v)),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn integral(parameter: f64) -> Option<i128> {
    // 2^64 bounds every parameter that can matter to a 64-bit operand
    let bounded = parameter.abs() < 18_446_744_073_709_551_616.0;
    (parameter.fract() == 0.0 && bounded).then_some(parameter as i128)
}

fn from_i128(value_type: ValueType, result: i128) -> Option<Value> {
    match value_type {
        ValueType::Uint8 => u8::try_from(result).ok().map(Value::Uint8),
        ValueType::Uint16 => u16::try_from(result).ok().map(Value::Uint16),
        ValueType::Uint32 => u32::try_from(result).ok().map(Value::Uint32),
        ValueType::Uint64 => u64::try_from(result).ok().map(Value::Uint64),
        ValueType::Int8 => i8::try_from(result).ok().map(Value::Int8),
        ValueType::Int16 => i16::try_from(result).ok().map(Value::Int16),
        ValueType::Int32 => i32::try_from(result).ok().map(Value::Int32),
        ValueType::Int64 => i64::try_from(result).ok().map(Value::Int64),
        _ => None,
    }
}

fn float_step(
    value: &Value,
    step: &'static str,
    op: impl FnOnce(f64) -> f64,
) -> Result<Value, TransformError> {
    let result = op(as_f64(value));
    from_f64(value.value_type(), result).ok_or_else(|| overflow(step, value))
}

#[allow(clippy::cast_precision_loss)]
fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Uint8(v) => f64::from(*v),
        Value::Uint16(v) => f64::from(*v),
        Value::Uint32(v) => f64::from(*v),
        Value::Uint64(v) => *v as f64,
        Value::Int8(v) => f64::from(*v),
        Value::Int16(v) => f64::from(*v),
        Value::Int32(v) => f64::from(*v),
        Value::Int64(v) => *v as f64,
        Value::Float32(v) => f64::from(*v),
        Value::Float64(v) => *v,
        Value::Bool(_) | Value::String(_) => f64::NAN,
    }
}

/// Convert back into `value_type`, truncating toward zero for integers.
/// Returns `None` when the result does not fit.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn from_f64(value_type: ValueType, result: f64) -> Option<Value> {
    if !result.is_finite() {
        return None;
    }
    let t = result.trunc();
    let in_range = |min: f64, max_exclusive: f64| (min..max_exclusive).contains(&t);
    let value = match value_type {
        ValueType::Uint8 => in_range(0.0, 256.0).then(|| Value::Uint8(t as u8))?,
        ValueType::Uint16 => in_range(0.0, 65_536.0).then(|| Value::Uint16(t as u16))?,
        ValueType::Uint32 => in_range(0.0, 4_294_967_296.0).then(|| Value::Uint32(t as u32))?,
        ValueType::Uint64 => {
            in_range(0.0, 18_446_744_073_709_551_616.0).then(|| Value::Uint64(t as u64))?
        }
        ValueType::Int8 => in_range(-128.0, 128.0).then(|| Value::Int8(t as i8))?,
        ValueType::Int16 => in_range(-32_768.0, 32_768.0).then(|| Value::Int16(t as i16))?,
        ValueType::Int32 => {
            in_range(-2_147_483_648.0, 2_147_483_648.0).then(|| Value::Int32(t as i32))?
        }
        ValueType::Int64 => in_range(-9_223_372_036_854_775_808.0, 9_223_372_036_854_775_808.0)
            .then(|| Value::Int64(t as i64))?,
        ValueType::Float32 => {
            (result.abs() <= f64::from(f32::MAX)).then(|| Value::Float32(result as f32))?
        }
        ValueType::Float64 => Value::Float64(result),
        ValueType::Bool | ValueType::String => return None,
    };
    Some(value)
}
