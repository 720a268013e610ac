// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [9 Type Conversion and Testing](https://262.ecma-international.org/5.1/#sec-9)
//!
//! The conversion abstract operations. All of them are polymorphic over the
//! tagged value; the numeric ones bottom out in pure `f64` helpers that the
//! unit tests cover exhaustively.

use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::types::language::object::ObjectData;
use crate::ecmascript::types::language::string::HeapString;
use crate::engine::value::Value;
use crate::heap::handle::Handle;
use crate::heap::header::{ErrorKind, HeapTag, ObjectClass};

#[derive(Debug, Clone, Copy)]
pub enum PreferredType {
    String,
    Number,
}

/// ### [9.1 ToPrimitive](https://262.ecma-international.org/5.1/#sec-9.1)
pub fn to_primitive(
    agent: &mut Agent,
    input: Handle<Value>,
    preferred_type: Option<PreferredType>,
) -> JsResult<Handle<Value>> {
    if input.value().is_object() {
        // Objects defer to [[DefaultValue]]; the default hint is Number.
        let hint = preferred_type.unwrap_or(PreferredType::Number);
        ObjectData::default_value(agent, input.cast(), hint)
    } else {
        // Every primitive converts to itself.
        Ok(input)
    }
}

/// ### [9.2 ToBoolean](https://262.ecma-international.org/5.1/#sec-9.2)
pub fn to_boolean(value: Value) -> bool {
    if value.is_boolean() {
        return value.is_true();
    }
    if value.is_undefined() || value.is_null() {
        return false;
    }
    if value.is_number() {
        let number = value.get_number();
        return number != 0.0 && !number.is_nan();
    }
    if value.is_string() {
        // SAFETY: tag-checked.
        return !unsafe { value.data::<HeapString>() }.is_empty();
    }
    // Objects are always truthy.
    true
}

/// ### [9.3 ToNumber](https://262.ecma-international.org/5.1/#sec-9.3)
pub fn to_number(agent: &mut Agent, value: Handle<Value>) -> JsResult<f64> {
    let raw = value.value();
    if raw.is_number() {
        return Ok(raw.get_number());
    }
    if raw.is_undefined() {
        return Ok(f64::NAN);
    }
    if raw.is_null() {
        return Ok(0.0);
    }
    if raw.is_boolean() {
        return Ok(if raw.is_true() { 1.0 } else { 0.0 });
    }
    if raw.is_string() {
        // SAFETY: tag-checked.
        return Ok(string_to_number(unsafe { raw.data::<HeapString>() }.code_units()));
    }
    // Objects convert through ToPrimitive with hint Number.
    let primitive = to_primitive(agent, value, Some(PreferredType::Number))?;
    to_number(agent, primitive)
}

/// ### [9.4 ToInteger](https://262.ecma-international.org/5.1/#sec-9.4)
pub fn to_integer(agent: &mut Agent, value: Handle<Value>) -> JsResult<f64> {
    let number = to_number(agent, value)?;
    if number.is_nan() {
        return Ok(0.0);
    }
    if number == 0.0 || number.is_infinite() {
        return Ok(number);
    }
    Ok(number.signum() * number.abs().floor())
}

/// ### [9.5 ToInt32](https://262.ecma-international.org/5.1/#sec-9.5)
pub fn to_int32(agent: &mut Agent, value: Handle<Value>) -> JsResult<i32> {
    Ok(f64_to_int32(to_number(agent, value)?))
}

/// ### [9.6 ToUint32](https://262.ecma-international.org/5.1/#sec-9.6)
pub fn to_uint32(agent: &mut Agent, value: Handle<Value>) -> JsResult<u32> {
    Ok(f64_to_uint32(to_number(agent, value)?))
}

/// ### [9.7 ToUint16](https://262.ecma-international.org/5.1/#sec-9.7)
pub fn to_uint16(agent: &mut Agent, value: Handle<Value>) -> JsResult<u16> {
    Ok(f64_to_uint32(to_number(agent, value)?) as u16)
}

/// The modulo-2^32 core shared by the integer conversions. NaN and the
/// infinities map to zero.
pub fn f64_to_uint32(number: f64) -> u32 {
    if !number.is_finite() || number == 0.0 {
        return 0;
    }
    let truncated = number.trunc();
    let modulus = 4294967296.0;
    let mut remainder = truncated % modulus;
    if remainder < 0.0 {
        remainder += modulus;
    }
    remainder as u32
}

pub fn f64_to_int32(number: f64) -> i32 {
    f64_to_uint32(number) as i32
}

/// ### [9.8 ToString](https://262.ecma-international.org/5.1/#sec-9.8)
pub fn to_string(agent: &mut Agent, value: Handle<Value>) -> JsResult<Handle<HeapString>> {
    let raw = value.value();
    if raw.is_string() {
        return Ok(value.cast());
    }
    if raw.is_undefined() {
        return Ok(agent.intern_str("undefined"));
    }
    if raw.is_null() {
        return Ok(agent.intern_str("null"));
    }
    if raw.is_boolean() {
        return Ok(agent.intern_str(if raw.is_true() { "true" } else { "false" }));
    }
    if raw.is_number() {
        return Ok(number_to_string(agent, raw.get_number()));
    }
    // Objects convert through ToPrimitive with hint String.
    let primitive = to_primitive(agent, value, Some(PreferredType::String))?;
    to_string(agent, primitive)
}

/// `ToString` followed by interning; property keys are interned strings.
pub fn to_property_key(agent: &mut Agent, value: Handle<Value>) -> JsResult<Handle<HeapString>> {
    let string = to_string(agent, value)?;
    let units: Vec<u16> = string.code_units().to_vec();
    Ok(agent.intern_units(&units))
}

/// ### [9.8.1 ToString Applied to the Number Type](https://262.ecma-international.org/5.1/#sec-9.8.1)
pub fn number_to_string(agent: &mut Agent, number: f64) -> Handle<HeapString> {
    let text = f64_to_js_string(number);
    agent.new_string(&text)
}

pub fn f64_to_js_string(number: f64) -> String {
    if number.is_nan() {
        return "NaN".to_owned();
    }
    if number == 0.0 {
        return "0".to_owned();
    }
    if number.is_infinite() {
        return if number > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if number as i32 as f64 == number {
        return (number as i32).to_string();
    }
    let mut buffer = ryu_js::Buffer::new();
    buffer.format_finite(number).to_owned()
}

/// ### [9.3.1 ToNumber Applied to the String Type](https://262.ecma-international.org/5.1/#sec-9.3.1)
///
/// The StringNumericLiteral grammar: optional whitespace, then a signed
/// decimal literal, `Infinity`, or an unsigned hex literal. Anything else is
/// NaN; the empty remainder is zero.
pub fn string_to_number(units: &[u16]) -> f64 {
    let text = String::from_utf16_lossy(units);
    let trimmed = text.trim_matches(is_ecmascript_whitespace);
    if trimmed.is_empty() {
        return 0.0;
    }

    // Hex literals take no sign.
    if let Some(digits) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        if digits.is_empty() {
            return f64::NAN;
        }
        let mut result = 0.0f64;
        for character in digits.chars() {
            let Some(digit) = character.to_digit(16) else {
                return f64::NAN;
            };
            result = result * 16.0 + digit as f64;
        }
        return result;
    }

    let (sign, magnitude) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    if magnitude == "Infinity" {
        return sign * f64::INFINITY;
    }

    if !is_decimal_literal(magnitude) {
        return f64::NAN;
    }
    match fast_float::parse::<f64, _>(magnitude) {
        Ok(value) => sign * value,
        Err(_) => f64::NAN,
    }
}

/// StrDecimalLiteral without sign: digits, optional fraction, optional
/// exponent; at least one digit in mantissa.
fn is_decimal_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut position = 0;
    let mut mantissa_digits = 0;
    while position < bytes.len() && bytes[position].is_ascii_digit() {
        position += 1;
        mantissa_digits += 1;
    }
    if position < bytes.len() && bytes[position] == b'.' {
        position += 1;
        while position < bytes.len() && bytes[position].is_ascii_digit() {
            position += 1;
            mantissa_digits += 1;
        }
    }
    if mantissa_digits == 0 {
        return false;
    }
    if position < bytes.len() && (bytes[position] == b'e' || bytes[position] == b'E') {
        position += 1;
        if position < bytes.len() && (bytes[position] == b'+' || bytes[position] == b'-') {
            position += 1;
        }
        let mut exponent_digits = 0;
        while position < bytes.len() && bytes[position].is_ascii_digit() {
            position += 1;
            exponent_digits += 1;
        }
        if exponent_digits == 0 {
            return false;
        }
    }
    position == bytes.len()
}

fn is_ecmascript_whitespace(character: char) -> bool {
    matches!(
        character,
        ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C' | '\u{00A0}' | '\u{FEFF}' | '\u{2028}'
            | '\u{2029}'
    ) || character.is_whitespace()
}

/// ### [9.9 ToObject](https://262.ecma-international.org/5.1/#sec-9.9)
pub fn to_object(agent: &mut Agent, value: Handle<Value>) -> JsResult<Handle<ObjectData>> {
    let raw = value.value();
    if raw.is_object() {
        return Ok(value.cast());
    }
    if raw.is_undefined() || raw.is_null() {
        return Err(
            agent.throw_exception(ErrorKind::TypeError, "cannot convert undefined or null to object")
        );
    }
    if raw.is_boolean() {
        let prototype = agent.intrinsics.boolean_prototype;
        let prototype = Handle::new(agent, prototype);
        return Ok(agent.new_primitive_object(
            HeapTag::JsBoolean,
            ObjectClass::Boolean,
            prototype,
            value,
        ));
    }
    if raw.is_number() {
        let prototype = agent.intrinsics.number_prototype;
        let prototype = Handle::new(agent, prototype);
        return Ok(agent.new_primitive_object(
            HeapTag::JsNumber,
            ObjectClass::Number,
            prototype,
            value,
        ));
    }
    debug_assert!(raw.is_string());
    crate::ecmascript::builtins::string::new_string_wrapper(agent, value.cast())
}

/// ### [9.10 CheckObjectCoercible](https://262.ecma-international.org/5.1/#sec-9.10)
pub fn check_object_coercible(agent: &mut Agent, value: Handle<Value>) -> JsResult<()> {
    if value.value().is_undefined() || value.value().is_null() {
        return Err(agent.throw_exception(
            ErrorKind::TypeError,
            "cannot read properties of undefined or null",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int32_wraps_modulo_two_pow_32() {
        assert_eq!(f64_to_int32(0.0), 0);
        assert_eq!(f64_to_int32(-0.0), 0);
        assert_eq!(f64_to_int32(f64::NAN), 0);
        assert_eq!(f64_to_int32(f64::INFINITY), 0);
        assert_eq!(f64_to_int32(f64::NEG_INFINITY), 0);
        assert_eq!(f64_to_int32(3.9), 3);
        assert_eq!(f64_to_int32(-3.9), -3);
        assert_eq!(f64_to_int32(4294967296.0 * 3.0 - 4.0), -4);
        assert_eq!(f64_to_int32(2147483648.0), -2147483648);
        assert_eq!(f64_to_uint32(-1.0), 4294967295);
        assert_eq!(f64_to_uint32(4294967296.0), 0);
    }

    #[test]
    fn uint32_to_string_round_trips() {
        for n in [0u32, 1, 7, 4096, 4294967295] {
            let text = n.to_string();
            let units: Vec<u16> = text.encode_utf16().collect();
            let parsed = string_to_number(&units);
            assert_eq!(f64_to_uint32(parsed), n);
            assert_eq!(f64_to_js_string(parsed), text);
        }
    }

    #[test]
    fn string_numeric_literal_grammar() {
        let parse = |s: &str| {
            let units: Vec<u16> = s.encode_utf16().collect();
            string_to_number(&units)
        };
        assert_eq!(parse(""), 0.0);
        assert_eq!(parse("   "), 0.0);
        assert_eq!(parse(" 42 "), 42.0);
        assert_eq!(parse("-1.5e2"), -150.0);
        assert_eq!(parse(".5"), 0.5);
        assert_eq!(parse("5."), 5.0);
        assert_eq!(parse("0x12345"), 74565.0);
        assert_eq!(parse("0XFF"), 255.0);
        assert_eq!(parse("Infinity"), f64::INFINITY);
        assert_eq!(parse("-Infinity"), f64::NEG_INFINITY);
        assert!(parse("+0x10").is_nan());
        assert!(parse("1.2.3").is_nan());
        assert!(parse("12abc").is_nan());
        assert!(parse("e5").is_nan());
        assert!(parse("1e").is_nan());
        assert!(parse("inf").is_nan());
    }

    #[test]
    fn js_number_formatting() {
        assert_eq!(f64_to_js_string(f64::NAN), "NaN");
        assert_eq!(f64_to_js_string(0.0), "0");
        assert_eq!(f64_to_js_string(-0.0), "0");
        assert_eq!(f64_to_js_string(f64::INFINITY), "Infinity");
        assert_eq!(f64_to_js_string(42.0), "42");
        assert_eq!(f64_to_js_string(-7.0), "-7");
        assert_eq!(f64_to_js_string(0.5), "0.5");
    }
}
