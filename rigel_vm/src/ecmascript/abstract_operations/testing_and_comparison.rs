// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [11.8–11.9 Relational and Equality Comparison](https://262.ecma-international.org/5.1/#sec-11.8)
//!
//! SameValue, the strict and abstract equality comparisons, and the
//! abstract relational comparison the `<` family is defined in terms of.

use crate::ecmascript::abstract_operations::type_conversion::{
    PreferredType, to_number, to_primitive,
};
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::types::language::string::HeapString;
use crate::engine::value::Value;
use crate::heap::handle::Handle;

fn string_contents_equal(x: Value, y: Value) -> bool {
    // SAFETY: callers tag-check both values.
    unsafe { x.data::<HeapString>().equals(y.data::<HeapString>()) }
}

/// ### [9.12 The SameValue Algorithm](https://262.ecma-international.org/5.1/#sec-9.12)
///
/// Like strict equality, except NaN equals itself and positive and negative
/// zero differ.
pub fn same_value(x: Value, y: Value) -> bool {
    if x.is_number() && y.is_number() {
        let a = x.get_number();
        let b = y.get_number();
        if a.is_nan() && b.is_nan() {
            return true;
        }
        if a == b {
            return a != 0.0 || a.is_sign_negative() == b.is_sign_negative();
        }
        return false;
    }
    if x.is_string() && y.is_string() {
        return string_contents_equal(x, y);
    }
    // Undefined, null, booleans, and object identity.
    x == y
}

/// ### [11.9.6 The Strict Equality Comparison Algorithm](https://262.ecma-international.org/5.1/#sec-11.9.6)
pub fn strict_equality(x: Value, y: Value) -> bool {
    if x.is_number() && y.is_number() {
        // NaN compares unequal to everything; +0 equals -0.
        return x.get_number() == y.get_number();
    }
    if x.is_string() && y.is_string() {
        return string_contents_equal(x, y);
    }
    // Undefined, null, booleans, and object identity.
    x == y
}

/// ### [11.9.3 The Abstract Equality Comparison Algorithm](https://262.ecma-international.org/5.1/#sec-11.9.3)
pub fn abstract_equality(
    agent: &mut Agent,
    x: Handle<Value>,
    y: Handle<Value>,
) -> JsResult<bool> {
    let a = x.value();
    let b = y.value();

    // 1. Same type: use the strict comparison.
    if same_language_type(a, b) {
        return Ok(strict_equality(a, b));
    }

    // 2.-3. null and undefined are loosely equal to each other.
    if (a.is_null() && b.is_undefined()) || (a.is_undefined() && b.is_null()) {
        return Ok(true);
    }

    // 4.-5. A number and a string compare numerically.
    if a.is_number() && b.is_string() {
        let converted = to_number(agent, y)?;
        return Ok(a.get_number() == converted);
    }
    if a.is_string() && b.is_number() {
        let converted = to_number(agent, x)?;
        return Ok(converted == b.get_number());
    }

    // 6.-7. Booleans convert to numbers first.
    if a.is_boolean() {
        let converted = to_number(agent, x)?;
        let converted = Handle::new(agent, Value::from_f64(converted));
        return abstract_equality(agent, converted, y);
    }
    if b.is_boolean() {
        let converted = to_number(agent, y)?;
        let converted = Handle::new(agent, Value::from_f64(converted));
        return abstract_equality(agent, x, converted);
    }

    // 8.-9. A number or string meets an object through ToPrimitive.
    if (a.is_number() || a.is_string()) && b.is_object() {
        let primitive = to_primitive(agent, y, None)?;
        return abstract_equality(agent, x, primitive);
    }
    if a.is_object() && (b.is_number() || b.is_string()) {
        let primitive = to_primitive(agent, x, None)?;
        return abstract_equality(agent, primitive, y);
    }

    // 10. Everything else is unequal.
    Ok(false)
}

fn same_language_type(a: Value, b: Value) -> bool {
    (a.is_undefined() && b.is_undefined())
        || (a.is_null() && b.is_null())
        || (a.is_number() && b.is_number())
        || (a.is_string() && b.is_string())
        || (a.is_boolean() && b.is_boolean())
        || (a.is_object() && b.is_object())
}

/// ### [11.8.5 The Abstract Relational Comparison Algorithm](https://262.ecma-international.org/5.1/#sec-11.8.5)
///
/// `None` is the spec's *undefined* result (a NaN operand); callers treat it
/// as false.
pub fn abstract_relational(
    agent: &mut Agent,
    x: Handle<Value>,
    y: Handle<Value>,
    left_first: bool,
) -> JsResult<Option<bool>> {
    // 1.-2. Evaluate the ToPrimitive coercions in operand order.
    let (px, py) = if left_first {
        let px = to_primitive(agent, x, Some(PreferredType::Number))?;
        let py = to_primitive(agent, y, Some(PreferredType::Number))?;
        (px, py)
    } else {
        let py = to_primitive(agent, y, Some(PreferredType::Number))?;
        let px = to_primitive(agent, x, Some(PreferredType::Number))?;
        (px, py)
    };

    // 4. Two strings compare lexicographically by code unit.
    if px.value().is_string() && py.value().is_string() {
        // SAFETY: tag-checked.
        let less = unsafe {
            px.value().data::<HeapString>().code_units()
                < py.value().data::<HeapString>().code_units()
        };
        return Ok(Some(less));
    }

    // 3. Otherwise compare numerically; NaN gives the undefined result.
    let nx = to_number(agent, px)?;
    let ny = to_number(agent, py)?;
    if nx.is_nan() || ny.is_nan() {
        return Ok(None);
    }
    Ok(Some(nx < ny))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_equality_on_numbers() {
        let nan = Value::from_f64(f64::NAN);
        assert!(!strict_equality(nan, nan));
        assert!(strict_equality(Value::from_i32(0), Value::from_f64(-0.0)));
        assert!(strict_equality(Value::from_i32(5), Value::from_f64(5.0)));
        assert!(!strict_equality(Value::from_i32(5), Value::TRUE));
    }

    #[test]
    fn same_value_distinguishes_zeroes_and_unifies_nan() {
        let nan = Value::from_f64(f64::NAN);
        assert!(same_value(nan, nan));
        assert!(!same_value(Value::from_i32(0), Value::from_f64(-0.0)));
        assert!(same_value(Value::from_f64(-0.0), Value::from_f64(-0.0)));
        assert!(same_value(Value::UNDEFINED, Value::UNDEFINED));
        assert!(!same_value(Value::UNDEFINED, Value::NULL));
    }
}
