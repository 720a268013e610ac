// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [15.7 Number Objects](https://262.ecma-international.org/5.1/#sec-15.7)

use crate::ecmascript::abstract_operations::type_conversion::{f64_to_js_string, to_integer, to_number};
use crate::ecmascript::builtins::builtin_function::RuntimeCallInfo;
use crate::ecmascript::builtins::global_object::{define_builtin_function, define_value};
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::types::language::object::{ObjectData, PrimitiveObjectData};
use crate::engine::value::Value;
use crate::heap::handle::Handle;
use crate::heap::header::{ErrorKind, HeapTag, ObjectClass};

fn new_number_wrapper(agent: &mut Agent, value: f64) -> Handle<ObjectData> {
    let prototype = {
        let proto = agent.intrinsics.number_prototype;
        Handle::new(agent, proto)
    };
    let primitive = Handle::new(agent, Value::from_number(value));
    agent.new_primitive_object(HeapTag::JsNumber, ObjectClass::Number, prototype, primitive)
}

/// ### [15.7.1 The Number Constructor Called as a Function](https://262.ecma-international.org/5.1/#sec-15.7.1)
fn number_constructor_call(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    if info.args_count() == 0 {
        return Ok(Value::from_i32(0));
    }
    let argument = info.arg(0);
    let agent = info.agent();
    Ok(Value::from_number(to_number(agent, argument)?))
}

/// ### [15.7.2 The Number Constructor](https://262.ecma-international.org/5.1/#sec-15.7.2)
fn number_constructor_construct(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let value = if info.args_count() == 0 {
        0.0
    } else {
        let argument = info.arg(0);
        to_number(info.agent(), argument)?
    };
    Ok(new_number_wrapper(info.agent(), value).value())
}

/// The `this` primitive: a number, or a Number wrapper.
fn this_number_value(agent: &mut Agent, this: Handle<Value>) -> JsResult<f64> {
    let value = this.value();
    if value.is_number() {
        return Ok(value.get_number());
    }
    if value.is_object() && value.tag() == HeapTag::JsNumber {
        let wrapper: Handle<PrimitiveObjectData> = this.cast();
        return Ok(wrapper.primitive_value().get_number());
    }
    Err(agent.throw_exception(ErrorKind::TypeError, "not a Number object"))
}

/// ### [15.7.4.2 Number.prototype.toString ( \[ radix \] )](https://262.ecma-international.org/5.1/#sec-15.7.4.2)
fn number_prototype_to_string(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let radix_argument = info.arg(0);
    let agent = info.agent();
    let value = this_number_value(agent, this)?;

    let radix = if radix_argument.value().is_undefined() {
        10.0
    } else {
        to_integer(agent, radix_argument)?
    };
    if !(2.0..=36.0).contains(&radix) {
        return Err(agent.throw_exception(ErrorKind::RangeError, "toString() radix must be between 2 and 36"));
    }
    let text = if radix == 10.0 {
        f64_to_js_string(value)
    } else {
        f64_to_radix_string(value, radix as u32)
    };
    Ok(agent.new_string(&text).value())
}

/// ### [15.7.4.4 Number.prototype.valueOf ( )](https://262.ecma-international.org/5.1/#sec-15.7.4.4)
fn number_prototype_value_of(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let agent = info.agent();
    Ok(Value::from_number(this_number_value(agent, this)?))
}

/// Non-decimal formatting: an exact integer part, and up to 20 fraction
/// digits for non-integral values.
fn f64_to_radix_string(value: f64, radix: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }

    let negative = value < 0.0;
    let mut magnitude = value.abs();
    let mut integer_part = magnitude.trunc();
    magnitude -= integer_part;

    let mut integer_digits: Vec<u8> = Vec::new();
    if integer_part == 0.0 {
        integer_digits.push(b'0');
    }
    while integer_part >= 1.0 {
        let digit = (integer_part % radix as f64) as usize;
        integer_digits.push(DIGITS[digit]);
        integer_part = (integer_part / radix as f64).trunc();
    }
    integer_digits.reverse();

    let mut text = String::new();
    if negative {
        text.push('-');
    }
    text.push_str(core::str::from_utf8(&integer_digits).expect("radix digits are ASCII"));

    if magnitude > 0.0 {
        text.push('.');
        let mut fraction = magnitude;
        for _ in 0..20 {
            fraction *= radix as f64;
            let digit = fraction.trunc() as usize;
            text.push(DIGITS[digit] as char);
            fraction -= fraction.trunc();
            if fraction == 0.0 {
                break;
            }
        }
    }
    text
}

pub(crate) fn initialize_number_intrinsics(agent: &mut Agent) {
    // Number.prototype wraps +0 and chains to Object.prototype.
    let object_prototype = {
        let proto = agent.intrinsics.object_prototype;
        Handle::new(agent, proto)
    };
    let primitive = Handle::new(agent, Value::from_i32(0));
    let prototype = agent.new_primitive_object(
        HeapTag::JsNumber,
        ObjectClass::Number,
        object_prototype,
        primitive,
    );
    agent.intrinsics.number_prototype = prototype.value();

    let constructor =
        agent.new_builtin_constructor(number_constructor_call, number_constructor_construct, 1);
    agent.intrinsics.number_constructor = constructor.value();
    define_value(agent, constructor, "prototype", prototype.cast(), false, false, false);
    define_value(agent, prototype, "constructor", constructor.cast(), true, false, true);

    // 15.7.3 Value properties of the constructor.
    let constants = [
        ("MAX_VALUE", f64::MAX),
        ("MIN_VALUE", 5e-324),
        ("NaN", f64::NAN),
        ("POSITIVE_INFINITY", f64::INFINITY),
        ("NEGATIVE_INFINITY", f64::NEG_INFINITY),
    ];
    for (name, constant) in constants {
        let value = Handle::new(agent, Value::from_f64(constant));
        define_value(agent, constructor, name, value, false, false, false);
    }

    define_builtin_function(agent, prototype, "toString", number_prototype_to_string, 1);
    define_builtin_function(agent, prototype, "valueOf", number_prototype_value_of, 0);
}
