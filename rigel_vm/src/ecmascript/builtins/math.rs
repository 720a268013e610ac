// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [15.8 The Math Object](https://262.ecma-international.org/5.1/#sec-15.8)

use crate::ecmascript::abstract_operations::type_conversion::to_number;
use crate::ecmascript::builtins::builtin_function::RuntimeCallInfo;
use crate::ecmascript::builtins::global_object::{define_builtin_function, define_value};
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::engine::value::Value;
use crate::heap::handle::Handle;
use crate::heap::header::{HeapTag, ObjectClass};

fn arg_number(info: &mut RuntimeCallInfo, index: usize) -> JsResult<f64> {
    let argument = info.arg(index);
    to_number(info.agent(), argument)
}

fn math_abs(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    Ok(Value::from_number(arg_number(info, 0)?.abs()))
}

fn math_ceil(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    Ok(Value::from_number(arg_number(info, 0)?.ceil()))
}

fn math_floor(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    Ok(Value::from_number(arg_number(info, 0)?.floor()))
}

/// 15.8.2.15: round(x) is floor(x + 0.5), so -0.5 rounds to -0 and ties go
/// toward +Infinity.
fn math_round(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let x = arg_number(info, 0)?;
    let result = if x.is_nan() || x.is_infinite() || x == 0.0 {
        x
    } else if (-0.5..0.0).contains(&x) {
        -0.0
    } else {
        (x + 0.5).floor()
    };
    Ok(Value::from_number(result))
}

/// 15.8.2.11: NaN poisons max, and +0 beats -0.
fn math_max(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let mut result = f64::NEG_INFINITY;
    for index in 0..info.args_count() {
        let value = arg_number(info, index)?;
        if value.is_nan() {
            return Ok(Value::from_f64(f64::NAN));
        }
        if value > result || (value == result && result.is_sign_negative()) {
            result = value;
        }
    }
    Ok(Value::from_number(result))
}

fn math_min(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let mut result = f64::INFINITY;
    for index in 0..info.args_count() {
        let value = arg_number(info, index)?;
        if value.is_nan() {
            return Ok(Value::from_f64(f64::NAN));
        }
        if value < result || (value == result && value.is_sign_negative()) {
            result = value;
        }
    }
    Ok(Value::from_number(result))
}

fn math_pow(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let base = arg_number(info, 0)?;
    let exponent = arg_number(info, 1)?;
    // 15.8.2.13: anything to the NaN power is NaN, including 1.
    let result = if exponent.is_nan() {
        f64::NAN
    } else {
        base.powf(exponent)
    };
    Ok(Value::from_number(result))
}

fn math_sqrt(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    Ok(Value::from_number(arg_number(info, 0)?.sqrt()))
}

fn math_exp(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    Ok(Value::from_number(arg_number(info, 0)?.exp()))
}

fn math_log(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    Ok(Value::from_number(arg_number(info, 0)?.ln()))
}

fn math_sin(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    Ok(Value::from_number(arg_number(info, 0)?.sin()))
}

fn math_cos(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    Ok(Value::from_number(arg_number(info, 0)?.cos()))
}

fn math_tan(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    Ok(Value::from_number(arg_number(info, 0)?.tan()))
}

fn math_atan(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    Ok(Value::from_number(arg_number(info, 0)?.atan()))
}

fn math_atan2(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let y = arg_number(info, 0)?;
    let x = arg_number(info, 1)?;
    Ok(Value::from_number(y.atan2(x)))
}

fn math_random(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let _ = info;
    Ok(Value::from_f64(rand::random::<f64>()))
}

pub(crate) fn initialize_math_intrinsics(agent: &mut Agent) {
    let object_prototype = {
        let proto = agent.intrinsics.object_prototype;
        Handle::new(agent, proto)
    };
    let math = agent.new_object_with_tag(HeapTag::JsObject, ObjectClass::Math, object_prototype);
    agent.intrinsics.math = math.value();

    // 15.8.1 Value properties.
    let constants = [
        ("E", core::f64::consts::E),
        ("LN10", core::f64::consts::LN_10),
        ("LN2", core::f64::consts::LN_2),
        ("LOG2E", core::f64::consts::LOG2_E),
        ("LOG10E", core::f64::consts::LOG10_E),
        ("PI", core::f64::consts::PI),
        ("SQRT1_2", core::f64::consts::FRAC_1_SQRT_2),
        ("SQRT2", core::f64::consts::SQRT_2),
    ];
    for (name, constant) in constants {
        let value = Handle::new(agent, Value::from_f64(constant));
        define_value(agent, math, name, value, false, false, false);
    }

    // 15.8.2 Function properties.
    define_builtin_function(agent, math, "abs", math_abs, 1);
    define_builtin_function(agent, math, "ceil", math_ceil, 1);
    define_builtin_function(agent, math, "floor", math_floor, 1);
    define_builtin_function(agent, math, "round", math_round, 1);
    define_builtin_function(agent, math, "max", math_max, 2);
    define_builtin_function(agent, math, "min", math_min, 2);
    define_builtin_function(agent, math, "pow", math_pow, 2);
    define_builtin_function(agent, math, "sqrt", math_sqrt, 1);
    define_builtin_function(agent, math, "exp", math_exp, 1);
    define_builtin_function(agent, math, "log", math_log, 1);
    define_builtin_function(agent, math, "sin", math_sin, 1);
    define_builtin_function(agent, math, "cos", math_cos, 1);
    define_builtin_function(agent, math, "tan", math_tan, 1);
    define_builtin_function(agent, math, "atan", math_atan, 1);
    define_builtin_function(agent, math, "atan2", math_atan2, 2);
    define_builtin_function(agent, math, "random", math_random, 0);
}
