// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [15.1 The Global Object](https://262.ecma-international.org/5.1/#sec-15.1)
//!
//! Bootstrap: builds the intrinsic objects in dependency order, creates the
//! global object and its object environment, and installs the global
//! properties. Runs once inside `Agent::new`.

use crate::ecmascript::abstract_operations::type_conversion::{to_number, to_string};
use crate::ecmascript::builtins::builtin_function::{NativeFunction, RuntimeCallInfo};
use crate::ecmascript::builtins::{array, boolean, error, function, math, number, object, string};
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::types::language::object::ObjectData;
use crate::ecmascript::types::spec::property_descriptor::PropertyDescriptor;
use crate::engine::value::Value;
use crate::heap::handle::Handle;
use crate::heap::header::{ErrorKind, HeapTag, ObjectClass};

/// Defines a data property with explicit attributes; the bootstrap's
/// installation helper.
pub(crate) fn define_value(
    agent: &mut Agent,
    object: Handle<ObjectData>,
    name: &str,
    value: Handle<Value>,
    writable: bool,
    enumerable: bool,
    configurable: bool,
) {
    let key = agent.intern_str(name);
    let descriptor = PropertyDescriptor::data(value, writable, enumerable, configurable);
    ObjectData::define_own_property(agent, object, key, &descriptor, false)
        .expect("bootstrap property definition cannot fail");
}

/// Installs a built-in method: writable and configurable, not enumerable.
pub(crate) fn define_builtin_function(
    agent: &mut Agent,
    object: Handle<ObjectData>,
    name: &str,
    behaviour: NativeFunction,
    length: u32,
) {
    let function = agent.new_builtin_function(behaviour, length);
    define_value(agent, object, name, function.cast(), true, false, true);
}

// The freestanding global functions.

/// `print ( value )`: the host's convenience output.
fn global_print(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    if info.args_count() == 0 {
        println!();
        return Ok(Value::UNDEFINED);
    }
    let argument = info.arg(0);
    let agent = info.agent();
    let text = to_string(agent, argument)?.to_std_string();
    println!("{text}");
    Ok(Value::UNDEFINED)
}

/// ### [15.1.2.4 isNaN ( number )](https://262.ecma-international.org/5.1/#sec-15.1.2.4)
fn global_is_nan(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let argument = info.arg(0);
    let number = to_number(info.agent(), argument)?;
    Ok(Value::from_bool(number.is_nan()))
}

/// ### [15.1.2.5 isFinite ( number )](https://262.ecma-international.org/5.1/#sec-15.1.2.5)
fn global_is_finite(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let argument = info.arg(0);
    let number = to_number(info.agent(), argument)?;
    Ok(Value::from_bool(number.is_finite()))
}

/// Builds the complete global environment. Order matters at the start:
/// `Object.prototype` exists before `Function.prototype`, which every other
/// built-in function links to.
pub(crate) fn initialize(agent: &mut Agent) {
    // Object.prototype sits at the end of every default prototype chain.
    let null = Handle::new(agent, Value::NULL);
    let object_prototype =
        agent.new_object_with_tag(HeapTag::JsObject, ObjectClass::Object, null);
    agent.intrinsics.object_prototype = object_prototype.value();

    // Function.prototype is itself callable and returns undefined.
    let function_prototype = agent.new_builtin_function_with_prototype(
        function::function_prototype_behaviour,
        0,
        object_prototype.cast(),
    );
    agent.intrinsics.function_prototype = function_prototype.value();

    object::initialize_object_intrinsics(agent);
    function::initialize_function_intrinsics(agent);
    array::initialize_array_intrinsics(agent);
    string::initialize_string_intrinsics(agent);
    boolean::initialize_boolean_intrinsics(agent);
    number::initialize_number_intrinsics(agent);
    error::initialize_error_intrinsics(agent);
    math::initialize_math_intrinsics(agent);

    // The global object and its environment record.
    let object_prototype = {
        let prototype = agent.intrinsics.object_prototype;
        Handle::new(agent, prototype)
    };
    let global = agent.new_object_with_tag(
        HeapTag::GlobalObject,
        ObjectClass::GlobalObject,
        object_prototype,
    );
    agent.global_object = global.value();
    let global_env = agent.new_object_environment(global, false, None);
    agent.global_env = global_env.value();

    // 15.1.1 Value properties.
    let nan = Handle::new(agent, Value::from_f64(f64::NAN));
    define_value(agent, global, "NaN", nan, false, false, false);
    let infinity = Handle::new(agent, Value::from_f64(f64::INFINITY));
    define_value(agent, global, "Infinity", infinity, false, false, false);
    let undefined = Handle::new(agent, Value::UNDEFINED);
    define_value(agent, global, "undefined", undefined, false, false, false);

    // 15.1.4 Constructor properties. Each intrinsic is re-read through the
    // rooted intrinsics struct right before rooting it: the defines below
    // allocate and may move earlier-installed constructors.
    type Select = fn(&crate::ecmascript::execution::intrinsics::Intrinsics) -> Value;
    let constructors: [(&str, Select); 13] = [
        ("Object", |i| i.object_constructor),
        ("Function", |i| i.function_constructor),
        ("Array", |i| i.array_constructor),
        ("String", |i| i.string_constructor),
        ("Boolean", |i| i.boolean_constructor),
        ("Number", |i| i.number_constructor),
        ("Error", |i| i.error_constructors[ErrorKind::Error as usize]),
        ("EvalError", |i| i.error_constructors[ErrorKind::EvalError as usize]),
        ("RangeError", |i| i.error_constructors[ErrorKind::RangeError as usize]),
        ("ReferenceError", |i| {
            i.error_constructors[ErrorKind::ReferenceError as usize]
        }),
        ("SyntaxError", |i| i.error_constructors[ErrorKind::SyntaxError as usize]),
        ("TypeError", |i| i.error_constructors[ErrorKind::TypeError as usize]),
        ("URIError", |i| i.error_constructors[ErrorKind::UriError as usize]),
    ];
    for (name, select) in constructors {
        let constructor = select(&agent.intrinsics);
        let constructor = Handle::new(agent, constructor);
        define_value(agent, global, name, constructor, true, false, true);
    }

    // 15.1.5 Other properties.
    let math = {
        let math = agent.intrinsics.math;
        Handle::new(agent, math)
    };
    define_value(agent, global, "Math", math, true, false, true);

    // 15.1.2-style function properties, plus the host's print.
    define_builtin_function(agent, global, "print", global_print, 1);
    define_builtin_function(agent, global, "isNaN", global_is_nan, 1);
    define_builtin_function(agent, global, "isFinite", global_is_finite, 1);
}
