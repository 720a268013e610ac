// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [15.6 Boolean Objects](https://262.ecma-international.org/5.1/#sec-15.6)

use crate::ecmascript::abstract_operations::type_conversion::to_boolean;
use crate::ecmascript::builtins::builtin_function::RuntimeCallInfo;
use crate::ecmascript::builtins::global_object::{define_builtin_function, define_value};
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::types::language::object::{ObjectData, PrimitiveObjectData};
use crate::engine::value::Value;
use crate::heap::handle::Handle;
use crate::heap::header::{ErrorKind, HeapTag, ObjectClass};

fn new_boolean_wrapper(agent: &mut Agent, value: bool) -> Handle<ObjectData> {
    let prototype = {
        let proto = agent.intrinsics.boolean_prototype;
        Handle::new(agent, proto)
    };
    let primitive = Handle::new(agent, Value::from_bool(value));
    agent.new_primitive_object(HeapTag::JsBoolean, ObjectClass::Boolean, prototype, primitive)
}

/// ### [15.6.1 The Boolean Constructor Called as a Function](https://262.ecma-international.org/5.1/#sec-15.6.1)
fn boolean_constructor_call(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    Ok(Value::from_bool(to_boolean(info.arg(0).value())))
}

/// ### [15.6.2 The Boolean Constructor](https://262.ecma-international.org/5.1/#sec-15.6.2)
fn boolean_constructor_construct(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let value = to_boolean(info.arg(0).value());
    Ok(new_boolean_wrapper(info.agent(), value).value())
}

/// The `this` primitive: a boolean, or a Boolean wrapper.
fn this_boolean_value(agent: &mut Agent, this: Handle<Value>) -> JsResult<bool> {
    let value = this.value();
    if value.is_boolean() {
        return Ok(value.is_true());
    }
    if value.is_object() && value.tag() == HeapTag::JsBoolean {
        let wrapper: Handle<PrimitiveObjectData> = this.cast();
        return Ok(wrapper.primitive_value().is_true());
    }
    Err(agent.throw_exception(ErrorKind::TypeError, "not a Boolean object"))
}

/// ### [15.6.4.2 Boolean.prototype.toString ( )](https://262.ecma-international.org/5.1/#sec-15.6.4.2)
fn boolean_prototype_to_string(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let agent = info.agent();
    let value = this_boolean_value(agent, this)?;
    Ok(agent.intern_str(if value { "true" } else { "false" }).value())
}

/// ### [15.6.4.3 Boolean.prototype.valueOf ( )](https://262.ecma-international.org/5.1/#sec-15.6.4.3)
fn boolean_prototype_value_of(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let agent = info.agent();
    Ok(Value::from_bool(this_boolean_value(agent, this)?))
}

pub(crate) fn initialize_boolean_intrinsics(agent: &mut Agent) {
    // Boolean.prototype wraps false and chains to Object.prototype.
    let object_prototype = {
        let proto = agent.intrinsics.object_prototype;
        Handle::new(agent, proto)
    };
    let primitive = Handle::new(agent, Value::FALSE);
    let prototype = agent.new_primitive_object(
        HeapTag::JsBoolean,
        ObjectClass::Boolean,
        object_prototype,
        primitive,
    );
    agent.intrinsics.boolean_prototype = prototype.value();

    let constructor =
        agent.new_builtin_constructor(boolean_constructor_call, boolean_constructor_construct, 1);
    agent.intrinsics.boolean_constructor = constructor.value();
    define_value(agent, constructor, "prototype", prototype.cast(), false, false, false);
    define_value(agent, prototype, "constructor", constructor.cast(), true, false, true);

    define_builtin_function(agent, prototype, "toString", boolean_prototype_to_string, 0);
    define_builtin_function(agent, prototype, "valueOf", boolean_prototype_value_of, 0);
}
