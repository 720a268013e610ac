// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [15.2 Object Objects](https://262.ecma-international.org/5.1/#sec-15.2)

use crate::ecmascript::abstract_operations::type_conversion::{
    check_object_coercible, to_object, to_property_key,
};
use crate::ecmascript::builtins::array::new_array_from_values;
use crate::ecmascript::builtins::builtin_function::RuntimeCallInfo;
use crate::ecmascript::builtins::global_object::{define_builtin_function, define_value};
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::types::language::object::ObjectData;
use crate::ecmascript::types::spec::property_descriptor::{
    from_property_descriptor, to_property_descriptor,
};
use crate::engine::value::Value;
use crate::heap::handle::Handle;
use crate::heap::header::ErrorKind;

/// ### [15.2.1.1 Object ( \[ value \] )](https://262.ecma-international.org/5.1/#sec-15.2.1.1)
fn object_constructor(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let value = info.arg(0);
    let agent = info.agent();
    // Called as a function or as a constructor, the behaviour is the same:
    // undefined and null produce a fresh object, everything else converts.
    if value.value().is_undefined() || value.value().is_null() {
        return Ok(agent.new_plain_object().value());
    }
    Ok(to_object(agent, value)?.value())
}

/// ### [15.2.3.2 Object.getPrototypeOf ( O )](https://262.ecma-international.org/5.1/#sec-15.2.3.2)
fn object_get_prototype_of(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let value = info.arg(0);
    let agent = info.agent();
    let object = require_object(agent, value)?;
    Ok(object.prototype())
}

/// `Object.setPrototypeOf ( O, proto )`: exercised by the test corpus even
/// though it postdates the fifth edition. Rejects cycles and non-extensible
/// targets.
fn object_set_prototype_of(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let target = info.arg(0);
    let proto = info.arg(1);
    let agent = info.agent();
    check_object_coercible(agent, target)?;
    if !proto.value().is_object() && !proto.value().is_null() {
        return Err(
            agent.throw_exception(ErrorKind::TypeError, "object prototype may only be an object or null")
        );
    }
    if !target.value().is_object() {
        return Ok(target.value());
    }
    let object: Handle<ObjectData> = target.cast();
    if !object.extensible() {
        return Err(
            agent.throw_exception(ErrorKind::TypeError, "cannot set prototype of a non-extensible object")
        );
    }
    // Refuse to create a prototype chain cycle.
    let mut walker = proto.value();
    while walker.is_object() {
        if walker == target.value() {
            return Err(agent.throw_exception(
                ErrorKind::TypeError,
                "cyclic prototype chain",
            ));
        }
        // SAFETY: is_object guarantees an object layout.
        walker = unsafe { walker.data::<ObjectData>() }.prototype();
    }
    object.set_prototype(proto.value());
    Ok(target.value())
}

/// ### [15.2.3.3 Object.getOwnPropertyDescriptor ( O, P )](https://262.ecma-international.org/5.1/#sec-15.2.3.3)
fn object_get_own_property_descriptor(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let value = info.arg(0);
    let key = info.arg(1);
    let agent = info.agent();
    let object = require_object(agent, value)?;
    let key = to_property_key(agent, key)?;
    let descriptor = ObjectData::get_own_property(agent, object, key);
    Ok(from_property_descriptor(agent, descriptor.as_ref())?.value())
}

/// ### [15.2.3.4 Object.getOwnPropertyNames ( O )](https://262.ecma-international.org/5.1/#sec-15.2.3.4)
fn object_get_own_property_names(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let value = info.arg(0);
    let agent = info.agent();
    let object = require_object(agent, value)?;
    let entries = ObjectData::own_property_entries(agent, object);
    let names: Vec<Handle<Value>> = entries.iter().map(|(key, _)| key.cast()).collect();
    Ok(new_array_from_values(agent, &names).value())
}

/// ### [15.2.3.5 Object.create ( O \[, Properties\] )](https://262.ecma-international.org/5.1/#sec-15.2.3.5)
fn object_create(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let proto = info.arg(0);
    let properties = info.arg(1);
    let agent = info.agent();
    if !proto.value().is_object() && !proto.value().is_null() {
        return Err(
            agent.throw_exception(ErrorKind::TypeError, "Object prototype may only be an object or null")
        );
    }
    let object = agent.new_object_with_prototype(proto);
    if !properties.value().is_undefined() {
        define_properties_on(agent, object, properties)?;
    }
    Ok(object.value())
}

/// ### [15.2.3.6 Object.defineProperty ( O, P, Attributes )](https://262.ecma-international.org/5.1/#sec-15.2.3.6)
fn object_define_property(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let value = info.arg(0);
    let key = info.arg(1);
    let attributes = info.arg(2);
    let agent = info.agent();
    let object = require_object(agent, value)?;
    let key = to_property_key(agent, key)?;
    let descriptor = to_property_descriptor(agent, attributes)?;
    ObjectData::define_own_property(agent, object, key, &descriptor, true)?;
    Ok(object.value())
}

/// ### [15.2.3.7 Object.defineProperties ( O, Properties )](https://262.ecma-international.org/5.1/#sec-15.2.3.7)
fn object_define_properties(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let value = info.arg(0);
    let properties = info.arg(1);
    let agent = info.agent();
    let object = require_object(agent, value)?;
    define_properties_on(agent, object, properties)?;
    Ok(object.value())
}

fn define_properties_on(
    agent: &mut Agent,
    object: Handle<ObjectData>,
    properties: Handle<Value>,
) -> JsResult<()> {
    let properties = to_object(agent, properties)?;
    let entries = ObjectData::own_property_entries(agent, properties);
    for (key, enumerable) in entries {
        if !enumerable {
            continue;
        }
        let attributes = ObjectData::get(agent, properties, key)?;
        let descriptor = to_property_descriptor(agent, attributes)?;
        ObjectData::define_own_property(agent, object, key, &descriptor, true)?;
    }
    Ok(())
}

/// ### [15.2.3.14 Object.keys ( O )](https://262.ecma-international.org/5.1/#sec-15.2.3.14)
fn object_keys(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let value = info.arg(0);
    let agent = info.agent();
    let object = require_object(agent, value)?;
    let entries = ObjectData::own_property_entries(agent, object);
    let keys: Vec<Handle<Value>> = entries
        .iter()
        .filter(|(_, enumerable)| *enumerable)
        .map(|(key, _)| key.cast())
        .collect();
    Ok(new_array_from_values(agent, &keys).value())
}

/// ### [15.2.4.2 Object.prototype.toString ( )](https://262.ecma-international.org/5.1/#sec-15.2.4.2)
fn object_prototype_to_string(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let agent = info.agent();
    let text = if this.value().is_undefined() {
        "[object Undefined]".to_owned()
    } else if this.value().is_null() {
        "[object Null]".to_owned()
    } else {
        let object = to_object(agent, this)?;
        format!("[object {}]", object.class().as_str())
    };
    Ok(agent.new_string(&text).value())
}

/// ### [15.2.4.4 Object.prototype.valueOf ( )](https://262.ecma-international.org/5.1/#sec-15.2.4.4)
fn object_prototype_value_of(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let agent = info.agent();
    Ok(to_object(agent, this)?.value())
}

/// ### [15.2.4.5 Object.prototype.hasOwnProperty ( V )](https://262.ecma-international.org/5.1/#sec-15.2.4.5)
fn object_prototype_has_own_property(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let key = info.arg(0);
    let agent = info.agent();
    let key = to_property_key(agent, key)?;
    let object = to_object(agent, this)?;
    let has = ObjectData::get_own_property(agent, object, key).is_some();
    Ok(Value::from_bool(has))
}

/// ### [15.2.4.6 Object.prototype.isPrototypeOf ( V )](https://262.ecma-international.org/5.1/#sec-15.2.4.6)
fn object_prototype_is_prototype_of(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let value = info.arg(0);
    let agent = info.agent();
    if !value.value().is_object() {
        return Ok(Value::FALSE);
    }
    let object = to_object(agent, this)?;
    // Walk V's prototype chain looking for O.
    let mut walker = value.cast::<ObjectData>().prototype();
    while walker.is_object() {
        if walker == object.value() {
            return Ok(Value::TRUE);
        }
        // SAFETY: is_object guarantees an object layout.
        walker = unsafe { walker.data::<ObjectData>() }.prototype();
    }
    Ok(Value::FALSE)
}

/// ### [15.2.4.7 Object.prototype.propertyIsEnumerable ( V )](https://262.ecma-international.org/5.1/#sec-15.2.4.7)
fn object_prototype_property_is_enumerable(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let key = info.arg(0);
    let agent = info.agent();
    let key = to_property_key(agent, key)?;
    let object = to_object(agent, this)?;
    let enumerable = ObjectData::get_own_property(agent, object, key)
        .is_some_and(|descriptor| descriptor.enumerable == Some(true));
    Ok(Value::from_bool(enumerable))
}

fn require_object(agent: &mut Agent, value: Handle<Value>) -> JsResult<Handle<ObjectData>> {
    if !value.value().is_object() {
        return Err(agent.throw_exception(ErrorKind::TypeError, "called on non-object"));
    }
    Ok(value.cast())
}

/// Builds the `Object` constructor onto the already-created prototype.
pub(crate) fn initialize_object_intrinsics(agent: &mut Agent) {
    let prototype: Handle<ObjectData> = {
        let proto = agent.intrinsics.object_prototype;
        Handle::<Value>::new(agent, proto).cast()
    };
    let constructor = agent.new_builtin_constructor(object_constructor, object_constructor, 1);
    agent.intrinsics.object_constructor = constructor.value();

    define_value(agent, constructor, "prototype", prototype.cast(), false, false, false);
    define_value(agent, prototype, "constructor", constructor.cast(), true, false, true);

    define_builtin_function(agent, constructor, "getPrototypeOf", object_get_prototype_of, 1);
    define_builtin_function(agent, constructor, "setPrototypeOf", object_set_prototype_of, 2);
    define_builtin_function(
        agent,
        constructor,
        "getOwnPropertyDescriptor",
        object_get_own_property_descriptor,
        2,
    );
    define_builtin_function(
        agent,
        constructor,
        "getOwnPropertyNames",
        object_get_own_property_names,
        1,
    );
    define_builtin_function(agent, constructor, "create", object_create, 2);
    define_builtin_function(agent, constructor, "defineProperty", object_define_property, 3);
    define_builtin_function(
        agent,
        constructor,
        "defineProperties",
        object_define_properties,
        2,
    );
    define_builtin_function(agent, constructor, "keys", object_keys, 1);

    define_builtin_function(agent, prototype, "toString", object_prototype_to_string, 0);
    define_builtin_function(agent, prototype, "valueOf", object_prototype_value_of, 0);
    define_builtin_function(
        agent,
        prototype,
        "hasOwnProperty",
        object_prototype_has_own_property,
        1,
    );
    define_builtin_function(
        agent,
        prototype,
        "isPrototypeOf",
        object_prototype_is_prototype_of,
        1,
    );
    define_builtin_function(
        agent,
        prototype,
        "propertyIsEnumerable",
        object_prototype_property_is_enumerable,
        1,
    );
}
