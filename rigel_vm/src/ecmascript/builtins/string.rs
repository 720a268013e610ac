// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [15.5 String Objects](https://262.ecma-international.org/5.1/#sec-15.5)
//!
//! The `String` wrapper and its prototype methods. Wrapper objects
//! synthesise non-writable, enumerable indexed own properties over their
//! primitive value, which is how `for-in` and indexing observe individual
//! characters.

use crate::ecmascript::abstract_operations::type_conversion::{
    check_object_coercible, to_integer, to_number, to_string, to_uint16,
};
use crate::ecmascript::builtins::array::{array_index_of, new_array_from_values};
use crate::ecmascript::builtins::builtin_function::RuntimeCallInfo;
use crate::ecmascript::builtins::global_object::{define_builtin_function, define_value};
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::types::language::object::{ObjectData, PrimitiveObjectData};
use crate::ecmascript::types::language::string::HeapString;
use crate::ecmascript::types::spec::property_descriptor::PropertyDescriptor;
use crate::engine::value::Value;
use crate::heap::handle::Handle;
use crate::heap::header::{ErrorKind, HeapTag, ObjectClass};

/// ### [15.5.5.2 \[\[GetOwnProperty\]\] for String objects](https://262.ecma-international.org/5.1/#sec-15.5.5.2)
pub(crate) fn string_get_own_property(
    agent: &mut Agent,
    object: Handle<ObjectData>,
    p: Handle<HeapString>,
) -> Option<PropertyDescriptor> {
    // 1.-2. A real own property wins.
    if let Some(descriptor) = ObjectData::ordinary_get_own_property(agent, object, p) {
        return Some(descriptor);
    }

    // 3.-5. Otherwise P must be the canonical form of an index into the
    //       primitive string.
    let index = array_index_of(&p)?;
    let wrapper: Handle<PrimitiveObjectData> = object.cast();
    let primitive = wrapper.primitive_value();
    debug_assert!(primitive.is_string());
    // SAFETY: tag-checked at wrapper creation.
    let unit = unsafe { primitive.data::<HeapString>() }.char_at(index as usize)?;

    // 6.-9. A one-character, non-writable, enumerable, non-configurable
    //       data property.
    let character = agent.new_string_from_units(&[unit]);
    Some(PropertyDescriptor {
        value: Some(character.cast()),
        writable: Some(false),
        get: None,
        set: None,
        enumerable: Some(true),
        configurable: Some(false),
    })
}

pub(crate) fn wrapped_string_length(object: Handle<ObjectData>) -> usize {
    let wrapper: Handle<PrimitiveObjectData> = object.cast();
    let primitive = wrapper.primitive_value();
    debug_assert!(primitive.is_string());
    // SAFETY: tag-checked at wrapper creation.
    unsafe { primitive.data::<HeapString>() }.len()
}

/// Allocates a `String` wrapper object around `value`.
pub(crate) fn new_string_wrapper(
    agent: &mut Agent,
    value: Handle<HeapString>,
) -> JsResult<Handle<ObjectData>> {
    let prototype = {
        let proto = agent.intrinsics.string_prototype;
        Handle::new(agent, proto)
    };
    Ok(new_string_wrapper_with_prototype(agent, value, prototype))
}

fn new_string_wrapper_with_prototype(
    agent: &mut Agent,
    value: Handle<HeapString>,
    prototype: Handle<Value>,
) -> Handle<ObjectData> {
    let wrapper = agent.new_primitive_object(
        HeapTag::JsString,
        ObjectClass::String,
        prototype,
        value.cast(),
    );
    let length = Handle::new(agent, Value::from_u32(value.len() as u32));
    let key = agent.well_known(|s| s.length);
    let descriptor = PropertyDescriptor::data(length, false, false, false);
    ObjectData::define_own_property(agent, wrapper, key, &descriptor, false)
        .expect("defining length on a fresh wrapper cannot fail");
    wrapper
}

/// ### [15.5.1 The String Constructor Called as a Function](https://262.ecma-international.org/5.1/#sec-15.5.1)
fn string_constructor_call(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let has_argument = info.args_count() > 0;
    let argument = info.arg(0);
    let agent = info.agent();
    if !has_argument {
        return Ok(agent.well_known(|s| s.empty).value());
    }
    Ok(to_string(agent, argument)?.value())
}

/// ### [15.5.2 The String Constructor](https://262.ecma-international.org/5.1/#sec-15.5.2)
fn string_constructor_construct(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let argument = info.arg(0);
    let has_argument = info.args_count() > 0;
    let agent = info.agent();
    let primitive = if has_argument {
        to_string(agent, argument)?
    } else {
        agent.well_known(|s| s.empty)
    };
    Ok(new_string_wrapper(agent, primitive)?.value())
}

/// ### [15.5.3.2 String.fromCharCode ( \[ char0 \[ , … \] \] )](https://262.ecma-international.org/5.1/#sec-15.5.3.2)
fn string_from_char_code(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let args: Vec<Handle<Value>> = (0..info.args_count()).map(|i| info.arg(i)).collect();
    let agent = info.agent();
    let mut units = Vec::with_capacity(args.len());
    for argument in args {
        units.push(to_uint16(agent, argument)?);
    }
    Ok(agent.new_string_from_units(&units).value())
}

/// The `this` primitive for toString/valueOf: a string, or a String
/// wrapper.
fn this_string_value(agent: &mut Agent, this: Handle<Value>) -> JsResult<Handle<Value>> {
    let value = this.value();
    if value.is_string() {
        return Ok(this);
    }
    if value.is_object() && value.tag() == HeapTag::JsString {
        let wrapper: Handle<PrimitiveObjectData> = this.cast();
        let primitive = wrapper.primitive_value();
        return Ok(Handle::new(agent, primitive));
    }
    Err(agent.throw_exception(ErrorKind::TypeError, "not a String object"))
}

/// The generic prologue shared by the prototype methods: CheckObjectCoercible
/// followed by ToString(this).
fn this_to_string(info: &mut RuntimeCallInfo) -> JsResult<String> {
    let this = info.this_value();
    let agent = info.agent();
    check_object_coercible(agent, this)?;
    Ok(to_string(agent, this)?.to_std_string())
}

fn this_to_units(info: &mut RuntimeCallInfo) -> JsResult<Vec<u16>> {
    let this = info.this_value();
    let agent = info.agent();
    check_object_coercible(agent, this)?;
    Ok(to_string(agent, this)?.code_units().to_vec())
}

fn string_prototype_to_string(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let agent = info.agent();
    Ok(this_string_value(agent, this)?.value())
}

fn string_prototype_value_of(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let agent = info.agent();
    Ok(this_string_value(agent, this)?.value())
}

/// ### [15.5.4.4 String.prototype.charAt ( pos )](https://262.ecma-international.org/5.1/#sec-15.5.4.4)
fn string_prototype_char_at(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let units = this_to_units(info)?;
    let position_argument = info.arg(0);
    let agent = info.agent();
    let position = to_integer(agent, position_argument)?;
    if position < 0.0 || position >= units.len() as f64 {
        return Ok(agent.well_known(|s| s.empty).value());
    }
    Ok(agent
        .new_string_from_units(&[units[position as usize]])
        .value())
}

/// ### [15.5.4.5 String.prototype.charCodeAt ( pos )](https://262.ecma-international.org/5.1/#sec-15.5.4.5)
fn string_prototype_char_code_at(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let units = this_to_units(info)?;
    let position_argument = info.arg(0);
    let agent = info.agent();
    let position = to_integer(agent, position_argument)?;
    if position < 0.0 || position >= units.len() as f64 {
        return Ok(Value::from_f64(f64::NAN));
    }
    Ok(Value::from_u32(units[position as usize] as u32))
}

/// ### [15.5.4.6 String.prototype.concat ( \[ string1 \[ , … \] \] )](https://262.ecma-international.org/5.1/#sec-15.5.4.6)
fn string_prototype_concat(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let mut result_units = this_to_units(info)?;
    let args: Vec<Handle<Value>> = (0..info.args_count()).map(|i| info.arg(i)).collect();
    let agent = info.agent();
    for argument in args {
        let next = to_string(agent, argument)?;
        result_units.extend_from_slice(next.code_units());
    }
    Ok(agent.new_string_from_units(&result_units).value())
}

/// ### [15.5.4.7 String.prototype.indexOf ( searchString, position )](https://262.ecma-international.org/5.1/#sec-15.5.4.7)
fn string_prototype_index_of(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let units = this_to_units(info)?;
    let search_argument = info.arg(0);
    let position_argument = info.arg(1);
    let agent = info.agent();
    let search = to_string(agent, search_argument)?.code_units().to_vec();
    let position = to_integer(agent, position_argument)?;
    let start = position.clamp(0.0, units.len() as f64) as usize;
    Ok(Value::from_i32(find_units(&units, &search, start)))
}

/// ### [15.5.4.8 String.prototype.lastIndexOf ( searchString, position )](https://262.ecma-international.org/5.1/#sec-15.5.4.8)
fn string_prototype_last_index_of(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let units = this_to_units(info)?;
    let search_argument = info.arg(0);
    let position_argument = info.arg(1);
    let agent = info.agent();
    let search = to_string(agent, search_argument)?.code_units().to_vec();
    let position = to_number(agent, position_argument)?;
    let limit = if position.is_nan() {
        units.len()
    } else {
        position.clamp(0.0, units.len() as f64) as usize
    };
    let mut best = -1i32;
    let mut start = 0usize;
    loop {
        let found = find_units(&units, &search, start);
        if found < 0 || found as usize > limit {
            break;
        }
        best = found;
        start = found as usize + 1;
    }
    Ok(Value::from_i32(best))
}

fn find_units(haystack: &[u16], needle: &[u16], start: usize) -> i32 {
    if needle.is_empty() {
        return start.min(haystack.len()) as i32;
    }
    if needle.len() > haystack.len() {
        return -1;
    }
    for index in start..=(haystack.len() - needle.len()) {
        if &haystack[index..index + needle.len()] == needle {
            return index as i32;
        }
    }
    -1
}

/// ### [15.5.4.13 String.prototype.slice ( start, end )](https://262.ecma-international.org/5.1/#sec-15.5.4.13)
fn string_prototype_slice(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let units = this_to_units(info)?;
    let start_argument = info.arg(0);
    let end_argument = info.arg(1);
    let agent = info.agent();
    let length = units.len() as f64;
    let start = to_integer(agent, start_argument)?;
    let end = if end_argument.value().is_undefined() {
        length
    } else {
        to_integer(agent, end_argument)?
    };
    let from = if start < 0.0 {
        (length + start).max(0.0)
    } else {
        start.min(length)
    } as usize;
    let to = if end < 0.0 {
        (length + end).max(0.0)
    } else {
        end.min(length)
    } as usize;
    let slice = if from < to { &units[from..to] } else { &units[0..0] };
    Ok(agent.new_string_from_units(slice).value())
}

/// ### [15.5.4.15 String.prototype.substring ( start, end )](https://262.ecma-international.org/5.1/#sec-15.5.4.15)
fn string_prototype_substring(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let units = this_to_units(info)?;
    let start_argument = info.arg(0);
    let end_argument = info.arg(1);
    let agent = info.agent();
    let length = units.len() as f64;
    let start = to_integer(agent, start_argument)?.clamp(0.0, length);
    let end = if end_argument.value().is_undefined() {
        length
    } else {
        to_integer(agent, end_argument)?.clamp(0.0, length)
    };
    let from = start.min(end) as usize;
    let to = start.max(end) as usize;
    Ok(agent.new_string_from_units(&units[from..to]).value())
}

/// ### [15.5.4.16 String.prototype.toLowerCase ( )](https://262.ecma-international.org/5.1/#sec-15.5.4.16)
fn string_prototype_to_lower_case(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let text = this_to_string(info)?;
    let agent = info.agent();
    Ok(agent.new_string(&text.to_lowercase()).value())
}

/// ### [15.5.4.18 String.prototype.toUpperCase ( )](https://262.ecma-international.org/5.1/#sec-15.5.4.18)
fn string_prototype_to_upper_case(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let text = this_to_string(info)?;
    let agent = info.agent();
    Ok(agent.new_string(&text.to_uppercase()).value())
}

/// ### [15.5.4.14 String.prototype.split ( separator, limit )](https://262.ecma-international.org/5.1/#sec-15.5.4.14)
///
/// String separators only; the pattern grammar is out of scope along with
/// regular expressions.
fn string_prototype_split(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let units = this_to_units(info)?;
    let separator_argument = info.arg(0);
    let limit_argument = info.arg(1);
    let agent = info.agent();

    let limit = if limit_argument.value().is_undefined() {
        u32::MAX
    } else {
        crate::ecmascript::abstract_operations::type_conversion::to_uint32(agent, limit_argument)?
    };
    if limit == 0 {
        return Ok(new_array_from_values(agent, &[]).value());
    }

    if separator_argument.value().is_undefined() {
        let whole = agent.new_string_from_units(&units);
        return Ok(new_array_from_values(agent, &[whole.cast()]).value());
    }

    let separator = to_string(agent, separator_argument)?.code_units().to_vec();
    let mut parts: Vec<Handle<Value>> = Vec::new();

    if separator.is_empty() {
        for &unit in units.iter().take(limit as usize) {
            let part = agent.new_string_from_units(&[unit]);
            parts.push(part.cast());
        }
        return Ok(new_array_from_values(agent, &parts).value());
    }

    let mut start = 0usize;
    loop {
        let found = find_units(&units, &separator, start);
        if found < 0 {
            let part = agent.new_string_from_units(&units[start..]);
            parts.push(part.cast());
            break;
        }
        let part = agent.new_string_from_units(&units[start..found as usize]);
        parts.push(part.cast());
        if parts.len() as u32 >= limit {
            return Ok(new_array_from_values(agent, &parts).value());
        }
        start = found as usize + separator.len();
    }
    if parts.len() as u32 > limit {
        parts.truncate(limit as usize);
    }
    Ok(new_array_from_values(agent, &parts).value())
}

pub(crate) fn initialize_string_intrinsics(agent: &mut Agent) {
    // String.prototype is a wrapper around the empty string, chained to
    // Object.prototype.
    let object_prototype = {
        let proto = agent.intrinsics.object_prototype;
        Handle::new(agent, proto)
    };
    let empty = agent.well_known(|s| s.empty);
    let prototype = new_string_wrapper_with_prototype(agent, empty, object_prototype);
    agent.intrinsics.string_prototype = prototype.value();

    let constructor =
        agent.new_builtin_constructor(string_constructor_call, string_constructor_construct, 1);
    agent.intrinsics.string_constructor = constructor.value();
    define_value(agent, constructor, "prototype", prototype.cast(), false, false, false);
    define_value(agent, prototype, "constructor", constructor.cast(), true, false, true);

    define_builtin_function(agent, constructor, "fromCharCode", string_from_char_code, 1);

    define_builtin_function(agent, prototype, "toString", string_prototype_to_string, 0);
    define_builtin_function(agent, prototype, "valueOf", string_prototype_value_of, 0);
    define_builtin_function(agent, prototype, "charAt", string_prototype_char_at, 1);
    define_builtin_function(agent, prototype, "charCodeAt", string_prototype_char_code_at, 1);
    define_builtin_function(agent, prototype, "concat", string_prototype_concat, 1);
    define_builtin_function(agent, prototype, "indexOf", string_prototype_index_of, 1);
    define_builtin_function(agent, prototype, "lastIndexOf", string_prototype_last_index_of, 1);
    define_builtin_function(agent, prototype, "slice", string_prototype_slice, 2);
    define_builtin_function(agent, prototype, "substring", string_prototype_substring, 2);
    define_builtin_function(agent, prototype, "toLowerCase", string_prototype_to_lower_case, 0);
    define_builtin_function(agent, prototype, "toUpperCase", string_prototype_to_upper_case, 0);
    define_builtin_function(agent, prototype, "split", string_prototype_split, 2);
}
