// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [15.4 Array Objects](https://262.ecma-international.org/5.1/#sec-15.4)
//!
//! The language-level Array. `length` is an ordinary own property with the
//! special `[[DefineOwnProperty]]` semantics of 15.4.5.1: writes to an index
//! at or beyond `length` grow it, truncating `length` deletes elements from
//! the top and stops at the first non-configurable one.

use crate::ecmascript::abstract_operations::testing_and_comparison::strict_equality;
use crate::ecmascript::abstract_operations::type_conversion::{
    f64_to_uint32, to_integer, to_number, to_object, to_string, to_uint32,
};
use crate::ecmascript::builtins::builtin_function::RuntimeCallInfo;
use crate::ecmascript::builtins::global_object::{define_builtin_function, define_value};
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::types::language::object::ObjectData;
use crate::ecmascript::types::language::string::HeapString;
use crate::ecmascript::types::spec::property_descriptor::PropertyDescriptor;
use crate::engine::value::Value;
use crate::heap::handle::Handle;
use crate::heap::header::{ErrorKind, HeapTag, ObjectClass};

/// A canonical array index: the decimal form of a uint32 below 2^32 - 1.
pub(crate) fn array_index_of(key: &HeapString) -> Option<u32> {
    let units = key.code_units();
    if units.is_empty() || units.len() > 10 {
        return None;
    }
    if units.len() > 1 && units[0] == b'0' as u16 {
        return None;
    }
    let mut value: u64 = 0;
    for &unit in units {
        if !(b'0' as u16..=b'9' as u16).contains(&unit) {
            return None;
        }
        value = value * 10 + (unit - b'0' as u16) as u64;
        if value >= u32::MAX as u64 {
            return None;
        }
    }
    Some(value as u32)
}

fn length_descriptor(
    agent: &mut Agent,
    array: Handle<ObjectData>,
) -> PropertyDescriptor {
    let key = agent.well_known(|s| s.length);
    ObjectData::ordinary_get_own_property(agent, array, key)
        .expect("array objects always have a length property")
}

fn set_length_value(agent: &mut Agent, array: Handle<ObjectData>, length: u32) {
    let key = agent.well_known(|s| s.length);
    let value = Handle::new(agent, Value::from_u32(length));
    let descriptor = PropertyDescriptor {
        value: Some(value),
        ..Default::default()
    };
    ObjectData::ordinary_define_own_property(agent, array, key, &descriptor, false)
        .expect("updating array length in place cannot fail");
}

/// ### [15.4.5.1 \[\[DefineOwnProperty\]\] for Array objects](https://262.ecma-international.org/5.1/#sec-15.4.5.1)
pub(crate) fn array_define_own_property(
    agent: &mut Agent,
    array: Handle<ObjectData>,
    p: Handle<HeapString>,
    desc: &PropertyDescriptor,
    throw: bool,
) -> JsResult<bool> {
    fn reject(agent: &mut Agent, throw: bool, message: &str) -> JsResult<bool> {
        if throw {
            Err(agent.throw_exception(ErrorKind::TypeError, message))
        } else {
            Ok(false)
        }
    }

    // 1.-2. The current length.
    let old_len_desc = length_descriptor(agent, array);
    let old_len = f64_to_uint32(
        old_len_desc
            .value
            .expect("array length is a data property")
            .value()
            .get_number(),
    );
    let length_key = agent.well_known(|s| s.length);

    // 3. P is "length".
    if p.equals(&length_key) {
        // 3.a Without a value field this is an ordinary attribute change.
        let Some(new_len_value) = desc.value else {
            return ObjectData::ordinary_define_own_property(agent, array, p, desc, throw);
        };

        // 3.c-d. ToUint32(Desc.[[Value]]) must equal ToNumber exactly.
        let new_len = to_uint32(agent, new_len_value)?;
        let new_len_number = to_number(agent, new_len_value)?;
        if new_len as f64 != new_len_number {
            return Err(agent.throw_exception(ErrorKind::RangeError, "invalid array length"));
        }
        let mut new_len_desc = *desc;
        let boxed_len = Handle::new(agent, Value::from_u32(new_len));
        new_len_desc.value = Some(boxed_len);

        // 3.f Growing (or keeping) the length is ordinary.
        if new_len >= old_len {
            return ObjectData::ordinary_define_own_property(
                agent,
                array,
                p,
                &new_len_desc,
                throw,
            );
        }

        // 3.g A non-writable length cannot shrink.
        if old_len_desc.writable != Some(true) {
            return reject(agent, throw, "cannot redefine read only array length");
        }

        // 3.h-i. Defer turning writability off until the deletions ran.
        let new_writable = if new_len_desc.writable == Some(false) {
            new_len_desc.writable = Some(true);
            false
        } else {
            true
        };

        // 3.j-k. Install the shrunken length.
        let succeeded =
            ObjectData::ordinary_define_own_property(agent, array, p, &new_len_desc, throw)?;
        if !succeeded {
            return Ok(false);
        }

        // 3.l Delete the elements beyond the new length, from the top. A
        //     non-configurable element aborts, leaving length just above it.
        let mut old_len = old_len;
        while new_len < old_len {
            old_len -= 1;
            let element_key = agent.intern_str(&old_len.to_string());
            let deleted = ObjectData::delete(agent, array, element_key, false)?;
            if !deleted {
                let restored = Handle::new(agent, Value::from_u32(old_len + 1));
                let mut restore_desc = new_len_desc;
                restore_desc.value = Some(restored);
                if !new_writable {
                    restore_desc.writable = Some(false);
                }
                ObjectData::ordinary_define_own_property(agent, array, p, &restore_desc, false)?;
                // A failed truncation raises even when Throw is false.
                return Err(agent.throw_exception(
                    ErrorKind::TypeError,
                    "cannot delete non-configurable array element",
                ));
            }
        }

        // 3.m Now the length can be made read-only.
        if !new_writable {
            let freeze_desc = PropertyDescriptor {
                writable: Some(false),
                ..Default::default()
            };
            ObjectData::ordinary_define_own_property(agent, array, p, &freeze_desc, false)?;
        }
        return Ok(true);
    }

    // 4. P is an array index.
    if let Some(index) = array_index_of(&p) {
        // 4.b Writing at or beyond a read-only length rejects.
        if index >= old_len && old_len_desc.writable != Some(true) {
            return reject(agent, throw, "cannot add to an array with read only length");
        }
        // 4.c Ordinary define; 4.d reject on failure.
        let succeeded = ObjectData::ordinary_define_own_property(agent, array, p, desc, false)?;
        if !succeeded {
            return reject(agent, throw, "cannot redefine array element");
        }
        // 4.e The length follows the highest index.
        if index >= old_len {
            set_length_value(agent, array, index + 1);
        }
        return Ok(true);
    }

    // 5. Everything else is ordinary.
    ObjectData::ordinary_define_own_property(agent, array, p, desc, throw)
}

// Construction.

/// ### [15.4.2.2 new Array ( len )](https://262.ecma-international.org/5.1/#sec-15.4.2.2)
pub fn new_array(agent: &mut Agent, length: u32) -> Handle<ObjectData> {
    let prototype = {
        let proto = agent.intrinsics.array_prototype;
        Handle::new(agent, proto)
    };
    new_array_with_prototype(agent, length, prototype)
}

fn new_array_with_prototype(
    agent: &mut Agent,
    length: u32,
    prototype: Handle<Value>,
) -> Handle<ObjectData> {
    let array = agent.new_object_with_tag(HeapTag::JsArray, ObjectClass::Array, prototype);
    // length is writable, non-enumerable, non-configurable; installed with
    // the ordinary algorithm because the array override reads it back.
    let key = agent.well_known(|s| s.length);
    let value = Handle::new(agent, Value::from_u32(length));
    let descriptor = PropertyDescriptor::data(value, true, false, false);
    ObjectData::ordinary_define_own_property(agent, array, key, &descriptor, false)
        .expect("defining length on a fresh array cannot fail");
    array
}

/// Builds an array from already-evaluated element values.
pub fn new_array_from_values(agent: &mut Agent, values: &[Handle<Value>]) -> Handle<ObjectData> {
    let array = new_array(agent, values.len() as u32);
    for (index, value) in values.iter().enumerate() {
        let key = agent.intern_str(&index.to_string());
        let descriptor = PropertyDescriptor::data(*value, true, true, true);
        ObjectData::define_own_property(agent, array, key, &descriptor, false)
            .expect("defining an element on a fresh array cannot fail");
    }
    array
}

/// ### [15.4.2 The Array Constructor](https://262.ecma-international.org/5.1/#sec-15.4.2)
fn array_constructor(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    // A single numeric argument is a length; anything else is an element
    // list. Calling and constructing are equivalent.
    if info.args_count() == 1 {
        let length_argument = info.arg(0);
        if length_argument.value().is_number() {
            let agent = info.agent();
            let length_number = length_argument.value().get_number();
            let length = f64_to_uint32(length_number);
            if length as f64 != length_number {
                return Err(agent.throw_exception(ErrorKind::RangeError, "invalid array length"));
            }
            return Ok(new_array(agent, length).value());
        }
    }
    let args: Vec<Handle<Value>> = (0..info.args_count()).map(|i| info.arg(i)).collect();
    let agent = info.agent();
    Ok(new_array_from_values(agent, &args).value())
}

/// ### [15.4.3.2 Array.isArray ( arg )](https://262.ecma-international.org/5.1/#sec-15.4.3.2)
fn array_is_array(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let value = info.arg(0).value();
    let is_array = value.is_object() && value.tag() == HeapTag::JsArray;
    Ok(Value::from_bool(is_array))
}

// The generic prototype methods. Each works on ToObject(this) through the
// internal methods, so they apply to array-likes as the specification
// requires.

fn get_length_of(agent: &mut Agent, object: Handle<ObjectData>) -> JsResult<u32> {
    let key = agent.well_known(|s| s.length);
    let length = ObjectData::get(agent, object, key)?;
    let length = to_number(agent, length)?;
    Ok(f64_to_uint32(length))
}

fn get_element(agent: &mut Agent, object: Handle<ObjectData>, index: u32) -> JsResult<Handle<Value>> {
    let key = agent.intern_str(&index.to_string());
    ObjectData::get(agent, object, key)
}

fn has_element(agent: &mut Agent, object: Handle<ObjectData>, index: u32) -> bool {
    let key = agent.intern_str(&index.to_string());
    ObjectData::has_property(agent, object, key)
}

fn put_element(
    agent: &mut Agent,
    object: Handle<ObjectData>,
    index: u32,
    value: Handle<Value>,
) -> JsResult<()> {
    let key = agent.intern_str(&index.to_string());
    ObjectData::put(agent, object, key, value, true)
}

fn delete_element(agent: &mut Agent, object: Handle<ObjectData>, index: u32) -> JsResult<()> {
    let key = agent.intern_str(&index.to_string());
    ObjectData::delete(agent, object, key, true)?;
    Ok(())
}

fn put_length(agent: &mut Agent, object: Handle<ObjectData>, length: u32) -> JsResult<()> {
    let key = agent.well_known(|s| s.length);
    let value = Handle::new(agent, Value::from_u32(length));
    ObjectData::put(agent, object, key, value, true)
}

/// ### [15.4.4.5 Array.prototype.join ( separator )](https://262.ecma-international.org/5.1/#sec-15.4.4.5)
fn array_prototype_join(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let separator_argument = info.arg(0);
    let agent = info.agent();
    let object = to_object(agent, this)?;
    let length = get_length_of(agent, object)?;

    // 4.-5. The separator defaults to ",".
    let separator = if separator_argument.value().is_undefined() {
        ",".to_owned()
    } else {
        to_string(agent, separator_argument)?.to_std_string()
    };

    // 7.-10. undefined and null elements render as the empty string.
    let mut result = String::new();
    for index in 0..length {
        if index > 0 {
            result.push_str(&separator);
        }
        let element = get_element(agent, object, index)?;
        if element.value().is_undefined() || element.value().is_null() {
            continue;
        }
        result.push_str(&to_string(agent, element)?.to_std_string());
    }
    Ok(agent.new_string(&result).value())
}

/// ### [15.4.4.2 Array.prototype.toString ( )](https://262.ecma-international.org/5.1/#sec-15.4.4.2)
fn array_prototype_to_string(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    // Defers to join (the this object's own join when callable).
    let this = info.this_value();
    let agent = info.agent();
    let object = to_object(agent, this)?;
    let join_key = agent.intern_str("join");
    let join = ObjectData::get(agent, object, join_key)?;
    if join.value().is_callable() {
        let result = ObjectData::call(agent, join.cast(), object.cast(), &[])?;
        return Ok(result.value());
    }
    let text = format!("[object {}]", object.class().as_str());
    Ok(agent.new_string(&text).value())
}

/// ### [15.4.4.7 Array.prototype.push ( \[ item1 \[ , … \] \] )](https://262.ecma-international.org/5.1/#sec-15.4.4.7)
fn array_prototype_push(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let args: Vec<Handle<Value>> = (0..info.args_count()).map(|i| info.arg(i)).collect();
    let agent = info.agent();
    let object = to_object(agent, this)?;
    let mut length = get_length_of(agent, object)?;
    for value in args {
        put_element(agent, object, length, value)?;
        length += 1;
    }
    put_length(agent, object, length)?;
    Ok(Value::from_u32(length))
}

/// ### [15.4.4.6 Array.prototype.pop ( )](https://262.ecma-international.org/5.1/#sec-15.4.4.6)
fn array_prototype_pop(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let agent = info.agent();
    let object = to_object(agent, this)?;
    let length = get_length_of(agent, object)?;
    if length == 0 {
        put_length(agent, object, 0)?;
        return Ok(Value::UNDEFINED);
    }
    let element = get_element(agent, object, length - 1)?;
    delete_element(agent, object, length - 1)?;
    put_length(agent, object, length - 1)?;
    Ok(element.value())
}

/// ### [15.4.4.9 Array.prototype.shift ( )](https://262.ecma-international.org/5.1/#sec-15.4.4.9)
fn array_prototype_shift(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let agent = info.agent();
    let object = to_object(agent, this)?;
    let length = get_length_of(agent, object)?;
    if length == 0 {
        put_length(agent, object, 0)?;
        return Ok(Value::UNDEFINED);
    }
    let first = get_element(agent, object, 0)?;
    for index in 1..length {
        if has_element(agent, object, index) {
            let value = get_element(agent, object, index)?;
            put_element(agent, object, index - 1, value)?;
        } else {
            delete_element(agent, object, index - 1)?;
        }
    }
    delete_element(agent, object, length - 1)?;
    put_length(agent, object, length - 1)?;
    Ok(first.value())
}

/// ### [15.4.4.13 Array.prototype.unshift ( \[ item1 \[ , … \] \] )](https://262.ecma-international.org/5.1/#sec-15.4.4.13)
fn array_prototype_unshift(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let args: Vec<Handle<Value>> = (0..info.args_count()).map(|i| info.arg(i)).collect();
    let agent = info.agent();
    let object = to_object(agent, this)?;
    let length = get_length_of(agent, object)?;
    let insert_count = args.len() as u32;

    // Shift the existing elements up, from the top.
    let mut index = length;
    while index > 0 {
        index -= 1;
        if has_element(agent, object, index) {
            let value = get_element(agent, object, index)?;
            put_element(agent, object, index + insert_count, value)?;
        } else {
            delete_element(agent, object, index + insert_count)?;
        }
    }
    for (offset, value) in args.iter().enumerate() {
        put_element(agent, object, offset as u32, *value)?;
    }
    put_length(agent, object, length + insert_count)?;
    Ok(Value::from_u32(length + insert_count))
}

/// ### [15.4.4.8 Array.prototype.reverse ( )](https://262.ecma-international.org/5.1/#sec-15.4.4.8)
fn array_prototype_reverse(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let agent = info.agent();
    let object = to_object(agent, this)?;
    let length = get_length_of(agent, object)?;
    let middle = length / 2;
    for lower in 0..middle {
        let upper = length - lower - 1;
        let lower_exists = has_element(agent, object, lower);
        let upper_exists = has_element(agent, object, upper);
        let lower_value = get_element(agent, object, lower)?;
        let upper_value = get_element(agent, object, upper)?;
        if lower_exists && upper_exists {
            put_element(agent, object, lower, upper_value)?;
            put_element(agent, object, upper, lower_value)?;
        } else if upper_exists {
            put_element(agent, object, lower, upper_value)?;
            delete_element(agent, object, upper)?;
        } else if lower_exists {
            put_element(agent, object, upper, lower_value)?;
            delete_element(agent, object, lower)?;
        }
    }
    Ok(object.value())
}

/// ### [15.4.4.10 Array.prototype.slice ( start, end )](https://262.ecma-international.org/5.1/#sec-15.4.4.10)
fn array_prototype_slice(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let start_argument = info.arg(0);
    let end_argument = info.arg(1);
    let agent = info.agent();
    let object = to_object(agent, this)?;
    let length = get_length_of(agent, object)?;

    let start = relative_index(agent, start_argument, length, 0)?;
    let end = relative_index(agent, end_argument, length, length)?;

    let result = new_array(agent, 0);
    let mut count = 0u32;
    let mut index = start;
    while index < end {
        if has_element(agent, object, index) {
            let value = get_element(agent, object, index)?;
            let key = agent.intern_str(&count.to_string());
            let descriptor = PropertyDescriptor::data(value, true, true, true);
            ObjectData::define_own_property(agent, result, key, &descriptor, false)?;
        }
        count += 1;
        index += 1;
    }
    put_length(agent, result, count)?;
    Ok(result.value())
}

/// ### [15.4.4.12 Array.prototype.splice ( start, deleteCount, … )](https://262.ecma-international.org/5.1/#sec-15.4.4.12)
fn array_prototype_splice(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let start_argument = info.arg(0);
    let delete_count_argument = info.arg(1);
    let items: Vec<Handle<Value>> = (2..info.args_count()).map(|i| info.arg(i)).collect();
    let agent = info.agent();
    let object = to_object(agent, this)?;
    let length = get_length_of(agent, object)?;

    let start = relative_index(agent, start_argument, length, 0)?;
    let delete_count = {
        let requested = to_integer(agent, delete_count_argument)?;
        requested.max(0.0).min((length - start) as f64) as u32
    };

    // Collect the removed elements into the result array.
    let removed = new_array(agent, 0);
    for offset in 0..delete_count {
        if has_element(agent, object, start + offset) {
            let value = get_element(agent, object, start + offset)?;
            let key = agent.intern_str(&offset.to_string());
            let descriptor = PropertyDescriptor::data(value, true, true, true);
            ObjectData::define_own_property(agent, removed, key, &descriptor, false)?;
        }
    }
    put_length(agent, removed, delete_count)?;

    let insert_count = items.len() as u32;
    if insert_count < delete_count {
        // Close the gap from the left.
        for index in start..(length - delete_count) {
            let from = index + delete_count;
            let to = index + insert_count;
            if has_element(agent, object, from) {
                let value = get_element(agent, object, from)?;
                put_element(agent, object, to, value)?;
            } else {
                delete_element(agent, object, to)?;
            }
        }
        let mut index = length;
        while index > length - delete_count + insert_count {
            index -= 1;
            delete_element(agent, object, index)?;
        }
    } else if insert_count > delete_count {
        // Open the gap from the right.
        let mut index = length - delete_count;
        while index > start {
            index -= 1;
            let from = index + delete_count;
            let to = index + insert_count;
            if has_element(agent, object, from) {
                let value = get_element(agent, object, from)?;
                put_element(agent, object, to, value)?;
            } else {
                delete_element(agent, object, to)?;
            }
        }
    }
    for (offset, item) in items.iter().enumerate() {
        put_element(agent, object, start + offset as u32, *item)?;
    }
    put_length(agent, object, length - delete_count + insert_count)?;
    Ok(removed.value())
}

/// ### [15.4.4.4 Array.prototype.concat ( \[ item1 \[ , … \] \] )](https://262.ecma-international.org/5.1/#sec-15.4.4.4)
fn array_prototype_concat(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let args: Vec<Handle<Value>> = (0..info.args_count()).map(|i| info.arg(i)).collect();
    let agent = info.agent();
    let object = to_object(agent, this)?;

    let result = new_array(agent, 0);
    let mut count = 0u32;
    let mut append = |agent: &mut Agent, item: Handle<Value>, count: &mut u32| -> JsResult<()> {
        if item.value().is_object() && item.value().tag() == HeapTag::JsArray {
            let spread: Handle<ObjectData> = item.cast();
            let spread_length = get_length_of(agent, spread)?;
            for index in 0..spread_length {
                if has_element(agent, spread, index) {
                    let value = get_element(agent, spread, index)?;
                    let key = agent.intern_str(&count.to_string());
                    let descriptor = PropertyDescriptor::data(value, true, true, true);
                    ObjectData::define_own_property(agent, result, key, &descriptor, false)?;
                }
                *count += 1;
            }
        } else {
            let key = agent.intern_str(&count.to_string());
            let descriptor = PropertyDescriptor::data(item, true, true, true);
            ObjectData::define_own_property(agent, result, key, &descriptor, false)?;
            *count += 1;
        }
        Ok(())
    };

    append(agent, object.cast(), &mut count)?;
    for item in args {
        append(agent, item, &mut count)?;
    }
    put_length(agent, result, count)?;
    Ok(result.value())
}

/// ### [15.4.4.14 Array.prototype.indexOf ( searchElement \[, fromIndex\] )](https://262.ecma-international.org/5.1/#sec-15.4.4.14)
fn array_prototype_index_of(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let search = info.arg(0);
    let from_argument = info.arg(1);
    let agent = info.agent();
    let object = to_object(agent, this)?;
    let length = get_length_of(agent, object)?;
    if length == 0 {
        return Ok(Value::from_i32(-1));
    }
    let from = to_integer(agent, from_argument)?;
    let mut index = if from >= 0.0 {
        from as u32
    } else {
        let adjusted = length as f64 + from;
        if adjusted < 0.0 { 0 } else { adjusted as u32 }
    };
    while index < length {
        if has_element(agent, object, index) {
            let element = get_element(agent, object, index)?;
            if strict_equality(search.value(), element.value()) {
                return Ok(Value::from_u32(index));
            }
        }
        index += 1;
    }
    Ok(Value::from_i32(-1))
}

/// ### [15.4.4.15 Array.prototype.lastIndexOf ( searchElement \[, fromIndex\] )](https://262.ecma-international.org/5.1/#sec-15.4.4.15)
fn array_prototype_last_index_of(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let search = info.arg(0);
    let from_argument = if info.args_count() >= 2 {
        Some(info.arg(1))
    } else {
        None
    };
    let agent = info.agent();
    let object = to_object(agent, this)?;
    let length = get_length_of(agent, object)?;
    if length == 0 {
        return Ok(Value::from_i32(-1));
    }
    let from = if let Some(from_argument) = from_argument {
        to_integer(agent, from_argument)?
    } else {
        (length - 1) as f64
    };
    let mut index = if from >= 0.0 {
        from.min((length - 1) as f64) as i64
    } else {
        length as i64 + from as i64
    };
    while index >= 0 {
        if has_element(agent, object, index as u32) {
            let element = get_element(agent, object, index as u32)?;
            if strict_equality(search.value(), element.value()) {
                return Ok(Value::from_u32(index as u32));
            }
        }
        index -= 1;
    }
    Ok(Value::from_i32(-1))
}

/// ### [15.4.4.11 Array.prototype.sort ( comparefn )](https://262.ecma-international.org/5.1/#sec-15.4.4.11)
///
/// Existing elements sort by the comparator (or by `ToString` order),
/// undefined sorts after everything defined, and holes sink to the end.
fn array_prototype_sort(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    let this = info.this_value();
    let comparefn = info.arg(0);
    let agent = info.agent();
    let object = to_object(agent, this)?;
    let length = get_length_of(agent, object)?;

    if !comparefn.value().is_undefined() && !comparefn.value().is_callable() {
        return Err(agent.throw_exception(ErrorKind::TypeError, "comparator must be a function"));
    }

    // Gather the present, defined elements.
    let mut values: Vec<Handle<Value>> = Vec::new();
    let mut undefined_count = 0u32;
    let mut hole_count = 0u32;
    for index in 0..length {
        if !has_element(agent, object, index) {
            hole_count += 1;
            continue;
        }
        let element = get_element(agent, object, index)?;
        if element.value().is_undefined() {
            undefined_count += 1;
        } else {
            values.push(element);
        }
    }

    // Binary insertion would also do; a straight insertion sort keeps the
    // abrupt-comparator path simple.
    for sorted in 1..values.len() {
        let current = values[sorted];
        let mut position = sorted;
        while position > 0 {
            let ordering = sort_compare(agent, comparefn, values[position - 1], current)?;
            if ordering <= 0.0 {
                break;
            }
            values[position] = values[position - 1];
            position -= 1;
        }
        values[position] = current;
    }

    // Write back: sorted values, then undefineds, then delete the tail.
    let mut index = 0u32;
    for value in &values {
        put_element(agent, object, index, *value)?;
        index += 1;
    }
    for _ in 0..undefined_count {
        let undefined = Handle::new(agent, Value::UNDEFINED);
        put_element(agent, object, index, undefined)?;
        index += 1;
    }
    for _ in 0..hole_count {
        delete_element(agent, object, index)?;
        index += 1;
    }
    Ok(object.value())
}

fn sort_compare(
    agent: &mut Agent,
    comparefn: Handle<Value>,
    x: Handle<Value>,
    y: Handle<Value>,
) -> JsResult<f64> {
    if comparefn.value().is_callable() {
        let undefined = Handle::new(agent, Value::UNDEFINED);
        let result = ObjectData::call(agent, comparefn.cast(), undefined, &[x, y])?;
        let number = to_number(agent, result)?;
        // A NaN comparator result counts as equal.
        return Ok(if number.is_nan() { 0.0 } else { number });
    }
    let x_string = to_string(agent, x)?.to_std_string();
    let y_string = to_string(agent, y)?.to_std_string();
    Ok(match x_string.cmp(&y_string) {
        core::cmp::Ordering::Less => -1.0,
        core::cmp::Ordering::Equal => 0.0,
        core::cmp::Ordering::Greater => 1.0,
    })
}

/// Resolves a relative start/end argument against `length`.
fn relative_index(
    agent: &mut Agent,
    argument: Handle<Value>,
    length: u32,
    default: u32,
) -> JsResult<u32> {
    if argument.value().is_undefined() {
        return Ok(default);
    }
    let relative = to_integer(agent, argument)?;
    Ok(if relative < 0.0 {
        let adjusted = length as f64 + relative;
        if adjusted < 0.0 { 0 } else { adjusted as u32 }
    } else {
        relative.min(length as f64) as u32
    })
}

pub(crate) fn initialize_array_intrinsics(agent: &mut Agent) {
    // Array.prototype is itself an array with length zero, chained to
    // Object.prototype.
    let object_prototype = {
        let proto = agent.intrinsics.object_prototype;
        Handle::new(agent, proto)
    };
    let prototype = new_array_with_prototype(agent, 0, object_prototype);
    agent.intrinsics.array_prototype = prototype.value();

    let constructor = agent.new_builtin_constructor(array_constructor, array_constructor, 1);
    agent.intrinsics.array_constructor = constructor.value();
    define_value(agent, constructor, "prototype", prototype.cast(), false, false, false);
    define_value(agent, prototype, "constructor", constructor.cast(), true, false, true);

    define_builtin_function(agent, constructor, "isArray", array_is_array, 1);

    define_builtin_function(agent, prototype, "toString", array_prototype_to_string, 0);
    define_builtin_function(agent, prototype, "join", array_prototype_join, 1);
    define_builtin_function(agent, prototype, "push", array_prototype_push, 1);
    define_builtin_function(agent, prototype, "pop", array_prototype_pop, 0);
    define_builtin_function(agent, prototype, "shift", array_prototype_shift, 0);
    define_builtin_function(agent, prototype, "unshift", array_prototype_unshift, 1);
    define_builtin_function(agent, prototype, "reverse", array_prototype_reverse, 0);
    define_builtin_function(agent, prototype, "slice", array_prototype_slice, 2);
    define_builtin_function(agent, prototype, "splice", array_prototype_splice, 2);
    define_builtin_function(agent, prototype, "concat", array_prototype_concat, 1);
    define_builtin_function(agent, prototype, "indexOf", array_prototype_index_of, 1);
    define_builtin_function(agent, prototype, "lastIndexOf", array_prototype_last_index_of, 1);
    define_builtin_function(agent, prototype, "sort", array_prototype_sort, 1);
}
