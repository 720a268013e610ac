// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Size and outgoing-reference enumeration for every heap object layout.
//! Both are pure functions of the header type tag plus at most one length
//! field, which is what lets the collector walk to-space linearly.

use core::mem::size_of;

use crate::ecmascript::builtins::builtin_function::BuiltinFunctionData;
use crate::ecmascript::builtins::function::EcmascriptFunction;
use crate::ecmascript::execution::environments::{
    DeclarativeEnvironment, LexicalEnvironment, ObjectEnvironment,
};
use crate::ecmascript::types::internal::array::InternalArray;
use crate::ecmascript::types::internal::binding::Binding;
use crate::ecmascript::types::language::object::{ObjectData, PrimitiveObjectData};
use crate::ecmascript::types::language::string::HeapString;
use crate::ecmascript::types::spec::property_descriptor::{
    AccessorDescriptor, DataDescriptor, GenericDescriptor,
};
use crate::engine::value::Value;
use crate::heap::header::{Header, HeapTag};

/// The allocation size of the object at `ptr`, before granule rounding.
///
/// SAFETY: `ptr` must point at a live, fully initialized heap object.
pub(crate) unsafe fn object_size(ptr: *const u8) -> usize {
    let header = unsafe { &*(ptr as *const Header) };
    match header.tag() {
        HeapTag::String => {
            let string = unsafe { &*(ptr as *const HeapString) };
            HeapString::allocation_size(string.len())
        }
        HeapTag::Array | HeapTag::HashMap | HeapTag::PropertyMap => {
            let array = unsafe { &*(ptr as *const InternalArray) };
            InternalArray::allocation_size(array.len())
        }
        HeapTag::DataDescriptor => size_of::<DataDescriptor>(),
        HeapTag::AccessorDescriptor => size_of::<AccessorDescriptor>(),
        HeapTag::GenericDescriptor => size_of::<GenericDescriptor>(),
        HeapTag::Binding => size_of::<Binding>(),
        HeapTag::BuiltinFunction => size_of::<BuiltinFunctionData>(),
        HeapTag::DeclarativeEnvironment => size_of::<DeclarativeEnvironment>(),
        HeapTag::ObjectEnvironment => size_of::<ObjectEnvironment>(),
        HeapTag::LexicalEnvironment => size_of::<LexicalEnvironment>(),
        HeapTag::Object | HeapTag::GlobalObject | HeapTag::JsObject | HeapTag::JsArray
        | HeapTag::JsError => size_of::<ObjectData>(),
        HeapTag::JsString | HeapTag::JsBoolean | HeapTag::JsNumber => {
            size_of::<PrimitiveObjectData>()
        }
        HeapTag::JsFunction => size_of::<EcmascriptFunction>(),
    }
}

/// Appends the addresses of every outgoing value slot of the object at
/// `ptr`. The AST pointer of a function is host memory and is not traced.
///
/// SAFETY: as [`object_size`].
pub(crate) unsafe fn value_slots(ptr: *const u8, slots: &mut Vec<*mut Value>) {
    let header = unsafe { &*(ptr as *const Header) };
    match header.tag() {
        // Strings and generic descriptors hold no references.
        HeapTag::String | HeapTag::GenericDescriptor => {}
        HeapTag::Array | HeapTag::HashMap | HeapTag::PropertyMap => {
            let array = unsafe { &*(ptr as *const InternalArray) };
            for index in 0..array.len() {
                slots.push(array.slot_ptr(index));
            }
        }
        HeapTag::DataDescriptor => {
            let descriptor = unsafe { &*(ptr as *const DataDescriptor) };
            slots.push(descriptor.value_slot());
        }
        HeapTag::AccessorDescriptor => {
            let descriptor = unsafe { &*(ptr as *const AccessorDescriptor) };
            slots.push(descriptor.getter_slot());
            slots.push(descriptor.setter_slot());
        }
        HeapTag::Binding => {
            let binding = unsafe { &*(ptr as *const Binding) };
            slots.push(binding.value_slot());
        }
        HeapTag::DeclarativeEnvironment => {
            let record = unsafe { &*(ptr as *const DeclarativeEnvironment) };
            slots.push(record.bindings_slot());
        }
        HeapTag::ObjectEnvironment => {
            let record = unsafe { &*(ptr as *const ObjectEnvironment) };
            slots.push(record.binding_object_slot());
        }
        HeapTag::LexicalEnvironment => {
            let environment = unsafe { &*(ptr as *const LexicalEnvironment) };
            slots.push(environment.env_rec_slot());
            slots.push(environment.outer_slot());
        }
        // Every language object starts with the common prefix of property
        // map and prototype; subtypes append their extra slots.
        HeapTag::Object
        | HeapTag::GlobalObject
        | HeapTag::JsObject
        | HeapTag::JsArray
        | HeapTag::JsError
        | HeapTag::BuiltinFunction
        | HeapTag::JsString
        | HeapTag::JsBoolean
        | HeapTag::JsNumber
        | HeapTag::JsFunction => {
            let object = unsafe { &*(ptr as *const ObjectData) };
            slots.push(object.properties_slot());
            slots.push(object.prototype_slot());
            match header.tag() {
                HeapTag::JsString | HeapTag::JsBoolean | HeapTag::JsNumber => {
                    let wrapper = unsafe { &*(ptr as *const PrimitiveObjectData) };
                    slots.push(wrapper.primitive_slot());
                }
                HeapTag::JsFunction => {
                    let function = unsafe { &*(ptr as *const EcmascriptFunction) };
                    slots.push(function.scope_slot());
                }
                _ => {}
            }
        }
    }
}
