// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-installed built-in functions. A built-in is an ordinary object whose
//! `[[Call]]` (and optionally `[[Construct]]`) invokes a native function
//! through the [`RuntimeCallInfo`] view: the agent, the `this` value, and
//! the rooted argument list. A native signals failure by raising through the
//! agent's pending-exception slot and propagating [`JsError`].

use core::cell::Cell;
use core::mem::size_of;

use crate::ecmascript::execution::agent::{Agent, JsError, JsResult};
use crate::ecmascript::types::language::object::ObjectData;
use crate::ecmascript::types::spec::property_descriptor::PropertyDescriptor;
use crate::engine::value::Value;
use crate::heap::handle::{Handle, HandleScope, HeapData};
use crate::heap::header::{Header, HeapTag, ObjectClass};

/// The contiguous call-info view a native function receives.
pub struct RuntimeCallInfo<'a> {
    agent: *mut Agent,
    this: Handle<Value>,
    args: &'a [Handle<Value>],
    undefined: Handle<Value>,
}

impl RuntimeCallInfo<'_> {
    #[inline]
    pub fn agent(&mut self) -> &mut Agent {
        // SAFETY: the agent outlives the native call; the returned borrow is
        // tied to self, so natives cannot hold two at once.
        unsafe { &mut *self.agent }
    }

    #[inline]
    pub fn this_value(&self) -> Handle<Value> {
        self.this
    }

    #[inline]
    pub fn args_count(&self) -> usize {
        self.args.len()
    }

    /// The argument at `index`, or `undefined` past the supplied arity.
    #[inline]
    pub fn arg(&self, index: usize) -> Handle<Value> {
        self.args.get(index).copied().unwrap_or(self.undefined)
    }
}

pub type NativeFunction = fn(&mut RuntimeCallInfo) -> JsResult<Value>;

#[repr(C)]
pub struct BuiltinFunctionData {
    object: ObjectData,
    behaviour: NativeFunction,
    construct_behaviour: Option<NativeFunction>,
}

impl HeapData for BuiltinFunctionData {}

impl BuiltinFunctionData {
    #[inline]
    pub(crate) fn behaviour(&self) -> NativeFunction {
        self.behaviour
    }

    #[inline]
    pub(crate) fn construct_behaviour(&self) -> Option<NativeFunction> {
        self.construct_behaviour
    }
}

pub(crate) fn call_builtin_function(
    agent: &mut Agent,
    f: Handle<BuiltinFunctionData>,
    this: Handle<Value>,
    args: &[Handle<Value>],
) -> JsResult<Handle<Value>> {
    let behaviour = f.behaviour();
    invoke_native(agent, behaviour, this, args)
}

pub(crate) fn construct_builtin_function(
    agent: &mut Agent,
    f: Handle<BuiltinFunctionData>,
    args: &[Handle<Value>],
) -> JsResult<Handle<ObjectData>> {
    let behaviour = f
        .construct_behaviour()
        .expect("construct dispatch requires a constructor");
    let undefined = Handle::new(agent, Value::UNDEFINED);
    let result = invoke_native(agent, behaviour, undefined, args)?;
    debug_assert!(result.value().is_object());
    Ok(result.cast())
}

/// Every native call runs under its own handle scope and the call-depth
/// guard; the result value is escaped into the caller's scope.
fn invoke_native(
    agent: &mut Agent,
    behaviour: NativeFunction,
    this: Handle<Value>,
    args: &[Handle<Value>],
) -> JsResult<Handle<Value>> {
    agent.enter_call()?;
    let scope = HandleScope::new(agent);
    let undefined = Handle::new(agent, Value::UNDEFINED);
    let mut info = RuntimeCallInfo {
        agent: agent as *mut Agent,
        this,
        args,
        undefined,
    };
    let result = behaviour(&mut info);
    agent.exit_call();
    match result {
        Ok(value) => {
            drop(scope);
            Ok(Handle::new(agent, value))
        }
        Err(error) => {
            drop(scope);
            Err(error)
        }
    }
}

impl Agent {
    /// Allocates a built-in function object. Callable, not a constructor,
    /// prototype `Function.prototype`, with the standard `length` property.
    pub fn new_builtin_function(
        &mut self,
        behaviour: NativeFunction,
        length: u32,
    ) -> Handle<ObjectData> {
        self.new_builtin_internal(behaviour, None, length)
    }

    /// Allocates a built-in constructor: callable and constructable.
    pub fn new_builtin_constructor(
        &mut self,
        behaviour: NativeFunction,
        construct_behaviour: NativeFunction,
        length: u32,
    ) -> Handle<ObjectData> {
        self.new_builtin_internal(behaviour, Some(construct_behaviour), length)
    }

    /// The bootstrap creates `Function.prototype` itself through this,
    /// before the intrinsic slot is populated.
    pub(crate) fn new_builtin_function_with_prototype(
        &mut self,
        behaviour: NativeFunction,
        length: u32,
        prototype: Handle<Value>,
    ) -> Handle<ObjectData> {
        self.new_builtin_internal_with_prototype(behaviour, None, length, prototype.value())
    }

    fn new_builtin_internal(
        &mut self,
        behaviour: NativeFunction,
        construct_behaviour: Option<NativeFunction>,
        length: u32,
    ) -> Handle<ObjectData> {
        let prototype = self.intrinsics.function_prototype;
        self.new_builtin_internal_with_prototype(behaviour, construct_behaviour, length, prototype)
    }

    fn new_builtin_internal_with_prototype(
        &mut self,
        behaviour: NativeFunction,
        construct_behaviour: Option<NativeFunction>,
        length: u32,
        prototype: Value,
    ) -> Handle<ObjectData> {
        // Root the prototype before the allocations below can move it.
        let prototype: Handle<Value> = Handle::new(self, prototype);
        let map = self.new_property_map();
        let ptr = self.allocate(size_of::<BuiltinFunctionData>());
        // SAFETY: freshly allocated memory of the right size.
        unsafe {
            core::ptr::write(
                ptr.as_ptr() as *mut BuiltinFunctionData,
                BuiltinFunctionData {
                    object: ObjectData::bare(
                        Header::new(HeapTag::BuiltinFunction),
                        Cell::new(map.value()),
                        Cell::new(prototype.value()),
                    ),
                    behaviour,
                    construct_behaviour,
                },
            );
        }
        let function: Handle<ObjectData> = Handle::new(self, Value::from_ptr(ptr));
        function.set_class(ObjectClass::Function);
        function.set_extensible(true);
        function.set_callable(true);
        function.set_is_constructor(construct_behaviour.is_some());

        // length is non-writable, non-enumerable, non-configurable.
        let value = Handle::new(self, Value::from_u32(length));
        let descriptor = PropertyDescriptor::data(value, false, false, false);
        let key = self.well_known(|s| s.length);
        ObjectData::define_own_property(self, function, key, &descriptor, false)
            .expect("defining length on a fresh function cannot fail");
        function
    }
}

// The native-error machinery raises JsError from deep inside natives; make
// sure the token stays trivially copyable.
const _: () = assert!(size_of::<JsError>() == 0);
