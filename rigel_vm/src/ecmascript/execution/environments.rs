// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.2 Lexical Environments](https://262.ecma-international.org/5.1/#sec-10.2)
//!
//! Environment records come in two concrete kinds: declarative records own a
//! hash map of identifier bindings, object records bind identifiers to the
//! properties of an object (the global object, or a `with` operand). A
//! lexical environment pairs a record with an outer environment reference,
//! forming the identifier-resolution chain.

use core::cell::Cell;
use core::mem::size_of;

use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::types::internal::binding::Binding;
use crate::ecmascript::types::internal::hash_map::{DEFAULT_CAPACITY, InternalHashMap};
use crate::ecmascript::types::language::object::ObjectData;
use crate::ecmascript::types::language::string::HeapString;
use crate::ecmascript::types::spec::property_descriptor::PropertyDescriptor;
use crate::ecmascript::types::spec::reference::Reference;
use crate::engine::value::Value;
use crate::heap::handle::{Handle, HeapData};
use crate::heap::header::{ErrorKind, Header, HeapTag};

#[repr(C)]
pub struct DeclarativeEnvironment {
    header: Header,
    /// An `InternalHashMap` from identifier to [`Binding`].
    bindings: Cell<Value>,
}

impl HeapData for DeclarativeEnvironment {}

impl DeclarativeEnvironment {
    #[inline]
    pub(crate) fn bindings(&self) -> Value {
        self.bindings.get()
    }

    pub(crate) fn set_bindings(&self, map: Value) {
        self.bindings.set(map);
    }

    #[inline]
    pub(crate) fn binding_map(&self) -> &InternalHashMap {
        // SAFETY: bindings always holds an internal hash map.
        unsafe { self.bindings.get().data::<InternalHashMap>() }
    }

    pub(crate) fn bindings_slot(&self) -> *mut Value {
        self.bindings.as_ptr()
    }
}

#[repr(C)]
pub struct ObjectEnvironment {
    header: Header,
    binding_object: Cell<Value>,
}

impl HeapData for ObjectEnvironment {}

impl ObjectEnvironment {
    #[inline]
    pub(crate) fn binding_object(&self) -> Value {
        self.binding_object.get()
    }

    #[inline]
    pub(crate) fn provide_this(&self) -> bool {
        self.header.provide_this()
    }

    pub(crate) fn binding_object_slot(&self) -> *mut Value {
        self.binding_object.as_ptr()
    }
}

#[repr(C)]
pub struct LexicalEnvironment {
    header: Header,
    env_rec: Cell<Value>,
    /// Another `LexicalEnvironment`, or `Null` for the outermost.
    outer: Cell<Value>,
}

impl HeapData for LexicalEnvironment {}

impl LexicalEnvironment {
    #[inline]
    pub(crate) fn env_rec(&self) -> Value {
        self.env_rec.get()
    }

    #[inline]
    pub(crate) fn outer(&self) -> Value {
        self.outer.get()
    }

    pub(crate) fn env_rec_slot(&self) -> *mut Value {
        self.env_rec.as_ptr()
    }

    pub(crate) fn outer_slot(&self) -> *mut Value {
        self.outer.as_ptr()
    }
}

// The concrete environment-record methods of 10.2.1, dispatched on the
// record's heap tag.

/// ### [10.2.1 HasBinding(N)](https://262.ecma-international.org/5.1/#sec-10.2.1)
pub fn has_binding(agent: &mut Agent, env_rec: Handle<Value>, name: Handle<HeapString>) -> bool {
    match env_rec.value().tag() {
        HeapTag::DeclarativeEnvironment => {
            let record: Handle<DeclarativeEnvironment> = env_rec.cast();
            !record.binding_map().find(&name).is_hole()
        }
        HeapTag::ObjectEnvironment => {
            let record: Handle<ObjectEnvironment> = env_rec.cast();
            let object: Handle<ObjectData> = Handle::<Value>::new(agent, record.binding_object()).cast();
            ObjectData::has_property(agent, object, name)
        }
        _ => unreachable!("not an environment record"),
    }
}

/// ### [10.2.1 CreateMutableBinding(N, D)](https://262.ecma-international.org/5.1/#sec-10.2.1)
pub fn create_mutable_binding(
    agent: &mut Agent,
    env_rec: Handle<Value>,
    name: Handle<HeapString>,
    deletable: bool,
) -> JsResult<()> {
    match env_rec.value().tag() {
        HeapTag::DeclarativeEnvironment => {
            let record: Handle<DeclarativeEnvironment> = env_rec.cast();
            // Create a mutable binding for N with value undefined; D records
            // whether a later DeleteBinding may remove it.
            let undefined = Handle::new(agent, Value::UNDEFINED);
            let binding = agent.new_binding(undefined, true, deletable);
            let map: Handle<InternalHashMap> = Handle::<Value>::new(agent, record.bindings()).cast();
            let map = InternalHashMap::insert(agent, map, name, binding.cast());
            record.set_bindings(map.value());
            Ok(())
        }
        HeapTag::ObjectEnvironment => {
            let record: Handle<ObjectEnvironment> = env_rec.cast();
            let object: Handle<ObjectData> = Handle::<Value>::new(agent, record.binding_object()).cast();
            // Define an enumerable data property on the binding object, with
            // D as its configurability.
            let undefined = Handle::new(agent, Value::UNDEFINED);
            let desc = PropertyDescriptor::data(undefined, true, true, deletable);
            ObjectData::define_own_property(agent, object, name, &desc, true)?;
            Ok(())
        }
        _ => unreachable!("not an environment record"),
    }
}

/// Creates an immutable, uninitialized binding; used for the name of a named
/// function expression.
pub fn create_immutable_binding(
    agent: &mut Agent,
    env_rec: Handle<Value>,
    name: Handle<HeapString>,
) {
    debug_assert_eq!(env_rec.value().tag(), HeapTag::DeclarativeEnvironment);
    let record: Handle<DeclarativeEnvironment> = env_rec.cast();
    let undefined = Handle::new(agent, Value::UNDEFINED);
    let binding = agent.new_binding(undefined, false, false);
    let map: Handle<InternalHashMap> = Handle::<Value>::new(agent, record.bindings()).cast();
    let map = InternalHashMap::insert(agent, map, name, binding.cast());
    record.set_bindings(map.value());
}

pub fn initialize_immutable_binding(
    agent: &mut Agent,
    env_rec: Handle<Value>,
    name: Handle<HeapString>,
    value: Handle<Value>,
) {
    debug_assert_eq!(env_rec.value().tag(), HeapTag::DeclarativeEnvironment);
    let record: Handle<DeclarativeEnvironment> = env_rec.cast();
    let binding = record.binding_map().find(&name);
    debug_assert!(!binding.is_hole());
    // SAFETY: binding-map values are bindings.
    let binding = unsafe { binding.data::<Binding>() };
    binding.set_value(value.value());
}

/// ### [10.2.1 SetMutableBinding(N, V, S)](https://262.ecma-international.org/5.1/#sec-10.2.1)
pub fn set_mutable_binding(
    agent: &mut Agent,
    env_rec: Handle<Value>,
    name: Handle<HeapString>,
    value: Handle<Value>,
    strict: bool,
) -> JsResult<()> {
    match env_rec.value().tag() {
        HeapTag::DeclarativeEnvironment => {
            let record: Handle<DeclarativeEnvironment> = env_rec.cast();
            let binding = record.binding_map().find(&name);
            if binding.is_hole() {
                // The binding was deleted between reference creation and
                // this assignment; recreate it.
                create_mutable_binding(agent, env_rec, name, true)?;
                return set_mutable_binding(agent, env_rec, name, value, strict);
            }
            // SAFETY: binding-map values are bindings.
            let binding = unsafe { binding.data::<Binding>() };
            if binding.is_mutable() {
                binding.set_value(value.value());
            } else if strict {
                return Err(agent.throw_exception(
                    ErrorKind::TypeError,
                    "cannot assign to an immutable binding",
                ));
            }
            Ok(())
        }
        HeapTag::ObjectEnvironment => {
            let record: Handle<ObjectEnvironment> = env_rec.cast();
            let object: Handle<ObjectData> = Handle::<Value>::new(agent, record.binding_object()).cast();
            ObjectData::put(agent, object, name, value, strict)
        }
        _ => unreachable!("not an environment record"),
    }
}

/// ### [10.2.1 GetBindingValue(N, S)](https://262.ecma-international.org/5.1/#sec-10.2.1)
pub fn get_binding_value(
    agent: &mut Agent,
    env_rec: Handle<Value>,
    name: Handle<HeapString>,
    strict: bool,
) -> JsResult<Handle<Value>> {
    match env_rec.value().tag() {
        HeapTag::DeclarativeEnvironment => {
            let record: Handle<DeclarativeEnvironment> = env_rec.cast();
            let binding = record.binding_map().find(&name);
            if binding.is_hole() {
                // Deleted between reference creation and the read.
                return Ok(Handle::new(agent, Value::UNDEFINED));
            }
            // SAFETY: binding-map values are bindings.
            let binding = unsafe { binding.data::<Binding>() };
            // An uninitialized immutable binding reads as undefined, or
            // raises in strict code.
            if !binding.is_mutable() && binding.value().is_undefined() && strict {
                let text = name.to_std_string();
                return Err(agent.throw_exception(
                    ErrorKind::ReferenceError,
                    &format!("'{text}' is not initialized"),
                ));
            }
            let value = binding.value();
            Ok(Handle::new(agent, value))
        }
        HeapTag::ObjectEnvironment => {
            let record: Handle<ObjectEnvironment> = env_rec.cast();
            let object: Handle<ObjectData> = Handle::<Value>::new(agent, record.binding_object()).cast();
            if !ObjectData::has_property(agent, object, name) {
                if strict {
                    let text = name.to_std_string();
                    return Err(agent.throw_exception(
                        ErrorKind::ReferenceError,
                        &format!("'{text}' is not defined"),
                    ));
                }
                return Ok(Handle::new(agent, Value::UNDEFINED));
            }
            ObjectData::get(agent, object, name)
        }
        _ => unreachable!("not an environment record"),
    }
}

/// ### [10.2.1 DeleteBinding(N)](https://262.ecma-international.org/5.1/#sec-10.2.1)
pub fn delete_binding(
    agent: &mut Agent,
    env_rec: Handle<Value>,
    name: Handle<HeapString>,
) -> JsResult<bool> {
    match env_rec.value().tag() {
        HeapTag::DeclarativeEnvironment => {
            let record: Handle<DeclarativeEnvironment> = env_rec.cast();
            let binding = record.binding_map().find(&name);
            if binding.is_hole() {
                return Ok(true);
            }
            // SAFETY: binding-map values are bindings.
            let binding = unsafe { binding.data::<Binding>() };
            if !binding.is_deletable() {
                return Ok(false);
            }
            record.binding_map().erase(&name);
            Ok(true)
        }
        HeapTag::ObjectEnvironment => {
            let record: Handle<ObjectEnvironment> = env_rec.cast();
            let object: Handle<ObjectData> = Handle::<Value>::new(agent, record.binding_object()).cast();
            ObjectData::delete(agent, object, name, false)
        }
        _ => unreachable!("not an environment record"),
    }
}

/// ### [10.2.1 ImplicitThisValue()](https://262.ecma-international.org/5.1/#sec-10.2.1)
pub fn implicit_this_value(agent: &mut Agent, env_rec: Handle<Value>) -> Handle<Value> {
    match env_rec.value().tag() {
        HeapTag::ObjectEnvironment => {
            let record: Handle<ObjectEnvironment> = env_rec.cast();
            if record.provide_this() {
                let object = record.binding_object();
                return Handle::new(agent, object);
            }
            Handle::new(agent, Value::UNDEFINED)
        }
        _ => Handle::new(agent, Value::UNDEFINED),
    }
}

/// ### [10.2.2.1 GetIdentifierReference](https://262.ecma-international.org/5.1/#sec-10.2.2.1)
pub fn get_identifier_reference(
    agent: &mut Agent,
    lex: Option<Handle<LexicalEnvironment>>,
    name: Handle<HeapString>,
    strict: bool,
) -> Reference {
    let mut lex = lex;
    while let Some(env) = lex {
        // 2. Let envRec be lex's environment record.
        let env_rec = Handle::new(agent, env.env_rec());
        // 3.-4. If HasBinding(N), return a reference with base envRec.
        if has_binding(agent, env_rec, name) {
            return Reference::new_environment(env_rec, name, strict);
        }
        // 5. Recurse on the outer environment reference.
        let outer = env.outer();
        lex = if outer.is_null() {
            None
        } else {
            Some(Handle::<Value>::new(agent, outer).cast())
        };
    }
    // 1. With no environment left, the reference is unresolvable.
    let undefined = Handle::new(agent, Value::UNDEFINED);
    Reference::new_value(undefined, name, strict)
}

// Factories.

impl Agent {
    fn new_lexical_environment_raw(
        &mut self,
        env_rec: Handle<Value>,
        outer: Value,
    ) -> Handle<LexicalEnvironment> {
        let outer: Handle<Value> = Handle::new(self, outer);
        let ptr = self.allocate(size_of::<LexicalEnvironment>());
        // SAFETY: freshly allocated memory of the right size.
        unsafe {
            core::ptr::write(
                ptr.as_ptr() as *mut LexicalEnvironment,
                LexicalEnvironment {
                    header: Header::new(HeapTag::LexicalEnvironment),
                    env_rec: Cell::new(env_rec.value()),
                    outer: Cell::new(outer.value()),
                },
            );
        }
        Handle::new(self, Value::from_ptr(ptr))
    }

    /// ### [10.2.2.2 NewDeclarativeEnvironment(E)](https://262.ecma-international.org/5.1/#sec-10.2.2.2)
    pub fn new_declarative_environment(
        &mut self,
        outer: Option<Handle<LexicalEnvironment>>,
    ) -> Handle<LexicalEnvironment> {
        let map = self.new_hash_map(DEFAULT_CAPACITY);
        let ptr = self.allocate(size_of::<DeclarativeEnvironment>());
        // SAFETY: freshly allocated memory of the right size.
        unsafe {
            core::ptr::write(
                ptr.as_ptr() as *mut DeclarativeEnvironment,
                DeclarativeEnvironment {
                    header: Header::new(HeapTag::DeclarativeEnvironment),
                    bindings: Cell::new(map.value()),
                },
            );
        }
        let record: Handle<Value> = Handle::new(self, Value::from_ptr(ptr));
        let outer = outer.map(|env| env.value()).unwrap_or(Value::NULL);
        self.new_lexical_environment_raw(record, outer)
    }

    /// ### [10.2.2.3 NewObjectEnvironment(O, E)](https://262.ecma-international.org/5.1/#sec-10.2.2.3)
    pub fn new_object_environment(
        &mut self,
        object: Handle<ObjectData>,
        provide_this: bool,
        outer: Option<Handle<LexicalEnvironment>>,
    ) -> Handle<LexicalEnvironment> {
        let ptr = self.allocate(size_of::<ObjectEnvironment>());
        // SAFETY: freshly allocated memory of the right size.
        unsafe {
            core::ptr::write(
                ptr.as_ptr() as *mut ObjectEnvironment,
                ObjectEnvironment {
                    header: Header::new(HeapTag::ObjectEnvironment),
                    binding_object: Cell::new(object.value()),
                },
            );
        }
        let record: Handle<Value> = Handle::new(self, Value::from_ptr(ptr));
        record.value().header().set_provide_this(provide_this);
        let outer = outer.map(|env| env.value()).unwrap_or(Value::NULL);
        self.new_lexical_environment_raw(record, outer)
    }
}
