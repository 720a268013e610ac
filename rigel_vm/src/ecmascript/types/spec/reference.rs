// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [8.7 The Reference Specification Type](https://262.ecma-international.org/5.1/#sec-8.7)
//!
//! The unresolved form of an assignable expression: a base (value or
//! environment record), a referenced name, and the strict flag. Expressions
//! evaluate to either a value or a reference; `get_value` collapses a
//! reference the moment its underlying value is needed, and `put_value`
//! performs the assignment.

use crate::ecmascript::abstract_operations::type_conversion::to_object;
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::execution::environments;
use crate::ecmascript::types::language::object::ObjectData;
use crate::ecmascript::types::language::string::HeapString;
use crate::engine::value::Value;
use crate::heap::handle::Handle;
use crate::heap::header::ErrorKind;

#[derive(Debug, Clone, Copy)]
pub enum ReferenceBase {
    /// Undefined (unresolvable), an object, or a primitive.
    Value(Handle<Value>),
    /// A declarative or object environment record.
    Environment(Handle<Value>),
}

#[derive(Debug, Clone, Copy)]
pub struct Reference {
    base: ReferenceBase,
    name: Handle<HeapString>,
    strict: bool,
}

impl Reference {
    pub fn new_value(base: Handle<Value>, name: Handle<HeapString>, strict: bool) -> Self {
        Reference {
            base: ReferenceBase::Value(base),
            name,
            strict,
        }
    }

    pub fn new_environment(env_rec: Handle<Value>, name: Handle<HeapString>, strict: bool) -> Self {
        Reference {
            base: ReferenceBase::Environment(env_rec),
            name,
            strict,
        }
    }

    pub fn base(&self) -> ReferenceBase {
        self.base
    }

    pub fn name(&self) -> Handle<HeapString> {
        self.name
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// The base value is a Boolean, String, or Number.
    pub fn has_primitive_base(&self) -> bool {
        match self.base {
            ReferenceBase::Value(base) => {
                let value = base.value();
                value.is_boolean() || value.is_string() || value.is_number()
            }
            ReferenceBase::Environment(_) => false,
        }
    }

    /// The base value is an object or a primitive.
    pub fn is_property_reference(&self) -> bool {
        match self.base {
            ReferenceBase::Value(base) => base.value().is_object() || self.has_primitive_base(),
            ReferenceBase::Environment(_) => false,
        }
    }

    /// The base value is undefined.
    pub fn is_unresolvable(&self) -> bool {
        match self.base {
            ReferenceBase::Value(base) => base.value().is_undefined(),
            ReferenceBase::Environment(_) => false,
        }
    }
}

/// An expression's result: a plain value, or a not-yet-resolved reference.
#[derive(Debug, Clone, Copy)]
pub enum ValueOrReference {
    Value(Handle<Value>),
    Reference(Reference),
}

impl ValueOrReference {
    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            ValueOrReference::Reference(reference) => Some(reference),
            ValueOrReference::Value(_) => None,
        }
    }
}

/// ### [8.7.1 GetValue(V)](https://262.ecma-international.org/5.1/#sec-8.7.1)
pub fn get_value(agent: &mut Agent, v: &ValueOrReference) -> JsResult<Handle<Value>> {
    // 1. If Type(V) is not Reference, return V.
    let reference = match v {
        ValueOrReference::Value(value) => return Ok(*value),
        ValueOrReference::Reference(reference) => reference,
    };

    // 2.-3. An unresolvable reference throws a ReferenceError.
    if reference.is_unresolvable() {
        let name = reference.name().to_std_string();
        return Err(
            agent.throw_exception(ErrorKind::ReferenceError, &format!("{name} is not defined"))
        );
    }

    match reference.base() {
        // 4. Property references resolve through [[Get]]. A primitive base
        //    is wrapped in a transient object, but the getter (if any) sees
        //    the primitive as its this value.
        ReferenceBase::Value(base) => {
            if reference.has_primitive_base() {
                let object = to_object(agent, base)?;
                ObjectData::get_with_this(agent, object, reference.name(), base)
            } else {
                let object: Handle<ObjectData> = base.cast();
                ObjectData::get(agent, object, reference.name())
            }
        }
        // 5. Otherwise the base is an environment record.
        ReferenceBase::Environment(env_rec) => environments::get_binding_value(
            agent,
            env_rec,
            reference.name(),
            reference.is_strict(),
        ),
    }
}

/// ### [8.7.2 PutValue(V, W)](https://262.ecma-international.org/5.1/#sec-8.7.2)
pub fn put_value(agent: &mut Agent, v: &ValueOrReference, w: Handle<Value>) -> JsResult<()> {
    // 1. If Type(V) is not Reference, throw a ReferenceError exception.
    let reference = match v {
        ValueOrReference::Value(_) => {
            return Err(agent.throw_exception(
                ErrorKind::ReferenceError,
                "invalid assignment left-hand side",
            ));
        }
        ValueOrReference::Reference(reference) => reference,
    };

    if reference.is_unresolvable() {
        // 3.a Strict assignment to an undeclared name throws.
        if reference.is_strict() {
            let name = reference.name().to_std_string();
            return Err(
                agent.throw_exception(ErrorKind::ReferenceError, &format!("{name} is not defined"))
            );
        }
        // 3.b Otherwise the property is created on the global object.
        let global = agent.global_object();
        return ObjectData::put(agent, global, reference.name(), w, false);
    }

    match reference.base() {
        // 4. Property references assign through [[Put]].
        ReferenceBase::Value(base) => {
            if reference.has_primitive_base() {
                let object = to_object(agent, base)?;
                ObjectData::put_with_this(
                    agent,
                    object,
                    reference.name(),
                    w,
                    reference.is_strict(),
                    base,
                )
            } else {
                let object: Handle<ObjectData> = base.cast();
                ObjectData::put(agent, object, reference.name(), w, reference.is_strict())
            }
        }
        // 5. Otherwise the base is an environment record.
        ReferenceBase::Environment(env_rec) => environments::set_mutable_binding(
            agent,
            env_rec,
            reference.name(),
            w,
            reference.is_strict(),
        ),
    }
}
