// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [15.11 Error Objects](https://262.ecma-international.org/5.1/#sec-15.11)
//!
//! `Error` and the six native error subtypes. Each subtype's prototype
//! chains to `Error.prototype`, which carries the shared `toString`;
//! constructors behave identically whether called or `new`-ed.

use crate::ecmascript::abstract_operations::type_conversion::to_string;
use crate::ecmascript::builtins::builtin_function::RuntimeCallInfo;
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::types::language::object::ObjectData;
use crate::ecmascript::types::spec::property_descriptor::PropertyDescriptor;
use crate::engine::value::Value;
use crate::heap::handle::Handle;
use crate::heap::header::{ErrorKind, HeapTag, ObjectClass};

/// Allocates a native error of `kind` carrying `message`; the agent's
/// exception channel goes through here.
pub fn new_native_error(agent: &mut Agent, kind: ErrorKind, message: &str) -> Handle<ObjectData> {
    let prototype = agent.intrinsics.error_prototype(kind);
    debug_assert!(!prototype.is_hole(), "error intrinsics not yet initialized");
    let prototype = Handle::new(agent, prototype);
    let error = agent.new_object_with_tag(HeapTag::JsError, ObjectClass::Error, prototype);
    error.set_error_kind(kind);
    if !message.is_empty() {
        let message = agent.new_string(message);
        define_message(agent, error, message.cast());
    }
    error
}

fn define_message(agent: &mut Agent, error: Handle<ObjectData>, message: Handle<Value>) {
    let key = agent.well_known(|s| s.message);
    let descriptor = PropertyDescriptor::data(message, true, false, true);
    ObjectData::define_own_property(agent, error, key, &descriptor, false)
        .expect("defining message on a fresh error cannot fail");
}

/// The shared constructor body; `Error(msg)` and `new Error(msg)` create
/// the same object.
fn construct_error_of_kind(info: &mut RuntimeCallInfo, kind: ErrorKind) -> JsResult<Value> {
    let message_argument = info.arg(0);
    let error = new_native_error(info.agent(), kind, "");
    // 15.11.1.1: message is set from ToString(message) when the argument is
    // not undefined.
    if !message_argument.value().is_undefined() {
        let message = to_string(info.agent(), message_argument)?;
        define_message(info.agent(), error, message.cast());
    }
    Ok(error.value())
}

macro_rules! error_constructors {
    ($( $name:ident => $kind:ident, )*) => {
        $(
            fn $name(info: &mut RuntimeCallInfo) -> JsResult<Value> {
                construct_error_of_kind(info, ErrorKind::$kind)
            }
        )*

        /// Constructor behaviours indexed like [`ErrorKind`].
        const CONSTRUCTOR_BEHAVIOURS: [fn(&mut RuntimeCallInfo) -> JsResult<Value>;
            ErrorKind::COUNT] = [$( $name, )*];
    };
}

error_constructors! {
    error_constructor => Error,
    eval_error_constructor => EvalError,
    range_error_constructor => RangeError,
    reference_error_constructor => ReferenceError,
    syntax_error_constructor => SyntaxError,
    type_error_constructor => TypeError,
    uri_error_constructor => UriError,
}

/// ### [15.11.4.4 Error.prototype.toString ( )](https://262.ecma-international.org/5.1/#sec-15.11.4.4)
fn error_prototype_to_string(info: &mut RuntimeCallInfo) -> JsResult<Value> {
    use crate::heap::header::ErrorKind as Kind;

    let this = info.this_value();
    let agent = info.agent();
    // 2. If Type(O) is not Object, throw a TypeError exception.
    if !this.value().is_object() {
        return Err(agent.throw_exception(Kind::TypeError, "Error.prototype.toString called on non-object"));
    }
    let object: Handle<ObjectData> = this.cast();

    // 3.-5. name defaults to "Error".
    let key = agent.well_known(|s| s.name);
    let name = ObjectData::get(agent, object, key)?;
    let name = if name.value().is_undefined() {
        "Error".to_owned()
    } else {
        to_string(agent, name)?.to_std_string()
    };

    // 6.-8. message defaults to the empty string.
    let key = agent.well_known(|s| s.message);
    let message = ObjectData::get(agent, object, key)?;
    let message = if message.value().is_undefined() {
        String::new()
    } else {
        to_string(agent, message)?.to_std_string()
    };

    // 9.-10. Join the non-empty parts with ": ".
    let text = if name.is_empty() {
        message
    } else if message.is_empty() {
        name
    } else {
        format!("{name}: {message}")
    };
    Ok(agent.new_string(&text).value())
}

/// Renders an uncaught exception as `name: message`, the form the CLI
/// prints. Falls back to `ToString` for non-object throws.
pub fn uncaught_exception_message(agent: &mut Agent, value: Handle<Value>) -> String {
    if value.value().is_object() {
        let object: Handle<ObjectData> = value.cast();
        let name_key = agent.well_known(|s| s.name);
        let message_key = agent.well_known(|s| s.message);
        let name = ObjectData::get(agent, object, name_key)
            .and_then(|name| {
                if name.value().is_undefined() {
                    Ok(object.error_kind().name().to_owned())
                } else {
                    to_string(agent, name).map(|s| s.to_std_string())
                }
            })
            .unwrap_or_else(|_| {
                agent.clear_exception();
                "Error".to_owned()
            });
        let message = ObjectData::get(agent, object, message_key)
            .and_then(|message| {
                if message.value().is_undefined() {
                    Ok(String::new())
                } else {
                    to_string(agent, message).map(|s| s.to_std_string())
                }
            })
            .unwrap_or_else(|_| {
                agent.clear_exception();
                String::new()
            });
        if message.is_empty() {
            name
        } else {
            format!("{name}: {message}")
        }
    } else {
        match to_string(agent, value) {
            Ok(text) => text.to_std_string(),
            Err(_) => {
                agent.clear_exception();
                "uncaught exception".to_owned()
            }
        }
    }
}

/// Creates the error intrinsics: `Error.prototype` with the six subtype
/// prototypes chained to it, and the seven constructors.
pub(crate) fn initialize_error_intrinsics(agent: &mut Agent) {
    use crate::ecmascript::builtins::global_object::{define_builtin_function, define_value};

    // Error.prototype first; its own prototype is Object.prototype.
    let object_prototype = agent.intrinsics.object_prototype;
    let object_prototype = Handle::new(agent, object_prototype);
    let base_prototype =
        agent.new_object_with_tag(HeapTag::JsObject, ObjectClass::Error, object_prototype);
    agent.intrinsics.error_prototypes[ErrorKind::Error as usize] = base_prototype.value();

    let kinds = [
        ErrorKind::Error,
        ErrorKind::EvalError,
        ErrorKind::RangeError,
        ErrorKind::ReferenceError,
        ErrorKind::SyntaxError,
        ErrorKind::TypeError,
        ErrorKind::UriError,
    ];

    for kind in kinds {
        let prototype = if kind == ErrorKind::Error {
            base_prototype
        } else {
            let proto = agent
                .new_object_with_tag(HeapTag::JsObject, ObjectClass::Error, base_prototype.cast());
            agent.intrinsics.error_prototypes[kind as usize] = proto.value();
            proto
        };

        // name and message defaults on each prototype.
        let name = agent.intern_str(kind.name());
        define_value(agent, prototype, "name", name.cast(), true, false, true);
        let empty = agent.well_known(|s| s.empty);
        define_value(agent, prototype, "message", empty.cast(), true, false, true);

        // The constructor, wired to its prototype both ways.
        let behaviour = CONSTRUCTOR_BEHAVIOURS[kind as usize];
        let constructor = agent.new_builtin_constructor(behaviour, behaviour, 1);
        agent.intrinsics.error_constructors[kind as usize] = constructor.value();

        let key = agent.well_known(|s| s.prototype);
        let descriptor = PropertyDescriptor::data(prototype.cast(), false, false, false);
        ObjectData::define_own_property(agent, constructor, key, &descriptor, false)
            .expect("defining prototype on a fresh constructor cannot fail");
        let key = agent.well_known(|s| s.constructor);
        let descriptor = PropertyDescriptor::data(constructor.cast(), true, false, true);
        ObjectData::define_own_property(agent, prototype, key, &descriptor, false)
            .expect("defining constructor on a fresh prototype cannot fail");
    }

    // Error.prototype.toString is shared by every subtype.
    define_builtin_function(agent, base_prototype, "toString", error_prototype_to_string, 0);
}
