// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [13 Function Definition](https://262.ecma-international.org/5.1/#sec-13)
//!
//! Interpreted function objects. A function carries a raw pointer to its
//! `oxc_ast` node and the lexical environment it closed over; the embedder
//! guarantees the AST arena outlives the agent. `[[Call]]` enters a fresh
//! declarative environment, runs declaration binding instantiation, and
//! evaluates the body; `[[Construct]]` allocates the new `this` first.

use core::cell::Cell;
use core::mem::size_of;
use core::ptr::NonNull;

use oxc_ast::ast;

use crate::ecmascript::abstract_operations::type_conversion::to_object;
use crate::ecmascript::execution::agent::{Agent, JsError, JsResult};
use crate::ecmascript::execution::environments::{
    self, LexicalEnvironment, create_immutable_binding, initialize_immutable_binding,
};
use crate::ecmascript::execution::execution_context::ExecutionContext;
use crate::ecmascript::syntax_directed_operations::declaration_instantiation::{
    self, FunctionCodeKind,
};
use crate::ecmascript::types::language::object::ObjectData;
use crate::ecmascript::types::spec::completion::CompletionType;
use crate::ecmascript::types::spec::property_descriptor::PropertyDescriptor;
use crate::engine::interpreter::Interpreter;
use crate::engine::value::Value;
use crate::heap::handle::{Handle, HandleScope, HeapData};
use crate::heap::header::{Header, HeapTag, ObjectClass};

/// A type-erased pointer to the function's AST node. The arena it points
/// into must outlive the agent.
#[derive(Clone, Copy)]
pub(crate) struct FunctionCode(NonNull<ast::Function<'static>>);

impl FunctionCode {
    pub(crate) fn new(function: &ast::Function<'_>) -> Self {
        // SAFETY: lifetime erasure only; validity is the embedder's AST
        // outliving the agent.
        let erased = unsafe {
            core::mem::transmute::<&ast::Function<'_>, &ast::Function<'static>>(function)
        };
        FunctionCode(NonNull::from(erased))
    }

    /// SAFETY: the caller re-binds the erased lifetime; the AST arena must
    /// still be alive.
    pub(crate) unsafe fn get<'a>(self) -> &'a ast::Function<'a> {
        unsafe { core::mem::transmute::<&ast::Function<'static>, &'a ast::Function<'a>>(self.0.as_ref()) }
    }
}

#[repr(C)]
pub struct EcmascriptFunction {
    object: ObjectData,
    code: FunctionCode,
    /// The captured [`LexicalEnvironment`].
    scope: Cell<Value>,
    strict: bool,
}

impl HeapData for EcmascriptFunction {}

impl EcmascriptFunction {
    #[inline]
    pub(crate) fn code(&self) -> FunctionCode {
        self.code
    }

    #[inline]
    pub(crate) fn scope(&self) -> Value {
        self.scope.get()
    }

    #[inline]
    pub(crate) fn is_strict(&self) -> bool {
        self.strict
    }

    pub(crate) fn scope_slot(&self) -> *mut Value {
        self.scope.as_ptr()
    }
}

/// Whether a function body's directive prologue turns strict mode on.
pub(crate) fn has_use_strict_directive(function: &ast::Function<'_>) -> bool {
    function
        .body
        .as_ref()
        .is_some_and(|body| body.directives.iter().any(|d| d.directive == "use strict"))
}

/// ### [13.2 Creating Function Objects](https://262.ecma-international.org/5.1/#sec-13.2)
pub fn instantiate_function_object(
    agent: &mut Agent,
    function: &ast::Function<'_>,
    scope: Handle<LexicalEnvironment>,
    inherited_strict: bool,
) -> Handle<ObjectData> {
    let strict = inherited_strict || has_use_strict_directive(function);

    // 1.-13. Allocate the function object: [[Class]] "Function",
    //        [[Prototype]] Function.prototype, [[Call]], [[Construct]],
    //        [[Scope]], [[Code]].
    let function_prototype: Handle<Value> = {
        let prototype = agent.intrinsics.function_prototype;
        Handle::new(agent, prototype)
    };
    let map = agent.new_property_map();
    let ptr = agent.allocate(size_of::<EcmascriptFunction>());
    // SAFETY: freshly allocated memory of the right size.
    unsafe {
        core::ptr::write(
            ptr.as_ptr() as *mut EcmascriptFunction,
            EcmascriptFunction {
                object: ObjectData::bare(
                    Header::new(HeapTag::JsFunction),
                    Cell::new(map.value()),
                    Cell::new(function_prototype.value()),
                ),
                code: FunctionCode::new(function),
                scope: Cell::new(scope.value()),
                strict,
            },
        );
    }
    let f: Handle<ObjectData> = Handle::new(agent, Value::from_ptr(ptr));
    f.set_class(ObjectClass::Function);
    f.set_extensible(true);
    f.set_callable(true);
    f.set_is_constructor(true);

    // 14.-15. The length property is the number of formal parameters.
    let length = Handle::new(agent, Value::from_u32(function.params.items.len() as u32));
    let key = agent.well_known(|s| s.length);
    let descriptor = PropertyDescriptor::data(length, false, false, false);
    ObjectData::define_own_property(agent, f, key, &descriptor, false)
        .expect("defining length on a fresh function cannot fail");

    // 16.-18. A fresh prototype object wired back through constructor.
    let proto = agent.new_plain_object();
    let key = agent.well_known(|s| s.constructor);
    let descriptor = PropertyDescriptor::data(f.cast(), true, false, true);
    ObjectData::define_own_property(agent, proto, key, &descriptor, false)
        .expect("defining constructor on a fresh object cannot fail");
    let key = agent.well_known(|s| s.prototype);
    let descriptor = PropertyDescriptor::data(proto.cast(), true, false, false);
    ObjectData::define_own_property(agent, f, key, &descriptor, false)
        .expect("defining prototype on a fresh function cannot fail");

    f
}

/// ### [13 FunctionExpression](https://262.ecma-international.org/5.1/#sec-13)
///
/// A named function expression sees its own name through an extra
/// declarative environment with an immutable binding; the name is visible
/// inside the body but not outside.
pub fn instantiate_function_expression(
    agent: &mut Agent,
    function: &ast::Function<'_>,
    current_env: Handle<LexicalEnvironment>,
    inherited_strict: bool,
) -> Handle<ObjectData> {
    let Some(id) = &function.id else {
        return instantiate_function_object(agent, function, current_env, inherited_strict);
    };
    let func_env = agent.new_declarative_environment(Some(current_env));
    let env_rec = Handle::new(agent, func_env.env_rec());
    let name = agent.intern_str(id.name.as_str());
    create_immutable_binding(agent, env_rec, name);
    let closure = instantiate_function_object(agent, function, func_env, inherited_strict);
    initialize_immutable_binding(agent, env_rec, name, closure.cast());
    closure
}

/// ### [13.2.1 \[\[Call\]\]](https://262.ecma-international.org/5.1/#sec-13.2.1)
pub fn call_ecmascript_function(
    agent: &mut Agent,
    f: Handle<EcmascriptFunction>,
    this: Handle<Value>,
    args: &[Handle<Value>],
) -> JsResult<Handle<Value>> {
    agent.enter_call()?;
    let scope = HandleScope::new(agent);
    let result = enter_and_run(agent, f, this, args);
    agent.exit_call();
    match result {
        Ok(value) => Ok(scope.escape(agent, value)),
        Err(error) => {
            drop(scope);
            Err(error)
        }
    }
}

fn enter_and_run(
    agent: &mut Agent,
    f: Handle<EcmascriptFunction>,
    this: Handle<Value>,
    args: &[Handle<Value>],
) -> JsResult<Handle<Value>> {
    // 10.4.3 Entering Function Code: establish the this binding.
    let this_value = if f.is_strict() {
        this
    } else if this.value().is_undefined() || this.value().is_null() {
        agent.global_object().cast()
    } else if !this.value().is_object() {
        to_object(agent, this)?.cast()
    } else {
        this
    };

    // A fresh declarative environment whose outer scope is the function's
    // captured scope, used as both variable and lexical environment.
    let captured: Handle<LexicalEnvironment> = {
        let scope = f.scope();
        Handle::<Value>::new(agent, scope).cast()
    };
    let local_env = agent.new_declarative_environment(Some(captured));

    agent.push_execution_context(ExecutionContext::new(
        local_env.value(),
        local_env.value(),
        this_value.value(),
    ));
    let result = run_function_body(agent, f, args);
    agent.pop_execution_context();
    result
}

fn run_function_body(
    agent: &mut Agent,
    f: Handle<EcmascriptFunction>,
    args: &[Handle<Value>],
) -> JsResult<Handle<Value>> {
    // SAFETY: the AST arena outlives the agent.
    let function = unsafe { f.code().get() };
    let strict = f.is_strict();

    // Bind parameters, hoisted functions, arguments, and vars.
    declaration_instantiation::instantiate_function_code(
        agent,
        FunctionCodeKind {
            function,
            callee: f.cast(),
            args,
            strict,
        },
    )?;

    let Some(body) = &function.body else {
        return Ok(Handle::new(agent, Value::UNDEFINED));
    };

    let completion = Interpreter::new(agent).eval_statements(&body.statements);
    match completion.kind {
        // A return completion yields its value; falling off the end yields
        // undefined.
        CompletionType::Return => {
            Ok(completion
                .value
                .unwrap_or_else(|| Handle::new(agent, Value::UNDEFINED)))
        }
        CompletionType::Normal => Ok(Handle::new(agent, Value::UNDEFINED)),
        CompletionType::Throw => {
            let value = completion.value.expect("throw completion carries a value");
            agent.throw_value(value);
            Err(JsError)
        }
        // Stray break/continue cannot cross a function boundary; the
        // evaluator raises SyntaxError before producing one here.
        CompletionType::Break | CompletionType::Continue => {
            Ok(Handle::new(agent, Value::UNDEFINED))
        }
    }
}

/// ### [13.2.2 \[\[Construct\]\]](https://262.ecma-international.org/5.1/#sec-13.2.2)
pub fn construct_ecmascript_function(
    agent: &mut Agent,
    f: Handle<EcmascriptFunction>,
    args: &[Handle<Value>],
) -> JsResult<Handle<ObjectData>> {
    // 1.-4. Allocate the new object; its prototype is the function's
    //       prototype property when that is an object, else
    //       Object.prototype.
    let key = agent.well_known(|s| s.prototype);
    let proto = ObjectData::get(agent, f.cast(), key)?;
    let proto = if proto.value().is_object() {
        proto
    } else {
        let object_prototype = agent.intrinsics.object_prototype;
        Handle::new(agent, object_prototype)
    };
    let obj = agent.new_object_with_prototype(proto);

    // 5.-7. Invoke [[Call]] with the new object as this; an object result
    //       wins, otherwise the freshly allocated one is returned.
    let result = call_ecmascript_function(agent, f, obj.cast(), args)?;
    if result.value().is_object() {
        Ok(result.cast())
    } else {
        Ok(obj)
    }
}

/// The identifier list of the formal parameters.
pub(crate) fn formal_parameter_names<'a>(function: &'a ast::Function<'a>) -> Vec<&'a str> {
    function
        .params
        .items
        .iter()
        .filter_map(|param| match &param.pattern.kind {
            ast::BindingPatternKind::BindingIdentifier(id) => Some(id.name.as_str()),
            // Destructuring patterns are not part of the supported grammar.
            _ => None,
        })
        .collect()
}

// The Function intrinsic objects.

/// The behaviour of `Function.prototype` itself: accept any arguments and
/// return undefined.
pub(crate) fn function_prototype_behaviour(
    _info: &mut crate::ecmascript::builtins::builtin_function::RuntimeCallInfo,
) -> JsResult<Value> {
    Ok(Value::UNDEFINED)
}

/// ### [15.3.2 The Function Constructor](https://262.ecma-international.org/5.1/#sec-15.3.2)
///
/// Dynamic code evaluation is unsupported, together with `eval`.
fn function_constructor(
    info: &mut crate::ecmascript::builtins::builtin_function::RuntimeCallInfo,
) -> JsResult<Value> {
    Err(info.agent().throw_exception(
        crate::heap::header::ErrorKind::TypeError,
        "dynamic code evaluation is not supported",
    ))
}

/// ### [15.3.4.2 Function.prototype.toString ( )](https://262.ecma-international.org/5.1/#sec-15.3.4.2)
fn function_prototype_to_string(
    info: &mut crate::ecmascript::builtins::builtin_function::RuntimeCallInfo,
) -> JsResult<Value> {
    let this = info.this_value();
    let agent = info.agent();
    if !this.value().is_callable() {
        return Err(agent.throw_exception(
            crate::heap::header::ErrorKind::TypeError,
            "Function.prototype.toString called on non-function",
        ));
    }
    Ok(agent.new_string("function () { [native code] }").value())
}

/// ### [15.3.4.4 Function.prototype.call ( thisArg \[ , arg1 \[ , … \] \] )](https://262.ecma-international.org/5.1/#sec-15.3.4.4)
fn function_prototype_call(
    info: &mut crate::ecmascript::builtins::builtin_function::RuntimeCallInfo,
) -> JsResult<Value> {
    let this = info.this_value();
    let this_arg = info.arg(0);
    let args: Vec<Handle<Value>> = (1..info.args_count()).map(|i| info.arg(i)).collect();
    let agent = info.agent();
    if !this.value().is_callable() {
        return Err(agent.throw_exception(
            crate::heap::header::ErrorKind::TypeError,
            "Function.prototype.call called on non-function",
        ));
    }
    let result = ObjectData::call(agent, this.cast(), this_arg, &args)?;
    Ok(result.value())
}

/// ### [15.3.4.3 Function.prototype.apply ( thisArg, argArray )](https://262.ecma-international.org/5.1/#sec-15.3.4.3)
fn function_prototype_apply(
    info: &mut crate::ecmascript::builtins::builtin_function::RuntimeCallInfo,
) -> JsResult<Value> {
    use crate::ecmascript::abstract_operations::type_conversion::{f64_to_uint32, to_number};
    use crate::heap::header::ErrorKind;

    let this = info.this_value();
    let this_arg = info.arg(0);
    let arg_array = info.arg(1);
    let agent = info.agent();
    if !this.value().is_callable() {
        return Err(agent.throw_exception(
            ErrorKind::TypeError,
            "Function.prototype.apply called on non-function",
        ));
    }

    // 2. With no argument array, call with an empty list.
    let args: Vec<Handle<Value>> = if arg_array.value().is_undefined()
        || arg_array.value().is_null()
    {
        Vec::new()
    } else if arg_array.value().is_object() {
        // 3.-8. Read length, then the indexed properties in order.
        let array: Handle<ObjectData> = arg_array.cast();
        let key = agent.well_known(|s| s.length);
        let length = ObjectData::get(agent, array, key)?;
        let length = f64_to_uint32(to_number(agent, length)?);
        let mut collected = Vec::with_capacity(length as usize);
        for index in 0..length {
            let key = agent.intern_str(&index.to_string());
            collected.push(ObjectData::get(agent, array, key)?);
        }
        collected
    } else {
        return Err(agent.throw_exception(
            ErrorKind::TypeError,
            "Function.prototype.apply: arguments must be an array-like object",
        ));
    };

    let result = ObjectData::call(agent, this.cast(), this_arg, &args)?;
    Ok(result.value())
}

/// Builds the `Function` constructor and the prototype's methods; the
/// prototype object itself is created earlier in the bootstrap because every
/// built-in function links to it.
pub(crate) fn initialize_function_intrinsics(agent: &mut Agent) {
    use crate::ecmascript::builtins::global_object::{define_builtin_function, define_value};

    let prototype: Handle<ObjectData> = {
        let prototype = agent.intrinsics.function_prototype;
        Handle::<Value>::new(agent, prototype).cast()
    };
    let constructor =
        agent.new_builtin_constructor(function_constructor, function_constructor, 1);
    agent.intrinsics.function_constructor = constructor.value();

    define_value(agent, constructor, "prototype", prototype.cast(), false, false, false);
    define_value(agent, prototype, "constructor", constructor.cast(), true, false, true);

    define_builtin_function(agent, prototype, "toString", function_prototype_to_string, 0);
    define_builtin_function(agent, prototype, "call", function_prototype_call, 1);
    define_builtin_function(agent, prototype, "apply", function_prototype_apply, 2);
}
