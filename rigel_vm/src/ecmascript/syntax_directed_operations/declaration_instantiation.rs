// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.5 Declaration Binding Instantiation](https://262.ecma-international.org/5.1/#sec-10.5)
//!
//! Runs once on entry to program or function code: binds the formal
//! parameters to the supplied arguments, hoists function declarations,
//! creates the arguments object, and initializes `var` declarations to
//! undefined where not already bound.

use oxc_ast::ast;

use crate::ecmascript::builtins::arguments::create_arguments_object;
use crate::ecmascript::builtins::function::{formal_parameter_names, instantiate_function_object};
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::execution::environments::{
    LexicalEnvironment, ObjectEnvironment, create_mutable_binding, has_binding,
    set_mutable_binding,
};
use crate::ecmascript::syntax_directed_operations::scope_analysis::{
    top_level_function_declarations, var_declared_names,
};
use crate::ecmascript::types::language::object::ObjectData;
use crate::ecmascript::types::spec::property_descriptor::PropertyDescriptor;
use crate::engine::value::Value;
use crate::heap::handle::Handle;
use crate::heap::header::{ErrorKind, HeapTag};

pub struct FunctionCodeKind<'a, 'b> {
    pub function: &'a ast::Function<'a>,
    pub callee: Handle<ObjectData>,
    pub args: &'b [Handle<Value>],
    pub strict: bool,
}

/// Instantiation for function code, run inside the freshly pushed
/// execution context.
pub fn instantiate_function_code(agent: &mut Agent, code: FunctionCodeKind) -> JsResult<()> {
    let FunctionCodeKind {
        function,
        callee,
        args,
        strict,
    } = code;
    // Bindings created by function-code instantiation are not deletable.
    let configurable_bindings = false;

    let var_env: Handle<LexicalEnvironment> = agent.variable_environment().cast();
    let env_rec = {
        let record = var_env.env_rec();
        Handle::new(agent, record)
    };

    // 4. For each formal parameter, in source order: create the binding on
    //    first sight and set it to the corresponding argument, undefined
    //    beyond the supplied arity.
    for (index, name) in formal_parameter_names(function).iter().enumerate() {
        let name = agent.intern_str(name);
        if !has_binding(agent, env_rec, name) {
            create_mutable_binding(agent, env_rec, name, configurable_bindings)?;
        }
        let value = args
            .get(index)
            .copied()
            .unwrap_or_else(|| Handle::new(agent, Value::UNDEFINED));
        set_mutable_binding(agent, env_rec, name, value, strict)?;
    }

    // 5. Hoist the function declarations of the body.
    if let Some(body) = &function.body {
        bind_function_declarations(
            agent,
            env_rec,
            var_env,
            &body.statements,
            strict,
            configurable_bindings,
        )?;
    }

    // 6.-7. Create the arguments object unless the code declares the name
    //       itself (as a parameter, function, or variable processed later).
    let arguments_name = agent.well_known(|s| s.arguments);
    if !has_binding(agent, env_rec, arguments_name) && !declares_arguments(function) {
        let arguments_object = create_arguments_object(agent, callee, args);
        create_mutable_binding(agent, env_rec, arguments_name, configurable_bindings)?;
        set_mutable_binding(agent, env_rec, arguments_name, arguments_object.cast(), strict)?;
    }

    // 8. Initialize every var declaration to undefined where not already
    //    bound.
    if let Some(body) = &function.body {
        bind_var_declarations(agent, env_rec, &body.statements, strict, configurable_bindings)?;
    }
    Ok(())
}

/// Instantiation for global code, run inside the global execution context.
pub fn instantiate_global_code(agent: &mut Agent, program: &ast::Program<'_>) -> JsResult<()> {
    let strict = program.directives.iter().any(|d| d.directive == "use strict");
    let configurable_bindings = false;

    let var_env: Handle<LexicalEnvironment> = agent.variable_environment().cast();
    let env_rec = {
        let record = var_env.env_rec();
        Handle::new(agent, record)
    };

    bind_function_declarations(
        agent,
        env_rec,
        var_env,
        &program.body,
        strict,
        configurable_bindings,
    )?;
    bind_var_declarations(agent, env_rec, &program.body, strict, configurable_bindings)?;
    Ok(())
}

fn bind_function_declarations(
    agent: &mut Agent,
    env_rec: Handle<Value>,
    var_env: Handle<LexicalEnvironment>,
    statements: &[ast::Statement<'_>],
    strict: bool,
    configurable_bindings: bool,
) -> JsResult<()> {
    for declaration in top_level_function_declarations(statements) {
        let Some(id) = &declaration.id else { continue };
        let name = agent.intern_str(id.name.as_str());
        // Instantiate the function closing over the variable environment,
        // then bind it, overwriting any prior binding of the same name.
        let function_object = instantiate_function_object(agent, declaration, var_env, strict);
        if !has_binding(agent, env_rec, name) {
            create_mutable_binding(agent, env_rec, name, configurable_bindings)?;
        } else if is_global_environment(agent, env_rec) {
            // 5.e At the global scope a hoisted function lands on an
            // existing property of the global object: a configurable one is
            // redefined as a plain writable, enumerable data slot, while a
            // non-configurable one that is not already such a slot aborts
            // with TypeError regardless of the code's strictness.
            let global = agent.global_object();
            if let Some(existing) = ObjectData::get_own_property(agent, global, name) {
                if existing.configurable == Some(true) {
                    let undefined = Handle::new(agent, Value::UNDEFINED);
                    let descriptor =
                        PropertyDescriptor::data(undefined, true, true, configurable_bindings);
                    ObjectData::define_own_property(agent, global, name, &descriptor, true)?;
                } else if existing.is_accessor_descriptor()
                    || existing.writable != Some(true)
                    || existing.enumerable != Some(true)
                {
                    let text = name.to_std_string();
                    return Err(agent.throw_exception(
                        ErrorKind::TypeError,
                        &format!("cannot redeclare non-configurable global property '{text}'"),
                    ));
                }
            }
        }
        set_mutable_binding(agent, env_rec, name, function_object.cast(), strict)?;
    }
    Ok(())
}

/// Whether the record is the object environment over the global object.
fn is_global_environment(agent: &Agent, env_rec: Handle<Value>) -> bool {
    if env_rec.value().tag() != HeapTag::ObjectEnvironment {
        return false;
    }
    let record: Handle<ObjectEnvironment> = env_rec.cast();
    record.binding_object() == agent.global_object
}

fn bind_var_declarations(
    agent: &mut Agent,
    env_rec: Handle<Value>,
    statements: &[ast::Statement<'_>],
    strict: bool,
    configurable_bindings: bool,
) -> JsResult<()> {
    let mut names = Vec::new();
    var_declared_names(statements, &mut names);
    for name in names {
        let name = agent.intern_str(name);
        if !has_binding(agent, env_rec, name) {
            create_mutable_binding(agent, env_rec, name, configurable_bindings)?;
            let undefined = Handle::new(agent, Value::UNDEFINED);
            set_mutable_binding(agent, env_rec, name, undefined, strict)?;
        }
    }
    Ok(())
}

/// Whether the function's own code declares `arguments` as a parameter,
/// top-level function, or var.
fn declares_arguments(function: &ast::Function<'_>) -> bool {
    if formal_parameter_names(function)
        .iter()
        .any(|name| *name == "arguments")
    {
        return true;
    }
    let Some(body) = &function.body else {
        return false;
    };
    if top_level_function_declarations(&body.statements)
        .iter()
        .any(|decl| decl.id.as_ref().is_some_and(|id| id.name == "arguments"))
    {
        return true;
    }
    let mut names = Vec::new();
    var_declared_names(&body.statements, &mut names);
    names.contains(&"arguments")
}

#[cfg(test)]
mod tests {
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    use crate::ecmascript::builtins::error::uncaught_exception_message;
    use crate::ecmascript::execution::agent::{Agent, AgentOptions};
    use crate::ecmascript::types::spec::completion::CompletionType;
    use crate::engine::interpreter::Interpreter;

    /// Runs `source` as global code, returning the completion type and the
    /// rendered completion value (the uncaught `name: message` for throws).
    fn run_global_code(source: &str) -> (CompletionType, Option<String>) {
        let allocator = Allocator::default();
        let parsed =
            Parser::new(&allocator, source, SourceType::default().with_script(true)).parse();
        assert!(parsed.errors.is_empty(), "parse errors: {:?}", parsed.errors);
        let mut agent = Agent::new(AgentOptions::test_options());
        let completion = Interpreter::new(&mut agent).execute(&parsed.program);
        let kind = completion.kind;
        let rendered = completion
            .value
            .map(|value| uncaught_exception_message(&mut agent, value));
        (kind, rendered)
    }

    #[test]
    fn hoisting_rejects_non_configurable_global_properties() {
        // NaN, Infinity and undefined are non-configurable, non-writable
        // data properties of the global object; a hoisted function cannot
        // replace them and instantiation aborts before any statement runs.
        for source in [
            "function NaN(){} NaN()",
            "function Infinity(){}",
            "var ran = true; function undefined(){}",
        ] {
            let (kind, rendered) = run_global_code(source);
            assert_eq!(kind, CompletionType::Throw, "no throw from {source:?}");
            let message = rendered.expect("throw completion carries a value");
            assert!(message.starts_with("TypeError:"), "got {message}");
        }
    }

    #[test]
    fn hoisting_redefines_configurable_global_properties() {
        // print is installed writable and configurable, so the declaration
        // replaces it with a plain data binding holding the new function.
        let (kind, rendered) =
            run_global_code("function print(){ return \"replaced\"; } print()");
        assert_eq!(kind, CompletionType::Normal);
        assert_eq!(rendered.as_deref(), Some("replaced"));
    }

    #[test]
    fn function_code_hoisting_is_not_checked_against_the_global() {
        // Inside function code the bindings live in a declarative record;
        // the global compatibility rule does not apply there.
        let (kind, rendered) =
            run_global_code("function f(){ function NaN(){ return 1; } return NaN(); } f()");
        assert_eq!(kind, CompletionType::Normal);
        assert_eq!(rendered.as_deref(), Some("1"));
    }
}
