// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The tree-walking evaluator.
//!
//! Statements evaluate to [`Completion`] records; expressions evaluate to a
//! value or a not-yet-resolved [`Reference`]. Abrupt completions short-
//! circuit statement lists and unwind to the construct that consumes them:
//! `break`/`continue` to their loop or labelled statement, `return` to the
//! calling function, `throw` to the nearest `try`. Expression-level failures
//! travel through the agent's pending-exception slot as [`JsError`] and are
//! bridged into throw completions at statement granularity.

use oxc_ast::ast::{self, Expression, Statement};
use oxc_syntax::operator::{
    AssignmentOperator, BinaryOperator, LogicalOperator, UnaryOperator, UpdateOperator,
};

use crate::ecmascript::abstract_operations::testing_and_comparison::{
    abstract_equality, abstract_relational, strict_equality,
};
use crate::ecmascript::abstract_operations::type_conversion::{
    check_object_coercible, f64_to_js_string, to_boolean, to_int32, to_number, to_object,
    to_property_key, to_primitive, to_string, to_uint32,
};
use crate::ecmascript::builtins::function::instantiate_function_expression;
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::execution::environments::{
    self, LexicalEnvironment, get_identifier_reference,
};
use crate::ecmascript::execution::execution_context::ExecutionContext;
use crate::ecmascript::syntax_directed_operations::declaration_instantiation::instantiate_global_code;
use crate::ecmascript::types::language::object::ObjectData;
use crate::ecmascript::types::language::string::HeapString;
use crate::ecmascript::types::spec::completion::{Completion, CompletionType};
use crate::ecmascript::types::spec::property_descriptor::PropertyDescriptor;
use crate::ecmascript::types::spec::reference::{
    Reference, ReferenceBase, ValueOrReference, get_value, put_value,
};
use crate::engine::value::Value;
use crate::heap::handle::{Handle, HandleScope};
use crate::heap::header::ErrorKind;

/// Bridges an expression-level `JsResult` into a throw completion.
macro_rules! try_or_throw {
    ($self:expr, $expression:expr) => {
        match $expression {
            Ok(value) => value,
            Err(_) => return $self.throw_completion(),
        }
    };
}

pub struct Interpreter<'agent> {
    agent: &'agent mut Agent,
    /// Labels of the labelled statements directly wrapping the statement
    /// under evaluation; consumed by the next iteration or switch statement.
    pending_labels: Vec<String>,
}

impl<'agent> Interpreter<'agent> {
    pub fn new(agent: &'agent mut Agent) -> Self {
        Interpreter {
            agent,
            pending_labels: Vec::new(),
        }
    }

    /// ### [14 Program](https://262.ecma-international.org/5.1/#sec-14)
    ///
    /// Evaluates a parsed program as global code. The completion carries the
    /// last observed statement value, REPL style. The AST must outlive the
    /// agent's heap, as function objects keep pointers into it.
    pub fn execute<'a>(&mut self, program: &'a ast::Program<'a>) -> Completion<'a> {
        // 10.4.1 Entering global code: the global environment is both the
        // variable and lexical environment, and this is the global object.
        let global_env = self.agent.global_env;
        let global_object = self.agent.global_object;
        self.agent.push_execution_context(ExecutionContext::new(
            global_env,
            global_env,
            global_object,
        ));

        // Declaration binding instantiation for the global code.
        let completion = match instantiate_global_code(self.agent, program) {
            Ok(()) => self.eval_statements(&program.body),
            Err(_) => self.throw_completion(),
        };

        self.agent.pop_execution_context();
        completion
    }

    // Statement evaluation.

    /// Folds a statement list left to right: abrupt completions stop the
    /// walk, and the list's value is the last non-empty statement value.
    pub(crate) fn eval_statements<'a>(&mut self, statements: &'a [Statement<'a>]) -> Completion<'a> {
        let mut list_value: Option<Handle<Value>> = None;
        for statement in statements {
            let scope = HandleScope::new(self.agent);
            let completion = self.eval_statement(statement);
            let completion = self.escape_completion(scope, completion);
            if completion.value.is_some() {
                list_value = completion.value;
            }
            if completion.is_abrupt() {
                return Completion {
                    kind: completion.kind,
                    value: completion.value.or(list_value),
                    target: completion.target,
                };
            }
        }
        Completion {
            kind: CompletionType::Normal,
            value: list_value,
            target: None,
        }
    }

    fn eval_statement<'a>(&mut self, statement: &'a Statement<'a>) -> Completion<'a> {
        // A label attaches only to the statement written directly after it.
        match statement {
            Statement::LabeledStatement(_)
            | Statement::DoWhileStatement(_)
            | Statement::WhileStatement(_)
            | Statement::ForStatement(_)
            | Statement::ForInStatement(_)
            | Statement::SwitchStatement(_) => {}
            _ => self.pending_labels.clear(),
        }

        match statement {
            Statement::BlockStatement(block) => self.eval_statements(&block.body),
            Statement::VariableDeclaration(declaration) => {
                self.eval_variable_declaration(declaration)
            }
            Statement::EmptyStatement(_) => Completion::normal_empty(),
            Statement::ExpressionStatement(statement) => {
                // 12.4: the statement's value is GetValue of the expression.
                let value = try_or_throw!(self, self.eval_expression_to_value(&statement.expression));
                Completion::normal(value)
            }
            Statement::IfStatement(statement) => self.eval_if_statement(statement),
            Statement::DoWhileStatement(statement) => self.eval_do_while_statement(statement),
            Statement::WhileStatement(statement) => self.eval_while_statement(statement),
            Statement::ForStatement(statement) => self.eval_for_statement(statement),
            Statement::ForInStatement(statement) => self.eval_for_in_statement(statement),
            Statement::ContinueStatement(statement) => {
                self.eval_continue_statement(statement.label.as_ref())
            }
            Statement::BreakStatement(statement) => {
                self.eval_break_statement(statement.label.as_ref())
            }
            Statement::ReturnStatement(statement) => self.eval_return_statement(statement),
            Statement::WithStatement(statement) => self.eval_with_statement(statement),
            Statement::SwitchStatement(statement) => self.eval_switch_statement(statement),
            Statement::LabeledStatement(statement) => self.eval_labelled_statement(statement),
            Statement::ThrowStatement(statement) => {
                let value = try_or_throw!(self, self.eval_expression_to_value(&statement.argument));
                Completion::throw(value)
            }
            Statement::TryStatement(statement) => self.eval_try_statement(statement),
            // 12.15: the debugger statement has no observable effect here.
            Statement::DebuggerStatement(_) => Completion::normal_empty(),
            // Hoisting already instantiated the declaration.
            Statement::FunctionDeclaration(_) => Completion::normal_empty(),
            _ => self.syntax_error_completion("unsupported statement"),
        }
    }

    /// ### [12.2 Variable Statement](https://262.ecma-international.org/5.1/#sec-12.2)
    fn eval_variable_declaration<'a>(
        &mut self,
        declaration: &'a ast::VariableDeclaration<'a>,
    ) -> Completion<'a> {
        for declarator in &declaration.declarations {
            let ast::BindingPatternKind::BindingIdentifier(id) = &declarator.id.kind else {
                return self.syntax_error_completion("unsupported binding pattern");
            };
            let Some(init) = &declarator.init else {
                continue;
            };
            // The binding already exists (declaration binding
            // instantiation); this is the initializer assignment.
            let target = self.resolve_identifier(id.name.as_str());
            let value = try_or_throw!(self, self.eval_expression_to_value(init));
            try_or_throw!(
                self,
                put_value(self.agent, &ValueOrReference::Reference(target), value)
            );
        }
        Completion::normal_empty()
    }

    /// ### [12.5 The if Statement](https://262.ecma-international.org/5.1/#sec-12.5)
    fn eval_if_statement<'a>(&mut self, statement: &'a ast::IfStatement<'a>) -> Completion<'a> {
        let test = try_or_throw!(self, self.eval_expression_to_value(&statement.test));
        if to_boolean(test.value()) {
            self.eval_statement(&statement.consequent)
        } else if let Some(alternate) = &statement.alternate {
            self.eval_statement(alternate)
        } else {
            Completion::normal_empty()
        }
    }

    /// ### [12.6.1 The do-while Statement](https://262.ecma-international.org/5.1/#sec-12.6.1)
    fn eval_do_while_statement<'a>(
        &mut self,
        statement: &'a ast::DoWhileStatement<'a>,
    ) -> Completion<'a> {
        let labels = self.enter_iteration();
        let value_slot = Handle::new(self.agent, Value::HOLE);
        let completion = loop {
            if let Some(completion) = self.run_loop_body(&statement.body, &labels, value_slot) {
                break completion;
            }
            match self.eval_test_scoped(&statement.test) {
                Ok(true) => {}
                Ok(false) => break self.loop_value_completion(value_slot),
                Err(_) => break self.throw_completion(),
            }
        };
        self.exit_iteration();
        completion
    }

    /// ### [12.6.2 The while Statement](https://262.ecma-international.org/5.1/#sec-12.6.2)
    fn eval_while_statement<'a>(
        &mut self,
        statement: &'a ast::WhileStatement<'a>,
    ) -> Completion<'a> {
        let labels = self.enter_iteration();
        let value_slot = Handle::new(self.agent, Value::HOLE);
        let completion = loop {
            match self.eval_test_scoped(&statement.test) {
                Ok(true) => {}
                Ok(false) => break self.loop_value_completion(value_slot),
                Err(_) => break self.throw_completion(),
            }
            if let Some(completion) = self.run_loop_body(&statement.body, &labels, value_slot) {
                break completion;
            }
        };
        self.exit_iteration();
        completion
    }

    /// ### [12.6.3 The for Statement](https://262.ecma-international.org/5.1/#sec-12.6.3)
    fn eval_for_statement<'a>(&mut self, statement: &'a ast::ForStatement<'a>) -> Completion<'a> {
        let labels = self.enter_iteration();

        // The init clause runs once, for its effect only.
        if let Some(init) = &statement.init {
            match init {
                ast::ForStatementInit::VariableDeclaration(declaration) => {
                    let completion = self.eval_variable_declaration(declaration);
                    if completion.is_abrupt() {
                        self.exit_iteration();
                        return completion;
                    }
                }
                _ => {
                    let expression = init.as_expression().expect("non-declaration for-init");
                    if self.eval_expression_to_value(expression).is_err() {
                        self.exit_iteration();
                        return self.throw_completion();
                    }
                }
            }
        }

        let value_slot = Handle::new(self.agent, Value::HOLE);
        let completion = loop {
            if let Some(test) = &statement.test {
                match self.eval_test_scoped(test) {
                    Ok(true) => {}
                    Ok(false) => break self.loop_value_completion(value_slot),
                    Err(_) => break self.throw_completion(),
                }
            }
            if let Some(completion) = self.run_loop_body(&statement.body, &labels, value_slot) {
                break completion;
            }
            if let Some(update) = &statement.update {
                if self.eval_effect_scoped(update).is_err() {
                    break self.throw_completion();
                }
            }
        };
        self.exit_iteration();
        completion
    }

    /// ### [12.6.4 The for-in Statement](https://262.ecma-international.org/5.1/#sec-12.6.4)
    fn eval_for_in_statement<'a>(
        &mut self,
        statement: &'a ast::ForInStatement<'a>,
    ) -> Completion<'a> {
        // A for (var x = init in o) form runs the declaration first.
        if let ast::ForStatementLeft::VariableDeclaration(declaration) = &statement.left {
            let completion = self.eval_variable_declaration(declaration);
            if completion.is_abrupt() {
                return completion;
            }
        }

        // 2.-3. Evaluate the operand; undefined and null enumerate nothing.
        let object = try_or_throw!(self, self.eval_expression_to_value(&statement.right));
        if object.value().is_undefined() || object.value().is_null() {
            return Completion::normal_empty();
        }
        let object = try_or_throw!(self, to_object(self.agent, object));

        // Snapshot the enumerable keys, with shadowing applied across the
        // prototype chain.
        let keys = self.enumeration_keys(object);

        let labels = self.enter_iteration();
        let value_slot = Handle::new(self.agent, Value::HOLE);
        let mut completion = self.loop_value_completion(value_slot);
        for key in keys {
            // A property deleted during iteration is skipped.
            if !ObjectData::has_property(self.agent, object, key) {
                continue;
            }
            // Assign the key to the left-hand side, which may be any
            // reference expression.
            let target = match self.eval_for_in_target(&statement.left) {
                Ok(target) => target,
                Err(_) => {
                    completion = self.throw_completion();
                    break;
                }
            };
            if put_value(self.agent, &target, key.cast()).is_err() {
                completion = self.throw_completion();
                break;
            }

            if let Some(abrupt) = self.run_loop_body(&statement.body, &labels, value_slot) {
                completion = abrupt;
                break;
            }
            completion = self.loop_value_completion(value_slot);
        }
        self.exit_iteration();
        completion
    }

    /// The left-hand side of a `for-in`, re-evaluated each round.
    fn eval_for_in_target<'a>(
        &mut self,
        left: &'a ast::ForStatementLeft<'a>,
    ) -> JsResult<ValueOrReference> {
        match left {
            ast::ForStatementLeft::VariableDeclaration(declaration) => {
                let declarator = declaration
                    .declarations
                    .first()
                    .expect("for-in declaration has one declarator");
                let ast::BindingPatternKind::BindingIdentifier(id) = &declarator.id.kind else {
                    return Err(self
                        .agent
                        .throw_exception(ErrorKind::SyntaxError, "unsupported binding pattern"));
                };
                Ok(ValueOrReference::Reference(
                    self.resolve_identifier(id.name.as_str()),
                ))
            }
            ast::ForStatementLeft::AssignmentTargetIdentifier(id) => Ok(
                ValueOrReference::Reference(self.resolve_identifier(id.name.as_str())),
            ),
            ast::ForStatementLeft::StaticMemberExpression(member) => {
                self.member_reference_static(&member.object, &member.property)
            }
            ast::ForStatementLeft::ComputedMemberExpression(member) => {
                self.member_reference_computed(&member.object, &member.expression)
            }
            _ => Err(self
                .agent
                .throw_exception(ErrorKind::SyntaxError, "unsupported for-in target")),
        }
    }

    /// The enumerable key snapshot: own keys first, then up the prototype
    /// chain, skipping every name already seen (enumerable or not).
    fn enumeration_keys(&mut self, object: Handle<ObjectData>) -> Vec<Handle<HeapString>> {
        let mut keys = Vec::new();
        let mut seen: Vec<String> = Vec::new();
        let mut current = object;
        loop {
            let entries = ObjectData::own_property_entries(self.agent, current);
            for (key, enumerable) in entries {
                let name = key.to_std_string();
                if seen.iter().any(|existing| *existing == name) {
                    continue;
                }
                seen.push(name);
                if enumerable {
                    keys.push(key);
                }
            }
            let proto = current.prototype();
            if proto.is_null() {
                break;
            }
            current = Handle::<Value>::new(self.agent, proto).cast();
        }
        keys
    }

    /// ### [12.7 The continue Statement](https://262.ecma-international.org/5.1/#sec-12.7)
    fn eval_continue_statement<'a>(
        &mut self,
        label: Option<&'a ast::LabelIdentifier<'a>>,
    ) -> Completion<'a> {
        let context = self.agent.running_execution_context();
        match label {
            None => {
                if context.iteration_depth == 0 {
                    return self.syntax_error_completion("continue outside of iteration");
                }
                Completion::continue_with(None)
            }
            Some(label) => {
                if !context.has_label(label.name.as_str()) {
                    return self.syntax_error_completion("continue target is not a visible label");
                }
                Completion::continue_with(Some(label.name.as_str()))
            }
        }
    }

    /// ### [12.8 The break Statement](https://262.ecma-international.org/5.1/#sec-12.8)
    fn eval_break_statement<'a>(
        &mut self,
        label: Option<&'a ast::LabelIdentifier<'a>>,
    ) -> Completion<'a> {
        let context = self.agent.running_execution_context();
        match label {
            None => {
                if context.iteration_depth == 0 && context.switch_depth == 0 {
                    return self.syntax_error_completion("break outside of iteration or switch");
                }
                Completion::break_with(None)
            }
            Some(label) => {
                if !context.has_label(label.name.as_str()) {
                    return self.syntax_error_completion("break target is not a visible label");
                }
                Completion::break_with(Some(label.name.as_str()))
            }
        }
    }

    /// ### [12.9 The return Statement](https://262.ecma-international.org/5.1/#sec-12.9)
    fn eval_return_statement<'a>(
        &mut self,
        statement: &'a ast::ReturnStatement<'a>,
    ) -> Completion<'a> {
        let value = match &statement.argument {
            Some(argument) => try_or_throw!(self, self.eval_expression_to_value(argument)),
            None => Handle::new(self.agent, Value::UNDEFINED),
        };
        Completion::return_value(value)
    }

    /// ### [12.10 The with Statement](https://262.ecma-international.org/5.1/#sec-12.10)
    fn eval_with_statement<'a>(&mut self, statement: &'a ast::WithStatement<'a>) -> Completion<'a> {
        let object = try_or_throw!(self, self.eval_expression_to_value(&statement.object));
        let object = try_or_throw!(self, to_object(self.agent, object));

        // An object environment over the operand becomes the lexical
        // environment for the body.
        // The saved environment must stay rooted across the body; the body
        // may collect.
        let saved = self.agent.lexical_environment();
        let outer = self.current_lexical_environment();
        let with_env = self
            .agent
            .new_object_environment(object, false, Some(outer));
        self.agent.running_execution_context().lexical_environment = with_env.value();

        let completion = self.eval_statement(&statement.body);

        self.agent.running_execution_context().lexical_environment = saved.value();
        completion
    }

    /// ### [12.11 The switch Statement](https://262.ecma-international.org/5.1/#sec-12.11)
    fn eval_switch_statement<'a>(
        &mut self,
        statement: &'a ast::SwitchStatement<'a>,
    ) -> Completion<'a> {
        let labels = std::mem::take(&mut self.pending_labels);
        let discriminant =
            try_or_throw!(self, self.eval_expression_to_value(&statement.discriminant));
        self.agent.running_execution_context().switch_depth += 1;
        let completion = self.run_case_block(statement, discriminant, &labels);
        self.agent.running_execution_context().switch_depth -= 1;
        completion
    }

    fn run_case_block<'a>(
        &mut self,
        statement: &'a ast::SwitchStatement<'a>,
        discriminant: Handle<Value>,
        labels: &[String],
    ) -> Completion<'a> {
        // Find the entry clause: the first case whose test strictly equals
        // the discriminant, else the default clause.
        let mut start: Option<usize> = None;
        for (index, case) in statement.cases.iter().enumerate() {
            let Some(test) = &case.test else {
                continue;
            };
            let test_value = match self.eval_expression_to_value(test) {
                Ok(value) => value,
                Err(_) => return self.throw_completion(),
            };
            if strict_equality(discriminant.value(), test_value.value()) {
                start = Some(index);
                break;
            }
        }
        let start = start.or_else(|| statement.cases.iter().position(|case| case.test.is_none()));
        let Some(start) = start else {
            return Completion::normal_empty();
        };

        // Execute from the matched clause through the following ones (fall
        // through) until a break aimed at this switch.
        let mut list_value: Option<Handle<Value>> = None;
        for case in &statement.cases[start..] {
            let completion = self.eval_statements(&case.consequent);
            if completion.value.is_some() {
                list_value = completion.value;
            }
            if completion.is_abrupt() {
                let target_matches = completion
                    .target
                    .is_none_or(|target| labels.iter().any(|label| label == target));
                if completion.kind == CompletionType::Break && target_matches {
                    return Completion {
                        kind: CompletionType::Normal,
                        value: completion.value.or(list_value),
                        target: None,
                    };
                }
                return Completion {
                    kind: completion.kind,
                    value: completion.value.or(list_value),
                    target: completion.target,
                };
            }
        }
        Completion {
            kind: CompletionType::Normal,
            value: list_value,
            target: None,
        }
    }

    /// ### [12.12 Labelled Statements](https://262.ecma-international.org/5.1/#sec-12.12)
    fn eval_labelled_statement<'a>(
        &mut self,
        statement: &'a ast::LabeledStatement<'a>,
    ) -> Completion<'a> {
        let label = statement.label.name.as_str();
        self.agent.running_execution_context().add_label(label);
        self.pending_labels.push(label.to_owned());

        let completion = self.eval_statement(&statement.body);

        self.agent.running_execution_context().remove_label(label);
        self.pending_labels.retain(|pending| pending != label);

        // A break aimed at this label lands here as a normal completion.
        if completion.kind == CompletionType::Break && completion.target == Some(label) {
            return Completion {
                kind: CompletionType::Normal,
                value: completion.value,
                target: None,
            };
        }
        completion
    }

    /// ### [12.14 The try Statement](https://262.ecma-international.org/5.1/#sec-12.14)
    fn eval_try_statement<'a>(&mut self, statement: &'a ast::TryStatement<'a>) -> Completion<'a> {
        let block_completion = self.eval_statements(&statement.block.body);

        let mut result = block_completion;
        if result.kind == CompletionType::Throw {
            if let Some(handler) = &statement.handler {
                let thrown = result.value.expect("throw completion carries a value");
                result = self.eval_catch_clause(handler, thrown);
            }
        }

        // The finally block always runs; its completion supersedes only
        // when itself abrupt.
        if let Some(finalizer) = &statement.finalizer {
            let finally_completion = self.eval_statements(&finalizer.body);
            if finally_completion.is_abrupt() {
                return finally_completion;
            }
        }
        result
    }

    fn eval_catch_clause<'a>(
        &mut self,
        clause: &'a ast::CatchClause<'a>,
        thrown: Handle<Value>,
    ) -> Completion<'a> {
        // 12.14: the catch parameter lives in a fresh declarative
        // environment that wraps the current one for the catch body only.
        let outer = self.current_lexical_environment();
        let catch_env = self.agent.new_declarative_environment(Some(outer));

        if let Some(param) = &clause.param {
            let ast::BindingPatternKind::BindingIdentifier(id) = &param.pattern.kind else {
                return self.syntax_error_completion("unsupported binding pattern");
            };
            let env_rec = {
                let record = catch_env.env_rec();
                Handle::new(self.agent, record)
            };
            let name = self.agent.intern_str(id.name.as_str());
            if environments::create_mutable_binding(self.agent, env_rec, name, false).is_err() {
                return self.throw_completion();
            }
            if environments::set_mutable_binding(self.agent, env_rec, name, thrown, false).is_err()
            {
                return self.throw_completion();
            }
        }

        let saved = self.agent.lexical_environment();
        self.agent.running_execution_context().lexical_environment = catch_env.value();
        let completion = self.eval_statements(&clause.body.body);
        self.agent.running_execution_context().lexical_environment = saved.value();
        completion
    }

    // Loop plumbing.

    /// Evaluates a loop test under its own handle scope, reducing it to a
    /// host boolean so nothing accumulates across iterations.
    fn eval_test_scoped<'a>(&mut self, expression: &'a Expression<'a>) -> JsResult<bool> {
        let scope = HandleScope::new(self.agent);
        let result = self
            .eval_expression_to_value(expression)
            .map(|value| to_boolean(value.value()));
        drop(scope);
        result
    }

    /// Evaluates an expression for effect only, under its own handle scope.
    fn eval_effect_scoped<'a>(&mut self, expression: &'a Expression<'a>) -> JsResult<()> {
        let scope = HandleScope::new(self.agent);
        let result = self.eval_expression_to_value(expression).map(|_| ());
        drop(scope);
        result
    }

    fn enter_iteration(&mut self) -> Vec<String> {
        let labels = std::mem::take(&mut self.pending_labels);
        self.agent.running_execution_context().iteration_depth += 1;
        labels
    }

    fn exit_iteration(&mut self) {
        self.agent.running_execution_context().iteration_depth -= 1;
    }

    /// Runs one loop-body iteration under its own handle scope, folding the
    /// body's value into `value_slot`. Returns the loop's overall completion
    /// when the body completion terminates it, `None` to keep iterating.
    fn run_loop_body<'a>(
        &mut self,
        body: &'a Statement<'a>,
        labels: &[String],
        value_slot: Handle<Value>,
    ) -> Option<Completion<'a>> {
        let scope = HandleScope::new(self.agent);
        let completion = self.eval_statement(body);
        let raw_value = completion.value.map(|handle| handle.value());
        let kind = completion.kind;
        let target = completion.target;
        drop(scope);
        if let Some(raw) = raw_value {
            value_slot.set(raw);
        }

        let target_matches =
            |target: Option<&str>| target.is_none_or(|label| labels.iter().any(|l| l == label));

        match kind {
            CompletionType::Normal => None,
            // A continue aimed at this loop starts the next iteration.
            CompletionType::Continue if target_matches(target) => None,
            // A break aimed at this loop ends it normally with V.
            CompletionType::Break if target_matches(target) => {
                Some(self.loop_value_completion(value_slot))
            }
            // Everything else propagates, carrying V when the body produced
            // a value.
            _ => Some(Completion {
                kind,
                value: if raw_value.is_some() {
                    Some(value_slot)
                } else {
                    None
                },
                target,
            }),
        }
    }

    fn loop_value_completion<'a>(&mut self, value_slot: Handle<Value>) -> Completion<'a> {
        if value_slot.value().is_hole() {
            Completion::normal_empty()
        } else {
            Completion::normal(value_slot)
        }
    }

    // Expression evaluation.

    fn eval_expression<'a>(&mut self, expression: &'a Expression<'a>) -> JsResult<ValueOrReference> {
        match expression {
            Expression::NullLiteral(_) => Ok(self.value_result(Value::NULL)),
            Expression::BooleanLiteral(literal) => {
                Ok(self.value_result(Value::from_bool(literal.value)))
            }
            Expression::NumericLiteral(literal) => {
                Ok(self.value_result(Value::from_number(literal.value)))
            }
            Expression::StringLiteral(literal) => {
                let string = self.agent.intern_str(literal.value.as_str());
                Ok(ValueOrReference::Value(string.cast()))
            }
            Expression::Identifier(id) => Ok(ValueOrReference::Reference(
                self.resolve_identifier(id.name.as_str()),
            )),
            Expression::ThisExpression(_) => {
                Ok(ValueOrReference::Value(self.agent.this_binding()))
            }
            Expression::ParenthesizedExpression(inner) => self.eval_expression(&inner.expression),
            Expression::ArrayExpression(literal) => self.eval_array_literal(literal),
            Expression::ObjectExpression(literal) => self.eval_object_literal(literal),
            Expression::FunctionExpression(function) => {
                let env = self.current_lexical_environment();
                let closure = instantiate_function_expression(self.agent, function, env, false);
                Ok(ValueOrReference::Value(closure.cast()))
            }
            Expression::SequenceExpression(sequence) => {
                // 11.14: evaluate and discard all but the last operand.
                let mut result = Handle::new(self.agent, Value::UNDEFINED);
                for expression in &sequence.expressions {
                    result = self.eval_expression_to_value(expression)?;
                }
                Ok(ValueOrReference::Value(result))
            }
            Expression::AssignmentExpression(assignment) => {
                self.eval_assignment_expression(assignment)
            }
            Expression::ConditionalExpression(conditional) => {
                // 11.12: only the taken branch is evaluated.
                let test = self.eval_expression_to_value(&conditional.test)?;
                let branch = if to_boolean(test.value()) {
                    &conditional.consequent
                } else {
                    &conditional.alternate
                };
                Ok(ValueOrReference::Value(self.eval_expression_to_value(branch)?))
            }
            Expression::LogicalExpression(logical) => self.eval_logical_expression(logical),
            Expression::BinaryExpression(binary) => {
                let left = self.eval_expression_to_value(&binary.left)?;
                let right = self.eval_expression_to_value(&binary.right)?;
                let result = self.apply_binary_operator(binary.operator, left, right)?;
                Ok(ValueOrReference::Value(result))
            }
            Expression::UnaryExpression(unary) => self.eval_unary_expression(unary),
            Expression::UpdateExpression(update) => self.eval_update_expression(update),
            Expression::StaticMemberExpression(member) => {
                self.member_reference_static(&member.object, &member.property)
            }
            Expression::ComputedMemberExpression(member) => {
                self.member_reference_computed(&member.object, &member.expression)
            }
            Expression::CallExpression(call) => self.eval_call_expression(call),
            Expression::NewExpression(new) => self.eval_new_expression(new),
            _ => Err(self
                .agent
                .throw_exception(ErrorKind::SyntaxError, "unsupported expression")),
        }
    }

    fn eval_expression_to_value<'a>(
        &mut self,
        expression: &'a Expression<'a>,
    ) -> JsResult<Handle<Value>> {
        let result = self.eval_expression(expression)?;
        get_value(self.agent, &result)
    }

    fn value_result(&mut self, value: Value) -> ValueOrReference {
        ValueOrReference::Value(Handle::new(self.agent, value))
    }

    /// ### [11.1.4 Array Initialiser](https://262.ecma-international.org/5.1/#sec-11.1.4)
    fn eval_array_literal<'a>(
        &mut self,
        literal: &'a ast::ArrayExpression<'a>,
    ) -> JsResult<ValueOrReference> {
        let array = crate::ecmascript::builtins::array::new_array(self.agent, 0);
        let mut index: u32 = 0;
        for element in &literal.elements {
            match element {
                // An elision advances the index without defining a slot.
                ast::ArrayExpressionElement::Elision(_) => {
                    index += 1;
                }
                ast::ArrayExpressionElement::SpreadElement(_) => {
                    return Err(self
                        .agent
                        .throw_exception(ErrorKind::SyntaxError, "unsupported spread element"));
                }
                _ => {
                    let expression = element.as_expression().expect("array element expression");
                    let value = self.eval_expression_to_value(expression)?;
                    let key = self.agent.intern_str(&index.to_string());
                    let descriptor = PropertyDescriptor::data(value, true, true, true);
                    ObjectData::define_own_property(self.agent, array, key, &descriptor, false)?;
                    index += 1;
                }
            }
        }
        // Trailing elisions still extend the length.
        let key = self.agent.well_known(|s| s.length);
        let length = Handle::new(self.agent, Value::from_u32(index));
        let descriptor = PropertyDescriptor {
            value: Some(length),
            ..Default::default()
        };
        ObjectData::define_own_property(self.agent, array, key, &descriptor, false)?;
        Ok(ValueOrReference::Value(array.cast()))
    }

    /// ### [11.1.5 Object Initialiser](https://262.ecma-international.org/5.1/#sec-11.1.5)
    fn eval_object_literal<'a>(
        &mut self,
        literal: &'a ast::ObjectExpression<'a>,
    ) -> JsResult<ValueOrReference> {
        let object = self.agent.new_plain_object();
        for property in &literal.properties {
            let ast::ObjectPropertyKind::ObjectProperty(property) = property else {
                return Err(self
                    .agent
                    .throw_exception(ErrorKind::SyntaxError, "unsupported spread property"));
            };
            let key = self.eval_property_key(&property.key)?;
            let descriptor = match property.kind {
                // Duplicate data names are allowed outside strict mode; the
                // later definition wins.
                ast::PropertyKind::Init => {
                    let value = self.eval_expression_to_value(&property.value)?;
                    PropertyDescriptor::data(value, true, true, true)
                }
                ast::PropertyKind::Get => {
                    let Expression::FunctionExpression(function) = &property.value else {
                        return Err(self
                            .agent
                            .throw_exception(ErrorKind::SyntaxError, "getter must be a function"));
                    };
                    let env = self.current_lexical_environment();
                    let closure = crate::ecmascript::builtins::function::instantiate_function_object(
                        self.agent, function, env, false,
                    );
                    PropertyDescriptor {
                        get: Some(closure.cast()),
                        enumerable: Some(true),
                        configurable: Some(true),
                        ..Default::default()
                    }
                }
                ast::PropertyKind::Set => {
                    let Expression::FunctionExpression(function) = &property.value else {
                        return Err(self
                            .agent
                            .throw_exception(ErrorKind::SyntaxError, "setter must be a function"));
                    };
                    let env = self.current_lexical_environment();
                    let closure = crate::ecmascript::builtins::function::instantiate_function_object(
                        self.agent, function, env, false,
                    );
                    PropertyDescriptor {
                        set: Some(closure.cast()),
                        enumerable: Some(true),
                        configurable: Some(true),
                        ..Default::default()
                    }
                }
            };
            ObjectData::define_own_property(self.agent, object, key, &descriptor, false)?;
        }
        Ok(ValueOrReference::Value(object.cast()))
    }

    fn eval_property_key<'a>(
        &mut self,
        key: &'a ast::PropertyKey<'a>,
    ) -> JsResult<Handle<HeapString>> {
        match key {
            ast::PropertyKey::StaticIdentifier(id) => Ok(self.agent.intern_str(id.name.as_str())),
            ast::PropertyKey::StringLiteral(literal) => {
                Ok(self.agent.intern_str(literal.value.as_str()))
            }
            ast::PropertyKey::NumericLiteral(literal) => {
                let text = f64_to_js_string(literal.value);
                Ok(self.agent.intern_str(&text))
            }
            _ => Err(self
                .agent
                .throw_exception(ErrorKind::SyntaxError, "unsupported property key")),
        }
    }

    /// ### [11.13 Assignment Operators](https://262.ecma-international.org/5.1/#sec-11.13)
    fn eval_assignment_expression<'a>(
        &mut self,
        assignment: &'a ast::AssignmentExpression<'a>,
    ) -> JsResult<ValueOrReference> {
        if assignment.operator == AssignmentOperator::Assign {
            // 11.13.1 Simple assignment.
            let target = self.eval_assignment_target(&assignment.left)?;
            let value = self.eval_expression_to_value(&assignment.right)?;
            self.check_strict_assignment_target(&target)?;
            put_value(self.agent, &target, value)?;
            return Ok(ValueOrReference::Value(value));
        }

        // 11.13.2 Compound assignment: read once, apply, write back.
        let Some(operator) = binary_operator_for_assignment(assignment.operator) else {
            return Err(self
                .agent
                .throw_exception(ErrorKind::SyntaxError, "unsupported assignment operator"));
        };
        let target = self.eval_assignment_target(&assignment.left)?;
        let old_value = get_value(self.agent, &target)?;
        let operand = self.eval_expression_to_value(&assignment.right)?;
        let result = self.apply_binary_operator(operator, old_value, operand)?;
        self.check_strict_assignment_target(&target)?;
        put_value(self.agent, &target, result)?;
        Ok(ValueOrReference::Value(result))
    }

    /// 11.13.1 step 4: assigning to `eval` or `arguments` through a strict
    /// reference is a SyntaxError.
    fn check_strict_assignment_target(&mut self, target: &ValueOrReference) -> JsResult<()> {
        if let Some(reference) = target.as_reference() {
            if reference.is_strict()
                && matches!(reference.base(), ReferenceBase::Environment(_))
            {
                let name = reference.name().to_std_string();
                if name == "eval" || name == "arguments" {
                    return Err(self.agent.throw_exception(
                        ErrorKind::SyntaxError,
                        "cannot assign to eval or arguments in strict code",
                    ));
                }
            }
        }
        Ok(())
    }

    fn eval_assignment_target<'a>(
        &mut self,
        target: &'a ast::AssignmentTarget<'a>,
    ) -> JsResult<ValueOrReference> {
        match target {
            ast::AssignmentTarget::AssignmentTargetIdentifier(id) => Ok(
                ValueOrReference::Reference(self.resolve_identifier(id.name.as_str())),
            ),
            ast::AssignmentTarget::StaticMemberExpression(member) => {
                self.member_reference_static(&member.object, &member.property)
            }
            ast::AssignmentTarget::ComputedMemberExpression(member) => {
                self.member_reference_computed(&member.object, &member.expression)
            }
            _ => Err(self
                .agent
                .throw_exception(ErrorKind::SyntaxError, "unsupported assignment target")),
        }
    }

    /// ### [11.11 Binary Logical Operators](https://262.ecma-international.org/5.1/#sec-11.11)
    ///
    /// Short-circuiting, and the result is the deciding operand's value,
    /// not a coerced boolean.
    fn eval_logical_expression<'a>(
        &mut self,
        logical: &'a ast::LogicalExpression<'a>,
    ) -> JsResult<ValueOrReference> {
        let left = self.eval_expression_to_value(&logical.left)?;
        let take_right = match logical.operator {
            LogicalOperator::And => to_boolean(left.value()),
            LogicalOperator::Or => !to_boolean(left.value()),
            LogicalOperator::Coalesce => {
                left.value().is_undefined() || left.value().is_null()
            }
        };
        if take_right {
            Ok(ValueOrReference::Value(
                self.eval_expression_to_value(&logical.right)?,
            ))
        } else {
            Ok(ValueOrReference::Value(left))
        }
    }

    /// ### [11.4 Unary Operators](https://262.ecma-international.org/5.1/#sec-11.4)
    fn eval_unary_expression<'a>(
        &mut self,
        unary: &'a ast::UnaryExpression<'a>,
    ) -> JsResult<ValueOrReference> {
        match unary.operator {
            // 11.4.1 delete consumes the reference without reading it.
            UnaryOperator::Delete => {
                let target = self.eval_expression(&unary.argument)?;
                let result = self.eval_delete(&target)?;
                Ok(self.value_result(Value::from_bool(result)))
            }
            // 11.4.2 void evaluates for effect and yields undefined.
            UnaryOperator::Void => {
                self.eval_expression_to_value(&unary.argument)?;
                Ok(self.value_result(Value::UNDEFINED))
            }
            // 11.4.3 typeof tolerates unresolvable references.
            UnaryOperator::Typeof => {
                let target = self.eval_expression(&unary.argument)?;
                if let Some(reference) = target.as_reference() {
                    if reference.is_unresolvable() {
                        let text = self.agent.intern_str("undefined");
                        return Ok(ValueOrReference::Value(text.cast()));
                    }
                }
                let value = get_value(self.agent, &target)?;
                let text = self.agent.intern_str(type_of_string(value.value()));
                Ok(ValueOrReference::Value(text.cast()))
            }
            UnaryOperator::UnaryPlus => {
                let value = self.eval_expression_to_value(&unary.argument)?;
                let number = to_number(self.agent, value)?;
                Ok(self.value_result(Value::from_number(number)))
            }
            UnaryOperator::UnaryNegation => {
                let value = self.eval_expression_to_value(&unary.argument)?;
                let number = to_number(self.agent, value)?;
                Ok(self.value_result(Value::from_number(-number)))
            }
            UnaryOperator::LogicalNot => {
                let value = self.eval_expression_to_value(&unary.argument)?;
                Ok(self.value_result(Value::from_bool(!to_boolean(value.value()))))
            }
            UnaryOperator::BitwiseNot => {
                let value = self.eval_expression_to_value(&unary.argument)?;
                let int = to_int32(self.agent, value)?;
                Ok(self.value_result(Value::from_i32(!int)))
            }
        }
    }

    /// ### [11.4.1 The delete Operator](https://262.ecma-international.org/5.1/#sec-11.4.1)
    fn eval_delete(&mut self, target: &ValueOrReference) -> JsResult<bool> {
        let Some(reference) = target.as_reference() else {
            // 2. A non-reference deletes nothing and yields true.
            return Ok(true);
        };
        if reference.is_unresolvable() {
            // 3. Unresolvable: true unless strict (SyntaxError).
            if reference.is_strict() {
                return Err(self.agent.throw_exception(
                    ErrorKind::SyntaxError,
                    "cannot delete an unqualified identifier in strict code",
                ));
            }
            return Ok(true);
        }
        match reference.base() {
            // 4. Property references delegate to [[Delete]].
            ReferenceBase::Value(base) => {
                let object = to_object(self.agent, base)?;
                ObjectData::delete(self.agent, object, reference.name(), reference.is_strict())
            }
            // 5. Environment references delete the binding.
            ReferenceBase::Environment(env_rec) => {
                if reference.is_strict() {
                    return Err(self.agent.throw_exception(
                        ErrorKind::SyntaxError,
                        "cannot delete an unqualified identifier in strict code",
                    ));
                }
                environments::delete_binding(self.agent, env_rec, reference.name())
            }
        }
    }

    /// ### [11.3 Postfix](https://262.ecma-international.org/5.1/#sec-11.3) / [11.4.4–11.4.5 Prefix Increment and Decrement](https://262.ecma-international.org/5.1/#sec-11.4.4)
    fn eval_update_expression<'a>(
        &mut self,
        update: &'a ast::UpdateExpression<'a>,
    ) -> JsResult<ValueOrReference> {
        let target = self.eval_simple_assignment_target(&update.argument)?;
        let old_value = get_value(self.agent, &target)?;
        let old_number = to_number(self.agent, old_value)?;
        let new_number = match update.operator {
            UpdateOperator::Increment => old_number + 1.0,
            UpdateOperator::Decrement => old_number - 1.0,
        };
        let new_value = Handle::new(self.agent, Value::from_number(new_number));
        put_value(self.agent, &target, new_value)?;
        if update.prefix {
            Ok(ValueOrReference::Value(new_value))
        } else {
            Ok(self.value_result(Value::from_number(old_number)))
        }
    }

    fn eval_simple_assignment_target<'a>(
        &mut self,
        target: &'a ast::SimpleAssignmentTarget<'a>,
    ) -> JsResult<ValueOrReference> {
        match target {
            ast::SimpleAssignmentTarget::AssignmentTargetIdentifier(id) => Ok(
                ValueOrReference::Reference(self.resolve_identifier(id.name.as_str())),
            ),
            ast::SimpleAssignmentTarget::StaticMemberExpression(member) => {
                self.member_reference_static(&member.object, &member.property)
            }
            ast::SimpleAssignmentTarget::ComputedMemberExpression(member) => {
                self.member_reference_computed(&member.object, &member.expression)
            }
            _ => Err(self
                .agent
                .throw_exception(ErrorKind::SyntaxError, "unsupported assignment target")),
        }
    }

    // Member access.

    /// ### [11.2.1 Property Accessors](https://262.ecma-international.org/5.1/#sec-11.2.1)
    fn member_reference_static<'a>(
        &mut self,
        object: &'a Expression<'a>,
        property: &'a ast::IdentifierName<'a>,
    ) -> JsResult<ValueOrReference> {
        let base = self.eval_expression_to_value(object)?;
        check_object_coercible(self.agent, base)?;
        let name = self.agent.intern_str(property.name.as_str());
        Ok(ValueOrReference::Reference(Reference::new_value(
            base, name, false,
        )))
    }

    fn member_reference_computed<'a>(
        &mut self,
        object: &'a Expression<'a>,
        expression: &'a Expression<'a>,
    ) -> JsResult<ValueOrReference> {
        let base = self.eval_expression_to_value(object)?;
        let key = self.eval_expression_to_value(expression)?;
        check_object_coercible(self.agent, base)?;
        let name = to_property_key(self.agent, key)?;
        Ok(ValueOrReference::Reference(Reference::new_value(
            base, name, false,
        )))
    }

    // Calls and construction.

    /// ### [11.2.3 Function Calls](https://262.ecma-international.org/5.1/#sec-11.2.3)
    fn eval_call_expression<'a>(
        &mut self,
        call: &'a ast::CallExpression<'a>,
    ) -> JsResult<ValueOrReference> {
        // 1.-3. Evaluate the callee, keeping the reference for this
        //       derivation.
        let callee_reference = self.eval_expression(&call.callee)?;
        let callee = get_value(self.agent, &callee_reference)?;

        // 4. Evaluate the arguments left to right.
        let arguments = self.eval_arguments(&call.arguments)?;

        // 5.-6. The callee must be callable.
        if !callee.value().is_callable() {
            return Err(self
                .agent
                .throw_exception(ErrorKind::TypeError, "value is not a function"));
        }

        // 7. Derive the this value from the callee reference.
        let this = match &callee_reference {
            ValueOrReference::Reference(reference) => match reference.base() {
                ReferenceBase::Value(base) if reference.is_property_reference() => base,
                ReferenceBase::Environment(env_rec) => {
                    environments::implicit_this_value(self.agent, env_rec)
                }
                _ => Handle::new(self.agent, Value::UNDEFINED),
            },
            ValueOrReference::Value(_) => Handle::new(self.agent, Value::UNDEFINED),
        };

        // 8. Invoke [[Call]].
        let result = ObjectData::call(self.agent, callee.cast(), this, &arguments)?;
        Ok(ValueOrReference::Value(result))
    }

    /// ### [11.2.2 The new Operator](https://262.ecma-international.org/5.1/#sec-11.2.2)
    fn eval_new_expression<'a>(
        &mut self,
        new: &'a ast::NewExpression<'a>,
    ) -> JsResult<ValueOrReference> {
        let callee = self.eval_expression_to_value(&new.callee)?;
        let arguments = self.eval_arguments(&new.arguments)?;
        if !callee.value().is_object() {
            return Err(self
                .agent
                .throw_exception(ErrorKind::TypeError, "value is not a constructor"));
        }
        let result = ObjectData::construct(self.agent, callee.cast(), &arguments)?;
        Ok(ValueOrReference::Value(result.cast()))
    }

    fn eval_arguments<'a>(
        &mut self,
        arguments: &'a [ast::Argument<'a>],
    ) -> JsResult<Vec<Handle<Value>>> {
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            let Some(expression) = argument.as_expression() else {
                return Err(self
                    .agent
                    .throw_exception(ErrorKind::SyntaxError, "unsupported spread argument"));
            };
            values.push(self.eval_expression_to_value(expression)?);
        }
        Ok(values)
    }

    // Binary operators.

    /// ### [11.5–11.9 Binary Operators](https://262.ecma-international.org/5.1/#sec-11.5)
    fn apply_binary_operator(
        &mut self,
        operator: BinaryOperator,
        left: Handle<Value>,
        right: Handle<Value>,
    ) -> JsResult<Handle<Value>> {
        let agent = &mut *self.agent;
        let value = match operator {
            // 11.6.1: addition is concatenation when either primitive is a
            // string.
            BinaryOperator::Addition => {
                if left.value().is_int() && right.value().is_int() {
                    // Small-int fast path; the sum of two i32 fits in i64.
                    let sum = left.value().get_int() as i64 + right.value().get_int() as i64;
                    Value::from_number(sum as f64)
                } else {
                    let left_primitive = to_primitive(agent, left, None)?;
                    let right_primitive = to_primitive(agent, right, None)?;
                    if left_primitive.value().is_string() || right_primitive.value().is_string() {
                        let mut units = to_string(agent, left_primitive)?.code_units().to_vec();
                        units.extend_from_slice(to_string(agent, right_primitive)?.code_units());
                        return Ok(agent.new_string_from_units(&units).cast());
                    }
                    let left_number = to_number(agent, left_primitive)?;
                    let right_number = to_number(agent, right_primitive)?;
                    Value::from_number(left_number + right_number)
                }
            }
            BinaryOperator::Subtraction => {
                let difference = to_number(agent, left)? - to_number(agent, right)?;
                Value::from_number(difference)
            }
            BinaryOperator::Multiplication => {
                let product = to_number(agent, left)? * to_number(agent, right)?;
                Value::from_number(product)
            }
            BinaryOperator::Division => {
                let quotient = to_number(agent, left)? / to_number(agent, right)?;
                Value::from_number(quotient)
            }
            // 11.5.3: the IEEE remainder with the dividend's sign.
            BinaryOperator::Remainder => {
                let remainder = to_number(agent, left)? % to_number(agent, right)?;
                Value::from_number(remainder)
            }
            BinaryOperator::Exponential => {
                let base = to_number(agent, left)?;
                let exponent = to_number(agent, right)?;
                let result = if exponent.is_nan() { f64::NAN } else { base.powf(exponent) };
                Value::from_number(result)
            }
            BinaryOperator::ShiftLeft => {
                let left_int = to_int32(agent, left)?;
                let shift = to_uint32(agent, right)? & 31;
                Value::from_i32(left_int << shift)
            }
            BinaryOperator::ShiftRight => {
                let left_int = to_int32(agent, left)?;
                let shift = to_uint32(agent, right)? & 31;
                Value::from_i32(left_int >> shift)
            }
            BinaryOperator::ShiftRightZeroFill => {
                let left_int = to_uint32(agent, left)?;
                let shift = to_uint32(agent, right)? & 31;
                Value::from_u32(left_int >> shift)
            }
            BinaryOperator::BitwiseAnd => {
                Value::from_i32(to_int32(agent, left)? & to_int32(agent, right)?)
            }
            BinaryOperator::BitwiseOR => {
                Value::from_i32(to_int32(agent, left)? | to_int32(agent, right)?)
            }
            BinaryOperator::BitwiseXOR => {
                Value::from_i32(to_int32(agent, left)? ^ to_int32(agent, right)?)
            }
            // 11.8.1-4: the relational family over the abstract comparison,
            // with NaN operands yielding false.
            BinaryOperator::LessThan => {
                let result = abstract_relational(agent, left, right, true)?;
                Value::from_bool(result == Some(true))
            }
            BinaryOperator::GreaterThan => {
                let result = abstract_relational(agent, right, left, false)?;
                Value::from_bool(result == Some(true))
            }
            BinaryOperator::LessEqualThan => {
                let result = abstract_relational(agent, right, left, false)?;
                Value::from_bool(result == Some(false))
            }
            BinaryOperator::GreaterEqualThan => {
                let result = abstract_relational(agent, left, right, true)?;
                Value::from_bool(result == Some(false))
            }
            BinaryOperator::Equality => {
                Value::from_bool(abstract_equality(agent, left, right)?)
            }
            BinaryOperator::Inequality => {
                Value::from_bool(!abstract_equality(agent, left, right)?)
            }
            BinaryOperator::StrictEquality => {
                Value::from_bool(strict_equality(left.value(), right.value()))
            }
            BinaryOperator::StrictInequality => {
                Value::from_bool(!strict_equality(left.value(), right.value()))
            }
            // 11.8.7: `in` requires an object right operand.
            BinaryOperator::In => {
                if !right.value().is_object() {
                    return Err(agent.throw_exception(
                        ErrorKind::TypeError,
                        "cannot use 'in' operator on a non-object",
                    ));
                }
                let key = to_property_key(agent, left)?;
                Value::from_bool(ObjectData::has_property(agent, right.cast(), key))
            }
            // 11.8.6: instanceof walks the prototype chain against the
            // constructor's prototype property.
            BinaryOperator::Instanceof => {
                return self.apply_instanceof(left, right);
            }
        };
        Ok(Handle::new(self.agent, value))
    }

    /// ### [15.3.5.3 \[\[HasInstance\]\] (V)](https://262.ecma-international.org/5.1/#sec-15.3.5.3)
    fn apply_instanceof(
        &mut self,
        value: Handle<Value>,
        constructor: Handle<Value>,
    ) -> JsResult<Handle<Value>> {
        if !constructor.value().is_callable() {
            return Err(self
                .agent
                .throw_exception(ErrorKind::TypeError, "right-hand side of instanceof is not callable"));
        }
        if !value.value().is_object() {
            return Ok(Handle::new(self.agent, Value::FALSE));
        }
        let key = self.agent.well_known(|s| s.prototype);
        let prototype = ObjectData::get(self.agent, constructor.cast(), key)?;
        if !prototype.value().is_object() {
            return Err(self.agent.throw_exception(
                ErrorKind::TypeError,
                "constructor prototype is not an object",
            ));
        }
        let mut walker = value.cast::<ObjectData>().prototype();
        while walker.is_object() {
            if walker == prototype.value() {
                return Ok(Handle::new(self.agent, Value::TRUE));
            }
            // SAFETY: is_object guarantees an object layout.
            walker = unsafe { walker.data::<ObjectData>() }.prototype();
        }
        Ok(Handle::new(self.agent, Value::FALSE))
    }

    // Identifier resolution and the exception bridge.

    /// ### [10.3.1 Identifier Resolution](https://262.ecma-international.org/5.1/#sec-10.3.1)
    fn resolve_identifier(&mut self, name: &str) -> Reference {
        let env = self.current_lexical_environment();
        let name = self.agent.intern_str(name);
        get_identifier_reference(self.agent, Some(env), name, false)
    }

    fn current_lexical_environment(&mut self) -> Handle<LexicalEnvironment> {
        self.agent.lexical_environment().cast()
    }

    /// Converts the pending exception into a throw completion; the bridge
    /// between the value channel and the completion channel.
    fn throw_completion<'a>(&mut self) -> Completion<'a> {
        debug_assert!(self.agent.has_exception());
        let value = self.agent.take_exception();
        Completion::throw(value)
    }

    fn syntax_error_completion<'a>(&mut self, message: &str) -> Completion<'a> {
        self.agent.throw_exception(ErrorKind::SyntaxError, message);
        self.throw_completion()
    }

    fn escape_completion<'a>(
        &mut self,
        scope: HandleScope,
        completion: Completion<'a>,
    ) -> Completion<'a> {
        match completion.value {
            Some(value) => {
                let value = scope.escape(self.agent, value);
                Completion {
                    value: Some(value),
                    ..completion
                }
            }
            None => {
                drop(scope);
                completion
            }
        }
    }
}

/// ### [11.4.3 The typeof Operator](https://262.ecma-international.org/5.1/#sec-11.4.3)
fn type_of_string(value: Value) -> &'static str {
    if value.is_undefined() {
        "undefined"
    } else if value.is_null() {
        "object"
    } else if value.is_boolean() {
        "boolean"
    } else if value.is_number() {
        "number"
    } else if value.is_string() {
        "string"
    } else if value.is_callable() {
        "function"
    } else {
        "object"
    }
}

/// The binary operation a compound assignment applies.
fn binary_operator_for_assignment(operator: AssignmentOperator) -> Option<BinaryOperator> {
    match operator {
        AssignmentOperator::Addition => Some(BinaryOperator::Addition),
        AssignmentOperator::Subtraction => Some(BinaryOperator::Subtraction),
        AssignmentOperator::Multiplication => Some(BinaryOperator::Multiplication),
        AssignmentOperator::Division => Some(BinaryOperator::Division),
        AssignmentOperator::Remainder => Some(BinaryOperator::Remainder),
        AssignmentOperator::Exponential => Some(BinaryOperator::Exponential),
        AssignmentOperator::ShiftLeft => Some(BinaryOperator::ShiftLeft),
        AssignmentOperator::ShiftRight => Some(BinaryOperator::ShiftRight),
        AssignmentOperator::ShiftRightZeroFill => Some(BinaryOperator::ShiftRightZeroFill),
        AssignmentOperator::BitwiseAnd => Some(BinaryOperator::BitwiseAnd),
        AssignmentOperator::BitwiseOR => Some(BinaryOperator::BitwiseOR),
        AssignmentOperator::BitwiseXOR => Some(BinaryOperator::BitwiseXOR),
        _ => None,
    }
}
