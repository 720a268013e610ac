// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.5 Static Semantics: declared names](https://262.ecma-international.org/5.1/#sec-10.5)
//!
//! The AST walks feeding declaration binding instantiation: the `var` names
//! declared anywhere in a code body (without descending into nested
//! functions), and the function declarations of the top statement level.

use oxc_ast::ast::{self, Statement};

/// FunctionDeclarations at the top level of a statement list, in source
/// order.
pub(crate) fn top_level_function_declarations<'a>(
    statements: &'a [Statement<'a>],
) -> Vec<&'a ast::Function<'a>> {
    statements
        .iter()
        .filter_map(|statement| match statement {
            Statement::FunctionDeclaration(decl) => Some(&**decl),
            _ => None,
        })
        .collect()
}

/// VarDeclaredNames: every `var` name in the statement list, recursing into
/// blocks, loops, `with`, `switch`, labels and `try`, but not into nested
/// function bodies.
pub(crate) fn var_declared_names<'a>(statements: &'a [Statement<'a>], names: &mut Vec<&'a str>) {
    for statement in statements {
        statement_var_declared_names(statement, names);
    }
}

fn declarator_names<'a>(declaration: &'a ast::VariableDeclaration<'a>, names: &mut Vec<&'a str>) {
    for declarator in &declaration.declarations {
        if let ast::BindingPatternKind::BindingIdentifier(id) = &declarator.id.kind {
            names.push(id.name.as_str());
        }
    }
}

fn statement_var_declared_names<'a>(statement: &'a Statement<'a>, names: &mut Vec<&'a str>) {
    match statement {
        Statement::VariableDeclaration(declaration) => declarator_names(declaration, names),
        Statement::BlockStatement(block) => var_declared_names(&block.body, names),
        Statement::IfStatement(if_statement) => {
            statement_var_declared_names(&if_statement.consequent, names);
            if let Some(alternate) = &if_statement.alternate {
                statement_var_declared_names(alternate, names);
            }
        }
        Statement::DoWhileStatement(do_while) => {
            statement_var_declared_names(&do_while.body, names);
        }
        Statement::WhileStatement(while_statement) => {
            statement_var_declared_names(&while_statement.body, names);
        }
        Statement::ForStatement(for_statement) => {
            if let Some(ast::ForStatementInit::VariableDeclaration(declaration)) =
                &for_statement.init
            {
                declarator_names(declaration, names);
            }
            statement_var_declared_names(&for_statement.body, names);
        }
        Statement::ForInStatement(for_in) => {
            if let ast::ForStatementLeft::VariableDeclaration(declaration) = &for_in.left {
                declarator_names(declaration, names);
            }
            statement_var_declared_names(&for_in.body, names);
        }
        Statement::LabeledStatement(labeled) => {
            statement_var_declared_names(&labeled.body, names);
        }
        Statement::WithStatement(with) => statement_var_declared_names(&with.body, names),
        Statement::SwitchStatement(switch) => {
            for case in &switch.cases {
                var_declared_names(&case.consequent, names);
            }
        }
        Statement::TryStatement(try_statement) => {
            var_declared_names(&try_statement.block.body, names);
            if let Some(handler) = &try_statement.handler {
                var_declared_names(&handler.body.body, names);
            }
            if let Some(finalizer) = &try_statement.finalizer {
                var_declared_names(&finalizer.body, names);
            }
        }
        // Function declarations contribute their own hoisting, not vars;
        // everything else declares nothing.
        _ => {}
    }
}
