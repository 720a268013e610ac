// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.3 Execution Contexts](https://262.ecma-international.org/5.1/#sec-10.3)
//!
//! One frame per entered program or function code: the variable and lexical
//! environments, the `this` binding, the label set of the statement under
//! evaluation, and the iteration/switch nesting depths used to validate
//! `break` and `continue` targets.

use crate::engine::value::Value;

pub struct ExecutionContext {
    /// A `LexicalEnvironment` heap value.
    pub(crate) lexical_environment: Value,
    /// A `LexicalEnvironment` heap value.
    pub(crate) variable_environment: Value,
    pub(crate) this_binding: Value,
    label_set: Vec<String>,
    pub(crate) iteration_depth: u32,
    pub(crate) switch_depth: u32,
}

impl ExecutionContext {
    pub fn new(lexical_environment: Value, variable_environment: Value, this_binding: Value) -> Self {
        ExecutionContext {
            lexical_environment,
            variable_environment,
            this_binding,
            label_set: Vec::new(),
            iteration_depth: 0,
            switch_depth: 0,
        }
    }

    pub fn add_label(&mut self, label: &str) {
        self.label_set.push(label.to_owned());
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.label_set.iter().any(|entry| entry == label)
    }

    pub fn remove_label(&mut self, label: &str) {
        if let Some(position) = self.label_set.iter().rposition(|entry| entry == label) {
            self.label_set.remove(position);
        }
    }

    /// The three value slots of the frame are GC roots.
    pub(crate) fn collect_roots(&mut self, roots: &mut Vec<*mut Value>) {
        roots.push(&mut self.lexical_environment as *mut Value);
        roots.push(&mut self.variable_environment as *mut Value);
        roots.push(&mut self.this_binding as *mut Value);
    }
}
