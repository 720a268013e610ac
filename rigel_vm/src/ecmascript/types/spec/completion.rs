// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [8.9 The Completion Specification Type](https://262.ecma-international.org/5.1/#sec-8.9)

use crate::engine::value::Value;
use crate::heap::handle::Handle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionType {
    Normal,
    Break,
    Continue,
    Return,
    Throw,
}

/// How a statement finished: `(type, value, target)`. The value is empty for
/// statements that produce none; the target names the label a break or
/// continue is aimed at. Borrows the label text from the AST.
#[derive(Debug, Clone, Copy)]
pub struct Completion<'a> {
    pub kind: CompletionType,
    pub value: Option<Handle<Value>>,
    pub target: Option<&'a str>,
}

impl<'a> Completion<'a> {
    pub fn normal_empty() -> Self {
        Completion {
            kind: CompletionType::Normal,
            value: None,
            target: None,
        }
    }

    pub fn normal(value: Handle<Value>) -> Self {
        Completion {
            kind: CompletionType::Normal,
            value: Some(value),
            target: None,
        }
    }

    pub fn throw(value: Handle<Value>) -> Self {
        Completion {
            kind: CompletionType::Throw,
            value: Some(value),
            target: None,
        }
    }

    pub fn return_value(value: Handle<Value>) -> Self {
        Completion {
            kind: CompletionType::Return,
            value: Some(value),
            target: None,
        }
    }

    pub fn break_with(target: Option<&'a str>) -> Self {
        Completion {
            kind: CompletionType::Break,
            value: None,
            target,
        }
    }

    pub fn continue_with(target: Option<&'a str>) -> Self {
        Completion {
            kind: CompletionType::Continue,
            value: None,
            target,
        }
    }

    /// Any completion other than Normal is abrupt.
    pub fn is_abrupt(&self) -> bool {
        self.kind != CompletionType::Normal
    }
}
