// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Rigel Virtual Machine
//!
//! A tree-walking interpreter for a large subset of ECMAScript 5.1.
//!
//! The engine ingests an [`oxc_ast`] program, evaluates it under the 5.1
//! semantics, and either produces a completion value or leaves an uncaught
//! exception behind. All JavaScript values live on a moving, two-space
//! garbage-collected heap owned by an [`Agent`]; raw values must be rooted
//! through [`HandleScope`]s across any operation that may allocate.
//!
//! ```no_run
//! use oxc_allocator::Allocator;
//! use oxc_parser::Parser;
//! use oxc_span::SourceType;
//! use rigel_vm::{Agent, AgentOptions, Interpreter};
//!
//! let allocator = Allocator::default();
//! let parsed = Parser::new(&allocator, "6 * 7", SourceType::default()).parse();
//! let mut agent = Agent::new(AgentOptions::default());
//! let mut interpreter = Interpreter::new(&mut agent);
//! let completion = interpreter.execute(&parsed.program);
//! ```

pub mod ecmascript;
pub mod engine;
pub mod heap;

pub use ecmascript::execution::agent::{Agent, AgentOptions, JsError, JsResult};
pub use ecmascript::types::spec::completion::{Completion, CompletionType};
pub use engine::interpreter::Interpreter;
pub use engine::value::Value;
pub use heap::handle::{Handle, HandleScope};
