// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The agent owns every piece of mutable interpreter state: the heap, the
//! handle blocks, the string-interning table, the well-known strings and
//! intrinsics, the execution-context stack, the global object, and the
//! single pending-exception slot. It is passed explicitly to every function
//! that may allocate, throw, or call back into the evaluator, and it is not
//! `Send`.

use core::ptr::NonNull;

use crate::ecmascript::builtins::global_object;
use crate::ecmascript::execution::execution_context::ExecutionContext;
use crate::ecmascript::execution::intrinsics::Intrinsics;
use crate::ecmascript::static_strings::StaticStrings;
use crate::ecmascript::types::language::object::ObjectData;
use crate::ecmascript::types::language::string::HeapString;
use crate::engine::value::Value;
use crate::heap::copying_heap::{Heap, HeapOptions};
use crate::heap::handle::{Handle, HandleStack};
use crate::heap::header::ErrorKind;
use crate::heap::string_table::StringTable;

/// Recursion ceiling for `[[Call]]`/`[[Construct]]`; exceeding it raises
/// RangeError rather than exhausting the host stack on cyclic `toString`
/// chains and runaway recursion. Each interpreted call burns a dozen or so
/// host frames, so this stays comfortably inside a 2 MiB test-thread stack.
const MAX_CALL_DEPTH: u32 = 256;

/// Marker for a raised exception. The thrown value itself sits in the
/// agent's pending-exception slot; callers propagate this token with `?` and
/// the evaluator converts it into a throw completion at statement level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsError;

pub type JsResult<T> = Result<T, JsError>;

#[derive(Debug, Clone, Copy, Default)]
pub struct AgentOptions {
    pub heap: HeapOptions,
}

impl AgentOptions {
    /// Small arenas, so the test suites exercise the collector constantly.
    pub fn test_options() -> AgentOptions {
        AgentOptions {
            heap: HeapOptions {
                mutable_size: 4 * 1024 * 1024,
                constant_size: 1024 * 1024,
            },
        }
    }
}

pub struct Agent {
    pub(crate) heap: Heap,
    pub(crate) handles: HandleStack,
    pub(crate) string_table: StringTable,
    pub(crate) static_strings: StaticStrings,
    pub(crate) intrinsics: Intrinsics,
    pub(crate) contexts: Vec<ExecutionContext>,
    pub(crate) global_object: Value,
    pub(crate) global_env: Value,
    /// The pending-exception channel; `Hole` when no exception is pending.
    pub(crate) exception: Value,
    call_depth: u32,
}

impl Agent {
    pub fn new(options: AgentOptions) -> Self {
        let mut agent = Agent {
            heap: Heap::new(options.heap),
            handles: HandleStack::new(),
            string_table: StringTable::new(),
            static_strings: StaticStrings::default(),
            intrinsics: Intrinsics::default(),
            contexts: Vec::new(),
            global_object: Value::HOLE,
            global_env: Value::HOLE,
            exception: Value::HOLE,
            call_depth: 0,
        };
        agent.static_strings = StaticStrings::init(&mut agent);
        global_object::initialize(&mut agent);
        agent
    }

    // Allocation.

    /// Allocates in the mutable arena, collecting first when the bump would
    /// overflow. An allocation that still does not fit afterwards is fatal.
    pub(crate) fn allocate(&mut self, size: usize) -> NonNull<u8> {
        if !self.heap.fits(size) {
            self.collect_garbage();
        }
        self.heap.allocate(size)
    }

    /// Runs a full collection. Roots are the execution-context slots, every
    /// live handle slot, the global object and environment, the intrinsics,
    /// and the pending-exception slot.
    pub fn collect_garbage(&mut self) {
        let mut roots: Vec<*mut Value> = Vec::new();
        self.handles.collect_roots(&mut roots);
        for context in self.contexts.iter_mut() {
            context.collect_roots(&mut roots);
        }
        roots.push(&mut self.global_object as *mut Value);
        roots.push(&mut self.global_env as *mut Value);
        roots.push(&mut self.exception as *mut Value);
        self.intrinsics.collect_roots(&mut roots);
        // SAFETY: the root set is complete; every reachable mutable-arena
        // object is reachable from these slots.
        unsafe { self.heap.collect(&roots) };
    }

    // String interning.

    pub fn intern_units(&mut self, units: &[u16]) -> Handle<HeapString> {
        if let Some(value) = self.string_table.get(units) {
            return Handle::new(self, value);
        }
        let ptr = self
            .heap
            .allocate_constant(HeapString::allocation_size(units.len()));
        // SAFETY: freshly allocated memory of the right size.
        unsafe { HeapString::init_at(ptr, units) };
        let value = Value::from_ptr(ptr);
        self.string_table.insert(units.into(), value);
        Handle::new(self, value)
    }

    pub fn intern_str(&mut self, source: &str) -> Handle<HeapString> {
        let units: Vec<u16> = source.encode_utf16().collect();
        self.intern_units(&units)
    }

    /// Roots one of the well-known interned strings.
    pub(crate) fn well_known(
        &mut self,
        select: impl FnOnce(&StaticStrings) -> Value,
    ) -> Handle<HeapString> {
        let value = select(&self.static_strings);
        debug_assert!(!value.is_hole());
        Handle::new(self, value)
    }

    // The pending-exception channel.

    /// Raises a native error: constructs the error object, parks it in the
    /// pending-exception slot, and returns the propagation token.
    pub fn throw_exception(&mut self, kind: ErrorKind, message: &str) -> JsError {
        let error = crate::ecmascript::builtins::error::new_native_error(self, kind, message);
        self.exception = error.value();
        JsError
    }

    /// Parks an already-constructed value (a `throw` statement operand) in
    /// the exception slot.
    pub fn throw_value(&mut self, value: Handle<Value>) -> JsError {
        self.exception = value.value();
        JsError
    }

    pub fn has_exception(&self) -> bool {
        !self.exception.is_hole()
    }

    /// Takes the pending exception out of the slot, rooting it for the
    /// caller (typically a `catch` clause or the host).
    pub fn take_exception(&mut self) -> Handle<Value> {
        debug_assert!(self.has_exception());
        let value = self.exception;
        self.exception = Value::HOLE;
        Handle::new(self, value)
    }

    pub fn clear_exception(&mut self) {
        self.exception = Value::HOLE;
    }

    // The execution-context stack.

    pub(crate) fn push_execution_context(&mut self, context: ExecutionContext) {
        self.contexts.push(context);
    }

    pub(crate) fn pop_execution_context(&mut self) {
        self.contexts.pop();
    }

    pub(crate) fn running_execution_context(&mut self) -> &mut ExecutionContext {
        self.contexts
            .last_mut()
            .expect("no running execution context")
    }

    pub(crate) fn lexical_environment(&mut self) -> Handle<Value> {
        let env = self.running_execution_context().lexical_environment;
        Handle::new(self, env)
    }

    pub(crate) fn variable_environment(&mut self) -> Handle<Value> {
        let env = self.running_execution_context().variable_environment;
        Handle::new(self, env)
    }

    pub(crate) fn this_binding(&mut self) -> Handle<Value> {
        let this = self.running_execution_context().this_binding;
        Handle::new(self, this)
    }

    pub fn global_object(&mut self) -> Handle<ObjectData> {
        let global = self.global_object;
        Handle::new(self, global)
    }

    // Call-depth accounting.

    pub(crate) fn enter_call(&mut self) -> JsResult<()> {
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(
                self.throw_exception(ErrorKind::RangeError, "maximum call stack size exceeded")
            );
        }
        self.call_depth += 1;
        Ok(())
    }

    pub(crate) fn exit_call(&mut self) {
        debug_assert!(self.call_depth > 0);
        self.call_depth -= 1;
    }

    /// Number of garbage collections run so far.
    pub fn collection_count(&self) -> u64 {
        self.heap.collection_count()
    }

    /// Bytes currently in use in the mutable arena.
    pub fn heap_used_bytes(&self) -> usize {
        self.heap.used_bytes()
    }
}
