// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Handles and handle scopes.
//!
//! No raw [`Value`] may be held across an operation that can allocate: a
//! collection moves heap objects and leaves such values dangling. A
//! [`Handle`] is instead the address of a slot in one of the agent's handle
//! blocks; the collector treats every live slot as a root and rewrites it in
//! place, so dereferencing a handle after a collection yields the relocated
//! object.
//!
//! [`HandleScope`] gives the slots stack discipline: opening a scope records
//! the current block position, dropping it reclaims every handle created in
//! between. Scope-crossing return values go through [`HandleScope::escape`].

use core::marker::PhantomData;
use core::ptr::NonNull;

use crate::ecmascript::execution::agent::Agent;
use crate::engine::value::Value;

const HANDLE_BLOCK_SIZE: usize = 256;

/// Marker for `#[repr(C)]` heap object layouts that a typed handle may
/// dereference into.
pub trait HeapData: Sized {}

/// The address of a rooted value slot. Copy-cheap; reading goes through the
/// slot so the referent may move freely between reads.
pub struct Handle<T> {
    slot: NonNull<Value>,
    _marker: PhantomData<*const T>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> Handle<T> {
    /// Roots `value` in the agent's current handle scope.
    #[inline]
    pub fn new(agent: &mut Agent, value: Value) -> Self {
        Handle {
            slot: agent.handles.new_handle(value),
            _marker: PhantomData,
        }
    }

    /// The current value of the rooted slot.
    #[inline]
    pub fn value(self) -> Value {
        // SAFETY: the slot lives in a handle block owned by the agent and
        // stays valid until the enclosing scope is dropped.
        unsafe { *self.slot.as_ptr() }
    }

    /// Overwrites the rooted slot. Loop evaluation keeps its accumulated
    /// statement value in one long-lived slot this way instead of rooting a
    /// fresh handle per iteration.
    #[inline]
    pub(crate) fn set(self, value: Value) {
        // SAFETY: as in value(); the slot is live until its scope drops.
        unsafe { *self.slot.as_ptr() = value };
    }

    #[inline]
    pub fn cast<U>(self) -> Handle<U> {
        Handle {
            slot: self.slot,
            _marker: PhantomData,
        }
    }
}

impl<T: HeapData> core::ops::Deref for Handle<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        let value = self.value();
        debug_assert!(value.is_heap_object());
        // SAFETY: typed handles are only created for slots holding an object
        // of layout T; the borrow ends before any allocation point.
        unsafe { &*(value.raw() as *const T) }
    }
}

impl<T> core::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Handle({:#x})", self.value().raw())
    }
}

/// The per-agent stack of handle blocks.
pub(crate) struct HandleStack {
    blocks: Vec<Box<[Value; HANDLE_BLOCK_SIZE]>>,
    /// Next free slot in the current block.
    pos: *mut Value,
    /// One past the last slot of the current block.
    end: *mut Value,
    /// Number of blocks with live slots; the current block is the last one.
    blocks_in_use: usize,
}

impl HandleStack {
    pub(crate) fn new() -> Self {
        HandleStack {
            blocks: Vec::new(),
            pos: core::ptr::null_mut(),
            end: core::ptr::null_mut(),
            blocks_in_use: 0,
        }
    }

    pub(crate) fn new_handle(&mut self, value: Value) -> NonNull<Value> {
        if self.pos == self.end {
            self.push_block();
        }
        let slot = self.pos;
        // SAFETY: pos < end after push_block, so slot is inside a block.
        unsafe {
            *slot = value;
            self.pos = slot.add(1);
            NonNull::new_unchecked(slot)
        }
    }

    fn push_block(&mut self) {
        if self.blocks_in_use == self.blocks.len() {
            self.blocks.push(Box::new([Value::HOLE; HANDLE_BLOCK_SIZE]));
        }
        let block = &mut self.blocks[self.blocks_in_use];
        self.pos = block.as_mut_ptr();
        self.end = unsafe { self.pos.add(HANDLE_BLOCK_SIZE) };
        self.blocks_in_use += 1;
    }

    /// Appends the address of every live slot to `roots`.
    pub(crate) fn collect_roots(&mut self, roots: &mut Vec<*mut Value>) {
        for index in 0..self.blocks_in_use {
            let start = self.blocks[index].as_mut_ptr();
            let limit = if index + 1 == self.blocks_in_use {
                self.pos
            } else {
                unsafe { start.add(HANDLE_BLOCK_SIZE) }
            };
            let mut slot = start;
            while slot < limit {
                roots.push(slot);
                slot = unsafe { slot.add(1) };
            }
        }
    }
}

/// An RAII region bounding the lifetime of the handles created within it.
pub struct HandleScope {
    handles: NonNull<HandleStack>,
    saved_pos: *mut Value,
    saved_end: *mut Value,
    saved_blocks_in_use: usize,
}

impl HandleScope {
    pub fn new(agent: &mut Agent) -> Self {
        let handles = &mut agent.handles;
        HandleScope {
            saved_pos: handles.pos,
            saved_end: handles.end,
            saved_blocks_in_use: handles.blocks_in_use,
            handles: NonNull::from(handles),
        }
    }

    /// Closes the scope while re-rooting one value in the parent scope.
    pub fn escape<T>(self, agent: &mut Agent, handle: Handle<T>) -> Handle<T> {
        let value = handle.value();
        drop(self);
        Handle::new(agent, value)
    }
}

impl Drop for HandleScope {
    fn drop(&mut self) {
        // SAFETY: the handle stack outlives every scope opened on it; scopes
        // drop in LIFO order, restoring the positions saved at creation.
        let handles = unsafe { &mut *self.handles.as_ptr() };
        handles.pos = self.saved_pos;
        handles.end = self.saved_end;
        handles.blocks_in_use = self.saved_blocks_in_use;
    }
}
