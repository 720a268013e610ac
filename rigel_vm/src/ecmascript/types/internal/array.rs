// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The engine-internal value buffer: a header-tagged length followed by
//! `length` value slots. The internal hash table and the property map are
//! laid out on top of this. Not the language-level `Array`.

use core::mem::size_of;
use core::ptr::NonNull;

use crate::ecmascript::execution::agent::Agent;
use crate::engine::value::Value;
use crate::heap::handle::{Handle, HeapData};
use crate::heap::header::{Header, HeapTag};

#[repr(C)]
pub struct InternalArray {
    header: Header,
    length: usize,
    // length Value slots follow.
}

impl HeapData for InternalArray {}

impl InternalArray {
    pub(crate) fn allocation_size(length: usize) -> usize {
        size_of::<InternalArray>() + length * size_of::<Value>()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub(crate) fn header_tag(&self) -> HeapTag {
        self.header.tag()
    }

    #[inline]
    pub(crate) fn slot_ptr(&self, index: usize) -> *mut Value {
        debug_assert!(index < self.length);
        // SAFETY: the slots are laid out directly after the fixed fields.
        unsafe { ((self as *const InternalArray).add(1) as *mut Value).add(index) }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Value {
        // SAFETY: slot_ptr bounds-checks in debug builds; slots are always
        // initialized at allocation time.
        unsafe { *self.slot_ptr(index) }
    }

    #[inline]
    pub fn set(&self, index: usize, value: Value) {
        // SAFETY: as above; the buffer is plain value memory.
        unsafe { *self.slot_ptr(index) = value };
    }

    /// Writes a fresh buffer into uninitialized heap memory with `tag`
    /// (the hash table and property map share this layout) and every slot
    /// set to `fill`.
    pub(crate) unsafe fn init_at(ptr: NonNull<u8>, tag: HeapTag, length: usize, fill: Value) {
        unsafe {
            let array = ptr.as_ptr() as *mut InternalArray;
            core::ptr::write(
                array,
                InternalArray {
                    header: Header::new(tag),
                    length,
                },
            );
            let data = array.add(1) as *mut Value;
            for index in 0..length {
                *data.add(index) = fill;
            }
        }
    }

    /// Allocates a fresh buffer holding the elements of `first` followed by
    /// the elements of `second`.
    pub fn append(
        agent: &mut Agent,
        first: Handle<InternalArray>,
        second: Handle<InternalArray>,
    ) -> Handle<InternalArray> {
        let combined = first.len() + second.len();
        let result = agent.new_internal_array(combined, Value::HOLE);
        for index in 0..first.len() {
            (*result).set(index, first.get(index));
        }
        for index in 0..second.len() {
            (*result).set(first.len() + index, second.get(index));
        }
        result
    }
}

impl Agent {
    pub fn new_internal_array(&mut self, length: usize, fill: Value) -> Handle<InternalArray> {
        let ptr = self.allocate(InternalArray::allocation_size(length));
        // SAFETY: freshly allocated memory of the right size.
        unsafe { InternalArray::init_at(ptr, HeapTag::Array, length, fill) };
        Handle::new(self, Value::from_ptr(ptr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::execution::agent::AgentOptions;

    #[test]
    fn get_set_round_trip() {
        let mut agent = Agent::new(AgentOptions::test_options());
        let array = agent.new_internal_array(3, Value::HOLE);
        assert_eq!(array.len(), 3);
        assert!(array.get(0).is_hole());
        (*array).set(1, Value::from_i32(42));
        assert_eq!(array.get(1).get_int(), 42);
        assert!(array.get(2).is_hole());
    }

    #[test]
    fn append_concatenates() {
        let mut agent = Agent::new(AgentOptions::test_options());
        let first = agent.new_internal_array(2, Value::from_i32(1));
        let second = agent.new_internal_array(3, Value::from_i32(2));
        let combined = InternalArray::append(&mut agent, first, second);
        assert_eq!(combined.len(), 5);
        assert_eq!(combined.get(0).get_int(), 1);
        assert_eq!(combined.get(4).get_int(), 2);
    }
}
