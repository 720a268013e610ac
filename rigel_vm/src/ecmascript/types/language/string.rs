// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [8.4 The String Type](https://262.ecma-international.org/5.1/#sec-8.4)
//!
//! Heap strings: a length followed by contiguous UTF-16 code units. Strings
//! compare by content. Interned strings live in the constant arena and never
//! move; freshly built strings (concatenation results and the like) live in
//! the mutable arena.

use core::mem::size_of;
use core::ptr::NonNull;

use crate::ecmascript::execution::agent::Agent;
use crate::engine::value::Value;
use crate::heap::handle::{Handle, HeapData};
use crate::heap::header::{Header, HeapTag};

#[repr(C)]
pub struct HeapString {
    header: Header,
    length: usize,
    // length UTF-16 code units follow.
}

impl HeapData for HeapString {}

impl HeapString {
    pub(crate) fn allocation_size(length: usize) -> usize {
        size_of::<HeapString>() + length * size_of::<u16>()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[inline]
    pub fn code_units(&self) -> &[u16] {
        // SAFETY: the units are laid out directly after the fixed fields.
        unsafe {
            let data = (self as *const HeapString).add(1) as *const u16;
            core::slice::from_raw_parts(data, self.length)
        }
    }

    pub fn char_at(&self, index: usize) -> Option<u16> {
        self.code_units().get(index).copied()
    }

    pub fn equals(&self, other: &HeapString) -> bool {
        self.code_units() == other.code_units()
    }

    /// FNV-1a over the code units; the internal hash table and the interning
    /// table both key on this.
    pub fn hash_code(&self) -> u64 {
        hash_units(self.code_units())
    }

    pub fn to_std_string(&self) -> String {
        String::from_utf16_lossy(self.code_units())
    }

    /// Writes a fresh string into uninitialized heap memory.
    pub(crate) unsafe fn init_at(ptr: NonNull<u8>, units: &[u16]) {
        unsafe {
            let string = ptr.as_ptr() as *mut HeapString;
            core::ptr::write(
                string,
                HeapString {
                    header: Header::new(HeapTag::String),
                    length: units.len(),
                },
            );
            let data = string.add(1) as *mut u16;
            core::ptr::copy_nonoverlapping(units.as_ptr(), data, units.len());
        }
    }
}

pub(crate) fn hash_units(units: &[u16]) -> u64 {
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = FNV_OFFSET_BASIS;
    for &unit in units {
        hash ^= unit as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

impl Agent {
    /// Allocates a string in the mutable arena.
    pub fn new_string_from_units(&mut self, units: &[u16]) -> Handle<HeapString> {
        let ptr = self.allocate(HeapString::allocation_size(units.len()));
        // SAFETY: freshly allocated memory of the right size.
        unsafe { HeapString::init_at(ptr, units) };
        Handle::new(self, Value::from_ptr(ptr))
    }

    pub fn new_string(&mut self, source: &str) -> Handle<HeapString> {
        let units: Vec<u16> = source.encode_utf16().collect();
        self.new_string_from_units(&units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::execution::agent::AgentOptions;

    #[test]
    fn strings_compare_by_content() {
        let mut agent = Agent::new(AgentOptions::test_options());
        let a = agent.new_string("hello");
        let b = agent.new_string("hello");
        let c = agent.new_string("world");
        assert!(a.value() != b.value());
        assert!(a.equals(&b));
        assert!(!a.equals(&c));
        assert_eq!(a.hash_code(), b.hash_code());
        assert_eq!(a.to_std_string(), "hello");
        assert_eq!(a.len(), 5);
    }

    #[test]
    fn interned_strings_are_deduplicated() {
        let mut agent = Agent::new(AgentOptions::test_options());
        let a = agent.intern_str("length");
        let b = agent.intern_str("length");
        assert_eq!(a.value(), b.value());
        // Well-known strings come from the same table.
        assert_eq!(a.value(), agent.static_strings.length);
    }

    #[test]
    fn non_bmp_text_round_trips_as_surrogate_pairs() {
        let mut agent = Agent::new(AgentOptions::test_options());
        let s = agent.new_string("a\u{1F600}b");
        assert_eq!(s.len(), 4);
        assert_eq!(s.to_std_string(), "a\u{1F600}b");
    }
}
