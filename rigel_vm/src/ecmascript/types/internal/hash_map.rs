// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The engine-internal open-addressed hash table, laid out on top of an
//! [`InternalArray`]. Slots 0 and 1 hold the live-entry count and the bucket
//! capacity; the remaining `2 * capacity` slots hold key/value pairs. Keys
//! are strings and hash by content (FNV over the UTF-16 code units), probing
//! is triangular over a power-of-two capacity, and growth doubles the table
//! once the load factor reaches 0.7.
//!
//! An empty key cell holds `Hole`. Erasing writes the `Exception` marker
//! into the key cell instead, so probe chains stay intact; rebuilds on
//! growth drop these deleted cells.

use core::ptr::NonNull;

use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::types::internal::array::InternalArray;
use crate::ecmascript::types::language::string::HeapString;
use crate::engine::value::Value;
use crate::heap::handle::{Handle, HeapData};
use crate::heap::header::HeapTag;

pub(crate) const BUCKET_SIZE_INDEX: usize = 0;
pub(crate) const BUCKET_CAPACITY_INDEX: usize = 1;
pub(crate) const HEADER_SLOTS: usize = 2;
pub(crate) const ENTRY_SLOTS: usize = 2;

/// New tables start with room for four entries.
pub(crate) const DEFAULT_CAPACITY: u32 = 4;

/// Key cell marker for an erased entry.
const DELETED_KEY: Value = Value::EXCEPTION;

#[repr(C)]
pub struct InternalHashMap {
    array: InternalArray,
}

impl HeapData for InternalHashMap {}

impl InternalHashMap {
    pub(crate) fn slots_for_capacity(capacity: u32) -> usize {
        HEADER_SLOTS + ENTRY_SLOTS * capacity as usize
    }

    #[inline]
    pub fn bucket_size(&self) -> u32 {
        self.array.get(BUCKET_SIZE_INDEX).get_int() as u32
    }

    fn set_bucket_size(&self, size: u32) {
        self.array.set(BUCKET_SIZE_INDEX, Value::from_i32(size as i32));
    }

    #[inline]
    pub fn bucket_capacity(&self) -> u32 {
        self.array.get(BUCKET_CAPACITY_INDEX).get_int() as u32
    }

    pub(crate) fn initialize_buckets(&self, capacity: u32) {
        self.array.set(BUCKET_SIZE_INDEX, Value::from_i32(0));
        self.array
            .set(BUCKET_CAPACITY_INDEX, Value::from_i32(capacity as i32));
    }

    #[inline]
    pub(crate) fn entry_key(&self, entry: u32) -> Value {
        self.array
            .get(HEADER_SLOTS + entry as usize * ENTRY_SLOTS)
    }

    #[inline]
    pub(crate) fn entry_value(&self, entry: u32) -> Value {
        self.array
            .get(HEADER_SLOTS + entry as usize * ENTRY_SLOTS + 1)
    }

    fn set_entry(&self, entry: u32, key: Value, value: Value) {
        self.array
            .set(HEADER_SLOTS + entry as usize * ENTRY_SLOTS, key);
        self.array
            .set(HEADER_SLOTS + entry as usize * ENTRY_SLOTS + 1, value);
    }

    /// Probe result: either the entry holding `key`, or the slot an insert
    /// of `key` should use.
    fn find_entry(&self, key: &HeapString) -> (u32, bool) {
        let capacity = self.bucket_capacity();
        debug_assert!(capacity.is_power_of_two());
        let mask = capacity - 1;
        let hash = key.hash_code();
        let mut entry = (hash as u32) & mask;
        let mut reusable: Option<u32> = None;
        let mut step = 0u32;
        loop {
            let cell = self.entry_key(entry);
            if cell.is_hole() {
                return (reusable.unwrap_or(entry), false);
            }
            if cell == DELETED_KEY {
                if reusable.is_none() {
                    reusable = Some(entry);
                }
            } else {
                // SAFETY: non-empty key cells always hold heap strings.
                let stored = unsafe { cell.data::<HeapString>() };
                if stored.equals(key) {
                    return (entry, true);
                }
            }
            step += 1;
            if step > capacity {
                // Every cell is live or deleted. The load-factor ceiling
                // guarantees at least one deleted cell in that case.
                return (reusable.expect("hash table over-full"), false);
            }
            entry = (entry + step) & mask;
        }
    }

    /// Looks `key` up, yielding `Hole` when absent.
    pub fn find(&self, key: &HeapString) -> Value {
        let (entry, found) = self.find_entry(key);
        if found { self.entry_value(entry) } else { Value::HOLE }
    }

    /// Inserts or overwrites. May return a grown table; the caller must
    /// store the returned handle back into the owning object.
    pub fn insert(
        agent: &mut Agent,
        map: Handle<InternalHashMap>,
        key: Handle<HeapString>,
        value: Handle<Value>,
    ) -> Handle<InternalHashMap> {
        let map = if map.is_full() {
            let doubled = map.bucket_capacity() * 2;
            Self::grow(agent, map, doubled)
        } else {
            map
        };

        let (entry, found) = map.find_entry(&key);
        if found {
            map.set_entry(entry, key.value(), value.value());
        } else {
            map.set_entry(entry, key.value(), value.value());
            map.set_bucket_size(map.bucket_size() + 1);
        }
        map
    }

    /// Removes `key` if present, leaving a deleted marker in the key cell.
    pub fn erase(&self, key: &HeapString) {
        let (entry, found) = self.find_entry(key);
        if found {
            self.set_entry(entry, DELETED_KEY, Value::HOLE);
            self.set_bucket_size(self.bucket_size() - 1);
        }
    }

    fn is_full(&self) -> bool {
        // Load factor ceiling of 0.7, in integer arithmetic.
        (self.bucket_size() + 1) * 10 >= self.bucket_capacity() * 7
    }

    fn grow(
        agent: &mut Agent,
        map: Handle<InternalHashMap>,
        capacity: u32,
    ) -> Handle<InternalHashMap> {
        let tag = map.array.header_tag();
        let grown = agent.new_hash_map_with_tag(tag, capacity);
        for entry in 0..map.bucket_capacity() {
            let key = map.entry_key(entry);
            if key.is_hole() || key == DELETED_KEY {
                continue;
            }
            // SAFETY: live key cells always hold heap strings.
            let key_string = unsafe { key.data::<HeapString>() };
            let (slot, found) = grown.find_entry(key_string);
            debug_assert!(!found);
            grown.set_entry(slot, key, map.entry_value(entry));
            grown.set_bucket_size(grown.bucket_size() + 1);
        }
        grown
    }
}

impl Agent {
    pub fn new_hash_map(&mut self, capacity: u32) -> Handle<InternalHashMap> {
        self.new_hash_map_with_tag(HeapTag::HashMap, capacity)
    }

    pub(crate) fn new_hash_map_with_tag(
        &mut self,
        tag: HeapTag,
        capacity: u32,
    ) -> Handle<InternalHashMap> {
        debug_assert!(capacity.is_power_of_two());
        let slots = InternalHashMap::slots_for_capacity(capacity);
        let ptr = self.allocate(InternalArray::allocation_size(slots));
        // SAFETY: freshly allocated memory of the right size.
        unsafe { InternalArray::init_at(ptr, tag, slots, Value::HOLE) };
        let map: Handle<InternalHashMap> = Handle::new(self, Value::from_ptr(ptr));
        map.initialize_buckets(capacity);
        map
    }
}

// Keep struct casts honest: the hash map must add no fields of its own.
const _: () = assert!(
    core::mem::size_of::<InternalHashMap>() == core::mem::size_of::<InternalArray>()
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::execution::agent::AgentOptions;

    fn key(agent: &mut Agent, name: &str) -> Handle<HeapString> {
        agent.intern_str(name)
    }

    #[test]
    fn insert_find_erase() {
        let mut agent = Agent::new(AgentOptions::test_options());
        let map = agent.new_hash_map(DEFAULT_CAPACITY);
        let a = key(&mut agent, "a");
        let one = Handle::new(&mut agent, Value::from_i32(1));
        let map = InternalHashMap::insert(&mut agent, map, a, one);
        assert_eq!(map.find(&a).get_int(), 1);
        assert_eq!(map.bucket_size(), 1);

        let two = Handle::new(&mut agent, Value::from_i32(2));
        let map = InternalHashMap::insert(&mut agent, map, a, two);
        assert_eq!(map.find(&a).get_int(), 2);
        assert_eq!(map.bucket_size(), 1);

        map.erase(&a);
        assert!(map.find(&a).is_hole());
        assert_eq!(map.bucket_size(), 0);
    }

    #[test]
    fn growth_preserves_entries() {
        let mut agent = Agent::new(AgentOptions::test_options());
        let mut map = agent.new_hash_map(DEFAULT_CAPACITY);
        let names: Vec<String> = (0..64).map(|i| format!("key{i}")).collect();
        for (i, name) in names.iter().enumerate() {
            let k = key(&mut agent, name);
            let v = Handle::new(&mut agent, Value::from_i32(i as i32));
            map = InternalHashMap::insert(&mut agent, map, k, v);
        }
        assert_eq!(map.bucket_size(), 64);
        assert!(map.bucket_capacity() >= 64);
        for (i, name) in names.iter().enumerate() {
            let k = key(&mut agent, name);
            assert_eq!(map.find(&k).get_int(), i as i32, "lost entry {name}");
        }
    }

    #[test]
    fn erase_keeps_probe_chains_reachable() {
        let mut agent = Agent::new(AgentOptions::test_options());
        let mut map = agent.new_hash_map(DEFAULT_CAPACITY);
        let names: Vec<String> = (0..16).map(|i| format!("k{i}")).collect();
        for name in &names {
            let k = key(&mut agent, name);
            let v = Handle::new(&mut agent, Value::from_i32(7));
            map = InternalHashMap::insert(&mut agent, map, k, v);
        }
        // Erase half the entries, then verify the rest are still found.
        for name in names.iter().step_by(2) {
            let k = key(&mut agent, name);
            map.erase(&k);
        }
        for (i, name) in names.iter().enumerate() {
            let k = key(&mut agent, name);
            let found = map.find(&k);
            if i % 2 == 0 {
                assert!(found.is_hole());
            } else {
                assert_eq!(found.get_int(), 7, "entry {name} lost after erase");
            }
        }
        // Deleted slots are reusable.
        let k0 = key(&mut agent, "k0");
        let v = Handle::new(&mut agent, Value::from_i32(9));
        let map = InternalHashMap::insert(&mut agent, map, k0, v);
        assert_eq!(map.find(&k0).get_int(), 9);
    }
}
