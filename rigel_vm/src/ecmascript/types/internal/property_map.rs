// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The per-object property table: an [`InternalHashMap`] keyed by interned
//! strings whose values are stored descriptor heap objects. Enumeration
//! order is hash order; ES5.1 leaves `for-in` order unspecified.

use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::types::internal::hash_map::{DEFAULT_CAPACITY, InternalHashMap};
use crate::ecmascript::types::language::string::HeapString;
use crate::ecmascript::types::spec::property_descriptor::PropertyDescriptor;
use crate::engine::value::Value;
use crate::heap::handle::{Handle, HeapData};
use crate::heap::header::HeapTag;

#[repr(C)]
pub struct PropertyMap {
    map: InternalHashMap,
}

impl HeapData for PropertyMap {}

impl PropertyMap {
    /// Looks a property up, yielding the stored descriptor object or `Hole`.
    pub fn get_property(&self, key: &HeapString) -> Value {
        self.map.find(key)
    }

    /// Stores a property, allocating the concrete descriptor form implied by
    /// the view. May return a grown map; the caller stores it back into the
    /// owning object.
    pub fn set_property(
        agent: &mut Agent,
        map: Handle<PropertyMap>,
        key: Handle<HeapString>,
        desc: &PropertyDescriptor,
    ) -> Handle<PropertyMap> {
        let stored = agent.new_stored_descriptor(desc);
        InternalHashMap::insert(agent, map.cast(), key, stored).cast()
    }

    pub fn delete_property(&self, key: &HeapString) {
        self.map.erase(key);
    }

    pub fn property_count(&self) -> u32 {
        self.map.bucket_size()
    }

    /// Iterates `(key, stored descriptor)` pairs in table order.
    pub fn for_each(&self, mut f: impl FnMut(Value, Value)) {
        for entry in 0..self.map.bucket_capacity() {
            let key = self.map.entry_key(entry);
            if key.is_hole() || key.is_exception() {
                continue;
            }
            f(key, self.map.entry_value(entry));
        }
    }
}

impl Agent {
    pub fn new_property_map(&mut self) -> Handle<PropertyMap> {
        self.new_hash_map_with_tag(HeapTag::PropertyMap, DEFAULT_CAPACITY)
            .cast()
    }
}
