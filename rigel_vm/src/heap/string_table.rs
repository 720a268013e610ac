// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The string-interning table. Interned strings live in the constant arena,
//! never move, and are deduplicated by content, so identical identifiers and
//! literals share one heap string and property keys can be compared cheaply.

use crate::engine::value::Value;

type InternMap = hashbrown::HashMap<Box<[u16]>, Value, ahash::RandomState>;

pub(crate) struct StringTable {
    map: InternMap,
}

impl StringTable {
    pub(crate) fn new() -> Self {
        StringTable {
            map: InternMap::default(),
        }
    }

    pub(crate) fn get(&self, units: &[u16]) -> Option<Value> {
        self.map.get(units).copied()
    }

    pub(crate) fn insert(&mut self, units: Box<[u16]>, value: Value) {
        let previous = self.map.insert(units, value);
        debug_assert!(previous.is_none());
    }
}
