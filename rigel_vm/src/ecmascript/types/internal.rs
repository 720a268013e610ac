// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine-internal heap types: the raw value buffer, the open-addressed
//! hash table, the property map, and environment-record bindings. None of
//! these are visible as language values.

pub mod array;
pub mod binding;
pub mod hash_map;
pub mod property_map;
