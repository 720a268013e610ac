// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The intrinsic objects created during bootstrap. All of them live in the
//! mutable arena (script can add properties to any of them), so every slot
//! here is a GC root.

use crate::engine::value::Value;
use crate::heap::header::ErrorKind;

#[derive(Default)]
pub struct Intrinsics {
    pub(crate) object_prototype: Value,
    pub(crate) object_constructor: Value,
    pub(crate) function_prototype: Value,
    pub(crate) function_constructor: Value,
    pub(crate) array_prototype: Value,
    pub(crate) array_constructor: Value,
    pub(crate) string_prototype: Value,
    pub(crate) string_constructor: Value,
    pub(crate) boolean_prototype: Value,
    pub(crate) boolean_constructor: Value,
    pub(crate) number_prototype: Value,
    pub(crate) number_constructor: Value,
    /// Indexed by [`ErrorKind`]; slot 0 is `Error` itself.
    pub(crate) error_prototypes: [Value; ErrorKind::COUNT],
    pub(crate) error_constructors: [Value; ErrorKind::COUNT],
    pub(crate) math: Value,
}

impl Intrinsics {
    pub(crate) fn error_prototype(&self, kind: ErrorKind) -> Value {
        self.error_prototypes[kind as usize]
    }

    pub(crate) fn collect_roots(&mut self, roots: &mut Vec<*mut Value>) {
        roots.push(&mut self.object_prototype as *mut Value);
        roots.push(&mut self.object_constructor as *mut Value);
        roots.push(&mut self.function_prototype as *mut Value);
        roots.push(&mut self.function_constructor as *mut Value);
        roots.push(&mut self.array_prototype as *mut Value);
        roots.push(&mut self.array_constructor as *mut Value);
        roots.push(&mut self.string_prototype as *mut Value);
        roots.push(&mut self.string_constructor as *mut Value);
        roots.push(&mut self.boolean_prototype as *mut Value);
        roots.push(&mut self.boolean_constructor as *mut Value);
        roots.push(&mut self.number_prototype as *mut Value);
        roots.push(&mut self.number_constructor as *mut Value);
        for slot in self.error_prototypes.iter_mut() {
            roots.push(slot as *mut Value);
        }
        for slot in self.error_constructors.iter_mut() {
            roots.push(slot as *mut Value);
        }
        roots.push(&mut self.math as *mut Value);
    }
}
