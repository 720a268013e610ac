// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A declarative environment record binds identifiers to these cells. The
//! mutable and deletable attributes live in the header.

use core::cell::Cell;

use crate::ecmascript::execution::agent::Agent;
use crate::engine::value::Value;
use crate::heap::handle::{Handle, HeapData};
use crate::heap::header::{Header, HeapTag};

#[repr(C)]
pub struct Binding {
    header: Header,
    value: Cell<Value>,
}

impl HeapData for Binding {}

impl Binding {
    #[inline]
    pub fn value(&self) -> Value {
        self.value.get()
    }

    #[inline]
    pub fn set_value(&self, value: Value) {
        self.value.set(value);
    }

    #[inline]
    pub fn is_mutable(&self) -> bool {
        self.header.mutable()
    }

    #[inline]
    pub fn is_deletable(&self) -> bool {
        self.header.deletable()
    }

    pub(crate) fn value_slot(&self) -> *mut Value {
        self.value.as_ptr()
    }
}

impl Agent {
    pub fn new_binding(
        &mut self,
        value: Handle<Value>,
        mutable: bool,
        deletable: bool,
    ) -> Handle<Binding> {
        let ptr = self.allocate(core::mem::size_of::<Binding>());
        // SAFETY: freshly allocated memory of the right size.
        unsafe {
            core::ptr::write(
                ptr.as_ptr() as *mut Binding,
                Binding {
                    header: Header::new(HeapTag::Binding),
                    value: Cell::new(value.value()),
                },
            );
        }
        let handle: Handle<Binding> = Handle::new(self, Value::from_ptr(ptr));
        handle.header.set_mutable(mutable);
        handle.header.set_deletable(deletable);
        handle
    }
}
