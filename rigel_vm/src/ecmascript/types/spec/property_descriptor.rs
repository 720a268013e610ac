// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [8.10 The Property Descriptor Type](https://262.ecma-international.org/5.1/#sec-8.10)
//!
//! Two representations coexist. Properties are stored on the heap as one of
//! three concrete descriptor objects (data, accessor, generic), with the
//! attribute bits packed in the object header. During property negotiation
//! the engine works on the transient [`PropertyDescriptor`] view, a record
//! of six optional fields.

use core::cell::Cell;

use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::types::language::object::ObjectData;
use crate::engine::value::Value;
use crate::heap::handle::{Handle, HeapData};
use crate::heap::header::{ErrorKind, Header, HeapTag};

#[repr(C)]
pub struct DataDescriptor {
    header: Header,
    value: Cell<Value>,
}

impl HeapData for DataDescriptor {}

impl DataDescriptor {
    #[inline]
    pub fn value(&self) -> Value {
        self.value.get()
    }

    #[inline]
    pub fn set_value(&self, value: Value) {
        self.value.set(value);
    }

    pub(crate) fn value_slot(&self) -> *mut Value {
        self.value.as_ptr()
    }
}

#[repr(C)]
pub struct AccessorDescriptor {
    header: Header,
    getter: Cell<Value>,
    setter: Cell<Value>,
}

impl HeapData for AccessorDescriptor {}

impl AccessorDescriptor {
    #[inline]
    pub fn getter(&self) -> Value {
        self.getter.get()
    }

    #[inline]
    pub fn setter(&self) -> Value {
        self.setter.get()
    }

    pub(crate) fn getter_slot(&self) -> *mut Value {
        self.getter.as_ptr()
    }

    pub(crate) fn setter_slot(&self) -> *mut Value {
        self.setter.as_ptr()
    }
}

#[repr(C)]
pub struct GenericDescriptor {
    header: Header,
}

impl HeapData for GenericDescriptor {}

/// The transient negotiation record. Absent fields are `None`; the stored
/// descriptor forms default absent attributes to `false`/`undefined` when a
/// property is created.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyDescriptor {
    pub value: Option<Handle<Value>>,
    pub writable: Option<bool>,
    pub get: Option<Handle<Value>>,
    pub set: Option<Handle<Value>>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// A fully populated data descriptor.
    pub fn data(value: Handle<Value>, writable: bool, enumerable: bool, configurable: bool) -> Self {
        PropertyDescriptor {
            value: Some(value),
            writable: Some(writable),
            get: None,
            set: None,
            enumerable: Some(enumerable),
            configurable: Some(configurable),
        }
    }

    /// ### [8.10.2 IsDataDescriptor](https://262.ecma-international.org/5.1/#sec-8.10.2)
    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// ### [8.10.1 IsAccessorDescriptor](https://262.ecma-international.org/5.1/#sec-8.10.1)
    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// ### [8.10.3 IsGenericDescriptor](https://262.ecma-international.org/5.1/#sec-8.10.3)
    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_data_descriptor() && !self.is_accessor_descriptor()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
            && self.writable.is_none()
            && self.get.is_none()
            && self.set.is_none()
            && self.enumerable.is_none()
            && self.configurable.is_none()
    }

    /// Materialises the view of a stored descriptor heap object.
    pub fn from_stored(agent: &mut Agent, stored: Value) -> PropertyDescriptor {
        debug_assert!(stored.is_heap_object());
        let header = stored.header();
        match header.tag() {
            HeapTag::DataDescriptor => {
                // SAFETY: tag-checked.
                let value = unsafe { stored.data::<DataDescriptor>() }.value();
                PropertyDescriptor {
                    value: Some(Handle::new(agent, value)),
                    writable: Some(header.writable()),
                    get: None,
                    set: None,
                    enumerable: Some(header.enumerable()),
                    configurable: Some(header.configurable()),
                }
            }
            HeapTag::AccessorDescriptor => {
                // SAFETY: tag-checked.
                let accessor = unsafe { stored.data::<AccessorDescriptor>() };
                let (getter, setter) = (accessor.getter(), accessor.setter());
                PropertyDescriptor {
                    value: None,
                    writable: None,
                    get: Some(Handle::new(agent, getter)),
                    set: Some(Handle::new(agent, setter)),
                    enumerable: Some(header.enumerable()),
                    configurable: Some(header.configurable()),
                }
            }
            HeapTag::GenericDescriptor => PropertyDescriptor {
                value: None,
                writable: None,
                get: None,
                set: None,
                enumerable: Some(header.enumerable()),
                configurable: Some(header.configurable()),
            },
            _ => unreachable!("property map values are descriptor objects"),
        }
    }
}

impl Agent {
    /// Allocates the stored form implied by the view: data when the view is
    /// generic or data (absent fields defaulting to false), accessor
    /// otherwise.
    pub(crate) fn new_stored_descriptor(&mut self, desc: &PropertyDescriptor) -> Handle<Value> {
        if desc.is_accessor_descriptor() {
            self.new_accessor_descriptor(desc).cast()
        } else {
            self.new_data_descriptor(desc).cast()
        }
    }

    pub(crate) fn new_data_descriptor(
        &mut self,
        desc: &PropertyDescriptor,
    ) -> Handle<DataDescriptor> {
        let value = desc
            .value
            .map(|handle| handle.value())
            .unwrap_or(Value::UNDEFINED);
        let ptr = self.allocate(core::mem::size_of::<DataDescriptor>());
        // SAFETY: freshly allocated memory of the right size. `value` cannot
        // be stale: nothing allocates between reading it and writing it.
        unsafe {
            core::ptr::write(
                ptr.as_ptr() as *mut DataDescriptor,
                DataDescriptor {
                    header: Header::new(HeapTag::DataDescriptor),
                    value: Cell::new(value),
                },
            );
        }
        let handle: Handle<DataDescriptor> = Handle::new(self, Value::from_ptr(ptr));
        handle.header.set_writable(desc.writable.unwrap_or(false));
        handle.header.set_enumerable(desc.enumerable.unwrap_or(false));
        handle
            .header
            .set_configurable(desc.configurable.unwrap_or(false));
        handle
    }

    pub(crate) fn new_accessor_descriptor(
        &mut self,
        desc: &PropertyDescriptor,
    ) -> Handle<AccessorDescriptor> {
        let getter = desc
            .get
            .map(|handle| handle.value())
            .unwrap_or(Value::UNDEFINED);
        let setter = desc
            .set
            .map(|handle| handle.value())
            .unwrap_or(Value::UNDEFINED);
        let ptr = self.allocate(core::mem::size_of::<AccessorDescriptor>());
        // SAFETY: freshly allocated memory of the right size.
        unsafe {
            core::ptr::write(
                ptr.as_ptr() as *mut AccessorDescriptor,
                AccessorDescriptor {
                    header: Header::new(HeapTag::AccessorDescriptor),
                    getter: Cell::new(getter),
                    setter: Cell::new(setter),
                },
            );
        }
        let handle: Handle<AccessorDescriptor> = Handle::new(self, Value::from_ptr(ptr));
        handle.header.set_enumerable(desc.enumerable.unwrap_or(false));
        handle
            .header
            .set_configurable(desc.configurable.unwrap_or(false));
        handle
    }

    pub(crate) fn new_generic_descriptor(
        &mut self,
        desc: &PropertyDescriptor,
    ) -> Handle<GenericDescriptor> {
        let ptr = self.allocate(core::mem::size_of::<GenericDescriptor>());
        // SAFETY: freshly allocated memory of the right size.
        unsafe {
            core::ptr::write(
                ptr.as_ptr() as *mut GenericDescriptor,
                GenericDescriptor {
                    header: Header::new(HeapTag::GenericDescriptor),
                },
            );
        }
        let handle: Handle<GenericDescriptor> = Handle::new(self, Value::from_ptr(ptr));
        handle.header.set_enumerable(desc.enumerable.unwrap_or(false));
        handle
            .header
            .set_configurable(desc.configurable.unwrap_or(false));
        handle
    }
}

/// ### [8.10.4 FromPropertyDescriptor](https://262.ecma-international.org/5.1/#sec-8.10.4)
pub fn from_property_descriptor(
    agent: &mut Agent,
    desc: Option<&PropertyDescriptor>,
) -> JsResult<Handle<Value>> {
    // 1. If Desc is undefined, then return undefined.
    let Some(desc) = desc else {
        return Ok(Handle::new(agent, Value::UNDEFINED));
    };

    // 2. Let obj be the result of creating a new object.
    let obj = agent.new_plain_object();

    let undefined = Handle::new(agent, Value::UNDEFINED);

    if desc.is_data_descriptor() {
        // 3. Call [[DefineOwnProperty]] with "value" and "writable".
        let value = desc.value.unwrap_or(undefined);
        let key = agent.well_known(|s| s.value);
        ObjectData::define_own_property(
            agent,
            obj,
            key,
            &PropertyDescriptor::data(value, true, true, true),
            false,
        )?;
        let writable = Handle::new(agent, Value::from_bool(desc.writable.unwrap_or(false)));
        let key = agent.well_known(|s| s.writable);
        ObjectData::define_own_property(
            agent,
            obj,
            key,
            &PropertyDescriptor::data(writable, true, true, true),
            false,
        )?;
    } else {
        // 4. Call [[DefineOwnProperty]] with "get" and "set".
        let getter = desc.get.unwrap_or(undefined);
        let key = agent.well_known(|s| s.get);
        ObjectData::define_own_property(
            agent,
            obj,
            key,
            &PropertyDescriptor::data(getter, true, true, true),
            false,
        )?;
        let setter = desc.set.unwrap_or(undefined);
        let key = agent.well_known(|s| s.set);
        ObjectData::define_own_property(
            agent,
            obj,
            key,
            &PropertyDescriptor::data(setter, true, true, true),
            false,
        )?;
    }

    // 5. & 6. "enumerable" and "configurable".
    let enumerable = Handle::new(agent, Value::from_bool(desc.enumerable.unwrap_or(false)));
    let key = agent.well_known(|s| s.enumerable);
    ObjectData::define_own_property(
        agent,
        obj,
        key,
        &PropertyDescriptor::data(enumerable, true, true, true),
        false,
    )?;
    let configurable = Handle::new(agent, Value::from_bool(desc.configurable.unwrap_or(false)));
    let key = agent.well_known(|s| s.configurable);
    ObjectData::define_own_property(
        agent,
        obj,
        key,
        &PropertyDescriptor::data(configurable, true, true, true),
        false,
    )?;

    // 7. Return obj.
    Ok(obj.cast())
}

/// ### [8.10.5 ToPropertyDescriptor](https://262.ecma-international.org/5.1/#sec-8.10.5)
pub fn to_property_descriptor(
    agent: &mut Agent,
    attributes: Handle<Value>,
) -> JsResult<PropertyDescriptor> {
    use crate::ecmascript::abstract_operations::type_conversion::to_boolean;

    // 1. If Type(Obj) is not Object throw a TypeError exception.
    if !attributes.value().is_object() {
        return Err(agent.throw_exception(
            ErrorKind::TypeError,
            "property descriptor must be an object",
        ));
    }
    let obj: Handle<ObjectData> = attributes.cast();

    // 2. Let desc be the result of creating a new Property Descriptor.
    let mut desc = PropertyDescriptor::default();

    // 3. "enumerable".
    let key = agent.well_known(|s| s.enumerable);
    if ObjectData::has_property(agent, obj, key) {
        let value = ObjectData::get(agent, obj, key)?;
        desc.enumerable = Some(to_boolean(value.value()));
    }

    // 4. "configurable".
    let key = agent.well_known(|s| s.configurable);
    if ObjectData::has_property(agent, obj, key) {
        let value = ObjectData::get(agent, obj, key)?;
        desc.configurable = Some(to_boolean(value.value()));
    }

    // 5. "value".
    let key = agent.well_known(|s| s.value);
    if ObjectData::has_property(agent, obj, key) {
        let value = ObjectData::get(agent, obj, key)?;
        desc.value = Some(value);
    }

    // 6. "writable".
    let key = agent.well_known(|s| s.writable);
    if ObjectData::has_property(agent, obj, key) {
        let value = ObjectData::get(agent, obj, key)?;
        desc.writable = Some(to_boolean(value.value()));
    }

    // 7. "get": must be callable or undefined.
    let key = agent.well_known(|s| s.get);
    if ObjectData::has_property(agent, obj, key) {
        let getter = ObjectData::get(agent, obj, key)?;
        if !getter.value().is_callable() && !getter.value().is_undefined() {
            return Err(agent.throw_exception(ErrorKind::TypeError, "getter must be callable"));
        }
        desc.get = Some(getter);
    }

    // 8. "set": must be callable or undefined.
    let key = agent.well_known(|s| s.set);
    if ObjectData::has_property(agent, obj, key) {
        let setter = ObjectData::get(agent, obj, key)?;
        if !setter.value().is_callable() && !setter.value().is_undefined() {
            return Err(agent.throw_exception(ErrorKind::TypeError, "setter must be callable"));
        }
        desc.set = Some(setter);
    }

    // 9. Accessor fields exclude value and writable.
    if (desc.get.is_some() || desc.set.is_some())
        && (desc.value.is_some() || desc.writable.is_some())
    {
        return Err(agent.throw_exception(
            ErrorKind::TypeError,
            "property descriptor cannot be both a data and an accessor descriptor",
        ));
    }

    // 10. Return desc.
    Ok(desc)
}
