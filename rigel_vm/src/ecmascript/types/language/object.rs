// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [8.12 Algorithms for Object Internal Methods](https://262.ecma-international.org/5.1/#sec-8.12)
//!
//! The base object layout (header, property map, prototype) and the
//! internal-method suite. Subclass behaviour is selected by the header tag:
//! `JsArray` overrides `[[DefineOwnProperty]]` for `length` and array
//! indices, `JsString` synthesises indexed own properties, and the two
//! function tags implement `[[Call]]`/`[[Construct]]`.

use core::cell::Cell;
use core::mem::size_of;

use crate::ecmascript::abstract_operations::testing_and_comparison::same_value;
use crate::ecmascript::abstract_operations::type_conversion::PreferredType;
use crate::ecmascript::execution::agent::{Agent, JsResult};
use crate::ecmascript::types::internal::property_map::PropertyMap;
use crate::ecmascript::types::language::string::HeapString;
use crate::ecmascript::types::spec::property_descriptor::PropertyDescriptor;
use crate::engine::value::Value;
use crate::heap::handle::{Handle, HeapData};
use crate::heap::header::{ErrorKind, Header, HeapTag, ObjectClass};

#[repr(C)]
pub struct ObjectData {
    header: Header,
    /// Always a [`PropertyMap`]; even an empty object has one.
    properties: Cell<Value>,
    /// Another object, or `Null` at the end of the chain.
    prototype: Cell<Value>,
}

impl HeapData for ObjectData {}

impl ObjectData {
    #[inline]
    pub fn tag(&self) -> HeapTag {
        self.header.tag()
    }

    #[inline]
    pub fn class(&self) -> ObjectClass {
        self.header.class()
    }

    pub(crate) fn set_class(&self, class: ObjectClass) {
        self.header.set_class(class);
    }

    /// Assembles the common object prefix for subtype layouts.
    pub(crate) fn bare(header: Header, properties: Cell<Value>, prototype: Cell<Value>) -> Self {
        ObjectData {
            header,
            properties,
            prototype,
        }
    }

    #[inline]
    pub fn error_kind(&self) -> ErrorKind {
        self.header.error_kind()
    }

    pub(crate) fn set_error_kind(&self, kind: ErrorKind) {
        self.header.set_error_kind(kind);
    }

    #[inline]
    pub fn extensible(&self) -> bool {
        self.header.extensible()
    }

    pub fn set_extensible(&self, extensible: bool) {
        self.header.set_extensible(extensible);
    }

    #[inline]
    pub fn is_callable(&self) -> bool {
        self.header.callable()
    }

    #[inline]
    pub fn is_constructor(&self) -> bool {
        self.header.is_constructor()
    }

    pub(crate) fn set_callable(&self, value: bool) {
        self.header.set_callable(value);
    }

    pub(crate) fn set_is_constructor(&self, value: bool) {
        self.header.set_is_constructor(value);
    }

    #[inline]
    pub fn properties(&self) -> Value {
        self.properties.get()
    }

    pub(crate) fn set_properties(&self, map: Value) {
        debug_assert!(map.is_heap_object() && map.tag() == HeapTag::PropertyMap);
        self.properties.set(map);
    }

    #[inline]
    pub fn prototype(&self) -> Value {
        self.prototype.get()
    }

    pub fn set_prototype(&self, prototype: Value) {
        debug_assert!(prototype.is_null() || prototype.is_object());
        self.prototype.set(prototype);
    }

    #[inline]
    pub fn property_map(&self) -> &PropertyMap {
        // SAFETY: properties always holds a property map.
        unsafe { self.properties.get().data::<PropertyMap>() }
    }

    pub(crate) fn properties_slot(&self) -> *mut Value {
        self.properties.as_ptr()
    }

    pub(crate) fn prototype_slot(&self) -> *mut Value {
        self.prototype.as_ptr()
    }

    // The internal-method suite. These are associated functions taking the
    // agent, since most of them may allocate or raise.

    /// ### [8.12.1 \[\[GetOwnProperty\]\] (P)](https://262.ecma-international.org/5.1/#sec-8.12.1)
    pub fn get_own_property(
        agent: &mut Agent,
        o: Handle<ObjectData>,
        p: Handle<HeapString>,
    ) -> Option<PropertyDescriptor> {
        if o.tag() == HeapTag::JsString {
            return crate::ecmascript::builtins::string::string_get_own_property(agent, o, p);
        }
        Self::ordinary_get_own_property(agent, o, p)
    }

    pub fn ordinary_get_own_property(
        agent: &mut Agent,
        o: Handle<ObjectData>,
        p: Handle<HeapString>,
    ) -> Option<PropertyDescriptor> {
        // 1.-2. If O doesn't have an own property with name P, return undefined.
        let stored = o.property_map().get_property(&p);
        if stored.is_hole() {
            return None;
        }
        // 3.-9. Return a fully populated view of the stored descriptor.
        Some(PropertyDescriptor::from_stored(agent, stored))
    }

    /// ### [8.12.2 \[\[GetProperty\]\] (P)](https://262.ecma-international.org/5.1/#sec-8.12.2)
    pub fn get_property(
        agent: &mut Agent,
        o: Handle<ObjectData>,
        p: Handle<HeapString>,
    ) -> Option<PropertyDescriptor> {
        // 1. Let prop be the result of calling [[GetOwnProperty]] with P.
        // 2. If prop is not undefined, return prop.
        // 3. Otherwise continue with [[Prototype]] until the chain ends.
        let mut current = o;
        loop {
            if let Some(desc) = Self::get_own_property(agent, current, p) {
                return Some(desc);
            }
            let proto = current.prototype();
            if proto.is_null() {
                return None;
            }
            current = Handle::<Value>::new(agent, proto).cast();
        }
    }

    /// ### [8.12.3 \[\[Get\]\] (P)](https://262.ecma-international.org/5.1/#sec-8.12.3)
    pub fn get(
        agent: &mut Agent,
        o: Handle<ObjectData>,
        p: Handle<HeapString>,
    ) -> JsResult<Handle<Value>> {
        let this = o.cast::<Value>();
        Self::get_with_this(agent, o, p, this)
    }

    /// `[[Get]]` with an explicit `this` for the getter call; property
    /// references with primitive bases resolve through a transient wrapper
    /// but pass the primitive itself as the receiver.
    pub fn get_with_this(
        agent: &mut Agent,
        o: Handle<ObjectData>,
        p: Handle<HeapString>,
        this: Handle<Value>,
    ) -> JsResult<Handle<Value>> {
        // 1. Let desc be the result of calling [[GetProperty]] with P.
        let Some(desc) = Self::get_property(agent, o, p) else {
            // 2. If desc is undefined, return undefined.
            return Ok(Handle::new(agent, Value::UNDEFINED));
        };

        // 3. If IsDataDescriptor(desc) is true, return desc.[[Value]].
        if desc.is_data_descriptor() {
            return Ok(desc.value.unwrap_or(Handle::new(agent, Value::UNDEFINED)));
        }

        // 4. Otherwise let getter be desc.[[Get]].
        let getter = desc.get.expect("accessor descriptor without getter slot");
        // 5. If getter is undefined, return undefined.
        if getter.value().is_undefined() {
            return Ok(Handle::new(agent, Value::UNDEFINED));
        }

        // 6. Return the result of calling the [[Call]] internal method of
        //    getter providing O as the this value.
        Self::call(agent, getter.cast(), this, &[])
    }

    /// ### [8.12.4 \[\[CanPut\]\] (P)](https://262.ecma-international.org/5.1/#sec-8.12.4)
    pub fn can_put(agent: &mut Agent, o: Handle<ObjectData>, p: Handle<HeapString>) -> bool {
        // 1. Let desc be the result of calling [[GetOwnProperty]] with P.
        if let Some(desc) = Self::get_own_property(agent, o, p) {
            // 2. If desc is not undefined:
            if desc.is_accessor_descriptor() {
                // a. Accessor: can put iff the setter is not undefined.
                return desc
                    .set
                    .is_some_and(|setter| !setter.value().is_undefined());
            }
            // b. Data: governed by [[Writable]].
            return desc.writable.unwrap_or(false);
        }

        // 3.-4. Consult the prototype chain.
        let proto = o.prototype();
        if proto.is_null() {
            return o.extensible();
        }
        let proto: Handle<ObjectData> = Handle::<Value>::new(agent, proto).cast();
        let Some(inherited) = Self::get_property(agent, proto, p) else {
            return o.extensible();
        };

        // 5.-6. Accessors require a setter; inherited data properties
        //       require both extensibility and writability.
        if inherited.is_accessor_descriptor() {
            inherited
                .set
                .is_some_and(|setter| !setter.value().is_undefined())
        } else if !o.extensible() {
            false
        } else {
            inherited.writable.unwrap_or(false)
        }
    }

    /// ### [8.12.5 \[\[Put\]\] (P, V, Throw)](https://262.ecma-international.org/5.1/#sec-8.12.5)
    pub fn put(
        agent: &mut Agent,
        o: Handle<ObjectData>,
        p: Handle<HeapString>,
        v: Handle<Value>,
        throw: bool,
    ) -> JsResult<()> {
        let this = o.cast::<Value>();
        Self::put_with_this(agent, o, p, v, throw, this)
    }

    /// `[[Put]]` with an explicit `this` for the setter call.
    pub fn put_with_this(
        agent: &mut Agent,
        o: Handle<ObjectData>,
        p: Handle<HeapString>,
        v: Handle<Value>,
        throw: bool,
        this: Handle<Value>,
    ) -> JsResult<()> {
        // 1. If [[CanPut]](P) is false, reject.
        if !Self::can_put(agent, o, p) {
            if throw {
                let name = p.to_std_string();
                return Err(agent.throw_exception(
                    ErrorKind::TypeError,
                    &format!("cannot assign to read only property '{name}'"),
                ));
            }
            return Ok(());
        }

        // 2.-3. An own data property is updated in place.
        let own = Self::get_own_property(agent, o, p);
        if let Some(own) = &own {
            if own.is_data_descriptor() {
                let value_desc = PropertyDescriptor {
                    value: Some(v),
                    ..Default::default()
                };
                Self::define_own_property(agent, o, p, &value_desc, throw)?;
                return Ok(());
            }
        }

        // 4. Otherwise consult the chain for an accessor.
        let desc = Self::get_property(agent, o, p);
        if let Some(desc) = desc {
            if desc.is_accessor_descriptor() {
                // 5. Call the setter with V.
                let setter = desc.set.expect("accessor descriptor without setter slot");
                Self::call(agent, setter.cast(), this, &[v])?;
                return Ok(());
            }
        }

        // 6. Create a new own data property.
        let new_desc = PropertyDescriptor::data(v, true, true, true);
        Self::define_own_property(agent, o, p, &new_desc, throw)?;
        Ok(())
    }

    /// ### [8.12.6 \[\[HasProperty\]\] (P)](https://262.ecma-international.org/5.1/#sec-8.12.6)
    pub fn has_property(agent: &mut Agent, o: Handle<ObjectData>, p: Handle<HeapString>) -> bool {
        Self::get_property(agent, o, p).is_some()
    }

    /// ### [8.12.7 \[\[Delete\]\] (P, Throw)](https://262.ecma-international.org/5.1/#sec-8.12.7)
    pub fn delete(
        agent: &mut Agent,
        o: Handle<ObjectData>,
        p: Handle<HeapString>,
        throw: bool,
    ) -> JsResult<bool> {
        // 1. Let desc be the result of calling [[GetOwnProperty]] with P.
        let Some(desc) = Self::get_own_property(agent, o, p) else {
            // 2. If desc is undefined, return true.
            return Ok(true);
        };

        // 3. If desc.[[Configurable]] is true, remove the property.
        if desc.configurable == Some(true) {
            o.property_map().delete_property(&p);
            return Ok(true);
        }

        // 4. Else reject.
        if throw {
            let name = p.to_std_string();
            return Err(agent.throw_exception(
                ErrorKind::TypeError,
                &format!("cannot delete property '{name}'"),
            ));
        }
        Ok(false)
    }

    /// ### [8.12.8 \[\[DefaultValue\]\] (hint)](https://262.ecma-international.org/5.1/#sec-8.12.8)
    pub fn default_value(
        agent: &mut Agent,
        o: Handle<ObjectData>,
        hint: PreferredType,
    ) -> JsResult<Handle<Value>> {
        let to_string_key = agent.well_known(|s| s.to_string);
        let value_of_key = agent.well_known(|s| s.value_of);
        let method_names = match hint {
            // Hint String tries toString before valueOf.
            PreferredType::String => [to_string_key, value_of_key],
            // Hint Number (and no hint) tries valueOf before toString.
            PreferredType::Number => [value_of_key, to_string_key],
        };

        for name in method_names {
            let method = Self::get(agent, o, name)?;
            if method.value().is_callable() {
                let result = Self::call(agent, method.cast(), o.cast(), &[])?;
                if result.value().is_primitive() {
                    return Ok(result);
                }
            }
        }

        Err(agent.throw_exception(ErrorKind::TypeError, "cannot convert object to primitive value"))
    }

    /// ### [8.12.9 \[\[DefineOwnProperty\]\] (P, Desc, Throw)](https://262.ecma-international.org/5.1/#sec-8.12.9)
    pub fn define_own_property(
        agent: &mut Agent,
        o: Handle<ObjectData>,
        p: Handle<HeapString>,
        desc: &PropertyDescriptor,
        throw: bool,
    ) -> JsResult<bool> {
        if o.tag() == HeapTag::JsArray {
            return crate::ecmascript::builtins::array::array_define_own_property(
                agent, o, p, desc, throw,
            );
        }
        Self::ordinary_define_own_property(agent, o, p, desc, throw)
    }

    pub fn ordinary_define_own_property(
        agent: &mut Agent,
        o: Handle<ObjectData>,
        p: Handle<HeapString>,
        desc: &PropertyDescriptor,
        throw: bool,
    ) -> JsResult<bool> {
        fn reject(agent: &mut Agent, p: Handle<HeapString>, throw: bool) -> JsResult<bool> {
            if throw {
                let name = p.to_std_string();
                Err(agent.throw_exception(
                    ErrorKind::TypeError,
                    &format!("cannot redefine property '{name}'"),
                ))
            } else {
                Ok(false)
            }
        }

        // 1. Let current be the result of calling [[GetOwnProperty]] with P.
        let current = Self::get_own_property(agent, o, p);
        // 2. Let extensible be the value of the [[Extensible]] internal
        //    property of O.
        let extensible = o.extensible();

        let Some(current) = current else {
            // 3. If current is undefined and extensible is false, reject.
            if !extensible {
                return reject(agent, p, throw);
            }
            // 4. Create an own property from Desc, defaulting every absent
            //    field.
            Self::store_property(agent, o, p, desc);
            return Ok(true);
        };

        // 5. Return true if every field in Desc is absent.
        if desc.is_empty() {
            return Ok(true);
        }

        // 6. Return true if every field in Desc also occurs in current and
        //    the value of every field in Desc is the same value as the
        //    corresponding field in current.
        if descriptor_fields_match(&current, desc) {
            return Ok(true);
        }

        // 7. If the [[Configurable]] field of current is false:
        if current.configurable != Some(true) {
            // a. Reject if the [[Configurable]] field of Desc is true.
            if desc.configurable == Some(true) {
                return reject(agent, p, throw);
            }
            // b. Reject if [[Enumerable]] would flip.
            if let Some(enumerable) = desc.enumerable {
                if enumerable != current.enumerable.unwrap_or(false) {
                    return reject(agent, p, throw);
                }
            }
            if !desc.is_generic_descriptor() {
                // 9.a Reject when the descriptor kind would change.
                if desc.is_data_descriptor() != current.is_data_descriptor() {
                    return reject(agent, p, throw);
                }
                if current.is_data_descriptor() {
                    // 10.a Reject a non-writable property changing value or
                    //      becoming writable.
                    if current.writable != Some(true) {
                        if desc.writable == Some(true) {
                            return reject(agent, p, throw);
                        }
                        if let (Some(new), Some(old)) = (desc.value, current.value) {
                            if !same_value(new.value(), old.value()) {
                                return reject(agent, p, throw);
                            }
                        }
                    }
                } else {
                    // 11.a Reject a changing getter or setter.
                    if let (Some(new), Some(old)) = (desc.set, current.set) {
                        if !same_value(new.value(), old.value()) {
                            return reject(agent, p, throw);
                        }
                    }
                    if let (Some(new), Some(old)) = (desc.get, current.get) {
                        if !same_value(new.value(), old.value()) {
                            return reject(agent, p, throw);
                        }
                    }
                }
            }
        }

        // 8.-12. Merge Desc into the stored property, converting kind when
        //        needed while preserving [[Enumerable]]/[[Configurable]].
        let undefined = Handle::new(agent, Value::UNDEFINED);
        let merged = if desc.is_generic_descriptor()
            || desc.is_data_descriptor() == current.is_data_descriptor()
        {
            PropertyDescriptor {
                value: desc.value.or(current.value),
                writable: desc.writable.or(current.writable),
                get: desc.get.or(current.get),
                set: desc.set.or(current.set),
                enumerable: desc.enumerable.or(current.enumerable),
                configurable: desc.configurable.or(current.configurable),
            }
        } else if desc.is_data_descriptor() {
            PropertyDescriptor {
                value: Some(desc.value.unwrap_or(undefined)),
                writable: Some(desc.writable.unwrap_or(false)),
                get: None,
                set: None,
                enumerable: desc.enumerable.or(current.enumerable),
                configurable: desc.configurable.or(current.configurable),
            }
        } else {
            PropertyDescriptor {
                value: None,
                writable: None,
                get: Some(desc.get.unwrap_or(undefined)),
                set: Some(desc.set.unwrap_or(undefined)),
                enumerable: desc.enumerable.or(current.enumerable),
                configurable: desc.configurable.or(current.configurable),
            }
        };
        Self::store_property(agent, o, p, &merged);

        // 13. Return true.
        Ok(true)
    }

    /// Writes a property into the object's map, swapping in the grown map
    /// when the insert rehashes.
    fn store_property(
        agent: &mut Agent,
        o: Handle<ObjectData>,
        p: Handle<HeapString>,
        desc: &PropertyDescriptor,
    ) {
        let map: Handle<PropertyMap> = Handle::<Value>::new(agent, o.properties()).cast();
        let map = PropertyMap::set_property(agent, map, p, desc);
        o.set_properties(map.value());
    }

    /// ### [13.2.1 \[\[Call\]\]](https://262.ecma-international.org/5.1/#sec-13.2.1)
    pub fn call(
        agent: &mut Agent,
        f: Handle<ObjectData>,
        this: Handle<Value>,
        args: &[Handle<Value>],
    ) -> JsResult<Handle<Value>> {
        match f.tag() {
            HeapTag::JsFunction => crate::ecmascript::builtins::function::call_ecmascript_function(
                agent,
                f.cast(),
                this,
                args,
            ),
            HeapTag::BuiltinFunction => {
                crate::ecmascript::builtins::builtin_function::call_builtin_function(
                    agent,
                    f.cast(),
                    this,
                    args,
                )
            }
            _ => Err(agent.throw_exception(ErrorKind::TypeError, "value is not a function")),
        }
    }

    /// ### [13.2.2 \[\[Construct\]\]](https://262.ecma-international.org/5.1/#sec-13.2.2)
    pub fn construct(
        agent: &mut Agent,
        f: Handle<ObjectData>,
        args: &[Handle<Value>],
    ) -> JsResult<Handle<ObjectData>> {
        match f.tag() {
            HeapTag::JsFunction => {
                crate::ecmascript::builtins::function::construct_ecmascript_function(
                    agent,
                    f.cast(),
                    args,
                )
            }
            HeapTag::BuiltinFunction if f.is_constructor() => {
                crate::ecmascript::builtins::builtin_function::construct_builtin_function(
                    agent,
                    f.cast(),
                    args,
                )
            }
            _ => Err(agent.throw_exception(ErrorKind::TypeError, "value is not a constructor")),
        }
    }

    /// Collects the own property names of `o` paired with their
    /// enumerability, in table order. String wrappers contribute their
    /// synthesised index properties first.
    pub fn own_property_entries(
        agent: &mut Agent,
        o: Handle<ObjectData>,
    ) -> Vec<(Handle<HeapString>, bool)> {
        let mut entries = Vec::new();
        if o.tag() == HeapTag::JsString {
            let length = crate::ecmascript::builtins::string::wrapped_string_length(o);
            for index in 0..length {
                let key = agent.intern_str(&index.to_string());
                entries.push((key, true));
            }
        }
        let mut raw: Vec<(Value, bool)> = Vec::new();
        o.property_map().for_each(|key, stored| {
            raw.push((key, stored.header().enumerable()));
        });
        for (key, enumerable) in raw {
            entries.push((Handle::<Value>::new(agent, key).cast(), enumerable));
        }
        entries
    }
}

/// Step 6 of 8.12.9: every present field of `desc` matches `current`.
fn descriptor_fields_match(current: &PropertyDescriptor, desc: &PropertyDescriptor) -> bool {
    fn value_matches(new: Option<Handle<Value>>, old: Option<Handle<Value>>) -> bool {
        match (new, old) {
            (None, _) => true,
            (Some(new), Some(old)) => same_value(new.value(), old.value()),
            (Some(_), None) => false,
        }
    }
    fn bool_matches(new: Option<bool>, old: Option<bool>) -> bool {
        match (new, old) {
            (None, _) => true,
            (Some(new), Some(old)) => new == old,
            (Some(_), None) => false,
        }
    }
    value_matches(desc.value, current.value)
        && value_matches(desc.get, current.get)
        && value_matches(desc.set, current.set)
        && bool_matches(desc.writable, current.writable)
        && bool_matches(desc.enumerable, current.enumerable)
        && bool_matches(desc.configurable, current.configurable)
}

/// A wrapper object carrying a `[[PrimitiveValue]]` slot; the layout behind
/// the `JsString`, `JsBoolean` and `JsNumber` tags.
#[repr(C)]
pub struct PrimitiveObjectData {
    pub(crate) object: ObjectData,
    primitive: Cell<Value>,
}

impl HeapData for PrimitiveObjectData {}

impl PrimitiveObjectData {
    #[inline]
    pub fn primitive_value(&self) -> Value {
        self.primitive.get()
    }

    pub(crate) fn primitive_slot(&self) -> *mut Value {
        self.primitive.as_ptr()
    }
}

impl Agent {
    /// Allocates a bare object. The property map is created first and kept
    /// rooted so the object allocation cannot move it.
    pub(crate) fn new_object_with_tag(
        &mut self,
        tag: HeapTag,
        class: ObjectClass,
        prototype: Handle<Value>,
    ) -> Handle<ObjectData> {
        let map = self.new_property_map();
        let ptr = self.allocate(size_of::<ObjectData>());
        // SAFETY: freshly allocated memory of the right size.
        unsafe {
            core::ptr::write(
                ptr.as_ptr() as *mut ObjectData,
                ObjectData {
                    header: Header::new(tag),
                    properties: Cell::new(map.value()),
                    prototype: Cell::new(prototype.value()),
                },
            );
        }
        let object: Handle<ObjectData> = Handle::new(self, Value::from_ptr(ptr));
        object.header.set_class(class);
        object.header.set_extensible(true);
        object
    }

    /// An ordinary object with `Object.prototype` as its prototype.
    pub fn new_plain_object(&mut self) -> Handle<ObjectData> {
        let prototype = self.intrinsics.object_prototype;
        let prototype = Handle::new(self, prototype);
        self.new_object_with_tag(HeapTag::JsObject, ObjectClass::Object, prototype)
    }

    pub fn new_object_with_prototype(&mut self, prototype: Handle<Value>) -> Handle<ObjectData> {
        self.new_object_with_tag(HeapTag::JsObject, ObjectClass::Object, prototype)
    }

    pub(crate) fn new_primitive_object(
        &mut self,
        tag: HeapTag,
        class: ObjectClass,
        prototype: Handle<Value>,
        primitive: Handle<Value>,
    ) -> Handle<ObjectData> {
        let map = self.new_property_map();
        let ptr = self.allocate(size_of::<PrimitiveObjectData>());
        // SAFETY: freshly allocated memory of the right size.
        unsafe {
            core::ptr::write(
                ptr.as_ptr() as *mut PrimitiveObjectData,
                PrimitiveObjectData {
                    object: ObjectData {
                        header: Header::new(tag),
                        properties: Cell::new(map.value()),
                        prototype: Cell::new(prototype.value()),
                    },
                    primitive: Cell::new(primitive.value()),
                },
            );
        }
        let object: Handle<ObjectData> = Handle::new(self, Value::from_ptr(ptr));
        object.header.set_class(class);
        object.header.set_extensible(true);
        object
    }
}
