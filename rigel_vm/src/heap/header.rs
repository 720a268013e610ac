// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Every heap-resident object begins with a single 64-bit metadata word
//! packing the heap type tag, the object's `[[Class]]`, the error subtype,
//! and nine context-dependent flag bits. The same flag positions are reused
//! by different heap types; the type tag selects the interpretation:
//! writable/enumerable/configurable belong to property descriptors,
//! deletable/mutable to bindings, and provide-this to object environment
//! records.

use core::cell::Cell;

/// The heap type tag, stored in bits 0..8 of the metadata word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HeapTag {
    String = 0,
    Object,
    Array,
    DataDescriptor,
    AccessorDescriptor,
    GenericDescriptor,
    PropertyMap,
    Binding,
    BuiltinFunction,
    HashMap,
    DeclarativeEnvironment,
    ObjectEnvironment,
    LexicalEnvironment,
    GlobalObject,
    JsObject,
    JsFunction,
    JsArray,
    JsString,
    JsBoolean,
    JsNumber,
    JsError,
}

impl HeapTag {
    /// Language-level objects, as opposed to engine-internal heap types.
    #[inline]
    pub fn is_language_object(self) -> bool {
        matches!(
            self,
            HeapTag::Object
                | HeapTag::BuiltinFunction
                | HeapTag::GlobalObject
                | HeapTag::JsObject
                | HeapTag::JsFunction
                | HeapTag::JsArray
                | HeapTag::JsString
                | HeapTag::JsBoolean
                | HeapTag::JsNumber
                | HeapTag::JsError
        )
    }

    fn from_bits(bits: u8) -> Self {
        debug_assert!(bits <= HeapTag::JsError as u8);
        // SAFETY: the tag byte is only ever written from a HeapTag.
        unsafe { core::mem::transmute(bits) }
    }
}

/// ### [8.6.2 Object Internal Properties](https://262.ecma-international.org/5.1/#sec-8.6.2)
///
/// The `[[Class]]` of an object, stored in bits 8..16.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ObjectClass {
    GlobalObject = 0,
    Arguments,
    Array,
    Boolean,
    Date,
    Error,
    Function,
    Json,
    Math,
    Number,
    Object,
    RegExp,
    String,
}

impl ObjectClass {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectClass::GlobalObject => "global",
            ObjectClass::Arguments => "Arguments",
            ObjectClass::Array => "Array",
            ObjectClass::Boolean => "Boolean",
            ObjectClass::Date => "Date",
            ObjectClass::Error => "Error",
            ObjectClass::Function => "Function",
            ObjectClass::Json => "JSON",
            ObjectClass::Math => "Math",
            ObjectClass::Number => "Number",
            ObjectClass::Object => "Object",
            ObjectClass::RegExp => "RegExp",
            ObjectClass::String => "String",
        }
    }

    fn from_bits(bits: u8) -> Self {
        debug_assert!(bits <= ObjectClass::String as u8);
        // SAFETY: the class byte is only ever written from an ObjectClass.
        unsafe { core::mem::transmute(bits) }
    }
}

/// ### [15.11 Error Objects](https://262.ecma-international.org/5.1/#sec-15.11)
///
/// The native error subtype, stored in bits 16..24 of an error object's
/// header. Doubles as the exception kind raised through the agent's
/// pending-exception slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorKind {
    Error = 0,
    EvalError,
    RangeError,
    ReferenceError,
    SyntaxError,
    TypeError,
    UriError,
}

impl ErrorKind {
    pub const COUNT: usize = 7;

    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::EvalError => "EvalError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::UriError => "URIError",
        }
    }

    fn from_bits(bits: u8) -> Self {
        debug_assert!((bits as usize) < ErrorKind::COUNT);
        // SAFETY: the error byte is only ever written from an ErrorKind.
        unsafe { core::mem::transmute(bits) }
    }
}

const TAG_SHIFT: u64 = 0;
const CLASS_SHIFT: u64 = 8;
const ERROR_SHIFT: u64 = 16;

const EXTENSIBLE_BIT: u64 = 1 << 24;
const CALLABLE_BIT: u64 = 1 << 25;
const CONSTRUCTOR_BIT: u64 = 1 << 26;
const WRITABLE_BIT: u64 = 1 << 27;
const ENUMERABLE_BIT: u64 = 1 << 28;
const CONFIGURABLE_BIT: u64 = 1 << 29;
const DELETABLE_BIT: u64 = 1 << 30;
const MUTABLE_BIT: u64 = 1 << 31;
const PROVIDE_THIS_BIT: u64 = 1 << 32;

/// The 64-bit metadata word at offset zero of every heap object.
#[derive(Debug)]
#[repr(transparent)]
pub struct Header(Cell<u64>);

impl Header {
    pub fn new(tag: HeapTag) -> Self {
        Header(Cell::new((tag as u64) << TAG_SHIFT))
    }

    #[inline]
    pub fn tag(&self) -> HeapTag {
        HeapTag::from_bits((self.0.get() >> TAG_SHIFT) as u8)
    }

    #[inline]
    pub fn class(&self) -> ObjectClass {
        ObjectClass::from_bits((self.0.get() >> CLASS_SHIFT) as u8)
    }

    pub fn set_class(&self, class: ObjectClass) {
        let bits = self.0.get() & !(0xFF << CLASS_SHIFT);
        self.0.set(bits | ((class as u64) << CLASS_SHIFT));
    }

    #[inline]
    pub fn error_kind(&self) -> ErrorKind {
        ErrorKind::from_bits((self.0.get() >> ERROR_SHIFT) as u8)
    }

    pub fn set_error_kind(&self, kind: ErrorKind) {
        let bits = self.0.get() & !(0xFF << ERROR_SHIFT);
        self.0.set(bits | ((kind as u64) << ERROR_SHIFT));
    }

    #[inline]
    fn flag(&self, bit: u64) -> bool {
        self.0.get() & bit != 0
    }

    #[inline]
    fn set_flag(&self, bit: u64, value: bool) {
        let bits = self.0.get();
        self.0.set(if value { bits | bit } else { bits & !bit });
    }

    pub fn extensible(&self) -> bool {
        self.flag(EXTENSIBLE_BIT)
    }

    pub fn set_extensible(&self, value: bool) {
        self.set_flag(EXTENSIBLE_BIT, value);
    }

    pub fn callable(&self) -> bool {
        self.flag(CALLABLE_BIT)
    }

    pub fn set_callable(&self, value: bool) {
        self.set_flag(CALLABLE_BIT, value);
    }

    pub fn is_constructor(&self) -> bool {
        self.flag(CONSTRUCTOR_BIT)
    }

    pub fn set_is_constructor(&self, value: bool) {
        self.set_flag(CONSTRUCTOR_BIT, value);
    }

    pub fn writable(&self) -> bool {
        self.flag(WRITABLE_BIT)
    }

    pub fn set_writable(&self, value: bool) {
        self.set_flag(WRITABLE_BIT, value);
    }

    pub fn enumerable(&self) -> bool {
        self.flag(ENUMERABLE_BIT)
    }

    pub fn set_enumerable(&self, value: bool) {
        self.set_flag(ENUMERABLE_BIT, value);
    }

    pub fn configurable(&self) -> bool {
        self.flag(CONFIGURABLE_BIT)
    }

    pub fn set_configurable(&self, value: bool) {
        self.set_flag(CONFIGURABLE_BIT, value);
    }

    pub fn deletable(&self) -> bool {
        self.flag(DELETABLE_BIT)
    }

    pub fn set_deletable(&self, value: bool) {
        self.set_flag(DELETABLE_BIT, value);
    }

    pub fn mutable(&self) -> bool {
        self.flag(MUTABLE_BIT)
    }

    pub fn set_mutable(&self, value: bool) {
        self.set_flag(MUTABLE_BIT, value);
    }

    pub fn provide_this(&self) -> bool {
        self.flag(PROVIDE_THIS_BIT)
    }

    pub fn set_provide_this(&self, value: bool) {
        self.set_flag(PROVIDE_THIS_BIT, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_independent() {
        let header = Header::new(HeapTag::DataDescriptor);
        header.set_writable(true);
        header.set_configurable(true);
        assert!(header.writable());
        assert!(!header.enumerable());
        assert!(header.configurable());
        header.set_writable(false);
        assert!(!header.writable());
        assert!(header.configurable());
        assert_eq!(header.tag(), HeapTag::DataDescriptor);
    }

    #[test]
    fn tag_class_and_error_kind_share_the_word() {
        let header = Header::new(HeapTag::JsError);
        header.set_class(ObjectClass::Error);
        header.set_error_kind(ErrorKind::TypeError);
        header.set_extensible(true);
        assert_eq!(header.tag(), HeapTag::JsError);
        assert_eq!(header.class(), ObjectClass::Error);
        assert_eq!(header.error_kind(), ErrorKind::TypeError);
        assert!(header.extensible());
    }
}
