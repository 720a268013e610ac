// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.6 Arguments Object](https://262.ecma-international.org/5.1/#sec-10.6)
//!
//! The simple non-aliasing form: indexed data properties for each actual
//! argument, `length`, and `callee`. Writing an element does not write the
//! corresponding parameter binding.

use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::types::language::object::ObjectData;
use crate::ecmascript::types::spec::property_descriptor::PropertyDescriptor;
use crate::engine::value::Value;
use crate::heap::handle::Handle;
use crate::heap::header::{HeapTag, ObjectClass};

pub fn create_arguments_object(
    agent: &mut Agent,
    callee: Handle<ObjectData>,
    args: &[Handle<Value>],
) -> Handle<ObjectData> {
    // 1.-4. An ordinary object of class "Arguments" whose prototype is the
    //       standard object prototype.
    let prototype = {
        let proto = agent.intrinsics.object_prototype;
        Handle::new(agent, proto)
    };
    let obj = agent.new_object_with_tag(HeapTag::JsObject, ObjectClass::Arguments, prototype);

    // 5.-6. length: the number of actual arguments.
    let length = Handle::new(agent, Value::from_u32(args.len() as u32));
    let key = agent.well_known(|s| s.length);
    let descriptor = PropertyDescriptor::data(length, true, false, true);
    ObjectData::define_own_property(agent, obj, key, &descriptor, false)
        .expect("defining length on a fresh object cannot fail");

    // 7. One enumerable indexed property per actual argument.
    for (index, value) in args.iter().enumerate() {
        let key = agent.intern_str(&index.to_string());
        let descriptor = PropertyDescriptor::data(*value, true, true, true);
        ObjectData::define_own_property(agent, obj, key, &descriptor, false)
            .expect("defining an index on a fresh object cannot fail");
    }

    // 13. callee refers to the called function.
    let key = agent.well_known(|s| s.callee);
    let descriptor = PropertyDescriptor::data(callee.cast(), true, false, true);
    ObjectData::define_own_property(agent, obj, key, &descriptor, false)
        .expect("defining callee on a fresh object cannot fail");

    obj
}
