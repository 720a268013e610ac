// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Well-known strings, interned once at agent start-up. They live in the
//! constant arena so the raw values may be stored outside the root set.

use crate::ecmascript::execution::agent::Agent;
use crate::engine::value::Value;

macro_rules! static_strings {
    ($( $field:ident => $text:literal, )*) => {
        #[derive(Default)]
        pub struct StaticStrings {
            $( pub $field: Value, )*
        }

        impl StaticStrings {
            pub(crate) fn init(agent: &mut Agent) -> StaticStrings {
                StaticStrings {
                    $( $field: agent.intern_str($text).value(), )*
                }
            }
        }
    };
}

static_strings! {
    arguments => "arguments",
    callee => "callee",
    configurable => "configurable",
    constructor => "constructor",
    empty => "",
    enumerable => "enumerable",
    get => "get",
    length => "length",
    message => "message",
    name => "name",
    prototype => "prototype",
    set => "set",
    to_string => "toString",
    value => "value",
    value_of => "valueOf",
    writable => "writable",
}
