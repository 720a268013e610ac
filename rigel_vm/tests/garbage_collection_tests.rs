// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collector behaviour under allocation pressure: handles stay valid across
//! moves, repeated collections are idempotent over the live set, and
//! long-running programs on a tiny heap complete correctly.

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use rigel_vm::ecmascript::abstract_operations::type_conversion::to_string;
use rigel_vm::heap::copying_heap::HeapOptions;
use rigel_vm::{Agent, AgentOptions, CompletionType, Handle, Interpreter, Value};

/// Arenas small enough that ordinary test programs collect many times.
fn tiny_heap_agent() -> Agent {
    Agent::new(AgentOptions {
        heap: HeapOptions {
            mutable_size: 256 * 1024,
            constant_size: 256 * 1024,
        },
    })
}

fn eval_with(agent: &mut Agent, source: &str) -> String {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::default().with_script(true)).parse();
    assert!(parsed.errors.is_empty(), "parse errors: {:?}", parsed.errors);
    let completion = Interpreter::new(agent).execute(&parsed.program);
    assert_eq!(completion.kind, CompletionType::Normal);
    let value = completion.value.expect("program produced no value");
    to_string(agent, value)
        .expect("result is convertible to string")
        .to_std_string()
}

#[test]
fn handles_survive_forced_collections() {
    let mut agent = tiny_heap_agent();
    let string = agent.new_string("survivor");
    let array = agent.new_internal_array(3, Value::from_i32(7));
    array.set(0, string.value());

    let before = string.value();
    agent.collect_garbage();
    agent.collect_garbage();

    // The handle reads the relocated object; the raw value is stale.
    assert_ne!(string.value(), before);
    assert_eq!(string.to_std_string(), "survivor");
    assert_eq!(array.len(), 3);
    assert_eq!(array.get(1).get_int(), 7);
    // The array's slot was rewritten to the same relocated string.
    assert_eq!(array.get(0), string.value());
}

#[test]
fn collection_is_idempotent_over_the_live_set() {
    let mut agent = tiny_heap_agent();
    let object = agent.new_plain_object();
    let key = agent.intern_str("answer");
    let value = Handle::new(&mut agent, Value::from_i32(42));
    let descriptor =
        rigel_vm::ecmascript::types::spec::property_descriptor::PropertyDescriptor::data(
            value, true, true, true,
        );
    rigel_vm::ecmascript::types::language::object::ObjectData::define_own_property(
        &mut agent, object, key, &descriptor, false,
    )
    .unwrap();

    agent.collect_garbage();
    let first_used = agent_used(&agent);
    agent.collect_garbage();
    agent.collect_garbage();

    // Repeated collections with no intervening mutation retain the same
    // live footprint, and the object still answers.
    assert_eq!(agent_used(&agent), first_used);
    let read = rigel_vm::ecmascript::types::language::object::ObjectData::get(
        &mut agent, object, key,
    )
    .unwrap();
    assert_eq!(read.value().get_int(), 42);
}

fn agent_used(agent: &Agent) -> usize {
    agent.heap_used_bytes()
}

#[test]
fn string_building_under_pressure() {
    let mut agent = tiny_heap_agent();
    // Builds and discards thousands of intermediate strings; the live set
    // stays small while total allocation far exceeds the arena.
    let result = eval_with(
        &mut agent,
        r#"
            var s = "";
            for (var i = 0; i < 2000; i++) { s = "x" + "y" + (i % 10); }
            s
        "#,
    );
    assert_eq!(result, "xy9");
    assert!(agent.collection_count() > 0, "expected forced collections");
}

#[test]
fn object_graphs_survive_collections() {
    let mut agent = tiny_heap_agent();
    let result = eval_with(
        &mut agent,
        r#"
            function make(n) {
                var head = null;
                for (var i = 0; i < n; i++) { head = { value: i, next: head }; }
                return head;
            }
            var keep = make(50);
            // Churn the heap with garbage graphs.
            for (var round = 0; round < 200; round++) { make(20); }
            var sum = 0;
            for (var node = keep; node !== null; node = node.next) { sum += node.value; }
            sum
        "#,
    );
    assert_eq!(result, "1225");
    assert!(agent.collection_count() > 0, "expected forced collections");
}

#[test]
fn closures_and_environments_survive_collections() {
    let mut agent = tiny_heap_agent();
    let result = eval_with(
        &mut agent,
        r#"
            function adder(n) { return function(m) { return n + m; }; }
            var fns = [];
            for (var i = 0; i < 30; i++) { fns.push(adder(i)); }
            for (var round = 0; round < 300; round++) { adder(round)(1); }
            var total = 0;
            for (var j = 0; j < 30; j++) { total += fns[j](0); }
            total
        "#,
    );
    assert_eq!(result, "435");
    assert!(agent.collection_count() > 0, "expected forced collections");
}

#[test]
fn interned_strings_do_not_move() {
    let mut agent = tiny_heap_agent();
    let interned = agent.intern_str("stable");
    let before = interned.value();
    agent.collect_garbage();
    assert_eq!(interned.value(), before);
    assert_eq!(interned.to_std_string(), "stable");
}

#[test]
fn property_maps_rehash_across_collections() {
    let mut agent = tiny_heap_agent();
    let result = eval_with(
        &mut agent,
        r#"
            var o = {};
            for (var i = 0; i < 200; i++) { o["key" + i] = i; }
            var sum = 0;
            for (var j = 0; j < 200; j++) { sum += o["key" + j]; }
            sum
        "#,
    );
    assert_eq!(result, "19900");
}
