// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end programs driven through the public API: parse with oxc,
//! evaluate, and observe the final statement value.

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use rigel_vm::ecmascript::abstract_operations::type_conversion::to_string;
use rigel_vm::ecmascript::builtins::error::uncaught_exception_message;
use rigel_vm::{Agent, AgentOptions, CompletionType, Interpreter};

/// Runs `source` as a program and renders the completion value with
/// `ToString`.
fn eval_to_string(source: &str) -> String {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::default().with_script(true)).parse();
    assert!(
        parsed.errors.is_empty(),
        "parse errors in {source:?}: {:?}",
        parsed.errors
    );

    let mut agent = Agent::new(AgentOptions::test_options());
    let completion = Interpreter::new(&mut agent).execute(&parsed.program);
    if completion.kind == CompletionType::Throw {
        let value = completion.value.expect("throw completion carries a value");
        panic!(
            "uncaught exception in {source:?}: {}",
            uncaught_exception_message(&mut agent, value)
        );
    }
    assert_eq!(completion.kind, CompletionType::Normal);
    let value = completion.value.expect("program produced no value");
    to_string(&mut agent, value)
        .expect("result is convertible to string")
        .to_std_string()
}

/// Runs `source` expecting an uncaught exception, and renders it as
/// `name: message`.
fn eval_to_exception(source: &str) -> String {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::default().with_script(true)).parse();
    assert!(parsed.errors.is_empty(), "parse errors: {:?}", parsed.errors);

    let mut agent = Agent::new(AgentOptions::test_options());
    let completion = Interpreter::new(&mut agent).execute(&parsed.program);
    assert_eq!(completion.kind, CompletionType::Throw, "no exception from {source:?}");
    let value = completion.value.expect("throw completion carries a value");
    uncaught_exception_message(&mut agent, value)
}

#[test]
fn fibonacci_and_closures() {
    let source = "function f(a,b,c){var x=10;function g(d){function h(){return d+x;}return h();}return g(4);}\nf(1,2,3)";
    assert_eq!(eval_to_string(source), "14");
}

#[test]
fn array_join_with_holes() {
    assert_eq!(eval_to_string("var a=[1,2,,,5]; a.join()"), "1,2,,,5");
}

#[test]
fn try_finally_ordering() {
    let source = r#"var s=""; try { try { s+="t"; throw Error("a"); } finally { s+="f"; } } catch(e){ s+=e.message; } finally { s+="g"; } s"#;
    assert_eq!(eval_to_string(source), "tfag");
}

#[test]
fn for_in_with_prototype_chain_and_shadowing() {
    let source = r#"
        var a={y:2,"1":3}; Object.defineProperty(a,"x",{value:1});
        var b={x:3}; Object.setPrototypeOf(a,b);
        var tab=[]; for(var i in a) tab.push(i); tab.sort(); tab.toString()
    "#;
    assert_eq!(eval_to_string(source), "1,y");
}

#[test]
fn array_length_truncation_with_non_configurable_element() {
    let source = r#"
        var a=[1,2,3,4,5]; Object.defineProperty(a,"3",{configurable:false});
        var err=false; try{ a.length=2; }catch(e){ err=true; }
        err && a.toString()
    "#;
    assert_eq!(eval_to_string(source), "1,2,3,4");
}

#[test]
fn to_number_on_unusual_strings() {
    let source = r#"(NaN|0) === 0 && (Infinity|0) === 0 && ("0x12345"|0) === 0x12345 && ((4294967296*3-4)|0) === -4"#;
    assert_eq!(eval_to_string(source), "true");
}

#[test]
fn var_hoisting_and_function_declarations() {
    assert_eq!(
        eval_to_string("function f(){ return typeof x; } var x = 1; f()"),
        "number"
    );
    assert_eq!(eval_to_string("g(); function g(){ return 42; }"), "42");
    assert_eq!(eval_to_string("typeof y"), "undefined");
}

#[test]
fn global_hoisting_over_non_configurable_property_throws() {
    // NaN is a non-configurable, non-writable global; a top-level function
    // declaration of that name aborts instantiation with TypeError.
    let message = eval_to_exception("function NaN(){} NaN()");
    assert!(message.starts_with("TypeError:"), "got {message}");
    let message = eval_to_exception("function undefined(){}");
    assert!(message.starts_with("TypeError:"), "got {message}");
}

#[test]
fn global_hoisting_over_configurable_property_rebinds() {
    // print is writable and configurable, so the declaration takes the
    // slot over.
    assert_eq!(
        eval_to_string("function print(){ return \"mine\"; } print()"),
        "mine"
    );
}

#[test]
fn assignment_operators() {
    assert_eq!(eval_to_string("var x = 5; x += 2; x *= 3; x -= 1; x"), "20");
    assert_eq!(eval_to_string("var x = 7; x %= 4; x <<= 2; x |= 1; x"), "13");
    assert_eq!(eval_to_string("var s = 'a'; s += 'b' + 'c'; s"), "abc");
}

#[test]
fn update_expressions() {
    assert_eq!(eval_to_string("var x = 1; [x++, x, ++x, x].join()"), "1,2,3,3");
    assert_eq!(eval_to_string("var o = {n: 5}; o.n--; o.n"), "4");
    assert_eq!(eval_to_string("var x = '4'; x++; x"), "5");
}

#[test]
fn logical_operators_return_operand_values() {
    assert_eq!(eval_to_string("0 || 'fallback'"), "fallback");
    assert_eq!(eval_to_string("'first' && 'second'"), "second");
    assert_eq!(eval_to_string("null || 0 || '' || 'last'"), "last");
    assert_eq!(eval_to_string("false && missing()"), "false");
}

#[test]
fn switch_fall_through() {
    let source = r#"
        var s = "";
        switch (2) {
            case 1: s += "a";
            case 2: s += "b";
            case 3: s += "c"; break;
            case 4: s += "d";
            default: s += "e";
        }
        s
    "#;
    assert_eq!(eval_to_string(source), "bc");
}

#[test]
fn switch_default_in_the_middle() {
    let source = r#"
        var s = "";
        switch (9) {
            case 1: s += "a";
            default: s += "d";
            case 2: s += "b";
        }
        s
    "#;
    assert_eq!(eval_to_string(source), "db");
}

#[test]
fn labelled_break_and_continue() {
    let source = r#"
        var log = [];
        outer: for (var i = 0; i < 3; i++) {
            for (var j = 0; j < 3; j++) {
                if (j === 2) continue outer;
                if (i === 2) break outer;
                log.push(i + ":" + j);
            }
        }
        log.join(" ")
    "#;
    assert_eq!(eval_to_string(source), "0:0 0:1 1:0 1:1");
}

#[test]
fn do_while_and_while() {
    assert_eq!(
        eval_to_string("var n = 0; do { n++; } while (n < 5); n"),
        "5"
    );
    assert_eq!(
        eval_to_string("var n = 10; while (n > 0) { n -= 3; } n"),
        "-2"
    );
}

#[test]
fn with_statement_scoping() {
    let source = r#"
        var o = { x: 1 };
        var x = 9;
        var r;
        with (o) { r = x; x = 2; }
        r + "," + o.x + "," + x
    "#;
    assert_eq!(eval_to_string(source), "1,2,9");
}

#[test]
fn typeof_operator() {
    assert_eq!(
        eval_to_string(
            "[typeof undefined, typeof null, typeof 1, typeof 'x', typeof true, typeof {}, typeof print, typeof missing].join(' ')"
        ),
        "undefined object number string boolean object function undefined"
    );
}

#[test]
fn delete_operator() {
    let source = r#"
        var o = { a: 1 };
        var first = delete o.a;
        var second = "a" in o;
        [first, second].join()
    "#;
    assert_eq!(eval_to_string(source), "true,false");
}

#[test]
fn in_and_instanceof() {
    let source = r#"
        function Animal(name){ this.name = name; }
        var cat = new Animal("cat");
        [cat instanceof Animal, cat instanceof Object, "name" in cat, "missing" in cat].join()
    "#;
    assert_eq!(eval_to_string(source), "true,true,true,false");
}

#[test]
fn constructors_return_objects() {
    let source = r#"
        function Point(x, y){ this.x = x; this.y = y; }
        Point.prototype.norm = function(){ return this.x * this.x + this.y * this.y; };
        new Point(3, 4).norm()
    "#;
    assert_eq!(eval_to_string(source), "25");
}

#[test]
fn constructor_result_object_wins() {
    let source = r#"
        function Maker(){ this.ignored = true; return { tag: "explicit" }; }
        new Maker().tag
    "#;
    assert_eq!(eval_to_string(source), "explicit");
}

#[test]
fn accessor_properties() {
    let source = r#"
        var store = { raw: 2 };
        var o = {
            get double() { return store.raw * 2; },
            set double(v) { store.raw = v / 2; }
        };
        o.double = 10;
        store.raw + "," + o.double
    "#;
    assert_eq!(eval_to_string(source), "5,10");
}

#[test]
fn define_property_accessors() {
    let source = r#"
        var hits = 0;
        var o = {};
        Object.defineProperty(o, "counted", {
            get: function(){ hits++; return hits; },
            configurable: true
        });
        o.counted; o.counted;
        o.counted
    "#;
    assert_eq!(eval_to_string(source), "3");
}

#[test]
fn arguments_object() {
    let source = r#"
        function f() { return arguments.length + ":" + arguments[0] + ":" + arguments[2]; }
        f("a", "b")
    "#;
    assert_eq!(eval_to_string(source), "2:a:undefined");
}

#[test]
fn named_function_expression_binding() {
    let source = r#"
        var f = function fact(n){ return n <= 1 ? 1 : n * fact(n - 1); };
        var outside = typeof fact;
        f(5) + ":" + outside
    "#;
    assert_eq!(eval_to_string(source), "120:undefined");
}

#[test]
fn call_and_apply() {
    let source = r#"
        function describe(prefix, suffix) { return prefix + this.name + suffix; }
        var target = { name: "rigel" };
        describe.call(target, "<", ">") + describe.apply(target, ["[", "]"])
    "#;
    assert_eq!(eval_to_string(source), "<rigel>[rigel]");
}

#[test]
fn string_methods() {
    let source = r#"
        var s = "Hello, world";
        [s.charAt(1), s.charCodeAt(0), s.indexOf("world"), s.slice(-5), s.substring(5, 0),
         s.toUpperCase(), "a,b,,c".split(",").length].join("|")
    "#;
    assert_eq!(
        eval_to_string(source),
        "e|72|7|world|Hello|HELLO, WORLD|4"
    );
}

#[test]
fn string_wrapper_indexing() {
    let source = r#"
        var s = new String("abc");
        var keys = [];
        for (var k in s) keys.push(k);
        keys.sort();
        s[1] + ":" + s.length + ":" + keys.join("")
    "#;
    assert_eq!(eval_to_string(source), "b:3:012");
}

#[test]
fn array_methods() {
    let source = r#"
        var a = [3, 1, 2];
        a.push(5);
        a.sort();
        var removed = a.splice(1, 2);
        a.unshift(0);
        [a.join("-"), removed.join("-"), a.indexOf(5), a.lastIndexOf(0)].join(" ")
    "#;
    assert_eq!(eval_to_string(source), "0-1-5 2-3 2 0");
}

#[test]
fn array_length_tracks_highest_index() {
    let source = r#"
        var a = [];
        a[10] = 1;
        var grown = a.length;
        a.length = 3;
        [grown, a.length, a[10] === undefined].join()
    "#;
    assert_eq!(eval_to_string(source), "11,3,true");
}

#[test]
fn sort_with_comparator_and_undefined() {
    let source = r#"
        var a = [10, 1, undefined, 5];
        a.sort(function(x, y){ return x - y; });
        a.join()
    "#;
    assert_eq!(eval_to_string(source), "1,5,10,");
}

#[test]
fn object_statics() {
    let source = r#"
        var proto = { shared: 1 };
        var o = Object.create(proto);
        o.own = 2;
        var keys = Object.keys(o);
        var desc = Object.getOwnPropertyDescriptor(o, "own");
        [Object.getPrototypeOf(o) === proto, keys.join(), desc.value, desc.writable].join(" ")
    "#;
    assert_eq!(eval_to_string(source), "true own 2 true");
}

#[test]
fn number_conversions() {
    let source = r#"
        [(255).toString(16), (8).toString(2), 1/0, -1/0, 0.1 + 0.2 === 0.3, Number("  42  ")].join(" ")
    "#;
    assert_eq!(
        eval_to_string(source),
        "ff 1000 Infinity -Infinity false 42"
    );
}

#[test]
fn math_functions() {
    let source = r#"
        [Math.floor(1.7), Math.ceil(1.2), Math.round(-0.4), Math.abs(-3),
         Math.max(1, 9, 4), Math.min(2, -1), Math.pow(2, 10), Math.sqrt(49)].join()
    "#;
    assert_eq!(eval_to_string(source), "1,2,0,3,9,-1,1024,7");
}

#[test]
fn equality_semantics() {
    let source = r#"
        [1 == "1", 1 === "1", null == undefined, null === undefined,
         NaN == NaN, 0 == -0, "" == false, {} == {}].join(" ")
    "#;
    assert_eq!(
        eval_to_string(source),
        "true false true false false true true false"
    );
}

#[test]
fn relational_coercions() {
    let source = r#"
        ["2" < "10", 2 < 10, "a" < "b", 1 < NaN, 1 <= 1, 2 >= 3].join(" ")
    "#;
    assert_eq!(eval_to_string(source), "false true true false true false");
}

#[test]
fn catch_parameter_scoping() {
    let source = r#"
        var e = "outer";
        try { throw "inner"; } catch (e) { var seen = e; }
        seen + ":" + e
    "#;
    assert_eq!(eval_to_string(source), "inner:outer");
}

#[test]
fn errors_carry_name_and_message() {
    assert_eq!(
        eval_to_string("try { undefined.x } catch (e) { e instanceof TypeError } "),
        "true"
    );
    assert_eq!(
        eval_to_string("try { missing() } catch (e) { e instanceof ReferenceError }"),
        "true"
    );
    assert_eq!(
        eval_to_string("new RangeError('out of range').toString()"),
        "RangeError: out of range"
    );
    assert_eq!(eval_to_string("Error('plain').toString()"), "Error: plain");
}

#[test]
fn uncaught_exceptions_render_as_name_and_message() {
    assert_eq!(eval_to_exception("throw new TypeError('bad')"), "TypeError: bad");
    assert_eq!(eval_to_exception("nope()"), "ReferenceError: nope is not defined");
    assert_eq!(eval_to_exception("throw 'bare'"), "bare");
}

#[test]
fn deep_recursion_raises_range_error() {
    let message = eval_to_exception("function r(){ return r(); } r()");
    assert_eq!(message, "RangeError: maximum call stack size exceeded");
}

#[test]
fn function_constructor_is_rejected() {
    let message = eval_to_exception("Function('return 1')");
    assert!(message.starts_with("TypeError:"), "got {message}");
}

#[test]
fn primitive_property_access() {
    let source = r#"
        ["abc".length, (42).toString(), true.toString(), "xyz".charAt(2)].join(" ")
    "#;
    assert_eq!(eval_to_string(source), "3 42 true z");
}

#[test]
fn conditional_and_sequence_expressions() {
    assert_eq!(eval_to_string("var x = (1, 2, 3); x"), "3");
    assert_eq!(eval_to_string("true ? 'yes' : boom()"), "yes");
    assert_eq!(eval_to_string("'' ? boom() : 'no'"), "no");
}

#[test]
fn to_primitive_on_objects() {
    let source = r#"
        var o = { valueOf: function(){ return 6; }, toString: function(){ return "seven"; } };
        (o * 7) + ":" + String(o) + ":" + (o + "")
    "#;
    assert_eq!(eval_to_string(source), "42:seven:6");
}

#[test]
fn global_object_bindings() {
    let source = r#"
        var fromGlobal = typeof NaN === "number" && Infinity > 0 && undefined === void 0;
        assigned = "implicit";
        fromGlobal + ":" + assigned
    "#;
    assert_eq!(eval_to_string(source), "true:implicit");
}

#[test]
fn shadowing_across_scopes() {
    let source = r#"
        var x = "global";
        function outer() {
            var x = "outer";
            function inner() { return x; }
            return inner();
        }
        outer() + ":" + x
    "#;
    assert_eq!(eval_to_string(source), "outer:global");
}

#[test]
fn closures_share_environments() {
    let source = r#"
        function counter() {
            var n = 0;
            return {
                up: function(){ return ++n; },
                down: function(){ return --n; }
            };
        }
        var c = counter();
        c.up(); c.up(); c.up(); c.down();
        c.up()
    "#;
    assert_eq!(eval_to_string(source), "3");
}
